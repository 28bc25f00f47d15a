//! Converts item prices into selection weights.
//!
//! Weights are kept in `Decimal` so repeated add/remove cycles reproduce the
//! same values exactly for the same inputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::constants::{SINGLE_ITEM_WEIGHT, WEIGHT_SCALE};
use crate::item::RouletteItem;

/// How price maps to selection weight.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WeightMode {
    /// Pricier items take a proportionally larger share.
    Normal,
    /// Cheaper items win more often: an item's lost share is spread over the others.
    #[default]
    Reversed,
}

impl WeightMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Reversed,
            Self::Reversed => Self::Normal,
        }
    }
}

/// Returns a copy of `items` with weights attached. Ids, names, prices and
/// colors are untouched.
pub fn compute_weights(items: &[RouletteItem], mode: WeightMode) -> Vec<RouletteItem> {
    let mut weighted = items.to_vec();
    assign_weights(&mut weighted, mode);
    weighted
}

/// In-place variant of [`compute_weights`]. Never fails: a price total that
/// cannot be represented gets the same uniform weights as an all-zero set.
pub fn assign_weights(items: &mut [RouletteItem], mode: WeightMode) {
    if items.is_empty() {
        return;
    }

    if items.len() == 1 {
        items[0].weight = Decimal::from(SINGLE_ITEM_WEIGHT);
        return;
    }

    match weights(items, mode) {
        Some(weights) => {
            for (item, weight) in items.iter_mut().zip(weights) {
                item.weight = weight;
            }
        }
        None => {
            for item in items.iter_mut() {
                item.weight = Decimal::ONE;
            }
        }
    }

    log::debug!("recomputed {} weights in {} mode", items.len(), mode);
}

/// Weights for two or more items, or `None` when the price total is zero or
/// the arithmetic leaves `Decimal` range.
fn weights(items: &[RouletteItem], mode: WeightMode) -> Option<Vec<Decimal>> {
    let total = items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.price));
    let total = match total {
        Some(total) if !total.is_zero() => total,
        Some(_) => return None,
        None => {
            log::warn!("price total of {} items overflows, using uniform weights", items.len());
            return None;
        }
    };

    let scale = Decimal::from(WEIGHT_SCALE);
    let others = Decimal::from(items.len() - 1);
    items
        .iter()
        .map(|item| {
            let share = item.price.checked_mul(scale)?.checked_div(total)?;
            match mode {
                WeightMode::Normal => Some(share),
                WeightMode::Reversed => scale.checked_sub(share)?.checked_div(others),
            }
        })
        .collect()
}
