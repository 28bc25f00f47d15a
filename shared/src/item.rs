use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{validate_color, validate_item_name, validate_price};

/// A prize on the wheel. `weight` is derived by the weight engine and is
/// never set from user input.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouletteItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub weight: Decimal,
    pub color: String,
}

impl RouletteItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            weight: Decimal::ZERO,
            color: color.into(),
        }
    }
}

/// Input for adding an item. An absent color becomes a random pastel one.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct NewItem {
    #[validate(custom = "validate_item_name")]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(custom = "validate_color")]
    pub color: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial edit of an existing item.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
pub struct ItemUpdate {
    #[validate(custom = "validate_item_name")]
    pub name: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    #[validate(custom = "validate_color")]
    pub color: Option<String>,
}

impl ItemUpdate {
    pub(crate) fn apply_to(self, item: &mut RouletteItem) {
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(color) = self.color {
            item.color = color;
        }
    }
}
