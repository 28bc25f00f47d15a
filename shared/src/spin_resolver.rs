//! Maps a continuous wheel rotation onto the weighted item list.
//!
//! Sector `i` covers `[start(i), end(i))` degrees in the renderer's frame,
//! where `end(i) = (w_0 + .. + w_i) * 360 / total`. The pointer sits
//! [`POINTER_OFFSET_DEGREES`] ahead of the renderer's zero axis.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{BOUNDARY_PRECISION_DP, FULL_TURN_DEGREES, POINTER_OFFSET_DEGREES};
use crate::item::RouletteItem;
use crate::palette::CASINO_COLORS;

fn full_turn() -> Decimal {
    Decimal::from(FULL_TURN_DEGREES)
}

/// Weight used for geometry. Non-positive weights count as 1 so every item
/// keeps a resolvable sector; the stored weight is left alone.
pub fn sector_weight(item: &RouletteItem) -> Decimal {
    if item.weight <= Decimal::ZERO {
        Decimal::ONE
    } else {
        item.weight
    }
}

fn sector_weights(items: &[RouletteItem]) -> (Vec<Decimal>, Decimal) {
    let weights: Vec<Decimal> = items.iter().map(sector_weight).collect();
    let total = weights.iter().copied().sum();
    (weights, total)
}

/// Folds any rotation into `[0, 360)`. Non-finite input folds to 0.
pub fn normalize_rotation(rotation: f64) -> f64 {
    if !rotation.is_finite() {
        return 0.0;
    }
    let normalized = rotation.rem_euclid(FULL_TURN_DEGREES as f64);
    if normalized >= FULL_TURN_DEGREES as f64 {
        0.0
    } else {
        normalized
    }
}

/// The sector angle currently under the pointer for a wheel rotation.
pub fn pointer_angle(rotation: f64) -> Decimal {
    let normalized = Decimal::from_f64(normalize_rotation(rotation)).unwrap_or(Decimal::ZERO);
    (normalized + Decimal::from(POINTER_OFFSET_DEGREES)) % full_turn()
}

fn fold_angle(angle: Decimal) -> Decimal {
    let folded = angle % full_turn();
    if folded < Decimal::ZERO {
        folded + full_turn()
    } else {
        folded
    }
}

/// Sorted, deduplicated sector boundaries in `[0, 360)`, used for tick
/// detection. Values equal to 4 decimal places collapse into one. An empty
/// item list has no boundaries.
pub fn compute_boundaries(items: &[RouletteItem]) -> Vec<Decimal> {
    if items.is_empty() {
        return Vec::new();
    }

    let (weights, total) = sector_weights(items);
    let mut keys: Vec<Decimal> = Vec::with_capacity(items.len() + 1);
    let mut boundaries: Vec<Decimal> = Vec::with_capacity(items.len() + 1);

    let mut add_boundary = |angle: Decimal| {
        let mut normalized = fold_angle(angle);
        let mut key = normalized.round_dp(BOUNDARY_PRECISION_DP);
        if key >= full_turn() {
            key = Decimal::ZERO;
            normalized = Decimal::ZERO;
        }
        if !keys.contains(&key) {
            keys.push(key);
            boundaries.push(normalized);
        }
    };

    add_boundary(Decimal::ZERO);
    let mut cumulative = Decimal::ZERO;
    for weight in weights {
        cumulative += weight;
        add_boundary(cumulative * full_turn() / total);
    }

    boundaries.sort();
    boundaries
}

/// Index of the item under the pointer. A boundary angle belongs to the
/// sector that starts there. `None` only for an empty list.
pub fn select_index_by_rotation(items: &[RouletteItem], final_rotation: f64) -> Option<usize> {
    if items.is_empty() {
        return None;
    }

    let adjusted = pointer_angle(final_rotation);
    let (weights, total) = sector_weights(items);

    let mut start = Decimal::ZERO;
    let mut cumulative = Decimal::ZERO;
    for (index, weight) in weights.into_iter().enumerate() {
        cumulative += weight;
        let end = cumulative * full_turn() / total;
        if adjusted >= start && adjusted < end {
            return Some(index);
        }
        start = end;
    }

    // Only reachable through rounding right below 360.
    Some(items.len() - 1)
}

pub fn select_item_by_rotation(items: &[RouletteItem], final_rotation: f64) -> Option<&RouletteItem> {
    select_index_by_rotation(items, final_rotation).map(|index| &items[index])
}

/// True when the pointer passed a boundary going from `previous` to
/// `current`: `(previous, current]`, or across 0 when `previous >= current`.
pub fn crossed_boundary(boundaries: &[Decimal], previous: Decimal, current: Decimal) -> bool {
    boundaries.iter().any(|&boundary| {
        if previous < current {
            boundary > previous && boundary <= current
        } else {
            boundary > previous || boundary <= current
        }
    })
}

/// Per-frame boundary-crossing detector. Owned by whoever drives the animation.
#[derive(Debug, Clone, Default)]
pub struct TickTracker {
    boundaries: Vec<Decimal>,
    last_angle: Option<Decimal>,
    last_rotation: Option<f64>,
}

impl TickTracker {
    pub fn new(boundaries: Vec<Decimal>) -> Self {
        Self {
            boundaries,
            last_angle: None,
            last_rotation: None,
        }
    }

    pub fn boundaries(&self) -> &[Decimal] {
        &self.boundaries
    }

    /// Replaces the boundary set; the next sample starts a fresh sequence.
    pub fn set_boundaries(&mut self, boundaries: Vec<Decimal>) {
        self.boundaries = boundaries;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.last_angle = None;
        self.last_rotation = None;
    }

    /// Feeds one rotation sample. Returns true when a boundary was crossed
    /// since the previous sample. A sample that did not move the wheel never ticks.
    pub fn observe(&mut self, rotation: f64) -> bool {
        let current = pointer_angle(rotation);
        let previous = self.last_angle.replace(current);
        let previous_rotation = self.last_rotation.replace(rotation);

        let Some(previous) = previous else {
            return false;
        };
        if self.boundaries.is_empty() || previous_rotation == Some(rotation) {
            return false;
        }

        crossed_boundary(&self.boundaries, previous, current)
    }
}

/// Sector geometry handed to a renderer, in the renderer's own frame.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WheelSector {
    pub item_id: String,
    pub start: Decimal,
    pub end: Decimal,
    pub color: String,
}

pub fn compute_sectors(items: &[RouletteItem]) -> Vec<WheelSector> {
    let (weights, total) = sector_weights(items);
    let mut start = Decimal::ZERO;
    let mut cumulative = Decimal::ZERO;

    items
        .iter()
        .zip(weights)
        .enumerate()
        .map(|(index, (item, weight))| {
            cumulative += weight;
            let end = cumulative * full_turn() / total;
            let color = if item.color.is_empty() {
                CASINO_COLORS[index % CASINO_COLORS.len()].to_string()
            } else {
                item.color.clone()
            };
            let sector = WheelSector {
                item_id: item.id.clone(),
                start,
                end,
                color,
            };
            start = end;
            sector
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight_engine::{compute_weights, WeightMode};
    use proptest::prelude::*;

    fn weighted_abc() -> Vec<RouletteItem> {
        let items = vec![
            RouletteItem::new("a", "A", Decimal::from(10), "#111111"),
            RouletteItem::new("b", "B", Decimal::from(30), "#222222"),
            RouletteItem::new("c", "C", Decimal::from(60), "#333333"),
        ];
        compute_weights(&items, WeightMode::Reversed)
    }

    fn with_weights(weights: &[i64]) -> Vec<RouletteItem> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let mut item = RouletteItem::new(i.to_string(), i.to_string(), Decimal::ONE, "");
                item.weight = Decimal::from(*w);
                item
            })
            .collect()
    }

    // Rotation r puts the pointer at (r + 90) mod 360.
    fn rotation_for_pointer(angle: f64) -> f64 {
        angle - 90.0
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(720.0), 0.0);
        assert_eq!(normalize_rotation(-90.0), 270.0);
        assert_eq!(normalize_rotation(365.5), 5.5);
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
        assert!(normalize_rotation(-1e-20) < 360.0);
    }

    #[test]
    fn test_pointer_angle_applies_offset() {
        assert_eq!(pointer_angle(0.0), Decimal::from(90));
        assert_eq!(pointer_angle(270.0), Decimal::ZERO);
        assert_eq!(pointer_angle(-100.0), Decimal::from(350));
    }

    #[test]
    fn test_boundaries_for_scenario() {
        let boundaries = compute_boundaries(&weighted_abc());
        assert_eq!(boundaries, vec![Decimal::ZERO, Decimal::from(162), Decimal::from(288)]);
    }

    #[test]
    fn test_boundaries_uniform_and_empty() {
        let boundaries = compute_boundaries(&with_weights(&[1, 1, 1]));
        assert_eq!(boundaries, vec![Decimal::ZERO, Decimal::from(120), Decimal::from(240)]);
        assert!(compute_boundaries(&[]).is_empty());
        assert_eq!(compute_boundaries(&with_weights(&[100])), vec![Decimal::ZERO]);
    }

    #[test]
    fn test_boundaries_collapse_within_tolerance() {
        let mut items = with_weights(&[1, 1]);
        items[1].weight = Decimal::new(1, 10);
        assert_eq!(compute_boundaries(&items), vec![Decimal::ZERO]);
    }

    #[test]
    fn test_boundaries_sanitize_weights() {
        let boundaries = compute_boundaries(&with_weights(&[0, -5, 2]));
        assert_eq!(boundaries, vec![Decimal::ZERO, Decimal::from(90), Decimal::from(180)]);
    }

    #[test]
    fn test_scenario_selection() {
        let items = weighted_abc();
        let pick = |pointer: f64| {
            select_item_by_rotation(&items, rotation_for_pointer(pointer))
                .map(|item| item.name.clone())
                .unwrap()
        };
        assert_eq!(pick(90.0), "A");
        assert_eq!(pick(200.0), "B");
        assert_eq!(pick(350.0), "C");
    }

    #[test]
    fn test_boundary_angle_belongs_to_next_sector() {
        let items = weighted_abc();
        assert_eq!(select_item_by_rotation(&items, 72.0).unwrap().name, "B");
        assert_eq!(select_item_by_rotation(&items, 198.0).unwrap().name, "C");
        assert_eq!(select_item_by_rotation(&items, 270.0).unwrap().name, "A");
        assert_eq!(select_item_by_rotation(&items, 71.999).unwrap().name, "A");
    }

    #[test]
    fn test_zero_weights_keep_a_sector() {
        let items = with_weights(&[0, 0]);
        assert_eq!(select_index_by_rotation(&items, rotation_for_pointer(10.0)), Some(0));
        assert_eq!(select_index_by_rotation(&items, rotation_for_pointer(190.0)), Some(1));
    }

    #[test]
    fn test_empty_selection_is_none() {
        assert!(select_item_by_rotation(&[], 123.0).is_none());
    }

    #[test]
    fn test_crossed_boundary() {
        let boundaries = vec![Decimal::ZERO, Decimal::from(162), Decimal::from(288)];
        let d = |value: i64| Decimal::from(value);
        assert!(crossed_boundary(&boundaries, d(10), d(170)));
        assert!(!crossed_boundary(&boundaries, d(170), d(280)));
        assert!(crossed_boundary(&boundaries, d(170), d(288)));
        assert!(!crossed_boundary(&boundaries, d(162), d(200)));
        assert!(crossed_boundary(&boundaries, d(350), d(5)));
        assert!(!crossed_boundary(&[d(162)], d(350), d(5)));
    }

    #[test]
    fn test_tick_tracker() {
        let mut tracker = TickTracker::new(compute_boundaries(&weighted_abc()));
        assert!(!tracker.observe(0.0)); // pointer 90, first sample
        assert!(!tracker.observe(0.0));
        assert!(!tracker.observe(50.0)); // pointer 140
        assert!(tracker.observe(80.0)); // pointer 170, past 162
        assert!(tracker.observe(290.0)); // pointer 20, past 288 and 0
        tracker.reset();
        assert!(!tracker.observe(400.0));
    }

    #[test]
    fn test_sectors_follow_weights() {
        let sectors = compute_sectors(&weighted_abc());
        assert_eq!(sectors.len(), 3);
        assert_eq!(sectors[0].end, Decimal::from(162));
        assert_eq!(sectors[1].start, Decimal::from(162));
        assert_eq!(sectors[2].end, Decimal::from(360));
        assert_eq!(sectors[2].color, "#333333");

        let fallback = compute_sectors(&with_weights(&[1, 1]));
        assert_eq!(fallback[1].color, CASINO_COLORS[1]);
    }

    proptest! {
        #[test]
        fn selection_ignores_full_turns(quarter_degrees in -1_000_000i64..1_000_000, turns in -50i64..50) {
            let items = weighted_abc();
            let rotation = quarter_degrees as f64 * 0.25;
            prop_assert_eq!(
                select_index_by_rotation(&items, rotation),
                select_index_by_rotation(&items, rotation + 360.0 * turns as f64)
            );
        }

        #[test]
        fn boundaries_are_sorted_and_bounded(weights in proptest::collection::vec(0i64..500, 1..20)) {
            let items = with_weights(&weights);
            let boundaries = compute_boundaries(&items);
            prop_assert!(boundaries.len() <= items.len() + 1);
            prop_assert_eq!(boundaries[0], Decimal::ZERO);
            prop_assert!(boundaries.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert!(boundaries.iter().all(|b| *b >= Decimal::ZERO && *b < Decimal::from(360)));
        }
    }
}
