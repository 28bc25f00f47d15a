use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{DEFAULT_SPIN_DURATION, HISTORY_LIMIT};
use crate::error::RouletteError;
use crate::item::{ItemUpdate, NewItem, RouletteItem};
use crate::palette::{generate_id, pastel_color};
use crate::spin_resolver::{compute_boundaries, compute_sectors, WheelSector};
use crate::weight_engine::{assign_weights, WeightMode};
use crate::wheel_session::{SpinFrame, SpinPlan, WheelSession};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RouletteSettings {
    pub weight_mode: WeightMode,
    /// Selected items leave the wheel once the result is acknowledged.
    pub elimination_mode: bool,
    pub spin_duration: Duration,
}

impl Default for RouletteSettings {
    fn default() -> Self {
        Self {
            weight_mode: WeightMode::Reversed,
            elimination_mode: true,
            spin_duration: DEFAULT_SPIN_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameStatus {
    Empty,
    /// Elimination mode with a single item and no spin yet.
    NeedsMoreItems,
    Ready,
    Spinning,
    AwaitingAcknowledgement(RouletteItem),
    /// Elimination mode has spun the wheel down to one item.
    Winner(RouletteItem),
}

/// Item set, modes and spin lifecycle for one wheel.
#[derive(Debug, Clone)]
pub struct RouletteGame {
    items: Vec<RouletteItem>,
    settings: RouletteSettings,
    session: WheelSession,
    history: Vec<RouletteItem>,
    last_winner: Option<RouletteItem>,
}

impl Default for RouletteGame {
    fn default() -> Self {
        Self::new(RouletteSettings::default())
    }
}

impl RouletteGame {
    pub fn new(settings: RouletteSettings) -> Self {
        Self {
            items: Vec::new(),
            settings,
            session: WheelSession::new(),
            history: Vec::new(),
            last_winner: None,
        }
    }

    pub fn items(&self) -> &[RouletteItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&RouletteItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn settings(&self) -> &RouletteSettings {
        &self.settings
    }

    pub fn session(&self) -> &WheelSession {
        &self.session
    }

    /// Most recent first, at most [`HISTORY_LIMIT`] entries.
    pub fn history(&self) -> &[RouletteItem] {
        &self.history
    }

    pub fn last_winner(&self) -> Option<&RouletteItem> {
        self.last_winner.as_ref()
    }

    pub fn boundaries(&self) -> &[Decimal] {
        self.session.boundaries()
    }

    pub fn sectors(&self) -> Vec<WheelSector> {
        compute_sectors(&self.items)
    }

    pub fn min_items_to_spin(&self) -> usize {
        if self.settings.elimination_mode {
            2
        } else {
            1
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.session.is_spinning() {
            return GameStatus::Spinning;
        }
        if let Some(selected) = self.session.selected() {
            return GameStatus::AwaitingAcknowledgement(selected.clone());
        }
        match self.items.as_slice() {
            [] => GameStatus::Empty,
            [only] if self.settings.elimination_mode => {
                if self.history.is_empty() {
                    GameStatus::NeedsMoreItems
                } else {
                    GameStatus::Winner(only.clone())
                }
            }
            _ => GameStatus::Ready,
        }
    }

    pub fn ensure_can_spin(&self) -> Result<(), RouletteError> {
        if self.session.is_spinning() {
            return Err(RouletteError::SpinInProgress);
        }
        if self.session.selected().is_some() {
            return Err(RouletteError::AwaitingAcknowledgement);
        }
        let required = self.min_items_to_spin();
        if self.items.len() < required {
            return Err(RouletteError::NotEnoughItems {
                required,
                available: self.items.len(),
            });
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), RouletteError> {
        if self.session.is_spinning() {
            return Err(RouletteError::SpinInProgress);
        }
        Ok(())
    }

    fn reweigh(&mut self) {
        assign_weights(&mut self.items, self.settings.weight_mode);
        self.session.set_boundaries(compute_boundaries(&self.items));
    }

    /// Adds an item at the end of the wheel. Without an explicit color the item
    /// gets a random pastel one drawn from `rng`.
    pub fn add_item<R: Rng + ?Sized>(
        &mut self,
        new_item: NewItem,
        rng: &mut R,
    ) -> Result<&RouletteItem, RouletteError> {
        self.ensure_editable()?;
        new_item.validate()?;

        let color = match new_item.color {
            Some(color) => color,
            None => pastel_color(rng),
        };
        let item = RouletteItem::new(
            generate_id(),
            new_item.name.trim(),
            new_item.price,
            color,
        );
        log::debug!("adding item {} ({})", item.name, item.id);
        self.items.push(item);
        self.reweigh();

        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    pub fn update_item(&mut self, id: &str, update: ItemUpdate) -> Result<&RouletteItem, RouletteError> {
        self.ensure_editable()?;
        update.validate()?;

        let index = self.index_of(id)?;
        update.apply_to(&mut self.items[index]);
        self.reweigh();
        Ok(&self.items[index])
    }

    pub fn remove_item(&mut self, id: &str) -> Result<RouletteItem, RouletteError> {
        self.ensure_editable()?;

        let index = self.index_of(id)?;
        let removed = self.items.remove(index);
        if self.session.selected().is_some_and(|selected| selected.id == removed.id) {
            self.session.reset();
        }
        self.reweigh();
        Ok(removed)
    }

    fn index_of(&self, id: &str) -> Result<usize, RouletteError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| RouletteError::ItemNotFound(id.to_string()))
    }

    pub fn set_weight_mode(&mut self, mode: WeightMode) {
        self.settings.weight_mode = mode;
        self.reweigh();
    }

    pub fn toggle_weight_mode(&mut self) -> WeightMode {
        let mode = self.settings.weight_mode.toggled();
        self.set_weight_mode(mode);
        mode
    }

    pub fn set_elimination_mode(&mut self, enabled: bool) {
        self.settings.elimination_mode = enabled;
    }

    pub fn toggle_elimination_mode(&mut self) -> bool {
        self.settings.elimination_mode = !self.settings.elimination_mode;
        self.settings.elimination_mode
    }

    pub fn set_spin_duration(&mut self, duration: Duration) {
        self.settings.spin_duration = duration;
    }

    /// Case-insensitive match on name or price text. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&RouletteItem> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| {
                item.name.to_lowercase().contains(&query) || item.price.to_string().contains(&query)
            })
            .collect()
    }

    /// Starts a spin with a randomized plan from the wheel's current angle.
    pub fn start_spin<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Result<SpinPlan, RouletteError> {
        self.ensure_can_spin()?;
        let plan = SpinPlan::random(self.session.rotation(), self.settings.spin_duration, rng);
        self.start_spin_with(plan, now)?;
        Ok(plan)
    }

    pub fn start_spin_with(&mut self, plan: SpinPlan, now: Duration) -> Result<(), RouletteError> {
        self.ensure_can_spin()?;
        self.session.start(plan, now)?;
        log::debug!(
            "spin started: {:.1} deg over {} ms",
            plan.total_rotation,
            plan.duration.as_millis()
        );
        Ok(())
    }

    /// One animation frame. The frame that finishes the spin records the
    /// result in the history.
    pub fn advance(&mut self, now: Duration) -> Option<SpinFrame> {
        let frame = self.session.advance(now, &self.items)?;
        if let Some(selected) = &frame.settled {
            log::info!("wheel settled on {} ({})", selected.name, selected.id);
            self.history.insert(0, selected.clone());
            self.history.truncate(HISTORY_LIMIT);
            self.last_winner = Some(selected.clone());
        }
        Some(frame)
    }

    /// Closes the pending result. In elimination mode the selected item leaves the wheel.
    pub fn acknowledge(&mut self) -> Result<RouletteItem, RouletteError> {
        let selected = self.session.acknowledge().ok_or(RouletteError::NoResult)?;
        if self.settings.elimination_mode {
            if let Some(index) = self.items.iter().position(|item| item.id == selected.id) {
                self.items.remove(index);
                log::info!("{} eliminated, {} item(s) left", selected.name, self.items.len());
            }
            self.reweigh();
        }
        Ok(selected)
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.history.clear();
        self.last_winner = None;
        self.session.reset();
        self.reweigh();
    }
}

/// Two decimals with space-separated thousands, e.g. `12 345.60`.
pub fn format_price(price: Decimal) -> String {
    let text = format!("{:.2}", price.round_dp(2));
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_PRICE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn price(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    fn game_with(prices: &[(&str, i64)], elimination_mode: bool) -> RouletteGame {
        let mut game = RouletteGame::new(RouletteSettings {
            elimination_mode,
            ..Default::default()
        });
        let mut rng = seeded();
        for (name, value) in prices {
            game.add_item(NewItem::new(*name, price(*value)), &mut rng).unwrap();
        }
        game
    }

    fn id_of(game: &RouletteGame, name: &str) -> String {
        game.items().iter().find(|i| i.name == name).unwrap().id.clone()
    }

    #[test]
    fn test_add_recomputes_weights() {
        let mut game = game_with(&[("A", 10)], true);
        assert_eq!(game.items()[0].weight, price(100));

        game.add_item(NewItem::new("B", price(30)), &mut seeded()).unwrap();
        game.add_item(NewItem::new(" C ", price(60)), &mut seeded()).unwrap();
        let weights: Vec<Decimal> = game.items().iter().map(|i| i.weight).collect();
        assert_eq!(weights, vec![price(45), price(35), price(20)]);
        assert_eq!(game.items()[2].name, "C");
        assert_eq!(game.boundaries(), &[Decimal::ZERO, price(162), price(288)]);
    }

    #[test]
    fn test_add_rejects_invalid_items() {
        let mut game = RouletteGame::default();
        let mut rng = seeded();
        let err = game.add_item(NewItem::new("", price(5)), &mut rng).unwrap_err();
        assert!(matches!(err, RouletteError::Validation(_)));
        assert!(game.add_item(NewItem::new("x", Decimal::ZERO), &mut rng).is_err());
        assert!(game.items().is_empty());
    }

    #[test]
    fn test_largest_price_next_to_small_one() {
        let mut game = RouletteGame::default();
        let mut rng = seeded();
        game.add_item(NewItem::new("Yacht", Decimal::from(MAX_PRICE)), &mut rng)
            .unwrap();
        game.add_item(NewItem::new("Pen", Decimal::ONE), &mut rng).unwrap();
        let total: Decimal = game.items().iter().map(|i| i.weight).sum();
        assert!((total - price(100)).abs() < Decimal::new(1, 20));
        assert!(game.items()[1].weight > game.items()[0].weight);

        let err = game
            .add_item(NewItem::new("Island", Decimal::from(MAX_PRICE) + Decimal::ONE), &mut rng)
            .unwrap_err();
        assert!(matches!(err, RouletteError::Validation(_)));
        assert_eq!(game.items().len(), 2);
    }

    #[test]
    fn test_new_items_get_pastel_colors_unless_given() {
        let mut game = RouletteGame::default();
        let mut rng = seeded();
        let mut expected = seeded();
        let first = game.add_item(NewItem::new("A", price(1)), &mut rng).unwrap().color.clone();
        assert_eq!(first, pastel_color(&mut expected));

        let custom = game
            .add_item(NewItem::new("B", price(1)).with_color("#abcdef"), &mut rng)
            .unwrap()
            .color
            .clone();
        assert_eq!(custom, "#abcdef");

        let third = game.add_item(NewItem::new("C", price(1)), &mut rng).unwrap().color.clone();
        assert_eq!(third, pastel_color(&mut expected));
        assert!(game.sectors().iter().all(|sector| !sector.color.is_empty()));
    }

    #[test]
    fn test_colors_after_reset_depend_only_on_rng() {
        let mut fresh = RouletteGame::default();
        let expected = fresh.add_item(NewItem::new("A", price(1)), &mut seeded()).unwrap().color.clone();

        let mut game = game_with(&[("X", 3), ("Y", 4), ("Z", 5)], true);
        game.reset();
        let color = game.add_item(NewItem::new("A", price(1)), &mut seeded()).unwrap().color.clone();
        assert_eq!(color, expected);
    }

    #[test]
    fn test_update_and_remove_preserve_order() {
        let mut game = game_with(&[("A", 10), ("B", 30), ("C", 60)], true);
        let b = id_of(&game, "B");
        let updated = game
            .update_item(&b, ItemUpdate { price: Some(price(10)), ..Default::default() })
            .unwrap();
        assert_eq!(updated.price, price(10));

        let removed = game.remove_item(&id_of(&game, "A")).unwrap();
        assert_eq!(removed.name, "A");
        let names: Vec<&str> = game.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
        assert_eq!(
            game.remove_item("missing"),
            Err(RouletteError::ItemNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_toggle_weight_mode() {
        let mut game = game_with(&[("A", 10), ("B", 30), ("C", 60)], true);
        assert_eq!(game.toggle_weight_mode(), WeightMode::Normal);
        assert_eq!(game.items()[2].weight, price(60));
        assert_eq!(game.boundaries(), &[Decimal::ZERO, price(36), price(144)]);
    }

    #[test]
    fn test_search() {
        let game = game_with(&[("Teddy Bear", 10), ("Mug", 125), ("Big teddy", 60)], true);
        let names = |q: &str| -> Vec<String> { game.search(q).iter().map(|i| i.name.clone()).collect() };
        assert_eq!(names("TEDDY"), vec!["Teddy Bear", "Big teddy"]);
        assert_eq!(names("12"), vec!["Mug"]);
        assert_eq!(names("  ").len(), 3);
        assert!(names("lamp").is_empty());
    }

    #[test]
    fn test_status_transitions() {
        let mut game = RouletteGame::default();
        assert_eq!(game.status(), GameStatus::Empty);
        game.add_item(NewItem::new("A", price(10)), &mut seeded()).unwrap();
        assert_eq!(game.status(), GameStatus::NeedsMoreItems);
        game.set_elimination_mode(false);
        assert_eq!(game.status(), GameStatus::Ready);
    }

    #[test]
    fn test_edits_refused_while_spinning() {
        let mut game = game_with(&[("A", 10), ("B", 30)], true);
        game.start_spin_with(SpinPlan::new(0.0, 720.0, Duration::from_secs(1)), Duration::ZERO)
            .unwrap();
        assert_eq!(game.status(), GameStatus::Spinning);
        assert_eq!(
            game.add_item(NewItem::new("C", price(1)), &mut seeded()).unwrap_err(),
            RouletteError::SpinInProgress
        );
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            game.start_spin(Duration::ZERO, &mut rng).unwrap_err(),
            RouletteError::SpinInProgress
        );
    }

    #[test]
    fn test_non_elimination_keeps_items() {
        let mut game = game_with(&[("A", 10), ("B", 30), ("C", 60)], false);
        game.start_spin_with(SpinPlan::new(0.0, 110.0, Duration::from_millis(100)), Duration::ZERO)
            .unwrap();
        let frame = game.advance(Duration::from_millis(100)).unwrap();
        assert_eq!(frame.settled.unwrap().name, "B");
        assert!(matches!(game.status(), GameStatus::AwaitingAcknowledgement(_)));
        assert_eq!(game.acknowledge().unwrap().name, "B");
        assert_eq!(game.items().len(), 3);
        assert_eq!(game.history()[0].name, "B");
        assert_eq!(game.acknowledge(), Err(RouletteError::NoResult));
    }

    #[test]
    fn test_removing_pending_result_clears_it() {
        let mut game = game_with(&[("A", 10), ("B", 30), ("C", 60)], true);
        game.start_spin_with(SpinPlan::new(0.0, 0.0, Duration::from_millis(16)), Duration::ZERO)
            .unwrap();
        let selected = game.advance(Duration::from_millis(16)).unwrap().settled.unwrap();
        assert_eq!(selected.name, "A");
        game.remove_item(&selected.id).unwrap();
        assert_eq!(game.status(), GameStatus::Ready);
        assert!(game.ensure_can_spin().is_ok());
    }

    #[test]
    fn test_history_is_capped_and_most_recent_first() {
        let mut game = game_with(&[("A", 10), ("B", 30), ("C", 60)], false);
        let mut now = Duration::ZERO;
        // pointer angles 90, 200, 350 land on A, B, C
        let rotations = [0.0, 110.0, 260.0];
        for round in 0..12 {
            let start = game.session().rotation();
            let target = rotations[round % 3] + 360.0 * (round as f64 + 1.0);
            game.start_spin_with(SpinPlan::new(start, target - start, Duration::from_millis(16)), now)
                .unwrap();
            now += Duration::from_millis(16);
            game.advance(now).unwrap();
            game.acknowledge().unwrap();
        }
        assert_eq!(game.history().len(), HISTORY_LIMIT);
        let names: Vec<&str> = game.history().iter().take(3).map(|i| i.name.as_str()).collect();
        // round 11 -> C, round 10 -> B, round 9 -> A
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut game = game_with(&[("A", 10), ("B", 30)], true);
        game.start_spin_with(SpinPlan::new(0.0, 0.0, Duration::from_millis(16)), Duration::ZERO)
            .unwrap();
        game.advance(Duration::from_millis(16));
        game.reset();
        assert!(game.items().is_empty());
        assert!(game.history().is_empty());
        assert!(game.last_winner().is_none());
        assert!(game.boundaries().is_empty());
        assert_eq!(game.status(), GameStatus::Empty);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(1234567, 1)), "123 456.70");
        assert_eq!(format_price(Decimal::new(5, 0)), "5.00");
        assert_eq!(format_price(Decimal::new(1000, 0)), "1 000.00");
        assert_eq!(format_price(Decimal::new(999, 3)), "1.00");
    }
}
