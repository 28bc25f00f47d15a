use std::time::Duration;

/// Sector angle 0 sits on the renderer's 3 o'clock axis; the pointer sits at 12.
pub const POINTER_OFFSET_DEGREES: u32 = 90;
pub const FULL_TURN_DEGREES: u32 = 360;

/// Boundaries closer than this many decimal digits collapse into one.
pub const BOUNDARY_PRECISION_DP: u32 = 4;

pub const SINGLE_ITEM_WEIGHT: u32 = 100;
pub const WEIGHT_SCALE: u32 = 100;

/// Highest accepted price. Keeps the summed prices of any realistic wheel,
/// scaled to percentages, well inside `Decimal` range.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

pub const HISTORY_LIMIT: usize = 10;

pub const SPEED_MULTIPLIER: f64 = 4.0;
pub const BASE_ANGULAR_SPEED_DEG_PER_MS: f64 = (SPEED_MULTIPLIER * 360.0) / 1000.0;
pub const SPEED_JITTER_MIN: f64 = 0.9;
pub const SPEED_JITTER_SPAN: f64 = 0.2;
pub const EASE_OUT_CUBIC_INTEGRAL: f64 = 0.75; // ∫ easeOutCubic over [0, 1]
pub const MIN_SPIN_DURATION: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinDurationOption {
    pub label: &'static str,
    pub millis: u64,
}

impl SpinDurationOption {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.millis)
    }
}

pub const SPIN_DURATION_OPTIONS: [SpinDurationOption; 4] = [
    SpinDurationOption { label: "3s", millis: 3_000 },
    SpinDurationOption { label: "5s", millis: 5_000 },
    SpinDurationOption { label: "10s", millis: 10_000 },
    SpinDurationOption { label: "20s", millis: 20_000 },
];

pub const DEFAULT_SPIN_DURATION: Duration = Duration::from_millis(5_000);

pub const EMPTY_NAME_ERROR: &str = "Item name must not be empty";
pub const INVALID_PRICE_ERROR: &str = "Price must be a number greater than zero";
pub const PRICE_TOO_LARGE_ERROR: &str = "Price must not exceed 1 000 000 000 000";
pub const INVALID_COLOR_ERROR: &str = "Color must be a hex value like #a1b2c3";
