//! Time-driven spin state machine.
//!
//! The host feeds `advance` with the time elapsed on its own clock, once per
//! frame. Nothing here sleeps or schedules.

use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;

use crate::constants::{
    BASE_ANGULAR_SPEED_DEG_PER_MS, EASE_OUT_CUBIC_INTEGRAL, MIN_SPIN_DURATION, SPEED_JITTER_MIN,
    SPEED_JITTER_SPAN,
};
use crate::error::RouletteError;
use crate::item::RouletteItem;
use crate::spin_resolver::{select_item_by_rotation, TickTracker};

/// Deceleration curve: fast start, gentle stop.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub start_angle: f64,
    pub total_rotation: f64,
    pub duration: Duration,
}

impl SpinPlan {
    pub fn new(start_angle: f64, total_rotation: f64, duration: Duration) -> Self {
        Self {
            start_angle,
            total_rotation,
            duration: duration.max(MIN_SPIN_DURATION),
        }
    }

    /// Roughly four turns per second of spin, jittered by ±10%, plus a random
    /// landing offset so the outcome is not a function of duration alone.
    pub fn random<R: Rng + ?Sized>(start_angle: f64, duration: Duration, rng: &mut R) -> Self {
        let duration = duration.max(MIN_SPIN_DURATION);
        let jitter = SPEED_JITTER_MIN + rng.gen::<f64>() * SPEED_JITTER_SPAN;
        let angular_speed = BASE_ANGULAR_SPEED_DEG_PER_MS * jitter;
        let landing_offset = rng.gen::<f64>() * 360.0;
        let total_rotation =
            angular_speed * duration.as_millis() as f64 * EASE_OUT_CUBIC_INTEGRAL + landing_offset;
        Self::new(start_angle, total_rotation, duration)
    }

    pub fn target_angle(&self) -> f64 {
        self.start_angle + self.total_rotation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpinPhase {
    Idle,
    Spinning {
        start_angle: f64,
        target_angle: f64,
        started_at: Duration,
        duration: Duration,
    },
    Settled {
        selected: RouletteItem,
    },
}

/// One animation frame worth of output.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinFrame {
    pub rotation: f64,
    pub progress: f64,
    pub ticked: bool,
    /// Set on the frame that finished the spin.
    pub settled: Option<RouletteItem>,
}

#[derive(Debug, Clone)]
pub struct WheelSession {
    rotation: f64,
    phase: SpinPhase,
    ticks: TickTracker,
}

impl Default for WheelSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WheelSession {
    pub fn new() -> Self {
        Self {
            rotation: 0.0,
            phase: SpinPhase::Idle,
            ticks: TickTracker::default(),
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn phase(&self) -> &SpinPhase {
        &self.phase
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning { .. })
    }

    pub fn selected(&self) -> Option<&RouletteItem> {
        match &self.phase {
            SpinPhase::Settled { selected } => Some(selected),
            _ => None,
        }
    }

    pub fn boundaries(&self) -> &[Decimal] {
        self.ticks.boundaries()
    }

    pub fn set_boundaries(&mut self, boundaries: Vec<Decimal>) {
        self.ticks.set_boundaries(boundaries);
    }

    pub fn start(&mut self, plan: SpinPlan, now: Duration) -> Result<(), RouletteError> {
        match self.phase {
            SpinPhase::Spinning { .. } => return Err(RouletteError::SpinInProgress),
            SpinPhase::Settled { .. } => return Err(RouletteError::AwaitingAcknowledgement),
            SpinPhase::Idle => {}
        }

        self.ticks.reset();
        self.rotation = plan.start_angle;
        self.phase = SpinPhase::Spinning {
            start_angle: plan.start_angle,
            target_angle: plan.target_angle(),
            started_at: now,
            duration: plan.duration,
        };
        Ok(())
    }

    /// Advances the spin to `now`. Returns `None` unless a spin is in flight.
    /// The final frame lands exactly on the planned target and resolves the
    /// selection against `items`.
    pub fn advance(&mut self, now: Duration, items: &[RouletteItem]) -> Option<SpinFrame> {
        let SpinPhase::Spinning {
            start_angle,
            target_angle,
            started_at,
            duration,
        } = self.phase
        else {
            return None;
        };

        let elapsed = now.saturating_sub(started_at);
        let progress = (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0);
        let finished = progress >= 1.0;

        self.rotation = if finished {
            target_angle
        } else {
            start_angle + (target_angle - start_angle) * ease_out_cubic(progress)
        };
        let ticked = self.ticks.observe(self.rotation);

        let settled = if finished {
            let selected = select_item_by_rotation(items, target_angle).cloned();
            self.phase = match &selected {
                Some(item) => SpinPhase::Settled { selected: item.clone() },
                None => SpinPhase::Idle,
            };
            selected
        } else {
            None
        };

        Some(SpinFrame {
            rotation: self.rotation,
            progress,
            ticked,
            settled,
        })
    }

    /// Closes a settled result and returns it.
    pub fn acknowledge(&mut self) -> Option<RouletteItem> {
        match std::mem::replace(&mut self.phase, SpinPhase::Idle) {
            SpinPhase::Settled { selected } => Some(selected),
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Drops any in-flight or settled spin. The wheel keeps its angle.
    pub fn reset(&mut self) {
        self.phase = SpinPhase::Idle;
        self.ticks.reset();
    }
}
