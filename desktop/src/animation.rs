use std::io::Write;
use std::time::Duration;

use rand::Rng;
use shared::{format_price, RouletteGame, RouletteItem, SpinFrame};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::AppError;

/// Audio/visual seam of the wheel. Called from the animation driver.
pub trait SpinFeedback {
    fn on_tick(&mut self, frame: &SpinFrame);
    fn on_settled(&mut self, selected: &RouletteItem);
}

/// Prints a tick mark per boundary crossing and the result on its own line.
#[derive(Debug, Default)]
pub struct TerminalFeedback;

impl SpinFeedback for TerminalFeedback {
    fn on_tick(&mut self, _frame: &SpinFrame) {
        print!("·");
        if let Err(err) = std::io::stdout().flush() {
            debug!("stdout flush failed: {}", err);
        }
    }

    fn on_settled(&mut self, selected: &RouletteItem) {
        println!();
        println!("🎯 {} ({})", selected.name, format_price(selected.price));
    }
}

/// Runs one spin to completion, one frame per `frame_interval`.
pub async fn run_spin<R, F>(
    game: &mut RouletteGame,
    rng: &mut R,
    frame_interval: Duration,
    feedback: &mut F,
) -> Result<RouletteItem, AppError>
where
    R: Rng + ?Sized,
    F: SpinFeedback + ?Sized,
{
    let clock = Instant::now();
    let plan = game.start_spin(clock.elapsed(), rng)?;
    debug!(
        "spinning {:.1} degrees over {} ms",
        plan.total_rotation,
        plan.duration.as_millis()
    );

    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        frames.tick().await;
        let frame = game.advance(clock.elapsed()).ok_or(AppError::SpinAborted)?;
        if frame.ticked {
            feedback.on_tick(&frame);
        }
        if let Some(selected) = frame.settled {
            feedback.on_settled(&selected);
            return Ok(selected);
        }
    }
}
