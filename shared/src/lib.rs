pub mod constants;
pub mod error;
pub mod item;
pub mod palette;
pub mod roulette_game;
pub mod spin_resolver;
pub mod validation;
pub mod weight_engine;
pub mod wheel_session;

pub use error::RouletteError;
pub use item::{ItemUpdate, NewItem, RouletteItem};
pub use roulette_game::{format_price, GameStatus, RouletteGame, RouletteSettings};
pub use spin_resolver::{
    compute_boundaries, compute_sectors, crossed_boundary, select_item_by_rotation, TickTracker,
    WheelSector,
};
pub use weight_engine::{compute_weights, WeightMode};
pub use wheel_session::{SpinFrame, SpinPhase, SpinPlan, WheelSession};
