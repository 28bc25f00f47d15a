use shared::RouletteError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Roulette(#[from] RouletteError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
    #[error("the spin stopped without a result")]
    SpinAborted,
}

impl AppError {
    pub fn usage(message: impl Into<String>) -> Self {
        AppError::Usage(message.into())
    }
}
