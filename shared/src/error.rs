use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouletteError {
    #[error("invalid item: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("no item with id {0}")]
    ItemNotFound(String),
    #[error("the wheel is already spinning")]
    SpinInProgress,
    #[error("acknowledge the current result before spinning again")]
    AwaitingAcknowledgement,
    #[error("need at least {required} item(s) to spin, have {available}")]
    NotEnoughItems { required: usize, available: usize },
    #[error("there is no result to acknowledge")]
    NoResult,
}
