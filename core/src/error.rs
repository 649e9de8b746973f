use thiserror::Error;

use crate::Cell;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid cell key: {0:?}")]
    InvalidCellKey(String),
    #[error("Malformed memento: {0}")]
    MalformedMemento(String),
    #[error("No cache is known at {0}")]
    UnknownCache(Cell),
    #[error("Storage failure: {0}")]
    Storage(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
