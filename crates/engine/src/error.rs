//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] returned when a budget or expense amount is not > 0.
//! - [`InvalidName`] returned when a required text field is empty.
//! - [`InvalidPeriod`] returned when a period name is not recognised.
//! - [`MalformedPersistedData`] returned by the storage helpers when a stored
//!   payload cannot be decoded. Stores recover from it locally.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
//!  [`MalformedPersistedData`]: EngineError::MalformedPersistedData
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Malformed data under \"{key}\": {reason}")]
    MalformedPersistedData { key: String, reason: String },
    #[error(transparent)]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (
                Self::MalformedPersistedData { key: a, reason: ra },
                Self::MalformedPersistedData { key: b, reason: rb },
            ) => a == b && ra == rb,
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
