//! The module contains the error the engine can throw.
//!
//! The errors are grouped the way the host maps them to responses:
//! validation ([`InvalidAmount`], [`InvalidInput`], [`InvalidId`]), conflicts
//! ([`ExistingKey`], [`AlreadyVoided`], [`StaleSettlement`]), lookups
//! ([`KeyNotFound`]) and authorization ([`Forbidden`]).
//!
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`InvalidInput`]: EngineError::InvalidInput
//! [`InvalidId`]: EngineError::InvalidId
//! [`ExistingKey`]: EngineError::ExistingKey
//! [`AlreadyVoided`]: EngineError::AlreadyVoided
//! [`StaleSettlement`]: EngineError::StaleSettlement
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`Forbidden`]: EngineError::Forbidden
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// Non-monetary validation failure (blank name, self-targeting admin
    /// action, ambiguous lookup).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Already voided: {0}")]
    AlreadyVoided(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Stale settlement: {0}")]
    StaleSettlement(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::AlreadyVoided(a), Self::AlreadyVoided(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::StaleSettlement(a), Self::StaleSettlement(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
