//! The module contains the errors the ledger can return.
//!
//! Validation failures of the engine are wrapped as [`Engine`]; everything the
//! ledger checks itself before touching the store has its own variant.
//!
//!  [`Engine`]: LedgerError::Engine
use engine::{EngineError, ParticipantId};
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
    #[error("Participant {0} is referenced by recorded expenses")]
    ParticipantInUse(ParticipantId),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Engine(a), Self::Engine(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidExpense(a), Self::InvalidExpense(b)) => a == b,
            (Self::ParticipantInUse(a), Self::ParticipantInUse(b)) => a == b,
            _ => false,
        }
    }
}
