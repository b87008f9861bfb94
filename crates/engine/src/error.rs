//! The module contains the errors the engine can return.
//!
//! Every variant is a local validation failure detected before any output is
//! produced:
//!
//! - [`AmountMismatch`] when exact per-participant amounts do not add up.
//! - [`InvalidPercentage`] / [`InvalidShares`] when the weights cannot be used.
//! - [`UnassignedItem`] when a priced line item has nobody assigned.
//! - [`ImbalancedLedger`] when persisted expenses and splits do not net to zero.
//! - [`InvalidAmount`] for malformed or negative amounts, and for sums that
//!   leave the `i64` cents range.
//!
//!  [`AmountMismatch`]: EngineError::AmountMismatch
//!  [`InvalidPercentage`]: EngineError::InvalidPercentage
//!  [`InvalidShares`]: EngineError::InvalidShares
//!  [`UnassignedItem`]: EngineError::UnassignedItem
//!  [`ImbalancedLedger`]: EngineError::ImbalancedLedger
//!  [`InvalidAmount`]: EngineError::InvalidAmount
use thiserror::Error;

use crate::{MoneyCents, ParticipantId};

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Amounts ({sum}) do not sum to total ({total})")]
    AmountMismatch { total: MoneyCents, sum: MoneyCents },
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(String),
    #[error("Invalid shares: {0}")]
    InvalidShares(String),
    #[error("Item \"{0}\" has no assigned participants")]
    UnassignedItem(String),
    #[error("Net balance must sum to 0, got {net}")]
    ImbalancedLedger { net: MoneyCents },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Participant {0} listed more than once")]
    DuplicateParticipant(ParticipantId),
}
