//! Error types for the escrow marketplace
//!
//! Every failure is a precondition violation detected before any state
//! mutation; a rejected operation has zero effect and emits no event.

use crate::models::ItemStatus;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for marketplace operations
#[derive(Error, Debug)]
pub enum MarketError {
    /// Operation attempted against an item not in the required state
    #[error("item {item_id} is {actual:?}, operation requires {expected:?}")]
    InvalidStatus {
        item_id: Uuid,
        expected: ItemStatus,
        actual: ItemStatus,
    },

    /// Lock attempted on an item that already has a buyer
    #[error("item {item_id} already has a buyer")]
    AlreadyLocked { item_id: Uuid },

    /// Locked payment differs from the listed price
    #[error("payment of {actual} does not match listed price {expected}")]
    AmountMismatch { expected: u64, actual: u64 },

    /// Finalize attempted by anyone other than the recorded buyer
    #[error("caller is not the recorded buyer of item {item_id}")]
    NotBuyer { item_id: Uuid },

    /// Requested seller payout exceeds the locked balance
    #[error("requested {requested} exceeds available balance of {available}")]
    ExcessiveAmount { requested: u64, available: u64 },

    /// No item with this identity exists
    #[error("item {0} not found")]
    ItemNotFound(Uuid),

    /// Zero-price listings are disabled by configuration
    #[error("zero-price listings are disabled")]
    ZeroPrice,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl MarketError {
    /// Create an invalid-status error
    pub fn invalid_status(item_id: Uuid, expected: ItemStatus, actual: ItemStatus) -> Self {
        Self::InvalidStatus {
            item_id,
            expected,
            actual,
        }
    }
}
