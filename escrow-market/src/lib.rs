//! Buyer-settled escrow marketplace for physical goods
//!
//! This crate implements the escrow state machine for warranty items:
//! - Sellers list an item at an exact asking price
//! - A buyer locks a payment instrument matching that price into escrow
//! - The buyer alone finalizes, splitting the locked balance between a
//!   seller payout and an automatic refund to themselves
//!
//! Value is conserved through every settlement (payout plus refund
//! always equals the locked balance exactly) and every successful
//! operation is recorded in an append-only event log, which is the
//! system's sole audit trail.
//!
//! Known gap, by original design: a locked item never expires. A buyer
//! who never finalizes leaves the funds and the seller's goods stranded
//! in `Locked` with no recovery path.

pub mod asset;
pub mod error;
pub mod events;
pub mod ledger;
pub mod market;
pub mod models;

use error::MarketError;

/// Result type alias for marketplace operations
pub type MarketResult<T> = Result<T, MarketError>;
