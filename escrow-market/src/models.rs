//! Core data models for the escrow marketplace
//!
//! This module contains the warranty item state machine, caller
//! identities, and the read-only snapshot type the engine hands out.

use crate::asset::{AssetKind, Balance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Authenticated identity of a transaction sender
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new<S: Into<String>>(addr: S) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

impl From<String> for Address {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

/// Item state machine enum
///
/// Strictly forward-moving: `Listed -> Locked -> Completed`. No other
/// edge is reachable and no state ever reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Listed by the seller, awaiting a buyer
    Listed,
    /// Payment locked in escrow, awaiting buyer finalization
    Locked,
    /// Settled and closed; kept as a historical record
    Completed,
}

impl ItemStatus {
    /// Check if this state allows locking funds
    pub fn can_lock(&self) -> bool {
        matches!(self, Self::Listed)
    }

    /// Check if this state allows finalization
    pub fn can_finalize(&self) -> bool {
        matches!(self, Self::Locked)
    }

    /// Check if this is a terminal state (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A warranty item listed on the marketplace.
///
/// Fields are private: the engine is the sole authority permitted to
/// mutate status, buyer, and the locked balance. Everything else is
/// read-only after creation. Items are never destroyed; a completed
/// item persists indefinitely.
pub struct WarrantyItem<K: AssetKind> {
    id: Uuid,
    name: String,
    description: String,
    image_url: String,
    price: u64,
    status: ItemStatus,
    seller: Address,
    buyer: Option<Address>,
    locked: Balance<K>,
    created_at: DateTime<Utc>,
    locked_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl<K: AssetKind> WarrantyItem<K> {
    /// Create a new listed item with an empty escrow balance
    pub fn new(
        name: String,
        description: String,
        image_url: String,
        price: u64,
        seller: Address,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            image_url,
            price,
            status: ItemStatus::Listed,
            seller,
            buyer: None,
            locked: Balance::zero(),
            created_at: Utc::now(),
            locked_at: None,
            completed_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn seller(&self) -> &Address {
        &self.seller
    }

    pub fn buyer(&self) -> Option<&Address> {
        self.buyer.as_ref()
    }

    /// Value currently held in escrow for this item
    pub fn locked_value(&self) -> u64 {
        self.locked.value()
    }

    /// Move the payment into escrow and record the buyer.
    ///
    /// Caller must have validated status, buyer absence, and the exact
    /// amount; this only commits the transition.
    pub(crate) fn lock(&mut self, funds: Balance<K>, buyer: Address) {
        debug_assert!(self.status.can_lock());
        debug_assert!(self.buyer.is_none());
        self.locked.join(funds);
        self.buyer = Some(buyer);
        self.status = ItemStatus::Locked;
        self.locked_at = Some(Utc::now());
    }

    /// Drain the escrowed balance for settlement
    pub(crate) fn take_locked(&mut self) -> Balance<K> {
        self.locked.take_all()
    }

    /// Return a drained balance to escrow after an aborted settlement
    pub(crate) fn restore_locked(&mut self, funds: Balance<K>) {
        self.locked.join(funds);
    }

    /// Close the item after full disbursement
    pub(crate) fn complete(&mut self) {
        debug_assert_eq!(self.locked.value(), 0);
        self.status = ItemStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Read-only projection of current state
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            asset: K::SYMBOL.to_string(),
            status: self.status,
            seller: self.seller.clone(),
            buyer: self.buyer.clone(),
            locked_value: self.locked.value(),
            created_at: self.created_at,
            locked_at: self.locked_at,
            completed_at: self.completed_at,
        }
    }
}

/// Cloneable view of a warranty item; the escrowed balance itself never
/// leaves the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: u64,
    pub asset: String,
    pub status: ItemStatus,
    pub seller: Address,
    pub buyer: Option<Address>,
    pub locked_value: u64,
    pub created_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Coin;

    struct Credits;

    impl AssetKind for Credits {
        const SYMBOL: &'static str = "CRED";
    }

    fn listed_item(price: u64) -> WarrantyItem<Credits> {
        WarrantyItem::new(
            "Blender".to_string(),
            "Two-year warranty".to_string(),
            "https://example.com/blender.png".to_string(),
            price,
            Address::from("seller"),
        )
    }

    #[test]
    fn status_helpers() {
        assert!(ItemStatus::Listed.can_lock());
        assert!(!ItemStatus::Listed.can_finalize());
        assert!(ItemStatus::Locked.can_finalize());
        assert!(!ItemStatus::Locked.can_lock());
        assert!(ItemStatus::Completed.is_terminal());
        assert!(!ItemStatus::Completed.can_lock());
        assert!(!ItemStatus::Completed.can_finalize());
    }

    #[test]
    fn new_item_is_listed_with_empty_escrow() {
        let item = listed_item(1000);

        assert_eq!(item.status(), ItemStatus::Listed);
        assert_eq!(item.price(), 1000);
        assert!(item.buyer().is_none());
        assert_eq!(item.locked_value(), 0);
        assert_eq!(item.seller().as_str(), "seller");
    }

    #[test]
    fn lock_records_buyer_and_full_price() {
        let mut item = listed_item(1000);

        item.lock(Coin::mint(1000).into_balance(), Address::from("buyer"));

        assert_eq!(item.status(), ItemStatus::Locked);
        assert_eq!(item.locked_value(), 1000);
        assert_eq!(item.buyer().map(Address::as_str), Some("buyer"));
        assert!(item.snapshot().locked_at.is_some());
    }

    #[test]
    fn complete_empties_escrow() {
        let mut item = listed_item(500);
        item.lock(Coin::mint(500).into_balance(), Address::from("buyer"));

        let pool = item.take_locked();
        assert_eq!(pool.value(), 500);
        item.complete();

        assert_eq!(item.status(), ItemStatus::Completed);
        assert_eq!(item.locked_value(), 0);
        // Buyer stays on record after completion
        assert!(item.buyer().is_some());
    }

    #[test]
    fn snapshot_reflects_item() {
        let item = listed_item(750);
        let snapshot = item.snapshot();

        assert_eq!(snapshot.id, item.id());
        assert_eq!(snapshot.price, 750);
        assert_eq!(snapshot.asset, "CRED");
        assert_eq!(snapshot.status, ItemStatus::Listed);
        assert_eq!(snapshot.locked_value, 0);
    }
}
