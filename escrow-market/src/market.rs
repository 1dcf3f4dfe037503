//! Escrow engine - warranty item lifecycle and split settlement
//!
//! This module owns the `WarrantyItem` state machine: sellers list
//! items, buyers lock the exact asking price into escrow, and the buyer
//! alone finalizes by choosing how the locked balance splits between
//! seller payout and own refund. Every entry operation runs under the
//! item store's write lock, reproducing the serialized, all-or-nothing
//! execution the design assumes.

use crate::{
    asset::{AssetKind, Coin},
    error::MarketError,
    events::{EventLog, EventRecord, MarketEvent},
    ledger::SettlementLedger,
    models::{Address, ItemSnapshot, ItemStatus, WarrantyItem},
    MarketResult,
};
use serde::Serialize;
use std::{collections::HashMap, fmt, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Configuration for the marketplace
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Permit listings with a price of zero.
    ///
    /// A zero-price item needs no payment to lock, which is an edge the
    /// original design allows; deployments that consider it unintended
    /// can switch it off.
    pub allow_zero_price: bool,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            allow_zero_price: true,
        }
    }
}

impl MarketplaceConfig {
    /// Load configuration from `MARKET_`-prefixed environment variables,
    /// falling back to defaults
    pub fn from_env() -> MarketResult<Self> {
        let settings = config::Config::builder()
            .set_default("allow_zero_price", true)?
            .add_source(config::Environment::with_prefix("MARKET"))
            .build()?;

        Ok(Self {
            allow_zero_price: settings.get_bool("allow_zero_price")?,
        })
    }
}

/// Item listing request
#[derive(Debug, Clone)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Exact amount a locked payment must carry
    pub price: u64,
    pub seller: Address,
}

/// A rejected lock attempt, handing the untouched payment instrument
/// back to the caller so a failed call has zero effect.
pub struct RejectedPayment<K: AssetKind> {
    pub payment: Coin<K>,
    pub error: MarketError,
}

impl<K: AssetKind> fmt::Debug for RejectedPayment<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RejectedPayment")
            .field("payment", &self.payment)
            .field("error", &self.error)
            .finish()
    }
}

impl<K: AssetKind> RejectedPayment<K> {
    fn new(payment: Coin<K>, error: MarketError) -> Self {
        Self { payment, error }
    }

    pub fn into_parts(self) -> (Coin<K>, MarketError) {
        (self.payment, self.error)
    }
}

/// Outcome of a finalized item
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub item_id: Uuid,
    pub seller_amount: u64,
    pub buyer_refund: u64,
}

/// Main escrow engine coordinating the warranty item lifecycle
pub struct Marketplace<K: AssetKind> {
    /// Configuration
    config: MarketplaceConfig,
    /// In-memory item storage (in production, this would be a database)
    items: Arc<RwLock<HashMap<Uuid, WarrantyItem<K>>>>,
    /// Append-only audit trail
    events: EventLog,
    /// Settlement destination for disbursed balances
    ledger: Arc<dyn SettlementLedger<K>>,
}

impl<K: AssetKind> Marketplace<K> {
    /// Create a new marketplace backed by the given settlement ledger
    pub fn new(config: MarketplaceConfig, ledger: Arc<dyn SettlementLedger<K>>) -> Self {
        Self {
            config,
            items: Arc::new(RwLock::new(HashMap::new())),
            events: EventLog::new(),
            ledger,
        }
    }

    /// List a new warranty item.
    ///
    /// The item starts `Listed` with no buyer and an empty escrow
    /// balance, and becomes discoverable by any party through its id.
    pub async fn create_item(&self, request: CreateItemRequest) -> MarketResult<ItemSnapshot> {
        if request.price == 0 && !self.config.allow_zero_price {
            warn!(seller = %request.seller, "rejected zero-price listing");
            return Err(MarketError::ZeroPrice);
        }

        let item = WarrantyItem::new(
            request.name,
            request.description,
            request.image_url,
            request.price,
            request.seller,
        );
        let snapshot = item.snapshot();

        let mut items = self.items.write().await;
        items.insert(snapshot.id, item);
        self.events
            .append(MarketEvent::ItemCreated {
                item_id: snapshot.id,
                seller: snapshot.seller.clone(),
                name: snapshot.name.clone(),
                price: snapshot.price,
            })
            .await;

        info!(
            item_id = %snapshot.id,
            seller = %snapshot.seller,
            price = snapshot.price,
            "listed warranty item"
        );

        Ok(snapshot)
    }

    /// Lock a payment into an item's escrow.
    ///
    /// The payment must carry exactly the listed price; there is no
    /// overpayment tolerance and no change-giving. On any precondition
    /// failure the instrument is returned untouched inside
    /// [`RejectedPayment`]. On success the coin is fully consumed, the
    /// caller becomes the item's buyer for the rest of its lifetime,
    /// and the item moves to `Locked`.
    pub async fn lock_funds(
        &self,
        item_id: Uuid,
        payment: Coin<K>,
        caller: &Address,
    ) -> Result<(), RejectedPayment<K>> {
        let mut items = self.items.write().await;

        let item = match items.get_mut(&item_id) {
            Some(item) => item,
            None => {
                return Err(RejectedPayment::new(
                    payment,
                    MarketError::ItemNotFound(item_id),
                ))
            }
        };

        // A recorded buyer always outranks the status check so a second
        // lock attempt reports AlreadyLocked rather than InvalidStatus.
        if item.buyer().is_some() {
            warn!(item_id = %item_id, caller = %caller, "lock rejected: buyer already recorded");
            return Err(RejectedPayment::new(
                payment,
                MarketError::AlreadyLocked { item_id },
            ));
        }

        if !item.status().can_lock() {
            warn!(
                item_id = %item_id,
                status = ?item.status(),
                "lock rejected: item not listed"
            );
            return Err(RejectedPayment::new(
                payment,
                MarketError::invalid_status(item_id, ItemStatus::Listed, item.status()),
            ));
        }

        let amount = payment.value();
        if amount != item.price() {
            warn!(
                item_id = %item_id,
                expected = item.price(),
                actual = amount,
                "lock rejected: amount mismatch"
            );
            return Err(RejectedPayment::new(
                payment,
                MarketError::AmountMismatch {
                    expected: item.price(),
                    actual: amount,
                },
            ));
        }

        item.lock(payment.into_balance(), caller.clone());

        self.events
            .append(MarketEvent::FundsLocked {
                item_id,
                buyer: caller.clone(),
                amount,
            })
            .await;

        info!(item_id = %item_id, buyer = %caller, amount, "locked funds in escrow");

        Ok(())
    }

    /// Finalize an item, splitting the escrowed balance.
    ///
    /// Only the recorded buyer may call this; the split requires no
    /// seller counter-signature. `amount_for_seller` goes to the
    /// seller and the remainder is refunded to the buyer, leaving the
    /// escrow at exactly zero. The item then closes permanently.
    pub async fn finalize_and_split(
        &self,
        item_id: Uuid,
        amount_for_seller: u64,
        caller: &Address,
    ) -> MarketResult<Settlement> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&item_id)
            .ok_or(MarketError::ItemNotFound(item_id))?;

        if !item.status().can_finalize() {
            warn!(
                item_id = %item_id,
                status = ?item.status(),
                "finalize rejected: item not locked"
            );
            return Err(MarketError::invalid_status(
                item_id,
                ItemStatus::Locked,
                item.status(),
            ));
        }

        if item.buyer() != Some(caller) {
            warn!(item_id = %item_id, caller = %caller, "finalize rejected: caller is not the buyer");
            return Err(MarketError::NotBuyer { item_id });
        }

        let available = item.locked_value();
        if amount_for_seller > available {
            warn!(
                item_id = %item_id,
                requested = amount_for_seller,
                available,
                "finalize rejected: payout exceeds escrow"
            );
            return Err(MarketError::ExcessiveAmount {
                requested: amount_for_seller,
                available,
            });
        }

        let seller = item.seller().clone();
        let buyer = caller.clone();

        let mut pool = item.take_locked();
        let seller_cut = match pool.split(amount_for_seller) {
            Ok(cut) => cut,
            // The amount was validated against the pool; if the split
            // refuses anyway, put everything back untouched.
            Err(error) => {
                item.restore_locked(pool);
                return Err(error);
            }
        };
        let refund = pool.take_all();
        let buyer_refund = refund.value();

        if seller_cut.value() > 0 {
            self.ledger.deposit(&seller, seller_cut).await;
        }
        if buyer_refund > 0 {
            self.ledger.deposit(&buyer, refund).await;
        }

        item.complete();

        self.events
            .append(MarketEvent::ItemFinalized {
                item_id,
                seller_amount: amount_for_seller,
                buyer_refund,
            })
            .await;

        info!(
            item_id = %item_id,
            seller_amount = amount_for_seller,
            buyer_refund,
            "finalized item"
        );

        Ok(Settlement {
            item_id,
            seller_amount: amount_for_seller,
            buyer_refund,
        })
    }

    /// Get a read-only snapshot of an item
    pub async fn item(&self, item_id: Uuid) -> MarketResult<ItemSnapshot> {
        self.items
            .read()
            .await
            .get(&item_id)
            .map(WarrantyItem::snapshot)
            .ok_or(MarketError::ItemNotFound(item_id))
    }

    /// Current status of an item
    pub async fn status(&self, item_id: Uuid) -> MarketResult<ItemStatus> {
        Ok(self.item(item_id).await?.status)
    }

    /// Listed price of an item
    pub async fn price(&self, item_id: Uuid) -> MarketResult<u64> {
        Ok(self.item(item_id).await?.price)
    }

    /// Seller address of an item
    pub async fn seller(&self, item_id: Uuid) -> MarketResult<Address> {
        Ok(self.item(item_id).await?.seller)
    }

    /// Recorded buyer, if any
    pub async fn buyer(&self, item_id: Uuid) -> MarketResult<Option<Address>> {
        Ok(self.item(item_id).await?.buyer)
    }

    /// Value currently held in escrow for an item
    pub async fn locked_value(&self, item_id: Uuid) -> MarketResult<u64> {
        Ok(self.item(item_id).await?.locked_value)
    }

    /// Snapshots of every item ever listed
    pub async fn items(&self) -> Vec<ItemSnapshot> {
        self.items
            .read()
            .await
            .values()
            .map(WarrantyItem::snapshot)
            .collect()
    }

    /// Items where the address is the seller or the recorded buyer
    pub async fn items_for(&self, address: &Address) -> Vec<ItemSnapshot> {
        self.items
            .read()
            .await
            .values()
            .filter(|item| item.seller() == address || item.buyer() == Some(address))
            .map(WarrantyItem::snapshot)
            .collect()
    }

    /// Full audit trail in commit order
    pub async fn events(&self) -> Vec<EventRecord> {
        self.events.all().await
    }

    /// Audit trail for a single item
    pub async fn events_for_item(&self, item_id: Uuid) -> Vec<EventRecord> {
        self.events.for_item(item_id).await
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }
}
