//! Lifecycle events for public auditability
//!
//! One event is recorded per successful operation; rejected operations
//! are never committed nor emitted. The append-only log is the sole
//! audit trail of the marketplace.

use crate::models::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Marketplace lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarketEvent {
    /// A seller listed a new item
    ItemCreated {
        item_id: Uuid,
        seller: Address,
        name: String,
        price: u64,
    },
    /// A buyer locked the exact asking price into escrow
    FundsLocked {
        item_id: Uuid,
        buyer: Address,
        amount: u64,
    },
    /// The buyer split the escrowed balance and closed the item
    ItemFinalized {
        item_id: Uuid,
        seller_amount: u64,
        buyer_refund: u64,
    },
}

impl MarketEvent {
    /// Identity of the item this event concerns
    pub fn item_id(&self) -> Uuid {
        match self {
            Self::ItemCreated { item_id, .. }
            | Self::FundsLocked { item_id, .. }
            | Self::ItemFinalized { item_id, .. } => *item_id,
        }
    }
}

/// A committed event with its position in the log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonically increasing sequence number
    pub seq: u64,
    /// Timestamp at commit (immutable)
    pub recorded_at: DateTime<Utc>,
    pub event: MarketEvent,
}

/// Append-only in-memory event log
#[derive(Debug, Default)]
pub struct EventLog {
    records: RwLock<Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number
    pub async fn append(&self, event: MarketEvent) -> u64 {
        let mut records = self.records.write().await;
        let seq = records.len() as u64;
        records.push(EventRecord {
            seq,
            recorded_at: Utc::now(),
            event,
        });
        seq
    }

    /// Full log in commit order
    pub async fn all(&self) -> Vec<EventRecord> {
        self.records.read().await.clone()
    }

    /// Events concerning a single item, in commit order
    pub async fn for_item(&self, item_id: Uuid) -> Vec<EventRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.event.item_id() == item_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
