//! Settlement ledger collaborator
//!
//! Finalization hands disbursed balances to a ledger that credits the
//! recipient. The ledger shares the engine's atomic execution scope:
//! once the engine drains escrow, every credit lands. The signature is
//! deliberately infallible so no implementation can strand or destroy
//! a balance mid-settlement.

use crate::{
    asset::{AssetKind, Balance},
    models::Address,
};
use async_trait::async_trait;
use std::{collections::HashMap, marker::PhantomData, sync::Arc};
use tokio::sync::RwLock;
use tracing::info;

/// Destination for value leaving escrow
#[async_trait]
pub trait SettlementLedger<K: AssetKind>: Send + Sync {
    /// Credit `funds` to `recipient`, consuming the balance
    async fn deposit(&self, recipient: &Address, funds: Balance<K>);
}

/// In-memory ledger recording credited totals per address.
///
/// Used by tests and demos; production deployments plug in a real
/// fungible-token ledger.
pub struct InMemoryLedger<K: AssetKind> {
    accounts: Arc<RwLock<HashMap<Address, u64>>>,
    _kind: PhantomData<K>,
}

impl<K: AssetKind> InMemoryLedger<K> {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            _kind: PhantomData,
        }
    }

    /// Total credited to an address so far (zero for unknown addresses)
    pub async fn balance_of(&self, address: &Address) -> u64 {
        self.accounts
            .read()
            .await
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all credited value
    pub async fn total(&self) -> u64 {
        self.accounts.read().await.values().sum()
    }
}

impl<K: AssetKind> Default for InMemoryLedger<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: AssetKind> SettlementLedger<K> for InMemoryLedger<K> {
    async fn deposit(&self, recipient: &Address, funds: Balance<K>) {
        let amount = funds.value();
        let mut accounts = self.accounts.write().await;
        *accounts.entry(recipient.clone()).or_insert(0) += amount;

        info!(recipient = %recipient, amount, asset = K::SYMBOL, "credited settlement");
    }
}
