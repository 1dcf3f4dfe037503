//! Fungible value types consumed by the escrow engine
//!
//! The engine never deals in raw integers when moving funds. Payments
//! arrive as a `Coin` (a consumable instrument carrying an exact value)
//! and are held as a `Balance`. Both are move-only so the compiler
//! enforces that value is transferred, never copied.

use crate::{error::MarketError, MarketResult};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for a fungible value kind.
///
/// Implementations carry no data; the type parameter keeps balances of
/// different assets from being mixed at compile time.
pub trait AssetKind: Send + Sync + 'static {
    /// Ticker-style symbol used in logs and snapshots
    const SYMBOL: &'static str;
}

/// A quantity of a fungible asset held by the engine.
///
/// Not `Clone`: a balance can only grow by joining another balance and
/// shrink by splitting one off, so value is conserved by construction.
#[must_use = "dropping a balance discards the value it carries"]
pub struct Balance<K: AssetKind> {
    value: u64,
    _kind: PhantomData<K>,
}

impl<K: AssetKind> Balance<K> {
    /// Create an empty balance
    pub fn zero() -> Self {
        Self {
            value: 0,
            _kind: PhantomData,
        }
    }

    /// Current value of this balance
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Absorb another balance into this one.
    ///
    /// The combined value must fit in `u64`; the engine only ever joins
    /// into an empty balance.
    pub fn join(&mut self, other: Balance<K>) {
        self.value += other.value;
    }

    /// Split off exactly `amount`, leaving the remainder in place
    pub fn split(&mut self, amount: u64) -> MarketResult<Balance<K>> {
        if amount > self.value {
            return Err(MarketError::ExcessiveAmount {
                requested: amount,
                available: self.value,
            });
        }
        self.value -= amount;
        Ok(Balance {
            value: amount,
            _kind: PhantomData,
        })
    }

    /// Drain the full value into a new balance, leaving zero behind
    pub fn take_all(&mut self) -> Balance<K> {
        Balance {
            value: std::mem::take(&mut self.value),
            _kind: PhantomData,
        }
    }
}

impl<K: AssetKind> fmt::Debug for Balance<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Balance")
            .field("value", &self.value)
            .field("asset", &K::SYMBOL)
            .finish()
    }
}

/// A consumable payment instrument for a specific, exact amount.
///
/// Locking funds consumes the coin entirely; there is no change-giving.
pub struct Coin<K: AssetKind> {
    balance: Balance<K>,
}

impl<K: AssetKind> Coin<K> {
    /// Mint a coin out of thin air.
    ///
    /// Stand-in for the external test-token faucet; production callers
    /// obtain coins from a real ledger.
    pub fn mint(value: u64) -> Self {
        Self {
            balance: Balance {
                value,
                _kind: PhantomData,
            },
        }
    }

    /// Exact value carried by this instrument
    pub fn value(&self) -> u64 {
        self.balance.value()
    }

    /// Convert into a balance, fully consuming the coin
    pub fn into_balance(self) -> Balance<K> {
        self.balance
    }
}

impl<K: AssetKind> fmt::Debug for Coin<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coin")
            .field("value", &self.balance.value)
            .field("asset", &K::SYMBOL)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Credits;

    impl AssetKind for Credits {
        const SYMBOL: &'static str = "CRED";
    }

    #[test]
    fn split_conserves_value() {
        let mut pool: Balance<Credits> = Coin::mint(1000).into_balance();

        let cut = pool.split(600).unwrap();
        assert_eq!(cut.value(), 600);
        assert_eq!(pool.value(), 400);
        assert_eq!(cut.value() + pool.value(), 1000);
    }

    #[test]
    fn split_beyond_available_fails() {
        let mut pool: Balance<Credits> = Coin::mint(500).into_balance();

        let err = pool.split(501).unwrap_err();
        match err {
            MarketError::ExcessiveAmount {
                requested,
                available,
            } => {
                assert_eq!(requested, 501);
                assert_eq!(available, 500);
            }
            other => panic!("expected ExcessiveAmount, got {other:?}"),
        }

        // Failed split leaves the pool untouched
        assert_eq!(pool.value(), 500);
    }

    #[test]
    fn join_and_take_all() {
        let mut pool: Balance<Credits> = Balance::zero();
        pool.join(Coin::mint(250).into_balance());
        pool.join(Coin::mint(250).into_balance());
        assert_eq!(pool.value(), 500);

        let drained = pool.take_all();
        assert_eq!(drained.value(), 500);
        assert_eq!(pool.value(), 0);
    }

    #[test]
    fn zero_coin_is_valid() {
        let coin: Coin<Credits> = Coin::mint(0);
        assert_eq!(coin.value(), 0);
        assert_eq!(coin.into_balance().value(), 0);
    }
}
