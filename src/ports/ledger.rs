//! Ledger port - The external balance store.
//!
//! The engine never touches money. The play handler consults this port to
//! check affordability and to apply the balance change implied by the
//! accounting outcome. Production deployments back it with the account
//! database; the in-memory adapter serves tests and the soak binary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, EntityId};

/// Balance of one account, in minor currency units (cents).
///
/// Accounts carry two buckets: the deposited wallet and the running
/// in-game balance. Play results adjust `current_balance` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub wallet_balance: i64,
    pub current_balance: i64,
}

impl Balance {
    /// Creates a balance from its two buckets.
    pub fn new(wallet_balance: i64, current_balance: i64) -> Self {
        Self {
            wallet_balance,
            current_balance,
        }
    }

    /// Spendable total across both buckets.
    pub fn total(&self) -> i64 {
        self.wallet_balance + self.current_balance
    }
}

/// Port for reading and adjusting account balances.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Returns the current balance for an entity.
    ///
    /// # Errors
    ///
    /// - `EntityNotFound` if the ledger has no account for the entity
    /// - `LedgerError` on storage failure
    async fn balance(&self, entity_id: &EntityId) -> Result<Balance, DomainError>;

    /// Adds `delta` (which may be negative) to the current balance and
    /// returns the resulting balance.
    ///
    /// # Errors
    ///
    /// - `EntityNotFound` if the ledger has no account for the entity
    /// - `InsufficientBalance` if the change would make the total negative
    /// - `LedgerError` on storage failure
    async fn apply(&self, entity_id: &EntityId, delta: i64) -> Result<Balance, DomainError>;
}
