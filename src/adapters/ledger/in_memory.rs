//! In-Memory Ledger Adapter
//!
//! Holds account balances in memory. Useful for testing and the soak
//! simulation; production deployments use the account database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EntityId, ErrorCode};
use crate::ports::{Balance, Ledger};

/// In-memory account store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    accounts: Arc<RwLock<HashMap<EntityId, Balance>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or replaces) an account with the given balance.
    pub async fn open_account(&self, entity_id: EntityId, balance: Balance) {
        self.accounts.write().await.insert(entity_id, balance);
    }

    /// Makes every subsequent `apply` fail with `LedgerError` (test helper).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Get the number of open accounts
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Sum of every account's total balance.
    pub async fn total_holdings(&self) -> i64 {
        self.accounts.read().await.values().map(Balance::total).sum()
    }

    fn not_found(entity_id: &EntityId) -> DomainError {
        DomainError::new(ErrorCode::EntityNotFound, "No account for entity")
            .with_detail("entity_id", entity_id.to_string())
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn balance(&self, entity_id: &EntityId) -> Result<Balance, DomainError> {
        let accounts = self.accounts.read().await;
        accounts
            .get(entity_id)
            .copied()
            .ok_or_else(|| Self::not_found(entity_id))
    }

    async fn apply(&self, entity_id: &EntityId, delta: i64) -> Result<Balance, DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::LedgerError,
                "Ledger writes are unavailable",
            ));
        }

        let mut accounts = self.accounts.write().await;
        let balance = accounts
            .get_mut(entity_id)
            .ok_or_else(|| Self::not_found(entity_id))?;

        let updated = Balance::new(
            balance.wallet_balance,
            balance.current_balance.saturating_add(delta),
        );
        if updated.total() < 0 {
            return Err(DomainError::new(
                ErrorCode::InsufficientBalance,
                "Balance change would overdraw the account",
            )
            .with_detail("delta", delta.to_string()));
        }

        *balance = updated;
        Ok(updated)
    }
}
