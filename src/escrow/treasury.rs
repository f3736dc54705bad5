//! Outbound value transfers.
//!
//! The treasury is the only way value leaves a ledger's custody. Crediting an
//! account never calls back into any ledger, so a transfer cannot re-enter
//! the operation that issued it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::escrow::account::{checked_add, AccountId, Amount};
use crate::escrow::error::EscrowError;

#[derive(Debug, Clone, Default)]
pub struct Treasury {
    received: Arc<Mutex<HashMap<AccountId, Amount>>>,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `to`. All-or-nothing: overflow leaves the balance as is.
    pub fn credit(&self, to: &AccountId, amount: Amount) -> Result<Amount, EscrowError> {
        let mut received = self.received.lock();
        let current = received.get(to).copied().unwrap_or(0);
        let updated = checked_add(current, amount)?;
        received.insert(*to, updated);
        debug!(account = %to, amount, total = updated, "treasury credit");
        Ok(updated)
    }

    /// Total value paid out to `account` so far.
    pub fn received(&self, account: &AccountId) -> Amount {
        self.received.lock().get(account).copied().unwrap_or(0)
    }
}
