//! Registry: mints Season Ledgers and tracks them per creator.
//!
//! Ledgers are indexed by `(creator, sequence_id)`. A ledger is reachable only
//! under the identity that created it, so knowing a sequence id is not enough
//! to find somebody else's season.
//!
//! Removal is a capability check: the authenticated caller must *be* the
//! ledger stored under the key. Owners cannot remove their own entries
//! directly; they complete the season and the ledger deregisters itself.

use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EscrowConfig;
use crate::escrow::account::{AccountId, Amount, DEFAULT_UNITS_PER_COIN};
use crate::escrow::error::EscrowError;
use crate::escrow::events::{EscrowEvent, EventJournal};
use crate::escrow::season::{SeasonHandle, SeasonLedger, SeasonParams};
use crate::escrow::treasury::Treasury;

type LedgerKey = (AccountId, u64);

#[derive(Default)]
struct RegistryState {
    sequence_counter: u64,
    ledgers: HashMap<LedgerKey, SeasonHandle>,
}

pub(crate) struct RegistryCore {
    address: AccountId,
    units_per_coin: Amount,
    journal: EventJournal,
    treasury: Treasury,
    state: Mutex<RegistryState>,
}

/// Cheap-to-clone handle onto one registry.
#[derive(Clone)]
pub struct Registry {
    core: Arc<RegistryCore>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("address", &self.core.address)
            .field("sequence_counter", &self.get_sequence_counter())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Registry using the default 18-decimal denomination.
    pub fn new(address: AccountId) -> Self {
        Self::with_denomination(address, DEFAULT_UNITS_PER_COIN)
    }

    pub fn with_denomination(address: AccountId, units_per_coin: Amount) -> Self {
        Self::with_parts(address, units_per_coin, EventJournal::new(), Treasury::new())
    }

    pub fn with_parts(
        address: AccountId,
        units_per_coin: Amount,
        journal: EventJournal,
        treasury: Treasury,
    ) -> Self {
        Self {
            core: Arc::new(RegistryCore {
                address,
                units_per_coin,
                journal,
                treasury,
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    pub fn from_config(config: &EscrowConfig) -> Self {
        Self::with_denomination(config.registry_address(), Amount::from(config.units_per_coin))
    }

    pub(crate) fn from_core(core: Arc<RegistryCore>) -> Self {
        Self { core }
    }

    pub fn address(&self) -> AccountId {
        self.core.address
    }

    pub fn units_per_coin(&self) -> Amount {
        self.core.units_per_coin
    }

    pub fn journal(&self) -> EventJournal {
        self.core.journal.clone()
    }

    pub fn treasury(&self) -> Treasury {
        self.core.treasury.clone()
    }

    /// Open a new season owned by `caller` and register it under the next
    /// sequence id.
    pub fn create_ledger(
        &self,
        caller: &AccountId,
        stake_amount: Amount,
    ) -> Result<SeasonHandle, EscrowError> {
        if stake_amount == 0 {
            return Err(EscrowError::InvalidStake);
        }

        let mut state = self.core.state.lock();
        let sequence_id = state.sequence_counter;
        let next_counter = sequence_id
            .checked_add(1)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        let ledger = SeasonLedger::open(SeasonParams {
            address: self.core.address.derive_child(sequence_id),
            sequence_id,
            owner: *caller,
            stake_amount,
            units_per_coin: self.core.units_per_coin,
            registry: Arc::downgrade(&self.core),
            registry_address: self.core.address,
            journal: self.core.journal.clone(),
            treasury: self.core.treasury.clone(),
        })?;

        state.sequence_counter = next_counter;
        state.ledgers.insert((*caller, sequence_id), ledger.clone());

        self.core.journal.append(
            self.core.address,
            EscrowEvent::LedgerCreated {
                ledger: ledger.address(),
                creator: *caller,
                sequence_id,
            },
        );
        info!(
            ledger = %ledger.address(),
            creator = %caller,
            sequence_id,
            stake = stake_amount,
            "ledger created"
        );

        Ok(ledger)
    }

    /// Ledger created by `caller` under `sequence_id`.
    pub fn lookup_ledger(
        &self,
        caller: &AccountId,
        sequence_id: u64,
    ) -> Result<SeasonHandle, EscrowError> {
        self.core
            .state
            .lock()
            .ledgers
            .get(&(*caller, sequence_id))
            .cloned()
            .ok_or(EscrowError::NotFound {
                owner: *caller,
                sequence_id,
            })
    }

    pub fn get_stake(&self, caller: &AccountId, sequence_id: u64) -> Result<Amount, EscrowError> {
        self.lookup_ledger(caller, sequence_id)
            .map(|ledger| ledger.stake_amount())
    }

    /// Next sequence id to assign; also the count of ledgers ever created.
    pub fn get_sequence_counter(&self) -> u64 {
        self.core.state.lock().sequence_counter
    }

    /// The caller's own live ledgers, oldest first.
    pub fn ledgers_of(&self, caller: &AccountId) -> Vec<SeasonHandle> {
        let state = self.core.state.lock();
        let mut owned: Vec<SeasonHandle> = state
            .ledgers
            .iter()
            .filter(|((owner, _), _)| owner == caller)
            .map(|(_, ledger)| ledger.clone())
            .collect();
        owned.sort_by_key(|ledger| ledger.sequence_id());
        owned
    }

    /// Deregister the entry at `(claimed_owner, sequence_id)`.
    ///
    /// `caller` is the authenticated identity of whoever invokes this; it must
    /// be the ledger stored at that key.
    pub fn remove_ledger(
        &self,
        caller: &AccountId,
        claimed_owner: &AccountId,
        sequence_id: u64,
    ) -> Result<(), EscrowError> {
        self.remove_ledger_with(caller, claimed_owner, sequence_id, || {})
    }

    /// [`Registry::remove_ledger`] that runs `on_verified` after the
    /// capability check passes and before the entry is dropped, all under one
    /// acquisition of the registry lock. `on_verified` must not touch the
    /// registry.
    pub(crate) fn remove_ledger_with(
        &self,
        caller: &AccountId,
        claimed_owner: &AccountId,
        sequence_id: u64,
        on_verified: impl FnOnce(),
    ) -> Result<(), EscrowError> {
        let mut state = self.core.state.lock();
        match state.ledgers.entry((*claimed_owner, sequence_id)) {
            Entry::Occupied(entry) if entry.get().address() == *caller => {
                on_verified();
                let ledger = entry.remove();
                self.core.journal.append(
                    self.core.address,
                    EscrowEvent::LedgerRemoved {
                        ledger: ledger.address(),
                        sequence_id,
                        owner: *claimed_owner,
                    },
                );
                info!(
                    ledger = %ledger.address(),
                    owner = %claimed_owner,
                    sequence_id,
                    "ledger removed"
                );
                Ok(())
            }
            _ => {
                warn!(
                    caller = %caller,
                    owner = %claimed_owner,
                    sequence_id,
                    "rejected: removal not called by the registered ledger"
                );
                Err(EscrowError::MustBeCalledByLedger {
                    caller: *caller,
                    sequence_id,
                })
            }
        }
    }
}
