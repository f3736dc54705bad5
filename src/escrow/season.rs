//! Season Ledger: escrow for a single competition.
//!
//! A ledger custodies the stakes of its admitted members, lets the owner
//! allocate the pool as winnings, and pays winnings out on withdrawal.
//!
//! # Invariants
//!
//! 1. **Custody**: `pool_balance + Σ pending_winnings <= held_funds`
//! 2. **Write-once payment**: an account never goes from paid to unpaid
//! 3. **Owner admitted**: the owner is on the admission list from construction
//! 4. **Terminal completion**: `is_complete` flips once and never back
//!
//! Every operation runs under the ledger's book lock, validates everything it
//! needs with checked arithmetic, and only then commits. A failed call leaves
//! the book untouched and emits nothing.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{info, warn};

use crate::escrow::account::{amount_str, checked_add, checked_sub, min_tip, AccountId, Amount};
use crate::escrow::error::EscrowError;
use crate::escrow::events::{EscrowEvent, EventJournal};
use crate::escrow::registry::{Registry, RegistryCore};
use crate::escrow::treasury::Treasury;

/// Shared handle to a ledger. Clones refer to the same escrow.
pub type SeasonHandle = Arc<SeasonLedger>;

// =============================================================================
// REPORTS
// =============================================================================

/// Snapshot of the custody invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyReport {
    #[serde(with = "amount_str")]
    pub pool_balance: Amount,
    #[serde(with = "amount_str")]
    pub pending_total: Amount,
    #[serde(with = "amount_str")]
    pub held_funds: Amount,
}

impl CustodyReport {
    /// Never promise more than is custodied.
    pub fn is_conserved(&self) -> bool {
        self.pool_balance
            .checked_add(self.pending_total)
            .map_or(false, |promised| promised <= self.held_funds)
    }
}

/// Caller-facing view of a season, as a display client would render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub sequence_id: u64,
    pub ledger: AccountId,
    pub owner: AccountId,
    #[serde(with = "amount_str")]
    pub stake_amount: Amount,
    #[serde(with = "amount_str")]
    pub pool_balance: Amount,
    #[serde(with = "amount_str")]
    pub held_funds: Amount,
    pub member_count: usize,
    pub caller_admitted: bool,
    pub caller_paid: bool,
    #[serde(with = "amount_str")]
    pub caller_pending: Amount,
    pub is_complete: bool,
}

// =============================================================================
// BOOK
// =============================================================================

#[derive(Debug, Default)]
struct SeasonBook {
    admitted: HashSet<AccountId>,
    /// Admission order, for listing.
    members: Vec<AccountId>,
    paid: HashSet<AccountId>,
    pending: HashMap<AccountId, Amount>,
    pool_balance: Amount,
    held_funds: Amount,
    is_complete: bool,
}

impl SeasonBook {
    fn pending_of(&self, account: &AccountId) -> Amount {
        self.pending.get(account).copied().unwrap_or(0)
    }

    fn custody(&self) -> CustodyReport {
        CustodyReport {
            pool_balance: self.pool_balance,
            pending_total: self
                .pending
                .values()
                .fold(0, |acc: Amount, v| acc.saturating_add(*v)),
            held_funds: self.held_funds,
        }
    }

    fn require_admitted(&self, account: &AccountId) -> Result<(), EscrowError> {
        if self.admitted.contains(account) {
            Ok(())
        } else {
            Err(EscrowError::NotAdmitted { account: *account })
        }
    }

    fn require_open(&self) -> Result<(), EscrowError> {
        if self.is_complete {
            Err(EscrowError::AlreadyComplete)
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Construction parameters, assembled by the registry.
pub(crate) struct SeasonParams {
    pub address: AccountId,
    pub sequence_id: u64,
    pub owner: AccountId,
    pub stake_amount: Amount,
    pub units_per_coin: Amount,
    pub registry: Weak<RegistryCore>,
    pub registry_address: AccountId,
    pub journal: EventJournal,
    pub treasury: Treasury,
}

pub struct SeasonLedger {
    address: AccountId,
    sequence_id: u64,
    owner: AccountId,
    stake_amount: Amount,
    min_tip: Amount,
    registry: Weak<RegistryCore>,
    registry_address: AccountId,
    journal: EventJournal,
    treasury: Treasury,
    book: Mutex<SeasonBook>,
}

impl std::fmt::Debug for SeasonLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeasonLedger")
            .field("address", &self.address)
            .field("sequence_id", &self.sequence_id)
            .field("owner", &self.owner)
            .field("stake_amount", &self.stake_amount)
            .finish_non_exhaustive()
    }
}

impl SeasonLedger {
    /// Open a new season with the owner as its first admitted member.
    pub(crate) fn open(params: SeasonParams) -> Result<SeasonHandle, EscrowError> {
        if params.stake_amount == 0 {
            return Err(EscrowError::InvalidStake);
        }

        let mut book = SeasonBook::default();
        book.admitted.insert(params.owner);
        book.members.push(params.owner);

        let ledger = Arc::new(Self {
            address: params.address,
            sequence_id: params.sequence_id,
            owner: params.owner,
            stake_amount: params.stake_amount,
            min_tip: min_tip(params.units_per_coin),
            registry: params.registry,
            registry_address: params.registry_address,
            journal: params.journal,
            treasury: params.treasury,
            book: Mutex::new(book),
        });

        ledger.emit(EscrowEvent::SeasonStarted {
            sequence_id: ledger.sequence_id,
            owner: ledger.owner,
        });
        ledger.emit(EscrowEvent::Admitted {
            sequence_id: ledger.sequence_id,
            account: ledger.owner,
        });
        info!(
            season = ledger.sequence_id,
            ledger = %ledger.address,
            owner = %ledger.owner,
            stake = ledger.stake_amount,
            "season started"
        );

        Ok(ledger)
    }

    fn emit(&self, event: EscrowEvent) {
        self.journal.append(self.address, event);
    }

    fn require_owner(&self, caller: &AccountId, action: &'static str) -> Result<(), EscrowError> {
        if caller == &self.owner {
            return Ok(());
        }
        warn!(
            season = self.sequence_id,
            caller = %caller,
            action,
            "rejected: caller is not the owner"
        );
        Err(EscrowError::NotOwner { caller: *caller })
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Owner adds `target` to the admission list. Admission is permanent.
    pub fn admit(&self, caller: &AccountId, target: &AccountId) -> Result<(), EscrowError> {
        self.require_owner(caller, "admit")?;
        let mut book = self.book.lock();
        book.require_open()?;
        if book.admitted.contains(target) {
            return Err(EscrowError::AlreadyAdmitted { account: *target });
        }

        book.admitted.insert(*target);
        book.members.push(*target);
        self.emit(EscrowEvent::Admitted {
            sequence_id: self.sequence_id,
            account: *target,
        });
        info!(season = self.sequence_id, account = %target, "member admitted");
        Ok(())
    }

    /// Deposit the fixed stake.
    ///
    /// `declared_amount` is what the caller says it is paying and
    /// `transferred_amount` is the value that actually arrived with the call.
    /// Both must equal the stake.
    pub fn deposit_stake(
        &self,
        caller: &AccountId,
        declared_amount: Amount,
        transferred_amount: Amount,
    ) -> Result<(), EscrowError> {
        let mut book = self.book.lock();
        book.require_admitted(caller)?;
        book.require_open()?;
        if book.paid.contains(caller) {
            return Err(EscrowError::AlreadyPaid { account: *caller });
        }
        if declared_amount != self.stake_amount || transferred_amount != self.stake_amount {
            return Err(EscrowError::WrongAmount {
                expected: self.stake_amount,
                declared: declared_amount,
                transferred: transferred_amount,
            });
        }

        let pool_balance = checked_add(book.pool_balance, self.stake_amount)?;
        let held_funds = checked_add(book.held_funds, self.stake_amount)?;

        book.paid.insert(*caller);
        book.pool_balance = pool_balance;
        book.held_funds = held_funds;
        debug_assert!(book.custody().is_conserved());

        self.emit(EscrowEvent::StakePaid {
            account: *caller,
            amount: self.stake_amount,
        });
        info!(
            season = self.sequence_id,
            account = %caller,
            amount = self.stake_amount,
            pool = pool_balance,
            "stake paid"
        );
        Ok(())
    }

    /// Owner moves `amount` from the pool to `target`'s pending winnings.
    /// Repeated allocations to the same target accumulate.
    pub fn allocate_winnings(
        &self,
        caller: &AccountId,
        target: &AccountId,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.require_owner(caller, "allocate_winnings")?;
        let mut book = self.book.lock();
        book.require_admitted(target)?;
        book.require_open()?;
        if !book.paid.contains(target) {
            return Err(EscrowError::StakeNotPaid { account: *target });
        }
        if amount > book.pool_balance {
            return Err(EscrowError::InsufficientPool {
                requested: amount,
                available: book.pool_balance,
            });
        }

        let pool_balance = checked_sub(book.pool_balance, amount)?;
        let pending = checked_add(book.pending_of(target), amount)?;

        book.pool_balance = pool_balance;
        book.pending.insert(*target, pending);
        debug_assert!(book.custody().is_conserved());

        self.emit(EscrowEvent::WinningsAllocated {
            account: *target,
            amount,
        });
        info!(
            season = self.sequence_id,
            account = %target,
            amount,
            pending,
            pool = pool_balance,
            "winnings allocated"
        );
        Ok(())
    }

    /// Pay the caller's pending winnings out of custody.
    ///
    /// The owed amount is zeroed before the transfer is issued; if the transfer
    /// is refused the book is restored and nothing is emitted.
    pub fn withdraw(&self, caller: &AccountId) -> Result<Amount, EscrowError> {
        let mut book = self.book.lock();
        book.require_admitted(caller)?;
        let amount = book.pending_of(caller);
        if amount == 0 {
            return Err(EscrowError::NothingToWithdraw { account: *caller });
        }
        let held_before = book.held_funds;
        let held_funds = checked_sub(held_before, amount)?;

        book.pending.remove(caller);
        book.held_funds = held_funds;

        if let Err(e) = self.treasury.credit(caller, amount) {
            book.pending.insert(*caller, amount);
            book.held_funds = held_before;
            return Err(e);
        }
        debug_assert!(book.custody().is_conserved());

        self.emit(EscrowEvent::Withdrawal {
            account: *caller,
            amount,
        });
        info!(
            season = self.sequence_id,
            account = %caller,
            amount,
            held = held_funds,
            "winnings withdrawn"
        );
        Ok(amount)
    }

    /// Forward a tip straight to the owner. The pool and custody are untouched.
    pub fn tip_owner(&self, caller: &AccountId, amount: Amount) -> Result<(), EscrowError> {
        let book = self.book.lock();
        book.require_admitted(caller)?;
        book.require_open()?;
        if amount < self.min_tip {
            return Err(EscrowError::TipTooSmall {
                amount,
                minimum: self.min_tip,
            });
        }

        self.treasury.credit(&self.owner, amount)?;
        self.emit(EscrowEvent::Tip {
            account: *caller,
            amount,
        });
        info!(
            season = self.sequence_id,
            account = %caller,
            owner = %self.owner,
            amount,
            "owner tipped"
        );
        Ok(())
    }

    /// Close the season and deregister it from the registry.
    ///
    /// Requires an empty pool and nothing left in custody.
    pub fn complete(&self, caller: &AccountId) -> Result<(), EscrowError> {
        self.require_owner(caller, "complete")?;
        let mut book = self.book.lock();
        book.require_open()?;
        if book.pool_balance != 0 || book.held_funds != 0 {
            return Err(EscrowError::SettlementPending {
                pool_balance: book.pool_balance,
                held_funds: book.held_funds,
            });
        }

        let registry = self
            .registry()
            .ok_or(EscrowError::RegistryUnavailable)?;
        // Completion commits only once the registry accepts the removal.
        registry.remove_ledger_with(&self.address, &self.owner, self.sequence_id, || {
            book.is_complete = true;
            self.emit(EscrowEvent::SeasonCompleted {
                sequence_id: self.sequence_id,
                owner: self.owner,
            });
        })?;
        info!(season = self.sequence_id, owner = %self.owner, "season completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    pub fn stake_amount(&self) -> Amount {
        self.stake_amount
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn min_tip(&self) -> Amount {
        self.min_tip
    }

    pub fn registry_address(&self) -> AccountId {
        self.registry_address
    }

    /// The registry that minted this ledger, while it is still alive.
    pub fn registry(&self) -> Option<Registry> {
        self.registry.upgrade().map(Registry::from_core)
    }

    pub fn is_admitted(&self, account: &AccountId) -> bool {
        self.book.lock().admitted.contains(account)
    }

    pub fn has_paid(&self, account: &AccountId) -> bool {
        self.book.lock().paid.contains(account)
    }

    pub fn pool_balance(&self) -> Amount {
        self.book.lock().pool_balance
    }

    /// The caller's own pending winnings.
    pub fn pending_winnings(&self, caller: &AccountId) -> Amount {
        self.book.lock().pending_of(caller)
    }

    pub fn held_funds(&self) -> Amount {
        self.book.lock().held_funds
    }

    pub fn is_complete(&self) -> bool {
        self.book.lock().is_complete
    }

    /// Admitted accounts in admission order.
    pub fn members(&self) -> Vec<AccountId> {
        self.book.lock().members.clone()
    }

    pub fn custody(&self) -> CustodyReport {
        self.book.lock().custody()
    }

    pub fn summary(&self, caller: &AccountId) -> SeasonSummary {
        let book = self.book.lock();
        SeasonSummary {
            sequence_id: self.sequence_id,
            ledger: self.address,
            owner: self.owner,
            stake_amount: self.stake_amount,
            pool_balance: book.pool_balance,
            held_funds: book.held_funds,
            member_count: book.members.len(),
            caller_admitted: book.admitted.contains(caller),
            caller_paid: book.paid.contains(caller),
            caller_pending: book.pending_of(caller),
            is_complete: book.is_complete,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const STAKE: Amount = 100;
    const COIN: Amount = 1_000_000;

    fn id(seed: &str) -> AccountId {
        AccountId::from_seed(seed)
    }

    fn setup() -> (Registry, SeasonHandle, AccountId) {
        let registry = Registry::with_denomination(id("registry"), COIN);
        let owner = id("owner");
        let season = registry.create_ledger(&owner, STAKE).unwrap();
        (registry, season, owner)
    }

    #[test]
    fn test_open_rejects_zero_stake() {
        let registry = Registry::with_denomination(id("registry"), COIN);
        let params = SeasonParams {
            address: id("ledger"),
            sequence_id: 0,
            owner: id("owner"),
            stake_amount: 0,
            units_per_coin: COIN,
            registry: Weak::new(),
            registry_address: registry.address(),
            journal: registry.journal(),
            treasury: registry.treasury(),
        };
        assert_eq!(SeasonLedger::open(params).unwrap_err(), EscrowError::InvalidStake);
        assert!(registry.journal().is_empty());
    }

    #[test]
    fn test_owner_is_admitted_at_construction() {
        let (registry, season, owner) = setup();
        assert!(season.is_admitted(&owner));
        assert!(!season.has_paid(&owner));
        assert_eq!(season.members(), vec![owner]);
        assert!(!season.is_complete());
        assert_eq!(season.registry_address(), registry.address());

        let kinds: Vec<_> = registry
            .journal()
            .emitted_by(&season.address())
            .iter()
            .map(|r| r.event.name())
            .collect();
        assert_eq!(kinds, vec!["season_started", "admitted"]);
    }

    #[test]
    fn test_admit_requires_owner_and_rejects_duplicates() {
        let (_registry, season, owner) = setup();
        let alice = id("alice");

        assert_eq!(
            season.admit(&alice, &alice),
            Err(EscrowError::NotOwner { caller: alice })
        );
        season.admit(&owner, &alice).unwrap();
        assert_eq!(
            season.admit(&owner, &alice),
            Err(EscrowError::AlreadyAdmitted { account: alice })
        );
        assert_eq!(
            season.admit(&owner, &owner),
            Err(EscrowError::AlreadyAdmitted { account: owner })
        );
        assert_eq!(season.members(), vec![owner, alice]);
    }

    #[test]
    fn test_deposit_requires_exact_declared_and_transferred_amounts() {
        let (_registry, season, owner) = setup();

        assert_eq!(
            season.deposit_stake(&id("stranger"), STAKE, STAKE),
            Err(EscrowError::NotAdmitted { account: id("stranger") })
        );
        for (declared, transferred) in [(50, 50), (200, 200), (STAKE, 50), (50, STAKE)] {
            assert!(matches!(
                season.deposit_stake(&owner, declared, transferred),
                Err(EscrowError::WrongAmount { .. })
            ));
        }
        assert_eq!(season.pool_balance(), 0);
        assert!(!season.has_paid(&owner));

        season.deposit_stake(&owner, STAKE, STAKE).unwrap();
        assert_eq!(season.pool_balance(), STAKE);
        assert_eq!(season.held_funds(), STAKE);
    }

    #[test]
    fn test_second_deposit_fails_and_balance_changes_once() {
        let (_registry, season, owner) = setup();
        season.deposit_stake(&owner, STAKE, STAKE).unwrap();
        assert_eq!(
            season.deposit_stake(&owner, STAKE, STAKE),
            Err(EscrowError::AlreadyPaid { account: owner })
        );
        assert_eq!(season.pool_balance(), STAKE);
        assert_eq!(season.held_funds(), STAKE);
        assert!(season.has_paid(&owner));
    }

    #[test]
    fn test_allocation_guards() {
        let (_registry, season, owner) = setup();
        let alice = id("alice");
        season.deposit_stake(&owner, STAKE, STAKE).unwrap();

        assert_eq!(
            season.allocate_winnings(&alice, &owner, 1),
            Err(EscrowError::NotOwner { caller: alice })
        );
        assert_eq!(
            season.allocate_winnings(&owner, &alice, 1),
            Err(EscrowError::NotAdmitted { account: alice })
        );
        season.admit(&owner, &alice).unwrap();
        assert_eq!(
            season.allocate_winnings(&owner, &alice, 1),
            Err(EscrowError::StakeNotPaid { account: alice })
        );
        assert_eq!(
            season.allocate_winnings(&owner, &owner, STAKE + 1),
            Err(EscrowError::InsufficientPool {
                requested: STAKE + 1,
                available: STAKE
            })
        );
        assert_eq!(season.pool_balance(), STAKE);
    }

    #[test]
    fn test_allocations_accumulate_and_drain_pool_exactly() {
        let (_registry, season, owner) = setup();
        season.deposit_stake(&owner, STAKE, STAKE).unwrap();

        let before = season.pool_balance();
        for amount in [10, 25, 5] {
            season.allocate_winnings(&owner, &owner, amount).unwrap();
        }
        assert_eq!(season.pool_balance(), before - 40);
        assert_eq!(season.pending_winnings(&owner), 40);
        assert!(season.custody().is_conserved());
    }

    #[test]
    fn test_withdraw_zeroes_pending_and_pays_out() {
        let (registry, season, owner) = setup();
        season.deposit_stake(&owner, STAKE, STAKE).unwrap();
        season.allocate_winnings(&owner, &owner, 60).unwrap();

        assert_eq!(season.withdraw(&owner), Ok(60));
        assert_eq!(season.pending_winnings(&owner), 0);
        assert_eq!(season.held_funds(), 40);
        assert_eq!(registry.treasury().received(&owner), 60);

        assert_eq!(
            season.withdraw(&owner),
            Err(EscrowError::NothingToWithdraw { account: owner })
        );
        assert_eq!(registry.treasury().received(&owner), 60);
        assert_eq!(
            season.withdraw(&id("stranger")),
            Err(EscrowError::NotAdmitted { account: id("stranger") })
        );
    }

    #[test]
    fn test_withdraw_restores_book_when_transfer_refused() {
        let (registry, season, owner) = setup();
        season.deposit_stake(&owner, STAKE, STAKE).unwrap();
        season.allocate_winnings(&owner, &owner, 30).unwrap();
        registry.treasury().credit(&owner, Amount::MAX).unwrap();

        assert_eq!(season.withdraw(&owner), Err(EscrowError::ArithmeticOverflow));
        assert_eq!(season.pending_winnings(&owner), 30);
        assert_eq!(season.held_funds(), STAKE);
        let withdrawals = registry
            .journal()
            .records()
            .into_iter()
            .filter(|r| r.event.name() == "withdrawal")
            .count();
        assert_eq!(withdrawals, 0);
    }

    #[test]
    fn test_tip_threshold_and_pass_through() {
        let (registry, season, owner) = setup();
        let alice = id("alice");
        season.admit(&owner, &alice).unwrap();
        assert_eq!(season.min_tip(), 1_000);

        assert_eq!(
            season.tip_owner(&alice, 1),
            Err(EscrowError::TipTooSmall { amount: 1, minimum: 1_000 })
        );
        assert_eq!(registry.treasury().received(&owner), 0);

        assert_eq!(
            season.tip_owner(&id("stranger"), 5_000),
            Err(EscrowError::NotAdmitted { account: id("stranger") })
        );

        season.tip_owner(&alice, 1_000).unwrap();
        assert_eq!(registry.treasury().received(&owner), 1_000);
        assert_eq!(season.pool_balance(), 0);
        assert_eq!(season.held_funds(), 0);
    }

    #[test]
    fn test_complete_requires_settlement() {
        let (registry, season, owner) = setup();
        let alice = id("alice");

        assert_eq!(
            season.complete(&alice),
            Err(EscrowError::NotOwner { caller: alice })
        );

        season.deposit_stake(&owner, STAKE, STAKE).unwrap();
        assert_eq!(
            season.complete(&owner),
            Err(EscrowError::SettlementPending {
                pool_balance: STAKE,
                held_funds: STAKE
            })
        );

        season.allocate_winnings(&owner, &owner, STAKE).unwrap();
        assert_eq!(
            season.complete(&owner),
            Err(EscrowError::SettlementPending {
                pool_balance: 0,
                held_funds: STAKE
            })
        );
        assert!(!season.is_complete());

        season.withdraw(&owner).unwrap();
        season.complete(&owner).unwrap();
        assert!(season.is_complete());
        assert_eq!(season.complete(&owner), Err(EscrowError::AlreadyComplete));
        assert!(matches!(
            registry.lookup_ledger(&owner, season.sequence_id()),
            Err(EscrowError::NotFound { .. })
        ));
    }

    #[test]
    fn test_complete_without_registry_fails_cleanly() {
        let (registry, season, owner) = setup();
        drop(registry);
        assert!(season.registry().is_none());
        assert_eq!(season.complete(&owner), Err(EscrowError::RegistryUnavailable));
        assert!(!season.is_complete());
    }

    #[test]
    fn test_complete_leaves_season_open_when_deregistration_is_refused() {
        let (registry, season, owner) = setup();
        registry
            .remove_ledger(&season.address(), &owner, season.sequence_id())
            .unwrap();
        let events_before = registry.journal().len();

        assert_eq!(
            season.complete(&owner),
            Err(EscrowError::MustBeCalledByLedger {
                caller: season.address(),
                sequence_id: season.sequence_id(),
            })
        );
        assert!(!season.is_complete());
        assert_eq!(registry.journal().len(), events_before);
        season.admit(&owner, &id("late")).unwrap();
    }

    #[test]
    fn test_completed_season_rejects_new_activity() {
        let (_registry, season, owner) = setup();
        season.complete(&owner).unwrap();

        assert_eq!(season.admit(&owner, &id("late")), Err(EscrowError::AlreadyComplete));
        assert_eq!(
            season.deposit_stake(&owner, STAKE, STAKE),
            Err(EscrowError::AlreadyComplete)
        );
        assert_eq!(
            season.allocate_winnings(&owner, &owner, 1),
            Err(EscrowError::AlreadyComplete)
        );
        assert_eq!(season.tip_owner(&owner, 1_000), Err(EscrowError::AlreadyComplete));
        assert_eq!(season.held_funds(), 0);
    }

    #[test]
    fn test_summary_is_caller_specific() {
        let (_registry, season, owner) = setup();
        let alice = id("alice");
        season.admit(&owner, &alice).unwrap();
        season.deposit_stake(&alice, STAKE, STAKE).unwrap();
        season.allocate_winnings(&owner, &alice, 70).unwrap();

        let for_alice = season.summary(&alice);
        assert!(for_alice.caller_admitted && for_alice.caller_paid);
        assert_eq!(for_alice.caller_pending, 70);
        assert_eq!(for_alice.member_count, 2);

        let for_owner = season.summary(&owner);
        assert!(!for_owner.caller_paid);
        assert_eq!(for_owner.caller_pending, 0);
        assert_eq!(for_owner.pool_balance, 30);
    }
}
