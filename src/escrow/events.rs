//! Append-only event journal shared by a registry and every ledger it mints.
//!
//! Records are totally ordered by `seq`. A record is appended only after the
//! operation that produced it has committed, so observers never see events
//! from a failed call.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::escrow::account::{amount_str, AccountId, Amount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscrowEvent {
    LedgerCreated {
        ledger: AccountId,
        creator: AccountId,
        sequence_id: u64,
    },
    SeasonStarted {
        sequence_id: u64,
        owner: AccountId,
    },
    Admitted {
        sequence_id: u64,
        account: AccountId,
    },
    StakePaid {
        account: AccountId,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    WinningsAllocated {
        account: AccountId,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Withdrawal {
        account: AccountId,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Tip {
        account: AccountId,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    SeasonCompleted {
        sequence_id: u64,
        owner: AccountId,
    },
    LedgerRemoved {
        ledger: AccountId,
        sequence_id: u64,
        owner: AccountId,
    },
}

impl EscrowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LedgerCreated { .. } => "ledger_created",
            Self::SeasonStarted { .. } => "season_started",
            Self::Admitted { .. } => "admitted",
            Self::StakePaid { .. } => "stake_paid",
            Self::WinningsAllocated { .. } => "winnings_allocated",
            Self::Withdrawal { .. } => "withdrawal",
            Self::Tip { .. } => "tip",
            Self::SeasonCompleted { .. } => "season_completed",
            Self::LedgerRemoved { .. } => "ledger_removed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub ts: DateTime<Utc>,
    /// Identity of the registry or ledger that emitted the event.
    pub emitter: AccountId,
    pub event: EscrowEvent,
}

#[derive(Debug, Default)]
struct JournalState {
    next_seq: u64,
    records: Vec<EventRecord>,
}

/// Cheap-to-clone handle onto one shared journal.
#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    state: Arc<Mutex<JournalState>>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, emitter: AccountId, event: EscrowEvent) -> u64 {
        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        debug!(seq, emitter = %emitter, kind = event.name(), "event appended");
        state.records.push(EventRecord {
            seq,
            ts: Utc::now(),
            emitter,
            event,
        });
        seq
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Vec<EventRecord> {
        self.state.lock().records.clone()
    }

    /// Records with `seq >= from_seq`.
    pub fn since(&self, from_seq: u64) -> Vec<EventRecord> {
        let state = self.state.lock();
        let start = state.records.partition_point(|r| r.seq < from_seq);
        state.records[start..].to_vec()
    }

    pub fn emitted_by(&self, emitter: &AccountId) -> Vec<EventRecord> {
        self.state
            .lock()
            .records
            .iter()
            .filter(|r| &r.emitter == emitter)
            .cloned()
            .collect()
    }

    /// Sequence number the next appended record will receive.
    pub fn next_seq(&self) -> u64 {
        self.state.lock().next_seq
    }
}
