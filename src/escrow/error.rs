//! Typed failures for registry and season operations.
//!
//! Every failure leaves the registry or ledger exactly as it was before the
//! call. Nothing here is retried internally.

use serde::{Deserialize, Serialize};

use crate::escrow::account::{amount_str, AccountId, Amount};

/// Failure class, used by callers deciding how to present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Authorization,
    StateConflict,
    Validation,
    Resource,
    LifecycleGuard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowError {
    /// Caller is not the ledger owner.
    NotOwner { caller: AccountId },
    /// Account is not on the admission list.
    NotAdmitted { account: AccountId },
    /// Account was admitted before.
    AlreadyAdmitted { account: AccountId },
    /// Account already deposited its stake.
    AlreadyPaid { account: AccountId },
    /// Ledger has been completed.
    AlreadyComplete,
    /// Stake amount must be non-zero.
    InvalidStake,
    /// Declared and transferred amounts must both equal the stake.
    WrongAmount {
        #[serde(with = "amount_str")]
        expected: Amount,
        #[serde(with = "amount_str")]
        declared: Amount,
        #[serde(with = "amount_str")]
        transferred: Amount,
    },
    /// Tip below the minimum threshold.
    TipTooSmall {
        #[serde(with = "amount_str")]
        amount: Amount,
        #[serde(with = "amount_str")]
        minimum: Amount,
    },
    /// Allocation target has not deposited its stake.
    StakeNotPaid { account: AccountId },
    /// Allocation exceeds the undistributed pool.
    InsufficientPool {
        #[serde(with = "amount_str")]
        requested: Amount,
        #[serde(with = "amount_str")]
        available: Amount,
    },
    /// Caller has no pending winnings.
    NothingToWithdraw { account: AccountId },
    /// No ledger under this (owner, sequence) pair.
    NotFound { owner: AccountId, sequence_id: u64 },
    /// Funds are still allocated-but-unwithdrawn or unallocated.
    SettlementPending {
        #[serde(with = "amount_str")]
        pool_balance: Amount,
        #[serde(with = "amount_str")]
        held_funds: Amount,
    },
    /// Only a ledger may deregister itself.
    MustBeCalledByLedger { caller: AccountId, sequence_id: u64 },
    /// Checked arithmetic failed.
    ArithmeticOverflow,
    /// The registry that minted this ledger is gone.
    RegistryUnavailable,
}

impl EscrowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } | Self::NotAdmitted { .. } => ErrorKind::Authorization,
            Self::AlreadyAdmitted { .. } | Self::AlreadyPaid { .. } | Self::AlreadyComplete => {
                ErrorKind::StateConflict
            }
            Self::InvalidStake
            | Self::WrongAmount { .. }
            | Self::TipTooSmall { .. }
            | Self::ArithmeticOverflow => ErrorKind::Validation,
            Self::InsufficientPool { .. }
            | Self::NothingToWithdraw { .. }
            | Self::NotFound { .. }
            | Self::StakeNotPaid { .. } => ErrorKind::Resource,
            Self::SettlementPending { .. }
            | Self::MustBeCalledByLedger { .. }
            | Self::RegistryUnavailable => ErrorKind::LifecycleGuard,
        }
    }

    /// Stable short name, as recorded in journals and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "NotOwner",
            Self::NotAdmitted { .. } => "NotAdmitted",
            Self::AlreadyAdmitted { .. } => "AlreadyAdmitted",
            Self::AlreadyPaid { .. } => "AlreadyPaid",
            Self::AlreadyComplete => "AlreadyComplete",
            Self::InvalidStake => "InvalidStake",
            Self::WrongAmount { .. } => "WrongAmount",
            Self::TipTooSmall { .. } => "TipTooSmall",
            Self::StakeNotPaid { .. } => "StakeNotPaid",
            Self::InsufficientPool { .. } => "InsufficientPool",
            Self::NothingToWithdraw { .. } => "NothingToWithdraw",
            Self::NotFound { .. } => "NotFound",
            Self::SettlementPending { .. } => "SettlementPending",
            Self::MustBeCalledByLedger { .. } => "MustBeCalledByLedger",
            Self::ArithmeticOverflow => "ArithmeticOverflow",
            Self::RegistryUnavailable => "RegistryUnavailable",
        }
    }
}

impl std::fmt::Display for EscrowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner { caller } => write!(f, "{} is not the season owner", caller),
            Self::NotAdmitted { account } => write!(f, "{} is not admitted", account),
            Self::AlreadyAdmitted { account } => write!(f, "{} is already admitted", account),
            Self::AlreadyPaid { account } => write!(f, "{} has already paid the stake", account),
            Self::AlreadyComplete => write!(f, "Season already complete"),
            Self::InvalidStake => write!(f, "Stake amount must be greater than zero"),
            Self::WrongAmount {
                expected,
                declared,
                transferred,
            } => write!(
                f,
                "Incorrect stake amount: expected {}, declared {}, transferred {}",
                expected, declared, transferred
            ),
            Self::TipTooSmall { amount, minimum } => {
                write!(f, "Tip {} below minimum {}", amount, minimum)
            }
            Self::StakeNotPaid { account } => write!(f, "{} has not paid the stake", account),
            Self::InsufficientPool {
                requested,
                available,
            } => write!(
                f,
                "Insufficient pool: requested {}, available {}",
                requested, available
            ),
            Self::NothingToWithdraw { account } => {
                write!(f, "{} has no winnings to withdraw", account)
            }
            Self::NotFound { owner, sequence_id } => {
                write!(f, "No season {} registered for {}", sequence_id, owner)
            }
            Self::SettlementPending {
                pool_balance,
                held_funds,
            } => write!(
                f,
                "Settlement pending: pool {}, held {}",
                pool_balance, held_funds
            ),
            Self::MustBeCalledByLedger {
                caller,
                sequence_id,
            } => write!(
                f,
                "{} may not deregister season {}: must be called by the ledger",
                caller, sequence_id
            ),
            Self::ArithmeticOverflow => write!(f, "Amount arithmetic overflow"),
            Self::RegistryUnavailable => write!(f, "Registry no longer available"),
        }
    }
}

impl std::error::Error for EscrowError {}
