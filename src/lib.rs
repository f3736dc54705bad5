//! Season Escrow Library
//!
//! Identity-authorized escrow for competition seasons: a registry that mints
//! season ledgers, and ledgers that custody stakes and pay out winnings.

pub mod config;
pub mod escrow;
pub mod journal_db;
pub mod script;

pub use config::EscrowConfig;
pub use escrow::{
    AccountId, Amount, ErrorKind, EscrowError, EscrowEvent, EventJournal, EventRecord, Registry,
    SeasonHandle, SeasonLedger, Treasury,
};
