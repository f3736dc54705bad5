//! Season escrow core.
//!
//! Two tiers:
//! 1. [`Registry`] mints Season Ledgers, numbers them, and indexes them per creator
//! 2. [`SeasonLedger`] custodies stakes for one competition and pays out winnings
//!
//! Value leaves custody only through the [`Treasury`]. Every state change is
//! recorded in the shared [`EventJournal`].

pub mod account;
pub mod error;
pub mod events;
pub mod registry;
pub mod season;
pub mod treasury;

pub use account::{min_tip, AccountId, Amount, ParseAccountIdError, DEFAULT_UNITS_PER_COIN};
pub use error::{ErrorKind, EscrowError};
pub use events::{EscrowEvent, EventJournal, EventRecord};
pub use registry::Registry;
pub use season::{CustodyReport, SeasonHandle, SeasonLedger, SeasonSummary};
pub use treasury::Treasury;
