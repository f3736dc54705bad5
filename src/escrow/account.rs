//! Account identities and fixed-point amounts.
//!
//! An [`AccountId`] is an opaque 20-byte identity. It carries no meaning beyond
//! equality and use as a map key; it renders as `0x`-prefixed lowercase hex so
//! it reads like the wallet addresses callers already know.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::escrow::error::EscrowError;

// =============================================================================
// AMOUNT
// =============================================================================

/// Amount in the smallest unit of value. Never negative.
pub type Amount = u128;

/// Smallest units in one whole currency unit (18 decimals).
pub const DEFAULT_UNITS_PER_COIN: Amount = 1_000_000_000_000_000_000;

/// Tips below 1/1000 of one whole unit are rejected.
pub const TIP_DIVISOR: Amount = 1_000;

/// Minimum accepted tip for a given denomination.
#[inline]
pub fn min_tip(units_per_coin: Amount) -> Amount {
    units_per_coin / TIP_DIVISOR
}

#[inline]
pub(crate) fn checked_add(a: Amount, b: Amount) -> Result<Amount, EscrowError> {
    a.checked_add(b).ok_or(EscrowError::ArithmeticOverflow)
}

#[inline]
pub(crate) fn checked_sub(a: Amount, b: Amount) -> Result<Amount, EscrowError> {
    a.checked_sub(b).ok_or(EscrowError::ArithmeticOverflow)
}

/// Serde for [`Amount`] as a decimal string.
///
/// Amounts exceed `u64::MAX` at ordinary sizes (about 18.4 coins at 18
/// decimals), which JSON numbers and serde's buffered tagged enums cannot
/// carry. Plain JSON integers are still accepted up to `u64::MAX`.
pub mod amount_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use super::Amount;

    pub fn serialize<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse(Value::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }

    fn parse(value: Value) -> Result<Amount, String> {
        match value {
            Value::String(s) => s
                .trim()
                .parse::<Amount>()
                .map_err(|e| format!("invalid amount '{}': {}", s, e)),
            Value::Number(n) => n
                .as_u64()
                .map(Amount::from)
                .ok_or_else(|| format!("invalid amount {}: use a decimal string", n)),
            other => Err(format!("expected amount, got {}", other)),
        }
    }

    /// Same encoding for `Option<Amount>`; `null` or a missing field is `None`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        use super::{parse, Amount};

        pub fn serialize<S>(amount: &Option<Amount>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match amount {
                Some(amount) => serializer.collect_str(amount),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Value::deserialize(deserializer)? {
                Value::Null => Ok(None),
                value => parse(value).map(Some).map_err(serde::de::Error::custom),
            }
        }
    }
}

// =============================================================================
// ACCOUNT ID
// =============================================================================

pub const ACCOUNT_ID_LEN: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    pub const fn new(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    /// Identity derived from an arbitrary seed (last 20 bytes of its SHA-256).
    pub fn from_seed(seed: &str) -> Self {
        Self::truncate(Sha256::digest(seed.as_bytes()).as_slice())
    }

    /// Identity of the ledger a registry mints under `sequence_id`.
    ///
    /// Deterministic: the same registry and sequence always yield the same id.
    pub fn derive_child(&self, sequence_id: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(sequence_id.to_be_bytes());
        Self::truncate(hasher.finalize().as_slice())
    }

    fn truncate(digest: &[u8]) -> Self {
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ACCOUNT_ID_LEN..]);
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self)
    }
}

/// Parse failure for an account identity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAccountIdError {
    pub input: String,
    pub reason: String,
}

impl fmt::Display for ParseAccountIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid account id '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ParseAccountIdError {}

impl FromStr for AccountId {
    type Err = ParseAccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let digits = trimmed.strip_prefix("0x").unwrap_or(&trimmed);
        let raw = hex::decode(digits).map_err(|e| ParseAccountIdError {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; ACCOUNT_ID_LEN] = raw.try_into().map_err(|v: Vec<u8>| {
            ParseAccountIdError {
                input: s.to_string(),
                reason: format!("expected {} bytes, got {}", ACCOUNT_ID_LEN, v.len()),
            }
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
