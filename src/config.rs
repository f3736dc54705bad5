//! Escrow configuration.
//!
//! Values come from an optional TOML file, then environment variables
//! (after loading `.env`), with the environment taking precedence.
//!
//! Environment Variables:
//!   ESCROW_UNITS_PER_COIN - smallest units per whole currency unit (default: 10^18)
//!   ESCROW_REGISTRY_SEED  - seed for the registry identity (default: season-escrow)
//!   ESCROW_JOURNAL_PATH   - SQLite file for the event journal (optional)
//!   ESCROW_LOG_LEVEL      - log level when RUST_LOG is unset (default: info)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::escrow::AccountId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Smallest units in one whole currency unit; the minimum tip is 1/1000 of this.
    pub units_per_coin: u64,
    pub registry_seed: String,
    pub journal_path: Option<String>,
    pub log_level: String,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            units_per_coin: 1_000_000_000_000_000_000,
            registry_seed: "season-escrow".to_string(),
            journal_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl EscrowConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("parse escrow config")?;
        config.validate()?;
        Ok(config)
    }

    /// File values first, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("read config {}", path.display()))?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var("ESCROW_UNITS_PER_COIN") {
            self.units_per_coin = v
                .trim()
                .parse()
                .with_context(|| format!("ESCROW_UNITS_PER_COIN={}", v))?;
        }
        if let Ok(v) = std::env::var("ESCROW_REGISTRY_SEED") {
            self.registry_seed = v;
        }
        if let Ok(v) = std::env::var("ESCROW_JOURNAL_PATH") {
            if !v.trim().is_empty() {
                self.journal_path = Some(v);
            }
        }
        if let Ok(v) = std::env::var("ESCROW_LOG_LEVEL") {
            self.log_level = v;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.units_per_coin < 1_000 {
            bail!(
                "units_per_coin must be at least 1000 so the minimum tip is non-zero (got {})",
                self.units_per_coin
            );
        }
        if self.registry_seed.trim().is_empty() {
            bail!("registry_seed must not be empty");
        }
        Ok(())
    }

    pub fn registry_address(&self) -> AccountId {
        AccountId::from_seed(&self.registry_seed)
    }
}
