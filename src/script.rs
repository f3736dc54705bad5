//! Scripted replay of escrow operations.
//!
//! A script is a JSON array of steps, each naming the authenticated caller
//! that performs it. The replayer plays the part of the calling environment:
//! it keeps the handle of every season created during the run so
//! participants can keep talking to a season after it has left the registry.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::escrow::account::amount_str;
use crate::escrow::{AccountId, Amount, EscrowError, Registry, SeasonHandle};

/// Which season a step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonRef {
    pub owner: AccountId,
    pub sequence_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Create {
        caller: AccountId,
        #[serde(with = "amount_str")]
        stake: Amount,
    },
    Admit {
        caller: AccountId,
        season: SeasonRef,
        target: AccountId,
    },
    /// `transferred` defaults to `declared` when omitted.
    Deposit {
        caller: AccountId,
        season: SeasonRef,
        #[serde(with = "amount_str")]
        declared: Amount,
        #[serde(default, with = "amount_str::option")]
        transferred: Option<Amount>,
    },
    Allocate {
        caller: AccountId,
        season: SeasonRef,
        target: AccountId,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Withdraw {
        caller: AccountId,
        season: SeasonRef,
    },
    Tip {
        caller: AccountId,
        season: SeasonRef,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Complete {
        caller: AccountId,
        season: SeasonRef,
    },
    Lookup {
        caller: AccountId,
        sequence_id: u64,
    },
    RemoveLedger {
        caller: AccountId,
        owner: AccountId,
        sequence_id: u64,
    },
}

impl ScriptStep {
    pub fn op(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Admit { .. } => "admit",
            Self::Deposit { .. } => "deposit",
            Self::Allocate { .. } => "allocate",
            Self::Withdraw { .. } => "withdraw",
            Self::Tip { .. } => "tip",
            Self::Complete { .. } => "complete",
            Self::Lookup { .. } => "lookup",
            Self::RemoveLedger { .. } => "remove_ledger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub ok: bool,
    /// Result detail on success, error code on failure.
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EscrowError>,
}

pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>> {
    serde_json::from_str(content).context("parse replay script")
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read script {}", path.display()))?;
    parse_script(&content)
}

pub struct Replayer {
    registry: Registry,
    seasons: HashMap<SeasonRef, SeasonHandle>,
}

impl Replayer {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            seasons: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run every step in order. Failed steps are recorded and the run continues.
    pub fn run(&mut self, steps: &[ScriptStep]) -> Vec<StepOutcome> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let result = self.apply(step);
                match result {
                    Ok(detail) => {
                        info!(index, op = step.op(), %detail, "step ok");
                        StepOutcome {
                            index,
                            op: step.op(),
                            ok: true,
                            detail,
                            error: None,
                        }
                    }
                    Err(err) => {
                        warn!(index, op = step.op(), error = %err, "step failed");
                        StepOutcome {
                            index,
                            op: step.op(),
                            ok: false,
                            detail: err.code().to_string(),
                            error: Some(err),
                        }
                    }
                }
            })
            .collect()
    }

    fn season(&self, season: &SeasonRef) -> Result<&SeasonHandle, EscrowError> {
        self.seasons.get(season).ok_or(EscrowError::NotFound {
            owner: season.owner,
            sequence_id: season.sequence_id,
        })
    }

    fn apply(&mut self, step: &ScriptStep) -> Result<String, EscrowError> {
        match step {
            ScriptStep::Create { caller, stake } => {
                let ledger = self.registry.create_ledger(caller, *stake)?;
                let sequence_id = ledger.sequence_id();
                let detail = format!("season {} at {}", sequence_id, ledger.address());
                self.seasons.insert(
                    SeasonRef {
                        owner: *caller,
                        sequence_id,
                    },
                    ledger,
                );
                Ok(detail)
            }
            ScriptStep::Admit {
                caller,
                season,
                target,
            } => {
                self.season(season)?.admit(caller, target)?;
                Ok(format!("admitted {}", target))
            }
            ScriptStep::Deposit {
                caller,
                season,
                declared,
                transferred,
            } => {
                let ledger = self.season(season)?;
                ledger.deposit_stake(caller, *declared, transferred.unwrap_or(*declared))?;
                Ok(format!("pool {}", ledger.pool_balance()))
            }
            ScriptStep::Allocate {
                caller,
                season,
                target,
                amount,
            } => {
                let ledger = self.season(season)?;
                ledger.allocate_winnings(caller, target, *amount)?;
                Ok(format!("pool {}", ledger.pool_balance()))
            }
            ScriptStep::Withdraw { caller, season } => {
                let amount = self.season(season)?.withdraw(caller)?;
                Ok(format!("withdrew {}", amount))
            }
            ScriptStep::Tip {
                caller,
                season,
                amount,
            } => {
                self.season(season)?.tip_owner(caller, *amount)?;
                Ok(format!("tipped {}", amount))
            }
            ScriptStep::Complete { caller, season } => {
                self.season(season)?.complete(caller)?;
                Ok("completed".to_string())
            }
            ScriptStep::Lookup {
                caller,
                sequence_id,
            } => {
                let ledger = self.registry.lookup_ledger(caller, *sequence_id)?;
                Ok(format!("{} stake {}", ledger.address(), ledger.stake_amount()))
            }
            ScriptStep::RemoveLedger {
                caller,
                owner,
                sequence_id,
            } => {
                self.registry.remove_ledger(caller, owner, *sequence_id)?;
                Ok("removed".to_string())
            }
        }
    }
}
