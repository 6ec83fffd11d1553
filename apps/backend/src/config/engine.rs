//! Match engine configuration loaded from the environment.
//!
//! Every variable is optional:
//! - `DURAK_ACTION_TIMEOUT_SECS` (60): window for each move before the deadline
//! - `DURAK_SWEEP_INTERVAL_SECS` (5): period of the stalled-match sweep
//! - `DURAK_STARTING_BALANCE` (500): balance of users the ledger has not seen
//! - `DURAK_MIN_STAKE` / `DURAK_MAX_STAKE` (1 / 1_000_000): accepted stakes

use std::env;
use std::str::FromStr;

use time::Duration;

use crate::domain::rules::DEFAULT_ACTION_WINDOW;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub action_window: Duration,
    pub sweep_interval: std::time::Duration,
    pub starting_balance: i64,
    pub min_stake: i64,
    pub max_stake: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_window: DEFAULT_ACTION_WINDOW,
            sweep_interval: std::time::Duration::from_secs(5),
            starting_balance: 500,
            min_stake: 1,
            max_stake: 1_000_000,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset names keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout_secs: i64 = parse_var(&lookup, "DURAK_ACTION_TIMEOUT_SECS")?
            .unwrap_or(defaults.action_window.whole_seconds());
        let sweep_secs: u64 = parse_var(&lookup, "DURAK_SWEEP_INTERVAL_SECS")?
            .unwrap_or(defaults.sweep_interval.as_secs());
        let starting_balance =
            parse_var(&lookup, "DURAK_STARTING_BALANCE")?.unwrap_or(defaults.starting_balance);
        let min_stake = parse_var(&lookup, "DURAK_MIN_STAKE")?.unwrap_or(defaults.min_stake);
        let max_stake = parse_var(&lookup, "DURAK_MAX_STAKE")?.unwrap_or(defaults.max_stake);

        if timeout_secs <= 0 {
            return Err(AppError::config(
                "DURAK_ACTION_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        if sweep_secs == 0 {
            return Err(AppError::config(
                "DURAK_SWEEP_INTERVAL_SECS must be positive".to_string(),
            ));
        }
        if min_stake <= 0 || max_stake < min_stake {
            return Err(AppError::config(format!(
                "Stake bounds must satisfy 0 < min <= max, got {min_stake}..={max_stake}"
            )));
        }

        Ok(Self {
            action_window: Duration::seconds(timeout_secs),
            sweep_interval: std::time::Duration::from_secs(sweep_secs),
            starting_balance,
            min_stake,
            max_stake,
        })
    }
}

pub(crate) fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::config(format!("Environment variable '{name}' has invalid value '{raw}'"))
        }),
    }
}
