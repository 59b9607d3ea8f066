//! Configuration management for the booking ledger.
//!
//! Loads configuration from environment variables with sensible defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `SLOTBOOK_ACTOR_ID` | `admin-1` |
//! | `SLOTBOOK_CONFLICT_POLICY` | `exact-start` |
//! | `SLOTBOOK_CONCURRENCY` | `last-write-wins` |

use serde::{Deserialize, Serialize};
use slotbook_runtime::{ConcurrencyMode, EngineConfig};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Actor attached to audit rows when none is configured
pub const DEFAULT_ACTOR_ID: &str = "admin-1";

/// Errors from configuration loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be parsed
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// The raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// How scheduling conflicts are detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Two ACTIVE bookings collide only when they start at the same time
    #[default]
    ExactStart,
    /// Two ACTIVE bookings collide when their `[start, end)` windows overlap
    Overlap,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact-start" | "exact" => Ok(Self::ExactStart),
            "overlap" => Ok(Self::Overlap),
            other => Err(format!("unknown conflict policy: {other}")),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExactStart => "exact-start",
            Self::Overlap => "overlap",
        })
    }
}

/// Settings consumed by the ledger reducer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Current user attached to audit rows and payments
    pub actor_id: String,
    /// Scheduling conflict detection
    pub conflict_policy: ConflictPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            actor_id: DEFAULT_ACTOR_ID.to_string(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Ledger settings
    pub ledger: LedgerConfig,
    /// Engine settings
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            ledger: LedgerConfig {
                actor_id: lookup("SLOTBOOK_ACTOR_ID")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ACTOR_ID.to_string()),
                conflict_policy: lookup("SLOTBOOK_CONFLICT_POLICY")
                    .and_then(|s| parse_or_warn("SLOTBOOK_CONFLICT_POLICY", &s))
                    .unwrap_or_default(),
            },
            engine: EngineConfig::default().with_concurrency(
                lookup("SLOTBOOK_CONCURRENCY")
                    .and_then(|s| parse_or_warn("SLOTBOOK_CONCURRENCY", &s))
                    .unwrap_or_default(),
            ),
        }
    }

    /// Load configuration, rejecting unparseable values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first variable that is
    /// set but cannot be parsed.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let conflict_policy = parse_strict::<ConflictPolicy>(&lookup, "SLOTBOOK_CONFLICT_POLICY")?;
        let concurrency = parse_strict::<ConcurrencyMode>(&lookup, "SLOTBOOK_CONCURRENCY")?;

        let mut config = Self::from_lookup(&lookup);
        config.ledger.conflict_policy = conflict_policy.unwrap_or_default();
        config.engine = config.engine.with_concurrency(concurrency.unwrap_or_default());
        Ok(config)
    }
}

fn parse_or_warn<T: FromStr<Err = String>>(key: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(reason) => {
            tracing::warn!(key, value, %reason, "Ignoring invalid configuration value");
            None
        }
    }
}

fn parse_strict<T: FromStr<Err = String>>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|value| {
            value
                .parse()
                .map_err(|reason| ConfigError::InvalidValue { key, value, reason })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(vars(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.ledger.actor_id, "admin-1");
        assert_eq!(config.ledger.conflict_policy, ConflictPolicy::ExactStart);
        assert_eq!(config.engine.concurrency, ConcurrencyMode::LastWriteWins);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(vars(&[
            ("SLOTBOOK_ACTOR_ID", "staff-7"),
            ("SLOTBOOK_CONFLICT_POLICY", "overlap"),
            ("SLOTBOOK_CONCURRENCY", "compare-and-swap"),
        ]));
        assert_eq!(config.ledger.actor_id, "staff-7");
        assert_eq!(config.ledger.conflict_policy, ConflictPolicy::Overlap);
        assert_eq!(config.engine.concurrency, ConcurrencyMode::CompareAndSwap);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = Config::from_lookup(vars(&[
            ("SLOTBOOK_ACTOR_ID", "  "),
            ("SLOTBOOK_CONFLICT_POLICY", "fuzzy"),
        ]));
        assert_eq!(config.ledger.actor_id, "admin-1");
        assert_eq!(config.ledger.conflict_policy, ConflictPolicy::ExactStart);
    }

    #[test]
    fn strict_loading_reports_the_bad_key() {
        let err = Config::try_from_lookup(vars(&[("SLOTBOOK_CONCURRENCY", "optimistic")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "SLOTBOOK_CONCURRENCY", .. }
        ));

        let ok = Config::try_from_lookup(vars(&[("SLOTBOOK_CONFLICT_POLICY", "Overlap")])).unwrap();
        assert_eq!(ok.ledger.conflict_policy, ConflictPolicy::Overlap);
    }
}
