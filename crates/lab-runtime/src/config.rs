//! # Lab Configuration
//!
//! Defaults overridden from `CF_*` environment variables. A value that does
//! not parse is ignored and reported as a [`ConfigWarning`]; the default
//! stays in effect.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `CF_VARIANT` | `vulnerable`, `secure` or `both` | `both` |
//! | `CF_GOAL_WEI` | funding goal in wei | `100` |
//! | `CF_DURATION_MINUTES` | campaign length, or `none` | `60` |
//! | `CF_OVER_GOAL_POLICY` | `accept`, `reject-once-reached`, `reject-exceeding`, `cap` | `accept` |
//! | `CF_MAX_REENTRY_DEPTH` | bound on nested refunds | `64` |
//! | `CF_INITIAL_FUNDS_ETHER` | genesis allocation per identity | `10000` |
//! | `CF_LOG_LEVEL` | filter used when `RUST_LOG` is unset | `info` |
//! | `CF_LOG_JSON` | JSON log lines | `false` |

use cf_01_ledger::domain::entities::{LedgerVariant, OverGoalPolicy};
use cf_01_ledger::domain::value_objects::units::parse_ether;
use cf_01_ledger::domain::value_objects::U256;
use cf_02_adversaries::config::HarnessConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabConfig {
    /// Variants to run the scenarios against.
    pub variants: Vec<LedgerVariant>,
    /// Fixture parameters.
    pub harness: HarnessConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            variants: LedgerVariant::ALL.to_vec(),
            harness: HarnessConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LabConfig {
    /// Rejects configurations no scenario can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variants.is_empty() {
            return Err(ConfigError::NoVariants);
        }
        if self.harness.initial_funds.is_zero() {
            return Err(ConfigError::ZeroInitialFunds);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No ledger variant selected.
    #[error("no ledger variant selected")]
    NoVariants,
    /// Identities would start with nothing.
    #[error("initial funds must be greater than zero")]
    ZeroInitialFunds,
}

/// A variable that was set but could not be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Variable name.
    pub var: &'static str,
    /// Raw value.
    pub value: String,
    /// Why it was ignored.
    pub reason: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?} ignored: {}", self.var, self.value, self.reason)
    }
}

/// Loads configuration from the process environment.
pub fn load_config() -> (LabConfig, Vec<ConfigWarning>) {
    load_config_from(|var| std::env::var(var).ok())
}

/// Loads configuration through `lookup`.
pub fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> (LabConfig, Vec<ConfigWarning>) {
    let mut config = LabConfig::default();
    let mut warnings = Vec::new();
    let mut apply = |var: &'static str, parse: &mut dyn FnMut(&str) -> Result<(), String>| {
        if let Some(value) = lookup(var) {
            if let Err(reason) = parse(value.trim()) {
                warnings.push(ConfigWarning { var, value, reason });
            }
        }
    };

    apply("CF_VARIANT", &mut |v| {
        config.variants = match v.to_ascii_lowercase().as_str() {
            "both" | "all" => LedgerVariant::ALL.to_vec(),
            other => vec![other.parse()?],
        };
        Ok(())
    });
    apply("CF_GOAL_WEI", &mut |v| {
        config.harness.ledger.goal = U256::from_dec_str(v).map_err(|e| format!("{e:?}"))?;
        Ok(())
    });
    apply("CF_DURATION_MINUTES", &mut |v| {
        config.harness.ledger.duration_minutes = if v.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(v.parse().map_err(|e| format!("{e}"))?)
        };
        Ok(())
    });
    apply("CF_OVER_GOAL_POLICY", &mut |v| {
        config.harness.ledger.over_goal_policy = v.parse::<OverGoalPolicy>()?;
        Ok(())
    });
    apply("CF_MAX_REENTRY_DEPTH", &mut |v| {
        config.harness.attack.max_reentry_depth = v.parse().map_err(|e| format!("{e}"))?;
        Ok(())
    });
    apply("CF_INITIAL_FUNDS_ETHER", &mut |v| {
        config.harness.initial_funds = parse_ether(v).map_err(|e| e.to_string())?;
        Ok(())
    });
    apply("CF_LOG_LEVEL", &mut |v| {
        if v.is_empty() {
            return Err("empty filter".to_string());
        }
        config.logging.level = v.to_string();
        Ok(())
    });
    apply("CF_LOG_JSON", &mut |v| {
        config.logging.json = match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => return Err("expected a boolean".to_string()),
        };
        Ok(())
    });

    (config, warnings)
}
