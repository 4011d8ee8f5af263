// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter configuration.
//!
//! The only knob the protocol engine consumes is the quiescence timeout. A
//! default is supplied by the caller and JTorX may override it through the
//! `TORXTIMEOUT`/`TORXTIMEUNIT` pair it exports before starting the adapter.

use std::time::Duration;

use tracing::{info, warn};

use crate::env;

/// Default quiescence timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Unit selector carried by `TORXTIMEUNIT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    /// Interpret a unit setting. Anything other than `seconds` (in any case)
    /// is taken as milliseconds.
    pub fn from_setting(unit: &str) -> Self {
        if unit.eq_ignore_ascii_case("seconds") {
            Self::Seconds
        } else {
            Self::Milliseconds
        }
    }

    /// Convert an amount in this unit to a duration.
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            Self::Seconds => Duration::from_secs(amount),
            Self::Milliseconds => Duration::from_millis(amount),
        }
    }
}

/// Settings consumed by the protocol engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterConfig {
    /// How long after the last applied stimulus silence counts as quiescence.
    pub timeout: Duration,
}

impl AdapterConfig {
    /// Create a config with an explicit timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Create a config from `default_timeout`, overridden by the JTorX
    /// environment when both variables are present and valid.
    pub fn from_env(default_timeout: Duration) -> Self {
        let timeout = resolve_timeout(
            default_timeout,
            env::timeout_value().as_deref(),
            env::timeout_unit().as_deref(),
        );
        info!(timeout_ms = timeout.as_millis() as u64, "adapter timeout");
        Self { timeout }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

/// Resolve the effective timeout from a default and the raw override values.
///
/// The override applies only when both `value` and `unit` are present and
/// `value` parses as an integer. Negative amounts resolve to zero.
pub fn resolve_timeout(default: Duration, value: Option<&str>, unit: Option<&str>) -> Duration {
    let (Some(value), Some(unit)) = (value, unit) else {
        return default;
    };
    match value.trim().parse::<i64>() {
        // A negative amount leaves no window at all.
        Ok(amount) => TimeUnit::from_setting(unit).duration(u64::try_from(amount).unwrap_or(0)),
        Err(err) => {
            warn!(value, error = %err, "ignoring unparsable timeout override");
            default
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
