// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by the adapter are defined here.
//! Use these accessors instead of calling `std::env::var()` directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

// Re-export name constants for callers that need the raw name string.
pub use names::*;

/// `TORXTIMEOUT`: Quiescence timeout amount, as entered in the JTorX config pane.
pub fn timeout_value() -> Option<String> {
    var_nonempty(names::TORXTIMEOUT)
}

/// `TORXTIMEUNIT`: Unit of `TORXTIMEOUT` (`seconds` or `milliseconds`).
pub fn timeout_unit() -> Option<String> {
    var_nonempty(names::TORXTIMEUNIT)
}

/// `TORX_ADAPTER_LOG`: Log filter directive for the adapter's stderr output.
pub fn log_filter() -> Option<String> {
    var_nonempty(names::TORX_ADAPTER_LOG)
}

fn var_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
