// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments of the adapter binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_TIMEOUT_MS;

/// TorX adapter for a SUT running as a child process
#[derive(Parser, Debug, Clone)]
#[command(name = "torx-adapter", version, about = "TorX adapter for a SUT child process")]
pub struct Cli {
    /// Quiescence timeout in milliseconds (TORXTIMEOUT/TORXTIMEUNIT override it)
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// How labels are encoded on the SUT's stdin/stdout
    #[arg(long, value_enum, default_value = "line")]
    pub codec: CodecKind,

    /// TOML label table for the byte codec (defaults to the FWGC table)
    #[arg(long, value_name = "FILE")]
    pub table: Option<PathBuf>,

    /// Log filter directive, e.g. "debug" or "torx_adapter=trace"
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// SUT program and its arguments
    #[arg(last = true, required = true, value_name = "SUT")]
    pub command: Vec<String>,
}

impl Cli {
    /// Timeout used when the environment does not override it.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// SUT wire encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CodecKind {
    /// One label per text line
    #[default]
    Line,
    /// One byte per label, from a label table
    Bytes,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
