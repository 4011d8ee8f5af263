// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Response lines written back to JTorX.

use std::fmt;

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Label JTorX reads as quiescence.
pub const QUIESCENCE_LABEL: &str = "delta";

/// One response line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Handshake acknowledgment.
    IoKind,
    /// The stimulus was applied, possibly under a different label.
    Input(String),
    /// The stimulus could not be applied; the run continues.
    InputError,
    /// An observation from the SUT.
    Output(String),
    /// Nothing was observed within the timeout window.
    Quiescence,
    /// End of test run acknowledged.
    Quit,
    /// The command could not be served.
    Error,
}

impl Response {
    /// Response keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::IoKind => "A_IOKIND",
            Self::Input(_) => "A_INPUT",
            Self::InputError => "A_INPUT_ERROR",
            Self::Output(_) | Self::Quiescence => "A_OUTPUT",
            Self::Quit => "A_QUIT",
            Self::Error => "A_ERROR",
        }
    }

    /// The full line, newline included.
    pub fn line(&self) -> String {
        format!("{self}\n")
    }

    /// Write the line and flush, so the tester never waits on a buffer.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(self.line().as_bytes()).await?;
        writer.flush().await
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // JTorX hangs unless the handshake reply carries the trailing space.
            Self::IoKind => f.write_str("A_IOKIND "),
            Self::Input(label) => write!(f, "A_INPUT event={label}"),
            Self::Output(label) => write!(f, "A_OUTPUT event={label}"),
            Self::Quiescence => write!(f, "A_OUTPUT event={QUIESCENCE_LABEL}"),
            other => f.write_str(other.keyword()),
        }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
