// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command parsing.
//!
//! A command line is a keyword, optionally followed by whitespace and a
//! TAB-separated list of `name=value` fields. Labels may contain spaces, so
//! only TAB separates fields.

use std::collections::HashMap;
use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// Field carrying the label of a stimulus.
pub const EVENT_FIELD: &str = "event";

/// Keywords understood by [`CommandParser::new`].
pub const PROTOCOL_KEYWORDS: [&str; 4] = ["C_IOKIND", "C_INPUT", "C_OUTPUT", "C_QUIT"];

/// Command keyword.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `C_IOKIND`, the handshake.
    IoKind,
    /// `C_INPUT`, apply a stimulus (or drain a pending observation).
    Input,
    /// `C_OUTPUT`, request an observation.
    Output,
    /// `C_QUIT`, end of the test run.
    Quit,
    /// A keyword the parser was configured to accept but the engine does not serve.
    Other(String),
}

impl Keyword {
    pub fn from_word(word: &str) -> Self {
        match word {
            "C_IOKIND" => Self::IoKind,
            "C_INPUT" => Self::Input,
            "C_OUTPUT" => Self::Output,
            "C_QUIT" => Self::Quit,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::IoKind => "C_IOKIND",
            Self::Input => "C_INPUT",
            Self::Output => "C_OUTPUT",
            Self::Quit => "C_QUIT",
            Self::Other(word) => word,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed protocol request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    keyword: Keyword,
    fields: HashMap<String, String>,
}

impl Command {
    /// Create a command without fields.
    pub fn new(keyword: Keyword) -> Self {
        Self {
            keyword,
            fields: HashMap::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// The `event` field, i.e. the stimulus label of a `C_INPUT`.
    pub fn event(&self) -> Option<&str> {
        self.field(EVENT_FIELD)
    }
}

/// Failure to obtain the next command from the tester.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The input stream was closed.
    #[error("end of input")]
    EndOfInput,

    /// The input stream failed.
    #[error("failed to read command: {0}")]
    Io(#[from] std::io::Error),
}

/// Parser for command lines over a fixed set of recognized keywords.
#[derive(Clone, Debug)]
pub struct CommandParser {
    keywords: Vec<String>,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandParser {
    /// Parser for the four TorX-adapter commands.
    pub fn new() -> Self {
        Self::with_keywords(PROTOCOL_KEYWORDS)
    }

    /// Parser recognizing exactly `keywords`.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse one line. Returns `None` for blank lines and lines that do not
    /// start with a recognized keyword.
    pub fn parse(&self, line: &str) -> Option<Command> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        let keyword = self.keywords.iter().find(|k| starts_with_keyword(line, k))?;
        let rest = line[keyword.len()..].trim_start_matches([' ', '\t']);

        let mut command = Command::new(Keyword::from_word(keyword));
        for token in rest.split('\t') {
            if let Some((name, value)) = token.split_once('=') {
                if !name.is_empty() {
                    command.fields.insert(name.to_string(), value.to_string());
                }
            }
        }
        Some(command)
    }

    /// Read lines until one parses as a command.
    ///
    /// Blank and unrecognized lines are skipped. Bytes that are not UTF-8 are
    /// replaced rather than treated as a stream failure.
    pub async fn read_command<R>(&self, reader: &mut R) -> Result<Command, ReadError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Err(ReadError::EndOfInput);
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\r', '\n']);
            debug!(line, "input from tester");

            match self.parse(line) {
                Some(command) => return Ok(command),
                None if line.trim().is_empty() => {}
                None => debug!(line, "could not get command from line"),
            }
        }
    }
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    match line.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
