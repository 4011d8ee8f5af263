// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire encodings between model labels and SUT I/O.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

/// How SUT output is cut into frames before decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// One frame per newline-terminated line.
    Line,
    /// One frame per byte.
    Byte,
}

/// Errors from encoding labels or loading a label table.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("no encoding for label {0:?}")]
    UnknownLabel(String),

    #[error("label {0:?} cannot be sent as a single line")]
    Unframeable(String),

    #[error("failed to read label table: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid label table: {0}")]
    Table(#[from] toml::de::Error),

    #[error("byte {byte:#04x} decodes to both {first:?} and {second:?}")]
    DuplicateByte {
        byte: u8,
        first: String,
        second: String,
    },
}

/// Maps labels to the bytes the SUT understands and back.
pub trait LabelCodec: Send + Sync + 'static {
    fn framing(&self) -> Framing;

    /// Encode a stimulus label.
    fn encode(&self, label: &str) -> Result<Vec<u8>, CodecError>;

    /// Decode one output frame. `None` drops the frame.
    fn decode(&self, frame: &[u8]) -> Option<String>;
}

/// Labels travel as text lines, unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineCodec;

impl LabelCodec for LineCodec {
    fn framing(&self) -> Framing {
        Framing::Line
    }

    fn encode(&self, label: &str) -> Result<Vec<u8>, CodecError> {
        if label.contains(['\n', '\r']) {
            return Err(CodecError::Unframeable(label.to_string()));
        }
        Ok(format!("{label}\n").into_bytes())
    }

    fn decode(&self, frame: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(frame);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}

/// One byte per label, in both directions.
///
/// A table file looks like:
///
/// ```toml
/// [stimuli]
/// "n?" = 0x01
///
/// [observations]
/// "done!" = 0x01
/// ```
#[derive(Clone, Debug, Default)]
pub struct ByteCodec {
    stimuli: HashMap<String, u8>,
    observations: HashMap<u8, String>,
}

#[derive(Debug, Deserialize)]
struct LabelTable {
    #[serde(default)]
    stimuli: BTreeMap<String, u8>,
    #[serde(default)]
    observations: BTreeMap<String, u8>,
}

impl ByteCodec {
    /// Build a codec from label/byte pairs.
    ///
    /// Stimuli may share a byte. Two observations may not, since the byte
    /// could not be decoded.
    pub fn new<S, O, K, L>(stimuli: S, observations: O) -> Result<Self, CodecError>
    where
        S: IntoIterator<Item = (K, u8)>,
        O: IntoIterator<Item = (L, u8)>,
        K: Into<String>,
        L: Into<String>,
    {
        let stimuli = stimuli
            .into_iter()
            .map(|(label, byte)| (label.into(), byte))
            .collect();

        let mut decoded: HashMap<u8, String> = HashMap::new();
        for (label, byte) in observations {
            let label = label.into();
            if let Some(first) = decoded.get(&byte) {
                return Err(CodecError::DuplicateByte {
                    byte,
                    first: first.clone(),
                    second: label,
                });
            }
            decoded.insert(byte, label);
        }

        Ok(Self {
            stimuli,
            observations: decoded,
        })
    }

    /// The farmer/wolf/goat/cabbage river-crossing puzzle.
    pub fn fwgc() -> Self {
        Self {
            stimuli: HashMap::from([
                ("n?".to_string(), 0x01),
                ("g?".to_string(), 0x02),
                ("c?".to_string(), 0x04),
                ("w?".to_string(), 0x08),
            ]),
            observations: HashMap::from([
                (0x01, "done!".to_string()),
                (0x02, "eaten!".to_string()),
                (0x04, "retry!".to_string()),
            ]),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, CodecError> {
        let table: LabelTable = toml::from_str(text)?;
        Self::new(table.stimuli, table.observations)
    }

    /// Load a table file.
    pub fn load(path: &Path) -> Result<Self, CodecError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn stimulus_byte(&self, label: &str) -> Option<u8> {
        self.stimuli.get(label).copied()
    }

    pub fn observation_label(&self, byte: u8) -> Option<&str> {
        self.observations.get(&byte).map(String::as_str)
    }
}

impl LabelCodec for ByteCodec {
    fn framing(&self) -> Framing {
        Framing::Byte
    }

    fn encode(&self, label: &str) -> Result<Vec<u8>, CodecError> {
        self.stimulus_byte(label)
            .map(|byte| vec![byte])
            .ok_or_else(|| CodecError::UnknownLabel(label.to_string()))
    }

    fn decode(&self, frame: &[u8]) -> Option<String> {
        match frame {
            [byte] => self.observation_label(*byte).map(str::to_string),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
