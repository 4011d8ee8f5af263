// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway to a SUT running as a child process.
//!
//! Stimuli are encoded by a [`LabelCodec`] and written to the SUT's stdin;
//! its stdout is framed and decoded back into observation labels.

pub mod codec;
pub mod process;

pub use codec::{ByteCodec, CodecError, Framing, LabelCodec, LineCodec};
pub use process::ProcessGateway;
