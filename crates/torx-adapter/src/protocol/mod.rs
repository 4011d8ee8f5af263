// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TorX-adapter protocol messages.
//!
//! JTorX writes one command per line (`C_*` keywords) and expects exactly one
//! response line (`A_*` keywords) for each of them.

pub mod command;
pub mod response;

pub use command::{Command, CommandParser, Keyword, ReadError, EVENT_FIELD};
pub use response::{Response, QUIESCENCE_LABEL};
