// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TorX adapter
//!
//! Bridges the JTorX model-based tester and a system under test. JTorX sends
//! line commands (`C_IOKIND`, `C_INPUT`, `C_OUTPUT`, `C_QUIT`) and expects one
//! response line for each. The [`engine`] serves that protocol, the
//! [`gateway`] trait is the seam to the SUT, and [`sut`] provides a gateway
//! driving the SUT as a child process.

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod gateway;
pub mod protocol;
pub mod queue;
pub mod sut;
