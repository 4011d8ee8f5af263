// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TorX-adapter protocol engine.
//!
//! Reads commands from the tester, answers each with exactly one response
//! line, and decides quiescence: a `C_OUTPUT` waits only for what is left of
//! the timeout window opened by the last applied stimulus.
//!
//! # Example
//!
//! ```no_run
//! use torx_adapter::config::AdapterConfig;
//! use torx_adapter::engine::Engine;
//! use torx_adapter::gateway;
//! use torx_adapter::sut::{LineCodec, ProcessGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (handle, inbox) = gateway::channel();
//! let sut = ProcessGateway::spawn(&["my-sut".to_string()], LineCodec, handle).await?;
//!
//! let mut engine = Engine::new(sut, inbox, &AdapterConfig::default());
//! let end = engine.run(tokio::io::stdin(), tokio::io::stdout()).await?;
//! println!("session ended: {end:?}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::gateway::{Inbox, StimulusGateway};
use crate::protocol::{Command, CommandParser, Keyword, ReadError, Response};
use crate::queue::ObservationQueue;

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingHandshake,
    Active,
    Stopped,
}

/// Why the command loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The tester sent `C_QUIT`.
    Quit,
    /// The tester closed its side of the protocol stream.
    EndOfInput,
    /// The gateway signalled end-of-test.
    EndOfTest,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `run` was called on a session that already ended.
    #[error("session already stopped")]
    Stopped,
}

/// Request/response loop between the tester and a [`StimulusGateway`].
pub struct Engine<G> {
    gateway: G,
    queue: ObservationQueue,
    end_of_test: watch::Receiver<bool>,
    parser: CommandParser,
    timeout: Duration,
    state: SessionState,
    last_interaction: Instant,
}

impl<G: StimulusGateway> Engine<G> {
    pub fn new(gateway: G, inbox: Inbox, config: &AdapterConfig) -> Self {
        Self {
            gateway,
            queue: inbox.queue,
            end_of_test: inbox.end_of_test,
            parser: CommandParser::new(),
            timeout: config.timeout,
            state: SessionState::AwaitingHandshake,
            last_interaction: Instant::now(),
        }
    }

    /// Replace the command parser (e.g. to accept extra keywords).
    pub fn with_parser(mut self, parser: CommandParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Time left in the current quiescence window.
    pub fn remaining_budget(&self) -> Duration {
        self.timeout.saturating_sub(self.last_interaction.elapsed())
    }

    /// Serve commands from `input` until quit, end of input, or end-of-test.
    ///
    /// The gateway is stopped before this returns.
    pub async fn run<R, W>(&mut self, input: R, output: W) -> Result<SessionEnd, EngineError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.state == SessionState::Stopped {
            return Err(EngineError::Stopped);
        }

        let mut input = BufReader::new(input);
        let mut output = output;
        self.last_interaction = Instant::now();

        let end = loop {
            let next = tokio::select! {
                biased;
                () = end_of_test_signalled(&mut self.end_of_test) => None,
                read = self.parser.read_command(&mut input) => Some(read),
            };

            let command = match next {
                None => break SessionEnd::EndOfTest,
                Some(Ok(command)) => command,
                Some(Err(ReadError::EndOfInput)) => {
                    info!("tester closed the protocol stream");
                    break SessionEnd::EndOfInput;
                }
                Some(Err(err)) => {
                    warn!(error = %err, "giving up on the protocol stream");
                    break SessionEnd::EndOfInput;
                }
            };

            debug!(command = %command.keyword(), "got command");
            let response = self.handle(&command).await;
            if let Err(err) = response.write_to(&mut output).await {
                warn!(error = %err, %response, "failed to write response");
            }

            if response == Response::Quit {
                if let Err(err) = output.shutdown().await {
                    warn!(error = %err, "failed to close the protocol stream");
                }
                break SessionEnd::Quit;
            }
        };

        info!(?end, "session ended");
        self.gateway.stop().await;
        self.state = SessionState::Stopped;
        Ok(end)
    }

    /// Produce the single response for `command`.
    async fn handle(&mut self, command: &Command) -> Response {
        if self.state == SessionState::AwaitingHandshake && command.keyword() != &Keyword::IoKind {
            warn!(command = %command.keyword(), "command before handshake");
        }

        match command.keyword() {
            Keyword::IoKind => self.handshake().await,
            Keyword::Input => self.stimulus(command.event()).await,
            Keyword::Output => self.observation().await,
            Keyword::Quit => Response::Quit,
            Keyword::Other(word) => {
                warn!(command = %word, "unexpected command");
                Response::Error
            }
        }
    }

    async fn handshake(&mut self) -> Response {
        if let Err(err) = self.gateway.ready().await {
            warn!(error = %err, "SUT side not ready");
            return Response::Error;
        }
        if self.state == SessionState::AwaitingHandshake {
            self.state = SessionState::Active;
            info!("handshake complete");
        }
        Response::IoKind
    }

    async fn stimulus(&mut self, label: Option<&str>) -> Response {
        // Output the SUT already produced must reach the tester before the
        // next stimulus is applied.
        if let Some(pending) = self.queue.poll_now() {
            debug!(label = pending.label(), "delivering pending observation");
            return Response::Output(pending.into_label());
        }

        let Some(label) = label else {
            warn!("stimulus request without an event");
            return Response::InputError;
        };

        match self.gateway.apply_stimulus(label).await {
            Ok(applied) => {
                self.last_interaction = Instant::now();
                debug!(label, applied = %applied, "handled stimulus");
                Response::Input(applied)
            }
            Err(err) => {
                warn!(label, error = %err, "stimulus not applied");
                Response::InputError
            }
        }
    }

    async fn observation(&mut self) -> Response {
        let remaining = self.remaining_budget();
        debug!(remaining_ms = remaining.as_millis() as u64, "waiting for observation");
        match self.queue.poll_within(remaining).await {
            Some(observation) => Response::Output(observation.into_label()),
            None => {
                debug!("quiescence");
                Response::Quiescence
            }
        }
    }
}

/// Resolves once end-of-test is set. Pends forever if every handle is gone
/// without setting it.
async fn end_of_test_signalled(end_of_test: &mut watch::Receiver<bool>) {
    if end_of_test.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
