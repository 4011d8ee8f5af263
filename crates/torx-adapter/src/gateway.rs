// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Boundary between the protocol engine and the SUT-specific adapter part.
//!
//! The engine calls a [`StimulusGateway`] to apply stimuli and to shut the SUT
//! side down. The gateway reports back through an [`AdapterHandle`]: it
//! enqueues observations and signals end-of-test when the SUT ends the
//! interaction on its own.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use crate::queue::{ObservationQueue, ObservationSender};
use crate::sut::CodecError;

/// Errors reported by a gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The SUT side declined the stimulus.
    #[error("stimulus rejected: {0}")]
    Rejected(String),

    /// The label has no wire encoding.
    #[error(transparent)]
    Encode(#[from] CodecError),

    /// Writing to or reading from the SUT failed.
    #[error("SUT I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No command was given for the SUT.
    #[error("no SUT command given")]
    EmptyCommand,

    /// The SUT process could not be started.
    #[error("failed to start SUT: {0}")]
    Spawn(String),

    /// The SUT was already stopped.
    #[error("SUT is not running")]
    NotRunning,
}

/// SUT-specific part of the adapter.
#[async_trait]
pub trait StimulusGateway: Send + Sync {
    /// Wait until the SUT side can take stimuli. Awaited before the
    /// handshake is acknowledged.
    async fn ready(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Try to apply the stimulus `label`.
    ///
    /// Returns the label that was actually applied, which may differ from the
    /// requested one.
    async fn apply_stimulus(&self, label: &str) -> Result<String, GatewayError>;

    /// Release the SUT side. Called once at the end of the session.
    async fn stop(&self);
}

#[async_trait]
impl<G: StimulusGateway + ?Sized> StimulusGateway for Arc<G> {
    async fn ready(&self) -> Result<(), GatewayError> {
        (**self).ready().await
    }

    async fn apply_stimulus(&self, label: &str) -> Result<String, GatewayError> {
        (**self).apply_stimulus(label).await
    }

    async fn stop(&self) {
        (**self).stop().await
    }
}

/// Handle through which the gateway talks back to the engine.
#[derive(Clone)]
pub struct AdapterHandle {
    observations: ObservationSender,
    end_of_test: Arc<watch::Sender<bool>>,
}

impl AdapterHandle {
    /// Queue an observation for delivery to the tester. Never blocks.
    pub fn enqueue_observation(&self, label: impl Into<String>) {
        self.observations.enqueue(label);
    }

    /// Report that the SUT ended the interaction. The engine leaves its
    /// command loop and stops the gateway.
    pub fn notify_end_of_test(&self) {
        if !self.end_of_test.send_replace(true) {
            info!("end of test signalled");
        }
    }

    pub fn is_end_of_test(&self) -> bool {
        *self.end_of_test.borrow()
    }
}

impl fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterHandle")
            .field("end_of_test", &self.is_end_of_test())
            .finish_non_exhaustive()
    }
}

/// Engine side of the channel created by [`channel`].
#[derive(Debug)]
pub struct Inbox {
    pub(crate) queue: ObservationQueue,
    pub(crate) end_of_test: watch::Receiver<bool>,
}

/// Create a connected handle/inbox pair.
///
/// The handle goes to the gateway, the inbox to the [`Engine`](crate::engine::Engine).
pub fn channel() -> (AdapterHandle, Inbox) {
    let queue = ObservationQueue::new();
    let (end_of_test, end_of_test_rx) = watch::channel(false);
    let handle = AdapterHandle {
        observations: queue.sender(),
        end_of_test: Arc::new(end_of_test),
    };
    let inbox = Inbox {
        queue,
        end_of_test: end_of_test_rx,
    };
    (handle, inbox)
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
