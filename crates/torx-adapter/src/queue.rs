// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observation queue.
//!
//! Many producers (the gateway's SUT readers, on tasks or plain threads) and a
//! single consumer (the protocol engine). Producers never block; the consumer
//! can drain without waiting or wait up to a deadline.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{timeout, Instant};
use tracing::warn;

/// One event reported by the SUT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    label: String,
    timestamp: Instant,
}

impl Observation {
    pub fn new(label: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            label: label.into(),
            timestamp,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// When the observation was enqueued.
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn into_label(self) -> String {
        self.label
    }
}

/// Producer side of the queue. Cheap to clone, usable from any thread.
#[derive(Clone, Debug)]
pub struct ObservationSender {
    tx: UnboundedSender<Observation>,
}

impl ObservationSender {
    /// Timestamp `label` and append it. Never blocks.
    pub fn enqueue(&self, label: impl Into<String>) {
        let observation = Observation::new(label, Instant::now());
        if let Err(err) = self.tx.send(observation) {
            warn!(label = err.0.label(), "observation queue is gone, dropping observation");
        }
    }
}

/// Consumer side of the queue.
#[derive(Debug)]
pub struct ObservationQueue {
    // Held so the channel never reads as closed while the engine waits.
    tx: UnboundedSender<Observation>,
    rx: UnboundedReceiver<Observation>,
}

impl Default for ObservationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Create a producer handle for this queue.
    pub fn sender(&self) -> ObservationSender {
        ObservationSender {
            tx: self.tx.clone(),
        }
    }

    /// Remove the oldest observation if one is already pending.
    pub fn poll_now(&mut self) -> Option<Observation> {
        self.rx.try_recv().ok()
    }

    /// Remove the oldest observation, waiting at most `wait` for one to arrive.
    pub async fn poll_within(&mut self, wait: Duration) -> Option<Observation> {
        if let Some(observation) = self.poll_now() {
            return Some(observation);
        }
        if wait.is_zero() {
            return None;
        }
        // `recv` is cancel safe: a timeout never loses an observation.
        timeout(wait, self.rx.recv()).await.ok().flatten()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
