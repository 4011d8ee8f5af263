// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SUT child process behind a [`StimulusGateway`].
//!
//! The SUT is spawned with all three standard streams piped. Stimuli are
//! written to its stdin; a reader task frames its stdout, decodes each frame
//! and enqueues the label as an observation. When stdout closes the reader
//! signals end-of-test. Stderr lines are relayed to the log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter,
};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::codec::{Framing, LabelCodec};
use crate::gateway::{AdapterHandle, GatewayError, StimulusGateway};

/// How long a stopped SUT gets to exit after its stdin is closed.
const STOP_GRACE: Duration = Duration::from_millis(1000);

/// A SUT process speaking the wire format of codec `C`.
pub struct ProcessGateway<C> {
    codec: Arc<C>,
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<BufWriter<ChildStdin>>>,
    stopped: AtomicBool,
}

impl<C: LabelCodec> ProcessGateway<C> {
    /// Start `command` (program followed by its arguments).
    ///
    /// Observations and end-of-test are reported through `handle`.
    pub async fn spawn(
        command: &[String],
        codec: C,
        handle: AdapterHandle,
    ) -> Result<Self, GatewayError> {
        let (program, args) = command.split_first().ok_or(GatewayError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GatewayError::Spawn(format!("{program}: {e}")))?;

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(GatewayError::Spawn(format!("{program}: stdio not piped")));
        };
        info!(program = %program, pid = ?child.id(), "started SUT");

        let codec = Arc::new(codec);
        tokio::spawn(read_observations(stdout, Arc::clone(&codec), handle));
        tokio::spawn(relay_stderr(stderr));

        Ok(Self {
            codec,
            child: Mutex::new(Some(child)),
            stdin: Mutex::new(Some(BufWriter::new(stdin))),
            stopped: AtomicBool::new(false),
        })
    }

    /// Check if the SUT process is still running.
    pub async fn is_running(&self) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            return false;
        }

        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

#[async_trait]
impl<C: LabelCodec> StimulusGateway for ProcessGateway<C> {
    async fn ready(&self) -> Result<(), GatewayError> {
        if self.is_running().await {
            Ok(())
        } else {
            Err(GatewayError::NotRunning)
        }
    }

    async fn apply_stimulus(&self, label: &str) -> Result<String, GatewayError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(GatewayError::NotRunning);
        }
        let frame = self.codec.encode(label)?;

        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or(GatewayError::NotRunning)?;
        stdin.write_all(&frame).await?;
        stdin.flush().await?;
        debug!(label, bytes = frame.len(), "wrote stimulus");

        Ok(label.to_string())
    }

    /// Close stdin, give the SUT [`STOP_GRACE`] to exit, then kill it.
    async fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(mut stdin) = self.stdin.lock().await.take() {
            if let Err(err) = stdin.shutdown().await {
                debug!(error = %err, "failed to close SUT stdin");
            }
        }

        let Some(mut child) = self.child.lock().await.take() else {
            return;
        };
        match timeout(STOP_GRACE, child.wait()).await {
            Ok(Ok(status)) => info!(%status, "SUT exited"),
            Ok(Err(err)) => warn!(error = %err, "failed to wait for SUT"),
            Err(_) => {
                warn!("SUT did not exit, killing it");
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill SUT");
                }
            }
        }
    }
}

/// Frame `reader` per the codec and enqueue every decodable frame.
///
/// Signals end-of-test once the stream ends or fails.
pub(crate) async fn read_observations<R, C>(reader: R, codec: Arc<C>, handle: AdapterHandle)
where
    R: AsyncRead + Unpin,
    C: LabelCodec,
{
    let mut reader = BufReader::new(reader);
    let read = match codec.framing() {
        Framing::Line => read_lines(&mut reader, codec.as_ref(), &handle).await,
        Framing::Byte => read_bytes(&mut reader, codec.as_ref(), &handle).await,
    };
    match read {
        Ok(()) => info!("SUT closed its output"),
        Err(err) => warn!(error = %err, "failed to read SUT output"),
    }
    handle.notify_end_of_test();
}

async fn read_lines<R, C>(reader: &mut R, codec: &C, handle: &AdapterHandle) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    C: LabelCodec,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        deliver(codec, handle, &buf);
    }
}

async fn read_bytes<R, C>(reader: &mut R, codec: &C, handle: &AdapterHandle) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    C: LabelCodec,
{
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte).await? == 0 {
            return Ok(());
        }
        deliver(codec, handle, &byte);
    }
}

fn deliver<C: LabelCodec>(codec: &C, handle: &AdapterHandle, frame: &[u8]) {
    match codec.decode(frame) {
        Some(label) => {
            debug!(label = %label, "observation from SUT");
            handle.enqueue_observation(label);
        }
        None => debug!(?frame, "dropping undecodable SUT output"),
    }
}

/// Log each stderr line until EOF. Bytes that are not UTF-8 are replaced so
/// the pipe stays drained.
async fn relay_stderr<R: AsyncRead + Unpin>(reader: R) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                info!(line = %line.trim_end_matches(['\r', '\n']), "SUT stderr");
            }
            Err(err) => {
                debug!(error = %err, "stopped relaying SUT stderr");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
