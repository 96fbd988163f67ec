// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Engine channel client.
//!
//! This module owns the lifetime of the engine process and the single
//! command channel to it: spawn with the API-mode flag, write one encoded
//! command line to stdin, and let a background reader task drain stdout
//! into a response queue that the waiting caller pops from.
//!
//! The wire carries no request identifier, so the channel enforces
//! single-flight: a mutex serializes the whole write-then-wait sequence,
//! and replies left behind by a timed-out request are drained before the
//! next one goes out.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as EngineProcess};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::protocol::{decode_line, Command, Response};

/// Client for one engine process.
///
/// The channel moves between two states: stopped and running. `start` and
/// `stop` are both idempotent, and an unexpected engine exit moves the
/// channel back to stopped so later sends fail cleanly instead of hanging.
pub struct EngineClient {
    /// Channel configuration.
    config: EngineConfig,
    /// Engine process handle, present exactly while the channel is running.
    process: Mutex<Option<Child>>,
    /// Engine stdin, taken out of the child so `stop` can close it to
    /// signal EOF.
    stdin: Mutex<Option<ChildStdin>>,
    /// Receiving end of the response queue fed by the reader task.
    responses: Mutex<Option<mpsc::UnboundedReceiver<Response>>>,
    /// Running flag, shared with the reader task.
    running: Arc<AtomicBool>,
    /// Lines on stdout that failed to decode (tolerated noise).
    discarded_lines: Arc<AtomicU64>,
    /// Replies drained because their caller had already timed out.
    stale_replies: AtomicU64,
    /// Single-flight guard around the write-then-wait sequence.
    flight: Mutex<()>,
}

impl EngineClient {
    /// Create a client for the given engine. Does not spawn anything.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
            stdin: Mutex::new(None),
            responses: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
            discarded_lines: Arc::new(AtomicU64::new(0)),
            stale_replies: AtomicU64::new(0),
            flight: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the channel believes the engine is up.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Count of stdout lines dropped as non-protocol noise.
    pub fn discarded_lines(&self) -> u64 {
        self.discarded_lines.load(Ordering::Relaxed)
    }

    /// Count of replies discarded because their request had timed out.
    pub fn stale_replies(&self) -> u64 {
        self.stale_replies.load(Ordering::Relaxed)
    }

    // === Lifecycle ===

    /// Spawn the engine and start the reader task.
    ///
    /// No-op if already running. Does not wait for the `ready` handshake;
    /// call [`EngineClient::ensure_ready`] to probe liveness.
    pub async fn start(&self) -> EngineResult<()> {
        if self.is_running() {
            return Ok(());
        }

        let path = self.config.executable();
        if !path.exists() {
            return Err(EngineError::ExecutableNotFound(path.to_path_buf()));
        }

        let mut child = EngineProcess::new(path)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::StartupFailed(format!("{}: {}", path.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::StartupFailed("failed to open engine stdin".to_string()))?;
        let stdout = child.stdout.take().ok_or_else(|| {
            EngineError::StartupFailed("failed to open engine stdout".to_string())
        })?;

        let (tx, rx) = mpsc::unbounded_channel();

        *self.process.lock().await = Some(child);
        *self.stdin.lock().await = Some(stdin);
        *self.responses.lock().await = Some(rx);
        self.running.store(true, Ordering::SeqCst);
        self.spawn_reader(stdout, tx);

        info!(engine = %path.display(), "engine channel started");
        Ok(())
    }

    /// Wait out the settle delay, then ping the engine.
    ///
    /// A non-success reply to the probe is a fatal startup error; the
    /// engine is assumed unusable and should be stopped.
    pub async fn ensure_ready(&self) -> EngineResult<Response> {
        sleep(self.config.settle_delay()).await;
        let response = self.send(Command::new("ping")).await?;
        if !response.is_success() {
            return Err(EngineError::StartupFailed(format!(
                "liveness probe failed: {}",
                response.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(response)
    }

    /// Shut the engine down.
    ///
    /// Sends a best-effort `shutdown` command (errors swallowed, the engine
    /// may already be unresponsive), closes stdin, waits out the grace
    /// window, then force-kills. Safe to call twice; always releases the
    /// process handle.
    pub async fn stop(&self) -> EngineResult<()> {
        if self.is_running() {
            if let Err(err) = self.notify(Command::new("shutdown")).await {
                debug!(%err, "shutdown notify failed, proceeding to terminate");
            }
        }
        self.running.store(false, Ordering::SeqCst);

        // Closing stdin signals EOF, letting the engine exit its read loop.
        self.stdin.lock().await.take();
        self.responses.lock().await.take();

        if let Some(mut child) = self.process.lock().await.take() {
            match timeout(self.config.shutdown_grace(), child.wait()).await {
                Ok(Ok(status)) => debug!(%status, "engine exited"),
                Ok(Err(err)) => warn!(%err, "failed to reap engine process"),
                Err(_) => {
                    warn!("engine did not exit within grace window, killing");
                    let _ = child.kill().await;
                }
            }
        }

        Ok(())
    }

    // === Command gateway ===

    /// Send a command and wait for its reply, using the configured timeout.
    pub async fn send(&self, command: Command) -> EngineResult<Response> {
        self.send_with_timeout(command, self.config.request_timeout())
            .await
    }

    /// Send a command and wait up to `window` for its reply.
    ///
    /// The startup `ready` handshake is skipped, never delivered as a
    /// reply. On timeout the channel stays running; a later send can still
    /// succeed.
    pub async fn send_with_timeout(
        &self,
        command: Command,
        window: Duration,
    ) -> EngineResult<Response> {
        let _flight = self.flight.lock().await;
        self.drain_stale().await;
        self.write_line(&command).await?;
        self.wait_reply(command.name(), window).await
    }

    /// Send a command without waiting for a reply.
    ///
    /// Fire-and-forget: returns as soon as the line is written, and never
    /// touches the response queue.
    pub async fn notify(&self, command: Command) -> EngineResult<()> {
        let _flight = self.flight.lock().await;
        self.write_line(&command).await
    }

    async fn write_line(&self, command: &Command) -> EngineResult<()> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }

        let line = command.encode();
        trace!(command = command.name(), "sending command");

        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or(EngineError::NotRunning)?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| EngineError::SendFailed(e.to_string()))?;
        stdin
            .write_all(b"\n")
            .await
            .map_err(|e| EngineError::SendFailed(e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| EngineError::SendFailed(e.to_string()))?;
        Ok(())
    }

    async fn wait_reply(&self, command: &str, window: Duration) -> EngineResult<Response> {
        let deadline = Instant::now() + window;
        let mut guard = self.responses.lock().await;
        let rx = guard.as_mut().ok_or(EngineError::NotRunning)?;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(command, "timed out waiting for engine reply");
                return Err(EngineError::Timeout(window.as_millis() as u64));
            }

            let step = remaining.min(self.config.poll_interval());
            match timeout(step, rx.recv()).await {
                Ok(Some(response)) => {
                    if response.status.is_ready() {
                        debug!("skipping engine ready handshake");
                        continue;
                    }
                    trace!(command, status = ?response.status, "reply received");
                    return Ok(response);
                }
                // Reader gone: the sender side was dropped with the task.
                Ok(None) => return Err(EngineError::NotRunning),
                // Poll window elapsed; re-check the deadline.
                Err(_) => continue,
            }
        }
    }

    /// Discard anything queued before a new request goes out.
    ///
    /// A reply that arrives after its caller timed out must not be handed
    /// to the next caller. The unsolicited `ready` handshake may also still
    /// be queued here and is dropped without counting it as stale.
    async fn drain_stale(&self) {
        let mut guard = self.responses.lock().await;
        let Some(rx) = guard.as_mut() else {
            return;
        };
        while let Ok(response) = rx.try_recv() {
            if response.status.is_ready() {
                debug!("dropping engine ready handshake");
            } else {
                self.stale_replies.fetch_add(1, Ordering::Relaxed);
                warn!(status = ?response.status, "discarding stale reply from a timed-out request");
            }
        }
    }

    // === Asynchronous reader ===

    /// Spawn the background task that drains engine stdout.
    ///
    /// The task holds no lock the gateway could be waiting under; the mpsc
    /// channel is the only synchronization between the two.
    fn spawn_reader(&self, stdout: ChildStdout, tx: mpsc::UnboundedSender<Response>) {
        let running = Arc::clone(&self.running);
        let discarded = Arc::clone(&self.discarded_lines);

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match decode_line(&line) {
                        Some(response) => {
                            if tx.send(response).is_err() {
                                break;
                            }
                        }
                        None => {
                            if !line.trim().is_empty() {
                                discarded.fetch_add(1, Ordering::Relaxed);
                                debug!(line = %line.trim(), "discarding non-protocol output");
                            }
                        }
                    },
                    Ok(None) => {
                        // EOF. Expected during a deliberate stop; anything
                        // else means the engine died under us.
                        if running.swap(false, Ordering::SeqCst) {
                            warn!("engine closed its output stream unexpectedly");
                            let _ = tx.send(Response::synthetic_error(
                                "engine closed its output stream",
                            ));
                        }
                        break;
                    }
                    Err(err) => {
                        if running.swap(false, Ordering::SeqCst) {
                            warn!(%err, "engine read failed");
                            let _ = tx
                                .send(Response::synthetic_error(format!("engine read failed: {err}")));
                        }
                        break;
                    }
                }
            }
            trace!("engine reader task finished");
        });
    }
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("executable", &self.config.executable)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_before_start_fails() {
        let client = EngineClient::new(EngineConfig::new("/nonexistent/engine"));
        let err = client.send(Command::new("ping")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotRunning));
    }

    #[tokio::test]
    async fn test_notify_before_start_fails() {
        let client = EngineClient::new(EngineConfig::new("/nonexistent/engine"));
        let err = client.notify(Command::new("shutdown")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotRunning));
    }

    #[tokio::test]
    async fn test_start_missing_executable() {
        let client = EngineClient::new(EngineConfig::new("/nonexistent/engine"));
        let err = client.start().await.unwrap_err();
        assert!(matches!(err, EngineError::ExecutableNotFound(_)));
        assert!(!client.is_running());
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let client = EngineClient::new(EngineConfig::new("/nonexistent/engine"));
        client.stop().await.unwrap();
        client.stop().await.unwrap();
        assert!(!client.is_running());
    }
}
