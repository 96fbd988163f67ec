// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Engine channel configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for an engine channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub executable: PathBuf,
    /// Command arguments. Defaults to the API-mode flag the engine expects.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Per-request reply timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Per-attempt wait on the response queue while a request is pending.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Delay between spawn and the first liveness probe.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// How long `stop` waits for a natural exit before force-killing.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_ms: u64,
}

fn default_args() -> Vec<String> {
    vec!["--api".to_string()]
}

fn default_request_timeout() -> u64 {
    5000
}

fn default_poll_interval() -> u64 {
    500
}

fn default_settle_delay() -> u64 {
    500
}

fn default_shutdown_grace() -> u64 {
    2000
}

impl EngineConfig {
    /// Create a config for the given executable with default timings.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: default_args(),
            request_timeout_ms: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            settle_delay_ms: default_settle_delay(),
            shutdown_grace_ms: default_shutdown_grace(),
        }
    }

    /// Replace the command arguments.
    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the per-request reply timeout.
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    /// Set the settle delay before the first liveness probe.
    pub fn with_settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Set the shutdown grace window.
    pub fn with_shutdown_grace_ms(mut self, ms: u64) -> Self {
        self.shutdown_grace_ms = ms;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new("/opt/bin/deadlock");
        assert_eq!(config.args, vec!["--api".to_string()]);
        assert_eq!(config.request_timeout(), Duration::from_millis(5000));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.shutdown_grace(), Duration::from_millis(2000));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new("/bin/sh")
            .with_args(&["-c", "cat"])
            .with_request_timeout_ms(250)
            .with_settle_delay_ms(0)
            .with_shutdown_grace_ms(100);

        assert_eq!(config.args, vec!["-c".to_string(), "cat".to_string()]);
        assert_eq!(config.request_timeout_ms, 250);
        assert_eq!(config.settle_delay_ms, 0);
        assert_eq!(config.shutdown_grace_ms, 100);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"executable": "/opt/bin/deadlock"}"#).unwrap();
        assert_eq!(config.args, vec!["--api".to_string()]);
        assert_eq!(config.request_timeout_ms, 5000);
    }
}
