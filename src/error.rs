// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the engine command channel.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur on the engine channel.
///
/// These are channel faults only. An engine reply with an error-family
/// status is business data and comes back as a successful
/// [`crate::protocol::Response`].
#[derive(Error, Debug)]
pub enum EngineError {
    /// The configured executable does not exist; the channel cannot start.
    #[error("engine executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// The process could not be spawned or failed its liveness probe.
    #[error("failed to start engine: {0}")]
    StartupFailed(String),

    /// A request was issued before `start` or after the engine exited.
    #[error("engine channel not running")]
    NotRunning,

    /// The write to the engine's stdin failed (broken pipe, process gone).
    #[error("failed to send command to engine: {0}")]
    SendFailed(String),

    /// No qualifying reply arrived within the allotted window.
    #[error("no reply from engine within {0}ms")]
    Timeout(u64),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Check if the error is retryable on the same channel.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if the channel needs to be restarted before the next request.
    pub fn needs_restart(&self) -> bool {
        matches!(
            self,
            Self::NotRunning | Self::SendFailed(_) | Self::StartupFailed(_)
        )
    }
}

/// Result type for engine channel operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::ExecutableNotFound(PathBuf::from("/opt/bin/deadlock"));
        assert!(err.to_string().contains("/opt/bin/deadlock"));

        let err = EngineError::Timeout(5000);
        assert!(err.to_string().contains("5000ms"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(EngineError::Timeout(5000).is_retryable());
        assert!(!EngineError::NotRunning.is_retryable());
        assert!(!EngineError::SendFailed("broken pipe".to_string()).is_retryable());
    }

    #[test]
    fn test_needs_restart() {
        assert!(EngineError::NotRunning.needs_restart());
        assert!(EngineError::SendFailed("broken pipe".to_string()).needs_restart());
        assert!(!EngineError::Timeout(5000).needs_restart());
    }
}
