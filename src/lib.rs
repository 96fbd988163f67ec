// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Raglink - command channel for the OS-EL deadlock detection engine.
//!
//! The engine is an external process that maintains a Resource Allocation
//! Graph, detects deadlocks, and applies recovery strategies. Raglink
//! spawns it once in API mode (`<engine> --api`) and talks to it over its
//! standard pipes: one JSON object per line in each direction, a background
//! task draining stdout into a response queue, and a single-flight gateway
//! matching each reply to the caller waiting for it.
//!
//! # Architecture
//!
//! ```text
//! caller ──▶ EngineClient::send ──▶ encode ──▶ engine stdin
//!                   ▲                              │
//!                   │                         engine stdout
//!             response queue ◀── reader task ◀─────┘
//! ```
//!
//! - [`protocol`] - wire codec: [`protocol::Command`], [`protocol::Response`]
//! - [`config`] - [`config::EngineConfig`]: executable, argv, timeouts
//! - [`client`] - [`client::EngineClient`]: lifecycle, supervisor, gateway
//! - [`ops`] - typed methods for the full command vocabulary
//! - [`error`] - [`error::EngineError`] and result alias
//! - [`telemetry`] - tracing setup for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use raglink::{EngineClient, EngineConfig};
//!
//! let client = EngineClient::new(EngineConfig::new("bin/deadlock"));
//! client.start().await?;
//! client.ensure_ready().await?;
//!
//! let reply = client.add_process("P1", 50).await?;
//! println!("{:?}", reply.data_value());
//!
//! client.stop().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod ops;
pub mod protocol;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use client::EngineClient;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use ops::{RecoveryStrategy, Scenario, SelectionCriteria};
pub use protocol::{decode_line, Command, Response, Status};

/// Raglink version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_exports() {
        let _command = Command::new("ping");
        let _config = EngineConfig::new("/opt/bin/deadlock");
        let _client = EngineClient::new(EngineConfig::new("/opt/bin/deadlock"));
    }
}
