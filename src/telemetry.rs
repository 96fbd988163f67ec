// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracing initialization for the raglink binary.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set. Safe to call
/// once per process; later calls are ignored.
pub fn init(default_level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("raglink={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Pick a default level from CLI verbosity flags.
pub fn level_from_flags(verbose: bool, debug: bool) -> Level {
    if debug {
        Level::TRACE
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(false, false), Level::INFO);
        assert_eq!(level_from_flags(true, false), Level::DEBUG);
        assert_eq!(level_from_flags(false, true), Level::TRACE);
        assert_eq!(level_from_flags(true, true), Level::TRACE);
    }

    #[test]
    fn test_init_is_idempotent() {
        init(Level::INFO);
        init(Level::DEBUG);
    }
}
