// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging Initialization (§10)
//!
//! Installs the process-wide `tracing` subscriber. This is §4.P's very
//! first initialization step, run before any other component, so this
//! module owns the one-time global install and everything else just calls
//! `tracing::info!`/`warn!`/etc. directly.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Initializes the global subscriber. `json` selects newline-delimited JSON
/// output (`--log-json`); otherwise a compact human-readable format is used.
/// `AUTOCOMP_LOG` overrides the default level per module (e.g.
/// `autocomp=debug,autocomp_domain=info`).
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_env("AUTOCOMP_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.compact().try_init();
    }
}

/// Allocates the next per-connection correlation id (§10: "a `u64`
/// connection counter, not a full UUID").
pub fn next_connection_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
