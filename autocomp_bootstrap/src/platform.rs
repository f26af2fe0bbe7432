// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Abstraction Module
//!
//! A small, synchronous OS abstraction: CPU count (used to size the request
//! and transmission worker pools, §4.O) and a platform name for log banners.
//! Selection between Unix and Windows implementations happens at compile
//! time via `#[cfg]`; there is no async anywhere in this crate.

use std::path::PathBuf;
use thiserror::Error;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixPlatform;

#[cfg(windows)]
pub use windows::WindowsPlatform;

/// Platform-specific errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not supported on this platform: {0}")]
    NotSupported(String),
}

/// OS-level queries the bootstrap layer needs before starting the server or
/// client: how many worker threads to size pools for, and where to put the
/// shutdown FIFO by default.
pub trait Platform: Send + Sync {
    /// Number of logical CPUs, used to size the request and transmission
    /// pools (§4.O) when `-t` is not given.
    fn cpu_count(&self) -> usize;

    /// Platform identifier for log banners: "linux", "macos", "windows".
    fn platform_name(&self) -> &'static str;

    /// Default directory for the shutdown FIFO and other runtime sockets.
    fn runtime_dir(&self) -> PathBuf;
}

#[cfg(unix)]
type PlatformImpl = UnixPlatform;

#[cfg(windows)]
type PlatformImpl = WindowsPlatform;

/// Returns the platform implementation for the current OS, selected at
/// compile time.
pub fn create_platform() -> Box<dyn Platform> {
    Box::new(PlatformImpl::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_platform_reports_at_least_one_cpu() {
        let platform = create_platform();
        assert!(platform.cpu_count() >= 1);
        assert!(!platform.platform_name().is_empty());
    }
}
