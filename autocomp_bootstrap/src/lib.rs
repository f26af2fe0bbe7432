// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** the server/client application logic
//! and provides the pieces every long-running Unix process needs before its
//! first real line of work: CLI parsing, a shutdown notifier, and platform
//! queries (CPU count).
//!
//! Unlike the rest of the workspace, nothing here runs on an async runtime —
//! the server and client are plain OS threads (see the core crate), so
//! bootstrap exposes blocking, synchronous APIs throughout.

pub mod cli;
pub mod exit_code;
pub mod platform;

// The shutdown notifier is a POSIX FIFO (§6); Windows deployment would need
// a different doorbell mechanism and is not implemented here.
#[cfg(unix)]
pub mod shutdown;

pub use cli::{ClientArgs, ServerArgs};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};
pub use platform::{create_platform, Platform};
