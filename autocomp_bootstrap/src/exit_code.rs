// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Maps bootstrap and application failures onto process exit codes, following
//! the BSD `sysexits.h` convention the original server's man page documents
//! (e.g. `EX_DATAERR` for malformed arguments).

/// Process exit codes, a subset of `sysexits.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    /// Command line usage error.
    Usage = 64,
    /// Input data was incorrect in some way.
    DataErr = 65,
    /// Could not open input (decision tree, source file).
    NoInput = 66,
    /// Could not allocate a resource the OS is responsible for (socket, FIFO).
    OsErr = 71,
    /// Generic unrecoverable failure.
    Software = 70,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Maps an `anyhow::Error` to an exit code by inspecting the error chain for
/// known causes; anything unrecognized becomes `Software`.
pub fn map_error_to_exit_code(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<clap::Error>().is_some() {
        return ExitCode::Usage;
    }
    if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
        return match io_err.kind() {
            std::io::ErrorKind::NotFound => ExitCode::NoInput,
            _ => ExitCode::OsErr,
        };
    }
    ExitCode::Software
}

/// Converts a top-level `Result` into a process exit code, logging the error
/// chain on failure.
pub fn result_to_exit_code(result: anyhow::Result<()>) -> std::process::ExitCode {
    match result {
        Ok(()) => ExitCode::Ok.into(),
        Err(err) => {
            tracing::error!("fatal: {err:#}");
            map_error_to_exit_code(&err).into()
        }
    }
}
