// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Shutdown Notifier
//!
//! The server's acceptor (§4.N) multiplex-waits on its listening socket and
//! a second file descriptor used purely as a shutdown signal. This module
//! owns that second descriptor: a named FIFO at a fixed path, unlinked and
//! recreated at startup, with `SIGINT`/`SIGTERM`/`SIGQUIT` handlers that
//! each write a single byte to it. A second occurrence of the same signal
//! re-raises the default disposition, so an operator can always force-kill
//! a stuck server.
//!
//! This intentionally has nothing to do with `tokio::sync::Notify` — the
//! acceptor is a plain blocking thread (§5), so the notifier is a real fd
//! it can `poll(2)` alongside the listening socket.

use std::fs::File;
use std::io::Write;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("failed to create shutdown FIFO at {path}: {source}")]
    CreateFifo { path: PathBuf, source: std::io::Error },

    #[error("failed to register signal handler: errno {0}")]
    SignalRegistration(i32),
}

/// Tracks whether shutdown has already been requested once, so the second
/// SIGINT/SIGTERM/SIGQUIT re-raises instead of being swallowed.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static NOTIFIER_WRITE_FD: std::sync::atomic::AtomicI32 = std::sync::atomic::AtomicI32::new(-1);

/// A FIFO-backed shutdown notifier, owned by the server for its lifetime.
///
/// `read_fd` is what the acceptor polls; `write_fd` is what the signal
/// handler writes to. Both point at the same FIFO but are opened
/// separately (read end non-blocking per `poll`, write end used only for
/// the one-byte doorbell).
pub struct ShutdownNotifier {
    path: PathBuf,
    read_file: File,
    run: Arc<AtomicBool>,
}

impl ShutdownNotifier {
    /// Creates (or recreates) the FIFO at `path`, registers Unix signal
    /// handlers, and returns a notifier the acceptor can poll.
    pub fn install(path: impl AsRef<Path>) -> Result<Self, ShutdownError> {
        let path = path.as_ref().to_path_buf();
        Self::recreate_fifo(&path)?;

        // Open read-write so the read end never sees EOF between writers,
        // matching the FIFO idiom used by the original server.
        let read_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| ShutdownError::CreateFifo { path: path.clone(), source })?;

        let write_fd = read_file.as_raw_fd();
        NOTIFIER_WRITE_FD.store(write_fd, Ordering::SeqCst);
        SHUTDOWN_REQUESTED.store(false, Ordering::SeqCst);

        Self::register_signal_handlers()?;

        Ok(Self {
            path,
            read_file,
            run: Arc::new(AtomicBool::new(true)),
        })
    }

    #[cfg(unix)]
    fn recreate_fifo(path: &Path) -> Result<(), ShutdownError> {
        // Unlink any stale FIFO from a prior crashed run (§6: "unlinks any
        // stale one first"); ENOENT is expected and not an error.
        let c_path = std::ffi::CString::new(path.as_os_str().as_encoded_bytes())
            .expect("shutdown FIFO path must not contain NUL bytes");
        unsafe {
            libc::unlink(c_path.as_ptr());
        }
        let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
        if rc != 0 {
            return Err(ShutdownError::CreateFifo {
                path: path.to_path_buf(),
                source: std::io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    #[cfg(unix)]
    fn register_signal_handlers() -> Result<(), ShutdownError> {
        for &sig in &[libc::SIGINT, libc::SIGTERM, libc::SIGQUIT] {
            let rc = unsafe { libc::signal(sig, handle_signal as libc::sighandler_t) };
            if rc == libc::SIG_ERR {
                return Err(ShutdownError::SignalRegistration(
                    std::io::Error::last_os_error().raw_os_error().unwrap_or(-1),
                ));
            }
        }
        Ok(())
    }

    /// The descriptor the acceptor should include in its `poll(2)` set
    /// alongside the listening socket.
    pub fn read_fd(&self) -> RawFd {
        self.read_file.as_raw_fd()
    }

    /// Drains one byte written by a signal handler (or by `request_shutdown`)
    /// and flips the run flag. Per §4.N: "read one byte to drain, set the
    /// run flag to false".
    pub fn drain_and_stop(&self) {
        let mut buf = [0u8; 1];
        let _ = std::io::Read::read(&mut &self.read_file, &mut buf);
        self.run.store(false, Ordering::SeqCst);
    }

    pub fn should_run(&self) -> bool {
        self.run.load(Ordering::SeqCst)
    }

    /// Programmatic shutdown request (used by tests and by an admin
    /// command), equivalent in effect to a signal firing.
    pub fn request_shutdown(&self) -> std::io::Result<()> {
        (&self.read_file).write_all(&[1u8])
    }
}

impl Drop for ShutdownNotifier {
    fn drop(&mut self) {
        NOTIFIER_WRITE_FD.store(-1, Ordering::SeqCst);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Signal-safe handler: writes one byte to the notifier fd. On the second
/// delivery of the same signal, restores the default disposition and
/// re-raises so the process actually terminates.
#[cfg(unix)]
extern "C" fn handle_signal(sig: libc::c_int) {
    let already_requested = SHUTDOWN_REQUESTED.swap(true, Ordering::SeqCst);
    if already_requested {
        unsafe {
            libc::signal(sig, libc::SIG_DFL as libc::sighandler_t);
            libc::raise(sig);
        }
        return;
    }

    let fd = NOTIFIER_WRITE_FD.load(Ordering::SeqCst);
    if fd >= 0 {
        let byte: u8 = 1;
        unsafe {
            libc::write(fd, &byte as *const u8 as *const libc::c_void, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_creates_and_removes_fifo() {
        let dir = std::env::temp_dir().join(format!("autocomp-test-fifo-{}", std::process::id()));
        let notifier = ShutdownNotifier::install(&dir).unwrap();
        assert!(dir.exists());
        assert!(notifier.should_run());
        drop(notifier);
        assert!(!dir.exists());
    }

    #[test]
    fn request_shutdown_drains_and_stops() {
        let dir = std::env::temp_dir().join(format!("autocomp-test-fifo2-{}", std::process::id()));
        let notifier = ShutdownNotifier::install(&dir).unwrap();
        notifier.request_shutdown().unwrap();
        notifier.drain_and_stop();
        assert!(!notifier.should_run());
    }
}
