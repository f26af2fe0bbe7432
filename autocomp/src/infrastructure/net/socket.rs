// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Send-Buffer-Introspecting Socket (§4.G, §9 "Pipeline backpressure")
//!
//! §9 calls out the source's raw `ioctl` polling of bytes queued in the
//! kernel socket send buffer as an implementation detail to keep behind an
//! abstraction: `bytes_in_send_buffer() -> usize`. This module provides
//! that abstraction over a real `TcpStream` (via `TIOCOUTQ` on Linux/macOS)
//! plus a `send_buffer_capacity` the server fixes at startup (§4.P: "set
//! acceptor's send-buffer capacity").

use std::io::{self, Read, Write};
use std::net::TcpStream;

/// Everything the adaptive selector (§4.J) and the bandwidth estimator
/// (§4.G) need to know about a connection's outgoing kernel buffer.
pub trait SendBufferSocket: Read + Write + Send {
    /// Bytes currently queued in the kernel's send buffer for this socket,
    /// not yet acknowledged by the peer's TCP stack.
    fn bytes_in_send_buffer(&self) -> io::Result<usize>;

    /// The fixed capacity configured for this connection's send buffer
    /// (§4.P: "set acceptor's send-buffer capacity (e.g., 12 MB)").
    fn send_buffer_capacity(&self) -> usize;

    /// `bytes_in_send_buffer() / send_buffer_capacity()`, clamped to
    /// `[0, 1]` — the "send-buffer load" from the glossary.
    fn send_buffer_load(&self) -> f32 {
        let in_buf = self.bytes_in_send_buffer().unwrap_or(0) as f32;
        (in_buf / self.send_buffer_capacity() as f32).clamp(0.0, 1.0)
    }
}

/// A real TCP connection, queried via `TIOCOUTQ` on Unix.
pub struct TcpSendSocket {
    stream: TcpStream,
    capacity: usize,
}

impl TcpSendSocket {
    pub fn new(stream: TcpStream, capacity: usize) -> Self {
        Self { stream, capacity }
    }

    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(Self { stream: self.stream.try_clone()?, capacity: self.capacity })
    }

    pub fn inner(&self) -> &TcpStream {
        &self.stream
    }
}

impl Read for TcpSendSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpSendSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl SendBufferSocket for TcpSendSocket {
    #[cfg(unix)]
    fn bytes_in_send_buffer(&self) -> io::Result<usize> {
        use std::os::unix::io::AsRawFd;
        let fd = self.stream.as_raw_fd();
        let mut queued: libc::c_int = 0;
        // SAFETY: `fd` is a valid, open socket owned by `self.stream`;
        // `TIOCOUTQ` writes a single `c_int` through `&mut queued`.
        let rc = unsafe { libc::ioctl(fd, libc::TIOCOUTQ, &mut queued as *mut libc::c_int) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(queued.max(0) as usize)
    }

    #[cfg(not(unix))]
    fn bytes_in_send_buffer(&self) -> io::Result<usize> {
        Ok(0)
    }

    fn send_buffer_capacity(&self) -> usize {
        self.capacity
    }
}

/// A fixed-reading stand-in used by selector/estimator tests, where driving
/// an actual kernel send buffer to a specific fill level isn't practical.
#[cfg(test)]
pub struct FixedLoadSocket {
    pub in_buffer: usize,
    pub capacity: usize,
    pub written: Vec<u8>,
}

#[cfg(test)]
impl FixedLoadSocket {
    pub fn new(in_buffer: usize, capacity: usize) -> Self {
        Self { in_buffer, capacity, written: Vec::new() }
    }
}

#[cfg(test)]
impl Read for FixedLoadSocket {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
impl Write for FixedLoadSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl SendBufferSocket for FixedLoadSocket {
    fn bytes_in_send_buffer(&self) -> io::Result<usize> {
        Ok(self.in_buffer)
    }

    fn send_buffer_capacity(&self) -> usize {
        self.capacity
    }
}
