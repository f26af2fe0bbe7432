// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bandwidth Estimator (§4.G)
//!
//! Lives inline in the send loop (L), not on its own thread: every outgoing
//! write is accounted against a 10 ms rolling window, and once the window
//! has elapsed the bytes that *left* the socket's send buffer since the
//! last sample are taken as the throughput estimate and folded into the
//! shared [`ResourceState`].

use std::sync::Arc;
use std::time::Instant;

use autocomp_domain::value_objects::ResourceState;

use super::socket::SendBufferSocket;

const MIN_WINDOW_MS: u128 = 10;

/// Per-connection accounting state for the bandwidth estimate. One instance
/// lives alongside each connection's send loop; it is not shared across
/// connections.
pub struct BandwidthEstimator {
    base_time: Instant,
    bytes_sent_since_base: u64,
    state: Arc<ResourceState>,
}

impl BandwidthEstimator {
    pub fn new(state: Arc<ResourceState>) -> Self {
        Self { base_time: Instant::now(), bytes_sent_since_base: 0, state }
    }

    /// Call once per outgoing write, after the write has completed, with
    /// the number of bytes just written and the socket it was written to.
    pub fn record_write(&mut self, socket: &impl SendBufferSocket, bytes_written: usize) {
        let elapsed_ms = self.base_time.elapsed().as_millis();
        self.bytes_sent_since_base = self.bytes_sent_since_base.saturating_add(bytes_written as u64);

        if elapsed_ms < MIN_WINDOW_MS {
            return;
        }

        let in_buf_now = socket.bytes_in_send_buffer().unwrap_or(0) as u64;
        let left_buffer = self.bytes_sent_since_base.saturating_sub(in_buf_now);
        let mbps = 8.0 * left_buffer as f64 / (1000.0 * elapsed_ms as f64);
        self.state.set_bandwidth_mbps(mbps as f32);

        self.bytes_sent_since_base = in_buf_now;
        self.base_time = Instant::now();
    }

    /// Per §4.G: "on connection close, set bandwidth to 0".
    pub fn close(&self) {
        self.state.set_bandwidth_mbps(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::net::socket::FixedLoadSocket;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn writes_within_window_accumulate_without_updating_state() {
        let state = Arc::new(ResourceState::new());
        let mut estimator = BandwidthEstimator::new(state.clone());
        let socket = FixedLoadSocket::new(0, 12_000_000);

        estimator.record_write(&socket, 1000);
        assert_eq!(state.bandwidth_mbps(), 0.0);
        assert_eq!(estimator.bytes_sent_since_base, 1000);
    }

    #[test]
    fn write_after_window_elapses_updates_bandwidth() {
        let state = Arc::new(ResourceState::new());
        let mut estimator = BandwidthEstimator::new(state.clone());
        let socket = FixedLoadSocket::new(0, 12_000_000);

        thread::sleep(Duration::from_millis(15));
        estimator.record_write(&socket, 125_000);

        assert!(state.bandwidth_mbps() > 0.0);
    }

    #[test]
    fn bytes_still_queued_in_the_send_buffer_are_not_counted_as_throughput() {
        let state = Arc::new(ResourceState::new());
        let mut estimator = BandwidthEstimator::new(state.clone());
        // First write establishes a baseline of bytes "sent".
        let idle_socket = FixedLoadSocket::new(0, 12_000_000);
        estimator.record_write(&idle_socket, 100_000);

        thread::sleep(Duration::from_millis(15));
        // Everything that left the pipe this window is still sitting in
        // the kernel buffer, so effective throughput should be ~0.
        let full_socket = FixedLoadSocket::new(100_000, 12_000_000);
        estimator.record_write(&full_socket, 0);

        assert_eq!(state.bandwidth_mbps(), 0.0);
    }

    #[test]
    fn close_zeroes_bandwidth() {
        let state = Arc::new(ResourceState::new());
        state.set_bandwidth_mbps(42.0);
        let estimator = BandwidthEstimator::new(state.clone());
        estimator.close();
        assert_eq!(state.bandwidth_mbps(), 0.0);
    }
}
