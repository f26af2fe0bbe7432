// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process-wide, lock-free snapshot of CPU load and bandwidth. Stored as bit
//! patterns in `AtomicU32` so reads/writes are plain relaxed loads/stores —
//! no lock can be held across the blocking I/O in F and L (§5: "No operation
//! suspends while holding more than one lock").

use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct ResourceState {
    cpu_load_bits: AtomicU32,
    bandwidth_mbps_bits: AtomicU32,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cpu_load(&self) -> f32 {
        f32::from_bits(self.cpu_load_bits.load(Ordering::Relaxed))
    }

    /// Written only by the CPU sampler (F). Clamped to `[0, 1]` per the
    /// invariant in §3.
    pub fn set_cpu_load(&self, value: f32) {
        let clamped = value.clamp(0.0, 1.0);
        self.cpu_load_bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn bandwidth_mbps(&self) -> f32 {
        f32::from_bits(self.bandwidth_mbps_bits.load(Ordering::Relaxed))
    }

    /// Written only by the send loop's bandwidth estimator (G, inside L).
    /// Clamped to `>= 0` per the invariant in §3.
    pub fn set_bandwidth_mbps(&self, value: f32) {
        let clamped = value.max(0.0);
        self.bandwidth_mbps_bits
            .store(clamped.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero() {
        let rs = ResourceState::new();
        assert_eq!(rs.cpu_load(), 0.0);
        assert_eq!(rs.bandwidth_mbps(), 0.0);
    }

    #[test]
    fn cpu_load_is_clamped_to_unit_interval() {
        let rs = ResourceState::new();
        rs.set_cpu_load(1.5);
        assert_eq!(rs.cpu_load(), 1.0);
        rs.set_cpu_load(-0.3);
        assert_eq!(rs.cpu_load(), 0.0);
    }

    #[test]
    fn bandwidth_never_goes_negative() {
        let rs = ResourceState::new();
        rs.set_bandwidth_mbps(-10.0);
        assert_eq!(rs.bandwidth_mbps(), 0.0);
        rs.set_bandwidth_mbps(42.5);
        assert_eq!(rs.bandwidth_mbps(), 42.5);
    }
}
