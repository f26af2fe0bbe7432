// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Adaptive Selector (§4.J)
//!
//! Per-chunk codec selection. `AUTOCOMP` mode runs the full gated
//! state-machine below; `NO_COMPRESSION` and `COMPRESS`/`TRAIN` are simpler
//! fixed policies that still go through the same [`ChunkSelector`]
//! interface so the file pipeline (K) doesn't need to special-case mode at
//! the call site.

use autocomp_domain::services::{bytecount, DecisionTree};
use autocomp_domain::value_objects::{ChunkBuffer, Codec, ResourceState};

use crate::infrastructure::compression;
use crate::infrastructure::net::SendBufferSocket;

const NEAR_RANDOM_BYTECOUNT_THRESHOLD: u32 = 100;
const NEAR_RANDOM_SKIP_BYTES: i64 = 512 * 1024;
const RECOMPUTE_WINDOW_BYTES: i64 = 512 * 1024;
const IDLE_WIRE_LOAD_THRESHOLD: f32 = 0.05;
const IDLE_WIRE_ZLIB_LEVEL: i32 = 3;

/// Everything the selector reads from the outside world for one chunk: the
/// shared resource snapshot (E) and the connection's send-buffer load.
pub struct SelectionContext<'a> {
    pub resource: &'a ResourceState,
    pub send_buf_load: f32,
    pub tree: &'a DecisionTree,
}

impl<'a> SelectionContext<'a> {
    pub fn new(resource: &'a ResourceState, socket: &impl SendBufferSocket, tree: &'a DecisionTree) -> Self {
        Self { resource, send_buf_load: socket.send_buffer_load(), tree }
    }
}

/// Per-connection, per-mode codec policy (§4.K step 2).
pub enum ChunkSelector {
    /// `NO_COMPRESSION`: always `COPY`.
    NoCompression,
    /// `COMPRESS`/`TRAIN`: a single codec at a fixed level, no gating.
    Fixed(Codec),
    /// `AUTOCOMP`: the full gated state machine.
    Adaptive(AdaptiveSelector),
}

impl ChunkSelector {
    /// Selects (and, for non-`COPY` outcomes, already applies) a codec for
    /// one chunk. Returns the codec actually used; `output` is populated
    /// iff the return value is not `Codec::Copy` — callers swap the input
    /// buffer into the payload slot on `Copy` themselves (§4.K step 3).
    pub fn select(&mut self, input: &ChunkBuffer, output: &mut ChunkBuffer, ctx: &SelectionContext) -> Codec {
        match self {
            ChunkSelector::NoCompression => Codec::Copy,
            ChunkSelector::Fixed(codec) => match compression::compress(*codec, input, output) {
                Ok(()) => *codec,
                Err(_) => Codec::Copy,
            },
            ChunkSelector::Adaptive(state) => state.select(input, output, ctx),
        }
    }
}

/// State machine behind `AUTOCOMP` mode (§4.J). One instance per
/// connection; not `Send`-shared, since only the pipeline's producer
/// thread ever touches it.
pub struct AdaptiveSelector {
    remaining_uncompressed_bytes: i64,
    remaining_until_recompute: i64,
    last_bytecount: u32,
}

impl AdaptiveSelector {
    pub fn new() -> Self {
        Self { remaining_uncompressed_bytes: 0, remaining_until_recompute: 0, last_bytecount: 0 }
    }

    pub fn select(&mut self, input: &ChunkBuffer, output: &mut ChunkBuffer, ctx: &SelectionContext) -> Codec {
        let in_size = input.size() as i64;

        // Step 1: we're inside a near-random skip window.
        if self.remaining_uncompressed_bytes > 0 {
            self.remaining_uncompressed_bytes -= in_size;
            return Codec::Copy;
        }

        // Step 2/3: periodically recompute the bytecount feature, amortized
        // over a 512 KiB window rather than every chunk.
        if self.remaining_until_recompute <= 0 {
            self.last_bytecount = bytecount(input.data());
            if self.last_bytecount > NEAR_RANDOM_BYTECOUNT_THRESHOLD {
                self.remaining_uncompressed_bytes = NEAR_RANDOM_SKIP_BYTES;
                return Codec::Copy;
            }
            self.remaining_until_recompute = RECOMPUTE_WINDOW_BYTES;
        } else {
            self.remaining_until_recompute -= in_size;
        }

        // Step 4: idle-wire short-circuit.
        if ctx.send_buf_load < IDLE_WIRE_LOAD_THRESHOLD {
            return match compression::compress(Codec::Zlib(IDLE_WIRE_ZLIB_LEVEL), input, output) {
                Ok(()) => Codec::Zlib(IDLE_WIRE_ZLIB_LEVEL),
                Err(_) => Codec::Copy,
            };
        }

        // Step 5: feature vector.
        let cpu_level = (ctx.resource.cpu_load() * 10.0).floor() as i32;
        let bw = ctx.resource.bandwidth_mbps();
        let bw_level = bandwidth_level(bw);
        let bytecount_level = (self.last_bytecount as f64 / 10.0).floor() as i32;

        // Step 6: tree classification, then attempt the chosen codec.
        let features = [cpu_level, bw_level, bytecount_level];
        let codec = match ctx.tree.classify(&features) {
            Ok(codec) => codec,
            Err(_) => return Codec::Copy,
        };

        if codec == Codec::Copy {
            return Codec::Copy;
        }

        match compression::compress(codec, input, output) {
            Ok(()) => codec,
            Err(_) => Codec::Copy,
        }
    }
}

impl Default for AdaptiveSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// `bw_level` per §4.J step 5: finer-grained below 100 Mbps, coarser above.
fn bandwidth_level(bw_mbps: f32) -> i32 {
    if bw_mbps < 100.0 {
        (bw_mbps / 5.0).floor() as i32
    } else if bw_mbps < 1000.0 {
        (bw_mbps / 100.0).floor() as i32 + 19
    } else {
        58
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::net::socket::FixedLoadSocket;
    use std::io::Cursor;

    fn tree_always_copy() -> DecisionTree {
        DecisionTree::load(Cursor::new("1\ncopy\n3\n1\n0 0 0 0 0\n")).unwrap()
    }

    fn tree_always_zlib6() -> DecisionTree {
        DecisionTree::load(Cursor::new("1\nzlib_6\n3\n1\n0 0 0 0 0\n")).unwrap()
    }

    fn busy_socket() -> FixedLoadSocket {
        // Above the 0.05 idle-wire threshold so step 4 doesn't short-circuit.
        FixedLoadSocket::new(1_000_000, 12_000_000)
    }

    #[test]
    fn bandwidth_level_buckets_match_formula() {
        assert_eq!(bandwidth_level(0.0), 0);
        assert_eq!(bandwidth_level(99.0), 19);
        assert_eq!(bandwidth_level(100.0), 20);
        assert_eq!(bandwidth_level(999.0), 28);
        assert_eq!(bandwidth_level(1000.0), 58);
    }

    #[test]
    fn no_compression_selector_always_returns_copy() {
        let mut selector = ChunkSelector::NoCompression;
        let resource = ResourceState::new();
        let tree = tree_always_zlib6();
        let socket = busy_socket();
        let ctx = SelectionContext::new(&resource, &socket, &tree);

        let mut input = ChunkBuffer::new(16);
        input.set_data(b"hello world 1234").unwrap();
        let mut output = ChunkBuffer::new(64);
        assert_eq!(selector.select(&input, &mut output, &ctx), Codec::Copy);
    }

    #[test]
    fn idle_wire_short_circuits_to_zlib3() {
        let resource = ResourceState::new();
        let tree = tree_always_copy();
        let idle_socket = FixedLoadSocket::new(0, 12_000_000);
        let ctx = SelectionContext::new(&resource, &idle_socket, &tree);

        let mut selector = AdaptiveSelector::new();
        let data = b"the quick brown fox jumps over the lazy dog ".repeat(50);
        let mut input = ChunkBuffer::new(data.len());
        input.set_data(&data).unwrap();
        let mut output = ChunkBuffer::new(data.len() * 2 + 64);

        assert_eq!(selector.select(&input, &mut output, &ctx), Codec::Zlib(3));
    }

    #[test]
    fn near_random_chunk_is_skipped_for_a_full_window() {
        let resource = ResourceState::new();
        let tree = tree_always_copy();
        let socket = busy_socket();
        let ctx = SelectionContext::new(&resource, &socket, &tree);

        let mut selector = AdaptiveSelector::new();
        // CSPRNG-ish data: every byte value distinct and rare enough that
        // bytecount exceeds the near-random threshold.
        let data: Vec<u8> = (0..4096u32).map(|i| ((i.wrapping_mul(2654435761)) % 256) as u8).collect();
        assert!(bytecount(&data) > NEAR_RANDOM_BYTECOUNT_THRESHOLD);

        let mut input = ChunkBuffer::new(data.len());
        input.set_data(&data).unwrap();
        let mut output = ChunkBuffer::new(data.len() * 2 + 64);

        let first = selector.select(&input, &mut output, &ctx);
        assert_eq!(first, Codec::Copy);
        assert!(selector.remaining_uncompressed_bytes > 0);
    }

    #[test]
    fn compressible_chunk_under_busy_wire_uses_tree_decision() {
        let resource = ResourceState::new();
        resource.set_cpu_load(0.1);
        resource.set_bandwidth_mbps(50.0);
        let tree = tree_always_zlib6();
        let socket = busy_socket();
        let ctx = SelectionContext::new(&resource, &socket, &tree);

        let mut selector = AdaptiveSelector::new();
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".repeat(200);
        let mut input = ChunkBuffer::new(data.len());
        input.set_data(&data).unwrap();
        let mut output = ChunkBuffer::new(data.len() * 2 + 64);

        let codec = selector.select(&input, &mut output, &ctx);
        assert_eq!(codec, Codec::Zlib(6));
    }
}
