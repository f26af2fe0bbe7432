// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cheap entropy proxy (§4.I): samples three sub-windows of a chunk and
//! counts, per sub-window, how many distinct byte values occur often enough
//! to look non-random, then averages. A compressible chunk (text, structured
//! binary) tends to have a handful of bytes occurring far more than
//! `size/256` times; near-random data does not.

/// Returns an integer in `[0, 256]`.
pub fn bytecount(data: &[u8]) -> u32 {
    const OFFSETS: [f64; 3] = [0.10, 0.45, 0.80];

    if data.is_empty() {
        return 0;
    }

    let n = data.len();
    let mut total = 0u32;

    for offset in OFFSETS {
        let start = ((offset * n as f64) as usize).min(n);
        let sub_len = ((0.1 * n as f64) as usize).min(n - start);
        total += count_frequent_bytes(&data[start..start + sub_len]);
    }

    ((total as f64) / (OFFSETS.len() as f64)).round() as u32
}

fn count_frequent_bytes(window: &[u8]) -> u32 {
    if window.is_empty() {
        return 0;
    }
    let mut histogram = [0u32; 256];
    for &b in window {
        histogram[b as usize] += 1;
    }
    let threshold = window.len() as f64 / 256.0;
    histogram.iter().filter(|&&count| (count as f64) >= threshold).count() as u32
}
