// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SNAPPY codec: no level, frame-oriented via the `snap` crate.

use autocomp_domain::AutoCompError;
use autocomp_domain::value_objects::Codec;

pub fn compress(input: &[u8]) -> Result<Vec<u8>, AutoCompError> {
    snap::raw::Encoder::new()
        .compress_vec(input)
        .map_err(|e| AutoCompError::CompressionError {
            codec: Codec::Snappy,
            in_size: input.len(),
            out_cap: 0,
            msg: e.to_string(),
        })
}

pub fn decompress(input: &[u8], out_capacity: usize) -> Result<Vec<u8>, AutoCompError> {
    snap::raw::Decoder::new()
        .decompress_vec(input)
        .map_err(|e| AutoCompError::DecompressionError {
            codec: Codec::Snappy,
            in_size: input.len(),
            out_cap: out_capacity,
            msg: e.to_string(),
        })
}
