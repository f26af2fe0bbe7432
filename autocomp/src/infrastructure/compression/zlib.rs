// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! ZLIB codec, levels 0-9, via `flate2`'s zlib adapter (one-shot, matching
//! the teacher's `compress_gzip`/`decompress_gzip` read-to-end idiom in
//! `adaptive_pipeline/src/infrastructure/adapters/compression.rs`).

use std::io::Read;

use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;

use autocomp_domain::AutoCompError;

pub fn compress(input: &[u8], level: i32) -> Result<Vec<u8>, AutoCompError> {
    let mut output = Vec::with_capacity(input.len());
    let mut encoder = ZlibEncoder::new(input, Compression::new(level as u32));
    encoder.read_to_end(&mut output).map_err(|e| AutoCompError::CompressionError {
        codec: autocomp_domain::value_objects::Codec::Zlib(level),
        in_size: input.len(),
        out_cap: output.capacity(),
        msg: e.to_string(),
    })?;
    Ok(output)
}

pub fn decompress(input: &[u8], out_capacity: usize) -> Result<Vec<u8>, AutoCompError> {
    let mut output = Vec::with_capacity(out_capacity);
    let mut decoder = ZlibDecoder::new(input);
    decoder.read_to_end(&mut output).map_err(|e| AutoCompError::DecompressionError {
        codec: autocomp_domain::value_objects::Codec::Zlib(-1),
        in_size: input.len(),
        out_cap: out_capacity,
        msg: e.to_string(),
    })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(50);
        let compressed = compress(&data, 6).unwrap();
        let decompressed = decompress(&compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn empty_input_round_trips() {
        let compressed = compress(&[], 6).unwrap();
        let decompressed = decompress(&compressed, 0).unwrap();
        assert!(decompressed.is_empty());
    }
}
