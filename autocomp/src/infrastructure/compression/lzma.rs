// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! LZMA codec, levels 0-9, via `xz2` (a binding over liblzma). §4.A notes
//! LZMA may stream in fixed blocks internally; `xz2`'s `read::XzEncoder`
//! already does this in 4 KiB internal buffers, so no manual chunking is
//! needed here.

use std::io::Read;

use xz2::read::{XzDecoder, XzEncoder};

use autocomp_domain::AutoCompError;
use autocomp_domain::value_objects::Codec;

pub fn compress(input: &[u8], level: i32) -> Result<Vec<u8>, AutoCompError> {
    let mut output = Vec::with_capacity(input.len());
    let mut encoder = XzEncoder::new(input, level as u32);
    encoder.read_to_end(&mut output).map_err(|e| AutoCompError::CompressionError {
        codec: Codec::Lzma(level),
        in_size: input.len(),
        out_cap: output.capacity(),
        msg: e.to_string(),
    })?;
    Ok(output)
}

pub fn decompress(input: &[u8], out_capacity: usize) -> Result<Vec<u8>, AutoCompError> {
    let mut output = Vec::with_capacity(out_capacity);
    let mut decoder = XzDecoder::new(input);
    decoder.read_to_end(&mut output).map_err(|e| AutoCompError::DecompressionError {
        codec: Codec::Lzma(-1),
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
    fn round_trips_at_default_level() {
        let data = b"lzma round trip payload ".repeat(150);
        let compressed = compress(&data, 6).unwrap();
        let decompressed = decompress(&compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }
}
