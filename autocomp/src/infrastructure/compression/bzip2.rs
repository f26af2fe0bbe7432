// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! BZIP2 codec, levels 1-9, via the `bzip2` crate's one-shot read adapters.

use std::io::Read;

use bzip2::read::{BzDecoder, BzEncoder};
use bzip2::Compression;

use autocomp_domain::AutoCompError;
use autocomp_domain::value_objects::Codec;

pub fn compress(input: &[u8], level: i32) -> Result<Vec<u8>, AutoCompError> {
    let mut output = Vec::with_capacity(input.len());
    let mut encoder = BzEncoder::new(input, Compression::new(level as u32));
    encoder.read_to_end(&mut output).map_err(|e| AutoCompError::CompressionError {
        codec: Codec::Bzip2(level),
        in_size: input.len(),
        out_cap: output.capacity(),
        msg: e.to_string(),
    })?;
    Ok(output)
}

pub fn decompress(input: &[u8], out_capacity: usize) -> Result<Vec<u8>, AutoCompError> {
    let mut output = Vec::with_capacity(out_capacity);
    let mut decoder = BzDecoder::new(input);
    decoder.read_to_end(&mut output).map_err(|e| AutoCompError::DecompressionError {
        codec: Codec::Bzip2(-1),
        in_size: input.len(),
        out_cap: out_capacity,
        msg: e.to_string(),
    })?;
    Ok(output)
}
