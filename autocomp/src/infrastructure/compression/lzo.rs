// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! LZO codec, levels 1-9, via `lzokay-native` (a binding over the reference
//! `lzokay` C++ reimplementation of LZO). Unlike ZLIB/BZIP2/LZMA, lzokay has
//! no internal level-to-strategy table of its own; level only selects
//! between the `compress` (fast) and `compress_optimal` (slow, better
//! ratio) entry points, mirrored here as levels `<= 3` vs. `> 3`.

use autocomp_domain::AutoCompError;
use autocomp_domain::value_objects::Codec;

pub fn compress(input: &[u8], level: i32) -> Result<Vec<u8>, AutoCompError> {
    let result = if level <= 3 {
        lzokay_native::compress(input)
    } else {
        lzokay_native::compress_optimal(input)
    };
    result.map_err(|e| AutoCompError::CompressionError {
        codec: Codec::Lzo(level),
        in_size: input.len(),
        out_cap: 0,
        msg: format!("{e:?}"),
    })
}

pub fn decompress(input: &[u8], out_capacity: usize) -> Result<Vec<u8>, AutoCompError> {
    lzokay_native::decompress(input, out_capacity).map_err(|e| AutoCompError::DecompressionError {
        codec: Codec::Lzo(-1),
        in_size: input.len(),
        out_cap: out_capacity,
        msg: format!("{e:?}"),
    })
}
