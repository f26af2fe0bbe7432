// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Codec Registry (§4.A)
//!
//! A single dispatch point over the six backing algorithms plus `COPY`.
//! Each algorithm lives in its own module (`zlib`, `snappy`, `lzo`, `bzip2`,
//! `lzma`, `fpc`) as a pair of free functions operating on plain `&[u8]` —
//! there is no trait object here, mirroring §9's "tagged variant ... plus a
//! pure function" re-architecture of the teacher's virtual-dispatch
//! compression service (`adaptive_pipeline/src/infrastructure/adapters/compression.rs`).
//!
//! `compress`/`decompress` write into a domain [`ChunkBuffer`], matching the
//! `(in, out)` buffer-pair shape in §4.A exactly: on success `out.size()` is
//! set to the produced length; on failure `out`'s contents are left
//! unspecified and the caller (the selector, or the client) is expected to
//! fall back to `COPY`.

pub mod bzip2;
pub mod copy;
pub mod fpc;
pub mod lzma;
pub mod lzo;
pub mod snappy;
pub mod zlib;

use autocomp_domain::value_objects::{ChunkBuffer, Codec};
use autocomp_domain::AutoCompError;

/// Compresses `input` with `codec` into `output`, per §4.A's `compress(in,
/// out)` contract. `COPY` has no compress operation in the registry (§4.A);
/// callers materialize it by swapping buffers instead, so calling this with
/// `Codec::Copy` is a programmer error rather than a recoverable one.
pub fn compress(codec: Codec, input: &ChunkBuffer, output: &mut ChunkBuffer) -> Result<(), AutoCompError> {
    let in_bytes = input.data();
    let compressed = match codec {
        Codec::Zlib(level) => zlib::compress(in_bytes, level)?,
        Codec::Snappy => snappy::compress(in_bytes)?,
        Codec::Lzo(level) => lzo::compress(in_bytes, level)?,
        Codec::Bzip2(level) => bzip2::compress(in_bytes, level)?,
        Codec::Lzma(level) => lzma::compress(in_bytes, level)?,
        Codec::Fpc(level) => fpc::compress(in_bytes, level)?,
        Codec::Copy => {
            return Err(AutoCompError::CompressionError {
                codec,
                in_size: in_bytes.len(),
                out_cap: output.capacity(),
                msg: "COPY has no compress operation in the registry".into(),
            })
        }
    };

    if compressed.len() > output.capacity() {
        return Err(AutoCompError::CompressionError {
            codec,
            in_size: in_bytes.len(),
            out_cap: output.capacity(),
            msg: format!(
                "compressed size {} exceeds output capacity {}",
                compressed.len(),
                output.capacity()
            ),
        });
    }
    output.set_data(&compressed)?;
    Ok(())
}

/// Decompresses `input` with `codec` into `output`, symmetric with
/// [`compress`]. `COPY` decompresses to the input verbatim, used by the
/// client mirror (§4.Q) when a chunk header names `compressor = COPY`.
pub fn decompress(codec: Codec, input: &ChunkBuffer, output: &mut ChunkBuffer) -> Result<(), AutoCompError> {
    let in_bytes = input.data();
    let out_cap = output.capacity();
    let decompressed = match codec {
        Codec::Zlib(_) => zlib::decompress(in_bytes, out_cap)?,
        Codec::Snappy => snappy::decompress(in_bytes, out_cap)?,
        Codec::Lzo(_) => lzo::decompress(in_bytes, out_cap)?,
        Codec::Bzip2(_) => bzip2::decompress(in_bytes, out_cap)?,
        Codec::Lzma(_) => lzma::decompress(in_bytes, out_cap)?,
        Codec::Fpc(_) => fpc::decompress(in_bytes, out_cap)?,
        Codec::Copy => copy::decompress(in_bytes),
    };

    if decompressed.len() > output.capacity() {
        return Err(AutoCompError::DecompressionError {
            codec,
            in_size: in_bytes.len(),
            out_cap: output.capacity(),
            msg: format!(
                "decompressed size {} exceeds output capacity {}",
                decompressed.len(),
                output.capacity()
            ),
        });
    }
    output.set_data(&decompressed)?;
    Ok(())
}
