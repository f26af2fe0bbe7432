// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # FPC Codec
//!
//! FPC has no general-purpose host library analogue (§4.A): it is a
//! predictor-based scheme over 8-byte words, credited to Burtscher &
//! Ratanaworabhan, operating on two cooperating predictor tables — a
//! direct finite-context model (FCM) keyed on a hash of the value itself,
//! and a "delta" FCM (DFCM) keyed on a hash of the stride between
//! consecutive values. For each word the smaller of the two predictors'
//! XOR residuals is kept and written out using only as many low bytes as
//! are non-zero.
//!
//! This is a from-scratch safe-Rust re-architecture of the reference
//! algorithm's *logic* (same predictor update rules, same byte-length
//! coding table), not a port of its pointer-overlapping bit-packing trick
//! — codes and variable-length residues are written to two separate
//! byte vectors instead of being interleaved via unaligned 64-bit writes.
//! Level selects the predictor table size: `2^level` entries.
//!
//! Blocks are `BLOCK_SIZE_WORDS` (`4096`, i.e. 32 KiB) words; predictor
//! state resets at each block boundary rather than persisting across the
//! whole stream, which keeps compression embarrassingly parallel across
//! blocks and avoids the reference implementation's block-boundary size
//! accounting bug (§9 Open Question ii). The trailing partial block is
//! zero-padded up to a whole word and the real length is carried in the
//! stream header, so decompression always reproduces the exact original
//! byte count.

use autocomp_domain::value_objects::Codec;
use autocomp_domain::AutoCompError;

const WORD_BYTES: usize = 8;
const BLOCK_SIZE_WORDS: usize = 4096;

/// Byte-length codes 0..=7 map onto these word-lengths; code 4 is skipped
/// in the original scheme (an artifact of the cascading threshold checks
/// below), so lengths are `{0,1,2,3,5,6,7,8}` rather than `0..=8`.
const BYTE_LEN_FOR_CODE: [usize; 8] = [0, 1, 2, 3, 5, 6, 7, 8];

fn code_for_residual(xor: u64) -> u8 {
    if xor == 0 {
        0
    } else if xor >> 8 == 0 {
        1
    } else if xor >> 16 == 0 {
        2
    } else if xor >> 24 == 0 {
        3
    } else if xor >> 40 == 0 {
        4
    } else if xor >> 48 == 0 {
        5
    } else if xor >> 56 == 0 {
        6
    } else {
        7
    }
}

struct Predictors {
    fcm: Vec<u64>,
    dfcm: Vec<u64>,
    mask: u64,
    hash: u64,
    dhash: u64,
    last_val: u64,
    pred1: u64,
    pred2: u64,
}

impl Predictors {
    fn new(level: i32) -> Self {
        let mask = (1u64 << level) - 1;
        Self {
            fcm: vec![0u64; (mask + 1) as usize],
            dfcm: vec![0u64; (mask + 1) as usize],
            mask,
            hash: 0,
            dhash: 0,
            last_val: 0,
            pred1: 0,
            pred2: 0,
        }
    }

    /// Returns `(residual, used_dfcm)` for `val` and advances both
    /// predictor tables, mirroring the reference's per-value update.
    fn predict_and_update(&mut self, val: u64) -> (u64, bool) {
        let xor_fcm = val ^ self.pred1;
        self.fcm[self.hash as usize] = val;
        self.hash = ((self.hash << 6) ^ (val >> 48)) & self.mask;
        self.pred1 = self.fcm[self.hash as usize];

        let stride = val.wrapping_sub(self.last_val);
        let xor_dfcm = val ^ self.last_val.wrapping_add(self.pred2);
        self.last_val = val;
        self.dfcm[self.dhash as usize] = stride;
        self.dhash = ((self.dhash << 2) ^ (stride >> 40)) & self.mask;
        self.pred2 = self.dfcm[self.dhash as usize];

        if xor_fcm <= xor_dfcm {
            (xor_fcm, false)
        } else {
            (xor_dfcm, true)
        }
    }

    /// Reconstructs `val` from a residual and which predictor produced it,
    /// then performs the same table update as the encoder.
    fn reconstruct_and_update(&mut self, mut residual: u64, used_dfcm: bool) -> u64 {
        if used_dfcm {
            residual ^= self.pred2;
        } else {
            residual ^= self.pred1;
        }
        let val = residual;

        self.fcm[self.hash as usize] = val;
        self.hash = ((self.hash << 6) ^ (val >> 48)) & self.mask;
        self.pred1 = self.fcm[self.hash as usize];

        let stride = val.wrapping_sub(self.last_val);
        self.dfcm[self.dhash as usize] = stride;
        self.dhash = ((self.dhash << 2) ^ (stride >> 40)) & self.mask;
        self.pred2 = val.wrapping_add(self.dfcm[self.dhash as usize]);
        self.last_val = val;

        val
    }
}

fn encode_block(words: &[u64], level: i32) -> (u32, Vec<u8>, Vec<u8>) {
    let mut predictors = Predictors::new(level);
    let mut codes = Vec::with_capacity((words.len() + 1) / 2);
    let mut values = Vec::new();

    for pair in words.chunks(2) {
        let (residual0, used_dfcm0) = predictors.predict_and_update(pair[0]);
        let code0 = code_for_residual(residual0);
        values.extend_from_slice(&residual0.to_le_bytes()[..BYTE_LEN_FOR_CODE[code0 as usize]]);
        let mut code_byte = code0 << 4;
        if used_dfcm0 {
            code_byte |= 0x80;
        }

        if let Some(&w1) = pair.get(1) {
            let (residual1, used_dfcm1) = predictors.predict_and_update(w1);
            let code1 = code_for_residual(residual1);
            values.extend_from_slice(&residual1.to_le_bytes()[..BYTE_LEN_FOR_CODE[code1 as usize]]);
            code_byte |= code1;
            if used_dfcm1 {
                code_byte |= 0x08;
            }
        }
        codes.push(code_byte);
    }

    (words.len() as u32, codes, values)
}

fn decode_block(n_words: usize, codes: &[u8], values: &[u8], level: i32, out: &mut Vec<u8>) {
    let mut predictors = Predictors::new(level);
    let mut cursor = 0usize;
    let mut remaining = n_words;
    for &code_byte in codes {
        let code0 = (code_byte >> 4) & 0x7;
        let used_dfcm0 = code_byte & 0x80 != 0;
        let len0 = BYTE_LEN_FOR_CODE[code0 as usize];
        let residual0 = read_residual(&values[cursor..cursor + len0]);
        cursor += len0;
        let val0 = predictors.reconstruct_and_update(residual0, used_dfcm0);
        out.extend_from_slice(&val0.to_le_bytes());
        remaining -= 1;

        if remaining > 0 {
            let code1 = code_byte & 0x7;
            let used_dfcm1 = code_byte & 0x08 != 0;
            let len1 = BYTE_LEN_FOR_CODE[code1 as usize];
            let residual1 = read_residual(&values[cursor..cursor + len1]);
            cursor += len1;
            let val1 = predictors.reconstruct_and_update(residual1, used_dfcm1);
            out.extend_from_slice(&val1.to_le_bytes());
            remaining -= 1;
        }
    }
}

fn read_residual(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

pub fn compress(input: &[u8], level: i32) -> Result<Vec<u8>, AutoCompError> {
    let mut output = Vec::with_capacity(input.len());
    output.push(level as u8);
    output.extend_from_slice(&(input.len() as u64).to_le_bytes());

    for byte_chunk in input.chunks(BLOCK_SIZE_WORDS * WORD_BYTES) {
        let mut words = Vec::with_capacity((byte_chunk.len() + WORD_BYTES - 1) / WORD_BYTES);
        for word_bytes in byte_chunk.chunks(WORD_BYTES) {
            let mut buf = [0u8; WORD_BYTES];
            buf[..word_bytes.len()].copy_from_slice(word_bytes);
            words.push(u64::from_le_bytes(buf));
        }

        let (n_words, codes, values) = encode_block(&words, level);
        output.extend_from_slice(&n_words.to_le_bytes());
        output.extend_from_slice(&(codes.len() as u32).to_le_bytes());
        output.extend_from_slice(&codes);
        output.extend_from_slice(&(values.len() as u32).to_le_bytes());
        output.extend_from_slice(&values);
    }

    Ok(output)
}

pub fn decompress(input: &[u8], out_capacity: usize) -> Result<Vec<u8>, AutoCompError> {
    let fail = |msg: &str| AutoCompError::DecompressionError {
        codec: Codec::Fpc(-1),
        in_size: input.len(),
        out_cap: out_capacity,
        msg: msg.to_string(),
    };

    if input.len() < 9 {
        return Err(fail("input shorter than FPC header"));
    }
    let level = input[0] as i32;
    let total_len = u64::from_le_bytes(input[1..9].try_into().unwrap()) as usize;

    let mut out = Vec::with_capacity(total_len);
    let mut cursor = 9usize;
    while out.len() < total_len {
        if cursor + 8 > input.len() {
            return Err(fail("truncated block header"));
        }
        let n_words = u32::from_le_bytes(input[cursor..cursor + 4].try_into().unwrap()) as usize;
        let codes_len = u32::from_le_bytes(input[cursor + 4..cursor + 8].try_into().unwrap()) as usize;
        cursor += 8;

        if cursor + codes_len + 4 > input.len() {
            return Err(fail("truncated codes region"));
        }
        let codes = &input[cursor..cursor + codes_len];
        cursor += codes_len;

        let values_len = u32::from_le_bytes(input[cursor..cursor + 4].try_into().unwrap()) as usize;
        cursor += 4;
        if cursor + values_len > input.len() {
            return Err(fail("truncated values region"));
        }
        let values = &input[cursor..cursor + values_len];
        cursor += values_len;

        decode_block(n_words, codes, values, level, &mut out);
    }

    out.truncate(total_len);
    if out.len() > out_capacity {
        return Err(fail("decompressed size exceeds output capacity"));
    }
    Ok(out)
}
