// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Owned byte region with a logical size distinct from its capacity, mirroring
//! the source's move-only `Buffer`. Rust's ownership model gives move-only-ness
//! for free (no `Clone` impl here); `swap` is the one explicitly-kept escape
//! hatch for exchanging contents between two buffers without reallocating.

use crate::error::AutoCompError;

#[derive(Debug, Default)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    size: usize,
}

impl ChunkBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            size: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Mutable access to the *full capacity*, for codecs writing their output
    /// in place before calling `set_size`.
    pub fn data_mut_full(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copies `bytes` in, failing if it doesn't fit. Matches the source's
    /// copying `setData` overload (not the move-in-a-vector overload), since
    /// that's the one the spec describes.
    pub fn set_data(&mut self, bytes: &[u8]) -> Result<(), AutoCompError> {
        if bytes.len() > self.data.len() {
            return Err(AutoCompError::InvalidArgument(format!(
                "data of {} bytes exceeds capacity {}",
                bytes.len(),
                self.data.len()
            )));
        }
        self.data[..bytes.len()].copy_from_slice(bytes);
        self.size = bytes.len();
        Ok(())
    }

    pub fn set_size(&mut self, n: usize) -> Result<(), AutoCompError> {
        if n > self.data.len() {
            return Err(AutoCompError::InvalidArgument(format!(
                "size {n} exceeds capacity {}",
                self.data.len()
            )));
        }
        self.size = n;
        Ok(())
    }

    /// No-op if `new_capacity < size()` — growing only, never truncating live
    /// data out from under a reader.
    pub fn resize(&mut self, new_capacity: usize) {
        if new_capacity < self.size {
            return;
        }
        self.data.resize(new_capacity, 0);
    }

    pub fn swap(&mut self, other: &mut ChunkBuffer) {
        std::mem::swap(&mut self.data, &mut other.data);
        std::mem::swap(&mut self.size, &mut other.size);
    }
}
