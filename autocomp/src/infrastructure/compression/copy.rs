// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The identity codec. Per §4.A, `COPY` has no compress operation in the
//! registry proper — callers materialize it by reusing the input buffer
//! directly (see `ChunkBuffer::swap` in the domain crate). This module
//! exists only so the registry's dispatch table has a symmetric entry for
//! decompressing a `COPY`-tagged chunk on the client side.

pub fn decompress(input: &[u8]) -> Vec<u8> {
    input.to_vec()
}
