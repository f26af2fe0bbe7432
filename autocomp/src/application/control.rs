// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Control Frame Envelope
//!
//! §6 describes the receiver distinguishing an `ErrorMessage` from the
//! expected schema "by attempting to parse the expected schema first, then
//! `ErrorMessage` on parse failure." Plain field-tagged encoding can't
//! actually support that: `ErrorMessage`'s only field and every other
//! schema's first field are both a bare string at tag 1, so a genuine
//! `ErrorMessage` decodes "successfully" (with every other field at its
//! default) as whatever schema the receiver tried first. Every control
//! frame (never payload frames, which stay exactly as specified — raw
//! bytes, no envelope) carries a one-byte kind prefix ahead of the encoded
//! message, removing the ambiguity outright instead of leaning on a parse
//! order that can't reliably fail.

pub const KIND_FILE_INITIAL: u8 = 0;
pub const KIND_CHUNK_HEADER: u8 = 1;
pub const KIND_ERROR: u8 = 2;

/// Prefixes an encoded control message with its kind byte.
pub fn envelope(kind: u8, body: Vec<u8>) -> Vec<u8> {
    let mut framed = Vec::with_capacity(body.len() + 1);
    framed.push(kind);
    framed.extend(body);
    framed
}

/// Splits a received control frame back into its kind byte and message
/// bytes. `None` for an empty frame, which is never produced by `envelope`.
pub fn split_envelope(bytes: &[u8]) -> Option<(u8, &[u8])> {
    bytes.split_first().map(|(kind, rest)| (*kind, rest))
}
