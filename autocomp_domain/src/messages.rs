// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Wire Message Schemas
//!
//! The four control message schemas from §6, hand-written as `prost::Message`
//! structs (no `.proto` file or build-time codegen — `prost-derive` works
//! directly on structs annotated with field tags). Field numbers are part of
//! the wire contract and must never be reused or renumbered; see §6's "field
//! numbers are stable across versions".
//!
//! Optional presence (`last_file`, `last_chunk`, `codec`, `level`) is modeled
//! with `Option<T>` via `#[prost(optional)]`, which gives exactly the
//! "absence means not last" semantics the spec requires — not a boolean
//! default of `false`.

use prost::Message;

/// Wire ordinal for a `TransferMode`. Not part of the Codec enum in §3; this
/// is a separate small schema-local enum for the request's `mode` field.
pub fn mode_ordinal(mode: crate::value_objects::TransferMode) -> i32 {
    use crate::value_objects::TransferMode::*;
    match mode {
        NoCompression => 0,
        AutoComp => 1,
        Compress => 2,
        PreCompress => 3,
        Train => 4,
    }
}

pub fn mode_from_ordinal(ordinal: i32) -> Option<crate::value_objects::TransferMode> {
    use crate::value_objects::TransferMode::*;
    match ordinal {
        0 => Some(NoCompression),
        1 => Some(AutoComp),
        2 => Some(Compress),
        3 => Some(PreCompress),
        4 => Some(Train),
        _ => None,
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct FileTransmissionRequestProto {
    #[prost(string, tag = "1")]
    pub filename: String,
    #[prost(int32, tag = "2")]
    pub mode: i32,
    #[prost(string, optional, tag = "3")]
    pub codec: Option<String>,
    #[prost(int32, optional, tag = "4")]
    pub level: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FileInitialMessageProto {
    #[prost(string, tag = "1")]
    pub filename: String,
    #[prost(uint64, tag = "2")]
    pub filesize: u64,
    #[prost(uint32, tag = "3")]
    pub chunksize_kb: u32,
    #[prost(bool, optional, tag = "4")]
    pub last_file: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChunkHeaderProto {
    #[prost(int32, tag = "1")]
    pub compressor: i32,
    #[prost(int32, tag = "2")]
    pub level: i32,
    #[prost(uint64, tag = "3")]
    pub chunk_position: u64,
    #[prost(bool, optional, tag = "4")]
    pub last_chunk: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ErrorMessageProto {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_bytes() {
        let req = FileTransmissionRequestProto {
            filename: "alice29.txt".into(),
            mode: 1,
            codec: None,
            level: None,
        };
        let bytes = req.encode_to_vec();
        let decoded = FileTransmissionRequestProto::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn absent_last_file_decodes_to_none() {
        let msg = FileInitialMessageProto {
            filename: "a.txt".into(),
            filesize: 10,
            chunksize_kb: 64,
            last_file: None,
        };
        let bytes = msg.encode_to_vec();
        let decoded = FileInitialMessageProto::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.last_file, None);
    }

    #[test]
    fn present_last_chunk_round_trips() {
        let hdr = ChunkHeaderProto {
            compressor: 6,
            level: -1,
            chunk_position: 2,
            last_chunk: Some(true),
        };
        let bytes = hdr.encode_to_vec();
        let decoded = ChunkHeaderProto::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.last_chunk, Some(true));
    }

    #[test]
    fn mode_ordinals_round_trip() {
        use crate::value_objects::TransferMode;
        for m in [
            TransferMode::NoCompression,
            TransferMode::AutoComp,
            TransferMode::Compress,
            TransferMode::PreCompress,
            TransferMode::Train,
        ] {
            assert_eq!(mode_from_ordinal(mode_ordinal(m)), Some(m));
        }
    }
}
