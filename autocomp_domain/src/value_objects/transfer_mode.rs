// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use crate::error::AutoCompError;

/// The mode requested for a connection, per §3's "per-connection request".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    NoCompression,
    AutoComp,
    Compress,
    PreCompress,
    Train,
}

impl TransferMode {
    /// Parses the client CLI's `-m mode` flag and the wire request's mode
    /// field, both case-insensitive per §6.
    pub fn parse(s: &str) -> Result<Self, AutoCompError> {
        match s.to_ascii_uppercase().as_str() {
            "NO_COMPRESSION" => Ok(Self::NoCompression),
            "AUTOCOMP" => Ok(Self::AutoComp),
            "COMPRESS" => Ok(Self::Compress),
            "PRE_COMPRESS" => Ok(Self::PreCompress),
            "TRAIN" => Ok(Self::Train),
            other => Err(AutoCompError::InvalidRequestParameter(format!(
                "unknown transfer mode {other:?}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCompression => "NO_COMPRESSION",
            Self::AutoComp => "AUTOCOMP",
            Self::Compress => "COMPRESS",
            Self::PreCompress => "PRE_COMPRESS",
            Self::Train => "TRAIN",
        }
    }

    /// Default chunk size in KiB for this mode (§3 supplement): `COMPRESS`
    /// and `TRAIN` use a larger fixed chunk since there's no per-chunk
    /// gating cost to amortize.
    pub fn default_chunk_size_kb(&self) -> u32 {
        match self {
            Self::Compress | Self::Train => 512,
            _ => 64,
        }
    }
}

/// A parsed `FileTransmissionRequest`, after wire decoding and validation.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub path: String,
    pub mode: TransferMode,
    pub codec_name: Option<String>,
    pub level: Option<i32>,
}
