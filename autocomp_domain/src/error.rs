// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A single, hierarchical error type for the codec, pipeline and wire layers.
//! Chunk-level compression failures never need to reach this type as fatal
//! errors: callers downgrade to `COPY` and only log. `AutoCompError` exists for
//! the errors that must be surfaced — level validation at construction time,
//! malformed requests, I/O failures, and network failures.

use thiserror::Error;

use crate::value_objects::Codec;

/// Domain-specific errors for the AutoComp pipeline.
#[derive(Error, Debug, Clone)]
pub enum AutoCompError {
    #[error("invalid compression level {level} for codec {codec:?}")]
    InvalidCompressionLevel { codec: Codec, level: i32 },

    #[error("compression error in {codec:?} (in_size={in_size}, out_cap={out_cap}): {msg}")]
    CompressionError {
        codec: Codec,
        in_size: usize,
        out_cap: usize,
        msg: String,
    },

    #[error("decompression error in {codec:?} (in_size={in_size}, out_cap={out_cap}): {msg}")]
    DecompressionError {
        codec: Codec,
        in_size: usize,
        out_cap: usize,
        msg: String,
    },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request parameter: {0}")]
    InvalidRequestParameter(String),

    #[error("invalid compressor value: {0}")]
    InvalidCompressor(i32),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AutoCompError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn invalid_request_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidRequestParameter(msg.into())
    }

    /// Category tag used for structured logging and metrics, mirroring the
    /// teacher's `PipelineError::category`.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidCompressionLevel { .. } => "compression-level",
            Self::CompressionError { .. } => "compression",
            Self::DecompressionError { .. } => "decompression",
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::InvalidRequestParameter(_) => "request",
            Self::InvalidCompressor(_) => "request",
            Self::InvalidArgument(_) => "argument",
        }
    }

    /// True for errors that, per §7, are fatal to the whole connection
    /// (request parsing / validation failures) rather than to a single
    /// chunk or a single file.
    pub fn is_fatal_to_connection(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequestParameter(_) | Self::InvalidCompressor(_) | Self::Network(_)
        )
    }

    /// True for errors that abort only the file currently being streamed
    /// (§4.K: "I/O errors on a file abort the current file").
    pub fn is_fatal_to_file(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// True for errors a caller can recover from by downgrading to `COPY`
    /// rather than surfacing them (§7: chunk-level compression failures
    /// "never reach the wire as errors").
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CompressionError { .. })
    }
}

impl From<std::io::Error> for AutoCompError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
