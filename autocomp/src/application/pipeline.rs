// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Pipeline (§4.K)
//!
//! One instance per accepted connection, run on the request pool (O). Reads
//! the `FileTransmissionRequest`, builds a [`ChunkSelector`] for the
//! requested mode, then for each file yielded by the directory iterator (C)
//! emits a `FileInitialMessage` followed by one `ChunkHeader` + payload per
//! chunk, handing everything to the send loop (L) via a bounded channel of
//! [`SendItem`]s (§9: "replace the mutex+condvar queue ... with a typed
//! channel carrying `enum SendItem`").

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam::channel::Sender;
use prost::Message;

use autocomp_domain::messages::{
    mode_from_ordinal, ChunkHeaderProto, ErrorMessageProto, FileInitialMessageProto, FileTransmissionRequestProto,
};
use autocomp_domain::services::DecisionTree;
use autocomp_domain::value_objects::{ChunkBuffer, Codec, ResourceState, TransferMode, TransferRequest};
use autocomp_domain::AutoCompError;

use crate::infrastructure::compression;
use crate::infrastructure::fs::{ChunkedFileReader, DirectoryIterator};
use crate::infrastructure::net::{read_frame, SendBufferSocket};
use crate::infrastructure::telemetry::{ChunkTelemetry, TelemetrySink};

use super::control::{envelope, KIND_CHUNK_HEADER, KIND_ERROR, KIND_FILE_INITIAL};
use super::selector::{AdaptiveSelector, ChunkSelector, SelectionContext};

/// A move-only entry on the producer → consumer queue between K and L.
/// `Control` carries an already wire-encoded control message (still
/// unframed — L applies the length prefix); `Payload` carries a chunk's
/// bytes; `EndOfRequest` tells L this connection's producer is done, so it
/// can drain and close once the queue empties.
pub enum SendItem {
    Control(Vec<u8>),
    Payload(ChunkBuffer),
    EndOfRequest,
}

/// Shared collaborators a pipeline run needs, threaded in from the server
/// (P) rather than constructed per connection.
pub struct PipelineContext {
    pub connection_id: u64,
    pub resource: Arc<ResourceState>,
    pub tree: Arc<DecisionTree>,
    pub telemetry: Arc<TelemetrySink>,
}

/// Runs one connection's request end to end: parses the request, then
/// streams every file it names. Returns `Err` only for connection-fatal
/// failures (§7: request parse/validation errors); per-file I/O errors are
/// handled internally (logged, `ErrorMessage` framed, next file attempted)
/// and never propagate here.
pub fn run_request(
    mut reader: impl Read,
    load_socket: &impl SendBufferSocket,
    sender: &Sender<SendItem>,
    ctx: &PipelineContext,
) -> Result<(), AutoCompError> {
    let Some(request_bytes) = read_frame(&mut reader)? else {
        return Ok(());
    };

    let request = match parse_request(&request_bytes) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(connection_id = ctx.connection_id, error = %err, "rejecting malformed request");
            send_error(sender, &err.to_string())?;
            let _ = sender.send(SendItem::EndOfRequest);
            return Err(err);
        }
    };

    let mut selector = match build_selector(&request) {
        Ok(selector) => selector,
        Err(err) => {
            tracing::warn!(connection_id = ctx.connection_id, error = %err, "rejecting request with invalid codec/level");
            send_error(sender, &err.to_string())?;
            let _ = sender.send(SendItem::EndOfRequest);
            return Err(err);
        }
    };

    let paths = match DirectoryIterator::new(&request.path) {
        Ok(iter) => iter.collect::<Vec<PathBuf>>(),
        Err(err) => {
            tracing::warn!(connection_id = ctx.connection_id, error = %err, "request path is not accessible");
            send_error(sender, &err.to_string())?;
            let _ = sender.send(SendItem::EndOfRequest);
            return Err(err);
        }
    };

    let chunk_size_bytes = request.mode.default_chunk_size_kb() as usize * 1024;
    let chunk_capacity = chunk_size_bytes * 11 / 10;
    let last_file_index = paths.len().saturating_sub(1);
    // `PRE_COMPRESS` never drives `selector` per chunk (§4.K step 2); the
    // codec it resolved is reused directly by `run_file_precompressed`.
    let precompress_codec = match (&selector, request.mode) {
        (ChunkSelector::Fixed(codec), TransferMode::PreCompress) => Some(*codec),
        _ => None,
    };

    for (file_index, path) in paths.iter().enumerate() {
        let is_last_file = file_index == last_file_index;
        let result = if let Some(codec) = precompress_codec {
            run_file_precompressed(path, is_last_file, chunk_size_bytes, codec, sender, ctx)
        } else {
            run_file(
                path,
                is_last_file,
                chunk_size_bytes,
                chunk_capacity,
                &mut selector,
                load_socket,
                sender,
                ctx,
                &request,
            )
        };
        if let Err(err) = result {
            tracing::warn!(
                connection_id = ctx.connection_id,
                file = %path.display(),
                error = %err,
                "aborting current file"
            );
            send_error(sender, &format!("{}: {err}", path.display()))?;
        }
    }

    let _ = sender.send(SendItem::EndOfRequest);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_file(
    path: &Path,
    is_last_file: bool,
    chunk_size_bytes: usize,
    chunk_capacity: usize,
    selector: &mut ChunkSelector,
    load_socket: &impl SendBufferSocket,
    sender: &Sender<SendItem>,
    ctx: &PipelineContext,
    request: &TransferRequest,
) -> Result<(), AutoCompError> {
    let mut reader = ChunkedFileReader::new(DirectoryIterator::new(path)?, chunk_size_bytes);
    let (_, filesize) = reader
        .open_next()?
        .ok_or_else(|| AutoCompError::io(format!("{} disappeared before it could be opened", path.display())))?;

    let initial = FileInitialMessageProto {
        filename: path.to_string_lossy().into_owned(),
        filesize,
        chunksize_kb: request.mode.default_chunk_size_kb(),
        last_file: is_last_file.then_some(true),
    };
    send_control(sender, envelope(KIND_FILE_INITIAL, initial.encode_to_vec()))?;

    let mut chunk_position: u64 = 0;
    while reader.has_next_chunk() {
        let mut input = ChunkBuffer::new(chunk_capacity);
        reader.read_chunk(&mut input)?;

        let mut output = ChunkBuffer::new(chunk_capacity);
        let select_ctx = SelectionContext::new(&ctx.resource, load_socket, &ctx.tree);
        let codec_used = selector.select(&input, &mut output, &select_ctx);

        let is_last_chunk = !reader.has_next_chunk();
        let input_bytes = input.size();
        let payload = if codec_used == Codec::Copy { input } else { output };

        if codec_used != Codec::Copy {
            tracing::trace!(
                connection_id = ctx.connection_id,
                codec = codec_used.name(),
                chunk_position,
                "compressed chunk"
            );
        }

        ctx.telemetry.record(ChunkTelemetry {
            connection_id: ctx.connection_id,
            filename: path.to_string_lossy().into_owned(),
            mode: request.mode,
            chunk_position,
            codec_used,
            input_bytes,
            output_bytes: payload.size(),
            cpu_load: ctx.resource.cpu_load(),
            bandwidth_mbps: ctx.resource.bandwidth_mbps(),
        });

        let header = ChunkHeaderProto {
            compressor: codec_used.ordinal(),
            level: codec_used.level(),
            chunk_position,
            last_chunk: is_last_chunk.then_some(true),
        };
        send_control(sender, envelope(KIND_CHUNK_HEADER, header.encode_to_vec()))?;
        sender
            .send(SendItem::Payload(payload))
            .map_err(|_| AutoCompError::network("send queue closed"))?;

        chunk_position += 1;
    }

    Ok(())
}

/// `PRE_COMPRESS` mode (§4.K step 2, §9 "PRE_COMPRESS mode via external
/// scripts"): the codec runs once over the whole file off the hot path
/// instead of per chunk, and the resulting compressed bytes are streamed as
/// fixed-size raw slices — every `ChunkHeader` on this file names the same
/// codec, and the client is expected to buffer all of a file's payload
/// chunks and decompress them as one stream once `last_chunk` arrives,
/// rather than decompressing chunk by chunk as in `AUTOCOMP`/`COMPRESS`.
fn run_file_precompressed(
    path: &Path,
    is_last_file: bool,
    wire_chunk_bytes: usize,
    codec: Codec,
    sender: &Sender<SendItem>,
    ctx: &PipelineContext,
) -> Result<(), AutoCompError> {
    let original = std::fs::read(path)?;
    let original_len = original.len();

    let mut input = ChunkBuffer::new(original_len);
    input.set_data(&original)?;
    let out_capacity = original_len + original_len / 2 + 65_536;
    let mut compressed = ChunkBuffer::new(out_capacity);
    compression::compress(codec, &input, &mut compressed)?;

    let initial = FileInitialMessageProto {
        filename: path.to_string_lossy().into_owned(),
        filesize: original_len as u64,
        chunksize_kb: (wire_chunk_bytes / 1024) as u32,
        last_file: is_last_file.then_some(true),
    };
    send_control(sender, envelope(KIND_FILE_INITIAL, initial.encode_to_vec()))?;

    ctx.telemetry.record(ChunkTelemetry {
        connection_id: ctx.connection_id,
        filename: path.to_string_lossy().into_owned(),
        mode: TransferMode::PreCompress,
        chunk_position: 0,
        codec_used: codec,
        input_bytes: original_len,
        output_bytes: compressed.size(),
        cpu_load: ctx.resource.cpu_load(),
        bandwidth_mbps: ctx.resource.bandwidth_mbps(),
    });

    let body = compressed.data();
    let total_chunks = body.len().div_ceil(wire_chunk_bytes).max(1);
    for (chunk_position, slice) in body.chunks(wire_chunk_bytes.max(1)).enumerate() {
        let is_last_chunk = chunk_position + 1 == total_chunks;
        let mut payload = ChunkBuffer::new(slice.len());
        payload.set_data(slice)?;

        let header = ChunkHeaderProto {
            compressor: codec.ordinal(),
            level: codec.level(),
            chunk_position: chunk_position as u64,
            last_chunk: is_last_chunk.then_some(true),
        };
        send_control(sender, envelope(KIND_CHUNK_HEADER, header.encode_to_vec()))?;
        sender
            .send(SendItem::Payload(payload))
            .map_err(|_| AutoCompError::network("send queue closed"))?;
    }

    // An empty file still needs its single (empty) chunk framed so the
    // client's last_chunk/last_file bookkeeping stays consistent.
    if body.is_empty() {
        let header = ChunkHeaderProto { compressor: codec.ordinal(), level: codec.level(), chunk_position: 0, last_chunk: Some(true) };
        send_control(sender, envelope(KIND_CHUNK_HEADER, header.encode_to_vec()))?;
        sender
            .send(SendItem::Payload(ChunkBuffer::new(0)))
            .map_err(|_| AutoCompError::network("send queue closed"))?;
    }

    Ok(())
}

fn send_control(sender: &Sender<SendItem>, bytes: Vec<u8>) -> Result<(), AutoCompError> {
    sender
        .send(SendItem::Control(bytes))
        .map_err(|_| AutoCompError::network("send queue closed"))
}

fn send_error(sender: &Sender<SendItem>, message: &str) -> Result<(), AutoCompError> {
    let proto = ErrorMessageProto { message: message.to_string() };
    send_control(sender, envelope(KIND_ERROR, proto.encode_to_vec()))
}

fn parse_request(bytes: &[u8]) -> Result<TransferRequest, AutoCompError> {
    let proto = FileTransmissionRequestProto::decode(bytes)
        .map_err(|e| AutoCompError::invalid_request_parameter(format!("malformed request: {e}")))?;
    let mode = mode_from_ordinal(proto.mode)
        .ok_or_else(|| AutoCompError::invalid_request_parameter(format!("unknown mode ordinal {}", proto.mode)))?;
    Ok(TransferRequest { path: proto.filename, mode, codec_name: proto.codec, level: proto.level })
}

fn build_selector(request: &TransferRequest) -> Result<ChunkSelector, AutoCompError> {
    match request.mode {
        TransferMode::NoCompression => Ok(ChunkSelector::NoCompression),
        TransferMode::AutoComp => Ok(ChunkSelector::Adaptive(AdaptiveSelector::new())),
        TransferMode::Compress | TransferMode::PreCompress | TransferMode::Train => {
            Ok(ChunkSelector::Fixed(resolve_fixed_codec(request)?))
        }
    }
}

/// Resolves the single codec `COMPRESS`/`PRE_COMPRESS`/`TRAIN` modes apply to
/// every chunk (§4.K step 2), validating the level in the process.
fn resolve_fixed_codec(request: &TransferRequest) -> Result<Codec, AutoCompError> {
    let name = request
        .codec_name
        .as_deref()
        .ok_or_else(|| AutoCompError::invalid_request_parameter(format!("{} requires a codec name", request.mode.as_str())))?;
    match request.level {
        Some(level) => Codec::from_name(name, level),
        None => Codec::with_default_level(name),
    }
}
