// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Client Mirror (§4.Q)
//!
//! Sends one `FileTransmissionRequest` and then mirrors whatever the server
//! streams back: a `FileInitialMessage` opens a fresh output file under the
//! configured destination directory, each `ChunkHeader` names the codec its
//! payload was encoded with, and the client runs the matching decompressor
//! from the registry (A) — or takes the payload verbatim for `COPY` — before
//! appending to the file. An `ErrorMessage` is logged and does not abort the
//! rest of the session; the request itself is unenveloped (only the
//! server's response control frames carry a kind prefix, since the request
//! is always the first frame and needs no disambiguation from anything
//! else).

use std::fs::{self, File};
use std::io::Write;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use prost::Message;

use autocomp_domain::messages::{
    mode_ordinal, ChunkHeaderProto, ErrorMessageProto, FileInitialMessageProto, FileTransmissionRequestProto,
};
use autocomp_domain::value_objects::{ChunkBuffer, Codec, TransferMode};
use autocomp_domain::AutoCompError;

use autocomp_bootstrap::ClientArgs;

use crate::infrastructure::compression;
use crate::infrastructure::net::{read_frame, write_frame};

use super::control::{split_envelope, KIND_CHUNK_HEADER, KIND_ERROR, KIND_FILE_INITIAL};

/// Tracks the file currently being received, between a `FileInitialMessage`
/// and its closing `last_chunk && last_file`.
struct OpenFile {
    handle: File,
    expected_bytes: u64,
    received_bytes: u64,
    chunk_capacity: usize,
    /// `PRE_COMPRESS` files arrive as raw slices of one whole-file
    /// compressed stream (§9): every chunk is buffered here and
    /// decompressed once, on `last_chunk`, rather than chunk by chunk.
    /// The codec is recorded from the first chunk header seen (every
    /// header for a pre-compressed file names the same codec).
    precompressed: Option<(Option<Codec>, Vec<u8>)>,
}

/// Connects, sends the request built from `args`, and mirrors the response
/// stream until the server closes the connection or the last chunk of the
/// last file arrives.
pub fn run(args: ClientArgs) -> Result<(), AutoCompError> {
    crate::infrastructure::logging::init(args.log_json);

    let mode = TransferMode::parse(&args.mode)?;
    validate_codec_arguments(mode, args.codec.as_deref(), args.level)?;

    let mut stream = TcpStream::connect((args.host.as_str(), args.port)).map_err(|e| {
        AutoCompError::network(format!("connecting to {}:{}: {e}", args.host, args.port))
    })?;

    let request = FileTransmissionRequestProto {
        filename: args.path.to_string_lossy().into_owned(),
        mode: mode_ordinal(mode),
        codec: args.codec.clone(),
        level: args.level,
    };
    write_frame(&mut stream, &request.encode_to_vec())?;

    fs::create_dir_all(&args.dest_dir)?;
    receive_loop(&mut stream, Path::new(&args.dest_dir), mode)
}

fn validate_codec_arguments(mode: TransferMode, codec: Option<&str>, level: Option<i32>) -> Result<(), AutoCompError> {
    match mode {
        TransferMode::Compress | TransferMode::PreCompress | TransferMode::Train => {
            let name = codec.ok_or_else(|| {
                AutoCompError::invalid_request_parameter(format!("{} requires -c/--codec", mode.as_str()))
            })?;
            match level {
                Some(level) => Codec::from_name(name, level).map(|_| ()),
                None => Codec::with_default_level(name).map(|_| ()),
            }
        }
        TransferMode::NoCompression | TransferMode::AutoComp => Ok(()),
    }
}

fn receive_loop(stream: &mut TcpStream, dest_dir: &Path, mode: TransferMode) -> Result<(), AutoCompError> {
    let mut current: Option<OpenFile> = None;

    while let Some(frame) = read_frame(stream)? {
        let Some((kind, body)) = split_envelope(&frame) else {
            tracing::warn!("dropping empty control frame");
            continue;
        };

        match kind {
            KIND_FILE_INITIAL => {
                let initial = FileInitialMessageProto::decode(body)
                    .map_err(|e| AutoCompError::network(format!("malformed FileInitialMessage: {e}")))?;
                current = Some(open_destination(dest_dir, &initial, mode)?);
            }
            KIND_CHUNK_HEADER => {
                let header = ChunkHeaderProto::decode(body)
                    .map_err(|e| AutoCompError::network(format!("malformed ChunkHeader: {e}")))?;
                let Some(payload) = read_frame(stream)? else {
                    return Err(AutoCompError::network("connection closed before chunk payload"));
                };
                let open_file = current
                    .as_mut()
                    .ok_or_else(|| AutoCompError::network("ChunkHeader received before FileInitialMessage"))?;
                apply_chunk(open_file, &header, &payload)?;

                if header.last_chunk == Some(true) {
                    finish_file(current.take().expect("checked above"))?;
                }
            }
            KIND_ERROR => {
                let error = ErrorMessageProto::decode(body)
                    .map_err(|e| AutoCompError::network(format!("malformed ErrorMessage: {e}")))?;
                tracing::warn!(message = %error.message, "server reported an error");
            }
            other => {
                return Err(AutoCompError::network(format!("unknown control frame kind {other}")));
            }
        }
    }

    Ok(())
}

fn open_destination(
    dest_dir: &Path,
    initial: &FileInitialMessageProto,
    mode: TransferMode,
) -> Result<OpenFile, AutoCompError> {
    let source_name = PathBuf::from(&initial.filename);
    let file_name = source_name.file_name().ok_or_else(|| {
        AutoCompError::invalid_request_parameter(format!("server sent an empty filename: {:?}", initial.filename))
    })?;
    let dest_path = dest_dir.join(file_name);

    tracing::info!(file = %dest_path.display(), size = initial.filesize, "receiving file");
    let handle = File::create(&dest_path)?;
    Ok(OpenFile {
        handle,
        expected_bytes: initial.filesize,
        received_bytes: 0,
        chunk_capacity: initial.chunksize_kb as usize * 1024 * 11 / 10,
        precompressed: matches!(mode, TransferMode::PreCompress).then(|| (None, Vec::new())),
    })
}

fn apply_chunk(open_file: &mut OpenFile, header: &ChunkHeaderProto, payload: &[u8]) -> Result<(), AutoCompError> {
    // `PRE_COMPRESS`: every chunk of this file is a raw slice of one
    // whole-file compressed stream; buffer it and decompress on the final
    // chunk instead of per chunk (§9).
    if let Some((codec_slot, buffer)) = open_file.precompressed.as_mut() {
        if codec_slot.is_none() {
            *codec_slot = Some(Codec::from_ordinal(header.compressor, header.level)?);
        }
        buffer.extend_from_slice(payload);
        open_file.received_bytes += payload.len() as u64;
        return Ok(());
    }

    let codec = Codec::from_ordinal(header.compressor, header.level)?;

    let bytes_to_write: Vec<u8> = if codec == Codec::Copy {
        payload.to_vec()
    } else {
        let mut input = ChunkBuffer::new(payload.len());
        input.set_data(payload)?;
        let mut output = ChunkBuffer::new(open_file.chunk_capacity.max(payload.len() * 4 + 1024));
        compression::decompress(codec, &input, &mut output)?;
        output.data().to_vec()
    };

    open_file.handle.write_all(&bytes_to_write)?;
    open_file.received_bytes += bytes_to_write.len() as u64;
    Ok(())
}

fn finish_file(mut open_file: OpenFile) -> Result<(), AutoCompError> {
    if let Some((codec, compressed)) = open_file.precompressed.take() {
        let codec = codec.unwrap_or(Codec::Copy);
        let bytes_to_write = if codec == Codec::Copy || compressed.is_empty() {
            compressed
        } else {
            let mut input = ChunkBuffer::new(compressed.len());
            input.set_data(&compressed)?;
            let out_capacity = open_file.expected_bytes as usize + 4096;
            let mut output = ChunkBuffer::new(out_capacity);
            compression::decompress(codec, &input, &mut output)?;
            output.data().to_vec()
        };
        open_file.handle.write_all(&bytes_to_write)?;
        open_file.received_bytes = bytes_to_write.len() as u64;
    }

    if open_file.received_bytes != open_file.expected_bytes {
        tracing::warn!(
            expected = open_file.expected_bytes,
            received = open_file.received_bytes,
            "file size mismatch after transfer, possible corruption"
        );
    }
    drop(open_file.handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_codec_arguments_requires_codec_for_compress() {
        let err = validate_codec_arguments(TransferMode::Compress, None, None).unwrap_err();
        assert!(matches!(err, AutoCompError::InvalidRequestParameter(_)));
    }

    #[test]
    fn validate_codec_arguments_accepts_autocomp_without_codec() {
        assert!(validate_codec_arguments(TransferMode::AutoComp, None, None).is_ok());
    }

    #[test]
    fn validate_codec_arguments_rejects_bad_level() {
        let err = validate_codec_arguments(TransferMode::Compress, Some("ZLIB"), Some(99)).unwrap_err();
        assert!(matches!(err, AutoCompError::InvalidCompressionLevel { .. }));
    }

    #[test]
    fn pre_compress_file_buffers_chunks_and_decompresses_once_at_last_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let original = b"some text that compresses nicely ".repeat(4000);

        let mut compressed = ChunkBuffer::new(original.len() + 4096);
        let mut input = ChunkBuffer::new(original.len());
        input.set_data(&original).unwrap();
        compression::compress(Codec::Zlib(6), &input, &mut compressed).unwrap();

        let initial = FileInitialMessageProto {
            filename: "report.txt".to_string(),
            filesize: original.len() as u64,
            chunksize_kb: 64,
            last_file: Some(true),
        };
        let mut open_file = open_destination(dir.path(), &initial, TransferMode::PreCompress).unwrap();

        let body = compressed.data();
        let wire_chunk = 64 * 1024;
        let slices: Vec<&[u8]> = body.chunks(wire_chunk).collect();
        for (i, slice) in slices.iter().enumerate() {
            let header = ChunkHeaderProto {
                compressor: Codec::Zlib(6).ordinal(),
                level: Codec::Zlib(6).level(),
                chunk_position: i as u64,
                last_chunk: (i + 1 == slices.len()).then_some(true),
            };
            apply_chunk(&mut open_file, &header, slice).unwrap();
        }
        let dest_path = dir.path().join("report.txt");
        finish_file(open_file).unwrap();

        let written = fs::read(&dest_path).unwrap();
        assert_eq!(written, original);
    }
}
