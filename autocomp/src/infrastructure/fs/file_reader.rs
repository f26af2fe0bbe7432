// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunked File Reader (§4.D)
//!
//! Drives a [`DirectoryIterator`] one file at a time, exposing exactly the
//! state machine the spec describes: `open_next` advances to the next path
//! and reports its size, `has_next_chunk` tells the caller whether to keep
//! pulling, and `read_chunk` fills a [`ChunkBuffer`] with up to
//! `chunk_size_bytes` and advances `bytes_read`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use autocomp_domain::value_objects::ChunkBuffer;
use autocomp_domain::AutoCompError;

use super::DirectoryIterator;

pub struct ChunkedFileReader {
    paths: DirectoryIterator,
    chunk_size_bytes: usize,
    current: Option<OpenFile>,
}

struct OpenFile {
    path: PathBuf,
    handle: File,
    size: u64,
    bytes_read: u64,
}

impl ChunkedFileReader {
    pub fn new(paths: DirectoryIterator, chunk_size_bytes: usize) -> Self {
        Self { paths, chunk_size_bytes, current: None }
    }

    /// Opens the next path from the directory iterator, seeking to the end
    /// and back to determine its size (§4.D). Returns `None` once the
    /// iterator is exhausted.
    pub fn open_next(&mut self) -> Result<Option<(PathBuf, u64)>, AutoCompError> {
        let Some(path) = self.paths.next() else {
            self.current = None;
            return Ok(None);
        };

        let mut handle = File::open(&path)?;
        let size = handle.seek(SeekFrom::End(0))?;
        handle.seek(SeekFrom::Start(0))?;

        self.current = Some(OpenFile { path: path.clone(), handle, size, bytes_read: 0 });
        Ok(Some((path, size)))
    }

    /// True iff a file is open, had no read error, and has unread bytes
    /// remaining.
    pub fn has_next_chunk(&self) -> bool {
        match &self.current {
            Some(file) => file.bytes_read < file.size,
            None => false,
        }
    }

    /// Reads up to `chunk_size_bytes` into `buf`, setting `buf.size()` to
    /// the actual amount read and advancing `bytes_read`. Fails with
    /// `IOError` if no file is open or no chunk remains (§4.D).
    pub fn read_chunk(&mut self, buf: &mut ChunkBuffer) -> Result<(), AutoCompError> {
        let file = self
            .current
            .as_mut()
            .ok_or_else(|| AutoCompError::io("read_chunk called with no file open"))?;

        let remaining = file.size - file.bytes_read;
        if remaining == 0 {
            return Err(AutoCompError::io("read_chunk called with no chunk remaining"));
        }

        let want = (self.chunk_size_bytes as u64).min(remaining) as usize;
        let scratch = &mut buf.data_mut_full()[..want];
        let mut read_total = 0usize;
        while read_total < want {
            let n = file.handle.read(&mut scratch[read_total..])?;
            if n == 0 {
                break;
            }
            read_total += n;
        }

        buf.set_size(read_total)?;
        file.bytes_read += read_total as u64;
        Ok(())
    }

    pub fn current_path(&self) -> Option<&PathBuf> {
        self.current.as_ref().map(|f| &f.path)
    }
}
