// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Wire Framer (§4.M)
//!
//! Every message on the wire — control or payload — is a 32-bit
//! big-endian length prefix followed by exactly that many bytes. This
//! module is the one place that discipline is implemented; everything else
//! (request parsing, the pipeline, the client mirror) calls `read_frame`/
//! `write_frame` and deals only in already-framed byte slices or decoded
//! `prost` messages.

use std::io::{self, Read, Write};

use autocomp_domain::AutoCompError;

/// Writes `payload` as `LEN:u32_be` followed by `payload` itself.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), AutoCompError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| AutoCompError::network(format!("frame of {} bytes exceeds u32", payload.len())))?;
    writer.write_all(&len.to_be_bytes()).map_err(io_to_network)?;
    writer.write_all(payload).map_err(io_to_network)?;
    Ok(())
}

/// Reads one frame: 4 bytes of big-endian length, then exactly that many
/// payload bytes. Returns `Ok(None)` on a clean EOF before any bytes of the
/// length prefix are read (the peer closed between frames); any other
/// short read is a `NetworkError`.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, AutoCompError> {
    let mut len_buf = [0u8; 4];
    match read_exact_or_eof(reader, &mut len_buf)? {
        false => return Ok(None),
        true => {}
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(io_to_network)?;
    Ok(Some(payload))
}

/// Like `read_exact`, but distinguishes "EOF before any byte was read"
/// (returns `Ok(false)`) from a genuine short read mid-prefix (a
/// `NetworkError`), and from a full read (`Ok(true)`).
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool, AutoCompError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(AutoCompError::network("connection closed mid-frame-length"));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_to_network(e)),
        }
    }
    Ok(true)
}

fn io_to_network(e: io::Error) -> AutoCompError {
    AutoCompError::network(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello world").unwrap();
        assert_eq!(&buf[0..4], &11u32.to_be_bytes());

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(decoded, b"hello world");
    }

    #[test]
    fn empty_payload_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &[]).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).unwrap().unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn clean_eof_before_any_frame_is_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn truncated_length_prefix_is_a_network_error() {
        let mut cursor = Cursor::new(vec![0u8, 1]);
        assert!(read_frame(&mut cursor).is_err());
    }

    #[test]
    fn truncated_payload_is_a_network_error() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&10u32.to_be_bytes());
        buf.extend_from_slice(b"short");
        let mut cursor = Cursor::new(buf);
        assert!(read_frame(&mut cursor).is_err());
    }

    #[test]
    fn two_frames_back_to_back_are_independently_readable() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"first").unwrap();
        write_frame(&mut buf, b"second").unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_frame(&mut cursor).unwrap().unwrap(), b"first");
        assert_eq!(read_frame(&mut cursor).unwrap().unwrap(), b"second");
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }
}
