// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Performance Telemetry Sink (§5(iv), §6, §12)
//!
//! Per-chunk compression performance, written as CSV to
//! `AutoComp.CompressorsPerformance.<YYYYMMDD-HHMMSS>.csv` in the
//! configured log directory. A bounded channel decouples the pipeline and
//! send-loop threads (which call [`TelemetrySink::record`]) from a single
//! background writer thread, so no hot-path thread ever blocks on disk I/O;
//! the background thread is the "single writer-serialized" file per §5.
//!
//! `TRAIN` mode (§4.K) records every field below; other modes still record
//! one row per chunk, just with `mode` set accordingly — this keeps the
//! sink itself mode-agnostic.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam::channel::{bounded, Sender};

use autocomp_domain::value_objects::{Codec, TransferMode};
use autocomp_domain::AutoCompError;

const CHANNEL_CAPACITY: usize = 4096;

/// One row of per-chunk performance telemetry.
#[derive(Debug, Clone)]
pub struct ChunkTelemetry {
    pub connection_id: u64,
    pub filename: String,
    pub mode: TransferMode,
    pub chunk_position: u64,
    pub codec_used: Codec,
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub cpu_load: f32,
    pub bandwidth_mbps: f32,
}

impl ChunkTelemetry {
    fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{:.4},{:.4},{:.4}\n",
            self.connection_id,
            csv_escape(&self.filename),
            self.mode.as_str(),
            self.chunk_position,
            self.codec_used.name(),
            self.codec_used.level(),
            self.input_bytes,
            self.output_bytes,
            self.cpu_load,
            self.bandwidth_mbps,
        )
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

const HEADER: &str = "connection_id,filename,mode,chunk_position,codec,level,input_bytes,output_bytes,cpu_load,bandwidth_mbps\n";

/// Handle to the background telemetry writer thread. Dropping it closes the
/// channel and joins the writer, flushing any buffered rows.
pub struct TelemetrySink {
    sender: Option<Sender<ChunkTelemetry>>,
    handle: Option<JoinHandle<()>>,
}

impl TelemetrySink {
    /// Opens (creating if needed) `log_dir/AutoComp.CompressorsPerformance.<stamp>.csv`
    /// and spawns the background writer. `timestamp` is injected by the
    /// caller rather than sampled here, since this crate never calls
    /// `SystemTime::now` internally.
    pub fn open(log_dir: &Path, timestamp: &str) -> Result<Self, AutoCompError> {
        std::fs::create_dir_all(log_dir)?;
        let path = log_dir.join(format!("AutoComp.CompressorsPerformance.{timestamp}.csv"));
        let file = File::create(&path)?;
        Self::spawn(file)
    }

    fn spawn(file: File) -> Result<Self, AutoCompError> {
        let mut writer = BufWriter::new(file);
        writer.write_all(HEADER.as_bytes())?;

        let (sender, receiver) = bounded::<ChunkTelemetry>(CHANNEL_CAPACITY);
        let handle = std::thread::spawn(move || {
            for row in receiver {
                if writer.write_all(row.to_csv_row().as_bytes()).is_err() {
                    break;
                }
            }
            let _ = writer.flush();
        });

        Ok(Self { sender: Some(sender), handle: Some(handle) })
    }

    /// Enqueues a row for the background writer. Never blocks the caller on
    /// disk I/O; if the channel is full, the row is dropped rather than
    /// stalling the pipeline or send loop (telemetry is best-effort).
    pub fn record(&self, row: ChunkTelemetry) {
        if let Some(sender) = &self.sender {
            let _ = sender.try_send(row);
        }
    }

    /// Closes the channel and blocks until the writer thread has flushed and
    /// exited.
    pub fn close(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TelemetrySink {
    fn drop(&mut self) {
        self.close();
    }
}

/// Formats a path-safe timestamp component for the CSV file name, given
/// already-decomposed UTC date/time fields (callers source these from
/// `chrono::Utc::now()` at the call site, keeping this function itself free
/// of a direct clock read).
pub fn format_timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> String {
    format!("{year:04}{month:02}{day:02}-{hour:02}{minute:02}{second:02}")
}
