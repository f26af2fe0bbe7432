// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interfaces
//!
//! Two small `clap`-derived argument sets, one per binary, per §6 and the
//! configuration layering in §12 (CLI flag > env var > config file >
//! built-in default — only the CLI/env layers live here; the config-file
//! layer is infrastructure::config in the core crate).

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_PORT: u16 = 25111;
pub const DEFAULT_SHUTDOWN_FIFO: &str = "/tmp/autocomp.fifo";
pub const DEFAULT_DECISION_TREE: &str = "./models/decision_tree.txt";

/// `autocomp-server [-p port] [-t n_threads]`
#[derive(Parser, Debug, Clone)]
#[command(name = "autocomp-server", about = "Adaptive compression file-transfer server")]
pub struct ServerArgs {
    /// TCP port to listen on.
    #[arg(short = 'p', long, env = "AUTOCOMP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Worker threads per pool (request pool and transmission pool each get
    /// this many). Defaults to the number of logical CPUs.
    #[arg(short = 't', long, env = "AUTOCOMP_THREADS")]
    pub threads: Option<usize>,

    /// Path to the pre-trained decision tree file (§3).
    #[arg(long, env = "AUTOCOMP_DECISION_TREE", default_value = DEFAULT_DECISION_TREE)]
    pub decision_tree: PathBuf,

    /// Path of the shutdown-notifier FIFO (§6).
    #[arg(long, env = "AUTOCOMP_SHUTDOWN_FIFO", default_value = DEFAULT_SHUTDOWN_FIFO)]
    pub shutdown_fifo: PathBuf,

    /// Optional TOML config file; CLI flags and env vars override it (§12).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit logs as newline-delimited JSON instead of compact text.
    #[arg(long)]
    pub log_json: bool,
}

/// `autocomp-client -H host [-P port] -f path -d dest_dir [-m mode] [-c codec] [-l level]`
#[derive(Parser, Debug, Clone)]
#[command(name = "autocomp-client", about = "Adaptive compression file-transfer client")]
pub struct ClientArgs {
    /// Server host name or address.
    #[arg(short = 'H', long)]
    pub host: String,

    /// Server port.
    #[arg(short = 'P', long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// File or directory to send.
    #[arg(short = 'f', long)]
    pub path: PathBuf,

    /// Destination directory on the server side (interpreted by the
    /// server, not validated here).
    #[arg(short = 'd', long)]
    pub dest_dir: String,

    /// Transfer mode: NO_COMPRESSION | AUTOCOMP | COMPRESS | PRE_COMPRESS |
    /// TRAIN (case-insensitive). Defaults to AUTOCOMP.
    #[arg(short = 'm', long, default_value = "AUTOCOMP")]
    pub mode: String,

    /// Codec name, required for COMPRESS/PRE_COMPRESS/TRAIN.
    #[arg(short = 'c', long)]
    pub codec: Option<String>,

    /// Compression level for `codec`; defaults to that codec's default
    /// level if omitted.
    #[arg(short = 'l', long)]
    pub level: Option<i32>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub log_json: bool,
}

/// Parses `autocomp-server`'s arguments from `std::env::args`.
pub fn parse_server_args() -> ServerArgs {
    ServerArgs::parse()
}

/// Parses `autocomp-client`'s arguments from `std::env::args`.
pub fn parse_client_args() -> ClientArgs {
    ClientArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_args_default_port_and_fifo() {
        let args = ServerArgs::parse_from(["autocomp-server"]);
        assert_eq!(args.port, DEFAULT_PORT);
        assert_eq!(args.shutdown_fifo, PathBuf::from(DEFAULT_SHUTDOWN_FIFO));
        assert_eq!(args.threads, None);
    }

    #[test]
    fn server_args_accepts_explicit_thread_count() {
        let args = ServerArgs::parse_from(["autocomp-server", "-p", "9000", "-t", "4"]);
        assert_eq!(args.port, 9000);
        assert_eq!(args.threads, Some(4));
    }

    #[test]
    fn client_args_requires_host_path_and_dest() {
        let args = ClientArgs::parse_from([
            "autocomp-client",
            "-H",
            "example.com",
            "-f",
            "/tmp/a.txt",
            "-d",
            "incoming",
        ]);
        assert_eq!(args.host, "example.com");
        assert_eq!(args.mode, "AUTOCOMP");
        assert_eq!(args.codec, None);
    }

    #[test]
    fn client_args_missing_required_flag_fails() {
        let result = ClientArgs::try_parse_from(["autocomp-client", "-H", "example.com"]);
        assert!(result.is_err());
    }
}
