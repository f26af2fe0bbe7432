// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Layered Configuration (§12)
//!
//! Built-in defaults, optionally overridden by a TOML config file, in turn
//! overridden by `AUTOCOMP_*` environment variables, in turn overridden by
//! whatever the CLI actually parsed (clap has already applied its own
//! `env = "..."` fallbacks by the time a `ServerArgs`/`ClientArgs` reaches
//! here — this module only has to fold in the file layer clap doesn't know
//! about).

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use autocomp_bootstrap::cli::{DEFAULT_DECISION_TREE, DEFAULT_PORT, DEFAULT_SHUTDOWN_FIFO};
use autocomp_bootstrap::ServerArgs;

use crate::AutoCompError;

pub const DEFAULT_SEND_BUFFER_CAPACITY: usize = 12_000_000;
pub const DEFAULT_LOG_DIR: &str = "./log";

/// Settings for the server binary after all four layers have been folded
/// together. Fields not exposed on the CLI (send-buffer capacity, log
/// directory) only ever come from the file/env/default layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub threads: Option<usize>,
    pub decision_tree: PathBuf,
    pub shutdown_fifo: PathBuf,
    pub send_buffer_capacity: usize,
    pub log_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            threads: None,
            decision_tree: PathBuf::from(DEFAULT_DECISION_TREE),
            shutdown_fifo: PathBuf::from(DEFAULT_SHUTDOWN_FIFO),
            send_buffer_capacity: DEFAULT_SEND_BUFFER_CAPACITY,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl ServerSettings {
    /// Folds the default → optional TOML file → `AUTOCOMP_*` env vars →
    /// parsed CLI flags, in that precedence order (§12).
    pub fn resolve(args: &ServerArgs) -> Result<Self, AutoCompError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.as_path()));
        }

        builder = builder.add_source(Environment::with_prefix("AUTOCOMP").try_parsing(true));

        let folded: Self = builder
            .build()
            .map_err(|e| AutoCompError::io(format!("configuration error: {e}")))?
            .try_deserialize()
            .map_err(|e| AutoCompError::io(format!("configuration error: {e}")))?;

        // CLI flags win over everything, including an explicit env var,
        // because clap already resolved its own `env = "..."` fallbacks —
        // `args.port` is only `DEFAULT_PORT` here if nothing upstream set
        // it, so an explicit `-p` always takes precedence by construction.
        Ok(Self {
            port: if args.port != DEFAULT_PORT { args.port } else { folded.port },
            threads: args.threads.or(folded.threads),
            decision_tree: if args.decision_tree != PathBuf::from(DEFAULT_DECISION_TREE) {
                args.decision_tree.clone()
            } else {
                folded.decision_tree
            },
            shutdown_fifo: if args.shutdown_fifo != PathBuf::from(DEFAULT_SHUTDOWN_FIFO) {
                args.shutdown_fifo.clone()
            } else {
                folded.shutdown_fifo
            },
            ..folded
        })
    }
}
