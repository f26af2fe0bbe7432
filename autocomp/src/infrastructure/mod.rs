// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure: everything that talks to a socket, the filesystem, the
//! kernel's CPU counters, or an external process, plus the ambient stack
//! (config, logging, telemetry, worker pools) the application layer is
//! built on top of.

pub mod compression;
pub mod config;
pub mod fs;
pub mod logging;
pub mod net;
pub mod resource;
pub mod telemetry;
pub mod worker_pool;

pub use worker_pool::WorkerPool;
