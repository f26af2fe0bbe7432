// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Server Lifecycle (§4.P)
//!
//! Strict init order: logger, telemetry sink, request pool, shutdown
//! notifier, listening socket, CPU sampler, then the accept loop (N), which
//! blocks for the process lifetime. Shutdown runs the same list in reverse
//! once the notifier fires: drop the listener, join the request pool, join
//! the transmission pool, stop and join the CPU sampler, then drop the
//! telemetry sink (flushing its writer thread).

use std::fs::File;
use std::io::BufReader;
use std::net::TcpListener;
use std::sync::Arc;

use chrono::{Datelike, Timelike, Utc};

use autocomp_bootstrap::shutdown::ShutdownNotifier;
use autocomp_bootstrap::{create_platform, ServerArgs};
use autocomp_domain::services::DecisionTree;
use autocomp_domain::value_objects::ResourceState;
use autocomp_domain::AutoCompError;

use crate::infrastructure::config::ServerSettings;
use crate::infrastructure::resource::cpu_sampler::ProcStatSource;
use crate::infrastructure::resource::CpuSampler;
use crate::infrastructure::telemetry::{format_timestamp, TelemetrySink};
use crate::infrastructure::WorkerPool;

use super::acceptor::{self, AcceptorDeps};

/// Parses the args into settings and runs the server until the shutdown
/// notifier fires. Returns on a clean shutdown; any setup failure (socket
/// bind, decision tree load, FIFO creation) is returned as an error before
/// anything has been spawned.
pub fn run(args: ServerArgs) -> Result<(), AutoCompError> {
    crate::infrastructure::logging::init(args.log_json);

    let settings = ServerSettings::resolve(&args)?;
    let platform = create_platform();
    let pool_size = settings.threads.unwrap_or_else(|| platform.cpu_count());

    let tree_file = File::open(&settings.decision_tree)
        .map_err(|e| AutoCompError::io(format!("opening decision tree {}: {e}", settings.decision_tree.display())))?;
    let tree = Arc::new(DecisionTree::load(BufReader::new(tree_file))?);

    let now = Utc::now();
    let timestamp = format_timestamp(now.year(), now.month(), now.day(), now.hour(), now.minute(), now.second());
    let telemetry = Arc::new(TelemetrySink::open(&settings.log_dir, &timestamp)?);

    let mut request_pool = WorkerPool::new(pool_size, "request");
    let mut transmission_pool = WorkerPool::new(pool_size, "transmission");

    let notifier = ShutdownNotifier::install(&settings.shutdown_fifo)
        .map_err(|e| AutoCompError::io(format!("installing shutdown notifier: {e}")))?;

    let listener = TcpListener::bind(("0.0.0.0", settings.port))
        .map_err(|e| AutoCompError::io(format!("binding port {}: {e}", settings.port)))?;
    tracing::info!(port = settings.port, threads = pool_size, platform = platform.platform_name(), "autocomp server listening");

    let resource = Arc::new(ResourceState::new());
    let cpu_sampler_state = resource.clone();
    let mut cpu_sampler = CpuSampler::spawn(cpu_sampler_state, ProcStatSource);

    let deps = AcceptorDeps {
        send_buffer_capacity: settings.send_buffer_capacity,
        resource,
        tree,
        telemetry: telemetry.clone(),
    };

    acceptor::run(&listener, &notifier, &request_pool, &transmission_pool, &deps);

    drop(listener);
    request_pool.shutdown();
    transmission_pool.shutdown();
    cpu_sampler.stop();
    cpu_sampler.join();
    drop(telemetry);

    tracing::info!("autocomp server shut down cleanly");
    Ok(())
}
