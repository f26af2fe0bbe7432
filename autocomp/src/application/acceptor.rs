// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Acceptor (§4.N)
//!
//! The one thread that owns the listening socket. Blocks in `poll(2)` on
//! two descriptors at once — the listener and the shutdown notifier's FIFO
//! read end — so a signal can interrupt an otherwise-idle accept loop
//! without a wakeup-polling hack. Every accepted connection is handed off
//! immediately: its producer side (K) goes to the request pool, its
//! consumer side (L) goes to the transmission pool, and the acceptor loops
//! back to `poll` rather than doing any connection work itself.

use std::net::{TcpListener, TcpStream};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;

use crossbeam::channel::bounded;

use autocomp_bootstrap::shutdown::ShutdownNotifier;
use autocomp_domain::services::DecisionTree;
use autocomp_domain::value_objects::ResourceState;

use crate::infrastructure::logging::next_connection_id;
use crate::infrastructure::net::socket::TcpSendSocket;
use crate::infrastructure::telemetry::TelemetrySink;
use crate::infrastructure::WorkerPool;

use super::pipeline::{run_request, PipelineContext};
use super::send_loop::run_send_loop;

const POLL_TIMEOUT_MS: i32 = 500;
const SEND_QUEUE_DEPTH: usize = 64;

/// Collaborators every accepted connection needs, owned by the server (P)
/// for the process lifetime and borrowed here.
pub struct AcceptorDeps {
    pub send_buffer_capacity: usize,
    pub resource: Arc<ResourceState>,
    pub tree: Arc<DecisionTree>,
    pub telemetry: Arc<TelemetrySink>,
}

/// Runs the accept loop until the shutdown notifier fires. Blocks the
/// calling thread for the server's whole lifetime.
pub fn run(listener: &TcpListener, notifier: &ShutdownNotifier, request_pool: &WorkerPool, transmission_pool: &WorkerPool, deps: &AcceptorDeps) {
    listener.set_nonblocking(true).expect("listener must support non-blocking mode");
    let listener_fd = listener.as_raw_fd();
    let notifier_fd = notifier.read_fd();

    while notifier.should_run() {
        let mut fds = [
            libc::pollfd { fd: listener_fd, events: libc::POLLIN, revents: 0 },
            libc::pollfd { fd: notifier_fd, events: libc::POLLIN, revents: 0 },
        ];
        // SAFETY: both descriptors outlive this call (owned by `listener`
        // and `notifier`, both borrowed for the duration of `run`).
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, POLL_TIMEOUT_MS) };
        if rc < 0 {
            continue;
        }

        if fds[1].revents & libc::POLLIN != 0 {
            notifier.drain_and_stop();
            break;
        }

        if fds[0].revents & libc::POLLIN != 0 {
            accept_ready_connections(listener, request_pool, transmission_pool, deps);
        }
    }
}

fn accept_ready_connections(listener: &TcpListener, request_pool: &WorkerPool, transmission_pool: &WorkerPool, deps: &AcceptorDeps) {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                tracing::info!(peer = %addr, "accepted connection");
                dispatch_connection(stream, request_pool, transmission_pool, deps);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                break;
            }
        }
    }
}

fn dispatch_connection(stream: TcpStream, request_pool: &WorkerPool, transmission_pool: &WorkerPool, deps: &AcceptorDeps) {
    let connection_id = next_connection_id();

    let reader_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(connection_id, error = %e, "failed to clone accepted connection");
            return;
        }
    };
    let write_socket = TcpSendSocket::new(stream, deps.send_buffer_capacity);
    let load_socket = match write_socket.try_clone() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(connection_id, error = %e, "failed to clone connection for load queries");
            return;
        }
    };

    let (sender, receiver) = bounded(SEND_QUEUE_DEPTH);

    let resource_for_send = deps.resource.clone();
    transmission_pool.submit(move || {
        run_send_loop(write_socket, receiver, resource_for_send, connection_id);
    });

    let ctx = PipelineContext {
        connection_id,
        resource: deps.resource.clone(),
        tree: deps.tree.clone(),
        telemetry: deps.telemetry.clone(),
    };
    request_pool.submit(move || {
        if let Err(err) = run_request(reader_stream, &load_socket, &sender, &ctx) {
            tracing::warn!(connection_id, error = %err, "connection ended with an error");
        }
    });
}
