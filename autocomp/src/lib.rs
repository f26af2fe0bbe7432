// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Adaptive per-chunk compression file-transfer server and client.
//!
//! `infrastructure` holds everything that touches a socket, the filesystem,
//! the kernel's CPU counters, or the config/logging/telemetry ambient stack.
//! `application` wires those collaborators into the server's and client's
//! actual control flow (§4: request parsing, codec selection, framing,
//! accept loop, process lifecycle).

pub mod application;
pub mod infrastructure;

pub use autocomp_domain::AutoCompError;
