// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pure domain types for AutoComp: codec identity and level validation,
//! the move-only chunk buffer, process-wide resource state, the decision
//! tree, the bytecount feature, and the wire message shapes. Nothing in this
//! crate touches a socket, a file, or a thread.

pub mod error;
pub mod messages;
pub mod services;
pub mod value_objects;

pub use error::AutoCompError;
