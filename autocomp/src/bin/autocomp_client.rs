// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use autocomp::application::client;
use autocomp_bootstrap::cli::parse_client_args;
use autocomp_bootstrap::result_to_exit_code;

fn main() -> std::process::ExitCode {
    let args = parse_client_args();
    result_to_exit_code(client::run(args).map_err(anyhow::Error::from))
}
