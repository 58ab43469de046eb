/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-cli/src/main.rs
* The `ph` binary: wires production capability implementations into
* `ph-core`'s `AppContext` and runs the root dispatcher against
* `std::env::args`.
* SPDX-License-Identifier: Apache-2.0 */

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use ph_core::context::{AppContext, PathConfig};
use ph_core::registry::{EmptyNativeModuleRegistry, EmptyScriptedCommandRegistry};
use ph_core::trace::NullTraceContextSource;
use ph_core::worker::{KubectlApplier, UnwiredWorkerInvoker};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("PH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let argv: Vec<String> = std::env::args().collect();

    let paths = PathConfig::default();
    let mut ctx = AppContext::new(
        paths,
        Box::new(UnwiredWorkerInvoker),
        Box::new(KubectlApplier::default()),
        Box::new(NullTraceContextSource),
        Box::new(EmptyScriptedCommandRegistry),
        Box::new(EmptyNativeModuleRegistry),
    );

    let status = ph_core::run(&mut ctx, &argv);
    std::process::exit(status.exit_code());
}
