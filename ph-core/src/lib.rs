/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/lib.rs
* The `ph-core` crate root: the dispatch and orchestration core shared by
* the `ph` binary and its tests (SPEC_FULL.md §1-§2).
* SPDX-License-Identifier: Apache-2.0 */

pub mod args;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod handlers;
pub mod menu;
pub mod registry;
pub mod status;
pub mod trace;
pub mod worker;

pub use context::{AppContext, PathConfig};
pub use status::Status;

/// Runs the root dispatcher against a full `argv` (tool name included),
/// the single entry point `ph-cli::main` calls.
pub fn run(ctx: &mut AppContext, argv: &[String]) -> Status {
    dispatch::dispatch(ctx, argv)
}
