/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/mod.rs
* Sub-dispatch from a known group name to its handler (SPEC_FULL.md §4.7).
* SPDX-License-Identifier: Apache-2.0 */

pub mod health;
pub mod kube;
pub mod local;
pub mod policy;
pub mod preview;
pub mod runners;
pub mod secrets;

use crate::context::AppContext;
use crate::status::Status;

/// Routes a known group name to its handler. `args` is the group's argv
/// with the tool name and group name already stripped (i.e. it begins at
/// the subcommand).
pub fn dispatch_group(ctx: &mut AppContext, group: &str, args: &[String]) -> Status {
    match group {
        "kube" => kube::handle(ctx, args),
        "local" => local::handle(ctx, args),
        "runners" => runners::handle(ctx, args),
        "secrets" => secrets::handle(ctx, args),
        "policy" => policy::handle(ctx, args),
        "health" | "autoheal" => health::handle(ctx, args),
        "preview" => preview::handle(ctx, args),
        _ => unreachable!("dispatch_group called with an unknown group: {group}"),
    }
}
