/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/dispatch.rs
* The root dispatcher: stage-wise routing into command groups, the
* scripted command registry, and the native module registry. Grounded
* stage-for-stage on `cli_dispatch_command` in the original dispatcher.
* SPDX-License-Identifier: Apache-2.0 */

use tracing::warn;

use crate::context::AppContext;
use crate::handlers;
use crate::status::Status;

const KNOWN_GROUPS: &[&str] = &[
    "kube", "local", "runners", "secrets", "policy", "health", "autoheal", "preview",
];

/// `argv[0]` is the tool name, `argv[1]` the command. Stages 1-4 are
/// priority-ordered; the first match wins and there is no fallback to a
/// later stage on a chosen destination's failure.
pub fn dispatch(ctx: &mut AppContext, argv: &[String]) -> Status {
    if argv.len() < 2 || argv[1].trim().is_empty() {
        warn!("no command provided");
        eprintln!("error: No command provided");
        return Status::InvalidArgs;
    }

    let command = argv[1].as_str();

    if KNOWN_GROUPS.contains(&command) {
        if argv.len() < 3 {
            warn!(group = command, "group invoked without a subcommand");
            return Status::InvalidArgs;
        }
        let rest = &argv[2..];
        return handlers::dispatch_group(ctx, command, rest);
    }

    if ctx.scripted.has(command) {
        return ctx.scripted.exec(command, &argv[1..]);
    }

    if let Some(module) = ctx.native.find_handler(command) {
        return module.exec(&argv[1..]);
    }

    eprintln!("error: Unknown command: '{command}'");
    Status::NotFound
}
