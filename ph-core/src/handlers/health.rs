/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/health.rs
* `health check` and `health/autoheal enable` (SPEC_FULL.md §4.7
* "health / autoheal"). The two groups share this one handler.
* SPDX-License-Identifier: Apache-2.0 */

use crate::args::{flag_value, has_flag};
use crate::context::AppContext;
use crate::envelope::EnvelopeBuilder;
use crate::status::Status;
use crate::worker::WorkerName;

pub fn handle(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(subcommand) = args.first() else {
        return Status::InvalidArgs;
    };

    match subcommand.as_str() {
        "check" => check(ctx, &args[1..]),
        "enable" => enable(ctx, &args[1..]),
        _ => Status::NotFound,
    }
}

fn check(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(app) = flag_value(args, "--app") else {
        return Status::InvalidArgs;
    };
    let cluster = flag_value(args, "--cluster").or_else(|| ctx.active_cluster());
    let Some(cluster) = cluster else {
        return Status::InvalidArgs;
    };
    let full_check = has_flag(args, "--full");

    let envelope = match EnvelopeBuilder::open("check")
        .field("app", app)
        .field("cluster", cluster)
        .field("full_check", full_check)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    let result = ctx.worker.invoke(WorkerName::RunHealthManager, &envelope);
    if !result.is_success() {
        if let Some(err) = &result.error {
            eprintln!("error: {err}");
        }
        return Status::ExecFailed;
    }
    Status::Success
}

/// Renders the fixed `phAutoHealRule` custom resource template
/// (SPEC_FULL.md §8 scenario 5) and applies it through the subprocess
/// invoker.
fn render_autoheal_rule(trigger: &str, actions: &str, cooldown: &str) -> String {
    format!(
        "apiVersion: ph.io/v1\n\
kind: phAutoHealRule\n\
metadata:\n\
  name: autoheal-rule-{trigger}\n\
spec:\n\
  triggerName: {trigger}\n\
  cooldown: \"{cooldown}\"\n\
  actions:\n\
    - runbook:\n\
        scriptName: {actions}\n"
    )
}

fn enable(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(trigger) = flag_value(args, "--on") else {
        return Status::InvalidArgs;
    };
    let Some(actions) = flag_value(args, "--actions") else {
        return Status::InvalidArgs;
    };
    let Some(cooldown) = flag_value(args, "--cooldown") else {
        return Status::InvalidArgs;
    };

    let manifest = render_autoheal_rule(&trigger, &actions, &cooldown);
    ctx.applier.apply(manifest.as_bytes())
}
