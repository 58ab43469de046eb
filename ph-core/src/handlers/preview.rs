/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/preview.rs
* The preview-environment lifecycle: create / status / teardown / logs /
* exec / extend / gc (SPEC_FULL.md §4.8), the most state-rich surface in
* the core.
* SPDX-License-Identifier: Apache-2.0 */

use serde_json::json;

use crate::args::{flag_value, parse_nonneg_i64, parse_positive_i64, split_on_double_dash};
use crate::context::AppContext;
use crate::envelope::EnvelopeBuilder;
use crate::status::Status;
use crate::worker::{WorkerName, WorkerResult};

pub fn handle(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(subcommand) = args.first() else {
        return Status::InvalidArgs;
    };

    match subcommand.as_str() {
        "create" => create(ctx, &args[1..]),
        "status" => status(ctx, &args[1..]),
        "teardown" => teardown(ctx, &args[1..]),
        "logs" => logs(ctx, &args[1..]),
        "exec" => exec(ctx, &args[1..]),
        "extend" => extend(ctx, &args[1..]),
        "gc" => gc(ctx, &args[1..]),
        _ => Status::NotFound,
    }
}

fn require_pr(args: &[String]) -> Result<i64, Status> {
    let raw = flag_value(args, "--pr").ok_or(Status::InvalidArgs)?;
    parse_positive_i64(&raw).ok_or(Status::InvalidArgs)
}

fn create(ctx: &mut AppContext, args: &[String]) -> Status {
    let pr_number = match require_pr(args) {
        Ok(n) => n,
        Err(s) => return s,
    };
    let Some(repo) = flag_value(args, "--repo") else {
        return Status::InvalidArgs;
    };
    let commit_sha = flag_value(args, "--commit-sha");
    let ttl = match flag_value(args, "--ttl") {
        Some(raw) => match parse_nonneg_i64(&raw) {
            Some(n) => Some(n),
            None => return Status::InvalidArgs,
        },
        None => None,
    };

    let mut builder = EnvelopeBuilder::open("create")
        .field("pr_number", pr_number)
        .field("git_repo_url", repo)
        .field_opt_omit("commit_sha", commit_sha)
        .field_opt_omit("new_ttl", ttl);

    // Trace propagation is create-only (SPEC_FULL.md §4.8). A missing
    // traceparent means the handler proceeds without annotations.
    if let Some(trace) = ctx.trace.start("preview create") {
        builder = builder.field(
            "annotations",
            json!({ "ph.io/trace-context": trace.traceparent }),
        );
    }

    let envelope = match builder.close() {
        Ok(e) => e,
        Err(s) => return s,
    };

    finish(ctx.worker.invoke(WorkerName::RunPreviewManager, &envelope))
}

fn status(ctx: &mut AppContext, args: &[String]) -> Status {
    let pr_number = match require_pr(args) {
        Ok(n) => n,
        Err(s) => return s,
    };
    let envelope = match EnvelopeBuilder::open("status").field("pr_number", pr_number).close() {
        Ok(e) => e,
        Err(s) => return s,
    };
    finish(ctx.worker.invoke(WorkerName::RunPreviewManager, &envelope))
}

fn teardown(ctx: &mut AppContext, args: &[String]) -> Status {
    let pr_number = match require_pr(args) {
        Ok(n) => n,
        Err(s) => return s,
    };
    let envelope = match EnvelopeBuilder::open("destroy").field("pr_number", pr_number).close() {
        Ok(e) => e,
        Err(s) => return s,
    };
    finish(ctx.worker.invoke(WorkerName::RunPreviewManager, &envelope))
}

fn logs(ctx: &mut AppContext, args: &[String]) -> Status {
    let pr_number = match require_pr(args) {
        Ok(n) => n,
        Err(s) => return s,
    };
    let Some(component) = flag_value(args, "--component") else {
        return Status::InvalidArgs;
    };
    let envelope = match EnvelopeBuilder::open("logs")
        .field("pr_number", pr_number)
        .field("component_name", component)
        .close()
    {
        Ok(e) => e,
        Err(s) => return s,
    };
    finish(ctx.worker.invoke(WorkerName::RunPreviewManager, &envelope))
}

fn exec(ctx: &mut AppContext, args: &[String]) -> Status {
    let (flags, command) = split_on_double_dash(args);
    let pr_number = match require_pr(flags) {
        Ok(n) => n,
        Err(s) => return s,
    };
    let Some(component) = flag_value(flags, "--component") else {
        return Status::InvalidArgs;
    };
    if command.is_empty() {
        return Status::InvalidArgs;
    }

    let envelope = match EnvelopeBuilder::open("exec")
        .field("pr_number", pr_number)
        .field("component_name", component)
        .field("command_to_exec", command.to_vec())
        .close()
    {
        Ok(e) => e,
        Err(s) => return s,
    };
    finish(ctx.worker.invoke(WorkerName::RunPreviewManager, &envelope))
}

fn extend(ctx: &mut AppContext, args: &[String]) -> Status {
    let pr_number = match require_pr(args) {
        Ok(n) => n,
        Err(s) => return s,
    };
    let Some(ttl_raw) = flag_value(args, "--ttl") else {
        return Status::InvalidArgs;
    };
    let Some(ttl) = parse_nonneg_i64(&ttl_raw) else {
        return Status::InvalidArgs;
    };

    let envelope = match EnvelopeBuilder::open("extend")
        .field("pr_number", pr_number)
        .field("new_ttl", ttl)
        .close()
    {
        Ok(e) => e,
        Err(s) => return s,
    };
    finish(ctx.worker.invoke(WorkerName::RunPreviewManager, &envelope))
}

fn gc(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(raw) = flag_value(args, "--max-age-hours") else {
        return Status::InvalidArgs;
    };
    let Some(max_age_hours) = parse_nonneg_i64(&raw) else {
        return Status::InvalidArgs;
    };

    let envelope = match EnvelopeBuilder::open("gc").field("max_age_hours", max_age_hours).close() {
        Ok(e) => e,
        Err(s) => return s,
    };
    finish(ctx.worker.invoke(WorkerName::RunPreviewManager, &envelope))
}

fn finish(result: WorkerResult) -> Status {
    if !result.is_success() {
        if let Some(err) = &result.error {
            eprintln!("error: {err}");
        }
        return Status::ExecFailed;
    }
    Status::Success
}
