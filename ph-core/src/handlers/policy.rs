/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/policy.rs
* `policy scan`, `policy apply`, `policy test` (SPEC_FULL.md §4.7 "policy").
* SPDX-License-Identifier: Apache-2.0 */

use crate::args::{flag_value, has_flag, parse_positive_i64};
use crate::context::AppContext;
use crate::envelope::EnvelopeBuilder;
use crate::status::Status;
use crate::worker::{WorkerName, WorkerResult};

pub fn handle(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(subcommand) = args.first() else {
        return Status::InvalidArgs;
    };

    match subcommand.as_str() {
        "scan" => scan(ctx, &args[1..]),
        "apply" => apply(ctx, &args[1..]),
        "test" => test(ctx, &args[1..]),
        _ => Status::NotFound,
    }
}

fn scan(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(path) = flag_value(args, "--path") else {
        return Status::InvalidArgs;
    };
    let Some(policy_repo) = flag_value(args, "--policy-repo") else {
        return Status::InvalidArgs;
    };
    let fail_on_violation = has_flag(args, "--fail-on-violation");

    let parameters = serde_json::json!({
        "manifest_path": path,
        "policy_repo_path": policy_repo,
        "fail_on_violation": fail_on_violation,
    });
    dispatch_envelope(ctx, "scan", parameters)
}

fn apply(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(mode) = flag_value(args, "--mode") else {
        return Status::InvalidArgs;
    };
    let cluster = flag_value(args, "--cluster").or_else(|| ctx.active_cluster());
    let policy_repo = flag_value(args, "--policy-repo");

    let mut parameters = serde_json::json!({ "mode": mode });
    if let Some(c) = cluster {
        parameters["cluster_name"] = c.into();
    }
    if let Some(repo) = policy_repo {
        parameters["policy_repo_path"] = repo.into();
    }
    dispatch_envelope(ctx, "apply", parameters)
}

fn test(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(pr_raw) = flag_value(args, "--pr") else {
        return Status::InvalidArgs;
    };
    let Some(pr_number) = parse_positive_i64(&pr_raw) else {
        return Status::InvalidArgs;
    };
    let policy_repo = flag_value(args, "--policy-repo");

    let mut parameters = serde_json::json!({ "pr_number": pr_number });
    if let Some(repo) = policy_repo {
        parameters["policy_repo_path"] = repo.into();
    }
    dispatch_envelope(ctx, "test", parameters)
}

fn dispatch_envelope(ctx: &mut AppContext, action: &str, parameters: serde_json::Value) -> Status {
    let envelope = match EnvelopeBuilder::open(action).field("parameters", parameters).close() {
        Ok(e) => e,
        Err(status) => return status,
    };

    let result = ctx.worker.invoke(WorkerName::RunPolicyEngine, &envelope);
    finish(result)
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
