/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/runners.rs
* `runners scale` and `runners hpa install` (SPEC_FULL.md §4.7 "runners").
* SPDX-License-Identifier: Apache-2.0 */

use crate::args::{flag_value, parse_nonneg_i64};
use crate::context::AppContext;
use crate::envelope::EnvelopeBuilder;
use crate::status::Status;
use crate::worker::WorkerName;

const DEFAULT_AUTOSCALE_METRIC: &str = "build_queue_length";
const DEFAULT_HPA_NAMESPACE: &str = "phgit-runner";
const DEFAULT_HPA_METRIC: &str = "phgit_build_queue_length";

pub fn handle(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(subcommand) = args.first() else {
        return Status::InvalidArgs;
    };

    match subcommand.as_str() {
        "scale" => scale(ctx, &args[1..]),
        "hpa" if args.get(1).map(String::as_str) == Some("install") => hpa_install(ctx, &args[2..]),
        _ => Status::NotFound,
    }
}

fn scale(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(min_raw) = flag_value(args, "--min") else {
        return Status::InvalidArgs;
    };
    let Some(max_raw) = flag_value(args, "--max") else {
        return Status::InvalidArgs;
    };
    let Some(min) = parse_nonneg_i64(&min_raw) else {
        return Status::InvalidArgs;
    };
    let Some(max) = parse_nonneg_i64(&max_raw) else {
        return Status::InvalidArgs;
    };
    if min > max {
        return Status::InvalidArgs;
    }

    let metric = flag_value(args, "--autoscale-metric").unwrap_or_else(|| DEFAULT_AUTOSCALE_METRIC.to_string());
    let cluster = ctx.active_cluster();

    let envelope = match EnvelopeBuilder::open("scale")
        .field("min_replicas", min)
        .field("max_replicas", max)
        .field("metric", metric)
        .field_opt::<String>("cluster", cluster)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    let result = ctx.worker.invoke(WorkerName::RunRunnerManager, &envelope);
    if !result.is_success() {
        if let Some(err) = &result.error {
            eprintln!("error: {err}");
        }
        return Status::ExecFailed;
    }
    Status::Success
}

fn hpa_install(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(target) = flag_value(args, "--target") else {
        return Status::InvalidArgs;
    };
    let namespace = flag_value(args, "--namespace").unwrap_or_else(|| DEFAULT_HPA_NAMESPACE.to_string());
    let metric = flag_value(args, "--metric").unwrap_or_else(|| DEFAULT_HPA_METRIC.to_string());

    let envelope = match EnvelopeBuilder::open("hpa_install")
        .field("namespace", namespace)
        .field("metric", metric)
        .field("target", target)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    let result = ctx.worker.invoke(WorkerName::RunRunnerManager, &envelope);
    if !result.is_success() {
        if let Some(err) = &result.error {
            eprintln!("error: {err}");
        }
        return Status::ExecFailed;
    }
    Status::Success
}
