/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/kube.rs
* `kube sync|drift|rollout|multi|list-clusters|use-cluster|info|cluster|
* grant|revoke|failover` (SPEC_FULL.md §4.7 "kube"), the largest group
* handler in the core.
* SPDX-License-Identifier: Apache-2.0 */

use std::fs;

use tracing::warn;

use crate::args::{flag_value, has_flag, parse_positive_i64};
use crate::context::AppContext;
use crate::envelope::{EnvelopeBuilder, MANIFEST_CAP_BYTES};
use crate::status::Status;
use crate::worker::{WorkerName, WorkerResult};

pub fn handle(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(subcommand) = args.first() else {
        return Status::InvalidArgs;
    };

    match subcommand.as_str() {
        "sync" => sync(ctx, &args[1..]),
        "drift" => drift(ctx, &args[1..]),
        "rollout" => rollout(ctx, &args[1..]),
        "multi" => multi(ctx, &args[1..]),
        "list-clusters" => list_clusters(ctx, &args[1..]),
        "use-cluster" => use_cluster(ctx, &args[1..]),
        "info" => info(ctx, &args[1..]),
        "cluster" => cluster(ctx, &args[1..]),
        "grant" => grant_revoke(ctx, &args[1..], "grant"),
        "revoke" => grant_revoke(ctx, &args[1..], "revoke"),
        "failover" => failover(ctx, &args[1..]),
        _ => Status::NotFound,
    }
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

fn resolve_cluster(ctx: &mut AppContext, explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| ctx.active_cluster())
}

fn sync(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(path) = flag_value(args, "--path") else {
        return Status::InvalidArgs;
    };
    let Some(cluster) = resolve_cluster(ctx, flag_value(args, "--cluster")) else {
        return Status::NotFound;
    };
    let context = flag_value(args, "--context");
    let dry_run = has_flag(args, "--dry-run");
    let apply = has_flag(args, "--apply");
    let force = has_flag(args, "--force");
    let skip_signature_verification = has_flag(args, "--skip-signature-verification");

    let envelope = match EnvelopeBuilder::open("sync")
        .field("path", path)
        .field("cluster", cluster)
        .field_opt::<String>("context", context)
        .field("dry_run", dry_run)
        .field("force", force)
        .field("apply", apply)
        .field("skip_signature_verification", skip_signature_verification)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunSync, &envelope))
}

fn drift(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(cluster) = resolve_cluster(ctx, flag_value(args, "--cluster")) else {
        return Status::NotFound;
    };
    let open_pr = has_flag(args, "--open-pr");
    let auto_apply = has_flag(args, "--auto-apply");
    if open_pr && auto_apply {
        return Status::InvalidArgs;
    }

    let envelope = match EnvelopeBuilder::open("drift")
        .field("cluster", cluster)
        .field("open_pr", open_pr)
        .field("auto_apply", auto_apply)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunDriftDetector, &envelope))
}

fn rollout(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(action) = args.first() else {
        return Status::InvalidArgs;
    };
    let rest = &args[1..];

    match action.as_str() {
        "start" => rollout_start(ctx, rest),
        "status" => rollout_status(ctx, rest),
        "plan" => rollout_plan(ctx, rest),
        "promote" => rollout_promote_or_rollback(ctx, rest, "promote"),
        "rollback" => rollout_promote_or_rollback(ctx, rest, "rollback"),
        _ => Status::NotFound,
    }
}

fn rollout_start(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(strategy) = flag_value(args, "--type") else {
        return Status::InvalidArgs;
    };
    let Some(app) = flag_value(args, "--app") else {
        return Status::InvalidArgs;
    };
    let Some(image) = flag_value(args, "--image") else {
        return Status::InvalidArgs;
    };
    let steps = flag_value(args, "--steps");
    let metric = flag_value(args, "--metric");
    let analysis_window = flag_value(args, "--analysis-window");
    let skip_sig_check = has_flag(args, "--skip-sig-check");

    // Embedding the public key is best-effort: a missing or unreadable file
    // is a warning, not a failure (SPEC_FULL.md §9, original behavior).
    let public_key = flag_value(args, "--public-key-file").and_then(|path| match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path, error = %e, "could not read public key file, proceeding without it");
            None
        }
    });

    let envelope = match EnvelopeBuilder::open_typed("start")
        .field("strategy", strategy)
        .field("app", app)
        .field("image", image)
        .field("skipSigCheck", skip_sig_check)
        .field_opt_omit("steps", steps)
        .field_opt_omit("metric", metric)
        .field_opt_omit("analysisWindow", analysis_window)
        .field_opt_omit("publicKey", public_key)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunReleaseOrchestrator, &envelope))
}

fn rollout_status(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(id) = flag_value(args, "--id") else {
        return Status::InvalidArgs;
    };
    let watch = has_flag(args, "--watch");

    let envelope = match EnvelopeBuilder::open_typed("status")
        .field("id", id)
        .field("watch", watch)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunReleaseOrchestrator, &envelope))
}

fn rollout_plan(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(strategy) = flag_value(args, "--type") else {
        return Status::InvalidArgs;
    };
    let Some(app) = flag_value(args, "--app") else {
        return Status::InvalidArgs;
    };
    let Some(image) = flag_value(args, "--image") else {
        return Status::InvalidArgs;
    };
    let preview_url = has_flag(args, "--preview-url");

    let envelope = match EnvelopeBuilder::open_typed("plan")
        .field("strategy", strategy)
        .field("app", app)
        .field("image", image)
        .field("previewUrl", preview_url)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunReleaseOrchestrator, &envelope))
}

fn rollout_promote_or_rollback(ctx: &mut AppContext, args: &[String], action: &str) -> Status {
    let Some(id) = flag_value(args, "--id") else {
        return Status::InvalidArgs;
    };

    let to_revision = if action == "rollback" {
        match flag_value(args, "--to-revision") {
            Some(raw) => match parse_positive_i64(&raw) {
                Some(n) => Some(n),
                None => return Status::InvalidArgs,
            },
            None => None,
        }
    } else {
        None
    };

    // Each branch composes its own envelope and invokes the worker with
    // exactly that envelope; no stale buffer from a sibling branch is ever
    // passed (SPEC_FULL.md §4.7, Open Question 1).
    let envelope = match EnvelopeBuilder::open_typed(action)
        .field("id", id)
        .field_opt_omit("toRevision", to_revision)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunReleaseOrchestrator, &envelope))
}

fn multi(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(action) = args.first() else {
        return Status::InvalidArgs;
    };
    if action != "apply" {
        return Status::NotFound;
    }
    let args = &args[1..];

    let Some(clusters_raw) = flag_value(args, "--clusters") else {
        return Status::InvalidArgs;
    };
    let Some(path) = flag_value(args, "--path") else {
        return Status::InvalidArgs;
    };
    let Some(app_name) = flag_value(args, "--app-name") else {
        return Status::InvalidArgs;
    };
    let namespace = flag_value(args, "--namespace").unwrap_or_else(|| "default".to_string());
    let strategy = flag_value(args, "--strategy").unwrap_or_else(|| "direct".to_string());

    let cluster_names: Vec<&str> = clusters_raw.split(',').map(str::trim).filter(|n| !n.is_empty()).collect();
    if cluster_names.is_empty() {
        return Status::InvalidArgs;
    }

    let manifest = match fs::read_to_string(&path) {
        Ok(m) => m,
        Err(e) => {
            warn!(path, error = %e, "failed to read manifest file for multi apply");
            return Status::Io;
        }
    };

    let cluster_configs: serde_json::Map<String, serde_json::Value> = cluster_names
        .iter()
        .map(|name| (name.to_string(), serde_json::Value::String(format!("/etc/ph/kubeconfigs/{name}.yaml"))))
        .collect();
    let targets: Vec<serde_json::Value> = cluster_names
        .iter()
        .map(|name| serde_json::json!({ "name": name }))
        .collect();

    // `cluster_configs` and `targets` sit at the top level; everything else
    // nests inside an object-valued `action` field, not a string discriminant
    // (SPEC_FULL.md §4.7 "multi apply").
    let action = serde_json::json!({
        "type": "apply",
        "manifests": manifest,
        "app_name": app_name,
        "namespace": namespace,
        "strategy": { "type": strategy },
    });

    let envelope = serde_json::json!({
        "cluster_configs": serde_json::Value::Object(cluster_configs),
        "targets": targets,
        "action": action,
    })
    .to_string();
    if envelope.len() > MANIFEST_CAP_BYTES {
        return Status::BufferTooSmall;
    }

    finish(ctx.worker.invoke(WorkerName::RunMultiClusterOrchestrator, &envelope))
}

fn list_clusters(ctx: &mut AppContext, _args: &[String]) -> Status {
    let clusters_path = ctx.clusters_path();
    let clusters = ctx.clusters.list(&clusters_path);
    let active = ctx.active_cluster();

    if clusters.is_empty() {
        println!("No clusters defined in the configuration.");
        return Status::Success;
    }

    println!("Available clusters:");
    for entry in &clusters {
        if active.as_deref() == Some(entry.name.as_str()) {
            println!("  * {} (active)", entry.name);
        } else {
            println!("  - {}", entry.name);
        }
    }
    Status::Success
}

fn use_cluster(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(name) = args.first() else {
        return Status::InvalidArgs;
    };
    let clusters_path = ctx.clusters_path();
    let status = ctx.clusters.set_active(&clusters_path, name);
    if status.is_success() {
        println!("Default cluster set to '{name}'.");
    }
    status
}

fn info(ctx: &mut AppContext, args: &[String]) -> Status {
    let explicit = args.first().cloned();
    let Some(cluster) = resolve_cluster(ctx, explicit) else {
        return Status::NotFound;
    };

    // No discriminant: `run_k8s_info` takes a bare `{"cluster": ...}` payload
    // (SPEC_FULL.md §4.7 "info"), unlike every other leaf in this handler.
    let envelope = serde_json::json!({ "cluster": cluster }).to_string();
    if envelope.len() > crate::envelope::DEFAULT_CAP_BYTES {
        return Status::BufferTooSmall;
    }

    finish(ctx.worker.invoke(WorkerName::RunK8sInfo, &envelope))
}

fn cluster(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(action) = args.first() else {
        return Status::InvalidArgs;
    };
    if action != "policy" {
        return Status::NotFound;
    }
    let Some(cluster_name) = args.get(1) else {
        return Status::InvalidArgs;
    };
    let rest = &args[2..];
    let Some(policy_file_path) = flag_value(rest, "--policy-file") else {
        return Status::InvalidArgs;
    };

    // The core never checks the path is readable here; the worker is
    // responsible for opening it (SPEC_FULL.md §9, Open Question 3).
    let envelope = match EnvelopeBuilder::open("set_policy")
        .field("cluster_name", cluster_name.clone())
        .field("policy_file_path", policy_file_path)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunRbacManager, &envelope))
}

fn grant_revoke(ctx: &mut AppContext, args: &[String], action: &'static str) -> Status {
    let Some(role) = flag_value(args, "--role") else {
        return Status::InvalidArgs;
    };
    let Some(subject) = flag_value(args, "--subject") else {
        return Status::InvalidArgs;
    };
    let Some(cluster) = resolve_cluster(ctx, flag_value(args, "--cluster")) else {
        return Status::NotFound;
    };

    let envelope = match EnvelopeBuilder::open(action)
        .field("role", role)
        .field("subject", subject)
        .field("cluster", cluster)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunRbacManager, &envelope))
}

fn failover(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(app) = flag_value(args, "--app") else {
        return Status::InvalidArgs;
    };
    let Some(from_cluster) = flag_value(args, "--from") else {
        return Status::InvalidArgs;
    };
    let Some(to_cluster) = flag_value(args, "--to") else {
        return Status::InvalidArgs;
    };

    let envelope = match EnvelopeBuilder::open("failover")
        .field("app", app)
        .field("from_cluster", from_cluster)
        .field("to_cluster", to_cluster)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunMultiClusterOrchestrator, &envelope))
}
