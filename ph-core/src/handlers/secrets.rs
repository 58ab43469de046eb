/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/secrets.rs
* `secrets sync` and `secrets rotate` (SPEC_FULL.md §4.7 "secrets").
* SPDX-License-Identifier: Apache-2.0 */

use serde_json::json;

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
        "sync" => sync(ctx, &args[1..]),
        "rotate" => rotate(ctx, &args[1..]),
        _ => Status::NotFound,
    }
}

fn provider_credentials(ctx: &AppContext, provider: &str) -> Result<(String, String), Status> {
    let address = ctx.config.provider_address(provider).ok_or(Status::ConfigRead)?;
    let token = ctx.config.provider_token(provider).ok_or(Status::ConfigRead)?;
    Ok((address, token))
}

fn sync(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(provider) = flag_value(args, "--provider") else {
        return Status::InvalidArgs;
    };
    let Some(k8s_secret) = flag_value(args, "--k8s-secret") else {
        return Status::InvalidArgs;
    };
    let Some((namespace, secret_name)) = k8s_secret.split_once('/') else {
        return Status::InvalidArgs;
    };
    if namespace.is_empty() || secret_name.is_empty() {
        return Status::InvalidArgs;
    }

    let mut secrets = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--path" {
            let Some(raw) = args.get(i + 1) else {
                return Status::InvalidArgs;
            };
            let Some((key, value_from)) = raw.split_once('=') else {
                return Status::InvalidArgs;
            };
            secrets.push(json!({ "name": key, "value_from": value_from }));
            i += 2;
        } else {
            i += 1;
        }
    }
    if secrets.is_empty() {
        return Status::InvalidArgs;
    }

    let (address, token) = match provider_credentials(ctx, &provider) {
        Ok(creds) => creds,
        Err(status) => return status,
    };

    let envelope = match EnvelopeBuilder::open("sync")
        .field(
            "provider",
            json!({ "provider": provider, "address": address, "token": token }),
        )
        .field("namespace", namespace)
        .field("secret_name", secret_name)
        .field("secrets", secrets)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunSecretSync, &envelope))
}

fn rotate(ctx: &mut AppContext, args: &[String]) -> Status {
    let Some(provider) = flag_value(args, "--provider") else {
        return Status::InvalidArgs;
    };
    let Some(path) = flag_value(args, "--secret-path") else {
        return Status::InvalidArgs;
    };
    let force = has_flag(args, "--force");

    let (address, token) = match provider_credentials(ctx, &provider) {
        Ok(creds) => creds,
        Err(status) => return status,
    };

    let envelope = match EnvelopeBuilder::open("rotate")
        .field(
            "provider",
            json!({ "provider": provider, "address": address, "token": token }),
        )
        .field("path", path)
        .field("force", force)
        .close()
    {
        Ok(e) => e,
        Err(status) => return status,
    };

    finish(ctx.worker.invoke(WorkerName::RunSecretRotation, &envelope))
}

fn finish(result: crate::worker::WorkerResult) -> Status {
    if !result.is_success() {
        if let Some(err) = &result.error {
            eprintln!("error: {err}");
        }
        return Status::ExecFailed;
    }
    Status::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PathConfig;
    use crate::registry::{EmptyNativeModuleRegistry, EmptyScriptedCommandRegistry};
    use crate::trace::NullTraceContextSource;
    use crate::worker::test_doubles::{RecordingManifestApplier, StubWorkerInvoker};

    fn v(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ctx_with_provider() -> AppContext {
        let mut c = AppContext::new(
            PathConfig {
                conf_path: "/nonexistent/.ph.conf".into(),
                clusters_path: "/nonexistent/clusters.yaml".into(),
            },
            Box::new(StubWorkerInvoker::success()),
            Box::new(RecordingManifestApplier::success()),
            Box::new(NullTraceContextSource),
            Box::new(EmptyScriptedCommandRegistry),
            Box::new(EmptyNativeModuleRegistry),
        );
        c.config.set("secrets.provider.vault.address", "https://vault.internal");
        c.config.set("secrets.provider.vault.token", "s.abc123");
        c
    }

    #[test]
    fn sync_rejects_k8s_secret_without_slash() {
        let mut c = ctx_with_provider();
        let args = v(&[
            "sync", "--provider", "vault", "--k8s-secret", "no-slash", "--path", "KEY=path",
        ]);
        assert_eq!(handle(&mut c, &args), Status::InvalidArgs);
    }

    #[test]
    fn sync_rejects_path_without_equals() {
        let mut c = ctx_with_provider();
        let args = v(&[
            "sync",
            "--provider",
            "vault",
            "--k8s-secret",
            "ns/name",
            "--path",
            "no-equals",
        ]);
        assert_eq!(handle(&mut c, &args), Status::InvalidArgs);
    }

    #[test]
    fn sync_missing_provider_credentials_is_config_read() {
        let mut c = AppContext::new(
            PathConfig {
                conf_path: "/nonexistent/.ph.conf".into(),
                clusters_path: "/nonexistent/clusters.yaml".into(),
            },
            Box::new(StubWorkerInvoker::success()),
            Box::new(RecordingManifestApplier::success()),
            Box::new(NullTraceContextSource),
            Box::new(EmptyScriptedCommandRegistry),
            Box::new(EmptyNativeModuleRegistry),
        );
        let args = v(&[
            "sync",
            "--provider",
            "vault",
            "--k8s-secret",
            "ns/name",
            "--path",
            "KEY=path",
        ]);
        assert_eq!(handle(&mut c, &args), Status::ConfigRead);
    }

    #[test]
    fn sync_happy_path_succeeds() {
        let mut c = ctx_with_provider();
        let args = v(&[
            "sync",
            "--provider",
            "vault",
            "--k8s-secret",
            "ns/name",
            "--path",
            "API_KEY=secret/data/api",
        ]);
        assert_eq!(handle(&mut c, &args), Status::Success);
    }

    #[test]
    fn rotate_requires_provider_and_path() {
        let mut c = ctx_with_provider();
        assert_eq!(handle(&mut c, &v(&["rotate", "--provider", "vault"])), Status::InvalidArgs);
    }
}
