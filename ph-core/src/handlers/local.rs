/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/handlers/local.rs
* Pure passthrough: the whole subcommand + flags forwards verbatim to
* `run_local_dev`. No envelope is built (SPEC_FULL.md §4.7 "local").
* SPDX-License-Identifier: Apache-2.0 */

use tracing::info;

use crate::context::AppContext;
use crate::status::Status;

pub fn handle(ctx: &mut AppContext, args: &[String]) -> Status {
    if args.is_empty() {
        return Status::InvalidArgs;
    }

    info!(subcommand = %args[0], "delegating local command to run_local_dev");
    let result = ctx.worker.invoke_local_dev(args);
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

    fn ctx() -> AppContext {
        AppContext::new(
            PathConfig {
                conf_path: "/nonexistent/.ph.conf".into(),
                clusters_path: "/nonexistent/clusters.yaml".into(),
            },
            Box::new(StubWorkerInvoker::success()),
            Box::new(RecordingManifestApplier::success()),
            Box::new(NullTraceContextSource),
            Box::new(EmptyScriptedCommandRegistry),
            Box::new(EmptyNativeModuleRegistry),
        )
    }

    #[test]
    fn forwards_argv_verbatim() {
        let mut c = ctx();
        let args = vec!["create-cluster".to_string(), "--name".to_string(), "kind".to_string()];
        assert_eq!(handle(&mut c, &args), Status::Success);
    }

    #[test]
    fn missing_subcommand_is_invalid_args() {
        let mut c = ctx();
        assert_eq!(handle(&mut c, &[]), Status::InvalidArgs);
    }
}
