/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/worker.rs
* The worker invocation capability: the seam between the core and the
* backend worker modules (sync planner, drift engine, rollout controller,
* preview reconciler, RBAC mutator, policy engine, runner autoscaler,
* health generator) and the subprocess-based manifest applier. Both are
* modeled as traits per SPEC_FULL.md §9 ("FFI to backend workers →
* interface", "Subprocess interaction") — the real algorithms behind them
* are out of scope (SPEC_FULL.md §1).
* SPDX-License-Identifier: Apache-2.0 */

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{error, warn};

use crate::status::Status;

/// The closed set of worker identities the core may invoke, per
/// SPEC_FULL.md §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerName {
    RunSync,
    RunDriftDetector,
    RunReleaseOrchestrator,
    RunMultiClusterOrchestrator,
    RunRbacManager,
    RunK8sInfo,
    RunPolicyEngine,
    RunRunnerManager,
    RunHealthManager,
    RunSecretSync,
    RunSecretRotation,
    RunPreviewManager,
}

impl WorkerName {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerName::RunSync => "run_sync",
            WorkerName::RunDriftDetector => "run_drift_detector",
            WorkerName::RunReleaseOrchestrator => "run_release_orchestrator",
            WorkerName::RunMultiClusterOrchestrator => "run_multi_cluster_orchestrator",
            WorkerName::RunRbacManager => "run_rbac_manager",
            WorkerName::RunK8sInfo => "run_k8s_info",
            WorkerName::RunPolicyEngine => "run_policy_engine",
            WorkerName::RunRunnerManager => "run_runner_manager",
            WorkerName::RunHealthManager => "run_health_manager",
            WorkerName::RunSecretSync => "run_secret_sync",
            WorkerName::RunSecretRotation => "run_secret_rotation",
            WorkerName::RunPreviewManager => "run_preview_manager",
        }
    }
}

/// `(exit_code, error_buffer)`. `exit_code == 0` is the sole success
/// indicator; a non-empty `error` on failure is surfaced to the UI
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerResult {
    pub exit_code: i32,
    pub error: Option<String>,
}

impl WorkerResult {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Maps per SPEC_FULL.md §4.1: any non-zero exit is `EXEC_FAILED`.
    pub fn to_status(&self) -> Status {
        if self.is_success() {
            Status::Success
        } else {
            Status::ExecFailed
        }
    }
}

/// The in-process invoker: calls a named worker with a composed envelope
/// and reports its exit code plus optional error text.
///
/// Also carries `run_local_dev`, whose signature differs from every other
/// worker: it is forwarded the raw argv rather than a JSON envelope
/// (SPEC_FULL.md §4.7 "local").
pub trait WorkerInvoker {
    fn invoke(&self, worker: WorkerName, envelope: &str) -> WorkerResult;

    fn invoke_local_dev(&self, argv: &[String]) -> WorkerResult;
}

/// Production in-process invoker. Real worker algorithms are out of scope
/// (SPEC_FULL.md §1); this implementation is "not wired" — it logs the
/// call it would have made and reports failure, so a `ph` binary built
/// against this core fails loudly rather than silently pretending to
/// apply manifests or roll out releases.
pub struct UnwiredWorkerInvoker;

impl WorkerInvoker for UnwiredWorkerInvoker {
    fn invoke(&self, worker: WorkerName, envelope: &str) -> WorkerResult {
        warn!(
            worker = worker.as_str(),
            envelope, "no backend wired for worker invocation"
        );
        WorkerResult {
            exit_code: -1,
            error: Some(format!("{} is not wired in this build", worker.as_str())),
        }
    }

    fn invoke_local_dev(&self, argv: &[String]) -> WorkerResult {
        warn!(?argv, "no backend wired for run_local_dev");
        WorkerResult {
            exit_code: -1,
            error: Some("run_local_dev is not wired in this build".to_string()),
        }
    }
}

/// Spawns an external tool on `$PATH`, streams bytes to its stdin, and
/// inspects its exit status. `SUCCESS` iff the child exits zero.
pub trait ManifestApplier {
    fn apply(&self, manifest: &[u8]) -> Status;
}

/// Production applier: `kubectl apply -f -` (SPEC_FULL.md §6).
pub struct KubectlApplier {
    pub tool: String,
}

impl Default for KubectlApplier {
    fn default() -> Self {
        Self {
            tool: "kubectl".to_string(),
        }
    }
}

impl ManifestApplier for KubectlApplier {
    fn apply(&self, manifest: &[u8]) -> Status {
        let mut child = match Command::new(&self.tool)
            .arg("apply")
            .arg("-f")
            .arg("-")
            .stdin(Stdio::piped())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => {
                error!(tool = %self.tool, error = %e, "failed to spawn manifest applier");
                return Status::ExecFailed;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(manifest) {
                error!(error = %e, "failed to write manifest to applier stdin");
                return Status::Io;
            }
        }

        match child.wait() {
            Ok(status) if status.success() => Status::Success,
            Ok(status) => {
                warn!(?status, "manifest applier exited non-zero");
                Status::ExecFailed
            }
            Err(e) => {
                error!(error = %e, "failed to wait on manifest applier");
                Status::ExecFailed
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_doubles::*;
    use super::*;

    #[test]
    fn non_zero_exit_maps_to_exec_failed() {
        let result = WorkerResult {
            exit_code: 1,
            error: None,
        };
        assert_eq!(result.to_status(), Status::ExecFailed);
        assert_eq!(WorkerResult::success().to_status(), Status::Success);
    }

    #[test]
    fn stub_invoker_records_calls() {
        let stub = StubWorkerInvoker::success();
        stub.invoke(WorkerName::RunSync, "{\"action\":\"sync\"}");
        assert_eq!(stub.calls.borrow().len(), 1);
        assert_eq!(stub.calls.borrow()[0].0, WorkerName::RunSync);
    }

    #[test]
    fn recording_applier_captures_bytes() {
        let applier = RecordingManifestApplier::success();
        assert_eq!(applier.apply(b"kind: Pod"), Status::Success);
        assert_eq!(applier.applied.borrow()[0], b"kind: Pod");
    }
}
