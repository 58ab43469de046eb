/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/context.rs
* The process-scoped state and capability set every dispatch call runs
* against. A single explicit value rather than module-level globals
* (SPEC_FULL.md §5 "Shared resources", §9 "Global singletons → scoped
* module"), so tests can construct independent instances.
* SPDX-License-Identifier: Apache-2.0 */

use std::path::PathBuf;

use crate::config::{ClusterRegistry, ConfigStore};
use crate::registry::{NativeModuleRegistry, ScriptedCommandRegistry};
use crate::trace::TraceContextSource;
use crate::worker::{ManifestApplier, WorkerInvoker};

/// `.ph.conf` and `config/clusters.yaml` locations, overridable via
/// `PH_CONF_PATH` / `PH_CLUSTERS_PATH` (SPEC_FULL.md §AMBIENT.3).
#[derive(Debug, Clone)]
pub struct PathConfig {
    pub conf_path: PathBuf,
    pub clusters_path: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            conf_path: std::env::var("PH_CONF_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".ph.conf")),
            clusters_path: std::env::var("PH_CLUSTERS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config/clusters.yaml")),
        }
    }
}

/// Everything a dispatch call needs: mutable process state plus the
/// capability seams that stand in for external collaborators.
pub struct AppContext {
    pub paths: PathConfig,
    pub config: ConfigStore,
    pub clusters: ClusterRegistry,
    pub worker: Box<dyn WorkerInvoker>,
    pub applier: Box<dyn ManifestApplier>,
    pub trace: Box<dyn TraceContextSource>,
    pub scripted: Box<dyn ScriptedCommandRegistry>,
    pub native: Box<dyn NativeModuleRegistry>,
}

impl AppContext {
    pub fn new(
        paths: PathConfig,
        worker: Box<dyn WorkerInvoker>,
        applier: Box<dyn ManifestApplier>,
        trace: Box<dyn TraceContextSource>,
        scripted: Box<dyn ScriptedCommandRegistry>,
        native: Box<dyn NativeModuleRegistry>,
    ) -> Self {
        let mut config = ConfigStore::new();
        config.load(&paths.conf_path);
        Self {
            paths,
            config,
            clusters: ClusterRegistry::new(),
            worker,
            applier,
            trace,
            scripted,
            native,
        }
    }

    /// The active cluster name, resolved via the cluster registry's
    /// explicit-or-config-fallback rule (SPEC_FULL.md §4.3).
    pub fn active_cluster(&mut self) -> Option<String> {
        self.clusters.get_active(&self.config)
    }

    pub fn clusters_path(&self) -> PathBuf {
        self.paths.clusters_path.clone()
    }
}
