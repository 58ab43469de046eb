/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/config.rs
* The flat key/value configuration store and the lazily-loaded cluster
* registry that sits on top of it.
* SPDX-License-Identifier: Apache-2.0 */

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::status::Status;

/// In-memory flat key→value store, loaded from a `KEY = VALUE` line-based
/// file. Every `get` returns a freshly owned `String`; nothing here is
/// shared by reference with the caller.
#[derive(Debug, Default)]
pub struct ConfigStore {
    entries: HashMap<String, String>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all prior state, then reads `path` line by line. A missing
    /// file is not an error: the store simply ends up empty.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Status {
        self.entries.clear();

        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file absent, starting empty");
                return Status::Success;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config file");
                return Status::Io;
            }
        };

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(eq) = line.find('=') else {
                warn!(line = raw_line, "config line missing '=', skipped");
                continue;
            };
            let key = line[..eq].trim();
            let value = line[eq + 1..].trim();
            if key.is_empty() {
                warn!(line = raw_line, "config line has empty key, skipped");
                continue;
            }
            self.entries.insert(key.to_string(), value.to_string());
        }

        Status::Success
    }

    /// Returns an owned copy of the value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// Inserts or overwrites `key`. Both strings are copied into the store.
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn cleanup(&mut self) {
        self.entries.clear();
    }

    /// `secrets.provider.<name>.address`, per SPEC_FULL.md §6.
    pub fn provider_address(&self, name: &str) -> Option<String> {
        self.get(&format!("secrets.provider.{name}.address"))
    }

    /// `secrets.provider.<name>.token`, per SPEC_FULL.md §6.
    pub fn provider_token(&self, name: &str) -> Option<String> {
        self.get(&format!("secrets.provider.{name}.token"))
    }
}

/// A single named cluster, as extracted from `config/clusters.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEntry {
    pub name: String,
}

/// Lazily-loaded list of named clusters plus the active-cluster selection.
///
/// The loader is deliberately minimal: it scans each line for the literal
/// marker `- name:` and does not otherwise understand YAML. Do not replace
/// this with a full YAML parser; the cluster file's only recognized shape
/// is this one line form (SPEC_FULL.md §6).
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: Vec<ClusterEntry>,
    active: Option<String>,
    loaded: bool,
    cached_fallback: Option<String>,
}

const CLUSTER_NAME_MARKER: &str = "- name:";

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_loaded<P: AsRef<Path>>(&mut self, path: P) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        let contents = match fs::read_to_string(path.as_ref()) {
            Ok(c) => c,
            Err(_) => {
                debug!(path = %path.as_ref().display(), "cluster file absent, no clusters");
                return;
            }
        };

        for raw_line in contents.lines() {
            let line = raw_line.trim_end_matches(['\r', '\n']);
            let Some(idx) = line.find(CLUSTER_NAME_MARKER) else {
                continue;
            };
            let rest = line[idx + CLUSTER_NAME_MARKER.len()..].trim();
            let name = rest.trim_matches('"');
            if name.is_empty() {
                continue;
            }
            self.clusters.push(ClusterEntry {
                name: name.to_string(),
            });
        }
    }

    /// Independently-owned list of the loaded clusters. Two successive
    /// calls return equal, unaliased vectors.
    pub fn list<P: AsRef<Path>>(&mut self, clusters_path: P) -> Vec<ClusterEntry> {
        self.ensure_loaded(clusters_path);
        self.clusters.clone()
    }

    /// Succeeds only if `name` is present among the loaded clusters.
    pub fn set_active<P: AsRef<Path>>(&mut self, clusters_path: P, name: &str) -> Status {
        self.ensure_loaded(clusters_path);
        if self.clusters.iter().any(|c| c.name == name) {
            self.active = Some(name.to_string());
            Status::Success
        } else {
            Status::NotFound
        }
    }

    /// The explicit active cluster if set, else the config key
    /// `kube.current_cluster`, cached on first resolution.
    pub fn get_active(&mut self, config: &ConfigStore) -> Option<String> {
        if let Some(active) = &self.active {
            return Some(active.clone());
        }
        if self.cached_fallback.is_none() {
            self.cached_fallback = config.get("kube.current_cluster");
        }
        self.cached_fallback.clone()
    }

    pub fn cleanup(&mut self) {
        self.clusters.clear();
        self.active = None;
        self.loaded = false;
        self.cached_fallback = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_parses_and_trims_and_skips_comments() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# a comment").unwrap();
        writeln!(f, "  kube.current_cluster = dev  ").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "no_equals_sign_here").unwrap();
        writeln!(f, " = missing_key").unwrap();
        writeln!(f, "secrets.provider.vault.address=https://vault").unwrap();

        let mut store = ConfigStore::new();
        assert_eq!(store.load(f.path()), Status::Success);
        assert_eq!(
            store.get("kube.current_cluster"),
            Some("dev".to_string())
        );
        assert_eq!(
            store.provider_address("vault"),
            Some("https://vault".to_string())
        );
    }

    #[test]
    fn missing_file_is_success_and_empty() {
        let mut store = ConfigStore::new();
        assert_eq!(store.load("/nonexistent/path/.ph.conf"), Status::Success);
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn load_clears_prior_state() {
        let mut store = ConfigStore::new();
        store.set("stale", "value");
        assert_eq!(store.load("/nonexistent/path/.ph.conf"), Status::Success);
        assert_eq!(store.get("stale"), None);
    }

    #[test]
    fn set_then_get_round_trips_and_is_owned() {
        let mut store = ConfigStore::new();
        store.set("k", "v");
        let mut got = store.get("k").unwrap();
        got.push_str("-mutated");
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn cluster_list_handles_quotes_whitespace_and_crlf() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "- name: \"dev\"\r\n  - name:   staging  \r\n- name: prod").unwrap();

        let mut registry = ClusterRegistry::new();
        let a = registry.list(f.path());
        let b = registry.list(f.path());
        assert_eq!(a, b);
        assert_eq!(
            a,
            vec![
                ClusterEntry { name: "dev".into() },
                ClusterEntry {
                    name: "staging".into()
                },
                ClusterEntry {
                    name: "prod".into()
                },
            ]
        );
    }

    #[test]
    fn set_active_requires_known_cluster() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "- name: dev").unwrap();
        let mut registry = ClusterRegistry::new();
        assert_eq!(registry.set_active(f.path(), "staging"), Status::NotFound);
        assert_eq!(registry.set_active(f.path(), "dev"), Status::Success);
    }

    #[test]
    fn get_active_falls_back_to_config_and_switches_cleanly() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "- name: dev").unwrap();
        writeln!(f, "- name: staging").unwrap();

        let mut config = ConfigStore::new();
        config.set("kube.current_cluster", "dev");
        let mut registry = ClusterRegistry::new();
        assert_eq!(registry.get_active(&config), Some("dev".to_string()));

        registry.set_active(f.path(), "dev");
        registry.set_active(f.path(), "staging");
        assert_eq!(registry.get_active(&config), Some("staging".to_string()));
    }

    #[test]
    fn missing_cluster_file_loads_empty() {
        let mut registry = ClusterRegistry::new();
        assert_eq!(registry.list("/nonexistent/config/clusters.yaml"), vec![]);
    }
}
