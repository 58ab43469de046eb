/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/registry.rs
* The two "out of process" command surfaces the root dispatcher falls
* through to after the known groups: an external scripting bridge and a
* set of natively loaded modules. Both are pure capability interfaces per
* SPEC_FULL.md §9 ("Polyglot scripting and native module bridges →
* interface"); their actual implementations are out of scope.
* SPDX-License-Identifier: Apache-2.0 */

use std::sync::Arc;

use crate::status::Status;

/// `has`/`exec`/`count`/`names`/`description` over an external scripting
/// bridge (SPEC_FULL.md §4.9). The dispatcher calls only these operations
/// and assumes nothing about script execution semantics beyond status-code
/// parity.
pub trait ScriptedCommandRegistry {
    fn has(&self, name: &str) -> bool;
    fn exec(&self, name: &str, argv: &[String]) -> Status;
    fn count(&self) -> usize;
    fn names(&self) -> Vec<String>;
    fn description(&self, name: &str) -> Option<String>;
}

/// Production default: registration of scripted commands is out of scope
/// (SPEC_FULL.md §4.9); this registry is permanently empty.
pub struct EmptyScriptedCommandRegistry;

impl ScriptedCommandRegistry for EmptyScriptedCommandRegistry {
    fn has(&self, _name: &str) -> bool {
        false
    }

    fn exec(&self, _name: &str, _argv: &[String]) -> Status {
        Status::NotFound
    }

    fn count(&self) -> usize {
        0
    }

    fn names(&self) -> Vec<String> {
        Vec::new()
    }

    fn description(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Static metadata for a natively loaded module (SPEC_FULL.md §4.10).
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
    pub commands: Vec<String>,
}

/// A resolved native module: its metadata plus a callable entry point.
/// Modules are represented as an `Arc<dyn Fn>` rather than a raw function
/// pointer, since registration in this rewrite is in-process Rust rather
/// than a C-ABI `exec_func` loaded from a shared object.
#[derive(Clone)]
pub struct LoadedModule {
    pub info: ModuleInfo,
    pub exec: Arc<dyn Fn(&[String]) -> Status + Send + Sync>,
}

impl LoadedModule {
    pub fn exec(&self, argv: &[String]) -> Status {
        (self.exec)(argv)
    }
}

/// `find_handler`/`all` over the set of natively loaded modules
/// (SPEC_FULL.md §4.10). Registration is out of scope: production ships
/// an empty registry.
pub trait NativeModuleRegistry {
    fn find_handler(&self, name: &str) -> Option<LoadedModule>;
    fn all(&self) -> Vec<LoadedModule>;
}

pub struct EmptyNativeModuleRegistry;

impl NativeModuleRegistry for EmptyNativeModuleRegistry {
    fn find_handler(&self, _name: &str) -> Option<LoadedModule> {
        None
    }

    fn all(&self) -> Vec<LoadedModule> {
        Vec::new()
    }
}


#[cfg(test)]
mod tests {
    use super::test_doubles::*;
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn names_called_twice_is_idempotent_and_unaliased() {
        let mut commands = HashMap::new();
        commands.insert("deploy-all".to_string(), "runs the full deploy".to_string());
        let registry = FixedScriptedCommandRegistry { commands };

        let mut a = registry.names();
        let b = registry.names();
        assert_eq!(a, b);
        a.push("mutated-locally".to_string());
        assert_ne!(a, registry.names());
    }

    #[test]
    fn empty_registries_never_resolve_anything() {
        let scripted = EmptyScriptedCommandRegistry;
        assert!(!scripted.has("anything"));
        assert_eq!(scripted.count(), 0);

        let native = EmptyNativeModuleRegistry;
        assert!(native.find_handler("anything").is_none());
        assert!(native.all().is_empty());
    }

    #[test]
    fn native_registry_resolves_by_command_name() {
        let module = LoadedModule {
            info: ModuleInfo {
                name: "greeter".to_string(),
                description: "says hello".to_string(),
                commands: vec!["hello".to_string()],
            },
            exec: Arc::new(|_argv| Status::Success),
        };
        let registry = FixedNativeModuleRegistry {
            modules: vec![module],
        };
        assert!(registry.find_handler("hello").is_some());
        assert!(registry.find_handler("goodbye").is_none());
    }
}
