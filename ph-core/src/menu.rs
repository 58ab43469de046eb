/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/menu.rs
* The interactive menu driver: composes the union of native-module and
* scripted-registry commands for a terminal session and forwards the
* selected entry back through the root dispatcher (SPEC_FULL.md §4.11).
* SPDX-License-Identifier: Apache-2.0 */

use std::io::{BufRead, Write};

use crate::context::AppContext;
use crate::dispatch;
use crate::status::Status;

pub const EXIT_LABEL: &str = "Exit";

/// One selectable line in the menu: a command name plus its description,
/// when the source registry supplies one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: String,
    pub description: Option<String>,
}

/// Composes the menu: every native-module command, then every scripted
/// command, sorted by name, with a synthetic "Exit" always last. Duplicate
/// names across the two registries are not de-duplicated, matching
/// SPEC_FULL.md §4.11.
pub fn build_menu(ctx: &AppContext) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = Vec::new();

    for module in ctx.native.all() {
        for command in &module.info.commands {
            entries.push(MenuEntry {
                name: command.clone(),
                description: Some(module.info.description.clone()),
            });
        }
    }

    for name in ctx.scripted.names() {
        let description = ctx.scripted.description(&name);
        entries.push(MenuEntry { name, description });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries.push(MenuEntry {
        name: EXIT_LABEL.to_string(),
        description: None,
    });
    entries
}

/// Renders the numbered menu to `out`.
pub fn render<W: Write>(entries: &[MenuEntry], out: &mut W) -> std::io::Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        match &entry.description {
            Some(d) if !d.is_empty() => writeln!(out, "{}) {} - {d}", i + 1, entry.name)?,
            _ => writeln!(out, "{}) {}", i + 1, entry.name)?,
        }
    }
    Ok(())
}

/// Reads one line from `input`, parses it as a strict base-10 1-based
/// index into `entries`, and returns the selected entry. Any parse
/// failure or out-of-range index is `InvalidArgs`.
pub fn read_selection<R: BufRead>(entries: &[MenuEntry], input: &mut R) -> Result<MenuEntry, Status> {
    let mut line = String::new();
    input.read_line(&mut line).map_err(|_| Status::Io)?;
    let choice: usize = line.trim().parse().map_err(|_| Status::InvalidArgs)?;
    if choice == 0 || choice > entries.len() {
        return Err(Status::InvalidArgs);
    }
    Ok(entries[choice - 1].clone())
}

/// Runs one full menu interaction: render, read a selection, and unless
/// it is "Exit", forward `{tool, name}` to the root dispatcher.
pub fn run_once<R: BufRead, W: Write>(ctx: &mut AppContext, tool: &str, input: &mut R, out: &mut W) -> Status {
    let entries = build_menu(ctx);
    if render(&entries, out).is_err() {
        return Status::Io;
    }
    let selected = match read_selection(&entries, input) {
        Ok(e) => e,
        Err(status) => return status,
    };
    if selected.name == EXIT_LABEL {
        return Status::Success;
    }
    dispatch::dispatch(ctx, &[tool.to_string(), selected.name])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PathConfig;
    use crate::registry::test_doubles::{FixedNativeModuleRegistry, FixedScriptedCommandRegistry};
    use crate::registry::{EmptyScriptedCommandRegistry, LoadedModule, ModuleInfo};
    use crate::trace::NullTraceContextSource;
    use crate::worker::test_doubles::{RecordingManifestApplier, StubWorkerInvoker};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn ctx_with_menu() -> AppContext {
        let native = FixedNativeModuleRegistry {
            modules: vec![LoadedModule {
                info: ModuleInfo {
                    name: "greeter".into(),
                    description: "says hello".into(),
                    commands: vec!["hello".into()],
                },
                exec: Arc::new(|_| Status::Success),
            }],
        };
        let mut commands = HashMap::new();
        commands.insert("aardvark".to_string(), "first alphabetically".to_string());
        let scripted = FixedScriptedCommandRegistry { commands };

        AppContext::new(
            PathConfig {
                conf_path: "/nonexistent/.ph.conf".into(),
                clusters_path: "/nonexistent/clusters.yaml".into(),
            },
            Box::new(StubWorkerInvoker::success()),
            Box::new(RecordingManifestApplier::success()),
            Box::new(NullTraceContextSource),
            Box::new(scripted),
            Box::new(native),
        )
    }

    #[test]
    fn exit_is_always_last_and_unsorted_entries_precede_it() {
        let ctx = ctx_with_menu();
        let entries = build_menu(&ctx);
        assert_eq!(entries.last().unwrap().name, EXIT_LABEL);
        let names: Vec<&str> = entries[..entries.len() - 1].iter().map(|e| e.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn selection_out_of_range_is_invalid_args() {
        let ctx = ctx_with_menu();
        let entries = build_menu(&ctx);
        let mut input = std::io::Cursor::new("99\n");
        assert_eq!(read_selection(&entries, &mut input), Err(Status::InvalidArgs));
    }

    #[test]
    fn selection_non_numeric_is_invalid_args() {
        let ctx = ctx_with_menu();
        let entries = build_menu(&ctx);
        let mut input = std::io::Cursor::new("not-a-number\n");
        assert_eq!(read_selection(&entries, &mut input), Err(Status::InvalidArgs));
    }

    #[test]
    fn selecting_exit_returns_success_without_dispatch() {
        let mut c = ctx_with_menu();
        let entries = build_menu(&c);
        let exit_index = entries.len();
        let mut input = std::io::Cursor::new(format!("{exit_index}\n"));
        let mut out = Vec::new();
        assert_eq!(run_once(&mut c, "ph", &mut input, &mut out), Status::Success);
    }

    #[test]
    fn selecting_a_native_command_dispatches_it() {
        let mut c = AppContext::new(
            PathConfig {
                conf_path: "/nonexistent/.ph.conf".into(),
                clusters_path: "/nonexistent/clusters.yaml".into(),
            },
            Box::new(StubWorkerInvoker::success()),
            Box::new(RecordingManifestApplier::success()),
            Box::new(NullTraceContextSource),
            Box::new(EmptyScriptedCommandRegistry),
            Box::new(FixedNativeModuleRegistry {
                modules: vec![LoadedModule {
                    info: ModuleInfo {
                        name: "greeter".into(),
                        description: "says hello".into(),
                        commands: vec!["hello".into()],
                    },
                    exec: Arc::new(|_| Status::Success),
                }],
            }),
        );
        let entries = build_menu(&c);
        // entries: ["Exit", "hello"] sorted alphabetically before Exit -> ["hello", "Exit"]
        let hello_index = entries.iter().position(|e| e.name == "hello").unwrap() + 1;
        let mut input = std::io::Cursor::new(format!("{hello_index}\n"));
        let mut out = Vec::new();
        assert_eq!(run_once(&mut c, "ph", &mut input, &mut out), Status::Success);
    }
}
