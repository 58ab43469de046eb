/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/args.rs
* Shared flag-scanning helpers used by every group handler. Flag parsing
* is positional-insensitive within a subcommand; flags taking a value
* consume the immediately following token; unknown flags are uniformly
* ignored (SPEC_FULL.md §4.7, §6). Hand-rolled rather than built on a
* derive-based argument parser so the handlers keep direct control over
* this historical, slightly idiosyncratic contract.
* SPDX-License-Identifier: Apache-2.0 */

/// Returns the token immediately following the first occurrence of `flag`,
/// or `None` if `flag` does not appear (or appears as the last token).
pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// `true` iff `flag` appears anywhere in `args`.
pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Splits `args` at the first literal `--` token: everything before it,
/// and everything after (the `--` itself is consumed). If no `--` is
/// present, the whole slice is treated as the "before" half.
pub fn split_on_double_dash(args: &[String]) -> (&[String], &[String]) {
    match args.iter().position(|a| a == "--") {
        Some(i) => (&args[..i], &args[i + 1..]),
        None => (args, &[]),
    }
}

/// Strict positive integer parse: no leading/trailing garbage, no
/// surrounding whitespace tolerance beyond what `str::parse` itself
/// rejects. Mirrors the original's `strtol` + `errno` + "no trailing
/// characters" validation for `--pr`/`--to-revision`.
pub fn parse_positive_i64(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().filter(|n| *n > 0)
}

/// Strict non-negative integer parse, for `--ttl` / `--max-age-hours`.
pub fn parse_nonneg_i64(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().filter(|n| *n >= 0)
}
