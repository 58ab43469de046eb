/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/trace.rs
* The trace-context capability consulted by preview-create. The original
* extracted `traceparent` with an ad-hoc search over a raw string and
* mutated the subsystem's buffer in place; this rewrite parses the
* returned JSON object properly and copies the value out, per
* SPEC_FULL.md §9 "Trace context parsing".
* SPDX-License-Identifier: Apache-2.0 */

/// An independently-owned trace context extracted for a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub traceparent: String,
}

/// Opens a trace span for a command and yields its propagation token.
/// Returns `None` if trace creation failed or the result carried no
/// `traceparent` field; callers proceed without annotations in that case.
pub trait TraceContextSource {
    fn start(&self, command_name: &str) -> Option<TraceContext>;
}

/// Production default: tracing backend wiring is out of scope
/// (SPEC_FULL.md §AMBIENT.5), so no span is ever opened.
pub struct NullTraceContextSource;

impl TraceContextSource for NullTraceContextSource {
    fn start(&self, _command_name: &str) -> Option<TraceContext> {
        None
    }
}

/// Parses a raw JSON string returned by a trace-emitting worker into a
/// `TraceContext`, extracting `traceparent` through `serde_json` rather
/// than locating the key by hand.
pub fn parse_trace_context(raw_json: &str) -> Option<TraceContext> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let traceparent = value.get("traceparent")?.as_str()?.to_string();
    Some(TraceContext { traceparent })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_traceparent_from_json_object() {
        let raw = r#"{"traceparent":"00-abcd-1234-01","other":1}"#;
        let ctx = parse_trace_context(raw).unwrap();
        assert_eq!(ctx.traceparent, "00-abcd-1234-01");
    }

    #[test]
    fn missing_key_or_invalid_json_yields_none() {
        assert!(parse_trace_context(r#"{"nope":1}"#).is_none());
        assert!(parse_trace_context("not json").is_none());
    }

    #[test]
    fn null_source_never_returns_a_context() {
        assert!(NullTraceContextSource.start("preview create").is_none());
    }
}
