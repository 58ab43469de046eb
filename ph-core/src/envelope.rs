/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/envelope.rs
* A capped JSON envelope builder: the wire format every worker invocation
* is composed into before the invoker is called.
* SPDX-License-Identifier: Apache-2.0 */

use serde_json::{Map, Value};

use crate::status::Status;

/// Default envelope size cap, matching the ~1-8 KiB most commands compose
/// (SPEC_FULL.md §3). Commands that embed manifest content raise this.
pub const DEFAULT_CAP_BYTES: usize = 8 * 1024;

/// Manifest-embedding envelopes (`kube multi apply`) need headroom for the
/// full file contents.
pub const MANIFEST_CAP_BYTES: usize = 32 * 1024;

/// Builds a single JSON object under a byte cap. Composition never invokes
/// a worker on its own; `close()` either returns the serialized object or
/// `Status::BufferTooSmall` without ever exceeding `cap`.
pub struct EnvelopeBuilder {
    discriminant_key: &'static str,
    fields: Map<String, Value>,
    cap: usize,
}

impl EnvelopeBuilder {
    /// Opens an envelope with discriminant field `"action"` (most workers)
    /// set to `action`.
    pub fn open(action: &str) -> Self {
        Self::open_with(action, "action", DEFAULT_CAP_BYTES)
    }

    /// Opens an envelope whose discriminant field is `"type"` (the rollout
    /// surface, per SPEC_FULL.md §4.7).
    pub fn open_typed(kind: &str) -> Self {
        Self::open_with(kind, "type", DEFAULT_CAP_BYTES)
    }

    pub fn open_with(value: &str, discriminant_key: &'static str, cap: usize) -> Self {
        let mut fields = Map::new();
        fields.insert(discriminant_key.to_string(), Value::String(value.to_string()));
        Self {
            discriminant_key,
            fields,
            cap,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Sets a field to any JSON-representable value. `None` serializes as
    /// explicit `null`, matching the "optional fields serialize as null
    /// when a caller demands the field appear" rule (SPEC_FULL.md §4.4).
    pub fn field<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn field_opt<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self.field(name, Value::Null),
        }
    }

    /// Omits the field entirely rather than emitting `null` when absent.
    pub fn field_opt_omit<V: Into<Value>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.fields.insert(name.to_string(), v.into());
        }
        self
    }

    /// Serializes the composed object, enforcing the byte cap. The
    /// discriminant field is always present since `open`/`open_typed`
    /// set it.
    pub fn close(self) -> Result<String, Status> {
        debug_assert!(self.fields.contains_key(self.discriminant_key));
        let serialized = Value::Object(self.fields).to_string();
        if serialized.len() > self.cap {
            return Err(Status::BufferTooSmall);
        }
        Ok(serialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_strings_with_control_characters() {
        let tricky = "line1\nline2\t\"quoted\"\\slash\r";
        let json = EnvelopeBuilder::open("sync")
            .field("path", tricky)
            .close()
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["path"], Value::String(tricky.to_string()));
        assert_eq!(parsed["action"], Value::String("sync".to_string()));
    }

    #[test]
    fn exceeding_cap_returns_buffer_too_small() {
        let huge = "x".repeat(100);
        let result = EnvelopeBuilder::open("sync").with_cap(16).field("path", huge).close();
        assert_eq!(result, Err(Status::BufferTooSmall));
    }

    #[test]
    fn optional_absent_field_serializes_as_null() {
        let json = EnvelopeBuilder::open("sync")
            .field_opt::<String>("context", None)
            .close()
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["context"], Value::Null);
    }

    #[test]
    fn typed_discriminant_uses_type_key() {
        let json = EnvelopeBuilder::open_typed("promote")
            .field("id", "rel-42")
            .close()
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], Value::String("promote".to_string()));
        assert!(parsed.get("action").is_none());
    }
}
