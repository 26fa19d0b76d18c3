//! Key-value list with message ("KVLM") — the header format shared by
//! commit and tag payloads.
//!
//! An ordered mapping from key to either a single value or a sequence of
//! values (a key upgrades to a sequence the second time it appears, e.g.
//! `parent` on a merge commit), plus a message held under the empty-string
//! key. Key order is insertion order. Values may contain embedded newlines,
//! encoded on the wire by a single leading space on each continuation line.
//!
//! Parsing and serializing are both iterative: the reference implementation
//! this is ported from recurses one line at a time, which risks stack growth
//! on an adversarially large header block.

use crate::error::ObjectError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Single(String),
    Multi(Vec<String>),
}

impl Value {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Value::Single(v) => std::slice::from_ref(v),
            Value::Multi(vs) => vs,
        }
    }

    fn push(&mut self, next: String) {
        match self {
            Value::Single(v) => {
                let first = std::mem::take(v);
                *self = Value::Multi(vec![first, next]);
            }
            Value::Multi(vs) => vs.push(next),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvlm {
    order: Vec<String>,
    values: HashMap<String, Value>,
    message: String,
}

impl Kvlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `key`, upgrading to a multi-value sequence if the
    /// key has already been seen (matching §4.2's repeated-key semantics).
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.values.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.order.push(key.clone());
                self.values.insert(key, Value::Single(value));
            }
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values
            .get(key)
            .map(Value::as_slice)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// Parse a KVLM header block followed by a blank line and a message.
    /// Iterative: walks the buffer line by line rather than recursing.
    pub fn parse(data: &str) -> anyhow::Result<Self> {
        let mut kvlm = Self::new();
        let bytes = data.as_bytes();
        let mut pos = 0usize;

        loop {
            if pos >= bytes.len() {
                break;
            }

            // A blank line (LF at the very start of this line) ends the
            // header block; everything after it is the message.
            if bytes[pos] == b'\n' {
                let message_start = pos + 1;
                kvlm.message = data[message_start..].to_string();
                return Ok(kvlm);
            }

            let space = memchr(bytes, b' ', pos);
            let newline = memchr(bytes, b'\n', pos);

            let key_end = match (space, newline) {
                (Some(sp), Some(nl)) if sp < nl => sp,
                (Some(sp), None) => sp,
                _ => {
                    return Err(ObjectError::Malformed(
                        "expected blank line before message".into(),
                    )
                    .into());
                }
            };

            let key = data[pos..key_end].to_string();
            if key.is_empty() {
                return Err(ObjectError::Malformed("empty key in header block".into()).into());
            }

            // Scan forward for the LF that ends this value: a LF followed
            // by a space is a continuation, not a terminator.
            let mut value_end = key_end + 1;
            loop {
                let nl = memchr(bytes, b'\n', value_end)
                    .ok_or_else(|| ObjectError::Malformed("unterminated header value".into()))?;
                if nl + 1 < bytes.len() && bytes[nl + 1] == b' ' {
                    value_end = nl + 1;
                    continue;
                }
                value_end = nl;
                break;
            }

            let raw_value = &data[key_end + 1..value_end];
            let value = raw_value.replace("\n ", "\n");
            kvlm.insert(key, value);

            pos = value_end + 1;
        }

        Ok(kvlm)
    }

    /// Serialize header lines (keys in insertion order) followed by a blank
    /// line and the message. Round-trips exactly with `parse`.
    pub fn serialize(&self) -> String {
        let mut out = String::new();

        for key in &self.order {
            let values = self.get_all(key);
            for value in values {
                let continued = value.replace('\n', "\n ");
                out.push_str(key);
                out.push(' ');
                out.push_str(&continued);
                out.push('\n');
            }
        }

        out.push('\n');
        out.push_str(&self.message);
        out
    }
}

fn memchr(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack[from..].iter().position(|&b| b == needle).map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        "tree abc\nparent def\nparent ghi\nauthor A <a@x> 0 +0000\ncommitter A <a@x> 0 +0000\n\nhello\nworld\n"
    }

    #[test]
    fn parses_multi_value_keys() {
        let kvlm = Kvlm::parse(sample()).unwrap();
        assert_eq!(kvlm.get_all("parent"), &["def".to_string(), "ghi".to_string()]);
        assert_eq!(kvlm.get("tree"), Some("abc"));
        assert_eq!(kvlm.message(), "hello\nworld\n");
    }

    #[test]
    fn round_trips_exactly() {
        let kvlm = Kvlm::parse(sample()).unwrap();
        assert_eq!(kvlm.serialize(), sample());
    }

    #[test]
    fn round_trips_embedded_newlines_in_values() {
        let raw = "gpgsig -----BEGIN-----\n some sig\n more sig\n -----END-----\n\nmessage body\n";
        let kvlm = Kvlm::parse(raw).unwrap();
        assert_eq!(kvlm.get("gpgsig"), Some("-----BEGIN-----\nsome sig\nmore sig\n-----END-----"));
        assert_eq!(kvlm.serialize(), raw);
    }

    #[test]
    fn rejects_missing_blank_line() {
        assert!(Kvlm::parse("tree abc\nauthor x").is_err());
    }

    #[test]
    fn preserves_key_insertion_order() {
        let mut kvlm = Kvlm::new();
        kvlm.insert("committer", "c");
        kvlm.insert("tree", "t");
        kvlm.insert("author", "a");
        kvlm.set_message("msg\n");
        let serialized = kvlm.serialize();
        let committer_pos = serialized.find("committer").unwrap();
        let tree_pos = serialized.find("tree").unwrap();
        let author_pos = serialized.find("author").unwrap();
        assert!(committer_pos < tree_pos && tree_pos < author_pos);
    }
}
