//! Metadata block codec.
//!
//! A block is a collapsible markdown fragment carrying a flat YAML mapping:
//!
//! ```text
//! <!-- erk:metadata-block:<kind> -->
//! <details>
//! <summary><code><kind></code></summary>
//!
//! ```yaml
//! <payload>
//! ```
//! </details>
//! <!-- /erk:metadata-block -->
//! ```
//!
//! Only the two HTML comment markers and the fenced payload carry meaning. The
//! `<details>` wrapper is there so the tracker UI folds the block away.

use crate::error::{ErkError, Result};
use crate::registry::{self, NAMESPACE, PAYLOAD_FORMAT};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Decoded payload of a block. Keys are kept sorted.
pub type BlockData = BTreeMap<String, Value>;

// ---------------------------------------------------------------------------
// MetadataBlock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataBlock {
    pub kind: String,
    pub data: BlockData,
}

impl MetadataBlock {
    pub fn new(kind: impl Into<String>, data: BlockData) -> Result<Self> {
        let kind = kind.into();
        registry::validate_kind(&kind)?;
        Ok(Self { kind, data })
    }

    /// String value of `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn render(&self) -> Result<String> {
        encode(&self.kind, &self.data)
    }
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Opening marker up to (not including) the kind.
pub(crate) fn opening_prefix() -> String {
    format!("<!-- {NAMESPACE}:metadata-block:")
}

pub fn opening_marker(kind: &str) -> String {
    format!("{}{kind} -->", opening_prefix())
}

pub fn closing_marker() -> String {
    format!("<!-- /{NAMESPACE}:metadata-block -->")
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Render `data` as a delimited block of the given kind.
pub fn encode(kind: &str, data: &BlockData) -> Result<String> {
    registry::validate_kind(kind)?;
    let mut payload = serde_yaml::to_string(data)?;
    if !payload.ends_with('\n') {
        payload.push('\n');
    }
    Ok(format!(
        "{open}\n<details>\n<summary><code>{kind}</code></summary>\n\n```{PAYLOAD_FORMAT}\n{payload}```\n</details>\n{close}",
        open = opening_marker(kind),
        close = closing_marker(),
    ))
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode a fragment that is already known to be a single metadata block.
///
/// CRLF line endings are accepted. Fails with [`ErkError::MalformedBlock`]
/// describing what was wrong.
pub fn decode(text: &str) -> Result<MetadataBlock> {
    let text = text.replace("\r\n", "\n");
    let text = text.trim();
    let prefix = opening_prefix();
    let rest = text
        .strip_prefix(prefix.as_str())
        .ok_or_else(|| malformed("missing opening marker"))?;
    let (kind, rest) = rest
        .split_once(" -->")
        .ok_or_else(|| malformed("unterminated opening marker"))?;
    registry::validate_kind(kind)?;

    let inner = rest
        .strip_suffix(closing_marker().as_str())
        .ok_or_else(|| malformed(format!("{kind}: missing closing marker")))?;

    let fence = format!("{}\n", payload_fence());
    let start = inner
        .find(&fence)
        .ok_or_else(|| malformed(format!("{kind}: missing ```{PAYLOAD_FORMAT} fence")))?;
    let after_fence = &inner[start + fence.len()..];
    let end = after_fence
        .rfind("```")
        .filter(|&i| i == 0 || after_fence[..i].ends_with('\n'))
        .ok_or_else(|| malformed(format!("{kind}: unterminated payload fence")))?;

    let data = parse_payload(&after_fence[..end])
        .map_err(|e| malformed(format!("{kind}: {e}")))?;
    Ok(MetadataBlock {
        kind: kind.to_string(),
        data,
    })
}

/// Best-effort decode: `None` for anything that is not a well-formed block.
pub fn try_decode(text: &str) -> Option<MetadataBlock> {
    decode(text).ok()
}

fn parse_payload(payload: &str) -> std::result::Result<BlockData, String> {
    let value: Value = serde_yaml::from_str(payload).map_err(|e| e.to_string())?;
    match value {
        Value::Null => Ok(BlockData::new()),
        Value::Mapping(map) => map
            .into_iter()
            .map(|(k, v)| match k {
                Value::String(k) => Ok((k, v)),
                other => Err(format!("non-string key {other:?}")),
            })
            .collect(),
        _ => Err("payload is not a mapping".to_string()),
    }
}

/// Opening fence of the payload, without its line ending.
pub(crate) fn payload_fence() -> String {
    format!("```{PAYLOAD_FORMAT}")
}

fn malformed(msg: impl Into<String>) -> ErkError {
    ErkError::MalformedBlock(msg.into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlockData {
        let mut d = BlockData::new();
        d.insert("queued_at".into(), "2024-01-01T00:00:00Z".into());
        d.insert("submitted_by".into(), "alice".into());
        d.insert("attempt".into(), 3.into());
        d.insert("dry_run".into(), false.into());
        d
    }

    #[test]
    fn encode_produces_exact_envelope() {
        let mut d = BlockData::new();
        d.insert("submitted_by".into(), "alice".into());
        let text = encode("submission-queued", &d).unwrap();
        assert_eq!(
            text,
            "<!-- erk:metadata-block:submission-queued -->\n\
             <details>\n\
             <summary><code>submission-queued</code></summary>\n\
             \n\
             ```yaml\n\
             submitted_by: alice\n\
             ```\n\
             </details>\n\
             <!-- /erk:metadata-block -->"
        );
    }

    #[test]
    fn round_trip_preserves_kind_and_data() {
        let text = encode("submission-queued", &sample()).unwrap();
        let block = decode(&text).unwrap();
        assert_eq!(block.kind, "submission-queued");
        assert_eq!(block.data, sample());
    }

    #[test]
    fn round_trip_multiline_string_with_fences() {
        let mut d = BlockData::new();
        d.insert(
            "content".into(),
            "# Plan\n\n```rust\nfn main() {}\n```\n\nDone.".into(),
        );
        let block = decode(&encode("plan-body", &d).unwrap()).unwrap();
        assert_eq!(block.data, d);
    }

    #[test]
    fn empty_data_round_trips() {
        let block = decode(&encode("plan-body", &BlockData::new()).unwrap()).unwrap();
        assert!(block.data.is_empty());
    }

    #[test]
    fn encode_rejects_bad_kind() {
        let err = encode("Bad Kind", &BlockData::new()).unwrap_err();
        assert!(matches!(err, ErkError::InvalidBlockKind(_)));
    }

    #[test]
    fn decode_errors_are_descriptive() {
        let err = decode("just prose").unwrap_err();
        assert!(err.to_string().contains("missing opening marker"));

        let text = encode("plan-body", &sample()).unwrap();
        let truncated = text.trim_end_matches(closing_marker().as_str());
        let err = decode(truncated).unwrap_err();
        assert!(err.to_string().contains("missing closing marker"));
    }

    #[test]
    fn decode_accepts_crlf_line_endings() {
        let text = encode("submission-queued", &sample()).unwrap().replace('\n', "\r\n");
        let block = decode(&text).unwrap();
        assert_eq!(block.kind, "submission-queued");
        assert_eq!(block.data, sample());
    }

    #[test]
    fn try_decode_never_fails() {
        assert!(try_decode("").is_none());
        assert!(try_decode("<!-- erk:metadata-block:x -->").is_none());
        let not_a_map = "<!-- erk:metadata-block:x -->\n```yaml\n- a\n- b\n```\n<!-- /erk:metadata-block -->";
        assert!(try_decode(not_a_map).is_none());
        let bad_yaml = "<!-- erk:metadata-block:x -->\n```yaml\nkey: [unclosed\n```\n<!-- /erk:metadata-block -->";
        assert!(try_decode(bad_yaml).is_none());
    }

    #[test]
    fn details_wrapper_is_not_required() {
        let bare = "<!-- erk:metadata-block:workflow-started -->\n```yaml\nstarted_at: '2024-01-01T00:00:00Z'\n```\n<!-- /erk:metadata-block -->";
        let block = decode(bare).unwrap();
        assert_eq!(block.get_str("started_at"), Some("2024-01-01T00:00:00Z"));
    }
}
