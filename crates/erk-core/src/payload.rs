//! Typed views over the known block kinds.
//!
//! `from_block` validates against the registered schema before deserializing,
//! so a payload that fails its schema never becomes a typed value.

use crate::block::{BlockData, MetadataBlock};
use crate::error::{ErkError, Result};
use crate::registry::BlockKind;
use crate::schema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

pub trait BlockPayload: Serialize + DeserializeOwned {
    const KIND: BlockKind;

    fn to_block(&self) -> Result<MetadataBlock> {
        let data = match serde_yaml::to_value(self)? {
            Value::Mapping(map) => map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v)))
                .collect::<BlockData>(),
            _ => {
                return Err(ErkError::MalformedBlock(format!(
                    "{} payload did not serialize to a mapping",
                    Self::KIND
                )))
            }
        };
        MetadataBlock::new(Self::KIND.as_str(), data)
    }

    fn from_block(block: &MetadataBlock) -> Result<Self> {
        if block.kind != Self::KIND.as_str() {
            return Err(ErkError::MalformedBlock(format!(
                "expected {} block, found {}",
                Self::KIND,
                block.kind
            )));
        }
        schema::validate(&block.kind, &block.data)?;
        let map = block
            .data
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect();
        Ok(serde_yaml::from_value(Value::Mapping(map))?)
    }

    /// Encode straight to block markdown.
    fn render(&self) -> Result<String> {
        self.to_block()?.render()
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanHeader {
    pub schema_version: String,
    pub created_at: String,
    pub created_by: String,
    pub base_commit: String,
    pub branch_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dispatched_run_id: Option<String>,
}

impl BlockPayload for PlanHeader {
    const KIND: BlockKind = BlockKind::PlanHeader;
}

/// The free-text plan, wrapped so it can be pulled back out of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBody {
    pub content: String,
}

impl BlockPayload for PlanBody {
    const KIND: BlockKind = BlockKind::PlanBody;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionQueued {
    pub queued_at: String,
    pub submitted_by: String,
}

impl BlockPayload for SubmissionQueued {
    const KIND: BlockKind = BlockKind::SubmissionQueued;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStarted {
    pub started_at: String,
    pub workflow_run_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_run_url: Option<String>,
}

impl BlockPayload for WorkflowStarted {
    const KIND: BlockKind = BlockKind::WorkflowStarted;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeCreation {
    pub worktree_name: String,
    pub branch_name: String,
    pub timestamp: String,
    pub issue_number: u64,
}

impl BlockPayload for WorktreeCreation {
    const KIND: BlockKind = BlockKind::WorktreeCreation;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::decode;

    fn header() -> PlanHeader {
        PlanHeader {
            schema_version: "2".into(),
            created_at: "2024-03-01T12:00:00+00:00".into(),
            created_by: "alice".into(),
            base_commit: "0a1b2c3".into(),
            branch_name: "add-login".into(),
            worktree_name: None,
            last_dispatched_run_id: None,
        }
    }

    #[test]
    fn header_survives_render_and_decode() {
        let text = header().render().unwrap();
        let block = decode(&text).unwrap();
        assert_eq!(block.kind, "plan-header");
        assert!(!block.data.contains_key("worktree_name"));
        assert_eq!(PlanHeader::from_block(&block).unwrap(), header());
    }

    #[test]
    fn from_block_validates_before_deserializing() {
        let mut block = header().to_block().unwrap();
        block.data.remove("created_by");
        block.data.insert("base_commit".into(), "".into());
        match PlanHeader::from_block(&block) {
            Err(ErkError::Validation(f)) => {
                assert_eq!(f.errors.len(), 2);
                assert_eq!(f.errors[0].field, "created_by");
                assert_eq!(f.errors[1].field, "base_commit");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn from_block_rejects_other_kinds() {
        let block = PlanBody {
            content: "do things".into(),
        }
        .to_block()
        .unwrap();
        assert!(matches!(
            PlanHeader::from_block(&block),
            Err(ErkError::MalformedBlock(_))
        ));
    }

    #[test]
    fn worktree_creation_keeps_integer_issue_number() {
        let wt = WorktreeCreation {
            worktree_name: "add-login".into(),
            branch_name: "add-login-25-01-02".into(),
            timestamp: "2025-01-02T10:00:00Z".into(),
            issue_number: 42,
        };
        let block = wt.to_block().unwrap();
        assert_eq!(block.data["issue_number"], Value::from(42u64));
        assert_eq!(WorktreeCreation::from_block(&block).unwrap(), wt);
    }
}
