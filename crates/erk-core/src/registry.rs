//! Shared vocabulary of the metadata block wire format.
//!
//! The namespace, every known block kind, and each kind's schema live here so
//! the encoder, the scanner, and the validator never spell them separately.

use crate::error::{ErkError, Result};
use crate::schema::{FieldSpec, FieldType, Format, Schema};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Prefix of every block marker, e.g. `<!-- erk:metadata-block:plan-header -->`.
pub const NAMESPACE: &str = "erk";

/// Fence info string used for the block payload.
pub const PAYLOAD_FORMAT: &str = "yaml";

// ---------------------------------------------------------------------------
// Kind syntax
// ---------------------------------------------------------------------------

static KIND_RE: OnceLock<Regex> = OnceLock::new();

fn kind_re() -> &'static Regex {
    KIND_RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").unwrap())
}

/// Any block kind, known or not, must match `[a-z0-9-]+`.
pub fn validate_kind(kind: &str) -> Result<()> {
    if !kind_re().is_match(kind) {
        return Err(ErkError::InvalidBlockKind(kind.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// BlockKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    PlanHeader,
    PlanBody,
    SubmissionQueued,
    WorkflowStarted,
    WorktreeCreation,
}

impl BlockKind {
    pub fn all() -> &'static [BlockKind] {
        &[
            BlockKind::PlanHeader,
            BlockKind::PlanBody,
            BlockKind::SubmissionQueued,
            BlockKind::WorkflowStarted,
            BlockKind::WorktreeCreation,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::PlanHeader => "plan-header",
            BlockKind::PlanBody => "plan-body",
            BlockKind::SubmissionQueued => "submission-queued",
            BlockKind::WorkflowStarted => "workflow-started",
            BlockKind::WorktreeCreation => "erk-worktree-creation",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            BlockKind::PlanHeader => &PLAN_HEADER,
            BlockKind::PlanBody => &PLAN_BODY,
            BlockKind::SubmissionQueued => &SUBMISSION_QUEUED,
            BlockKind::WorkflowStarted => &WORKFLOW_STARTED,
            BlockKind::WorktreeCreation => &WORKTREE_CREATION,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BlockKind {
    type Err = ErkError;

    fn from_str(s: &str) -> Result<Self> {
        BlockKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ErkError::UnknownBlockKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

const fn required_str(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::String, Format::NonEmpty)
}

const fn timestamp(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldType::String, Format::Timestamp)
}

static PLAN_HEADER: Schema = Schema {
    kind: BlockKind::PlanHeader,
    version: 2,
    required: &[
        required_str("schema_version"),
        timestamp("created_at"),
        required_str("created_by"),
        required_str("base_commit"),
        required_str("branch_name"),
    ],
};

static PLAN_BODY: Schema = Schema {
    kind: BlockKind::PlanBody,
    version: 1,
    required: &[required_str("content")],
};

static SUBMISSION_QUEUED: Schema = Schema {
    kind: BlockKind::SubmissionQueued,
    version: 1,
    required: &[timestamp("queued_at"), required_str("submitted_by")],
};

static WORKFLOW_STARTED: Schema = Schema {
    kind: BlockKind::WorkflowStarted,
    version: 1,
    required: &[timestamp("started_at"), required_str("workflow_run_id")],
};

static WORKTREE_CREATION: Schema = Schema {
    kind: BlockKind::WorktreeCreation,
    version: 1,
    required: &[
        required_str("worktree_name"),
        required_str("branch_name"),
        timestamp("timestamp"),
        FieldSpec::new("issue_number", FieldType::Integer, Format::Any),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_strings() {
        for &kind in BlockKind::all() {
            let parsed: BlockKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(kind.schema().kind, kind);
            validate_kind(kind.as_str()).unwrap();
        }
    }

    #[test]
    fn invalid_kind_syntax() {
        for kind in ["", "Plan-Header", "plan header", "plan_header", "plan:header"] {
            assert!(validate_kind(kind).is_err(), "expected invalid: {kind:?}");
        }
    }

    #[test]
    fn unknown_kind_does_not_parse() {
        assert!("objective-header".parse::<BlockKind>().is_err());
    }
}
