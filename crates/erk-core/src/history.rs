//! Rebuild a plan's submission status history from its comment stream.
//!
//! Events are emitted in comment order and, within a comment, in block order.
//! Comment timestamps are not consulted, so out-of-order input produces
//! out-of-order (but deterministic) output.

use crate::registry::BlockKind;
use crate::scan::scan_all;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const QUEUED_REASON: &str = "Plan submitted to the implementation queue";
pub const STARTED_REASON: &str = "Implementation workflow started";
pub const COMPLETED_REASON: &str = "Implementation workflow completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Queued,
    Started,
    Completed,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Queued => "queued",
            SubmissionStatus::Started => "started",
            SubmissionStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: SubmissionStatus,
    pub timestamp: String,
    pub reason: String,
}

impl StatusEvent {
    fn new(status: SubmissionStatus, timestamp: impl Into<String>, reason: &str) -> Self {
        Self {
            status,
            timestamp: timestamp.into(),
            reason: reason.to_string(),
        }
    }
}

/// Build the status history from comment bodies given oldest first.
///
/// `submission-queued` blocks with a `queued_at` field become `queued` events
/// and `workflow-started` blocks with `started_at` become `started` events.
/// A single `completed` event stamped `completed_at` is always appended.
pub fn build_history<S: AsRef<str>>(comment_bodies: &[S], completed_at: &str) -> Vec<StatusEvent> {
    let queued = BlockKind::SubmissionQueued.as_str();
    let started = BlockKind::WorkflowStarted.as_str();

    let mut events = Vec::new();
    for body in comment_bodies {
        for block in scan_all(body.as_ref()) {
            if block.kind == queued {
                if let Some(ts) = block.get_str("queued_at") {
                    events.push(StatusEvent::new(SubmissionStatus::Queued, ts, QUEUED_REASON));
                }
            } else if block.kind == started {
                if let Some(ts) = block.get_str("started_at") {
                    events.push(StatusEvent::new(SubmissionStatus::Started, ts, STARTED_REASON));
                }
            }
        }
    }
    events.push(StatusEvent::new(
        SubmissionStatus::Completed,
        completed_at,
        COMPLETED_REASON,
    ));
    events
}
