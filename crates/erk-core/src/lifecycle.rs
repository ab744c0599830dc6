//! Writing plans and their lifecycle events to the tracker.
//!
//! Every write appends: a new issue, or a new comment on one. Existing bodies
//! and comments are never edited, so concurrent writers cannot clobber each
//! other.

use crate::config::Config;
use crate::error::Result;
use crate::history::{build_history, StatusEvent};
use crate::payload::{
    BlockPayload, PlanBody, PlanHeader, SubmissionQueued, WorkflowStarted, WorktreeCreation,
};
use crate::registry::BlockKind;
use crate::scan::{find_first, scan_all};
use crate::tracker::{CreatedIssue, IssueTracker, RepoContext};

/// Create a plan issue: the header block as the body, the plan text as the
/// first comment.
pub fn create_plan_issue(
    tracker: &dyn IssueTracker,
    repo: &RepoContext,
    config: &Config,
    title: &str,
    content: &str,
    header: &PlanHeader,
) -> Result<CreatedIssue> {
    let label = &config.labels.plan;
    tracker.ensure_label(repo, &label.name, &label.description, &label.color)?;

    let body = header.render()?;
    let created = tracker.create_issue(repo, title, &body, &[label.name.clone()])?;
    tracing::info!(number = created.number, "created plan issue");

    let plan_body = PlanBody {
        content: content.to_string(),
    };
    tracker.add_comment(repo, created.number, &plan_body.render()?)?;
    Ok(created)
}

fn append_event(
    tracker: &dyn IssueTracker,
    repo: &RepoContext,
    number: u64,
    summary: &str,
    payload: &impl BlockPayload,
) -> Result<()> {
    let comment = format!("{summary}\n\n{}", payload.render()?);
    tracker.add_comment(repo, number, &comment)
}

pub fn record_submission_queued(
    tracker: &dyn IssueTracker,
    repo: &RepoContext,
    number: u64,
    event: &SubmissionQueued,
) -> Result<()> {
    let summary = format!(
        "Plan queued for implementation by {} at {}.",
        event.submitted_by, event.queued_at
    );
    append_event(tracker, repo, number, &summary, event)
}

pub fn record_workflow_started(
    tracker: &dyn IssueTracker,
    repo: &RepoContext,
    number: u64,
    event: &WorkflowStarted,
) -> Result<()> {
    let summary = match &event.workflow_run_url {
        Some(url) => format!("Implementation workflow started: {url}"),
        None => format!("Implementation workflow {} started.", event.workflow_run_id),
    };
    append_event(tracker, repo, number, &summary, event)
}

pub fn record_worktree_creation(
    tracker: &dyn IssueTracker,
    repo: &RepoContext,
    event: &WorktreeCreation,
) -> Result<()> {
    let summary = format!(
        "Worktree `{}` created on branch `{}`.",
        event.worktree_name, event.branch_name
    );
    append_event(tracker, repo, event.issue_number, &summary, event)
}

// ---------------------------------------------------------------------------
// Reading back
// ---------------------------------------------------------------------------

/// The validated header block of a plan issue body.
///
/// `Ok(None)` when the body carries no header at all; a header that is
/// present but invalid is an error.
pub fn plan_header(body: &str) -> Result<Option<PlanHeader>> {
    match find_first(body, BlockKind::PlanHeader.as_str()) {
        Some(block) => PlanHeader::from_block(&block).map(Some),
        None => Ok(None),
    }
}

/// Plan text from the first `plan-body` block across `comments`.
pub fn extract_plan_content<S: AsRef<str>>(comments: &[S]) -> Option<String> {
    comments
        .iter()
        .flat_map(|c| scan_all(c.as_ref()))
        .find(|b| b.kind == BlockKind::PlanBody.as_str())
        .and_then(|b| b.get_str("content").map(str::to_string))
}

/// Status history of a plan issue, completed at `completed_at`.
pub fn plan_status_history(
    tracker: &dyn IssueTracker,
    repo: &RepoContext,
    number: u64,
    completed_at: &str,
) -> Result<Vec<StatusEvent>> {
    let comments = tracker.get_comments(repo, number)?;
    Ok(build_history(&comments, completed_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErkError;
    use crate::history::SubmissionStatus;
    use crate::tracker::FakeIssueTracker;

    fn repo() -> RepoContext {
        RepoContext::new("/tmp/repo")
    }

    fn header() -> PlanHeader {
        PlanHeader {
            schema_version: "2".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            created_by: "alice".into(),
            base_commit: "abc123".into(),
            branch_name: "main".into(),
            worktree_name: None,
            last_dispatched_run_id: None,
        }
    }

    #[test]
    fn create_writes_header_body_and_plan_comment() {
        let tracker = FakeIssueTracker::new();
        let cfg = Config::default();
        let created =
            create_plan_issue(&tracker, &repo(), &cfg, "Add login", "# Steps\n1. do it", &header())
                .unwrap();

        let issue = tracker.issue(created.number).unwrap();
        assert_eq!(issue.labels, ["erk-plan"]);
        assert_eq!(plan_header(&issue.body).unwrap(), Some(header()));
        assert!(tracker.label("erk-plan").is_some());

        let comments = tracker.comments(created.number);
        assert_eq!(comments.len(), 1);
        assert_eq!(
            extract_plan_content(&comments).as_deref(),
            Some("# Steps\n1. do it")
        );
    }

    #[test]
    fn lifecycle_comments_feed_the_history() {
        let tracker = FakeIssueTracker::new();
        let n = create_plan_issue(&tracker, &repo(), &Config::default(), "t", "c", &header())
            .unwrap()
            .number;
        record_submission_queued(
            &tracker,
            &repo(),
            n,
            &SubmissionQueued {
                queued_at: "2024-01-01T10:00:00Z".into(),
                submitted_by: "alice".into(),
            },
        )
        .unwrap();
        record_workflow_started(
            &tracker,
            &repo(),
            n,
            &WorkflowStarted {
                started_at: "2024-01-01T10:05:00Z".into(),
                workflow_run_id: "987".into(),
                workflow_run_url: None,
            },
        )
        .unwrap();

        let history = plan_status_history(&tracker, &repo(), n, "2024-01-01T11:00:00Z").unwrap();
        let got: Vec<(SubmissionStatus, &str)> = history
            .iter()
            .map(|e| (e.status, e.timestamp.as_str()))
            .collect();
        assert_eq!(
            got,
            [
                (SubmissionStatus::Queued, "2024-01-01T10:00:00Z"),
                (SubmissionStatus::Started, "2024-01-01T10:05:00Z"),
                (SubmissionStatus::Completed, "2024-01-01T11:00:00Z"),
            ]
        );
    }

    #[test]
    fn worktree_creation_targets_its_issue() {
        let tracker = FakeIssueTracker::new();
        let n = tracker.create_issue(&repo(), "t", "", &[]).unwrap().number;
        let event = WorktreeCreation {
            worktree_name: "add-login".into(),
            branch_name: "add-login-branch".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            issue_number: n,
        };
        record_worktree_creation(&tracker, &repo(), &event).unwrap();
        let comments = tracker.comments(n);
        assert!(comments[0].starts_with("Worktree `add-login` created"));
        let block = find_first(&comments[0], "erk-worktree-creation").unwrap();
        assert_eq!(WorktreeCreation::from_block(&block).unwrap(), event);
    }

    #[test]
    fn invalid_header_is_an_error_not_a_default() {
        let body = "<!-- erk:metadata-block:plan-header -->\n```yaml\nschema_version: '2'\n```\n<!-- /erk:metadata-block -->";
        assert!(matches!(plan_header(body), Err(ErkError::Validation(_))));
        assert_eq!(plan_header("no header here").unwrap(), None);
    }

    #[test]
    fn tracker_failures_propagate() {
        let tracker = FakeIssueTracker::new();
        tracker.fail_with("HTTP 502");
        let err = create_plan_issue(&tracker, &repo(), &Config::default(), "t", "c", &header())
            .unwrap_err();
        assert!(matches!(err, ErkError::Provider { .. }));
    }
}
