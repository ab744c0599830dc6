//! Boundary to the issue tracker that stores plans.
//!
//! The tracker is an append-only log: an issue body plus its comments. Every
//! call may fail, and failures surface as [`ErkError::Provider`].
//!
//! [`ErkError::Provider`]: crate::error::ErkError::Provider

mod fake;
mod gh;

pub use fake::{FakeIssueTracker, FakeLabel};
pub use gh::GhCli;

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// RepoContext
// ---------------------------------------------------------------------------

/// Which repository a call targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    /// Local checkout; tracker commands run from here.
    pub root: PathBuf,
    /// `OWNER/NAME` override. When unset the tracker infers it from `root`.
    pub remote: Option<String>,
}

impl RepoContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Native issue state vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Value for `gh issue list --state`.
    pub fn as_flag(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    pub url: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// All of these labels must be present.
    pub labels: Vec<String>,
    pub state: Option<IssueState>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

pub trait IssueTracker {
    /// Short name used in error messages, e.g. `github`.
    fn provider_name(&self) -> &'static str;

    fn create_issue(
        &self,
        repo: &RepoContext,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<CreatedIssue>;

    /// Fails with `NotFound` when no issue has this number.
    fn get_issue(&self, repo: &RepoContext, number: u64) -> Result<IssueRecord>;

    fn list_issues(&self, repo: &RepoContext, filter: &IssueFilter) -> Result<Vec<IssueRecord>>;

    fn add_comment(&self, repo: &RepoContext, number: u64, body: &str) -> Result<()>;

    /// Comment bodies in creation order, oldest first.
    fn get_comments(&self, repo: &RepoContext, number: u64) -> Result<Vec<String>>;

    /// Create the label unless it already exists. Existing labels are left as is.
    fn ensure_label(
        &self,
        repo: &RepoContext,
        name: &str,
        description: &str,
        color: &str,
    ) -> Result<()>;
}
