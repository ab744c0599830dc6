//! In-memory stand-in for the issue tracker.

use super::{CreatedIssue, IssueFilter, IssueRecord, IssueState, IssueTracker, RepoContext};
use crate::error::{ErkError, Result};
use chrono::Utc;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeLabel {
    pub description: String,
    pub color: String,
}

#[derive(Debug, Default)]
struct FakeState {
    issues: BTreeMap<u64, IssueRecord>,
    comments: HashMap<u64, Vec<String>>,
    labels: BTreeMap<String, FakeLabel>,
    failure: Option<String>,
}

/// Tracker backed by plain collections. Issues are numbered from 1 and
/// listed newest first, like GitHub.
#[derive(Debug, Default)]
pub struct FakeIssueTracker {
    state: RefCell<FakeState>,
}

impl FakeIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, issue: IssueRecord) -> Self {
        self.state.borrow_mut().issues.insert(issue.number, issue);
        self
    }

    pub fn with_comments<I, S>(self, number: u64, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .borrow_mut()
            .comments
            .entry(number)
            .or_default()
            .extend(comments.into_iter().map(Into::into));
        self
    }

    pub fn with_label(self, name: &str) -> Self {
        self.state.borrow_mut().labels.insert(
            name.to_string(),
            FakeLabel {
                description: String::new(),
                color: "ededed".to_string(),
            },
        );
        self
    }

    /// Make every subsequent call fail with a provider error.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state.borrow_mut().failure = Some(message.into());
    }

    pub fn issue(&self, number: u64) -> Option<IssueRecord> {
        self.state.borrow().issues.get(&number).cloned()
    }

    pub fn comments(&self, number: u64) -> Vec<String> {
        self.state
            .borrow()
            .comments
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    pub fn label(&self, name: &str) -> Option<FakeLabel> {
        self.state.borrow().labels.get(name).cloned()
    }

    fn check(&self) -> Result<()> {
        match &self.state.borrow().failure {
            Some(msg) => Err(ErkError::provider(self.provider_name(), msg.clone())),
            None => Ok(()),
        }
    }
}

impl IssueTracker for FakeIssueTracker {
    fn provider_name(&self) -> &'static str {
        "github"
    }

    fn create_issue(
        &self,
        _repo: &RepoContext,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<CreatedIssue> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        let number = state.issues.keys().next_back().map_or(1, |n| n + 1);
        let url = format!("https://github.com/fake/repo/issues/{number}");
        let now = Utc::now();
        state.issues.insert(
            number,
            IssueRecord {
                number,
                title: title.to_string(),
                body: body.to_string(),
                state: IssueState::Open,
                url: url.clone(),
                labels: labels.to_vec(),
                assignees: Vec::new(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(CreatedIssue { number, url })
    }

    fn get_issue(&self, _repo: &RepoContext, number: u64) -> Result<IssueRecord> {
        self.check()?;
        self.issue(number)
            .ok_or_else(|| ErkError::NotFound(number.to_string()))
    }

    fn list_issues(&self, _repo: &RepoContext, filter: &IssueFilter) -> Result<Vec<IssueRecord>> {
        self.check()?;
        let state = self.state.borrow();
        let matching = state
            .issues
            .values()
            .rev()
            .filter(|i| filter.labels.iter().all(|l| i.labels.contains(l)))
            .filter(|i| filter.state.map_or(true, |s| i.state == s))
            .cloned();
        Ok(match filter.limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        })
    }

    fn add_comment(&self, _repo: &RepoContext, number: u64, body: &str) -> Result<()> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        let issue = state
            .issues
            .get_mut(&number)
            .ok_or_else(|| ErkError::NotFound(number.to_string()))?;
        issue.updated_at = Utc::now();
        state
            .comments
            .entry(number)
            .or_default()
            .push(body.to_string());
        Ok(())
    }

    fn get_comments(&self, _repo: &RepoContext, number: u64) -> Result<Vec<String>> {
        self.check()?;
        if self.issue(number).is_none() {
            return Err(ErkError::NotFound(number.to_string()));
        }
        Ok(self.comments(number))
    }

    fn ensure_label(
        &self,
        _repo: &RepoContext,
        name: &str,
        description: &str,
        color: &str,
    ) -> Result<()> {
        self.check()?;
        self.state
            .borrow_mut()
            .labels
            .entry(name.to_string())
            .or_insert_with(|| FakeLabel {
                description: description.to_string(),
                color: color.to_string(),
            });
        Ok(())
    }
}
