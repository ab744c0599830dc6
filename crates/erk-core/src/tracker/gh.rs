//! GitHub issues via the `gh` command-line client.
//!
//! Each call is one blocking `gh` invocation run from the repository root.
//! Any timeout is `gh`'s own; it shows up here as a non-zero exit.

use super::{CreatedIssue, IssueFilter, IssueRecord, IssueState, IssueTracker, RepoContext};
use crate::config::TrackerConfig;
use crate::error::{ErkError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const PROVIDER: &str = "github";

const ISSUE_FIELDS: &str = "number,title,body,state,url,labels,assignees,createdAt,updatedAt";

// ---------------------------------------------------------------------------
// gh JSON shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    state: IssueState,
    url: String,
    #[serde(default)]
    labels: Vec<GhLabel>,
    #[serde(default)]
    assignees: Vec<GhUser>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhComments {
    #[serde(default)]
    comments: Vec<GhComment>,
}

#[derive(Debug, Deserialize)]
struct GhComment {
    #[serde(default)]
    body: String,
}

impl From<GhIssue> for IssueRecord {
    fn from(gh: GhIssue) -> Self {
        IssueRecord {
            number: gh.number,
            title: gh.title,
            body: gh.body,
            state: gh.state,
            url: gh.url,
            labels: gh.labels.into_iter().map(|l| l.name).collect(),
            assignees: gh.assignees.into_iter().map(|u| u.login).collect(),
            created_at: gh.created_at,
            updated_at: gh.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// GhCli
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GhCli {
    binary: String,
    list_limit: usize,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}

impl GhCli {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            binary: config.gh_binary.clone(),
            list_limit: config.list_limit,
        }
    }

    fn resolve_binary(&self) -> Result<PathBuf> {
        which::which(&self.binary).map_err(|_| {
            ErkError::provider(
                PROVIDER,
                format!("'{}' not found: install the GitHub CLI", self.binary),
            )
        })
    }

    /// Spawn gh and collect its output without judging the exit status.
    fn output(&self, repo: &RepoContext, args: &[String], stdin: Option<&str>) -> Result<Output> {
        let binary = self.resolve_binary()?;
        let mut args = args.to_vec();
        if let Some(remote) = &repo.remote {
            args.push("--repo".to_string());
            args.push(remote.clone());
        }
        tracing::debug!(?args, root = %repo.root.display(), "running gh");

        let mut cmd = Command::new(binary);
        cmd.args(&args)
            .current_dir(&repo.root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = cmd
            .spawn()
            .map_err(|e| ErkError::provider(PROVIDER, format!("failed to spawn gh: {e}")))?;
        if let Some(input) = stdin {
            if let Some(pipe) = child.stdin.as_mut() {
                pipe.write_all(input.as_bytes()).map_err(|e| {
                    ErkError::provider(PROVIDER, format!("failed to write gh stdin: {e}"))
                })?;
            }
            // Close stdin so gh sees EOF.
            drop(child.stdin.take());
        }
        child
            .wait_with_output()
            .map_err(|e| ErkError::provider(PROVIDER, format!("gh did not complete: {e}")))
    }

    /// Run gh and return stdout, failing on a non-zero exit.
    fn run(&self, repo: &RepoContext, args: &[String], stdin: Option<&str>) -> Result<String> {
        let output = self.output(repo, args, stdin)?;
        if !output.status.success() {
            let err = exit_error(&output);
            tracing::warn!(error = %err, "gh command failed");
            return Err(err);
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn exit_error(output: &Output) -> ErkError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let msg = match output.status.code() {
        Some(code) if stderr.is_empty() => format!("gh exited with code {code}"),
        Some(code) => format!("gh exited with code {code}: {stderr}"),
        None => format!("gh terminated by signal: {stderr}"),
    };
    ErkError::provider(PROVIDER, msg)
}

fn is_missing_issue(output: &Output) -> bool {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr.contains("Could not resolve to an issue")
}

fn parse_json<T: DeserializeOwned>(stdout: &str) -> Result<T> {
    serde_json::from_str(stdout).map_err(|e| {
        let hint: String = stdout.chars().take(200).collect();
        ErkError::provider(PROVIDER, format!("malformed gh output ({e}): {hint}"))
    })
}

/// Issue number from the URL printed by `gh issue create`.
fn parse_issue_number(url: &str) -> Result<u64> {
    url.trim()
        .rsplit('/')
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| {
            ErkError::provider(PROVIDER, format!("unexpected gh issue create output: {url}"))
        })
}

fn list_args(filter: &IssueFilter, default_limit: usize) -> Vec<String> {
    let state = filter.state.map_or("all", IssueState::as_flag);
    let limit = filter.limit.unwrap_or(default_limit);
    let mut args: Vec<String> = vec![
        "issue".into(),
        "list".into(),
        "--json".into(),
        ISSUE_FIELDS.into(),
        "--state".into(),
        state.into(),
        "--limit".into(),
        limit.to_string(),
    ];
    for label in &filter.labels {
        args.push("--label".into());
        args.push(label.clone());
    }
    args
}

impl IssueTracker for GhCli {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn create_issue(
        &self,
        repo: &RepoContext,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<CreatedIssue> {
        let mut args: Vec<String> = vec![
            "issue".into(),
            "create".into(),
            "--title".into(),
            title.into(),
            "--body-file".into(),
            "-".into(),
        ];
        for label in labels {
            args.push("--label".into());
            args.push(label.clone());
        }
        let stdout = self.run(repo, &args, Some(body))?;
        let url = stdout.trim().to_string();
        let number = parse_issue_number(&url)?;
        Ok(CreatedIssue { number, url })
    }

    fn get_issue(&self, repo: &RepoContext, number: u64) -> Result<IssueRecord> {
        let args: Vec<String> = vec![
            "issue".into(),
            "view".into(),
            number.to_string(),
            "--json".into(),
            ISSUE_FIELDS.into(),
        ];
        let output = self.output(repo, &args, None)?;
        if !output.status.success() {
            if is_missing_issue(&output) {
                return Err(ErkError::NotFound(number.to_string()));
            }
            return Err(exit_error(&output));
        }
        let issue: GhIssue = parse_json(&String::from_utf8_lossy(&output.stdout))?;
        Ok(issue.into())
    }

    fn list_issues(&self, repo: &RepoContext, filter: &IssueFilter) -> Result<Vec<IssueRecord>> {
        let stdout = self.run(repo, &list_args(filter, self.list_limit), None)?;
        let issues: Vec<GhIssue> = parse_json(&stdout)?;
        Ok(issues.into_iter().map(IssueRecord::from).collect())
    }

    fn add_comment(&self, repo: &RepoContext, number: u64, body: &str) -> Result<()> {
        let args: Vec<String> = vec![
            "issue".into(),
            "comment".into(),
            number.to_string(),
            "--body-file".into(),
            "-".into(),
        ];
        self.run(repo, &args, Some(body))?;
        Ok(())
    }

    fn get_comments(&self, repo: &RepoContext, number: u64) -> Result<Vec<String>> {
        let args: Vec<String> = vec![
            "issue".into(),
            "view".into(),
            number.to_string(),
            "--json".into(),
            "comments".into(),
        ];
        let stdout = self.run(repo, &args, None)?;
        let parsed: GhComments = parse_json(&stdout)?;
        Ok(parsed.comments.into_iter().map(|c| c.body).collect())
    }

    fn ensure_label(
        &self,
        repo: &RepoContext,
        name: &str,
        description: &str,
        color: &str,
    ) -> Result<()> {
        let args: Vec<String> = vec![
            "label".into(),
            "list".into(),
            "--json".into(),
            "name".into(),
            "--limit".into(),
            "1000".into(),
        ];
        let existing: Vec<GhLabel> = parse_json(&self.run(repo, &args, None)?)?;
        if existing.iter().any(|l| l.name == name) {
            return Ok(());
        }
        let args: Vec<String> = vec![
            "label".into(),
            "create".into(),
            name.into(),
            "--description".into(),
            description.into(),
            "--color".into(),
            color.into(),
        ];
        self.run(repo, &args, None)?;
        tracing::info!(label = name, "created label");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
