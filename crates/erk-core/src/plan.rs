use crate::error::ErkError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// PlanState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanState {
    Open,
    Closed,
}

impl PlanState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanState::Open => "open",
            PlanState::Closed => "closed",
        }
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanState {
    type Err = ErkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(PlanState::Open),
            "closed" => Ok(PlanState::Closed),
            _ => Err(ErkError::InvalidState(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderMetadata
// ---------------------------------------------------------------------------

/// Provider-specific identity of the record backing a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ProviderMetadata {
    Github { number: u64 },
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A plan as read from its backing record. Built fresh on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub state: PlanState,
    pub url: String,
    pub labels: BTreeSet<String>,
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

impl Plan {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

// ---------------------------------------------------------------------------
// PlanQuery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanQuery {
    /// A plan must carry every listed label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PlanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl PlanQuery {
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: Some(labels.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn state(mut self, state: PlanState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Label and state filters only; `limit` applies to a whole result set.
    pub fn matches(&self, plan: &Plan) -> bool {
        let labels_ok = self
            .labels
            .as_ref()
            .map_or(true, |ls| ls.iter().all(|l| plan.has_label(l)));
        let state_ok = self.state.map_or(true, |s| plan.state == s);
        labels_ok && state_ok
    }

    /// Filter `plans` (already in result order) and truncate to `limit`.
    pub fn apply(&self, plans: impl IntoIterator<Item = Plan>) -> Vec<Plan> {
        let matching = plans.into_iter().filter(|p| self.matches(p));
        match self.limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        }
    }
}
