use super::PlanStore;
use crate::error::{ErkError, Result};
use crate::plan::{Plan, PlanQuery, PlanState, ProviderMetadata};
use crate::tracker::{IssueFilter, IssueRecord, IssueState, IssueTracker, RepoContext};

/// Plans stored as GitHub issues, reached through an [`IssueTracker`].
#[derive(Debug)]
pub struct GithubPlanStore<T> {
    tracker: T,
}

impl<T: IssueTracker> GithubPlanStore<T> {
    pub fn new(tracker: T) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }
}

fn plan_state(state: IssueState) -> PlanState {
    match state {
        IssueState::Open => PlanState::Open,
        IssueState::Closed => PlanState::Closed,
    }
}

fn issue_state(state: PlanState) -> IssueState {
    match state {
        PlanState::Open => IssueState::Open,
        PlanState::Closed => IssueState::Closed,
    }
}

pub(crate) fn plan_from_issue(issue: IssueRecord) -> Plan {
    Plan {
        identifier: issue.number.to_string(),
        title: issue.title,
        body: issue.body,
        state: plan_state(issue.state),
        url: issue.url,
        labels: issue.labels.into_iter().collect(),
        assignees: issue.assignees,
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        provider_metadata: Some(ProviderMetadata::Github {
            number: issue.number,
        }),
    }
}

impl<T: IssueTracker> PlanStore for GithubPlanStore<T> {
    fn get_plan(&self, repo: &RepoContext, identifier: &str) -> Result<Plan> {
        let number: u64 = identifier
            .trim_start_matches('#')
            .parse()
            .map_err(|_| ErkError::NotFound(identifier.to_string()))?;
        let issue = self.tracker.get_issue(repo, number)?;
        Ok(plan_from_issue(issue))
    }

    fn list_plans(&self, repo: &RepoContext, query: &PlanQuery) -> Result<Vec<Plan>> {
        let filter = IssueFilter {
            labels: query.labels.clone().unwrap_or_default(),
            state: query.state.map(issue_state),
            limit: query.limit,
        };
        let issues = self.tracker.list_issues(repo, &filter)?;
        tracing::debug!(count = issues.len(), "listed plan issues");
        // Re-apply the query so the contract holds whatever the backend did.
        Ok(query.apply(issues.into_iter().map(plan_from_issue)))
    }

    fn provider_name(&self) -> &'static str {
        self.tracker.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn conversion_copies_fields_and_records_issue_number() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let issue = IssueRecord {
            number: 123,
            title: "Add login".into(),
            body: "body".into(),
            state: IssueState::Closed,
            url: "https://github.com/acme/app/issues/123".into(),
            labels: vec!["erk-plan".into(), "bug".into()],
            assignees: vec!["bob".into(), "alice".into()],
            created_at: ts,
            updated_at: ts,
        };
        let plan = plan_from_issue(issue);
        assert_eq!(plan.identifier, "123");
        assert_eq!(plan.state, PlanState::Closed);
        assert!(plan.has_label("bug") && plan.has_label("erk-plan"));
        assert_eq!(plan.assignees, ["bob", "alice"]);
        assert_eq!(plan.created_at, ts);
        assert_eq!(
            plan.provider_metadata,
            Some(ProviderMetadata::Github { number: 123 })
        );
    }
}
