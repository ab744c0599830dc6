use super::PlanStore;
use crate::error::{ErkError, Result};
use crate::plan::{Plan, PlanQuery};
use crate::tracker::RepoContext;
use std::collections::HashMap;

/// Fixed set of plans for tests. Filters exactly like the real stores.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanStore {
    plans: HashMap<String, Plan>,
}

impl InMemoryPlanStore {
    pub fn new(plans: impl IntoIterator<Item = Plan>) -> Self {
        Self {
            plans: plans
                .into_iter()
                .map(|p| (p.identifier.clone(), p))
                .collect(),
        }
    }
}

impl PlanStore for InMemoryPlanStore {
    fn get_plan(&self, _repo: &RepoContext, identifier: &str) -> Result<Plan> {
        self.plans
            .get(identifier)
            .cloned()
            .ok_or_else(|| ErkError::NotFound(identifier.to_string()))
    }

    /// Newest first, ties broken by identifier.
    fn list_plans(&self, _repo: &RepoContext, query: &PlanQuery) -> Result<Vec<Plan>> {
        let mut plans: Vec<Plan> = self.plans.values().cloned().collect();
        plans.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(query.apply(plans))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
