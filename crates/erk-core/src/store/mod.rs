//! Provider-agnostic plan storage.
//!
//! Stores hold no state between calls: every `get` and `list` reads the
//! backing log again and builds fresh [`Plan`] values, so results are
//! point-in-time snapshots.

mod github;
mod memory;

pub use github::GithubPlanStore;
pub use memory::InMemoryPlanStore;

use crate::error::Result;
use crate::plan::{Plan, PlanQuery};
use crate::tracker::RepoContext;

pub trait PlanStore {
    /// Fails with `NotFound` for an unknown identifier and `Provider` when
    /// the backend call fails.
    fn get_plan(&self, repo: &RepoContext, identifier: &str) -> Result<Plan>;

    /// Plans matching `query`. No match is an empty list, not an error.
    fn list_plans(&self, repo: &RepoContext, query: &PlanQuery) -> Result<Vec<Plan>>;

    /// Which backend is in effect, for diagnostics.
    fn provider_name(&self) -> &'static str;
}
