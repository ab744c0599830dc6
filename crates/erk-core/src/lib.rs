pub mod block;
pub mod config;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod payload;
pub mod plan;
pub mod registry;
pub mod scan;
pub mod schema;
pub mod store;
pub mod tracker;

pub use block::{BlockData, MetadataBlock};
pub use error::{ErkError, Result};
pub use plan::{Plan, PlanQuery, PlanState, ProviderMetadata};
pub use store::PlanStore;
pub use tracker::{IssueTracker, RepoContext};
