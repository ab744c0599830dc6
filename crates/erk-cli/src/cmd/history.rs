use super::Context;
use crate::output::{print_json, print_table};
use anyhow::bail;
use erk_core::lifecycle::plan_status_history;
use erk_core::schema::is_timestamp;

pub fn run(ctx: &Context, number: u64, completed_at: Option<String>) -> anyhow::Result<()> {
    let completed_at = completed_at.unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
    if !is_timestamp(&completed_at) {
        bail!("--completed-at '{completed_at}' is not an ISO-8601 timestamp");
    }

    let store = ctx.store();
    let events = plan_status_history(store.tracker(), &ctx.repo, number, &completed_at)?;

    if ctx.json {
        return print_json(&events);
    }
    let rows = events
        .iter()
        .map(|e| vec![e.status.to_string(), e.timestamp.clone(), e.reason.clone()])
        .collect();
    print_table(&["STATUS", "TIMESTAMP", "REASON"], rows);
    Ok(())
}
