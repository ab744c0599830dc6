use super::Context;
use crate::output::{print_json, print_table};
use erk_core::{PlanQuery, PlanState, PlanStore};

pub fn run(
    ctx: &Context,
    labels: Vec<String>,
    state: Option<PlanState>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let query = PlanQuery {
        labels: (!labels.is_empty()).then_some(labels),
        state,
        limit,
    };
    let store = ctx.store();
    let plans = store.list_plans(&ctx.repo, &query)?;

    if ctx.json {
        return print_json(&plans);
    }
    if plans.is_empty() {
        println!("No plans found.");
        return Ok(());
    }

    let rows = plans
        .iter()
        .map(|p| {
            vec![
                format!("#{}", p.identifier),
                p.state.to_string(),
                p.title.clone(),
                p.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    print_table(&["PLAN", "STATE", "TITLE", "CREATED"], rows);
    Ok(())
}
