use super::Context;
use crate::output::print_json;
use erk_core::PlanStore;

pub fn run(ctx: &Context, identifier: &str) -> anyhow::Result<()> {
    let store = ctx.store();
    let plan = store.get_plan(&ctx.repo, identifier)?;

    if ctx.json {
        return print_json(&plan);
    }

    println!("#{} {}", plan.identifier, plan.title);
    println!("state:     {}", plan.state);
    println!("url:       {}", plan.url);
    if !plan.labels.is_empty() {
        let labels: Vec<&str> = plan.labels.iter().map(String::as_str).collect();
        println!("labels:    {}", labels.join(", "));
    }
    if !plan.assignees.is_empty() {
        println!("assignees: {}", plan.assignees.join(", "));
    }
    println!("created:   {}", plan.created_at.to_rfc3339());
    println!("updated:   {}", plan.updated_at.to_rfc3339());
    Ok(())
}
