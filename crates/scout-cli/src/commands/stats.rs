//! `stats`, `status`, `limits`: read-only snapshots of workflow and budget
//! state, grounded on `at-cli`'s `status` verb (load config, open store,
//! print a KPI table) but widened to cover every workflow state rather than
//! one bead pipeline's fixed five.

use scout_core::config::Config;
use scout_core::types::WorkflowStatus;

pub async fn stats(config: Config) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;

    println!("issue-scout stats");
    println!("{}", "-".repeat(40));
    for status in [
        WorkflowStatus::New,
        WorkflowStatus::Notified,
        WorkflowStatus::AskedAssignment,
        WorkflowStatus::Assigned,
        WorkflowStatus::InProgress,
        WorkflowStatus::PrSubmitted,
        WorkflowStatus::Completed,
        WorkflowStatus::Abandoned,
    ] {
        let count = ctx.workflow.get_by_status(status).await?.len();
        println!("  {:<16} {count}", format!("{status:?}"));
    }
    println!("active:           {}", ctx.workflow.get_active_count().await?);
    Ok(())
}

pub async fn status(config: Config) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let lock = scout_core::lockfile::RunLock::read_valid();
    match lock {
        Some(lock) => println!("daemon running: pid={} started_at={}", lock.pid, lock.started_at),
        None => println!("daemon not running"),
    }
    println!("active workflow records: {}", ctx.workflow.get_active_count().await?);
    println!("watched repos: {} ({} enabled)", ctx.registry.all().len(), ctx.registry.enabled_repos().len());
    Ok(())
}

pub async fn limits(config: Config) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let snap = ctx.limiter.usage_snapshot().await;
    println!("budget usage");
    println!("{}", "-".repeat(40));
    println!("notifications/hour:   {}/{}", snap.notify_hour, snap.notify_hour_cap);
    println!("notifications/day:    {}/{}", snap.notify_day, snap.notify_day_cap);
    println!("comments/day:         {}/{}", snap.comments_today, snap.comments_today_cap);
    println!("comments/week:        {}/{}", snap.comments_this_week, snap.comments_week_cap);
    println!("assignment asks/day:  {}/{}", snap.assignments_today, snap.assignments_day_cap);
    println!("forge calls/hour:     {}/{}", snap.forge_calls_this_hour, snap.forge_calls_hour_cap);
    Ok(())
}
