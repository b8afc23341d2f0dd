//! `track`, `update`, `commit`, `list`, `cleanup`: manual workflow control.
//! The daemon drives almost every transition on its own via the pipeline;
//! these verbs exist for the steps it can't observe automatically — a
//! contributor accepting an assignment, starting work, or opening a PR out
//! of band — and for correcting a record by hand.

use std::collections::BTreeSet;

use scout_core::config::Config;
use scout_core::types::WorkflowStatus;
use scout_workflow::NewIssueFacts;

use crate::render::parse_status;

/// Begins tracking `issue_url` if it isn't already, seeding a bare `new`
/// record — there is no candidate/score available outside a discovery
/// pass, so the seeded facts seed to 0/empty and `find`/`notify`/`start`
/// will backfill them the next time this issue is rediscovered.
pub async fn track(config: Config, issue_url: &str) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let facts = NewIssueFacts {
        score: 0.0,
        labels: BTreeSet::new(),
        has_good_first: false,
        has_confirmed: false,
        has_assignee: false,
        has_pr: false,
    };
    let record = ctx.workflow.get_or_create(issue_url, facts, ctx.now()).await?;
    println!("tracking {} (status: {:?})", record.issue_url, record.status);
    Ok(())
}

pub async fn update(config: Config, issue_url: &str, status: &str) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let target = parse_status(status)?;
    let record = ctx.workflow.transition(issue_url, target, ctx.now()).await?;
    println!("{} -> {:?}", record.issue_url, record.status);
    Ok(())
}

/// Shorthand for `update <issue-url> pr-submitted`, the step a contributor
/// reaches for most often once they've opened a PR.
pub async fn commit(config: Config, issue_url: &str) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let record = ctx.workflow.transition(issue_url, WorkflowStatus::PrSubmitted, ctx.now()).await?;
    println!("{} -> {:?}", record.issue_url, record.status);
    Ok(())
}

pub async fn list(config: Config) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let records = ctx.store.list_all_workflow().await?;
    if records.is_empty() {
        println!("no tracked issues");
        return Ok(());
    }
    for record in &records {
        println!("{:<16} {:>5.2} {}", format!("{:?}", record.status), record.score, record.issue_url);
    }
    println!("{} tracked issues", records.len());
    Ok(())
}

pub async fn cleanup(config: Config, retention_days: i64) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let removed = ctx.workflow.cleanup(chrono::Duration::days(retention_days), ctx.now()).await?;
    println!("removed {removed} terminal record(s) older than {retention_days} days");
    Ok(())
}
