//! `mine`: lists issues this contributor is already engaged with. Primary
//! path filters the current discovery pass down to candidates the resolved
//! identity is assigned to; when identity couldn't be resolved (see
//! `RuntimeContext::identity`'s doc comment) this falls back to every
//! non-terminal tracked workflow record instead.

use scout_core::config::Config;
use scout_daemon::{Scheduler, ShutdownSignal};

use crate::render::candidate_line;

pub async fn run(config: Config) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;

    if let Some(identity) = &ctx.identity {
        let scheduler = Scheduler::new();
        let shutdown = ShutdownSignal::new();
        let discovered = scheduler.discover_sorted(&ctx, &shutdown).await;
        let mine: Vec<_> = discovered
            .iter()
            .filter(|(_, candidate, _)| candidate.issue.assignees.contains(&identity.login))
            .collect();

        if mine.is_empty() {
            println!("no open issues currently assigned to {} among today's discovery pass", identity.login);
        } else {
            for (repo, candidate, breakdown) in &mine {
                candidate_line(&repo.full_name(), candidate, breakdown);
            }
        }
        return Ok(());
    }

    println!("identity unknown (token lacks read:user or lookup failed); showing every active tracked issue instead");
    use scout_core::types::WorkflowStatus::*;
    let mut shown = 0u64;
    for status in [New, Notified, AskedAssignment, Assigned, InProgress, PrSubmitted] {
        for record in ctx.workflow.get_by_status(status).await? {
            println!("{:?}  {}", record.status, record.issue_url);
            shown += 1;
        }
    }
    println!("{shown} active records");
    Ok(())
}
