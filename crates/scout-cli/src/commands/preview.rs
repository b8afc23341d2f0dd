//! `preview`: shows what `start` would do for one issue without doing it —
//! its score breakdown and, if a comment would be drafted, the drafted body
//! or the reason it would be declined.

use scout_core::config::Config;
use scout_daemon::{Scheduler, ShutdownSignal};

pub async fn run(config: Config, issue_url: &str) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let scheduler = Scheduler::new();
    let shutdown = ShutdownSignal::new();
    let discovered = scheduler.discover_sorted(&ctx, &shutdown).await;

    let Some((repo, candidate, breakdown)) = discovered.iter().find(|(_, c, _)| c.issue.url == issue_url) else {
        anyhow::bail!("no qualifying candidate found at {issue_url} in the current discovery pass");
    };

    println!("{}#{}  {}", repo.full_name(), candidate.issue.number, candidate.issue.title);
    println!("score: {:.2} ({}), recommended: {}", breakdown.total, breakdown.grade, breakdown.recommended);
    println!("type: {:?}  priority: {:?}  age: {}h", candidate.qualified_type, candidate.priority, candidate.age.num_hours());

    let history = ctx
        .store
        .recent_comments_for_issue(&candidate.issue.url, ctx.config.comment.max_history_per_issue)
        .await
        .unwrap_or_default();

    match scout_comment::generate_comment(candidate, &history, &ctx.config.comment, ctx.now()) {
        Ok(drafted) => {
            println!("\nwould comment (quality {:.2}):\n{}", drafted.score, drafted.body);
        }
        Err(reason) => {
            println!("\nwould not comment: {reason:?}");
        }
    }

    Ok(())
}
