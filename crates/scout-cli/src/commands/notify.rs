//! `notify`: runs one discovery pass and sends a notification for every
//! recommended candidate that clears the budget, without posting any
//! comments (comments are only ever sent from `start`'s full cycle). The
//! `--email`/`--local`/`--no-local` flags override which transport is used
//! regardless of `budget.notify_email_min_score`; `--score-min` raises the
//! floor a candidate must clear before it's considered at all.

use scout_core::config::Config;
use scout_core::types::{Action, ActionKind, ActionOutcome};
use scout_daemon::{Dispatcher, Scheduler, ShutdownSignal};

pub struct NotifyFlags {
    pub email: bool,
    pub local: bool,
    pub no_local: bool,
    pub score_min: Option<f64>,
}

pub async fn run(config: Config, flags: NotifyFlags) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let scheduler = Scheduler::new();
    let dispatcher = Dispatcher::new();
    let shutdown = ShutdownSignal::new();
    let discovered = scheduler.discover_sorted(&ctx, &shutdown).await;
    let score_min = flags.score_min.unwrap_or(0.0);

    let mut sent = 0usize;
    let mut skipped = 0usize;

    for (repo, candidate, breakdown) in &discovered {
        if !breakdown.recommended || breakdown.total < score_min {
            continue;
        }
        let project_key = repo.full_name();
        if ctx.limiter.authorize_notify(&project_key).await.is_err() {
            skipped += 1;
            continue;
        }

        let kind = if flags.email {
            ActionKind::NotifyEmail
        } else if flags.local || flags.no_local {
            ActionKind::NotifyLocal
        } else if breakdown.total >= ctx.config.budget.notify_email_min_score {
            ActionKind::NotifyEmail
        } else {
            ActionKind::NotifyLocal
        };
        if flags.no_local && matches!(kind, ActionKind::NotifyLocal) {
            skipped += 1;
            continue;
        }

        let rationale = format!("{} — {} scored {:.2} ({})", project_key, candidate.issue.title, breakdown.total, breakdown.grade);
        let action = Action {
            kind,
            issue_url: candidate.issue.url.clone(),
            project_key: project_key.clone(),
            score: breakdown.total,
            body: None,
            rationale: rationale.clone(),
        };
        match dispatcher.dispatch(&ctx, action, repo).await {
            ActionOutcome::Done => {
                println!("notified: {rationale}");
                sent += 1;
            }
            ActionOutcome::Skipped { reason } => {
                println!("skipped {}: {reason}", candidate.issue.url);
                skipped += 1;
            }
            ActionOutcome::Failed { kind, detail } => {
                println!("failed ({kind:?}) {}: {detail}", candidate.issue.url);
                skipped += 1;
            }
        }
    }

    println!("{sent} sent, {skipped} skipped");
    Ok(())
}
