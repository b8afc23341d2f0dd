//! `digest`: emails (or, without `--send-email`, just prints) a rollup of
//! every recommended candidate from the current discovery pass, grounded on
//! `Notifier::send_digest`'s `(Candidate, ScoreBreakdown)` pair list.

use scout_core::config::Config;
use scout_daemon::{Scheduler, ShutdownSignal};

pub async fn run(config: Config, send_email: bool) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let scheduler = Scheduler::new();
    let shutdown = ShutdownSignal::new();
    let discovered = scheduler.discover_sorted(&ctx, &shutdown).await;

    let digest_items: Vec<_> = discovered
        .into_iter()
        .filter(|(_, _, breakdown)| breakdown.recommended)
        .map(|(_, candidate, breakdown)| (candidate, breakdown))
        .collect();

    if digest_items.is_empty() {
        println!("no recommended candidates today, digest not sent");
        return Ok(());
    }

    for (candidate, breakdown) in &digest_items {
        println!("{:.2} ({})  {}  {}", breakdown.total, breakdown.grade, candidate.issue.title, candidate.issue.url);
    }
    println!("{} items in today's digest", digest_items.len());

    if send_email {
        ctx.notifier.send_digest(&digest_items)?;
        println!("digest emailed");
    }

    Ok(())
}
