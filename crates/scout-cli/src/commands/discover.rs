//! `find`/`bugs`/`features`/`good-first`/`actionable`/`confirmed`/`search`:
//! every read-only listing verb shares one discovery pass over
//! `Scheduler::discover_sorted` so they can never drift from the order
//! `start` would dispatch in.

use scout_core::config::Config;
use scout_core::types::QualifiedType;
use scout_daemon::{Scheduler, ShutdownSignal};

use crate::render::candidate_line;

#[derive(Clone, Copy)]
pub enum Filter {
    All,
    Bugs,
    Features,
    GoodFirst,
    Actionable,
    Confirmed,
}

pub async fn run(config: Config, filter: Filter) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let scheduler = Scheduler::new();
    let shutdown = ShutdownSignal::new();
    let discovered = scheduler.discover_sorted(&ctx, &shutdown).await;

    let mut shown = 0usize;
    for (repo, candidate, breakdown) in &discovered {
        if !matches_filter(filter, candidate, breakdown) {
            continue;
        }
        candidate_line(&repo.full_name(), candidate, breakdown);
        shown += 1;
    }

    println!("{shown} of {} candidates shown", discovered.len());
    Ok(())
}

fn matches_filter(filter: Filter, candidate: &scout_core::types::Candidate, breakdown: &scout_core::types::ScoreBreakdown) -> bool {
    match filter {
        Filter::All => true,
        Filter::Bugs => candidate.qualified_type == QualifiedType::Bug,
        Filter::Features => matches!(candidate.qualified_type, QualifiedType::Feature | QualifiedType::Enhancement),
        Filter::GoodFirst => candidate.has_good_first,
        Filter::Actionable => breakdown.recommended,
        Filter::Confirmed => candidate.has_confirmed,
    }
}

/// Full-text search across titles and bodies of every qualifying candidate.
/// Case-insensitive substring match, same as a contributor eyeballing
/// `find`'s output for a keyword.
pub async fn search(config: Config, query: &str) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let scheduler = Scheduler::new();
    let shutdown = ShutdownSignal::new();
    let discovered = scheduler.discover_sorted(&ctx, &shutdown).await;
    let needle = query.to_ascii_lowercase();

    let mut shown = 0usize;
    for (repo, candidate, breakdown) in &discovered {
        let haystack = format!(
            "{} {}",
            candidate.issue.title.to_ascii_lowercase(),
            candidate.issue.body.as_deref().unwrap_or("").to_ascii_lowercase()
        );
        if !haystack.contains(&needle) {
            continue;
        }
        candidate_line(&repo.full_name(), candidate, breakdown);
        shown += 1;
    }

    println!("{shown} candidates match \"{query}\"");
    Ok(())
}
