//! Scheduler (C12): the periodic, bounded-concurrency driver over the repo
//! registry (spec §4.8, §5). Generalized from `at_daemon::daemon::Daemon`'s
//! interval-loop-plus-shutdown-watch shape, but fanned out over a registry
//! of repos in batches rather than over a fixed set of named subsystems —
//! this system has one job to repeat, not several background loops to
//! interleave.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use scout_core::types::{ActionKind, ActionOutcome, Candidate, Repo, ScoreBreakdown};
use tokio::task::JoinSet;

use crate::context::RuntimeContext;
use crate::dispatcher::Dispatcher;
use crate::pipeline;
use crate::shutdown::ShutdownSignal;

/// One qualifying candidate plus the repo and star snapshot it was scored
/// with, collected during the read-only discovery half of a cycle.
struct Discovered {
    repo: Repo,
    candidate: Candidate,
    breakdown: ScoreBreakdown,
    stars: u64,
}

/// Summary of one full cycle, consumed by the CLI's `find`/`start` output.
pub struct CycleReport {
    pub repos_scanned: usize,
    pub candidates_found: usize,
    pub outcomes: Vec<(String, ActionKind, ActionOutcome)>,
}

pub struct Scheduler {
    dispatcher: Dispatcher,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { dispatcher: Dispatcher::new() }
    }

    /// Runs exactly one discovery+dispatch cycle. Repos are discovered
    /// concurrently (bounded by `scheduler.concurrent_repos`, batched by
    /// `scheduler.batch_size` with `scheduler.inter_batch_pause_ms` between
    /// batches); the combined candidate list is then sorted by
    /// `ScoreBreakdown.total` descending (with the §4.1 tie-breaks) and
    /// dispatched serially so budget denials fall on the lowest scores
    /// first (spec §4.8 ordering guarantee). Per-repo errors never abort
    /// the cycle (spec §7).
    pub async fn run_cycle(&self, ctx: &RuntimeContext, shutdown: &ShutdownSignal) -> CycleReport {
        let repos = ctx.registry.enabled_repos();
        let mut discovered = self.discover_all(ctx, &repos, shutdown).await;
        sort_discovered(&mut discovered);

        let great_candidate_repo_spread = discovered
            .iter()
            .filter(|d| d.breakdown.total >= ctx.config.budget.great_quality_threshold)
            .map(|d| d.repo.full_name())
            .collect::<std::collections::BTreeSet<_>>()
            .len();

        let candidates_found = discovered.len();
        let mut outcomes = Vec::new();

        for item in &discovered {
            if shutdown.is_cancelled() {
                break;
            }
            let result = pipeline::authorize_and_dispatch(
                ctx,
                &self.dispatcher,
                &item.repo,
                &item.candidate,
                &item.breakdown,
                great_candidate_repo_spread,
            )
            .await;
            for (kind, outcome) in result.outcomes {
                outcomes.push((item.candidate.issue.url.clone(), kind, outcome));
            }
        }

        CycleReport { repos_scanned: repos.len(), candidates_found, outcomes }
    }

    /// Read-only half of a cycle: discovers and scores candidates across
    /// every enabled repo, in the same order `run_cycle` would dispatch
    /// them in, but issues no side-effects. Used by the CLI's read-only
    /// verbs (`find`, `bugs`, `features`, `good-first`, `actionable`,
    /// `confirmed`, `search`, `preview`) so they share the exact discovery
    /// and ranking path the daemon uses rather than a second copy of it.
    pub async fn discover_sorted(
        &self,
        ctx: &RuntimeContext,
        shutdown: &ShutdownSignal,
    ) -> Vec<(Repo, Candidate, ScoreBreakdown)> {
        let repos = ctx.registry.enabled_repos();
        let mut discovered = self.discover_all(ctx, &repos, shutdown).await;
        sort_discovered(&mut discovered);
        discovered.into_iter().map(|d| (d.repo, d.candidate, d.breakdown)).collect()
    }

    /// Discovers candidates across `repos`, `scheduler.batch_size` at a
    /// time, with at most `scheduler.concurrent_repos` repos in flight at
    /// once and a fixed pause between batches (spec §4.8, §5). Each
    /// spawned task owns a clone of the forge client and config rather
    /// than borrowing `ctx`, since `tokio::task::JoinSet` requires
    /// `'static` futures.
    async fn discover_all(&self, ctx: &RuntimeContext, repos: &[Repo], shutdown: &ShutdownSignal) -> Vec<Discovered> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(ctx.config.scheduler.concurrent_repos.max(1)));
        let mut all = Vec::new();

        for batch in repos.chunks(ctx.config.scheduler.batch_size.max(1)) {
            if shutdown.is_cancelled() {
                break;
            }

            let mut set: JoinSet<Vec<Discovered>> = JoinSet::new();
            for repo in batch {
                let forge = ctx.forge.clone();
                let config = ctx.config.clone();
                let now = ctx.now();
                let repo = repo.clone();
                let permit = semaphore.clone();
                set.spawn(async move {
                    let _permit = permit.acquire_owned().await.ok();
                    pipeline::discover_repo(&forge, &config, now, &repo)
                        .await
                        .into_iter()
                        .map(|(candidate, breakdown, stars)| Discovered { repo: repo.clone(), candidate, breakdown, stars })
                        .collect()
                });
            }

            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(items) => all.extend(items),
                    Err(e) => tracing::warn!(error = %e, "repo discovery task panicked"),
                }
            }

            if !shutdown.is_cancelled() {
                tokio::time::sleep(StdDuration::from_millis(ctx.config.scheduler.inter_batch_pause_ms)).await;
            }
        }

        all
    }

    /// Runs cycles until cancelled: one-shot callers drive `run_cycle`
    /// directly, this drives the `start`/daemon run mode, sleeping
    /// `check_interval_secs` between cycles (spec §4.8 two run modes).
    pub async fn run_daemon(&self, ctx: &RuntimeContext, shutdown: &ShutdownSignal) {
        loop {
            let report = self.run_cycle(ctx, shutdown).await;
            tracing::info!(
                repos_scanned = report.repos_scanned,
                candidates_found = report.candidates_found,
                actions = report.outcomes.len(),
                "cycle complete"
            );

            if shutdown.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(StdDuration::from_secs(ctx.config.scheduler.check_interval_secs)) => {}
                _ = shutdown.cancelled() => break,
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the §4.1 tie-break chain (score desc, stars desc, newer first,
/// owner/name/number asc) in place.
fn sort_discovered(discovered: &mut [Discovered]) {
    discovered.sort_by(|a, b| {
        scout_scoring::compare_candidates(
            a.breakdown.total,
            a.stars,
            &a.repo,
            a.candidate.issue.created_at,
            a.candidate.issue.number,
            b.breakdown.total,
            b.stars,
            &b.repo,
            b.candidate.issue.created_at,
            b.candidate.issue.number,
        )
    });
}
