//! Contribution Trust Policy (C9): derives a `TrustLevel` from a
//! contributor's history in a given repo, and gates which actions that
//! level is allowed to take (spec §4.5 Design Note on trust, §8 S6
//! scenario — first-time contributors must comment before they may ask
//! for an assignment).
//!
//! This crate never touches persistence or the forge; it is handed a
//! `TrustRecord` (already loaded by the caller from `scout_core::Store`)
//! and answers pure questions about it.

use chrono::Duration;
use scout_core::config::TrustConfig;
use scout_core::types::{ActionKind, TrustLevel, TrustRecord};

/// Recomputes `trust_level` from the record's counters against the
/// configured thresholds (spec §4.5): each tier is satisfied by either a
/// commit-count floor or a total-activity floor, evaluated from the top
/// down so a contributor who clears a higher tier is never shown a lower
/// one.
pub fn recompute(record: &TrustRecord, config: &TrustConfig) -> TrustLevel {
    let total = record.total();

    if record.merged_commits >= config.maintainer_commits || total >= config.maintainer_total {
        TrustLevel::Maintainer
    } else if record.merged_commits >= config.regular_commits || total >= config.regular_total {
        TrustLevel::Regular
    } else if record.merged_commits >= 1 || record.prs >= 1 || total >= config.contributor_total {
        TrustLevel::Contributor
    } else if total >= config.new_total {
        TrustLevel::New
    } else {
        TrustLevel::None
    }
}

/// Why an action was denied by the trust policy. Composed with the
/// anti-spam budget via logical AND (scout-daemon ANDs this with
/// `scout_antispam::authorize`) — either gate can block an action, spec
/// §4.4 Design Note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustDenial {
    /// A first-time contributor (`New`/`None`) tried to request an
    /// assignment before ever commenting on the repo.
    ContributeFirst,
    /// The issue is too fresh for this trust level to act on yet.
    IssueTooFresh { min_age_hours: i64 },
    /// This trust tier's own weekly comment cap (spec §4.6) is already
    /// spent, independent of whatever headroom C8's weekly cap has left.
    WeeklyCommentCapReached { cap: u32 },
}

/// This trust level's weekly comment cap (spec §4.6 per-tier table).
pub fn weekly_comment_cap(trust: TrustLevel, config: &TrustConfig) -> u32 {
    match trust {
        TrustLevel::None => config.none_comments_per_week,
        TrustLevel::New => config.new_comments_per_week,
        TrustLevel::Contributor => config.contributor_comments_per_week,
        TrustLevel::Regular => config.regular_comments_per_week,
        TrustLevel::Maintainer => config.maintainer_comments_per_week,
    }
}

/// Minimum issue age this trust level must wait out before acting, so
/// unfamiliar contributors don't race maintainers to freshly filed
/// issues. Concrete per-tier floors from spec §4.6: new contributors wait
/// 48h, contributors wait 24h, regulars and maintainers have no floor.
/// `None` trust has no action it can take anyway (its weekly cap is 0), so
/// it is held to the same 48h floor as `New` rather than a spec value of
/// its own.
fn min_issue_age(trust: TrustLevel) -> Duration {
    match trust {
        TrustLevel::Maintainer | TrustLevel::Regular => Duration::zero(),
        TrustLevel::Contributor => Duration::hours(24),
        TrustLevel::New | TrustLevel::None => Duration::hours(48),
    }
}

/// Gates an action by trust level. Budget/cooldown limits live in
/// `scout-antispam`; this only answers "is this contributor even allowed
/// to try", independent of how many times they've already acted today.
/// `comments_this_week` is the caller's own tally (from `scout_core::Store`)
/// against which the per-tier weekly cap in `config` is checked — composed
/// by logical AND with whatever headroom C8's own weekly cap has left.
pub fn authorize(
    trust: TrustLevel,
    action: ActionKind,
    issue_age: Duration,
    comments_this_week: u32,
    config: &TrustConfig,
) -> Result<(), TrustDenial> {
    if matches!(action, ActionKind::AskAssignment) && matches!(trust, TrustLevel::New | TrustLevel::None) {
        return Err(TrustDenial::ContributeFirst);
    }

    let floor = min_issue_age(trust);
    if issue_age < floor {
        return Err(TrustDenial::IssueTooFresh { min_age_hours: floor.num_hours() });
    }

    if matches!(action, ActionKind::Comment) {
        let cap = weekly_comment_cap(trust, config);
        if comments_this_week >= cap {
            return Err(TrustDenial::WeeklyCommentCapReached { cap });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrustConfig {
        TrustConfig {
            maintainer_commits: 10,
            maintainer_total: 20,
            regular_commits: 3,
            regular_total: 10,
            contributor_total: 3,
            new_total: 1,
            none_comments_per_week: 0,
            new_comments_per_week: 1,
            contributor_comments_per_week: 2,
            regular_comments_per_week: 5,
            maintainer_comments_per_week: 10,
        }
    }

    fn record(merged_commits: u32, prs: u32, comments: u32) -> TrustRecord {
        TrustRecord {
            repo_key: "o/r".into(),
            merged_commits,
            prs,
            comments,
            last_activity: None,
            trust_level: TrustLevel::None,
        }
    }

    #[test]
    fn maintainer_by_commit_floor() {
        assert_eq!(recompute(&record(10, 0, 0), &config()), TrustLevel::Maintainer);
    }

    #[test]
    fn maintainer_by_total_floor() {
        assert_eq!(recompute(&record(0, 5, 15), &config()), TrustLevel::Maintainer);
    }

    #[test]
    fn regular_by_commit_floor() {
        assert_eq!(recompute(&record(3, 0, 0), &config()), TrustLevel::Regular);
    }

    #[test]
    fn contributor_by_single_pr() {
        assert_eq!(recompute(&record(0, 1, 0), &config()), TrustLevel::Contributor);
    }

    #[test]
    fn new_from_any_activity() {
        assert_eq!(recompute(&record(0, 0, 1), &config()), TrustLevel::New);
    }

    #[test]
    fn none_when_untouched() {
        assert_eq!(recompute(&record(0, 0, 0), &config()), TrustLevel::None);
    }

    #[test]
    fn first_timer_must_comment_before_asking_for_assignment() {
        let result = authorize(TrustLevel::New, ActionKind::AskAssignment, Duration::hours(48), 0, &config());
        assert_eq!(result.unwrap_err(), TrustDenial::ContributeFirst);
    }

    #[test]
    fn maintainer_can_ask_for_assignment_immediately() {
        assert!(authorize(TrustLevel::Maintainer, ActionKind::AskAssignment, Duration::zero(), 0, &config()).is_ok());
    }

    #[test]
    fn none_trust_must_wait_out_issue_freshness_for_comments() {
        let result = authorize(TrustLevel::None, ActionKind::Comment, Duration::hours(1), 0, &config());
        assert_eq!(result.unwrap_err(), TrustDenial::IssueTooFresh { min_age_hours: 48 });
    }

    #[test]
    fn none_trust_never_gets_a_weekly_comment_allowance() {
        let result = authorize(TrustLevel::None, ActionKind::Comment, Duration::hours(48), 0, &config());
        assert_eq!(result.unwrap_err(), TrustDenial::WeeklyCommentCapReached { cap: 0 });
    }

    #[test]
    fn new_trust_requires_48h_min_issue_age() {
        let result = authorize(TrustLevel::New, ActionKind::Comment, Duration::hours(47), 0, &config());
        assert_eq!(result.unwrap_err(), TrustDenial::IssueTooFresh { min_age_hours: 48 });
        assert!(authorize(TrustLevel::New, ActionKind::Comment, Duration::hours(48), 0, &config()).is_ok());
    }

    #[test]
    fn contributor_trust_requires_24h_min_issue_age() {
        let result = authorize(TrustLevel::Contributor, ActionKind::Comment, Duration::hours(23), 0, &config());
        assert_eq!(result.unwrap_err(), TrustDenial::IssueTooFresh { min_age_hours: 24 });
        assert!(authorize(TrustLevel::Contributor, ActionKind::Comment, Duration::hours(24), 1, &config()).is_ok());
    }

    #[test]
    fn contributor_weekly_comment_cap_is_enforced() {
        let result = authorize(TrustLevel::Contributor, ActionKind::Comment, Duration::hours(48), 2, &config());
        assert_eq!(result.unwrap_err(), TrustDenial::WeeklyCommentCapReached { cap: 2 });
        assert!(authorize(TrustLevel::Contributor, ActionKind::Comment, Duration::hours(48), 1, &config()).is_ok());
    }
}
