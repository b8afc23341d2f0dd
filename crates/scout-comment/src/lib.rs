//! The Comment Quality Engine (C7): turns a qualified `Candidate` into a
//! `SmartComment`, or declines to comment at all. Pipeline is
//! `veto -> classify -> extract -> draft -> score -> improve -> record`
//! (spec §4.3). Only the final `record` step touches persistence, and
//! that is left to the caller (scout-daemon) — this crate is otherwise
//! I/O-free, matching scout-scoring's purity contract.

pub mod classify;
pub mod dedupe;
pub mod draft;
pub mod extract;
pub mod quality;
pub mod veto;

use chrono::{DateTime, Utc};
use scout_core::config::CommentConfig;
use scout_core::types::{Candidate, CommentHistoryEntry, SmartComment};

/// Why a candidate did not receive a drafted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    SolutionAlreadyPresent,
    QualityBelowFloor { score_percent: u32 },
}

/// Runs the full pipeline. Returns `Ok(SmartComment)` on success,
/// `Err(DeclineReason)` when the veto or quality-floor gate rejects the
/// draft. The single "improve" retry (spec step 5) runs automatically
/// before the quality floor is checked. Overlap with `history` is folded
/// into the quality rubric as a `-0.4` adjustment (spec §4.3 step 6)
/// rather than a separate hard veto, so a strong enough draft can still
/// clear the floor despite the overlap.
pub fn generate_comment(
    candidate: &Candidate,
    history: &[CommentHistoryEntry],
    config: &CommentConfig,
    now: DateTime<Utc>,
) -> Result<SmartComment, DeclineReason> {
    if veto::solution_already_present(&candidate.issue) {
        return Err(DeclineReason::SolutionAlreadyPresent);
    }

    let issue_type = classify::classify(&candidate.issue);
    let ctx = extract::extract(candidate.issue.body.as_deref());
    let mut body = draft::draft(issue_type, candidate, &ctx);

    let mut result = quality::score_comment(&body, &ctx, history);
    if result.score < config.min_quality_score {
        body = quality::improve(&body, candidate.issue.number);
        result = quality::score_comment(&body, &ctx, history);
    }

    if result.score < config.min_quality_score {
        return Err(DeclineReason::QualityBelowFloor { score_percent: (result.score * 100.0) as u32 });
    }

    Ok(SmartComment {
        body,
        score: result.score,
        issue_type,
        quality_flags: result.flags,
        warnings: result.warnings,
        generated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use scout_core::types::{IssuePriority, IssueState, QualifiedType, Repo};
    use std::collections::BTreeSet;

    fn config() -> CommentConfig {
        CommentConfig { min_quality_score: 0.6, max_history_per_issue: 5 }
    }

    fn candidate(body: Option<&str>, labels: &[&str]) -> Candidate {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        scout_core::types::Candidate {
            issue: scout_core::types::Issue {
                id: 1,
                number: 77,
                url: "https://example.test/o/r/issues/77".into(),
                title: "App crashes on startup".into(),
                body: body.map(String::from),
                state: IssueState::Open,
                labels: labels.iter().map(|s| s.to_string()).collect(),
                comments: 0,
                assignees: BTreeSet::new(),
                linked_prs: BTreeSet::new(),
                created_at: now,
                updated_at: now,
                is_pull_request: false,
            },
            repo: Repo {
                owner: "o".into(),
                name: "r".into(),
                category: "c".into(),
                priority: 0,
                min_stars: 0,
                language: None,
                enabled: true,
                label_include: vec![],
                label_exclude: vec![],
            },
            qualified_type: QualifiedType::Bug,
            has_confirmed: true,
            has_good_first: false,
            has_assignee: false,
            has_linked_pr: false,
            has_clear_repro: true,
            has_acceptance_criteria: false,
            priority: Some(IssuePriority::P2),
            age: Duration::hours(5),
        }
    }

    #[test]
    fn vetoes_when_linked_pr_exists() {
        let mut c = candidate(None, &["bug"]);
        c.issue.linked_prs.insert("o/r#1".to_string());
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let result = generate_comment(&c, &[], &config(), now);
        assert_eq!(result.unwrap_err(), DeclineReason::SolutionAlreadyPresent);
    }

    #[test]
    fn produces_comment_for_well_described_bug() {
        let body = "Steps to reproduce\n1. open app\n2. it crashes\n\n```\npanic: nil pointer\n```\nEnvironment: linux, v1.2.3";
        let c = candidate(Some(body), &["bug", "confirmed"]);
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let comment = generate_comment(&c, &[], &config(), now).expect("should produce a comment");
        assert!(comment.score >= config().min_quality_score);
    }

    #[test]
    fn near_duplicate_history_lowers_score_but_does_not_always_veto() {
        // A plain repro section with no code fence or question mark so the
        // draft scores exactly 1.0, making the -0.4 overlap penalty land on
        // an unclamped baseline.
        let body = "Steps to reproduce\n1. open app\n2. it crashes and does not recover.";
        let c = candidate(Some(body), &["bug", "confirmed"]);
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let first = generate_comment(&c, &[], &config(), now).expect("first draft should succeed");
        let history = vec![CommentHistoryEntry {
            issue_url: c.issue.url.clone(),
            repo_key: c.repo.full_name(),
            body: first.body.clone(),
            posted_at: now,
        }];
        let repeated = generate_comment(&c, &history, &config(), now).expect("still clears the quality floor");
        assert!(repeated.score <= first.score - 0.39, "overlap with history should cost roughly -0.4");
        assert!(repeated.quality_flags.contains(&"near-duplicate-of-history".to_string()));
    }
}
