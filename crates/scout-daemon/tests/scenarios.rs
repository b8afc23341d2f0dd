//! End-to-end scenario coverage for spec.md §8's S1–S6. Drives the real
//! qualify → score → workflow → budget → trust → comment-draft chain the
//! way `pipeline::authorize_and_dispatch` composes it, but calls each
//! component crate directly rather than through `ForgeClient`/`Notifier`:
//! neither has a fake/in-process seam (both wrap a concrete third-party
//! client), so exercising the forge/notifier transport itself is left to
//! their own crates' tests, and this file covers the cross-crate decision
//! logic the scenarios actually describe (qualification, score, budget
//! authorization, trust gating, veto soundness).

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use scout_antispam::{Denial, SmartLimiter};
use scout_core::clock::FixedClock;
use scout_core::config::{BudgetConfig, CommentConfig, QualificationConfig, ScoringConfig, TrustConfig};
use scout_core::persistence::{FileStore, Store};
use scout_core::types::{
    ActionKind, Issue, IssueState, Repo, RepoMeta, TrustLevel, TrustRecord, WorkflowStatus,
};
use scout_workflow::{NewIssueFacts, WorkflowTracker};

fn repo() -> Repo {
    Repo {
        owner: "cncf".into(),
        name: "widget".into(),
        category: "infra".into(),
        priority: 0,
        min_stars: 0,
        language: Some("rust".into()),
        enabled: true,
        label_include: vec![],
        label_exclude: vec![],
    }
}

fn issue(labels: &[&str], body: Option<&str>, created_hours_ago: i64, now: chrono::DateTime<Utc>) -> Issue {
    Issue {
        id: 1,
        number: 101,
        url: "https://github.com/cncf/widget/issues/101".into(),
        title: "Crash on startup".into(),
        body: body.map(String::from),
        state: IssueState::Open,
        labels: labels.iter().map(|s| s.to_string()).collect(),
        comments: 1,
        assignees: BTreeSet::new(),
        linked_prs: BTreeSet::new(),
        created_at: now - ChronoDuration::hours(created_hours_ago),
        updated_at: now,
        is_pull_request: false,
    }
}

async fn store() -> Arc<dyn Store> {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(FileStore::open(dir.path()).unwrap());
    // Intentionally leak the tempdir for the lifetime of the test process;
    // each scenario gets its own isolated directory.
    std::mem::forget(dir);
    store
}

fn budget() -> BudgetConfig {
    BudgetConfig::default()
}

/// S1 — Good issue, budget OK: qualifies as a bug, scores high enough to
/// recommend, the first notification authorizes and a repeat within the
/// cooldown does not (spec §8 S1).
#[tokio::test]
async fn s1_good_issue_budget_ok() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let repo = repo();
    let body = "Steps to reproduce:\n1. launch app\n2. it crashes\n\n```\npanic: nil\n```";
    let i = issue(&["good first issue", "triage/accepted", "bug"], Some(body), 12, now);

    let candidate = scout_scoring::qualify(&i, &repo, &QualificationConfig::default(), now)
        .expect("S1 issue must qualify");
    assert_eq!(candidate.qualified_type, scout_core::types::QualifiedType::Bug);

    let meta = RepoMeta { stars: 50_000, ..Default::default() };
    let breakdown = scout_scoring::score(&i, &repo, Some(&meta), &ScoringConfig::default(), now);
    assert!(breakdown.total >= 0.85, "expected grade >= A, got {:?}", breakdown);
    assert!(breakdown.recommended);

    let clock = Arc::new(FixedClock::new(now));
    let limiter = SmartLimiter::new(store().await, clock.clone(), budget());
    limiter.authorize_notify(&repo.full_name()).await.expect("first notification should be allowed");
    limiter.record_notify(&repo.full_name()).await;

    let workflow = WorkflowTracker::new(store().await);
    workflow
        .get_or_create(
            &i.url,
            NewIssueFacts {
                score: breakdown.total,
                labels: i.labels.clone(),
                has_good_first: candidate.has_good_first,
                has_confirmed: candidate.has_confirmed,
                has_assignee: candidate.has_assignee,
                has_pr: candidate.has_linked_pr,
            },
            now,
        )
        .await
        .unwrap();
    let record = workflow.transition(&i.url, WorkflowStatus::Notified, now).await.unwrap();
    assert_eq!(record.status, WorkflowStatus::Notified);

    // Within the same key's bucket the second authorization must be denied
    // (the scenario's "within 24h" cooldown maps to `never_notify_twice`'s
    // week-scoped per-project counter at the default config).
    let second = limiter.authorize_notify(&repo.full_name()).await;
    assert_eq!(second.unwrap_err(), Denial::NeverNotifyTwice);
}

/// S2 — Linked PR veto: qualification still succeeds and the issue still
/// scores (penalized), but the comment engine refuses to draft because a
/// PR is already linked (spec §8 S2, §4.3 step 2).
#[tokio::test]
async fn s2_linked_pr_veto() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let repo = repo();
    let body = "Steps to reproduce:\n1. launch app\n2. it crashes\n\n```\npanic: nil\n```";
    let mut i = issue(&["good first issue", "triage/accepted", "bug"], Some(body), 12, now);
    i.linked_prs.insert(format!("{}#9", repo.full_name()));

    let candidate =
        scout_scoring::qualify(&i, &repo, &QualificationConfig::default(), now).expect("still qualifies");
    assert!(candidate.has_linked_pr);

    let meta = RepoMeta { stars: 50_000, ..Default::default() };
    let penalized = scout_scoring::score(&i, &repo, Some(&meta), &ScoringConfig::default(), now);

    let unlinked = {
        let mut clean = i.clone();
        clean.linked_prs.clear();
        scout_scoring::score(&clean, &repo, Some(&meta), &ScoringConfig::default(), now)
    };
    assert!(penalized.total < unlinked.total, "linked-PR penalty must lower the score");

    let decline = scout_comment::generate_comment(&candidate, &[], &CommentConfig::default(), now);
    assert_eq!(decline.unwrap_err(), scout_comment::DeclineReason::SolutionAlreadyPresent);

    // Notification is independent of the comment veto and still allowed.
    let clock = Arc::new(FixedClock::new(now));
    let limiter = SmartLimiter::new(store().await, clock, budget());
    limiter.authorize_notify(&repo.full_name()).await.expect("notify should still be allowed");
}

/// S3 — Cloud penalty: an issue whose title names a specific cloud
/// vendor's managed service is penalized heavily enough to fall out of
/// comment range even though it has a qualifying label (spec §8 S3). The
/// penalty is matched against title/body text (`gcp|aws|azure` + an
/// ecosystem term), not a label, so the S3 input is used exactly as
/// given: only the "bug" label, no injected cloud label.
#[tokio::test]
async fn s3_cloud_penalty_suppresses_comment_eligibility() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let repo = repo();
    let mut i = issue(&["bug"], None, 12, now);
    i.title = "AWS EKS provider crash".into();

    let meta = RepoMeta { stars: 30_000, ..Default::default() };
    let breakdown = scout_scoring::score(&i, &repo, Some(&meta), &ScoringConfig::default(), now);
    assert!(breakdown.total < 0.70, "cloud penalty should drop the score below the comment floor, got {}", breakdown.total);

    // The S3 input's own weighted total is low enough that subtracting the
    // full -0.50 penalty clamps at the 0.0 floor, which would understate
    // the penalty's magnitude by comparison alone. Re-derive the magnitude
    // against a higher-scoring issue (same title keyword, richer labels)
    // whose pre-penalty total stays comfortably positive either way.
    let mut boosted = issue(&["bug", "confirmed", "good first issue"], Some("Steps to reproduce:\n1. a\n2. b"), 12, now);
    boosted.title = "AWS EKS provider crash".into();
    boosted.comments = 0;
    let boosted_meta = RepoMeta { stars: 100_000, ..Default::default() };
    let boosted_penalized = scout_scoring::score(&boosted, &repo, Some(&boosted_meta), &ScoringConfig::default(), now);

    let mut boosted_clean = boosted.clone();
    boosted_clean.title = "Provider crash on startup".into();
    let boosted_unpenalized = scout_scoring::score(&boosted_clean, &repo, Some(&boosted_meta), &ScoringConfig::default(), now);

    assert!(
        boosted_unpenalized.total - boosted_penalized.total >= 0.49,
        "penalty magnitude should match the spec's -0.50, got {} - {}",
        boosted_unpenalized.total,
        boosted_penalized.total
    );
}

/// S4 — Weekly cap: with 15 comments already recorded this week, a 16th
/// qualifying candidate on a brand-new repo is denied on the weekly cap
/// alone (spec §8 S4).
#[tokio::test]
async fn s4_weekly_comment_cap_denies_new_repo() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(now));
    let store = store().await;
    let limiter = SmartLimiter::new(store.clone(), clock, budget());

    // Spread across the week but outside the last day, so these 15 count
    // toward the weekly cap without also tripping the (much lower) daily
    // cap the authorize call checks first.
    for n in 0..15u32 {
        store
            .record_comment(&scout_core::types::CommentHistoryEntry {
                issue_url: format!("https://example.test/repo-{n}/issues/1"),
                repo_key: format!("owner/repo-{n}"),
                body: "previously posted comment".into(),
                posted_at: now - ChronoDuration::days(3),
            })
            .await
            .unwrap();
    }

    let denial = limiter.authorize_comment("owner/brand-new-repo", 0).await;
    assert_eq!(denial.unwrap_err(), Denial::WeeklyCapReached);

    // Notification is a separate budget and is unaffected by the comment cap.
    limiter.authorize_notify("owner/brand-new-repo").await.expect("notify budget is independent of comments");
}

/// S5 — Repeat-per-repo: two qualifying issues on the same repo in one
/// cycle; once the first comment is recorded, the second is denied by the
/// per-repo daily cap regardless of its own score (spec §8 S5). The
/// higher-scoring issue is the one the scheduler's sort order (§4.1
/// tie-break, `scoring::compare_candidates`) would dispatch first.
#[tokio::test]
async fn s5_repeat_per_repo_denies_the_second_comment() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let repo = repo();
    let clock = Arc::new(FixedClock::new(now));
    let store = store().await;
    let limiter = SmartLimiter::new(store.clone(), clock, budget());

    let high = issue(&["bug", "confirmed"], Some("Steps to reproduce:\n1. a\n2. b"), 6, now);
    let mut low = issue(&["bug"], Some("Steps to reproduce:\n1. a\n2. b"), 6, now);
    low.number = 202;
    low.url = "https://github.com/cncf/widget/issues/202".into();

    let meta = RepoMeta { stars: 10_000, ..Default::default() };
    let ordering = scout_scoring::compare_candidates(
        scout_scoring::score(&high, &repo, Some(&meta), &ScoringConfig::default(), now).total,
        meta.stars,
        &repo,
        high.created_at,
        high.number,
        scout_scoring::score(&low, &repo, Some(&meta), &ScoringConfig::default(), now).total,
        meta.stars,
        &repo,
        low.created_at,
        low.number,
    );
    assert_eq!(ordering, std::cmp::Ordering::Less, "the higher-scoring issue must sort first");

    limiter.authorize_comment(&repo.full_name(), 0).await.expect("first comment on the repo today is allowed");
    store
        .record_comment(&scout_core::types::CommentHistoryEntry {
            issue_url: high.url.clone(),
            repo_key: repo.full_name(),
            body: "drafted comment".into(),
            posted_at: now,
        })
        .await
        .unwrap();

    let second = limiter.authorize_comment(&repo.full_name(), 0).await;
    assert_eq!(second.unwrap_err(), Denial::PerRepoCapReached);
}

/// S6 — Trust gate: a repo with `trust_level = None` denies the comment
/// action regardless of budget headroom, but notification is untouched
/// (spec §8 S6).
#[tokio::test]
async fn s6_trust_gate_blocks_comment_but_not_notification() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let repo = repo();
    let trust_config = TrustConfig::default();
    let mut record = TrustRecord::new(repo.full_name());
    record.trust_level = scout_trust::recompute(&record, &trust_config);
    assert_eq!(record.trust_level, TrustLevel::None);

    let denial = scout_trust::authorize(record.trust_level, ActionKind::Comment, ChronoDuration::hours(12), 0, &trust_config);
    assert!(denial.is_err(), "a None-trust repo must be denied the comment action");

    let clock = Arc::new(FixedClock::new(now));
    let limiter = SmartLimiter::new(store().await, clock, budget());
    limiter.authorize_notify(&repo.full_name()).await.expect("notification is ungated by trust level");
}
