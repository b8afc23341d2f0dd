//! The Scoring Engine (C5): combines the per-factor curves in
//! `factors.rs` into a single weighted total, applies bonuses/penalties,
//! and assigns a letter grade (spec §4.1).

use chrono::{DateTime, Utc};
use regex::Regex;
use scout_core::config::ScoringConfig;
use scout_core::types::{Grade, Issue, Repo, RepoMeta, ScoreBreakdown, ScoreFactors};
use std::sync::OnceLock;

use crate::factors;

const NEEDS_TRIAGE_MARKERS: &[&str] = &["needs-triage", "needs triage"];
const BLOCKED_MARKERS: &[&str] = &["blocked", "waiting-for-info", "waiting for info"];
const DEAD_END_MARKERS: &[&str] = &["wontfix", "invalid", "duplicate"];
const NEEDS_INFO_MARKERS: &[&str] = &["needs-info", "needs info"];

/// Ecosystem terms that, paired with a bare provider mention, mark an issue
/// as tied to one vendor's managed offering rather than the project itself
/// (spec §4.1 penalty table: "cloud-provider keywords (`gcp|aws|azure` +
/// ecosystem terms)").
const CLOUD_ECOSYSTEM_TERMS: &[&str] = &[
    "eks", "ec2", "s3", "lambda", "cloudformation", "fargate", "iam", "vpc", "cloudwatch", "gke",
    "app engine", "cloud run", "bigquery", "aks", "azure functions", "azure devops",
    "kubernetes engine", "blob storage", "cloudfront", "route53", "rds",
];

fn cloud_provider_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(gcp|aws|azure)\b").unwrap())
}

/// Cloud-provider penalty per spec §4.1/§8 S3: matched against issue
/// title+body text, not labels, since a repo's own label taxonomy isn't a
/// reliable signal for "this bug is specific to one vendor's service".
fn has_cloud_provider_penalty(issue: &Issue) -> bool {
    let text = format!("{} {}", issue.title, issue.body.as_deref().unwrap_or_default());
    if !cloud_provider_re().is_match(&text) {
        return false;
    }
    let lower = text.to_lowercase();
    CLOUD_ECOSYSTEM_TERMS.iter().any(|t| lower.contains(t))
}

/// Sum of every triggered penalty (spec §4.1 penalty table). Stored as a
/// single positive magnitude in `ScoreFactors.penalty` and subtracted once
/// in `score()`.
fn penalty_for(issue: &Issue) -> f64 {
    let lower: Vec<String> = issue.labels.iter().map(|l| l.to_lowercase()).collect();
    let has = |markers: &[&str]| lower.iter().any(|l| markers.iter().any(|m| l.contains(m)));

    let mut total = 0.0;
    if has_cloud_provider_penalty(issue) {
        total += 0.50;
    }
    if has(NEEDS_TRIAGE_MARKERS) {
        total += 0.15;
    }
    if has(BLOCKED_MARKERS) {
        total += 0.20;
    }
    if has(DEAD_END_MARKERS) {
        total += 0.50;
    }
    if has(NEEDS_INFO_MARKERS) {
        total += 0.15;
    }
    if issue.has_linked_pr() {
        total += 0.30;
    }
    if issue.has_assignee() {
        total += 0.25;
    }
    total
}

/// Pure, deterministic scoring given a fixed weights config (spec §4.1
/// contract). `now` is caller-supplied rather than read from the system
/// clock so that callers can reproduce a score exactly (Design Note, §9).
pub fn score(
    issue: &Issue,
    repo: &Repo,
    repo_meta: Option<&RepoMeta>,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    let stars = repo_meta.map(|m| m.stars).unwrap_or(0);

    let factors = ScoreFactors {
        stars: factors::stars_factor(stars),
        comments: factors::comments_factor(issue.comments),
        recency: factors::recency_factor(issue.created_at, now),
        labels: factors::labels_factor(&issue.labels),
        difficulty: factors::difficulty_factor(&issue.labels, issue.body.as_deref()),
        description: factors::description_factor(issue.body.as_deref()),
        activity: factors::activity_factor(repo_meta, now),
        maintainer: factors::maintainer_factor(issue, repo_meta),
        bonus: factors::cncf_bonus(&repo.name),
        penalty: penalty_for(issue),
    };

    let weighted = config.weight_stars * factors.stars
        + config.weight_comments * factors.comments
        + config.weight_recency * factors.recency
        + config.weight_labels * factors.labels
        + config.weight_difficulty * factors.difficulty
        + config.weight_description * factors.description
        + config.weight_activity * factors.activity
        + config.weight_maintainer * factors.maintainer;

    let total = (weighted + factors.bonus - factors.penalty).clamp(0.0, config.max_score);
    let grade = grade_for(total);
    let recommended = total >= 0.75;

    ScoreBreakdown { factors, total, grade, recommended }
}

fn grade_for(total: f64) -> Grade {
    if total >= 0.90 {
        Grade::APlus
    } else if total >= 0.85 {
        Grade::A
    } else if total >= 0.80 {
        Grade::BPlus
    } else if total >= 0.75 {
        Grade::B
    } else if total >= 0.70 {
        Grade::C
    } else if total >= 0.60 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Deterministic ordering for the collector/dispatcher's candidate list:
/// highest score first, then higher repo stars, then newer issues, then a
/// lexicographic `(owner, name, number)` tie-break so that two runs over
/// an unchanged dataset always produce the same order (spec §8 testable
/// property: "ranking is a total order").
#[allow(clippy::too_many_arguments)]
pub fn compare_candidates(
    a_score: f64,
    a_stars: u64,
    a_repo: &Repo,
    a_created_at: DateTime<Utc>,
    a_number: u64,
    b_score: f64,
    b_stars: u64,
    b_repo: &Repo,
    b_created_at: DateTime<Utc>,
    b_number: u64,
) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b_stars.cmp(&a_stars))
        .then_with(|| b_created_at.cmp(&a_created_at))
        .then_with(|| a_repo.owner.cmp(&b_repo.owner))
        .then_with(|| a_repo.name.cmp(&b_repo.name))
        .then_with(|| a_number.cmp(&b_number))
}
