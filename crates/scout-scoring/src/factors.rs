//! Per-factor normalization curves (spec §4.1). Each function returns a
//! value in `[0, 1]`; the caller (scoring.rs) applies the configured
//! weight. Curves are monotone in the direction spec §8 property 3 and
//! testable-properties require — verified by the unit tests below.

use chrono::{DateTime, Duration, Utc};
use scout_core::types::{Issue, RepoMeta};

/// Stars: piecewise monotone non-decreasing (spec §4.1, "enhanced" curve —
/// see Open Question 1: this spec adopts the enhanced thresholds, not the
/// baseline scorer's coarser ones).
pub fn stars_factor(stars: u64) -> f64 {
    if stars >= 100_000 {
        1.0
    } else if stars >= 50_000 {
        0.9
    } else if stars >= 10_000 {
        0.8
    } else if stars >= 5_000 {
        0.7
    } else if stars >= 1_000 {
        0.6
    } else {
        0.4
    }
}

/// Comments: monotone non-increasing. Fewer comments implies less
/// competition for the issue.
pub fn comments_factor(comments: u64) -> f64 {
    if comments <= 1 {
        0.7
    } else if comments <= 3 {
        0.5
    } else if comments <= 7 {
        0.3
    } else {
        0.1
    }
}

/// Recency: monotone non-increasing in issue age.
pub fn recency_factor(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = now.signed_duration_since(created_at);
    if age <= Duration::hours(24) {
        1.0
    } else if age <= Duration::hours(72) {
        0.8
    } else if age <= Duration::days(7) {
        0.6
    } else if age <= Duration::days(30) {
        0.4
    } else {
        0.2
    }
}

const CNCF_PROJECTS: &[&str] = &[
    "kubernetes", "etcd", "envoy", "prometheus", "containerd", "helm", "istio", "linkerd", "argo",
    "cni", "rook", "vitess", "cortex", "thanos", "fluentd", "jaeger", "opentelemetry", "cilium",
    "falco", "flux2", "harbor", "kyverno", "longhorn", "spiffe", "spire", "open-policy-agent",
];

/// Labels: set-membership bonuses (spec §4.1). The CNCF-project bonus is
/// kept separate from the per-label sum and applied as a flat post-weight
/// bonus (see DESIGN.md) since it keys on the repo name, not a label.
pub fn labels_factor(labels: &std::collections::BTreeSet<String>) -> f64 {
    let lower: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    let has = |needle: &str| lower.iter().any(|l| l.contains(needle));

    let mut total = 0.0;
    if has("good first issue") {
        total += 0.30;
    }
    if has("confirmed") || has("triage/accepted") || has("approved") {
        total += 0.35;
    }
    if has("help wanted") {
        total += 0.10;
    }
    if has("beginner") || has("starter") || has("easy") {
        total += 0.15;
    }
    if has("documentation") || has("docs") {
        total += 0.15;
    }
    total.clamp(0.0, 1.0)
}

/// Flat CNCF-project bonus, applied post-weight (outside the `labels`
/// weighted factor) per DESIGN.md's resolution of the spec's label-bullet
/// wording.
pub fn cncf_bonus(repo_name: &str) -> f64 {
    let lower = repo_name.to_lowercase();
    if CNCF_PROJECTS.iter().any(|p| lower == *p || lower.contains(p)) {
        0.10
    } else {
        0.0
    }
}

const EASY_MARKERS: &[&str] = &["good first issue", "beginner", "starter", "easy", "trivial", "low-hanging"];
const HARD_MARKERS: &[&str] = &["hard", "complex", "difficult", "advanced", "epic", "needs-design"];

/// Difficulty: proxy from labels and body keywords (spec §4.1). Easy
/// signals score higher — this factor measures "approachability", not
/// technical severity.
pub fn difficulty_factor(labels: &std::collections::BTreeSet<String>, body: Option<&str>) -> f64 {
    let lower_labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    let label_has = |needle: &str| lower_labels.iter().any(|l| l.contains(needle));

    if EASY_MARKERS.iter().any(|m| label_has(m)) {
        return 0.9;
    }
    if HARD_MARKERS.iter().any(|m| label_has(m)) {
        return 0.3;
    }

    let body_lower = body.unwrap_or_default().to_lowercase();
    if EASY_MARKERS.iter().any(|m| body_lower.contains(m)) {
        return 0.7;
    }
    if HARD_MARKERS.iter().any(|m| body_lower.contains(m)) {
        return 0.35;
    }
    0.5
}

const REPRO_MARKERS: &[&str] = &["steps to reproduce", "repro steps", "to reproduce", "reproduction"];
const ACCEPTANCE_MARKERS: &[&str] = &["acceptance criteria", "expected behavior", "definition of done"];
const SCOPE_MARKERS: &[&str] = &["file:", "func:", "package:", "module:"];

/// Description quality: length thresholds plus presence of structural
/// markers (repro steps, acceptance criteria, code fences, scope markers).
pub fn description_factor(body: Option<&str>) -> f64 {
    let body = body.unwrap_or_default();
    let len = body.trim().len();

    let mut score: f64 = if len == 0 {
        0.1
    } else if len < 50 {
        0.25
    } else if len < 200 {
        0.5
    } else if len < 1000 {
        0.7
    } else {
        0.6
    };

    let lower = body.to_lowercase();
    if REPRO_MARKERS.iter().any(|m| lower.contains(m)) {
        score += 0.15;
    }
    if ACCEPTANCE_MARKERS.iter().any(|m| lower.contains(m)) {
        score += 0.15;
    }
    if body.contains("```") {
        score += 0.10;
    }
    if SCOPE_MARKERS.iter().any(|m| lower.contains(m)) {
        score += 0.10;
    }
    score.clamp(0.0, 1.0)
}

/// Activity: recency of the repo's last commit plus monthly commit/PR
/// volume. Missing input (no `RepoMeta`, or fields unset) degrades to the
/// neutral 0.5 per spec §4.1 failure semantics, never an error.
pub fn activity_factor(meta: Option<&RepoMeta>, now: DateTime<Utc>) -> f64 {
    let Some(meta) = meta else { return 0.5 };

    let commit_recency = match meta.last_commit_at {
        Some(at) => {
            let age = now.signed_duration_since(at);
            if age <= Duration::days(7) {
                1.0
            } else if age <= Duration::days(30) {
                0.7
            } else if age <= Duration::days(90) {
                0.4
            } else {
                0.1
            }
        }
        None => 0.5,
    };

    let volume = match (meta.monthly_commits, meta.monthly_prs) {
        (Some(c), Some(p)) => {
            let total = c + p;
            if total >= 50 {
                1.0
            } else if total >= 10 {
                0.6
            } else {
                0.3
            }
        }
        _ => 0.5,
    };

    ((commit_recency + volume) / 2.0).clamp(0.0, 1.0)
}

/// Maintainer responsiveness: no direct proxy is currently fetched by the
/// forge gateway (spec §3 `RepoMeta` carries no response-time field), so
/// this factor is always the neutral midpoint per §4.1 failure semantics.
pub fn maintainer_factor(_issue: &Issue, _meta: Option<&RepoMeta>) -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stars_factor_is_monotone_non_decreasing() {
        let points = [0, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 1_000_000];
        let mut prev = 0.0;
        for p in points {
            let v = stars_factor(p);
            assert!(v >= prev, "stars_factor({p}) = {v} should be >= prev {prev}");
            prev = v;
        }
    }

    #[test]
    fn comments_factor_is_monotone_non_increasing() {
        let points = [0, 1, 2, 3, 4, 7, 8, 100];
        let mut prev = 1.0;
        for p in points {
            let v = comments_factor(p);
            assert!(v <= prev, "comments_factor({p}) = {v} should be <= prev {prev}");
            prev = v;
        }
    }

    #[test]
    fn recency_factor_decays_with_age() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        let fresh = recency_factor(now - Duration::hours(1), now);
        let stale = recency_factor(now - Duration::days(60), now);
        assert!(fresh > stale);
    }

    #[test]
    fn labels_factor_sums_bonuses_and_clamps() {
        let mut labels = std::collections::BTreeSet::new();
        labels.insert("good first issue".to_string());
        labels.insert("confirmed".to_string());
        labels.insert("help wanted".to_string());
        labels.insert("documentation".to_string());
        let v = labels_factor(&labels);
        assert!((v - 1.0).abs() < 1e-9, "expected clamp to 1.0, got {v}");
    }

    #[test]
    fn cncf_bonus_matches_known_project() {
        assert_eq!(cncf_bonus("kubernetes"), 0.10);
        assert_eq!(cncf_bonus("some-random-repo"), 0.0);
    }

    #[test]
    fn difficulty_prefers_easy_labels() {
        let mut labels = std::collections::BTreeSet::new();
        labels.insert("good first issue".to_string());
        assert_eq!(difficulty_factor(&labels, None), 0.9);
    }

    #[test]
    fn description_factor_rewards_structure() {
        let plain = description_factor(Some("short"));
        let rich = description_factor(Some(
            "Steps to reproduce:\n1. do X\n2. do Y\n\nAcceptance criteria: must not crash.\n```rust\nfn f() {}\n```\nfile: src/lib.rs",
        ));
        assert!(rich > plain);
    }
}
