//! The Qualification Filter (C6): decides whether an `Issue` becomes a
//! `Candidate` at all, before scoring ever runs (spec §4.2). Hard rejects
//! short-circuit; everything else requires at least one include-label
//! match.

use chrono::{DateTime, Utc};
use regex::Regex;
use scout_core::config::QualificationConfig;
use scout_core::types::{Candidate, Issue, IssuePriority, IssueState, QualifiedType, Repo};
use std::sync::OnceLock;

fn priority_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"priority[/:-]?\s*(p[0-4]|critical|high|low)").unwrap())
}

/// Runs every hard-reject check, then the include-label gate, then
/// resolves `qualified_type` and `priority`. Returns `None` when the
/// issue does not qualify; callers should log the specific reason at
/// `debug` level (spec §7: rejections are not an error path).
pub fn qualify(issue: &Issue, repo: &Repo, config: &QualificationConfig, now: DateTime<Utc>) -> Option<Candidate> {
    if issue.is_pull_request {
        return None;
    }
    if issue.state != IssueState::Open {
        return None;
    }
    if config.require_no_assignee && issue.has_assignee() {
        return None;
    }

    let lower_labels: Vec<String> = issue.labels.iter().map(|l| l.to_lowercase()).collect();
    let has_label = |needle: &str| lower_labels.iter().any(|l| l.contains(needle));

    if config.exclude_labels.iter().any(|ex| has_label(&ex.to_lowercase())) {
        return None;
    }

    let matched_include = config.include_labels.iter().any(|inc| has_label(&inc.to_lowercase()));
    if !matched_include {
        return None;
    }

    let qualified_type = resolve_qualified_type(&lower_labels);
    if !config.types.iter().any(|t| qualified_type_matches(qualified_type, t)) {
        return None;
    }

    let has_confirmed = has_label("confirmed") || has_label("triage/accepted") || has_label("approved");
    let has_good_first = has_label("good first issue");
    let body_lower = issue.body.as_deref().unwrap_or_default().to_lowercase();
    let has_clear_repro =
        ["steps to reproduce", "repro steps", "to reproduce"].iter().any(|m| body_lower.contains(m));
    let has_acceptance_criteria =
        ["acceptance criteria", "expected behavior", "definition of done"].iter().any(|m| body_lower.contains(m));

    Some(Candidate {
        issue: issue.clone(),
        repo: repo.clone(),
        qualified_type,
        has_confirmed,
        has_good_first,
        has_assignee: issue.has_assignee(),
        has_linked_pr: issue.has_linked_pr(),
        has_clear_repro,
        has_acceptance_criteria,
        priority: extract_priority(&lower_labels),
        age: now.signed_duration_since(issue.created_at),
    })
}

/// Resolution order: bug, then feature, then enhancement, then help-wanted.
/// An issue carrying only "good first issue" (an include-label, but not
/// itself one of the four `QualifiedType` variants) falls back to
/// `HelpWanted` — a judgment call recorded in DESIGN.md since the spec
/// does not name a fifth variant for it.
fn resolve_qualified_type(lower_labels: &[String]) -> QualifiedType {
    let has = |needle: &str| lower_labels.iter().any(|l| l.contains(needle));
    if has("bug") {
        QualifiedType::Bug
    } else if has("feature") {
        QualifiedType::Feature
    } else if has("enhancement") {
        QualifiedType::Enhancement
    } else {
        QualifiedType::HelpWanted
    }
}

fn qualified_type_matches(qt: QualifiedType, configured: &str) -> bool {
    let configured = configured.to_lowercase();
    match qt {
        QualifiedType::Bug => configured == "bug",
        QualifiedType::Feature => configured == "feature",
        QualifiedType::Enhancement => configured == "enhancement",
        QualifiedType::HelpWanted => configured == "help wanted" || configured == "help-wanted",
    }
}

/// Literal reading of the spec's priority-label mapping (spec §4.2): note
/// that `p0`, `p1`, and `critical` all collapse onto `P1` in the source
/// text, with no label ever producing `P0`. Followed verbatim per §9's
/// "do not silently fix apparent typos in ambiguous specification text"
/// guidance; recorded in DESIGN.md.
fn extract_priority(lower_labels: &[String]) -> Option<IssuePriority> {
    let joined = lower_labels.join(" ");
    let caps = priority_regex().captures(&joined)?;
    let token = caps.get(1)?.as_str();
    Some(match token {
        "p0" | "p1" | "critical" => IssuePriority::P1,
        "p2" | "high" => IssuePriority::P2,
        "p3" => IssuePriority::P3,
        "p4" | "low" => IssuePriority::P4,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scout_core::types::IssueState;
    use std::collections::BTreeSet;

    fn config() -> QualificationConfig {
        QualificationConfig {
            min_score: 0.0,
            types: vec![
                "bug".into(),
                "feature".into(),
                "enhancement".into(),
                "help wanted".into(),
            ],
            exclude_labels: vec![
                "question".into(),
                "wontfix".into(),
                "duplicate".into(),
                "invalid".into(),
                "stale".into(),
            ],
            include_labels: vec![
                "bug".into(),
                "feature".into(),
                "enhancement".into(),
                "help wanted".into(),
                "good first issue".into(),
            ],
            min_stars: 0,
            require_no_assignee: true,
        }
    }

    fn repo() -> Repo {
        Repo {
            owner: "o".into(),
            name: "r".into(),
            category: "c".into(),
            priority: 0,
            min_stars: 0,
            language: None,
            enabled: true,
            label_include: vec![],
            label_exclude: vec![],
        }
    }

    fn issue(now: DateTime<Utc>, labels: &[&str]) -> Issue {
        Issue {
            id: 1,
            number: 1,
            url: "https://example.test/o/r/issues/1".into(),
            title: "t".into(),
            body: None,
            state: IssueState::Open,
            labels: labels.iter().map(|s| s.to_string()).collect(),
            comments: 0,
            assignees: BTreeSet::new(),
            linked_prs: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            is_pull_request: false,
        }
    }

    #[test]
    fn pull_request_is_hard_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut i = issue(now, &["bug"]);
        i.is_pull_request = true;
        assert!(qualify(&i, &repo(), &config(), now).is_none());
    }

    #[test]
    fn closed_issue_is_hard_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut i = issue(now, &["bug"]);
        i.state = IssueState::Closed;
        assert!(qualify(&i, &repo(), &config(), now).is_none());
    }

    #[test]
    fn exclude_label_wins_over_include_label() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let i = issue(now, &["bug", "wontfix"]);
        assert!(qualify(&i, &repo(), &config(), now).is_none());
    }

    #[test]
    fn no_include_label_is_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let i = issue(now, &["chore"]);
        assert!(qualify(&i, &repo(), &config(), now).is_none());
    }

    #[test]
    fn good_first_issue_alone_resolves_to_help_wanted() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let i = issue(now, &["good first issue"]);
        let c = qualify(&i, &repo(), &config(), now).unwrap();
        assert_eq!(c.qualified_type, QualifiedType::HelpWanted);
        assert!(c.has_good_first);
    }

    #[test]
    fn assignee_present_is_hard_rejected_when_required() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut i = issue(now, &["bug"]);
        i.assignees.insert("someone".to_string());
        assert!(qualify(&i, &repo(), &config(), now).is_none());
    }

    #[test]
    fn priority_label_maps_per_literal_spec_text() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let p0 = issue(now, &["bug", "priority/p0"]);
        let p2 = issue(now, &["bug", "priority/p2"]);
        let p4 = issue(now, &["bug", "priority/low"]);
        assert_eq!(qualify(&p0, &repo(), &config(), now).unwrap().priority, Some(IssuePriority::P1));
        assert_eq!(qualify(&p2, &repo(), &config(), now).unwrap().priority, Some(IssuePriority::P2));
        assert_eq!(qualify(&p4, &repo(), &config(), now).unwrap().priority, Some(IssuePriority::P4));
    }

    #[test]
    fn bug_label_takes_precedence_in_type_resolution() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let i = issue(now, &["bug", "feature", "enhancement"]);
        let c = qualify(&i, &repo(), &config(), now).unwrap();
        assert_eq!(c.qualified_type, QualifiedType::Bug);
    }
}
