//! Classification step: maps an issue's labels/title/body to an
//! `IssueType` so the draft step can pick an appropriate template
//! (spec §4.3, step 1 "classify").

use scout_core::types::{Issue, IssueType};

const SECURITY_MARKERS: &[&str] = &["security", "cve", "vulnerability", "exploit"];
const PERFORMANCE_MARKERS: &[&str] = &["performance", "perf", "slow", "latency", "regression"];
const DOCS_MARKERS: &[&str] = &["docs", "documentation"];
const BUG_MARKERS: &[&str] = &["bug", "crash", "panic", "broken"];
const FEATURE_MARKERS: &[&str] = &["feature", "feature-request"];
const ENHANCEMENT_MARKERS: &[&str] = &["enhancement", "improvement"];
const QUESTION_MARKERS: &[&str] = &["question", "support"];

pub fn classify(issue: &Issue) -> IssueType {
    let lower_labels: Vec<String> = issue.labels.iter().map(|l| l.to_lowercase()).collect();
    let has_label = |markers: &[&str]| lower_labels.iter().any(|l| markers.iter().any(|m| l.contains(m)));

    if has_label(SECURITY_MARKERS) {
        return IssueType::Security;
    }
    if has_label(PERFORMANCE_MARKERS) {
        return IssueType::Performance;
    }
    if has_label(DOCS_MARKERS) {
        return IssueType::Docs;
    }
    if has_label(FEATURE_MARKERS) {
        return IssueType::Feature;
    }
    if has_label(BUG_MARKERS) {
        return IssueType::Bug;
    }
    if has_label(ENHANCEMENT_MARKERS) {
        return IssueType::Enhancement;
    }
    if has_label(QUESTION_MARKERS) {
        return IssueType::Question;
    }

    let text = format!("{} {}", issue.title, issue.body.as_deref().unwrap_or_default()).to_lowercase();
    let has_text = |markers: &[&str]| markers.iter().any(|m| text.contains(m));
    if has_text(SECURITY_MARKERS) {
        IssueType::Security
    } else if has_text(PERFORMANCE_MARKERS) {
        IssueType::Performance
    } else if has_text(BUG_MARKERS) {
        IssueType::Bug
    } else {
        IssueType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scout_core::types::IssueState;
    use std::collections::BTreeSet;

    fn issue(labels: &[&str], title: &str, body: Option<&str>) -> Issue {
        Issue {
            id: 1,
            number: 1,
            url: "u".into(),
            title: title.into(),
            body: body.map(String::from),
            state: IssueState::Open,
            labels: labels.iter().map(|s| s.to_string()).collect(),
            comments: 0,
            assignees: BTreeSet::new(),
            linked_prs: BTreeSet::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_pull_request: false,
        }
    }

    #[test]
    fn label_wins_over_text() {
        let i = issue(&["security"], "slow query", None);
        assert_eq!(classify(&i), IssueType::Security);
    }

    #[test]
    fn falls_back_to_text_when_unlabeled() {
        let i = issue(&[], "panic on startup", Some("the app crashes immediately"));
        assert_eq!(classify(&i), IssueType::Bug);
    }

    #[test]
    fn defaults_to_unknown() {
        let i = issue(&[], "hello", Some("just saying hi"));
        assert_eq!(classify(&i), IssueType::Unknown);
    }
}
