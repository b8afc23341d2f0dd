//! Plain-text rendering for every notifier message (spec §4 C13
//! "template-rendering"). Kept as free functions returning `String` rather
//! than a templating engine — the messages are short and fixed-shape, and
//! the rest of the codebase reaches for `format!` over a template crate
//! wherever the shape is this simple.

use scout_core::types::{Candidate, Issue, ScoreBreakdown};

pub fn new_issue_subject(issue: &Issue) -> String {
    format!("[issue-scout] #{} {}", issue.number, issue.title)
}

pub fn new_issue_body(candidate: &Candidate, breakdown: &ScoreBreakdown) -> String {
    format!(
        "{} — {}\n\nGrade {} ({:.2})\nRepo: {}\nLabels: {}\n\n{}",
        candidate.issue.title,
        candidate.issue.url,
        breakdown.grade,
        breakdown.total,
        candidate.repo.full_name(),
        candidate.issue.labels.iter().cloned().collect::<Vec<_>>().join(", "),
        candidate.issue.body.as_deref().unwrap_or("(no description)"),
    )
}

pub fn digest_subject(count: usize) -> String {
    format!("[issue-scout] daily digest — {count} issue(s)")
}

pub fn digest_body(issues: &[(Candidate, ScoreBreakdown)]) -> String {
    if issues.is_empty() {
        return "No qualifying issues since the last digest.".to_string();
    }
    let mut lines = Vec::with_capacity(issues.len() + 1);
    lines.push(format!("{} qualifying issue(s):\n", issues.len()));
    for (candidate, breakdown) in issues {
        lines.push(format!(
            "- [{}] {} ({}) — {}",
            breakdown.grade,
            candidate.issue.title,
            candidate.repo.full_name(),
            candidate.issue.url
        ));
    }
    lines.join("\n")
}

pub fn assignment_request_subject(issue: &Issue) -> String {
    format!("[issue-scout] requested assignment on #{}", issue.number)
}

pub fn assignment_request_body(issue: &Issue) -> String {
    format!("Posted a request to be assigned to #{}: {}\n{}", issue.number, issue.title, issue.url)
}

pub fn assignment_confirmation_subject(issue: &Issue) -> String {
    format!("[issue-scout] assigned — #{}", issue.number)
}

pub fn assignment_confirmation_body(issue: &Issue) -> String {
    format!("You're now assigned to #{}: {}\n{}", issue.number, issue.title, issue.url)
}
