//! Solution-present veto (spec §4.3 step 2, §8 testable property 5: "a
//! comment is never drafted for an issue that already has an acknowledged
//! resolution or active PR"). Runs before drafting; a veto short-circuits
//! the whole pipeline. This is the single most important gate in the
//! comment engine — no outbound comment may be proposed when it fires.
//!
//! Per spec §9 open question (3), the aggressive reading is kept: *any*
//! linked-PR reference vetoes, not just one paired with a fixes/closes/
//! resolves keyword (see `DESIGN.md`).

use regex::Regex;
use scout_core::types::Issue;
use std::sync::OnceLock;

const SOLVED_PHRASES: &[&str] = &[
    "resolved in",
    "fixed in",
    "won't fix",
    "wont fix",
    "duplicate of",
    "by design",
    "working as intended",
    "already implemented",
    "closing as",
];

const ACTIVE_WORK_PHRASES: &[&str] = &["working on", "draft pr", "in review"];

const EXPLANATORY_KEYWORDS: &[&str] = &["here's how", "here is how", "the fix is", "this works because", "explanation"];

fn issue_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\d+").unwrap())
}

fn pull_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/pull/\d+").unwrap())
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```.*?```").unwrap())
}

/// `true` iff any solution-present indicator from spec §4.3 step 2 fires.
pub fn solution_already_present(issue: &Issue) -> bool {
    if issue.has_linked_pr() {
        return true;
    }

    let text = format!("{} {}", issue.title, issue.body.as_deref().unwrap_or_default());
    let lower = text.to_lowercase();

    if SOLVED_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    if ACTIVE_WORK_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    if issue_ref_re().is_match(&text) {
        return true;
    }
    if pull_url_re().is_match(&text) {
        return true;
    }

    for m in code_fence_re().find_iter(&text) {
        if m.as_str().len() > 200 && EXPLANATORY_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return true;
        }
    }

    false
}
