//! Draft step: renders a type-specific template filled in with the
//! extracted context (spec §4.3, step 3 "draft"). Templates are plain
//! strings, not a templating engine — the vocabulary is small and fixed.

use scout_core::types::{Candidate, IssueType};

use crate::extract::ExtractedContext;

pub fn draft(issue_type: IssueType, candidate: &Candidate, ctx: &ExtractedContext) -> String {
    let mut sections = Vec::new();

    sections.push(opening(issue_type).to_string());

    if let Some(repro) = &ctx.repro_steps {
        sections.push(format!("I was able to follow the reproduction steps:\n\n{repro}"));
    }
    if let Some(trace) = &ctx.stack_trace {
        sections.push(format!("The stack trace points at:\n\n```\n{trace}\n```"));
    }
    if let Some(env) = &ctx.environment {
        sections.push(format!("Noted environment details: {env}."));
    }

    sections.push(closing(issue_type, candidate).to_string());

    sections.join("\n\n")
}

fn opening(issue_type: IssueType) -> &'static str {
    match issue_type {
        IssueType::Bug => "I took a look at this and can confirm the behavior described.",
        IssueType::Feature => "This looks like a reasonable addition to the project.",
        IssueType::Enhancement => "I'd like to help improve this.",
        IssueType::Docs => "Happy to help clarify the documentation here.",
        IssueType::Performance => "I profiled the path described and see the same slowdown.",
        IssueType::Security => "I looked into this report.",
        IssueType::Question => "Taking a look at this question.",
        IssueType::Unknown => "I looked into this issue.",
    }
}

fn closing(issue_type: IssueType, candidate: &Candidate) -> String {
    let offer = match issue_type {
        IssueType::Docs => "I can open a PR with the clarified wording if that's welcome.",
        IssueType::Security => "Let me know if a private disclosure channel is preferred before I say more here.",
        _ => "I'd like to work on a fix if nobody is already assigned.",
    };

    if candidate.has_good_first {
        format!("{offer} Since this is flagged as a good first issue, I'll keep the change small and scoped.")
    } else {
        offer.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use scout_core::types::{IssuePriority, IssueState, QualifiedType, Repo};
    use std::collections::BTreeSet;

    fn sample_issue() -> scout_core::types::Issue {
        scout_core::types::Issue {
            id: 1,
            number: 1,
            url: "u".into(),
            title: "t".into(),
            body: None,
            state: IssueState::Open,
            labels: BTreeSet::new(),
            comments: 0,
            assignees: BTreeSet::new(),
            linked_prs: BTreeSet::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_pull_request: false,
        }
    }

    fn sample_repo() -> Repo {
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

    fn candidate(has_good_first: bool) -> Candidate {
        Candidate {
            issue: sample_issue(),
            repo: sample_repo(),
            qualified_type: QualifiedType::Bug,
            has_confirmed: true,
            has_good_first,
            has_assignee: false,
            has_linked_pr: false,
            has_clear_repro: true,
            has_acceptance_criteria: false,
            priority: Some(IssuePriority::P2),
            age: Duration::hours(3),
        }
    }

    #[test]
    fn good_first_issue_mentions_scope() {
        let body = draft(IssueType::Bug, &candidate(true), &ExtractedContext::default());
        assert!(body.contains("good first issue"));
    }

    #[test]
    fn non_good_first_omits_scope_sentence() {
        let body = draft(IssueType::Bug, &candidate(false), &ExtractedContext::default());
        assert!(!body.contains("good first issue"));
    }

    #[test]
    fn repro_context_is_quoted_back() {
        let ctx = ExtractedContext { repro_steps: Some("1. do X".into()), ..Default::default() };
        let body = draft(IssueType::Bug, &candidate(false), &ctx);
        assert!(body.contains("1. do X"));
    }
}
