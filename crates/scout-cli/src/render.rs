//! Plain-text rendering shared by the read-only verbs. Kept separate from
//! `commands/` since several verbs (`find`, `bugs`, `search`, ...) all print
//! the same candidate line.

use scout_core::types::{Candidate, ScoreBreakdown};

pub fn candidate_line(repo_full_name: &str, candidate: &Candidate, breakdown: &ScoreBreakdown) {
    println!(
        "{:>5.2} {:<3} {}  {}#{}  {}",
        breakdown.total,
        breakdown.grade,
        if breakdown.recommended { "*" } else { " " },
        repo_full_name,
        candidate.issue.number,
        candidate.issue.title,
    );
    println!("      {}", candidate.issue.url);
}

pub fn parse_owner_repo(spec: &str) -> anyhow::Result<(String, String)> {
    let (owner, name) = spec
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("expected `owner/repo`, got `{spec}`"))?;
    if owner.is_empty() || name.is_empty() {
        anyhow::bail!("expected `owner/repo`, got `{spec}`");
    }
    Ok((owner.to_string(), name.to_string()))
}

pub fn parse_status(raw: &str) -> anyhow::Result<scout_core::types::WorkflowStatus> {
    use scout_core::types::WorkflowStatus::*;
    let normalized = raw.to_ascii_lowercase().replace(['-', '_'], "");
    Ok(match normalized.as_str() {
        "new" => New,
        "notified" => Notified,
        "askedassignment" | "asked" => AskedAssignment,
        "assigned" => Assigned,
        "inprogress" => InProgress,
        "prsubmitted" => PrSubmitted,
        "completed" | "done" => Completed,
        "abandoned" => Abandoned,
        other => anyhow::bail!(
            "unknown status `{other}` (expected one of: new, notified, asked-assignment, assigned, in-progress, pr-submitted, completed, abandoned)"
        ),
    })
}
