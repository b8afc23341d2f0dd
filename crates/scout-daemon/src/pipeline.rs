//! Per-issue pipeline: qualify → score → [workflow → authorize → draft →
//! dispatch] (spec §2 data flow, §4.8). Split into two halves so the
//! scheduler can run the first (read-only, parallel across repos) before
//! sorting, and the second (side-effecting, serialized in score order) —
//! see `scheduler.rs` for how the halves are composed into one cycle.

use chrono::{DateTime, Utc};
use scout_core::config::Config;
use scout_core::types::{Action, ActionKind, ActionOutcome, Candidate, Repo, ScoreBreakdown, TrustLevel, TrustRecord};
use scout_forge::ForgeClient;
use scout_workflow::NewIssueFacts;

use crate::context::RuntimeContext;
use crate::dispatcher::Dispatcher;

/// Pages through one repo's open issues and returns every qualifying
/// candidate with its score and the repo's star count (used later for the
/// §4.1 tie-break). Read-only: no workflow writes, no forge writes, no
/// dispatch. `linked_prs` is populated here via a search call per
/// non-hard-rejected issue, since the listing endpoint never carries it
/// (scout_forge::issues::list_open_issues's own doc comment).
pub async fn discover_repo(
    forge: &ForgeClient,
    config: &Config,
    now: DateTime<Utc>,
    repo: &Repo,
) -> Vec<(Candidate, ScoreBreakdown, u64)> {
    let repo_meta = match scout_forge::repo::get_repo_meta(forge, repo).await {
        Ok(meta) => Some(meta),
        Err(e) => {
            tracing::warn!(repo = %repo.full_name(), error = %e, "repo metadata fetch failed, scoring without it");
            None
        }
    };
    let stars = repo_meta.as_ref().map(|m| m.stars).unwrap_or(0);

    let mut found = Vec::new();
    let mut page = 1u32;
    let per_page: u8 = 50;
    loop {
        if found.len() as u32 >= config.scheduler.max_issues_per_repo {
            break;
        }
        let issues = match scout_forge::issues::list_open_issues(forge, repo, page, per_page).await {
            Ok(issues) => issues,
            Err(e) => {
                tracing::warn!(repo = %repo.full_name(), error = %e, "issue listing failed");
                break;
            }
        };
        if issues.is_empty() {
            break;
        }

        for issue in issues {
            if found.len() as u32 >= config.scheduler.max_issues_per_repo {
                break;
            }
            if issue.is_pull_request || !matches!(issue.state, scout_core::types::IssueState::Open) {
                continue;
            }

            let mut issue = issue;
            match scout_forge::pulls::search_linked_pr(forge, repo, issue.number).await {
                Ok(true) => {
                    issue.linked_prs.insert(format!("{}#linked", repo.full_name()));
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(repo = %repo.full_name(), issue = issue.number, error = %e, "linked PR search failed, assuming none");
                }
            }

            let Some(candidate) = scout_scoring::qualify(&issue, repo, &config.qualification, now) else {
                continue;
            };
            let breakdown = scout_scoring::score(&issue, repo, repo_meta.as_ref(), &config.scoring, now);
            found.push((candidate, breakdown, stars));
        }

        page += 1;
    }

    found
}

/// What happened to one candidate once it reached the front of the
/// dispatch queue.
pub struct PipelineResult {
    pub outcomes: Vec<(ActionKind, ActionOutcome)>,
}

/// Runs the workflow-lookup/authorize/draft/dispatch half for one already
/// scored candidate. Called by the scheduler strictly in descending-score
/// order (spec §4.8 ordering guarantee); the per-key locks inside
/// `SmartLimiter`/`Dispatcher` make concurrent calls safe too, but the
/// scheduler keeps this serial so budget denials land on the lowest-score
/// candidates first.
pub async fn authorize_and_dispatch(
    ctx: &RuntimeContext,
    dispatcher: &Dispatcher,
    repo: &Repo,
    candidate: &Candidate,
    breakdown: &ScoreBreakdown,
    great_candidate_repo_spread: usize,
) -> PipelineResult {
    let now = ctx.now();
    let project_key = repo.full_name();

    let facts = NewIssueFacts {
        score: breakdown.total,
        labels: candidate.issue.labels.clone(),
        has_good_first: candidate.has_good_first,
        has_confirmed: candidate.has_confirmed,
        has_assignee: candidate.has_assignee,
        has_pr: candidate.has_linked_pr,
    };
    let record = match ctx.workflow.get_or_create(&candidate.issue.url, facts, now).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(issue_url = %candidate.issue.url, error = %e, "workflow lookup failed");
            return PipelineResult { outcomes: Vec::new() };
        }
    };

    if record.status.is_terminal() {
        return PipelineResult { outcomes: Vec::new() };
    }

    let mut outcomes = Vec::new();

    if breakdown.recommended && record.notified_at.is_none() && !ctx.config.scheduler.digest_mode {
        if let Some(outcome) = notify(ctx, dispatcher, repo, candidate, breakdown, &project_key).await {
            outcomes.push(outcome);
        }
    }

    if ctx.config.scheduler.auto_comment
        && breakdown.total >= ctx.config.budget.min_score_to_comment
        && record.assignment_asked_at.is_none()
        && !candidate.has_linked_pr
    {
        if let Some(outcome) = comment(ctx, dispatcher, repo, candidate, &project_key, great_candidate_repo_spread, now).await {
            outcomes.push(outcome);
        }
    }

    PipelineResult { outcomes }
}

/// Notifies (email if the score clears `notify_email_min_score`, desktop
/// otherwise) once budget allows (spec §4.4, §6 Notifier interface).
async fn notify(
    ctx: &RuntimeContext,
    dispatcher: &Dispatcher,
    repo: &Repo,
    candidate: &Candidate,
    breakdown: &ScoreBreakdown,
    project_key: &str,
) -> Option<(ActionKind, ActionOutcome)> {
    ctx.limiter.authorize_notify(project_key).await.ok()?;

    let kind = if breakdown.total >= ctx.config.budget.notify_email_min_score {
        ActionKind::NotifyEmail
    } else {
        ActionKind::NotifyLocal
    };
    let rationale = format!(
        "{} — {} scored {:.2} ({})",
        project_key, candidate.issue.title, breakdown.total, breakdown.grade
    );
    let action = Action {
        kind,
        issue_url: candidate.issue.url.clone(),
        project_key: project_key.to_string(),
        score: breakdown.total,
        body: None,
        rationale,
    };
    Some((kind, dispatcher.dispatch(ctx, action, repo).await))
}

/// Checks C8's comment budget, then C9's trust gate (composed by logical
/// AND per spec §4.6), then drafts via C7 before dispatching. A rejection
/// at any stage is a normal skip, not an error (spec §7).
async fn comment(
    ctx: &RuntimeContext,
    dispatcher: &Dispatcher,
    repo: &Repo,
    candidate: &Candidate,
    project_key: &str,
    great_candidate_repo_spread: usize,
    now: DateTime<Utc>,
) -> Option<(ActionKind, ActionOutcome)> {
    ctx.limiter.authorize_comment(project_key, great_candidate_repo_spread).await.ok()?;

    let mut trust = ctx.store.get_trust(project_key).await.ok().flatten().unwrap_or_else(|| TrustRecord::new(project_key));
    trust.trust_level = scout_trust::recompute(&trust, &ctx.config.trust);

    let week_ago = now - chrono::Duration::days(7);
    let comments_this_week =
        ctx.store.comment_count_for_repo_since(project_key, week_ago).await.unwrap_or(0) as u32;

    scout_trust::authorize(trust.trust_level, ActionKind::Comment, candidate.age, comments_this_week, &ctx.config.trust).ok()?;

    let history = ctx
        .store
        .recent_comments_for_issue(&candidate.issue.url, ctx.config.comment.max_history_per_issue)
        .await
        .unwrap_or_default();
    let drafted = scout_comment::generate_comment(candidate, &history, &ctx.config.comment, now).ok()?;

    let action = Action {
        kind: ActionKind::Comment,
        issue_url: candidate.issue.url.clone(),
        project_key: project_key.to_string(),
        score: drafted.score,
        body: Some(drafted.body),
        rationale: format!("{:?} comment drafted for {}", drafted.issue_type, candidate.issue.title),
    };
    let outcome = dispatcher.dispatch(ctx, action, repo).await;

    if matches!(outcome, ActionOutcome::Done)
        && matches!(trust.trust_level, TrustLevel::Regular | TrustLevel::Maintainer)
        && candidate.has_good_first
        && !candidate.has_assignee
    {
        ask_assignment(ctx, dispatcher, repo, candidate, project_key, trust.trust_level).await;
    }

    Some((ActionKind::Comment, outcome))
}

/// Follows a successful comment with an assignment request for trusted
/// contributors on an unclaimed good-first-issue (spec §4.6's
/// `CONTRIBUTE_FIRST` rule implies assignment requests only ever follow a
/// prior comment — a New/None contributor is denied at `scout_trust`
/// before reaching here regardless).
async fn ask_assignment(
    ctx: &RuntimeContext,
    dispatcher: &Dispatcher,
    repo: &Repo,
    candidate: &Candidate,
    project_key: &str,
    trust_level: TrustLevel,
) {
    if ctx.limiter.authorize_assignment_request(project_key).await.is_err() {
        return;
    }
    if scout_trust::authorize(trust_level, ActionKind::AskAssignment, candidate.age, 0, &ctx.config.trust).is_err() {
        return;
    }

    let action = Action {
        kind: ActionKind::AskAssignment,
        issue_url: candidate.issue.url.clone(),
        project_key: project_key.to_string(),
        score: 0.0,
        body: None,
        rationale: format!("requesting assignment on {}", candidate.issue.title),
    };
    let _ = dispatcher.dispatch(ctx, action, repo).await;
}
