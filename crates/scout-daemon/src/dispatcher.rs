//! Action Dispatcher (C11, spec §4.7): executes an already-authorized
//! `Action` via its collaborator, then updates C8's counters and C10's
//! workflow record — even on failure, so a permanently-failing action is
//! never retried inside the same cooldown window. Idempotent per
//! `(issue_url, kind)` via a per-key async mutex, matching the same
//! pattern `scout_antispam::SmartLimiter` uses to serialize its own
//! check-then-increment sequence.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use scout_core::types::{Action, ActionKind, ActionOutcome, CommentHistoryEntry, FailureKind, Repo, TrustLevel};
use tokio::sync::Mutex as AsyncMutex;

use crate::context::RuntimeContext;

pub struct Dispatcher {
    locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    fn lock_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        self.locks.entry(key.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Runs `action` against `repo`, recording the outcome against C8 and
    /// C10 regardless of success. `repo` is threaded in directly by the
    /// caller (the scheduler already holds it from the registry) rather
    /// than reconstructed from `action.project_key`.
    pub async fn dispatch(&self, ctx: &RuntimeContext, action: Action, repo: &Repo) -> ActionOutcome {
        let key = format!("{}:{:?}", action.issue_url, action.kind);
        let _guard = self.lock_for(&key).lock().await;
        let now = ctx.now();

        let outcome = match action.kind {
            ActionKind::NotifyLocal => {
                let body = action.body.as_deref().unwrap_or(&action.rationale);
                match ctx.notifier.notify_local(&action.rationale, body) {
                    Ok(()) => ActionOutcome::Done,
                    Err(e) => ActionOutcome::Failed { kind: e.kind().into(), detail: e.to_string() },
                }
            }
            ActionKind::NotifyEmail => {
                let body = action.body.as_deref().unwrap_or(&action.rationale);
                match self.send_email_with_retry(ctx, &action.rationale, body).await {
                    Ok(()) => ActionOutcome::Done,
                    Err(e) => ActionOutcome::Failed { kind: e.kind().into(), detail: e.to_string() },
                }
            }
            ActionKind::Comment => {
                let Some(body) = action.body.as_deref() else {
                    return ActionOutcome::Skipped { reason: "comment action carried no body".to_string() };
                };
                match self.post_comment_with_budget(ctx, repo, &action.issue_url, body).await {
                    Ok(()) => ActionOutcome::Done,
                    Err(e) => ActionOutcome::Failed { kind: e, detail: "comment post failed".to_string() },
                }
            }
            ActionKind::AskAssignment => {
                let body = scout_forge::comments::ask_assignment_body(issue_number(&action.issue_url).unwrap_or(0));
                match self.post_comment_with_budget(ctx, repo, &action.issue_url, &body).await {
                    Ok(()) => ActionOutcome::Done,
                    Err(e) => ActionOutcome::Failed { kind: e, detail: "assignment request failed".to_string() },
                }
            }
        };

        self.record(ctx, &action, repo, &outcome, now).await;
        outcome
    }

    async fn send_email_with_retry(&self, ctx: &RuntimeContext, subject: &str, body: &str) -> scout_notify::Result<()> {
        let mut attempt = 0;
        loop {
            match ctx.notifier.send_raw_email(subject, body) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == scout_core::errors::TransportErrorKind::Transient && attempt < 2 => {
                    attempt += 1;
                    tokio::time::sleep(Duration::from_secs(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_comment_with_budget(
        &self,
        ctx: &RuntimeContext,
        repo: &Repo,
        issue_url: &str,
        body: &str,
    ) -> Result<(), FailureKind> {
        let number = issue_number(issue_url).ok_or(FailureKind::Permanent)?;
        if ctx.limiter.authorize_forge_call().await.is_err() {
            return Err(FailureKind::Transient);
        }
        let result = scout_forge::comments::post_comment(&ctx.forge, repo, number, body).await;
        ctx.limiter.record_forge_call().await;
        result.map(|_| ()).map_err(|e| e.kind().into())
    }

    /// Updates C8 (budget counters) and C10 (workflow state) for every
    /// outcome, success or failure, per spec §4.7.
    async fn record(&self, ctx: &RuntimeContext, action: &Action, repo: &Repo, outcome: &ActionOutcome, now: chrono::DateTime<chrono::Utc>) {
        match action.kind {
            ActionKind::NotifyLocal | ActionKind::NotifyEmail => {
                ctx.limiter.record_notify(&action.project_key).await;
            }
            ActionKind::Comment => {
                ctx.limiter.record_comment().await;
                if matches!(outcome, ActionOutcome::Done) {
                    if let Some(body) = &action.body {
                        let _ = ctx
                            .store
                            .record_comment(&CommentHistoryEntry {
                                issue_url: action.issue_url.clone(),
                                repo_key: action.project_key.clone(),
                                body: body.clone(),
                                posted_at: now,
                            })
                            .await;
                    }
                    bump_trust_comment(ctx, &action.project_key, now).await;
                }
            }
            ActionKind::AskAssignment => {
                ctx.limiter.record_assignment_request(&action.project_key).await;
            }
        }

        let target = match (action.kind, outcome) {
            (ActionKind::NotifyLocal | ActionKind::NotifyEmail, ActionOutcome::Done) => {
                Some(scout_core::types::WorkflowStatus::Notified)
            }
            (ActionKind::AskAssignment, ActionOutcome::Done) => Some(scout_core::types::WorkflowStatus::AskedAssignment),
            _ => None,
        };

        if let Some(target) = target {
            if let Err(e) = ctx.workflow.transition(&action.issue_url, target, now).await {
                tracing::warn!(issue_url = %action.issue_url, error = %e, "workflow transition after dispatch failed");
            }
        } else if !matches!(outcome, ActionOutcome::Done) {
            let note = match outcome {
                ActionOutcome::Skipped { reason } => format!("{:?} skipped: {reason}", action.kind),
                ActionOutcome::Failed { kind, detail } => format!("{:?} failed ({kind:?}): {detail}", action.kind),
                ActionOutcome::Done => unreachable!(),
            };
            let _ = ctx.workflow.annotate(&action.issue_url, note, now).await;
        }

        let _ = repo;
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn bump_trust_comment(ctx: &RuntimeContext, repo_key: &str, now: chrono::DateTime<chrono::Utc>) {
    let mut record = match ctx.store.get_trust(repo_key).await {
        Ok(Some(r)) => r,
        Ok(None) => scout_core::types::TrustRecord::new(repo_key),
        Err(e) => {
            tracing::warn!(repo_key, error = %e, "failed to load trust record");
            return;
        }
    };
    record.comments += 1;
    record.last_activity = Some(now);
    record.trust_level = scout_trust::recompute(&record, &ctx.config.trust);
    if record.trust_level == TrustLevel::None {
        record.trust_level = TrustLevel::New;
    }
    let _ = ctx.store.upsert_trust(&record).await;
}

fn issue_number(issue_url: &str) -> Option<u64> {
    issue_url.rsplit('/').next()?.parse().ok()
}

impl From<scout_core::errors::TransportErrorKind> for FailureKind {
    fn from(kind: scout_core::errors::TransportErrorKind) -> Self {
        match kind {
            scout_core::errors::TransportErrorKind::Transient => FailureKind::Transient,
            scout_core::errors::TransportErrorKind::Permanent => FailureKind::Permanent,
        }
    }
}
