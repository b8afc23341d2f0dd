//! Workflow Tracker (C10): the authoritative per-issue state machine,
//! persisted through `scout_core::persistence::Store` (spec §4.5). This
//! crate owns the legality of transitions and the monotonicity of
//! timestamps; it never reaches for the forge or the notifier, keeping
//! the cycle the Design Note in §9 calls out ("C8 and C10 are pure
//! storage-backed services with no outbound references") broken at the
//! daemon layer instead of here.

use chrono::{DateTime, Duration, Utc};
use scout_core::errors::StoreError;
use scout_core::persistence::Store;
use scout_core::types::{WorkflowRecord, WorkflowStatus};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("illegal transition from {from:?} to {to:?}")]
    IllegalTransition { from: WorkflowStatus, to: WorkflowStatus },
    #[error("transition to {to:?} requires a prior timestamp that is not set")]
    MissingPriorTimestamp { to: WorkflowStatus },
    #[error("no workflow record for issue url {0}")]
    NotFound(String),
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Fields describing a freshly-qualified issue, used to seed the initial
/// `new` record. Kept separate from `WorkflowRecord` so callers in
/// scout-daemon don't have to hand-construct timestamps.
pub struct NewIssueFacts {
    pub score: f64,
    pub labels: BTreeSet<String>,
    pub has_good_first: bool,
    pub has_confirmed: bool,
    pub has_assignee: bool,
    pub has_pr: bool,
}

pub struct WorkflowTracker {
    store: Arc<dyn Store>,
}

impl WorkflowTracker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Looks up the existing record for `issue_url`, or seeds a fresh
    /// `new` record from `facts` if none exists yet. Re-running qualify
    /// on an issue already being tracked must not clobber its progress
    /// (spec §4.5 "re-entering the same state is a no-op").
    pub async fn get_or_create(&self, issue_url: &str, facts: NewIssueFacts, now: DateTime<Utc>) -> Result<WorkflowRecord> {
        if let Some(existing) = self.store.get_workflow(issue_url).await? {
            return Ok(existing);
        }
        let mut record = WorkflowRecord::new(issue_url, facts.score, now);
        record.labels = facts.labels;
        record.has_good_first = facts.has_good_first;
        record.has_confirmed = facts.has_confirmed;
        record.has_assignee = facts.has_assignee;
        record.has_pr = facts.has_pr;
        self.store.upsert_workflow(&record).await?;
        Ok(record)
    }

    pub async fn get(&self, issue_url: &str) -> Result<Option<WorkflowRecord>> {
        Ok(self.store.get_workflow(issue_url).await?)
    }

    pub async fn get_by_status(&self, status: WorkflowStatus) -> Result<Vec<WorkflowRecord>> {
        Ok(self.store.list_workflow_by_status(status).await?)
    }

    pub async fn get_active_count(&self) -> Result<u64> {
        Ok(self.store.count_active_workflow().await?)
    }

    /// Applies a transition to the record for `issue_url`, validating
    /// legality and prior-timestamp invariants per spec §4.5, then
    /// persists the result. Terminal states are absorbing: a transition
    /// attempt out of `completed`/`abandoned` (other than the no-op
    /// re-entry) is always illegal because `can_transition_to` never
    /// admits it.
    pub async fn transition(&self, issue_url: &str, target: WorkflowStatus, now: DateTime<Utc>) -> Result<WorkflowRecord> {
        let mut record = self
            .store
            .get_workflow(issue_url)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(issue_url.to_string()))?;

        if record.status == target {
            // No-op re-entry: fields are preserved, only updated_at may advance.
            return Ok(record);
        }

        if !record.status.can_transition_to(&target) {
            return Err(WorkflowError::IllegalTransition { from: record.status, to: target });
        }

        apply_transition_timestamps(&mut record, target, now)?;
        record.status = target;
        record.updated_at = record.updated_at.max(now);
        self.store.upsert_workflow(&record).await?;
        tracing::debug!(issue_url, status = ?target, "workflow transitioned");
        Ok(record)
    }

    /// Appends a free-form note to the record without changing its
    /// status — used by the dispatcher to record a `Failed` attempt
    /// (spec §7: "workflow records an attempt but does not advance").
    pub async fn annotate(&self, issue_url: &str, note: impl Into<String>, now: DateTime<Utc>) -> Result<WorkflowRecord> {
        let mut record = self
            .store
            .get_workflow(issue_url)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(issue_url.to_string()))?;
        record.notes.push(note.into());
        record.updated_at = record.updated_at.max(now);
        self.store.upsert_workflow(&record).await?;
        Ok(record)
    }

    /// Prunes terminal records older than `retention` (spec §11's
    /// `cleanup` subcommand — not a named C10 operation in spec §4.5, but
    /// implied by the `cleanup` CLI verb in §6).
    pub async fn cleanup(&self, retention: Duration, now: DateTime<Utc>) -> Result<u64> {
        Ok(self.store.prune_terminal_before(now - retention).await?)
    }
}

/// Sets the timestamp (or validates one already set) associated with a
/// transition, per spec §4.5: "a transition that requires a prior
/// timestamp ... must find that timestamp populated."
fn apply_transition_timestamps(record: &mut WorkflowRecord, target: WorkflowStatus, now: DateTime<Utc>) -> Result<()> {
    use WorkflowStatus::*;
    match target {
        New => {}
        Notified => record.notified_at = Some(now),
        AskedAssignment => record.assignment_asked_at = Some(now),
        Assigned => {
            if record.assignment_asked_at.is_none() {
                return Err(WorkflowError::MissingPriorTimestamp { to: target });
            }
        }
        InProgress => {
            if record.assignment_asked_at.is_none() {
                return Err(WorkflowError::MissingPriorTimestamp { to: target });
            }
            record.started_at = Some(now);
        }
        PrSubmitted => {
            if record.started_at.is_none() {
                return Err(WorkflowError::MissingPriorTimestamp { to: target });
            }
        }
        Completed => record.completed_at = Some(now),
        Abandoned => record.completed_at = Some(now),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::persistence::FileStore;
    use std::collections::BTreeSet;

    fn facts() -> NewIssueFacts {
        NewIssueFacts {
            score: 0.9,
            labels: BTreeSet::from(["good first issue".to_string()]),
            has_good_first: true,
            has_confirmed: false,
            has_assignee: false,
            has_pr: false,
        }
    }

    async fn tracker() -> WorkflowTracker {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn Store> = Arc::new(FileStore::open(dir.path()).unwrap());
        std::mem::forget(dir);
        WorkflowTracker::new(store)
    }

    #[tokio::test]
    async fn get_or_create_seeds_new_record() {
        let tracker = tracker().await;
        let now = Utc::now();
        let record = tracker.get_or_create("https://example.test/1", facts(), now).await.unwrap();
        assert_eq!(record.status, WorkflowStatus::New);
        assert!(record.has_good_first);
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let tracker = tracker().await;
        let now = Utc::now();
        tracker.get_or_create("https://example.test/1", facts(), now).await.unwrap();
        tracker.transition("https://example.test/1", WorkflowStatus::Notified, now).await.unwrap();
        let record = tracker.get_or_create("https://example.test/1", facts(), now).await.unwrap();
        assert_eq!(record.status, WorkflowStatus::Notified, "must not clobber progress already made");
    }

    #[tokio::test]
    async fn full_happy_path_transition_chain() {
        let tracker = tracker().await;
        let now = Utc::now();
        let url = "https://example.test/2";
        tracker.get_or_create(url, facts(), now).await.unwrap();
        tracker.transition(url, WorkflowStatus::Notified, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::AskedAssignment, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::Assigned, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::InProgress, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::PrSubmitted, now).await.unwrap();
        let record = tracker.transition(url, WorkflowStatus::Completed, now).await.unwrap();
        assert_eq!(record.status, WorkflowStatus::Completed);
        assert!(record.completed_at.is_some());
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let tracker = tracker().await;
        let now = Utc::now();
        let url = "https://example.test/3";
        tracker.get_or_create(url, facts(), now).await.unwrap();
        let err = tracker.transition(url, WorkflowStatus::Assigned, now).await.unwrap_err();
        assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn re_entering_same_state_is_a_no_op() {
        let tracker = tracker().await;
        let now = Utc::now();
        let url = "https://example.test/4";
        tracker.get_or_create(url, facts(), now).await.unwrap();
        tracker.transition(url, WorkflowStatus::Notified, now).await.unwrap();
        let record = tracker.transition(url, WorkflowStatus::Notified, now + Duration::hours(1)).await.unwrap();
        assert_eq!(record.status, WorkflowStatus::Notified);
    }

    #[tokio::test]
    async fn terminal_state_rejects_further_transitions() {
        let tracker = tracker().await;
        let now = Utc::now();
        let url = "https://example.test/5";
        tracker.get_or_create(url, facts(), now).await.unwrap();
        tracker.transition(url, WorkflowStatus::Notified, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::AskedAssignment, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::Abandoned, now).await.unwrap();
        let err = tracker.transition(url, WorkflowStatus::Assigned, now).await.unwrap_err();
        assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn cleanup_prunes_old_terminal_records_only() {
        let tracker = tracker().await;
        let now = Utc::now();
        let url = "https://example.test/6";
        tracker.get_or_create(url, facts(), now).await.unwrap();
        tracker.transition(url, WorkflowStatus::Notified, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::AskedAssignment, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::Abandoned, now).await.unwrap();

        let still_active_url = "https://example.test/7";
        tracker.get_or_create(still_active_url, facts(), now).await.unwrap();

        let removed = tracker.cleanup(Duration::days(30), now + Duration::days(31)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(tracker.get(url).await.unwrap().is_none());
        assert!(tracker.get(still_active_url).await.unwrap().is_some());
    }
}
