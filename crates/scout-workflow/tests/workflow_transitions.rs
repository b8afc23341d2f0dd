use chrono::Utc;
use scout_core::persistence::{FileStore, Store};
use scout_core::types::WorkflowStatus;
use scout_workflow::{NewIssueFacts, WorkflowTracker};
use std::collections::BTreeSet;
use std::sync::Arc;

fn facts(score: f64) -> NewIssueFacts {
    NewIssueFacts {
        score,
        labels: BTreeSet::new(),
        has_good_first: false,
        has_confirmed: true,
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

// Scenario S4 (spec §8): an abandoned issue's record stays queryable by
// status and is excluded from the active count, but is not deleted until
// the retention window in `cleanup` elapses.
#[tokio::test]
async fn abandoned_issue_leaves_the_active_count_but_remains_until_cleanup() {
    let tracker = tracker().await;
    let now = Utc::now();
    let url = "https://forge.example/owner/repo/issues/42";

    tracker.get_or_create(url, facts(0.82), now).await.unwrap();
    assert_eq!(tracker.get_active_count().await.unwrap(), 1);

    tracker.transition(url, WorkflowStatus::Notified, now).await.unwrap();
    tracker.transition(url, WorkflowStatus::AskedAssignment, now).await.unwrap();
    tracker.transition(url, WorkflowStatus::Abandoned, now).await.unwrap();

    assert_eq!(tracker.get_active_count().await.unwrap(), 0);
    let abandoned = tracker.get_by_status(WorkflowStatus::Abandoned).await.unwrap();
    assert_eq!(abandoned.len(), 1);
    assert_eq!(abandoned[0].issue_url, url);

    assert!(tracker.get(url).await.unwrap().is_some());
}

#[tokio::test]
async fn asking_for_assignment_twice_requires_distinct_issues() {
    let tracker = tracker().await;
    let now = Utc::now();

    let a = "https://forge.example/owner/repo/issues/1";
    let b = "https://forge.example/owner/repo/issues/2";
    tracker.get_or_create(a, facts(0.95), now).await.unwrap();
    tracker.get_or_create(b, facts(0.93), now).await.unwrap();

    for url in [a, b] {
        tracker.transition(url, WorkflowStatus::Notified, now).await.unwrap();
        tracker.transition(url, WorkflowStatus::AskedAssignment, now).await.unwrap();
    }

    let asked = tracker.get_by_status(WorkflowStatus::AskedAssignment).await.unwrap();
    assert_eq!(asked.len(), 2);
}

#[tokio::test]
async fn dispatcher_failure_annotation_does_not_advance_status() {
    let tracker = tracker().await;
    let now = Utc::now();
    let url = "https://forge.example/owner/repo/issues/7";
    tracker.get_or_create(url, facts(0.8), now).await.unwrap();

    tracker.annotate(url, "comment post failed: transient 503", now).await.unwrap();

    let record = tracker.get(url).await.unwrap().unwrap();
    assert_eq!(record.status, WorkflowStatus::New);
    assert_eq!(record.notes.len(), 1);
}
