use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Repo
// ---------------------------------------------------------------------------

/// A watched repository, identified by `(owner, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub owner: String,
    pub name: String,
    pub category: String,
    /// Lower sorts first when the scheduler enumerates repos.
    pub priority: i32,
    pub min_stars: u64,
    pub language: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub label_include: Vec<String>,
    #[serde(default)]
    pub label_exclude: Vec<String>,
}

impl Repo {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Star count and activity metadata fetched alongside a repo (best-effort;
/// absence degrades scoring factors to neutral, never an error).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoMeta {
    pub stars: u64,
    pub language: Option<String>,
    pub last_commit_at: Option<DateTime<Utc>>,
    pub monthly_commits: Option<u32>,
    pub monthly_prs: Option<u32>,
}

// ---------------------------------------------------------------------------
// Issue (raw, forge-provided)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub url: String,
    pub title: String,
    pub body: Option<String>,
    pub state: IssueState,
    pub labels: BTreeSet<String>,
    pub comments: u64,
    pub assignees: BTreeSet<String>,
    pub linked_prs: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `true` when the forge returned this record for a pull request rather
    /// than a plain issue (GitHub models both under `/issues`). The
    /// qualification filter (C6) hard-rejects these (spec §4.2).
    #[serde(default)]
    pub is_pull_request: bool,
}

impl Issue {
    pub fn has_assignee(&self) -> bool {
        !self.assignees.is_empty()
    }

    pub fn has_linked_pr(&self) -> bool {
        !self.linked_prs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Candidate — an issue that survived qualification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifiedType {
    Bug,
    Feature,
    Enhancement,
    HelpWanted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssuePriority {
    P0,
    P1,
    P2,
    P3,
    P4,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub issue: Issue,
    pub repo: Repo,
    pub qualified_type: QualifiedType,
    pub has_confirmed: bool,
    pub has_good_first: bool,
    pub has_assignee: bool,
    pub has_linked_pr: bool,
    pub has_clear_repro: bool,
    pub has_acceptance_criteria: bool,
    pub priority: Option<IssuePriority>,
    /// Age of the issue at the moment it was qualified.
    pub age: chrono::Duration,
}

// ---------------------------------------------------------------------------
// ScoreBreakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    APlus,
    A,
    BPlus,
    B,
    C,
    D,
    F,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreFactors {
    pub stars: f64,
    pub comments: f64,
    pub recency: f64,
    pub labels: f64,
    pub difficulty: f64,
    pub description: f64,
    pub activity: f64,
    pub maintainer: f64,
    pub bonus: f64,
    pub penalty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub factors: ScoreFactors,
    pub total: f64,
    pub grade: Grade,
    pub recommended: bool,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    NotifyLocal,
    NotifyEmail,
    Comment,
    AskAssignment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub issue_url: String,
    pub project_key: String,
    pub score: f64,
    pub body: Option<String>,
    pub rationale: String,
}

/// The outcome of dispatching an `Action`. Never thrown across component
/// boundaries — always returned as a value (Design Note, §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionOutcome {
    Done,
    Skipped { reason: String },
    Failed { kind: FailureKind, detail: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transient,
    Permanent,
}

// ---------------------------------------------------------------------------
// TrustRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    None,
    New,
    Contributor,
    Regular,
    Maintainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustRecord {
    pub repo_key: String,
    pub merged_commits: u32,
    pub prs: u32,
    pub comments: u32,
    pub last_activity: Option<DateTime<Utc>>,
    pub trust_level: TrustLevel,
}

impl TrustRecord {
    pub fn new(repo_key: impl Into<String>) -> Self {
        Self {
            repo_key: repo_key.into(),
            merged_commits: 0,
            prs: 0,
            comments: 0,
            last_activity: None,
            trust_level: TrustLevel::None,
        }
    }

    pub fn total(&self) -> u32 {
        self.merged_commits + self.prs + self.comments
    }
}

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    New,
    Notified,
    AskedAssignment,
    Assigned,
    InProgress,
    PrSubmitted,
    Completed,
    Abandoned,
}

impl WorkflowStatus {
    /// `true` for states that never produce further outbound actions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Abandoned)
    }

    /// Returns `true` when a transition from `self` to `target` is valid,
    /// per the state diagram in spec §4.5.
    pub fn can_transition_to(&self, target: &WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        matches!(
            (self, target),
            (New, Notified)
                | (Notified, AskedAssignment)
                | (AskedAssignment, Assigned)
                | (AskedAssignment, Abandoned)
                | (Assigned, InProgress)
                | (Assigned, Abandoned)
                | (InProgress, PrSubmitted)
                | (InProgress, Abandoned)
                | (PrSubmitted, Completed)
                | (PrSubmitted, Abandoned)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub issue_url: String,
    pub status: WorkflowStatus,
    pub score: f64,
    pub labels: BTreeSet<String>,
    pub has_good_first: bool,
    pub has_confirmed: bool,
    pub has_assignee: bool,
    pub has_pr: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notified_at: Option<DateTime<Utc>>,
    pub assignment_asked_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Vec<String>,
}

impl WorkflowRecord {
    pub fn new(issue_url: impl Into<String>, score: f64, now: DateTime<Utc>) -> Self {
        Self {
            issue_url: issue_url.into(),
            status: WorkflowStatus::New,
            score,
            labels: BTreeSet::new(),
            has_good_first: false,
            has_confirmed: false,
            has_assignee: false,
            has_pr: false,
            created_at: now,
            updated_at: now,
            notified_at: None,
            assignment_asked_at: None,
            started_at: None,
            completed_at: None,
            notes: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SmartComment / CommentHistoryEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    Feature,
    Docs,
    Performance,
    Security,
    Enhancement,
    Question,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartComment {
    pub body: String,
    pub score: f64,
    pub issue_type: IssueType,
    pub quality_flags: Vec<String>,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentHistoryEntry {
    pub issue_url: String,
    pub repo_key: String,
    pub body: String,
    pub posted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Budget bucket keys
// ---------------------------------------------------------------------------

/// Identifies a rolling time bucket. Bucket identity is
/// `truncate(now, bucket_size)`, computed once by the caller so that
/// rollover is idempotent with respect to wall-clock jumps (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketKind {
    Hour,
    Day,
    /// Week starting Monday.
    Week,
}
