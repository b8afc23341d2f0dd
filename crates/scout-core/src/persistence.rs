//! Persistence layer: one `Store` trait, two back-ends (spec §6:
//! `PERSISTENCE_BACKEND=sqlite|file`). Every caller — the workflow tracker
//! (C10), the anti-spam budget oracle (C8), and the trust policy (C9) —
//! talks only to the trait, never to `SqliteStore`/`FileStore` directly, so
//! swapping back-ends changes no call site (Design Note, spec §9).
//!
//! The sqlite back-end is grounded on `at_core::cache::CacheDb`: a single
//! `tokio_rusqlite::Connection`, WAL mode, enum columns serialized through
//! serde. The file back-end is grounded on `at_core::lockfile`'s
//! create-new-then-rename idiom for atomic writes, generalized from a single
//! lockfile to one JSON document per table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_rusqlite::Connection;

use crate::config::{PersistenceBackend, PersistenceConfig};
use crate::errors::{StoreError, StoreResult};
use crate::types::{CommentHistoryEntry, TrustRecord, WorkflowRecord, WorkflowStatus};

/// Opens whichever backend `config.backend` names (spec §6
/// `PERSISTENCE_BACKEND=sqlite|file`), returning it already boxed as the
/// trait object every other component depends on.
pub async fn open_store(config: &PersistenceConfig) -> StoreResult<Arc<dyn Store>> {
    match config.backend {
        PersistenceBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&config.sqlite_path).await?)),
        PersistenceBackend::File => Ok(Arc::new(FileStore::open(&config.file_dir)?)),
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn upsert_workflow(&self, record: &WorkflowRecord) -> StoreResult<()>;
    async fn get_workflow(&self, issue_url: &str) -> StoreResult<Option<WorkflowRecord>>;
    async fn list_workflow_by_status(&self, status: WorkflowStatus) -> StoreResult<Vec<WorkflowRecord>>;
    /// Every workflow record regardless of status, most recently updated
    /// first. Backs the `list`/`status`/`stats` CLI verbs, which summarize
    /// across the whole pipeline rather than one state at a time.
    async fn list_all_workflow(&self) -> StoreResult<Vec<WorkflowRecord>>;
    async fn count_active_workflow(&self) -> StoreResult<u64>;
    async fn delete_workflow(&self, issue_url: &str) -> StoreResult<()>;
    async fn prune_terminal_before(&self, before: DateTime<Utc>) -> StoreResult<u64>;

    async fn get_trust(&self, repo_key: &str) -> StoreResult<Option<TrustRecord>>;
    async fn upsert_trust(&self, record: &TrustRecord) -> StoreResult<()>;

    async fn record_comment(&self, entry: &CommentHistoryEntry) -> StoreResult<()>;
    async fn recent_comments_for_issue(&self, issue_url: &str, limit: usize) -> StoreResult<Vec<CommentHistoryEntry>>;
    /// Most recent comments across every issue, newest first. Backs the
    /// `history [N]` CLI verb.
    async fn recent_comments(&self, limit: usize) -> StoreResult<Vec<CommentHistoryEntry>>;
    async fn comment_count_since(&self, since: DateTime<Utc>) -> StoreResult<u64>;
    async fn comment_count_for_repo_since(&self, repo_key: &str, since: DateTime<Utc>) -> StoreResult<u64>;
    async fn last_comment_at(&self) -> StoreResult<Option<DateTime<Utc>>>;

    /// Returns the counter value *after* incrementing it by one.
    async fn increment_bucket(&self, key: &str, bucket_start: DateTime<Utc>) -> StoreResult<u64>;
    async fn get_bucket_count(&self, key: &str, bucket_start: DateTime<Utc>) -> StoreResult<u64>;
}

fn enum_to_sql<T: serde::Serialize>(val: &T) -> String {
    serde_json::to_string(val).expect("serialize enum").trim_matches('"').to_string()
}

fn enum_from_sql<T: serde::de::DeserializeOwned>(raw: &str) -> T {
    serde_json::from_str(&format!("\"{raw}\"")).expect("deserialize enum")
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).expect("valid timestamp").with_timezone(&Utc)
}

// ---------------------------------------------------------------------------
// Sqlite back-end
// ---------------------------------------------------------------------------

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "
                    PRAGMA journal_mode=WAL;
                    PRAGMA synchronous=NORMAL;
                    PRAGMA busy_timeout=5000;

                    CREATE TABLE IF NOT EXISTS workflow (
                        issue_url       TEXT PRIMARY KEY,
                        status          TEXT NOT NULL,
                        score           REAL NOT NULL,
                        labels          TEXT NOT NULL,
                        has_good_first  INTEGER NOT NULL,
                        has_confirmed   INTEGER NOT NULL,
                        has_assignee    INTEGER NOT NULL,
                        has_pr          INTEGER NOT NULL,
                        created_at      TEXT NOT NULL,
                        updated_at      TEXT NOT NULL,
                        notified_at     TEXT,
                        assignment_asked_at TEXT,
                        started_at      TEXT,
                        completed_at    TEXT,
                        notes           TEXT NOT NULL
                    );
                    CREATE INDEX IF NOT EXISTS idx_workflow_status ON workflow(status);

                    CREATE TABLE IF NOT EXISTS trust (
                        repo_key        TEXT PRIMARY KEY,
                        merged_commits  INTEGER NOT NULL,
                        prs             INTEGER NOT NULL,
                        comments        INTEGER NOT NULL,
                        last_activity   TEXT,
                        trust_level     TEXT NOT NULL
                    );

                    CREATE TABLE IF NOT EXISTS comment_history (
                        id          INTEGER PRIMARY KEY AUTOINCREMENT,
                        issue_url   TEXT NOT NULL,
                        repo_key    TEXT NOT NULL,
                        body        TEXT NOT NULL,
                        posted_at   TEXT NOT NULL
                    );
                    CREATE INDEX IF NOT EXISTS idx_comment_issue ON comment_history(issue_url);
                    CREATE INDEX IF NOT EXISTS idx_comment_repo  ON comment_history(repo_key);
                    CREATE INDEX IF NOT EXISTS idx_comment_time  ON comment_history(posted_at);

                    CREATE TABLE IF NOT EXISTS buckets (
                        bucket_key      TEXT NOT NULL,
                        bucket_start    TEXT NOT NULL,
                        count           INTEGER NOT NULL,
                        PRIMARY KEY (bucket_key, bucket_start)
                    );
                    ",
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn row_to_workflow(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkflowRecord> {
    let status_str: String = row.get(1)?;
    let labels_str: String = row.get(3)?;
    let notes_str: String = row.get(14)?;
    Ok(WorkflowRecord {
        issue_url: row.get(0)?,
        status: enum_from_sql(&status_str),
        score: row.get(2)?,
        labels: serde_json::from_str(&labels_str).unwrap_or_default(),
        has_good_first: row.get::<_, i64>(4)? != 0,
        has_confirmed: row.get::<_, i64>(5)? != 0,
        has_assignee: row.get::<_, i64>(6)? != 0,
        has_pr: row.get::<_, i64>(7)? != 0,
        created_at: parse_rfc3339(&row.get::<_, String>(8)?),
        updated_at: parse_rfc3339(&row.get::<_, String>(9)?),
        notified_at: row.get::<_, Option<String>>(10)?.map(|s| parse_rfc3339(&s)),
        assignment_asked_at: row.get::<_, Option<String>>(11)?.map(|s| parse_rfc3339(&s)),
        started_at: row.get::<_, Option<String>>(12)?.map(|s| parse_rfc3339(&s)),
        completed_at: row.get::<_, Option<String>>(13)?.map(|s| parse_rfc3339(&s)),
        notes: serde_json::from_str(&notes_str).unwrap_or_default(),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_workflow(&self, record: &WorkflowRecord) -> StoreResult<()> {
        let record = record.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO workflow (issue_url, status, score, labels, has_good_first,
                        has_confirmed, has_assignee, has_pr, created_at, updated_at,
                        notified_at, assignment_asked_at, started_at, completed_at, notes)
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)
                     ON CONFLICT(issue_url) DO UPDATE SET
                        status=excluded.status, score=excluded.score, labels=excluded.labels,
                        has_good_first=excluded.has_good_first, has_confirmed=excluded.has_confirmed,
                        has_assignee=excluded.has_assignee, has_pr=excluded.has_pr,
                        updated_at=excluded.updated_at, notified_at=excluded.notified_at,
                        assignment_asked_at=excluded.assignment_asked_at,
                        started_at=excluded.started_at, completed_at=excluded.completed_at,
                        notes=excluded.notes",
                    rusqlite::params![
                        record.issue_url,
                        enum_to_sql(&record.status),
                        record.score,
                        serde_json::to_string(&record.labels).unwrap_or_default(),
                        record.has_good_first as i64,
                        record.has_confirmed as i64,
                        record.has_assignee as i64,
                        record.has_pr as i64,
                        record.created_at.to_rfc3339(),
                        record.updated_at.to_rfc3339(),
                        record.notified_at.map(|d| d.to_rfc3339()),
                        record.assignment_asked_at.map(|d| d.to_rfc3339()),
                        record.started_at.map(|d| d.to_rfc3339()),
                        record.completed_at.map(|d| d.to_rfc3339()),
                        serde_json::to_string(&record.notes).unwrap_or_default(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn get_workflow(&self, issue_url: &str) -> StoreResult<Option<WorkflowRecord>> {
        let issue_url = issue_url.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT issue_url, status, score, labels, has_good_first, has_confirmed,
                            has_assignee, has_pr, created_at, updated_at, notified_at,
                            assignment_asked_at, started_at, completed_at, notes
                     FROM workflow WHERE issue_url = ?1",
                )?;
                let mut rows = stmt.query(rusqlite::params![issue_url])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row_to_workflow(row)?)),
                    None => Ok(None),
                }
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn list_workflow_by_status(&self, status: WorkflowStatus) -> StoreResult<Vec<WorkflowRecord>> {
        let status_str = enum_to_sql(&status);
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT issue_url, status, score, labels, has_good_first, has_confirmed,
                            has_assignee, has_pr, created_at, updated_at, notified_at,
                            assignment_asked_at, started_at, completed_at, notes
                     FROM workflow WHERE status = ?1 ORDER BY score DESC",
                )?;
                let mut rows = stmt.query(rusqlite::params![status_str])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(row_to_workflow(row)?);
                }
                Ok(out)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn list_all_workflow(&self) -> StoreResult<Vec<WorkflowRecord>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT issue_url, status, score, labels, has_good_first, has_confirmed,
                            has_assignee, has_pr, created_at, updated_at, notified_at,
                            assignment_asked_at, started_at, completed_at, notes
                     FROM workflow ORDER BY updated_at DESC",
                )?;
                let mut rows = stmt.query([])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(row_to_workflow(row)?);
                }
                Ok(out)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn count_active_workflow(&self) -> StoreResult<u64> {
        self.conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM workflow WHERE status NOT IN ('completed', 'abandoned')",
                    [],
                    |r| r.get::<_, i64>(0),
                )
                .map(|n| n as u64)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn delete_workflow(&self, issue_url: &str) -> StoreResult<()> {
        let issue_url = issue_url.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM workflow WHERE issue_url = ?1", rusqlite::params![issue_url])?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn prune_terminal_before(&self, before: DateTime<Utc>) -> StoreResult<u64> {
        let before = before.to_rfc3339();
        self.conn
            .call(move |conn| {
                let n = conn.execute(
                    "DELETE FROM workflow WHERE status IN ('completed', 'abandoned') AND updated_at < ?1",
                    rusqlite::params![before],
                )?;
                Ok(n as u64)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn get_trust(&self, repo_key: &str) -> StoreResult<Option<TrustRecord>> {
        let repo_key = repo_key.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT repo_key, merged_commits, prs, comments, last_activity, trust_level
                     FROM trust WHERE repo_key = ?1",
                )?;
                let mut rows = stmt.query(rusqlite::params![repo_key])?;
                match rows.next()? {
                    Some(row) => {
                        let trust_level_str: String = row.get(5)?;
                        let last_activity: Option<String> = row.get(4)?;
                        Ok(Some(TrustRecord {
                            repo_key: row.get(0)?,
                            merged_commits: row.get(1)?,
                            prs: row.get(2)?,
                            comments: row.get(3)?,
                            last_activity: last_activity.map(|s| parse_rfc3339(&s)),
                            trust_level: enum_from_sql(&trust_level_str),
                        }))
                    }
                    None => Ok(None),
                }
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn upsert_trust(&self, record: &TrustRecord) -> StoreResult<()> {
        let record = record.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO trust (repo_key, merged_commits, prs, comments, last_activity, trust_level)
                     VALUES (?1,?2,?3,?4,?5,?6)
                     ON CONFLICT(repo_key) DO UPDATE SET
                        merged_commits=excluded.merged_commits, prs=excluded.prs,
                        comments=excluded.comments, last_activity=excluded.last_activity,
                        trust_level=excluded.trust_level",
                    rusqlite::params![
                        record.repo_key,
                        record.merged_commits,
                        record.prs,
                        record.comments,
                        record.last_activity.map(|d| d.to_rfc3339()),
                        enum_to_sql(&record.trust_level),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn record_comment(&self, entry: &CommentHistoryEntry) -> StoreResult<()> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO comment_history (issue_url, repo_key, body, posted_at) VALUES (?1,?2,?3,?4)",
                    rusqlite::params![entry.issue_url, entry.repo_key, entry.body, entry.posted_at.to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn recent_comments_for_issue(&self, issue_url: &str, limit: usize) -> StoreResult<Vec<CommentHistoryEntry>> {
        let issue_url = issue_url.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT issue_url, repo_key, body, posted_at FROM comment_history
                     WHERE issue_url = ?1 ORDER BY posted_at DESC LIMIT ?2",
                )?;
                let mut rows = stmt.query(rusqlite::params![issue_url, limit as i64])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    let posted_at: String = row.get(3)?;
                    out.push(CommentHistoryEntry {
                        issue_url: row.get(0)?,
                        repo_key: row.get(1)?,
                        body: row.get(2)?,
                        posted_at: parse_rfc3339(&posted_at),
                    });
                }
                Ok(out)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn recent_comments(&self, limit: usize) -> StoreResult<Vec<CommentHistoryEntry>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT issue_url, repo_key, body, posted_at FROM comment_history
                     ORDER BY posted_at DESC LIMIT ?1",
                )?;
                let mut rows = stmt.query(rusqlite::params![limit as i64])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    let posted_at: String = row.get(3)?;
                    out.push(CommentHistoryEntry {
                        issue_url: row.get(0)?,
                        repo_key: row.get(1)?,
                        body: row.get(2)?,
                        posted_at: parse_rfc3339(&posted_at),
                    });
                }
                Ok(out)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn comment_count_since(&self, since: DateTime<Utc>) -> StoreResult<u64> {
        let since = since.to_rfc3339();
        self.conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM comment_history WHERE posted_at >= ?1",
                    rusqlite::params![since],
                    |r| r.get::<_, i64>(0),
                )
                .map(|n| n as u64)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn comment_count_for_repo_since(&self, repo_key: &str, since: DateTime<Utc>) -> StoreResult<u64> {
        let repo_key = repo_key.to_string();
        let since = since.to_rfc3339();
        self.conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM comment_history WHERE repo_key = ?1 AND posted_at >= ?2",
                    rusqlite::params![repo_key, since],
                    |r| r.get::<_, i64>(0),
                )
                .map(|n| n as u64)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn last_comment_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT MAX(posted_at) FROM comment_history", [], |r| {
                    r.get::<_, Option<String>>(0)
                })
            })
            .await
            .map(|opt| opt.map(|s| parse_rfc3339(&s)))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn increment_bucket(&self, key: &str, bucket_start: DateTime<Utc>) -> StoreResult<u64> {
        let key = key.to_string();
        let bucket_start = bucket_start.to_rfc3339();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO buckets (bucket_key, bucket_start, count) VALUES (?1,?2,1)
                     ON CONFLICT(bucket_key, bucket_start) DO UPDATE SET count = count + 1",
                    rusqlite::params![key, bucket_start],
                )?;
                conn.query_row(
                    "SELECT count FROM buckets WHERE bucket_key = ?1 AND bucket_start = ?2",
                    rusqlite::params![key, bucket_start],
                    |r| r.get::<_, i64>(0),
                )
                .map(|n| n as u64)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn get_bucket_count(&self, key: &str, bucket_start: DateTime<Utc>) -> StoreResult<u64> {
        let key = key.to_string();
        let bucket_start = bucket_start.to_rfc3339();
        self.conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT count FROM buckets WHERE bucket_key = ?1 AND bucket_start = ?2",
                    rusqlite::params![key, bucket_start],
                    |r| r.get::<_, i64>(0),
                )
                .or_else(|e| if matches!(e, rusqlite::Error::QueryReturnedNoRows) { Ok(0) } else { Err(e) })
                .map(|n| n as u64)
            })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// File back-end
// ---------------------------------------------------------------------------

/// JSON-document-per-table back-end for installs that don't want a SQLite
/// dependency. Grounded on the atomic create-then-rename idiom in
/// `at_core::lockfile::DaemonLockfile::acquire`: every write lands in a
/// temp file first, then an atomic rename replaces the table file, so a
/// crash mid-write never corrupts the on-disk copy.
pub struct FileStore {
    dir: PathBuf,
    workflow: Mutex<HashMap<String, WorkflowRecord>>,
    trust: Mutex<HashMap<String, TrustRecord>>,
    comments: Mutex<Vec<CommentHistoryEntry>>,
    buckets: Mutex<HashMap<(String, String), u64>>,
}

#[derive(Default, serde::Serialize, serde::Deserialize)]
struct FileStoreSnapshot {
    workflow: HashMap<String, WorkflowRecord>,
    trust: HashMap<String, TrustRecord>,
    comments: Vec<CommentHistoryEntry>,
    buckets: HashMap<String, u64>,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Io(e.to_string()))?;
        let snapshot_path = dir.join("store.json");
        let snapshot = if snapshot_path.exists() {
            let text = std::fs::read_to_string(&snapshot_path).map_err(|e| StoreError::Io(e.to_string()))?;
            serde_json::from_str::<FileStoreSnapshot>(&text).map_err(|e| StoreError::Serde(e.to_string()))?
        } else {
            FileStoreSnapshot::default()
        };
        let buckets = snapshot
            .buckets
            .into_iter()
            .filter_map(|(k, v)| {
                let (key, bucket) = k.split_once('\u{1f}')?;
                Some(((key.to_string(), bucket.to_string()), v))
            })
            .collect();
        Ok(Self {
            dir,
            workflow: Mutex::new(snapshot.workflow),
            trust: Mutex::new(snapshot.trust),
            comments: Mutex::new(snapshot.comments),
            buckets: Mutex::new(buckets),
        })
    }

    fn persist(&self) -> StoreResult<()> {
        let snapshot = FileStoreSnapshot {
            workflow: self.workflow.lock().expect("workflow lock poisoned").clone(),
            trust: self.trust.lock().expect("trust lock poisoned").clone(),
            comments: self.comments.lock().expect("comments lock poisoned").clone(),
            buckets: self
                .buckets
                .lock()
                .expect("buckets lock poisoned")
                .iter()
                .map(|((k, b), v)| (format!("{k}\u{1f}{b}"), *v))
                .collect(),
        };
        let text = serde_json::to_string_pretty(&snapshot).map_err(|e| StoreError::Serde(e.to_string()))?;
        let tmp = self.dir.join(format!("store.json.tmp.{}", std::process::id()));
        std::fs::write(&tmp, text).map_err(|e| StoreError::Io(e.to_string()))?;
        std::fs::rename(&tmp, self.dir.join("store.json")).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Store for FileStore {
    async fn upsert_workflow(&self, record: &WorkflowRecord) -> StoreResult<()> {
        self.workflow
            .lock()
            .expect("workflow lock poisoned")
            .insert(record.issue_url.clone(), record.clone());
        self.persist()
    }

    async fn get_workflow(&self, issue_url: &str) -> StoreResult<Option<WorkflowRecord>> {
        Ok(self.workflow.lock().expect("workflow lock poisoned").get(issue_url).cloned())
    }

    async fn list_workflow_by_status(&self, status: WorkflowStatus) -> StoreResult<Vec<WorkflowRecord>> {
        let mut out: Vec<WorkflowRecord> = self
            .workflow
            .lock()
            .expect("workflow lock poisoned")
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(out)
    }

    async fn list_all_workflow(&self) -> StoreResult<Vec<WorkflowRecord>> {
        let mut out: Vec<WorkflowRecord> =
            self.workflow.lock().expect("workflow lock poisoned").values().cloned().collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    async fn count_active_workflow(&self) -> StoreResult<u64> {
        Ok(self
            .workflow
            .lock()
            .expect("workflow lock poisoned")
            .values()
            .filter(|r| !r.status.is_terminal())
            .count() as u64)
    }

    async fn delete_workflow(&self, issue_url: &str) -> StoreResult<()> {
        self.workflow.lock().expect("workflow lock poisoned").remove(issue_url);
        self.persist()
    }

    async fn prune_terminal_before(&self, before: DateTime<Utc>) -> StoreResult<u64> {
        let mut guard = self.workflow.lock().expect("workflow lock poisoned");
        let before_count = guard.len();
        guard.retain(|_, r| !(r.status.is_terminal() && r.updated_at < before));
        let removed = (before_count - guard.len()) as u64;
        drop(guard);
        self.persist()?;
        Ok(removed)
    }

    async fn get_trust(&self, repo_key: &str) -> StoreResult<Option<TrustRecord>> {
        Ok(self.trust.lock().expect("trust lock poisoned").get(repo_key).cloned())
    }

    async fn upsert_trust(&self, record: &TrustRecord) -> StoreResult<()> {
        self.trust
            .lock()
            .expect("trust lock poisoned")
            .insert(record.repo_key.clone(), record.clone());
        self.persist()
    }

    async fn record_comment(&self, entry: &CommentHistoryEntry) -> StoreResult<()> {
        self.comments.lock().expect("comments lock poisoned").push(entry.clone());
        self.persist()
    }

    async fn recent_comments_for_issue(&self, issue_url: &str, limit: usize) -> StoreResult<Vec<CommentHistoryEntry>> {
        let mut matches: Vec<CommentHistoryEntry> = self
            .comments
            .lock()
            .expect("comments lock poisoned")
            .iter()
            .filter(|c| c.issue_url == issue_url)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn recent_comments(&self, limit: usize) -> StoreResult<Vec<CommentHistoryEntry>> {
        let mut all: Vec<CommentHistoryEntry> = self.comments.lock().expect("comments lock poisoned").clone();
        all.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        all.truncate(limit);
        Ok(all)
    }

    async fn comment_count_since(&self, since: DateTime<Utc>) -> StoreResult<u64> {
        Ok(self
            .comments
            .lock()
            .expect("comments lock poisoned")
            .iter()
            .filter(|c| c.posted_at >= since)
            .count() as u64)
    }

    async fn comment_count_for_repo_since(&self, repo_key: &str, since: DateTime<Utc>) -> StoreResult<u64> {
        Ok(self
            .comments
            .lock()
            .expect("comments lock poisoned")
            .iter()
            .filter(|c| c.repo_key == repo_key && c.posted_at >= since)
            .count() as u64)
    }

    async fn last_comment_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self
            .comments
            .lock()
            .expect("comments lock poisoned")
            .iter()
            .map(|c| c.posted_at)
            .max())
    }

    async fn increment_bucket(&self, key: &str, bucket_start: DateTime<Utc>) -> StoreResult<u64> {
        let bucket_key = (key.to_string(), bucket_start.to_rfc3339());
        let value = {
            let mut guard = self.buckets.lock().expect("buckets lock poisoned");
            let entry = guard.entry(bucket_key).or_insert(0);
            *entry += 1;
            *entry
        };
        self.persist()?;
        Ok(value)
    }

    async fn get_bucket_count(&self, key: &str, bucket_start: DateTime<Utc>) -> StoreResult<u64> {
        let bucket_key = (key.to_string(), bucket_start.to_rfc3339());
        Ok(*self.buckets.lock().expect("buckets lock poisoned").get(&bucket_key).unwrap_or(&0))
    }
}
