//! Anti-Spam / Smart-Limiter (C8): the single authorization oracle every
//! outbound action passes through before dispatch (spec §4.4). Composed
//! with the trust policy (`scout_trust::authorize`) via logical AND at
//! the call site in scout-daemon — either gate can veto an action, and
//! this crate knows nothing about trust levels.
//!
//! Budget state lives in `scout_core::persistence::Store`'s bucket
//! counters, keyed by `"{action}:{window}[:{scope}]"` and truncated to a
//! stable bucket identity via `scout_core::clock::bucket_start` so that
//! restarts or wall-clock jumps never reset or double-count a window
//! (spec §4.4, testable property 1).
//!
//! `authorize` and `record` are kept as separate calls per spec §4.4's
//! API shape, but a per-key `tokio::sync::Mutex` serializes the
//! check-then-increment sequence so two concurrent workers can't both
//! observe "under budget" and both proceed (spec §8 testable property 2:
//! "the same action is never double-counted under concurrency").

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use scout_core::clock::{bucket_start, Clock};
use scout_core::config::BudgetConfig;
use scout_core::persistence::Store;
use scout_core::types::BucketKind;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    HourlyCapReached,
    DailyCapReached,
    WeeklyCapReached,
    PerProjectCapReached,
    PerRepoCapReached,
    CooldownActive { retry_after_minutes: i64 },
    NeverNotifyTwice,
    ForgeCallBudgetExhausted,
}

pub struct SmartLimiter {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    config: BudgetConfig,
    key_locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl SmartLimiter {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, config: BudgetConfig) -> Self {
        Self { store, clock, config, key_locks: DashMap::new() }
    }

    fn lock_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        self.key_locks.entry(key.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    async fn count(&self, key: &str, kind: BucketKind) -> scout_core::errors::StoreResult<u64> {
        let bucket = bucket_start(self.clock.now(), kind);
        self.store.get_bucket_count(key, bucket).await
    }

    async fn increment(&self, key: &str, kind: BucketKind) -> scout_core::errors::StoreResult<u64> {
        let bucket = bucket_start(self.clock.now(), kind);
        self.store.increment_bucket(key, bucket).await
    }

    /// Checks the hourly/daily/per-project caps and the never-notify-twice
    /// rule for a "new issue found" notification. Does not record; call
    /// `record_notify` after the transport succeeds.
    pub async fn authorize_notify(&self, project_key: &str) -> Result<(), Denial> {
        let _guard = self.lock_for(&format!("notify:{project_key}")).lock().await;

        if self.config.never_notify_twice {
            let per_project = self
                .count(&format!("notify:project:{project_key}"), BucketKind::Week)
                .await
                .unwrap_or(0);
            if per_project >= 1 {
                return Err(Denial::NeverNotifyTwice);
            }
        } else {
            let per_project = self
                .count(&format!("notify:project:{project_key}"), BucketKind::Day)
                .await
                .unwrap_or(0);
            if per_project >= self.config.notify_max_per_project as u64 {
                return Err(Denial::PerProjectCapReached);
            }
        }

        let hourly = self.count("notify:hour", BucketKind::Hour).await.unwrap_or(0);
        if hourly >= self.config.notify_max_per_hour as u64 {
            return Err(Denial::HourlyCapReached);
        }

        let daily = self.count("notify:day", BucketKind::Day).await.unwrap_or(0);
        if daily >= self.config.notify_max_per_day as u64 {
            return Err(Denial::DailyCapReached);
        }

        Ok(())
    }

    pub async fn record_notify(&self, project_key: &str) {
        let _guard = self.lock_for(&format!("notify:{project_key}")).lock().await;
        let _ = self.increment("notify:hour", BucketKind::Hour).await;
        let _ = self.increment("notify:day", BucketKind::Day).await;
        let _ = self.increment(&format!("notify:project:{project_key}"), BucketKind::Week).await;
    }

    /// Checks the comment budget: a base daily cap, relaxed to the higher
    /// cap only when `great_candidate_repo_spread` shows at least 3
    /// distinct repos with a candidate scoring at or above
    /// `great_quality_threshold` today (spec §4.4 "great day" relaxation),
    /// plus the weekly cap, per-repo daily cap, and minimum-interval
    /// cooldown between comments.
    pub async fn authorize_comment(
        &self,
        repo_key: &str,
        great_candidate_repo_spread: usize,
    ) -> Result<(), Denial> {
        let _guard = self.lock_for(&format!("comment:{repo_key}")).lock().await;
        let now = self.clock.now();

        if self.config.min_hours_between_comments > 0 {
            if let Ok(Some(last)) = self.store.last_comment_at().await {
                let min_gap = Duration::hours(self.config.min_hours_between_comments as i64);
                let elapsed = now.signed_duration_since(last);
                if elapsed < min_gap {
                    let retry_after = (min_gap - elapsed).num_minutes().max(0);
                    return Err(Denial::CooldownActive { retry_after_minutes: retry_after });
                }
            }
        }

        let daily_cap = if great_candidate_repo_spread >= 3 {
            self.config.comments_max_per_day
        } else {
            self.config.comments_base_max_per_day
        };

        let today = now - Duration::days(1);
        let daily = self.store.comment_count_since(today).await.unwrap_or(0);
        if daily >= daily_cap as u64 {
            return Err(Denial::DailyCapReached);
        }

        let this_week = now - Duration::days(7);
        let weekly = self.store.comment_count_since(this_week).await.unwrap_or(0);
        if weekly >= self.config.comments_max_per_week as u64 {
            return Err(Denial::WeeklyCapReached);
        }

        let per_repo = self.store.comment_count_for_repo_since(repo_key, today).await.unwrap_or(0);
        if per_repo >= self.config.comments_max_per_repo_per_day as u64 {
            return Err(Denial::PerRepoCapReached);
        }

        Ok(())
    }

    /// Comments are recorded by the caller via `Store::record_comment` once
    /// posted (it doubles as the history used for near-duplicate checks in
    /// scout-comment), so this budget has no separate counter to bump.
    pub async fn record_comment(&self) {}

    pub async fn authorize_assignment_request(&self, repo_key: &str) -> Result<(), Denial> {
        let _guard = self.lock_for(&format!("assignment:{repo_key}")).lock().await;

        let daily = self.count("assignment:day", BucketKind::Day).await.unwrap_or(0);
        if daily >= self.config.assignment_max_per_day as u64 {
            return Err(Denial::DailyCapReached);
        }

        let cooldown_key = format!("assignment:repo:{repo_key}");
        let bucket = bucket_start(self.clock.now(), BucketKind::Day);
        let last_count = self.store.get_bucket_count(&cooldown_key, bucket).await.unwrap_or(0);
        if last_count > 0 {
            return Err(Denial::CooldownActive {
                retry_after_minutes: self.config.assignment_repo_cooldown_minutes as i64,
            });
        }

        Ok(())
    }

    pub async fn record_assignment_request(&self, repo_key: &str) {
        let _guard = self.lock_for(&format!("assignment:{repo_key}")).lock().await;
        let _ = self.increment("assignment:day", BucketKind::Day).await;
        let bucket = bucket_start(self.clock.now(), BucketKind::Day);
        let cooldown_key = format!("assignment:repo:{repo_key}");
        let _ = self.store.increment_bucket(&cooldown_key, bucket).await;
    }

    pub async fn authorize_forge_call(&self) -> Result<(), Denial> {
        let used = self.count("forge:calls", BucketKind::Hour).await.unwrap_or(0);
        if used >= self.config.forge_calls_max_per_hour as u64 {
            return Err(Denial::ForgeCallBudgetExhausted);
        }
        Ok(())
    }

    pub async fn record_forge_call(&self) {
        let _ = self.increment("forge:calls", BucketKind::Hour).await;
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current usage against every cap this limiter enforces, for the
    /// `limits` CLI subcommand. Read-only: never touches `key_locks`, so a
    /// concurrent authorize/record elsewhere can't deadlock on it.
    pub async fn usage_snapshot(&self) -> LimiterSnapshot {
        let now = self.clock.now();
        let notify_hour = self.count("notify:hour", BucketKind::Hour).await.unwrap_or(0);
        let notify_day = self.count("notify:day", BucketKind::Day).await.unwrap_or(0);
        let comments_today = self.store.comment_count_since(now - Duration::days(1)).await.unwrap_or(0);
        let comments_this_week = self.store.comment_count_since(now - Duration::days(7)).await.unwrap_or(0);
        let assignments_today = self.count("assignment:day", BucketKind::Day).await.unwrap_or(0);
        let forge_calls_this_hour = self.count("forge:calls", BucketKind::Hour).await.unwrap_or(0);

        LimiterSnapshot {
            notify_hour,
            notify_hour_cap: self.config.notify_max_per_hour as u64,
            notify_day,
            notify_day_cap: self.config.notify_max_per_day as u64,
            comments_today,
            comments_today_cap: self.config.comments_base_max_per_day as u64,
            comments_this_week,
            comments_week_cap: self.config.comments_max_per_week as u64,
            assignments_today,
            assignments_day_cap: self.config.assignment_max_per_day as u64,
            forge_calls_this_hour,
            forge_calls_hour_cap: self.config.forge_calls_max_per_hour as u64,
        }
    }
}

/// A point-in-time read of every budget counter against its cap.
#[derive(Debug, Clone)]
pub struct LimiterSnapshot {
    pub notify_hour: u64,
    pub notify_hour_cap: u64,
    pub notify_day: u64,
    pub notify_day_cap: u64,
    pub comments_today: u64,
    pub comments_today_cap: u64,
    pub comments_this_week: u64,
    pub comments_week_cap: u64,
    pub assignments_today: u64,
    pub assignments_day_cap: u64,
    pub forge_calls_this_hour: u64,
    pub forge_calls_hour_cap: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scout_core::clock::FixedClock;
    use scout_core::persistence::FileStore;
    use tempfile::tempdir;

    async fn limiter(config: BudgetConfig) -> (SmartLimiter, Arc<FixedClock>) {
        let dir = tempdir().unwrap();
        let store: Arc<dyn Store> = Arc::new(FileStore::open(dir.path()).unwrap());
        std::mem::forget(dir);
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        let limiter = SmartLimiter::new(store, clock.clone(), config);
        (limiter, clock)
    }

    fn config() -> BudgetConfig {
        BudgetConfig {
            notify_max_per_hour: 2,
            notify_max_per_day: 5,
            notify_max_per_project: 2,
            notify_min_interval_minutes: 5,
            never_notify_twice: true,
            notify_email_min_score: 0.0,
            comments_base_max_per_day: 3,
            comments_max_per_day: 7,
            comments_max_per_week: 15,
            comments_max_per_repo_per_day: 1,
            min_score_to_comment: 0.70,
            great_quality_threshold: 0.85,
            assignment_max_per_day: 5,
            assignment_repo_cooldown_minutes: 30,
            forge_calls_max_per_hour: 4000,
            min_hours_between_comments: 0,
        }
    }

    #[tokio::test]
    async fn never_notify_twice_blocks_second_notification_for_same_project() {
        let (limiter, _clock) = limiter(config()).await;
        limiter.authorize_notify("o/r").await.expect("first should be allowed");
        limiter.record_notify("o/r").await;
        let second = limiter.authorize_notify("o/r").await;
        assert_eq!(second.unwrap_err(), Denial::NeverNotifyTwice);
    }

    #[tokio::test]
    async fn hourly_cap_blocks_after_limit_reached() {
        let (limiter, _clock) = limiter(config()).await;
        limiter.authorize_notify("a").await.unwrap();
        limiter.record_notify("a").await;
        limiter.authorize_notify("b").await.unwrap();
        limiter.record_notify("b").await;
        let third = limiter.authorize_notify("c").await;
        assert_eq!(third.unwrap_err(), Denial::HourlyCapReached);
    }

    #[tokio::test]
    async fn hourly_bucket_rolls_over_idempotently() {
        let (limiter, clock) = limiter(config()).await;
        limiter.authorize_notify("a").await.unwrap();
        limiter.record_notify("a").await;
        limiter.authorize_notify("b").await.unwrap();
        limiter.record_notify("b").await;
        clock.advance(Duration::hours(1));
        // next hour bucket should be fresh even though the week-scoped
        // per-project counter is untouched by the rollover
        assert!(limiter.count("notify:hour", BucketKind::Hour).await.unwrap() == 0);
    }

    #[tokio::test]
    async fn comment_daily_cap_relaxes_on_great_day() {
        let (limiter, _clock) = limiter(config()).await;
        let result = limiter.authorize_comment("o/r", 3).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn usage_snapshot_reflects_recorded_notifies() {
        let (limiter, _clock) = limiter(config()).await;
        limiter.authorize_notify("o/r").await.unwrap();
        limiter.record_notify("o/r").await;
        let snapshot = limiter.usage_snapshot().await;
        assert_eq!(snapshot.notify_hour, 1);
        assert_eq!(snapshot.notify_hour_cap, 2);
    }

    #[tokio::test]
    async fn forge_call_budget_blocks_when_exhausted() {
        let mut cfg = config();
        cfg.forge_calls_max_per_hour = 1;
        let (limiter, _clock) = limiter(cfg).await;
        limiter.authorize_forge_call().await.unwrap();
        limiter.record_forge_call().await;
        let second = limiter.authorize_forge_call().await;
        assert_eq!(second.unwrap_err(), Denial::ForgeCallBudgetExhausted);
    }
}
