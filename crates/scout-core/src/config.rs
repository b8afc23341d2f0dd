//! Top-level configuration, loaded from `~/.issue-scout/config.toml` and
//! overridden by the environment-variable surface in spec §6.
//!
//! Grounded on `at_core::config::Config`: one section struct per concern,
//! each field carrying its own default, validated at load time rather than
//! branching on loosely-typed maps (Design Note, spec §9).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub qualification: QualificationConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub trust: TrustConfig,
    #[serde(default)]
    pub comment: CommentConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub forge: ForgeConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            persistence: PersistenceConfig::default(),
            scoring: ScoringConfig::default(),
            qualification: QualificationConfig::default(),
            budget: BudgetConfig::default(),
            trust: TrustConfig::default(),
            comment: CommentConfig::default(),
            scheduler: SchedulerConfig::default(),
            forge: ForgeConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl Config {
    /// Load from `~/.issue-scout/config.toml`, falling back to defaults
    /// when the file does not exist, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut cfg = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
            toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            Config::default()
        };
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut cfg: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".issue-scout")
            .join("config.toml")
    }

    /// Apply the environment-variable surface from spec §6. Unset variables
    /// leave the existing (file or default) value untouched.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        use std::env::var;

        if let Ok(v) = var("CHECK_INTERVAL") {
            self.scheduler.check_interval_secs = parse_env("CHECK_INTERVAL", &v)?;
        }
        if let Ok(v) = var("MAX_ISSUES_PER_REPO") {
            self.scheduler.max_issues_per_repo = parse_env("MAX_ISSUES_PER_REPO", &v)?;
        }
        if let Ok(v) = var("MAX_PROJECTS") {
            self.scheduler.max_projects = parse_env("MAX_PROJECTS", &v)?;
        }
        if let Ok(v) = var("LOG_LEVEL") {
            self.general.log_level = v;
        }
        if let Ok(v) = var("LOG_FORMAT") {
            self.general.log_format = v;
        }
        if let Ok(v) = var("DIGEST_MODE") {
            self.scheduler.digest_mode = parse_bool(&v);
        }
        if let Ok(v) = var("DIGEST_TIME") {
            self.scheduler.digest_time = v;
        }

        if let Ok(v) = var("SCORING_WEIGHT_STARS") {
            self.scoring.weight_stars = parse_env("SCORING_WEIGHT_STARS", &v)?;
        }
        if let Ok(v) = var("SCORING_WEIGHT_COMMENTS") {
            self.scoring.weight_comments = parse_env("SCORING_WEIGHT_COMMENTS", &v)?;
        }
        if let Ok(v) = var("SCORING_WEIGHT_RECENCY") {
            self.scoring.weight_recency = parse_env("SCORING_WEIGHT_RECENCY", &v)?;
        }
        if let Ok(v) = var("SCORING_WEIGHT_LABELS") {
            self.scoring.weight_labels = parse_env("SCORING_WEIGHT_LABELS", &v)?;
        }
        if let Ok(v) = var("SCORING_WEIGHT_DIFFICULTY") {
            self.scoring.weight_difficulty = parse_env("SCORING_WEIGHT_DIFFICULTY", &v)?;
        }
        if let Ok(v) = var("SCORING_WEIGHT_DESCRIPTION") {
            self.scoring.weight_description = parse_env("SCORING_WEIGHT_DESCRIPTION", &v)?;
        }
        if let Ok(v) = var("SCORING_WEIGHT_ACTIVITY") {
            self.scoring.weight_activity = parse_env("SCORING_WEIGHT_ACTIVITY", &v)?;
        }
        if let Ok(v) = var("SCORING_WEIGHT_MAINTAINER") {
            self.scoring.weight_maintainer = parse_env("SCORING_WEIGHT_MAINTAINER", &v)?;
        }

        if let Ok(v) = var("NOTIFY_MAX_PER_HOUR") {
            self.budget.notify_max_per_hour = parse_env("NOTIFY_MAX_PER_HOUR", &v)?;
        }
        if let Ok(v) = var("NOTIFY_MAX_PER_DAY") {
            self.budget.notify_max_per_day = parse_env("NOTIFY_MAX_PER_DAY", &v)?;
        }
        if let Ok(v) = var("NOTIFY_EMAIL_MIN_SCORE") {
            self.budget.notify_email_min_score = parse_env("NOTIFY_EMAIL_MIN_SCORE", &v)?;
        }
        if let Ok(v) = var("NEVER_NOTIFY_TWICE") {
            self.budget.never_notify_twice = parse_bool(&v);
        }

        if let Ok(v) = var("QUALIFIED_MIN_SCORE") {
            self.qualification.min_score = parse_env("QUALIFIED_MIN_SCORE", &v)?;
        }
        if let Ok(v) = var("QUALIFIED_TYPES") {
            self.qualification.types = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = var("QUALIFIED_EXCLUDE_LABELS") {
            self.qualification.exclude_labels = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = var("QUALIFIED_INCLUDE_LABELS") {
            self.qualification.include_labels = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = var("QUALIFIED_MIN_STARS") {
            self.qualification.min_stars = parse_env("QUALIFIED_MIN_STARS", &v)?;
        }

        if let Ok(v) = var("AUTO_FINDER_ENABLED") {
            self.scheduler.auto_finder_enabled = parse_bool(&v);
        }
        if let Ok(v) = var("AUTO_COMMENT") {
            self.scheduler.auto_comment = parse_bool(&v);
        }
        if let Ok(v) = var("MAX_COMMENTS_PER_DAY") {
            self.budget.comments_max_per_day = parse_env("MAX_COMMENTS_PER_DAY", &v)?;
        }
        if let Ok(v) = var("MAX_COMMENTS_PER_REPO") {
            self.budget.comments_max_per_repo_per_day = parse_env("MAX_COMMENTS_PER_REPO", &v)?;
        }
        if let Ok(v) = var("MIN_SCORE_TO_COMMENT") {
            self.budget.min_score_to_comment = parse_env("MIN_SCORE_TO_COMMENT", &v)?;
        }
        if let Ok(v) = var("MIN_HOURS_BETWEEN_COMMENTS") {
            self.budget.min_hours_between_comments = parse_env("MIN_HOURS_BETWEEN_COMMENTS", &v)?;
        }

        if let Ok(v) = var("GITHUB_TOKEN") {
            self.forge.token = Some(v);
        }
        if let Ok(v) = var("SMTP_HOST") {
            self.notify.smtp_host = Some(v);
        }
        if let Ok(v) = var("SMTP_PORT") {
            self.notify.smtp_port = Some(parse_env("SMTP_PORT", &v)?);
        }
        if let Ok(v) = var("SMTP_USER") {
            self.notify.smtp_user = Some(v);
        }
        if let Ok(v) = var("SMTP_PASSWORD") {
            self.notify.smtp_password = Some(v);
        }
        if let Ok(v) = var("SMTP_FROM") {
            self.notify.smtp_from = Some(v);
        }
        if let Ok(v) = var("SMTP_TO") {
            self.notify.smtp_to = Some(v);
        }

        Ok(())
    }

    /// Validate invariants from spec §6 (`CHECK_INTERVAL ≥ 60`,
    /// `MAX_ISSUES_PER_REPO ≤ 100`, `MAX_PROJECTS ≤ 200`). A violation is a
    /// `Fatal` config error — the process aborts rather than clamping
    /// silently (spec §7).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.check_interval_secs < 60 {
            return Err(ConfigError::Invalid {
                field: "CHECK_INTERVAL".into(),
                detail: "must be >= 60 seconds".into(),
            });
        }
        if self.scheduler.max_issues_per_repo > 100 {
            return Err(ConfigError::Invalid {
                field: "MAX_ISSUES_PER_REPO".into(),
                detail: "must be <= 100".into(),
            });
        }
        if self.scheduler.max_projects > 200 {
            return Err(ConfigError::Invalid {
                field: "MAX_PROJECTS".into(),
                detail: "must be <= 200".into(),
            });
        }
        if !matches!(self.general.log_level.as_str(), "debug" | "info" | "warn" | "error") {
            return Err(ConfigError::Invalid {
                field: "LOG_LEVEL".into(),
                detail: "must be one of debug, info, warn, error".into(),
            });
        }
        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(ConfigError::Invalid {
                field: "LOG_FORMAT".into(),
                detail: "must be one of text, json".into(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        field: field.to_string(),
        detail: format!("cannot parse `{raw}`"),
    })
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_app_name() -> String {
    "issue-scout".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    Sqlite,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_backend")]
    pub backend: PersistenceBackend,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
    #[serde(default = "default_file_dir")]
    pub file_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            sqlite_path: default_sqlite_path(),
            file_dir: default_file_dir(),
        }
    }
}

fn default_backend() -> PersistenceBackend {
    PersistenceBackend::Sqlite
}
fn default_sqlite_path() -> String {
    "~/.issue-scout/scout.db".into()
}
fn default_file_dir() -> String {
    "~/.issue-scout".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "w_stars")]
    pub weight_stars: f64,
    #[serde(default = "w_comments")]
    pub weight_comments: f64,
    #[serde(default = "w_recency")]
    pub weight_recency: f64,
    #[serde(default = "w_labels")]
    pub weight_labels: f64,
    #[serde(default = "w_difficulty")]
    pub weight_difficulty: f64,
    #[serde(default = "w_description")]
    pub weight_description: f64,
    #[serde(default = "w_activity")]
    pub weight_activity: f64,
    #[serde(default = "w_maintainer")]
    pub weight_maintainer: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_stars: w_stars(),
            weight_comments: w_comments(),
            weight_recency: w_recency(),
            weight_labels: w_labels(),
            weight_difficulty: w_difficulty(),
            weight_description: w_description(),
            weight_activity: w_activity(),
            weight_maintainer: w_maintainer(),
            max_score: default_max_score(),
        }
    }
}

fn w_stars() -> f64 {
    0.08
}
fn w_comments() -> f64 {
    0.15
}
fn w_recency() -> f64 {
    0.15
}
fn w_labels() -> f64 {
    0.20
}
fn w_difficulty() -> f64 {
    0.12
}
fn w_description() -> f64 {
    0.10
}
fn w_activity() -> f64 {
    0.10
}
fn w_maintainer() -> f64 {
    0.10
}
fn default_max_score() -> f64 {
    1.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationConfig {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_qualified_types")]
    pub types: Vec<String>,
    #[serde(default = "default_exclude_labels")]
    pub exclude_labels: Vec<String>,
    #[serde(default = "default_include_labels")]
    pub include_labels: Vec<String>,
    #[serde(default)]
    pub min_stars: u64,
    #[serde(default = "default_true")]
    pub require_no_assignee: bool,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            types: default_qualified_types(),
            exclude_labels: default_exclude_labels(),
            include_labels: default_include_labels(),
            min_stars: 0,
            require_no_assignee: true,
        }
    }
}

fn default_min_score() -> f64 {
    0.0
}
fn default_qualified_types() -> Vec<String> {
    vec!["bug", "feature", "enhancement", "help wanted"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_exclude_labels() -> Vec<String> {
    [
        "question",
        "support",
        "wontfix",
        "duplicate",
        "invalid",
        "stale",
        "needs-triage",
        "waiting-for-info",
        "needs info",
        "discussion",
        "proposal",
        "rfc",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_include_labels() -> Vec<String> {
    vec!["bug", "feature", "enhancement", "help wanted", "good first issue"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_10")]
    pub notify_max_per_hour: u32,
    #[serde(default = "default_30")]
    pub notify_max_per_day: u32,
    #[serde(default = "default_2")]
    pub notify_max_per_project: u32,
    #[serde(default = "default_5")]
    pub notify_min_interval_minutes: u32,
    #[serde(default = "default_true")]
    pub never_notify_twice: bool,
    #[serde(default)]
    pub notify_email_min_score: f64,

    #[serde(default = "default_3")]
    pub comments_base_max_per_day: u32,
    #[serde(default = "default_7")]
    pub comments_max_per_day: u32,
    #[serde(default = "default_15")]
    pub comments_max_per_week: u32,
    #[serde(default = "default_1")]
    pub comments_max_per_repo_per_day: u32,
    #[serde(default = "default_min_score_to_comment")]
    pub min_score_to_comment: f64,
    #[serde(default = "default_great_quality")]
    pub great_quality_threshold: f64,

    #[serde(default = "default_5")]
    pub assignment_max_per_day: u32,
    #[serde(default = "default_30")]
    pub assignment_repo_cooldown_minutes: u32,

    #[serde(default = "default_4000")]
    pub forge_calls_max_per_hour: u32,

    #[serde(default = "default_0")]
    pub min_hours_between_comments: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            notify_max_per_hour: default_10(),
            notify_max_per_day: default_30(),
            notify_max_per_project: default_2(),
            notify_min_interval_minutes: default_5(),
            never_notify_twice: true,
            notify_email_min_score: 0.0,
            comments_base_max_per_day: default_3(),
            comments_max_per_day: default_7(),
            comments_max_per_week: default_15(),
            comments_max_per_repo_per_day: default_1(),
            min_score_to_comment: default_min_score_to_comment(),
            great_quality_threshold: default_great_quality(),
            assignment_max_per_day: default_5(),
            assignment_repo_cooldown_minutes: default_30(),
            forge_calls_max_per_hour: default_4000(),
            min_hours_between_comments: default_0(),
        }
    }
}

fn default_0() -> u32 {
    0
}
fn default_1() -> u32 {
    1
}
fn default_2() -> u32 {
    2
}
fn default_3() -> u32 {
    3
}
fn default_5() -> u32 {
    5
}
fn default_7() -> u32 {
    7
}
fn default_10() -> u32 {
    10
}
fn default_15() -> u32 {
    15
}
fn default_30() -> u32 {
    30
}
fn default_4000() -> u32 {
    4000
}
fn default_min_score_to_comment() -> f64 {
    0.70
}
fn default_great_quality() -> f64 {
    0.85
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    #[serde(default = "default_maintainer_commits")]
    pub maintainer_commits: u32,
    #[serde(default = "default_maintainer_total")]
    pub maintainer_total: u32,
    #[serde(default = "default_regular_commits")]
    pub regular_commits: u32,
    #[serde(default = "default_regular_total")]
    pub regular_total: u32,
    #[serde(default = "default_contributor_total")]
    pub contributor_total: u32,
    #[serde(default = "default_1")]
    pub new_total: u32,

    /// Per-trust-level weekly comment caps (spec §4.6), composed by
    /// logical AND with C8's own weekly/daily caps at the call site.
    #[serde(default = "default_0")]
    pub none_comments_per_week: u32,
    #[serde(default = "default_1")]
    pub new_comments_per_week: u32,
    #[serde(default = "default_2")]
    pub contributor_comments_per_week: u32,
    #[serde(default = "default_5")]
    pub regular_comments_per_week: u32,
    #[serde(default = "default_10")]
    pub maintainer_comments_per_week: u32,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            maintainer_commits: default_maintainer_commits(),
            maintainer_total: default_maintainer_total(),
            regular_commits: default_regular_commits(),
            regular_total: default_regular_total(),
            contributor_total: default_contributor_total(),
            new_total: default_1(),
            none_comments_per_week: default_0(),
            new_comments_per_week: default_1(),
            contributor_comments_per_week: default_2(),
            regular_comments_per_week: default_5(),
            maintainer_comments_per_week: default_10(),
        }
    }
}

fn default_maintainer_commits() -> u32 {
    10
}
fn default_maintainer_total() -> u32 {
    20
}
fn default_regular_commits() -> u32 {
    3
}
fn default_regular_total() -> u32 {
    10
}
fn default_contributor_total() -> u32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    #[serde(default = "default_min_quality")]
    pub min_quality_score: f64,
    #[serde(default = "default_history_size")]
    pub max_history_per_issue: usize,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            min_quality_score: default_min_quality(),
            max_history_per_issue: default_history_size(),
        }
    }
}

fn default_min_quality() -> f64 {
    0.6
}
fn default_history_size() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    #[serde(default = "default_max_issues_per_repo")]
    pub max_issues_per_repo: u32,
    #[serde(default = "default_max_projects")]
    pub max_projects: u32,
    #[serde(default = "default_concurrency")]
    pub concurrent_repos: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_inter_batch_pause_ms")]
    pub inter_batch_pause_ms: u64,
    #[serde(default)]
    pub digest_mode: bool,
    #[serde(default = "default_digest_time")]
    pub digest_time: String,
    #[serde(default)]
    pub auto_finder_enabled: bool,
    #[serde(default)]
    pub auto_comment: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            max_issues_per_repo: default_max_issues_per_repo(),
            max_projects: default_max_projects(),
            concurrent_repos: default_concurrency(),
            batch_size: default_batch_size(),
            inter_batch_pause_ms: default_inter_batch_pause_ms(),
            digest_mode: false,
            digest_time: default_digest_time(),
            auto_finder_enabled: false,
            auto_comment: false,
        }
    }
}

fn default_check_interval() -> u64 {
    3600
}
fn default_max_issues_per_repo() -> u32 {
    100
}
fn default_max_projects() -> u32 {
    200
}
fn default_concurrency() -> usize {
    10
}
fn default_batch_size() -> usize {
    10
}
fn default_inter_batch_pause_ms() -> u64 {
    500
}
fn default_digest_time() -> String {
    "09:00".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_total_timeout_secs")]
    pub total_timeout_secs: u64,
    #[serde(default = "default_3")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_base_secs")]
    pub retry_base_secs: u64,
    #[serde(default = "default_retry_cap_secs")]
    pub retry_cap_secs: u64,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            token: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            total_timeout_secs: default_total_timeout_secs(),
            retry_attempts: default_3(),
            retry_base_secs: default_retry_base_secs(),
            retry_cap_secs: default_retry_cap_secs(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_total_timeout_secs() -> u64 {
    30
}
fn default_retry_base_secs() -> u64 {
    5
}
fn default_retry_cap_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default)]
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_from: Option<String>,
    #[serde(default)]
    pub smtp_to: Option<String>,
    #[serde(default = "default_true")]
    pub desktop_enabled: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: None,
            smtp_user: None,
            smtp_password: None,
            smtp_from: None,
            smtp_to: None,
            desktop_enabled: true,
        }
    }
}

impl std::fmt::Debug for ForgeConfigRedacted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeConfig").field("token", &"<redacted>").finish()
    }
}

/// Wrapper used only to produce a redacted `Debug` rendering of secrets in
/// logs; the real `ForgeConfig`/`NotifyConfig` derive `Debug` normally but
/// callers that log full config should route through this instead.
pub struct ForgeConfigRedacted<'a>(pub &'a ForgeConfig);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn check_interval_below_60_is_invalid() {
        let mut cfg = Config::default();
        cfg.scheduler.check_interval_secs = 30;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn max_issues_per_repo_above_100_is_invalid() {
        let mut cfg = Config::default();
        cfg.scheduler.max_issues_per_repo = 101;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn max_projects_above_200_is_invalid() {
        let mut cfg = Config::default();
        cfg.scheduler.max_projects = 201;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Config::default();
        let text = cfg.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.scoring.weight_stars, cfg.scoring.weight_stars);
    }
}
