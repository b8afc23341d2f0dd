//! Entry point. Generalized from `at-cli`'s clap-derive-plus-`commands::`
//! dispatch shape, but scout-cli owns the run loop itself rather than
//! talking to a separate daemon process over HTTP (see
//! `scout_daemon::lib`'s doc comment): every verb here builds a
//! `RuntimeContext` and drives `Scheduler`/`Dispatcher`/`WorkflowTracker`
//! in-process.

mod commands;
mod render;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "issue-scout", version, about = "Finds, scores, and acts on open issues on behalf of a single contributor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every qualifying candidate across enabled repos, best first.
    Find,
    /// Like `find`, filtered to bug-type candidates.
    Bugs,
    /// Like `find`, filtered to feature-type candidates.
    Features,
    /// Like `find`, filtered to candidates labeled "good first issue".
    GoodFirst,
    /// Like `find`, filtered to candidates `score()` marked recommended.
    Actionable,
    /// Like `find`, filtered to candidates labeled "confirmed".
    Confirmed,
    /// Full-text search across titles and bodies of qualifying candidates.
    Search {
        query: String,
    },
    /// Show the full detail (score breakdown, drafted comment or decline
    /// reason) for one issue.
    Preview {
        issue_url: String,
    },
    /// Run one discovery+dispatch cycle and send notifications for newly
    /// qualifying candidates, without posting comments.
    Notify {
        #[arg(long)]
        email: bool,
        #[arg(long)]
        local: bool,
        #[arg(long = "no-local")]
        no_local: bool,
        #[arg(long = "score-min")]
        score_min: Option<f64>,
    },
    /// List active-workflow candidates assigned to the configured identity,
    /// falling back to every active-workflow record when identity is unknown.
    Mine,
    /// Print the per-cycle KPI snapshot (counts by workflow state).
    Stats,
    /// Email a digest of today's qualifying candidates.
    Digest {
        #[arg(long = "send-email")]
        send_email: bool,
    },
    /// Begin tracking an issue's workflow state manually.
    Track {
        issue_url: String,
    },
    /// Manually transition an issue's workflow state.
    Update {
        issue_url: String,
        status: String,
    },
    /// List every tracked workflow record.
    List,
    /// Print daemon run status (lockfile, active workflow count).
    Status,
    /// Prune terminal workflow records older than the retention window.
    Cleanup {
        #[arg(long, default_value_t = 30)]
        retention_days: i64,
    },
    /// Run continuously, acquiring the singleton run lock.
    Start,
    /// Shorthand for `update <issue-url> pr-submitted`.
    Commit {
        issue_url: String,
    },
    /// Print current usage against every budget cap.
    Limits,
    /// Print the N most recently posted comments (default 10).
    History {
        #[arg(default_value_t = 10)]
        n: usize,
    },
    /// Manage the watched-repo registry.
    Repos {
        #[command(subcommand)]
        action: Option<RepoAction>,
    },
    /// Enable a watched repo.
    Enable {
        repo: String,
    },
    /// Disable a watched repo.
    Disable {
        repo: String,
    },
    /// Send a test email through the configured SMTP transport.
    EmailTest,
}

#[derive(Subcommand)]
enum RepoAction {
    Add { repo: String },
    Remove { repo: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = scout_core::config::Config::load()?;
    scout_telemetry::logging::init_logging_for_format("issue-scout", &config.general.log_level, &config.general.log_format);

    match cli.command {
        Commands::Find => commands::discover::run(config, commands::discover::Filter::All).await,
        Commands::Bugs => commands::discover::run(config, commands::discover::Filter::Bugs).await,
        Commands::Features => commands::discover::run(config, commands::discover::Filter::Features).await,
        Commands::GoodFirst => commands::discover::run(config, commands::discover::Filter::GoodFirst).await,
        Commands::Actionable => commands::discover::run(config, commands::discover::Filter::Actionable).await,
        Commands::Confirmed => commands::discover::run(config, commands::discover::Filter::Confirmed).await,
        Commands::Search { query } => commands::discover::search(config, &query).await,
        Commands::Preview { issue_url } => commands::preview::run(config, &issue_url).await,
        Commands::Notify { email, local, no_local, score_min } => {
            commands::notify::run(config, commands::notify::NotifyFlags { email, local, no_local, score_min }).await
        }
        Commands::Mine => commands::mine::run(config).await,
        Commands::Stats => commands::stats::stats(config).await,
        Commands::Digest { send_email } => commands::digest::run(config, send_email).await,
        Commands::Track { issue_url } => commands::workflow::track(config, &issue_url).await,
        Commands::Update { issue_url, status } => commands::workflow::update(config, &issue_url, &status).await,
        Commands::List => commands::workflow::list(config).await,
        Commands::Status => commands::stats::status(config).await,
        Commands::Cleanup { retention_days } => commands::workflow::cleanup(config, retention_days).await,
        Commands::Start => commands::start::run(config).await,
        Commands::Commit { issue_url } => commands::workflow::commit(config, &issue_url).await,
        Commands::Limits => commands::stats::limits(config).await,
        Commands::History { n } => commands::history::run(config, n).await,
        Commands::Repos { action } => commands::repos::run(action).await,
        Commands::Enable { repo } => commands::repos::set_enabled(&repo, true).await,
        Commands::Disable { repo } => commands::repos::set_enabled(&repo, false).await,
        Commands::EmailTest => commands::email_test::run(config).await,
    }
}
