//! Wiring: constructs every component crate from a loaded `Config` and
//! hands back one `RuntimeContext` the scheduler and dispatcher share.
//! Generalized from `at_daemon::Daemon::new` (config in, ready-to-run
//! struct out), but split from the scheduling loop itself since this
//! crate has no embedded/standalone distinction to preserve.

use std::sync::Arc;

use scout_antispam::SmartLimiter;
use scout_core::clock::{Clock, ContributorIdentity, SystemClock};
use scout_core::config::Config;
use scout_core::persistence::{open_store, Store};
use scout_core::registry::RepoRegistry;
use scout_forge::ForgeClient;
use scout_notify::Notifier;
use scout_telemetry::counters::CounterRegistry;
use scout_workflow::WorkflowTracker;

use crate::errors::{DaemonError, Result};

pub struct RuntimeContext {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    pub forge: ForgeClient,
    pub notifier: Notifier,
    pub limiter: SmartLimiter,
    pub workflow: WorkflowTracker,
    pub registry: RepoRegistry,
    pub counters: CounterRegistry,
    /// `None` when the token lacks `read:user` or the lookup failed; `mine`
    /// falls back to the workflow tracker's active-status queue either way.
    pub identity: Option<ContributorIdentity>,
}

impl RuntimeContext {
    /// Loads config (if not already loaded), opens the configured
    /// persistence backend, and constructs every collaborator crate from
    /// it. `Config::load`'s own I/O errors are fatal per spec §7, so this
    /// returns early rather than degrading to defaults.
    pub async fn bootstrap(config: Config) -> Result<Self> {
        config.validate().map_err(DaemonError::Config)?;

        let store = open_store(&config.persistence).await.map_err(DaemonError::Store)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let forge = ForgeClient::new(config.forge.clone()).map_err(DaemonError::Forge)?;
        let notifier = Notifier::new(config.notify.clone());
        let limiter = SmartLimiter::new(store.clone(), clock.clone(), config.budget.clone());
        let workflow = WorkflowTracker::new(store.clone());
        let registry = RepoRegistry::load().map_err(DaemonError::Config)?;
        let counters = CounterRegistry::new();
        let identity = forge.current_user().await.ok();

        Ok(Self { config, store, clock, forge, notifier, limiter, workflow, registry, counters, identity })
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
