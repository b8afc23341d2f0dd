pub mod digest;
pub mod discover;
pub mod email_test;
pub mod history;
pub mod mine;
pub mod notify;
pub mod preview;
pub mod repos;
pub mod start;
pub mod stats;
pub mod workflow;

use scout_core::config::Config;
use scout_daemon::RuntimeContext;

/// Every verb but `repos`/`enable`/`disable` (which only touch the registry
/// file, never the store) needs one of these. Bootstrapping is cheap enough
/// that each invocation of the CLI does it fresh rather than keeping a
/// background process around.
pub async fn bootstrap(config: Config) -> anyhow::Result<RuntimeContext> {
    RuntimeContext::bootstrap(config).await.map_err(anyhow::Error::from)
}
