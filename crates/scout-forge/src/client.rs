use octocrab::Octocrab;
use scout_core::clock::ContributorIdentity;
use scout_core::config::ForgeConfig;

use crate::errors::{ForgeError, Result};

/// Thin wrapper around an authenticated `Octocrab` client plus the gateway's
/// own retry configuration (spec §4 C3, §6 `FORGE_*`/`GITHUB_TOKEN`). Every
/// scout-forge operation takes `(repo, ...)` explicitly rather than binding
/// to a single owner/repo pair, since a contributor watches many repos from
/// one client (unlike a single-repo integration).
#[derive(Clone)]
pub struct ForgeClient {
    pub(crate) octocrab: Octocrab,
    pub(crate) config: ForgeConfig,
}

impl ForgeClient {
    pub fn new(config: ForgeConfig) -> Result<Self> {
        let token = config.token.clone().ok_or(ForgeError::MissingToken)?;
        let octocrab = Octocrab::builder().personal_token(token).build()?;
        Ok(Self { octocrab, config })
    }

    /// Builds a client from `GITHUB_TOKEN` alone, leaving the rest of
    /// `ForgeConfig` at its defaults — used by CLI subcommands that don't
    /// load the full `Config` (e.g. `email-test` dry runs against stubbed
    /// data never hit this path, but `search`/`preview` do).
    pub fn new_from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| ForgeError::MissingToken)?;
        Self::new(ForgeConfig { token: Some(token), ..ForgeConfig::default() })
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Resolves the token's own login once at startup (C1 contributor
    /// identity). Best-effort from the caller's point of view: a token
    /// scoped without `read:user` still lets every other operation work, so
    /// callers should treat an error here as "identity unknown" rather than
    /// fatal.
    pub async fn current_user(&self) -> Result<ContributorIdentity> {
        let user = self.octocrab.current().user().await?;
        Ok(ContributorIdentity::new(user.login))
    }
}
