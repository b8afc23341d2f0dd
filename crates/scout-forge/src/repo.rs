use scout_core::types::{Repo, RepoMeta};

use crate::client::ForgeClient;
use crate::errors::Result;
use crate::retry::with_retry;

/// Fetches star count and language for `repo` (spec §4 C3 "get repo
/// metadata"). Commit/PR activity volume has no single cheap octocrab call,
/// so `monthly_commits`/`monthly_prs` are left `None` here and populated
/// only where a caller has already paid for a stats/commits listing call —
/// scoring degrades those factors to neutral when absent (spec §4.1).
pub async fn get_repo_meta(client: &ForgeClient, repo: &Repo) -> Result<RepoMeta> {
    with_retry(&client.config, || async {
        let repository = client.octocrab.repos(&repo.owner, &repo.name).get().await?;
        Ok(RepoMeta {
            stars: repository.stargazers_count.unwrap_or(0) as u64,
            language: repository.language.and_then(|v| v.as_str().map(str::to_string)),
            last_commit_at: repository.pushed_at,
            monthly_commits: None,
            monthly_prs: None,
        })
    })
    .await
}
