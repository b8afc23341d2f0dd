use scout_core::types::Repo;

use crate::client::ForgeClient;
use crate::errors::Result;
use crate::retry::with_retry;

/// Answers "does any pull request reference this issue" (spec §4 C3
/// "search linked PRs"), used by C6/C7 to set `has_linked_pr` and to veto a
/// comment draft when the work is already claimed. GitHub has no direct
/// "linked PRs for issue N" endpoint, so this uses the search API's
/// `is:pr` + issue-number-in-body query, the same approach the forge's own
/// web UI "Development" sidebar is built on.
pub async fn search_linked_pr(client: &ForgeClient, repo: &Repo, issue_number: u64) -> Result<bool> {
    with_retry(&client.config, || async {
        let query = format!("repo:{}/{} is:pr {} in:body", repo.owner, repo.name, issue_number);
        let page = client.octocrab.search().issues_and_pull_requests(&query).send().await?;
        Ok(page.total_count.unwrap_or(0) > 0)
    })
    .await
}
