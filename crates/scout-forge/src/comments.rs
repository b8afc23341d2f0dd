use scout_core::types::Repo;

use crate::client::ForgeClient;
use crate::errors::Result;
use crate::retry::with_retry;

/// Identifies the posted comment so the dispatcher can record it against
/// the issue's `CommentHistoryEntry` / workflow record (spec §4 C3 "post
/// comment", §4.5).
#[derive(Debug, Clone)]
pub struct PostedComment {
    pub id: u64,
    pub url: String,
}

/// Posts `body` to `repo`'s issue `issue_number` (spec §4 C3 "post
/// comment"). Used both for a drafted `SmartComment` (C7) and for the
/// canned `ask_assignment` body the dispatcher builds for `ActionKind::AskAssignment`
/// — the gateway interface in spec §6 names no separate assignee-mutation
/// endpoint, so asking for assignment is a comment like any other (see
/// DESIGN.md).
pub async fn post_comment(client: &ForgeClient, repo: &Repo, issue_number: u64, body: &str) -> Result<PostedComment> {
    with_retry(&client.config, || async {
        let comment = client
            .octocrab
            .issues(&repo.owner, &repo.name)
            .create_comment(issue_number, body)
            .await?;
        Ok(PostedComment { id: comment.id.0, url: comment.html_url.to_string() })
    })
    .await
}

/// The canned body posted for `ActionKind::AskAssignment` (spec §4.5
/// `asked_assignment` transition). Kept short and specific to the issue
/// number so it reads as a deliberate request rather than a template blast.
pub fn ask_assignment_body(issue_number: u64) -> String {
    format!(
        "Hi, I'd like to take this one (#{issue_number}) if it's still open. Happy to start right away and will link a PR here once I have something."
    )
}
