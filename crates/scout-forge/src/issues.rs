use std::collections::BTreeSet;

use scout_core::types::{Issue, IssueState, Repo};

use crate::client::ForgeClient;
use crate::errors::Result;
use crate::retry::with_retry;

/// Lists a page of open issues for `repo` (spec §4 C3 "list issues"). The
/// forge returns pull requests through the same endpoint; callers rely on
/// `Issue::is_pull_request` rather than this function filtering them out,
/// since C6 needs to see and hard-reject them explicitly (spec §4.2).
pub async fn list_open_issues(client: &ForgeClient, repo: &Repo, page: u32, per_page: u8) -> Result<Vec<Issue>> {
    with_retry(&client.config, || async {
        let handler = client.octocrab.issues(&repo.owner, &repo.name);
        let listed = handler
            .list()
            .state(octocrab::params::State::Open)
            .page(page)
            .per_page(per_page)
            .send()
            .await?;
        Ok(listed.items.into_iter().map(octocrab_issue_to_issue).collect())
    })
    .await
}

pub async fn get_issue(client: &ForgeClient, repo: &Repo, number: u64) -> Result<Issue> {
    with_retry(&client.config, || async {
        let issue = client.octocrab.issues(&repo.owner, &repo.name).get(number).await?;
        Ok(octocrab_issue_to_issue(issue))
    })
    .await
}

fn octocrab_issue_to_issue(issue: octocrab::models::issues::Issue) -> Issue {
    let state = match issue.state {
        octocrab::models::IssueState::Closed => IssueState::Closed,
        _ => IssueState::Open,
    };

    let labels: BTreeSet<String> = issue.labels.iter().map(|l| l.name.clone()).collect();
    let assignees: BTreeSet<String> = issue.assignees.iter().map(|a| a.login.clone()).collect();
    let is_pull_request = issue.pull_request.is_some();

    Issue {
        id: issue.id.0,
        number: issue.number,
        url: issue.html_url.to_string(),
        title: issue.title,
        body: issue.body,
        state,
        labels,
        comments: issue.comments as u64,
        assignees,
        linked_prs: BTreeSet::new(),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        is_pull_request,
    }
}
