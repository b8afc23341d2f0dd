//! `history [N]`: the N most recently posted comments, across every issue.

use scout_core::config::Config;

pub async fn run(config: Config, n: usize) -> anyhow::Result<()> {
    let ctx = super::bootstrap(config).await?;
    let entries = ctx.store.recent_comments(n).await?;
    if entries.is_empty() {
        println!("no comments posted yet");
        return Ok(());
    }
    for entry in &entries {
        println!("{}  {}", entry.posted_at.format("%Y-%m-%d %H:%M:%S UTC"), entry.issue_url);
        println!("  {}", entry.body.lines().next().unwrap_or(""));
    }
    Ok(())
}
