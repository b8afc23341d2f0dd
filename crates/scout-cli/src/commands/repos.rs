//! `repos [add|remove owner/repo]`, `enable`, `disable`: registry
//! maintenance. These never touch the store or forge, only
//! `scout_core::registry::RepoRegistry`'s own file, so they don't need a
//! full `RuntimeContext`.

use scout_core::registry::RepoRegistry;
use scout_core::types::Repo;

use crate::render::parse_owner_repo;
use crate::RepoAction;

pub async fn run(action: Option<RepoAction>) -> anyhow::Result<()> {
    let mut registry = RepoRegistry::load()?;

    match action {
        None => {
            for repo in registry.all() {
                println!("{:<3} {} (priority {}, min_stars {})", if repo.enabled { "on" } else { "off" }, repo.full_name(), repo.priority, repo.min_stars);
            }
        }
        Some(RepoAction::Add { repo }) => {
            let (owner, name) = parse_owner_repo(&repo)?;
            let added = registry.add(Repo {
                owner,
                name,
                category: "default".to_string(),
                priority: registry.all().len() as i32,
                min_stars: 0,
                language: None,
                enabled: true,
                label_include: Vec::new(),
                label_exclude: Vec::new(),
            });
            registry.save()?;
            println!("{}", if added { format!("added {repo}") } else { format!("{repo} already watched") });
        }
        Some(RepoAction::Remove { repo }) => {
            let (owner, name) = parse_owner_repo(&repo)?;
            let removed = registry.remove(&owner, &name);
            registry.save()?;
            println!("{}", if removed { format!("removed {repo}") } else { format!("{repo} was not watched") });
        }
    }

    Ok(())
}

pub async fn set_enabled(repo: &str, enabled: bool) -> anyhow::Result<()> {
    let (owner, name) = parse_owner_repo(repo)?;
    let mut registry = RepoRegistry::load()?;
    if !registry.set_enabled(&owner, &name, enabled) {
        anyhow::bail!("{repo} is not in the registry, use `repos add {repo}` first");
    }
    registry.save()?;
    println!("{repo} {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
