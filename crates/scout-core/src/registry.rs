//! Repo Registry (C4): the enumerated set of watched repositories.
//!
//! Grounded on `at_core::config::Config`'s load/save idiom (toml file,
//! `#[serde(default)]` per field) generalized from a single document to a
//! list of entries with CRUD operations for the `repos add|remove`,
//! `enable`, `disable` CLI verbs (spec §6). Effectively read-only once a
//! cycle starts; reloads are out-of-band (spec §5).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::types::Repo;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub repos: Vec<Repo>,
}

/// In-memory view over the watched-repo list, backed by a toml document on
/// disk. Not `Send`-restricted: the scheduler clones the `Vec<Repo>` it
/// needs at the start of a cycle rather than holding a lock across I/O.
#[derive(Debug, Clone)]
pub struct RepoRegistry {
    path: PathBuf,
    repos: Vec<Repo>,
}

impl RepoRegistry {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".issue-scout")
            .join("repos.toml")
    }

    /// Load from the default path, returning an empty registry if the file
    /// does not exist yet (a fresh install has no watched repos).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let doc = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
            toml::from_str::<RegistryDocument>(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            RegistryDocument::default()
        };
        Ok(Self { path, repos: doc.repos })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let doc = RegistryDocument { repos: self.repos.clone() };
        let text = toml::to_string_pretty(&doc).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, text).map_err(|e| ConfigError::Io(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enabled repos, ordered by `priority` ascending (lower sorts first),
    /// ties broken by `(owner, name)` for deterministic fan-out order.
    pub fn enabled_repos(&self) -> Vec<Repo> {
        let mut repos: Vec<Repo> = self.repos.iter().filter(|r| r.enabled).cloned().collect();
        repos.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.owner.cmp(&b.owner))
                .then_with(|| a.name.cmp(&b.name))
        });
        repos
    }

    pub fn all(&self) -> &[Repo] {
        &self.repos
    }

    pub fn find(&self, owner: &str, name: &str) -> Option<&Repo> {
        self.repos.iter().find(|r| r.owner == owner && r.name == name)
    }

    pub fn add(&mut self, repo: Repo) -> bool {
        if self.find(&repo.owner, &repo.name).is_some() {
            return false;
        }
        self.repos.push(repo);
        true
    }

    pub fn remove(&mut self, owner: &str, name: &str) -> bool {
        let before = self.repos.len();
        self.repos.retain(|r| !(r.owner == owner && r.name == name));
        self.repos.len() != before
    }

    pub fn set_enabled(&mut self, owner: &str, name: &str, enabled: bool) -> bool {
        match self.repos.iter_mut().find(|r| r.owner == owner && r.name == name) {
            Some(r) => {
                r.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repo(owner: &str, name: &str, priority: i32) -> Repo {
        Repo {
            owner: owner.into(),
            name: name.into(),
            category: "infra".into(),
            priority,
            min_stars: 0,
            language: None,
            enabled: true,
            label_include: vec![],
            label_exclude: vec![],
        }
    }

    #[test]
    fn enabled_repos_sort_by_priority_then_name() {
        let mut reg = RepoRegistry { path: PathBuf::from("/tmp/ignored.toml"), repos: vec![] };
        reg.add(sample_repo("zeta", "b", 1));
        reg.add(sample_repo("alpha", "a", 1));
        reg.add(sample_repo("acme", "widget", 0));
        let ordered = reg.enabled_repos();
        assert_eq!(ordered[0].full_name(), "acme/widget");
        assert_eq!(ordered[1].full_name(), "alpha/a");
        assert_eq!(ordered[2].full_name(), "zeta/b");
    }

    #[test]
    fn disabled_repos_are_excluded() {
        let mut reg = RepoRegistry { path: PathBuf::from("/tmp/ignored.toml"), repos: vec![] };
        reg.add(sample_repo("acme", "widget", 0));
        reg.set_enabled("acme", "widget", false);
        assert!(reg.enabled_repos().is_empty());
    }

    #[test]
    fn add_rejects_duplicate() {
        let mut reg = RepoRegistry { path: PathBuf::from("/tmp/ignored.toml"), repos: vec![] };
        assert!(reg.add(sample_repo("acme", "widget", 0)));
        assert!(!reg.add(sample_repo("acme", "widget", 5)));
    }

    #[test]
    fn round_trips_through_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("repos.toml");
        let mut reg = RepoRegistry::load_from(&path).unwrap();
        reg.add(sample_repo("acme", "widget", 2));
        reg.save().unwrap();

        let reloaded = RepoRegistry::load_from(&path).unwrap();
        assert_eq!(reloaded.all().len(), 1);
        assert_eq!(reloaded.all()[0].full_name(), "acme/widget");
    }
}
