pub mod blocks;
pub mod get;
pub mod history;
pub mod list;
pub mod render;
pub mod validate;

use anyhow::Context as _;
use erk_core::config::{Config, WarnLevel};
use erk_core::store::GithubPlanStore;
use erk_core::tracker::GhCli;
use erk_core::RepoContext;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Everything a command needs that comes from outside the core.
pub struct Context {
    pub repo: RepoContext,
    pub config: Config,
    pub json: bool,
}

impl Context {
    pub fn load(root: PathBuf, remote: Option<String>, json: bool) -> anyhow::Result<Self> {
        let path = crate::root::config_path(&root);
        let config = if path.exists() {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_yaml(&data).with_context(|| format!("invalid {}", path.display()))?
        } else {
            Config::default()
        };

        for w in config.validate() {
            match w.level {
                WarnLevel::Error => tracing::error!("config: {}", w.message),
                WarnLevel::Warning => tracing::warn!("config: {}", w.message),
            }
        }

        let mut repo = RepoContext::new(root);
        repo.remote = remote;
        Ok(Self { repo, config, json })
    }

    pub fn store(&self) -> GithubPlanStore<GhCli> {
        GithubPlanStore::new(GhCli::from_config(&self.config.tracker))
    }
}

/// Read command input from `file`, or stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
