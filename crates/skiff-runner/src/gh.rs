//! Build artifact download through the GitHub CLI.

use crate::command::CommandRunner;
use async_trait::async_trait;
use skiff_core::ports::ArtifactFetcher;
use skiff_core::{Error, Result};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct GhConfig {
    pub program: String,
    /// `owner/name`; defaults to the repository of the current directory.
    pub repository: Option<String>,
    /// Workflow run holding the artifact; defaults to the latest run.
    pub run_id: Option<String>,
}

impl Default for GhConfig {
    fn default() -> Self {
        Self {
            program: "gh".to_string(),
            repository: None,
            run_id: None,
        }
    }
}

impl GhConfig {
    /// Pick up the repository and run of the surrounding workflow, if any.
    pub fn from_env(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            repository: std::env::var("GITHUB_REPOSITORY").ok(),
            run_id: std::env::var("GITHUB_RUN_ID").ok(),
        }
    }
}

pub struct GhArtifactFetcher {
    config: GhConfig,
    runner: CommandRunner,
}

impl GhArtifactFetcher {
    pub fn new(config: GhConfig, runner: CommandRunner) -> Self {
        Self { config, runner }
    }

    fn args(&self, name: &str, destination: &Path) -> Vec<String> {
        let mut args = vec!["run".to_string(), "download".to_string()];
        if let Some(run_id) = &self.config.run_id {
            args.push(run_id.clone());
        }
        if let Some(repo) = &self.config.repository {
            args.push("--repo".to_string());
            args.push(repo.clone());
        }
        args.push("--name".to_string());
        args.push(name.to_string());
        args.push("--dir".to_string());
        args.push(destination.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl ArtifactFetcher for GhArtifactFetcher {
    async fn fetch(&self, name: &str, destination: &Path) -> Result<()> {
        tokio::fs::create_dir_all(destination).await?;

        info!(artifact = %name, destination = %destination.display(), "Downloading artifact");
        let output = self
            .runner
            .run(&self.config.program, &self.args(name, destination))
            .await?;

        if !output.success {
            return Err(Error::ArtifactFetch {
                name: name.to_string(),
                message: output.error_summary(),
            });
        }

        Ok(())
    }
}
