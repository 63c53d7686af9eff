//! A single deployment run: fetch, discover, select, fan out.

use crate::config::CliConfig;
use crate::settings::DeploySettings;
use skiff_core::ports::ArtifactFetcher;
use skiff_core::{BucketDiscovery, Deployer, DeploymentReport, Result, RunId};
use skiff_runner::{
    CommandRunner, GhArtifactFetcher, GhConfig, GsutilClient, GsutilConfig, RunnerConfig,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

/// The external collaborators a run talks to.
pub struct DeployPorts {
    pub discovery: BucketDiscovery,
    pub deployer: Deployer,
    pub artifacts: Arc<dyn ArtifactFetcher>,
}

impl DeployPorts {
    /// Wire the gsutil and gh adapters.
    pub fn from_config(settings: &DeploySettings, config: &CliConfig) -> Self {
        let runner = CommandRunner::new(RunnerConfig {
            timeout_seconds: Some(config.timeout_seconds),
        });

        let storage = Arc::new(GsutilClient::new(
            GsutilConfig {
                program: config.gsutil_path.clone(),
                service_account: settings.service_account.clone(),
            },
            runner.clone(),
        ));

        let artifacts = Arc::new(GhArtifactFetcher::new(
            GhConfig::from_env(config.gh_path.clone()),
            runner,
        ));

        Self {
            discovery: BucketDiscovery::new(storage.clone(), storage.clone()),
            deployer: Deployer::new(storage.clone(), storage).with_policy(settings.policy),
            artifacts,
        }
    }
}

/// Execute a deployment run.
///
/// Artifact and discovery failures are returned as errors since nothing has
/// been deployed yet. Fan-out failures are recorded in the report together
/// with the outcomes collected before them.
pub async fn run_deployment(
    settings: &DeploySettings,
    ports: &DeployPorts,
) -> Result<DeploymentReport> {
    let run_id = RunId::new();
    let span = info_span!("deploy", %run_id);

    execute(run_id, settings, ports).instrument(span).await
}

async fn execute(
    run_id: RunId,
    settings: &DeploySettings,
    ports: &DeployPorts,
) -> Result<DeploymentReport> {
    let started_at = chrono::Utc::now();
    let request = &settings.request;

    if let Some(name) = &settings.artifacts_name {
        ports
            .artifacts
            .fetch(name, Path::new(&request.source_path))
            .await?;
    }

    let selected = ports
        .discovery
        .select(settings.project_id.as_deref(), &request.filter)
        .await?;

    let report = DeploymentReport::new(run_id, &request.filter, &selected, started_at);
    let result = ports.deployer.deploy(&selected, request).await;
    let report = report.finish(result);

    info!(
        succeeded = report.succeeded(),
        outcomes = report.outcomes.len(),
        "Deployment run finished"
    );

    Ok(report)
}
