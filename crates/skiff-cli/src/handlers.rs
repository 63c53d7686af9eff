//! Command handlers.

use crate::commands::DeployArgs;
use crate::config::{CliConfig, OutputFormat};
use crate::run::{DeployPorts, run_deployment};
use crate::settings::{DeploySettings, resolve_service_account};
use crate::summary::{SummaryFile, print_report};
use console::style;
use skiff_core::{BucketDiscovery, LabelFilter};
use skiff_runner::{CommandRunner, GsutilClient, GsutilConfig, RunnerConfig};
use std::sync::Arc;
use tracing::warn;

/// Deploy a folder to every matching bucket.
pub async fn deploy(
    config: &CliConfig,
    args: DeployArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = DeploySettings::resolve(args, config)?;
    let ports = DeployPorts::from_config(&settings, config);

    let report = run_deployment(&settings, &ports).await?;

    let summary = settings.summary_file.as_ref().map(|path| {
        let sink = SummaryFile::new(path);
        sink.append(&report).map_err(|e| {
            warn!(path = %sink.path().display(), error = %e, "Failed to write run summary");
            format!(
                "Failed to write run summary to {}: {}",
                sink.path().display(),
                e
            )
        })
    });

    print_report(&report, settings.output)?;

    // A failed deployment outranks a failed summary write.
    if let Some(error) = report.error {
        return Err(error.into());
    }
    if let Some(Err(e)) = summary {
        return Err(e.into());
    }

    Ok(())
}

/// List buckets matching a label filter.
pub async fn list_buckets(
    config: &CliConfig,
    labels: Option<String>,
    project_id: Option<String>,
    service_account: Option<String>,
    output: Option<OutputFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = LabelFilter::parse_optional(labels.as_deref())?;
    let service_account = resolve_service_account(service_account, config)?;
    let project_id = project_id
        .filter(|p| !p.trim().is_empty())
        .or_else(|| config.project_id.clone());

    let storage = Arc::new(GsutilClient::new(
        GsutilConfig {
            program: config.gsutil_path.clone(),
            service_account,
        },
        CommandRunner::new(RunnerConfig {
            timeout_seconds: Some(config.timeout_seconds),
        }),
    ));
    let selected = BucketDiscovery::new(storage.clone(), storage)
        .select(project_id.as_deref(), &filter)
        .await?;

    match output.unwrap_or(config.output_format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&selected)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&selected)?),
        OutputFormat::Table => {
            if selected.is_empty() {
                println!("{} No buckets match", style("i").blue());
            }
            for bucket in &selected {
                let labels: Vec<String> = bucket
                    .labels
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                println!("  {} {}", style(&bucket.id).bold(), style(labels.join(",")).dim());
            }
        }
    }

    Ok(())
}

/// Show configuration.
pub fn show_config(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current configuration:");
    println!(
        "  project_id: {}",
        config.project_id.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  service_account: {}",
        config.service_account.as_deref().unwrap_or("(not set)")
    );
    println!("  gsutil_path: {}", config.gsutil_path);
    println!("  gh_path: {}", config.gh_path);
    println!("  timeout_seconds: {}", config.timeout_seconds);
    println!("  failure_policy: {:?}", config.failure_policy);
    println!("  output_format: {:?}", config.output_format);

    if let Ok(path) = CliConfig::config_path() {
        println!("\nConfig file: {}", path.display());
    }

    Ok(())
}

/// Set configuration.
pub fn set_config(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
