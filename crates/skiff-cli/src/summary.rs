//! Run summary output: the append-only summary file and console rendering.

use crate::config::OutputFormat;
use console::style;
use skiff_core::{DeploymentOutcome, DeploymentReport};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only sink for summary lines, e.g. `$GITHUB_STEP_SUMMARY`.
pub struct SummaryFile {
    path: PathBuf,
}

impl SummaryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line per outcome.
    pub fn append(&self, report: &DeploymentReport) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for line in report.summary_lines() {
            writeln!(file, "{}", line)?;
        }

        Ok(())
    }
}

/// Render a report to stdout in the requested format.
pub fn print_report(
    report: &DeploymentReport,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
        OutputFormat::Table => print_table(report),
    }
    Ok(())
}

fn print_table(report: &DeploymentReport) {
    println!(
        "\n{} Deployment {}",
        style("▶").cyan().bold(),
        style(report.run_id).dim()
    );
    if !report.filter.is_empty() {
        println!("  Filter: {}", report.filter);
    }
    println!("  Matched buckets: {}", report.selected.len());

    for outcome in &report.outcomes {
        let marker = match outcome {
            DeploymentOutcome::Deployed { .. } => style("✓").green(),
            DeploymentOutcome::Failed { .. } => style("✗").red(),
            DeploymentOutcome::Skipped => style("⏭").dim(),
        };
        println!("    {} {}", marker, outcome.summary_line());
    }

    let elapsed = report.finished_at - report.started_at;
    let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
    match &report.error {
        None => println!(
            "{} Deployment completed in {:.2}s",
            style("✓").green().bold(),
            seconds
        ),
        Some(error) => println!(
            "{} Deployment failed after {:.2}s: {}",
            style("✗").red().bold(),
            seconds,
            error
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_core::{Bucket, LabelFilter, RunId};

    fn report(outcomes: Vec<DeploymentOutcome>) -> DeploymentReport {
        let selected = vec![Bucket::new("gs://a")];
        DeploymentReport::new(
            RunId::new(),
            &LabelFilter::empty(),
            &selected,
            chrono::Utc::now(),
        )
        .finish(Ok(outcomes))
    }

    #[test]
    fn test_append_writes_one_line_per_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SummaryFile::new(dir.path().join("summary.md"));

        sink.append(&report(vec![DeploymentOutcome::Deployed {
            bucket: "gs://a".to_string(),
            source: "dist/*".to_string(),
            destination: "gs://a/site".to_string(),
            public_read: false,
        }]))
        .unwrap();
        sink.append(&report(vec![DeploymentOutcome::Skipped])).unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            content,
            "Deployed `dist/*` to `gs://a/site`\nNo destination found, deployment skipped\n"
        );
    }
}
