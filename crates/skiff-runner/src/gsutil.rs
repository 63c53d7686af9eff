//! Storage ports backed by the `gsutil` command-line tool.

use crate::command::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use skiff_core::bucket::{Labels, normalize_id};
use skiff_core::ports::{AclGranter, BucketLister, LabelReader, ObjectCopier};
use skiff_core::{Error, Result};
use tracing::info;

const NO_LABELS_MARKER: &str = "has no label configuration";
const PUBLIC_READ_BINDING: &str = "allUsers:objectViewer";

#[derive(Debug, Clone)]
pub struct GsutilConfig {
    /// Path or name of the `gsutil` binary.
    pub program: String,
    /// Service account to impersonate on every call.
    pub service_account: Option<String>,
}

impl Default for GsutilConfig {
    fn default() -> Self {
        Self {
            program: "gsutil".to_string(),
            service_account: None,
        }
    }
}

/// Implements every storage port with one `gsutil` invocation per call.
pub struct GsutilClient {
    config: GsutilConfig,
    runner: CommandRunner,
}

impl GsutilClient {
    pub fn new(config: GsutilConfig, runner: CommandRunner) -> Self {
        Self { config, runner }
    }

    fn args<I, S>(&self, rest: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = Vec::new();
        if let Some(sa) = &self.config.service_account {
            args.push("-i".to_string());
            args.push(sa.clone());
        }
        args.extend(rest.into_iter().map(Into::into));
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        self.runner.run(&self.config.program, &args).await
    }
}

#[async_trait]
impl BucketLister for GsutilClient {
    async fn list_buckets(&self, project_id: Option<&str>) -> Result<Vec<String>> {
        let mut rest = vec!["ls".to_string()];
        if let Some(project) = project_id {
            rest.push("-p".to_string());
            rest.push(project.to_string());
        }

        let output = self.run(self.args(rest)).await?;
        if !output.success {
            return Err(Error::Discovery(format!(
                "bucket listing failed: {}",
                output.error_summary()
            )));
        }

        Ok(parse_bucket_listing(&output.stdout))
    }
}

#[async_trait]
impl LabelReader for GsutilClient {
    async fn read_labels(&self, bucket: &str) -> Result<Labels> {
        let output = self.run(self.args(["label", "get", bucket])).await?;
        if !output.success {
            return Err(Error::Discovery(format!(
                "label read for {} failed: {}",
                bucket,
                output.error_summary()
            )));
        }

        parse_labels(bucket, &output.stdout)
    }
}

#[async_trait]
impl ObjectCopier for GsutilClient {
    async fn copy(&self, source: &str, destination: &str, header: Option<&str>) -> Result<()> {
        let mut rest = vec!["-m".to_string()];
        if let Some(header) = header {
            rest.push("-h".to_string());
            rest.push(header.to_string());
        }
        rest.extend(["cp", "-r", source, destination].map(String::from));

        info!(%source, %destination, "Copying objects");
        let output = self.run(self.args(rest)).await?;
        if !output.success {
            return Err(Error::Copy {
                destination: destination.to_string(),
                message: output.error_summary(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl AclGranter for GsutilClient {
    async fn grant_public_read(&self, bucket: &str) -> Result<()> {
        info!(%bucket, "Granting public read");
        let output = self
            .run(self.args(["iam", "ch", PUBLIC_READ_BINDING, bucket]))
            .await?;
        if !output.success {
            return Err(Error::Acl {
                bucket: bucket.to_string(),
                message: output.error_summary(),
            });
        }

        Ok(())
    }
}

/// Parse `gsutil ls` output: one `gs://name/` per line.
pub fn parse_bucket_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("gs://"))
        .map(normalize_id)
        .collect()
}

/// Parse `gsutil label get` output: a JSON object, or a notice that the
/// bucket carries no labels.
pub fn parse_labels(bucket: &str, stdout: &str) -> Result<Labels> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() || trimmed.contains(NO_LABELS_MARKER) {
        return Ok(Labels::new());
    }

    serde_json::from_str(trimmed).map_err(|e| {
        Error::Discovery(format!("unreadable label output for {}: {}", bucket, e))
    })
}
