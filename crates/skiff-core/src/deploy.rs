//! Fan-out deployment to selected buckets.

use crate::bucket::Bucket;
use crate::filter::LabelFilter;
use crate::ids::RunId;
use crate::ports::{AclGranter, ObjectCopier};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// What to deploy and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    /// Local source tree root.
    pub source_path: String,
    /// Bucket-relative destination prefix.
    pub destination_path: String,
    /// Metadata header applied to every uploaded object.
    pub header: Option<String>,
    /// Grant public read on each bucket after a successful copy.
    pub public_read: bool,
    pub filter: LabelFilter,
}

impl DeploymentRequest {
    /// The source handed to the copier: every direct child of `source_path`,
    /// never the directory itself.
    pub fn effective_source(&self) -> String {
        if self.source_path.ends_with('*') {
            return self.source_path.clone();
        }
        format!("{}/*", self.source_path.trim_end_matches('/'))
    }
}

/// Per-destination audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeploymentOutcome {
    Deployed {
        bucket: String,
        source: String,
        destination: String,
        public_read: bool,
    },
    Failed {
        bucket: String,
        source: String,
        destination: String,
        reason: String,
    },
    /// No bucket matched the filter.
    Skipped,
}

impl DeploymentOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, DeploymentOutcome::Failed { .. })
    }

    pub fn bucket(&self) -> Option<&str> {
        match self {
            DeploymentOutcome::Deployed { bucket, .. } | DeploymentOutcome::Failed { bucket, .. } => {
                Some(bucket)
            }
            DeploymentOutcome::Skipped => None,
        }
    }

    /// Human-readable line for the run summary.
    pub fn summary_line(&self) -> String {
        match self {
            DeploymentOutcome::Deployed {
                source,
                destination,
                public_read,
                ..
            } => {
                let mut line = format!("Deployed `{}` to `{}`", source, destination);
                if *public_read {
                    line.push_str(" (public read)");
                }
                line
            }
            DeploymentOutcome::Failed {
                source,
                destination,
                reason,
                ..
            } => format!("Failed to deploy `{}` to `{}`: {}", source, destination, reason),
            DeploymentOutcome::Skipped => "No destination found, deployment skipped".to_string(),
        }
    }
}

/// How the fan-out reacts to a per-bucket failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the remaining fan-out on the first failure.
    #[default]
    FailFast,
    /// Keep going and report every failure at the end.
    BestEffort,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail_fast" | "fail-fast" => Ok(FailurePolicy::FailFast),
            "best_effort" | "best-effort" => Ok(FailurePolicy::BestEffort),
            _ => Err(Error::Configuration(format!("Invalid failure policy: {}", s))),
        }
    }
}

/// A failed fan-out together with the outcomes recorded before it stopped.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct DeployFailure {
    pub error: Error,
    pub outcomes: Vec<DeploymentOutcome>,
}

/// Copies a request to each selected bucket in order.
pub struct Deployer {
    copier: Arc<dyn ObjectCopier>,
    acl: Arc<dyn AclGranter>,
    policy: FailurePolicy,
}

impl Deployer {
    pub fn new(copier: Arc<dyn ObjectCopier>, acl: Arc<dyn AclGranter>) -> Self {
        Self {
            copier,
            acl,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Deploy `request` to every bucket in `selected`, sequentially.
    ///
    /// An empty selection yields a single [`DeploymentOutcome::Skipped`] and no
    /// copy calls.
    pub async fn deploy(
        &self,
        selected: &[Bucket],
        request: &DeploymentRequest,
    ) -> std::result::Result<Vec<DeploymentOutcome>, DeployFailure> {
        if selected.is_empty() {
            info!(filter = %request.filter, "No destination found, deployment skipped");
            return Ok(vec![DeploymentOutcome::Skipped]);
        }

        let source = request.effective_source();
        let mut outcomes = Vec::with_capacity(selected.len());
        let mut failed = 0usize;

        for bucket in selected {
            let destination = bucket.destination(&request.destination_path);

            match self.deploy_one(bucket, &source, &destination, request).await {
                Ok(()) => {
                    info!(bucket = %bucket.id, %destination, "Deployed");
                    outcomes.push(DeploymentOutcome::Deployed {
                        bucket: bucket.id.clone(),
                        source: source.clone(),
                        destination,
                        public_read: request.public_read,
                    });
                }
                Err(error) => match self.policy {
                    FailurePolicy::FailFast => {
                        warn!(bucket = %bucket.id, error = %error, "Deployment aborted");
                        return Err(DeployFailure { error, outcomes });
                    }
                    FailurePolicy::BestEffort => {
                        warn!(bucket = %bucket.id, error = %error, "Deployment failed, continuing");
                        failed += 1;
                        outcomes.push(DeploymentOutcome::Failed {
                            bucket: bucket.id.clone(),
                            source: source.clone(),
                            destination,
                            reason: error.to_string(),
                        });
                    }
                },
            }
        }

        if failed > 0 {
            return Err(DeployFailure {
                error: Error::PartialDeployment {
                    failed,
                    total: selected.len(),
                },
                outcomes,
            });
        }

        Ok(outcomes)
    }

    async fn deploy_one(
        &self,
        bucket: &Bucket,
        source: &str,
        destination: &str,
        request: &DeploymentRequest,
    ) -> Result<()> {
        self.copier
            .copy(source, destination, request.header.as_deref())
            .await?;

        // The copy stays in place if the grant fails.
        if request.public_read {
            self.acl.grant_public_read(&bucket.id).await?;
        }

        Ok(())
    }
}

/// Result of one deployment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub run_id: RunId,
    pub filter: String,
    pub selected: Vec<String>,
    pub outcomes: Vec<DeploymentOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the run failed.
    pub error: Option<String>,
}

impl DeploymentReport {
    pub fn new(
        run_id: RunId,
        filter: &LabelFilter,
        selected: &[Bucket],
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            filter: filter.to_string(),
            selected: selected.iter().map(|b| b.id.clone()).collect(),
            outcomes: Vec::new(),
            started_at,
            finished_at: started_at,
            error: None,
        }
    }

    /// Record the fan-out result and stamp the finish time.
    pub fn finish(
        mut self,
        result: std::result::Result<Vec<DeploymentOutcome>, DeployFailure>,
    ) -> Self {
        match result {
            Ok(outcomes) => self.outcomes = outcomes,
            Err(failure) => {
                self.outcomes = failure.outcomes;
                self.error = Some(failure.error.to_string());
            }
        }
        self.finished_at = Utc::now();
        self
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.outcomes.iter().all(DeploymentOutcome::succeeded)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(DeploymentOutcome::summary_line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(source: &str) -> DeploymentRequest {
        DeploymentRequest {
            source_path: source.to_string(),
            destination_path: "to-path".to_string(),
            header: None,
            public_read: false,
            filter: LabelFilter::empty(),
        }
    }

    #[test]
    fn test_effective_source_appends_wildcard() {
        assert_eq!(request("dist").effective_source(), "dist/*");
        assert_eq!(request("dist/").effective_source(), "dist/*");
        assert_eq!(request("dist/*").effective_source(), "dist/*");
    }

    #[test]
    fn test_summary_lines() {
        let deployed = DeploymentOutcome::Deployed {
            bucket: "gs://a".to_string(),
            source: "dist/*".to_string(),
            destination: "gs://a/to-path".to_string(),
            public_read: false,
        };
        assert_eq!(deployed.summary_line(), "Deployed `dist/*` to `gs://a/to-path`");
        assert_eq!(
            DeploymentOutcome::Skipped.summary_line(),
            "No destination found, deployment skipped"
        );
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!("fail_fast".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailFast);
        assert_eq!("best-effort".parse::<FailurePolicy>().unwrap(), FailurePolicy::BestEffort);
        assert!("sometimes".parse::<FailurePolicy>().unwrap_err().is_configuration());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(DeploymentOutcome::Skipped).unwrap();
        assert_eq!(json["status"], "skipped");
    }
}
