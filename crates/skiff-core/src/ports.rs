//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the deployment logic and the
//! external storage and artifact tooling. Implementations are expected to be
//! already authenticated.

use crate::Result;
use crate::bucket::Labels;
use async_trait::async_trait;
use std::path::Path;

/// Lists buckets visible to the current identity.
#[async_trait]
pub trait BucketLister: Send + Sync {
    /// List bucket URIs, optionally scoped to a project.
    async fn list_buckets(&self, project_id: Option<&str>) -> Result<Vec<String>>;
}

/// Reads the label mapping of a single bucket.
#[async_trait]
pub trait LabelReader: Send + Sync {
    async fn read_labels(&self, bucket: &str) -> Result<Labels>;
}

/// Recursively copies a local source into a bucket destination.
#[async_trait]
pub trait ObjectCopier: Send + Sync {
    /// Copy `source` to `destination`, applying `header` to every uploaded
    /// object when given.
    async fn copy(&self, source: &str, destination: &str, header: Option<&str>) -> Result<()>;
}

/// Grants bucket-level access.
#[async_trait]
pub trait AclGranter: Send + Sync {
    /// Grant read access on the whole bucket to all principals.
    async fn grant_public_read(&self, bucket: &str) -> Result<()>;
}

/// Fetches a named build artifact produced by an earlier job.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, name: &str, destination: &Path) -> Result<()>;
}
