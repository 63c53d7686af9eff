//! Bucket discovery and label-based selection.

use crate::Result;
use crate::bucket::Bucket;
use crate::filter::LabelFilter;
use crate::ports::{BucketLister, LabelReader};
use std::sync::Arc;
use tracing::{debug, info};

/// Buckets from `all` whose labels satisfy `filter`, in listing order.
pub fn select_buckets(all: &[Bucket], filter: &LabelFilter) -> Vec<Bucket> {
    all.iter()
        .filter(|bucket| filter.matches(&bucket.labels))
        .cloned()
        .collect()
}

/// Enumerates buckets and their labels through the storage ports.
pub struct BucketDiscovery {
    lister: Arc<dyn BucketLister>,
    labels: Arc<dyn LabelReader>,
}

impl BucketDiscovery {
    pub fn new(lister: Arc<dyn BucketLister>, labels: Arc<dyn LabelReader>) -> Self {
        Self { lister, labels }
    }

    /// List every visible bucket and read its labels, one bucket at a time.
    ///
    /// Label reads are skipped when `filter` is empty since they cannot change
    /// the selection. Any listing or label error aborts discovery.
    pub async fn discover(
        &self,
        project_id: Option<&str>,
        filter: &LabelFilter,
    ) -> Result<Vec<Bucket>> {
        let ids = self.lister.list_buckets(project_id).await?;
        info!(count = ids.len(), project = ?project_id, "Listed buckets");

        let mut buckets = Vec::with_capacity(ids.len());
        for id in ids {
            let mut bucket = Bucket::new(id);
            if !filter.is_empty() {
                bucket.labels = self.labels.read_labels(&bucket.id).await?;
                debug!(bucket = %bucket.id, labels = ?bucket.labels, "Read bucket labels");
            }
            buckets.push(bucket);
        }

        Ok(buckets)
    }

    /// Discover buckets and keep the ones matching `filter`.
    pub async fn select(
        &self,
        project_id: Option<&str>,
        filter: &LabelFilter,
    ) -> Result<Vec<Bucket>> {
        let all = self.discover(project_id, filter).await?;
        let selected = select_buckets(&all, filter);

        info!(
            listed = all.len(),
            selected = selected.len(),
            filter = %filter,
            "Selected buckets"
        );

        Ok(selected)
    }
}
