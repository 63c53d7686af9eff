//! Bucket types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label mapping attached to a bucket.
pub type Labels = BTreeMap<String, String>;

/// A storage bucket as seen at listing time.
///
/// Buckets are owned by the storage provider. Skiff reads their labels and
/// writes objects into them, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket URI without a trailing slash, e.g. `gs://assets`.
    pub id: String,
    #[serde(default)]
    pub labels: Labels,
}

impl Bucket {
    /// Create a bucket with no labels.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: normalize_id(&id.into()),
            labels: Labels::new(),
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Fully-qualified destination for a bucket-relative path.
    pub fn destination(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            format!("{}/", self.id)
        } else {
            format!("{}/{}", self.id, relative)
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Strip surrounding whitespace and the trailing `/` listings print.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        assert_eq!(Bucket::new("gs://a/").id, "gs://a");
        assert_eq!(Bucket::new("  gs://b  ").id, "gs://b");
    }

    #[test]
    fn test_destination_joins_relative_path() {
        let bucket = Bucket::new("gs://a");
        assert_eq!(bucket.destination("to-path"), "gs://a/to-path");
        assert_eq!(bucket.destination("/to-path"), "gs://a/to-path");
        assert_eq!(bucket.destination("nested/dir/"), "gs://a/nested/dir/");
        assert_eq!(bucket.destination(""), "gs://a/");
    }
}
