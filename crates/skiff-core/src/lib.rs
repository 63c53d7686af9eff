//! Skiff Core
//!
//! Domain types, traits, and error handling for Skiff.
//! This crate performs no I/O of its own: bucket listing, label reads, object
//! copies and ACL grants all go through the port traits in [`ports`].

pub mod bucket;
pub mod deploy;
pub mod error;
pub mod filter;
pub mod ids;
pub mod ports;
pub mod selection;

pub use bucket::Bucket;
pub use deploy::{
    DeployFailure, Deployer, DeploymentOutcome, DeploymentReport, DeploymentRequest,
    FailurePolicy,
};
pub use error::{Error, Result};
pub use filter::LabelFilter;
pub use ids::RunId;
pub use selection::{BucketDiscovery, select_buckets};
