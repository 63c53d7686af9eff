//! External CLI adapters for Skiff.
//!
//! Every port in `skiff_core::ports` is implemented here by invoking an
//! already-authenticated command-line tool as a child process.

pub mod command;
pub mod gh;
pub mod gsutil;

pub use command::{CommandOutput, CommandRunner, RunnerConfig};
pub use gh::{GhArtifactFetcher, GhConfig};
pub use gsutil::{GsutilClient, GsutilConfig};
