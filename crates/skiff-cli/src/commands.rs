//! CLI command definitions.

use crate::config::OutputFormat;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a local folder to every bucket matching a label filter
    Deploy(DeployArgs),

    /// List buckets matching a label filter without writing anything
    Buckets {
        /// Comma-delimited key=value label filter
        #[arg(short, long, env = "SKIFF_LABELS")]
        labels: Option<String>,

        /// Project used for bucket listing
        #[arg(long, env = "SKIFF_PROJECT_ID")]
        project_id: Option<String>,

        /// Service account to impersonate
        #[arg(long, env = "SKIFF_SERVICE_ACCOUNT")]
        service_account: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Local source tree; its direct children are uploaded
    #[arg(long, env = "SKIFF_FROM_PATH")]
    pub from_path: String,

    /// Bucket-relative destination prefix
    #[arg(long, env = "SKIFF_TO_PATH")]
    pub to_path: String,

    /// Metadata header applied to every uploaded object
    #[arg(long, env = "SKIFF_HEADER")]
    pub header: Option<String>,

    /// Comma-delimited key=value label filter
    #[arg(short, long, env = "SKIFF_LABELS")]
    pub labels: Option<String>,

    /// Grant public read on every deployed-to bucket
    #[arg(long, env = "SKIFF_PUBLIC")]
    pub public: bool,

    /// Project used for bucket listing
    #[arg(long, env = "SKIFF_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Build artifact to download into the source path first
    #[arg(long, env = "SKIFF_ARTIFACTS_NAME")]
    pub artifacts_name: Option<String>,

    /// Service account to impersonate
    #[arg(long, env = "SKIFF_SERVICE_ACCOUNT")]
    pub service_account: Option<String>,

    /// Continue past failing buckets and report all failures at the end
    #[arg(long)]
    pub best_effort: bool,

    /// File the run summary is appended to
    #[arg(long, env = "GITHUB_STEP_SUMMARY")]
    pub summary_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
