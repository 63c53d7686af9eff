//! Resolution of flags, environment and config file into validated settings.

use crate::commands::DeployArgs;
use crate::config::{CliConfig, OutputFormat};
use skiff_core::{DeploymentRequest, Error, FailurePolicy, LabelFilter, Result};
use std::path::PathBuf;

/// Everything a deployment run needs, validated before any external call.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub request: DeploymentRequest,
    pub project_id: Option<String>,
    pub artifacts_name: Option<String>,
    pub service_account: Option<String>,
    pub policy: FailurePolicy,
    pub summary_file: Option<PathBuf>,
    pub output: OutputFormat,
}

impl DeploySettings {
    /// Merge `args` over `config` and validate the result.
    pub fn resolve(args: DeployArgs, config: &CliConfig) -> Result<Self> {
        let from_path = required("from-path", &args.from_path)?;
        let to_path = required("to-path", &args.to_path)?;

        let filter = LabelFilter::parse_optional(non_empty(args.labels).as_deref())?;

        let service_account = resolve_service_account(args.service_account, config)?;

        let artifacts_name = non_empty(args.artifacts_name);
        if artifacts_name.is_none() && !PathBuf::from(&from_path).is_dir() {
            return Err(Error::Configuration(format!(
                "from-path `{}` is not a directory",
                from_path
            )));
        }

        let policy = if args.best_effort {
            FailurePolicy::BestEffort
        } else {
            config.failure_policy
        };

        Ok(Self {
            request: DeploymentRequest {
                source_path: from_path,
                destination_path: to_path,
                header: non_empty(args.header),
                public_read: args.public,
                filter,
            },
            project_id: non_empty(args.project_id).or_else(|| config.project_id.clone()),
            artifacts_name,
            service_account,
            policy,
            summary_file: args.summary_file,
            output: args.output.unwrap_or(config.output_format),
        })
    }
}

fn required(name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Configuration(format!("{} is required", name)));
    }
    Ok(value.to_string())
}

/// Workflow inputs arrive as empty strings when unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The identity storage calls run under: the flag if set, else the config
/// file. Every command that talks to storage resolves it here.
pub fn resolve_service_account(
    flag: Option<String>,
    config: &CliConfig,
) -> Result<Option<String>> {
    let service_account = non_empty(flag).or_else(|| config.service_account.clone());
    if let Some(sa) = &service_account {
        validate_service_account(sa)?;
    }
    Ok(service_account)
}

fn validate_service_account(sa: &str) -> Result<()> {
    let sa = sa.trim();
    if sa.is_empty() || !sa.contains('@') {
        return Err(Error::Configuration(format!(
            "service account `{}` is not an email address",
            sa
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(from_path: &str) -> DeployArgs {
        DeployArgs {
            from_path: from_path.to_string(),
            to_path: "site".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_minimal() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().to_string_lossy().to_string();

        let settings = DeploySettings::resolve(args(&from), &CliConfig::default()).unwrap();

        assert_eq!(settings.request.source_path, from);
        assert_eq!(settings.request.destination_path, "site");
        assert!(settings.request.filter.is_empty());
        assert!(!settings.request.public_read);
        assert_eq!(settings.policy, FailurePolicy::FailFast);
        assert_eq!(settings.output, OutputFormat::Table);
    }

    #[test]
    fn test_resolve_malformed_labels_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(&dir.path().to_string_lossy());
        args.labels = Some("service=x,env".to_string());

        let err = DeploySettings::resolve(args, &CliConfig::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolve_empty_inputs_are_unset() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(&dir.path().to_string_lossy());
        args.labels = Some(String::new());
        args.header = Some(" ".to_string());
        args.project_id = Some(String::new());

        let mut config = CliConfig::default();
        config.project_id = Some("fallback".to_string());

        let settings = DeploySettings::resolve(args, &config).unwrap();
        assert!(settings.request.filter.is_empty());
        assert!(settings.request.header.is_none());
        assert_eq!(settings.project_id.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_resolve_requires_paths() {
        let err = DeploySettings::resolve(args(""), &CliConfig::default()).unwrap_err();
        assert!(err.to_string().contains("from-path is required"));
    }

    #[test]
    fn test_resolve_missing_source_dir() {
        let err =
            DeploySettings::resolve(args("/definitely/not/here"), &CliConfig::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolve_missing_source_dir_allowed_with_artifacts() {
        let mut args = args("/definitely/not/here");
        args.artifacts_name = Some("web-dist".to_string());
        assert!(DeploySettings::resolve(args, &CliConfig::default()).is_ok());
    }

    #[test]
    fn test_resolve_invalid_service_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CliConfig::default();
        config.service_account = Some("not-an-account".to_string());

        let err = DeploySettings::resolve(args(&dir.path().to_string_lossy()), &config).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_service_account_flag_overrides_config() {
        let mut config = CliConfig::default();
        config.service_account = Some("config@proj.iam.gserviceaccount.com".to_string());

        let sa = resolve_service_account(
            Some("flag@proj.iam.gserviceaccount.com".to_string()),
            &config,
        )
        .unwrap();
        assert_eq!(sa.as_deref(), Some("flag@proj.iam.gserviceaccount.com"));

        let sa = resolve_service_account(Some(String::new()), &config).unwrap();
        assert_eq!(sa.as_deref(), Some("config@proj.iam.gserviceaccount.com"));

        assert!(resolve_service_account(None, &CliConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_service_account_flag_is_validated() {
        let err = resolve_service_account(Some("deployer".to_string()), &CliConfig::default())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolve_best_effort_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(&dir.path().to_string_lossy());
        args.best_effort = true;

        let settings = DeploySettings::resolve(args, &CliConfig::default()).unwrap();
        assert_eq!(settings.policy, FailurePolicy::BestEffort);
    }
}
