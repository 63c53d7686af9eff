//! Child process execution with streamed output and a timeout.

use skiff_core::{Error, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::{Duration, timeout};
use tracing::{debug, warn};

/// Configuration for external command execution.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub timeout_seconds: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Some(3600), // 1 hour default
        }
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    /// Last non-empty stderr line, or the exit code when stderr is silent.
    pub fn error_summary(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("exit code {}", self.exit_code))
    }
}

/// Runs a program directly (no shell) and waits for it to exit.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    config: RunnerConfig,
}

impl CommandRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run `program` with `args`.
    ///
    /// A non-zero exit is reported through [`CommandOutput::success`]; only
    /// spawn failures and timeouts are errors.
    pub async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let start = std::time::Instant::now();

        debug!(program, args = ?args, "Executing command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Internal(format!("Failed to spawn {}: {}", program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("stderr not captured".to_string()))?;

        let stdout_handle = tokio::spawn(collect_lines(stdout, "stdout"));
        let stderr_handle = tokio::spawn(collect_lines(stderr, "stderr"));

        let wait_result = if let Some(timeout_secs) = self.config.timeout_seconds {
            match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(program, timeout_secs, "Command timed out, killing process");
                    let _ = child.kill().await;
                    return Err(Error::Internal(format!(
                        "{} timed out after {}s",
                        program, timeout_secs
                    )));
                }
            }
        } else {
            child.wait().await
        };

        let stdout = stdout_handle.await.unwrap_or_default();
        let stderr = stderr_handle.await.unwrap_or_default();

        let status = wait_result
            .map_err(|e| Error::Internal(format!("Failed to wait for {}: {}", program, e)))?;

        let exit_code = status.code().unwrap_or(-1);
        let duration_ms = start.elapsed().as_millis() as u64;

        debug!(program, exit_code, duration_ms, "Command completed");

        Ok(CommandOutput {
            exit_code,
            success: exit_code == 0,
            stdout,
            stderr,
            duration_ms,
        })
    }
}

async fn collect_lines<R>(reader: R, stream: &'static str) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut collected = String::new();

    while let Ok(Some(line)) = lines.next_line().await {
        debug!(stream, "{}", line);
        collected.push_str(&line);
        collected.push('\n');
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = CommandRunner::default();
        let output = runner.run("echo", &args(&["hello"])).await.unwrap();

        assert!(output.success);
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout, "hello\n");
    }

    #[tokio::test]
    async fn test_run_reports_failure_exit_code() {
        let runner = CommandRunner::default();
        let output = runner
            .run("sh", &args(&["-c", "echo oops >&2; exit 3"]))
            .await
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.error_summary(), "oops");
    }

    #[tokio::test]
    async fn test_run_missing_program_is_error() {
        let runner = CommandRunner::default();
        let err = runner
            .run("skiff-definitely-not-installed", &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let runner = CommandRunner::new(RunnerConfig {
            timeout_seconds: Some(1),
        });
        let err = runner.run("sleep", &args(&["5"])).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_error_summary_falls_back_to_exit_code() {
        let output = CommandOutput {
            exit_code: 2,
            success: false,
            stdout: String::new(),
            stderr: "\n  \n".to_string(),
            duration_ms: 0,
        };
        assert_eq!(output.error_summary(), "exit code 2");
    }
}
