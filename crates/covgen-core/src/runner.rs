//! Stage execution against the external coverage tools.

use crate::error::{PipelineError, Result};
use crate::stage::CoverageStage;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

/// Result of a stage execution.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Stage name.
    pub stage_name: String,

    /// Exit code (0 = success).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether execution succeeded.
    pub success: bool,
}

impl StageResult {
    /// Whether this stage passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Render a command line with each argument individually quoted.
pub fn quoted_command_line(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| format!("'{arg}'"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stage runner that echoes and executes a single external command.
pub struct StageRunner;

impl StageRunner {
    /// Execute a single stage and return the result.
    ///
    /// The full command line is printed to stdout before the child is
    /// spawned, so every run leaves an audit trail of the exact tool
    /// invocations. The call blocks until the child exits; there are no
    /// timeouts and no retries.
    pub async fn execute_stage(stage: CoverageStage, command: &[String]) -> Result<StageResult> {
        let start = Instant::now();

        if command.is_empty() {
            return Err(PipelineError::Exec {
                stage: stage.name(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        }

        println!("Executing: {}", quoted_command_line(command));

        let exe = &command[0];
        let args = &command[1..];

        let child = Command::new(exe)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::Exec {
                stage: stage.name(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| PipelineError::Exec {
                stage: stage.name(),
                source,
            })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let success = output.status.success();

        Ok(StageResult {
            stage_name: stage.name().to_string(),
            exit_code,
            stdout,
            stderr,
            duration_ms,
            success,
        })
    }
}
