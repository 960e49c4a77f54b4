// External process execution shared by both platform adapters

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{RenewError, RenewResult};
use crate::platform::types::StepResult;

/// Execution context for one external program
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub program: PathBuf,
    pub arguments: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub timeout: Duration,
    /// Bytes written to stdin; stdin is closed afterwards
    pub input: Option<Vec<u8>>,
}

impl ExecutionContext {
    /// Create a new execution context
    pub fn new(program: impl Into<PathBuf>, arguments: Vec<String>) -> Self {
        Self {
            program: program.into(),
            arguments,
            working_directory: None,
            timeout: Duration::from_secs(60),
            input: None,
        }
    }

    /// Set the working directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Feed `input` to the program's stdin
    pub fn with_input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Short program name for messages
    pub fn program_name(&self) -> String {
        display_name(&self.program)
    }
}

/// Captured result of a finished program
#[derive(Debug)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub execution_time: Duration,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr together, for message matching
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    pub fn step_result(&self) -> StepResult {
        StepResult::from_output(self.exit_code, &self.stdout, &self.stderr)
    }
}

fn display_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string())
}

/// Runs external programs to completion
///
/// Output is always captured through pipes. When input is supplied it is
/// written while both output pipes are being drained, so a child that prints
/// a lot before reading its prompt answer cannot stall on a full pipe.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, context: &ExecutionContext) -> RenewResult<ExecutionResult> {
        let start = Instant::now();
        let program = context.program_name();

        let mut cmd = Command::new(&context.program);
        cmd.args(&context.arguments);

        if let Some(ref dir) = context.working_directory {
            cmd.current_dir(dir);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(if context.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        // Dropping the future (timeout, interruption) must not leave the child running
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| RenewError::spawn(program.clone(), e))?;

        let stdin = child.stdin.take();
        let input = context.input.clone();
        let feed = async move {
            if let (Some(mut stdin), Some(input)) = (stdin, input) {
                // The child may exit without reading its prompt answer
                if let Err(e) = stdin.write_all(&input).await {
                    log::debug!("Could not write to stdin: {}", e);
                }
                let _ = stdin.shutdown().await;
            }
        };

        let run = async move {
            let (_, output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        let output = timeout(context.timeout, run)
            .await
            .map_err(|_| RenewError::Timeout {
                program: program.clone(),
                after: context.timeout,
            })?
            .map_err(RenewError::Io)?;

        let result = ExecutionResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            execution_time: start.elapsed(),
        };

        log::debug!(
            "{} exited with {} after {:?}",
            program,
            result.exit_code,
            result.execution_time
        );

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ExecutionContext {
        ExecutionContext::new("/bin/sh", vec!["-c".to_string(), script.to_string()])
            .with_timeout(Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_captures_exit_code_and_output() {
        let runner = ProcessRunner::new();
        let result = runner
            .execute(&sh("echo hello; echo broken >&2; exit 3"))
            .await
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.step_result().stderr_tail, "broken");
    }

    #[tokio::test]
    async fn test_input_is_delivered() {
        let runner = ProcessRunner::new();
        let context = sh("read answer; [ \"$answer\" = y ]").with_input(b"y\n".to_vec());

        let result = runner.execute(&context).await.unwrap();
        assert!(result.success());
    }

    #[tokio::test]
    async fn test_large_output_before_prompt_does_not_stall() {
        let runner = ProcessRunner::new();
        // Far more than a pipe buffer on both streams before the prompt is read
        let context = sh(
            "head -c 300000 /dev/zero | tr '\\0' o; head -c 300000 /dev/zero | tr '\\0' e >&2; \
             read answer; [ \"$answer\" = y ]",
        )
        .with_input(b"y\n".to_vec());

        let result = runner.execute(&context).await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.len(), 300000);
        assert_eq!(result.stderr.len(), 300000);
    }

    #[tokio::test]
    async fn test_child_ignoring_input() {
        let runner = ProcessRunner::new();
        let context = sh("exit 0").with_input(b"y\n".to_vec());

        let result = runner.execute(&context).await.unwrap();
        assert!(result.success());
    }

    #[tokio::test]
    async fn test_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new();
        let result = runner
            .execute(&sh("pwd").with_working_directory(dir.path()))
            .await
            .unwrap();

        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = ProcessRunner::new();
        let context = sh("sleep 5").with_timeout(Duration::from_millis(100));

        let result = runner.execute(&context).await;
        assert!(matches!(result, Err(RenewError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = ProcessRunner::new();
        let context = ExecutionContext::new("/nonexistent/nessuscli_12345", vec![]);

        match runner.execute(&context).await {
            Err(RenewError::Spawn { program, .. }) => assert_eq!(program, "nessuscli_12345"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
