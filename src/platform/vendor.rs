// Vendor binaries inside the scanner installation

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RenewError, RenewResult};
use crate::platform::process::{ExecutionContext, ProcessRunner};
use crate::platform::types::{InstallLayout, StepResult};

const SECRET_KEYS: &[&str] = &["proxy_password="];

/// Runs the vendor CLI and daemon from the installation directory
#[derive(Debug, Clone)]
pub struct VendorTools {
    layout: InstallLayout,
    runner: ProcessRunner,
    timeout: Duration,
}

impl VendorTools {
    pub fn new(layout: InstallLayout, timeout: Duration) -> Self {
        Self {
            layout,
            runner: ProcessRunner::new(),
            timeout,
        }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn locate(&self) -> RenewResult<()> {
        if self.layout.is_installed() {
            Ok(())
        } else {
            Err(RenewError::InstallationNotFound(self.layout.cli_path()))
        }
    }

    pub async fn run_cli(&self, args: &[String]) -> RenewResult<StepResult> {
        self.run(self.layout.cli_path(), args, None).await
    }

    /// Run the CLI with `answer` piped to its prompt
    pub async fn run_cli_answering(&self, args: &[String], answer: &[u8]) -> RenewResult<StepResult> {
        self.run(self.layout.cli_path(), args, Some(answer)).await
    }

    pub async fn run_daemon(&self, args: &[String]) -> RenewResult<StepResult> {
        self.run(self.layout.daemon_path(), args, None).await
    }

    async fn run(&self, program: PathBuf, args: &[String], input: Option<&[u8]>) -> RenewResult<StepResult> {
        let mut context = ExecutionContext::new(program, args.to_vec())
            .with_working_directory(self.layout.root())
            .with_timeout(self.timeout);
        if let Some(input) = input {
            context = context.with_input(input);
        }

        log::debug!("Running {} {}", context.program_name(), redact_args(args).join(" "));
        let result = self.runner.execute(&context).await?;
        Ok(result.step_result())
    }
}

/// Copy of `args` safe to write to logs
pub fn redact_args(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            match SECRET_KEYS.iter().find(|key| arg.starts_with(*key)) {
                Some(key) => format!("{}****", key),
                None => arg.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_args() {
        let args: Vec<String> = ["fix", "--secure", "--set", "proxy_password=hunter2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            redact_args(&args),
            vec!["fix", "--secure", "--set", "proxy_password=****"]
        );
    }

    #[test]
    fn test_locate_missing_installation() {
        let dir = tempfile::tempdir().unwrap();
        let tools = VendorTools::new(
            InstallLayout::new(dir.path(), "nessuscli", "nessusd"),
            Duration::from_secs(5),
        );

        match tools.locate() {
            Err(RenewError::InstallationNotFound(path)) => {
                assert_eq!(path, dir.path().join("nessuscli"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
