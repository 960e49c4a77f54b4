// Platform type definitions

use std::path::{Path, PathBuf};

const TAIL_LINES: usize = 5;
const TAIL_CHARS: usize = 1024;

/// Outcome of one vendor command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub succeeded: bool,
    pub exit_code: i32,
    /// Last few lines of error output, stdout if stderr was silent
    pub stderr_tail: String,
}

impl StepResult {
    pub fn from_output(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        let source = if stderr.trim().is_empty() { stdout } else { stderr };
        Self {
            succeeded: exit_code == 0,
            exit_code,
            stderr_tail: tail(source),
        }
    }

    pub fn ok() -> Self {
        Self {
            succeeded: true,
            exit_code: 0,
            stderr_tail: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr_tail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            exit_code,
            stderr_tail: stderr_tail.into(),
        }
    }
}

/// Last non-empty lines of `text`, bounded in size
pub fn tail(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    let joined = lines[start..].join("\n");

    let count = joined.chars().count();
    if count <= TAIL_CHARS {
        joined
    } else {
        joined.chars().skip(count - TAIL_CHARS).collect()
    }
}

/// Where the vendor binaries live on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub root: PathBuf,
    pub cli_name: String,
    pub daemon_name: String,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>, cli_name: impl Into<String>, daemon_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            cli_name: cli_name.into(),
            daemon_name: daemon_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vendor administration CLI
    pub fn cli_path(&self) -> PathBuf {
        self.root.join(&self.cli_name)
    }

    /// Scanner daemon binary, used for plugin-database rebuilds
    pub fn daemon_path(&self) -> PathBuf {
        self.root.join(&self.daemon_name)
    }

    pub fn is_installed(&self) -> bool {
        self.cli_path().is_file()
    }
}
