// Error types for the renewal workflow

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for renewal operations
pub type RenewResult<T> = std::result::Result<T, RenewError>;

/// Coarse failure classes used for reporting and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not elevated, installation missing, unreadable settings
    Precondition,
    /// The OS service could not be stopped or started
    ServiceControl,
    /// A vendor command exited non-zero or could not be run
    Command,
    /// Invalid user input, checked before anything runs
    Validation,
    /// Operator interrupted the run
    Interrupted,
}

/// Direction of a service-manager call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Stop,
    Start,
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAction::Stop => write!(f, "stop"),
            ServiceAction::Start => write!(f, "start"),
        }
    }
}

/// Vendor command whose failure is being reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStep {
    Reset,
    Register,
    ProxySetting(String),
    PluginUpdate,
    PluginRebuild,
}

impl fmt::Display for CommandStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStep::Reset => write!(f, "reset failed"),
            CommandStep::Register => write!(f, "registration failed"),
            CommandStep::ProxySetting(name) => write!(f, "failed to apply proxy setting {}", name),
            CommandStep::PluginUpdate => write!(f, "plugin update failed"),
            CommandStep::PluginRebuild => write!(f, "plugin database rebuild failed"),
        }
    }
}

/// Errors that can occur while renewing the installation
#[derive(Error, Debug)]
pub enum RenewError {
    /// The process lacks administrative rights
    #[error("insufficient privileges")]
    InsufficientPrivileges,

    /// The vendor tools are not where we expect them
    #[error("installation not found at {}", .0.display())]
    InstallationNotFound(PathBuf),

    /// Host OS has no adapter
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Service manager refused to stop or start the scanner service
    #[error("could not {action} service: {detail}")]
    ServiceControl { action: ServiceAction, detail: String },

    /// A vendor command exited non-zero
    #[error("{step} (exit status {exit_code}){}", tail_suffix(.stderr_tail))]
    Command {
        step: CommandStep,
        exit_code: i32,
        stderr_tail: String,
    },

    /// User supplied an inconsistent configuration
    #[error("{0}")]
    Validation(String),

    /// Operator interrupted the run
    #[error("interrupted by user")]
    Interrupted,

    /// A program could not be launched at all
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A program ran longer than allowed and was killed
    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    /// Settings file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn tail_suffix(tail: &str) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!(": {}", tail.replace('\n', " | "))
    }
}

impl RenewError {
    /// Create a new validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Create a new configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Create a new service control error
    pub fn service(action: ServiceAction, detail: impl Into<String>) -> Self {
        Self::ServiceControl {
            action,
            detail: detail.into(),
        }
    }

    /// Create a spawn error for the given program
    pub fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RenewError::InsufficientPrivileges
            | RenewError::InstallationNotFound(_)
            | RenewError::UnsupportedPlatform(_)
            | RenewError::Config(_)
            | RenewError::Io(_) => ErrorKind::Precondition,
            RenewError::ServiceControl { .. } => ErrorKind::ServiceControl,
            RenewError::Command { .. } | RenewError::Spawn { .. } | RenewError::Timeout { .. } => {
                ErrorKind::Command
            }
            RenewError::Validation(_) => ErrorKind::Validation,
            RenewError::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// Process exit status to report for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation => 2,
            ErrorKind::Interrupted => 130,
            _ => 1,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, RenewError::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_message() {
        let err = RenewError::Command {
            step: CommandStep::ProxySetting("proxy_port".to_string()),
            exit_code: 4,
            stderr_tail: "bad value\nusage".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to apply proxy setting proxy_port (exit status 4): bad value | usage"
        );

        let err = RenewError::Command {
            step: CommandStep::Register,
            exit_code: 1,
            stderr_tail: String::new(),
        };
        assert_eq!(err.to_string(), "registration failed (exit status 1)");
    }

    #[test]
    fn test_kinds_and_exit_codes() {
        assert_eq!(RenewError::InsufficientPrivileges.kind(), ErrorKind::Precondition);
        assert_eq!(RenewError::Interrupted.exit_code(), 130);
        assert_eq!(RenewError::validation("incomplete proxy configuration").exit_code(), 2);

        let err = RenewError::service(ServiceAction::Stop, "unit not loaded");
        assert_eq!(err.kind(), ErrorKind::ServiceControl);
        assert_eq!(err.to_string(), "could not stop service: unit not loaded");
        assert_eq!(err.exit_code(), 1);

        let err = RenewError::Timeout {
            program: "nessuscli".to_string(),
            after: Duration::from_secs(3),
        };
        assert_eq!(err.kind(), ErrorKind::Command);
    }
}
