// Workflow stages and results

use crate::error::RenewError;
use std::fmt;

/// Stages of a renewal run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    PrivilegeCheck,
    ServiceStop,
    ConfigReset,
    ProxyProbe,
    ProxyApply,
    Register,
    PluginUpdate,
    RebuildPlugins,
    ServiceStart,
    Done,
}

impl Stage {
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Init => "starting renewal",
            Stage::PrivilegeCheck => "checking privileges and installation",
            Stage::ServiceStop => "stopping scanner service",
            Stage::ConfigReset => "resetting vendor configuration",
            Stage::ProxyProbe => "registering ahead of proxy configuration",
            Stage::ProxyApply => "applying proxy settings",
            Stage::Register => "registering license",
            Stage::PluginUpdate => "updating plugins",
            Stage::RebuildPlugins => "rebuilding plugin database",
            Stage::ServiceStart => "starting scanner service",
            Stage::Done => "renewal complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Terminal result of a run
#[derive(Debug)]
pub enum WorkflowOutcome {
    Success,
    Failure {
        error: RenewError,
        /// Failure of the restart attempted after `error`
        cleanup_error: Option<RenewError>,
    },
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowOutcome::Success)
    }

    /// Single-line failure reason, `None` on success
    pub fn reason(&self) -> Option<String> {
        match self {
            WorkflowOutcome::Success => None,
            WorkflowOutcome::Failure {
                error,
                cleanup_error: None,
            } => Some(error.to_string()),
            WorkflowOutcome::Failure {
                error,
                cleanup_error: Some(cleanup),
            } => Some(format!("{}; service restart also failed: {}", error, cleanup)),
        }
    }

    pub fn error(&self) -> Option<&RenewError> {
        match self {
            WorkflowOutcome::Success => None,
            WorkflowOutcome::Failure { error, .. } => Some(error),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.error().map(RenewError::exit_code).unwrap_or(0)
    }
}

/// What happened during a run
#[derive(Debug)]
pub struct WorkflowReport {
    pub outcome: WorkflowOutcome,
    /// Non-fatal problems, such as a failed plugin rebuild
    pub warnings: Vec<String>,
    /// Stages entered, in order
    pub stages: Vec<Stage>,
}

impl WorkflowReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
