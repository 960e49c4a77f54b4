// OS service-manager command lines

use std::fmt;
use std::path::PathBuf;

/// systemd `is-active` exit status for an inactive unit
const SYSTEMD_INACTIVE: i32 = 3;
/// `LoadState` of a unit systemd has no file for
const SYSTEMD_NOT_FOUND: &str = "not-found";
/// LSB init-script status code for "program is not running"
const LSB_NOT_RUNNING: i32 = 3;

/// Service manager families we know how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceManagerKind {
    Systemd,
    SysV,
    WindowsNet,
}

/// A service-manager program and its command syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceManager {
    pub kind: ServiceManagerKind,
    pub program: PathBuf,
}

impl ServiceManager {
    pub fn systemctl() -> Self {
        Self {
            kind: ServiceManagerKind::Systemd,
            program: PathBuf::from("systemctl"),
        }
    }

    pub fn sysv() -> Self {
        Self {
            kind: ServiceManagerKind::SysV,
            program: PathBuf::from("service"),
        }
    }

    pub fn net() -> Self {
        Self {
            kind: ServiceManagerKind::WindowsNet,
            program: PathBuf::from("net"),
        }
    }

    /// Use a different executable with the same syntax
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn stop_args(&self, service: &str) -> Vec<String> {
        match self.kind {
            ServiceManagerKind::Systemd | ServiceManagerKind::WindowsNet => {
                vec!["stop".to_string(), service.to_string()]
            }
            ServiceManagerKind::SysV => vec![service.to_string(), "stop".to_string()],
        }
    }

    pub fn start_args(&self, service: &str) -> Vec<String> {
        match self.kind {
            ServiceManagerKind::Systemd | ServiceManagerKind::WindowsNet => {
                vec!["start".to_string(), service.to_string()]
            }
            ServiceManagerKind::SysV => vec![service.to_string(), "start".to_string()],
        }
    }

    /// Status query used to recognise an already stopped service
    pub fn status_args(&self, service: &str) -> Option<Vec<String>> {
        match self.kind {
            ServiceManagerKind::Systemd => Some(vec![
                "is-active".to_string(),
                "--quiet".to_string(),
                service.to_string(),
            ]),
            ServiceManagerKind::SysV => Some(vec![service.to_string(), "status".to_string()]),
            // `net stop` says so itself
            ServiceManagerKind::WindowsNet => None,
        }
    }

    /// Query for whether the manager has a definition of the service at all
    pub fn load_state_args(&self, service: &str) -> Option<Vec<String>> {
        match self.kind {
            ServiceManagerKind::Systemd => Some(vec![
                "show".to_string(),
                "-p".to_string(),
                "LoadState".to_string(),
                "--value".to_string(),
                service.to_string(),
            ]),
            ServiceManagerKind::SysV | ServiceManagerKind::WindowsNet => None,
        }
    }

    /// `systemctl is-active` reports unknown units as inactive too
    pub fn load_state_is_known(&self, output: &str) -> bool {
        let state = output.trim();
        !state.is_empty() && state != SYSTEMD_NOT_FOUND
    }

    /// Interpret a status query result
    pub fn status_reports_inactive(&self, exit_code: i32) -> bool {
        match self.kind {
            ServiceManagerKind::Systemd => exit_code == SYSTEMD_INACTIVE,
            ServiceManagerKind::SysV => exit_code == LSB_NOT_RUNNING,
            ServiceManagerKind::WindowsNet => false,
        }
    }
}

impl fmt::Display for ServiceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())
    }
}

/// `net stop` output for a service that was not running
pub fn net_reports_not_started(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("is not started") || lower.contains("helpmsg 3521")
}

/// `net start` output for a service that is already running
pub fn net_reports_already_started(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("has already been started") || lower.contains("helpmsg 2182")
}
