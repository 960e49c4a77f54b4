// POSIX platform adapter (systemd with SysV `service` fallback)

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{RenewError, RenewResult, ServiceAction};
use crate::platform::process::{ExecutionContext, ExecutionResult, ProcessRunner};
use crate::platform::service::ServiceManager;
use crate::platform::types::{InstallLayout, StepResult, tail};
use crate::platform::vendor::VendorTools;
use crate::platform::PlatformAdapter;

pub const DEFAULT_INSTALL_DIR: &str = "/opt/nessus/sbin";
pub const DEFAULT_SERVICE_NAME: &str = "nessusd";
const CLI_NAME: &str = "nessuscli";
const DAEMON_NAME: &str = "nessusd";
const RESET_ANSWER: &[u8] = b"y\n";

/// POSIX platform adapter
pub struct PosixAdapter {
    tools: VendorTools,
    service_name: String,
    managers: Vec<ServiceManager>,
    /// Manager that stopped the service; the restart goes through it too
    active_manager: Mutex<Option<ServiceManager>>,
    runner: ProcessRunner,
    service_timeout: Duration,
}

impl PosixAdapter {
    pub fn new(settings: &Settings) -> Self {
        let root = settings
            .install_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_INSTALL_DIR.into());
        let service_name = settings
            .service_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        Self {
            tools: VendorTools::new(
                InstallLayout::new(root, CLI_NAME, DAEMON_NAME),
                settings.command_timeout(),
            ),
            service_name,
            managers: vec![ServiceManager::systemctl(), ServiceManager::sysv()],
            active_manager: Mutex::new(None),
            runner: ProcessRunner::new(),
            service_timeout: settings.service_timeout(),
        }
    }

    /// Replace the service managers tried, in order
    pub fn with_service_managers(mut self, managers: Vec<ServiceManager>) -> Self {
        self.managers = managers;
        self
    }

    pub fn layout(&self) -> &InstallLayout {
        self.tools.layout()
    }

    /// Manager recorded by the last successful stop
    pub fn active_manager(&self) -> Option<ServiceManager> {
        self.active_manager
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn remember(&self, manager: &ServiceManager) {
        *self.active_manager.lock().unwrap_or_else(|e| e.into_inner()) = Some(manager.clone());
    }

    async fn run_manager(&self, manager: &ServiceManager, args: Vec<String>) -> RenewResult<ExecutionResult> {
        let context = ExecutionContext::new(manager.program.clone(), args).with_timeout(self.service_timeout);
        self.runner.execute(&context).await
    }

    /// Whether `manager` has a definition of the service
    async fn knows_service(&self, manager: &ServiceManager) -> bool {
        let Some(args) = manager.load_state_args(&self.service_name) else {
            return true;
        };
        match self.run_manager(manager, args).await {
            Ok(result) if result.success() => manager.load_state_is_known(&result.stdout),
            Ok(_) => false,
            Err(e) => {
                log::debug!("Load state query through {} failed: {}", manager, e);
                false
            }
        }
    }

    async fn is_inactive(&self, manager: &ServiceManager) -> bool {
        let Some(args) = manager.status_args(&self.service_name) else {
            return false;
        };
        if !self.knows_service(manager).await {
            log::debug!("{} does not manage {}", manager, self.service_name);
            return false;
        }
        match self.run_manager(manager, args).await {
            Ok(result) => manager.status_reports_inactive(result.exit_code),
            Err(e) => {
                log::debug!("Status query through {} failed: {}", manager, e);
                false
            }
        }
    }

    /// Try `action` through each candidate until one accepts it
    ///
    /// A stop that every candidate refused still succeeds when one of them
    /// manages the service and reports it inactive.
    async fn control(&self, action: ServiceAction, candidates: Vec<ServiceManager>) -> RenewResult<()> {
        let mut failures = Vec::new();
        let mut refused = Vec::new();

        for manager in &candidates {
            let args = match action {
                ServiceAction::Stop => manager.stop_args(&self.service_name),
                ServiceAction::Start => manager.start_args(&self.service_name),
            };

            match self.run_manager(manager, args).await {
                Ok(result) if result.success() => {
                    log::info!("{} {} through {}", action, self.service_name, manager);
                    self.remember(manager);
                    return Ok(());
                }
                Ok(result) => {
                    failures.push(format!(
                        "{} exited with {}: {}",
                        manager,
                        result.exit_code,
                        tail(&result.combined_output())
                    ));
                    refused.push(manager);
                }
                Err(e) => failures.push(e.to_string()),
            }
        }

        if action == ServiceAction::Stop {
            for manager in refused {
                if self.is_inactive(manager).await {
                    log::info!("{} is already stopped", self.service_name);
                    self.remember(manager);
                    return Ok(());
                }
            }
        }

        Err(RenewError::service(action, failures.join("; ")))
    }
}

#[async_trait]
impl PlatformAdapter for PosixAdapter {
    fn platform_name(&self) -> &str {
        "posix"
    }

    #[cfg(unix)]
    fn is_elevated(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    fn is_elevated(&self) -> bool {
        false
    }

    fn locate_installation(&self) -> RenewResult<()> {
        self.tools.locate()
    }

    async fn stop_service(&self) -> RenewResult<()> {
        self.control(ServiceAction::Stop, self.managers.clone()).await
    }

    async fn start_service(&self) -> RenewResult<()> {
        let candidates = match self.active_manager() {
            Some(manager) => vec![manager],
            None => self.managers.clone(),
        };
        self.control(ServiceAction::Start, candidates).await
    }

    async fn run_admin_command(&self, args: &[String]) -> RenewResult<StepResult> {
        self.tools.run_cli(args).await
    }

    async fn run_interactive_reset(&self) -> RenewResult<StepResult> {
        let args = crate::platform::commands::reset();
        self.tools.run_cli_answering(&args, RESET_ANSWER).await
    }

    async fn rebuild_plugin_database(&self) -> RenewResult<StepResult> {
        let args = crate::platform::commands::rebuild_plugins();
        self.tools.run_daemon(&args).await
    }
}
