// Windows platform adapter (`net stop` / `net start`)

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{RenewError, RenewResult, ServiceAction};
use crate::platform::process::{ExecutionContext, ExecutionResult, ProcessRunner};
use crate::platform::service::{ServiceManager, net_reports_already_started, net_reports_not_started};
use crate::platform::types::{InstallLayout, StepResult, tail};
use crate::platform::vendor::VendorTools;
use crate::platform::PlatformAdapter;

pub const DEFAULT_INSTALL_DIR: &str = "C:\\Program Files\\Tenable\\Nessus";
pub const DEFAULT_SERVICE_NAME: &str = "Tenable Nessus";
const CLI_NAME: &str = "nessuscli.exe";
const DAEMON_NAME: &str = "nessusd.exe";
const RESET_ANSWER: &[u8] = b"y\r\n";

/// Windows platform adapter
pub struct WindowsAdapter {
    tools: VendorTools,
    service_name: String,
    net: ServiceManager,
    runner: ProcessRunner,
    service_timeout: Duration,
}

impl WindowsAdapter {
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
            net: ServiceManager::net(),
            runner: ProcessRunner::new(),
            service_timeout: settings.service_timeout(),
        }
    }

    /// Use a different `net` executable
    pub fn with_service_manager(mut self, net: ServiceManager) -> Self {
        self.net = net;
        self
    }

    pub fn layout(&self) -> &InstallLayout {
        self.tools.layout()
    }

    async fn run_net(&self, args: Vec<String>) -> RenewResult<ExecutionResult> {
        let context = ExecutionContext::new(self.net.program.clone(), args).with_timeout(self.service_timeout);
        self.runner.execute(&context).await
    }

    fn refusal(&self, action: ServiceAction, result: &ExecutionResult) -> RenewError {
        RenewError::service(
            action,
            format!(
                "net {} \"{}\" exited with {}: {}",
                action,
                self.service_name,
                result.exit_code,
                tail(&result.combined_output())
            ),
        )
    }
}

#[async_trait]
impl PlatformAdapter for WindowsAdapter {
    fn platform_name(&self) -> &str {
        "windows"
    }

    #[cfg(windows)]
    fn is_elevated(&self) -> bool {
        // SAFETY: IsUserAnAdmin takes no arguments and only inspects the process token
        unsafe { winapi::um::shlobj::IsUserAnAdmin() != 0 }
    }

    #[cfg(not(windows))]
    fn is_elevated(&self) -> bool {
        false
    }

    fn locate_installation(&self) -> RenewResult<()> {
        self.tools.locate()
    }

    async fn stop_service(&self) -> RenewResult<()> {
        let result = self
            .run_net(self.net.stop_args(&self.service_name))
            .await
            .map_err(|e| RenewError::service(ServiceAction::Stop, e.to_string()))?;

        if result.success() {
            log::info!("Stopped {}", self.service_name);
            return Ok(());
        }
        if net_reports_not_started(&result.combined_output()) {
            log::info!("{} is already stopped", self.service_name);
            return Ok(());
        }
        Err(self.refusal(ServiceAction::Stop, &result))
    }

    async fn start_service(&self) -> RenewResult<()> {
        let result = self
            .run_net(self.net.start_args(&self.service_name))
            .await
            .map_err(|e| RenewError::service(ServiceAction::Start, e.to_string()))?;

        if result.success() || net_reports_already_started(&result.combined_output()) {
            log::info!("Started {}", self.service_name);
            return Ok(());
        }
        Err(self.refusal(ServiceAction::Start, &result))
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
