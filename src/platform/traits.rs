// Platform abstraction traits

use async_trait::async_trait;
use crate::error::RenewResult;
use crate::platform::StepResult;

/// Host-specific mechanics the renewal workflow needs
///
/// Command methods return `Ok` with a failed `StepResult` when the program ran
/// and exited non-zero; `Err` is reserved for programs that could not be run
/// or did not finish.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Get platform name
    fn platform_name(&self) -> &str;

    /// Whether the process holds the administrative rights every other call needs
    fn is_elevated(&self) -> bool;

    /// Fails with `InstallationNotFound` when the vendor tools are missing
    fn locate_installation(&self) -> RenewResult<()>;

    /// Stop the scanner service; an already stopped service counts as success
    async fn stop_service(&self) -> RenewResult<()>;

    /// Start the scanner service
    async fn start_service(&self) -> RenewResult<()>;

    /// Run the vendor CLI with `args`
    async fn run_admin_command(&self, args: &[String]) -> RenewResult<StepResult>;

    /// Run `fix --reset`, answering its confirmation prompt
    async fn run_interactive_reset(&self) -> RenewResult<StepResult>;

    /// Rebuild the plugin database through the scanner daemon
    async fn rebuild_plugin_database(&self) -> RenewResult<StepResult>;
}
