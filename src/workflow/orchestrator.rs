// Renewal sequencer with partial-failure recovery

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::config::UpdateConfig;
use crate::error::{CommandStep, RenewError, RenewResult};
use crate::platform::{PlatformAdapter, StepResult};
use crate::platform::commands::{self, ProxySetting};
use crate::workflow::types::{Stage, WorkflowOutcome, WorkflowReport};

#[derive(Default)]
struct Progress {
    stages: Vec<Stage>,
    warnings: Vec<String>,
}

impl Progress {
    fn enter(&mut self, stage: Stage) {
        log::info!("{}", capitalize(stage.description()));
        self.stages.push(stage);
    }

    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    fn finish(self, outcome: WorkflowOutcome) -> WorkflowReport {
        WorkflowReport {
            outcome,
            warnings: self.warnings,
            stages: self.stages,
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a finished command into an error when it exited non-zero
fn require(step: CommandStep, result: StepResult) -> RenewResult<()> {
    if result.succeeded {
        Ok(())
    } else {
        Err(RenewError::Command {
            step,
            exit_code: result.exit_code,
            stderr_tail: result.stderr_tail,
        })
    }
}

/// Drives one renewal run against a platform adapter
///
/// Steps run strictly in sequence. Once the service has been stopped every
/// exit path tries to start it again; a failed restart is reported next to the
/// original error, never in place of it.
pub struct UpdateOrchestrator<'a> {
    adapter: &'a dyn PlatformAdapter,
    cancel: CancellationToken,
}

impl<'a> UpdateOrchestrator<'a> {
    pub fn new(adapter: &'a dyn PlatformAdapter) -> Self {
        Self {
            adapter,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort the run when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self, config: &UpdateConfig) -> WorkflowReport {
        let mut progress = Progress::default();
        progress.enter(Stage::Init);

        progress.enter(Stage::PrivilegeCheck);
        if let Err(error) = self.preflight() {
            return progress.finish(WorkflowOutcome::Failure {
                error,
                cleanup_error: None,
            });
        }

        progress.enter(Stage::ServiceStop);
        match self.guarded(self.adapter.stop_service()).await {
            Ok(()) => {}
            // The stop may already have taken effect
            Err(RenewError::Interrupted) => {
                progress.enter(Stage::ServiceStart);
                let cleanup_error = self.restart_after_abort().await.err();
                return progress.finish(WorkflowOutcome::Failure {
                    error: RenewError::Interrupted,
                    cleanup_error,
                });
            }
            Err(error) => {
                return progress.finish(WorkflowOutcome::Failure {
                    error,
                    cleanup_error: None,
                });
            }
        }

        if let Err(error) = self.renew(config, &mut progress).await {
            progress.enter(Stage::ServiceStart);
            let cleanup_error = self.restart_after_abort().await.err();
            return progress.finish(WorkflowOutcome::Failure { error, cleanup_error });
        }

        progress.enter(Stage::ServiceStart);
        // Interrupted here: reported, not retried
        if let Err(error) = self.guarded(self.adapter.start_service()).await {
            return progress.finish(WorkflowOutcome::Failure {
                error,
                cleanup_error: None,
            });
        }

        progress.enter(Stage::Done);
        progress.finish(WorkflowOutcome::Success)
    }

    fn preflight(&self) -> RenewResult<()> {
        if self.cancel.is_cancelled() {
            return Err(RenewError::Interrupted);
        }
        if !self.adapter.is_elevated() {
            return Err(RenewError::InsufficientPrivileges);
        }
        self.adapter.locate_installation()
    }

    /// Everything between stopping and restarting the service
    async fn renew(&self, config: &UpdateConfig, progress: &mut Progress) -> RenewResult<()> {
        progress.enter(Stage::ConfigReset);
        let result = self.guarded(self.adapter.run_interactive_reset()).await?;
        require(CommandStep::Reset, result)?;

        if let Some(proxy) = config.proxy() {
            progress.enter(Stage::ProxyProbe);
            self.probe_registration(config.license()).await?;

            progress.enter(Stage::ProxyApply);
            for (setting, value) in commands::proxy_settings(proxy) {
                self.apply_proxy_setting(setting, &value).await?;
            }
        }

        progress.enter(Stage::Register);
        let result = self
            .guarded(self.adapter.run_admin_command(&commands::register(config.license())))
            .await?;
        require(CommandStep::Register, result)?;

        progress.enter(Stage::PluginUpdate);
        let result = self
            .guarded(self.adapter.run_admin_command(&commands::update_all()))
            .await?;
        require(CommandStep::PluginUpdate, result)?;

        if config.rebuild_plugins() {
            progress.enter(Stage::RebuildPlugins);
            let result = self
                .guarded(self.adapter.rebuild_plugin_database())
                .await
                .and_then(|result| require(CommandStep::PluginRebuild, result));
            match result {
                Ok(()) => {}
                Err(RenewError::Interrupted) => return Err(RenewError::Interrupted),
                // The scanner keeps working with the old index; rebuild can be rerun later
                Err(error) => progress.warn(format!("{}; continuing with the existing plugin database", error)),
            }
        }

        Ok(())
    }

    /// Registration attempt that is expected to fail before the proxy is set
    ///
    /// It only exists to create the local state that `fix --secure` needs.
    async fn probe_registration(&self, license: &str) -> RenewResult<()> {
        match self
            .guarded(self.adapter.run_admin_command(&commands::register(license)))
            .await
        {
            Ok(result) if result.succeeded => {
                log::debug!("Registration succeeded before proxy configuration");
                Ok(())
            }
            Ok(result) => {
                log::info!(
                    "Registration without proxy failed as expected (exit status {})",
                    result.exit_code
                );
                Ok(())
            }
            Err(RenewError::Interrupted) => Err(RenewError::Interrupted),
            Err(error) => {
                log::info!("Registration without proxy failed as expected: {}", error);
                Ok(())
            }
        }
    }

    async fn apply_proxy_setting(&self, setting: ProxySetting, value: &str) -> RenewResult<()> {
        log::debug!("Setting {}", setting);
        let result = self
            .guarded(self.adapter.run_admin_command(&commands::set_proxy(setting, value)))
            .await?;
        require(CommandStep::ProxySetting(setting.key().to_string()), result)
    }

    /// Best-effort restart after an abort; not interruptible
    async fn restart_after_abort(&self) -> RenewResult<()> {
        log::warn!("Update aborted, restarting the scanner service");
        let result = self.adapter.start_service().await;
        if let Err(ref e) = result {
            log::error!("Could not restart the scanner service: {}", e);
        }
        result
    }

    /// Race `step` against cancellation; a cancelled step is dropped
    async fn guarded<T, F>(&self, step: F) -> RenewResult<T>
    where
        F: Future<Output = RenewResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RenewError::Interrupted),
            result = step => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require(CommandStep::Register, StepResult::ok()).is_ok());

        match require(CommandStep::PluginUpdate, StepResult::failed(7, "feed unreachable")) {
            Err(RenewError::Command {
                step,
                exit_code,
                stderr_tail,
            }) => {
                assert_eq!(step, CommandStep::PluginUpdate);
                assert_eq!(exit_code, 7);
                assert_eq!(stderr_tail, "feed unreachable");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("stopping scanner service"), "Stopping scanner service");
        assert_eq!(capitalize(""), "");
    }
}
