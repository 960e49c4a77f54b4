pub mod config;
pub mod error;
pub mod platform;
pub mod workflow;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{ProxyArgs, ProxyConfig, ProxyCredentials, Settings, UpdateConfig};
pub use error::{ErrorKind, RenewError, RenewResult};
pub use platform::{PlatformAdapter, StepResult, select_adapter};
pub use workflow::{Stage, UpdateOrchestrator, WorkflowOutcome, WorkflowReport};
