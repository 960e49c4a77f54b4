// Platform abstraction
//
// Everything host-specific the renewal needs sits behind `PlatformAdapter`:
// service control, vendor command execution and the privilege check. Both
// variants build on every host; `select_adapter` picks one for the running OS.

pub mod types;
pub mod traits;
pub mod adapter;
pub mod commands;
pub mod process;
pub mod service;
pub mod vendor;
pub mod posix;
pub mod windows;

// Re-exports
pub use types::*;
pub use traits::*;
pub use adapter::select_adapter;
pub use commands::ProxySetting;
pub use posix::PosixAdapter;
pub use windows::WindowsAdapter;
pub use process::{ExecutionContext, ExecutionResult, ProcessRunner};
pub use service::{ServiceManager, ServiceManagerKind};
