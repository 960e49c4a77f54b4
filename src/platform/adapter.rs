// Platform adapter selection

use crate::config::Settings;
use crate::error::{RenewError, RenewResult};
use crate::platform::PlatformAdapter;
use crate::platform::posix::PosixAdapter;
use crate::platform::windows::WindowsAdapter;

/// Pick the adapter for the host OS, once, at startup
pub fn select_adapter(settings: &Settings) -> RenewResult<Box<dyn PlatformAdapter>> {
    let adapter: Box<dyn PlatformAdapter> = if cfg!(windows) {
        Box::new(WindowsAdapter::new(settings))
    } else if cfg!(unix) {
        Box::new(PosixAdapter::new(settings))
    } else {
        return Err(RenewError::UnsupportedPlatform(std::env::consts::OS.to_string()));
    };

    log::debug!("Using {} platform adapter", adapter.platform_name());
    Ok(adapter)
}
