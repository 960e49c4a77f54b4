// Run configuration and on-disk tool settings
//
// `UpdateConfig` describes one renewal run and is validated when it is built,
// so the orchestrator never sees a half-specified proxy.

pub mod settings;

pub use settings::{Settings, default_settings_path, load_settings};

use crate::error::{RenewError, RenewResult};
use std::fmt;

/// Proxy account used by the vendor tool for feed downloads
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Proxy the vendor tool should use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub address: String,
    pub port: u16,
    pub credentials: Option<ProxyCredentials>,
}

/// Raw proxy values as they arrive from the command line
#[derive(Debug, Clone, Default)]
pub struct ProxyArgs {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyArgs {
    /// Turn the loose option set into a `ProxyConfig`, rejecting partial input
    pub fn into_proxy(self) -> RenewResult<Option<ProxyConfig>> {
        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(ProxyCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(RenewError::validation(
                    "incomplete proxy configuration: provide both a username and password to use an authenticated proxy",
                ));
            }
        };

        match (self.address, self.port) {
            (Some(address), Some(port)) => {
                if address.trim().is_empty() {
                    return Err(RenewError::validation(
                        "incomplete proxy configuration: proxy address is empty",
                    ));
                }
                if port == 0 {
                    return Err(RenewError::validation(
                        "invalid proxy configuration: port must be between 1 and 65535",
                    ));
                }
                Ok(Some(ProxyConfig {
                    address,
                    port,
                    credentials,
                }))
            }
            (None, None) if credentials.is_none() => Ok(None),
            (None, None) => Err(RenewError::validation(
                "incomplete proxy configuration: credentials given without a proxy address and port",
            )),
            _ => Err(RenewError::validation(
                "incomplete proxy configuration: provide both an address/hostname and a port number to use a proxy",
            )),
        }
    }
}

/// Everything one renewal run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    license: String,
    rebuild_plugins: bool,
    proxy: Option<ProxyConfig>,
}

impl UpdateConfig {
    /// Build a validated configuration
    pub fn new(license: impl Into<String>, rebuild_plugins: bool, proxy: ProxyArgs) -> RenewResult<Self> {
        let license = license.into().trim().to_string();
        if license.is_empty() {
            return Err(RenewError::validation("license code must not be empty"));
        }

        Ok(Self {
            license,
            rebuild_plugins,
            proxy: proxy.into_proxy()?,
        })
    }

    pub fn license(&self) -> &str {
        &self.license
    }

    pub fn rebuild_plugins(&self) -> bool {
        self.rebuild_plugins
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }
}
