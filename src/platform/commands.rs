// Vendor command lines
//
// The exact argument vectors are the contract with the vendor tools.

use crate::config::ProxyConfig;
use std::fmt;

/// `fix --secure --set` keys for proxy settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxySetting {
    Address,
    Port,
    Username,
    Password,
}

impl ProxySetting {
    pub fn key(&self) -> &'static str {
        match self {
            ProxySetting::Address => "proxy",
            ProxySetting::Port => "proxy_port",
            ProxySetting::Username => "proxy_username",
            ProxySetting::Password => "proxy_password",
        }
    }
}

impl fmt::Display for ProxySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

/// `fix --reset`
pub fn reset() -> Vec<String> {
    owned(&["fix", "--reset"])
}

/// `fetch --register <license>`
pub fn register(license: &str) -> Vec<String> {
    owned(&["fetch", "--register", license])
}

/// `fix --secure --set <key>=<value>`
pub fn set_proxy(setting: ProxySetting, value: &str) -> Vec<String> {
    let assignment = format!("{}={}", setting.key(), value);
    owned(&["fix", "--secure", "--set", &assignment])
}

/// `update --all`
pub fn update_all() -> Vec<String> {
    owned(&["update", "--all"])
}

/// Daemon arguments for a plugin-database rebuild
pub fn rebuild_plugins() -> Vec<String> {
    owned(&["-R"])
}

/// Settings to write, in order: address and port always, credentials if present
pub fn proxy_settings(proxy: &ProxyConfig) -> Vec<(ProxySetting, String)> {
    let mut settings = vec![
        (ProxySetting::Address, proxy.address.clone()),
        (ProxySetting::Port, proxy.port.to_string()),
    ];
    if let Some(ref credentials) = proxy.credentials {
        settings.push((ProxySetting::Username, credentials.username.clone()));
        settings.push((ProxySetting::Password, credentials.password.clone()));
    }
    settings
}
