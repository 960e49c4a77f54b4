// Clap-based argument parsing

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::{ProxyArgs, UpdateConfig};
use crate::error::RenewResult;

/// Two-letter short flags kept for compatibility, mapped to their long forms
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-pA", "--proxy-addr"),
    ("-pP", "--proxy-port"),
    ("-pU", "--proxy-user"),
    ("-pC", "--proxy-pass"),
];

/// What the command line asked for
#[derive(Debug)]
pub enum Invocation {
    /// No arguments: show usage and exit successfully
    Help(String),
    Run(ParsedArgs),
}

/// Parsed command-line values, not yet validated as a whole
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    pub license: String,
    pub rebuild_plugins: bool,
    pub proxy: ProxyArgs,
    pub settings_path: Option<PathBuf>,
    pub verbose: bool,
}

impl ParsedArgs {
    pub fn update_config(&self) -> RenewResult<UpdateConfig> {
        UpdateConfig::new(self.license.clone(), self.rebuild_plugins, self.proxy.clone())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            license: matches.get_one::<String>("license").cloned().unwrap_or_default(),
            rebuild_plugins: !matches.get_flag("no-rebuild"),
            proxy: ProxyArgs {
                address: matches.get_one::<String>("proxy-addr").cloned(),
                port: matches.get_one::<u16>("proxy-port").copied(),
                username: matches.get_one::<String>("proxy-user").cloned(),
                password: matches.get_one::<String>("proxy-pass").cloned(),
            },
            settings_path: matches.get_one::<PathBuf>("config").cloned(),
            verbose: matches.get_flag("verbose"),
        }
    }
}

/// Parse the full argument list, program name included
pub fn parse_args<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = normalize_legacy_flags(args.into_iter().map(Into::into).collect());
    if args.len() <= 1 {
        return Ok(Invocation::Help(build_cli().render_help().to_string()));
    }

    let matches = build_cli().try_get_matches_from(args)?;
    Ok(Invocation::Run(ParsedArgs::from_matches(&matches)))
}

/// Rewrite `-pA value`, `-pA=value` and `-pAvalue` style flags to their long equivalents
pub fn normalize_legacy_flags(args: Vec<OsString>) -> Vec<OsString> {
    let mut normalized = Vec::with_capacity(args.len());
    let mut passthrough = false;

    for arg in args {
        if passthrough {
            normalized.push(arg);
            continue;
        }

        let replacement = arg.to_str().and_then(|text| {
            if text == "--" {
                return None;
            }
            LEGACY_FLAGS.iter().find_map(|(short, long)| {
                let rest = text.strip_prefix(short)?;
                if rest.is_empty() {
                    Some(long.to_string())
                } else {
                    let value = rest.strip_prefix('=').unwrap_or(rest);
                    Some(format!("{}={}", long, value))
                }
            })
        });

        if arg.to_str() == Some("--") {
            passthrough = true;
        }
        normalized.push(replacement.map(OsString::from).unwrap_or(arg));
    }

    normalized
}

pub fn build_cli() -> Command {
    Command::new("nessus-renew")
        .version(clap::crate_version!())
        .about("Renew an expired Nessus installation")
        .long_about(
            "Stops the Nessus service, resets the local configuration, re-registers \
             the license (optionally through a proxy), updates plugins, rebuilds the \
             plugin database and starts the service again.",
        )
        .arg(
            Arg::new("license")
                .value_name("LICENSE")
                .required(true)
                .help("Nessus license code"),
        )
        .arg(
            Arg::new("no-rebuild")
                .short('n')
                .long("no-rebuild")
                .action(ArgAction::SetTrue)
                .help("Do not rebuild the plugin database"),
        )
        .arg(
            Arg::new("proxy-addr")
                .long("proxy-addr")
                .value_name("HOST")
                .help("IP address or hostname for the proxy (also -pA)"),
        )
        .arg(
            Arg::new("proxy-port")
                .long("proxy-port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16).range(1..))
                .help("Port number for the proxy (also -pP)"),
        )
        .arg(
            Arg::new("proxy-user")
                .long("proxy-user")
                .value_name("NAME")
                .help("Username for the proxy (also -pU)"),
        )
        .arg(
            Arg::new("proxy-pass")
                .long("proxy-pass")
                .value_name("SECRET")
                .help("Password for the proxy (also -pC)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Settings file (default: <config dir>/nessus-renew/config.toml)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show every command as it runs"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> ParsedArgs {
        let mut full = vec!["nessus-renew"];
        full.extend_from_slice(args);
        match parse_args(full).unwrap() {
            Invocation::Run(parsed) => parsed,
            Invocation::Help(_) => panic!("expected a run invocation"),
        }
    }

    #[test]
    fn test_no_arguments_shows_help() {
        match parse_args(["nessus-renew"]).unwrap() {
            Invocation::Help(text) => assert!(text.contains("--no-rebuild")),
            Invocation::Run(_) => panic!("expected help"),
        }
    }

    #[test]
    fn test_license_only() {
        let parsed = run(&["ABC123"]);
        assert_eq!(parsed.license, "ABC123");
        assert!(parsed.rebuild_plugins);
        assert!(!parsed.verbose);
        assert!(parsed.update_config().unwrap().proxy().is_none());
    }

    #[test]
    fn test_no_rebuild() {
        assert!(!run(&["-n", "ABC123"]).rebuild_plugins);
        assert!(!run(&["ABC123", "--no-rebuild"]).rebuild_plugins);
    }

    #[test]
    fn test_legacy_proxy_flags() {
        let parsed = run(&[
            "-pA", "10.0.0.5", "-pP", "8080", "-pU=u", "-pC", "p", "ABC123",
        ]);

        let config = parsed.update_config().unwrap();
        let proxy = config.proxy().unwrap();
        assert_eq!(proxy.address, "10.0.0.5");
        assert_eq!(proxy.port, 8080);
        let credentials = proxy.credentials.as_ref().unwrap();
        assert_eq!(credentials.username, "u");
        assert_eq!(credentials.password, "p");
    }

    #[test]
    fn test_legacy_flags_with_attached_values() {
        let parsed = run(&["-pA10.0.0.5", "-pP8080", "-pUsvc", "-pChunter2", "ABC123"]);

        assert_eq!(parsed.proxy.address.as_deref(), Some("10.0.0.5"));
        assert_eq!(parsed.proxy.port, Some(8080));
        assert_eq!(parsed.proxy.username.as_deref(), Some("svc"));
        assert_eq!(parsed.proxy.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_long_proxy_flags_and_settings_path() {
        let parsed = run(&[
            "--proxy-addr",
            "proxy.local",
            "--proxy-port=3128",
            "-c",
            "/etc/nessus-renew.toml",
            "-v",
            "ABC123",
        ]);

        assert_eq!(parsed.proxy.address.as_deref(), Some("proxy.local"));
        assert_eq!(parsed.proxy.port, Some(3128));
        assert_eq!(parsed.settings_path, Some(PathBuf::from("/etc/nessus-renew.toml")));
        assert!(parsed.verbose);
    }

    #[test]
    fn test_partial_proxy_parses_but_fails_validation() {
        let parsed = run(&["-pA", "10.0.0.5", "ABC123"]);
        assert!(parsed.update_config().is_err());
    }

    #[test]
    fn test_invalid_port_rejected_by_parser() {
        assert!(parse_args(["nessus-renew", "-pP", "0", "ABC123"]).is_err());
        assert!(parse_args(["nessus-renew", "-pP", "70000", "ABC123"]).is_err());
        assert!(parse_args(["nessus-renew", "-pP", "http", "ABC123"]).is_err());
    }

    #[test]
    fn test_missing_license_rejected() {
        assert!(parse_args(["nessus-renew", "-n"]).is_err());
    }

    #[test]
    fn test_normalize_stops_at_double_dash() {
        let args: Vec<OsString> = ["nessus-renew", "-pA", "h", "--", "-pA"]
            .iter()
            .map(OsString::from)
            .collect();
        let normalized = normalize_legacy_flags(args);
        assert_eq!(
            normalized,
            vec!["nessus-renew", "--proxy-addr", "h", "--", "-pA"]
                .into_iter()
                .map(OsString::from)
                .collect::<Vec<_>>()
        );
    }
}
