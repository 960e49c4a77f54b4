// Log output for the command-line tool

use log::LevelFilter;

/// Install the stderr logger; `RUST_LOG` still applies, `verbose` adds debug for this crate
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_target(false).format_timestamp_secs();

    if verbose {
        builder.filter_module("nessus_renew", LevelFilter::Debug);
    }

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialised: {}", e);
    }
}
