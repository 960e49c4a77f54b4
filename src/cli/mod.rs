// Command-line front-end

pub mod args;
pub mod logging;

pub use args::{Invocation, ParsedArgs, build_cli, parse_args};
pub use logging::init_logging;

use tokio_util::sync::CancellationToken;

/// Cancel `token` on the first Ctrl+C; a second one exits immediately
pub fn spawn_interrupt_listener(token: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::debug!("Cannot listen for Ctrl+C: {}", e);
            return;
        }
        log::warn!("Interrupted, restoring the scanner service (press Ctrl+C again to exit immediately)");
        token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupted by user");
            std::process::exit(130);
        }
    });
}
