use anyhow::Result;
use tokio_util::sync::CancellationToken;

use nessus_renew::cli::{self, Invocation};
use nessus_renew::config::load_settings;
use nessus_renew::{UpdateOrchestrator, select_adapter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = match cli::parse_args(std::env::args_os()) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Help(usage)) => {
            print!("{}", usage);
            return Ok(());
        }
        Err(e) => e.exit(),
    };

    cli::init_logging(args.verbose);

    let config = match args.update_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    let adapter = match load_settings(args.settings_path.as_deref())
        .await
        .and_then(|settings| select_adapter(&settings))
    {
        Ok(adapter) => adapter,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    let token = CancellationToken::new();
    cli::spawn_interrupt_listener(token.clone());

    let report = UpdateOrchestrator::new(adapter.as_ref())
        .with_cancellation(token)
        .run(&config)
        .await;

    match report.outcome.reason() {
        None => {
            println!("Nessus updated successfully");
            Ok(())
        }
        Some(reason) => {
            eprintln!("{}", reason);
            std::process::exit(report.outcome.exit_code());
        }
    }
}
