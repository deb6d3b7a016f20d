mod cli;
mod console;
mod error;
mod menu;
mod output;

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use postal_api::ManagementClient;

use crate::cli::Cli;
use crate::console::Console;
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Ctrl-C is a normal way to leave the menu, not a failure.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nInterrupted. Goodbye!");
            std::process::exit(exit_code::SUCCESS);
        }
    });

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let url = cli.url.ok_or(CliError::MissingUrl)?;
    let api_key = SecretString::from(cli.api_key.ok_or(CliError::MissingApiKey)?);

    let api = ManagementClient::new(&url, &api_key, Duration::from_secs(cli.timeout))?;

    // Fail fast on a bad URL or key before entering the menu.
    tracing::debug!(url = %url, "checking connectivity");
    api.health_check()
        .await
        .map_err(|source| CliError::ConnectionFailed {
            url: url.clone(),
            source,
        })?;

    let mut console = Console::stdio();
    console.info(&format!("Connected to {url}"))?;

    if cli.quick_add {
        menu::quick_add(&api, &mut console).await?;
    } else {
        menu::main_menu(&api, &mut console).await?;
    }
    Ok(())
}
