//! relver CLI entry point

// The binary owns the terminal: results go to stdout, reports to stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use relver::cli::{self, Cli, CliError, EXIT_OK, OkEnvelope, exit_code_for, render_error};
use relver::config::ReleaseConfig;
use relver::release::{self, Dependencies, ReleaseOutcome};
use relver::tracing::{TracingConfig, correlation_id, init_tracing};

#[tokio::main]
async fn main() {
    // Tracing may not be usable during a panic, so write directly to stderr.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json_mode = cli.json_mode();

    if let Err(e) = init_tracing(TracingConfig {
        format: cli.format,
        level: cli.level.into(),
    }) {
        eprintln!("Failed to initialize tracing: {e:?}");
    }

    let exit_code = match run(&cli).await {
        Ok(outcome) => {
            if json_mode {
                match serde_json::to_string(&OkEnvelope::new(&outcome)) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Error serializing result: {e}"),
                }
            }
            EXIT_OK
        }
        Err(err) => {
            render_error(&err, json_mode);
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<ReleaseOutcome, CliError> {
    tracing::debug!(correlation_id = %correlation_id(), "Starting release");

    let base = std::env::current_dir()
        .map_err(|e| CliError::other(format!("reading working directory: {e}")))?;
    let config = ReleaseConfig::from_cli(cli, &base)?;
    let deps = Dependencies::from_config(&config)?;

    release::run(&config, &deps).await
}
