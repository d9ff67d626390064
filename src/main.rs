mod cli;
mod commands;
mod output;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use monday_client::{Config, MondayClient, MondayError, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_tracing(verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {e}", "Error:".red().bold());

        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(exit_code(&e));
    }
}

/// 2 for configuration and usage problems caught before any request, 1 otherwise.
fn exit_code(error: &MondayError) -> i32 {
    if error.is_config() { 2 } else { 1 }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    output::set_json_output(cli.json);

    match cli.command {
        // Commands that don't require config/client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "monday", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run()?;
        }
        Commands::Vars(args) => {
            commands::vars::run(args)?;
        }
        // Commands that require config and client
        command => {
            let config = Config::load()?;
            let client = MondayClient::new(config.client_config()?)?;

            match command {
                Commands::Query(args) => {
                    commands::query::run(&client, args).await?;
                }
                Commands::Paginate(args) => {
                    commands::query::paginate(&client, args).await?;
                }
                Commands::Boards { ids } => {
                    commands::boards::list(&client, ids).await?;
                }
                Commands::Items(args) => {
                    commands::boards::items(&client, args).await?;
                }
                Commands::Completions { .. } | Commands::Init | Commands::Vars(_) => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
