//! ouoctl - credentials settings for the ouo assistant
//!
//! Stores the user's API credentials in a local cookie and asks the ouo
//! backend to refresh its model with them:
//! - `ouoctl credentials` shows and edits the credentials form (default command)
//! - `ouoctl refresh` runs the model refresh
//! - `ouoctl guide` explains where to get the keys

mod api;
mod cli;
mod controller;
mod core;
mod logging;
mod notifications;
mod settings;

use clap::Parser;
use cli::{exit_codes, Cli, Commands};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = logging::init(cli.verbose, cli.json_output, cli.no_color) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    // Create tokio runtime
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            return exit_codes::UNEXPECTED_FAILURE;
        }
    };

    rt.block_on(async {
        match dispatch(cli).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_codes::UNEXPECTED_FAILURE
            }
        }
    })
}

async fn dispatch(mut cli: Cli) -> anyhow::Result<i32> {
    match cli.command.take() {
        Some(Commands::Guide(args)) => {
            cli::guide::run(args).await?;
            Ok(exit_codes::SUCCESS)
        }
        Some(Commands::Config(args)) => {
            cli::config::run(args).await?;
            Ok(exit_codes::SUCCESS)
        }
        Some(Commands::Refresh) => {
            let controller = cli.build_controller()?;
            let outcome = cli::refresh::run(&controller).await?;
            Ok(cli::refresh::exit_code(&outcome))
        }
        Some(Commands::Credentials(args)) => {
            let mut controller = cli.build_controller()?;
            cli::credentials::run(args, &mut controller).await?;
            Ok(exit_codes::SUCCESS)
        }
        // No subcommand opens the credentials form
        None => {
            let mut controller = cli.build_controller()?;
            cli::credentials::run(Default::default(), &mut controller).await?;
            Ok(exit_codes::SUCCESS)
        }
    }
}
