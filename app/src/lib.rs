//! swaptrace application library

pub mod commands;
pub mod scenario;

use std::io::Write;

use anyhow::Result;

pub use commands::{Cli, Command};
use commands::quote::QuoteAmount;
use scenario::Scenario;

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("swaptrace_lib=debug".parse()?)
                .add_directive("swaptrace_core=debug".parse()?)
                .add_directive("amm=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {}", e))
}

/// Run the command-line application
pub fn run(cli: Cli) -> Result<()> {
    init_tracing()?;
    tracing::info!("Starting swaptrace");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Replay { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            commands::replay::run(&scenario, &mut out)?;
        }
        Command::Quote {
            scenario,
            path,
            amount_in,
            amount_out,
        } => {
            let scenario = Scenario::load(&scenario)?;
            let amount = QuoteAmount::from_args(amount_in, amount_out)?;
            let amounts = commands::quote::run(&scenario, &path, amount)?;
            writeln!(out, "{}", commands::quote::render(&amounts))?;
        }
    }
    Ok(())
}
