//! CLI commands

pub mod quote;
pub mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use swaptrace_core::{Address, Amount};

#[derive(Parser, Debug)]
#[command(name = "swaptrace", version)]
#[command(about = "Replay and quote constant-product router swaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every call of a scenario and print one JSON line per call
    Replay {
        /// Scenario JSON file
        scenario: PathBuf,
    },

    /// Quote hop amounts along a path against a scenario's starting ledger
    Quote {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Comma-separated token addresses
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<Address>,

        /// Exact input (forward quote)
        #[arg(long, conflicts_with = "amount_out", required_unless_present = "amount_out")]
        amount_in: Option<Amount>,

        /// Exact output (backward quote)
        #[arg(long)]
        amount_out: Option<Amount>,
    },
}
