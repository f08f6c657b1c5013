use anyhow::Result;
use clap::Parser;
use swaptrace_lib::Cli;

fn main() -> Result<()> {
    swaptrace_lib::run(Cli::parse())
}
