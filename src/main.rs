use anyhow::Result;
use clap::Parser;
use ledger_shredder::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
