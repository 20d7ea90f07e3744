use clap::Parser;

use core_lib::cli::{Cli, builders::run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(&cli)
}
