// Author: Dustin Pilgrim
// License: MIT

mod app;
mod cli;

use clap::Parser;

fn main() -> eyre::Result<()> {
    let args = cli::Args::parse();
    app::run(args)
}
