use clap::{Parser, Subcommand};

use self::{retag::RetagArg, search::SearchArg};

mod retag;
mod search;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Replace the themes column of a puzzle CSV with computed tags
    Retag(#[clap(flatten)] RetagArg),
    /// Find the puzzles of a retagged CSV closest to a tag sequence
    Search(#[clap(flatten)] SearchArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Retag(arg) => retag::run(&arg)?,
        Mode::Search(arg) => search::run(&arg)?,
    }
    Ok(())
}
