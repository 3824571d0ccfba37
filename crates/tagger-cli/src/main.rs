//! Puzzle tagger CLI
//!
//! Retags Lichess puzzle CSV files and searches a retagged corpus for the
//! puzzle closest to a given tag sequence.

mod command;
mod config;
mod error;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local runs
    let _ = dotenvy::dotenv();

    command::run()
}
