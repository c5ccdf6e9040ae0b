//! CLI entry point for headless quantized mask generation

use clap::Parser;
use quantmask::io::cli::{Cli, Driver};
use tracing::Level;

fn main() -> quantmask::Result<()> {
    let cli = Cli::parse();
    let level = if cli.quiet { Level::WARN } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    Driver::new(cli).run()?;
    Ok(())
}
