//! cfmd - Confluence to Markdown exporter.
//!
//! Provides commands for:
//! - `page`: Export a single Confluence page
//! - `tree`: Export a page and its descendants
//! - `convert`: Convert a local storage format file

mod commands;
mod error;
mod output;
mod writer;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, PageArgs, TreeArgs};
use output::Output;

/// cfmd - export Confluence pages as Markdown.
#[derive(Parser)]
#[command(name = "cfmd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single page.
    Page(PageArgs),
    /// Export a page and its descendants, one directory per ancestor.
    Tree(TreeArgs),
    /// Convert a storage format file without contacting Confluence.
    Convert(ConvertArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Page(args) => args.common.verbose,
            Self::Tree(args) => args.common.verbose,
            Self::Convert(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Page(args) => args.execute(),
        Commands::Tree(args) => args.execute(),
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.fatal(&err);
        std::process::exit(1);
    }
}
