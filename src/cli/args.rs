//! CLI argument definitions using clap
//!
//! Commands:
//! - shapecast cast --config <path> --schema <name>
//! - shapecast test --config <path> --schema <name>
//! - shapecast list --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shapecast - validate and cast JSON values against declarative schemas
#[derive(Parser, Debug)]
#[command(name = "shapecast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cast one JSON value read from stdin and print the result
    Cast {
        /// Path to configuration file
        #[arg(long, default_value = "./shapecast.json")]
        config: PathBuf,

        /// Name of the schema to apply
        #[arg(long)]
        schema: String,
    },

    /// Check one JSON value read from stdin without printing the cast
    Test {
        /// Path to configuration file
        #[arg(long, default_value = "./shapecast.json")]
        config: PathBuf,

        /// Name of the schema to apply
        #[arg(long)]
        schema: String,
    },

    /// List the schemas found in the schema directory
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./shapecast.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
