use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::shared::parse_assignment;

/// List, fill, and flatten PDF form fields.
#[derive(Debug, Parser)]
#[command(name = "pdfform", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the classified form fields
    Fields {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print form fields and rendering rules as one JSON document
    Metadata {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Fill form fields, flatten the form, and save the result
    Fill {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Where to write the flattened PDF
        #[arg(short, long, value_name = "OUT", required_unless_present = "dry_run")]
        output: Option<PathBuf>,

        /// JSON object mapping field names to values
        #[arg(long, value_name = "JSON_FILE")]
        values: Option<PathBuf>,

        /// Set one field (repeatable); overrides --values
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,

        /// Print the fill batch and flatten candidates without writing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Output format for field listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated text
    Text,
    /// `{"formFields": [...]}` JSON
    Json,
}
