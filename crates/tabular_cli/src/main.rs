mod commands;
mod input;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tabular_validator::ValidationOptions;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tabcheck")]
#[command(version, about = "Tabular layout validation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a delimited data file against a layout
    Validate {
        /// Path to the layout file (YAML or TOML)
        layout: String,

        /// Path to the data file (CSV or other delimited text)
        data: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// The data file has no header row
        #[arg(long)]
        no_header: bool,

        /// Do not check the header row against the layout
        #[arg(long)]
        skip_header: bool,

        /// Skip rows whose checked cells are all blank
        #[arg(long)]
        empty_row_ok: bool,

        /// Stop after this many rows with errors (0 means no limit)
        #[arg(long)]
        max_errors: Option<usize>,

        /// Check rows on this many threads (loads the whole file)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Check a layout file without validating data
    Check {
        /// Path to the layout file (YAML or TOML)
        layout: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Render layout documentation
    Digest {
        /// Path to the layout file (YAML or TOML)
        layout: String,

        /// Output format: md, html
        #[arg(short, long, default_value = "md", value_parser = ["md", "html"])]
        format: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Validate {
            layout,
            data,
            format,
            delimiter,
            no_header,
            skip_header,
            empty_row_ok,
            max_errors,
            jobs,
        } => {
            let mut options = ValidationOptions::new()
                .skip_header(skip_header)
                .empty_row_ok(empty_row_ok);
            options.max_errors = max_errors;

            commands::validate::execute(&commands::validate::ValidateArgs {
                layout,
                data,
                format,
                delimiter,
                has_header: !no_header,
                options,
                jobs,
            })
        }

        Commands::Check { layout, format } => commands::check::execute(&layout, &format),

        Commands::Digest {
            layout,
            format,
            output,
        } => commands::digest::execute(&layout, &format, output.as_deref()),
    }
}
