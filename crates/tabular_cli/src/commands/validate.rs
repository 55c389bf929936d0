use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tabular_parser::parse_file;
use tabular_validator::{ValidationOptions, Validator};
use tracing::info;

use crate::input::{self, InputSettings};
use crate::output;

/// Arguments of the `validate` command.
pub struct ValidateArgs {
    pub layout: String,
    pub data: String,
    pub format: String,
    pub delimiter: char,
    pub has_header: bool,
    pub options: ValidationOptions,
    pub jobs: Option<usize>,
}

pub fn execute(args: &ValidateArgs) -> Result<()> {
    info!("Validating {} against layout {}", args.data, args.layout);
    info!("Options: {:?}", args.options);

    let layout = parse_file(Path::new(&args.layout))
        .with_context(|| format!("Failed to load layout file: {}", args.layout))?;

    if args.format != "json" {
        output::print_info(&format!(
            "Layout loaded: {} ({} columns)",
            layout.title().unwrap_or("untitled"),
            layout.width()
        ));
    }

    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| anyhow!("Delimiter must be a single ASCII character, got {:?}", args.delimiter))?;
    let settings = InputSettings {
        delimiter,
        has_header: args.has_header,
    };

    let data_path = Path::new(&args.data);
    let validator = Validator::new(&layout).with_options(args.options);
    let tree = match args.jobs {
        Some(jobs) if jobs > 1 => {
            info!("Checking rows on {} threads", jobs);
            let dataset = input::read_dataset(data_path, settings)?;
            validator.validate_parallel(&dataset, jobs)
        }
        _ => input::validate_stream(data_path, settings, &validator)?,
    };

    output::print_validation_report(&tree, &args.format)?;

    if !tree.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
