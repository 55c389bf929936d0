use anyhow::{Context, Result};
use std::path::Path;
use tabular_parser::parse_file;
use tracing::info;

use crate::output;

pub fn execute(layout_path: &str, format: &str) -> Result<()> {
    info!("Checking layout: {}", layout_path);

    // A layout that parses and builds is valid
    let layout = parse_file(Path::new(layout_path))
        .with_context(|| format!("Failed to load layout file: {}", layout_path))?;

    output::print_layout_summary(&layout, format)
}
