use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tabular_parser::parse_file;
use tabular_validator::{DigestFormat, digest_with};
use tracing::info;

use crate::output;

pub fn execute(layout_path: &str, format: &str, output_path: Option<&str>) -> Result<()> {
    info!("Rendering digest for layout: {}", layout_path);

    let layout = parse_file(Path::new(layout_path))
        .with_context(|| format!("Failed to load layout file: {}", layout_path))?;

    let format = match format {
        "html" => DigestFormat::Html,
        _ => DigestFormat::Markdown,
    };
    let document = digest_with(&layout, format);

    match output_path {
        Some(path) => {
            fs::write(path, &document)
                .with_context(|| format!("Failed to write digest to: {}", path))?;
            output::print_success(&format!("Digest written to {}", path));
        }
        None => print!("{document}"),
    }

    Ok(())
}
