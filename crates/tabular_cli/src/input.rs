//! Delimited text input.
//!
//! Rows are read with flexible widths so that short or long rows reach the
//! validator and are reported there instead of failing the read.

use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::ControlFlow;
use std::path::Path;
use tabular_validator::{DataSet, ErrorTree, FileMetadata, Validator};
use tracing::debug;

const BOM: char = '\u{feff}';

/// How a data file is laid out.
#[derive(Debug, Clone, Copy)]
pub struct InputSettings {
    pub delimiter: u8,
    pub has_header: bool,
}

fn open(path: &Path, settings: InputSettings) -> Result<Reader<File>> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(settings.delimiter)
        .from_path(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))
}

/// Length of the file and whether its last byte is a newline.
fn file_tail(path: &Path) -> Result<(u64, bool)> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open data file: {}", path.display()))?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok((0, false));
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok((len, last[0] == b'\n'))
}

fn cells(record: &StringRecord, first: bool) -> Vec<&str> {
    record
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            if first && idx == 0 {
                cell.trim_start_matches(BOM)
            } else {
                cell
            }
        })
        .collect()
}

/// Calls `f` with every line of the file in order, header included.
///
/// The csv reader skips empty lines. They are recovered from the reader's
/// line count and passed on as rows with no cells, so row numbers match
/// file lines.
fn for_each_row<F>(path: &Path, settings: InputSettings, mut f: F) -> Result<()>
where
    F: FnMut(&[&str]) -> ControlFlow<()>,
{
    let mut reader = open(path, settings)?;
    let (len, trailing_newline) = file_tail(path)?;
    let mut record = StringRecord::new();
    let mut first = true;

    loop {
        let before = reader.position().line();
        let found = reader
            .read_record(&mut record)
            .with_context(|| format!("Failed to read line {} of {}", before, path.display()))?;
        let consumed = reader.position().line() - before;

        let blanks = if found {
            let embedded: u64 = record.iter().map(|cell| cell.matches('\n').count() as u64).sum();
            let unterminated = reader.position().byte() == len && !trailing_newline;
            consumed.saturating_sub(embedded + u64::from(!unterminated))
        } else {
            consumed
        };
        for _ in 0..blanks {
            if f(&[]).is_break() {
                return Ok(());
            }
        }
        if !found {
            return Ok(());
        }

        let row = cells(&record, first);
        first = false;
        if f(&row).is_break() {
            return Ok(());
        }
    }
}

/// Streams the file through a validation run, one record at a time.
pub fn validate_stream(
    path: &Path,
    settings: InputSettings,
    validator: &Validator<'_>,
) -> Result<ErrorTree> {
    let mut run = validator.start();
    let mut header_pending = settings.has_header;

    for_each_row(path, settings, |row| {
        if header_pending {
            header_pending = false;
            run.check_header(row);
            ControlFlow::Continue(())
        } else {
            run.push_row(row)
        }
    })?;

    debug!(rows = run.rows_seen(), "Finished reading data file");
    Ok(run.finish(&FileMetadata::from_path(path)))
}

/// Reads the whole file into memory.
pub fn read_dataset(path: &Path, settings: InputSettings) -> Result<DataSet> {
    let mut dataset = DataSet::empty().with_metadata(FileMetadata::from_path(path));
    let mut header_pending = settings.has_header;

    for_each_row(path, settings, |row| {
        if header_pending {
            header_pending = false;
            dataset.header = Some(row.iter().map(|cell| cell.to_string()).collect());
        } else {
            dataset.add_row(row.iter().copied());
        }
        ControlFlow::Continue(())
    })?;

    debug!(rows = dataset.len(), "Loaded data file");
    Ok(dataset)
}
