//! Dataset representation for validation.
//!
//! Cells are kept as raw text: every field type is judged on the exact string
//! found in the file.

use std::path::Path;

/// Facts about the file a dataset came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    /// File name without directories, if known
    pub name: Option<String>,
}

impl FileMetadata {
    /// Metadata for a file called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Metadata for data with no file name (streams, in-memory rows).
    pub fn unnamed() -> Self {
        Self::default()
    }

    /// Takes the file name component of `path`.
    pub fn from_path(path: &Path) -> Self {
        Self {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        }
    }

    /// Name used in reports.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// A single row of raw cells.
pub type DataRow = Vec<String>;

/// A file's worth of rows, with an optional header row.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    /// Where the rows came from
    pub metadata: FileMetadata,
    /// Header row, if the file has one
    pub header: Option<DataRow>,
    /// Data rows in file order
    pub rows: Vec<DataRow>,
}

impl DataSet {
    /// Creates an empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a dataset from data rows, without header.
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Sets the header row.
    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the file metadata.
    pub fn with_metadata(mut self, metadata: FileMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a data row.
    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Row number of the first data row: 2 with a header, 1 without.
    pub fn first_data_row(&self) -> usize {
        if self.header.is_some() { 2 } else { 1 }
    }
}

impl FromIterator<DataRow> for DataSet {
    fn from_iter<T: IntoIterator<Item = DataRow>>(iter: T) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}
