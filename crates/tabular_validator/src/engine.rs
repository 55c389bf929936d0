//! Main validation engine.
//!
//! This module provides the [`Validator`] that scans a whole file against a
//! layout: header rules, row width, cell rules for every cell, then column and
//! file rules once all rows are seen. Nothing short-circuits; every failure is
//! collected into the returned [`ErrorTree`].

use crate::dataset::{DataSet, FileMetadata};
use crate::options::ValidationOptions;
use crate::run::{RowOutcome, ValidationRun, check_row};
use crate::tree::ErrorTree;
use std::thread;
use tabular_core::Layout;
use tracing::debug;

/// Validates files against one layout.
///
/// # Example
///
/// ```rust
/// use tabular_core::{Field, Layout};
/// use tabular_validator::{DataSet, Validator};
///
/// let layout = Layout::new([
///     ("col1", Field::text(8)),
///     ("col2", Field::choice(["x", "y", "z"])),
///     ("col3", Field::integer(1)),
/// ])
/// .unwrap();
///
/// let mut dataset = DataSet::empty().with_header(["col1", "col2", "col3"]);
/// dataset.add_row(["ghi", "a", "1"]);
///
/// let tree = Validator::new(&layout).validate(&dataset);
/// assert_eq!(tree.violation_count(), 1);
/// println!("{tree}");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    layout: &'a Layout,
    options: ValidationOptions,
}

impl<'a> Validator<'a> {
    /// Creates a validator with default options.
    pub fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            options: ValidationOptions::default(),
        }
    }

    /// Sets the scan options.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// The layout rows are checked against.
    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    /// Current scan options.
    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Starts a streaming run, for callers that feed rows themselves.
    pub fn start(&self) -> ValidationRun<'a> {
        ValidationRun::new(self.layout, self.options)
    }

    /// Validates an in-memory dataset.
    pub fn validate(&self, dataset: &DataSet) -> ErrorTree {
        self.validate_rows(&dataset.metadata, dataset.header.as_deref(), &dataset.rows)
    }

    /// Validates any sequence of rows. `header`, when given, is row 1.
    pub fn validate_rows<I, R, S>(
        &self,
        metadata: &FileMetadata,
        header: Option<&[S]>,
        rows: I,
    ) -> ErrorTree
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        debug!(
            file = metadata.display_name(),
            columns = self.layout.width(),
            "Starting validation"
        );

        let mut run = self.start();
        if let Some(header) = header {
            run.check_header(header);
        }
        for row in rows {
            if run.push_row(row.as_ref()).is_break() {
                break;
            }
        }
        run.finish(metadata)
    }

    /// Validates a dataset with rows checked on up to `workers` threads.
    ///
    /// Rows are split into contiguous chunks, checked independently, then
    /// merged in row order before column rules run. The tree is identical to
    /// the one [`Validator::validate`] returns.
    pub fn validate_parallel(&self, dataset: &DataSet, workers: usize) -> ErrorTree {
        let mut run = self.start();
        if let Some(header) = &dataset.header {
            run.check_header(header);
        }

        let first_row = run.next_row();
        let chunk_size = dataset.rows.len().div_ceil(workers.max(1)).max(1);
        debug!(
            file = dataset.metadata.display_name(),
            rows = dataset.len(),
            workers,
            chunk_size,
            "Starting parallel validation"
        );

        let layout = self.layout;
        let options = self.options;
        let outcomes: Vec<Vec<RowOutcome>> = thread::scope(|scope| {
            let handles: Vec<_> = dataset
                .rows
                .chunks(chunk_size)
                .enumerate()
                .map(|(n, chunk)| {
                    let start = first_row + n * chunk_size;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .enumerate()
                            .map(|(offset, cells)| {
                                check_row(layout, &options, start + offset, cells.as_slice())
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });

        for outcome in outcomes.into_iter().flatten() {
            if run.record(outcome).is_break() {
                break;
            }
        }
        run.finish(&dataset.metadata)
    }
}
