//! Streaming state of one validation run.
//!
//! A [`ValidationRun`] takes rows one at a time, so a file never has to be held
//! in memory as a whole. Only values of columns that carry column rules are
//! kept until [`ValidationRun::finish`].

use crate::dataset::FileMetadata;
use crate::options::ValidationOptions;
use crate::tree::{CellErrors, ColumnErrors, ErrorTree, HeaderErrors, INCOMPLETE_RULE, RowErrors};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tabular_core::{FileFacts, Layout, RowContext, RuleViolation};
use tracing::{debug, info, warn};

const INCOMPLETE_EXPLANATION: &str =
    "validation stopped before the end of the file; later rows and column rules were not checked";

/// Result of checking one row on its own.
#[derive(Debug)]
pub(crate) struct RowOutcome {
    row: usize,
    blank: bool,
    errors: RowErrors,
    values: Vec<(usize, String)>,
}

/// Checks one row against the layout without touching any run state.
pub(crate) fn check_row<S: AsRef<str>>(
    layout: &Layout,
    options: &ValidationOptions,
    row: usize,
    cells: &[S],
) -> RowOutcome {
    let mut outcome = RowOutcome {
        row,
        blank: false,
        errors: RowErrors::new(row),
        values: Vec::new(),
    };

    if options.empty_row_ok && layout.is_blank_row(cells) {
        outcome.blank = true;
        return outcome;
    }

    outcome.errors.structural = layout.check_width(cells.len());
    if !outcome.errors.structural.is_empty() {
        return outcome;
    }

    let texts: Vec<&str> = cells.iter().map(AsRef::as_ref).collect();
    let ctx = RowContext::new(layout.column_names(), &texts);
    for (idx, (column, value)) in layout.columns().iter().zip(&texts).enumerate() {
        let violations = column.check_cell(value, &ctx);
        if !violations.is_empty() {
            outcome.errors.cells.push(CellErrors {
                row,
                column: idx + 1,
                name: column.name().to_string(),
                violations,
            });
        }
        if column.has_column_rules() {
            outcome.values.push((idx, value.to_string()));
        }
    }
    outcome
}

#[derive(Debug, Default)]
struct ColumnCache {
    rows: Vec<usize>,
    values: Vec<String>,
}

/// Mutable state while one file is validated.
///
/// # Example
///
/// ```rust
/// use tabular_core::{Field, Layout};
/// use tabular_validator::{FileMetadata, ValidationOptions, ValidationRun};
///
/// let layout = Layout::new([("id", Field::integer(3).unique())]).unwrap();
/// let mut run = ValidationRun::new(&layout, ValidationOptions::new());
///
/// run.check_header(&["id"]);
/// for row in [["1"], ["2"], ["1"]] {
///     if run.push_row(&row).is_break() {
///         break;
///     }
/// }
///
/// let tree = run.finish(&FileMetadata::new("ids.csv"));
/// assert_eq!(tree.failed_rows(), 2);
/// ```
#[derive(Debug)]
pub struct ValidationRun<'a> {
    layout: &'a Layout,
    options: ValidationOptions,
    next_row: usize,
    header: Option<HeaderErrors>,
    rows: BTreeMap<usize, RowErrors>,
    caches: Vec<ColumnCache>,
    rows_seen: usize,
    rows_with_errors: usize,
    halted: bool,
    abandoned: bool,
}

impl<'a> ValidationRun<'a> {
    /// Starts a run at row 1.
    pub fn new(layout: &'a Layout, options: ValidationOptions) -> Self {
        Self {
            layout,
            options,
            next_row: 1,
            header: None,
            rows: BTreeMap::new(),
            caches: layout.columns().iter().map(|_| ColumnCache::default()).collect(),
            rows_seen: 0,
            rows_with_errors: 0,
            halted: false,
            abandoned: false,
        }
    }

    /// Row number the next pushed row will get.
    pub fn next_row(&self) -> usize {
        self.next_row
    }

    /// Data rows checked so far, blank skipped rows excluded.
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Data rows with at least one failure so far.
    pub fn rows_with_errors(&self) -> usize {
        self.rows_with_errors
    }

    /// True once the error limit was reached.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Consumes the next row number as the header row and applies the header
    /// rules, unless the options skip them. A failing header is recorded and
    /// the scan goes on positionally.
    pub fn check_header<S: AsRef<str>>(&mut self, header: &[S]) {
        let row = self.next_row;
        self.next_row += 1;

        if self.options.skip_header {
            debug!(row, "Header rules skipped");
            return;
        }

        let violations = self.layout.check_header(header);
        if !violations.is_empty() {
            debug!(row, failed = violations.len(), "Header does not match layout");
            self.header = Some(HeaderErrors { row, violations });
        }
    }

    /// Checks the next data row.
    ///
    /// Returns [`ControlFlow::Break`] once the error limit is reached; further
    /// rows are ignored.
    pub fn push_row<S: AsRef<str>>(&mut self, cells: &[S]) -> ControlFlow<()> {
        if self.halted {
            return ControlFlow::Break(());
        }
        let outcome = check_row(self.layout, &self.options, self.next_row, cells);
        self.record(outcome)
    }

    /// Merges the outcome of a row checked elsewhere. Outcomes must arrive in
    /// ascending row order.
    pub(crate) fn record(&mut self, outcome: RowOutcome) -> ControlFlow<()> {
        if self.halted {
            return ControlFlow::Break(());
        }
        self.next_row = outcome.row + 1;
        if outcome.blank {
            return ControlFlow::Continue(());
        }

        self.rows_seen += 1;
        for (idx, value) in outcome.values {
            let cache = &mut self.caches[idx];
            cache.rows.push(outcome.row);
            cache.values.push(value);
        }

        if outcome.errors.is_empty() {
            return ControlFlow::Continue(());
        }

        self.rows.insert(outcome.row, outcome.errors);
        self.rows_with_errors += 1;
        if self
            .options
            .max_errors
            .is_some_and(|limit| limit > 0 && self.rows_with_errors >= limit)
        {
            warn!(
                row = outcome.row,
                rows_with_errors = self.rows_with_errors,
                "Error limit reached, stopping validation"
            );
            self.halted = true;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    /// Marks the run as stopped early by the caller. The tree will be flagged
    /// incomplete.
    pub fn abandon(&mut self) {
        debug!(next_row = self.next_row, "Validation abandoned");
        self.abandoned = true;
    }

    /// Runs column and file rules and assembles the error tree.
    ///
    /// Column rules and row-count rules only run when every row was seen.
    pub fn finish(mut self, metadata: &FileMetadata) -> ErrorTree {
        let complete = !(self.halted || self.abandoned);
        let columns = if complete {
            self.apply_column_rules()
        } else {
            Vec::new()
        };

        let facts = FileFacts {
            name: metadata.name.as_deref(),
            row_count: self.rows_seen,
        };
        let mut file_errors: Vec<RuleViolation> = self
            .layout
            .file_rules()
            .iter()
            .filter(|rule| complete || !rule.counts_rows())
            .filter_map(|rule| rule.evaluate(&facts).err())
            .collect();
        if !complete {
            file_errors.push(RuleViolation::new(INCOMPLETE_RULE, INCOMPLETE_EXPLANATION));
        }

        let tree = ErrorTree {
            file: metadata.name.clone(),
            complete,
            file_errors,
            header: self.header,
            rows: self.rows.into_values().collect(),
            columns,
        };
        info!(
            file = metadata.display_name(),
            rows = self.rows_seen,
            failed_rows = tree.failed_rows(),
            violations = tree.violation_count(),
            complete,
            "Validation finished"
        );
        tree
    }

    fn apply_column_rules(&mut self) -> Vec<ColumnErrors> {
        let layout = self.layout;
        let mut columns = Vec::new();

        for (idx, column) in layout.columns().iter().enumerate() {
            if !column.has_column_rules() {
                continue;
            }
            let cache = &self.caches[idx];
            let mut whole = Vec::new();

            for rule in &column.rules().column {
                let Err(failed) = rule.evaluate(&cache.values) else {
                    continue;
                };
                if failed.positions.is_empty() {
                    whole.push(failed.violation);
                    continue;
                }
                for pos in failed.positions {
                    let row = cache.rows[pos];
                    self.rows
                        .entry(row)
                        .or_insert_with(|| RowErrors::new(row))
                        .cell_mut(idx + 1, column.name())
                        .violations
                        .push(failed.violation.clone());
                }
            }

            if !whole.is_empty() {
                columns.push(ColumnErrors {
                    column: idx + 1,
                    name: column.name().to_string(),
                    violations: whole,
                });
            }
        }

        debug!(failed_columns = columns.len(), "Column rules evaluated");
        columns
    }
}
