//! The error tree produced by a validation run.
//!
//! The tree is pruned: only rows, cells and columns with at least one failure
//! appear. It stores coordinates and rule explanations, never cell values, so
//! everything derived from it (text, JSON, the flat violation list) is safe to
//! share.

use crate::error::Violation;
use serde::Serialize;
use std::fmt;
use tabular_core::RuleViolation;

/// Rule kind used when a run stopped before the end of the file.
pub const INCOMPLETE_RULE: &str = "Incomplete";

/// Failures of the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderErrors {
    /// Row number of the header
    pub row: usize,
    /// Failed header rules
    pub violations: Vec<RuleViolation>,
}

/// Failures of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellErrors {
    /// 1-based row number
    pub row: usize,
    /// 1-based column number
    pub column: usize,
    /// Column name
    pub name: String,
    /// Failures in pipeline order, cell rules before column rules
    pub violations: Vec<RuleViolation>,
}

/// Failures of one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowErrors {
    /// 1-based row number
    pub row: usize,
    /// Width failures
    pub structural: Vec<RuleViolation>,
    /// Failing cells, by column
    pub cells: Vec<CellErrors>,
}

impl RowErrors {
    pub(crate) fn new(row: usize) -> Self {
        Self {
            row,
            structural: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// True when nothing failed in this row.
    pub fn is_empty(&self) -> bool {
        self.structural.is_empty() && self.cells.is_empty()
    }

    /// Cell entry for `column`, created in column order when missing.
    pub(crate) fn cell_mut(&mut self, column: usize, name: &str) -> &mut CellErrors {
        let idx = match self.cells.binary_search_by_key(&column, |cell| cell.column) {
            Ok(idx) => idx,
            Err(idx) => {
                self.cells.insert(
                    idx,
                    CellErrors {
                        row: self.row,
                        column,
                        name: name.to_string(),
                        violations: Vec::new(),
                    },
                );
                idx
            }
        };
        &mut self.cells[idx]
    }
}

/// Whole-column failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnErrors {
    /// 1-based column number
    pub column: usize,
    /// Column name
    pub name: String,
    /// Failed column rules
    pub violations: Vec<RuleViolation>,
}

/// Hierarchical, pruned record of every failure found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorTree {
    /// File name, if known
    pub file: Option<String>,
    /// Whether every row was checked
    pub complete: bool,
    /// File-level failures
    pub file_errors: Vec<RuleViolation>,
    /// Header failures
    pub header: Option<HeaderErrors>,
    /// Row failures, ascending by row
    pub rows: Vec<RowErrors>,
    /// Whole-column failures, ascending by column
    pub columns: Vec<ColumnErrors>,
}

impl ErrorTree {
    /// True when the file conforms. An incomplete tree is never empty.
    pub fn is_empty(&self) -> bool {
        self.violation_count() == 0
    }

    /// Number of leaf explanations in the tree.
    pub fn violation_count(&self) -> usize {
        self.file_errors.len()
            + self.header.as_ref().map_or(0, |h| h.violations.len())
            + self
                .rows
                .iter()
                .map(|r| {
                    r.structural.len() + r.cells.iter().map(|c| c.violations.len()).sum::<usize>()
                })
                .sum::<usize>()
            + self.columns.iter().map(|c| c.violations.len()).sum::<usize>()
    }

    /// Number of rows with at least one failure.
    pub fn failed_rows(&self) -> usize {
        self.rows.len()
    }

    /// Every failure, flattened in render order.
    pub fn violations(&self) -> Vec<Violation> {
        let mut out: Vec<Violation> = self.file_errors.iter().map(Violation::file).collect();

        if let Some(header) = &self.header {
            out.extend(
                header
                    .violations
                    .iter()
                    .map(|v| Violation::header(header.row, v)),
            );
        }

        for row in &self.rows {
            out.extend(row.structural.iter().map(|v| Violation::structural(row.row, v)));
            for cell in &row.cells {
                out.extend(
                    cell.violations
                        .iter()
                        .map(|v| Violation::cell(cell.row, cell.column, &cell.name, v)),
                );
            }
        }

        for column in &self.columns {
            out.extend(
                column
                    .violations
                    .iter()
                    .map(|v| Violation::column(column.column, &column.name, v)),
            );
        }
        out
    }

    /// Renders the tree as a nested list. Returns an empty string when the
    /// file conforms.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut lines = Vec::new();
        let file = self.file.as_deref().unwrap_or("<unnamed>");
        push_line(&mut lines, 0, format!("File: {file}"));
        push_violations(&mut lines, 1, &self.file_errors);

        if let Some(header) = &self.header {
            push_line(&mut lines, 1, format!("Header: {}", header.row));
            push_violations(&mut lines, 2, &header.violations);
        }

        for row in &self.rows {
            push_line(&mut lines, 1, format!("Row: {}", row.row));
            push_violations(&mut lines, 2, &row.structural);
            for cell in &row.cells {
                push_line(
                    &mut lines,
                    2,
                    format!("Cell: {},{} ({})", cell.row, cell.column, cell.name),
                );
                push_violations(&mut lines, 3, &cell.violations);
            }
        }

        for column in &self.columns {
            push_line(
                &mut lines,
                1,
                format!("Column: {} ({})", column.column, column.name),
            );
            push_violations(&mut lines, 2, &column.violations);
        }

        lines.join("\n")
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn push_line(lines: &mut Vec<String>, depth: usize, text: String) {
    lines.push(format!("{} - {text}", "  ".repeat(depth)));
}

fn push_violations(lines: &mut Vec<String>, depth: usize, violations: &[RuleViolation]) {
    for violation in violations {
        push_line(lines, depth, violation.to_string());
    }
}
