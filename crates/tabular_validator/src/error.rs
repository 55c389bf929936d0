//! Violation types.
//!
//! A violation is a data finding, not a failure of the engine: validation
//! always completes with an [`ErrorTree`](crate::ErrorTree), and these values
//! are what it flattens into. Messages hold coordinates and fixed rule
//! explanations only.

use serde::Serialize;
use tabular_core::RuleViolation;
use thiserror::Error;

/// One rule failure, located in the file.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Violation {
    /// File-level rule failure (name, row count, incomplete scan)
    #[error("File: {rule}: {explanation}")]
    File {
        /// Rule kind
        rule: String,
        /// Fixed explanation
        explanation: String,
    },

    /// Header row rule failure
    #[error("Header (row {row}): {rule}: {explanation}")]
    Header {
        /// Row number of the header
        row: usize,
        /// Rule kind
        rule: String,
        /// Fixed explanation
        explanation: String,
    },

    /// Row with the wrong number of cells
    #[error("Row {row}: {rule}: {explanation}")]
    Structural {
        /// 1-based row number
        row: usize,
        /// Rule kind
        rule: String,
        /// Fixed explanation
        explanation: String,
    },

    /// Cell rule failure, or a column rule failure attributed to a cell
    #[error("Cell {row},{column} ({name}): {rule}: {explanation}")]
    Cell {
        /// 1-based row number
        row: usize,
        /// 1-based column number
        column: usize,
        /// Column name
        name: String,
        /// Rule kind
        rule: String,
        /// Fixed explanation
        explanation: String,
    },

    /// Column rule failure not tied to particular rows
    #[error("Column {column} ({name}): {rule}: {explanation}")]
    Column {
        /// 1-based column number
        column: usize,
        /// Column name
        name: String,
        /// Rule kind
        rule: String,
        /// Fixed explanation
        explanation: String,
    },
}

impl Violation {
    /// Creates a file-level violation.
    pub fn file(violation: &RuleViolation) -> Self {
        Self::File {
            rule: violation.rule.clone(),
            explanation: violation.explanation.clone(),
        }
    }

    /// Creates a header violation.
    pub fn header(row: usize, violation: &RuleViolation) -> Self {
        Self::Header {
            row,
            rule: violation.rule.clone(),
            explanation: violation.explanation.clone(),
        }
    }

    /// Creates a structural row violation.
    pub fn structural(row: usize, violation: &RuleViolation) -> Self {
        Self::Structural {
            row,
            rule: violation.rule.clone(),
            explanation: violation.explanation.clone(),
        }
    }

    /// Creates a cell violation.
    pub fn cell(row: usize, column: usize, name: impl Into<String>, violation: &RuleViolation) -> Self {
        Self::Cell {
            row,
            column,
            name: name.into(),
            rule: violation.rule.clone(),
            explanation: violation.explanation.clone(),
        }
    }

    /// Creates a whole-column violation.
    pub fn column(column: usize, name: impl Into<String>, violation: &RuleViolation) -> Self {
        Self::Column {
            column,
            name: name.into(),
            rule: violation.rule.clone(),
            explanation: violation.explanation.clone(),
        }
    }

    /// Rule kind.
    pub fn rule(&self) -> &str {
        match self {
            Self::File { rule, .. }
            | Self::Header { rule, .. }
            | Self::Structural { rule, .. }
            | Self::Cell { rule, .. }
            | Self::Column { rule, .. } => rule,
        }
    }

    /// Fixed explanation.
    pub fn explanation(&self) -> &str {
        match self {
            Self::File { explanation, .. }
            | Self::Header { explanation, .. }
            | Self::Structural { explanation, .. }
            | Self::Cell { explanation, .. }
            | Self::Column { explanation, .. } => explanation,
        }
    }

    /// Row number, for row-scoped violations.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Header { row, .. } | Self::Structural { row, .. } | Self::Cell { row, .. } => {
                Some(*row)
            }
            Self::File { .. } | Self::Column { .. } => None,
        }
    }
}
