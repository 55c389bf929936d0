//! Error types for layout definitions.
//!
//! Only a broken schema is an error. Data that fails a rule is reported as a
//! violation by the validator, never through this type.

use thiserror::Error;

/// Result type for layout and field construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Raised while building a [`Field`](crate::Field) or [`Layout`](crate::Layout).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A layout needs at least one column
    #[error("Layout must define at least one column")]
    EmptyLayout,

    /// Two columns share a name
    #[error("Duplicate column name '{0}' in layout")]
    DuplicateColumn(String),

    /// Column names must not be blank
    #[error("Column {0} has a blank name")]
    BlankColumnName(usize),

    /// A choice field with nothing to choose from
    #[error("Choice list for field '{field}' is empty")]
    EmptyChoices {
        /// Column name
        field: String,
    },

    /// A choice listed twice
    #[error("Choice list for field '{field}' contains duplicate entry '{choice}'")]
    DuplicateChoice {
        /// Column name
        field: String,
        /// The repeated choice
        choice: String,
    },

    /// Minimum and maximum bounds contradict each other
    #[error("Field '{field}' has minimum {min} greater than maximum {max}")]
    ConflictingBounds {
        /// Column name
        field: String,
        /// Declared minimum
        min: String,
        /// Declared maximum
        max: String,
    },

    /// A maximum that no value could satisfy
    #[error("Field '{field}' must allow at least one {unit}")]
    ZeroMaximum {
        /// Column name
        field: String,
        /// Characters or digits
        unit: &'static str,
    },

    /// Regular expression failed to compile
    #[error("Invalid regex pattern '{pattern}' for '{field}': {error}")]
    InvalidRegex {
        /// Column name, or `file` for file-name patterns
        field: String,
        /// The pattern as written
        pattern: String,
        /// Compiler message
        error: String,
    },

    /// Date format string has unknown specifiers
    #[error("Invalid date format '{format}' for field '{field}'")]
    InvalidDateFormat {
        /// Column name
        field: String,
        /// The format as written
        format: String,
    },

    /// A bound date does not parse under the field's own format
    #[error("Date '{value}' for field '{field}' does not match format '{format}'")]
    InvalidDate {
        /// Column name
        field: String,
        /// The bound as written
        value: String,
        /// Field format
        format: String,
    },

    /// A comparison rule refers to a column the layout does not have
    #[error("Field '{field}' compares against unknown column '{column}'")]
    UnknownColumn {
        /// Column owning the rule
        field: String,
        /// The missing column
        column: String,
    },

    /// Row-count bounds contradict each other
    #[error("Layout minimum row count {min} exceeds maximum {max}")]
    ConflictingRowBounds {
        /// Declared minimum
        min: usize,
        /// Declared maximum
        max: usize,
    },
}

impl ConfigError {
    /// Creates a new conflicting bounds error.
    pub fn conflicting(
        field: impl Into<String>,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        Self::ConflictingBounds {
            field: field.into(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Creates a new invalid regex error.
    pub fn invalid_regex(
        field: impl Into<String>,
        pattern: impl Into<String>,
        error: impl ToString,
    ) -> Self {
        Self::InvalidRegex {
            field: field.into(),
            pattern: pattern.into(),
            error: error.to_string(),
        }
    }
}
