//! Builder pattern for creating layouts.
//!
//! The builder collects columns and file-level settings and checks the whole
//! schema once in [`LayoutBuilder::build`].

use crate::error::{ConfigError, Result};
use crate::field::Field;
use crate::layout::{Column, Layout};
use crate::rule::{FileRule, RowRule};
use regex::Regex;
use std::collections::HashSet;

/// Builder for creating a [`Layout`].
///
/// # Example
///
/// ```rust
/// use tabular_core::{Field, LayoutBuilder};
///
/// let layout = LayoutBuilder::new()
///     .title("Daily orders")
///     .column("order_id", Field::integer(10).unique())
///     .column("status", Field::choice(["open", "closed"]))
///     .file_name_pattern(r"orders_\d{8}\.csv")
///     .max_rows(10_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(layout.width(), 2);
/// ```
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    title: Option<String>,
    columns: Vec<(String, Field)>,
    name_patterns: Vec<String>,
    min_rows: Option<usize>,
    max_rows: Option<usize>,
}

impl LayoutBuilder {
    /// Creates an empty layout builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the layout title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a column.
    pub fn column(mut self, name: impl Into<String>, field: Field) -> Self {
        self.columns.push((name.into(), field));
        self
    }

    /// Adds an accepted file name pattern. The whole name must match.
    pub fn file_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_patterns.push(pattern.into());
        self
    }

    /// Requires at least `rows` data rows.
    pub fn min_rows(mut self, rows: usize) -> Self {
        self.min_rows = Some(rows);
        self
    }

    /// Allows at most `rows` data rows.
    pub fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Checks the schema and compiles every rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty layout, blank or duplicate column
    /// names, an invalid field, a comparison against an unknown column, an
    /// invalid file name pattern, or contradicting row bounds.
    pub fn build(self) -> Result<Layout> {
        if self.columns.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }

        let mut seen = HashSet::new();
        for (idx, (name, _)) in self.columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ConfigError::BlankColumnName(idx + 1));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateColumn(name.clone()));
            }
        }

        let names: Vec<String> = self.columns.iter().map(|(name, _)| name.clone()).collect();
        let mut columns = Vec::with_capacity(self.columns.len());
        for (name, field) in self.columns {
            let rules = field.build_rules(&name)?;
            if let Some(other) = rules
                .cell
                .iter()
                .filter_map(|rule| rule.compared_column())
                .find(|other| !names.iter().any(|n| n.as_str() == *other))
            {
                return Err(ConfigError::UnknownColumn {
                    field: name,
                    column: other.to_string(),
                });
            }
            columns.push(Column { name, field, rules });
        }

        let mut file_rules = Vec::new();
        if !self.name_patterns.is_empty() {
            let patterns = self
                .name_patterns
                .iter()
                .map(|p| Regex::new(p).map_err(|e| ConfigError::invalid_regex("file", p, e)))
                .collect::<Result<Vec<_>>>()?;
            if patterns.len() > 1 {
                file_rules.push(FileRule::NameMatchesOnePattern(patterns.clone()));
            }
            file_rules.insert(0, FileRule::NamePattern(patterns));
        }

        if let (Some(min), Some(max)) = (self.min_rows, self.max_rows) {
            if min > max {
                return Err(ConfigError::ConflictingRowBounds { min, max });
            }
        }
        if let Some(min) = self.min_rows {
            file_rules.push(FileRule::MinRows(min));
        }
        if let Some(max) = self.max_rows {
            file_rules.push(FileRule::MaxRows(max));
        }

        let width = columns.len();
        tracing::debug!(columns = width, file_rules = file_rules.len(), "Layout built");

        Ok(Layout {
            title: self.title,
            columns,
            names,
            row_rules: vec![RowRule::LengthAtMost(width), RowRule::LengthAtLeast(width)],
            file_rules,
        })
    }
}
