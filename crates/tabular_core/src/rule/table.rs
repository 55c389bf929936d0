//! Structural rules owned by a layout: row width, header row and file-level
//! rules. They are not meant to be attached to fields.

use super::RuleViolation;
use regex::Regex;
use std::collections::HashSet;

/// Row width rule. A row failing one of these has no reliable cell-to-column
/// mapping, so its cells are not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRule {
    /// At most this many cells
    LengthAtMost(usize),
    /// At least this many cells
    LengthAtLeast(usize),
}

impl RowRule {
    /// Rule kind name.
    pub fn name(&self) -> &'static str {
        "RowLength"
    }

    /// Fixed explanation.
    pub fn explanation(&self) -> String {
        match self {
            RowRule::LengthAtMost(n) => format!("row length must be equal to {n}, not greater"),
            RowRule::LengthAtLeast(n) => format!("row length must be equal to {n}, not less"),
        }
    }

    /// Checks the number of cells in a row.
    pub fn evaluate(&self, width: usize) -> Result<(), RuleViolation> {
        let ok = match self {
            RowRule::LengthAtMost(n) => width <= *n,
            RowRule::LengthAtLeast(n) => width >= *n,
        };
        if ok {
            Ok(())
        } else {
            Err(RuleViolation::new(self.name(), self.explanation()))
        }
    }
}

/// Header row rule, judged against the layout's column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// Header must list the columns exactly in layout order
    ColumnOrder,
    /// No names outside the layout
    NoExtra,
    /// No name listed twice
    NoDuplicate,
    /// Every layout column present
    NoMissing,
}

impl HeaderRule {
    /// The header rules in evaluation order.
    pub const ALL: [HeaderRule; 4] = [
        HeaderRule::ColumnOrder,
        HeaderRule::NoExtra,
        HeaderRule::NoDuplicate,
        HeaderRule::NoMissing,
    ];

    /// Rule kind name.
    pub fn name(&self) -> &'static str {
        match self {
            HeaderRule::ColumnOrder => "ColumnOrder",
            HeaderRule::NoExtra => "NoExtra",
            HeaderRule::NoDuplicate => "NoDuplicate",
            HeaderRule::NoMissing => "NoMissing",
        }
    }

    /// Fixed explanation.
    pub fn explanation(&self) -> &'static str {
        match self {
            HeaderRule::ColumnOrder => "header row must match the column order of the layout",
            HeaderRule::NoExtra => "header row must not have unexpected columns",
            HeaderRule::NoDuplicate => "header row must not contain duplicate values",
            HeaderRule::NoMissing => "header row must not be missing any expected columns",
        }
    }

    /// Checks a header row against the expected column names.
    pub fn evaluate<S: AsRef<str>>(&self, header: &[S], expected: &[String]) -> Result<(), RuleViolation> {
        let ok = match self {
            HeaderRule::ColumnOrder => {
                header.len() == expected.len()
                    && header.iter().zip(expected).all(|(h, e)| h.as_ref() == e)
            }
            HeaderRule::NoExtra => header
                .iter()
                .all(|h| expected.iter().any(|e| e == h.as_ref())),
            HeaderRule::NoDuplicate => {
                let mut seen = HashSet::new();
                header.iter().all(|h| seen.insert(h.as_ref()))
            }
            HeaderRule::NoMissing => expected
                .iter()
                .all(|e| header.iter().any(|h| h.as_ref() == e)),
        };
        if ok {
            Ok(())
        } else {
            Err(RuleViolation::new(self.name(), self.explanation()))
        }
    }
}

/// Facts about the file being validated that file rules may inspect.
#[derive(Debug, Clone, Copy)]
pub struct FileFacts<'a> {
    /// File name, without directories
    pub name: Option<&'a str>,
    /// Number of data rows, header excluded
    pub row_count: usize,
}

/// Rule evaluated once per file.
#[derive(Debug, Clone)]
pub enum FileRule {
    /// File name must fully match at least one pattern
    NamePattern(Vec<Regex>),
    /// File name must not match more than one pattern
    NameMatchesOnePattern(Vec<Regex>),
    /// At least this many data rows
    MinRows(usize),
    /// At most this many data rows
    MaxRows(usize),
}

impl FileRule {
    /// Rule kind name.
    pub fn name(&self) -> &'static str {
        match self {
            FileRule::NamePattern(_) => "FileNamePattern",
            FileRule::NameMatchesOnePattern(_) => "FileNameMatchesOnePattern",
            FileRule::MinRows(_) => "MinRows",
            FileRule::MaxRows(_) => "MaxRows",
        }
    }

    /// Fixed explanation.
    pub fn explanation(&self) -> String {
        match self {
            FileRule::NamePattern(patterns) => format!(
                "file name must match a pattern provided in the layout ({})",
                listed(patterns)
            ),
            FileRule::NameMatchesOnePattern(_) => {
                "file name cannot match multiple patterns provided in the layout".to_string()
            }
            FileRule::MinRows(n) => format!("file must have at least {n} data rows"),
            FileRule::MaxRows(n) => format!("file must have no more than {n} data rows"),
        }
    }

    /// True for the rules that depend on having seen every row.
    pub fn counts_rows(&self) -> bool {
        matches!(self, FileRule::MinRows(_) | FileRule::MaxRows(_))
    }

    /// Checks the file. Name rules pass when no name is known.
    pub fn evaluate(&self, facts: &FileFacts<'_>) -> Result<(), RuleViolation> {
        let ok = match self {
            FileRule::NamePattern(patterns) => facts
                .name
                .is_none_or(|name| patterns.iter().any(|p| full_match(p, name))),
            FileRule::NameMatchesOnePattern(patterns) => facts.name.is_none_or(|name| {
                patterns.iter().filter(|p| full_match(p, name)).count() <= 1
            }),
            FileRule::MinRows(n) => facts.row_count >= *n,
            FileRule::MaxRows(n) => facts.row_count <= *n,
        };
        if ok {
            Ok(())
        } else {
            Err(RuleViolation::new(self.name(), self.explanation()))
        }
    }
}

// Runs once per file, so recompiling the anchored form is fine.
fn full_match(pattern: &Regex, name: &str) -> bool {
    Regex::new(&format!("^(?:{})$", pattern.as_str()))
        .map(|anchored| anchored.is_match(name))
        .unwrap_or(false)
}

fn listed(patterns: &[Regex]) -> String {
    patterns
        .iter()
        .map(|p| format!("'{}'", p.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
