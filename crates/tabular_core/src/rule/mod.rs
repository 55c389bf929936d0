//! Rule model.
//!
//! A rule is a stateless predicate plus a fixed explanation. The explanation is
//! computed when the rule is built and is the only text a failing rule ever
//! produces, so reports and documentation cannot leak the data that was checked.
//!
//! Rules come in scopes:
//! - [`CellRule`]: one value at a time, optionally peeking at sibling cells
//! - [`ColumnRule`]: the whole ordered list of values of one column
//! - [`RowRule`], [`HeaderRule`], [`FileRule`]: structural rules owned by a layout

mod cell;
mod column;
mod table;

pub use cell::*;
pub use column::*;
pub use table::*;

pub(crate) use cell::parse_date;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A failed rule: the rule's kind name and its fixed explanation.
///
/// Never holds the value that was evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleViolation {
    /// Rule kind, e.g. `MaxDigit`
    pub rule: String,
    /// Static explanation of the expectation
    pub explanation: String,
}

impl RuleViolation {
    /// Creates a new violation.
    pub fn new(rule: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            explanation: explanation.into(),
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.explanation)
    }
}

/// Comparison operator shared by the numeric, length and date rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Strictly greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Equal to
    Eq,
    /// Less than or equal to
    Lte,
    /// Strictly less than
    Lt,
}

impl Comparison {
    /// Applies the operator to two ordered values.
    pub fn holds<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            Comparison::Gt => left > right,
            Comparison::Gte => left >= right,
            Comparison::Eq => left == right,
            Comparison::Lte => left <= right,
            Comparison::Lt => left < right,
        }
    }

    /// Wording used in explanations.
    pub fn language(self) -> &'static str {
        match self {
            Comparison::Gt => "greater than",
            Comparison::Gte => "greater than or equal to",
            Comparison::Eq => "equal to",
            Comparison::Lte => "less than or equal to",
            Comparison::Lt => "less than",
        }
    }

    /// Short suffix used in rule kind names (`NumericGTE`, `DateLT`, ...).
    pub fn suffix(self) -> &'static str {
        match self {
            Comparison::Gt => "GT",
            Comparison::Gte => "GTE",
            Comparison::Eq => "ET",
            Comparison::Lte => "LTE",
            Comparison::Lt => "LT",
        }
    }
}

/// Either scope of data rule, so a field can take extra rules of both kinds
/// through one list.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Evaluated once per cell
    Cell(CellRule),
    /// Evaluated once per column
    Column(ColumnRule),
}

impl Rule {
    /// Rule kind name.
    pub fn name(&self) -> &str {
        match self {
            Rule::Cell(rule) => rule.name(),
            Rule::Column(rule) => rule.name(),
        }
    }

    /// Fixed explanation.
    pub fn explanation(&self) -> &str {
        match self {
            Rule::Cell(rule) => rule.explanation(),
            Rule::Column(rule) => rule.explanation(),
        }
    }
}

impl From<CellRule> for Rule {
    fn from(rule: CellRule) -> Self {
        Rule::Cell(rule)
    }
}

impl From<ColumnRule> for Rule {
    fn from(rule: ColumnRule) -> Self {
        Rule::Column(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_holds() {
        assert!(Comparison::Gt.holds(2, 1));
        assert!(!Comparison::Gt.holds(1, 1));
        assert!(Comparison::Gte.holds(1, 1));
        assert!(Comparison::Eq.holds("a", "a"));
        assert!(Comparison::Lte.holds(1.0, 1.5));
        assert!(!Comparison::Lt.holds(3, 2));
    }

    #[test]
    fn test_rule_wraps_both_scopes() {
        let cell: Rule = CellRule::ascii_only().into();
        let column: Rule = ColumnRule::unique().into();

        assert_eq!(cell.name(), "AsciiChar");
        assert_eq!(column.name(), "Unique");
        assert_eq!(column.explanation(), "values must be unique");
    }

    #[test]
    fn test_violation_display() {
        let violation = RuleViolation::new("NotNull", "cannot be empty/blank");
        assert_eq!(violation.to_string(), "NotNull: cannot be empty/blank");
    }
}
