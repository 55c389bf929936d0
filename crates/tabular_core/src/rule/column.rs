//! Column rules.
//!
//! These rules need every value of one column before they can decide, the
//! uniqueness rule being the obvious case. A layout with column rules keeps
//! the values of those columns for the whole scan; columns without them are
//! never buffered.

use super::RuleViolation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Which rows a duplicate-value rule reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Every row holding a value that occurs more than once
    #[default]
    EveryOccurrence,
    /// Only the second and later occurrences of a value
    RepeatsOnly,
}

/// A failed column rule.
///
/// `positions` are 0-based indexes into the evaluated value list; an empty list
/// means the column failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnViolation {
    /// Rule kind name and explanation
    pub violation: RuleViolation,
    /// Offending entries, ascending
    pub positions: Vec<usize>,
}

type WholeColumn = dyn Fn(&[String]) -> bool + Send + Sync;
type OffendingRows = dyn Fn(&[String]) -> Vec<usize> + Send + Sync;

#[derive(Clone)]
enum ColumnCheck {
    Unique(DuplicatePolicy),
    Custom(Arc<WholeColumn>),
    CustomRows(Arc<OffendingRows>),
}

impl fmt::Debug for ColumnCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnCheck::Unique(policy) => f.debug_tuple("Unique").field(policy).finish(),
            ColumnCheck::Custom(_) => f.write_str("Custom(..)"),
            ColumnCheck::CustomRows(_) => f.write_str("CustomRows(..)"),
        }
    }
}

/// A rule evaluated once over all values of a column, in row order.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    check: ColumnCheck,
    name: String,
    explanation: String,
}

impl ColumnRule {
    /// Non-blank values must be distinct; reports every occurrence.
    pub fn unique() -> Self {
        Self::unique_with(DuplicatePolicy::default())
    }

    /// Non-blank values must be distinct, reporting rows per `policy`.
    pub fn unique_with(policy: DuplicatePolicy) -> Self {
        Self {
            check: ColumnCheck::Unique(policy),
            name: "Unique".to_string(),
            explanation: "values must be unique".to_string(),
        }
    }

    /// A caller-defined rule over the whole column. `predicate` returns
    /// `true` when the column conforms; failures are reported for the column,
    /// not for individual rows.
    pub fn custom<F>(explanation: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        Self {
            check: ColumnCheck::Custom(Arc::new(predicate)),
            name: "Custom".to_string(),
            explanation: explanation.into(),
        }
    }

    /// A caller-defined rule that names the offending entries. `offenders`
    /// returns 0-based positions into the value list; an empty list passes.
    pub fn custom_rows<F>(explanation: impl Into<String>, offenders: F) -> Self
    where
        F: Fn(&[String]) -> Vec<usize> + Send + Sync + 'static,
    {
        Self {
            check: ColumnCheck::CustomRows(Arc::new(offenders)),
            name: "Custom".to_string(),
            explanation: explanation.into(),
        }
    }

    /// Overrides the kind name shown in reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rule kind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed explanation of the expectation.
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Evaluates the rule over the ordered values of one column.
    pub fn evaluate(&self, values: &[String]) -> Result<(), ColumnViolation> {
        let positions = match &self.check {
            ColumnCheck::Unique(policy) => duplicate_positions(values, *policy),
            ColumnCheck::CustomRows(offenders) => {
                let mut positions: Vec<usize> = offenders(values)
                    .into_iter()
                    .filter(|&pos| pos < values.len())
                    .collect();
                positions.sort_unstable();
                positions.dedup();
                positions
            }
            ColumnCheck::Custom(predicate) => {
                if predicate(values) {
                    return Ok(());
                }
                return Err(self.violation(Vec::new()));
            }
        };

        if positions.is_empty() {
            Ok(())
        } else {
            Err(self.violation(positions))
        }
    }

    fn violation(&self, positions: Vec<usize>) -> ColumnViolation {
        ColumnViolation {
            violation: RuleViolation::new(&self.name, &self.explanation),
            positions,
        }
    }
}

fn duplicate_positions(values: &[String], policy: DuplicatePolicy) -> Vec<usize> {
    let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
    for (pos, value) in values.iter().enumerate() {
        if !value.is_empty() {
            seen.entry(value.as_str()).or_default().push(pos);
        }
    }

    let mut positions: Vec<usize> = seen
        .into_values()
        .filter(|found| found.len() > 1)
        .flat_map(|found| match policy {
            DuplicatePolicy::EveryOccurrence => found,
            DuplicatePolicy::RepeatsOnly => found[1..].to_vec(),
        })
        .collect();
    positions.sort_unstable();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_unique_passes_distinct_and_blank_values() {
        let rule = ColumnRule::unique();
        assert!(rule.evaluate(&values(&["1", "2", "3"])).is_ok());
        assert!(rule.evaluate(&values(&["", "", "1"])).is_ok());
        assert!(rule.evaluate(&[]).is_ok());
    }

    #[test]
    fn test_unique_reports_every_occurrence() {
        let rule = ColumnRule::unique();
        let err = rule
            .evaluate(&values(&["a", "b", "a", "c", "b", "a"]))
            .unwrap_err();
        assert_eq!(err.positions, vec![0, 1, 2, 4, 5]);
        assert_eq!(err.violation.explanation, "values must be unique");
    }

    #[test]
    fn test_unique_reports_repeats_only() {
        let rule = ColumnRule::unique_with(DuplicatePolicy::RepeatsOnly);
        let err = rule
            .evaluate(&values(&["a", "b", "a", "c", "b", "a"]))
            .unwrap_err();
        assert_eq!(err.positions, vec![2, 4, 5]);
    }

    #[test]
    fn test_custom_whole_column() {
        let rule = ColumnRule::custom("must contain at least one 'Y'", |vals| {
            vals.iter().any(|v| v == "Y")
        });
        assert!(rule.evaluate(&values(&["N", "Y"])).is_ok());

        let err = rule.evaluate(&values(&["N", "N"])).unwrap_err();
        assert!(err.positions.is_empty());
        assert_eq!(err.violation.rule, "Custom");
    }

    #[test]
    fn test_custom_rows_are_sorted_and_bounded() {
        let rule = ColumnRule::custom_rows("must be ascending", |vals| {
            let mut bad = vec![99];
            for idx in (1..vals.len()).rev() {
                if vals[idx] < vals[idx - 1] {
                    bad.push(idx);
                }
            }
            bad
        })
        .with_name("Ascending");

        let err = rule.evaluate(&values(&["1", "3", "2", "4", "0"])).unwrap_err();
        assert_eq!(err.positions, vec![2, 4]);
        assert_eq!(err.violation.rule, "Ascending");
    }
}
