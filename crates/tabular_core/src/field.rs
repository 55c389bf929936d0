//! Field model.
//!
//! A [`Field`] describes the type and shared parameters of one column. It holds
//! data only; [`Field::build_rules`] turns it into the ordered rule pipeline
//! that both the validator and the digest read.
//!
//! # Example
//!
//! ```rust
//! use tabular_core::Field;
//!
//! let field = Field::text(8).min_length(2).nullable(true);
//! let rules = field.build_rules("code").unwrap();
//!
//! let names: Vec<_> = rules.cell.iter().map(|r| r.name()).collect();
//! assert_eq!(names, vec!["MinChar", "MaxChar"]);
//! ```

use crate::error::{ConfigError, Result};
use crate::rule::{self, CellRule, ColumnRule, Comparison, DuplicatePolicy, Rule};
use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use std::collections::HashSet;

/// Number of decimal places a currency field accepts unless told otherwise.
pub const DEFAULT_DECIMALS: usize = 2;

/// The type of a field and its type-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text bounded by character count
    Text {
        /// Maximum number of characters
        max_length: usize,
        /// Minimum number of characters
        min_length: usize,
    },
    /// Unsigned whole number
    Integer {
        /// Maximum number of digits
        max_digits: usize,
        /// Minimum number of digits
        min_digits: usize,
    },
    /// Digits only, leading zeros allowed (codes, zip numbers)
    Digit {
        /// Maximum number of characters
        max_length: usize,
        /// Minimum number of characters
        min_length: usize,
    },
    /// Signed decimal amount
    Currency {
        /// Maximum number of digits, both sides of the point
        max_digits: usize,
        /// Maximum digits after the point
        decimals: usize,
    },
    /// One value out of a fixed list
    Choice {
        /// Accepted values
        choices: Vec<String>,
        /// Whether membership is case sensitive
        case_sensitive: bool,
    },
    /// Date or date-time in a `strftime` format
    Date {
        /// `strftime` format
        format: String,
        /// Earliest accepted date, written in `format`
        min: Option<String>,
        /// Latest accepted date, written in `format`
        max: Option<String>,
        /// Drop an empty ` 00:00:00` time before parsing
        truncate_time: bool,
    },
    /// Value must fully match a regular expression
    Regex {
        /// Pattern source
        pattern: String,
    },
    /// Column is accepted as-is
    Ignore,
}

/// A typed column definition.
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    nullable: bool,
    unique: Option<DuplicatePolicy>,
    extra: Vec<Rule>,
    description: Option<String>,
}

/// The compiled rule pipeline of a field.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    /// Cell rules, in evaluation order
    pub cell: Vec<CellRule>,
    /// Column rules, in evaluation order
    pub column: Vec<ColumnRule>,
}

impl FieldRules {
    /// True when the field has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.cell.is_empty() && self.column.is_empty()
    }

    /// Explanations of every rule, cell rules first.
    pub fn explanations(&self) -> Vec<&str> {
        self.cell
            .iter()
            .map(CellRule::explanation)
            .chain(self.column.iter().map(ColumnRule::explanation))
            .collect()
    }
}

impl Field {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            nullable: false,
            unique: None,
            extra: Vec::new(),
            description: None,
        }
    }

    /// Text of at most `max_length` characters.
    pub fn text(max_length: usize) -> Self {
        Self::of(FieldKind::Text {
            max_length,
            min_length: 0,
        })
    }

    /// Whole number of at most `max_digits` digits.
    pub fn integer(max_digits: usize) -> Self {
        Self::of(FieldKind::Integer {
            max_digits,
            min_digits: 0,
        })
    }

    /// Digit string of at most `max_length` characters.
    pub fn digit(max_length: usize) -> Self {
        Self::of(FieldKind::Digit {
            max_length,
            min_length: 0,
        })
    }

    /// Signed amount with at most `max_digits` digits and
    /// [`DEFAULT_DECIMALS`] decimal places.
    pub fn currency(max_digits: usize) -> Self {
        Self::of(FieldKind::Currency {
            max_digits,
            decimals: DEFAULT_DECIMALS,
        })
    }

    /// One of `choices`, compared case sensitively.
    pub fn choice<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(FieldKind::Choice {
            choices: choices.into_iter().map(Into::into).collect(),
            case_sensitive: true,
        })
    }

    /// Date in the `strftime` `format`.
    pub fn date(format: impl Into<String>) -> Self {
        Self::of(FieldKind::Date {
            format: format.into(),
            min: None,
            max: None,
            truncate_time: false,
        })
    }

    /// Value must fully match `pattern`.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::of(FieldKind::Regex {
            pattern: pattern.into(),
        })
    }

    /// A column that is never checked.
    pub fn ignore() -> Self {
        Self::of(FieldKind::Ignore)
    }

    /// Minimum length for text and digit fields. Ignored by other kinds.
    pub fn min_length(mut self, length: usize) -> Self {
        if let FieldKind::Text { min_length, .. } | FieldKind::Digit { min_length, .. } =
            &mut self.kind
        {
            *min_length = length;
        }
        self
    }

    /// Minimum digit count for integer fields. Ignored by other kinds.
    pub fn min_digits(mut self, digits: usize) -> Self {
        if let FieldKind::Integer { min_digits, .. } = &mut self.kind {
            *min_digits = digits;
        }
        self
    }

    /// Decimal places for currency fields. Ignored by other kinds.
    pub fn decimals(mut self, places: usize) -> Self {
        if let FieldKind::Currency { decimals, .. } = &mut self.kind {
            *decimals = places;
        }
        self
    }

    /// Makes choice membership case insensitive.
    pub fn case_insensitive(mut self) -> Self {
        if let FieldKind::Choice { case_sensitive, .. } = &mut self.kind {
            *case_sensitive = false;
        }
        self
    }

    /// Earliest accepted date for date fields, inclusive.
    pub fn min_date(mut self, date: impl Into<String>) -> Self {
        if let FieldKind::Date { min, .. } = &mut self.kind {
            *min = Some(date.into());
        }
        self
    }

    /// Latest accepted date for date fields, inclusive.
    pub fn max_date(mut self, date: impl Into<String>) -> Self {
        if let FieldKind::Date { max, .. } = &mut self.kind {
            *max = Some(date.into());
        }
        self
    }

    /// Accept date-times whose time part is ` 00:00:00`.
    pub fn truncate_time(mut self, truncate: bool) -> Self {
        if let FieldKind::Date { truncate_time, .. } = &mut self.kind {
            *truncate_time = truncate;
        }
        self
    }

    /// Allows empty cells.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Non-blank values must be unique, reporting every occurrence.
    pub fn unique(self) -> Self {
        self.unique_with(DuplicatePolicy::default())
    }

    /// Non-blank values must be unique, reporting rows per `policy`.
    pub fn unique_with(mut self, policy: DuplicatePolicy) -> Self {
        self.unique = Some(policy);
        self
    }

    /// Appends an extra rule, evaluated after the built-in ones.
    pub fn rule(mut self, rule: impl Into<Rule>) -> Self {
        self.extra.push(rule.into());
        self
    }

    /// Sets a free-text description for the digest.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Field kind and parameters.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether empty cells are accepted.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// True for [`Field::ignore`].
    pub fn is_ignored(&self) -> bool {
        matches!(self.kind, FieldKind::Ignore)
    }

    /// Description, if one was set.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Display name of the field type.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            FieldKind::Text { .. } => "Text",
            FieldKind::Integer { .. } => "Integer",
            FieldKind::Digit { .. } => "Digit",
            FieldKind::Currency { .. } => "Currency",
            FieldKind::Choice { .. } => "Choice",
            FieldKind::Date { .. } => "Date",
            FieldKind::Regex { .. } => "Regex",
            FieldKind::Ignore => "Ignore",
        }
    }

    /// Human readable parameters, e.g. `Max Length: 8 characters`.
    pub fn descriptors(&self) -> Vec<String> {
        let mut out = Vec::new();
        match &self.kind {
            FieldKind::Text {
                max_length,
                min_length,
            } => {
                out.push(format!("Max Length: {max_length} characters"));
                if *min_length > 0 {
                    out.push(format!("Min Length: {min_length} characters"));
                }
            }
            FieldKind::Integer {
                max_digits,
                min_digits,
            } => {
                out.push(format!("Max Digits: {max_digits}"));
                if *min_digits > 0 {
                    out.push(format!("Min Digits: {min_digits}"));
                }
            }
            FieldKind::Digit {
                max_length,
                min_length,
            } => {
                out.push(format!("Max Length: {max_length} digits"));
                if *min_length > 0 {
                    out.push(format!("Min Length: {min_length} digits"));
                }
            }
            FieldKind::Currency {
                max_digits,
                decimals,
            } => {
                out.push(format!("Max Digits: {max_digits}"));
                out.push(format!("Decimals: {decimals}"));
            }
            FieldKind::Choice {
                choices,
                case_sensitive,
            } => {
                out.push(format!("Choices: {}", choices.join(",")));
                if !case_sensitive {
                    out.push("Case Insensitive".to_string());
                }
            }
            FieldKind::Date {
                format, min, max, ..
            } => {
                out.push(format!("Format: {format}"));
                if let Some(min) = min {
                    out.push(format!("Min Date: {min}"));
                }
                if let Some(max) = max {
                    out.push(format!("Max Date: {max}"));
                }
            }
            FieldKind::Regex { pattern } => out.push(format!("Pattern: {pattern}")),
            FieldKind::Ignore => return out,
        }
        if self.nullable {
            out.push("Nullable".to_string());
        }
        if self.unique.is_some() {
            out.push("Unique".to_string());
        }
        out
    }

    /// Compiles the rule pipeline for the column called `name`.
    ///
    /// Order: nullability, type rules, built-in column rules, extra rules.
    /// Ignored fields compile to an empty pipeline.
    pub fn build_rules(&self, name: &str) -> Result<FieldRules> {
        let mut rules = FieldRules::default();
        if self.is_ignored() {
            return Ok(rules);
        }

        if !self.nullable {
            rules.cell.push(CellRule::not_null());
        }
        rules.cell.extend(self.type_rules(name)?);

        if let Some(policy) = self.unique {
            rules.column.push(ColumnRule::unique_with(policy));
        }

        for rule in &self.extra {
            match rule {
                Rule::Cell(rule) => rules.cell.push(rule.clone()),
                Rule::Column(rule) => rules.column.push(rule.clone()),
            }
        }
        Ok(rules)
    }

    fn type_rules(&self, name: &str) -> Result<Vec<CellRule>> {
        let rules = match &self.kind {
            FieldKind::Text {
                max_length,
                min_length,
            } => {
                check_bounds(name, *min_length, *max_length, "character")?;
                let mut rules = Vec::new();
                if *min_length > 0 {
                    rules.push(CellRule::min_length(*min_length));
                }
                rules.push(CellRule::max_length(*max_length));
                rules
            }
            FieldKind::Integer {
                max_digits,
                min_digits,
            } => {
                check_bounds(name, *min_digits, *max_digits, "digit")?;
                let mut rules = vec![
                    CellRule::integer(),
                    CellRule::no_leading_zero(),
                    CellRule::max_digits(*max_digits),
                ];
                if *min_digits > 0 {
                    rules.push(CellRule::min_digits(*min_digits));
                }
                rules
            }
            FieldKind::Digit {
                max_length,
                min_length,
            } => {
                check_bounds(name, *min_length, *max_length, "character")?;
                let mut rules = vec![CellRule::only_digits(), CellRule::max_length(*max_length)];
                if *min_length > 0 {
                    rules.push(CellRule::min_length(*min_length));
                }
                rules
            }
            FieldKind::Currency {
                max_digits,
                decimals,
            } => {
                check_bounds(name, 0, *max_digits, "digit")?;
                vec![
                    CellRule::currency(*decimals),
                    CellRule::no_leading_zero(),
                    CellRule::max_digits(*max_digits),
                ]
            }
            FieldKind::Choice {
                choices,
                case_sensitive,
            } => {
                check_choices(name, choices, *case_sensitive)?;
                vec![CellRule::choice(choices.iter().cloned(), *case_sensitive)]
            }
            FieldKind::Date {
                format,
                min,
                max,
                truncate_time,
            } => date_rules(name, format, min.as_deref(), max.as_deref(), *truncate_time)?,
            FieldKind::Regex { pattern } => {
                let regex = Regex::new(pattern)
                    .map_err(|e| ConfigError::invalid_regex(name, pattern, e))?;
                vec![CellRule::pattern(regex)]
            }
            FieldKind::Ignore => Vec::new(),
        };
        Ok(rules)
    }
}

fn check_bounds(name: &str, min: usize, max: usize, unit: &'static str) -> Result<()> {
    if max == 0 {
        return Err(ConfigError::ZeroMaximum {
            field: name.to_string(),
            unit,
        });
    }
    if min > max {
        return Err(ConfigError::conflicting(name, min, max));
    }
    Ok(())
}

fn check_choices(name: &str, choices: &[String], case_sensitive: bool) -> Result<()> {
    if choices.is_empty() {
        return Err(ConfigError::EmptyChoices {
            field: name.to_string(),
        });
    }
    let mut seen = HashSet::new();
    for choice in choices {
        let key = if case_sensitive {
            choice.clone()
        } else {
            choice.to_lowercase()
        };
        if !seen.insert(key) {
            return Err(ConfigError::DuplicateChoice {
                field: name.to_string(),
                choice: choice.clone(),
            });
        }
    }
    Ok(())
}

fn date_rules(
    name: &str,
    format: &str,
    min: Option<&str>,
    max: Option<&str>,
    truncate_time: bool,
) -> Result<Vec<CellRule>> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidDateFormat {
            field: name.to_string(),
            format: format.to_string(),
        });
    }

    let invalid = |value: &str| ConfigError::InvalidDate {
        field: name.to_string(),
        value: value.to_string(),
        format: format.to_string(),
    };

    if let (Some(min), Some(max)) = (min, max) {
        let low = rule::parse_date(min, format).map_err(|_| invalid(min))?;
        let high = rule::parse_date(max, format).map_err(|_| invalid(max))?;
        if low > high {
            return Err(ConfigError::conflicting(name, min, max));
        }
    }

    let mut rules = vec![CellRule::date_format(format, truncate_time)];
    if let Some(max) = max {
        rules.push(
            CellRule::date_comparison(Comparison::Lte, max, format, truncate_time)
                .map_err(|_| invalid(max))?,
        );
    }
    if let Some(min) = min {
        rules.push(
            CellRule::date_comparison(Comparison::Gte, min, format, truncate_time)
                .map_err(|_| invalid(min))?,
        );
    }
    Ok(rules)
}
