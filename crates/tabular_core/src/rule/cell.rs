//! Cell rules.
//!
//! Cell rules judge a single value. Most only look at the value itself; the
//! cross-column comparison rule also reads a sibling cell of the same row
//! through [`RowContext`].

use super::{Comparison, RuleViolation};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

const EMPTY_TIME: &str = " 00:00:00";

/// Read-only view of the row a cell belongs to.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    names: &'a [String],
    cells: &'a [&'a str],
}

impl<'a> RowContext<'a> {
    /// Creates a context from the layout's column names and the row's cells,
    /// both in layout order.
    pub fn new(names: &'a [String], cells: &'a [&'a str]) -> Self {
        Self { names, cells }
    }

    /// A context with no sibling cells, for evaluating a rule on its own.
    pub fn empty() -> RowContext<'static> {
        RowContext {
            names: &[],
            cells: &[],
        }
    }

    /// Looks up the value of another column in the same row.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.names
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.cells.get(idx).copied())
    }
}

/// User-supplied cell predicate. Returns `true` when the value conforms.
#[derive(Clone)]
pub struct CellPredicate(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl CellPredicate {
    fn call(&self, value: &str) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for CellPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellPredicate(..)")
    }
}

#[derive(Debug, Clone)]
enum CellCheck {
    NotNull,
    ExactChars(usize),
    MinChars(usize),
    MaxChars(usize),
    Ascii,
    Choice { lookup: Vec<String>, case_sensitive: bool },
    OnlyDigits,
    Integer,
    NoLeadingZero,
    MinDigits(usize),
    MaxDigits(usize),
    Currency(usize),
    Float,
    Pattern(Regex),
    Date {
        format: String,
        truncate_time: bool,
    },
    DateCompare {
        op: Comparison,
        bound: NaiveDateTime,
        format: String,
        truncate_time: bool,
    },
    Numeric { op: Comparison, value: f64 },
    Length { op: Comparison, value: usize },
    GreaterThanColumn(String),
    Custom(CellPredicate),
}

/// A rule evaluated independently for each cell of a column.
#[derive(Debug, Clone)]
pub struct CellRule {
    check: CellCheck,
    name: String,
    explanation: String,
}

impl CellRule {
    fn build(check: CellCheck, name: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            check,
            name: name.into(),
            explanation: explanation.into(),
        }
    }

    /// Value must not be the empty string.
    pub fn not_null() -> Self {
        Self::build(CellCheck::NotNull, "NotNull", "cannot be empty/blank")
    }

    /// Value must have exactly `length` characters.
    pub fn exact_length(length: usize) -> Self {
        Self::build(
            CellCheck::ExactChars(length),
            "ExactChar",
            format!("must be exactly {length} characters"),
        )
    }

    /// Value must have at least `length` characters.
    pub fn min_length(length: usize) -> Self {
        Self::build(
            CellCheck::MinChars(length),
            "MinChar",
            format!("must be at least {length} characters"),
        )
    }

    /// Value must have at most `length` characters.
    pub fn max_length(length: usize) -> Self {
        Self::build(
            CellCheck::MaxChars(length),
            "MaxChar",
            format!("must be no more than {length} characters"),
        )
    }

    /// Value must contain only ASCII characters.
    pub fn ascii_only() -> Self {
        Self::build(
            CellCheck::Ascii,
            "AsciiChar",
            "must have only ASCII characters",
        )
    }

    /// Value must be one of `choices`.
    pub fn choice<I, S>(choices: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        let listed = choices
            .iter()
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(",");
        let explanation = if case_sensitive {
            format!("must be one of [{listed}]")
        } else {
            format!("must be one of [{listed}] (case insensitive)")
        };
        let lookup = if case_sensitive {
            choices
        } else {
            choices.iter().map(|c| c.to_lowercase()).collect()
        };

        Self::build(
            CellCheck::Choice {
                lookup,
                case_sensitive,
            },
            "Choice",
            explanation,
        )
    }

    /// Value must consist of the digits 0-9 only. Leading zeros are allowed.
    pub fn only_digits() -> Self {
        Self::build(
            CellCheck::OnlyDigits,
            "OnlyNumbers",
            "must only contain characters 0-9",
        )
    }

    /// Value must be a whole number written with digits only (no sign, no
    /// separators).
    pub fn integer() -> Self {
        Self::build(
            CellCheck::Integer,
            "IntegerFormat",
            "must be a whole number written with the digits 0-9 only",
        )
    }

    /// The integer part of the value must not start with a zero, unless it is
    /// a lone zero. Values without digits pass; format rules report those.
    pub fn no_leading_zero() -> Self {
        Self::build(
            CellCheck::NoLeadingZero,
            "NoLeadingZero",
            "cannot have a leading zero digit",
        )
    }

    /// At least `count` digit characters, ignoring formatting.
    pub fn min_digits(count: usize) -> Self {
        Self::build(
            CellCheck::MinDigits(count),
            "MinDigit",
            format!("must have at least {count} digit characters"),
        )
    }

    /// At most `count` digit characters, ignoring formatting.
    pub fn max_digits(count: usize) -> Self {
        Self::build(
            CellCheck::MaxDigits(count),
            "MaxDigit",
            format!("must have no more than {count} digit characters"),
        )
    }

    /// Signed decimal number with at most `decimals` digits after the point.
    pub fn currency(decimals: usize) -> Self {
        let explanation = if decimals == 0 {
            "must be a whole number with an optional leading sign".to_string()
        } else {
            format!(
                "must be a number with an optional leading sign and no more than {decimals} digits after the decimal point"
            )
        };

        Self::build(CellCheck::Currency(decimals), "CurrencyFormat", explanation)
    }

    /// Value can be read as a floating point number.
    pub fn can_be_float() -> Self {
        Self::build(
            CellCheck::Float,
            "CanBeFloat",
            "can be coerced into a float value",
        )
    }

    /// The whole value must match `regex`.
    pub fn pattern(regex: Regex) -> Self {
        let explanation = format!("must match the pattern '{}'", regex.as_str());
        let anchored = Regex::new(&format!("^(?:{})$", regex.as_str())).unwrap_or(regex);
        Self::build(CellCheck::Pattern(anchored), "Pattern", explanation)
    }

    /// Value must parse as a date (or date-time) in the `strftime` `format`.
    ///
    /// With `truncate_time`, an empty trailing time (` 00:00:00`) is dropped
    /// before parsing.
    pub fn date_format(format: impl Into<String>, truncate_time: bool) -> Self {
        let format = format.into();
        let explanation = format!("must be a date in the format {format}");
        Self::build(
            CellCheck::Date {
                format,
                truncate_time,
            },
            "DateFormat",
            explanation,
        )
    }

    /// Value must be a date that compares to `bound` with `op`.
    ///
    /// `bound` is written in `format`. Values that do not parse fail the rule.
    pub fn date_comparison(
        op: Comparison,
        bound: &str,
        format: impl Into<String>,
        truncate_time: bool,
    ) -> Result<Self, chrono::ParseError> {
        let format = format.into();
        let parsed = parse_date(bound, &format)?;
        Ok(Self::build(
            CellCheck::DateCompare {
                op,
                bound: parsed,
                format,
                truncate_time,
            },
            format!("Date{}", op.suffix()),
            format!("must be {} {bound}", op.language()),
        ))
    }

    /// Value must be numeric and compare to `value` with `op`.
    pub fn numeric(op: Comparison, value: f64) -> Self {
        Self::build(
            CellCheck::Numeric { op, value },
            format!("Numeric{}", op.suffix()),
            format!("must be {} {value}", op.language()),
        )
    }

    /// Character length of the value must compare to `value` with `op`.
    pub fn length(op: Comparison, value: usize) -> Self {
        Self::build(
            CellCheck::Length { op, value },
            format!("Length{}", op.suffix()),
            format!("length must be {} {value}", op.language()),
        )
    }

    /// Value must be greater than the value of `column` in the same row.
    ///
    /// Both sides are compared as numbers when both parse, as text otherwise.
    /// An empty comparison cell is not judged.
    pub fn greater_than_column(column: impl Into<String>) -> Self {
        let column = column.into();
        let explanation = format!("must be greater than column '{column}'");
        Self::build(
            CellCheck::GreaterThanColumn(column),
            "GreaterThanColumn",
            explanation,
        )
    }

    /// A caller-defined rule: `predicate` returns `true` for conforming values
    /// and `explanation` states the expectation.
    pub fn custom<F>(explanation: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::build(
            CellCheck::Custom(CellPredicate(Arc::new(predicate))),
            "Custom",
            explanation,
        )
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

    /// True for the nullability rule.
    pub fn is_not_null(&self) -> bool {
        matches!(self.check, CellCheck::NotNull)
    }

    /// Column this rule reads from the row context, if any.
    pub fn compared_column(&self) -> Option<&str> {
        match &self.check {
            CellCheck::GreaterThanColumn(column) => Some(column),
            _ => None,
        }
    }

    /// Evaluates the rule against one value.
    pub fn evaluate(&self, value: &str, ctx: &RowContext<'_>) -> Result<(), RuleViolation> {
        if self.passes(value, ctx) {
            Ok(())
        } else {
            Err(self.violation())
        }
    }

    /// The violation this rule reports.
    pub fn violation(&self) -> RuleViolation {
        RuleViolation::new(&self.name, &self.explanation)
    }

    fn passes(&self, value: &str, ctx: &RowContext<'_>) -> bool {
        match &self.check {
            CellCheck::NotNull => !value.is_empty(),
            CellCheck::ExactChars(n) => value.chars().count() == *n,
            CellCheck::MinChars(n) => value.chars().count() >= *n,
            CellCheck::MaxChars(n) => value.chars().count() <= *n,
            CellCheck::Ascii => value.is_ascii(),
            CellCheck::Choice {
                lookup,
                case_sensitive,
            } => {
                if *case_sensitive {
                    lookup.iter().any(|c| c == value)
                } else {
                    let lowered = value.to_lowercase();
                    lookup.iter().any(|c| *c == lowered)
                }
            }
            CellCheck::OnlyDigits | CellCheck::Integer => {
                !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
            }
            CellCheck::NoLeadingZero => no_leading_zero(value),
            CellCheck::MinDigits(n) => digit_count(value) >= *n,
            CellCheck::MaxDigits(n) => digit_count(value) <= *n,
            CellCheck::Currency(decimals) => is_currency(value, *decimals),
            CellCheck::Pattern(regex) => regex.is_match(value),
            CellCheck::Float => value.parse::<f64>().is_ok(),
            CellCheck::Date {
                format,
                truncate_time,
            } => parse_date(strip_time(value, *truncate_time), format).is_ok(),
            CellCheck::DateCompare {
                op,
                bound,
                format,
                truncate_time,
            } => parse_date(strip_time(value, *truncate_time), format)
                .map(|date| op.holds(date, *bound))
                .unwrap_or(false),
            CellCheck::Numeric { op, value: bound } => value
                .parse::<f64>()
                .map(|n| op.holds(n, *bound))
                .unwrap_or(false),
            CellCheck::Length { op, value: bound } => op.holds(value.chars().count(), *bound),
            CellCheck::GreaterThanColumn(column) => match ctx.get(column) {
                Some("") => true,
                Some(other) => greater_than(value, other),
                None => false,
            },
            CellCheck::Custom(predicate) => predicate.call(value),
        }
    }
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

fn no_leading_zero(value: &str) -> bool {
    let integer_part = value.split('.').next().unwrap_or_default();
    let digits: String = integer_part.chars().filter(char::is_ascii_digit).collect();
    digits.len() <= 1 || !digits.starts_with('0')
}

fn is_currency(value: &str, decimals: usize) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match unsigned.split_once('.') {
        None => all_digits(unsigned),
        Some((whole, fraction)) => {
            all_digits(whole) && all_digits(fraction) && fraction.len() <= decimals
        }
    }
}

fn greater_than(value: &str, other: &str) -> bool {
    match (value.parse::<f64>(), other.parse::<f64>()) {
        (Ok(left), Ok(right)) => left > right,
        _ => value > other,
    }
}

fn strip_time(value: &str, truncate_time: bool) -> &str {
    if truncate_time {
        value.strip_suffix(EMPTY_TIME).unwrap_or(value)
    } else {
        value
    }
}

/// Parses a date or date-time under a `strftime` format. Date-only formats
/// resolve to midnight.
pub(crate) fn parse_date(value: &str, format: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, format).or_else(|_| {
        NaiveDate::parse_from_str(value, format).map(|date| date.and_time(NaiveTime::MIN))
    })
}
