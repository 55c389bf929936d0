//! Serializable layout definitions.
//!
//! These types mirror what a layout file contains. [`LayoutDefinition::build`]
//! turns them into a checked [`Layout`].

use crate::{ParserError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tabular_core::{
    CellRule, Comparison, ConfigError, DuplicatePolicy, Field, FieldKind, Layout, LayoutBuilder,
};

/// A whole layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutDefinition {
    /// Optional title, used by the digest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Columns in file order
    pub columns: Vec<ColumnDefinition>,
    /// File-level rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileDefinition>,
}

/// Field type names accepted in layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    Text,
    /// Unsigned whole number
    Integer,
    /// Digit string
    Digit,
    /// Signed decimal amount
    Currency,
    /// Fixed list of values
    Choice,
    /// Date in a `strftime` format
    Date,
    /// Regular expression
    Regex,
    /// Unchecked column
    Ignore,
}

/// One column of a layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Maximum characters (text, digit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum characters (text, digit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum digits (integer, currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<usize>,
    /// Minimum digits (integer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_digits: Option<usize>,
    /// Decimal places (currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<usize>,
    /// Accepted values (choice)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// Case insensitive membership (choice)
    #[serde(default)]
    pub case_insensitive: bool,
    /// `strftime` format (date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Earliest date (date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    /// Latest date (date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    /// Accept an empty ` 00:00:00` time (date)
    #[serde(default)]
    pub truncate_time: bool,
    /// Regular expression (regex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Empty cells allowed
    #[serde(default)]
    pub nullable: bool,
    /// Values must be unique
    #[serde(default)]
    pub unique: bool,
    /// Which duplicates to report; implies `unique`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<DuplicatePolicy>,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extra rules, appended after the type rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleDefinition>,
}

/// Extra rule attached to a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleDefinition {
    /// Only ASCII characters
    Ascii,
    /// At least `value` characters
    MinLength {
        /// Character count
        value: usize,
    },
    /// At most `value` characters
    MaxLength {
        /// Character count
        value: usize,
    },
    /// Exactly `value` characters
    ExactLength {
        /// Character count
        value: usize,
    },
    /// Whole value matches `value`
    Pattern {
        /// Regular expression
        value: String,
    },
    /// Numeric comparison
    Numeric {
        /// Operator
        op: Comparison,
        /// Bound
        value: f64,
    },
    /// Length comparison
    Length {
        /// Operator
        op: Comparison,
        /// Bound
        value: usize,
    },
    /// Date comparison, in the column's date format
    Date {
        /// Operator
        op: Comparison,
        /// Bound
        value: String,
    },
    /// Greater than another column of the same row
    GreaterThanColumn {
        /// Compared column
        column: String,
    },
    /// Parses as a float
    CanBeFloat,
}

/// File-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDefinition {
    /// Accepted file name patterns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_patterns: Vec<String>,
    /// Minimum number of data rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rows: Option<usize>,
    /// Maximum number of data rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl LayoutDefinition {
    /// Builds and checks the layout.
    pub fn build(&self) -> Result<Layout> {
        let mut builder = LayoutBuilder::new();
        if let Some(title) = &self.title {
            builder = builder.title(title);
        }
        for column in &self.columns {
            builder = builder.column(&column.name, column.to_field()?);
        }
        if let Some(file) = &self.file {
            for pattern in &file.name_patterns {
                builder = builder.file_name_pattern(pattern);
            }
            if let Some(min) = file.min_rows {
                builder = builder.min_rows(min);
            }
            if let Some(max) = file.max_rows {
                builder = builder.max_rows(max);
            }
        }
        Ok(builder.build()?)
    }
}

impl ColumnDefinition {
    fn required<T: Clone>(&self, value: &Option<T>, parameter: &'static str) -> Result<T> {
        value.clone().ok_or_else(|| ParserError::MissingParameter {
            column: self.name.clone(),
            parameter,
        })
    }

    /// Converts the definition into a field.
    pub fn to_field(&self) -> Result<Field> {
        let mut field = match self.field_type {
            FieldType::Text => Field::text(self.required(&self.max_length, "max_length")?)
                .min_length(self.min_length.unwrap_or_default()),
            FieldType::Integer => Field::integer(self.required(&self.max_digits, "max_digits")?)
                .min_digits(self.min_digits.unwrap_or_default()),
            FieldType::Digit => Field::digit(self.required(&self.max_length, "max_length")?)
                .min_length(self.min_length.unwrap_or_default()),
            FieldType::Currency => {
                let field = Field::currency(self.required(&self.max_digits, "max_digits")?);
                match self.decimals {
                    Some(places) => field.decimals(places),
                    None => field,
                }
            }
            FieldType::Choice => {
                let field = Field::choice(self.required(&self.choices, "choices")?);
                if self.case_insensitive {
                    field.case_insensitive()
                } else {
                    field
                }
            }
            FieldType::Date => {
                let mut field = Field::date(self.required(&self.format, "format")?)
                    .truncate_time(self.truncate_time);
                if let Some(min) = &self.min_date {
                    field = field.min_date(min);
                }
                if let Some(max) = &self.max_date {
                    field = field.max_date(max);
                }
                field
            }
            FieldType::Regex => Field::regex(self.required(&self.pattern, "pattern")?),
            FieldType::Ignore => Field::ignore(),
        };

        field = field.nullable(self.nullable);
        if let Some(policy) = self.duplicates {
            field = field.unique_with(policy);
        } else if self.unique {
            field = field.unique();
        }
        if let Some(description) = &self.description {
            field = field.description(description);
        }

        for rule in &self.rules {
            let extra = self.to_rule(rule, field.kind())?;
            field = field.rule(extra);
        }
        Ok(field)
    }

    fn to_rule(&self, rule: &RuleDefinition, kind: &FieldKind) -> Result<CellRule> {
        let rule = match rule {
            RuleDefinition::Ascii => CellRule::ascii_only(),
            RuleDefinition::MinLength { value } => CellRule::min_length(*value),
            RuleDefinition::MaxLength { value } => CellRule::max_length(*value),
            RuleDefinition::ExactLength { value } => CellRule::exact_length(*value),
            RuleDefinition::Pattern { value } => {
                let regex = Regex::new(value)
                    .map_err(|e| ConfigError::invalid_regex(&self.name, value, e))?;
                CellRule::pattern(regex)
            }
            RuleDefinition::Numeric { op, value } => CellRule::numeric(*op, *value),
            RuleDefinition::Length { op, value } => CellRule::length(*op, *value),
            RuleDefinition::Date { op, value } => {
                let FieldKind::Date {
                    format,
                    truncate_time,
                    ..
                } = kind
                else {
                    return Err(ParserError::InvalidRule {
                        column: self.name.clone(),
                        reason: "date rules need a date column".to_string(),
                    });
                };
                CellRule::date_comparison(*op, value, format, *truncate_time).map_err(|_| {
                    ConfigError::InvalidDate {
                        field: self.name.clone(),
                        value: value.clone(),
                        format: format.clone(),
                    }
                })?
            }
            RuleDefinition::GreaterThanColumn { column } => CellRule::greater_than_column(column),
            RuleDefinition::CanBeFloat => CellRule::can_be_float(),
        };
        Ok(rule)
    }
}
