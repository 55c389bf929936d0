//! Parser for declarative layout definitions (YAML/TOML formats).
//!
//! This module reads layout files into [`LayoutDefinition`] values and builds
//! them into checked [`Layout`]s.
//!
//! # Example
//!
//! ```rust
//! use tabular_parser::parse_yaml;
//!
//! let yaml = r#"
//! title: Daily orders
//! columns:
//!   - name: order_id
//!     type: integer
//!     max_digits: 10
//!     unique: true
//!   - name: status
//!     type: choice
//!     choices: [open, closed]
//! "#;
//!
//! let layout = parse_yaml(yaml).expect("Failed to parse layout");
//! assert_eq!(layout.width(), 2);
//! ```

mod definition;

pub use definition::*;

use std::path::Path;
use tabular_core::{ConfigError, Layout};
use thiserror::Error;

/// Errors that can occur during layout parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// A field type is missing one of its required parameters
    #[error("Column '{column}' is missing required parameter '{parameter}'")]
    MissingParameter {
        /// Column name
        column: String,
        /// Parameter name
        parameter: &'static str,
    },

    /// An extra rule does not fit its column
    #[error("Invalid rule for column '{column}': {reason}")]
    InvalidRule {
        /// Column name
        column: String,
        /// What is wrong
        reason: String,
    },

    /// The definition parsed but does not describe a valid layout
    #[error("Invalid layout: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported layout file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse a layout definition from a YAML string, without building it.
pub fn parse_yaml_definition(content: &str) -> Result<LayoutDefinition> {
    let definition: LayoutDefinition = serde_yaml_ng::from_str(content)?;
    Ok(definition)
}

/// Parse a layout definition from a TOML string, without building it.
pub fn parse_toml_definition(content: &str) -> Result<LayoutDefinition> {
    let definition: LayoutDefinition =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(definition)
}

/// Parse and build a layout from a YAML string.
pub fn parse_yaml(content: &str) -> Result<Layout> {
    parse_yaml_definition(content)?.build()
}

/// Parse and build a layout from a TOML string.
///
/// # Example
///
/// ```rust
/// use tabular_parser::parse_toml;
///
/// let toml = r#"
/// [[columns]]
/// name = "code"
/// type = "text"
/// max_length = 8
///
/// [file]
/// max_rows = 100
/// "#;
///
/// let layout = parse_toml(toml).unwrap();
/// assert_eq!(layout.column_names(), &["code".to_string()]);
/// ```
pub fn parse_toml(content: &str) -> Result<Layout> {
    parse_toml_definition(content)?.build()
}

/// Detect the layout format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `LayoutFormat::Yaml`
/// * `.toml` → `LayoutFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<LayoutFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(LayoutFormat::Yaml),
        "toml" => Ok(LayoutFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a layout definition from a file with automatic format detection.
pub fn parse_definition_file(path: &Path) -> Result<LayoutDefinition> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        LayoutFormat::Yaml => parse_yaml_definition(&content),
        LayoutFormat::Toml => parse_toml_definition(&content),
    }
}

/// Parse and build a layout from a file with automatic format detection.
///
/// ```no_run
/// use tabular_parser::parse_file;
/// use std::path::Path;
///
/// let layout = parse_file(Path::new("layouts/orders.yml")).unwrap();
/// println!("Loaded layout with {} columns", layout.width());
/// ```
pub fn parse_file(path: &Path) -> Result<Layout> {
    parse_definition_file(path)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tabular_core::{Comparison, DuplicatePolicy, RowContext};

    const FULL_YAML: &str = r#"
title: Orders
columns:
  - name: order_id
    type: integer
    max_digits: 6
    duplicates: repeats_only
  - name: code
    type: text
    max_length: 8
    min_length: 2
    rules:
      - rule: ascii
      - rule: pattern
        value: "[A-Z0-9-]+"
  - name: status
    type: choice
    choices: [open, closed]
    case_insensitive: true
  - name: amount
    type: currency
    max_digits: 10
    decimals: 3
    nullable: true
    rules:
      - rule: numeric
        op: gte
        value: 0
  - name: ordered
    type: date
    format: "%Y-%m-%d"
    min_date: "2020-01-01"
    rules:
      - rule: date
        op: lt
        value: "2030-01-01"
  - name: shipped
    type: date
    format: "%Y-%m-%d"
    nullable: true
    rules:
      - rule: greater_than_column
        column: ordered
  - name: zip
    type: digit
    max_length: 5
    min_length: 5
  - name: sku
    type: regex
    pattern: "[a-z]{3}"
  - name: notes
    type: ignore
file:
  name_patterns:
    - 'orders_\d{8}\.csv'
  min_rows: 1
  max_rows: 1000
"#;

    fn rule_names(layout: &Layout, column: usize) -> Vec<String> {
        layout.columns()[column]
            .rules()
            .cell
            .iter()
            .map(|r| r.name().to_string())
            .chain(
                layout.columns()[column]
                    .rules()
                    .column
                    .iter()
                    .map(|r| r.name().to_string()),
            )
            .collect()
    }

    #[test]
    fn test_parse_full_yaml() {
        let layout = parse_yaml(FULL_YAML).expect("Failed to parse full layout");

        assert_eq!(layout.title(), Some("Orders"));
        assert_eq!(layout.width(), 9);
        assert_eq!(
            rule_names(&layout, 0),
            vec!["NotNull", "IntegerFormat", "NoLeadingZero", "MaxDigit", "Unique"]
        );
        assert_eq!(
            rule_names(&layout, 1),
            vec!["NotNull", "MinChar", "MaxChar", "AsciiChar", "Pattern"]
        );
        assert_eq!(
            rule_names(&layout, 3),
            vec!["CurrencyFormat", "NoLeadingZero", "MaxDigit", "NumericGTE"]
        );
        assert_eq!(
            rule_names(&layout, 4),
            vec!["NotNull", "DateFormat", "DateGTE", "DateLT"]
        );
        assert_eq!(rule_names(&layout, 5), vec!["DateFormat", "GreaterThanColumn"]);
        assert!(layout.columns()[8].rules().is_empty());
        assert_eq!(layout.file_rules().len(), 3);

        let status = &layout.columns()[2];
        assert!(status.check_cell("OPEN", &RowContext::empty()).is_empty());
    }

    #[test]
    fn test_parse_definition_keeps_parameters() {
        let definition = parse_yaml_definition(FULL_YAML).unwrap();

        let order_id = &definition.columns[0];
        assert_eq!(order_id.field_type, FieldType::Integer);
        assert_eq!(order_id.duplicates, Some(DuplicatePolicy::RepeatsOnly));

        assert_eq!(
            definition.columns[3].rules,
            vec![RuleDefinition::Numeric {
                op: Comparison::Gte,
                value: 0.0
            }]
        );
        assert_eq!(definition.file.unwrap().max_rows, Some(1000));
    }

    #[test]
    fn test_parse_valid_toml() {
        let toml = r#"
title = "Codes"

[[columns]]
name = "code"
type = "digit"
max_length = 4
unique = true

[[columns]]
name = "label"
type = "text"
max_length = 20
nullable = true

[[columns.rules]]
rule = "length"
op = "lte"
value = 10

[file]
name_patterns = ['codes_.*\.csv', '.*\.txt']
"#;

        let layout = parse_toml(toml).expect("Failed to parse valid TOML");

        assert_eq!(layout.title(), Some("Codes"));
        assert_eq!(
            rule_names(&layout, 0),
            vec!["NotNull", "OnlyNumbers", "MaxChar", "Unique"]
        );
        assert_eq!(rule_names(&layout, 1), vec!["MaxChar", "LengthLTE"]);
        let file_rules: Vec<_> = layout.file_rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            file_rules,
            vec!["FileNamePattern", "FileNameMatchesOnePattern"]
        );
    }

    #[test]
    fn test_missing_parameter() {
        let yaml = r#"
columns:
  - name: code
    type: text
"#;
        let err = parse_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            ParserError::MissingParameter {
                parameter: "max_length",
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Column 'code' is missing required parameter 'max_length'"
        );
    }

    #[test]
    fn test_date_rule_needs_date_column() {
        let yaml = r#"
columns:
  - name: code
    type: text
    max_length: 3
    rules:
      - rule: date
        op: gt
        value: "2020-01-01"
"#;
        assert!(matches!(
            parse_yaml(yaml).unwrap_err(),
            ParserError::InvalidRule { .. }
        ));
    }

    #[test]
    fn test_invalid_layout_is_config_error() {
        let yaml = r#"
columns:
  - name: status
    type: choice
    choices: [a, b, a]
"#;
        assert!(matches!(
            parse_yaml(yaml).unwrap_err(),
            ParserError::Config(ConfigError::DuplicateChoice { .. })
        ));

        let yaml = r#"
columns:
  - name: end
    type: integer
    max_digits: 3
    rules:
      - rule: greater_than_column
        column: start
"#;
        assert!(matches!(
            parse_yaml(yaml).unwrap_err(),
            ParserError::Config(ConfigError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let yaml = r#"
columns:
  - name: code
    type: text
    max_lenght: 3
"#;
        assert!(matches!(
            parse_yaml(yaml).unwrap_err(),
            ParserError::YamlError(_)
        ));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let invalid_toml = r#"
title = "x"
[[[invalid syntax
"#;

        let result = parse_toml(invalid_toml);
        assert!(matches!(result.unwrap_err(), ParserError::TomlError(_)));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("layout.yaml")).unwrap(),
            LayoutFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("layout.YML")).unwrap(),
            LayoutFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("layout.toml")).unwrap(),
            LayoutFormat::Toml
        );
        assert!(matches!(
            detect_format(Path::new("layout.json")).unwrap_err(),
            ParserError::UnsupportedFormat(_)
        ));
        assert!(matches!(
            detect_format(Path::new("layout")).unwrap_err(),
            ParserError::InvalidExtension
        ));
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(FULL_YAML.as_bytes()).unwrap();

        let layout = parse_file(file.path()).expect("Failed to parse layout file");
        assert_eq!(layout.width(), 9);
    }

    #[test]
    fn test_round_trip_yaml() {
        let definition = parse_yaml_definition(FULL_YAML).unwrap();
        let yaml = serde_yaml_ng::to_string(&definition).expect("Failed to serialize");
        let parsed = parse_yaml_definition(&yaml).expect("Failed to parse");
        assert_eq!(parsed, definition);
    }
}
