//! Layout: the ordered set of named fields plus the structural rules that
//! apply to a whole file.

use crate::builder::LayoutBuilder;
use crate::error::Result;
use crate::field::{Field, FieldRules};
use crate::rule::{FileRule, HeaderRule, RowContext, RowRule, RuleViolation};

/// A named column with its compiled rules.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) field: Field,
    pub(crate) rules: FieldRules,
}

impl Column {
    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field definition.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Compiled rule pipeline.
    pub fn rules(&self) -> &FieldRules {
        &self.rules
    }

    /// True when values of this column must be kept for column rules.
    pub fn has_column_rules(&self) -> bool {
        !self.rules.column.is_empty()
    }

    /// Runs the cell rules on one value, returning every failure in order.
    ///
    /// An empty value is judged by nullability alone.
    pub fn check_cell(&self, value: &str, ctx: &RowContext<'_>) -> Vec<RuleViolation> {
        if value.is_empty() {
            return self
                .rules
                .cell
                .iter()
                .filter(|rule| rule.is_not_null())
                .map(|rule| rule.violation())
                .collect();
        }

        self.rules
            .cell
            .iter()
            .filter_map(|rule| rule.evaluate(value, ctx).err())
            .collect()
    }
}

/// A validated, immutable schema for one kind of file.
///
/// Built with [`LayoutBuilder`] or [`Layout::new`].
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) title: Option<String>,
    pub(crate) columns: Vec<Column>,
    pub(crate) names: Vec<String>,
    pub(crate) row_rules: Vec<RowRule>,
    pub(crate) file_rules: Vec<FileRule>,
}

impl Layout {
    /// Builds a layout from `(name, field)` pairs with no file rules.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabular_core::{Field, Layout};
    ///
    /// let layout = Layout::new([
    ///     ("col1", Field::text(8)),
    ///     ("col2", Field::choice(["x", "y", "z"])),
    /// ])
    /// .unwrap();
    /// assert_eq!(layout.width(), 2);
    /// ```
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Field)>,
        S: Into<String>,
    {
        columns
            .into_iter()
            .fold(LayoutBuilder::new(), |builder, (name, field)| {
                builder.column(name, field)
            })
            .build()
    }

    /// Optional title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Rules applied to a header row.
    pub fn header_rules(&self) -> &'static [HeaderRule] {
        &HeaderRule::ALL
    }

    /// Row width rules.
    pub fn row_rules(&self) -> &[RowRule] {
        &self.row_rules
    }

    /// File-level rules.
    pub fn file_rules(&self) -> &[FileRule] {
        &self.file_rules
    }

    /// True when any column carries column rules.
    pub fn has_column_rules(&self) -> bool {
        self.columns.iter().any(Column::has_column_rules)
    }

    /// Runs the header rules, returning every failure.
    pub fn check_header<S: AsRef<str>>(&self, header: &[S]) -> Vec<RuleViolation> {
        self.header_rules()
            .iter()
            .filter_map(|rule| rule.evaluate(header, &self.names).err())
            .collect()
    }

    /// Runs the row width rules, returning every failure.
    pub fn check_width(&self, width: usize) -> Vec<RuleViolation> {
        self.row_rules
            .iter()
            .filter_map(|rule| rule.evaluate(width).err())
            .collect()
    }

    /// True when every checked cell of the row is empty. Whitespace counts as
    /// content, as it does for `NotNull`.
    pub fn is_blank_row<S: AsRef<str>>(&self, cells: &[S]) -> bool {
        cells.iter().enumerate().all(|(idx, cell)| {
            cell.as_ref().is_empty()
                || self.columns.get(idx).is_some_and(|c| c.field.is_ignored())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::CellRule;
    use pretty_assertions::assert_eq;

    fn layout() -> Layout {
        Layout::new([
            ("col1", Field::text(8)),
            ("col2", Field::choice(["x", "y", "z"])),
            ("col3", Field::integer(1).nullable(true)),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_cell_only_reports_not_null() {
        let layout = layout();
        let choice = &layout.columns()[1];
        let violations = choice.check_cell("", &RowContext::empty());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "NotNull");

        let nullable = &layout.columns()[2];
        assert!(nullable.check_cell("", &RowContext::empty()).is_empty());
    }

    #[test]
    fn test_every_failure_is_reported() {
        let layout = Layout::new([(
            "c",
            Field::text(3).rule(CellRule::ascii_only()),
        )])
        .unwrap();
        let violations = layout.columns()[0].check_cell("äöüß", &RowContext::empty());
        let rules: Vec<_> = violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["MaxChar", "AsciiChar"]);
    }

    #[test]
    fn test_header_and_width_checks() {
        let layout = layout();
        assert!(layout.check_header(&["col1", "col2", "col3"]).is_empty());

        let rules: Vec<_> = layout
            .check_header(&["col2", "col1"])
            .into_iter()
            .map(|v| v.rule)
            .collect();
        assert_eq!(rules, vec!["ColumnOrder", "NoMissing"]);

        assert!(layout.check_width(3).is_empty());
        assert_eq!(layout.check_width(2).len(), 1);
        assert_eq!(layout.check_width(4).len(), 1);
    }

    #[test]
    fn test_blank_rows() {
        let layout = Layout::new([("a", Field::text(1)), ("b", Field::ignore())]).unwrap();
        assert!(layout.is_blank_row(&["", "anything"]));
        assert!(layout.is_blank_row(&["", ""]));
        assert!(!layout.is_blank_row(&[" ", ""]));
        assert!(!layout.is_blank_row(&["x", ""]));
    }
}
