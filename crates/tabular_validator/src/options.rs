//! Options controlling a validation run.

/// How a file is scanned.
///
/// # Example
///
/// ```rust
/// use tabular_validator::ValidationOptions;
///
/// let options = ValidationOptions::new().empty_row_ok(true).max_errors(100);
/// assert_eq!(options.max_errors, Some(100));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Do not apply header rules to the header row
    pub skip_header: bool,
    /// Skip rows whose checked cells are all blank
    pub empty_row_ok: bool,
    /// Stop after this many rows with errors; `Some(0)` means no limit
    pub max_errors: Option<usize>,
}

impl ValidationOptions {
    /// Default options: check the header, judge every row, no error limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether header rules are skipped.
    pub fn skip_header(mut self, skip: bool) -> Self {
        self.skip_header = skip;
        self
    }

    /// Sets whether blank rows are skipped.
    pub fn empty_row_ok(mut self, ok: bool) -> Self {
        self.empty_row_ok = ok;
        self
    }

    /// Halts the scan after `limit` rows with errors. A limit of 0 disables
    /// halting.
    pub fn max_errors(mut self, limit: usize) -> Self {
        self.max_errors = Some(limit);
        self
    }
}
