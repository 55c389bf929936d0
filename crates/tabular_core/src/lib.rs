//! # Tabular Core
//!
//! Core data structures for describing and checking delimited text files.
//!
//! A layout is defined once and drives both validation and documentation:
//! each rule carries a fixed explanation, and that explanation is the only
//! text reports or digests ever show for it.
//!
//! ## Key Concepts
//!
//! - **Rule**: a stateless predicate with a fixed explanation, scoped to a
//!   cell, a column, a row, the header or the whole file
//! - **Field**: a column type (text, integer, choice, date, ...) that compiles
//!   to an ordered rule pipeline
//! - **Layout**: the ordered, named fields of a file plus file-level rules
//!
//! ## Example
//!
//! ```rust
//! use tabular_core::{CellRule, Field, LayoutBuilder, RowContext};
//!
//! let layout = LayoutBuilder::new()
//!     .column("col1", Field::text(8))
//!     .column("col2", Field::choice(["x", "y", "z"]))
//!     .column("col3", Field::integer(1).rule(CellRule::ascii_only()))
//!     .build()
//!     .unwrap();
//!
//! let col2 = &layout.columns()[1];
//! let violations = col2.check_cell("a", &RowContext::empty());
//! assert_eq!(violations[0].explanation, "must be one of ['x','y','z']");
//! ```

pub mod builder;
pub mod error;
pub mod field;
pub mod layout;
pub mod rule;

pub use builder::*;
pub use error::*;
pub use field::*;
pub use layout::*;
pub use rule::*;
