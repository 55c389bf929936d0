//! # Tabular Validator
//!
//! Validation engine for tabular layouts. This crate scans rows against a
//! [`tabular_core::Layout`] and collects every failure into an [`ErrorTree`]:
//!
//! - Header rules (column order, missing, extra and duplicate names)
//! - Row width checks
//! - Cell rules for every cell, in pipeline order
//! - Column rules (uniqueness, custom) once all rows are seen
//! - File rules (file name patterns, row-count bounds)
//!
//! The tree only holds coordinates and fixed rule explanations, so its text
//! and JSON renderings never reveal the data that was checked. The same rule
//! explanations feed the layout [`digest`].
//!
//! ## Example
//!
//! ```rust
//! use tabular_core::{Field, Layout};
//! use tabular_validator::{DataSet, Validator};
//!
//! let layout = Layout::new([
//!     ("col1", Field::text(8)),
//!     ("col2", Field::choice(["x", "y", "z"])),
//!     ("col3", Field::integer(1)),
//! ])
//! .unwrap();
//!
//! let mut dataset = DataSet::empty();
//! dataset.add_row(["abc", "x", "1"]);
//! dataset.add_row(["abc", "x"]);
//!
//! let tree = Validator::new(&layout).validate(&dataset);
//! if !tree.is_empty() {
//!     println!("{tree}");
//! }
//! ```

mod dataset;
mod digest;
mod engine;
mod error;
mod options;
mod run;
mod tree;

pub use dataset::*;
pub use digest::*;
pub use engine::*;
pub use error::*;
pub use options::*;
pub use run::ValidationRun;
pub use tree::*;
