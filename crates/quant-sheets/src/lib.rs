//! # quant-sheets
//!
//! The calculation core of a unit-aware spreadsheet with named rows:
//! formula parsing, a tagged value model with a unit-dimension algebra,
//! unit-aware evaluation, cycle-tolerant dependency ordering, and a
//! recalculation driver that isolates per-cell failures.
//!
//! Rendering, editing gestures, persistence, and recalculation triggers
//! live outside this core; callers drive it through [`RowStore`] and
//! [`recalculate_all`].
//!
//! ## Example
//!
//! ```rust
//! use quant_sheets::prelude::*;
//!
//! let mut store = MemoryRowStore::new(1);
//! store.insert(
//!     NamedRow::new("h", 1).unwrap()
//!         .with_unit("cm")
//!         .with_value(0, Value::number_with_unit(3.0, "cm")),
//! );
//! store.insert(
//!     NamedRow::new("rad", 1).unwrap()
//!         .with_unit("cm")
//!         .with_value(0, Value::number_with_unit(2.5, "cm")),
//! );
//! store.insert(
//!     NamedRow::new("vol", 1).unwrap()
//!         .with_formula("h * 3.14 * rad * rad"),
//! );
//!
//! let stats = recalculate_all(&mut store);
//! assert_eq!(stats.errors, 0);
//!
//! let vol = store.get("vol").unwrap();
//! assert_eq!(vol.unit, "cm^3");
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{recalculate_all, recalculate_column, RecalcStats, Recalculator};

// Re-export core types
pub use quant_sheets_core::{
    unit, CellResult, Error, MemoryRowStore, NamedRow, Payload, Result, RowStore, Value,
};

// Re-export formula types
pub use quant_sheets_formula::{
    build_dependency_tree, builtin_constant, dependency_order, evaluate, parse, DepKind, DepNode,
    EmptyLookup, Expr, FormulaError, FormulaResult, Lookup,
};
