//! Convenience re-exports for typical callers
//!
//! ```rust
//! use quant_sheets::prelude::*;
//! ```

pub use crate::calculation::{recalculate_all, recalculate_column, RecalcStats, Recalculator};
pub use quant_sheets_core::unit::{Dimension, SiUnitTable, UnitTable};
pub use quant_sheets_core::{CellResult, MemoryRowStore, NamedRow, Payload, RowStore, Value};
pub use quant_sheets_formula::{evaluate, parse, FormulaError, Lookup};
