//! # quant-sheets-core
//!
//! Core data types for the quant-sheets calculation engine:
//! - [`Value`] and [`Payload`] - tagged values carrying an optional unit
//! - [`unit`] - unit-dimension algebra and the [`unit::UnitTable`] seam
//! - [`NamedRow`], [`RowStore`] - the externally owned row state the
//!   engine reads and writes
//!
//! ## Example
//!
//! ```rust
//! use quant_sheets_core::unit::SiUnitTable;
//! use quant_sheets_core::Value;
//!
//! let height = Value::number_with_unit(3.0, "cm");
//! let (in_meters, factor) = height.as_given_unit("m", SiUnitTable::global()).unwrap();
//! assert_eq!(in_meters.as_number(), Some(0.03));
//! assert_eq!(factor, 0.01);
//! ```

pub mod error;
pub mod row;
pub mod unit;
pub mod value;

// Re-exports for convenience
pub use error::{Error, Result};
pub use row::{CellResult, MemoryRowStore, NamedRow, RowStore};
pub use value::{Payload, Value};
