//! Error types for quant-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quant-sheets-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Unit symbol not present in the unit table
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Malformed unit expression
    #[error("Invalid unit expression: {0}")]
    InvalidUnit(String),

    /// Conversion between units with different base dimensions
    #[error("Incompatible units: cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    /// A unit was required but one side of the conversion is empty
    #[error("Unit required but not specified")]
    UnspecifiedUnit,

    /// Row name is not a valid identifier
    #[error("Invalid row name: {0}")]
    InvalidName(String),

    /// Vectors must have exactly 2 or 3 elements
    #[error("Vector must have 2 or 3 elements, got {0}")]
    InvalidVectorLength(usize),
}
