//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error, with the byte position of the offending token
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Variable not resolvable through the lookup
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    /// Function name not present in the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Operator name not present in the dispatch table
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Operand payload shape not accepted by the operator
    #[error("Type mismatch in {op}: {detail}")]
    TypeMismatch { op: String, detail: String },

    /// Operand dimensions not compatible for the operator
    #[error("Dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: String,
        left: String,
        right: String,
    },

    /// Vector index outside the valid range
    #[error("Index {index} out of bounds for vector of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    /// Argument outside the function's mathematical domain
    #[error("Domain error: {0}")]
    Domain(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Unit resolution or conversion failure
    #[error(transparent)]
    Unit(#[from] quant_sheets_core::Error),
}

impl FormulaError {
    /// Shorthand for a syntax error
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        FormulaError::Syntax {
            position,
            message: message.into(),
        }
    }
}
