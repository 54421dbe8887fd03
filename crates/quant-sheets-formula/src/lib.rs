//! # quant-sheets-formula
//!
//! Formula layer for quant-sheets.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Unit-aware evaluation (AST → [`quant_sheets_core::Value`])
//! - The built-in operator and function library
//! - Dependency analysis with cycle tolerance
//!
//! ## Example
//!
//! ```rust,ignore
//! use quant_sheets_formula::{evaluate, parse, EmptyLookup};
//! use quant_sheets_core::unit::SiUnitTable;
//!
//! let ast = parse("2 * pi * 1.5")?;
//! let value = evaluate(&ast, &EmptyLookup, SiUnitTable::global())?;
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use dependency::{build_dependency_tree, dependency_order, referenced_names, DepKind, DepNode};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{builtin_constant, evaluate, is_builtin_constant, EmptyLookup, Lookup};
pub use parser::parse;
