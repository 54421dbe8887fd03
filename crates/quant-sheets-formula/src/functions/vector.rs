//! Vector functions

use quant_sheets_core::unit::UnitTable;
use quant_sheets_core::Value;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator;

fn vector_arg<'a>(func: &str, value: &'a Value) -> FormulaResult<&'a [f64]> {
    value.as_vector().ok_or_else(|| FormulaError::TypeMismatch {
        op: func.to_string(),
        detail: "argument must be a vector".to_string(),
    })
}

/// Euclidean magnitude, unit preserved
pub fn fn_mag(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    let v = vector_arg("mag", &args[0])?;
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    Ok(Value::number_with_unit(norm, args[0].unit()))
}

/// Function form of the `@` operator
pub fn fn_dot(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    evaluator::dot_product(&args[0], &args[1])
}

/// Function form of the 3-element vector product
pub fn fn_cross(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    evaluator::cross_product(&args[0], &args[1])
}
