//! Formula evaluator
//!
//! Walks an AST, resolving variable names through a caller-supplied
//! [`Lookup`] and applying per-operator type and dimension rules.
//!
//! Unit policy: operators that require matching dimensions (`+ - %`, the
//! ordering comparisons, `min`/`max`/`hypot`) let a unit-empty operand
//! adopt the other side's unit; two non-empty units must agree in base
//! dimensions and the right operand is converted into the left operand's
//! unit. Multiplicative operators compose unit expressions symbolically.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{FormulaError, FormulaResult};
use crate::functions;
use quant_sheets_core::unit::{parse_unit, unit_info, UnitTable};
use quant_sheets_core::{Payload, Value};

/// Variable resolution capability supplied by the caller
pub trait Lookup {
    /// Resolve a name to a value, or signal absence
    fn resolve(&self, name: &str) -> Option<Value>;
}

/// Maps act as lookups, which keeps tests and adapters small
impl Lookup for ahash::AHashMap<String, Value> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// A lookup that resolves nothing
pub struct EmptyLookup;

impl Lookup for EmptyLookup {
    fn resolve(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Built-in constants, merged underneath every lookup
///
/// The lookup is consulted first, so a row named `pi` shadows the
/// constant.
pub fn builtin_constant(name: &str) -> Option<Value> {
    match name {
        "pi" => Some(Value::number(std::f64::consts::PI)),
        "e" => Some(Value::number(std::f64::consts::E)),
        _ => None,
    }
}

/// True if the name is a built-in constant
pub fn is_builtin_constant(name: &str) -> bool {
    builtin_constant(name).is_some()
}

/// Evaluate a formula expression
pub fn evaluate(expr: &Expr, lookup: &dyn Lookup, table: &dyn UnitTable) -> FormulaResult<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::number(*n)),
        Expr::Boolean(b) => Ok(Value::boolean(*b)),
        Expr::Text(s) => Ok(Value::text(s.clone())),

        Expr::Variable(name) => lookup
            .resolve(name)
            .or_else(|| builtin_constant(name))
            .ok_or_else(|| FormulaError::UndefinedVariable(name.clone())),

        Expr::Vector(elements) => evaluate_vector(elements, lookup, table),

        Expr::Unary { op, operand } => {
            let value = evaluate(operand, lookup, table)?;
            apply_unary(*op, &value)
        }

        Expr::Binary { op, left, right } => {
            let left = evaluate(left, lookup, table)?;
            let right = evaluate(right, lookup, table)?;
            apply_binary(*op, &left, &right, table)
        }

        // Only the selected arm is evaluated
        Expr::Ternary {
            cond,
            when_true,
            when_false,
        } => {
            let cond = evaluate(cond, lookup, table)?;
            match cond.as_boolean() {
                Some(true) => evaluate(when_true, lookup, table),
                Some(false) => evaluate(when_false, lookup, table),
                None => Err(type_mismatch("?:", "condition must be a boolean")),
            }
        }

        Expr::Call { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, lookup, table)?);
            }
            if functions::NAMED_OPERATORS.contains(&name.as_str()) {
                apply_named_operator(name, &values, table)
            } else {
                functions::call(name, &values, table)
            }
        }

        Expr::Index { target, index } => {
            let target = evaluate(target, lookup, table)?;
            let index = evaluate(index, lookup, table)?;
            apply_index(&target, &index)
        }
    }
}

fn type_mismatch(op: &str, detail: impl Into<String>) -> FormulaError {
    FormulaError::TypeMismatch {
        op: op.to_string(),
        detail: detail.into(),
    }
}

/// Evaluate a vector literal
///
/// Elements must be numbers; the first element with a unit fixes the
/// vector's unit and later elements are converted into it.
fn evaluate_vector(
    elements: &[Expr],
    lookup: &dyn Lookup,
    table: &dyn UnitTable,
) -> FormulaResult<Value> {
    let mut unit = String::new();
    let mut numbers = Vec::with_capacity(elements.len());
    for element in elements {
        let value = evaluate(element, lookup, table)?;
        let n = value
            .as_number()
            .ok_or_else(|| type_mismatch("[]", "vector elements must be numbers"))?;
        if unit.is_empty() || value.unit().is_empty() || value.unit() == unit {
            if unit.is_empty() {
                unit = value.unit().to_string();
            }
            numbers.push(n);
        } else {
            let (_, factor) = value.as_given_unit(&unit, table)?;
            numbers.push(n * factor);
        }
    }
    Ok(Value::vector_with_unit(numbers, unit)?)
}

fn apply_unary(op: UnaryOp, value: &Value) -> FormulaResult<Value> {
    match op {
        UnaryOp::Negate => match value.payload() {
            Payload::Number(n) => Ok(Value::number_with_unit(-n, value.unit())),
            Payload::Vector(v) => Ok(Value::vector_with_unit(
                v.iter().map(|x| -x).collect(),
                value.unit(),
            )?),
            _ => Err(type_mismatch("-", "operand must be a number or vector")),
        },
        UnaryOp::Not => match value.payload() {
            Payload::Boolean(b) => Ok(Value::boolean(!b)),
            _ => Err(type_mismatch("not", "operand must be a boolean")),
        },
    }
}

fn apply_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    table: &dyn UnitTable,
) -> FormulaResult<Value> {
    match op {
        BinaryOp::Add => elementwise(op, left, right, table, |a, b| Ok(a + b)),
        BinaryOp::Subtract => elementwise(op, left, right, table, |a, b| Ok(a - b)),
        BinaryOp::Modulo => elementwise(op, left, right, table, |a, b| {
            if b == 0.0 {
                Err(FormulaError::Domain("modulo by zero".to_string()))
            } else {
                Ok(a % b)
            }
        }),

        BinaryOp::Multiply => multiply(left, right),
        BinaryOp::Divide => divide(left, right),
        BinaryOp::Power => power(left, right, table),
        BinaryOp::Dot => dot_product(left, right),

        BinaryOp::Equal => Ok(Value::boolean(equals(left, right, table)?)),
        BinaryOp::NotEqual => Ok(Value::boolean(!equals(left, right, table)?)),

        BinaryOp::LessThan
        | BinaryOp::LessEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterEqual => compare(op, left, right, table),

        BinaryOp::In => membership(left, right, table),

        BinaryOp::And | BinaryOp::Or => logical(op.symbol(), left, right),
    }
}

/// Factor converting `right` into `left`'s unit, plus the result unit
///
/// Implements the adoption policy: a unit-empty side adopts the other
/// side's unit without scaling.
fn conversion_into(
    op: &str,
    left: &Value,
    right: &Value,
    table: &dyn UnitTable,
) -> FormulaResult<(f64, String)> {
    if left.unit().is_empty() {
        return Ok((1.0, right.unit().to_string()));
    }
    if right.unit().is_empty() || right.unit() == left.unit() {
        return Ok((1.0, left.unit().to_string()));
    }
    let from = unit_info(right.unit(), table)?;
    let to = unit_info(left.unit(), table)?;
    if from.dims != to.dims {
        return Err(FormulaError::DimensionMismatch {
            op: op.to_string(),
            left: left.unit().to_string(),
            right: right.unit().to_string(),
        });
    }
    Ok((from.factor / to.factor, left.unit().to_string()))
}

/// Same-shape, same-dimension operators (`+ - %`)
fn elementwise(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    table: &dyn UnitTable,
    f: impl Fn(f64, f64) -> FormulaResult<f64>,
) -> FormulaResult<Value> {
    let (factor, unit) = conversion_into(op.symbol(), left, right, table)?;
    match (left.payload(), right.payload()) {
        (Payload::Number(a), Payload::Number(b)) => {
            Ok(Value::number_with_unit(f(*a, b * factor)?, unit))
        }
        (Payload::Vector(a), Payload::Vector(b)) => {
            if a.len() != b.len() {
                return Err(type_mismatch(
                    op.symbol(),
                    format!("vector lengths differ: {} vs {}", a.len(), b.len()),
                ));
            }
            let mut out = Vec::with_capacity(a.len());
            for (x, y) in a.iter().zip(b) {
                out.push(f(*x, y * factor)?);
            }
            Ok(Value::vector_with_unit(out, unit)?)
        }
        _ => Err(type_mismatch(
            op.symbol(),
            "operands must be two numbers or two vectors",
        )),
    }
}

/// Symbolic product or quotient of two unit expressions
fn combine_units(left: &str, right: &str, divide: bool) -> FormulaResult<String> {
    let l = parse_unit(left)?;
    let r = parse_unit(right)?;
    let combined = if divide { l.div(&r) } else { l.mul(&r) };
    Ok(combined.to_string())
}

fn multiply(left: &Value, right: &Value) -> FormulaResult<Value> {
    let unit = combine_units(left.unit(), right.unit(), false)?;
    match (left.payload(), right.payload()) {
        (Payload::Number(a), Payload::Number(b)) => Ok(Value::number_with_unit(a * b, unit)),
        (Payload::Number(a), Payload::Vector(v)) | (Payload::Vector(v), Payload::Number(a)) => {
            Ok(Value::vector_with_unit(
                v.iter().map(|x| a * x).collect(),
                unit,
            )?)
        }
        // Cross product only; there is no elementwise vector product
        (Payload::Vector(_), Payload::Vector(_)) => cross_product(left, right),
        _ => Err(type_mismatch("*", "operands must be numbers or vectors")),
    }
}

/// Cross product of two 3-element vectors; also backs the `cross` function
pub(crate) fn cross_product(left: &Value, right: &Value) -> FormulaResult<Value> {
    match (left.payload(), right.payload()) {
        (Payload::Vector(a), Payload::Vector(b)) => {
            if a.len() != 3 || b.len() != 3 {
                return Err(type_mismatch(
                    "*",
                    "vector product requires two 3-element vectors",
                ));
            }
            let cross = vec![
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            ];
            let unit = combine_units(left.unit(), right.unit(), false)?;
            Ok(Value::vector_with_unit(cross, unit)?)
        }
        _ => Err(type_mismatch("*", "operands must be vectors")),
    }
}

fn divide(left: &Value, right: &Value) -> FormulaResult<Value> {
    let unit = combine_units(left.unit(), right.unit(), true)?;
    match (left.payload(), right.payload()) {
        (Payload::Number(a), Payload::Number(b)) => {
            if *b == 0.0 {
                Err(FormulaError::Domain("division by zero".to_string()))
            } else {
                Ok(Value::number_with_unit(a / b, unit))
            }
        }
        (Payload::Vector(v), Payload::Number(b)) => {
            if *b == 0.0 {
                Err(FormulaError::Domain("division by zero".to_string()))
            } else {
                Ok(Value::vector_with_unit(
                    v.iter().map(|x| x / b).collect(),
                    unit,
                )?)
            }
        }
        _ => Err(type_mismatch(
            "/",
            "operands must be number/number or vector/number",
        )),
    }
}

fn power(left: &Value, right: &Value, table: &dyn UnitTable) -> FormulaResult<Value> {
    let base = left
        .as_number()
        .ok_or_else(|| type_mismatch("^", "base must be a number"))?;
    let exp = right
        .as_number()
        .ok_or_else(|| type_mismatch("^", "exponent must be a number"))?;
    if !right.unit().is_empty() && !unit_info(right.unit(), table)?.dims.is_empty() {
        return Err(FormulaError::DimensionMismatch {
            op: "^".to_string(),
            left: left.unit().to_string(),
            right: right.unit().to_string(),
        });
    }

    let result = base.powf(exp);
    if !result.is_finite() {
        return Err(FormulaError::Domain(format!("{base}^{exp} is not finite")));
    }

    // The base's dimension exponents scale by the (possibly fractional)
    // exponent value
    let unit = parse_unit(left.unit())?.pow(exp).to_string();
    Ok(Value::number_with_unit(result, unit))
}

/// Dot product; also backs the `dot` function
pub(crate) fn dot_product(left: &Value, right: &Value) -> FormulaResult<Value> {
    match (left.payload(), right.payload()) {
        (Payload::Vector(a), Payload::Vector(b)) => {
            if a.len() != b.len() {
                return Err(type_mismatch(
                    "@",
                    format!("vector lengths differ: {} vs {}", a.len(), b.len()),
                ));
            }
            let sum: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let unit = combine_units(left.unit(), right.unit(), false)?;
            Ok(Value::number_with_unit(sum, unit))
        }
        _ => Err(type_mismatch("@", "operands must be vectors")),
    }
}

fn compare(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    table: &dyn UnitTable,
) -> FormulaResult<Value> {
    let a = left
        .as_number()
        .ok_or_else(|| type_mismatch(op.symbol(), "operands must be numbers"))?;
    let b = right
        .as_number()
        .ok_or_else(|| type_mismatch(op.symbol(), "operands must be numbers"))?;
    let (factor, _) = conversion_into(op.symbol(), left, right, table)?;
    let b = b * factor;
    let result = match op {
        BinaryOp::LessThan => a < b,
        BinaryOp::LessEqual => a <= b,
        BinaryOp::GreaterThan => a > b,
        BinaryOp::GreaterEqual => a >= b,
        _ => return Err(FormulaError::UnknownOperator(op.symbol().to_string())),
    };
    Ok(Value::boolean(result))
}

/// Base-unit factors for both sides, or `None` when dimensions differ
fn quantity_factors(
    left: &Value,
    right: &Value,
    table: &dyn UnitTable,
) -> FormulaResult<Option<(f64, f64)>> {
    if left.unit().is_empty() || right.unit().is_empty() {
        // A unit-empty side adopts the other side's unit
        return Ok(Some((1.0, 1.0)));
    }
    let l = unit_info(left.unit(), table)?;
    let r = unit_info(right.unit(), table)?;
    if l.dims != r.dims {
        return Ok(None);
    }
    Ok(Some((l.factor, r.factor)))
}

/// Equality is total over dimensions: incompatible dimensions compare
/// unequal instead of erroring. Mismatched payload kinds are an error.
fn equals(left: &Value, right: &Value, table: &dyn UnitTable) -> FormulaResult<bool> {
    match (left.payload(), right.payload()) {
        (Payload::Boolean(a), Payload::Boolean(b)) => Ok(a == b),
        (Payload::Text(a), Payload::Text(b)) => Ok(a == b),
        (Payload::Number(a), Payload::Number(b)) => match quantity_factors(left, right, table)? {
            Some((fl, fr)) => Ok(a * fl == b * fr),
            None => Ok(false),
        },
        (Payload::Vector(a), Payload::Vector(b)) => {
            if a.len() != b.len() {
                return Ok(false);
            }
            match quantity_factors(left, right, table)? {
                Some((fl, fr)) => Ok(a.iter().zip(b).all(|(x, y)| x * fl == y * fr)),
                None => Ok(false),
            }
        }
        _ => Err(type_mismatch("==", "operands must share a payload type")),
    }
}

fn membership(left: &Value, right: &Value, table: &dyn UnitTable) -> FormulaResult<Value> {
    match (left.payload(), right.payload()) {
        (Payload::Text(needle), Payload::Text(haystack)) => {
            Ok(Value::boolean(haystack.contains(needle)))
        }
        (Payload::Number(n), Payload::Vector(v)) => match quantity_factors(left, right, table)? {
            Some((fl, fr)) => Ok(Value::boolean(v.iter().any(|x| n * fl == x * fr))),
            None => Ok(Value::boolean(false)),
        },
        _ => Err(type_mismatch(
            "in",
            "expected number in vector or text in text",
        )),
    }
}

fn logical(name: &str, left: &Value, right: &Value) -> FormulaResult<Value> {
    let a = left
        .as_boolean()
        .ok_or_else(|| type_mismatch(name, "operands must be booleans"))?;
    let b = right
        .as_boolean()
        .ok_or_else(|| type_mismatch(name, "operands must be booleans"))?;
    let result = match name {
        "and" => a && b,
        "or" => a || b,
        "xor" => a != b,
        "nand" => !(a && b),
        _ => return Err(FormulaError::UnknownOperator(name.to_string())),
    };
    Ok(Value::boolean(result))
}

/// Named operators invoked with call syntax (`xor(a, b)`)
fn apply_named_operator(
    name: &str,
    args: &[Value],
    table: &dyn UnitTable,
) -> FormulaResult<Value> {
    let arity = if name == "not" { 1 } else { 2 };
    if args.len() != arity {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: arity.to_string(),
            actual: args.len(),
        });
    }
    match name {
        "not" => apply_unary(UnaryOp::Not, &args[0]),
        "and" | "or" | "xor" | "nand" => logical(name, &args[0], &args[1]),
        "in" => membership(&args[0], &args[1], table),
        _ => Err(FormulaError::UnknownOperator(name.to_string())),
    }
}

/// Zero-based, bounds-checked vector indexing
fn apply_index(target: &Value, index: &Value) -> FormulaResult<Value> {
    let v = target
        .as_vector()
        .ok_or_else(|| type_mismatch("[]", "indexing requires a vector"))?;
    if !index.unit().is_empty() {
        return Err(type_mismatch("[]", "index must be dimensionless"));
    }
    let n = index
        .as_number()
        .ok_or_else(|| type_mismatch("[]", "index must be a number"))?;
    if n.fract() != 0.0 {
        return Err(type_mismatch("[]", "index must be an integer"));
    }
    let i = n as i64;
    if i < 0 || i as usize >= v.len() {
        return Err(FormulaError::IndexOutOfBounds {
            index: i,
            len: v.len(),
        });
    }
    Ok(Value::number_with_unit(v[i as usize], target.unit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;
    use quant_sheets_core::unit::SiUnitTable;

    fn eval(text: &str) -> FormulaResult<Value> {
        let ast = parse(text)?;
        evaluate(&ast, &EmptyLookup, SiUnitTable::global())
    }

    fn eval_with(text: &str, vars: &[(&str, Value)]) -> FormulaResult<Value> {
        let ast = parse(text)?;
        let mut lookup = ahash::AHashMap::new();
        for (name, value) in vars {
            lookup.insert(name.to_string(), value.clone());
        }
        evaluate(&ast, &lookup, SiUnitTable::global())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1+2*3").unwrap(), Value::number(7.0));
        assert_eq!(eval("(1+2)*3").unwrap(), Value::number(9.0));
        assert_eq!(eval("2^10").unwrap(), Value::number(1024.0));
        assert_eq!(eval("7 % 4").unwrap(), Value::number(3.0));
        assert_eq!(eval("-3 + 5").unwrap(), Value::number(2.0));
    }

    #[test]
    fn test_addition_converts_into_left_unit() {
        let result = eval_with(
            "a + b",
            &[
                ("a", Value::number_with_unit(1.0, "m")),
                ("b", Value::number_with_unit(50.0, "cm")),
            ],
        )
        .unwrap();
        assert_eq!(result, Value::number_with_unit(1.5, "m"));
    }

    #[test]
    fn test_addition_adopts_unit_from_either_side() {
        let a = Value::number_with_unit(2.0, "cm");
        let result = eval_with("a + 1", &[("a", a.clone())]).unwrap();
        assert_eq!(result, Value::number_with_unit(3.0, "cm"));
        let result = eval_with("1 + a", &[("a", a)]).unwrap();
        assert_eq!(result, Value::number_with_unit(3.0, "cm"));
    }

    #[test]
    fn test_addition_dimension_mismatch() {
        let err = eval_with(
            "a + b",
            &[
                ("a", Value::number_with_unit(1.0, "m")),
                ("b", Value::number_with_unit(1.0, "s")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, FormulaError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_multiplication_combines_units() {
        let result = eval_with(
            "h * 3.14 * rad * rad",
            &[
                ("h", Value::number_with_unit(3.0, "cm")),
                ("rad", Value::number_with_unit(2.5, "cm")),
            ],
        )
        .unwrap();
        assert!((result.as_number().unwrap() - 58.875).abs() < 1e-9);
        assert_eq!(result.unit(), "cm^3");
    }

    #[test]
    fn test_division_subtracts_units() {
        let result = eval_with(
            "d / t",
            &[
                ("d", Value::number_with_unit(100.0, "m")),
                ("t", Value::number_with_unit(10.0, "s")),
            ],
        )
        .unwrap();
        assert_eq!(result, Value::number_with_unit(10.0, "m/s"));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval("1/0").unwrap_err(),
            FormulaError::Domain("division by zero".to_string())
        );
    }

    #[test]
    fn test_scalar_vector_product() {
        let result = eval_with(
            "a*b",
            &[
                ("a", Value::number(3.0)),
                ("b", Value::vector_with_unit(vec![3.0, 2.0], "cm").unwrap()),
            ],
        )
        .unwrap();
        assert_eq!(
            result,
            Value::vector_with_unit(vec![9.0, 6.0], "cm").unwrap()
        );
    }

    #[test]
    fn test_cross_product() {
        let result = eval("[1, 0, 0] * [0, 1, 0]").unwrap();
        assert_eq!(result, Value::vector(vec![0.0, 0.0, 1.0]).unwrap());

        // No elementwise product for 2-vectors
        assert!(matches!(
            eval("[1, 2] * [3, 4]").unwrap_err(),
            FormulaError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_dot_product() {
        let result = eval("[1, 2, 3] @ [4, 5, 6]").unwrap();
        assert_eq!(result, Value::number(32.0));

        let result = eval_with(
            "a @ a",
            &[("a", Value::vector_with_unit(vec![3.0, 4.0], "m").unwrap())],
        )
        .unwrap();
        assert_eq!(result, Value::number_with_unit(25.0, "m^2"));
    }

    #[test]
    fn test_power_scales_dimensions() {
        let result = eval_with("a^2", &[("a", Value::number_with_unit(3.0, "m")) ]).unwrap();
        assert_eq!(result, Value::number_with_unit(9.0, "m^2"));

        let err = eval_with(
            "2^t",
            &[("t", Value::number_with_unit(2.0, "s"))],
        )
        .unwrap_err();
        assert!(matches!(err, FormulaError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_comparisons_convert_units() {
        let vars = [
            ("short", Value::number_with_unit(50.0, "cm")),
            ("long", Value::number_with_unit(1.0, "m")),
        ];
        assert_eq!(eval_with("short < long", &vars).unwrap(), Value::boolean(true));
        assert_eq!(eval_with("long <= short", &vars).unwrap(), Value::boolean(false));
    }

    #[test]
    fn test_comparison_dimension_mismatch() {
        let err = eval_with(
            "a < b",
            &[
                ("a", Value::number_with_unit(1.0, "m")),
                ("b", Value::number_with_unit(1.0, "kg")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, FormulaError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_equality_is_total_over_dimensions() {
        let vars = [
            ("a", Value::number_with_unit(1.0, "m")),
            ("b", Value::number_with_unit(1.0, "kg")),
            ("c", Value::number_with_unit(100.0, "cm")),
        ];
        assert_eq!(eval_with("a == b", &vars).unwrap(), Value::boolean(false));
        assert_eq!(eval_with("a != b", &vars).unwrap(), Value::boolean(true));
        // Compatible units compare after conversion
        assert_eq!(eval_with("a == c", &vars).unwrap(), Value::boolean(true));
    }

    #[test]
    fn test_equality_payload_mismatch_is_error() {
        assert!(matches!(
            eval("1 == true").unwrap_err(),
            FormulaError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(eval("true and false").unwrap(), Value::boolean(false));
        assert_eq!(eval("true or false").unwrap(), Value::boolean(true));
        assert_eq!(eval("not true").unwrap(), Value::boolean(false));
        assert_eq!(eval("xor(true, false)").unwrap(), Value::boolean(true));
        assert_eq!(eval("nand(true, true)").unwrap(), Value::boolean(false));
        assert!(matches!(
            eval("1 and true").unwrap_err(),
            FormulaError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_membership() {
        assert_eq!(eval("2 in [1, 2, 3]").unwrap(), Value::boolean(true));
        assert_eq!(eval("4 in [1, 2, 3]").unwrap(), Value::boolean(false));
        assert_eq!(eval("'ell' in 'hello'").unwrap(), Value::boolean(true));

        // Unit-aware membership
        let result = eval_with(
            "x in v",
            &[
                ("x", Value::number_with_unit(100.0, "cm")),
                ("v", Value::vector_with_unit(vec![1.0, 2.0], "m").unwrap()),
            ],
        )
        .unwrap();
        assert_eq!(result, Value::boolean(true));
    }

    #[test]
    fn test_ternary() {
        assert_eq!(eval("1 < 2 ? 'yes' : 'no'").unwrap(), Value::text("yes"));
        // Only the selected arm is evaluated
        assert_eq!(eval("false ? missing_name : 2").unwrap(), Value::number(2.0));
        assert!(matches!(
            eval("1 ? 2 : 3").unwrap_err(),
            FormulaError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_indexing() {
        let vars = [(
            "v",
            Value::vector_with_unit(vec![10.0, 20.0, 30.0], "m").unwrap(),
        )];
        assert_eq!(
            eval_with("v[0]", &vars).unwrap(),
            Value::number_with_unit(10.0, "m")
        );
        assert_eq!(
            eval_with("v[1 + 1]", &vars).unwrap(),
            Value::number_with_unit(30.0, "m")
        );
        assert_eq!(
            eval_with("v[3]", &vars).unwrap_err(),
            FormulaError::IndexOutOfBounds { index: 3, len: 3 }
        );
        assert!(matches!(
            eval_with("v[0.5]", &vars).unwrap_err(),
            FormulaError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            eval("x").unwrap_err(),
            FormulaError::UndefinedVariable("x".to_string())
        );
    }

    #[test]
    fn test_builtin_constants() {
        let pi = eval("pi").unwrap().as_number().unwrap();
        assert!((pi - std::f64::consts::PI).abs() < 1e-15);
        assert_eq!(eval("2*pi").unwrap().as_number().unwrap(), std::f64::consts::TAU);

        // A row named pi shadows the constant
        let result = eval_with("pi", &[("pi", Value::number(3.0))]).unwrap();
        assert_eq!(result, Value::number(3.0));
    }

    #[test]
    fn test_vector_literal_unit_adoption() {
        let result = eval_with(
            "[a, b]",
            &[
                ("a", Value::number_with_unit(1.0, "m")),
                ("b", Value::number_with_unit(50.0, "cm")),
            ],
        )
        .unwrap();
        assert_eq!(result, Value::vector_with_unit(vec![1.0, 0.5], "m").unwrap());
    }
}
