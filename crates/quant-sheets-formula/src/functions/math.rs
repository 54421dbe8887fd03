//! Math functions

use quant_sheets_core::unit::{parse_unit, unit_info, Dimension, UnitTable};
use quant_sheets_core::Value;

use crate::error::{FormulaError, FormulaResult};

fn number_arg(func: &str, value: &Value) -> FormulaResult<f64> {
    value.as_number().ok_or_else(|| FormulaError::TypeMismatch {
        op: func.to_string(),
        detail: "argument must be a number".to_string(),
    })
}

/// Accept a dimensionless or angle-typed number, returned in radians
///
/// Degree input carries a rad-relative factor in the unit table, so the
/// aggregate factor is exactly the degree→radian conversion.
fn angle_in_radians(func: &str, value: &Value, table: &dyn UnitTable) -> FormulaResult<f64> {
    let n = number_arg(func, value)?;
    if value.unit().is_empty() {
        return Ok(n);
    }
    let info = unit_info(value.unit(), table)?;
    if info.dims.is_empty() || info.dims == Dimension::base("rad") {
        Ok(n * info.factor)
    } else {
        Err(FormulaError::DimensionMismatch {
            op: func.to_string(),
            left: value.unit().to_string(),
            right: "rad".to_string(),
        })
    }
}

/// Accept a dimensionless number
fn dimensionless_arg(func: &str, value: &Value, table: &dyn UnitTable) -> FormulaResult<f64> {
    let n = number_arg(func, value)?;
    if value.unit().is_empty() {
        return Ok(n);
    }
    let info = unit_info(value.unit(), table)?;
    if !info.dims.is_empty() {
        return Err(FormulaError::DimensionMismatch {
            op: func.to_string(),
            left: value.unit().to_string(),
            right: String::new(),
        });
    }
    Ok(n * info.factor)
}

/// Express an argument in the first argument's unit; a unit-empty side
/// adopts the other side's unit unchanged
fn into_first_unit(
    func: &str,
    first: &Value,
    arg: &Value,
    table: &dyn UnitTable,
) -> FormulaResult<f64> {
    let n = number_arg(func, arg)?;
    if first.unit().is_empty() || arg.unit().is_empty() || first.unit() == arg.unit() {
        return Ok(n);
    }
    let from = unit_info(arg.unit(), table)?;
    let to = unit_info(first.unit(), table)?;
    if from.dims != to.dims {
        return Err(FormulaError::DimensionMismatch {
            op: func.to_string(),
            left: first.unit().to_string(),
            right: arg.unit().to_string(),
        });
    }
    Ok(n * from.factor / to.factor)
}

pub fn fn_sin(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    Ok(Value::number(angle_in_radians("sin", &args[0], table)?.sin()))
}

pub fn fn_cos(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    Ok(Value::number(angle_in_radians("cos", &args[0], table)?.cos()))
}

pub fn fn_tan(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    Ok(Value::number(angle_in_radians("tan", &args[0], table)?.tan()))
}

pub fn fn_asin(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = dimensionless_arg("asin", &args[0], table)?;
    if !(-1.0..=1.0).contains(&n) {
        return Err(FormulaError::Domain(format!(
            "asin argument {n} outside [-1, 1]"
        )));
    }
    Ok(Value::number_with_unit(n.asin(), "rad"))
}

pub fn fn_acos(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = dimensionless_arg("acos", &args[0], table)?;
    if !(-1.0..=1.0).contains(&n) {
        return Err(FormulaError::Domain(format!(
            "acos argument {n} outside [-1, 1]"
        )));
    }
    Ok(Value::number_with_unit(n.acos(), "rad"))
}

pub fn fn_atan(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = dimensionless_arg("atan", &args[0], table)?;
    Ok(Value::number_with_unit(n.atan(), "rad"))
}

pub fn fn_atan2(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let y = number_arg("atan2", &args[0])?;
    let x = into_first_unit("atan2", &args[0], &args[1], table)?;
    Ok(Value::number_with_unit(y.atan2(x), "rad"))
}

pub fn fn_sqrt(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = number_arg("sqrt", &args[0])?;
    if n < 0.0 {
        return Err(FormulaError::Domain(format!("sqrt of negative number {n}")));
    }
    let unit = parse_unit(args[0].unit())?.pow(0.5).to_string();
    Ok(Value::number_with_unit(n.sqrt(), unit))
}

pub fn fn_cbrt(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = number_arg("cbrt", &args[0])?;
    let unit = parse_unit(args[0].unit())?.pow(1.0 / 3.0).to_string();
    Ok(Value::number_with_unit(n.cbrt(), unit))
}

pub fn fn_abs(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = number_arg("abs", &args[0])?;
    Ok(Value::number_with_unit(n.abs(), args[0].unit()))
}

pub fn fn_round(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = number_arg("round", &args[0])?;
    Ok(Value::number_with_unit(n.round(), args[0].unit()))
}

pub fn fn_floor(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = number_arg("floor", &args[0])?;
    Ok(Value::number_with_unit(n.floor(), args[0].unit()))
}

pub fn fn_ceil(args: &[Value], _table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = number_arg("ceil", &args[0])?;
    Ok(Value::number_with_unit(n.ceil(), args[0].unit()))
}

pub fn fn_ln(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = dimensionless_arg("ln", &args[0], table)?;
    if n <= 0.0 {
        return Err(FormulaError::Domain(format!("ln of non-positive number {n}")));
    }
    Ok(Value::number(n.ln()))
}

pub fn fn_log10(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = dimensionless_arg("log10", &args[0], table)?;
    if n <= 0.0 {
        return Err(FormulaError::Domain(format!(
            "log10 of non-positive number {n}"
        )));
    }
    Ok(Value::number(n.log10()))
}

pub fn fn_exp(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let n = dimensionless_arg("exp", &args[0], table)?;
    Ok(Value::number(n.exp()))
}

fn extremum(
    func: &str,
    args: &[Value],
    table: &dyn UnitTable,
    pick_less: bool,
) -> FormulaResult<Value> {
    let mut best = number_arg(func, &args[0])?;
    for arg in &args[1..] {
        let candidate = into_first_unit(func, &args[0], arg, table)?;
        if (pick_less && candidate < best) || (!pick_less && candidate > best) {
            best = candidate;
        }
    }
    // The first argument's unit wins
    Ok(Value::number_with_unit(best, args[0].unit()))
}

pub fn fn_min(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    extremum("min", args, table, true)
}

pub fn fn_max(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    extremum("max", args, table, false)
}

pub fn fn_hypot(args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let a = number_arg("hypot", &args[0])?;
    let b = into_first_unit("hypot", &args[0], &args[1], table)?;
    Ok(Value::number_with_unit(a.hypot(b), args[0].unit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_sheets_core::unit::SiUnitTable;

    fn table() -> &'static SiUnitTable {
        SiUnitTable::global()
    }

    #[test]
    fn test_sin_radians_and_degrees() {
        let r = fn_sin(&[Value::number(std::f64::consts::FRAC_PI_2)], table()).unwrap();
        assert!((r.as_number().unwrap() - 1.0).abs() < 1e-12);

        let r = fn_sin(&[Value::number_with_unit(90.0, "deg")], table()).unwrap();
        assert!((r.as_number().unwrap() - 1.0).abs() < 1e-12);

        let r = fn_sin(&[Value::number_with_unit(1.0, "rad")], table()).unwrap();
        assert!((r.as_number().unwrap() - 1.0_f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn test_sin_rejects_dimensioned_input() {
        let err = fn_sin(&[Value::number_with_unit(1.0, "m")], table()).unwrap_err();
        assert!(matches!(err, FormulaError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_inverse_trig_returns_radians() {
        let r = fn_asin(&[Value::number(1.0)], table()).unwrap();
        assert_eq!(r.unit(), "rad");
        assert!((r.as_number().unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_asin_domain() {
        let err = fn_asin(&[Value::number(1.5)], table()).unwrap_err();
        assert!(matches!(err, FormulaError::Domain(_)));
    }

    #[test]
    fn test_sqrt_halves_dimension_exponents() {
        let r = fn_sqrt(&[Value::number_with_unit(9.0, "m^2")], table()).unwrap();
        assert_eq!(r, Value::number_with_unit(3.0, "m"));

        let r = fn_sqrt(&[Value::number_with_unit(4.0, "m")], table()).unwrap();
        assert_eq!(r, Value::number_with_unit(2.0, "m^0.5"));
    }

    #[test]
    fn test_sqrt_negative() {
        let err = fn_sqrt(&[Value::number(-1.0)], table()).unwrap_err();
        assert!(matches!(err, FormulaError::Domain(_)));
    }

    #[test]
    fn test_cbrt_thirds_dimension_exponents() {
        let r = fn_cbrt(&[Value::number_with_unit(8.0, "cm^3")], table()).unwrap();
        assert_eq!(r, Value::number_with_unit(2.0, "cm"));
    }

    #[test]
    fn test_ln_requires_dimensionless_positive() {
        assert!(fn_ln(&[Value::number(1.0)], table()).is_ok());
        assert!(matches!(
            fn_ln(&[Value::number(0.0)], table()).unwrap_err(),
            FormulaError::Domain(_)
        ));
        assert!(matches!(
            fn_ln(&[Value::number_with_unit(1.0, "m")], table()).unwrap_err(),
            FormulaError::DimensionMismatch { .. }
        ));
    }

    #[test]
    fn test_min_max_first_argument_unit() {
        let r = fn_min(
            &[
                Value::number_with_unit(1.0, "m"),
                Value::number_with_unit(50.0, "cm"),
            ],
            table(),
        )
        .unwrap();
        assert_eq!(r, Value::number_with_unit(0.5, "m"));

        let r = fn_max(
            &[
                Value::number_with_unit(1.0, "m"),
                Value::number_with_unit(250.0, "cm"),
            ],
            table(),
        )
        .unwrap();
        assert_eq!(r, Value::number_with_unit(2.5, "m"));
    }

    #[test]
    fn test_min_dimension_mismatch() {
        let err = fn_min(
            &[
                Value::number_with_unit(1.0, "m"),
                Value::number_with_unit(1.0, "kg"),
            ],
            table(),
        )
        .unwrap_err();
        assert!(matches!(err, FormulaError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_hypot() {
        let r = fn_hypot(
            &[
                Value::number_with_unit(3.0, "m"),
                Value::number_with_unit(400.0, "cm"),
            ],
            table(),
        )
        .unwrap();
        assert_eq!(r, Value::number_with_unit(5.0, "m"));
    }
}
