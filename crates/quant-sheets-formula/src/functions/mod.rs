//! Built-in functions
//!
//! The registry carries the same unit policies as the operator library:
//! trigonometric functions accept dimensionless or angle input, root-like
//! functions scale dimension exponents fractionally, and `min`/`max`/
//! `hypot` require dimension-compatible arguments.

pub mod math;
pub mod vector;

use std::sync::OnceLock;

use ahash::AHashMap;
use quant_sheets_core::unit::UnitTable;
use quant_sheets_core::Value;

use crate::error::{FormulaError, FormulaResult};

/// Function implementation signature
///
/// Arguments arrive fully evaluated; implementations consult the unit
/// table for dimension checks and conversions.
pub type FunctionImpl = fn(&[Value], &dyn UnitTable) -> FormulaResult<Value>;

/// Function definition
pub struct FunctionDef {
    /// Function name (lowercase; lookups are case-sensitive)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_vector_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    fn register_math_functions(&mut self) {
        let one_arg = |name: &'static str, implementation: FunctionImpl| FunctionDef {
            name,
            min_args: 1,
            max_args: Some(1),
            implementation,
        };

        // Trigonometry
        self.register(one_arg("sin", math::fn_sin));
        self.register(one_arg("cos", math::fn_cos));
        self.register(one_arg("tan", math::fn_tan));
        self.register(one_arg("asin", math::fn_asin));
        self.register(one_arg("acos", math::fn_acos));
        self.register(one_arg("atan", math::fn_atan));
        self.register(FunctionDef {
            name: "atan2",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_atan2,
        });

        // Roots and rounding
        self.register(one_arg("sqrt", math::fn_sqrt));
        self.register(one_arg("cbrt", math::fn_cbrt));
        self.register(one_arg("abs", math::fn_abs));
        self.register(one_arg("round", math::fn_round));
        self.register(one_arg("floor", math::fn_floor));
        self.register(one_arg("ceil", math::fn_ceil));

        // Exponentials and logarithms
        self.register(one_arg("ln", math::fn_ln));
        self.register(one_arg("log10", math::fn_log10));
        self.register(one_arg("exp", math::fn_exp));

        // Extrema
        self.register(FunctionDef {
            name: "min",
            min_args: 1,
            max_args: None,
            implementation: math::fn_min,
        });
        self.register(FunctionDef {
            name: "max",
            min_args: 1,
            max_args: None,
            implementation: math::fn_max,
        });
        self.register(FunctionDef {
            name: "hypot",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_hypot,
        });
    }

    fn register_vector_functions(&mut self) {
        self.register(FunctionDef {
            name: "mag",
            min_args: 1,
            max_args: Some(1),
            implementation: vector::fn_mag,
        });
        self.register(FunctionDef {
            name: "dot",
            min_args: 2,
            max_args: Some(2),
            implementation: vector::fn_dot,
        });
        self.register(FunctionDef {
            name: "cross",
            min_args: 2,
            max_args: Some(2),
            implementation: vector::fn_cross,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global function registry (lazily initialized)
static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The shared registry instance
pub fn registry() -> &'static FunctionRegistry {
    REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Operator names that may also appear with call syntax
pub const NAMED_OPERATORS: &[&str] = &["and", "or", "not", "in", "xor", "nand"];

/// True if `name` is valid at a call site (function or named operator)
pub fn is_callable(name: &str) -> bool {
    registry().get(name).is_some() || NAMED_OPERATORS.contains(&name)
}

/// Dispatch a registry function with argument-count checking
pub fn call(name: &str, args: &[Value], table: &dyn UnitTable) -> FormulaResult<Value> {
    let func = registry()
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    if args.len() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {max}"),
                actual: args.len(),
            });
        }
    }

    (func.implementation)(args, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_is_case_sensitive() {
        assert!(registry().get("sin").is_some());
        assert!(registry().get("SIN").is_none());
    }

    #[test]
    fn test_is_callable_covers_named_operators() {
        assert!(is_callable("sqrt"));
        assert!(is_callable("xor"));
        assert!(is_callable("nand"));
        assert!(!is_callable("frobnicate"));
    }

    #[test]
    fn test_argument_count_checking() {
        use quant_sheets_core::unit::SiUnitTable;
        let err = call(
            "sqrt",
            &[Value::number(1.0), Value::number(2.0)],
            SiUnitTable::global(),
        )
        .unwrap_err();
        assert!(matches!(err, FormulaError::ArgumentCount { .. }));

        let err = call("hypot", &[Value::number(1.0)], SiUnitTable::global()).unwrap_err();
        assert!(matches!(err, FormulaError::ArgumentCount { .. }));
    }
}
