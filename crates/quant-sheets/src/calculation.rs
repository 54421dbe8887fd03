//! Recalculation engine
//!
//! Drives parsing, evaluation, and unit conversion over a named-row
//! store, one alternative column at a time. Per-cell failures become
//! error markers; they never abort the pass. Cycles are tolerated: a
//! cell in a cycle reads whatever its cyclic dependencies currently
//! hold.
//!
//! # Example
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
//! store.insert(NamedRow::new("twice_h", 1).unwrap().with_formula("h * 2"));
//!
//! let stats = recalculate_all(&mut store);
//! assert_eq!(stats.errors, 0);
//! ```

use ahash::AHashMap;
use log::{debug, warn};
use quant_sheets_core::unit::{SiUnitTable, UnitTable};
use quant_sheets_core::{CellResult, RowStore, Value};
use quant_sheets_formula::{build_dependency_tree, dependency_order, evaluate, parse, Expr, Lookup};

/// Statistics from a recalculation pass
#[derive(Debug, Clone, Default)]
pub struct RecalcStats {
    /// Rows visited across all processed columns
    pub rows_visited: usize,
    /// Formula cells that produced a value
    pub cells_calculated: usize,
    /// Cells that received an error marker
    pub errors: usize,
}

/// Column-scoped lookup adapter over a row store
///
/// Resolves a name to that row's value in one result column. Built-in
/// constants sit underneath: the evaluator consults them only after this
/// lookup declines, so a row named `pi` shadows the constant.
struct ColumnLookup<'a> {
    store: &'a dyn RowStore,
    alt: usize,
}

impl Lookup for ColumnLookup<'_> {
    fn resolve(&self, name: &str) -> Option<Value> {
        let row = self.store.get(name)?;
        match row.result(self.alt)? {
            CellResult::Value(value) => Some(value.clone()),
            _ => None,
        }
    }
}

/// The recalculation engine
///
/// Holds the unit table and a formula-text → AST cache that lives as long
/// as the engine.
pub struct Recalculator<'t> {
    table: &'t dyn UnitTable,
    parsed: AHashMap<String, Expr>,
}

impl Recalculator<'static> {
    /// Engine over the built-in SI unit table
    pub fn new() -> Self {
        Self::with_table(SiUnitTable::global())
    }
}

impl Default for Recalculator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> Recalculator<'t> {
    /// Engine over a caller-supplied unit table
    pub fn with_table(table: &'t dyn UnitTable) -> Self {
        Self {
            table,
            parsed: AHashMap::new(),
        }
    }

    /// Recalculate every alternative column in increasing index order
    pub fn recalculate_all(&mut self, store: &mut dyn RowStore) -> RecalcStats {
        let mut stats = RecalcStats::default();
        for alt in 0..store.alt_count() {
            let column = self.recalculate_column(store, alt);
            stats.rows_visited += column.rows_visited;
            stats.cells_calculated += column.cells_calculated;
            stats.errors += column.errors;
        }
        stats
    }

    /// Recalculate one result column in dependency order
    pub fn recalculate_column(&mut self, store: &mut dyn RowStore, alt: usize) -> RecalcStats {
        let mut stats = RecalcStats::default();

        let rows: Vec<(String, Option<String>)> = store
            .names()
            .into_iter()
            .map(|name| {
                let formula = store.get(&name).and_then(|row| row.formula.clone());
                (name, formula)
            })
            .collect();

        let tree = build_dependency_tree(&rows);
        let order = dependency_order(&tree);
        debug!("column {alt}: evaluating {} names", order.len());

        for name in order {
            let Some(row) = store.get(&name) else {
                // A referenced name without a row; dependents report it as
                // an undefined variable
                continue;
            };
            stats.rows_visited += 1;
            let Some(formula) = row.formula.clone() else {
                continue;
            };
            let declared_unit = row.unit.clone();

            match self.evaluate_cell(&*store, alt, &formula, &declared_unit) {
                Ok((value, adopted_unit)) => {
                    if let Some(unit) = adopted_unit {
                        store.set_unit(&name, &unit);
                    }
                    store.set_result(&name, alt, CellResult::Value(value));
                    stats.cells_calculated += 1;
                }
                Err(message) => {
                    warn!("row '{name}' column {alt}: {message}");
                    store.set_result(&name, alt, CellResult::Error(message));
                    stats.errors += 1;
                }
            }
        }

        stats
    }

    /// Parse, evaluate, and convert one cell
    ///
    /// Returns the converted value and, when the row's declared unit was
    /// empty, the unit the row adopts. The error string becomes the
    /// cell's error marker.
    fn evaluate_cell(
        &mut self,
        store: &dyn RowStore,
        alt: usize,
        formula: &str,
        declared_unit: &str,
    ) -> Result<(Value, Option<String>), String> {
        let ast = match self.parsed.get(formula) {
            Some(ast) => ast.clone(),
            None => {
                let ast = parse(formula).map_err(|e| e.to_string())?;
                self.parsed.insert(formula.to_string(), ast.clone());
                ast
            }
        };

        let lookup = ColumnLookup { store, alt };
        let value = evaluate(&ast, &lookup, self.table).map_err(|e| e.to_string())?;

        if declared_unit.is_empty() {
            // The row adopts the first computed unit
            if value.unit().is_empty() {
                Ok((value, None))
            } else {
                let unit = value.unit().to_string();
                Ok((value, Some(unit)))
            }
        } else if value.unit().is_empty() {
            // A unitless result adopts the declared unit unchanged
            Ok((value.with_unit(declared_unit), None))
        } else {
            let (converted, _) = value
                .as_given_unit(declared_unit, self.table)
                .map_err(|e| e.to_string())?;
            Ok((converted, None))
        }
    }
}

/// Recalculate one column with a fresh engine over the SI table
pub fn recalculate_column(store: &mut dyn RowStore, alt: usize) -> RecalcStats {
    Recalculator::new().recalculate_column(store, alt)
}

/// Recalculate all columns with a fresh engine over the SI table
pub fn recalculate_all(store: &mut dyn RowStore) -> RecalcStats {
    Recalculator::new().recalculate_all(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quant_sheets_core::{MemoryRowStore, NamedRow};

    fn input(name: &str, value: Value, unit: &str) -> NamedRow {
        NamedRow::new(name, 1)
            .unwrap()
            .with_unit(unit)
            .with_value(0, value)
    }

    #[test]
    fn test_simple_chain() {
        let mut store = MemoryRowStore::new(1);
        store.insert(input("a", Value::number(5.0), ""));
        store.insert(NamedRow::new("b", 1).unwrap().with_formula("a * 2"));
        store.insert(NamedRow::new("c", 1).unwrap().with_formula("b + 10"));

        let stats = recalculate_all(&mut store);
        assert_eq!(stats.cells_calculated, 2);
        assert_eq!(stats.errors, 0);

        let b = store.get("b").unwrap().result(0).unwrap().value().unwrap();
        assert_eq!(b, &Value::number(10.0));
        let c = store.get("c").unwrap().result(0).unwrap().value().unwrap();
        assert_eq!(c, &Value::number(20.0));
    }

    #[test]
    fn test_unit_adoption_on_empty_declared_unit() {
        let mut store = MemoryRowStore::new(1);
        store.insert(input("h", Value::number_with_unit(3.0, "cm"), "cm"));
        store.insert(input("rad", Value::number_with_unit(2.5, "cm"), "cm"));
        store.insert(
            NamedRow::new("vol", 1)
                .unwrap()
                .with_formula("h * 3.14 * rad * rad"),
        );

        recalculate_all(&mut store);

        let vol = store.get("vol").unwrap();
        assert_eq!(vol.unit, "cm^3");
        let value = vol.result(0).unwrap().value().unwrap();
        assert!((value.as_number().unwrap() - 58.875).abs() < 1e-9);
        assert_eq!(value.unit(), "cm^3");
    }

    #[test]
    fn test_result_converted_to_declared_unit() {
        let mut store = MemoryRowStore::new(1);
        store.insert(input("d", Value::number_with_unit(1.0, "km"), "km"));
        store.insert(
            NamedRow::new("d_m", 1)
                .unwrap()
                .with_unit("m")
                .with_formula("d * 2"),
        );

        recalculate_all(&mut store);

        let value = store
            .get("d_m")
            .unwrap()
            .result(0)
            .unwrap()
            .value()
            .unwrap()
            .clone();
        assert_eq!(value, Value::number_with_unit(2_000.0, "m"));
    }

    #[test]
    fn test_error_isolated_to_cell() {
        let mut store = MemoryRowStore::new(1);
        store.insert(NamedRow::new("bad", 1).unwrap().with_formula("x"));
        store.insert(NamedRow::new("good", 1).unwrap().with_formula("1 + 1"));

        let stats = recalculate_all(&mut store);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.cells_calculated, 1);

        let bad = store.get("bad").unwrap().result(0).unwrap();
        match bad {
            CellResult::Error(message) => assert!(message.contains('x'), "got: {message}"),
            other => panic!("expected error marker, got {other:?}"),
        }
        let good = store.get("good").unwrap().result(0).unwrap();
        assert_eq!(good.value(), Some(&Value::number(2.0)));
    }

    #[test]
    fn test_all_columns_in_order() {
        let mut store = MemoryRowStore::new(2);
        store.insert(
            NamedRow::new("a", 2)
                .unwrap()
                .with_value(0, Value::number(1.0))
                .with_value(1, Value::number(2.0)),
        );
        store.insert(NamedRow::new("b", 2).unwrap().with_formula("a * 10"));

        recalculate_all(&mut store);

        let b = store.get("b").unwrap();
        assert_eq!(b.result(0).unwrap().value(), Some(&Value::number(10.0)));
        assert_eq!(b.result(1).unwrap().value(), Some(&Value::number(20.0)));
    }

    #[test]
    fn test_formula_cache_reused_across_columns() {
        let mut store = MemoryRowStore::new(3);
        store.insert(
            NamedRow::new("a", 3)
                .unwrap()
                .with_value(0, Value::number(1.0))
                .with_value(1, Value::number(2.0))
                .with_value(2, Value::number(3.0)),
        );
        store.insert(NamedRow::new("b", 3).unwrap().with_formula("a + 1"));

        let mut engine = Recalculator::new();
        engine.recalculate_all(&mut store);
        assert_eq!(engine.parsed.len(), 1);
    }
}
