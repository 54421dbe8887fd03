//! Minimal end-to-end demo: fill a row store, recalculate, read back.
//!
//! Run with: cargo run --example unit_calc

use quant_sheets::prelude::*;

fn main() {
    let mut store = MemoryRowStore::new(2);

    // Two input rows with per-column alternatives
    store.insert(
        NamedRow::new("height", 2)
            .unwrap()
            .with_unit("cm")
            .with_value(0, Value::number_with_unit(3.0, "cm"))
            .with_value(1, Value::number_with_unit(4.5, "cm")),
    );
    store.insert(
        NamedRow::new("radius", 2)
            .unwrap()
            .with_unit("cm")
            .with_value(0, Value::number_with_unit(2.5, "cm"))
            .with_value(1, Value::number_with_unit(2.5, "cm")),
    );

    // Formula rows; `volume` has no declared unit and adopts cm^3
    store.insert(
        NamedRow::new("volume", 2)
            .unwrap()
            .with_formula("height * pi * radius ^ 2"),
    );
    store.insert(
        NamedRow::new("flow_rate", 2)
            .unwrap()
            .with_unit("m^3/s")
            .with_formula("volume / fill_time"),
    );
    store.insert(
        NamedRow::new("fill_time", 2)
            .unwrap()
            .with_unit("s")
            .with_value(0, Value::number_with_unit(10.0, "s"))
            .with_value(1, Value::number_with_unit(12.0, "s")),
    );

    let stats = recalculate_all(&mut store);
    println!(
        "recalculated {} cells ({} errors)",
        stats.cells_calculated, stats.errors
    );

    for name in store.names() {
        let row = store.get(&name).unwrap();
        let results: Vec<String> = row
            .results
            .iter()
            .map(|result| result.to_string())
            .collect();
        println!("{:>16}  [{}]", name, results.join(" | "));
    }
}
