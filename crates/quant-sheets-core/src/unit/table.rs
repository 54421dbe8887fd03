//! Unit symbol resolution
//!
//! Maps recognized unit symbols to an SI base symbol and a multiplicative
//! conversion factor. The algebra in the parent module is agnostic to the
//! table contents; callers can plug in their own [`UnitTable`].

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Resolution of a single unit symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitEntry {
    /// SI base symbol this unit scales into
    pub base: &'static str,
    /// Multiplier converting one of this unit into one base unit
    pub factor: f64,
}

/// Source of unit symbol resolutions
///
/// The calculation core only needs symbol → (base, factor); any
/// standards-based unit database can sit behind this trait.
pub trait UnitTable {
    /// Look up a unit symbol
    fn lookup(&self, symbol: &str) -> Option<UnitEntry>;
}

/// Built-in SI-backed unit table
///
/// Covers the seven SI base symbols plus common scaled units. Compound
/// units (N, J, Hz, ...) are expressed in the unit grammar itself
/// ("kg*m/s^2"), not as table entries.
pub struct SiUnitTable {
    entries: AHashMap<&'static str, UnitEntry>,
}

impl SiUnitTable {
    fn build() -> Self {
        let mut entries = AHashMap::new();
        let mut add = |symbol: &'static str, base: &'static str, factor: f64| {
            entries.insert(symbol, UnitEntry { base, factor });
        };

        // Length
        add("m", "m", 1.0);
        add("km", "m", 1_000.0);
        add("cm", "m", 0.01);
        add("mm", "m", 0.001);
        add("um", "m", 1e-6);
        add("nm", "m", 1e-9);
        add("in", "m", 0.0254);
        add("ft", "m", 0.3048);
        add("yd", "m", 0.9144);
        add("mi", "m", 1_609.344);

        // Mass
        add("kg", "kg", 1.0);
        add("g", "kg", 0.001);
        add("mg", "kg", 1e-6);
        add("t", "kg", 1_000.0);
        add("lb", "kg", 0.453_592_37);
        add("oz", "kg", 0.028_349_523_125);

        // Time
        add("s", "s", 1.0);
        add("ms", "s", 0.001);
        add("us", "s", 1e-6);
        add("ns", "s", 1e-9);
        add("min", "s", 60.0);
        add("h", "s", 3_600.0);
        add("day", "s", 86_400.0);

        // Electric current
        add("A", "A", 1.0);
        add("mA", "A", 0.001);

        // Temperature (absolute scales with offsets are not supported)
        add("K", "K", 1.0);

        // Amount of substance
        add("mol", "mol", 1.0);

        // Luminous intensity
        add("cd", "cd", 1.0);

        // Plane angle, carried as a pseudo-base so degree input can be
        // recognized and converted by the trigonometric functions
        add("rad", "rad", 1.0);
        add("deg", "rad", std::f64::consts::PI / 180.0);

        Self { entries }
    }

    /// The shared built-in table
    pub fn global() -> &'static SiUnitTable {
        static TABLE: Lazy<SiUnitTable> = Lazy::new(SiUnitTable::build);
        &TABLE
    }
}

impl UnitTable for SiUnitTable {
    fn lookup(&self, symbol: &str) -> Option<UnitEntry> {
        self.entries.get(symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_symbols_resolve_to_themselves() {
        let table = SiUnitTable::global();
        for symbol in ["m", "kg", "s", "A", "K", "mol", "cd"] {
            let entry = table.lookup(symbol).unwrap();
            assert_eq!(entry.base, symbol);
            assert_eq!(entry.factor, 1.0);
        }
    }

    #[test]
    fn test_scaled_symbols() {
        let table = SiUnitTable::global();
        assert_eq!(table.lookup("cm").unwrap().factor, 0.01);
        assert_eq!(table.lookup("cm").unwrap().base, "m");
        assert_eq!(table.lookup("min").unwrap().factor, 60.0);
        assert!((table.lookup("deg").unwrap().factor - 0.017_453_292_519_943_295).abs() < 1e-15);
    }

    #[test]
    fn test_unknown_symbol() {
        assert!(SiUnitTable::global().lookup("furlong").is_none());
    }
}
