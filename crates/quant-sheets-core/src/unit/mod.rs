//! Unit-dimension algebra
//!
//! Parses unit expressions ("kg*m/s^2", "cm^3"), composes and compares
//! dimension maps, and computes the aggregate factor that converts a
//! compound unit's numeric value into base units.

mod table;

pub use table::{SiUnitTable, UnitEntry, UnitTable};

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Map from unit symbol to a real exponent
///
/// Entries with exponent zero are never stored. Backing the map with a
/// `BTreeMap` keeps iteration lexicographic, which makes the canonical
/// string form deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dimension {
    exponents: BTreeMap<String, f64>,
}

impl Dimension {
    /// The empty (dimensionless) map
    pub fn new() -> Self {
        Self::default()
    }

    /// A single symbol with exponent 1
    pub fn base(symbol: &str) -> Self {
        let mut dims = Self::new();
        dims.add(symbol, 1.0);
        dims
    }

    /// True if there are no non-zero exponents
    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    /// The exponent for a symbol (0 if absent)
    pub fn exponent(&self, symbol: &str) -> f64 {
        self.exponents.get(symbol).copied().unwrap_or(0.0)
    }

    /// Add `delta` to a symbol's exponent, dropping the entry if it cancels
    pub fn add(&mut self, symbol: &str, delta: f64) {
        let exp = self.exponent(symbol) + delta;
        if exp == 0.0 {
            self.exponents.remove(symbol);
        } else {
            self.exponents.insert(symbol.to_string(), exp);
        }
    }

    /// Product of two dimension maps (exponents add)
    pub fn mul(&self, other: &Dimension) -> Dimension {
        let mut result = self.clone();
        for (symbol, exp) in &other.exponents {
            result.add(symbol, *exp);
        }
        result
    }

    /// Quotient of two dimension maps (exponents subtract)
    pub fn div(&self, other: &Dimension) -> Dimension {
        let mut result = self.clone();
        for (symbol, exp) in &other.exponents {
            result.add(symbol, -exp);
        }
        result
    }

    /// Scale every exponent by a real power
    pub fn pow(&self, power: f64) -> Dimension {
        let mut result = Dimension::new();
        if power == 0.0 {
            return result;
        }
        for (symbol, exp) in &self.exponents {
            result.add(symbol, exp * power);
        }
        result
    }

    /// Reciprocal (all exponents negated)
    pub fn inverse(&self) -> Dimension {
        self.pow(-1.0)
    }

    /// Iterate over (symbol, exponent) pairs in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.exponents.iter().map(|(s, e)| (s.as_str(), *e))
    }
}

impl fmt::Display for Dimension {
    /// Canonical form: positive-exponent terms joined by `*`, then each
    /// negative-exponent term appended as `/term`; exponent 1 is omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (symbol, exp) in self.iter() {
            if exp > 0.0 {
                if !first {
                    write!(f, "*")?;
                }
                write_term(f, symbol, exp)?;
                first = false;
            }
        }
        for (symbol, exp) in self.iter() {
            if exp < 0.0 {
                write!(f, "/")?;
                write_term(f, symbol, -exp)?;
            }
        }
        Ok(())
    }
}

fn write_term(f: &mut fmt::Formatter<'_>, symbol: &str, exp: f64) -> fmt::Result {
    if exp == 1.0 {
        write!(f, "{symbol}")
    } else if exp == exp.trunc() && exp.abs() < 1e15 {
        write!(f, "{}^{}", symbol, exp as i64)
    } else {
        write!(f, "{symbol}^{exp}")
    }
}

/// Parse a unit expression into a dimension map over the symbols as written
///
/// Grammar: terms separated by `*` (product) or `/` (inverse); each term is
/// `base` or `base^exponent` with a real exponent. A leading `/` is allowed
/// ("/s" is one-over-seconds). The empty string is the dimensionless map.
pub fn parse_unit(text: &str) -> Result<Dimension> {
    let text = text.trim();
    let mut dims = Dimension::new();
    if text.is_empty() {
        return Ok(dims);
    }

    let mut rest = text;
    let mut negate = false;
    loop {
        // A separator before the first term is only legal for `/`
        if let Some(stripped) = rest.strip_prefix('/') {
            negate = true;
            rest = stripped;
        }

        let term_end = rest
            .find(|c| c == '*' || c == '/')
            .unwrap_or(rest.len());
        let term = rest[..term_end].trim();
        parse_term(term, negate, text, &mut dims)?;

        rest = &rest[term_end..];
        match rest.chars().next() {
            None => break,
            Some('*') => {
                negate = false;
                rest = rest[1..].trim_start();
            }
            // Leave the `/` for the next iteration's strip_prefix
            Some('/') => {
                negate = false;
                rest = rest.trim_start();
            }
            _ => unreachable!("term_end stops at a separator"),
        }
    }

    Ok(dims)
}

fn parse_term(term: &str, negate: bool, whole: &str, dims: &mut Dimension) -> Result<()> {
    if term.is_empty() {
        return Err(Error::InvalidUnit(whole.to_string()));
    }
    let (symbol, exp) = match term.split_once('^') {
        Some((symbol, exp_text)) => {
            let exp: f64 = exp_text
                .trim()
                .parse()
                .map_err(|_| Error::InvalidUnit(whole.to_string()))?;
            (symbol.trim(), exp)
        }
        None => (term, 1.0),
    };
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidUnit(whole.to_string()));
    }
    dims.add(symbol, if negate { -exp } else { exp });
    Ok(())
}

/// A unit expression resolved through a [`UnitTable`]
#[derive(Debug, Clone, PartialEq)]
pub struct UnitInfo {
    /// Dimensions expressed in base symbols
    pub dims: Dimension,
    /// Multiplier converting the unit's numeric value into base units
    pub factor: f64,
    /// Canonical base-unit string
    pub normalized: String,
}

/// Resolve a unit expression to base dimensions and an aggregate factor
pub fn unit_info(text: &str, table: &dyn UnitTable) -> Result<UnitInfo> {
    let parsed = parse_unit(text)?;
    let mut dims = Dimension::new();
    let mut factor = 1.0;
    for (symbol, exp) in parsed.iter() {
        let entry = table
            .lookup(symbol)
            .ok_or_else(|| Error::UnknownUnit(symbol.to_string()))?;
        dims.add(entry.base, exp);
        factor *= entry.factor.powf(exp);
    }
    let normalized = dims.to_string();
    Ok(UnitInfo {
        dims,
        factor,
        normalized,
    })
}
