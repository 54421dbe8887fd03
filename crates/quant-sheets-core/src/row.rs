//! Named rows and the row store interface
//!
//! A [`NamedRow`] is the externally owned unit of spreadsheet state this
//! core reads and writes: a name, an optional formula, a declared display
//! unit, and one result slot per alternative column. The [`RowStore`]
//! trait decouples the calculation engine from whatever the UI layer keeps
//! rows in.

use ahash::AHashMap;
use lazy_regex::regex_is_match;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// One computed slot of a named row
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellResult {
    /// Nothing computed yet
    #[default]
    Empty,
    /// A successfully computed value
    Value(Value),
    /// An error marker, rendered by the UI in place of a value
    Error(String),
}

impl CellResult {
    /// The value, if this slot holds one
    pub fn value(&self) -> Option<&Value> {
        match self {
            CellResult::Value(v) => Some(v),
            _ => None,
        }
    }

    /// True if this slot holds an error marker
    pub fn is_error(&self) -> bool {
        matches!(self, CellResult::Error(_))
    }
}

impl std::fmt::Display for CellResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellResult::Empty => Ok(()),
            CellResult::Value(v) => write!(f, "{v}"),
            CellResult::Error(msg) => write!(f, "#ERROR: {msg}"),
        }
    }
}

/// A named spreadsheet row
///
/// The name is validated as an identifier at construction and never
/// changes afterwards; renaming is a delete-and-recreate concern of the
/// external row layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedRow {
    name: String,
    /// Formula text, if the row is computed rather than entered
    pub formula: Option<String>,
    /// Declared display unit; may be adopted from the first computed result
    pub unit: String,
    /// One result slot per alternative column
    pub results: Vec<CellResult>,
}

impl NamedRow {
    /// Create a row with `alts` empty result slots
    pub fn new(name: impl Into<String>, alts: usize) -> Result<Self> {
        let name = name.into();
        if !regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_]*$", &name) {
            return Err(Error::InvalidName(name));
        }
        Ok(Self {
            name,
            formula: None,
            unit: String::new(),
            results: vec![CellResult::Empty; alts.max(1)],
        })
    }

    /// The row name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builder-style formula assignment
    pub fn with_formula(mut self, text: impl Into<String>) -> Self {
        self.formula = Some(text.into());
        self
    }

    /// Builder-style declared unit assignment
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Builder-style raw value assignment for one column
    pub fn with_value(mut self, alt: usize, value: Value) -> Self {
        if alt < self.results.len() {
            self.results[alt] = CellResult::Value(value);
        }
        self
    }

    /// The result slot for a column
    pub fn result(&self, alt: usize) -> Option<&CellResult> {
        self.results.get(alt)
    }
}

/// Storage interface the recalculation engine drives
///
/// Implemented by the UI/persistence layer; [`MemoryRowStore`] is the
/// in-memory reference implementation.
pub trait RowStore {
    /// Look up a row by name
    fn get(&self, name: &str) -> Option<&NamedRow>;

    /// All row names, in a stable enumeration order
    fn names(&self) -> Vec<String>;

    /// Number of alternative result columns
    fn alt_count(&self) -> usize;

    /// Write a computed result (or error marker) into a row's slot
    fn set_result(&mut self, name: &str, alt: usize, result: CellResult);

    /// Update a row's declared unit (unit adoption)
    fn set_unit(&mut self, name: &str, unit: &str);
}

/// In-memory row store with insertion-ordered enumeration
#[derive(Debug)]
pub struct MemoryRowStore {
    rows: AHashMap<String, NamedRow>,
    order: Vec<String>,
    alts: usize,
}

impl MemoryRowStore {
    /// Create a store with `alts` alternative columns
    pub fn new(alts: usize) -> Self {
        Self {
            rows: AHashMap::new(),
            order: Vec::new(),
            alts: alts.max(1),
        }
    }

    /// Insert or replace a row; result slots are resized to the store width
    pub fn insert(&mut self, mut row: NamedRow) {
        row.results.resize(self.alts, CellResult::Empty);
        let name = row.name().to_string();
        if !self.rows.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.rows.insert(name, row);
    }

    /// Remove a row by name
    pub fn remove(&mut self, name: &str) -> Option<NamedRow> {
        self.order.retain(|n| n != name);
        self.rows.remove(name)
    }

    /// Mutable access to a row
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NamedRow> {
        self.rows.get_mut(name)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the store has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowStore for MemoryRowStore {
    fn get(&self, name: &str) -> Option<&NamedRow> {
        self.rows.get(name)
    }

    fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn alt_count(&self) -> usize {
        self.alts
    }

    fn set_result(&mut self, name: &str, alt: usize, result: CellResult) {
        if let Some(row) = self.rows.get_mut(name) {
            if let Some(slot) = row.results.get_mut(alt) {
                *slot = result;
            }
        }
    }

    fn set_unit(&mut self, name: &str, unit: &str) {
        if let Some(row) = self.rows.get_mut(name) {
            row.unit = unit.to_string();
        }
    }
}
