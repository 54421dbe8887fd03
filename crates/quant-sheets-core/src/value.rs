//! Tagged values with an optional physical unit
//!
//! A [`Value`] pairs a payload (number, boolean, text, or 2/3-element
//! vector) with a unit string. Values are immutable; conversions produce
//! new values.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::unit::{unit_info, UnitTable};

/// The payload of a [`Value`]
///
/// Serialized (with the `serde` feature) as plain JSON: a number, boolean,
/// string, or 2/3-element numeric array.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Payload {
    /// Double-precision number
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// Text
    Text(String),
    /// Ordered list of exactly 2 or 3 numbers
    Vector(Vec<f64>),
}

impl Payload {
    /// Scale numeric content by a factor; booleans and text are unchanged
    fn scaled(&self, factor: f64) -> Payload {
        match self {
            Payload::Number(n) => Payload::Number(n * factor),
            Payload::Vector(v) => Payload::Vector(v.iter().map(|x| x * factor).collect()),
            other => other.clone(),
        }
    }

    /// True for numbers and vectors, the payloads a unit is meaningful for
    pub fn is_quantity(&self) -> bool {
        matches!(self, Payload::Number(_) | Payload::Vector(_))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Number(n) => write!(f, "{n}"),
            Payload::Boolean(b) => write!(f, "{b}"),
            Payload::Text(s) => write!(f, "{s}"),
            Payload::Vector(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An immutable value with an optional unit
///
/// The unit string follows the unit grammar of [`crate::unit`]; the empty
/// string means dimensionless. Units are only meaningful for number and
/// vector payloads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Value {
    payload: Payload,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    unit: String,
}

impl Value {
    /// A dimensionless number
    pub fn number(n: f64) -> Self {
        Self {
            payload: Payload::Number(n),
            unit: String::new(),
        }
    }

    /// A number with a unit
    pub fn number_with_unit(n: f64, unit: impl Into<String>) -> Self {
        Self {
            payload: Payload::Number(n),
            unit: unit.into(),
        }
    }

    /// A boolean
    pub fn boolean(b: bool) -> Self {
        Self {
            payload: Payload::Boolean(b),
            unit: String::new(),
        }
    }

    /// A text value
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            payload: Payload::Text(s.into()),
            unit: String::new(),
        }
    }

    /// A dimensionless vector of 2 or 3 elements
    pub fn vector(elements: Vec<f64>) -> Result<Self> {
        Self::vector_with_unit(elements, "")
    }

    /// A vector of 2 or 3 elements with a unit
    pub fn vector_with_unit(elements: Vec<f64>, unit: impl Into<String>) -> Result<Self> {
        if elements.len() != 2 && elements.len() != 3 {
            return Err(Error::InvalidVectorLength(elements.len()));
        }
        Ok(Self {
            payload: Payload::Vector(elements),
            unit: unit.into(),
        })
    }

    /// Rebuild an existing value with a different unit string, no scaling
    pub fn with_unit(&self, unit: impl Into<String>) -> Self {
        Self {
            payload: self.payload.clone(),
            unit: unit.into(),
        }
    }

    /// The payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The unit string (empty means dimensionless)
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// The number, if this is a number payload
    pub fn as_number(&self) -> Option<f64> {
        match self.payload {
            Payload::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean payload
    pub fn as_boolean(&self) -> Option<bool> {
        match self.payload {
            Payload::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// The text, if this is a text payload
    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The vector elements, if this is a vector payload
    pub fn as_vector(&self) -> Option<&[f64]> {
        match &self.payload {
            Payload::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Express this value in base units
    ///
    /// Numbers and vectors with a non-empty unit are scaled by the
    /// aggregate factor and tagged with the normalized base-unit string;
    /// everything else is returned unchanged.
    pub fn as_base_unit(&self, table: &dyn UnitTable) -> Result<Value> {
        if self.unit.is_empty() || !self.payload.is_quantity() {
            return Ok(self.clone());
        }
        let info = unit_info(&self.unit, table)?;
        Ok(Value {
            payload: self.payload.scaled(info.factor),
            unit: info.normalized,
        })
    }

    /// Convert this value into a target unit
    ///
    /// Returns the converted value together with the applied factor
    /// (`base_factor(self) / base_factor(target)`). Fails with
    /// [`Error::IncompatibleUnits`] when base dimensions differ and with
    /// [`Error::UnspecifiedUnit`] when exactly one side is empty.
    pub fn as_given_unit(&self, target: &str, table: &dyn UnitTable) -> Result<(Value, f64)> {
        if !self.payload.is_quantity() {
            return Ok((self.clone(), 1.0));
        }
        if self.unit.is_empty() && target.is_empty() {
            return Ok((self.clone(), 1.0));
        }
        if self.unit.is_empty() || target.is_empty() {
            return Err(Error::UnspecifiedUnit);
        }
        let from = unit_info(&self.unit, table)?;
        let to = unit_info(target, table)?;
        if from.dims != to.dims {
            return Err(Error::IncompatibleUnits {
                from: self.unit.clone(),
                to: target.to_string(),
            });
        }
        let factor = from.factor / to.factor;
        Ok((
            Value {
                payload: self.payload.scaled(factor),
                unit: target.to_string(),
            },
            factor,
        ))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}", self.payload)
        } else {
            write!(f, "{} {}", self.payload, self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::SiUnitTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vector_length_enforced() {
        assert!(Value::vector(vec![1.0, 2.0]).is_ok());
        assert!(Value::vector(vec![1.0, 2.0, 3.0]).is_ok());
        assert_eq!(
            Value::vector(vec![1.0]),
            Err(Error::InvalidVectorLength(1))
        );
        assert_eq!(
            Value::vector(vec![1.0, 2.0, 3.0, 4.0]),
            Err(Error::InvalidVectorLength(4))
        );
    }

    #[test]
    fn test_as_base_unit_number() {
        let v = Value::number_with_unit(3.0, "cm");
        let base = v.as_base_unit(SiUnitTable::global()).unwrap();
        assert_eq!(base, Value::number_with_unit(0.03, "m"));
    }

    #[test]
    fn test_as_base_unit_vector() {
        let v = Value::vector_with_unit(vec![1.0, 2.0], "km").unwrap();
        let base = v.as_base_unit(SiUnitTable::global()).unwrap();
        assert_eq!(
            base,
            Value::vector_with_unit(vec![1_000.0, 2_000.0], "m").unwrap()
        );
    }

    #[test]
    fn test_as_base_unit_passthrough() {
        let v = Value::text("hello");
        assert_eq!(v.as_base_unit(SiUnitTable::global()).unwrap(), v);
        let v = Value::number(42.0);
        assert_eq!(v.as_base_unit(SiUnitTable::global()).unwrap(), v);
    }

    #[test]
    fn test_as_given_unit() {
        let v = Value::number_with_unit(2.5, "m");
        let (converted, factor) = v.as_given_unit("cm", SiUnitTable::global()).unwrap();
        assert_eq!(converted, Value::number_with_unit(250.0, "cm"));
        assert_eq!(factor, 100.0);
    }

    #[test]
    fn test_as_given_unit_incompatible() {
        let v = Value::number_with_unit(1.0, "kg");
        assert_eq!(
            v.as_given_unit("m", SiUnitTable::global()),
            Err(Error::IncompatibleUnits {
                from: "kg".to_string(),
                to: "m".to_string(),
            })
        );
    }

    #[test]
    fn test_as_given_unit_unspecified() {
        let v = Value::number(1.0);
        assert_eq!(
            v.as_given_unit("m", SiUnitTable::global()),
            Err(Error::UnspecifiedUnit)
        );
        let v = Value::number_with_unit(1.0, "m");
        assert_eq!(
            v.as_given_unit("", SiUnitTable::global()),
            Err(Error::UnspecifiedUnit)
        );
    }

    #[test]
    fn test_conversion_roundtrip() {
        let v = Value::number_with_unit(12.34, "km/h");
        let table = SiUnitTable::global();
        let (there, _) = v.as_given_unit("m/s", table).unwrap();
        let (back, _) = there.as_given_unit("km/h", table).unwrap();
        let diff = (back.as_number().unwrap() - 12.34).abs();
        assert!(diff < 1e-9, "round-trip drifted by {diff}");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::number_with_unit(3.0, "cm").to_string(), "3 cm");
        assert_eq!(
            Value::vector_with_unit(vec![1.0, 2.0], "m")
                .unwrap()
                .to_string(),
            "[1, 2] m"
        );
        assert_eq!(Value::boolean(true).to_string(), "true");
    }
}
