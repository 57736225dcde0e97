//! Unit-tagged numeric values.
//!
//! Every public numeric kernel takes [`Quantity`] or [`Scalar`] arguments and converts
//! them to the internal base units (cm⁻¹, K, s⁻¹, cm, cm², dimensionless) before any
//! arithmetic. A value without a unit tag is rejected with [`UnitsError::Missing`].

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Wavenumber,
    Temperature,
    Rate,
    Length,
    Area,
    Dimensionless,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Wavenumber => "wavenumber (1/length)",
            Dimension::Temperature => "temperature",
            Dimension::Rate => "rate (1/time)",
            Dimension::Length => "length",
            Dimension::Area => "area",
            Dimension::Dimensionless => "dimensionless",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    PerCentimeter,
    PerMeter,
    Kelvin,
    PerSecond,
    Centimeter,
    Meter,
    SquareCentimeter,
    SquareMeter,
    Dimensionless,
}

static UNIT_SYMBOLS: phf::Map<&'static str, Unit> = phf_map! {
    "1/cm" => Unit::PerCentimeter,
    "cm^-1" => Unit::PerCentimeter,
    "cm-1" => Unit::PerCentimeter,
    "1/m" => Unit::PerMeter,
    "m^-1" => Unit::PerMeter,
    "m-1" => Unit::PerMeter,
    "K" => Unit::Kelvin,
    "1/s" => Unit::PerSecond,
    "s^-1" => Unit::PerSecond,
    "s-1" => Unit::PerSecond,
    "cm" => Unit::Centimeter,
    "m" => Unit::Meter,
    "cm^2" => Unit::SquareCentimeter,
    "cm2" => Unit::SquareCentimeter,
    "m^2" => Unit::SquareMeter,
    "m2" => Unit::SquareMeter,
    "" => Unit::Dimensionless,
    "1" => Unit::Dimensionless,
    "dimensionless" => Unit::Dimensionless,
};

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::PerCentimeter => "1/cm",
            Unit::PerMeter => "1/m",
            Unit::Kelvin => "K",
            Unit::PerSecond => "1/s",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
            Unit::SquareCentimeter => "cm^2",
            Unit::SquareMeter => "m^2",
            Unit::Dimensionless => "dimensionless",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::PerCentimeter | Unit::PerMeter => Dimension::Wavenumber,
            Unit::Kelvin => Dimension::Temperature,
            Unit::PerSecond => Dimension::Rate,
            Unit::Centimeter | Unit::Meter => Dimension::Length,
            Unit::SquareCentimeter | Unit::SquareMeter => Dimension::Area,
            Unit::Dimensionless => Dimension::Dimensionless,
        }
    }

    /// Multiplier taking a value in this unit to the base unit of its dimension.
    pub fn factor_to_base(&self) -> f64 {
        match self {
            Unit::PerMeter => 1e-2,
            Unit::Meter => 1e2,
            Unit::SquareMeter => 1e4,
            _ => 1.0,
        }
    }

    /// The internal base unit for a dimension.
    pub fn base(dimension: Dimension) -> Unit {
        match dimension {
            Dimension::Wavenumber => Unit::PerCentimeter,
            Dimension::Temperature => Unit::Kelvin,
            Dimension::Rate => Unit::PerSecond,
            Dimension::Length => Unit::Centimeter,
            Dimension::Area => Unit::SquareCentimeter,
            Dimension::Dimensionless => Unit::Dimensionless,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        UNIT_SYMBOLS
            .get(key.as_str())
            .copied()
            .ok_or_else(|| UnitsError::UnknownSymbol(s.to_string()))
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol().to_string()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitsError {
    #[error("Argument '{argument}' has no physical unit attached (expected {expected})")]
    Missing {
        argument: &'static str,
        expected: Dimension,
    },
    #[error("Argument '{argument}' is in '{found}', but {expected} was expected")]
    Mismatch {
        argument: &'static str,
        expected: Dimension,
        found: Unit,
    },
    #[error("Unknown unit symbol: '{0}'")]
    UnknownSymbol(String),
}

fn require(
    unit: Option<Unit>,
    expected: Dimension,
    argument: &'static str,
) -> Result<Unit, UnitsError> {
    let unit = unit.ok_or(UnitsError::Missing { argument, expected })?;
    if unit.dimension() != expected {
        return Err(UnitsError::Mismatch {
            argument,
            expected,
            found: unit,
        });
    }
    Ok(unit)
}

/// A numeric array with an optional physical unit tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quantity {
    values: Vec<f64>,
    unit: Option<Unit>,
}

impl Quantity {
    pub fn new(values: Vec<f64>, unit: Unit) -> Self {
        Self {
            values,
            unit: Some(unit),
        }
    }

    /// Bare numbers, as a parser produces them before they are tagged.
    pub fn raw(values: Vec<f64>) -> Self {
        Self { values, unit: None }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn unit(&self) -> Option<Unit> {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values expressed in the base unit of `expected`, borrowing when no scaling is needed.
    ///
    /// # Errors
    ///
    /// Returns [`UnitsError::Missing`] for an untagged quantity and
    /// [`UnitsError::Mismatch`] when the tag belongs to another dimension.
    pub fn to_base(
        &self,
        expected: Dimension,
        argument: &'static str,
    ) -> Result<Cow<'_, [f64]>, UnitsError> {
        let unit = require(self.unit, expected, argument)?;
        let factor = unit.factor_to_base();
        if factor == 1.0 {
            Ok(Cow::Borrowed(&self.values))
        } else {
            Ok(Cow::Owned(self.values.iter().map(|v| v * factor).collect()))
        }
    }

    /// Converts to another unit of the same dimension.
    pub fn to_unit(&self, target: Unit) -> Result<Quantity, UnitsError> {
        let base = self.to_base(target.dimension(), "quantity")?;
        let inverse = 1.0 / target.factor_to_base();
        Ok(Quantity::new(
            base.iter().map(|v| v * inverse).collect(),
            target,
        ))
    }
}

/// A single value with an optional physical unit tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar {
    value: f64,
    unit: Option<Unit>,
}

impl Scalar {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self {
            value,
            unit: Some(unit),
        }
    }

    pub fn raw(value: f64) -> Self {
        Self { value, unit: None }
    }

    pub fn kelvin(value: f64) -> Self {
        Self::new(value, Unit::Kelvin)
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Unit::Dimensionless)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Option<Unit> {
        self.unit
    }

    pub fn to_base(&self, expected: Dimension, argument: &'static str) -> Result<f64, UnitsError> {
        let unit = require(self.unit, expected, argument)?;
        Ok(self.value * unit.factor_to_base())
    }
}
