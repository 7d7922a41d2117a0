//! Unit Handling Module
//!
//! This module provides dimensional analysis for rate configuration:
//!
//! - [`Units`]: an exponent vector over the base dimensions (mass, length,
//!   time, quantity, temperature, current) together with a scale factor to SI
//! - Parsing of compound unit strings such as `"m^3/kmol/s"` or `"cal/mol"`
//! - [`UnitSystem`]: the per-document unit context (activation-energy,
//!   quantity, length and time units) used to interpret bare numbers
//!
//! The SI bases used by the crate are kg, m, s, kmol, K and A. Activation
//! energies are normalized to J/kmol and stored divided by the universal gas
//! constant, so their storage unit is Kelvin.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Div, Mul};

use derivative::Derivative;
use derive_builder::Builder;
use thiserror::Error;

use crate::constants::{AVOGADRO, GAS_CONSTANT, ONE_ATM, ONE_BAR};
use crate::params::ParamValue;

/// Errors arising from unit parsing and conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// A unit symbol was not found in the symbol table.
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
    /// A quantity string could not be split into a number and a unit.
    #[error("malformed quantity '{0}'")]
    MalformedQuantity(String),
    /// Source and destination units span different dimensions.
    #[error("incompatible dimensions: cannot convert '{from}' to '{to}'")]
    Incompatible { from: String, to: String },
    /// A parameter value that should be a number or quantity string is neither.
    #[error("expected a number or a quantity string, found {0}")]
    NotAQuantity(String),
}

/// A unit of measurement: a scale factor to SI plus an exponent for each
/// base dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    factor: f64,
    mass: f64,
    length: f64,
    time: f64,
    quantity: f64,
    temperature: f64,
    current: f64,
}

lazy_static::lazy_static! {
    /// Recognized unit symbols and their SI equivalents.
    static ref BASE_UNITS: HashMap<&'static str, Units> = {
        let mut m = HashMap::new();
        // Mass
        m.insert("kg", Units::base(1.0, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        m.insert("g", Units::base(1.0e-3, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));

        // Length
        m.insert("m", Units::base(1.0, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0]));
        m.insert("cm", Units::base(1.0e-2, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0]));
        m.insert("mm", Units::base(1.0e-3, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0]));
        m.insert("km", Units::base(1.0e3, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0]));

        // Time
        m.insert("s", Units::base(1.0, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]));
        m.insert("ms", Units::base(1.0e-3, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]));
        m.insert("min", Units::base(60.0, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]));
        m.insert("h", Units::base(3600.0, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]));
        m.insert("hr", Units::base(3600.0, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]));

        // Quantity
        m.insert("kmol", Units::base(1.0, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        m.insert("mol", Units::base(1.0e-3, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        m.insert("mmol", Units::base(1.0e-6, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        m.insert("molec", Units::base(1.0 / AVOGADRO, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));

        // Temperature
        m.insert("K", Units::base(1.0, [0.0, 0.0, 0.0, 0.0, 1.0, 0.0]));

        // Current
        m.insert("A", Units::base(1.0, [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]));

        // Energy
        m.insert("J", Units::base(1.0, [1.0, 2.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("kJ", Units::base(1.0e3, [1.0, 2.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("cal", Units::base(4.184, [1.0, 2.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("kcal", Units::base(4184.0, [1.0, 2.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("erg", Units::base(1.0e-7, [1.0, 2.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("eV", Units::base(1.602176634e-19, [1.0, 2.0, -2.0, 0.0, 0.0, 0.0]));

        // Pressure
        m.insert("Pa", Units::base(1.0, [1.0, -1.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("kPa", Units::base(1.0e3, [1.0, -1.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("MPa", Units::base(1.0e6, [1.0, -1.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("atm", Units::base(ONE_ATM, [1.0, -1.0, -2.0, 0.0, 0.0, 0.0]));
        m.insert("bar", Units::base(ONE_BAR, [1.0, -1.0, -2.0, 0.0, 0.0, 0.0]));

        // Dimensionless
        m.insert("1", Units::dimensionless());

        m
    };
}

impl Units {
    const fn base(factor: f64, exponents: [f64; 6]) -> Self {
        Self {
            factor,
            mass: exponents[0],
            length: exponents[1],
            time: exponents[2],
            quantity: exponents[3],
            temperature: exponents[4],
            current: exponents[5],
        }
    }

    /// A pure number (factor 1, no dimensions).
    pub const fn dimensionless() -> Self {
        Self::base(1.0, [0.0; 6])
    }

    /// J/kmol, the SI unit for molar energies.
    pub const fn joules_per_kmol() -> Self {
        Self::base(1.0, [1.0, 2.0, -2.0, -1.0, 0.0, 0.0])
    }

    /// The SI quantity base, kmol.
    pub const fn kilomoles() -> Self {
        Self::base(1.0, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0])
    }

    /// The SI length base, m.
    pub const fn metres() -> Self {
        Self::base(1.0, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0])
    }

    /// The SI time base, s.
    pub const fn seconds() -> Self {
        Self::base(1.0, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
    }

    /// The SI pressure unit, Pa.
    pub const fn pascals() -> Self {
        Self::base(1.0, [1.0, -1.0, -2.0, 0.0, 0.0, 0.0])
    }

    /// The SI temperature base, K.
    pub const fn kelvin() -> Self {
        Self::base(1.0, [0.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }

    /// Parses a compound unit string such as `"m^3/kmol/s"` or `"cal/mol"`.
    ///
    /// The first `/`-separated segment is the numerator; every further
    /// segment divides. Factors within a segment are separated by `*`, and
    /// each factor may carry a `^` exponent.
    pub fn parse(text: &str) -> Result<Self, UnitError> {
        let mut result = Units::dimensionless();
        for (i, segment) in text.split('/').enumerate() {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(UnitError::MalformedQuantity(text.to_string()));
            }
            for token in segment.split('*') {
                let parsed = Self::parse_token(token.trim())?;
                if i == 0 {
                    result = result * parsed;
                } else {
                    result = result / parsed;
                }
            }
        }
        Ok(result)
    }

    fn parse_token(token: &str) -> Result<Self, UnitError> {
        let (symbol, exponent) = match token.split_once('^') {
            Some((symbol, exp)) => {
                let exp: f64 = exp
                    .trim()
                    .parse()
                    .map_err(|_| UnitError::MalformedQuantity(token.to_string()))?;
                (symbol.trim(), exp)
            }
            None => (token, 1.0),
        };
        BASE_UNITS
            .get(symbol)
            .map(|unit| unit.pow(exponent))
            .ok_or_else(|| UnitError::UnknownUnit(symbol.to_string()))
    }

    /// The scale factor to SI.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Raises the unit to a power.
    pub fn pow(&self, exponent: f64) -> Self {
        Self {
            factor: self.factor.powf(exponent),
            mass: self.mass * exponent,
            length: self.length * exponent,
            time: self.time * exponent,
            quantity: self.quantity * exponent,
            temperature: self.temperature * exponent,
            current: self.current * exponent,
        }
    }

    /// Whether two units span the same dimensions (factors may differ).
    pub fn same_dimensions(&self, other: &Self) -> bool {
        self.mass == other.mass
            && self.length == other.length
            && self.time == other.time
            && self.quantity == other.quantity
            && self.temperature == other.temperature
            && self.current == other.current
    }

    /// The multiplier taking a value in `self` to a value in `dest`.
    pub fn factor_to(&self, dest: &Self) -> Result<f64, UnitError> {
        if !self.same_dimensions(dest) {
            return Err(UnitError::Incompatible {
                from: self.to_string(),
                to: dest.to_string(),
            });
        }
        Ok(self.factor / dest.factor)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.same_dimensions(&Units::dimensionless())
    }

    pub fn is_temperature(&self) -> bool {
        self.same_dimensions(&Units::kelvin())
    }

    /// Whether the unit is an energy per quantity (e.g. J/kmol, cal/mol).
    pub fn is_energy_per_quantity(&self) -> bool {
        self.same_dimensions(&Units::joules_per_kmol())
    }

    pub(crate) fn quantity_exponent(&self) -> f64 {
        self.quantity
    }

    pub(crate) fn length_exponent(&self) -> f64 {
        self.length
    }

    pub(crate) fn time_exponent(&self) -> f64 {
        self.time
    }
}

impl Mul for Units {
    type Output = Units;

    fn mul(self, rhs: Units) -> Units {
        Units {
            factor: self.factor * rhs.factor,
            mass: self.mass + rhs.mass,
            length: self.length + rhs.length,
            time: self.time + rhs.time,
            quantity: self.quantity + rhs.quantity,
            temperature: self.temperature + rhs.temperature,
            current: self.current + rhs.current,
        }
    }
}

impl Div for Units {
    type Output = Units;

    fn div(self, rhs: Units) -> Units {
        self * rhs.pow(-1.0)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = [
            ("kg", self.mass),
            ("m", self.length),
            ("s", self.time),
            ("kmol", self.quantity),
            ("K", self.temperature),
            ("A", self.current),
        ];
        let mut wrote = false;
        if self.factor != 1.0 {
            write!(f, "{}", self.factor)?;
            wrote = true;
        }
        for (symbol, exponent) in dims {
            if exponent == 0.0 {
                continue;
            }
            if wrote {
                write!(f, "·")?;
            }
            if exponent == 1.0 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exponent}")?;
            }
            wrote = true;
        }
        if !wrote {
            write!(f, "1")?;
        }
        Ok(())
    }
}

/// Splits a quantity string such as `"0.01 atm"` into its numeric value and
/// parsed unit.
pub fn parse_quantity(text: &str) -> Result<(f64, Units), UnitError> {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let value = parts
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| UnitError::MalformedQuantity(text.to_string()))?;
    let unit = parts
        .next()
        .ok_or_else(|| UnitError::MalformedQuantity(text.to_string()))?;
    Ok((value, Units::parse(unit)?))
}

/// The unit context attached to a configuration node.
///
/// Bare numbers in a node are interpreted in this system's units for the
/// expected dimensions; quantity strings carry their own units and override
/// it. Activation energies get their own default because mechanism files
/// routinely use cal/mol or kcal/mol while the rest of the document is SI.
#[derive(Debug, Clone, PartialEq, Builder, Derivative)]
#[derivative(Default)]
pub struct UnitSystem {
    /// Unit for activation energies; energy/quantity, or temperature for
    /// energies already divided by the gas constant.
    #[builder(default = "Units::joules_per_kmol()")]
    #[derivative(Default(value = "Units::joules_per_kmol()"))]
    pub activation_energy: Units,

    /// Unit for amounts of substance.
    #[builder(default = "Units::kilomoles()")]
    #[derivative(Default(value = "Units::kilomoles()"))]
    pub quantity: Units,

    /// Unit for lengths.
    #[builder(default = "Units::metres()")]
    #[derivative(Default(value = "Units::metres()"))]
    pub length: Units,

    /// Unit for times.
    #[builder(default = "Units::seconds()")]
    #[derivative(Default(value = "Units::seconds()"))]
    pub time: Units,
}

impl UnitSystem {
    /// The factor converting a bare number with `dims` dimensions from this
    /// system's units to SI. Dimensions outside the system (mass,
    /// temperature, current) are taken as SI already.
    pub fn factor_for(&self, dims: &Units) -> f64 {
        self.quantity.factor().powf(dims.quantity_exponent())
            * self.length.factor().powf(dims.length_exponent())
            * self.time.factor().powf(dims.time_exponent())
    }

    /// Converts a parameter value to a number expressed in `dest` units.
    ///
    /// Bare numbers are interpreted in this system's units for `dest`'s
    /// dimensions; quantity strings are converted from their own unit, which
    /// must span the same dimensions as `dest`.
    pub fn convert(&self, value: &ParamValue, dest: &Units) -> Result<f64, UnitError> {
        match value {
            ParamValue::Number(x) => Ok(x * self.factor_for(dest) / dest.factor()),
            ParamValue::String(text) => {
                let (x, unit) = parse_quantity(text)?;
                if !unit.same_dimensions(dest) {
                    return Err(UnitError::Incompatible {
                        from: unit.to_string(),
                        to: dest.to_string(),
                    });
                }
                Ok(x * unit.factor() / dest.factor())
            }
            other => Err(UnitError::NotAQuantity(format!("{other:?}"))),
        }
    }

    /// Converts an activation energy to E/R in Kelvin.
    ///
    /// Accepts energies per quantity (divided by the gas constant here) and
    /// temperatures (already E/R). Bare numbers use the system's
    /// activation-energy unit.
    pub fn convert_activation_energy(&self, value: &ParamValue) -> Result<f64, UnitError> {
        let (x, unit) = match value {
            ParamValue::Number(x) => (*x, self.activation_energy),
            ParamValue::String(text) => {
                let (x, unit) = parse_quantity(text)?;
                (x, unit)
            }
            other => return Err(UnitError::NotAQuantity(format!("{other:?}"))),
        };
        if unit.is_temperature() {
            Ok(x * unit.factor())
        } else if unit.is_energy_per_quantity() {
            Ok(x * unit.factor() / GAS_CONSTANT)
        } else {
            Err(UnitError::Incompatible {
                from: unit.to_string(),
                to: Units::joules_per_kmol().to_string(),
            })
        }
    }

    /// The rate-coefficient units for a reaction of the given order:
    /// concentration^(1 - order) / time, in this system's units.
    pub fn rate_units(&self, order: f64) -> Units {
        let concentration = self.quantity / self.length.pow(3.0);
        concentration.pow(1.0 - order) / self.time
    }
}
