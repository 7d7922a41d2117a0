//! The Arrhenius building block k(T) = A·T^b·exp(−E/RT), shared by the
//! elementary, three-body, falloff and pressure-dependent rate laws.
//!
//! Coefficients are stored normalized: `A` in the rate-unit context the
//! coefficient was configured with, and the activation energy divided by the
//! universal gas constant, so it carries units of temperature.

use crate::constants::GAS_CONSTANT;
use crate::params::ParamMap;
use crate::rates::error::RateError;
use crate::units::{UnitSystem, Units};

/// An Arrhenius coefficient triple (A, b, E/R).
///
/// Default construction leaves the triple unset (NaN); evaluation of an
/// unset triple yields NaN rather than an error so that batched evaluation
/// can proceed over partially configured ensembles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrheniusCoeff {
    a: f64,
    b: f64,
    e_r: f64,
}

impl Default for ArrheniusCoeff {
    fn default() -> Self {
        Self {
            a: f64::NAN,
            b: f64::NAN,
            e_r: f64::NAN,
        }
    }
}

impl ArrheniusCoeff {
    /// Builds a triple from a pre-exponential factor, temperature exponent
    /// and activation energy in J/kmol.
    pub fn new(a: f64, b: f64, e: f64) -> Self {
        Self {
            a,
            b,
            e_r: e / GAS_CONSTANT,
        }
    }

    /// Builds a triple from already-normalized storage, with the activation
    /// temperature E/R in Kelvin.
    pub fn from_normalized(a: f64, b: f64, e_r: f64) -> Self {
        Self { a, b, e_r }
    }

    /// Whether the triple has been configured.
    pub fn is_set(&self) -> bool {
        !self.a.is_nan()
    }

    pub fn pre_exponential_factor(&self) -> f64 {
        self.a
    }

    pub fn temperature_exponent(&self) -> f64 {
        self.b
    }

    /// The activation temperature E/R [K].
    pub fn activation_temperature(&self) -> f64 {
        self.e_r
    }

    /// The activation energy [J/kmol].
    pub fn activation_energy(&self) -> f64 {
        self.e_r * GAS_CONSTANT
    }

    pub fn set_pre_exponential_factor(&mut self, a: f64) {
        self.a = a;
    }

    pub fn set_temperature_exponent(&mut self, b: f64) {
        self.b = b;
    }

    /// Sets the activation energy from a value in J/kmol.
    pub fn set_activation_energy(&mut self, e: f64) {
        self.e_r = e / GAS_CONSTANT;
    }

    /// Evaluates k = A·exp(b·ln T − (E/R)/T) from shared temperature terms.
    pub fn eval(&self, log_temp: f64, recip_temp: f64) -> f64 {
        self.a * (self.b * log_temp - self.e_r * recip_temp).exp()
    }

    /// Configures the triple from an `{A, b, Ea}` mapping.
    ///
    /// `A` is required and converted into `rate_units`; `b` is dimensionless
    /// and `Ea` accepts any energy/quantity or temperature unit, both
    /// defaulting to zero when absent.
    pub fn set_parameters(
        &mut self,
        node: &ParamMap,
        units: &UnitSystem,
        rate_units: &Units,
    ) -> Result<(), RateError> {
        let a = node
            .get("A")
            .ok_or_else(|| RateError::InvalidParameter("rate constant is missing 'A'".into()))?;
        self.a = units.convert(a, rate_units)?;
        self.b = match node.get("b") {
            Some(b) => b.as_f64().ok_or_else(|| {
                RateError::InvalidParameter("temperature exponent 'b' must be a number".into())
            })?,
            None => 0.0,
        };
        self.e_r = match node.get("Ea") {
            Some(e) => units.convert_activation_energy(e)?,
            None => 0.0,
        };
        Ok(())
    }

    /// Serializes the triple back to an `{A, b, Ea}` mapping, with `A` in
    /// the configured rate-unit context and `Ea` in J/kmol. An unset triple
    /// yields an empty node.
    pub fn get_parameters(&self) -> ParamMap {
        let mut node = ParamMap::new();
        if self.is_set() {
            node.insert("A", self.a);
            node.insert("b", self.b);
            node.insert("Ea", self.e_r * GAS_CONSTANT);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use serde_json::json;

    use super::*;
    use crate::units::UnitSystemBuilder;

    #[test]
    fn test_eval_matches_closed_form() {
        let coeff = ArrheniusCoeff::new(38.7, 2.7, 6260.0 * 4184.0);
        let t: f64 = 1000.0;
        let expected = 38.7 * t.powf(2.7) * (-6260.0 * 4184.0 / GAS_CONSTANT / t).exp();
        assert_relative_eq!(coeff.eval(t.ln(), 1.0 / t), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_unset_triple_evaluates_to_nan() {
        let coeff = ArrheniusCoeff::default();
        assert!(!coeff.is_set());
        assert!(coeff.eval(1000f64.ln(), 1e-3).is_nan());
    }

    #[test]
    fn test_set_parameters_converts_activation_energy() {
        let node: ParamMap =
            serde_json::from_value(json!({"A": 38.7, "b": 2.7, "Ea": 6260.0})).unwrap();
        let units = UnitSystemBuilder::default()
            .activation_energy(Units::parse("cal/mol").unwrap())
            .build()
            .unwrap();

        let mut coeff = ArrheniusCoeff::default();
        coeff
            .set_parameters(&node, &units, &Units::dimensionless())
            .unwrap();
        assert_relative_eq!(
            coeff.activation_temperature(),
            6260.0 * 4184.0 / GAS_CONSTANT,
            max_relative = 1e-12
        );

        let out = coeff.get_parameters();
        assert_relative_eq!(out.get_f64("A").unwrap(), 38.7);
        assert_relative_eq!(
            out.get_f64("Ea").unwrap(),
            6260.0 * 4184.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_missing_a_is_rejected() {
        let node: ParamMap = serde_json::from_value(json!({"b": 2.7})).unwrap();
        let mut coeff = ArrheniusCoeff::default();
        let result = coeff.set_parameters(&node, &UnitSystem::default(), &Units::dimensionless());
        assert!(matches!(result, Err(RateError::InvalidParameter(_))));
    }
}
