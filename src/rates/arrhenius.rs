//! Elementary Arrhenius rates.

use crate::arrhenius::ArrheniusCoeff;
use crate::multirate::{EvaluatorLink, RateParams, RateType, ReactionRate};
use crate::params::{ParamMap, ParamValue};
use crate::rates::data::ArrheniusData;
use crate::rates::error::RateError;
use crate::units::Units;

/// An elementary reaction rate k(T) = A·T^b·exp(−E/RT).
///
/// Configured from a `rate-constant: {A, b, Ea}` block; the optional
/// `negative-A` flag permits a negative pre-exponential factor, which
/// validation otherwise rejects.
#[derive(Debug, Clone, Default)]
pub struct ArrheniusRate {
    coeff: ArrheniusCoeff,
    allow_negative_a: bool,
    link: EvaluatorLink<Self>,
}

impl ArrheniusRate {
    /// Builds a rate from a pre-exponential factor, temperature exponent
    /// and activation energy in J/kmol.
    pub fn new(a: f64, b: f64, e: f64) -> Self {
        Self {
            coeff: ArrheniusCoeff::new(a, b, e),
            ..Self::default()
        }
    }

    /// Builds a rate from an already-normalized coefficient triple.
    pub fn from_coeff(coeff: ArrheniusCoeff, allow_negative_a: bool) -> Self {
        Self {
            coeff,
            allow_negative_a,
            ..Self::default()
        }
    }

    /// Builds a rate from a parameter node under the given rate-unit
    /// context.
    pub fn from_parameters(node: &ParamMap, rate_units: &Units) -> Result<Self, RateError> {
        let mut rate = Self::default();
        rate.set_parameters(node, rate_units)?;
        Ok(rate)
    }

    pub fn coeff(&self) -> &ArrheniusCoeff {
        &self.coeff
    }

    pub fn pre_exponential_factor(&self) -> f64 {
        self.coeff.pre_exponential_factor()
    }

    pub fn temperature_exponent(&self) -> f64 {
        self.coeff.temperature_exponent()
    }

    /// The activation temperature E/R [K].
    pub fn activation_temperature(&self) -> f64 {
        self.coeff.activation_temperature()
    }

    /// The activation energy [J/kmol].
    pub fn activation_energy(&self) -> f64 {
        self.coeff.activation_energy()
    }

    pub fn allow_negative_pre_exponential_factor(&self) -> bool {
        self.allow_negative_a
    }

    pub fn set_pre_exponential_factor(&mut self, a: f64) {
        self.coeff.set_pre_exponential_factor(a);
        self.link
            .forward(move |copy| copy.coeff.set_pre_exponential_factor(a));
    }

    pub fn set_temperature_exponent(&mut self, b: f64) {
        self.coeff.set_temperature_exponent(b);
        self.link
            .forward(move |copy| copy.coeff.set_temperature_exponent(b));
    }

    /// Sets the activation energy from a value in J/kmol.
    pub fn set_activation_energy(&mut self, e: f64) {
        self.coeff.set_activation_energy(e);
        self.link
            .forward(move |copy| copy.coeff.set_activation_energy(e));
    }
}

impl TryFrom<&ParamMap> for ArrheniusRate {
    type Error = RateError;

    /// Builds a rate from a parameter node with unit rate units.
    fn try_from(node: &ParamMap) -> Result<Self, Self::Error> {
        Self::from_parameters(node, &Units::dimensionless())
    }
}

impl RateParams for ArrheniusRate {
    fn rate_type(&self) -> RateType {
        RateType::Arrhenius
    }

    fn set_parameters(&mut self, node: &ParamMap, rate_units: &Units) -> Result<(), RateError> {
        self.allow_negative_a = node.get_bool("negative-A", false);
        match node.get("rate-constant") {
            Some(ParamValue::Map(coeffs)) => {
                self.coeff
                    .set_parameters(coeffs, &node.units_or_default(), rate_units)
            }
            Some(_) => Err(RateError::InvalidParameter(
                "'rate-constant' must be a mapping".into(),
            )),
            // absent block leaves the rate unset for a later call
            None => Ok(()),
        }
    }

    fn get_parameters(&self, _rate_units: &Units) -> ParamMap {
        let mut node = ParamMap::new();
        if self.allow_negative_a {
            node.insert("negative-A", true);
        }
        let coeffs = self.coeff.get_parameters();
        if !coeffs.is_empty() {
            node.insert("rate-constant", coeffs);
        }
        node
    }

    fn validate(&self, equation: &str) -> Result<(), RateError> {
        if !self.allow_negative_a && self.coeff.pre_exponential_factor() < 0.0 {
            return Err(RateError::InvalidParameter(format!(
                "undeclared negative pre-exponential factor in reaction '{equation}'"
            )));
        }
        Ok(())
    }
}

impl ReactionRate for ArrheniusRate {
    type Data = ArrheniusData;

    fn eval(&self, data: &Self::Data) -> f64 {
        self.coeff.eval(data.log_temp, data.recip_temp)
    }

    fn link(&self) -> &EvaluatorLink<Self> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut EvaluatorLink<Self> {
        &mut self.link
    }
}
