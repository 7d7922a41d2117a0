//! Three-body rates: an Arrhenius coefficient scaled by the effective
//! collider concentration [M].

use std::collections::BTreeMap;

use derivative::Derivative;

use crate::arrhenius::ArrheniusCoeff;
use crate::multirate::{EvaluatorLink, RateParams, RateType, ReactionRate};
use crate::params::{ParamMap, ParamValue};
use crate::rates::data::ThreeBodyData;
use crate::rates::error::RateError;
use crate::units::Units;

/// A three-body reaction rate k_eff = k(T)·[M], with
/// [M] = Σ_s ε_s·[X_s] and per-species collision efficiencies ε defaulting
/// to 1 for unlisted species.
#[derive(Debug, Clone, Derivative)]
#[derivative(Default)]
pub struct ThreeBodyRate {
    coeff: ArrheniusCoeff,
    allow_negative_a: bool,
    efficiencies: BTreeMap<String, f64>,
    #[derivative(Default(value = "1.0"))]
    default_efficiency: f64,
    link: EvaluatorLink<Self>,
}

impl ThreeBodyRate {
    pub fn new(a: f64, b: f64, e: f64, efficiencies: BTreeMap<String, f64>) -> Self {
        Self {
            coeff: ArrheniusCoeff::new(a, b, e),
            efficiencies,
            ..Self::default()
        }
    }

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

    /// The collision efficiency of a species, applying the default for
    /// unlisted species.
    pub fn efficiency(&self, species: &str) -> f64 {
        self.efficiencies
            .get(species)
            .copied()
            .unwrap_or(self.default_efficiency)
    }

    pub fn efficiencies(&self) -> &BTreeMap<String, f64> {
        &self.efficiencies
    }

    /// The effective collider concentration [M] for the given composition.
    pub fn effective_concentration(&self, data: &ThreeBodyData) -> f64 {
        let mut conc_m = self.default_efficiency * data.total_concentration;
        for (species, efficiency) in &self.efficiencies {
            conc_m += (efficiency - self.default_efficiency) * data.concentration(species);
        }
        conc_m
    }

    /// Evaluates the rate with a caller-supplied [M], bypassing the
    /// efficiency weighting.
    pub fn eval_with_third_body(&self, data: &ThreeBodyData, conc_m: f64) -> f64 {
        self.coeff.eval(data.log_temp, data.recip_temp) * conc_m
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

    pub fn set_efficiencies(&mut self, efficiencies: BTreeMap<String, f64>) {
        self.efficiencies = efficiencies.clone();
        self.link.forward(move |copy| copy.efficiencies = efficiencies);
    }
}

impl TryFrom<&ParamMap> for ThreeBodyRate {
    type Error = RateError;

    fn try_from(node: &ParamMap) -> Result<Self, Self::Error> {
        Self::from_parameters(node, &Units::dimensionless())
    }
}

/// Reads an `efficiencies: {species: number}` block.
pub(crate) fn parse_efficiencies(node: &ParamMap) -> Result<BTreeMap<String, f64>, RateError> {
    let mut efficiencies = BTreeMap::new();
    if let Some(block) = node.get("efficiencies") {
        let block = block.as_map().ok_or_else(|| {
            RateError::InvalidParameter("'efficiencies' must be a mapping".into())
        })?;
        for (species, value) in block.iter() {
            let value = value.as_f64().ok_or_else(|| {
                RateError::InvalidParameter(format!(
                    "efficiency of species '{species}' must be a number"
                ))
            })?;
            efficiencies.insert(species.clone(), value);
        }
    }
    Ok(efficiencies)
}

pub(crate) fn efficiencies_node(efficiencies: &BTreeMap<String, f64>) -> ParamMap {
    let mut node = ParamMap::new();
    for (species, value) in efficiencies {
        node.insert(species.clone(), *value);
    }
    node
}

impl RateParams for ThreeBodyRate {
    fn rate_type(&self) -> RateType {
        RateType::ThreeBody
    }

    fn set_parameters(&mut self, node: &ParamMap, rate_units: &Units) -> Result<(), RateError> {
        self.allow_negative_a = node.get_bool("negative-A", false);
        self.efficiencies = parse_efficiencies(node)?;
        if let Some(value) = node.get("default-efficiency") {
            self.default_efficiency = value.as_f64().ok_or_else(|| {
                RateError::InvalidParameter("'default-efficiency' must be a number".into())
            })?;
        }
        match node.get("rate-constant") {
            Some(ParamValue::Map(coeffs)) => {
                self.coeff
                    .set_parameters(coeffs, &node.units_or_default(), rate_units)
            }
            Some(_) => Err(RateError::InvalidParameter(
                "'rate-constant' must be a mapping".into(),
            )),
            None => Ok(()),
        }
    }

    fn get_parameters(&self, _rate_units: &Units) -> ParamMap {
        let mut node = ParamMap::new();
        node.insert("type", self.rate_type().label());
        if self.allow_negative_a {
            node.insert("negative-A", true);
        }
        let coeffs = self.coeff.get_parameters();
        if !coeffs.is_empty() {
            node.insert("rate-constant", coeffs);
        }
        if !self.efficiencies.is_empty() {
            node.insert("efficiencies", efficiencies_node(&self.efficiencies));
        }
        if self.default_efficiency != 1.0 {
            node.insert("default-efficiency", self.default_efficiency);
        }
        node
    }

    fn validate(&self, equation: &str) -> Result<(), RateError> {
        if !self.allow_negative_a && self.coeff.pre_exponential_factor() < 0.0 {
            return Err(RateError::InvalidParameter(format!(
                "undeclared negative pre-exponential factor in reaction '{equation}'"
            )));
        }
        for (species, efficiency) in &self.efficiencies {
            if *efficiency < 0.0 {
                return Err(RateError::InvalidParameter(format!(
                    "negative collision efficiency for species '{species}' in reaction '{equation}'"
                )));
            }
        }
        Ok(())
    }
}

impl ReactionRate for ThreeBodyRate {
    type Data = ThreeBodyData;

    fn eval(&self, data: &Self::Data) -> f64 {
        self.eval_with_third_body(data, self.effective_concentration(data))
    }

    fn link(&self) -> &EvaluatorLink<Self> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut EvaluatorLink<Self> {
        &mut self.link
    }
}
