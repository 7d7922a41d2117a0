//! Pressure-dependent falloff rates blending a low-pressure and a
//! high-pressure Arrhenius limit.
//!
//! The reduced pressure Pr = k0·[M]/k∞ moves the rate between the limits;
//! the Troe form adds a broadening factor F parameterized by (A, T3, T1,
//! T2), and leaving the Troe block out gives the Lindemann form with F = 1.

use std::collections::BTreeMap;

use derivative::Derivative;

use crate::arrhenius::ArrheniusCoeff;
use crate::constants::SMALL_NUMBER;
use crate::multirate::{EvaluatorLink, RateParams, RateType, ReactionRate};
use crate::params::{ParamMap, ParamValue};
use crate::rates::data::FalloffData;
use crate::rates::error::RateError;
use crate::rates::threebody::{efficiencies_node, parse_efficiencies};
use crate::units::Units;

/// Troe broadening parameters (A, T3, T1, T2), with T2 optional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TroeParams {
    pub a: f64,
    pub t3: f64,
    pub t1: f64,
    pub t2: Option<f64>,
}

impl TroeParams {
    /// The centering factor Fcent(T).
    pub fn fcent(&self, temperature: f64) -> f64 {
        let mut fcent = (1.0 - self.a) * (-temperature / self.t3).exp()
            + self.a * (-temperature / self.t1).exp();
        if let Some(t2) = self.t2 {
            fcent += (-t2 / temperature).exp();
        }
        fcent
    }

    fn from_node(node: &ParamMap) -> Result<Self, RateError> {
        let field = |key: &str| {
            node.get_f64(key).ok_or_else(|| {
                RateError::InvalidParameter(format!("Troe parameters are missing '{key}'"))
            })
        };
        Ok(Self {
            a: field("A")?,
            t3: field("T3")?,
            t1: field("T1")?,
            t2: node.get_f64("T2"),
        })
    }

    fn to_node(self) -> ParamMap {
        let mut node = ParamMap::new();
        node.insert("A", self.a);
        node.insert("T3", self.t3);
        node.insert("T1", self.t1);
        if let Some(t2) = self.t2 {
            node.insert("T2", t2);
        }
        node
    }
}

/// A falloff reaction rate k = k∞·(Pr/(1+Pr))·F.
///
/// `update` caches the temperature-only pieces (the two Arrhenius limits
/// and Fcent); `eval` applies the composition-dependent reduced pressure
/// and blending.
#[derive(Debug, Clone, Derivative)]
#[derivative(Default)]
pub struct FalloffRate {
    low: ArrheniusCoeff,
    high: ArrheniusCoeff,
    troe: Option<TroeParams>,
    efficiencies: BTreeMap<String, f64>,
    #[derivative(Default(value = "1.0"))]
    default_efficiency: f64,

    #[derivative(Default(value = "f64::NAN"))]
    k_low: f64,
    #[derivative(Default(value = "f64::NAN"))]
    k_high: f64,
    #[derivative(Default(value = "f64::NAN"))]
    fcent: f64,

    link: EvaluatorLink<Self>,
}

impl FalloffRate {
    pub fn new(low: ArrheniusCoeff, high: ArrheniusCoeff, troe: Option<TroeParams>) -> Self {
        Self {
            low,
            high,
            troe,
            ..Self::default()
        }
    }

    pub fn from_parameters(node: &ParamMap, rate_units: &Units) -> Result<Self, RateError> {
        let mut rate = Self::default();
        rate.set_parameters(node, rate_units)?;
        Ok(rate)
    }

    pub fn low_rate(&self) -> &ArrheniusCoeff {
        &self.low
    }

    pub fn high_rate(&self) -> &ArrheniusCoeff {
        &self.high
    }

    pub fn troe(&self) -> Option<&TroeParams> {
        self.troe.as_ref()
    }

    pub fn efficiency(&self, species: &str) -> f64 {
        self.efficiencies
            .get(species)
            .copied()
            .unwrap_or(self.default_efficiency)
    }

    /// The effective collider concentration [M] for the given composition.
    pub fn effective_concentration(&self, data: &FalloffData) -> f64 {
        let mut conc_m = self.default_efficiency * data.total_concentration;
        for (species, efficiency) in &self.efficiencies {
            conc_m += (efficiency - self.default_efficiency) * data.concentration(species);
        }
        conc_m
    }

    /// Evaluates the rate with a caller-supplied [M]. Requires a prior
    /// `update` for the current temperature.
    pub fn eval_with_third_body(&self, conc_m: f64) -> f64 {
        let pr = self.k_low * conc_m / self.k_high;
        self.k_high * (pr / (1.0 + pr)) * self.blending_factor(pr)
    }

    /// The Troe broadening factor F(Pr), or 1 for the Lindemann form.
    fn blending_factor(&self, pr: f64) -> f64 {
        if self.troe.is_none() {
            return 1.0;
        }
        let log_fcent = self.fcent.max(SMALL_NUMBER).log10();
        let c = -0.4 - 0.67 * log_fcent;
        let n = 0.75 - 1.27 * log_fcent;
        let log_pr_c = pr.max(SMALL_NUMBER).log10() + c;
        let f1 = log_pr_c / (n - 0.14 * log_pr_c);
        10.0f64.powf(log_fcent / (1.0 + f1 * f1))
    }

    pub fn set_low_rate(&mut self, low: ArrheniusCoeff) {
        self.low = low;
        self.link.forward(move |copy| copy.low = low);
    }

    pub fn set_high_rate(&mut self, high: ArrheniusCoeff) {
        self.high = high;
        self.link.forward(move |copy| copy.high = high);
    }

    pub fn set_troe(&mut self, troe: Option<TroeParams>) {
        self.troe = troe;
        self.link.forward(move |copy| copy.troe = troe);
    }

    pub fn set_efficiencies(&mut self, efficiencies: BTreeMap<String, f64>) {
        self.efficiencies = efficiencies.clone();
        self.link.forward(move |copy| copy.efficiencies = efficiencies);
    }
}

impl TryFrom<&ParamMap> for FalloffRate {
    type Error = RateError;

    fn try_from(node: &ParamMap) -> Result<Self, Self::Error> {
        Self::from_parameters(node, &Units::dimensionless())
    }
}

impl RateParams for FalloffRate {
    fn rate_type(&self) -> RateType {
        RateType::Falloff
    }

    fn set_parameters(&mut self, node: &ParamMap, rate_units: &Units) -> Result<(), RateError> {
        let units = node.units_or_default();
        // the low-pressure limit carries one extra concentration factor
        let si_concentration = Units::kilomoles() / Units::metres().pow(3.0);
        let low_units = *rate_units / si_concentration;

        self.efficiencies = parse_efficiencies(node)?;
        if let Some(value) = node.get("default-efficiency") {
            self.default_efficiency = value.as_f64().ok_or_else(|| {
                RateError::InvalidParameter("'default-efficiency' must be a number".into())
            })?;
        }
        if let Some(block) = node.get("low-P-rate-constant") {
            let block = block.as_map().ok_or_else(|| {
                RateError::InvalidParameter("'low-P-rate-constant' must be a mapping".into())
            })?;
            self.low.set_parameters(block, &units, &low_units)?;
        }
        if let Some(block) = node.get("high-P-rate-constant") {
            let block = block.as_map().ok_or_else(|| {
                RateError::InvalidParameter("'high-P-rate-constant' must be a mapping".into())
            })?;
            self.high.set_parameters(block, &units, rate_units)?;
        }
        self.troe = match node.get("Troe") {
            Some(ParamValue::Map(troe)) => Some(TroeParams::from_node(troe)?),
            Some(_) => {
                return Err(RateError::InvalidParameter(
                    "'Troe' must be a mapping".into(),
                ))
            }
            None => None,
        };
        Ok(())
    }

    fn get_parameters(&self, _rate_units: &Units) -> ParamMap {
        let mut node = ParamMap::new();
        node.insert("type", self.rate_type().label());
        let low = self.low.get_parameters();
        if !low.is_empty() {
            node.insert("low-P-rate-constant", low);
        }
        let high = self.high.get_parameters();
        if !high.is_empty() {
            node.insert("high-P-rate-constant", high);
        }
        if let Some(troe) = self.troe {
            node.insert("Troe", troe.to_node());
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
        if self.low.pre_exponential_factor() < 0.0 || self.high.pre_exponential_factor() < 0.0 {
            return Err(RateError::InvalidParameter(format!(
                "negative pre-exponential factor in falloff reaction '{equation}'"
            )));
        }
        if let Some(troe) = &self.troe {
            if troe.t3 <= 0.0 || troe.t1 <= 0.0 {
                return Err(RateError::InvalidParameter(format!(
                    "Troe parameters T3 and T1 must be positive in reaction '{equation}'"
                )));
            }
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

impl ReactionRate for FalloffRate {
    type Data = FalloffData;

    fn update(&mut self, data: &Self::Data) {
        self.k_low = self.low.eval(data.log_temp, data.recip_temp);
        self.k_high = self.high.eval(data.log_temp, data.recip_temp);
        self.fcent = match &self.troe {
            Some(troe) => troe.fcent(data.temperature),
            None => 1.0,
        };
    }

    fn eval(&self, data: &Self::Data) -> f64 {
        self.eval_with_third_body(self.effective_concentration(data))
    }

    fn link(&self) -> &EvaluatorLink<Self> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut EvaluatorLink<Self> {
        &mut self.link
    }
}
