//! User-supplied rate functions of temperature.
//!
//! The callable sits behind a narrow temperature-to-rate interface and has
//! no parameter-tree representation: `get_parameters` yields an empty node
//! and round-tripping is out of scope for this variant.

use std::sync::Arc;

use derivative::Derivative;

use crate::multirate::{EvaluatorLink, RateParams, RateType, ReactionRate};
use crate::params::ParamMap;
use crate::rates::data::CustomData;
use crate::rates::error::RateError;
use crate::units::Units;

/// A reaction rate defined by an arbitrary scalar function k(T).
///
/// Evaluates to NaN until a rate function is supplied.
#[derive(Clone, Default, Derivative)]
#[derivative(Debug)]
pub struct CustomRate {
    #[derivative(Debug = "ignore")]
    rate_func: Option<Arc<dyn Fn(f64) -> f64>>,
    link: EvaluatorLink<Self>,
}

impl CustomRate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a rate from a textual expression of the variable `T`, e.g.
    /// `"1e5 * exp(-2000 / T)"`.
    pub fn from_expression(expression: &str) -> Result<Self, RateError> {
        let mut rate = Self::new();
        rate.set_expression(expression)?;
        Ok(rate)
    }

    pub fn is_set(&self) -> bool {
        self.rate_func.is_some()
    }

    /// Installs the rate function, propagating to a linked evaluator.
    pub fn set_rate_function(&mut self, f: impl Fn(f64) -> f64 + 'static) {
        let f: Arc<dyn Fn(f64) -> f64> = Arc::new(f);
        self.rate_func = Some(f.clone());
        self.link.forward(move |copy| copy.rate_func = Some(f));
    }

    /// Parses a textual expression of `T` and installs it as the rate
    /// function.
    pub fn set_expression(&mut self, expression: &str) -> Result<(), RateError> {
        let expr: meval::Expr = expression.parse()?;
        let f = expr.bind("T")?;
        self.set_rate_function(f);
        Ok(())
    }
}

impl RateParams for CustomRate {
    fn rate_type(&self) -> RateType {
        RateType::Custom
    }

    fn set_parameters(&mut self, _node: &ParamMap, _rate_units: &Units) -> Result<(), RateError> {
        Ok(())
    }

    fn get_parameters(&self, _rate_units: &Units) -> ParamMap {
        ParamMap::new()
    }

    fn validate(&self, _equation: &str) -> Result<(), RateError> {
        Ok(())
    }
}

impl ReactionRate for CustomRate {
    type Data = CustomData;

    fn eval(&self, data: &Self::Data) -> f64 {
        match &self.rate_func {
            Some(f) => f(data.temperature),
            None => f64::NAN,
        }
    }

    fn link(&self) -> &EvaluatorLink<Self> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut EvaluatorLink<Self> {
        &mut self.link
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::multirate::{link_rate, MultiRate};

    #[test]
    fn test_unset_rate_evaluates_to_nan() {
        let rate = CustomRate::new();
        assert!(!rate.is_set());
        assert!(rate.eval(&CustomData::new(1000.0)).is_nan());
    }

    #[test]
    fn test_closure_is_applied_unchanged() {
        let mut rate = CustomRate::new();
        rate.set_rate_function(|t| 2.0 * t);
        assert_relative_eq!(rate.eval(&CustomData::new(1000.0)), 2000.0);
    }

    #[test]
    fn test_expression_matches_closed_form() {
        let rate = CustomRate::from_expression("1e5 * exp(-2000 / T)").unwrap();
        let t: f64 = 1000.0;
        assert_relative_eq!(
            rate.eval(&CustomData::new(t)),
            1.0e5 * (-2000.0 / t).exp(),
            max_relative = 1e-12
        );

        assert!(CustomRate::from_expression("1e5 * exp(").is_err());
    }

    #[test]
    fn test_rate_function_propagates_to_evaluator() {
        let evaluator = MultiRate::<CustomRate>::shared();
        let mut rate = CustomRate::new();
        let index = link_rate(&mut rate, &evaluator);

        rate.set_rate_function(|t| 3.0 * t);
        evaluator.borrow_mut().update(CustomData::new(500.0));
        let mut out = [0.0];
        evaluator.borrow().eval(&mut out);
        assert_relative_eq!(out[0], 1500.0);
        assert_eq!(rate.index().unwrap(), index);
    }

    #[test]
    fn test_no_parameter_tree_representation() {
        let rate = CustomRate::from_expression("T^2").unwrap();
        assert!(rate.get_parameters(&Units::dimensionless()).is_empty());
    }
}
