//! Batched evaluation of homogeneous rate ensembles.
//!
//! A [`MultiRate`] owns a dense batch of one rate-law variant plus the
//! shared-data bundle cached for the current (T, P, composition) state.
//! Keeping each evaluator monomorphic in its variant lets `eval` run as a
//! tight loop with no dispatch and no allocation; a simulation holding
//! several variants simply holds one evaluator per variant.
//!
//! A rate handle may be linked to the evaluator copy made from it; the link
//! is a non-owning back-reference ([`EvaluatorLink`]) through which every
//! setter forwards its mutation, so a linked handle and its evaluator copy
//! stay observably equal.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::params::ParamMap;
use crate::rates::error::RateError;
use crate::units::Units;

/// Discriminant identifying a rate-law variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateType {
    Arrhenius,
    ThreeBody,
    Falloff,
    Plog,
    Chebyshev,
    Custom,
}

impl RateType {
    /// The `type` tag used in configuration documents. Elementary Arrhenius
    /// is the default reaction type and carries no tag.
    pub fn label(&self) -> &'static str {
        match self {
            RateType::Arrhenius => "elementary",
            RateType::ThreeBody => "three-body",
            RateType::Falloff => "falloff",
            RateType::Plog => "pressure-dependent-Arrhenius",
            RateType::Chebyshev => "Chebyshev",
            RateType::Custom => "custom-rate-function",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The configuration surface shared by every rate-law variant.
///
/// Object safe, so heterogeneous collections of rates can be validated and
/// serialized together.
pub trait RateParams {
    fn rate_type(&self) -> RateType;

    /// Configures the rate from a parameter node interpreted under the
    /// given rate-unit context. Missing optional blocks leave the rate
    /// unset rather than failing.
    fn set_parameters(&mut self, node: &ParamMap, rate_units: &Units) -> Result<(), RateError>;

    /// Serializes the rate back to a parameter node. Coefficients are
    /// emitted in the rate-unit context the rate was configured with, so
    /// callers pass the same context they configured under.
    fn get_parameters(&self, rate_units: &Units) -> ParamMap;

    /// Checks the configured parameters, reporting failures against the
    /// owning reaction's equation.
    fn validate(&self, equation: &str) -> Result<(), RateError>;
}

/// A rate law evaluable from a shared-data bundle.
pub trait ReactionRate: RateParams + Sized {
    /// The shared-data bundle this variant consumes.
    type Data;

    /// Pre-computes intermediates that depend only on the shared state
    /// (e.g. Troe's Fcent, the Plog interval). Called once per state by the
    /// evaluator before any `eval`.
    fn update(&mut self, _data: &Self::Data) {}

    /// Evaluates the forward rate coefficient. Never fails; an unset rate
    /// yields NaN.
    fn eval(&self, data: &Self::Data) -> f64;

    fn link(&self) -> &EvaluatorLink<Self>;

    fn link_mut(&mut self) -> &mut EvaluatorLink<Self>;

    /// Attaches this handle to the evaluator copy at `index`.
    fn link_evaluator(&mut self, index: usize, evaluator: &SharedMultiRate<Self>) {
        self.link_mut().attach(index, Rc::downgrade(evaluator));
    }

    /// Detaches this handle from its evaluator. Idempotent.
    fn release_evaluator(&mut self) {
        self.link_mut().release();
    }

    /// The index of this rate within its evaluator.
    fn index(&self) -> Result<usize, RateError> {
        self.link().index()
    }
}

/// A shared handle to an evaluator, as held by the simulation driver.
pub type SharedMultiRate<R> = Rc<RefCell<MultiRate<R>>>;

/// Non-owning back-reference from a rate handle to its evaluator copy.
///
/// The evaluator owns the authoritative copies; the handle is a configurer
/// whose setters forward through this link. The link never extends the
/// evaluator's lifetime: once the evaluator is dropped, forwarding quietly
/// stops.
pub struct EvaluatorLink<R: ReactionRate> {
    target: Option<(Weak<RefCell<MultiRate<R>>>, usize)>,
}

impl<R: ReactionRate> Default for EvaluatorLink<R> {
    fn default() -> Self {
        Self { target: None }
    }
}

/// Cloning a rate never carries its evaluator link: a clone starts
/// unlinked. This is what makes the evaluator's own copies safe from
/// forwarding back into themselves.
impl<R: ReactionRate> Clone for EvaluatorLink<R> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<R: ReactionRate> fmt::Debug for EvaluatorLink<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some((_, index)) => write!(f, "EvaluatorLink(index = {index})"),
            None => write!(f, "EvaluatorLink(unlinked)"),
        }
    }
}

impl<R: ReactionRate> EvaluatorLink<R> {
    pub fn attach(&mut self, index: usize, evaluator: Weak<RefCell<MultiRate<R>>>) {
        self.target = Some((evaluator, index));
    }

    pub fn release(&mut self) {
        self.target = None;
    }

    pub fn is_linked(&self) -> bool {
        self.target.is_some()
    }

    pub fn index(&self) -> Result<usize, RateError> {
        match &self.target {
            Some((_, index)) => Ok(*index),
            None => Err(RateError::InvalidState(
                "rate is not linked to an evaluator".into(),
            )),
        }
    }

    /// Applies a mutation to the evaluator's copy of this rate, if the link
    /// is alive. Setters call this with the same mutation they applied
    /// locally.
    pub fn forward(&self, apply: impl FnOnce(&mut R)) {
        if let Some((evaluator, index)) = &self.target {
            if let Some(evaluator) = evaluator.upgrade() {
                if let Some(copy) = evaluator.borrow_mut().rate_mut(*index) {
                    apply(copy);
                }
            }
        }
    }
}

/// A batch of rates of one variant, evaluated together.
pub struct MultiRate<R: ReactionRate> {
    rates: Vec<R>,
    data: R::Data,
}

impl<R: ReactionRate> Default for MultiRate<R>
where
    R::Data: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ReactionRate> MultiRate<R>
where
    R::Data: Default,
{
    pub fn new() -> Self {
        Self {
            rates: Vec::new(),
            data: R::Data::default(),
        }
    }

    /// Creates an empty evaluator behind the shared handle used for
    /// linking.
    pub fn shared() -> SharedMultiRate<R> {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl<R: ReactionRate> MultiRate<R> {
    /// Copies a rate into the batch and returns its index.
    pub fn add(&mut self, rate: &R) -> usize
    where
        R: Clone,
    {
        self.rates.push(rate.clone());
        self.rates.len() - 1
    }

    /// Swaps the contents at `index` for a copy of `rate`.
    pub fn replace(&mut self, index: usize, rate: &R) -> Result<(), RateError>
    where
        R: Clone,
    {
        let len = self.rates.len();
        match self.rates.get_mut(index) {
            Some(slot) => {
                *slot = rate.clone();
                Ok(())
            }
            None => Err(RateError::InvalidState(format!(
                "index {index} out of range for evaluator of {len} rates"
            ))),
        }
    }

    pub fn rate(&self, index: usize) -> Option<&R> {
        self.rates.get(index)
    }

    pub fn rate_mut(&mut self, index: usize) -> Option<&mut R> {
        self.rates.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Caches the shared state and lets every rate pre-compute its
    /// state-dependent intermediates.
    pub fn update(&mut self, data: R::Data) {
        for rate in &mut self.rates {
            rate.update(&data);
        }
        self.data = data;
    }

    /// Writes k_i for every rate in index order. `out` must hold at least
    /// `len()` values.
    pub fn eval(&self, out: &mut [f64]) {
        for (slot, rate) in out.iter_mut().zip(&self.rates) {
            *slot = rate.eval(&self.data);
        }
    }
}

/// Registers a rate with an evaluator and links the handle to the copy,
/// returning the assigned index.
pub fn link_rate<R: ReactionRate + Clone>(rate: &mut R, evaluator: &SharedMultiRate<R>) -> usize {
    let index = evaluator.borrow_mut().add(rate);
    rate.link_evaluator(index, evaluator);
    index
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::rates::arrhenius::ArrheniusRate;
    use crate::rates::data::ArrheniusData;

    fn sample_rate() -> ArrheniusRate {
        ArrheniusRate::new(1.0e5, 0.5, 2.0e7)
    }

    #[test]
    fn test_add_and_eval_in_index_order() {
        let mut evaluator: MultiRate<ArrheniusRate> = MultiRate::new();
        let first = sample_rate();
        let second = ArrheniusRate::new(2.0e5, 0.5, 2.0e7);
        assert_eq!(evaluator.add(&first), 0);
        assert_eq!(evaluator.add(&second), 1);

        let data = ArrheniusData::new(1200.0);
        let expected = [first.eval(&data), second.eval(&data)];
        evaluator.update(data);

        let mut out = [0.0; 2];
        evaluator.eval(&mut out);
        assert_relative_eq!(out[0], expected[0]);
        assert_relative_eq!(out[1], expected[1]);
        assert_relative_eq!(out[1], 2.0 * out[0], max_relative = 1e-12);
    }

    #[test]
    fn test_replace_swaps_contents() {
        let mut evaluator: MultiRate<ArrheniusRate> = MultiRate::new();
        let index = evaluator.add(&sample_rate());

        let faster = ArrheniusRate::new(3.0e5, 0.5, 2.0e7);
        evaluator.replace(index, &faster).unwrap();
        assert_relative_eq!(
            evaluator.rate(index).unwrap().pre_exponential_factor(),
            3.0e5
        );

        assert!(matches!(
            evaluator.replace(5, &faster),
            Err(RateError::InvalidState(_))
        ));
    }

    #[test]
    fn test_linked_mutation_reaches_evaluator_copy() {
        let evaluator = MultiRate::<ArrheniusRate>::shared();
        let mut rate = sample_rate();
        let index = link_rate(&mut rate, &evaluator);
        assert_eq!(rate.index().unwrap(), index);

        rate.set_pre_exponential_factor(2.0e5);
        assert_relative_eq!(
            evaluator.borrow().rate(index).unwrap().pre_exponential_factor(),
            2.0e5
        );
    }

    #[test]
    fn test_index_on_unlinked_rate_is_invalid_state() {
        let rate = sample_rate();
        assert!(matches!(rate.index(), Err(RateError::InvalidState(_))));
    }

    #[test]
    fn test_release_is_idempotent() {
        let evaluator = MultiRate::<ArrheniusRate>::shared();
        let mut rate = sample_rate();
        link_rate(&mut rate, &evaluator);
        rate.release_evaluator();
        rate.release_evaluator();
        assert!(rate.index().is_err());

        // mutating after release must not touch the evaluator copy
        rate.set_pre_exponential_factor(9.0e9);
        assert_relative_eq!(
            evaluator.borrow().rate(0).unwrap().pre_exponential_factor(),
            1.0e5
        );
    }

    #[test]
    fn test_clone_starts_unlinked() {
        let evaluator = MultiRate::<ArrheniusRate>::shared();
        let mut rate = sample_rate();
        link_rate(&mut rate, &evaluator);

        let clone = rate.clone();
        assert!(clone.index().is_err());
    }

    #[test]
    fn test_forwarding_stops_when_evaluator_is_dropped() {
        let evaluator = MultiRate::<ArrheniusRate>::shared();
        let mut rate = sample_rate();
        link_rate(&mut rate, &evaluator);
        drop(evaluator);

        // must not panic, and local state still updates
        rate.set_pre_exponential_factor(5.0e5);
        assert_relative_eq!(rate.pre_exponential_factor(), 5.0e5);
    }
}
