//! Chebyshev rate expansions: log10 k as a bivariate Chebyshev series in
//! normalized reciprocal temperature and normalized log pressure.
//!
//! The series is evaluated by Clenshaw recurrence, folded pressure-first:
//! `update` reduces the coefficient matrix along the pressure direction for
//! the current state, leaving `eval` a single recurrence over the cached
//! row vector. Normalized coordinates clamp to [−1, 1], so evaluation
//! outside the fitted domain reproduces the value at the nearest boundary.

use ndarray::Array2;

use crate::multirate::{EvaluatorLink, RateParams, RateType, ReactionRate};
use crate::params::{ParamMap, ParamValue};
use crate::rates::data::ChebyshevData;
use crate::rates::error::RateError;
use crate::units::{UnitSystem, Units};

/// Clenshaw recurrence for Σ_k c_k·φ_k(x) over Chebyshev polynomials of
/// the first kind. `n` must be at least one.
fn clenshaw(n: usize, coeff: impl Fn(usize) -> f64, x: f64) -> f64 {
    let mut b_cur = 0.0;
    let mut b_next = 0.0;
    for k in (1..n).rev() {
        let b = 2.0 * x * b_cur - b_next + coeff(k);
        b_next = b_cur;
        b_cur = b;
    }
    coeff(0) + x * b_cur - b_next
}

/// A Chebyshev reaction rate over T ∈ [Tmin, Tmax], P ∈ [Pmin, Pmax].
#[derive(Debug, Clone)]
pub struct ChebyshevRate {
    t_min: f64,
    t_max: f64,
    p_min: f64,
    p_max: f64,
    recip_t_min: f64,
    recip_t_max: f64,
    log10_p_min: f64,
    log10_p_max: f64,
    coeffs: Array2<f64>,

    t_reduced: f64,
    dot_prod: Vec<f64>,

    link: EvaluatorLink<Self>,
}

impl Default for ChebyshevRate {
    fn default() -> Self {
        Self {
            t_min: f64::NAN,
            t_max: f64::NAN,
            p_min: f64::NAN,
            p_max: f64::NAN,
            recip_t_min: f64::NAN,
            recip_t_max: f64::NAN,
            log10_p_min: f64::NAN,
            log10_p_max: f64::NAN,
            coeffs: Array2::zeros((0, 0)),
            t_reduced: f64::NAN,
            dot_prod: Vec::new(),
            link: EvaluatorLink::default(),
        }
    }
}

impl ChebyshevRate {
    /// Builds a rate over the given domain from a coefficient matrix with
    /// one row per temperature order and one column per pressure order.
    pub fn new(
        t_min: f64,
        t_max: f64,
        p_min: f64,
        p_max: f64,
        coeffs: Array2<f64>,
    ) -> Result<Self, RateError> {
        let mut rate = Self::default();
        rate.set_domain(t_min, t_max, p_min, p_max)?;
        rate.store_coeffs(coeffs)?;
        Ok(rate)
    }

    pub fn from_parameters(node: &ParamMap, rate_units: &Units) -> Result<Self, RateError> {
        let mut rate = Self::default();
        rate.set_parameters(node, rate_units)?;
        Ok(rate)
    }

    pub fn temperature_range(&self) -> (f64, f64) {
        (self.t_min, self.t_max)
    }

    pub fn pressure_range(&self) -> (f64, f64) {
        (self.p_min, self.p_max)
    }

    pub fn coeffs(&self) -> &Array2<f64> {
        &self.coeffs
    }

    /// Number of temperature orders in the expansion.
    pub fn n_temperature(&self) -> usize {
        self.coeffs.nrows()
    }

    /// Number of pressure orders in the expansion.
    pub fn n_pressure(&self) -> usize {
        self.coeffs.ncols()
    }

    pub fn is_set(&self) -> bool {
        !self.coeffs.is_empty()
    }

    /// Replaces the coefficient matrix, propagating to a linked evaluator.
    pub fn set_coeffs(&mut self, coeffs: Array2<f64>) -> Result<(), RateError> {
        self.store_coeffs(coeffs.clone())?;
        self.link.forward(move |copy| {
            // the same matrix was validated above
            let _ = copy.store_coeffs(coeffs);
        });
        Ok(())
    }

    fn store_coeffs(&mut self, coeffs: Array2<f64>) -> Result<(), RateError> {
        if coeffs.is_empty() {
            return Err(RateError::InvalidParameter(
                "Chebyshev coefficient matrix must not be empty".into(),
            ));
        }
        self.dot_prod = vec![0.0; coeffs.nrows()];
        self.t_reduced = f64::NAN;
        self.coeffs = coeffs;
        Ok(())
    }

    fn set_domain(&mut self, t_min: f64, t_max: f64, p_min: f64, p_max: f64) -> Result<(), RateError> {
        if !(t_min > 0.0 && t_max > t_min) {
            return Err(RateError::InvalidParameter(format!(
                "invalid Chebyshev temperature range [{t_min}, {t_max}]"
            )));
        }
        if !(p_min > 0.0 && p_max > p_min) {
            return Err(RateError::InvalidParameter(format!(
                "invalid Chebyshev pressure range [{p_min}, {p_max}]"
            )));
        }
        self.t_min = t_min;
        self.t_max = t_max;
        self.p_min = p_min;
        self.p_max = p_max;
        self.recip_t_min = 1.0 / t_min;
        self.recip_t_max = 1.0 / t_max;
        self.log10_p_min = p_min.log10();
        self.log10_p_max = p_max.log10();
        Ok(())
    }

    fn parse_range(
        node: &ParamMap,
        key: &str,
        dest: &Units,
        units: &UnitSystem,
    ) -> Result<(f64, f64), RateError> {
        let items = node.get_sequence(key).ok_or_else(|| {
            RateError::InvalidParameter(format!("'{key}' must be a sequence of two values"))
        })?;
        if items.len() != 2 {
            return Err(RateError::InvalidParameter(format!(
                "'{key}' must hold exactly two values"
            )));
        }
        Ok((
            units.convert(&items[0], dest)?,
            units.convert(&items[1], dest)?,
        ))
    }
}

impl TryFrom<&ParamMap> for ChebyshevRate {
    type Error = RateError;

    fn try_from(node: &ParamMap) -> Result<Self, Self::Error> {
        Self::from_parameters(node, &Units::dimensionless())
    }
}

impl RateParams for ChebyshevRate {
    fn rate_type(&self) -> RateType {
        RateType::Chebyshev
    }

    fn set_parameters(&mut self, node: &ParamMap, rate_units: &Units) -> Result<(), RateError> {
        let rows = match node.get("data") {
            Some(ParamValue::Sequence(rows)) => rows,
            Some(_) => {
                return Err(RateError::InvalidParameter(
                    "'data' must be a sequence of coefficient rows".into(),
                ))
            }
            // absent block leaves the rate unset for a later call
            None => return Ok(()),
        };
        let units = node.units_or_default();

        let (t_min, t_max) = Self::parse_range(node, "temperature-range", &Units::kelvin(), &units)?;
        let (p_min, p_max) = Self::parse_range(node, "pressure-range", &Units::pascals(), &units)?;
        self.set_domain(t_min, t_max, p_min, p_max)?;

        let n_rows = rows.len();
        let mut flat = Vec::new();
        let mut n_cols = None;
        for row in rows {
            let row = row.as_sequence().ok_or_else(|| {
                RateError::InvalidParameter("each 'data' row must be a sequence".into())
            })?;
            if *n_cols.get_or_insert(row.len()) != row.len() {
                return Err(RateError::InvalidParameter(
                    "'data' rows must all have the same length".into(),
                ));
            }
            for value in row {
                flat.push(value.as_f64().ok_or_else(|| {
                    RateError::InvalidParameter("'data' entries must be numbers".into())
                })?);
            }
        }
        let n_cols = n_cols.unwrap_or(0);
        let mut coeffs = Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|err| {
            RateError::InvalidParameter(format!("bad Chebyshev coefficient shape: {err}"))
        })?;

        // fold any unit rescale of the leading coefficient into the series
        let factor = units.factor_for(rate_units) / rate_units.factor();
        if factor != 1.0 {
            coeffs[[0, 0]] += factor.log10();
        }
        log::debug!(
            "configured {}x{} Chebyshev expansion over T [{t_min}, {t_max}] K",
            n_rows,
            n_cols
        );
        self.store_coeffs(coeffs)
    }

    fn get_parameters(&self, _rate_units: &Units) -> ParamMap {
        let mut node = ParamMap::new();
        node.insert("type", self.rate_type().label());
        if !self.is_set() {
            return node;
        }
        node.insert(
            "temperature-range",
            vec![ParamValue::Number(self.t_min), ParamValue::Number(self.t_max)],
        );
        node.insert(
            "pressure-range",
            vec![ParamValue::Number(self.p_min), ParamValue::Number(self.p_max)],
        );
        let data: Vec<ParamValue> = self
            .coeffs
            .rows()
            .into_iter()
            .map(|row| ParamValue::Sequence(row.iter().map(|c| ParamValue::Number(*c)).collect()))
            .collect();
        node.insert("data", data);
        node
    }

    fn validate(&self, _equation: &str) -> Result<(), RateError> {
        Ok(())
    }
}

impl ReactionRate for ChebyshevRate {
    type Data = ChebyshevData;

    fn update(&mut self, data: &Self::Data) {
        if !self.is_set() {
            return;
        }
        self.t_reduced = ((2.0 * data.recip_temp - self.recip_t_min - self.recip_t_max)
            / (self.recip_t_max - self.recip_t_min))
            .clamp(-1.0, 1.0);
        let p_reduced = ((2.0 * data.log10_pressure - self.log10_p_min - self.log10_p_max)
            / (self.log10_p_max - self.log10_p_min))
            .clamp(-1.0, 1.0);
        for (i, slot) in self.dot_prod.iter_mut().enumerate() {
            *slot = clenshaw(self.coeffs.ncols(), |j| self.coeffs[[i, j]], p_reduced);
        }
    }

    fn eval(&self, _data: &Self::Data) -> f64 {
        if self.dot_prod.is_empty() {
            return f64::NAN;
        }
        let log10_k = clenshaw(self.dot_prod.len(), |i| self.dot_prod[i], self.t_reduced);
        10.0f64.powf(log10_k)
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
    use ndarray::array;
    use serde_json::json;

    use super::*;
    use crate::constants::ONE_ATM;

    fn sample_node() -> ParamMap {
        serde_json::from_value(json!({
            "type": "Chebyshev",
            "temperature-range": [290.0, 3000.0],
            "pressure-range": ["0.001 atm", "100.0 atm"],
            "data": [
                [8.2883, -1.1397, -0.12059, 0.016034],
                [1.9764, 1.0037, 0.0072829, -0.030285],
                [0.3177, 0.26889, 0.094806, -0.0076385],
            ],
        }))
        .unwrap()
    }

    /// Direct series sum using φ_n(x) = cos(n·arccos x).
    fn direct_sum(coeffs: &Array2<f64>, t_reduced: f64, p_reduced: f64) -> f64 {
        let mut total = 0.0;
        for i in 0..coeffs.nrows() {
            for j in 0..coeffs.ncols() {
                total += coeffs[[i, j]]
                    * (i as f64 * t_reduced.acos()).cos()
                    * (j as f64 * p_reduced.acos()).cos();
            }
        }
        total
    }

    #[test]
    fn test_eval_matches_direct_series() {
        let mut rate = ChebyshevRate::try_from(&sample_node()).unwrap();
        let t: f64 = 1000.0;
        let p = ONE_ATM;
        let data = ChebyshevData::new(t, p);
        rate.update(&data);

        let (t_min, t_max) = rate.temperature_range();
        let (p_min, p_max) = rate.pressure_range();
        let t_reduced =
            (2.0 / t - 1.0 / t_min - 1.0 / t_max) / (1.0 / t_max - 1.0 / t_min);
        let p_reduced = (2.0 * p.log10() - p_min.log10() - p_max.log10())
            / (p_max.log10() - p_min.log10());
        let expected = 10.0f64.powf(direct_sum(rate.coeffs(), t_reduced, p_reduced));

        assert_relative_eq!(rate.eval(&data), expected, max_relative = 1e-10);
    }

    #[test]
    fn test_log_rate_is_bounded_by_coefficients() {
        let mut rate = ChebyshevRate::try_from(&sample_node()).unwrap();
        let bound: f64 = rate.coeffs().iter().map(|c| c.abs()).sum();
        for (t, p) in [(290.0, 101.325), (1000.0, ONE_ATM), (3000.0, 100.0 * ONE_ATM)] {
            let data = ChebyshevData::new(t, p);
            rate.update(&data);
            assert!(rate.eval(&data).log10().abs() <= bound);
        }
    }

    #[test]
    fn test_out_of_domain_clamps_to_boundary() {
        let mut rate = ChebyshevRate::try_from(&sample_node()).unwrap();

        let data = ChebyshevData::new(100.0, ONE_ATM);
        rate.update(&data);
        let below = rate.eval(&data);
        let data = ChebyshevData::new(290.0, ONE_ATM);
        rate.update(&data);
        assert_relative_eq!(below, rate.eval(&data), max_relative = 1e-12);

        let data = ChebyshevData::new(1000.0, 1.0e4 * ONE_ATM);
        rate.update(&data);
        let above = rate.eval(&data);
        let data = ChebyshevData::new(1000.0, 100.0 * ONE_ATM);
        rate.update(&data);
        assert_relative_eq!(above, rate.eval(&data), max_relative = 1e-12);
    }

    #[test]
    fn test_unit_rescale_folds_into_leading_coefficient() {
        // coefficients tabulated for cm^3/mol/s shift log10 k by exactly 3
        let mut node = sample_node();
        node.set_units(crate::units::UnitSystem::default());
        let si = ChebyshevRate::from_parameters(&node, &Units::dimensionless()).unwrap();

        let mut node = sample_node();
        node.set_units(
            crate::units::UnitSystemBuilder::default()
                .quantity(Units::parse("mol").unwrap())
                .length(Units::parse("cm").unwrap())
                .build()
                .unwrap(),
        );
        let rate_units = crate::units::UnitSystem::default().rate_units(2.0);
        let cgs = ChebyshevRate::from_parameters(&node, &rate_units).unwrap();

        assert_relative_eq!(
            cgs.coeffs()[[0, 0]] - si.coeffs()[[0, 0]],
            -3.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_rejects_ragged_data() {
        let node: ParamMap = serde_json::from_value(json!({
            "temperature-range": [290.0, 3000.0],
            "pressure-range": [100.0, 1.0e7],
            "data": [[1.0, 2.0], [3.0]],
        }))
        .unwrap();
        assert!(matches!(
            ChebyshevRate::try_from(&node),
            Err(RateError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unset_rate_evaluates_to_nan() {
        let empty: ParamMap = serde_json::from_value(json!({})).unwrap();
        let mut rate = ChebyshevRate::try_from(&empty).unwrap();
        let data = ChebyshevData::new(1000.0, ONE_ATM);
        rate.update(&data);
        assert!(rate.eval(&data).is_nan());
    }

    #[test]
    fn test_set_coeffs_replaces_expansion() {
        let mut rate = ChebyshevRate::new(
            290.0,
            3000.0,
            100.0,
            1.0e7,
            array![[2.0]],
        )
        .unwrap();
        let data = ChebyshevData::new(1000.0, ONE_ATM);
        rate.update(&data);
        assert_relative_eq!(rate.eval(&data), 100.0, max_relative = 1e-12);

        rate.set_coeffs(array![[3.0]]).unwrap();
        rate.update(&data);
        assert_relative_eq!(rate.eval(&data), 1000.0, max_relative = 1e-12);
    }
}
