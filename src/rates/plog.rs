//! Pressure-dependent rates interpolating between Arrhenius expressions
//! tabulated at discrete pressures.
//!
//! Evaluation locates the tabulated interval bracketing the current
//! pressure and interpolates ln k linearly in ln P. Entries sharing a
//! pressure are summed before interpolation, and pressures outside the
//! tabulated range clamp to the nearest endpoint.

use crate::arrhenius::ArrheniusCoeff;
use crate::multirate::{EvaluatorLink, RateParams, RateType, ReactionRate};
use crate::params::{ParamMap, ParamValue};
use crate::rates::data::PlogData;
use crate::rates::error::RateError;
use crate::units::Units;

/// Temperatures probed by validation at every tabulated pressure.
const VALIDATION_TEMPERATURES: [f64; 6] = [200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0];

#[derive(Debug, Clone, Copy)]
struct PlogEntry {
    pressure: f64,
    log_pressure: f64,
    coeff: ArrheniusCoeff,
}

/// A run of entries sharing one tabulated pressure.
#[derive(Debug, Clone, Copy)]
struct PressureBand {
    log_pressure: f64,
    begin: usize,
    end: usize,
}

/// A pressure-dependent Arrhenius table.
///
/// `update` caches the interval bracketing the current pressure and the
/// interpolation weight; `eval` sums the bracketing Arrhenius expressions
/// and interpolates.
#[derive(Debug, Clone, Default)]
pub struct PlogRate {
    entries: Vec<PlogEntry>,
    bands: Vec<PressureBand>,

    lower: (usize, usize),
    upper: (usize, usize),
    frac: f64,

    link: EvaluatorLink<Self>,
}

impl PlogRate {
    /// Builds a rate from (pressure [Pa], coefficient) pairs.
    pub fn new(rates: &[(f64, ArrheniusCoeff)]) -> Result<Self, RateError> {
        let mut rate = Self::default();
        rate.set_rates(rates)?;
        Ok(rate)
    }

    pub fn from_parameters(node: &ParamMap, rate_units: &Units) -> Result<Self, RateError> {
        let mut rate = Self::default();
        rate.set_parameters(node, rate_units)?;
        Ok(rate)
    }

    /// The tabulated (pressure [Pa], coefficient) pairs in storage order.
    pub fn rates(&self) -> Vec<(f64, ArrheniusCoeff)> {
        self.entries
            .iter()
            .map(|entry| (entry.pressure, entry.coeff))
            .collect()
    }

    /// Replaces the table. Entries are stably sorted by pressure, so
    /// duplicate pressures stay adjacent in input order.
    pub fn set_rates(&mut self, rates: &[(f64, ArrheniusCoeff)]) -> Result<(), RateError> {
        let (entries, bands) = Self::build_table(rates)?;
        self.apply_table(entries.clone(), bands.clone());
        self.link.forward(move |copy| copy.apply_table(entries, bands));
        Ok(())
    }

    fn apply_table(&mut self, entries: Vec<PlogEntry>, bands: Vec<PressureBand>) {
        self.entries = entries;
        self.bands = bands;
        self.lower = (0, 0);
        self.upper = (0, 0);
        self.frac = 0.0;
    }

    fn build_table(
        rates: &[(f64, ArrheniusCoeff)],
    ) -> Result<(Vec<PlogEntry>, Vec<PressureBand>), RateError> {
        let mut entries = Vec::with_capacity(rates.len());
        for (pressure, coeff) in rates {
            if !pressure.is_finite() || *pressure <= 0.0 {
                return Err(RateError::InvalidParameter(format!(
                    "tabulated pressure {pressure} is not positive"
                )));
            }
            entries.push(PlogEntry {
                pressure: *pressure,
                log_pressure: pressure.ln(),
                coeff: *coeff,
            });
        }
        entries.sort_by(|a, b| a.log_pressure.partial_cmp(&b.log_pressure).unwrap());

        let mut bands: Vec<PressureBand> = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match bands.last_mut() {
                Some(band) if band.log_pressure == entry.log_pressure => band.end = index + 1,
                _ => bands.push(PressureBand {
                    log_pressure: entry.log_pressure,
                    begin: index,
                    end: index + 1,
                }),
            }
        }
        Ok((entries, bands))
    }

    /// The summed rate of one band at the shared temperature terms.
    fn band_rate(&self, band: (usize, usize), data: &PlogData) -> f64 {
        self.entries[band.0..band.1]
            .iter()
            .map(|entry| entry.coeff.eval(data.log_temp, data.recip_temp))
            .sum()
    }
}

impl TryFrom<&ParamMap> for PlogRate {
    type Error = RateError;

    fn try_from(node: &ParamMap) -> Result<Self, Self::Error> {
        Self::from_parameters(node, &Units::dimensionless())
    }
}

impl RateParams for PlogRate {
    fn rate_type(&self) -> RateType {
        RateType::Plog
    }

    fn set_parameters(&mut self, node: &ParamMap, rate_units: &Units) -> Result<(), RateError> {
        let items = match node.get("rate-constants") {
            Some(ParamValue::Sequence(items)) => items,
            Some(_) => {
                return Err(RateError::InvalidParameter(
                    "'rate-constants' must be a sequence".into(),
                ))
            }
            // absent block leaves the rate unset for a later call
            None => return Ok(()),
        };
        let units = node.units_or_default();
        let mut rates = Vec::with_capacity(items.len());
        for item in items {
            let item = item.as_map().ok_or_else(|| {
                RateError::InvalidParameter("each 'rate-constants' entry must be a mapping".into())
            })?;
            let pressure = item.get("P").ok_or_else(|| {
                RateError::InvalidParameter("'rate-constants' entry is missing 'P'".into())
            })?;
            let pressure = units.convert(pressure, &Units::pascals())?;
            let mut coeff = ArrheniusCoeff::default();
            coeff.set_parameters(item, &units, rate_units)?;
            rates.push((pressure, coeff));
        }
        log::debug!("configured Plog table with {} entries", rates.len());
        let (entries, bands) = Self::build_table(&rates)?;
        self.apply_table(entries, bands);
        Ok(())
    }

    fn get_parameters(&self, _rate_units: &Units) -> ParamMap {
        let mut node = ParamMap::new();
        node.insert("type", self.rate_type().label());
        if self.entries.is_empty() {
            return node;
        }
        let mut items = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let mut item = entry.coeff.get_parameters();
            item.insert("P", entry.pressure);
            items.push(ParamValue::Map(item));
        }
        node.insert("rate-constants", items);
        node
    }

    fn validate(&self, equation: &str) -> Result<(), RateError> {
        if self.entries.is_empty() {
            return Err(RateError::InvalidParameter(format!(
                "no pressure-dependent rate entries in reaction '{equation}'"
            )));
        }
        for band in &self.bands {
            for temperature in VALIDATION_TEMPERATURES {
                let data = PlogData::new(temperature, band.log_pressure.exp());
                let k: f64 = self.band_rate((band.begin, band.end), &data);
                if !(k > 0.0) {
                    return Err(RateError::InvalidParameter(format!(
                        "non-positive rate at P = {:.6e} Pa, T = {temperature} K \
                         in reaction '{equation}'",
                        band.log_pressure.exp()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ReactionRate for PlogRate {
    type Data = PlogData;

    fn update(&mut self, data: &Self::Data) {
        if self.bands.is_empty() {
            return;
        }
        let logp = data.log_pressure;
        let idx = self
            .bands
            .partition_point(|band| band.log_pressure <= logp);
        if idx == 0 || idx == self.bands.len() {
            // clamp to the nearest tabulated pressure
            let band = if idx == 0 {
                self.bands[0]
            } else {
                self.bands[self.bands.len() - 1]
            };
            self.lower = (band.begin, band.end);
            self.upper = (band.begin, band.end);
            self.frac = 0.0;
        } else {
            let lower = self.bands[idx - 1];
            let upper = self.bands[idx];
            self.lower = (lower.begin, lower.end);
            self.upper = (upper.begin, upper.end);
            self.frac = (logp - lower.log_pressure) / (upper.log_pressure - lower.log_pressure);
        }
    }

    fn eval(&self, data: &Self::Data) -> f64 {
        if self.entries.is_empty() {
            return f64::NAN;
        }
        let k_lower = self.band_rate(self.lower, data);
        if self.frac == 0.0 {
            return k_lower;
        }
        let k_upper = self.band_rate(self.upper, data);
        ((1.0 - self.frac) * k_lower.ln() + self.frac * k_upper.ln()).exp()
    }

    fn link(&self) -> &EvaluatorLink<Self> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut EvaluatorLink<Self> {
        &mut self.link
    }
}
