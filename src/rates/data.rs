//! Per-evaluation shared-data bundles.
//!
//! A shared-data struct is built once per (T, P, composition) state by the
//! simulation driver and broadcast to every rate in a batch, so the
//! temperature and pressure transforms are computed exactly once. Each rate
//! variant consumes the bundle matching its needs.
//!
//! Compositions map species names to molar concentrations; species
//! bookkeeping itself belongs to the surrounding reaction network.

use std::collections::HashMap;

/// Temperature terms shared by plain Arrhenius evaluation.
#[derive(Debug, Clone, Default)]
pub struct ArrheniusData {
    pub temperature: f64,
    pub log_temp: f64,
    pub recip_temp: f64,
}

impl ArrheniusData {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            log_temp: temperature.ln(),
            recip_temp: 1.0 / temperature,
        }
    }
}

/// Temperature terms plus the composition needed for third-body weighting.
#[derive(Debug, Clone, Default)]
pub struct ThreeBodyData {
    pub temperature: f64,
    pub log_temp: f64,
    pub recip_temp: f64,
    /// Molar concentrations by species name
    pub concentrations: HashMap<String, f64>,
    /// Unweighted total concentration, Σ [X_s]
    pub total_concentration: f64,
}

impl ThreeBodyData {
    pub fn new(temperature: f64, concentrations: HashMap<String, f64>) -> Self {
        let total_concentration = concentrations.values().sum();
        Self {
            temperature,
            log_temp: temperature.ln(),
            recip_temp: 1.0 / temperature,
            concentrations,
            total_concentration,
        }
    }

    /// The concentration of a species, zero when absent.
    pub fn concentration(&self, species: &str) -> f64 {
        self.concentrations.get(species).copied().unwrap_or(0.0)
    }
}

/// Shared data for falloff evaluation; identical content to
/// [`ThreeBodyData`], kept as its own type so each evaluator stays
/// monomorphic in its variant.
#[derive(Debug, Clone, Default)]
pub struct FalloffData {
    pub temperature: f64,
    pub log_temp: f64,
    pub recip_temp: f64,
    pub concentrations: HashMap<String, f64>,
    pub total_concentration: f64,
}

impl FalloffData {
    pub fn new(temperature: f64, concentrations: HashMap<String, f64>) -> Self {
        let total_concentration = concentrations.values().sum();
        Self {
            temperature,
            log_temp: temperature.ln(),
            recip_temp: 1.0 / temperature,
            concentrations,
            total_concentration,
        }
    }

    pub fn concentration(&self, species: &str) -> f64 {
        self.concentrations.get(species).copied().unwrap_or(0.0)
    }
}

/// Temperature and pressure terms for logarithmic-pressure interpolation.
#[derive(Debug, Clone, Default)]
pub struct PlogData {
    pub temperature: f64,
    pub log_temp: f64,
    pub recip_temp: f64,
    pub pressure: f64,
    /// ln P, the interpolation coordinate
    pub log_pressure: f64,
}

impl PlogData {
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self {
            temperature,
            log_temp: temperature.ln(),
            recip_temp: 1.0 / temperature,
            pressure,
            log_pressure: pressure.ln(),
        }
    }
}

/// Temperature and pressure terms for Chebyshev expansions.
#[derive(Debug, Clone, Default)]
pub struct ChebyshevData {
    pub temperature: f64,
    pub recip_temp: f64,
    pub pressure: f64,
    /// log10 P, the normalized-pressure coordinate
    pub log10_pressure: f64,
}

impl ChebyshevData {
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self {
            temperature,
            recip_temp: 1.0 / temperature,
            pressure,
            log10_pressure: pressure.log10(),
        }
    }
}

/// Shared data for user-supplied rate functions, which see only the
/// temperature.
#[derive(Debug, Clone, Default)]
pub struct CustomData {
    pub temperature: f64,
}

impl CustomData {
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }
}
