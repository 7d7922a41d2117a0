//! ratelaw
//!
//! This library provides the reaction-rate evaluation core of a gas-phase
//! chemical kinetics code, including:
//! - Six rate laws (Arrhenius, three-body, Lindemann/Troe falloff,
//!   pressure-dependent Arrhenius tables, Chebyshev expansions, custom
//!   functions) behind one polymorphic contract
//! - Batched evaluation of homogeneous rate ensembles
//! - Round-tripping rate parameters through a self-describing configuration
//!   tree with attached unit systems
//! - Live propagation of parameter mutations into batched evaluators
//! - Validation of configured rates

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::arrhenius::ArrheniusCoeff;
    pub use crate::constants::GAS_CONSTANT;
    pub use crate::multirate::{
        link_rate, EvaluatorLink, MultiRate, RateParams, RateType, ReactionRate, SharedMultiRate,
    };
    pub use crate::params::{ParamMap, ParamValue};
    pub use crate::rates::arrhenius::ArrheniusRate;
    pub use crate::rates::chebyshev::ChebyshevRate;
    pub use crate::rates::custom::CustomRate;
    pub use crate::rates::data::{
        ArrheniusData, ChebyshevData, CustomData, FalloffData, PlogData, ThreeBodyData,
    };
    pub use crate::rates::error::RateError;
    pub use crate::rates::falloff::{FalloffRate, TroeParams};
    pub use crate::rates::plog::PlogRate;
    pub use crate::rates::threebody::ThreeBodyRate;
    pub use crate::units::{UnitError, UnitSystem, UnitSystemBuilder, Units};
    pub use crate::validation::{check_rates, Report, Severity, ValidationResult};
}

/// Physical constants shared across the crate
pub mod constants;

/// Dimensional units and per-document unit contexts
pub mod units;

/// Self-describing parameter tree used to configure rates
pub mod params;

/// The Arrhenius (A, b, E/R) building block shared by several rate laws
pub mod arrhenius;

/// The concrete rate-law variants
pub mod rates {
    /// Elementary Arrhenius rates
    pub mod arrhenius;
    /// Chebyshev bivariate rate expansions
    pub mod chebyshev;
    /// User-supplied rate functions of temperature
    pub mod custom;
    /// Per-evaluation shared-data bundles
    pub mod data;
    /// Error types for rate configuration and linking
    pub mod error;
    /// Lindemann/Troe pressure-dependent falloff rates
    pub mod falloff;
    /// Logarithmic-pressure interpolation between Arrhenius tables
    pub mod plog;
    /// Three-body rates with per-species collision efficiencies
    pub mod threebody;
}

/// Batched evaluation of homogeneous rate ensembles
pub mod multirate;

/// Validation of configured rates
pub mod validation {
    pub use crate::validation::checks::*;
    pub use crate::validation::report::*;

    /// Per-rate validation checks
    pub mod checks;
    /// Validation report data structures
    pub mod report;
}
