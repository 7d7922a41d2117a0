//! Physical constants used throughout the crate.
//!
//! All values are CODATA 2018. The crate works in SI units with kmol as the
//! quantity base: energies are J/kmol, concentrations kmol/m^3, pressures Pa.

/// Universal gas constant [J/(kmol·K)]
pub const GAS_CONSTANT: f64 = 8314.462618;

/// Avogadro's number [1/kmol]
pub const AVOGADRO: f64 = 6.02214076e26;

/// One standard atmosphere [Pa]
pub const ONE_ATM: f64 = 101325.0;

/// One bar [Pa]
pub const ONE_BAR: f64 = 1.0e5;

/// Smallest positive value used to guard logarithms of vanishing quantities
pub const SMALL_NUMBER: f64 = 1.0e-300;
