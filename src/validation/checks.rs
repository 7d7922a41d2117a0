//! Per-rate validation checks, run once a network has been fully
//! configured.
//!
//! `set_parameters` accepts partially configured rates so that networks can
//! be assembled incrementally; the checks here are the final pass that
//! every rate must survive before evaluation results are trusted.

use crate::multirate::RateParams;
use crate::validation::report::{Report, Severity, ValidationResult};

/// Validates one rate against the reaction equation that owns it, adding
/// any failure to the report.
pub fn check_rate(report: &mut Report, equation: &str, rate: &dyn RateParams) {
    if let Err(err) = rate.validate(equation) {
        report.add_result(ValidationResult::new(
            equation.to_string(),
            err.to_string(),
            Severity::Error,
        ));
    }
}

/// Validates an assembled set of (equation, rate) pairs and returns the
/// collected report.
pub fn check_rates<'a>(
    rates: impl IntoIterator<Item = (&'a str, &'a dyn RateParams)>,
) -> Report {
    let mut report = Report::new();
    for (equation, rate) in rates {
        check_rate(&mut report, equation, rate);
    }
    report
}
