//! Error types for rate configuration, validation and linking.
//!
//! Configuration problems surface synchronously from `set_parameters` and
//! `validate`; evaluation itself never fails, returning NaN for unset rates
//! so that batched evaluation keeps its semantics.

use thiserror::Error;

use crate::units::UnitError;

#[derive(Error, Debug)]
pub enum RateError {
    /// Bad numeric domain, missing required subkey, or a violated sign
    /// convention. Validation errors include the offending reaction's
    /// equation for context.
    #[error("invalid rate parameter: {0}")]
    InvalidParameter(String),

    /// A quantity carried units incompatible with its expected dimension.
    #[error("unit mismatch: {0}")]
    UnitMismatch(#[from] UnitError),

    /// An operation that requires a linked evaluator was called on an
    /// unlinked rate, or an evaluator index was out of range.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A textual rate expression failed to parse or bind.
    #[error("invalid rate expression: {0}")]
    Expression(#[from] meval::Error),
}
