//! Error taxonomy shared by every constructor and fallible call in the crate.
//!
//! Mirrors the taxonomy of the original design: `ParamRange`, `EdgeOverflow`,
//! `ShapeMismatch` and `DomainRequirement` are reported as `Err`.
//! `StreamUnderflow` is not a variant here — per the streaming contract,
//! insufficient data is not an error, it is absorbed into the tail buffer
//! and reported as zero emitted frames.

use thiserror::Error;

/// Crate-wide result alias.
pub type AuroraResult<T> = Result<T, AuroraError>;

/// Errors raised at construction time or at a fallible call site.
///
/// Construction errors leave no object behind; call-site errors leave
/// the destination buffer untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuroraError {
    /// A requested parameter is outside its documented domain
    /// (`radix2Exp`, band count, frequency edges, window type, ...).
    #[error("parameter `{parameter}` out of range: {detail}")]
    ParamRange {
        parameter: &'static str,
        detail: String,
    },

    /// The requested `(num, lowFre, highFre)` at the chosen spacing would
    /// place a band edge above Nyquist even after revision.
    #[error("band edge overflow: low={low_fre} high={high_fre} exceeds nyquist={nyquist}")]
    EdgeOverflow {
        low_fre: f64,
        high_fre: f64,
        nyquist: f64,
    },

    /// A matrix operation's dimension check failed.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A structural precondition was violated (odd FIR order for a
    /// high-pass/band-stop design, non-positive harmonic count, a
    /// wavelet type rejected by PWT, ...).
    #[error("domain requirement violated: {detail}")]
    DomainRequirement { detail: &'static str },
}

impl AuroraError {
    pub(crate) fn param_range(parameter: &'static str, detail: impl Into<String>) -> Self {
        AuroraError::ParamRange {
            parameter,
            detail: detail.into(),
        }
    }
}
