use thiserror::Error;

/// Unrecoverable failures of the accumulator backend.
///
/// Precondition failures on the proof paths (deleting a non-member,
/// degenerate gcd input) never surface here; they come back as proof objects
/// flagged invalid, per the error-handling contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("trusted setup powers have not been generated")]
    PowersNotGenerated,

    #[error("power index {index} exceeds setup bound {max}")]
    PowerOutOfRange { index: usize, max: usize },

    #[error("polynomial degree {degree} exceeds setup bound {max}")]
    DegreeOutOfRange { degree: usize, max: usize },

    #[error("setup secret must be nonzero")]
    ZeroSecret,

    #[error("division by the zero polynomial")]
    ZeroDivisor,

    #[error("polynomial division left a nonzero remainder")]
    InexactDivision,
}

pub type Result<T, E = AccumulatorError> = std::result::Result<T, E>;
