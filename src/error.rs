//! Error taxonomy shared by every fallible entry point of the crate.
use thiserror::Error;

use crate::{MAX_SIZE, MIN_SIZE};

/// Why a requested transform size was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeIssue {
    /// The size is not a power of two
    NotPowerOfTwo,
    /// The size is below [`MIN_SIZE`]
    TooSmall,
    /// The size is above [`MAX_SIZE`]
    TooLarge,
    /// A size-locked kernel was invoked with a size other than the one it is bound to
    KernelBound { expected: usize },
}

impl std::fmt::Display for SizeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPowerOfTwo => write!(f, "not a power of two"),
            Self::TooSmall => write!(f, "smaller than the minimum size {MIN_SIZE}"),
            Self::TooLarge => write!(f, "larger than the maximum size {MAX_SIZE}"),
            Self::KernelBound { expected } => write!(f, "kernel is bound to size {expected}"),
        }
    }
}

/// Why a signal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIssue {
    /// Real and imaginary parts have different lengths
    LengthMismatch { reals: usize, imags: usize },
    /// A sample is NaN or infinite
    NonFinite { index: usize },
    /// A verification suite without any signal
    EmptySuite,
    /// Signal `index` of a verification suite does not have the length being verified
    SuiteLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

impl std::fmt::Display for InputIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { reals, imags } => {
                write!(f, "{reals} real samples but {imags} imaginary samples")
            }
            Self::NonFinite { index } => write!(f, "non-finite sample at index {index}"),
            Self::EmptySuite => write!(f, "no signal to verify with"),
            Self::SuiteLength {
                index,
                expected,
                actual,
            } => write!(f, "signal {index} has {actual} samples, expected {expected}"),
        }
    }
}

/// Errors reported by transforms, the kernel registry and the verification harness.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FftError {
    #[error("invalid size {size}: {reason}")]
    InvalidSize { size: usize, reason: SizeIssue },

    #[error("invalid input: {0}")]
    InvalidInput(InputIssue),

    /// Only produced by [`crate::verify`]; the transform path never checks kernels at runtime.
    #[error(
        "kernel `{kernel}` disagrees with the reference at size {size}: relative error {relative_error:e} exceeds {tolerance:e}"
    )]
    InternalInconsistency {
        kernel: &'static str,
        size: usize,
        relative_error: f64,
        tolerance: f64,
    },

    #[error("size {size} was already resolved, kernels can no longer be registered for it")]
    RegistryFrozen { size: usize },
}

impl FftError {
    pub(crate) fn size(size: usize, reason: SizeIssue) -> Self {
        Self::InvalidSize { size, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = FftError::size(12, SizeIssue::NotPowerOfTwo);
        assert_eq!(err.to_string(), "invalid size 12: not a power of two");

        let err = FftError::InvalidInput(InputIssue::LengthMismatch { reals: 8, imags: 4 });
        assert_eq!(
            err.to_string(),
            "invalid input: 8 real samples but 4 imaginary samples"
        );

        let err = FftError::size(16, SizeIssue::KernelBound { expected: 32 });
        assert!(err.to_string().contains("bound to size 32"));

        let err = FftError::InvalidInput(InputIssue::SuiteLength {
            index: 2,
            expected: 32,
            actual: 16,
        });
        assert_eq!(
            err.to_string(),
            "invalid input: signal 2 has 16 samples, expected 32"
        );
    }
}
