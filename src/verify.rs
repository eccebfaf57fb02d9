//! Numerical verification of kernels against [`ReferenceKernel`].
//!
//! A kernel may only be catalogued as `genuine` if [`verify_kernel`] accepts it on the
//! [`standard_suite`] for its size. Nothing here runs on the transform path.
//!
//! Up to `N = 256` the suite holds a pure sinusoid at every bin. Above that, one sinusoid per
//! bin would make verifying the whole catalogue quadratic in `N` (each one costs a reference
//! transform), so only a spread of bins is covered: both ends, the quarter points and Nyquist.
use std::f64::consts::TAU;

use crate::error::{FftError, InputIssue};
use crate::kernels::catalogue::CATALOGUE;
use crate::kernels::{Direction, Kernel, ReferenceKernel};
use crate::utils::validate_size;

/// Largest accepted relative L2 error between a kernel and the reference
pub const TOLERANCE: f64 = 1e-9;

/// Sizes up to this one get a pure sinusoid at every bin
const EVERY_BIN_MAX_SIZE: usize = 256;

/// One named input of the suite.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSignal {
    pub label: String,
    pub reals: Vec<f64>,
    pub imags: Vec<f64>,
}

impl TestSignal {
    fn real(label: impl Into<String>, reals: Vec<f64>) -> Self {
        let imags = vec![0.0; reals.len()];
        Self {
            label: label.into(),
            reals,
            imags,
        }
    }

    /// `e^{2πi·bin·j/N}` for `j` in `0..N`
    fn sinusoid(n: usize, bin: usize) -> Self {
        let (imags, reals): (Vec<f64>, Vec<f64>) = (0..n)
            .map(|j| (TAU * ((bin * j) % n) as f64 / n as f64).sin_cos())
            .unzip();
        Self {
            label: format!("sinusoid at bin {bin}"),
            reals,
            imags,
        }
    }
}

/// Outcome of a successful verification
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub kernel: &'static str,
    pub size: usize,
    /// Number of signals checked, each in both directions
    pub signals: usize,
    pub max_relative_error: f64,
}

/// Representative inputs for size `n`: impulses at both ends, constant, ramp, alternating sign,
/// a deterministic pseudo-noise sequence and pure sinusoids.
///
/// Sinusoids cover every bin for `n <= 256` and a spread of bins (both ends, the quarter
/// points and Nyquist) above that.
///
/// # Errors
///
/// Returns [`FftError::InvalidSize`] if `n` is not a supported size.
pub fn standard_suite(n: usize) -> Result<Vec<TestSignal>, FftError> {
    validate_size(n)?;

    let mut impulse_first = vec![0.0; n];
    impulse_first[0] = 1.0;
    let mut impulse_last = vec![0.0; n];
    impulse_last[n - 1] = 1.0;

    let mut suite = vec![
        TestSignal::real("impulse at 0", impulse_first),
        TestSignal::real(format!("impulse at {}", n - 1), impulse_last),
        TestSignal::real("constant", vec![1.0; n]),
        TestSignal::real("ramp", (0..n).map(|j| j as f64).collect()),
        TestSignal::real(
            "alternating sign",
            (0..n).map(|j| if j % 2 == 0 { 1.0 } else { -1.0 }).collect(),
        ),
        TestSignal {
            label: "pseudo-noise".to_owned(),
            reals: (0..n).map(|j| pseudo_noise(j, 7919)).collect(),
            imags: (0..n).map(|j| pseudo_noise(j, 104_729)).collect(),
        },
    ];

    if n <= EVERY_BIN_MAX_SIZE {
        suite.extend((0..n).map(|bin| TestSignal::sinusoid(n, bin)));
    } else {
        let mut bins = vec![1, 2, n / 4, n / 2 - 1, n / 2, 3 * n / 4, n - 1];
        bins.dedup();
        suite.extend(bins.into_iter().map(|bin| TestSignal::sinusoid(n, bin)));
    }

    Ok(suite)
}

/// Values in `[-0.5, 0.5)` from a multiplicative hash of the index
fn pseudo_noise(j: usize, multiplier: usize) -> f64 {
    const MODULUS: usize = 1009;
    (j.wrapping_mul(multiplier) % MODULUS) as f64 / MODULUS as f64 - 0.5
}

/// `||actual - expected||₂ / ||expected||₂`
pub fn relative_error(
    actual_re: &[f64],
    actual_im: &[f64],
    expected_re: &[f64],
    expected_im: &[f64],
) -> f64 {
    let mut diff = 0.0;
    let mut norm = 0.0;
    let actual = actual_re.iter().zip(actual_im);
    let expected = expected_re.iter().zip(expected_im);
    for ((a_re, a_im), (e_re, e_im)) in actual.zip(expected) {
        diff += (a_re - e_re).powi(2) + (a_im - e_im).powi(2);
        norm += e_re * e_re + e_im * e_im;
    }
    diff.sqrt() / norm.sqrt().max(f64::MIN_POSITIVE)
}

/// Runs `kernel` and [`ReferenceKernel`] on every signal, in both directions.
///
/// # Errors
///
/// [`FftError::InternalInconsistency`] on the first output whose relative error exceeds
/// [`TOLERANCE`]. [`FftError::InvalidInput`] if `signals` is empty or any signal is not of
/// length `n`; nothing is transformed in that case. Transform errors (a kernel bound to another
/// size) are passed through.
pub fn verify_kernel(
    kernel: &dyn Kernel,
    n: usize,
    signals: &[TestSignal],
) -> Result<VerificationReport, FftError> {
    validate_size(n)?;
    if signals.is_empty() {
        return Err(FftError::InvalidInput(InputIssue::EmptySuite));
    }
    for (index, signal) in signals.iter().enumerate() {
        for actual in [signal.reals.len(), signal.imags.len()] {
            if actual != n {
                return Err(FftError::InvalidInput(InputIssue::SuiteLength {
                    index,
                    expected: n,
                    actual,
                }));
            }
        }
    }
    let mut max_relative_error: f64 = 0.0;

    for signal in signals {
        for direction in [Direction::Forward, Direction::Inverse] {
            let actual = kernel.transform(&signal.reals, &signal.imags, direction)?;
            let expected = ReferenceKernel.transform(&signal.reals, &signal.imags, direction)?;
            let error = relative_error(
                actual.reals(),
                actual.imags(),
                expected.reals(),
                expected.imags(),
            );
            if !(error <= TOLERANCE) {
                tracing::warn!(
                    kernel = kernel.name(),
                    n,
                    signal = %signal.label,
                    ?direction,
                    error,
                    "kernel disagrees with the reference"
                );
                return Err(FftError::InternalInconsistency {
                    kernel: kernel.name(),
                    size: n,
                    relative_error: error,
                    tolerance: TOLERANCE,
                });
            }
            max_relative_error = max_relative_error.max(error);
        }
    }

    Ok(VerificationReport {
        kernel: kernel.name(),
        size: n,
        signals: signals.len(),
        max_relative_error,
    })
}

/// Verifies every catalogue row that claims a genuine specialization.
///
/// # Errors
///
/// The first failure reported by [`verify_kernel`].
pub fn verify_catalogue() -> Result<Vec<VerificationReport>, FftError> {
    CATALOGUE
        .iter()
        .filter(|entry| entry.genuine)
        .map(|entry| {
            let kernel = (entry.factory)();
            let report = verify_kernel(kernel.as_ref(), entry.size, &standard_suite(entry.size)?)?;
            tracing::debug!(
                kernel = report.kernel,
                n = report.size,
                error = report.max_relative_error,
                "verified"
            );
            Ok(report)
        })
        .collect()
}
