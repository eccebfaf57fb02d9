//! Discrete Fourier transforms of power-of-two length, from 2 to 65536 samples.
//!
//! Signals are passed as separate real and imaginary slices. Every transform validates its input
//! first, picks the kernel registered for the size and returns an immutable
//! [`TransformResult`]; the caller's slices are never modified.
//!
//! # Normalization
//!
//! Both directions scale by `1/sqrt(N)`, so the transform is unitary:
//!
//! - `inverse(forward(x)) == x` up to rounding
//! - the energy of the input equals [`TransformResult::total_power`] of the output
//!
//! Results therefore differ by a factor of `sqrt(N)` from libraries that leave the forward
//! transform unscaled (FFTW, RustFFT).
//!
//! # Kernels
//!
//! Sizes 8 to 65536 are served by specialized kernels listed in
//! [`kernels::catalogue::CATALOGUE`]; sizes 2 and 4 by the reference kernel. Every specialized
//! kernel is checked against the reference by [`verify`]. Use [`describe_implementation`] to see
//! what serves a given size.
//!
//! # Example
//!
//! ```
//! use p2fft::forward;
//!
//! let reals = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
//! let imags = [0.0; 8];
//! let spectrum = forward(&reals, &imags).unwrap();
//! assert!((spectrum.magnitude(0).unwrap() - 36.0 / 8f64.sqrt()).abs() < 1e-12);
//! ```
#[cfg(feature = "complex-nums")]
use num_complex::Complex64;

pub mod bit_reverse;
pub mod error;
pub mod kernels;
pub mod options;
pub mod registry;
pub mod result;
pub mod twiddles;
mod utils;
pub mod verify;

pub use error::{FftError, InputIssue, SizeIssue};
pub use kernels::{Direction, Kernel};
pub use options::{BitReverseAlgorithm, Options};
pub use registry::{register, KernelDescription};
pub use result::TransformResult;

/// Smallest supported transform size
pub const MIN_SIZE: usize = 2;
/// Largest supported transform size
pub const MAX_SIZE: usize = 1 << MAX_LOG_N;
/// `log2(MAX_SIZE)`
pub const MAX_LOG_N: usize = 16;

/// Transforms `reals + i·imags` with the kernel registered for its length.
///
/// Output is in natural order and scaled by `1/sqrt(N)` in both directions. Bit reversal
/// options are guessed from the length, see [`Options::guess_options`].
///
/// # Errors
///
/// - [`FftError::InvalidInput`] if the slices differ in length or hold a NaN or infinity
/// - [`FftError::InvalidSize`] if the length is not a power of two in `2..=65536`
///
/// Nothing is computed when an error is returned.
pub fn transform(
    reals: &[f64],
    imags: &[f64],
    direction: Direction,
) -> Result<TransformResult, FftError> {
    transform_with_opts(reals, imags, direction, &Options::guess_options(reals.len()))
}

/// Same as [`transform`], with explicit [`Options`].
///
/// # Errors
///
/// See [`transform`].
pub fn transform_with_opts(
    reals: &[f64],
    imags: &[f64],
    direction: Direction,
    opts: &Options,
) -> Result<TransformResult, FftError> {
    utils::validate_signal(reals, imags)?;
    let kernel = registry::global().resolve(reals.len())?;
    Ok(kernels::run_validated(kernel, reals, imags, direction, opts))
}

/// Transforms a real signal; the imaginary part is taken as zero.
///
/// # Errors
///
/// See [`transform`].
pub fn transform_real(reals: &[f64], direction: Direction) -> Result<TransformResult, FftError> {
    let imags = vec![0.0; reals.len()];
    transform(reals, &imags, direction)
}

/// Forward transform
///
/// # Errors
///
/// See [`transform`].
pub fn forward(reals: &[f64], imags: &[f64]) -> Result<TransformResult, FftError> {
    transform(reals, imags, Direction::Forward)
}

/// Inverse transform
///
/// # Errors
///
/// See [`transform`].
pub fn inverse(reals: &[f64], imags: &[f64]) -> Result<TransformResult, FftError> {
    transform(reals, imags, Direction::Inverse)
}

/// Transforms interleaved complex samples.
///
/// # Errors
///
/// See [`transform`].
#[cfg(feature = "complex-nums")]
pub fn transform_complex(
    signal: &[Complex64],
    direction: Direction,
) -> Result<TransformResult, FftError> {
    let (reals, imags) = utils::deinterleave_complex64(signal);
    transform(&reals, &imags, direction)
}

/// `true` if `n` is a size this crate can transform
pub fn supports_size(n: usize) -> bool {
    utils::validate_size(n).is_ok()
}

/// Human readable description of the kernel serving size `n`, for diagnostics.
///
/// Describing a size resolves it, so kernels can no longer be registered for it afterwards.
pub fn describe_implementation(n: usize) -> String {
    match registry::global().describe(n) {
        Ok(description) => description.to_string(),
        Err(err) => format!("unsupported: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use utilities::{assert_float_closeness, assert_slices_closeness, random_signal};

    use super::*;
    use crate::kernels::catalogue::CATALOGUE;
    use crate::kernels::ReferenceKernel;

    fn energy(reals: &[f64], imags: &[f64]) -> f64 {
        reals.iter().chain(imags).map(|x| x * x).sum()
    }

    macro_rules! test_round_trip {
        ($test_name:ident, $log_n:literal) => {
            #[test]
            fn $test_name() {
                let n = 1 << $log_n;
                let (reals, imags) = random_signal(n, $log_n);
                let spectrum = forward(&reals, &imags).unwrap();
                let back = inverse(spectrum.reals(), spectrum.imags()).unwrap();

                let norm = energy(&reals, &imags).sqrt();
                let actual = back.reals().iter().chain(back.imags());
                let expected = reals.iter().chain(imags.iter());
                let diff: f64 = actual
                    .zip(expected)
                    .map(|(a, e)| (a - e).powi(2))
                    .sum::<f64>()
                    .sqrt();
                assert!(diff <= 1e-9 * norm, "N = {n}: {diff}");
                assert_eq!(back.direction(), Direction::Inverse);
            }
        };
    }

    test_round_trip!(round_trip_2, 1);
    test_round_trip!(round_trip_4, 2);
    test_round_trip!(round_trip_8, 3);
    test_round_trip!(round_trip_16, 4);
    test_round_trip!(round_trip_32, 5);
    test_round_trip!(round_trip_64, 6);
    test_round_trip!(round_trip_128, 7);
    test_round_trip!(round_trip_256, 8);
    test_round_trip!(round_trip_512, 9);
    test_round_trip!(round_trip_1024, 10);
    test_round_trip!(round_trip_2048, 11);
    test_round_trip!(round_trip_4096, 12);
    test_round_trip!(round_trip_8192, 13);
    test_round_trip!(round_trip_16384, 14);
    test_round_trip!(round_trip_32768, 15);
    test_round_trip!(round_trip_65536, 16);

    #[test]
    fn parseval_for_every_kernel() {
        let mut kernels: Vec<(usize, Box<dyn Kernel>)> = CATALOGUE
            .iter()
            .map(|entry| (entry.size, (entry.factory)()))
            .collect();
        kernels.push((2, Box::new(ReferenceKernel)));
        kernels.push((4, Box::new(ReferenceKernel)));

        for (n, kernel) in kernels {
            let (reals, imags) = random_signal(n, 42);
            let input_energy = energy(&reals, &imags);
            for direction in [Direction::Forward, Direction::Inverse] {
                let result = kernel.transform(&reals, &imags, direction).unwrap();
                assert_float_closeness(result.total_power(), input_energy, 1e-9 * input_energy);
            }
        }
    }

    #[test]
    fn impulse_has_flat_magnitude() {
        for log_n in 1..=MAX_LOG_N {
            let n = 1 << log_n;
            let mut reals = vec![0.0; n];
            reals[0] = 1.0;
            let result = transform_real(&reals, Direction::Forward).unwrap();
            let expected = 1.0 / (n as f64).sqrt();
            for i in 0..n {
                assert_float_closeness(result.magnitude(i).unwrap(), expected, 1e-14);
            }
        }
    }

    #[test]
    fn linearity() {
        let n = 512;
        let (x_re, x_im) = random_signal(n, 1);
        let (y_re, y_im) = random_signal(n, 2);
        let (a, b) = (2.5, -0.75);

        let mix = |x: &[f64], y: &[f64]| -> Vec<f64> {
            x.iter().zip(y).map(|(x, y)| a * x + b * y).collect()
        };
        let combined = forward(&mix(&x_re, &y_re), &mix(&x_im, &y_im)).unwrap();
        let tx = forward(&x_re, &x_im).unwrap();
        let ty = forward(&y_re, &y_im).unwrap();

        assert_slices_closeness(combined.reals(), &mix(tx.reals(), ty.reals()), 1e-12);
        assert_slices_closeness(combined.imags(), &mix(tx.imags(), ty.imags()), 1e-12);
    }

    #[test]
    fn golden_ramp_8() {
        let reals: Vec<f64> = (1..=8).map(f64::from).collect();
        let result = transform_real(&reals, Direction::Forward).unwrap();

        // X[k] = (-4 + 4i·cot(πk/8)) / sqrt(8) for k > 0
        let sqrt2 = std::f64::consts::SQRT_2;
        let expected_re = [36.0 / 8f64.sqrt(), -sqrt2, -sqrt2, -sqrt2, -sqrt2, -sqrt2, -sqrt2, -sqrt2];
        let expected_im = [
            0.0,
            2.0 + sqrt2,
            sqrt2,
            2.0 - sqrt2,
            0.0,
            sqrt2 - 2.0,
            -sqrt2,
            -2.0 - sqrt2,
        ];
        assert_slices_closeness(result.reals(), &expected_re, 1e-12);
        assert_slices_closeness(result.imags(), &expected_im, 1e-12);
        assert_float_closeness(result.magnitude(0).unwrap(), 12.727922061357855, 1e-12);
        assert_eq!(result.dominant_bin(), Some(1));
    }

    #[test]
    fn validation_happens_first() {
        assert_eq!(
            forward(&[1.0; 6], &[0.0; 6]).unwrap_err(),
            FftError::InvalidSize {
                size: 6,
                reason: SizeIssue::NotPowerOfTwo
            }
        );
        assert!(matches!(
            forward(&[1.0], &[0.0]),
            Err(FftError::InvalidSize {
                reason: SizeIssue::TooSmall,
                ..
            })
        ));
        assert!(matches!(
            transform_real(&vec![0.0; 1 << 17], Direction::Forward),
            Err(FftError::InvalidSize {
                reason: SizeIssue::TooLarge,
                ..
            })
        ));
        assert_eq!(
            inverse(&[0.0, f64::NAN, 0.0, 0.0], &[0.0; 4]).unwrap_err(),
            FftError::InvalidInput(InputIssue::NonFinite { index: 1 })
        );
        assert!(matches!(
            forward(&[0.0; 4], &[0.0; 8]),
            Err(FftError::InvalidInput(InputIssue::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn explicit_options_do_not_change_results() {
        let (reals, imags) = random_signal(1 << 15, 7);
        let expected = forward(&reals, &imags).unwrap();
        for algorithm in [
            BitReverseAlgorithm::SwapTable,
            BitReverseAlgorithm::Gray,
            BitReverseAlgorithm::Cobra,
        ] {
            let opts = Options::with_bit_reverse(algorithm);
            let actual = transform_with_opts(&reals, &imags, Direction::Forward, &opts).unwrap();
            assert_eq!(actual.reals(), expected.reals());
            assert_eq!(actual.imags(), expected.imags());
        }
    }

    #[test]
    fn size_support_and_descriptions() {
        assert!(supports_size(2));
        assert!(supports_size(MAX_SIZE));
        assert!(!supports_size(0));
        assert!(!supports_size(96));
        assert!(!supports_size(MAX_SIZE * 2));

        assert_eq!(
            describe_implementation(4),
            "reference-radix2: generic reference kernel for N = 4, priority 0"
        );
        assert!(describe_implementation(256).starts_with("staged-radix2-256: specialized"));
        assert!(describe_implementation(100).starts_with("unsupported: invalid size 100"));
    }

    #[cfg(feature = "complex-nums")]
    #[test]
    fn complex_interop() {
        let signal: Vec<Complex64> = (0..16)
            .map(|i| Complex64::new(i as f64, -(i as f64) / 2.0))
            .collect();
        let result = transform_complex(&signal, Direction::Forward).unwrap();
        let (reals, imags): (Vec<f64>, Vec<f64>) = signal.iter().map(|z| (z.re, z.im)).unzip();
        let expected = forward(&reals, &imags).unwrap();
        assert_eq!(result.to_complex(), expected.to_complex());
    }
}
