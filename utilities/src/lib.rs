//! Test helpers shared by the `p2fft` unit tests and benchmarks.
pub extern crate rustfft;

use rand::{distributions::Uniform, prelude::*, rngs::StdRng};
use rustfft::{num_complex::Complex64, FftPlanner};

/// Asserts that two fp numbers are approximately equal.
///
/// # Panics
///
/// Panics if `actual` and `expected` are too far from each other
#[track_caller]
pub fn assert_float_closeness(actual: f64, expected: f64, epsilon: f64) {
    if (actual - expected).abs() >= epsilon {
        panic!(
            "Assertion failed: {actual} too far from expected value {expected} (with epsilon {epsilon})",
        );
    }
}

/// Asserts element-wise closeness of two slices, reporting the first offending index.
///
/// # Panics
///
/// Panics if the lengths differ or any pair is further apart than `epsilon`
#[track_caller]
pub fn assert_slices_closeness(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "slice lengths differ");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        if (a - e).abs() >= epsilon {
            panic!("index {i}: {a} too far from expected value {e} (with epsilon {epsilon})");
        }
    }
}

/// Fill the provided buffers with a random complex signal in `[-1, 1)`.
///
/// The same `seed` always yields the same signal.
///
/// # Panics
///
/// Panics if `reals.len() != imags.len()`
pub fn gen_random_signal(reals: &mut [f64], imags: &mut [f64], seed: u64) {
    assert_eq!(
        reals.len(),
        imags.len(),
        "Real and imaginary slices must be of equal length"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let uniform_dist = Uniform::new(-1.0, 1.0);
    for (real, imag) in reals.iter_mut().zip(imags.iter_mut()) {
        *real = uniform_dist.sample(&mut rng);
        *imag = uniform_dist.sample(&mut rng);
    }
}

/// Convenience wrapper around [`gen_random_signal`] that allocates the buffers.
pub fn random_signal(len: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut reals = vec![0.0; len];
    let mut imags = vec![0.0; len];
    gen_random_signal(&mut reals, &mut imags, seed);
    (reals, imags)
}

/// Unnormalized forward DFT computed by RustFFT, split into real and imaginary parts.
pub fn rustfft_forward(reals: &[f64], imags: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut buffer: Vec<Complex64> = reals
        .iter()
        .zip(imags.iter())
        .map(|(re, im)| Complex64::new(*re, *im))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    buffer.iter().map(|z| (z.re, z.im)).unzip()
}
