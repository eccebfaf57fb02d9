//! Immutable output of a transform.
use std::sync::OnceLock;

#[cfg(feature = "complex-nums")]
use num_complex::Complex64;

use crate::kernels::Direction;

/// Output of one transform: `N` complex samples in natural order, scaled by `1/sqrt(N)`.
///
/// Magnitude, phase and power are derived on first access and cached; once observed they never
/// change. Nothing is handed out by mutable reference.
#[derive(Debug, Clone)]
pub struct TransformResult {
    reals: Box<[f64]>,
    imags: Box<[f64]>,
    direction: Direction,
    magnitudes: OnceLock<Box<[f64]>>,
    phases: OnceLock<Box<[f64]>>,
    powers: OnceLock<Box<[f64]>>,
}

impl TransformResult {
    pub(crate) fn new(reals: Vec<f64>, imags: Vec<f64>, direction: Direction) -> Self {
        debug_assert_eq!(reals.len(), imags.len());
        Self {
            reals: reals.into_boxed_slice(),
            imags: imags.into_boxed_slice(),
            direction,
            magnitudes: OnceLock::new(),
            phases: OnceLock::new(),
            powers: OnceLock::new(),
        }
    }

    fn derive(&self, f: impl Fn(f64, f64) -> f64) -> Box<[f64]> {
        self.reals
            .iter()
            .zip(self.imags.iter())
            .map(|(re, im)| f(*re, *im))
            .collect()
    }

    fn magnitudes(&self) -> &[f64] {
        self.magnitudes.get_or_init(|| self.derive(f64::hypot))
    }

    fn phases(&self) -> &[f64] {
        self.phases.get_or_init(|| self.derive(|re, im| im.atan2(re)))
    }

    fn powers(&self) -> &[f64] {
        self.powers.get_or_init(|| self.derive(|re, im| re * re + im * im))
    }

    /// Number of samples `N`
    pub fn len(&self) -> usize {
        self.reals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reals.is_empty()
    }

    /// Direction of the transform that produced this result
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn real(&self, i: usize) -> Option<f64> {
        self.reals.get(i).copied()
    }

    pub fn imag(&self, i: usize) -> Option<f64> {
        self.imags.get(i).copied()
    }

    /// `sqrt(re² + im²)` of sample `i`
    pub fn magnitude(&self, i: usize) -> Option<f64> {
        self.magnitudes().get(i).copied()
    }

    /// `atan2(im, re)` of sample `i`, in `[-π, π]`
    pub fn phase(&self, i: usize) -> Option<f64> {
        self.phases().get(i).copied()
    }

    /// `re² + im²` of sample `i`
    pub fn power(&self, i: usize) -> Option<f64> {
        self.powers().get(i).copied()
    }

    pub fn reals(&self) -> &[f64] {
        &self.reals
    }

    pub fn imags(&self) -> &[f64] {
        &self.imags
    }

    pub fn to_reals(&self) -> Vec<f64> {
        self.reals.to_vec()
    }

    pub fn to_imags(&self) -> Vec<f64> {
        self.imags.to_vec()
    }

    pub fn to_magnitudes(&self) -> Vec<f64> {
        self.magnitudes().to_vec()
    }

    pub fn to_phases(&self) -> Vec<f64> {
        self.phases().to_vec()
    }

    pub fn to_powers(&self) -> Vec<f64> {
        self.powers().to_vec()
    }

    /// `Σ power[i]`. Equals the input energy, since the scaling is unitary.
    pub fn total_power(&self) -> f64 {
        self.powers().iter().sum()
    }

    /// Bin with the largest magnitude among `1..=N/2`, skipping DC and the mirrored half.
    ///
    /// Ties go to the lowest bin. Returns `None` when all of those bins are zero.
    pub fn dominant_bin(&self) -> Option<usize> {
        let half = self.len() / 2;
        let magnitudes = self.magnitudes();
        let mut best: Option<(usize, f64)> = None;
        for (bin, &m) in magnitudes.iter().enumerate().take(half + 1).skip(1) {
            if m > best.map_or(0.0, |(_, b)| b) {
                best = Some((bin, m));
            }
        }
        best.map(|(bin, _)| bin)
    }

    /// Frequency in Hz represented by `bin` for a signal sampled at `sample_rate` Hz
    pub fn bin_frequency(&self, bin: usize, sample_rate: f64) -> f64 {
        bin as f64 * sample_rate / self.len() as f64
    }

    /// Gives up the result, returning the real and imaginary parts
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.reals.into_vec(), self.imags.into_vec())
    }

    #[cfg(feature = "complex-nums")]
    pub fn to_complex(&self) -> Vec<Complex64> {
        crate::utils::combine_re_im(&self.reals, &self.imags)
    }
}
