//! FFT Kernels
//!
//! A kernel runs the full transform for one size (specialized kernels) or for every supported
//! size (the reference kernel). All of them share the butterflies in [`common`], the twiddle
//! cache and the bit reversal tables.
//!
//! ## Organization
//!
//! - `reference`: the generic radix-2 kernel, the correctness baseline for everything else
//! - `unrolled`: fully unrolled kernels for `N = 8` and `N = 16`
//! - `staged`: the const-generic template behind every larger catalogued size
//! - `catalogue`: the static table of specialized kernels the registry starts from
//! - `common`: butterflies and stage passes shared by all of the above
use crate::error::{FftError, SizeIssue};
use crate::options::Options;
use crate::result::TransformResult;
use crate::utils::validate_signal;

pub mod catalogue;
pub(crate) mod common;
pub mod reference;
pub mod staged;
pub mod unrolled;

pub use reference::{BoundReference, ReferenceKernel};
pub use staged::Staged;
pub use unrolled::{Unrolled16, Unrolled8};

/// Direction of the transform.
///
/// Only the sign of the twiddle angle depends on it. Both directions scale by `1/sqrt(N)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Twiddles `e^{-2πik/N}`
    Forward,
    /// Twiddles `e^{+2πik/N}`
    Inverse,
}

impl Direction {
    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Self::Forward
        } else {
            Self::Inverse
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, Self::Forward)
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }

    /// Factor applied to the stored (positive) sine of each twiddle
    #[inline]
    pub(crate) fn sine_sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Inverse => -1.0,
        }
    }
}

/// A transform implementation.
///
/// Implementors only provide [`Kernel::process`]; validation, copying and wrapping of the output
/// are shared by the provided methods.
pub trait Kernel: Send + Sync {
    /// Stable identifier used in diagnostics
    fn name(&self) -> &'static str;

    /// `Some(n)` if the kernel only handles size `n`, `None` if it handles every supported size
    fn bound_size(&self) -> Option<usize>;

    /// Transforms `reals`/`imags` in place: butterfly stages, bit reversal and `1/sqrt(N)`
    /// scaling.
    ///
    /// The buffers have already been validated: equal lengths, a size this kernel supports and
    /// finite samples. Kernels do not check again.
    fn process(&self, reals: &mut [f64], imags: &mut [f64], direction: Direction, opts: &Options);

    /// Transforms a copy of the input with options guessed from its length.
    ///
    /// # Errors
    ///
    /// See [`Kernel::transform_with_opts`].
    fn transform(
        &self,
        reals: &[f64],
        imags: &[f64],
        direction: Direction,
    ) -> Result<TransformResult, FftError> {
        self.transform_with_opts(reals, imags, direction, &Options::guess_options(reals.len()))
    }

    /// Transforms a copy of the input. The caller's slices are never modified.
    ///
    /// # Errors
    ///
    /// [`FftError::InvalidInput`] for mismatched lengths or non-finite samples,
    /// [`FftError::InvalidSize`] for unsupported sizes or a size other than the kernel's bound
    /// size. Nothing is computed in either case.
    fn transform_with_opts(
        &self,
        reals: &[f64],
        imags: &[f64],
        direction: Direction,
        opts: &Options,
    ) -> Result<TransformResult, FftError> {
        validate_signal(reals, imags)?;
        if let Some(expected) = self.bound_size() {
            if expected != reals.len() {
                return Err(FftError::size(
                    reals.len(),
                    SizeIssue::KernelBound { expected },
                ));
            }
        }
        Ok(run_validated(self, reals, imags, direction, opts))
    }
}

/// Copies the (already validated) input, runs the kernel and wraps the output.
pub(crate) fn run_validated<K: Kernel + ?Sized>(
    kernel: &K,
    reals: &[f64],
    imags: &[f64],
    direction: Direction,
    opts: &Options,
) -> TransformResult {
    let mut out_re = reals.to_vec();
    let mut out_im = imags.to_vec();
    kernel.process(&mut out_re, &mut out_im, direction, opts);
    TransformResult::new(out_re, out_im, direction)
}
