//! Boundary validation and interleave/deinterleave helpers

#[cfg(feature = "complex-nums")]
use num_complex::Complex;

#[cfg(feature = "complex-nums")]
use num_traits::Float;

#[cfg(feature = "complex-nums")]
use bytemuck::cast_slice;

use crate::error::{FftError, InputIssue, SizeIssue};
use crate::{MAX_SIZE, MIN_SIZE};

/// Checks that `n` is a supported transform size and returns `log2(n)`.
pub(crate) fn validate_size(n: usize) -> Result<usize, FftError> {
    if n < MIN_SIZE {
        return Err(FftError::size(n, SizeIssue::TooSmall));
    }
    if n > MAX_SIZE {
        return Err(FftError::size(n, SizeIssue::TooLarge));
    }
    if !n.is_power_of_two() {
        return Err(FftError::size(n, SizeIssue::NotPowerOfTwo));
    }
    Ok(n.ilog2() as usize)
}

/// Full boundary check of a signal: equal lengths, supported size, finite samples.
///
/// Returns `log2(N)`.
pub(crate) fn validate_signal(reals: &[f64], imags: &[f64]) -> Result<usize, FftError> {
    if reals.len() != imags.len() {
        return Err(FftError::InvalidInput(InputIssue::LengthMismatch {
            reals: reals.len(),
            imags: imags.len(),
        }));
    }
    let log_n = validate_size(reals.len())?;

    if let Some(index) = reals
        .iter()
        .zip(imags.iter())
        .position(|(re, im)| !(re.is_finite() && im.is_finite()))
    {
        return Err(FftError::InvalidInput(InputIssue::NonFinite { index }));
    }
    Ok(log_n)
}

/// Separates interleaved `[re, im, re, im, ...]` data like `[1, 2, 3, 4]` into `([1, 3], [2, 4])`
#[cfg(feature = "complex-nums")]
pub(crate) fn deinterleave<T: Copy + Default>(input: &[T]) -> (Vec<T>, Vec<T>) {
    const CHUNK_SIZE: usize = 4;
    const DOUBLE_CHUNK: usize = CHUNK_SIZE * 2;

    let out_len = input.len() / 2;
    let mut out_re = vec![T::default(); out_len];
    let mut out_im = vec![T::default(); out_len];

    input
        .chunks_exact(DOUBLE_CHUNK)
        .zip(out_re.chunks_exact_mut(CHUNK_SIZE))
        .zip(out_im.chunks_exact_mut(CHUNK_SIZE))
        .for_each(|((in_chunk, res), ims)| {
            for (j, pair) in in_chunk.chunks_exact(2).enumerate() {
                res[j] = pair[0];
                ims[j] = pair[1];
            }
        });

    // Process the remainder, too small for the chunked loop
    let input_rem = input.chunks_exact(DOUBLE_CHUNK).remainder();
    let re_rem = out_re.chunks_exact_mut(CHUNK_SIZE).into_remainder();
    let im_rem = out_im.chunks_exact_mut(CHUNK_SIZE).into_remainder();
    input_rem
        .chunks_exact(2)
        .zip(re_rem.iter_mut())
        .zip(im_rem.iter_mut())
        .for_each(|((inp, re), im)| {
            *re = inp[0];
            *im = inp[1];
        });

    (out_re, out_im)
}

/// Utility function to separate a slice of [`Complex64`](num_complex::Complex64)
/// into separate vectors of real and imaginary components.
#[cfg(feature = "complex-nums")]
pub(crate) fn deinterleave_complex64(signal: &[Complex<f64>]) -> (Vec<f64>, Vec<f64>) {
    let complex_t: &[f64] = cast_slice(signal);
    deinterleave(complex_t)
}

/// Utility function to combine separate vectors of real and imaginary components
/// into a single vector of Complex Number Structs.
///
/// # Panics
///
/// Panics if `reals.len() != imags.len()`.
#[cfg(feature = "complex-nums")]
pub(crate) fn combine_re_im<T: Float>(reals: &[T], imags: &[T]) -> Vec<Complex<T>> {
    assert_eq!(reals.len(), imags.len());

    reals
        .iter()
        .zip(imags.iter())
        .map(|(z_re, z_im)| Complex::new(*z_re, *z_im))
        .collect()
}
