//! Reference radix-2 decimation-in-time kernel.
//!
//! Plain textbook formulation: the twiddle index is recomputed for every butterfly and the output
//! is permuted index by index. Every other kernel is checked against it.
use crate::bit_reverse::{bit_rev_by_index, reverse};
use crate::kernels::common::{butterfly, normalize};
use crate::kernels::{Direction, Kernel};
use crate::options::Options;
use crate::twiddles;

/// Generic kernel valid for every supported size.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceKernel;

impl ReferenceKernel {
    pub const NAME: &'static str = "reference-radix2";
}

/// Butterfly stages of the reference algorithm, in place, output left in bit-reversed order.
///
/// Stage `l` (1-based) has butterfly distance `n2 = N >> l`. The pair `(k, k + n2)` uses the
/// twiddle at `reverse(k >> (log_n - l), log_n)`.
fn reference_stages(reals: &mut [f64], imags: &mut [f64], log_n: usize, direction: Direction) {
    let n = reals.len();
    let table = twiddles::for_log_n(log_n);
    let (cos, sin) = (table.cosines(), table.sines());
    let sign = direction.sine_sign();

    for l in 1..=log_n {
        let nu1 = log_n - l;
        let n2 = 1 << nu1;

        let mut k = 0;
        while k < n {
            for _ in 0..n2 {
                let p = reverse(k >> nu1, log_n);
                let (c, s) = (cos[p], sign * sin[p]);
                let (r0, i0, r1, i1) =
                    butterfly(reals[k], imags[k], reals[k + n2], imags[k + n2], c, s);
                reals[k] = r0;
                imags[k] = i0;
                reals[k + n2] = r1;
                imags[k + n2] = i1;
                k += 1;
            }
            k += n2;
        }
    }
}

impl Kernel for ReferenceKernel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn bound_size(&self) -> Option<usize> {
        None
    }

    fn process(&self, reals: &mut [f64], imags: &mut [f64], direction: Direction, _opts: &Options) {
        let log_n = reals.len().ilog2() as usize;
        reference_stages(reals, imags, log_n, direction);
        bit_rev_by_index(reals, log_n);
        bit_rev_by_index(imags, log_n);
        normalize(reals, imags);
    }
}

/// The reference algorithm locked to one size.
///
/// This is what a catalogue slot holds when no genuine specialization exists for the size.
/// It must always be registered with `genuine == false`.
#[derive(Debug, Clone, Copy)]
pub struct BoundReference {
    size: usize,
}

impl BoundReference {
    pub const NAME: &'static str = "bound-reference-radix2";

    /// # Errors
    ///
    /// Returns [`crate::FftError::InvalidSize`] if `size` is not supported.
    pub fn new(size: usize) -> Result<Self, crate::FftError> {
        crate::utils::validate_size(size)?;
        Ok(Self { size })
    }
}

impl Kernel for BoundReference {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn bound_size(&self) -> Option<usize> {
        Some(self.size)
    }

    fn process(&self, reals: &mut [f64], imags: &mut [f64], direction: Direction, opts: &Options) {
        ReferenceKernel.process(reals, imags, direction, opts);
    }
}
