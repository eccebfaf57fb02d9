//! Const-generic kernel template, monomorphised once per catalogued size from `2^5` up.
//!
//! Compared to the reference kernel:
//! - butterflies that share a twiddle factor are grouped into blocks, so each twiddle is fetched
//!   once per block from the stage-ordered view of the cache instead of once per butterfly
//! - the first stage (a single block with `W^0`) needs no multiplications
//! - the last two stages run dedicated passes without an inner loop
//! - the output permutation uses the cached swap table, or an on-the-fly algorithm for large
//!   sizes, as chosen by [`Options`]
use crate::bit_reverse::bit_reverse_in_place;
use crate::kernels::common::{first_stage, normalize, stage_chunk_2, stage_chunk_4, stage_n};
use crate::kernels::{Direction, Kernel};
use crate::options::Options;
use crate::twiddles;
use crate::MAX_LOG_N;

/// Kernel bound to `N = 2^LOG_N`, for `5 <= LOG_N <= 16`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Staged<const LOG_N: usize>;

const NAMES: [&str; MAX_LOG_N + 1] = [
    "",
    "",
    "",
    "",
    "",
    "staged-radix2-32",
    "staged-radix2-64",
    "staged-radix2-128",
    "staged-radix2-256",
    "staged-radix2-512",
    "staged-radix2-1024",
    "staged-radix2-2048",
    "staged-radix2-4096",
    "staged-radix2-8192",
    "staged-radix2-16384",
    "staged-radix2-32768",
    "staged-radix2-65536",
];

impl<const LOG_N: usize> Staged<LOG_N> {
    pub const N: usize = 1 << LOG_N;

    // Evaluated on use: rejects instantiations outside the supported range at compile time.
    const VALID: () = assert!(LOG_N >= 5 && LOG_N <= MAX_LOG_N);

    pub const NAME: &'static str = NAMES[LOG_N];
}

impl<const LOG_N: usize> Kernel for Staged<LOG_N> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn bound_size(&self) -> Option<usize> {
        Some(Self::N)
    }

    fn process(&self, reals: &mut [f64], imags: &mut [f64], direction: Direction, opts: &Options) {
        let () = Self::VALID;
        assert!(reals.len() == Self::N && imags.len() == Self::N);

        let table = twiddles::for_log_n(LOG_N);
        let (tw_re, tw_im) = (table.cosines_bit_reversed(), table.sines_bit_reversed());
        let sign = direction.sine_sign();

        first_stage(reals, imags);
        for stage in 1..LOG_N - 2 {
            let dist = Self::N >> (stage + 1);
            stage_n(reals, imags, tw_re, tw_im, sign, dist);
        }
        stage_chunk_4(reals, imags, tw_re, tw_im, sign);
        stage_chunk_2(reals, imags, tw_re, tw_im, sign);

        bit_reverse_in_place(reals, LOG_N, opts.bit_reverse);
        bit_reverse_in_place(imags, LOG_N, opts.bit_reverse);

        normalize(reals, imags);
    }
}
