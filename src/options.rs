/// Options to tune the specialized kernels depending on the hardware and input size.
///
/// Calling the transform without specifying options will automatically select reasonable
/// defaults depending on the input size.
///
/// Options only change *how* a kernel gets to its result, never the result: every bit reversal
/// algorithm produces the same permutation. The reference kernel ignores them.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub bit_reverse: BitReverseAlgorithm,
}

/// Largest `log2(N)` for which the materialized swap table is the default.
pub(crate) const SWAP_TABLE_MAX_LOG_N: usize = 12;

/// Largest `log2(N)` for which the Gray-code walk is the default; above it COBRA takes over.
pub(crate) const GRAY_MAX_LOG_N: usize = 14;

impl Options {
    /// Options for an explicit bit reversal algorithm.
    pub fn with_bit_reverse(bit_reverse: BitReverseAlgorithm) -> Options {
        Options { bit_reverse }
    }

    /// Picks defaults for an input of `input_size` samples.
    pub fn guess_options(input_size: usize) -> Options {
        let mut options = Options::default();
        let n = input_size.max(1).ilog2() as usize;
        options.bit_reverse = if n <= SWAP_TABLE_MAX_LOG_N {
            BitReverseAlgorithm::SwapTable
        } else if n <= GRAY_MAX_LOG_N {
            BitReverseAlgorithm::Gray
        } else {
            BitReverseAlgorithm::Cobra
        };
        options
    }
}

/// The algorithm to use for bit reversal.
/// Different algorithms perform best on different input sizes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BitReverseAlgorithm {
    #[default]
    /// Replay the cached list of swap pairs for the size.
    /// Fastest while the table stays small, costs `N/2` index pairs of memory per size.
    SwapTable,
    /// Gray-code walk computing the pairs on the fly, no extra memory
    Gray,
    /// Cache Optimal Bit Reversal Algorithm
    ///
    /// This is faster at larger datasets that do not fit into the cache.
    /// Below `2^15` elements it degrades to [`BitReverseAlgorithm::Gray`].
    Cobra,
}
