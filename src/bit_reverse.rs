//! Bit reversal permutation: the index helper, the cached swap tables, and the in-place
//! algorithms used when a table would be too large to be worth keeping.
//!
//! Every algorithm here produces the same permutation, which is its own inverse.
//!
//! # References
//!
//! [1] L. Carter and K. S. Gatlin, "Towards an optimal bit-reversal permutation program," Proceedings 39th Annual
//! Symposium on Foundations of Computer Science (Cat. No.98CB36280), Palo Alto, CA, USA, 1998, pp. 544-553, doi:
//! 10.1109/SFCS.1998.743505.
//! [2] <https://www.katjaas.nl/bitreversal/bitreversal.html>
use std::sync::OnceLock;

use crate::error::FftError;
use crate::options::BitReverseAlgorithm;
use crate::utils::validate_size;
use crate::MAX_LOG_N;

const BLOCK_WIDTH: usize = 128; // size of the cacheline
const LOG_BLOCK_WIDTH: usize = 7; // log2 of cacheline

/// Reverses the lowest `bit_width` bits of `i`.
///
/// Bits of `i` above `bit_width` are discarded; `bit_width == 0` returns `i` unchanged.
#[inline]
pub fn reverse(i: usize, bit_width: usize) -> usize {
    if bit_width == 0 {
        return i;
    }
    i.reverse_bits() >> (usize::BITS as usize - bit_width)
}

/// The reduced form of the permutation for one size: every pair `(i, reverse(i))` with
/// `i < reverse(i)`, in increasing `i`.
#[derive(Debug)]
pub struct SwapTable {
    log_n: usize,
    pairs: Box<[(u32, u32)]>,
}

impl SwapTable {
    fn build(log_n: usize) -> Self {
        let n = 1usize << log_n;
        let pairs: Vec<(u32, u32)> = (0..n)
            .filter_map(|i| {
                let r = reverse(i, log_n);
                (i < r).then_some((i as u32, r as u32))
            })
            .collect();
        Self {
            log_n,
            pairs: pairs.into_boxed_slice(),
        }
    }

    /// The size `N` this table permutes
    pub fn size(&self) -> usize {
        1 << self.log_n
    }

    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    /// Permutes `buf` in place.
    ///
    /// # Panics
    ///
    /// Panics if `buf.len()` differs from the table's size.
    pub fn apply<T>(&self, buf: &mut [T]) {
        assert_eq!(buf.len(), self.size());
        apply_swaps(buf, &self.pairs);
    }
}

#[multiversion::multiversion(targets("x86_64+avx2+fma", // x86_64-v3
                                     "x86_64+sse4.2", // x86_64-v2
                                     "x86+avx2+fma",
                                     "x86+sse4.2",
                                     "x86+sse2",
                                     "aarch64+neon",
))]
fn apply_swaps<T>(buf: &mut [T], pairs: &[(u32, u32)]) {
    for &(i, r) in pairs {
        buf.swap(i as usize, r as usize);
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: OnceLock<SwapTable> = OnceLock::new();

static SWAP_TABLES: [OnceLock<SwapTable>; MAX_LOG_N + 1] = [EMPTY_SLOT; MAX_LOG_N + 1];

/// Returns the cached swap table for size `n`, building it on first use.
///
/// # Errors
///
/// Returns [`FftError::InvalidSize`] if `n` is not a supported power of two.
pub fn for_size(n: usize) -> Result<&'static SwapTable, FftError> {
    let log_n = validate_size(n)?;
    Ok(for_log_n(log_n))
}

pub(crate) fn for_log_n(log_n: usize) -> &'static SwapTable {
    SWAP_TABLES[log_n].get_or_init(|| {
        let table = SwapTable::build(log_n);
        tracing::debug!(n = table.size(), entries = table.pairs.len(), "built swap table");
        table
    })
}

/// The full permutation for size `n`: entry `i` holds `reverse(i, log2(n))`.
///
/// # Errors
///
/// Returns [`FftError::InvalidSize`] if `n` is not a supported power of two.
pub fn permutation(n: usize) -> Result<Vec<usize>, FftError> {
    let log_n = validate_size(n)?;
    Ok((0..n).map(|i| reverse(i, log_n)).collect())
}

/// Bit-reverses `buf` (of length `2^log_n`) in place with the chosen algorithm.
///
/// # Panics
///
/// Panics if `buf.len() != 2^log_n`, with every algorithm, or if `log_n > MAX_LOG_N` and the
/// swap table is requested.
pub fn bit_reverse_in_place<T: Default + Copy>(
    buf: &mut [T],
    log_n: usize,
    algorithm: BitReverseAlgorithm,
) {
    assert_eq!(buf.len(), 1 << log_n);
    match algorithm {
        BitReverseAlgorithm::SwapTable => for_log_n(log_n).apply(buf),
        BitReverseAlgorithm::Gray => bit_rev_gray(buf, log_n),
        BitReverseAlgorithm::Cobra => bit_rev_cobra(buf, log_n),
    }
}

/// Swaps every index with its reversal, computing each reversal from scratch.
pub(crate) fn bit_rev_by_index<T>(buf: &mut [T], log_n: usize) {
    for i in 0..buf.len() {
        let r = reverse(i, log_n);
        if i < r {
            buf.swap(i, r);
        }
    }
}

/// ## References
/// [1] <https://www.katjaas.nl/bitreversal/bitreversal.html>
pub(crate) fn bit_rev_gray<T>(buf: &mut [T], log_n: usize) {
    if log_n < 2 {
        // nothing moves for N <= 2
        return;
    }
    let mut nodd: usize;
    let mut noddrev; // to hold bitwise negated or odd values

    let big_n = 1 << log_n;
    let halfn = big_n >> 1;
    let quartn = big_n >> 2;
    let nmin1 = big_n - 1;

    let mut forward = halfn;
    let mut rev = 1;

    let mut i: usize = quartn;
    while i > 0 {
        // Gray code generator for even values
        let zeros = i.trailing_zeros();
        forward ^= 2 << zeros; // toggle one bit of forward
        rev ^= quartn >> zeros; // toggle one bit of rev

        // swap even and ~even conditionally
        if forward < rev {
            buf.swap(forward, rev);
            nodd = nmin1 ^ forward;
            noddrev = nmin1 ^ rev;
            buf.swap(nodd, noddrev);
        }

        nodd = forward ^ 1; // compute the odd values from the even
        noddrev = rev ^ halfn;

        // swap odd unconditionally
        buf.swap(nodd, noddrev);
        i -= 1;
    }
}

/// Cache Optimal Bit-Reverse Algorithm (COBRA) [1].
///
/// Sizes up to `2^14` do not fill a single `BLOCK_WIDTH x BLOCK_WIDTH` tile and go through
/// [`bit_rev_gray`] instead.
#[multiversion::multiversion(targets("x86_64+avx2+fma", // x86_64-v3
                                     "x86_64+sse4.2", // x86_64-v2
                                     "x86+avx2+fma",
                                     "x86+sse4.2",
                                     "x86+sse2",
))]
pub(crate) fn bit_rev_cobra<T: Default + Copy>(v: &mut [T], log_n: usize) {
    if log_n <= 2 * LOG_BLOCK_WIDTH {
        bit_rev_gray(v, log_n);
        return;
    }
    let num_b_bits = log_n - 2 * LOG_BLOCK_WIDTH;
    let b_size: usize = 1 << num_b_bits;

    let mut buffer = vec![T::default(); BLOCK_WIDTH * BLOCK_WIDTH];

    for b in 0..b_size {
        let b_rev = reverse(b, num_b_bits);

        // Copy block to buffer
        for a in 0..BLOCK_WIDTH {
            let a_rev = reverse(a, LOG_BLOCK_WIDTH);
            for c in 0..BLOCK_WIDTH {
                buffer[(a_rev << LOG_BLOCK_WIDTH) | c] =
                    v[(a << num_b_bits << LOG_BLOCK_WIDTH) | (b << LOG_BLOCK_WIDTH) | c];
            }
        }

        for c in 0..BLOCK_WIDTH {
            let c_rev = reverse(c, LOG_BLOCK_WIDTH);

            for a_rev in 0..BLOCK_WIDTH {
                let a = reverse(a_rev, LOG_BLOCK_WIDTH);

                // index a|b|c is swapped only when it is below its reversal c'|b'|a'
                let index_less_than_reverse = a < c_rev
                    || (a == c_rev && b < b_rev)
                    || (a == c_rev && b == b_rev && a_rev < c);

                if index_less_than_reverse {
                    let v_idx = (c_rev << num_b_bits << LOG_BLOCK_WIDTH)
                        | (b_rev << LOG_BLOCK_WIDTH)
                        | a_rev;
                    let b_idx = (a_rev << LOG_BLOCK_WIDTH) | c;
                    std::mem::swap(&mut v[v_idx], &mut buffer[b_idx]);
                }
            }
        }

        // Copy changes that were swapped into buffer above
        for a in 0..BLOCK_WIDTH {
            let a_rev = reverse(a, LOG_BLOCK_WIDTH);
            for c in 0..BLOCK_WIDTH {
                let c_rev = reverse(c, LOG_BLOCK_WIDTH);
                let index_less_than_reverse = a < c_rev
                    || (a == c_rev && b < b_rev)
                    || (a == c_rev && b == b_rev && a_rev < c);

                if index_less_than_reverse {
                    let v_idx = (a << num_b_bits << LOG_BLOCK_WIDTH) | (b << LOG_BLOCK_WIDTH) | c;
                    let b_idx = (a_rev << LOG_BLOCK_WIDTH) | c;
                    std::mem::swap(&mut v[v_idx], &mut buffer[b_idx]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_SIZE;

    /// Top down bit reverse interleaving. This is a very simple and well known approach that we
    /// only use for checking the other algorithms.
    fn top_down_bit_reverse_permutation<T: Copy>(x: &[T]) -> Vec<T> {
        if x.len() == 1 {
            return x.to_vec();
        }
        let (evens, odds): (Vec<T>, Vec<T>) = x.chunks_exact(2).map(|c| (c[0], c[1])).unzip();

        let mut y = top_down_bit_reverse_permutation(&evens);
        y.extend_from_slice(&top_down_bit_reverse_permutation(&odds));
        y
    }

    fn all_log_sizes() -> impl Iterator<Item = usize> {
        1..=MAX_LOG_N
    }

    #[test]
    fn reverse_bits() {
        assert_eq!(reverse(0b001, 3), 0b100);
        assert_eq!(reverse(0b110, 3), 0b011);
        assert_eq!(reverse(1, 16), 1 << 15);
        assert_eq!(reverse(5, 0), 5);
        assert_eq!(reverse(0b1011, 1), 1);
    }

    #[test]
    fn gray_bit_reversal() {
        let mut buf: Vec<f64> = (0..8).map(f64::from).collect();
        bit_rev_gray(&mut buf, 3);
        assert_eq!(buf, vec![0.0, 4.0, 2.0, 6.0, 1.0, 5.0, 3.0, 7.0]);

        let mut buf: Vec<f64> = (0..16).map(f64::from).collect();
        bit_rev_gray(&mut buf, 4);
        assert_eq!(
            buf,
            vec![
                0.0, 8.0, 4.0, 12.0, 2.0, 10.0, 6.0, 14.0, 1.0, 9.0, 5.0, 13.0, 3.0, 11.0, 7.0,
                15.0,
            ]
        );
    }

    #[test]
    fn every_algorithm_matches_top_down() {
        for log_n in all_log_sizes() {
            let x: Vec<usize> = (0..1 << log_n).collect();
            let expected = top_down_bit_reverse_permutation(&x);

            for algorithm in [
                BitReverseAlgorithm::SwapTable,
                BitReverseAlgorithm::Gray,
                BitReverseAlgorithm::Cobra,
            ] {
                let mut v = x.clone();
                bit_reverse_in_place(&mut v, log_n, algorithm);
                assert_eq!(v, expected, "{algorithm:?} at log_n = {log_n}");
            }

            let mut v = x.clone();
            bit_rev_by_index(&mut v, log_n);
            assert_eq!(v, expected);

            assert_eq!(permutation(1 << log_n).unwrap(), expected);
        }
    }

    #[test]
    fn permutation_is_an_involution() {
        for log_n in all_log_sizes() {
            let n = 1 << log_n;
            let x: Vec<u32> = (0..n as u32).collect();

            let mut v = x.clone();
            let table = for_size(n).unwrap();
            table.apply(&mut v);
            table.apply(&mut v);
            assert_eq!(v, x);

            let perm = permutation(n).unwrap();
            assert!(perm.iter().enumerate().all(|(i, &r)| perm[r] == i));
        }
    }

    #[test]
    fn swap_pairs_are_ordered_and_disjoint() {
        let table = for_size(16).unwrap();
        assert_eq!(
            table.pairs(),
            &[(1, 8), (2, 4), (3, 12), (5, 10), (7, 14), (11, 13)]
        );

        let table = for_size(MAX_SIZE).unwrap();
        let mut seen = vec![false; MAX_SIZE];
        for &(i, r) in table.pairs() {
            assert!(i < r);
            assert!(!seen[i as usize] && !seen[r as usize]);
            seen[i as usize] = true;
            seen[r as usize] = true;
        }
        // fixed points are the palindromic indices: 2^8 of them for 16 bits
        assert_eq!(seen.iter().filter(|s| !**s).count(), 1 << 8);
    }

    #[test]
    fn every_algorithm_rejects_a_mismatched_length() {
        for algorithm in [
            BitReverseAlgorithm::SwapTable,
            BitReverseAlgorithm::Gray,
            BitReverseAlgorithm::Cobra,
        ] {
            let outcome = std::panic::catch_unwind(|| {
                let mut v: Vec<usize> = (0..1 << 16).collect();
                bit_reverse_in_place(&mut v, 15, algorithm);
            });
            assert!(outcome.is_err(), "{algorithm:?}");
        }
    }

    #[test]
    fn swap_tables_are_cached() {
        assert!(std::ptr::eq(for_size(64).unwrap(), for_size(64).unwrap()));
        assert!(for_size(100).is_err());
    }
}
