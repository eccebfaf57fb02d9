//! Process-wide cache of twiddle factors.
//!
//! One table per supported size, built on first request and kept for the lifetime of the
//! process. Each size has its own [`OnceLock`] slot, so a table is published exactly once and a
//! concurrent reader either blocks until it is complete or sees the finished table.
use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::bit_reverse::reverse;
use crate::error::FftError;
use crate::utils::validate_size;
use crate::MAX_LOG_N;

/// `N/2` roots of unity `(cos(2πk/N), sin(2πk/N))` for one size `N`.
///
/// The sine is stored with a positive sign; kernels negate it for the forward direction.
#[derive(Debug)]
pub struct TwiddleTable {
    log_n: usize,
    cos: Box<[f64]>,
    sin: Box<[f64]>,
    /// The same pairs, indexed by `reverse(b, log_n - 1)`: the order in which the
    /// decimation-in-time stages visit them, block by block.
    cos_rev: Box<[f64]>,
    sin_rev: Box<[f64]>,
}

impl TwiddleTable {
    fn build(log_n: usize) -> Self {
        let n = 1usize << log_n;
        let half = n >> 1;
        let angle_mult = 2.0 * PI / n as f64;

        let (cos, sin): (Vec<f64>, Vec<f64>) = (0..half)
            .map(|k| {
                let (s, c) = (angle_mult * k as f64).sin_cos();
                (c, s)
            })
            .unzip();

        let (cos_rev, sin_rev): (Vec<f64>, Vec<f64>) = (0..half)
            .map(|b| {
                let p = reverse(b, log_n - 1);
                (cos[p], sin[p])
            })
            .unzip();

        Self {
            log_n,
            cos: cos.into_boxed_slice(),
            sin: sin.into_boxed_slice(),
            cos_rev: cos_rev.into_boxed_slice(),
            sin_rev: sin_rev.into_boxed_slice(),
        }
    }

    /// The transform size `N` this table belongs to
    pub fn size(&self) -> usize {
        1 << self.log_n
    }

    /// Number of stored pairs, always `N/2`
    pub fn len(&self) -> usize {
        self.cos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cos.is_empty()
    }

    /// `(cos(2πk/N), sin(2πk/N))`, or `None` when `k >= N/2`
    pub fn get(&self, k: usize) -> Option<(f64, f64)> {
        Some((*self.cos.get(k)?, *self.sin.get(k)?))
    }

    pub fn cosines(&self) -> &[f64] {
        &self.cos
    }

    pub fn sines(&self) -> &[f64] {
        &self.sin
    }

    /// Cosines in stage order: entry `b` is the twiddle of butterfly block `b`
    pub fn cosines_bit_reversed(&self) -> &[f64] {
        &self.cos_rev
    }

    /// Sines in stage order: entry `b` is the twiddle of butterfly block `b`
    pub fn sines_bit_reversed(&self) -> &[f64] {
        &self.sin_rev
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: OnceLock<TwiddleTable> = OnceLock::new();

static TABLES: [OnceLock<TwiddleTable>; MAX_LOG_N + 1] = [EMPTY_SLOT; MAX_LOG_N + 1];

/// Returns the twiddle table for size `n`, building it on first use.
///
/// # Errors
///
/// Returns [`FftError::InvalidSize`] if `n` is not a supported power of two. Nothing is
/// cached in that case.
pub fn get(n: usize) -> Result<&'static TwiddleTable, FftError> {
    let log_n = validate_size(n)?;
    Ok(for_log_n(log_n))
}

/// Same as [`get`] for an already validated `log2(N)`.
pub(crate) fn for_log_n(log_n: usize) -> &'static TwiddleTable {
    TABLES[log_n].get_or_init(|| {
        let table = TwiddleTable::build(log_n);
        tracing::debug!(n = table.size(), entries = table.len(), "built twiddle table");
        table
    })
}

/// Sizes whose twiddle table has been built so far.
pub fn cached_sizes() -> Vec<usize> {
    TABLES
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.get().is_some())
        .map(|(log_n, _)| 1 << log_n)
        .collect()
}
