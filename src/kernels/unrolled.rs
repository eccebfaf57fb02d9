//! Fully unrolled kernels for the two smallest catalogued sizes.
//!
//! Every butterfly is written out, stage by stage, with the twiddles of each block loaded once
//! from the shared cache. The bit reversal is a fixed list of swaps.
use crate::kernels::common::{butterfly, butterfly_w0, normalize};
use crate::kernels::{Direction, Kernel};
use crate::options::Options;
use crate::twiddles;

/// `bfly!(re, im, a, b, c, s)`: butterfly on the pair `(a, b)` with twiddle `(c, s)`
macro_rules! bfly {
    ($re:ident, $im:ident, $a:literal, $b:literal, $c:expr, $s:expr) => {{
        let (r0, i0, r1, i1) = butterfly($re[$a], $im[$a], $re[$b], $im[$b], $c, $s);
        $re[$a] = r0;
        $im[$a] = i0;
        $re[$b] = r1;
        $im[$b] = i1;
    }};
}

/// `bfly_w0!(re, im, a, b)`: butterfly on the pair `(a, b)` with twiddle `W^0`
macro_rules! bfly_w0 {
    ($re:ident, $im:ident, $a:literal, $b:literal) => {{
        let (r0, i0, r1, i1) = butterfly_w0($re[$a], $im[$a], $re[$b], $im[$b]);
        $re[$a] = r0;
        $im[$a] = i0;
        $re[$b] = r1;
        $im[$b] = i1;
    }};
}

/// Loads the first `$count` stage-order twiddles of size `$n`, sine signed for `$direction`
macro_rules! load_twiddles {
    ($n:literal, $count:literal, $direction:expr) => {{
        let table = twiddles::for_log_n(($n as usize).ilog2() as usize);
        let sign = $direction.sine_sign();
        let mut c = [0.0f64; $count];
        let mut s = [0.0f64; $count];
        c.copy_from_slice(&table.cosines_bit_reversed()[..$count]);
        for (dst, src) in s.iter_mut().zip(table.sines_bit_reversed()) {
            *dst = sign * *src;
        }
        (c, s)
    }};
}

/// Kernel for `N = 8`
#[derive(Debug, Default, Clone, Copy)]
pub struct Unrolled8;

impl Unrolled8 {
    pub const NAME: &'static str = "unrolled-radix2-8";
    const N: usize = 8;
}

impl Kernel for Unrolled8 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn bound_size(&self) -> Option<usize> {
        Some(Self::N)
    }

    fn process(&self, re: &mut [f64], im: &mut [f64], direction: Direction, _opts: &Options) {
        assert!(re.len() == Self::N && im.len() == Self::N);
        let (c, s) = load_twiddles!(8, 4, direction);

        // n2 = 4
        bfly_w0!(re, im, 0, 4);
        bfly_w0!(re, im, 1, 5);
        bfly_w0!(re, im, 2, 6);
        bfly_w0!(re, im, 3, 7);

        // n2 = 2
        bfly_w0!(re, im, 0, 2);
        bfly_w0!(re, im, 1, 3);
        bfly!(re, im, 4, 6, c[1], s[1]);
        bfly!(re, im, 5, 7, c[1], s[1]);

        // n2 = 1
        bfly_w0!(re, im, 0, 1);
        bfly!(re, im, 2, 3, c[1], s[1]);
        bfly!(re, im, 4, 5, c[2], s[2]);
        bfly!(re, im, 6, 7, c[3], s[3]);

        for buf in [&mut *re, &mut *im] {
            buf.swap(1, 4);
            buf.swap(3, 6);
        }

        normalize(re, im);
    }
}

/// Kernel for `N = 16`
#[derive(Debug, Default, Clone, Copy)]
pub struct Unrolled16;

impl Unrolled16 {
    pub const NAME: &'static str = "unrolled-radix2-16";
    const N: usize = 16;
}

impl Kernel for Unrolled16 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn bound_size(&self) -> Option<usize> {
        Some(Self::N)
    }

    fn process(&self, re: &mut [f64], im: &mut [f64], direction: Direction, _opts: &Options) {
        assert!(re.len() == Self::N && im.len() == Self::N);
        let (c, s) = load_twiddles!(16, 8, direction);

        // n2 = 8
        bfly_w0!(re, im, 0, 8);
        bfly_w0!(re, im, 1, 9);
        bfly_w0!(re, im, 2, 10);
        bfly_w0!(re, im, 3, 11);
        bfly_w0!(re, im, 4, 12);
        bfly_w0!(re, im, 5, 13);
        bfly_w0!(re, im, 6, 14);
        bfly_w0!(re, im, 7, 15);

        // n2 = 4
        bfly_w0!(re, im, 0, 4);
        bfly_w0!(re, im, 1, 5);
        bfly_w0!(re, im, 2, 6);
        bfly_w0!(re, im, 3, 7);
        bfly!(re, im, 8, 12, c[1], s[1]);
        bfly!(re, im, 9, 13, c[1], s[1]);
        bfly!(re, im, 10, 14, c[1], s[1]);
        bfly!(re, im, 11, 15, c[1], s[1]);

        // n2 = 2
        bfly_w0!(re, im, 0, 2);
        bfly_w0!(re, im, 1, 3);
        bfly!(re, im, 4, 6, c[1], s[1]);
        bfly!(re, im, 5, 7, c[1], s[1]);
        bfly!(re, im, 8, 10, c[2], s[2]);
        bfly!(re, im, 9, 11, c[2], s[2]);
        bfly!(re, im, 12, 14, c[3], s[3]);
        bfly!(re, im, 13, 15, c[3], s[3]);

        // n2 = 1
        bfly_w0!(re, im, 0, 1);
        bfly!(re, im, 2, 3, c[1], s[1]);
        bfly!(re, im, 4, 5, c[2], s[2]);
        bfly!(re, im, 6, 7, c[3], s[3]);
        bfly!(re, im, 8, 9, c[4], s[4]);
        bfly!(re, im, 10, 11, c[5], s[5]);
        bfly!(re, im, 12, 13, c[6], s[6]);
        bfly!(re, im, 14, 15, c[7], s[7]);

        for buf in [&mut *re, &mut *im] {
            buf.swap(1, 8);
            buf.swap(2, 4);
            buf.swap(3, 12);
            buf.swap(5, 10);
            buf.swap(7, 14);
            buf.swap(11, 13);
        }

        normalize(re, im);
    }
}
