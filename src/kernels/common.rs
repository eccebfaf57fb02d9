//! Butterflies and stage passes shared by every kernel.
//!
//! All kernels combine samples through [`butterfly`] and finish with [`normalize`], so for a
//! given size and input they perform the same floating point operations in the same order.
//! That is what lets the specialized kernels reproduce the reference output exactly.
use num_traits::Float;

/// One radix-2 decimation-in-time butterfly.
///
/// `t = x1 * (c - i*s)`, returns `(x0 + t, x0 - t)` as `(re0, im0, re1, im1)`.
/// The caller folds the direction into the sign of `s`.
#[inline(always)]
pub(crate) fn butterfly<T: Float>(
    x0_re: T,
    x0_im: T,
    x1_re: T,
    x1_im: T,
    c: T,
    s: T,
) -> (T, T, T, T) {
    let t_re = x1_re * c + x1_im * s;
    let t_im = x1_im * c - x1_re * s;
    (x0_re + t_re, x0_im + t_im, x0_re - t_re, x0_im - t_im)
}

/// Butterfly with the trivial twiddle `W^0 = 1`
#[inline(always)]
pub(crate) fn butterfly_w0<T: Float>(x0_re: T, x0_im: T, x1_re: T, x1_im: T) -> (T, T, T, T) {
    (x0_re + x1_re, x0_im + x1_im, x0_re - x1_re, x0_im - x1_im)
}

/// Scales every sample by `1/sqrt(N)`, in both directions.
pub(crate) fn normalize(reals: &mut [f64], imags: &mut [f64]) {
    let scale = 1.0 / (reals.len() as f64).sqrt();
    for (z_re, z_im) in reals.iter_mut().zip(imags.iter_mut()) {
        *z_re *= scale;
        *z_im *= scale;
    }
}

/// First stage: a single block spanning the whole buffer, twiddle `W^0`
#[multiversion::multiversion(targets("x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl", // x86_64-v4
                                     "x86_64+avx2+fma", // x86_64-v3
                                     "x86_64+sse4.2", // x86_64-v2
                                     "x86+avx2+fma",
                                     "x86+sse4.2",
                                     "x86+sse2",
                                     "aarch64+neon",
))]
pub(crate) fn first_stage<T: Float>(reals: &mut [T], imags: &mut [T]) {
    let dist = reals.len() >> 1;
    let (reals_s0, reals_s1) = reals.split_at_mut(dist);
    let (imags_s0, imags_s1) = imags.split_at_mut(dist);

    reals_s0
        .iter_mut()
        .zip(reals_s1.iter_mut())
        .zip(imags_s0.iter_mut())
        .zip(imags_s1.iter_mut())
        .for_each(|(((re_s0, re_s1), im_s0), im_s1)| {
            let (r0, i0, r1, i1) = butterfly_w0(*re_s0, *im_s0, *re_s1, *im_s1);
            *re_s0 = r0;
            *im_s0 = i0;
            *re_s1 = r1;
            *im_s1 = i1;
        });
}

/// Generic stage with butterfly distance `dist`.
///
/// Block `b` (the `b`-th run of `2 * dist` samples) uses the single twiddle
/// `(twiddles_re[b], sign * twiddles_im[b])` for all of its `dist` butterflies, so the twiddles
/// must be given in stage order (see [`crate::twiddles::TwiddleTable::cosines_bit_reversed`]).
#[multiversion::multiversion(targets("x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl", // x86_64-v4
                                     "x86_64+avx2+fma", // x86_64-v3
                                     "x86_64+sse4.2", // x86_64-v2
                                     "x86+avx2+fma",
                                     "x86+sse4.2",
                                     "x86+sse2",
                                     "aarch64+neon",
))]
pub(crate) fn stage_n<T: Float>(
    reals: &mut [T],
    imags: &mut [T],
    twiddles_re: &[T],
    twiddles_im: &[T],
    sign: T,
    dist: usize,
) {
    let chunk_size = dist << 1;

    reals
        .chunks_exact_mut(chunk_size)
        .zip(imags.chunks_exact_mut(chunk_size))
        .zip(twiddles_re.iter().zip(twiddles_im.iter()))
        .for_each(|((reals_chunk, imags_chunk), (w_re, w_im))| {
            let (c, s) = (*w_re, sign * *w_im);
            let (reals_s0, reals_s1) = reals_chunk.split_at_mut(dist);
            let (imags_s0, imags_s1) = imags_chunk.split_at_mut(dist);

            reals_s0
                .iter_mut()
                .zip(reals_s1.iter_mut())
                .zip(imags_s0.iter_mut())
                .zip(imags_s1.iter_mut())
                .for_each(|(((re_s0, re_s1), im_s0), im_s1)| {
                    let (r0, i0, r1, i1) = butterfly(*re_s0, *im_s0, *re_s1, *im_s1, c, s);
                    *re_s0 = r0;
                    *im_s0 = i0;
                    *re_s1 = r1;
                    *im_s1 = i1;
                });
        });
}

/// `dist == 2`: two butterflies per block sharing one twiddle, written out
#[multiversion::multiversion(targets("x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl", // x86_64-v4
                                     "x86_64+avx2+fma", // x86_64-v3
                                     "x86_64+sse4.2", // x86_64-v2
                                     "x86+avx2+fma",
                                     "x86+sse4.2",
                                     "x86+sse2",
                                     "aarch64+neon",
))]
pub(crate) fn stage_chunk_4<T: Float>(
    reals: &mut [T],
    imags: &mut [T],
    twiddles_re: &[T],
    twiddles_im: &[T],
    sign: T,
) {
    reals
        .chunks_exact_mut(4)
        .zip(imags.chunks_exact_mut(4))
        .zip(twiddles_re.iter().zip(twiddles_im.iter()))
        .for_each(|((re, im), (w_re, w_im))| {
            let (c, s) = (*w_re, sign * *w_im);

            let (r0, i0, r1, i1) = butterfly(re[0], im[0], re[2], im[2], c, s);
            re[0] = r0;
            im[0] = i0;
            re[2] = r1;
            im[2] = i1;

            let (r0, i0, r1, i1) = butterfly(re[1], im[1], re[3], im[3], c, s);
            re[1] = r0;
            im[1] = i0;
            re[3] = r1;
            im[3] = i1;
        });
}

/// `dist == 1`: the last stage, one butterfly per block
#[multiversion::multiversion(targets("x86_64+avx512f+avx512bw+avx512cd+avx512dq+avx512vl", // x86_64-v4
                                     "x86_64+avx2+fma", // x86_64-v3
                                     "x86_64+sse4.2", // x86_64-v2
                                     "x86+avx2+fma",
                                     "x86+sse4.2",
                                     "x86+sse2",
                                     "aarch64+neon",
))]
pub(crate) fn stage_chunk_2<T: Float>(
    reals: &mut [T],
    imags: &mut [T],
    twiddles_re: &[T],
    twiddles_im: &[T],
    sign: T,
) {
    reals
        .chunks_exact_mut(2)
        .zip(imags.chunks_exact_mut(2))
        .zip(twiddles_re.iter().zip(twiddles_im.iter()))
        .for_each(|((re, im), (w_re, w_im))| {
            let (r0, i0, r1, i1) = butterfly(re[0], im[0], re[1], im[1], *w_re, sign * *w_im);
            re[0] = r0;
            im[0] = i0;
            re[1] = r1;
            im[1] = i1;
        });
}
