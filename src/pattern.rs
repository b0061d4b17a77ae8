//! Grain tile synthesis.
//!
//! Two generators produce the 64×64 luma and 32×32 chroma tiles the
//! compositor samples from:
//!
//! - the **frequency-filtering** generator seeds a sparse Gaussian spectrum
//!   below a pair of cutoff frequencies and runs a separable integer
//!   inverse DCT-II over it;
//! - the **auto-regressive** generator runs a 2D causal recursion over a
//!   Gaussian excitation, optionally injecting a co-located luma term into
//!   chroma tiles.
//!
//! Both are bit-exact integer pipelines: 32-bit accumulators, arithmetic
//! right shifts, and a final clip to the signed pattern range [-127, 127].

use crate::prng;
use crate::tables::{DCT2_64, GAUSSIAN, SEEDS};

/// Pattern tiles are square blocks of at most this edge length.
pub const TILE: usize = 64;

/// Round-to-nearest arithmetic right shift. `s` must be at least 1.
#[inline]
pub(crate) fn round_shift(a: i32, s: u32) -> i32 {
    debug_assert!(s >= 1);
    (a + (1 << (s - 1))) >> s
}

/// Plane class of a tile.
///
/// Luma and chroma tiles run the same algorithms with different geometry:
/// block size, spectrum group width, starting seed, first-pass iDCT
/// scaling, and (for the AR generator) the padded-buffer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TileKind {
    Luma,
    Chroma,
}

impl TileKind {
    /// Block edge length.
    pub(crate) fn size(self) -> usize {
        match self {
            TileKind::Luma => 64,
            TileKind::Chroma => 32,
        }
    }

    /// Subsampling factor the tile models (chroma tiles are 4:2:0).
    fn sub(self) -> usize {
        match self {
            TileKind::Luma => 1,
            TileKind::Chroma => 2,
        }
    }

    /// Spectrum columns filled per PRNG draw.
    fn group(self) -> usize {
        match self {
            TileKind::Luma => 4,
            TileKind::Chroma => 2,
        }
    }

    /// Starting state for spectrum seeding.
    fn seed(self) -> u32 {
        match self {
            TileKind::Luma => SEEDS[0],
            TileKind::Chroma => SEEDS[1],
        }
    }

    /// Rounding offset and shift of the first (vertical) iDCT pass. The
    /// second pass uses 256 / 9 for both sizes.
    fn idct_pass1(self) -> (i32, u32) {
        match self {
            TileKind::Luma => (256, 9),
            TileKind::Chroma => (128, 8),
        }
    }
}

/// Build a frequency-filtering tile.
///
/// `fh` and `fv` are the horizontal/vertical cutoff codes (2..=14). The
/// spectrum is filled group-by-group with consecutive Gaussian samples —
/// the generator state advances once per group position whether or not the
/// group lies below the cutoffs — then DC is forced to zero and the block
/// inverse-transformed. Output is written packed (`size × size`); the
/// result depends only on `(kind, fh, fv)`.
pub(crate) fn ff_pattern(out: &mut [i8; TILE * TILE], kind: TileKind, fh: u8, fv: u8) {
    let size = kind.size();
    let group = kind.group();
    let fh = group * (usize::from(fh) + 1);
    let fv = group * (usize::from(fv) + 1);

    let mut block = [[0i32; TILE]; TILE];
    let mut state = kind.seed();
    for row in 0..size {
        for col in (0..size).step_by(group) {
            if col < fh && row < fv {
                for k in 0..group {
                    block[row][col + k] = i32::from(GAUSSIAN[(state as usize + k) & 2047]);
                }
            }
            state = prng::next(state);
        }
    }
    block[0][0] = 0;

    idct2(out, &block, kind);
}

/// Separable integer inverse DCT-II with final clipping.
///
/// First pass runs the transposed basis down the columns, the second pass
/// along the rows. Chroma blocks use the even-row decimation of the
/// 64-point basis. Intermediate values fit 16 bits by construction.
fn idct2(out: &mut [i8; TILE * TILE], block: &[[i32; TILE]; TILE], kind: TileKind) {
    let size = kind.size();
    let dec = TILE / size;
    let (round1, shift1) = kind.idct_pass1();

    let mut mid = [[0i32; TILE]; TILE];
    for j in 0..size {
        for i in 0..size {
            let mut acc = round1;
            for k in 0..size {
                acc += i32::from(DCT2_64[k * dec][j]) * block[k][i];
            }
            mid[j][i] = acc >> shift1;
        }
    }

    for j in 0..size {
        for i in 0..size {
            let mut acc = 256;
            for k in 0..size {
                acc += mid[j][k] * i32::from(DCT2_64[k * dec][i]);
            }
            out[j * size + i] = ((acc >> 9).clamp(-127, 127)) as i8;
        }
    }
}

/// Padded auto-regressive working buffer.
///
/// The recursion runs over the full padded area; luma keeps its buffer
/// alive as the cross-component source for the chroma tiles, which sample
/// it *before* cropping.
pub(crate) struct PaddedGrain {
    width: usize,
    data: Box<[i8]>,
}

impl PaddedGrain {
    fn new(kind: TileKind) -> Self {
        let (width, height) = match kind {
            TileKind::Luma => (82, 73),
            TileKind::Chroma => (44, 38),
        };
        PaddedGrain {
            width,
            data: vec![0i8; width * height].into_boxed_slice(),
        }
    }

    fn height(&self) -> usize {
        self.data.len() / self.width
    }

    #[inline]
    fn at(&self, y: usize, x: usize) -> i32 {
        i32::from(self.data[y * self.width + x])
    }
}

/// Auto-regressive synthesis parameters. Coefficient counts and shifts are
/// validated by the configuration mappers before reaching this module.
pub(crate) struct ArParams<'a> {
    /// Causal-support coefficients. The length selects the lag (4 ⇒ 1,
    /// 12 ⇒ 2, 24 ⇒ 3; 6 is the fixed five-position SEI layout); an odd
    /// count carries the cross-component coefficient as its last element.
    pub coeffs: &'a [i16],
    /// Arithmetic round-shift applied to the recursion sum.
    pub scale: u32,
    /// Round-shift applied to the Gaussian excitation.
    pub noise_shift: u32,
}

/// Build an auto-regressive tile, returning the padded buffer for use as a
/// cross-component source.
///
/// The exported tile is the interior crop starting at
/// `(3 + 6/sub, 3 + 6/sub)`, sized `64/sub × 64/sub`, written packed into
/// `out`. Two runs with identical inputs produce identical output: the
/// excitation walk always starts from seed-table entry 0.
pub(crate) fn ar_pattern(
    out: &mut [i8; TILE * TILE],
    kind: TileKind,
    params: &ArParams<'_>,
    cross: Option<&PaddedGrain>,
) -> PaddedGrain {
    let sub = kind.sub();
    let (coef, cx) = causal_support(params.coeffs);
    let mut buf = PaddedGrain::new(kind);
    let width = buf.width;
    let height = buf.height();
    let mut state = SEEDS[0];

    for y in 0..height {
        for x in 0..width {
            let mut g = 0i32;
            if y >= 3 && x >= 3 && x < width - 3 {
                for j in -3i32..=0 {
                    let imax = if j < 0 { 3 } else { -1 };
                    for i in -3i32..=imax {
                        g += i32::from(coef[(3 + j) as usize][(3 + i) as usize])
                            * i32::from(buf.data[(y as i32 + j) as usize * width
                                + (x as i32 + i) as usize]);
                    }
                }
                if cx != 0 {
                    if let Some(src) = cross {
                        // Co-located 2x2 luma average (4:2:0); the source is
                        // the padded buffer, not the cropped tile.
                        let ci = (x - 3) * sub + 3;
                        let cj = (y - 3) * sub + 3;
                        let mut z = src.at(cj, ci);
                        if sub > 1 {
                            z += src.at(cj, ci + 1) + src.at(cj + 1, ci) + src.at(cj + 1, ci + 1);
                            z = round_shift(z, 2);
                        }
                        g += i32::from(cx) * z;
                    }
                }
                g = round_shift(g, params.scale);
            }

            g += round_shift(
                i32::from(GAUSSIAN[(state & 2047) as usize]),
                params.noise_shift,
            );
            state = prng::next(state);

            buf.data[y * width + x] = g.clamp(-127, 127) as i8;
        }
    }

    let n = 64 / sub;
    let off = 3 + 6 / sub;
    out.fill(0);
    for y in 0..n {
        for x in 0..n {
            out[y * kind.size() + x] = buf.data[(off + y) * width + (off + x)];
        }
    }
    buf
}

/// Expand a coefficient vector into the 4×7 causal-support table
/// (`[3 + j][3 + i]` for `j` in -3..=0, `i` in -3..=3, upper-left of the
/// current sample), plus the cross-component coefficient (0 when absent).
fn causal_support(coeffs: &[i16]) -> ([[i16; 7]; 4], i16) {
    let mut coef = [[0i16; 7]; 4];

    if coeffs.len() == 6 {
        // SEI AR model: five support positions with pairwise-shared values.
        coef[3][2] = coeffs[1]; // left
        coef[2][3] = coeffs[1]; // top
        coef[2][2] = coeffs[3]; // top-left
        coef[2][4] = coeffs[3]; // top-right
        coef[3][1] = coeffs[5]; // left-left
        coef[1][3] = coeffs[5]; // top-top
        return (coef, 0);
    }

    let (lag, cx) = match coeffs.len() {
        0 => (0, 0),
        1 => (0, coeffs[0]),
        4 => (1, 0),
        5 => (1, coeffs[4]),
        12 => (2, 0),
        13 => (2, coeffs[12]),
        24 => (3, 0),
        25 => (3, coeffs[24]),
        n => unreachable!("unsupported AR coefficient count {n}"),
    };

    let mut k = 0;
    for j in -lag..=0i32 {
        for i in -lag..=lag {
            if i >= 0 && j >= 0 {
                break;
            }
            coef[(3 + j) as usize][(3 + i) as usize] = coeffs[k];
            k += 1;
        }
    }
    (coef, cx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> Box<[i8; TILE * TILE]> {
        vec![0i8; TILE * TILE].into_boxed_slice().try_into().unwrap()
    }

    #[test]
    fn ff_luma_known_answer() {
        let mut out = tile();
        ff_pattern(&mut out, TileKind::Luma, 7, 7);
        assert_eq!(&out[..8], &[-1, 4, 19, 39, 42, 18, -21, -46]);
        assert_eq!(&out[64..72], &[-13, -3, 12, 25, 30, 19, -3, -20]);
    }

    #[test]
    fn ff_luma_dc_is_nulled() {
        // Zeroed DC coefficient: the mean times 64 must round to 0.
        let mut out = tile();
        ff_pattern(&mut out, TileKind::Luma, 7, 7);
        let sum: i32 = out.iter().map(|&v| i32::from(v)).sum();
        assert!((sum.abs() + 31) / 64 <= 1, "sum = {sum}");
    }

    #[test]
    fn ff_chroma_known_answer() {
        let mut out = tile();
        ff_pattern(&mut out, TileKind::Chroma, 7, 7);
        assert_eq!(&out[..8], &[46, 31, -4, -50, -75, -63, -37, -19]);
    }

    #[test]
    fn ff_cutoffs_shape_the_spectrum() {
        let mut narrow = tile();
        let mut wide = tile();
        ff_pattern(&mut narrow, TileKind::Luma, 2, 14);
        ff_pattern(&mut wide, TileKind::Luma, 14, 2);
        assert_eq!(&narrow[..8], &[-9, -4, 4, 14, 21, 23, 18, 8]);
        assert_ne!(&narrow[..], &wide[..]);
    }

    #[test]
    fn ff_is_reseed_invariant() {
        let mut a = tile();
        let mut b = tile();
        ff_pattern(&mut a, TileKind::Luma, 9, 5);
        ff_pattern(&mut b, TileKind::Luma, 9, 5);
        assert_eq!(&a[..], &b[..]);
    }

    const AR_Y: [i16; 12] = [4, -3, 2, 8, -1, 5, -2, 7, 1, -6, 3, 9];
    const AR_CB: [i16; 13] = [2, -1, 3, 1, -2, 4, 0, 5, -3, 2, 1, -4, 64];

    #[test]
    fn ar_luma_known_answer() {
        let mut out = tile();
        let params = ArParams {
            coeffs: &AR_Y,
            scale: 7,
            noise_shift: 1,
        };
        ar_pattern(&mut out, TileKind::Luma, &params, None);
        assert_eq!(&out[..8], &[-5, -4, 22, 68, -12, -29, -25, 10]);
    }

    #[test]
    fn ar_is_deterministic() {
        let params = ArParams {
            coeffs: &AR_Y,
            scale: 7,
            noise_shift: 1,
        };
        let mut a = tile();
        let mut b = tile();
        ar_pattern(&mut a, TileKind::Luma, &params, None);
        ar_pattern(&mut b, TileKind::Luma, &params, None);
        assert_eq!(&a[..], &b[..]);
    }

    #[test]
    fn ar_cross_component_term_is_applied() {
        let mut luma = tile();
        let lbuf = ar_pattern(
            &mut luma,
            TileKind::Luma,
            &ArParams {
                coeffs: &AR_Y,
                scale: 7,
                noise_shift: 1,
            },
            None,
        );

        let mut with_cx = tile();
        ar_pattern(
            &mut with_cx,
            TileKind::Chroma,
            &ArParams {
                coeffs: &AR_CB,
                scale: 7,
                noise_shift: 1,
            },
            Some(&lbuf),
        );
        assert_eq!(&with_cx[..8], &[-18, 49, 17, -8, 12, -37, -44, 11]);

        let mut without = tile();
        ar_pattern(
            &mut without,
            TileKind::Chroma,
            &ArParams {
                coeffs: &AR_CB[..12],
                scale: 7,
                noise_shift: 1,
            },
            Some(&lbuf),
        );
        assert_eq!(&without[..8], &[-12, 38, 19, 2, 9, -32, -43, 10]);
    }

    #[test]
    fn ar_sei_layout_known_answer() {
        let mut out = tile();
        let params = ArParams {
            coeffs: &[0, 20, 0, -10, 0, 5],
            scale: 5,
            noise_shift: 1,
        };
        ar_pattern(&mut out, TileKind::Luma, &params, None);
        assert_eq!(&out[..8], &[59, 46, 66, 108, 57, 32, 26, 12]);
    }

    #[test]
    fn ar_lag_zero_is_pure_noise() {
        let mut out = tile();
        let params = ArParams {
            coeffs: &[],
            scale: 7,
            noise_shift: 1,
        };
        ar_pattern(&mut out, TileKind::Luma, &params, None);
        // round(Gaussian, 1) of the walk starting at the interior crop
        assert!(out[..64].iter().any(|&v| v != 0));
    }

    #[test]
    fn patterns_stay_in_signed_range() {
        let mut out = tile();
        for fh in [2u8, 8, 14] {
            for fv in [2u8, 8, 14] {
                ff_pattern(&mut out, TileKind::Luma, fh, fv);
                assert!(out.iter().all(|&v| (-127..=127).contains(&i32::from(v))));
                ff_pattern(&mut out, TileKind::Chroma, fh, fv);
                assert!(out.iter().all(|&v| (-127..=127).contains(&i32::from(v))));
            }
        }
        ar_pattern(
            &mut out,
            TileKind::Luma,
            &ArParams {
                coeffs: &AR_Y,
                scale: 6,
                noise_shift: 1,
            },
            None,
        );
        assert!(out.iter().all(|&v| (-127..=127).contains(&i32::from(v))));
    }

    #[test]
    fn chroma_tile_is_cropped_left_aligned() {
        let mut out = tile();
        ar_pattern(
            &mut out,
            TileKind::Chroma,
            &ArParams {
                coeffs: &AR_CB[..12],
                scale: 7,
                noise_shift: 1,
            },
            None,
        );
        // packed 32x32: nothing written past the tile area
        assert!(out[32 * 32..].iter().all(|&v| v == 0));
    }
}
