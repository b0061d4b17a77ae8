//! Stripe compositor: grains up to 16 lines of the full frame width in one
//! call.
//!
//! The stripe variant trades the streaming path's per-line pipeline for
//! whole plane buffers: per-block offsets are cached once, a grain/scale
//! plane is filled for the stripe (plus two carry lines), vertical overlap
//! is merged against the previous stripe's carry, every 16-pixel seam is
//! deblocked, and the result is scaled and added in bulk. Output is
//! bit-identical to the streaming path on 16-line stripe boundaries as
//! long as overlap blending stays inside the signed grain range (this path
//! stores grain in 8 bits and clips where the streaming pipeline holds 9
//! bits).

use crate::pattern::round_shift;
use crate::prng;
use crate::synthesizer::{BLOCK, MAX_WIDTH, Sample, Synthesizer};

/// Carry lines kept between stripes for vertical overlap.
const CARRY_LINES: usize = 2;
/// Lines filled per stripe: one block row plus the overlap carry.
const FILL_LINES: usize = BLOCK + CARRY_LINES;

/// Working planes of the stripe compositor, allocated once at construction
/// (no per-frame allocation).
#[derive(Clone)]
pub(crate) struct StripeBufs {
    /// Grain plane of the component being processed
    grain: [[i8; MAX_WIDTH]; FILL_LINES],
    /// Scale plane (the two carry lines are filled but never read)
    scale: [[u8; MAX_WIDTH]; FILL_LINES],
    /// Per-component carry lines from the previous stripe
    over: [[[i8; MAX_WIDTH]; CARRY_LINES]; 3],
    /// Cached per-block-column tile offsets and signs
    offset_x: [[u8; MAX_WIDTH / BLOCK]; 3],
    offset_y: [[u8; MAX_WIDTH / BLOCK]; 3],
    sign: [[i8; MAX_WIDTH / BLOCK]; 3],
}

impl StripeBufs {
    pub(crate) fn new() -> Box<StripeBufs> {
        Box::new(StripeBufs {
            grain: [[0; MAX_WIDTH]; FILL_LINES],
            scale: [[0; MAX_WIDTH]; FILL_LINES],
            over: [[[0; MAX_WIDTH]; CARRY_LINES]; 3],
            offset_x: [[0; MAX_WIDTH / BLOCK]; 3],
            offset_y: [[0; MAX_WIDTH / BLOCK]; 3],
            sign: [[0; MAX_WIDTH / BLOCK]; 3],
        })
    }
}

impl Synthesizer {
    /// Composite grain onto one stripe of up to 16 lines, full width.
    ///
    /// `y` is the stripe's first luma row and must be 16-aligned; `height`
    /// is the full frame height, `stride` the luma row stride (16-aligned;
    /// chroma rows are assumed to be laid out at `stride / subx`). Planes
    /// are passed whole; the stripe location is derived from `y`. Call
    /// stripes top to bottom — each call leaves the carry lines the next
    /// one merges against.
    pub fn add_grain_stripe<S: Sample>(
        &mut self,
        y_plane: &mut [S],
        u_plane: &mut [S],
        v_plane: &mut [S],
        y: usize,
        width: usize,
        height: usize,
        stride: usize,
    ) {
        assert_eq!(S::BIT_SHIFT, self.bs, "sample type does not match configured depth");
        assert!((128..=MAX_WIDTH).contains(&width), "width out of 128..=4096");
        assert!(width <= stride && stride <= MAX_WIDTH);
        assert_eq!(stride & 15, 0, "stride must be 16-aligned");
        assert_eq!(y & 15, 0, "stripe start must be 16-aligned");
        assert!(y < height);
        assert!(self.bs == 0 || self.bs == 2);
        assert!((8..=13).contains(&(self.scale_shift + self.bs)));

        // Cache offsets for every block column; one PRNG step per column,
        // all three components reading the same state (as the streaming
        // path does before its per-block crank).
        let cols = width.div_ceil(BLOCK);
        for b in 0..cols {
            for c in 0..3 {
                let (sign, ox, oy) = self.derive_offset(self.rnd, c);
                self.stripe.sign[c][b] = sign as i8;
                self.stripe.offset_x[c][b] = ox as u8;
                self.stripe.offset_y[c][b] = oy as u8;
            }
            self.rnd = prng::next(self.rnd);
        }

        let overlap = y > 0;
        let remaining = height - y;
        let cstride = stride / usize::from(self.csubx);

        self.stripe_plane(y_plane, 0, y, width, remaining, stride, overlap);
        self.stripe_plane(u_plane, 1, y, width, remaining, cstride, overlap);
        self.stripe_plane(v_plane, 2, y, width, remaining, cstride, overlap);
    }

    /// Fill, blend, deblock and merge one component of a stripe.
    fn stripe_plane<S: Sample>(
        &mut self,
        plane: &mut [S],
        c: usize,
        y: usize,
        width: usize,
        remaining: usize,
        stride: usize,
        overlap: bool,
    ) {
        let subx = if c == 0 { 1 } else { usize::from(self.csubx) };
        let suby = if c == 0 { 1 } else { usize::from(self.csuby) };
        let (i_min, i_max) = if c == 0 {
            (self.y_min, self.y_max)
        } else {
            (self.c_min, self.c_max)
        };
        let lo = i32::from(i_min) << self.bs;
        let hi = i32::from(i_max) << self.bs;
        let bank = usize::from(c != 0);

        let cols = width.div_ceil(BLOCK);
        let bw = BLOCK / subx;
        // Row counts at component resolution: a luma row `yy` has a
        // component row when `yy % suby == 0` (`y` is 16-aligned, so the
        // stripe-local and absolute parities agree).
        let fill_rows = remaining.min(FILL_LINES).div_ceil(suby);
        let out_rows = remaining.min(BLOCK).div_ceil(suby);
        let wc = cols * bw;
        let top = y / suby;
        assert!(plane.len() >= (top + fill_rows - 1) * stride + wc, "plane too short");

        // Grain & scale fill, carry lines included. Reads may run past the
        // right image border into the padded block, like the streaming
        // path's final flush.
        for r in 0..fill_rows {
            let row = &plane[(top + r) * stride..];
            for b in 0..cols {
                let sign = i32::from(self.stripe.sign[c][b]);
                let ox = usize::from(self.stripe.offset_x[c][b]);
                let oy = usize::from(self.stripe.offset_y[c][b]);
                for i in 0..bw {
                    let col = b * bw + i;
                    let intensity = row[col].intensity(self.bs);
                    let pi = usize::from(self.plut[c][usize::from(intensity)] >> 4);
                    let p = i32::from(self.patterns[bank][pi][oy + r][ox + i]) * sign;
                    self.stripe.grain[r][col] = p as i8;
                    self.stripe.scale[r][col] = self.slut[c][usize::from(intensity)];
                }
            }
        }

        // Vertical overlap: blend the first line(s) of this stripe with
        // the previous stripe's carry, clipped back to the 8-bit grain
        // range.
        if overlap {
            for r in 0..CARRY_LINES.min(fill_rows) {
                let j = r * suby;
                if j >= CARRY_LINES {
                    break;
                }
                let (oc1, oc2) = if j == 0 {
                    if suby > 1 { (20, 20) } else { (12, 24) }
                } else {
                    (24, 12)
                };
                for col in 0..wc {
                    let g = round_shift(
                        oc1 * i32::from(self.stripe.grain[r][col])
                            + oc2 * i32::from(self.stripe.over[c][r][col]),
                        5,
                    );
                    self.stripe.grain[r][col] = g.clamp(-127, 127) as i8;
                }
            }
        }

        // Horizontal deblock across every interior block seam.
        for r in 0..out_rows {
            let mut x = BLOCK;
            while x < width {
                let cx = x / subx;
                let l1 = i32::from(self.stripe.grain[r][cx - 2]);
                let l0 = i32::from(self.stripe.grain[r][cx - 1]);
                let r0 = i32::from(self.stripe.grain[r][cx]);
                let r1 = i32::from(self.stripe.grain[r][cx + 1]);
                let left = round_shift(l1 + 3 * l0 + r0, 2);
                let right = round_shift(l0 + 3 * r0 + r1, 2);
                self.stripe.grain[r][cx - 1] = left.clamp(-127, 127) as i8;
                self.stripe.grain[r][cx] = right.clamp(-127, 127) as i8;
                x += BLOCK;
            }
        }

        // Scale & merge into the pixel rows.
        for r in 0..out_rows {
            let row = &mut plane[(top + r) * stride..];
            for col in 0..width.div_ceil(subx) {
                let g = round_shift(
                    i32::from(self.stripe.scale[r][col]) * i32::from(self.stripe.grain[r][col]),
                    u32::from(self.scale_shift),
                );
                row[col] = row[col].add_clipped(g, lo, hi);
            }
        }

        // Keep the carry lines for the next stripe.
        if remaining > BLOCK {
            for k in 0..CARRY_LINES {
                if (BLOCK + k) % suby != 0 {
                    continue;
                }
                let src = (BLOCK + k) / suby;
                if src < fill_rows {
                    self.stripe.over[c][k / suby] = self.stripe.grain[src];
                }
            }
        }
    }
}
