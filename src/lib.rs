//! # zengrain
//!
//! Pure Rust film grain synthesis and compositing for the two standardized
//! grain models:
//!
//! - **FGS SEI** (ITU-T/MPEG Film Grain Characteristics SEI): frequency
//!   filtering (sparse-spectrum inverse DCT) or auto-regressive synthesis,
//!   driven by per-intensity-interval model values;
//! - **AFGS1** (AOM ITU-T T.35 metadata): auto-regressive synthesis with a
//!   piecewise-linear luma/chroma scaling function.
//!
//! Grain is composited onto planar YUV frames at 8 or 10 bit, 4:2:0/4:2:2/
//! 4:4:4, in 16×16 blocks with pseudo-random tile offsets and signs,
//! vertical overlap between block rows, and horizontal deblocking at block
//! seams. Output is bit-exact and fully deterministic for a given seed,
//! configuration, and input frame.
//!
//! ## Quick start
//!
//! ```no_run
//! use zengrain::{Afgs1Config, Synthesizer, YuvFrame};
//!
//! let cfg = Afgs1Config {
//!     grain_seed: 1234,
//!     grain_scaling: 8,
//!     ar_coeff_lag: 0,
//!     ..Afgs1Config::default()
//! };
//! // ... populate scaling points and AR coefficients ...
//!
//! let mut synth = Synthesizer::new();
//! synth.set_depth(8);
//! synth.set_chroma_subsampling(2, 2);
//! synth.init_afgs1(&cfg).unwrap();
//!
//! let (width, height, stride) = (1920, 1080, 1920);
//! let mut y = vec![128u8; stride * height];
//! let mut u = vec![128u8; stride / 2 * height / 2];
//! let mut v = vec![128u8; stride / 2 * height / 2];
//! synth.add_grain_frame(&mut YuvFrame {
//!     y: &mut y,
//!     u: &mut u,
//!     v: &mut v,
//!     width,
//!     height,
//!     y_stride: stride,
//!     c_stride: stride / 2,
//! });
//! ```
//!
//! ## Processing modes
//!
//! Two compositing entry points produce the same grain:
//!
//! - [`Synthesizer::add_grain_line`] streams one pixel row at a time with
//!   a small pipeline (constant memory);
//! - [`Synthesizer::add_grain_stripe`] processes 16 lines at full width in
//!   one call, which is the natural unit for slice- or tile-parallel
//!   callers (each stripe worker clones the synthesizer and replays the
//!   per-stripe PRNG cadence).
//!
//! Configuration parsing (SEI payloads, T.35 wrappers, grain tables) is
//! out of scope: the mappers consume fully populated [`SeiConfig`] /
//! [`Afgs1Config`] records.

mod afgs1;
mod config;
mod error;
mod pattern;
mod prng;
mod sei;
mod stripe;
mod synthesizer;
mod tables;

pub use config::{
    Afgs1Config, IntensityInterval, MAX_INTENSITY_INTERVALS, MAX_MODEL_VALUES, MAX_UV_COEFFS,
    MAX_UV_POINTS, MAX_Y_COEFFS, MAX_Y_POINTS, SeiComponent, SeiConfig,
};
pub use error::{Error, Result};
pub use pattern::TILE;
pub use synthesizer::{MAX_PATTERNS, MAX_WIDTH, Sample, Synthesizer, YuvFrame};
