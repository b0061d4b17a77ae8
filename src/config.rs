//! Grain configuration records
//!
//! Plain-data descriptions of the two standardized grain models, as handed
//! over by the (external) SEI / T.35 metadata parsers. Records arrive fully
//! populated — default-value expansion for short wire messages is the
//! parser's job — and are validated up-front by the mapping stage.

use arrayvec::ArrayVec;

use crate::error::{Error, Result};

/// Most intensity intervals a component may carry.
pub const MAX_INTENSITY_INTERVALS: usize = 256;
/// Model values per intensity interval.
pub const MAX_MODEL_VALUES: usize = 6;
/// Most luma scaling points in an AFGS1 record.
pub const MAX_Y_POINTS: usize = 14;
/// Most chroma scaling points in an AFGS1 record.
pub const MAX_UV_POINTS: usize = 10;
/// Most luma AR coefficients (lag 3).
pub const MAX_Y_COEFFS: usize = 24;
/// Most chroma AR coefficients (lag 3 plus the cross-component term).
pub const MAX_UV_COEFFS: usize = 25;

/// One intensity interval of a Film Grain Characteristics SEI component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntensityInterval {
    /// Inclusive lower bound of the 8-bit intensity range
    pub lower_bound: u8,
    /// Inclusive upper bound of the 8-bit intensity range
    pub upper_bound: u8,
    /// Model values: scale, then frequency cutoffs (model id 0) or AR
    /// coefficients (model id 1)
    pub model_values: [i16; MAX_MODEL_VALUES],
}

/// Per-component half of a [`SeiConfig`].
#[derive(Debug, Clone, Default)]
pub struct SeiComponent {
    /// Whether a grain model is signalled for this component
    pub present: bool,
    /// Intensity intervals, in signalling order
    pub intervals: ArrayVec<IntensityInterval, MAX_INTENSITY_INTERVALS>,
}

/// Film Grain Characteristics SEI configuration (ITU-T/MPEG FGS)
#[derive(Debug, Clone, Default)]
pub struct SeiConfig {
    /// 0 = frequency filtering, 1 = auto-regressive
    pub model_id: u8,
    /// Log2 of the grain scale factor (drives the output scale shift)
    pub log2_scale_factor: u8,
    /// Y, Cb, Cr component models
    pub components: [SeiComponent; 3],
}

impl SeiConfig {
    /// Validate against the configured bit depth and chroma subsampling.
    pub(crate) fn validate(&self, depth: u8, csubx: u8, csuby: u8) -> Result<()> {
        if self.model_id > 1 {
            return Err(Error::Range {
                name: "model_id",
                value: i32::from(self.model_id),
                min: 0,
                max: 1,
            });
        }
        let shift = i32::from(self.log2_scale_factor) - i32::from(self.model_id);
        if !(2..=7).contains(&shift) {
            return Err(Error::Range {
                name: "log2_scale_factor",
                value: i32::from(self.log2_scale_factor),
                min: 2 + i32::from(self.model_id),
                max: 7 + i32::from(self.model_id),
            });
        }

        let scale_max = (1i32 << depth) - 1;
        let coef_half = 1i32 << (depth - 1);
        for comp in &self.components {
            if !comp.present {
                continue;
            }
            for interval in &comp.intervals {
                if interval.upper_bound < interval.lower_bound {
                    return Err(Error::Ordering {
                        name: "intensity_interval_upper_bound",
                    });
                }
                let scale = i32::from(interval.model_values[0]);
                if !(0..=scale_max).contains(&scale) {
                    return Err(Error::Range {
                        name: "comp_model_value[0]",
                        value: scale,
                        min: 0,
                        max: scale_max,
                    });
                }
                if self.model_id == 0 {
                    for (name, idx) in [("horizontal_cutoff", 1), ("vertical_cutoff", 2)] {
                        let cutoff = i32::from(interval.model_values[idx]);
                        if !(2..=14).contains(&cutoff) {
                            return Err(Error::Range {
                                name,
                                value: cutoff,
                                min: 2,
                                max: 14,
                            });
                        }
                    }
                } else {
                    for idx in [1, 3, 5] {
                        let coef = i32::from(interval.model_values[idx]);
                        if !(-coef_half..coef_half).contains(&coef) {
                            return Err(Error::Range {
                                name: "comp_model_value (AR coefficient)",
                                value: coef,
                                min: -coef_half,
                                max: coef_half - 1,
                            });
                        }
                    }
                }
            }
        }

        let chroma_present = self.components[1].present || self.components[2].present;
        if chroma_present && (csubx != 2 || csuby != 2) {
            return Err(Error::Unsupported(
                "color grain requires 4:2:0 chroma subsampling",
            ));
        }
        if chroma_present && self.model_id == 1 {
            return Err(Error::Unsupported(
                "color grain in auto-regressive SEI mode",
            ));
        }
        Ok(())
    }
}

/// AFGS1 configuration (AOM film grain parameters, ITU-T T.35 metadata)
///
/// Field shapes follow the AV1 film grain payload: piecewise-linear scaling
/// points per plane, an auto-regressive coefficient set per plane, and the
/// chroma vectors carrying one extra cross-component coefficient.
#[derive(Debug, Clone, Default)]
pub struct Afgs1Config {
    /// 16-bit seed, widened to 32 bits by the mapper
    pub grain_seed: u16,
    /// Luma scaling points as `[intensity, scaling]` pairs
    pub scaling_points_y: ArrayVec<[u8; 2], MAX_Y_POINTS>,
    /// Cb scaling points
    pub scaling_points_cb: ArrayVec<[u8; 2], MAX_UV_POINTS>,
    /// Cr scaling points
    pub scaling_points_cr: ArrayVec<[u8; 2], MAX_UV_POINTS>,
    /// Reuse the luma scaling function for both chroma planes
    pub chroma_scaling_from_luma: bool,
    /// Grain strength quantizer, 8..=11
    pub grain_scaling: u8,
    /// AR lag, 0..=3; the coefficient count is `2 * lag * (lag + 1)`
    pub ar_coeff_lag: u8,
    /// Luma AR coefficients (signed 8-bit values in 16-bit containers)
    pub ar_coeffs_y: ArrayVec<i16, MAX_Y_COEFFS>,
    /// Cb AR coefficients; the extra last element is the cross-component
    /// coefficient
    pub ar_coeffs_cb: ArrayVec<i16, MAX_UV_COEFFS>,
    /// Cr AR coefficients, shaped like `ar_coeffs_cb`
    pub ar_coeffs_cr: ArrayVec<i16, MAX_UV_COEFFS>,
    /// AR coefficient fixed-point shift, 6..=9
    pub ar_coeff_shift: u8,
    /// Extra attenuation of the Gaussian excitation, 0..=3
    pub grain_scale_shift: u8,
    /// Cb grain multiplier (accepted, not applied — see DESIGN.md)
    pub cb_mult: u8,
    /// Cb luma-derived multiplier (accepted, not applied)
    pub cb_luma_mult: u8,
    /// Cb grain offset (accepted, not applied)
    pub cb_offset: u16,
    /// Cr grain multiplier (accepted, not applied)
    pub cr_mult: u8,
    /// Cr luma-derived multiplier (accepted, not applied)
    pub cr_luma_mult: u8,
    /// Cr grain offset (accepted, not applied)
    pub cr_offset: u16,
    /// Block overlap flag (accepted; the compositor always overlaps)
    pub overlap_flag: bool,
    /// Clip output to the TV legal range
    pub clip_to_restricted_range: bool,
}

impl Afgs1Config {
    /// Number of causal AR coefficients implied by the lag.
    pub fn num_ar_coeffs(&self) -> usize {
        2 * usize::from(self.ar_coeff_lag) * (usize::from(self.ar_coeff_lag) + 1)
    }

    /// Validate against the configured chroma subsampling.
    pub(crate) fn validate(&self, csubx: u8, csuby: u8) -> Result<()> {
        if !(8..=11).contains(&self.grain_scaling) {
            return Err(Error::Range {
                name: "grain_scaling",
                value: i32::from(self.grain_scaling),
                min: 8,
                max: 11,
            });
        }
        if self.ar_coeff_lag > 3 {
            return Err(Error::Range {
                name: "ar_coeff_lag",
                value: i32::from(self.ar_coeff_lag),
                min: 0,
                max: 3,
            });
        }
        if !(6..=9).contains(&self.ar_coeff_shift) {
            return Err(Error::Range {
                name: "ar_coeff_shift",
                value: i32::from(self.ar_coeff_shift),
                min: 6,
                max: 9,
            });
        }
        if self.grain_scale_shift > 3 {
            return Err(Error::Range {
                name: "grain_scale_shift",
                value: i32::from(self.grain_scale_shift),
                min: 0,
                max: 3,
            });
        }

        for (name, points) in [
            ("point_y_values", &self.scaling_points_y[..]),
            ("point_cb_values", &self.scaling_points_cb[..]),
            ("point_cr_values", &self.scaling_points_cr[..]),
        ] {
            if points.windows(2).any(|w| w[1][0] <= w[0][0]) {
                return Err(Error::Ordering { name });
            }
        }

        let ncoef = self.num_ar_coeffs();
        if self.ar_coeffs_y.len() != ncoef {
            return Err(Error::Shape {
                name: "ar_coeffs_y",
                len: self.ar_coeffs_y.len(),
                expected: ncoef,
            });
        }
        for (name, coeffs) in [
            ("ar_coeffs_cb", &self.ar_coeffs_cb),
            ("ar_coeffs_cr", &self.ar_coeffs_cr),
        ] {
            if coeffs.len() != ncoef + 1 {
                return Err(Error::Shape {
                    name,
                    len: coeffs.len(),
                    expected: ncoef + 1,
                });
            }
        }
        for (name, coeffs) in [
            ("ar_coeffs_y", &self.ar_coeffs_y[..]),
            ("ar_coeffs_cb", &self.ar_coeffs_cb[..]),
            ("ar_coeffs_cr", &self.ar_coeffs_cr[..]),
        ] {
            if let Some(&bad) = coeffs.iter().find(|c| !(-128..=127).contains(*c)) {
                return Err(Error::Range {
                    name,
                    value: i32::from(bad),
                    min: -128,
                    max: 127,
                });
            }
        }

        let chroma_grain = !self.scaling_points_cb.is_empty()
            || !self.scaling_points_cr.is_empty()
            || self.chroma_scaling_from_luma;
        if chroma_grain && (csubx != 2 || csuby != 2) {
            return Err(Error::Unsupported(
                "color grain requires 4:2:0 chroma subsampling",
            ));
        }
        Ok(())
    }
}
