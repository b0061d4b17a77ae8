//! Film Grain Characteristics SEI mapping.
//!
//! Turns a validated [`SeiConfig`] into synthesizer wire state: intensity
//! intervals are classified into up to eight distinct patterns per plane
//! (identified by their packed shaping values), the patterns are
//! materialized through the frequency-filtering or auto-regressive
//! generator, and per-component scale/pattern LUTs are filled with a
//! final hole-filling sweep so both are total over the 8-bit intensity
//! range.

use arrayvec::ArrayVec;
use log::debug;

use crate::config::SeiConfig;
use crate::error::Result;
use crate::pattern::{self, ArParams, TILE, TileKind};
use crate::synthesizer::{MAX_PATTERNS, Synthesizer};

/// Pack the pattern-shaping model values into a 32-bit pattern id.
///
/// Intervals with equal ids share a synthesized pattern: the cutoff pair
/// in frequency-filtering mode, the three AR coefficients otherwise.
fn pattern_id(model_values: &[i16; 6]) -> u32 {
    let c1 = (model_values[1] & 0xff) as u32;
    let c2 = (model_values[2] & 0xff) as u32;
    let c3 = (model_values[3] & 0xff) as u32;
    let c5 = (model_values[5] & 0xff) as u32;
    (c1 << 24) | (c3 << 16) | (c5 << 8) | c2
}

/// Recover the signed shaping values from a pattern id.
fn shaping_values(id: u32) -> [i16; 6] {
    let mut coef = [0i16; 6];
    coef[1] = i16::from((id >> 24) as u8 as i8);
    coef[3] = i16::from((id >> 16) as u8 as i8);
    coef[5] = i16::from((id >> 8) as u8 as i8);
    coef[2] = i16::from(id as u8 as i8);
    coef
}

impl Synthesizer {
    /// Configure the synthesizer from a Film Grain Characteristics SEI
    /// record.
    ///
    /// Validates the record against the configured depth and subsampling,
    /// then rebuilds the pattern banks, both LUT sets, and the output
    /// scale shift. The PRNG seed is left untouched (SEI carries none).
    pub fn init_sei(&mut self, cfg: &SeiConfig) -> Result<()> {
        cfg.validate(self.bs + 8, self.csubx, self.csuby)?;

        // Dedup list of (pattern id, first lower bound), sorted by id.
        // Luma gets its own list; Cb and Cr accumulate into a shared one,
        // since both planes index the same chroma bank.
        let mut ids: ArrayVec<(u32, u8), MAX_PATTERNS> = ArrayVec::new();

        for c in 0..3 {
            if c < 2 {
                ids.clear();
            }
            let comp = &cfg.components[c];
            if comp.present {
                for interval in &comp.intervals {
                    let id = pattern_id(&interval.model_values);
                    if ids.iter().any(|&(known, _)| known == id) {
                        continue;
                    }
                    if ids.is_full() {
                        // Beyond eight distinct patterns: dropped, no
                        // substitution.
                        debug!("sei: dropping pattern id {id:#010x} (component {c})");
                        continue;
                    }
                    let pos = ids
                        .iter()
                        .position(|&(known, _)| known > id)
                        .unwrap_or(ids.len());
                    ids.insert(pos, (id, interval.lower_bound));
                }
            }
            if c == 1 {
                continue;
            }

            // Materialize the plane's patterns in list order. Chroma only
            // reaches this in frequency-filtering mode: color grain with
            // the AR model is rejected by validation.
            let mut tile = [0i8; TILE * TILE];
            for (index, &(id, _)) in ids.iter().enumerate() {
                let coef = shaping_values(id);
                if c == 0 {
                    if cfg.model_id != 0 {
                        pattern::ar_pattern(
                            &mut tile,
                            TileKind::Luma,
                            &ArParams {
                                coeffs: &coef,
                                scale: u32::from(cfg.log2_scale_factor),
                                noise_shift: 1,
                            },
                            None,
                        );
                    } else {
                        pattern::ff_pattern(&mut tile, TileKind::Luma, coef[1] as u8, coef[2] as u8);
                    }
                    self.set_luma_pattern(index, &tile);
                } else {
                    pattern::ff_pattern(&mut tile, TileKind::Chroma, coef[1] as u8, coef[2] as u8);
                    self.set_chroma_pattern(index, &tile[..32 * 32]);
                }
            }

            // Fill the LUTs; Cb and Cr are both finalized once the shared
            // chroma list is complete.
            for cc in if c == 0 { 0..=0 } else { 1..=c } {
                let comp = &cfg.components[cc];
                let mut slut = [0u8; 256];
                let mut plut = [0u8; 256];
                if comp.present {
                    let mut holes = [0xffu8; 256];
                    for interval in &comp.intervals {
                        let id = pattern_id(&interval.model_values);
                        let found = ids.iter().position(|&(known, _)| known == id);
                        let lo = usize::from(interval.lower_bound);
                        let hi = usize::from(interval.upper_bound);
                        for entry in lo..=hi {
                            slut[entry] = interval.model_values[0] as u8;
                            if let Some(index) = found {
                                holes[entry] = (index as u8) << 4;
                            }
                        }
                    }
                    // Hole fill: repeat the last defined pattern downward
                    // (no interpolation).
                    let mut last = 0u8;
                    for entry in &mut holes {
                        if *entry == 0xff {
                            *entry = last;
                        } else {
                            last = *entry;
                        }
                    }
                    plut = holes;
                }
                self.set_scale_lut(cc, &slut);
                self.set_pattern_lut(cc, &plut);
            }
        }

        self.set_scale_shift(cfg.log2_scale_factor - u8::from(cfg.model_id != 0));
        debug!(
            "sei: model {} configured, scale shift {}",
            cfg.model_id,
            cfg.log2_scale_factor - u8::from(cfg.model_id != 0),
        );
        Ok(())
    }
}
