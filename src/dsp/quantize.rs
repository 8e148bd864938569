//! Magnitude to palette-index quantization.

use crate::util::audio::magnitude_to_db;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GAIN_DB: f32 = 20.0;
pub const DEFAULT_RANGE_DB: f32 = 80.0;
const MIN_RANGE_DB: f32 = 1.0e-3;

/// Maps the dB window `[-gain-range, -gain]` linearly onto `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityMap {
    pub gain_db: f32,
    pub range_db: f32,
}

impl Default for IntensityMap {
    fn default() -> Self {
        Self {
            gain_db: DEFAULT_GAIN_DB,
            range_db: DEFAULT_RANGE_DB,
        }
    }
}

impl IntensityMap {
    pub fn new(gain_db: f32, range_db: f32) -> Self {
        Self {
            gain_db: if gain_db.is_finite() { gain_db } else { DEFAULT_GAIN_DB },
            range_db: if range_db.is_finite() {
                range_db.max(MIN_RANGE_DB)
            } else {
                DEFAULT_RANGE_DB
            },
        }
    }

    /// Upper edge of the window; anything louder saturates at 255.
    #[inline]
    pub fn ceiling_db(&self) -> f32 {
        -self.gain_db
    }

    /// Lower edge of the window; anything quieter maps to 0.
    #[inline]
    pub fn floor_db(&self) -> f32 {
        -self.gain_db - self.range_db
    }

    #[inline]
    pub fn quantize_db(&self, db: f32) -> u8 {
        if db < self.floor_db() {
            0
        } else if db > self.ceiling_db() {
            255
        } else {
            ((db - self.floor_db()) * (255.0 / self.range_db)).round() as u8
        }
    }

    #[inline]
    pub fn quantize(&self, magnitude: f32) -> u8 {
        self.quantize_db(magnitude_to_db(magnitude))
    }

    pub fn quantize_into(&self, magnitudes: &[f32], out: &mut [u8]) {
        for (slot, &m) in out.iter_mut().zip(magnitudes) {
            *slot = self.quantize(m);
        }
    }
}

/// [`IntensityMap`] with its constants folded for the innermost loop.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    floor_db: f32,
    ceiling_db: f32,
    scale: f32,
}

impl From<IntensityMap> for Quantizer {
    fn from(map: IntensityMap) -> Self {
        Self {
            floor_db: map.floor_db(),
            ceiling_db: map.ceiling_db(),
            scale: 255.0 / map.range_db,
        }
    }
}

impl Quantizer {
    #[inline(always)]
    pub fn quantize(&self, magnitude: f32) -> u8 {
        let db = magnitude_to_db(magnitude);
        if db < self.floor_db {
            0
        } else if db > self.ceiling_db {
            255
        } else {
            ((db - self.floor_db) * self.scale).round() as u8
        }
    }

    pub fn quantize_into(&self, magnitudes: &[f32], out: &mut [u8]) {
        for (slot, &m) in out.iter_mut().zip(magnitudes) {
            *slot = self.quantize(m);
        }
    }
}
