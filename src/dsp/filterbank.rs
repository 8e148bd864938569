//! Remaps linear FFT bins onto a warped frequency axis.

use super::scale::FrequencyScale;
use crate::util::audio::bin_width;
use std::collections::HashMap;
use std::sync::Arc;

/// Two-tap interpolation for one output band: `weights.0` on bin `lower`,
/// `weights.1` on bin `lower + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTap {
    pub lower: usize,
    pub weights: (f32, f32),
}

/// `rows` bands by `columns = fft_size/2 + 1` bins, stored densely together
/// with the equivalent two-tap form.
#[derive(Debug, Clone)]
pub struct FilterBank {
    scale: FrequencyScale,
    rows: usize,
    columns: usize,
    weights: Vec<f32>,
    taps: Vec<BandTap>,
}

impl FilterBank {
    pub fn build(scale: FrequencyScale, num_filters: usize, sample_rate: f32, fft_size: usize) -> Self {
        let columns = fft_size / 2 + 1;
        let mut weights = vec![0.0f32; num_filters * columns];
        let mut taps = Vec::with_capacity(num_filters);

        let bin_hz = bin_width(sample_rate, fft_size) as f64;
        let lo = scale.hz_to_scale(0.0);
        let hi = scale.hz_to_scale(sample_rate as f64 / 2.0);

        for (i, row) in weights.chunks_exact_mut(columns.max(1)).enumerate() {
            let t = i as f64 / num_filters as f64;
            let hz = scale.scale_to_hz(lo + t * (hi - lo)).max(0.0);
            let position = if bin_hz > 0.0 { hz / bin_hz } else { 0.0 };
            let mut lower = position.floor() as usize;
            let mut frac = (position - lower as f64) as f32;
            if lower + 1 >= columns {
                lower = columns.saturating_sub(2);
                frac = 1.0;
            }
            let tap = BandTap {
                lower,
                weights: (1.0 - frac, frac),
            };
            row[lower] = tap.weights.0;
            if let Some(upper) = row.get_mut(lower + 1) {
                *upper = tap.weights.1;
            }
            taps.push(tap);
        }

        Self {
            scale,
            rows: num_filters,
            columns,
            weights,
            taps,
        }
    }

    pub fn scale(&self) -> FrequencyScale {
        self.scale
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.weights[index * self.columns..(index + 1) * self.columns]
    }

    pub fn taps(&self) -> &[BandTap] {
        &self.taps
    }

    /// Dense matrix-vector product. `spectrum` may be shorter than the bank
    /// is wide; missing bins count as zero.
    pub fn apply(&self, spectrum: &[f32], out: &mut [f32]) {
        let n = spectrum.len().min(self.columns);
        for (band, slot) in out.iter_mut().take(self.rows).enumerate() {
            let row = &self.row(band)[..n];
            *slot = row.iter().zip(&spectrum[..n]).map(|(w, v)| w * v).sum();
        }
    }

    /// Same result as [`apply`](Self::apply) using only the two taps per band.
    pub fn apply_sparse(&self, spectrum: &[f32], out: &mut [f32]) {
        for (tap, slot) in self.taps.iter().zip(out.iter_mut()) {
            let a = spectrum.get(tap.lower).copied().unwrap_or(0.0);
            let b = spectrum.get(tap.lower + 1).copied().unwrap_or(0.0);
            *slot = tap.weights.0 * a + tap.weights.1 * b;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BankKey {
    scale: FrequencyScale,
    num_filters: usize,
    sample_rate_bits: u32,
    fft_size: usize,
}

/// Banks keyed by `(scale, num_filters, sample_rate, fft_size)`. Unbounded;
/// the set of distinct keys in a session is small.
#[derive(Debug, Default)]
pub struct FilterBankCache {
    entries: HashMap<BankKey, Arc<FilterBank>>,
}

impl FilterBankCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        scale: FrequencyScale,
        num_filters: usize,
        sample_rate: f32,
        fft_size: usize,
    ) -> Arc<FilterBank> {
        let key = BankKey {
            scale,
            num_filters,
            sample_rate_bits: sample_rate.to_bits(),
            fft_size,
        };
        Arc::clone(
            self.entries
                .entry(key)
                .or_insert_with(|| Arc::new(FilterBank::build(scale, num_filters, sample_rate, fft_size))),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
