//! Frequency axis ticks.

use crate::dsp::scale::FrequencyScale;

const TICKS_PER_256_PX: f64 = 5.0;
const LABEL_MARGIN_PX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTick {
    pub hz: f64,
    pub label: String,
    /// Vertical position within its channel band, top is 0.
    pub y: f64,
}

/// Number of label steps across a band, `height / 256 * 5`. Fractional;
/// the last whole step below it is the highest label drawn.
pub fn tick_span(height: usize) -> f64 {
    height as f64 / 256.0 * TICKS_PER_256_PX
}

/// Labels drawn per band: steps `0..=floor(span)`.
pub fn tick_count(height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    tick_span(height).floor() as usize + 1
}

/// Frequency at step `index` of `span`, spaced evenly in scale space.
pub fn label_frequency(scale: FrequencyScale, min_hz: f64, max_hz: f64, index: usize, span: f64) -> f64 {
    let t = if span > 0.0 { index as f64 / span } else { 0.0 };
    scale.interpolate(min_hz, max_hz, t)
}

pub fn format_frequency(hz: f64) -> String {
    if hz >= 1_000.0 {
        format!("{:.1} kHz", hz / 1_000.0)
    } else {
        format!("{} Hz", hz.round() as i64)
    }
}

pub fn frequency_ticks(scale: FrequencyScale, min_hz: f64, max_hz: f64, height: usize) -> Vec<FrequencyTick> {
    let span = tick_span(height);
    let band = height as f64;
    let margin = LABEL_MARGIN_PX.min(band * 0.5);
    (0..tick_count(height))
        .map(|index| {
            let hz = label_frequency(scale, min_hz, max_hz, index, span);
            let y = if span > 0.0 { band * (1.0 - index as f64 / span) } else { band };
            FrequencyTick {
                hz,
                label: format_frequency(hz),
                y: y.clamp(margin, band - margin),
            }
        })
        .collect()
}
