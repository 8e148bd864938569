//! Variant selection and the hot-swap controller.
//!
//! Two interchangeable pipelines render the same picture: the reference
//! variant runs the radix-2 kernel with a dense filter bank, the optimized
//! variant runs `realfft` with two-tap bands and a cached colour table. The
//! variant is picked from the overlap the render will actually use.

pub mod controller;
pub mod mount;
pub mod prerender;
pub mod variant;

pub use controller::{PipelineController, PipelineEvent, PipelineState};
pub use variant::{ActivePipeline, PreparedRender, SpectrogramPipeline, Variant};

use crate::dsp::framer::AnalysisParams;
use crate::dsp::quantize::IntensityMap;
use crate::dsp::scale::FrequencyScale;
use crate::dsp::window::WindowKind;
use crate::dsp::{OverlapPolicy, TransformConfig, auto_overlap};
use crate::error::{Result, SpectrogramError};
use crate::render::RenderRegion;
use crate::render::palette::Palette;
use crate::util::audio::nyquist;
use std::fmt;

/// Derived overlap at or below this percentage selects the optimized variant.
pub const OPTIMIZED_MAX_OVERLAP_PCT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Reference,
    Optimized,
}

impl VariantKind {
    pub fn name(self) -> &'static str {
        match self {
            VariantKind::Reference => "reference",
            VariantKind::Optimized => "optimized",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Overlap percentage a render will realize. A manual percentage goes
/// through whole samples first, so small frames can land off the nominal
/// value (32 samples at 33% is 10 samples, 31%).
pub fn derived_overlap_pct(
    fft_size: usize,
    signal_len: usize,
    display_width: usize,
    manual_percent: Option<u8>,
) -> u32 {
    if fft_size == 0 {
        return 0;
    }
    let samples = match manual_percent {
        Some(percent) => fft_size * percent as usize / 100,
        None => auto_overlap(fft_size, signal_len, display_width),
    };
    (samples as f64 / fft_size as f64 * 100.0).round() as u32
}

pub fn select_variant(derived_overlap_pct: u32) -> VariantKind {
    if derived_overlap_pct <= OPTIMIZED_MAX_OVERLAP_PCT {
        VariantKind::Optimized
    } else {
        VariantKind::Reference
    }
}

/// Validated engine configuration for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub fft_size: usize,
    pub window: WindowKind,
    pub window_alpha: Option<f32>,
    /// `None` derives the overlap from the display width.
    pub overlap_percent: Option<u8>,
    pub scale: FrequencyScale,
    pub num_filters: Option<usize>,
    pub intensity: IntensityMap,
    pub palette: Palette,
    pub frequency_min: f32,
    /// `None` is Nyquist.
    pub frequency_max: Option<f32>,
    /// Height of one channel band.
    pub height: usize,
    pub split_channels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            window: WindowKind::Hann,
            window_alpha: None,
            overlap_percent: None,
            scale: FrequencyScale::Mel,
            num_filters: None,
            intensity: IntensityMap::default(),
            palette: Palette::default(),
            frequency_min: 0.0,
            frequency_max: None,
            height: 200,
            split_channels: false,
        }
    }
}

impl RenderConfig {
    pub fn overlap_policy(&self) -> OverlapPolicy {
        match self.overlap_percent {
            Some(percent) => OverlapPolicy::from_percent(self.fft_size, percent),
            None => OverlapPolicy::Auto,
        }
    }

    pub fn transform(&self) -> TransformConfig {
        TransformConfig {
            size: self.fft_size,
            window: self.window,
            window_alpha: self.window_alpha,
            overlap: self.overlap_policy(),
        }
    }

    pub fn analysis_params(&self, display_width: usize) -> AnalysisParams {
        AnalysisParams {
            transform: self.transform(),
            scale: self.scale,
            num_filters: self.num_filters,
            intensity: self.intensity,
            split_channels: self.split_channels,
            display_width,
        }
    }

    pub fn region(&self, sample_rate: f32) -> RenderRegion {
        RenderRegion {
            scale: self.scale,
            frequency_min: self.frequency_min,
            frequency_max: self.frequency_max.unwrap_or(nyquist(sample_rate)),
            sample_rate,
            height: self.height,
        }
    }

    pub fn validate(&self, display_width: usize) -> Result<()> {
        self.transform().validate()?;
        if display_width == 0 || self.height == 0 {
            return Err(SpectrogramError::InvalidDimensions {
                width: display_width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn derived_overlap_pct(&self, signal_len: usize, display_width: usize) -> u32 {
        derived_overlap_pct(self.fft_size, signal_len, display_width, self.overlap_percent)
    }

    /// Overlap for a background first paint of the same signal and width.
    pub fn preview_overlap_percent(&self, signal_len: usize, display_width: usize) -> u8 {
        match self.overlap_percent {
            Some(percent) => percent,
            None => self.derived_overlap_pct(signal_len, display_width).min(99) as u8,
        }
    }
}
