//! User-facing spectrogram settings and their conversion into a validated
//! [`RenderConfig`].

pub mod persistence;

use crate::dsp::fft::validate_size;
use crate::dsp::quantize::{DEFAULT_GAIN_DB, DEFAULT_RANGE_DB, IntensityMap};
use crate::dsp::scale::FrequencyScale;
use crate::dsp::window::WindowKind;
use crate::error::{Result, SpectrogramError};
use crate::pipeline::RenderConfig;
use crate::render::palette::{NamedPalette, Palette};
use crate::util::audio::nyquist;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use persistence::SettingsStore;

pub const MIN_FFT_SAMPLES: usize = 32;
pub const MAX_FFT_SAMPLES: usize = 32_768;
const MIN_OVERLAP_PERCENT: u8 = 1;
const MAX_OVERLAP_PERCENT: u8 = 99;

/// Power of two within `MIN_FFT_SAMPLES..=MAX_FFT_SAMPLES`.
pub fn validate_fft_samples(samples: usize) -> Result<()> {
    validate_size(samples)?;
    if !(MIN_FFT_SAMPLES..=MAX_FFT_SAMPLES).contains(&samples) {
        return Err(SpectrogramError::InvalidFrameSize(samples));
    }
    Ok(())
}

/// A named preset or a custom table of 256 RGBA rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorMap {
    Named(NamedPalette),
    Custom(Vec<Vec<f32>>),
}

impl Default for ColorMap {
    fn default() -> Self {
        ColorMap::Named(NamedPalette::default())
    }
}

impl ColorMap {
    pub fn palette(&self) -> Result<Palette> {
        match self {
            ColorMap::Named(name) => Ok(Palette::named(*name)),
            ColorMap::Custom(rows) => Palette::from_rows(rows),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramSettings {
    pub fft_samples: usize,
    pub window: WindowKind,
    pub window_alpha: Option<f32>,
    pub frequency_min: f32,
    /// 0 means Nyquist.
    pub frequency_max: f32,
    /// `None` derives the overlap from the display width.
    pub overlap_percent: Option<u8>,
    pub color_map: ColorMap,
    pub scale: FrequencyScale,
    pub num_filters: Option<usize>,
    pub gain_db: f32,
    pub range_db: f32,
    pub height: usize,
    pub split_channels: bool,
}

impl Default for SpectrogramSettings {
    fn default() -> Self {
        Self {
            fft_samples: 512,
            window: WindowKind::Hann,
            window_alpha: None,
            frequency_min: 0.0,
            frequency_max: 0.0,
            overlap_percent: None,
            color_map: ColorMap::default(),
            scale: FrequencyScale::Mel,
            num_filters: None,
            gain_db: DEFAULT_GAIN_DB,
            range_db: DEFAULT_RANGE_DB,
            height: 200,
            split_channels: false,
        }
    }
}

impl SpectrogramSettings {
    /// Parses `json`, reporting unknown window, scale or palette names and
    /// invalid sizes as their typed errors instead of falling back.
    pub fn from_json_strict(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        if let Some(name) = value.get("window").and_then(Value::as_str) {
            name.parse::<WindowKind>()?;
        }
        if let Some(name) = value.get("scale").and_then(Value::as_str) {
            name.parse::<FrequencyScale>()?;
        }
        if let Some(name) = value.get("color_map").and_then(Value::as_str) {
            name.parse::<NamedPalette>()?;
        }
        let mut settings: Self = serde_json::from_value(value)?;
        settings.validate()?;
        settings.sanitize();
        Ok(settings)
    }

    /// Rejects values that `sanitize` would otherwise quietly replace.
    pub fn validate(&self) -> Result<()> {
        validate_fft_samples(self.fft_samples)?;
        if let Some(percent) = self.overlap_percent
            && percent >= 100
        {
            return Err(SpectrogramError::InvalidOverlap {
                overlap: self.fft_samples * percent as usize / 100,
                size: self.fft_samples,
            });
        }
        self.color_map.palette()?;
        Ok(())
    }

    /// Clamps every field into its valid range.
    pub fn sanitize(&mut self) {
        let fft = self.fft_samples.clamp(MIN_FFT_SAMPLES, MAX_FFT_SAMPLES);
        self.fft_samples = if fft.is_power_of_two() {
            fft
        } else {
            fft.next_power_of_two().min(MAX_FFT_SAMPLES)
        };
        self.overlap_percent = self
            .overlap_percent
            .map(|pct| pct.clamp(MIN_OVERLAP_PERCENT, MAX_OVERLAP_PERCENT));
        if !self.gain_db.is_finite() {
            self.gain_db = DEFAULT_GAIN_DB;
        }
        if !self.range_db.is_finite() || self.range_db <= 0.0 {
            self.range_db = DEFAULT_RANGE_DB;
        }
        if !self.frequency_min.is_finite() || self.frequency_min < 0.0 {
            self.frequency_min = 0.0;
        }
        if !self.frequency_max.is_finite() || self.frequency_max < 0.0 {
            self.frequency_max = 0.0;
        }
        self.window_alpha = self.window_alpha.filter(|a| a.is_finite());
        self.num_filters = self.num_filters.filter(|n| *n > 0);
        self.height = self.height.max(1);
    }

    /// Resolves the palette and the frequency range for `sample_rate`.
    /// Palette problems surface here, before anything is drawn.
    pub fn to_render_config(&self, sample_rate: f32) -> Result<RenderConfig> {
        let frequency_max = if self.frequency_max > 0.0 {
            self.frequency_max
        } else {
            nyquist(sample_rate)
        };
        Ok(RenderConfig {
            fft_size: self.fft_samples,
            window: self.window,
            window_alpha: self.window_alpha,
            overlap_percent: self.overlap_percent,
            scale: self.scale,
            num_filters: self.num_filters,
            intensity: IntensityMap::new(self.gain_db, self.range_db),
            palette: self.color_map.palette()?,
            frequency_min: self.frequency_min.min(frequency_max),
            frequency_max: Some(frequency_max),
            height: self.height,
            split_channels: self.split_channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpectrogramError;

    #[test]
    fn empty_json_gives_defaults() {
        let settings: SpectrogramSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SpectrogramSettings::default());
        assert_eq!(settings.color_map, ColorMap::Named(NamedPalette::Roseus));
    }

    #[test]
    fn parses_named_fields() {
        let settings: SpectrogramSettings = serde_json::from_str(
            r#"{"fft_samples": 1024, "window": "blackman", "scale": "bark",
                "color_map": "igray", "overlap_percent": 50}"#,
        )
        .unwrap();
        assert_eq!(settings.window, WindowKind::Blackman);
        assert_eq!(settings.scale, FrequencyScale::Bark);
        assert_eq!(settings.color_map, ColorMap::Named(NamedPalette::Igray));
        assert_eq!(settings.overlap_percent, Some(50));
    }

    #[test]
    fn unknown_window_is_rejected() {
        let err = serde_json::from_str::<SpectrogramSettings>(r#"{"window": "kaiser"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn sanitize_clamps_ranges() {
        let mut settings = SpectrogramSettings {
            fft_samples: 1000,
            overlap_percent: Some(0),
            range_db: -5.0,
            height: 0,
            ..SpectrogramSettings::default()
        };
        settings.sanitize();
        assert_eq!(settings.fft_samples, 1024);
        assert_eq!(settings.overlap_percent, Some(1));
        assert_eq!(settings.range_db, DEFAULT_RANGE_DB);
        assert_eq!(settings.height, 1);

        settings.fft_samples = 1 << 20;
        settings.overlap_percent = Some(100);
        settings.sanitize();
        assert_eq!(settings.fft_samples, MAX_FFT_SAMPLES);
        assert_eq!(settings.overlap_percent, Some(99));
    }

    #[test]
    fn strict_parse_surfaces_typed_errors() {
        let err = SpectrogramSettings::from_json_strict(r#"{"window": "kaiser", "fft_samples": 4096}"#)
            .unwrap_err();
        assert!(matches!(err, SpectrogramError::UnsupportedWindow(name) if name == "kaiser"));
        assert!(matches!(
            SpectrogramSettings::from_json_strict(r#"{"scale": "cents"}"#),
            Err(SpectrogramError::UnsupportedScale(_))
        ));
        assert!(matches!(
            SpectrogramSettings::from_json_strict(r#"{"color_map": "viridis"}"#),
            Err(SpectrogramError::UnsupportedPalette(_))
        ));
        assert!(matches!(
            SpectrogramSettings::from_json_strict(r#"{"fft_samples": 1000}"#),
            Err(SpectrogramError::InvalidFrameSize(1000))
        ));
        assert!(matches!(
            SpectrogramSettings::from_json_strict(r#"{"fft_samples": 16}"#),
            Err(SpectrogramError::InvalidFrameSize(16))
        ));
        assert!(matches!(
            SpectrogramSettings::from_json_strict(r#"{"overlap_percent": 100}"#),
            Err(SpectrogramError::InvalidOverlap { .. })
        ));
    }

    #[test]
    fn strict_parse_keeps_valid_values() {
        let settings = SpectrogramSettings::from_json_strict(
            r#"{"window": "hanning", "fft_samples": 4096, "scale": "bark", "color_map": "grey"}"#,
        )
        .unwrap();
        assert_eq!(settings.window, WindowKind::Hann);
        assert_eq!(settings.fft_samples, 4096);
        assert_eq!(settings.scale, FrequencyScale::Bark);
        assert_eq!(settings.color_map, ColorMap::Named(NamedPalette::Gray));
    }

    #[test]
    fn zero_max_frequency_means_nyquist() {
        let config = SpectrogramSettings::default().to_render_config(48_000.0).unwrap();
        assert_eq!(config.frequency_max, Some(24_000.0));
        assert_eq!(config.intensity, IntensityMap::default());
        assert_eq!(config.fft_size, 512);
    }

    #[test]
    fn custom_palette_is_validated() {
        let settings = SpectrogramSettings {
            color_map: ColorMap::Custom(vec![vec![0.0, 0.0, 0.0, 1.0]; 12]),
            ..SpectrogramSettings::default()
        };
        assert!(matches!(
            settings.to_render_config(44_100.0),
            Err(SpectrogramError::InvalidPalette { .. })
        ));

        let json = format!(r#"{{"color_map": {}}}"#, serde_json::to_string(&vec![[0.5, 0.5, 0.5, 1.0]; 256]).unwrap());
        let settings: SpectrogramSettings = serde_json::from_str(&json).unwrap();
        assert!(settings.to_render_config(44_100.0).is_ok());
    }
}
