//! Frequency warping functions used by the filter bank, the crop logic and
//! the axis labels. Conversions run in `f64`; the bark inverse gets steep
//! near its asymptote and `f32` loses the round trip at high sample rates.

use crate::error::SpectrogramError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ERB-rate constant: 1000 * ln(10) / (24.7 * 4.37).
pub const ERB_A: f64 = 1000.0 * core::f64::consts::LN_10 / (24.7 * 4.37);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FrequencyScale {
    Linear,
    #[default]
    Mel,
    Logarithmic,
    Bark,
    Erb,
}

impl FrequencyScale {
    pub const ALL: [FrequencyScale; 5] = [
        FrequencyScale::Linear,
        FrequencyScale::Mel,
        FrequencyScale::Logarithmic,
        FrequencyScale::Bark,
        FrequencyScale::Erb,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FrequencyScale::Linear => "linear",
            FrequencyScale::Mel => "mel",
            FrequencyScale::Logarithmic => "logarithmic",
            FrequencyScale::Bark => "bark",
            FrequencyScale::Erb => "erb",
        }
    }

    /// Linear spectra skip the filter bank entirely.
    pub fn uses_filter_bank(self) -> bool {
        !matches!(self, FrequencyScale::Linear)
    }

    pub fn hz_to_scale(self, hz: f64) -> f64 {
        match self {
            FrequencyScale::Linear => hz,
            FrequencyScale::Mel => hz_to_mel(hz),
            FrequencyScale::Logarithmic => hz_to_log(hz),
            FrequencyScale::Bark => hz_to_bark(hz),
            FrequencyScale::Erb => hz_to_erb(hz),
        }
    }

    pub fn scale_to_hz(self, value: f64) -> f64 {
        match self {
            FrequencyScale::Linear => value,
            FrequencyScale::Mel => mel_to_hz(value),
            FrequencyScale::Logarithmic => log_to_hz(value),
            FrequencyScale::Bark => bark_to_hz(value),
            FrequencyScale::Erb => erb_to_hz(value),
        }
    }

    /// Ratio `scale(hz) / scale(reference)`, the normalized height of `hz`
    /// on an axis that ends at `reference`.
    pub fn ratio(self, hz: f64, reference: f64) -> f64 {
        let denom = self.hz_to_scale(reference);
        if denom.abs() < f64::EPSILON {
            return 0.0;
        }
        self.hz_to_scale(hz) / denom
    }

    /// Frequency at fraction `t` of the way from `min_hz` to `max_hz`,
    /// interpolated in scale space.
    pub fn interpolate(self, min_hz: f64, max_hz: f64, t: f64) -> f64 {
        let lo = self.hz_to_scale(min_hz);
        let hi = self.hz_to_scale(max_hz);
        self.scale_to_hz(lo + t * (hi - lo))
    }
}

impl fmt::Display for FrequencyScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrequencyScale {
    type Err = SpectrogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(FrequencyScale::Linear),
            "mel" => Ok(FrequencyScale::Mel),
            "logarithmic" | "log" => Ok(FrequencyScale::Logarithmic),
            "bark" => Ok(FrequencyScale::Bark),
            "erb" => Ok(FrequencyScale::Erb),
            _ => Err(SpectrogramError::UnsupportedScale(s.to_string())),
        }
    }
}

impl TryFrom<String> for FrequencyScale {
    type Error = SpectrogramError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

#[inline]
pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

#[inline]
pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

// Frequencies below 1 Hz collapse onto 0.
#[inline]
pub fn hz_to_log(hz: f64) -> f64 {
    hz.max(1.0).log10()
}

#[inline]
pub fn log_to_hz(value: f64) -> f64 {
    10f64.powf(value)
}

// Traunmüller with the low (< 2) and high (> 20.1) bark corrections.
pub fn hz_to_bark(hz: f64) -> f64 {
    let mut bark = 26.81 * hz / (1960.0 + hz) - 0.53;
    if bark < 2.0 {
        bark += 0.15 * (2.0 - bark);
    }
    if bark > 20.1 {
        bark += 0.22 * (bark - 20.1);
    }
    bark
}

pub fn bark_to_hz(bark: f64) -> f64 {
    let mut bark = bark;
    if bark < 2.0 {
        bark = (bark - 0.3) / 0.85;
    }
    if bark > 20.1 {
        bark = (bark + 4.422) / 1.22;
    }
    1960.0 * (bark + 0.53) / (26.28 - bark)
}

#[inline]
pub fn hz_to_erb(hz: f64) -> f64 {
    ERB_A * (1.0 + 0.00437 * hz).log10()
}

#[inline]
pub fn erb_to_hz(erb: f64) -> f64 {
    (10f64.powf(erb / ERB_A) - 1.0) / 0.00437
}
