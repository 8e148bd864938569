pub mod benchmark;
pub mod fft;
pub mod filterbank;
pub mod framer;
pub mod quantize;
pub mod resample;
pub mod scale;
pub mod window;

use crate::error::{Result, SpectrogramError};
use crate::util::audio::nyquist;
use window::WindowKind;

/// Decoded PCM handed in by the caller. Read-only to the engine.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    channels: Vec<Vec<f32>>,
    sample_rate: f32,
}

impl DecodedAudio {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: f32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self::new(vec![samples], sample_rate)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Samples per channel (the first channel's length).
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nyquist(&self) -> f32 {
        nyquist(self.sample_rate)
    }
}

/// How the frame overlap is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Fixed overlap in samples.
    Samples(usize),
    /// Overlap such that one hop covers roughly one display column.
    #[default]
    Auto,
}

impl OverlapPolicy {
    /// Manual overlap from a percentage of the frame size.
    pub fn from_percent(size: usize, percent: u8) -> Self {
        OverlapPolicy::Samples(size * percent as usize / 100)
    }

    /// Overlap in samples for a `signal_len` buffer drawn `display_width`
    /// columns wide.
    pub fn resolve(self, size: usize, signal_len: usize, display_width: usize) -> usize {
        match self {
            OverlapPolicy::Samples(samples) => samples,
            OverlapPolicy::Auto => auto_overlap(size, signal_len, display_width),
        }
    }
}

/// `max(0, round(size - len/width))`.
pub fn auto_overlap(size: usize, signal_len: usize, display_width: usize) -> usize {
    if display_width == 0 {
        return 0;
    }
    let samples_per_px = signal_len as f64 / display_width as f64;
    (size as f64 - samples_per_px).round().max(0.0) as usize
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformConfig {
    /// Frame length, `2^k`.
    pub size: usize,
    pub window: WindowKind,
    /// Shape parameter for blackman/gauss; ignored by other windows.
    pub window_alpha: Option<f32>,
    pub overlap: OverlapPolicy,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            size: 512,
            window: WindowKind::Hann,
            window_alpha: None,
            overlap: OverlapPolicy::Auto,
        }
    }
}

impl TransformConfig {
    pub fn validate(&self) -> Result<()> {
        fft::validate_size(self.size)?;
        if let OverlapPolicy::Samples(overlap) = self.overlap
            && overlap >= self.size
        {
            return Err(SpectrogramError::InvalidOverlap {
                overlap,
                size: self.size,
            });
        }
        Ok(())
    }

    /// Hop in samples for a concrete signal and display width. Never zero.
    pub fn hop(&self, signal_len: usize, display_width: usize) -> usize {
        let overlap = self.overlap.resolve(self.size, signal_len, display_width);
        self.size.saturating_sub(overlap).max(1)
    }
}

/// Row-major matrix of palette indices: `len()` rows of `bins()` values.
/// A frame matrix has one row per analysis frame; after resampling, one
/// row per display column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexMatrix {
    bins: usize,
    data: Vec<u8>,
}

pub type FrameMatrix = IndexMatrix;
pub type PixelMatrix = IndexMatrix;

impl IndexMatrix {
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            data: Vec::new(),
        }
    }

    pub fn with_capacity(bins: usize, rows: usize) -> Self {
        Self {
            bins,
            data: Vec::with_capacity(bins * rows),
        }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn len(&self) -> usize {
        if self.bins == 0 {
            0
        } else {
            self.data.len() / self.bins
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frame(&self, index: usize) -> &[u8] {
        &self.data[index * self.bins..(index + 1) * self.bins]
    }

    pub fn push_frame(&mut self, frame: &[u8]) {
        debug_assert_eq!(frame.len(), self.bins);
        self.data.extend_from_slice(frame);
    }

    /// Appends a zeroed row and returns it for filling in place.
    pub fn push_zeroed(&mut self) -> &mut [u8] {
        let start = self.data.len();
        self.data.resize(start + self.bins, 0);
        &mut self.data[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.bins.max(1))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

pub trait Reconfigurable<Cfg> {
    fn update_config(&mut self, config: Cfg);
}
