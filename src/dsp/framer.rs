//! Slides the analysis window across each channel and produces one row of
//! palette indices per frame.

use super::fft::{KernelCache, SpectrumKernel, SpectrumMode};
use super::filterbank::{FilterBank, FilterBankCache};
use super::quantize::{IntensityMap, Quantizer};
use super::scale::FrequencyScale;
use super::window::WindowCache;
use super::{DecodedAudio, FrameMatrix, TransformConfig};
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Everything the framer needs besides the signal itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub transform: TransformConfig,
    pub scale: FrequencyScale,
    /// Bands for warped scales; `None` means `size / 2`.
    pub num_filters: Option<usize>,
    pub intensity: IntensityMap,
    pub split_channels: bool,
    /// Target column count, used by [`OverlapPolicy::Auto`](super::OverlapPolicy::Auto).
    pub display_width: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            transform: TransformConfig::default(),
            scale: FrequencyScale::default(),
            num_filters: None,
            intensity: IntensityMap::default(),
            split_channels: false,
            display_width: 1,
        }
    }
}

impl AnalysisParams {
    /// Values per frame: band count for warped scales, `size / 2` otherwise.
    pub fn bins(&self) -> usize {
        if self.scale.uses_filter_bank() {
            self.num_filters.unwrap_or(self.transform.size / 2)
        } else {
            self.transform.size / 2
        }
    }
}

/// `floor((len - size) / hop) + 1` when at least one frame fits, else 0.
pub fn frame_count(signal_len: usize, size: usize, hop: usize) -> usize {
    if size == 0 || signal_len < size {
        return 0;
    }
    (signal_len - size) / hop.max(1) + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankMode {
    /// Full matrix-vector product per frame.
    #[default]
    Dense,
    /// Two taps per band.
    Sparse,
}

/// Framer plus the caches it reads from. Each pipeline instance (and the
/// background worker) owns its own.
pub struct Framer<K> {
    windows: WindowCache,
    kernels: K,
    banks: FilterBankCache,
    bank_mode: BankMode,
    spectrum: Vec<f32>,
    banded: Vec<f32>,
}

impl<K: KernelCache + Default> Default for Framer<K> {
    fn default() -> Self {
        Self::new(K::default(), BankMode::Dense)
    }
}

impl<K: KernelCache> Framer<K> {
    pub fn new(kernels: K, bank_mode: BankMode) -> Self {
        Self {
            windows: WindowCache::new(),
            kernels,
            banks: FilterBankCache::new(),
            bank_mode,
            spectrum: Vec::new(),
            banded: Vec::new(),
        }
    }

    pub fn kernels(&self) -> &K {
        &self.kernels
    }

    pub fn kernels_mut(&mut self) -> &mut K {
        &mut self.kernels
    }

    pub fn windows(&self) -> &WindowCache {
        &self.windows
    }

    pub fn banks(&self) -> &FilterBankCache {
        &self.banks
    }

    /// One [`FrameMatrix`] per rendered channel. Signals shorter than one
    /// frame produce empty matrices.
    pub fn analyze(&mut self, audio: &DecodedAudio, params: &AnalysisParams) -> Result<Vec<FrameMatrix>> {
        let transform = params.transform;
        transform.validate()?;

        let size = transform.size;
        let hop = transform.hop(audio.len(), params.display_width);
        let window = self
            .windows
            .get(transform.window, transform.window_alpha, size);
        let bank: Option<Arc<FilterBank>> = params.scale.uses_filter_bank().then(|| {
            self.banks
                .get(params.scale, params.bins(), audio.sample_rate(), size)
        });
        let bins = params.bins();
        let quantizer = Quantizer::from(params.intensity);

        self.spectrum.resize(size / 2, 0.0);
        self.banded.resize(bins, 0.0);

        let channels = if params.split_channels {
            audio.channel_count()
        } else {
            audio.channel_count().min(1)
        };

        let mut matrices = Vec::with_capacity(channels);
        for channel in 0..channels {
            let samples = audio.channel(channel).unwrap_or_default();
            let frames = frame_count(samples.len(), size, hop);
            let mut matrix = FrameMatrix::with_capacity(bins, frames);
            if frames == 0 {
                matrices.push(matrix);
                continue;
            }

            let kernel = self.kernels.kernel(size)?;
            for index in 0..frames {
                let offset = index * hop;
                let frame = &samples[offset..offset + size];
                kernel.spectrum(frame, &window, SpectrumMode::Magnitude, &mut self.spectrum)?;
                let values: &[f32] = match &bank {
                    Some(bank) => {
                        match self.bank_mode {
                            BankMode::Dense => bank.apply(&self.spectrum, &mut self.banded),
                            BankMode::Sparse => bank.apply_sparse(&self.spectrum, &mut self.banded),
                        }
                        &self.banded
                    }
                    None => &self.spectrum,
                };
                quantizer.quantize_into(values, matrix.push_zeroed());
            }
            debug!(
                "[framer] channel {channel}: {frames} frames of {bins} bins (size {size}, hop {hop})"
            );
            matrices.push(matrix);
        }
        Ok(matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::fft::{RadixCache, RealFftCache};
    use crate::dsp::window::WindowKind;
    use crate::dsp::OverlapPolicy;
    use crate::error::SpectrogramError;
    use crate::util::audio::{sine, sine_sweep};

    fn params(size: usize, overlap: OverlapPolicy, scale: FrequencyScale) -> AnalysisParams {
        AnalysisParams {
            transform: TransformConfig {
                size,
                window: WindowKind::Hann,
                window_alpha: None,
                overlap,
            },
            scale,
            display_width: 100,
            ..AnalysisParams::default()
        }
    }

    #[test]
    fn frame_count_drops_trailing_partial_frame() {
        assert_eq!(frame_count(1024, 1024, 512), 1);
        assert_eq!(frame_count(1535, 1024, 512), 1);
        assert_eq!(frame_count(1536, 1024, 512), 2);
        assert_eq!(frame_count(1000, 1024, 512), 0);
    }

    #[test]
    fn short_signal_yields_empty_matrix() {
        let audio = DecodedAudio::mono(vec![0.5; 100], 48_000.0);
        let mut framer = Framer::<RadixCache>::default();
        let out = framer
            .analyze(&audio, &params(256, OverlapPolicy::Samples(0), FrequencyScale::Linear))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_empty());
    }

    #[test]
    fn invalid_size_leaves_caches_untouched() {
        let audio = DecodedAudio::mono(vec![0.0; 4096], 48_000.0);
        let mut framer = Framer::<RadixCache>::default();
        let err = framer
            .analyze(&audio, &params(1000, OverlapPolicy::Auto, FrequencyScale::Mel))
            .unwrap_err();
        assert!(matches!(err, SpectrogramError::InvalidFrameSize(1000)));
        assert!(framer.windows().is_empty());
        assert!(framer.banks().is_empty());
        assert!(framer.kernels().is_empty());
    }

    #[test]
    fn end_to_end_sweep_frame_count() {
        let sample_rate = 256_000.0;
        let samples = sine_sweep(1_000.0, 100_000.0, sample_rate, 256_000);
        let audio = DecodedAudio::mono(samples, sample_rate);
        let display_width = 1_200;
        let mut p = params(1024, OverlapPolicy::Auto, FrequencyScale::Linear);
        p.display_width = display_width;

        let hop = p.transform.hop(audio.len(), display_width);
        // round(1024 - 256000/1200) = 811 overlap.
        assert_eq!(hop, 1024 - 811);

        let out = Framer::<RadixCache>::default().analyze(&audio, &p).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), (256_000 - 1024) / hop + 1);
        assert_eq!(out[0].bins(), 512);
    }

    #[test]
    fn peak_row_follows_tone() {
        let sample_rate = 48_000.0;
        let audio = DecodedAudio::mono(sine(6_000.0, sample_rate, 8_192), sample_rate);
        let p = params(1024, OverlapPolicy::Samples(512), FrequencyScale::Linear);
        let out = Framer::<RealFftCache>::default().analyze(&audio, &p).unwrap();
        for row in out[0].iter() {
            let (peak, _) = row.iter().enumerate().max_by_key(|(_, v)| **v).unwrap();
            assert!((peak as isize - 128).abs() <= 1, "peak at {peak}");
        }
    }

    #[test]
    fn split_channels_renders_each_channel() {
        let sample_rate = 8_000.0;
        let audio = DecodedAudio::new(
            vec![sine(500.0, sample_rate, 2_048), sine(1_500.0, sample_rate, 2_048)],
            sample_rate,
        );
        let mut p = params(256, OverlapPolicy::Samples(128), FrequencyScale::Mel);
        let mut framer = Framer::<RadixCache>::new(RadixCache::new(), BankMode::Sparse);
        assert_eq!(framer.analyze(&audio, &p).unwrap().len(), 1);
        p.split_channels = true;
        let out = framer.analyze(&audio, &p).unwrap();
        assert_eq!(out.len(), 2);
        assert_ne!(out[0], out[1]);
        assert_eq!(out[0].bins(), 128);
    }

    #[test]
    fn dense_and_sparse_banks_agree() {
        let sample_rate = 22_050.0;
        let audio = DecodedAudio::mono(sine_sweep(50.0, 10_000.0, sample_rate, 16_384), sample_rate);
        let mut p = params(512, OverlapPolicy::Samples(256), FrequencyScale::Erb);
        p.num_filters = Some(96);
        let dense = Framer::<RadixCache>::new(RadixCache::new(), BankMode::Dense)
            .analyze(&audio, &p)
            .unwrap();
        let sparse = Framer::<RadixCache>::new(RadixCache::new(), BankMode::Sparse)
            .analyze(&audio, &p)
            .unwrap();
        assert_eq!(dense[0].bins(), 96);
        let diff = dense[0]
            .as_bytes()
            .iter()
            .zip(sparse[0].as_bytes())
            .filter(|(a, b)| a.abs_diff(**b) > 1)
            .count();
        assert_eq!(diff, 0);
    }
}
