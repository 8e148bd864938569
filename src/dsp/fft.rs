//! Power-of-two transform kernels.
//!
//! [`RadixFft`] is the hand-rolled radix-2 Cooley-Tukey kernel used by the
//! reference pipeline. [`RealFftKernel`] wraps `realfft` and is used by the
//! optimized pipeline. Both produce the same `2/size`-scaled magnitudes for
//! bins `[0, size/2)` and both keep their working buffers between calls.

use crate::error::{Result, SpectrogramError};
use crate::util::audio::apply_window;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex32;
use std::collections::HashMap;
use std::sync::Arc;
use wide::f32x8;

pub const MIN_FFT_SIZE: usize = 2;

/// What [`SpectrumKernel::spectrum`] writes per bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpectrumMode {
    /// `2/size * sqrt(re^2 + im^2)`.
    #[default]
    Magnitude,
    /// `re^2 + im^2`, unscaled.
    Power,
}

pub fn validate_size(size: usize) -> Result<()> {
    if size < MIN_FFT_SIZE || !size.is_power_of_two() {
        return Err(SpectrogramError::InvalidFrameSize(size));
    }
    Ok(())
}

pub trait SpectrumKernel {
    fn size(&self) -> usize;

    /// Windows `frame`, transforms it and writes `size/2` values into `out`.
    fn spectrum(
        &mut self,
        frame: &[f32],
        window: &[f32],
        mode: SpectrumMode,
        out: &mut [f32],
    ) -> Result<()>;
}

/// Source of per-size kernels. Each pipeline variant owns one.
pub trait KernelCache {
    type Kernel: SpectrumKernel;

    fn kernel(&mut self, size: usize) -> Result<&mut Self::Kernel>;
}

fn check_lengths(size: usize, frame: &[f32], window: &[f32], out: &[f32]) -> Result<()> {
    if frame.len() != size || window.len() != size || out.len() < size / 2 {
        return Err(SpectrogramError::InvalidFrameSize(frame.len()));
    }
    Ok(())
}

/// Bit-reversal permutation and per-stage twiddles for one size.
#[derive(Debug)]
pub struct RadixTables {
    size: usize,
    bit_reverse: Vec<u32>,
    // Stage with half-length `h` starts at offset `h - 1`.
    twiddles: Vec<[f32; 2]>,
}

impl RadixTables {
    pub fn new(size: usize) -> Result<Self> {
        validate_size(size)?;

        let mut bit_reverse = vec![0u32; size];
        let (mut limit, mut bit) = (1usize, size >> 1);
        while limit < size {
            for i in 0..limit {
                bit_reverse[i + limit] = bit_reverse[i] + bit as u32;
            }
            limit <<= 1;
            bit >>= 1;
        }

        let mut twiddles = Vec::with_capacity(size - 1);
        let mut half = 1usize;
        while half < size {
            let span = (half << 1) as f64;
            for j in 0..half {
                let angle = -core::f64::consts::TAU * j as f64 / span;
                twiddles.push([angle.cos() as f32, angle.sin() as f32]);
            }
            half <<= 1;
        }

        Ok(Self {
            size,
            bit_reverse,
            twiddles,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn bit_reverse(&self) -> &[u32] {
        &self.bit_reverse
    }
}

#[derive(Debug)]
pub struct RadixFft {
    tables: Arc<RadixTables>,
    real: Vec<f32>,
    imag: Vec<f32>,
    peak_band: usize,
    peak: f32,
}

impl RadixFft {
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self::with_tables(Arc::new(RadixTables::new(size)?)))
    }

    pub fn with_tables(tables: Arc<RadixTables>) -> Self {
        let size = tables.size;
        Self {
            tables,
            real: vec![0.0; size],
            imag: vec![0.0; size],
            peak_band: 0,
            peak: 0.0,
        }
    }

    /// Bin with the largest magnitude seen since the last [`reset_peak`](Self::reset_peak).
    pub fn peak_band(&self) -> usize {
        self.peak_band
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn reset_peak(&mut self) {
        self.peak_band = 0;
        self.peak = 0.0;
    }

    fn transform(&mut self, frame: &[f32], window: &[f32]) {
        let size = self.tables.size;
        let RadixTables {
            bit_reverse,
            twiddles,
            ..
        } = &*self.tables;
        let (re, im) = (&mut self.real, &mut self.imag);

        for k in 0..size {
            let src = bit_reverse[k] as usize;
            re[k] = frame[src] * window[src];
            im[k] = 0.0;
        }

        let mut half = 1usize;
        while half < size {
            let stage = &twiddles[half - 1..(half << 1) - 1];
            let step = half << 1;
            for (z, &[c, s]) in stage.iter().enumerate() {
                let mut k = z;
                while k < size {
                    let m = k + half;
                    let tr = c * re[m] - s * im[m];
                    let ti = c * im[m] + s * re[m];
                    re[m] = re[k] - tr;
                    im[m] = im[k] - ti;
                    re[k] += tr;
                    im[k] += ti;
                    k += step;
                }
            }
            half <<= 1;
        }
    }
}

impl SpectrumKernel for RadixFft {
    fn size(&self) -> usize {
        self.tables.size
    }

    fn spectrum(
        &mut self,
        frame: &[f32],
        window: &[f32],
        mode: SpectrumMode,
        out: &mut [f32],
    ) -> Result<()> {
        let size = self.tables.size;
        check_lengths(size, frame, window, out)?;
        self.transform(frame, window);

        let scale = 2.0 / size as f32;
        for (k, slot) in out.iter_mut().take(size / 2).enumerate() {
            let (re, im) = (self.real[k], self.imag[k]);
            let power = re * re + im * im;
            let magnitude = scale * power.sqrt();
            if magnitude > self.peak {
                self.peak = magnitude;
                self.peak_band = k;
            }
            *slot = match mode {
                SpectrumMode::Magnitude => magnitude,
                SpectrumMode::Power => power,
            };
        }
        Ok(())
    }
}

/// Radix kernels keyed by size; tables are built once per size.
#[derive(Debug, Default)]
pub struct RadixCache {
    kernels: HashMap<usize, RadixFft>,
}

impl RadixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

impl KernelCache for RadixCache {
    type Kernel = RadixFft;

    fn kernel(&mut self, size: usize) -> Result<&mut RadixFft> {
        validate_size(size)?;
        if !self.kernels.contains_key(&size) {
            self.kernels.insert(size, RadixFft::new(size)?);
        }
        self.kernels
            .get_mut(&size)
            .ok_or(SpectrogramError::InvalidFrameSize(size))
    }
}

pub struct RealFftKernel {
    size: usize,
    fft: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl RealFftKernel {
    fn new(planner: &mut RealFftPlanner<f32>, size: usize) -> Result<Self> {
        validate_size(size)?;
        let fft = planner.plan_fft_forward(size);
        Ok(Self {
            size,
            input: fft.make_input_vec(),
            spectrum: fft.make_output_vec(),
            scratch: fft.make_scratch_vec(),
            fft,
        })
    }
}

impl SpectrumKernel for RealFftKernel {
    fn size(&self) -> usize {
        self.size
    }

    fn spectrum(
        &mut self,
        frame: &[f32],
        window: &[f32],
        mode: SpectrumMode,
        out: &mut [f32],
    ) -> Result<()> {
        let size = self.size;
        check_lengths(size, frame, window, out)?;

        self.input.copy_from_slice(frame);
        apply_window(&mut self.input, window);
        self.fft
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            .map_err(|_| SpectrogramError::InvalidFrameSize(size))?;

        let bins = size / 2;
        let out = &mut out[..bins];
        let scale = f32x8::splat(2.0 / size as f32);
        let mut chunks = out.chunks_exact_mut(8);
        let mut base = 0usize;
        for chunk in chunks.by_ref() {
            let bins = &self.spectrum[base..base + 8];
            let re = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| bins[i].re));
            let im = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| bins[i].im));
            let power = re * re + im * im;
            let values = match mode {
                SpectrumMode::Magnitude => power.sqrt() * scale,
                SpectrumMode::Power => power,
            };
            chunk.copy_from_slice(&values.to_array());
            base += 8;
        }
        let scale = 2.0 / size as f32;
        for (offset, slot) in chunks.into_remainder().iter_mut().enumerate() {
            let power = self.spectrum[base + offset].norm_sqr();
            *slot = match mode {
                SpectrumMode::Magnitude => scale * power.sqrt(),
                SpectrumMode::Power => power,
            };
        }
        Ok(())
    }
}

pub struct RealFftCache {
    planner: RealFftPlanner<f32>,
    kernels: HashMap<usize, RealFftKernel>,
}

impl Default for RealFftCache {
    fn default() -> Self {
        Self {
            planner: RealFftPlanner::new(),
            kernels: HashMap::new(),
        }
    }
}

impl RealFftCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KernelCache for RealFftCache {
    type Kernel = RealFftKernel;

    fn kernel(&mut self, size: usize) -> Result<&mut RealFftKernel> {
        validate_size(size)?;
        if !self.kernels.contains_key(&size) {
            let kernel = RealFftKernel::new(&mut self.planner, size)?;
            self.kernels.insert(size, kernel);
        }
        self.kernels
            .get_mut(&size)
            .ok_or(SpectrogramError::InvalidFrameSize(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::window::{WindowCache, WindowKind};
    use crate::util::audio::sine;

    fn peak_bin(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| idx)
            .unwrap()
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert!(matches!(
            RadixFft::new(1000),
            Err(SpectrogramError::InvalidFrameSize(1000))
        ));
        assert!(RadixFft::new(0).is_err());
        assert!(RadixFft::new(1).is_err());
        assert!(RealFftCache::new().kernel(48).is_err());
    }

    #[test]
    fn bit_reverse_table_is_permutation() {
        let tables = RadixTables::new(16).unwrap();
        assert_eq!(
            tables.bit_reverse(),
            &[0, 8, 4, 12, 2, 10, 6, 14, 1, 9, 5, 13, 3, 11, 7, 15]
        );
    }

    #[test]
    fn detects_sine_peak_for_every_window() {
        let sample_rate = 48_000.0;
        let mut windows = WindowCache::new();
        let mut radix = RadixCache::new();
        let mut real = RealFftCache::new();
        for size in [64usize, 256, 1024, 4096] {
            let freq = 3_000.0;
            let frame = sine(freq, sample_rate, size);
            let expected = (freq * size as f32 / sample_rate).round() as isize;
            for kind in WindowKind::ALL {
                let window = windows.get(kind, None, size);
                let mut out = vec![0.0; size / 2];

                radix
                    .kernel(size)
                    .unwrap()
                    .spectrum(&frame, &window, SpectrumMode::Magnitude, &mut out)
                    .unwrap();
                let got = peak_bin(&out) as isize;
                assert!((got - expected).abs() <= 1, "radix {kind} n={size}: {got}");

                real.kernel(size)
                    .unwrap()
                    .spectrum(&frame, &window, SpectrumMode::Magnitude, &mut out)
                    .unwrap();
                let got = peak_bin(&out) as isize;
                assert!((got - expected).abs() <= 1, "realfft {kind} n={size}: {got}");
            }
        }
    }

    #[test]
    fn kernels_agree() {
        let size = 512;
        let frame: Vec<f32> = (0..size)
            .map(|n| ((n * 7919) % 263) as f32 / 131.0 - 1.0)
            .collect();
        let window = WindowKind::Hamming.coefficients(size, None);
        let mut a = vec![0.0; size / 2];
        let mut b = vec![0.0; size / 2];
        RadixFft::new(size)
            .unwrap()
            .spectrum(&frame, &window, SpectrumMode::Magnitude, &mut a)
            .unwrap();
        RealFftCache::new()
            .kernel(size)
            .unwrap()
            .spectrum(&frame, &window, SpectrumMode::Magnitude, &mut b)
            .unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4, "{x} vs {y}");
        }
    }

    #[test]
    fn magnitude_is_amplitude_scaled() {
        // A full-scale sine on a bin centre reads ~1.0 with a rectangular window.
        let size = 256;
        let frame = sine(32.0 * 48_000.0 / size as f32, 48_000.0, size);
        let window = vec![1.0; size];
        let mut out = vec![0.0; size / 2];
        let mut fft = RadixFft::new(size).unwrap();
        fft.spectrum(&frame, &window, SpectrumMode::Magnitude, &mut out)
            .unwrap();
        assert!((out[32] - 1.0).abs() < 1e-3);
        assert_eq!(fft.peak_band(), 32);

        fft.spectrum(&frame, &window, SpectrumMode::Power, &mut out)
            .unwrap();
        let expected = (size as f32 / 2.0).powi(2);
        assert!((out[32] - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn reuses_buffers_between_calls() {
        let mut cache = RadixCache::new();
        let window = vec![1.0; 128];
        let frame = vec![0.25; 128];
        let mut out = vec![0.0; 64];
        for _ in 0..3 {
            let kernel = cache.kernel(128).unwrap();
            kernel
                .spectrum(&frame, &window, SpectrumMode::Magnitude, &mut out)
                .unwrap();
        }
        assert_eq!(cache.len(), 1);
        // DC of a constant frame: 2/N * N * 0.25.
        assert!((out[0] - 0.5).abs() < 1e-5);
    }
}
