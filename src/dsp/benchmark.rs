//! Side-by-side timing and agreement check of the two transform kernels.

use super::fft::{KernelCache, RadixCache, RealFftCache, SpectrumKernel, SpectrumMode};
use super::window::WindowKind;
use crate::error::Result;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct BenchmarkReport {
    pub size: usize,
    pub iterations: usize,
    pub reference_per_call: Duration,
    pub optimized_per_call: Duration,
    pub max_abs_diff: f32,
}

impl BenchmarkReport {
    pub fn speedup(&self) -> f64 {
        let optimized = self.optimized_per_call.as_secs_f64();
        if optimized <= 0.0 {
            return 0.0;
        }
        self.reference_per_call.as_secs_f64() / optimized
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fft {:>6}: radix {:>10.2?}/call, realfft {:>10.2?}/call, {:.2}x, max |diff| {:.3e}",
            self.size,
            self.reference_per_call,
            self.optimized_per_call,
            self.speedup(),
            self.max_abs_diff
        )
    }
}

// Deterministic noise in [-1, 1).
fn test_signal(len: usize) -> Vec<f32> {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

fn time_kernel<K: SpectrumKernel>(
    kernel: &mut K,
    frame: &[f32],
    window: &[f32],
    out: &mut [f32],
    iterations: usize,
) -> Result<Duration> {
    let start = Instant::now();
    for _ in 0..iterations {
        kernel.spectrum(frame, window, SpectrumMode::Magnitude, out)?;
    }
    Ok(start.elapsed() / iterations.max(1) as u32)
}

pub fn compare(size: usize, iterations: usize) -> Result<BenchmarkReport> {
    let mut radix = RadixCache::new();
    let mut real = RealFftCache::new();
    let reference = radix.kernel(size)?;
    let optimized = real.kernel(size)?;

    let frame = test_signal(size);
    let window = WindowKind::Hann.coefficients(size, None);
    let mut a = vec![0.0; size / 2];
    let mut b = vec![0.0; size / 2];

    let iterations = iterations.max(1);
    let reference_per_call = time_kernel(reference, &frame, &window, &mut a, iterations)?;
    let optimized_per_call = time_kernel(optimized, &frame, &window, &mut b, iterations)?;
    let max_abs_diff = a
        .iter()
        .zip(&b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max);

    Ok(BenchmarkReport {
        size,
        iterations,
        reference_per_call,
        optimized_per_call,
        max_abs_diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernels_agree_on_noise() {
        for size in [256, 2048] {
            let report = compare(size, 2).unwrap();
            assert_eq!(report.size, size);
            assert!(report.max_abs_diff < 1e-4, "{report}");
        }
    }

    #[test]
    fn rejects_bad_size() {
        assert!(compare(1000, 1).is_err());
    }
}
