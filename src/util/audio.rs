// Default sample rate (Hz) used when a caller does not supply one.
// decoded buffers always carry their own rate, this exists mainly as
// a default for settings and the worker before its first message.
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

// decibel conversion constants/utils

// Smallest magnitude fed into the dB conversion, avoids log(0).
pub const MAGNITUDE_FLOOR: f32 = 1.0e-12;

// Convert an amplitude magnitude to decibels (20*log10), floored.
#[inline(always)]
pub fn magnitude_to_db(magnitude: f32) -> f32 {
    20.0 * magnitude.max(MAGNITUDE_FLOOR).log10()
}

#[inline]
pub fn apply_window(buffer: &mut [f32], window: &[f32]) {
    debug_assert_eq!(buffer.len(), window.len());
    for (sample, coeff) in buffer.iter_mut().zip(window.iter()) {
        *sample *= *coeff;
    }
}

#[inline]
pub fn nyquist(sample_rate: f32) -> f32 {
    sample_rate * 0.5
}

// Frequency resolution of one linear FFT bin.
#[inline]
pub fn bin_width(sample_rate: f32, fft_size: usize) -> f32 {
    sample_rate / fft_size.max(1) as f32
}

// Pure sine at `freq` Hz, `len` samples long.
pub fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
    let step = core::f64::consts::TAU * freq as f64 / sample_rate as f64;
    (0..len).map(|n| (step * n as f64).sin() as f32).collect()
}

// Linear sine sweep from `start` to `end` Hz over `len` samples.
pub fn sine_sweep(start: f32, end: f32, sample_rate: f32, len: usize) -> Vec<f32> {
    if len == 0 {
        return Vec::new();
    }
    let duration = len as f64 / sample_rate as f64;
    let rate = (end as f64 - start as f64) / duration;
    (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate as f64;
            let phase = core::f64::consts::TAU * (start as f64 * t + 0.5 * rate * t * t);
            phase.sin() as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_silence() {
        assert!((magnitude_to_db(0.0) + 240.0).abs() < 1e-3);
        assert!((magnitude_to_db(1.0)).abs() < 1e-6);
        assert!((magnitude_to_db(0.1) + 20.0).abs() < 1e-4);
    }

    #[test]
    fn sweep_stays_bounded() {
        let sweep = sine_sweep(100.0, 10_000.0, 48_000.0, 4_800);
        assert_eq!(sweep.len(), 4_800);
        assert!(sweep.iter().all(|s| s.abs() <= 1.0));
        assert!(sine_sweep(1.0, 2.0, 48_000.0, 0).is_empty());
    }
}
