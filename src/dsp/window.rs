//! Analysis window catalogue and the per-size table cache.

use crate::error::SpectrogramError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_BLACKMAN_ALPHA: f32 = 0.16;
pub const DEFAULT_GAUSS_ALPHA: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum WindowKind {
    Bartlett,
    BartlettHann,
    Blackman,
    Cosine,
    Gauss,
    Hamming,
    #[default]
    Hann,
    Lanczos,
    Rectangular,
    Triangular,
}

impl WindowKind {
    pub const ALL: [WindowKind; 10] = [
        WindowKind::Bartlett,
        WindowKind::BartlettHann,
        WindowKind::Blackman,
        WindowKind::Cosine,
        WindowKind::Gauss,
        WindowKind::Hamming,
        WindowKind::Hann,
        WindowKind::Lanczos,
        WindowKind::Rectangular,
        WindowKind::Triangular,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WindowKind::Bartlett => "bartlett",
            WindowKind::BartlettHann => "bartlett_hann",
            WindowKind::Blackman => "blackman",
            WindowKind::Cosine => "cosine",
            WindowKind::Gauss => "gauss",
            WindowKind::Hamming => "hamming",
            WindowKind::Hann => "hann",
            WindowKind::Lanczos => "lanczos",
            WindowKind::Rectangular => "rectangular",
            WindowKind::Triangular => "triangular",
        }
    }

    /// Shape parameter used when the caller does not provide one.
    /// `None` for windows that take no parameter.
    pub fn default_alpha(self) -> Option<f32> {
        match self {
            WindowKind::Blackman => Some(DEFAULT_BLACKMAN_ALPHA),
            WindowKind::Gauss => Some(DEFAULT_GAUSS_ALPHA),
            _ => None,
        }
    }

    fn resolve_alpha(self, alpha: Option<f32>) -> Option<f32> {
        self.default_alpha()
            .map(|default| alpha.filter(|a| a.is_finite() && *a > 0.0).unwrap_or(default))
    }

    pub fn coefficients(self, len: usize, alpha: Option<f32>) -> Vec<f32> {
        if len == 0 {
            return Vec::new();
        }
        if len == 1 {
            return vec![1.0];
        }

        let n = len as f64;
        let span = n - 1.0;
        let half = span / 2.0;
        let alpha = self.resolve_alpha(alpha).unwrap_or(0.0) as f64;

        (0..len)
            .map(|i| {
                let i = i as f64;
                let value = match self {
                    WindowKind::Bartlett => 2.0 / span * (half - (i - half).abs()),
                    WindowKind::BartlettHann => {
                        0.62 - 0.48 * (i / span - 0.5).abs() - 0.38 * (2.0 * PI * i / span).cos()
                    }
                    WindowKind::Blackman => {
                        (1.0 - alpha) / 2.0 - 0.5 * (2.0 * PI * i / span).cos()
                            + alpha / 2.0 * (4.0 * PI * i / span).cos()
                    }
                    WindowKind::Cosine => (PI * i / span - PI / 2.0).cos(),
                    WindowKind::Gauss => {
                        let x = (i - half) / (alpha * half);
                        (-0.5 * x * x).exp()
                    }
                    WindowKind::Hamming => 0.54 - 0.46 * (2.0 * PI * i / span).cos(),
                    WindowKind::Hann => 0.5 * (1.0 - (2.0 * PI * i / span).cos()),
                    WindowKind::Lanczos => {
                        let x = PI * (2.0 * i / span - 1.0);
                        if x.abs() < 1e-12 { 1.0 } else { x.sin() / x }
                    }
                    WindowKind::Rectangular => 1.0,
                    WindowKind::Triangular => 2.0 / n * (n / 2.0 - (i - half).abs()),
                };
                value as f32
            })
            .collect()
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowKind {
    type Err = SpectrogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let kind = match normalized.as_str() {
            "bartlett" => WindowKind::Bartlett,
            "bartlett_hann" | "bartletthann" => WindowKind::BartlettHann,
            "blackman" => WindowKind::Blackman,
            "cosine" => WindowKind::Cosine,
            "gauss" | "gaussian" => WindowKind::Gauss,
            "hamming" => WindowKind::Hamming,
            "hann" | "hanning" => WindowKind::Hann,
            "lanczos" | "lanczoz" => WindowKind::Lanczos,
            "rectangular" | "rect" => WindowKind::Rectangular,
            "triangular" => WindowKind::Triangular,
            _ => return Err(SpectrogramError::UnsupportedWindow(s.to_string())),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for WindowKind {
    type Error = SpectrogramError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct WindowKey {
    kind: WindowKind,
    alpha_bits: u32,
    len: usize,
}

/// Window tables keyed by `(size, kind, alpha)`. Entries are immutable and
/// shared out as `Arc<[f32]>`, so a cache is cheap to clone into a kernel.
#[derive(Debug, Default)]
pub struct WindowCache {
    entries: HashMap<WindowKey, Arc<[f32]>>,
}

impl WindowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, kind: WindowKind, alpha: Option<f32>, len: usize) -> Arc<[f32]> {
        if len == 0 {
            return Arc::from([]);
        }

        let alpha = kind.resolve_alpha(alpha);
        let key = WindowKey {
            kind,
            alpha_bits: alpha.map(canonical_f32_bits).unwrap_or(0),
            len,
        };
        Arc::clone(
            self.entries
                .entry(key)
                .or_insert_with(|| Arc::from(kind.coefficients(len, alpha))),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[inline]
fn canonical_f32_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        f32::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_is_symmetric_and_zero_at_edges() {
        let w = WindowKind::Hann.coefficients(64, None);
        assert!(w[0].abs() < 1e-7);
        assert!(w[63].abs() < 1e-7);
        for i in 0..32 {
            assert!((w[i] - w[63 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn blackman_alpha_defaults() {
        let implicit = WindowKind::Blackman.coefficients(32, None);
        let explicit = WindowKind::Blackman.coefficients(32, Some(DEFAULT_BLACKMAN_ALPHA));
        assert_eq!(implicit, explicit);
        let other = WindowKind::Blackman.coefficients(32, Some(0.5));
        assert_ne!(implicit, other);
    }

    #[test]
    fn every_window_is_finite() {
        for kind in WindowKind::ALL {
            for len in [1, 2, 7, 256] {
                let w = kind.coefficients(len, None);
                assert_eq!(w.len(), len);
                assert!(w.iter().all(|c| c.is_finite()), "{kind} len {len}");
            }
        }
    }

    #[test]
    fn parses_names_and_rejects_unknown() {
        assert_eq!("hann".parse::<WindowKind>().unwrap(), WindowKind::Hann);
        assert_eq!(
            "bartlettHann".parse::<WindowKind>().unwrap(),
            WindowKind::BartlettHann
        );
        assert!(matches!(
            "kaiser".parse::<WindowKind>(),
            Err(SpectrogramError::UnsupportedWindow(name)) if name == "kaiser"
        ));
    }

    #[test]
    fn deserializes_through_the_same_names() {
        let kind: WindowKind = serde_json::from_str(r#""hanning""#).unwrap();
        assert_eq!(kind, WindowKind::Hann);
        assert_eq!(serde_json::to_string(&WindowKind::BartlettHann).unwrap(), r#""bartlett_hann""#);
        let err = serde_json::from_str::<WindowKind>(r#""kaiser""#).unwrap_err();
        assert!(err.to_string().contains("no such window function 'kaiser'"));
    }

    #[test]
    fn cache_reuses_tables_per_key() {
        let mut cache = WindowCache::new();
        let a = cache.get(WindowKind::Gauss, None, 128);
        let b = cache.get(WindowKind::Gauss, Some(DEFAULT_GAUSS_ALPHA), 128);
        assert!(Arc::ptr_eq(&a, &b));
        let c = cache.get(WindowKind::Gauss, Some(0.4), 128);
        assert!(!Arc::ptr_eq(&a, &c));
        let _ = cache.get(WindowKind::Hann, Some(0.9), 128);
        let _ = cache.get(WindowKind::Hann, None, 128);
        assert_eq!(cache.len(), 3);
    }
}
