//! 256-entry colour maps and their byte lookup tables.

use super::roseus::ROSEUS;
use crate::error::{Result, SpectrogramError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const PALETTE_SIZE: usize = 256;

pub type Rgba = [f32; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum NamedPalette {
    /// Loud is dark.
    Gray,
    /// Loud is bright.
    Igray,
    #[default]
    Roseus,
}

impl NamedPalette {
    pub fn name(self) -> &'static str {
        match self {
            NamedPalette::Gray => "gray",
            NamedPalette::Igray => "igray",
            NamedPalette::Roseus => "roseus",
        }
    }

    pub fn colors(self) -> Vec<Rgba> {
        match self {
            NamedPalette::Gray => (0..PALETTE_SIZE)
                .map(|i| {
                    let v = (255 - i) as f32 / 256.0;
                    [v, v, v, 1.0]
                })
                .collect(),
            NamedPalette::Igray => (0..PALETTE_SIZE)
                .map(|i| {
                    let v = i as f32 / 256.0;
                    [v, v, v, 1.0]
                })
                .collect(),
            NamedPalette::Roseus => ROSEUS.iter().map(|&[r, g, b]| [r, g, b, 1.0]).collect(),
        }
    }
}

impl fmt::Display for NamedPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedPalette {
    type Err = SpectrogramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(NamedPalette::Gray),
            "igray" | "igrey" => Ok(NamedPalette::Igray),
            "roseus" => Ok(NamedPalette::Roseus),
            _ => Err(SpectrogramError::UnsupportedPalette(s.to_string())),
        }
    }
}

impl TryFrom<String> for NamedPalette {
    type Error = SpectrogramError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

/// A validated colour map: exactly 256 RGBA entries in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Arc<[Rgba]>,
}

impl Palette {
    pub fn named(name: NamedPalette) -> Self {
        Self {
            colors: Arc::from(name.colors()),
        }
    }

    pub fn from_colors(colors: Vec<Rgba>) -> Result<Self> {
        if colors.len() != PALETTE_SIZE {
            return Err(SpectrogramError::palette(format!(
                "expected {PALETTE_SIZE} entries, got {}",
                colors.len()
            )));
        }
        if let Some(idx) = colors
            .iter()
            .position(|c| c.iter().any(|v| !(0.0..=1.0).contains(v)))
        {
            return Err(SpectrogramError::palette(format!(
                "entry {idx} has a component outside [0, 1]"
            )));
        }
        Ok(Self {
            colors: Arc::from(colors),
        })
    }

    /// Validates untyped rows, e.g. a colour map read from JSON.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let mut colors = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let rgba: Rgba = row.as_slice().try_into().map_err(|_| {
                SpectrogramError::palette(format!(
                    "entry {idx} has {} components, expected 4",
                    row.len()
                ))
            })?;
            colors.push(rgba);
        }
        Self::from_colors(colors)
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Highest-intensity colour, used to fill space above Nyquist.
    pub fn last(&self) -> Rgba {
        self.colors[PALETTE_SIZE - 1]
    }

    pub fn lut(&self) -> ColorLut {
        ColorLut::new(self)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::named(NamedPalette::default())
    }
}

#[inline]
pub fn to_bytes(color: Rgba) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// 256 x 4 byte table; palette index to pixel bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLut {
    entries: Box<[[u8; 4]; PALETTE_SIZE]>,
}

impl ColorLut {
    pub fn new(palette: &Palette) -> Self {
        let mut entries = Box::new([[0u8; 4]; PALETTE_SIZE]);
        for (slot, &color) in entries.iter_mut().zip(palette.colors()) {
            *slot = to_bytes(color);
        }
        Self { entries }
    }

    #[inline(always)]
    pub fn get(&self, index: u8) -> [u8; 4] {
        self.entries[index as usize]
    }

    pub fn last(&self) -> [u8; 4] {
        self.entries[PALETTE_SIZE - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_palettes_have_256_entries() {
        for name in [NamedPalette::Gray, NamedPalette::Igray, NamedPalette::Roseus] {
            let palette = Palette::named(name);
            assert_eq!(palette.colors().len(), PALETTE_SIZE);
            assert!(palette.colors().iter().all(|c| c[3] == 1.0));
        }
    }

    #[test]
    fn gray_runs_light_to_dark() {
        let lut = Palette::named(NamedPalette::Gray).lut();
        assert_eq!(lut.get(0), [255, 255, 255, 255]);
        assert_eq!(lut.get(255), [0, 0, 0, 255]);
        let lut = Palette::named(NamedPalette::Igray).lut();
        assert_eq!(lut.get(0), [0, 0, 0, 255]);
        assert_eq!(lut.last(), [254, 254, 254, 255]);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Palette::from_colors(vec![[0.0, 0.0, 0.0, 1.0]; 255]).unwrap_err();
        assert!(matches!(err, SpectrogramError::InvalidPalette { .. }));
    }

    #[test]
    fn rejects_wrong_component_count() {
        let mut rows = vec![vec![0.0, 0.0, 0.0, 1.0]; 256];
        rows[17] = vec![0.0, 0.0, 0.0];
        let err = Palette::from_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("entry 17"));
        rows[17] = vec![0.5, 0.5, 0.5, 1.0];
        assert!(Palette::from_rows(&rows).is_ok());
    }

    #[test]
    fn rejects_out_of_range_components() {
        let mut colors = vec![[0.25, 0.5, 0.75, 1.0]; 256];
        colors[3] = [1.2, 0.0, 0.0, 1.0];
        let err = Palette::from_colors(colors.clone()).unwrap_err();
        assert!(err.to_string().contains("entry 3"));
        colors[3] = [0.0, -0.1, 0.0, 1.0];
        assert!(Palette::from_colors(colors.clone()).is_err());
        colors[3] = [0.0, 0.0, f32::NAN, 1.0];
        assert!(Palette::from_colors(colors.clone()).is_err());
        colors[3] = [1.0, 0.0, 0.0, 0.0];
        assert!(Palette::from_colors(colors).is_ok());
    }

    #[test]
    fn parses_names() {
        assert_eq!("roseus".parse::<NamedPalette>().unwrap(), NamedPalette::Roseus);
        assert!(matches!(
            "viridis".parse::<NamedPalette>(),
            Err(SpectrogramError::UnsupportedPalette(_))
        ));
    }
}
