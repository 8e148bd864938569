pub mod compositor;
pub mod labels;
pub mod palette;
mod roseus;
pub mod surface;

use crate::dsp::PixelMatrix;
use crate::dsp::scale::FrequencyScale;
use crate::util::audio::nyquist;
use palette::ColorLut;
use surface::{Bitmap, Surface};

/// Frequency window and per-channel band height for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRegion {
    pub scale: FrequencyScale,
    pub frequency_min: f32,
    pub frequency_max: f32,
    pub sample_rate: f32,
    /// Height of one channel band in pixels.
    pub height: usize,
}

impl RenderRegion {
    pub fn nyquist(&self) -> f32 {
        nyquist(self.sample_rate)
    }

    /// True when part of the band lies above Nyquist and needs a fill.
    pub fn exceeds_nyquist(&self) -> bool {
        self.frequency_max > self.nyquist()
    }
}

/// Source rows to lift out of a bitmap and where they land in a channel band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    pub src_y: usize,
    pub src_height: usize,
    /// Destination top edge relative to the surface, not the band.
    pub dst_y: f64,
    pub dst_height: f64,
}

impl CropPlan {
    /// Crop for channel `channel` of a `bitmap_height`-row bitmap. Bitmap
    /// row 0 is the highest frequency (Nyquist).
    pub fn new(region: &RenderRegion, bitmap_height: usize, channel: usize) -> Self {
        let nyquist = f64::from(region.nyquist());
        let r_min = region.scale.ratio(f64::from(region.frequency_min), nyquist);
        let r_max = region.scale.ratio(f64::from(region.frequency_max), nyquist);
        let r_max_clamped = r_max.min(1.0);
        let bh = bitmap_height as f64;
        let band = region.height as f64;

        let src_y = (bh * (1.0 - r_max_clamped)).round().max(0.0) as usize;
        let src_height = (bh * (r_max_clamped - r_min)).round().max(0.0) as usize;
        let visible = if r_max > 0.0 { r_max_clamped / r_max } else { 0.0 };

        Self {
            src_y: src_y.min(bitmap_height),
            src_height: src_height.min(bitmap_height - src_y.min(bitmap_height)),
            dst_y: band * (channel as f64 + 1.0 - visible),
            dst_height: band * visible,
        }
    }
}

/// Expands palette indices into pixels. Column `x` of the bitmap is row `x`
/// of the matrix; the lowest bin ends up on the bottom row.
pub fn bitmap(matrix: &PixelMatrix, lut: &ColorLut) -> Bitmap {
    let width = matrix.len();
    let height = matrix.bins();
    let mut out = Bitmap::new(width, height);
    for (x, column) in matrix.iter().enumerate().take(width) {
        for (bin, &index) in column.iter().enumerate() {
            out.set(x, height - 1 - bin, lut.get(index));
        }
    }
    out
}

/// Draws one channel band onto `surface`: the above-Nyquist fill first,
/// then the cropped bitmap stretched over the band.
pub fn draw_channel(
    surface: &mut Surface,
    bitmap: &Bitmap,
    region: &RenderRegion,
    channel: usize,
    lut: &ColorLut,
) {
    let band_top = region.height * channel;
    if region.exceeds_nyquist() {
        surface.fill_rect(0, band_top, surface.width(), region.height, lut.last());
    }
    let plan = CropPlan::new(region, bitmap.height(), channel);
    surface.draw_scaled(bitmap, plan.src_y, plan.src_height, plan.dst_y, plan.dst_height);
}

/// Synchronous render of every channel, in channel order.
pub fn draw_channels(
    surface: &mut Surface,
    pixels: &[PixelMatrix],
    region: &RenderRegion,
    lut: &ColorLut,
) {
    for (channel, matrix) in pixels.iter().enumerate() {
        let bitmap = bitmap(matrix, lut);
        draw_channel(surface, &bitmap, region, channel, lut);
    }
}
