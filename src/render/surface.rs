//! RGBA raster that channels are composited onto.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type Pixel = [u8; 4];

/// Row-major RGBA pixels, `width * height` of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

/// An intermediate image produced from a pixel matrix before it is drawn.
pub type Bitmap = Surface;

/// A surface that a compositor thread draws into.
pub type SharedSurface = Arc<Mutex<Surface>>;

pub fn share(surface: Surface) -> SharedSurface {
    Arc::new(Mutex::new(surface))
}

/// Locks a shared surface, recovering the data if a drawing thread panicked.
pub fn lock(surface: &SharedSurface) -> MutexGuard<'_, Surface> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Resizes and clears to transparent.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, [0, 0, 0, 0]);
    }

    pub fn get(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.pixels[y * self.width + x] = pixel;
    }

    pub fn row(&self, y: usize) -> &[Pixel] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn fill(&mut self, pixel: Pixel) {
        self.pixels.fill(pixel);
    }

    /// Fills the intersection of the rectangle with the surface.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, pixel: Pixel) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for row in y.min(y_end)..y_end {
            let start = row * self.width;
            self.pixels[start + x.min(x_end)..start + x_end].fill(pixel);
        }
    }

    /// Nearest-neighbour stretch of `src` rows `src_y..src_y + src_height`
    /// across the full surface width and the rows whose centres fall in
    /// `[dst_y, dst_y + dst_height)`.
    pub fn draw_scaled(&mut self, src: &Surface, src_y: usize, src_height: usize, dst_y: f64, dst_height: f64) {
        let src_end = (src_y + src_height).min(src.height);
        if src.width == 0 || src_y >= src_end || self.width == 0 || dst_height <= 0.0 {
            return;
        }
        let src_rows = src_end - src_y;
        let dst_end = dst_y + dst_height;
        let first = dst_y.floor().max(0.0) as usize;
        let last = (dst_end.ceil().max(0.0) as usize).min(self.height);
        let x_step = src.width as f64 / self.width as f64;

        for y in first..last {
            let centre = y as f64 + 0.5;
            if centre < dst_y || centre >= dst_end {
                continue;
            }
            let offset = ((centre - dst_y) / dst_height * src_rows as f64) as usize;
            let src_row = src.row(src_y + offset.min(src_rows - 1));
            let start = y * self.width;
            for (x, dst) in self.pixels[start..start + self.width].iter_mut().enumerate() {
                let sx = (((x as f64 + 0.5) * x_step) as usize).min(src.width - 1);
                *dst = src_row[sx];
            }
        }
    }

    /// Copies `other` over this surface, adopting its dimensions.
    pub fn blit(&mut self, other: &Surface) {
        self.width = other.width;
        self.height = other.height;
        self.pixels.clear();
        self.pixels.extend_from_slice(&other.pixels);
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Packed RGB, dropping alpha.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| [p[0], p[1], p[2]]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Pixel = [255, 0, 0, 255];
    const BLUE: Pixel = [0, 0, 255, 255];

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut s = Surface::new(4, 4);
        s.fill_rect(2, 3, 10, 10, RED);
        assert_eq!(s.get(2, 3), RED);
        assert_eq!(s.get(3, 3), RED);
        assert_eq!(s.get(1, 3), [0, 0, 0, 0]);
        assert_eq!(s.get(3, 2), [0, 0, 0, 0]);
        s.fill_rect(9, 9, 1, 1, BLUE);
    }

    #[test]
    fn draw_scaled_stretches_rows() {
        let mut src = Surface::new(2, 2);
        src.set(0, 0, RED);
        src.set(1, 0, RED);
        src.set(0, 1, BLUE);
        src.set(1, 1, BLUE);

        let mut dst = Surface::new(4, 8);
        dst.draw_scaled(&src, 0, 2, 0.0, 8.0);
        assert!(dst.row(0).iter().all(|p| *p == RED));
        assert!(dst.row(3).iter().all(|p| *p == RED));
        assert!(dst.row(4).iter().all(|p| *p == BLUE));
        assert!(dst.row(7).iter().all(|p| *p == BLUE));
    }

    #[test]
    fn draw_scaled_respects_destination_window() {
        let mut src = Surface::new(1, 1);
        src.set(0, 0, RED);
        let mut dst = Surface::new(1, 10);
        dst.draw_scaled(&src, 0, 1, 4.0, 2.0);
        assert_eq!(dst.get(0, 3), [0, 0, 0, 0]);
        assert_eq!(dst.get(0, 4), RED);
        assert_eq!(dst.get(0, 5), RED);
        assert_eq!(dst.get(0, 6), [0, 0, 0, 0]);
    }

    #[test]
    fn byte_views_match_pixels() {
        let mut s = Surface::new(2, 1);
        s.fill(BLUE);
        assert_eq!(s.as_bytes(), &[0, 0, 255, 255, 0, 0, 255, 255]);
        assert_eq!(s.rgb_bytes(), vec![0, 0, 255, 0, 0, 255]);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let shared = share(Surface::new(1, 1));
        let clone = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert_eq!(lock(&shared).width(), 1);
    }
}
