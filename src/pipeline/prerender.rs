//! Finished surfaces computed off the interactive path, keyed by source
//! name and the transform settings they were drawn with.

use super::RenderConfig;
use crate::dsp::DecodedAudio;
use crate::dsp::fft::RealFftCache;
use crate::dsp::framer::{BankMode, Framer};
use crate::dsp::resample::ResampleCache;
use crate::dsp::window::WindowKind;
use crate::error::Result;
use crate::render::draw_channels;
use crate::render::surface::Surface;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrerenderKey {
    pub name: String,
    pub fft_size: usize,
    pub window: WindowKind,
}

impl PrerenderKey {
    pub fn new(name: impl Into<String>, config: &RenderConfig) -> Self {
        Self {
            name: name.into(),
            fft_size: config.fft_size,
            window: config.window,
        }
    }
}

pub struct PrerenderCache {
    entries: HashMap<PrerenderKey, Arc<Surface>>,
    framer: Framer<RealFftCache>,
    resampler: ResampleCache,
}

impl Default for PrerenderCache {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            framer: Framer::new(RealFftCache::new(), BankMode::Sparse),
            resampler: ResampleCache::new(),
        }
    }
}

impl PrerenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PrerenderKey) -> Option<Arc<Surface>> {
        self.entries.get(key).cloned()
    }

    /// Returns the cached surface for `key`, rendering it first on a miss.
    pub fn get_or_render(
        &mut self,
        key: PrerenderKey,
        audio: &DecodedAudio,
        config: &RenderConfig,
        display_width: usize,
    ) -> Result<Arc<Surface>> {
        if let Some(surface) = self.entries.get(&key) {
            debug!("[pipeline] prerender hit for {}", key.name);
            return Ok(Arc::clone(surface));
        }
        debug!("[pipeline] prerender miss for {}", key.name);

        config.validate(display_width)?;
        let frames = self
            .framer
            .analyze(audio, &config.analysis_params(display_width))?;
        let pixels: Vec<_> = frames
            .iter()
            .map(|m| self.resampler.resample(m, display_width))
            .collect();
        let lut = config.palette.lut();
        let mut surface = Surface::new(display_width, config.height * pixels.len().max(1));
        draw_channels(&mut surface, &pixels, &config.region(audio.sample_rate()), &lut);

        let surface = Arc::new(surface);
        self.entries.insert(key, Arc::clone(&surface));
        Ok(surface)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
