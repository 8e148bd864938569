use super::{RenderConfig, VariantKind};
use crate::dsp::fft::{KernelCache, RadixCache, RealFftCache};
use crate::dsp::framer::{AnalysisParams, BankMode, Framer};
use crate::dsp::resample::ResampleCache;
use crate::dsp::{DecodedAudio, FrameMatrix, OverlapPolicy, PixelMatrix};
use crate::error::Result;
use crate::render::compositor::{Compositor, PendingComposites};
use crate::render::palette::{ColorLut, Palette};
use crate::render::surface::{self, Bitmap, SharedSurface};
use crate::render::{self as raster, RenderRegion};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Everything a render needs except the surface it lands on.
#[derive(Debug, Clone)]
pub struct PreparedRender {
    pub pixels: Vec<PixelMatrix>,
    pub bitmaps: Vec<Bitmap>,
    pub region: RenderRegion,
    pub lut: Arc<ColorLut>,
    pub width: usize,
}

impl PreparedRender {
    /// `width x height * channels`.
    pub fn surface_size(&self) -> (usize, usize) {
        (self.width, self.region.height * self.pixels.len().max(1))
    }
}

pub trait SpectrogramPipeline {
    fn kind(&self) -> VariantKind;

    /// Frames resampled to `display_width` columns, one matrix per channel.
    fn compute(&mut self, audio: &DecodedAudio, config: &RenderConfig, display_width: usize) -> Result<Vec<PixelMatrix>>;

    /// Computes and colours every channel without touching any surface.
    fn prepare(&mut self, audio: &DecodedAudio, config: &RenderConfig, display_width: usize) -> Result<PreparedRender>;

    /// Issues the channel composites onto `surface` in channel order.
    fn present(&self, prepared: PreparedRender, surface: &SharedSurface) -> Result<PendingComposites>;
}

/// Identifies a signal by content so cached frames survive palette and
/// zoom-only changes without holding on to the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SignalKey {
    len: usize,
    channels: usize,
    sample_rate_bits: u32,
    digest: u64,
}

impl SignalKey {
    fn of(audio: &DecodedAudio) -> Self {
        let mut hasher = DefaultHasher::new();
        for channel in 0..audio.channel_count() {
            if let Some(samples) = audio.channel(channel) {
                bytemuck::cast_slice::<f32, u8>(samples).hash(&mut hasher);
            }
        }
        Self {
            len: audio.len(),
            channels: audio.channel_count(),
            sample_rate_bits: audio.sample_rate().to_bits(),
            digest: hasher.finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FrameKey {
    params: AnalysisParams,
    signal: SignalKey,
}

impl FrameKey {
    // Auto overlap depends on the display width only through the hop, so
    // key on the resolved hop instead of the width.
    fn new(audio: &DecodedAudio, params: &AnalysisParams) -> Self {
        let mut params = *params;
        let hop = params.transform.hop(audio.len(), params.display_width);
        params.transform.overlap = OverlapPolicy::Samples(params.transform.size.saturating_sub(hop));
        params.display_width = 0;
        Self {
            params,
            signal: SignalKey::of(audio),
        }
    }
}

/// One pipeline instance with its own caches and compositor thread.
pub struct Variant<K> {
    kind: VariantKind,
    framer: Framer<K>,
    resampler: ResampleCache,
    frames: Option<(FrameKey, Arc<Vec<FrameMatrix>>)>,
    cache_lut: bool,
    lut: Option<(Palette, Arc<ColorLut>)>,
    compositor: Compositor,
}

pub type ReferencePipeline = Variant<RadixCache>;
pub type OptimizedPipeline = Variant<RealFftCache>;

impl Variant<RadixCache> {
    pub fn reference() -> Result<Self> {
        Self::new(VariantKind::Reference, RadixCache::new(), BankMode::Dense, false)
    }
}

impl Variant<RealFftCache> {
    pub fn optimized() -> Result<Self> {
        Self::new(VariantKind::Optimized, RealFftCache::new(), BankMode::Sparse, true)
    }
}

impl<K: KernelCache> Variant<K> {
    fn new(kind: VariantKind, kernels: K, bank_mode: BankMode, cache_lut: bool) -> Result<Self> {
        Ok(Self {
            kind,
            framer: Framer::new(kernels, bank_mode),
            resampler: ResampleCache::new(),
            frames: None,
            cache_lut,
            lut: None,
            compositor: Compositor::spawn(kind.name())?,
        })
    }

    fn frames(&mut self, audio: &DecodedAudio, params: &AnalysisParams) -> Result<Arc<Vec<FrameMatrix>>> {
        let key = FrameKey::new(audio, params);
        if let Some((cached, frames)) = &self.frames
            && *cached == key
        {
            debug!("[pipeline] {} reusing frames", self.kind);
            return Ok(Arc::clone(frames));
        }
        let frames = Arc::new(self.framer.analyze(audio, params)?);
        self.frames = Some((key, Arc::clone(&frames)));
        Ok(frames)
    }

    fn lut(&mut self, palette: &Palette) -> Arc<ColorLut> {
        if !self.cache_lut {
            return Arc::new(palette.lut());
        }
        match &self.lut {
            Some((cached, lut)) if cached == palette => Arc::clone(lut),
            _ => {
                let lut = Arc::new(palette.lut());
                self.lut = Some((palette.clone(), Arc::clone(&lut)));
                lut
            }
        }
    }

    pub fn resampler(&self) -> &ResampleCache {
        &self.resampler
    }
}

impl<K: KernelCache> SpectrogramPipeline for Variant<K> {
    fn kind(&self) -> VariantKind {
        self.kind
    }

    fn compute(&mut self, audio: &DecodedAudio, config: &RenderConfig, display_width: usize) -> Result<Vec<PixelMatrix>> {
        config.validate(display_width)?;
        let params = config.analysis_params(display_width);
        let frames = self.frames(audio, &params)?;
        Ok(frames
            .iter()
            .map(|matrix| self.resampler.resample(matrix, display_width))
            .collect())
    }

    fn prepare(&mut self, audio: &DecodedAudio, config: &RenderConfig, display_width: usize) -> Result<PreparedRender> {
        let pixels = self.compute(audio, config, display_width)?;
        let lut = self.lut(&config.palette);
        let bitmaps = pixels.iter().map(|m| raster::bitmap(m, &lut)).collect();
        Ok(PreparedRender {
            pixels,
            bitmaps,
            region: config.region(audio.sample_rate()),
            lut,
            width: display_width,
        })
    }

    fn present(&self, prepared: PreparedRender, surface: &SharedSurface) -> Result<PendingComposites> {
        let (width, height) = prepared.surface_size();
        {
            let mut target = surface::lock(surface);
            if target.width() != width || target.height() != height {
                target.resize(width, height);
            } else {
                target.fill([0, 0, 0, 0]);
            }
        }
        self.compositor
            .submit(surface, prepared.bitmaps, prepared.region, prepared.lut)
    }
}

/// The live variant, resolved once per configuration epoch.
pub enum ActivePipeline {
    Reference(ReferencePipeline),
    Optimized(OptimizedPipeline),
}

impl ActivePipeline {
    pub fn build(kind: VariantKind) -> Result<Self> {
        Ok(match kind {
            VariantKind::Reference => ActivePipeline::Reference(Variant::reference()?),
            VariantKind::Optimized => ActivePipeline::Optimized(Variant::optimized()?),
        })
    }
}

impl SpectrogramPipeline for ActivePipeline {
    fn kind(&self) -> VariantKind {
        match self {
            ActivePipeline::Reference(v) => v.kind(),
            ActivePipeline::Optimized(v) => v.kind(),
        }
    }

    fn compute(&mut self, audio: &DecodedAudio, config: &RenderConfig, display_width: usize) -> Result<Vec<PixelMatrix>> {
        match self {
            ActivePipeline::Reference(v) => v.compute(audio, config, display_width),
            ActivePipeline::Optimized(v) => v.compute(audio, config, display_width),
        }
    }

    fn prepare(&mut self, audio: &DecodedAudio, config: &RenderConfig, display_width: usize) -> Result<PreparedRender> {
        match self {
            ActivePipeline::Reference(v) => v.prepare(audio, config, display_width),
            ActivePipeline::Optimized(v) => v.prepare(audio, config, display_width),
        }
    }

    fn present(&self, prepared: PreparedRender, surface: &SharedSurface) -> Result<PendingComposites> {
        match self {
            ActivePipeline::Reference(v) => v.present(prepared, surface),
            ActivePipeline::Optimized(v) => v.present(prepared, surface),
        }
    }
}
