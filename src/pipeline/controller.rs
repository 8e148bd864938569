use super::mount::Mount;
use super::prerender::{PrerenderCache, PrerenderKey};
use super::{ActivePipeline, RenderConfig, SpectrogramPipeline, VariantKind, select_variant};
use crate::dsp::{DecodedAudio, Reconfigurable};
use crate::error::{Result, SpectrogramError};
use crate::render::compositor::PendingComposites;
use crate::render::surface::{self, SharedSurface, Surface};
use async_channel::{Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Every composite of `epoch` has landed on the mounted surface.
    Ready {
        variant: VariantKind,
        epoch: u64,
        width: usize,
        height: usize,
    },
    Swapped {
        from: Option<VariantKind>,
        to: VariantKind,
        derived_overlap_pct: u32,
    },
    SwapFailed {
        variant: VariantKind,
        reason: String,
    },
}

/// What the controller last rendered with.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub config: RenderConfig,
    pub display_width: usize,
    pub derived_overlap_pct: u32,
    pub variant: Option<VariantKind>,
    /// Bumped on every render; composites of older epochs are never shown.
    pub epoch: u64,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            config: RenderConfig::default(),
            display_width: 1,
            derived_overlap_pct: 0,
            variant: None,
            epoch: 0,
        }
    }
}

/// Owns the live variant and its mount point. At most one variant holds a
/// live surface at any time.
pub struct PipelineController {
    state: PipelineState,
    active: Option<ActivePipeline>,
    mount: Mount,
    pending: PendingComposites,
    prerendered: PrerenderCache,
    events: Sender<PipelineEvent>,
}

impl PipelineController {
    pub fn new() -> (Self, Receiver<PipelineEvent>) {
        let (events, receiver) = async_channel::unbounded();
        let controller = Self {
            state: PipelineState::default(),
            active: None,
            mount: Mount::new(),
            pending: PendingComposites::default(),
            prerendered: PrerenderCache::new(),
            events,
        };
        (controller, receiver)
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn variant(&self) -> Option<VariantKind> {
        self.active.as_ref().map(SpectrogramPipeline::kind)
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    pub fn surface(&self) -> Option<SharedSurface> {
        self.mount.surface()
    }

    pub fn set_display_width(&mut self, width: usize) {
        self.state.display_width = width;
    }

    /// Re-renders `audio` with the stored configuration and width.
    pub fn refresh(&mut self, audio: &DecodedAudio) -> Result<VariantKind> {
        let config = self.state.config.clone();
        self.render(audio, config, self.state.display_width)
    }

    /// Renders `audio`, swapping variants when the derived overlap crosses
    /// the threshold. On a failed swap the previous variant stays mounted
    /// and the error comes back as [`SpectrogramError::SwapFailure`].
    pub fn render(&mut self, audio: &DecodedAudio, config: RenderConfig, display_width: usize) -> Result<VariantKind> {
        let derived = config.derived_overlap_pct(audio.len(), display_width);
        let kind = select_variant(derived);

        let epoch = self.state.epoch + 1;
        match self.active.take() {
            Some(mut active) if active.kind() == kind => {
                let prepared = match active.prepare(audio, &config, display_width) {
                    Ok(prepared) => prepared,
                    Err(err) => {
                        self.active = Some(active);
                        return Err(err);
                    }
                };
                // Last write wins: anything still queued from the previous
                // epoch is dropped.
                self.pending.abandon();
                let (width, height) = prepared.surface_size();
                let target = match self.mount.surface() {
                    Some(target) => target,
                    None => self.mount.attach(kind, width, height),
                };
                let presented = active.present(prepared, &target);
                self.active = Some(active);
                self.pending = presented?;
            }
            previous => self.swap(previous, kind, derived, audio, &config, display_width)?,
        }

        self.state = PipelineState {
            config,
            display_width,
            derived_overlap_pct: derived,
            variant: Some(kind),
            epoch,
        };
        Ok(kind)
    }

    fn swap(
        &mut self,
        previous: Option<ActivePipeline>,
        kind: VariantKind,
        derived: u32,
        audio: &DecodedAudio,
        config: &RenderConfig,
        display_width: usize,
    ) -> Result<()> {
        let from = previous.as_ref().map(SpectrogramPipeline::kind);

        // The fallible half runs before anything is torn down.
        let built = ActivePipeline::build(kind).and_then(|mut next| {
            let prepared = next.prepare(audio, config, display_width)?;
            Ok((next, prepared))
        });
        let (next, prepared) = match (built, previous) {
            (Ok(built), previous) => {
                self.teardown(previous);
                built
            }
            (Err(err), Some(previous)) => {
                warn!("[pipeline] swap to {kind} failed, keeping {}: {err}", previous.kind());
                self.active = Some(previous);
                let _ = self.events.try_send(PipelineEvent::SwapFailed {
                    variant: kind,
                    reason: err.to_string(),
                });
                return Err(SpectrogramError::SwapFailure {
                    variant: kind,
                    source: Box::new(err),
                });
            }
            (Err(err), None) => return Err(err),
        };

        let (width, height) = prepared.surface_size();
        let target = self.mount.attach(kind, width, height);
        let presented = next.present(prepared, &target);
        self.active = Some(next);
        self.pending = presented?;

        match from {
            Some(from) => info!("[pipeline] swapped {from} -> {kind} (derived overlap {derived}%)"),
            None => info!("[pipeline] started {kind} (derived overlap {derived}%)"),
        }
        let _ = self.events.try_send(PipelineEvent::Swapped {
            from,
            to: kind,
            derived_overlap_pct: derived,
        });
        Ok(())
    }

    // Outstanding composites finish first, then the surface and its
    // subscription go, then the variant and its compositor thread.
    fn teardown(&mut self, previous: Option<ActivePipeline>) {
        let drawn = self.pending.drain();
        if let Some(variant) = self.mount.detach() {
            debug!("[pipeline] tore down {variant} after {drawn} composites");
        }
        drop(previous);
    }

    /// Waits for the current epoch's composites and announces the surface.
    pub fn wait_ready(&mut self) -> Option<Surface> {
        let variant = self.variant()?;
        let drawn = self.pending.drain();
        let snapshot = self.mount.snapshot()?;
        debug!("[pipeline] epoch {} ready, {drawn} composites", self.state.epoch);
        let _ = self.events.try_send(PipelineEvent::Ready {
            variant,
            epoch: self.state.epoch,
            width: snapshot.width(),
            height: snapshot.height(),
        });
        Some(snapshot)
    }

    /// Renders `audio` into the pre-render cache under `name` without
    /// touching the mounted surface.
    pub fn prerender(
        &mut self,
        name: &str,
        audio: &DecodedAudio,
        config: &RenderConfig,
        display_width: usize,
    ) -> Result<Arc<Surface>> {
        self.prerendered
            .get_or_render(PrerenderKey::new(name, config), audio, config, display_width)
    }

    /// Shows the cached rendering of `name` for the current fft size and
    /// window. Returns `false` when nothing is cached or nothing is mounted.
    pub fn apply_prerendered(&mut self, name: &str) -> bool {
        let key = PrerenderKey::new(name, &self.state.config);
        let (Some(cached), Some(target), Some(variant)) =
            (self.prerendered.get(&key), self.mount.surface(), self.variant())
        else {
            return false;
        };
        self.pending.abandon();
        let (width, height) = {
            let mut target = surface::lock(&target);
            target.blit(&cached);
            (target.width(), target.height())
        };
        debug!("[pipeline] applied prerendered {name}");
        let _ = self.events.try_send(PipelineEvent::Ready {
            variant,
            epoch: self.state.epoch,
            width,
            height,
        });
        true
    }
}

impl Reconfigurable<RenderConfig> for PipelineController {
    /// Takes effect on the next [`PipelineController::refresh`].
    fn update_config(&mut self, config: RenderConfig) {
        self.state.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::scale::FrequencyScale;
    use crate::util::audio::sine;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    fn tone(len: usize) -> DecodedAudio {
        DecodedAudio::mono(sine(1_000.0, 8_000.0, len), 8_000.0)
    }

    fn config(overlap_percent: Option<u8>) -> RenderConfig {
        RenderConfig {
            fft_size: 256,
            scale: FrequencyScale::Linear,
            overlap_percent,
            height: 64,
            ..RenderConfig::default()
        }
    }

    fn drain(events: &Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
        std::iter::from_fn(|| events.try_recv().ok()).collect()
    }

    #[test]
    fn first_render_mounts_selected_variant() {
        let (mut controller, events) = PipelineController::new();
        let audio = tone(16_000);
        let kind = controller.render(&audio, config(Some(75)), 100).unwrap();
        assert_eq!(kind, VariantKind::Reference);
        assert_eq!(controller.mount().live_surfaces(), 1);

        let surface = controller.wait_ready().unwrap();
        assert_eq!((surface.width(), surface.height()), (100, 64));
        let events = drain(&events);
        assert!(matches!(
            events[0],
            PipelineEvent::Swapped { from: None, to: VariantKind::Reference, derived_overlap_pct: 75 }
        ));
        assert!(matches!(events[1], PipelineEvent::Ready { epoch: 1, .. }));
    }

    #[test]
    fn alternating_reconfiguration_keeps_one_surface() {
        let (mut controller, events) = PipelineController::new();
        let audio = tone(16_000);
        let gauge = controller.mount().live_surface_gauge();
        let stop = Arc::new(AtomicBool::new(false));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let sampler = {
            let (gauge, stop, max_seen) = (Arc::clone(&gauge), Arc::clone(&stop), Arc::clone(&max_seen));
            thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    max_seen.fetch_max(gauge.load(Ordering::Acquire), Ordering::AcqRel);
                }
            })
        };

        for round in 0..20 {
            let overlap = if round % 2 == 0 { Some(10) } else { Some(80) };
            let kind = controller.render(&audio, config(overlap), 120).unwrap();
            let expected = if round % 2 == 0 {
                VariantKind::Optimized
            } else {
                VariantKind::Reference
            };
            assert_eq!(kind, expected);
            assert_eq!(controller.mount().live_surfaces(), 1);
            assert_eq!(controller.mount().live_subscriptions(), 1);
            assert_eq!(controller.mount().variant(), Some(expected));
        }
        stop.store(true, Ordering::Release);
        sampler.join().unwrap();
        assert!(max_seen.load(Ordering::Acquire) <= 1);

        let swaps = drain(&events)
            .into_iter()
            .filter(|e| matches!(e, PipelineEvent::Swapped { .. }))
            .count();
        assert_eq!(swaps, 20);
        assert_eq!(controller.state().epoch, 20);
    }

    #[test]
    fn failed_swap_keeps_previous_variant() {
        let (mut controller, events) = PipelineController::new();
        let audio = tone(16_000);
        controller.render(&audio, config(Some(75)), 100).unwrap();
        let before = controller.wait_ready().unwrap();
        drain(&events);

        // 10% selects the optimized variant, which then rejects the size.
        let bad = RenderConfig {
            fft_size: 300,
            ..config(Some(10))
        };
        let err = controller.render(&audio, bad, 100).unwrap_err();
        assert!(matches!(
            err,
            SpectrogramError::SwapFailure { variant: VariantKind::Optimized, .. }
        ));
        assert_eq!(controller.variant(), Some(VariantKind::Reference));
        assert_eq!(controller.mount().variant(), Some(VariantKind::Reference));
        assert_eq!(controller.mount().live_surfaces(), 1);
        assert_eq!(controller.state().config.fft_size, 256);
        assert_eq!(controller.mount().snapshot().unwrap(), before);
        assert!(matches!(drain(&events)[0], PipelineEvent::SwapFailed { .. }));
    }

    #[test]
    fn same_variant_rerenders_in_place() {
        let (mut controller, events) = PipelineController::new();
        let audio = tone(16_000);
        controller.render(&audio, config(Some(75)), 100).unwrap();
        controller.render(&audio, config(Some(60)), 80).unwrap();
        let surface = controller.wait_ready().unwrap();
        assert_eq!(surface.width(), 80);
        let swaps = drain(&events)
            .into_iter()
            .filter(|e| matches!(e, PipelineEvent::Swapped { .. }))
            .count();
        assert_eq!(swaps, 1);
    }

    #[test]
    fn invalid_config_without_live_variant_is_raised_directly() {
        let (mut controller, _events) = PipelineController::new();
        let err = controller
            .render(&tone(4_000), RenderConfig { fft_size: 300, ..config(None) }, 10)
            .unwrap_err();
        assert!(matches!(err, SpectrogramError::InvalidFrameSize(300)));
        assert_eq!(controller.mount().live_surfaces(), 0);
    }

    #[test]
    fn refresh_picks_up_updated_config() {
        let (mut controller, _events) = PipelineController::new();
        let audio = tone(16_000);
        controller.render(&audio, config(Some(75)), 100).unwrap();
        controller.update_config(config(Some(20)));
        assert_eq!(controller.refresh(&audio).unwrap(), VariantKind::Optimized);
        assert_eq!(controller.state().derived_overlap_pct, 20);
    }

    #[test]
    fn prerendered_surface_is_applied() {
        let (mut controller, events) = PipelineController::new();
        let audio = tone(16_000);
        assert!(!controller.apply_prerendered("a.wav"));

        let cfg = config(Some(75));
        let cached = controller.prerender("a.wav", &audio, &cfg, 100).unwrap();
        // Nothing mounted yet.
        assert!(!controller.apply_prerendered("a.wav"));

        controller.render(&audio, cfg, 100).unwrap();
        controller.wait_ready();
        drain(&events);
        assert!(controller.apply_prerendered("a.wav"));
        assert_eq!(controller.mount().snapshot().unwrap(), *cached);
        assert!(matches!(drain(&events)[0], PipelineEvent::Ready { .. }));
        assert!(!controller.apply_prerendered("b.wav"));
    }
}
