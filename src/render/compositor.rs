//! Asynchronous channel compositing.
//!
//! Each pipeline variant owns one compositor thread. Draw jobs are issued in
//! channel order; callers hold a [`PendingComposites`] for the jobs of one
//! render and must drain or abandon it before the target surface goes away.

use super::palette::ColorLut;
use super::surface::{self, Bitmap, SharedSurface};
use super::{RenderRegion, draw_channel};
use crate::error::{Result, SpectrogramError};
use async_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOutcome {
    Drawn,
    Abandoned,
    Failed,
}

struct CompositeJob {
    surface: SharedSurface,
    bitmap: Bitmap,
    region: RenderRegion,
    channel: usize,
    lut: Arc<ColorLut>,
    cancelled: Arc<AtomicBool>,
    done: Sender<CompositeOutcome>,
}

impl CompositeJob {
    fn run(self) {
        let outcome = {
            // Checked under the lock: a render that cancels and then clears
            // the surface must not see this job draw afterwards.
            let mut target = surface::lock(&self.surface);
            let band_end = self.region.height * (self.channel + 1);
            if self.cancelled.load(Ordering::Acquire) {
                CompositeOutcome::Abandoned
            } else if band_end > target.height() || target.width() == 0 {
                warn!(
                    "[compositor] channel {} does not fit a {}x{} surface",
                    self.channel,
                    target.width(),
                    target.height()
                );
                CompositeOutcome::Failed
            } else {
                draw_channel(&mut target, &self.bitmap, &self.region, self.channel, &self.lut);
                CompositeOutcome::Drawn
            }
        };
        let _ = self.done.try_send(outcome);
    }
}

/// Completion handles for the composites of one render.
#[derive(Debug)]
pub struct PendingComposites {
    handles: Vec<Receiver<CompositeOutcome>>,
    cancelled: Arc<AtomicBool>,
}

impl Default for PendingComposites {
    fn default() -> Self {
        Self {
            handles: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl PendingComposites {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Blocks until every issued composite has finished. Returns the number
    /// actually drawn.
    pub fn drain(&mut self) -> usize {
        self.handles
            .drain(..)
            .map(|handle| handle.recv_blocking().unwrap_or(CompositeOutcome::Abandoned))
            .filter(|outcome| *outcome == CompositeOutcome::Drawn)
            .count()
    }

    /// Marks every job not yet started as abandoned and forgets them.
    pub fn abandon(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.handles.clear();
    }
}

pub struct Compositor {
    jobs: Option<Sender<CompositeJob>>,
    thread: Option<JoinHandle<()>>,
}

impl Compositor {
    pub fn spawn(name: &str) -> Result<Self> {
        let (sender, receiver) = async_channel::unbounded::<CompositeJob>();
        let thread = thread::Builder::new()
            .name(format!("specview-compositor-{name}"))
            .spawn(move || {
                while let Ok(job) = receiver.recv_blocking() {
                    job.run();
                }
            })?;
        debug!("[compositor] {name} started");
        Ok(Self {
            jobs: Some(sender),
            thread: Some(thread),
        })
    }

    /// Issues one job per channel bitmap, in order.
    pub fn submit(
        &self,
        surface: &SharedSurface,
        bitmaps: Vec<Bitmap>,
        region: RenderRegion,
        lut: Arc<ColorLut>,
    ) -> Result<PendingComposites> {
        let jobs = self.jobs.as_ref().ok_or(SpectrogramError::WorkerUnavailable)?;
        let mut pending = PendingComposites::default();
        for (channel, bitmap) in bitmaps.into_iter().enumerate() {
            let (done, handle) = async_channel::bounded(1);
            let job = CompositeJob {
                surface: Arc::clone(surface),
                bitmap,
                region,
                channel,
                lut: Arc::clone(&lut),
                cancelled: Arc::clone(&pending.cancelled),
                done,
            };
            jobs.send_blocking(job)
                .map_err(|_| SpectrogramError::WorkerUnavailable)?;
            pending.handles.push(handle);
        }
        Ok(pending)
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("[compositor] thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::scale::FrequencyScale;
    use crate::render::palette::{NamedPalette, Palette};
    use crate::render::surface::Surface;

    fn region(height: usize) -> RenderRegion {
        RenderRegion {
            scale: FrequencyScale::Linear,
            frequency_min: 0.0,
            frequency_max: 4_000.0,
            sample_rate: 8_000.0,
            height,
        }
    }

    fn solid(color: [u8; 4]) -> Bitmap {
        let mut b = Bitmap::new(2, 2);
        b.fill(color);
        b
    }

    #[test]
    fn drains_in_channel_bands() {
        let lut = Arc::new(Palette::named(NamedPalette::Gray).lut());
        let compositor = Compositor::spawn("test").unwrap();
        let target = surface::share(Surface::new(2, 8));
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        let mut pending = compositor
            .submit(&target, vec![solid(red), solid(blue)], region(4), lut)
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.drain(), 2);
        assert!(pending.is_empty());

        let s = surface::lock(&target);
        assert_eq!(s.get(0, 0), red);
        assert_eq!(s.get(1, 3), red);
        assert_eq!(s.get(0, 4), blue);
        assert_eq!(s.get(1, 7), blue);
    }

    #[test]
    fn oversized_band_fails_without_drawing() {
        let lut = Arc::new(Palette::default().lut());
        let compositor = Compositor::spawn("test").unwrap();
        let target = surface::share(Surface::new(2, 4));
        let mut pending = compositor
            .submit(&target, vec![solid([1, 2, 3, 255]); 2], region(4), lut)
            .unwrap();
        assert_eq!(pending.drain(), 1);
    }

    #[test]
    fn abandoned_jobs_do_not_draw() {
        let lut = Arc::new(Palette::default().lut());
        let compositor = Compositor::spawn("test").unwrap();
        let target = surface::share(Surface::new(2, 2));

        // Hold the surface so the compositor cannot start before we cancel.
        let guard = surface::lock(&target);
        let mut first = compositor
            .submit(&target, vec![solid([9, 9, 9, 255])], region(2), Arc::clone(&lut))
            .unwrap();
        let mut second = compositor
            .submit(&target, vec![solid([7, 7, 7, 255])], region(2), lut)
            .unwrap();
        second.abandon();
        drop(guard);

        assert_eq!(first.drain(), 1);
        assert!(second.is_empty());
        drop(compositor);
        assert_eq!(surface::lock(&target).get(0, 0), [9, 9, 9, 255]);
    }

    #[test]
    fn job_waiting_on_the_lock_honours_a_later_cancel() {
        let lut = Arc::new(Palette::default().lut());
        let compositor = Compositor::spawn("test").unwrap();
        let target = surface::share(Surface::new(2, 2));

        let guard = surface::lock(&target);
        let mut pending = compositor
            .submit(&target, vec![solid([9, 9, 9, 255])], region(2), lut)
            .unwrap();
        // Let the compositor pick the job up and block on the surface.
        thread::sleep(std::time::Duration::from_millis(50));
        pending.cancelled.store(true, Ordering::Release);
        drop(guard);

        assert_eq!(pending.drain(), 0);
        assert_eq!(surface::lock(&target).get(0, 0), [0, 0, 0, 0]);
    }
}
