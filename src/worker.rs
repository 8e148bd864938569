//! Background first-paint renderer.
//!
//! The worker owns its surface outright (handed over once with
//! [`WorkerMessage::Init`]) and runs its own framer, quantizer and resampler
//! with private caches. Only control messages and the finished surface cross
//! the thread boundary.

use crate::dsp::fft::RadixCache;
use crate::dsp::framer::{AnalysisParams, BankMode, Framer, frame_count};
use crate::dsp::quantize::IntensityMap;
use crate::dsp::resample::ResampleCache;
use crate::dsp::scale::FrequencyScale;
use crate::dsp::window::WindowKind;
use crate::dsp::{DecodedAudio, OverlapPolicy, TransformConfig};
use crate::error::{Result, SpectrogramError};
use crate::render::palette::{ColorLut, Palette};
use crate::render::surface::Surface;
use crate::render::{RenderRegion, draw_channels};
use async_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum WorkerMessage {
    /// One-time transfer of the drawing surface.
    Init { surface: Surface },
    Render {
        signal: Vec<f32>,
        sample_rate: f32,
        fft_size: usize,
        overlap_percent: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerResponse {
    Rendered,
    Failed(String),
}

/// `max(1, floor(fft * (1 - pct / 100)))`.
pub fn worker_hop(fft_size: usize, overlap_percent: u8) -> usize {
    let keep = 100usize.saturating_sub(overlap_percent as usize);
    (fft_size * keep / 100).max(1)
}

struct WorkerState {
    surface: Option<Surface>,
    framer: Framer<RadixCache>,
    resampler: ResampleCache,
    lut: ColorLut,
    intensity: IntensityMap,
}

impl WorkerState {
    fn render(&mut self, signal: Vec<f32>, sample_rate: f32, fft_size: usize, overlap_percent: u8) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(SpectrogramError::WorkerUnavailable);
        };
        let hop = worker_hop(fft_size, overlap_percent);
        let frames = frame_count(signal.len(), fft_size, hop);
        let width = if surface.width() == 0 { frames } else { surface.width() };
        let height = fft_size / 2;

        let params = AnalysisParams {
            transform: TransformConfig {
                size: fft_size,
                window: WindowKind::Hann,
                window_alpha: None,
                overlap: OverlapPolicy::Samples(fft_size.saturating_sub(hop)),
            },
            scale: FrequencyScale::Linear,
            num_filters: None,
            intensity: self.intensity,
            split_channels: false,
            display_width: width,
        };
        let audio = DecodedAudio::mono(signal, sample_rate);
        let matrices = self.framer.analyze(&audio, &params)?;
        let pixels: Vec<_> = matrices
            .iter()
            .map(|m| self.resampler.resample(m, width))
            .collect();

        surface.resize(width, height);
        let region = RenderRegion {
            scale: FrequencyScale::Linear,
            frequency_min: 0.0,
            frequency_max: audio.nyquist(),
            sample_rate,
            height,
        };
        draw_channels(surface, &pixels, &region, &self.lut);
        debug!("[worker] rendered {frames} frames into {width}x{height}");
        Ok(())
    }
}

fn run(state: &mut WorkerState, messages: Receiver<WorkerMessage>, responses: Sender<WorkerResponse>) {
    while let Ok(message) = messages.recv_blocking() {
        match message {
            WorkerMessage::Init { surface } => {
                if state.surface.is_some() {
                    warn!("[worker] surface already transferred; ignoring second init");
                    continue;
                }
                state.surface = Some(surface);
            }
            WorkerMessage::Render {
                signal,
                sample_rate,
                fft_size,
                overlap_percent,
            } => {
                let response = match state.render(signal, sample_rate, fft_size, overlap_percent) {
                    Ok(()) => WorkerResponse::Rendered,
                    Err(err) => {
                        warn!("[worker] render failed: {err}");
                        WorkerResponse::Failed(err.to_string())
                    }
                };
                if responses.send_blocking(response).is_err() {
                    break;
                }
            }
        }
    }
}

/// Handle to the worker thread. Dropping the handle stops the worker.
pub struct Worker {
    messages: Sender<WorkerMessage>,
    responses: Receiver<WorkerResponse>,
    thread: JoinHandle<Option<Surface>>,
}

impl Worker {
    pub fn spawn(palette: &Palette, intensity: IntensityMap) -> Result<Self> {
        let (messages, inbox) = async_channel::unbounded();
        let (outbox, responses) = async_channel::unbounded();
        let mut state = WorkerState {
            surface: None,
            framer: Framer::new(RadixCache::new(), BankMode::Dense),
            resampler: ResampleCache::new(),
            lut: palette.lut(),
            intensity,
        };
        let thread = thread::Builder::new()
            .name("specview-worker".into())
            .spawn(move || {
                info!("[worker] started");
                run(&mut state, inbox, outbox);
                info!("[worker] stopped");
                state.surface
            })?;
        Ok(Self {
            messages,
            responses,
            thread,
        })
    }

    pub fn init(&self, surface: Surface) -> Result<()> {
        self.send(WorkerMessage::Init { surface })
    }

    /// Queues a render; never blocks on the render itself.
    pub fn render(&self, signal: Vec<f32>, sample_rate: f32, fft_size: usize, overlap_percent: u8) -> Result<()> {
        self.send(WorkerMessage::Render {
            signal,
            sample_rate,
            fft_size,
            overlap_percent,
        })
    }

    fn send(&self, message: WorkerMessage) -> Result<()> {
        self.messages
            .try_send(message)
            .map_err(|_| SpectrogramError::WorkerUnavailable)
    }

    pub fn responses(&self) -> &Receiver<WorkerResponse> {
        &self.responses
    }

    /// Blocks for the next response.
    pub fn wait(&self) -> Result<WorkerResponse> {
        self.responses
            .recv_blocking()
            .map_err(|_| SpectrogramError::WorkerUnavailable)
    }

    /// Stops the worker and hands the surface back.
    pub fn shutdown(self) -> Result<Option<Surface>> {
        self.messages.close();
        self.thread
            .join()
            .map_err(|_| SpectrogramError::WorkerUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::NamedPalette;
    use crate::util::audio::sine;

    #[test]
    fn hop_floors_and_never_hits_zero() {
        assert_eq!(worker_hop(1024, 50), 512);
        assert_eq!(worker_hop(32, 33), 21);
        assert_eq!(worker_hop(16, 99), 1);
        assert_eq!(worker_hop(16, 100), 1);
    }

    #[test]
    fn renders_into_transferred_surface() {
        let worker = Worker::spawn(&Palette::named(NamedPalette::Gray), IntensityMap::default()).unwrap();
        worker.init(Surface::new(64, 1)).unwrap();
        worker.render(sine(1_000.0, 8_000.0, 8_000), 8_000.0, 256, 50).unwrap();
        assert_eq!(worker.wait().unwrap(), WorkerResponse::Rendered);

        let surface = worker.shutdown().unwrap().unwrap();
        assert_eq!((surface.width(), surface.height()), (64, 128));
        // 1 kHz is bin 32 of 128, drawn on row 127 - 32.
        let lut = Palette::named(NamedPalette::Gray).lut();
        assert_eq!(surface.get(10, 95), lut.get(255));
        assert_eq!(surface.get(10, 10), lut.get(0));
    }

    #[test]
    fn zero_width_surface_takes_frame_count() {
        let worker = Worker::spawn(&Palette::default(), IntensityMap::default()).unwrap();
        worker.init(Surface::new(0, 0)).unwrap();
        worker.render(vec![0.1; 4_096], 8_000.0, 512, 75).unwrap();
        assert_eq!(worker.wait().unwrap(), WorkerResponse::Rendered);
        let surface = worker.shutdown().unwrap().unwrap();
        assert_eq!(surface.width(), frame_count(4_096, 512, 128));
        assert_eq!(surface.height(), 256);
    }

    #[test]
    fn render_before_init_fails() {
        let worker = Worker::spawn(&Palette::default(), IntensityMap::default()).unwrap();
        worker.render(vec![0.0; 1_024], 8_000.0, 256, 0).unwrap();
        assert!(matches!(worker.wait().unwrap(), WorkerResponse::Failed(_)));
        assert_eq!(worker.shutdown().unwrap(), None);
    }

    #[test]
    fn invalid_size_is_reported() {
        let worker = Worker::spawn(&Palette::default(), IntensityMap::default()).unwrap();
        worker.init(Surface::new(8, 8)).unwrap();
        worker.render(vec![0.0; 1_024], 8_000.0, 100, 0).unwrap();
        assert!(matches!(worker.wait().unwrap(), WorkerResponse::Failed(_)));
    }
}
