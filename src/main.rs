mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{BenchArgs, Cli, Command, RenderArgs};
use specview::dsp::benchmark;
use specview::render::labels;
use specview::render::surface::Surface;
use specview::settings::{SettingsStore, SpectrogramSettings, validate_fft_samples};
use specview::util::audio::sine_sweep;
use specview::util::telemetry;
use specview::worker::{Worker, WorkerResponse};
use specview::{DecodedAudio, PipelineController};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match cli.command {
        Command::Render(args) => render(args),
        Command::Bench(args) => bench(args),
    }
}

fn load_audio(args: &RenderArgs) -> Result<DecodedAudio> {
    if args.sweep {
        let len = args.sample_rate as usize;
        let samples = sine_sweep(100.0, args.sample_rate * 0.5, args.sample_rate, len);
        return Ok(DecodedAudio::mono(samples, args.sample_rate));
    }
    let Some(path) = &args.input else {
        bail!("no input file given (pass a path or --sweep)");
    };
    let bytes = fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
    let channel_count = args.channels.max(1);
    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let mut channels = vec![Vec::with_capacity(samples.len() / channel_count); channel_count];
    for frame in samples.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    Ok(DecodedAudio::new(channels, args.sample_rate))
}

fn load_settings(args: &RenderArgs) -> Result<SpectrogramSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            SettingsStore::load_strict(path)
                .with_context(|| format!("failed to load settings from {path:?}"))?
                .data
        }
        None => SettingsStore::load_or_default().data,
    };
    if let Some(fft) = args.fft {
        validate_fft_samples(fft).with_context(|| format!("invalid --fft {fft}"))?;
        settings.fft_samples = fft;
    }
    Ok(settings)
}

fn write_ppm(path: &Path, surface: &Surface) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {path:?}"))?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", surface.width(), surface.height())?;
    out.write_all(&surface.rgb_bytes())?;
    out.flush()?;
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let audio = load_audio(&args)?;
    let settings = load_settings(&args)?;
    let config = settings
        .to_render_config(audio.sample_rate())
        .context("invalid settings")?;

    let preview = match &args.preview {
        Some(_) => {
            let worker = Worker::spawn(&config.palette, config.intensity)?;
            worker.init(Surface::new(args.width, 0))?;
            let signal = audio.channel(0).map(<[f32]>::to_vec).unwrap_or_default();
            let overlap = config.preview_overlap_percent(audio.len(), args.width);
            worker.render(signal, audio.sample_rate(), config.fft_size, overlap)?;
            Some(worker)
        }
        None => None,
    };

    let (mut controller, _events) = PipelineController::new();
    let variant = controller
        .render(&audio, config, args.width)
        .context("render failed")?;
    let surface = controller
        .wait_ready()
        .context("no surface was mounted")?;
    write_ppm(&args.output, &surface)?;
    let state = controller.state();
    let region = state.config.region(audio.sample_rate());
    for tick in labels::frequency_ticks(
        region.scale,
        f64::from(region.frequency_min),
        f64::from(region.frequency_max),
        region.height,
    ) {
        debug!("[render] axis {} at y={:.0}", tick.label, tick.y);
    }
    info!(
        "[render] {} variant, derived overlap {}%, {}x{} -> {:?}",
        variant,
        controller.state().derived_overlap_pct,
        surface.width(),
        surface.height(),
        args.output
    );

    if let (Some(worker), Some(path)) = (preview, &args.preview) {
        match worker.wait()? {
            WorkerResponse::Rendered => {}
            WorkerResponse::Failed(reason) => bail!("preview failed: {reason}"),
        }
        if let Some(surface) = worker.shutdown()? {
            write_ppm(path, &surface)?;
            info!("[render] preview {}x{} -> {path:?}", surface.width(), surface.height());
        }
    }
    Ok(())
}

fn bench(args: BenchArgs) -> Result<()> {
    for size in args.sizes {
        let report = benchmark::compare(size, args.iterations)
            .with_context(|| format!("benchmark failed for size {size}"))?;
        println!("{report}");
    }
    Ok(())
}
