use clap::{Args, Parser, Subcommand};
use specview::util::audio::DEFAULT_SAMPLE_RATE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "specview", about = "Spectrogram renderer for decoded PCM")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render raw f32 PCM (or a synthetic sweep) to a PPM image
    Render(RenderArgs),
    /// Compare the radix-2 and realfft kernels
    Bench(BenchArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Raw little-endian f32 samples, interleaved when --channels > 1
    pub input: Option<PathBuf>,

    /// Synthesize a one-second sweep from 100 Hz to Nyquist instead of reading input
    #[arg(long, conflicts_with = "input")]
    pub sweep: bool,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: f32,

    #[arg(long, default_value_t = 1)]
    pub channels: usize,

    /// Settings JSON; defaults to the user config file
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Override the transform size from the settings
    #[arg(long)]
    pub fft: Option<usize>,

    /// Display width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: usize,

    #[arg(short, long, default_value = "spectrogram.ppm")]
    pub output: PathBuf,

    /// Also write the background worker's first-paint preview
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BenchArgs {
    #[arg(long, value_delimiter = ',', default_values_t = [512, 1024, 2048, 4096])]
    pub sizes: Vec<usize>,

    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,
}
