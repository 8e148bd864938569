pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod util;
pub mod worker;

pub use dsp::DecodedAudio;
pub use error::{Result, SpectrogramError};
pub use pipeline::{PipelineController, PipelineEvent, RenderConfig, VariantKind};
pub use settings::SpectrogramSettings;
