use crate::pipeline::VariantKind;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpectrogramError>;

#[derive(Error, Debug)]
pub enum SpectrogramError {
    #[error("invalid frame size {0}: must be a power of two")]
    InvalidFrameSize(usize),

    #[error("invalid overlap {overlap} for frame size {size}: hop must be at least one sample")]
    InvalidOverlap { overlap: usize, size: usize },

    #[error("invalid palette: {reason}")]
    InvalidPalette { reason: String },

    #[error("no such window function '{0}'")]
    UnsupportedWindow(String),

    #[error("no such frequency scale '{0}'")]
    UnsupportedScale(String),

    #[error("no such colormap '{0}'")]
    UnsupportedPalette(String),

    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("failed to install {variant} pipeline: {source}")]
    SwapFailure {
        variant: VariantKind,
        #[source]
        source: Box<SpectrogramError>,
    },

    #[error("background worker is not running")]
    WorkerUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl SpectrogramError {
    pub(crate) fn palette(reason: impl Into<String>) -> Self {
        Self::InvalidPalette {
            reason: reason.into(),
        }
    }
}
