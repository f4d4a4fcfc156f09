// crates/mergecut-media/src/error.rs
//
// Typed failures for the decode/render/export paths. The UI turns these into
// blocking banners; nothing here is retried automatically.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// The platform decoder could not parse the file as audio.
    #[error("cannot decode '{name}': {reason}")]
    Decode { name: String, reason: String },

    /// The container parsed but its duration could not be determined
    /// from metadata alone.
    #[error("duration unknown for '{name}'")]
    DurationUnknown { name: String },

    /// The timeline's effective duration is zero — nothing to render.
    #[error("timeline is empty, nothing to render")]
    EmptyRender,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("WAV serialization failed: {0}")]
    Wav(String),
}

impl From<hound::Error> for MediaError {
    fn from(e: hound::Error) -> Self {
        MediaError::Wav(e.to_string())
    }
}
