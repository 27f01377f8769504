//! Error taxonomy for the batch pipeline.
//!
//! Every variant maps to a containment level: configuration and render
//! errors kill one (instrument, key, octave) unit of work, image decode
//! errors kill one image, and nothing aborts the overall batch.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Octave span must be at least 1.
    #[error("invalid octave span {0}: must be >= 1")]
    InvalidRange(i32),

    /// An instrument was requested that has no profile in the configuration.
    #[error("unknown instrument '{0}'")]
    UnknownInstrument(String),

    /// A pitch or key label could not be parsed (e.g. "H#4").
    #[error("invalid pitch '{0}'")]
    InvalidPitch(String),

    /// The external notation renderer exited with a failure status.
    #[error("notation renderer failed for '{path}'")]
    RenderFailed { path: PathBuf },

    /// The renderer reported success but neither the requested output path
    /// nor its `-1`-suffixed variant exists.
    #[error("renderer produced no output at '{path}' (nor its -1 variant)")]
    RenderMissingOutput { path: PathBuf },

    /// A collected image file could not be opened or decoded.
    #[error("cannot decode image '{path}': {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pdf(#[from] lopdf::Error),
}
