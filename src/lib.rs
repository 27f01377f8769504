//! scalebook — batch generator for instrumental scale sheet-music
//! booklets.
//!
//! Builds range-constrained major-scale note sequences per instrument
//! and key, hands them to an external notation renderer for raster
//! output, then combines the rendered images into one vertically
//! stacked PNG and one fixed-page PDF booklet per
//! (instrument, octave-count) unit.
//!
//! # Example
//! ```no_run
//! use scalebook::{run_batch, BatchConfig, MuseScoreRenderer};
//!
//! let config = BatchConfig::default();
//! let renderer = MuseScoreRenderer::new("mscore", config.dpi);
//! let summary = run_batch(&config, &renderer, "output".as_ref()).unwrap();
//! println!("wrote {} booklets", summary.documents.len());
//! ```

pub mod error;
pub mod model;
pub mod musicxml;
pub mod ordering;
pub mod paginate;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod scale;

pub use error::Error;
pub use model::*;
pub use musicxml::score_to_musicxml;
pub use ordering::{key_from_filename, safe_label, sort_by_key, OrderingMode, CIRCLE_OF_FIFTHS};
pub use paginate::{
    auto_crop, load_image, load_images, paginate, stack_images, Page, PageGeometry, PageSet,
};
pub use pdf::write_pdf;
pub use pipeline::{default_instruments, run_batch, BatchConfig, BatchSummary};
pub use render::{resolve_rendered_output, MuseScoreRenderer, NotationRenderer};
pub use scale::{adjusted_start_octave, build_scale_sequence, respell, MajorScale};

/// Convert a score description to a JSON string, useful for inspecting
/// exactly what is handed to the notation renderer.
pub fn score_to_json(score: &ScaleScore) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(score)?)
}
