//! Notation rendering seam — the external collaborator that turns a
//! [`ScaleScore`] into a raster image, plus the adapter that papers over
//! its output-naming quirk.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Error;
use crate::model::ScaleScore;
use crate::musicxml::score_to_musicxml;

/// Renders a score description to a raster image file at the requested
/// path. The pipeline only depends on this trait; tests substitute a
/// stub implementation.
pub trait NotationRenderer {
    fn render(&self, score: &ScaleScore, output: &Path) -> Result<(), Error>;
}

/// Invokes a MuseScore-style executable:
/// `<exe> <score.musicxml> -o <output.png> -r <dpi>`.
///
/// The score is written to a sibling `.musicxml` file, which is removed
/// again after the call.
#[derive(Debug, Clone)]
pub struct MuseScoreRenderer {
    executable: PathBuf,
    dpi: u32,
}

impl MuseScoreRenderer {
    pub fn new(executable: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            executable: executable.into(),
            dpi,
        }
    }
}

impl NotationRenderer for MuseScoreRenderer {
    fn render(&self, score: &ScaleScore, output: &Path) -> Result<(), Error> {
        let xml_path = output.with_extension("musicxml");
        std::fs::write(&xml_path, score_to_musicxml(score))?;

        let status = Command::new(&self.executable)
            .arg(&xml_path)
            .arg("-o")
            .arg(output)
            .arg("-r")
            .arg(self.dpi.to_string())
            .status();

        // Best-effort cleanup of the intermediate file.
        let _ = std::fs::remove_file(&xml_path);

        match status {
            Ok(s) if s.success() => Ok(()),
            _ => Err(Error::RenderFailed {
                path: output.to_path_buf(),
            }),
        }
    }
}

/// Resolve the file a render actually produced.
///
/// Some notation renderers write `name-1.png` instead of the requested
/// `name.png`. If the requested path is missing but the `-1` variant
/// exists, the variant is moved into place and treated as canonical;
/// if neither exists, the render is treated as failed.
pub fn resolve_rendered_output(requested: &Path) -> Result<PathBuf, Error> {
    if requested.exists() {
        return Ok(requested.to_path_buf());
    }

    if let Some(alternate) = suffixed_variant(requested) {
        if alternate.exists() {
            std::fs::rename(&alternate, requested)?;
            log::debug!(
                "renamed renderer output {} -> {}",
                alternate.display(),
                requested.display()
            );
            return Ok(requested.to_path_buf());
        }
    }

    Err(Error::RenderMissingOutput {
        path: requested.to_path_buf(),
    })
}

/// `foo/bar.png` → `foo/bar-1.png`; None when the path has no stem.
fn suffixed_variant(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-1.{ext}"),
        None => format!("{stem}-1"),
    };
    Some(path.with_file_name(name))
}
