//! Batch pipeline — one parameterized driver replacing the original
//! per-script globals: for each (instrument × key × octave-count)
//! combination, build a scale sequence, hand it to the notation
//! renderer, collect and order the images, then write one stacked
//! `combined.png` and one paginated `combined.pdf` booklet per
//! (instrument, octave-count) unit.
//!
//! Failures are contained to the smallest unit of work; nothing aborts
//! the batch and nothing is retried.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{Clef, InstrumentProfile, PitchClass, ScaleScore};
use crate::ordering::{default_keys, sort_by_key, OrderingMode};
use crate::paginate::{auto_crop, load_images, paginate, stack_images, PageGeometry};
use crate::pdf::write_pdf;
use crate::render::{resolve_rendered_output, NotationRenderer};
use crate::scale::{adjusted_start_octave, build_scale_sequence};

// ═══════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Everything a batch run is parameterized by. Loadable from JSON; the
/// defaults reproduce the original booklet layout (8×11 in letter page
/// at 300 dpi, two octaves maximum, circle-of-fifths ordering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Output resolution in dots per inch.
    pub dpi: u32,
    /// Page padding in pixels.
    pub margin: u32,
    /// Vertical space between stacked images in pixels.
    pub spacing: u32,
    /// Octave every scale starts from before range adjustment.
    pub base_octave: i32,
    /// Upper bound on octave expansion per instrument.
    pub max_octaves: i32,
    /// Vertical padding in pixels between images in the stacked
    /// `combined.png`.
    pub stack_padding: u32,
    /// When set, rendered images are cropped to their content before
    /// combination, treating anything within this per-channel distance
    /// of the corner pixel as background.
    pub crop_tolerance: Option<u8>,
    /// Key labels to generate, e.g. "C", "F#", "Bb".
    pub keys: Vec<String>,
    pub ordering: OrderingMode,
    pub instruments: Vec<InstrumentProfile>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            margin: 80,
            spacing: 350,
            base_octave: 3,
            max_octaves: 2,
            stack_padding: 50,
            crop_tolerance: None,
            keys: default_keys(),
            ordering: OrderingMode::CircleOfFifths,
            instruments: default_instruments(),
        }
    }
}

impl BatchConfig {
    /// Load a configuration from a JSON file. Missing fields fall back
    /// to the defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::letter(self.dpi, self.margin, self.spacing)
    }

    /// Look up an instrument profile by name.
    pub fn profile(&self, name: &str) -> Result<&InstrumentProfile, Error> {
        self.instruments
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownInstrument(name.to_string()))
    }
}

/// The built-in instrument table: clef assignment and lowest playable
/// pitch per instrument.
pub fn default_instruments() -> Vec<InstrumentProfile> {
    let table: [(&str, Clef, &str); 17] = [
        ("Violin", Clef::Treble, "G3"),
        ("Viola", Clef::Alto, "C3"),
        ("Cello", Clef::Bass, "C2"),
        ("Double Bass", Clef::Bass, "E2"),
        ("Alto Saxophone", Clef::Treble, "C4"),
        ("Bass Clarinet", Clef::Treble, "E3"),
        ("Bassoon", Clef::Bass, "B1"),
        ("Clarinet", Clef::Treble, "E3"),
        ("Euphonium", Clef::Bass, "E2"),
        ("Flute", Clef::Treble, "C4"),
        ("French Horn", Clef::Treble, "F3"),
        ("Oboe", Clef::Treble, "Bb3"),
        ("Piccolo", Clef::Treble, "D5"),
        ("Tenor Saxophone", Clef::Treble, "B2"),
        ("Trombone", Clef::Bass, "A2"),
        ("Trumpet", Clef::Treble, "F#3"),
        ("Tuba", Clef::Bass, "C3"),
    ];
    table
        .iter()
        .map(|&(name, clef, lowest)| {
            InstrumentProfile::new(name, clef, lowest.parse().expect("static pitch table"))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Batch driver
// ═══════════════════════════════════════════════════════════════════════

/// What a completed batch run produced.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Booklet PDFs written, in generation order.
    pub documents: Vec<PathBuf>,
    /// Stacked `combined.png` images written, in generation order.
    pub stacked_images: Vec<PathBuf>,
    /// Scale images rendered successfully.
    pub rendered: usize,
    /// (key, octave) units skipped because of render or range failures.
    pub skipped: usize,
}

/// Octave expansion per instrument: keep increasing the octave count
/// while every key stays inside the playable range; finalize once any
/// key would exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    Expanding,
    Finalized,
}

/// Run the whole batch. The output root is recreated if it exists.
pub fn run_batch(
    config: &BatchConfig,
    renderer: &dyn NotationRenderer,
    output_root: &Path,
) -> Result<BatchSummary, Error> {
    recreate_dir(output_root)?;
    let geometry = config.geometry();
    let mut summary = BatchSummary::default();

    for profile in &config.instruments {
        log::info!("processing instrument: {}", profile.name);
        let instrument_dir = output_root.join(profile.folder_name());
        fs::create_dir_all(&instrument_dir)?;

        let mut state = Expansion::Expanding;
        let mut octaves = 1;

        while octaves <= config.max_octaves && state == Expansion::Expanding {
            // Finalize before rendering anything at this count, so the
            // last fully valid octave count keeps its booklet and no
            // partial results land on disk.
            if let Some(key) = first_key_out_of_range(config, profile, octaves) {
                log::info!(
                    "{}: {} octave(s) would push {} past {}; stopping expansion",
                    profile.name,
                    octaves,
                    key,
                    profile.highest.map(|p| p.to_string()).unwrap_or_default()
                );
                state = Expansion::Finalized;
                continue;
            }

            let octave_dir = instrument_dir.join(octave_label(octaves));
            fs::create_dir_all(&octave_dir)?;

            let mut image_paths = Vec::with_capacity(config.keys.len());
            for key in &config.keys {
                match render_scale(config, profile, key, octaves, renderer, &octave_dir) {
                    Ok(path) => {
                        summary.rendered += 1;
                        image_paths.push(path);
                    }
                    Err(e) => {
                        summary.skipped += 1;
                        log::warn!(
                            "{}: skipping {} major at {} octave(s): {e}",
                            profile.name,
                            key,
                            octaves
                        );
                    }
                }
            }

            sort_by_key(&mut image_paths, &config.keys, config.ordering);
            let mut images = load_images(&image_paths);
            if let Some(tolerance) = config.crop_tolerance {
                for img in &mut images {
                    *img = auto_crop(img, tolerance);
                }
            }
            let pages = paginate(&images, &geometry);

            if pages.is_empty() {
                log::warn!(
                    "{}: no images at {} octave(s), no booklet written",
                    profile.name,
                    octaves
                );
            } else {
                if let Some(stacked) = stack_images(&images, config.stack_padding) {
                    let png_path = octave_dir.join("combined.png");
                    match stacked.save(&png_path) {
                        Ok(()) => summary.stacked_images.push(png_path),
                        Err(e) => log::error!(
                            "{}: cannot write {}: {e}",
                            profile.name,
                            png_path.display()
                        ),
                    }
                }

                let pdf_path = octave_dir.join("combined.pdf");
                match write_pdf(&pages, &pdf_path, config.dpi) {
                    Ok(()) => {
                        log::info!(
                            "{}: wrote {} ({} pages)",
                            profile.name,
                            pdf_path.display(),
                            pages.len()
                        );
                        summary.documents.push(pdf_path);
                    }
                    Err(e) => log::error!(
                        "{}: cannot write {}: {e}",
                        profile.name,
                        pdf_path.display()
                    ),
                }
            }

            octaves += 1;
        }
    }

    Ok(summary)
}

/// Render one (instrument, key, octave-count) unit and return the path
/// of the image it produced.
fn render_scale(
    config: &BatchConfig,
    profile: &InstrumentProfile,
    key: &str,
    octaves: i32,
    renderer: &dyn NotationRenderer,
    octave_dir: &Path,
) -> Result<PathBuf, Error> {
    let tonic: PitchClass = key.parse()?;
    let range = profile.range();
    let measures = build_scale_sequence(tonic, config.base_octave, octaves, Some(&range))?;

    let score = ScaleScore {
        title: scale_title(&profile.name, key, octaves),
        clef: profile.clef,
        fifths: tonic.major_fifths(),
        measures,
    };

    let output = octave_dir.join(format!("{}.png", crate::ordering::safe_label(key)));
    renderer.render(&score, &output)?;
    resolve_rendered_output(&output)
}

/// The first configured key whose top pitch at `octaves` would exceed
/// the instrument's highest playable pitch, if any. Instruments without
/// an upper bound never go out of range.
fn first_key_out_of_range<'a>(
    config: &'a BatchConfig,
    profile: &InstrumentProfile,
    octaves: i32,
) -> Option<&'a str> {
    let highest = profile.highest?;
    config
        .keys
        .iter()
        .map(String::as_str)
        .find(|key| match key.parse::<PitchClass>() {
            Ok(tonic) => {
                let start = adjusted_start_octave(tonic, config.base_octave, profile.lowest);
                tonic.at_octave(start + octaves).ps() > highest.ps()
            }
            Err(_) => false,
        })
}

fn scale_title(instrument: &str, key: &str, octaves: i32) -> String {
    let plural = if octaves == 1 { "" } else { "s" };
    format!("{instrument} - {key} Major - {octaves} octave{plural}")
}

fn octave_label(octaves: i32) -> String {
    if octaves == 1 {
        "1_octave".to_string()
    } else {
        format!("{octaves}_octaves")
    }
}

/// Recreate-if-exists semantics for a batch output directory.
pub fn recreate_dir(path: &Path) -> Result<(), Error> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}
