//! Command-line entry point for the batch booklet generator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use scalebook::{run_batch, BatchConfig, MuseScoreRenderer, OrderingMode};

#[derive(Debug, Parser)]
#[command(
    name = "scalebook",
    about = "Generate instrumental scale sheet-music PDF booklets"
)]
struct Cli {
    /// JSON configuration file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the booklets are written to (recreated if it exists).
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Restrict the run to these instruments (repeatable). Unknown
    /// names are reported and skipped.
    #[arg(short, long = "instrument")]
    instruments: Vec<String>,

    /// Notation renderer executable (MuseScore-compatible CLI).
    #[arg(long, default_value = "mscore")]
    renderer: PathBuf,

    /// Override the configured output resolution.
    #[arg(long)]
    dpi: Option<u32>,

    /// Override the configured maximum octave count.
    #[arg(long)]
    max_octaves: Option<i32>,

    /// Crop rendered images to their content before combination,
    /// treating pixels within this per-channel distance of the corner
    /// pixel as background.
    #[arg(long)]
    crop_tolerance: Option<u8>,

    /// Booklet ordering: "circle-of-fifths" or "lexical".
    #[arg(long)]
    ordering: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match BatchConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("cannot load config {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => BatchConfig::default(),
    };

    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }
    if let Some(max) = cli.max_octaves {
        config.max_octaves = max;
    }
    if let Some(tolerance) = cli.crop_tolerance {
        config.crop_tolerance = Some(tolerance);
    }
    if let Some(mode) = &cli.ordering {
        config.ordering = match mode.as_str() {
            "circle-of-fifths" => OrderingMode::CircleOfFifths,
            "lexical" => OrderingMode::Lexical,
            other => {
                log::error!("unknown ordering mode '{other}'");
                return ExitCode::FAILURE;
            }
        };
    }

    if !cli.instruments.is_empty() {
        let mut selected = Vec::with_capacity(cli.instruments.len());
        for name in &cli.instruments {
            match config.profile(name) {
                Ok(profile) => selected.push(profile.clone()),
                Err(e) => log::error!("skipping: {e}"),
            }
        }
        config.instruments = selected;
    }

    let renderer = MuseScoreRenderer::new(&cli.renderer, config.dpi);
    match run_batch(&config, &renderer, &cli.output) {
        Ok(summary) => {
            log::info!(
                "batch complete: {} booklet(s), {} scale(s) rendered, {} skipped",
                summary.documents.len(),
                summary.rendered,
                summary.skipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("batch failed: {e}");
            ExitCode::FAILURE
        }
    }
}
