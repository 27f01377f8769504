//! Output ordering — recovers the key signature from a rendered image's
//! filename prefix and sorts the collected files in circle-of-fifths or
//! lexical order before pagination.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The twelve major keys in circle-of-fifths order (ascending count of
/// sharps, then descending count of flats).
pub const CIRCLE_OF_FIFTHS: [&str; 12] = [
    "C", "G", "D", "A", "E", "B", "F#", "Db", "Ab", "Eb", "Bb", "F",
];

/// How rendered images are ordered within a booklet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMode {
    /// The fixed 12-key permutation of [`CIRCLE_OF_FIFTHS`].
    CircleOfFifths,
    /// Alphabetical by key label.
    Lexical,
}

/// Filename-safe form of a key label: `#` → "sharp", `b` → "flat".
pub fn safe_label(label: &str) -> String {
    label.replace('#', "sharp").replace('b', "flat")
}

/// Recover the key label a rendered file belongs to by matching the
/// basename against `<safe_label>.` or `<safe_label>_` prefixes.
/// Returns None for unrecognized names.
pub fn key_from_filename<'a>(path: &Path, keys: &'a [String]) -> Option<&'a str> {
    let base = path.file_name()?.to_str()?;
    keys.iter()
        .map(String::as_str)
        .find(|key| {
            let safe = safe_label(key);
            base.starts_with(&format!("{safe}.")) || base.starts_with(&format!("{safe}_"))
        })
}

/// Sort rendered image paths by their key signature. Unrecognized
/// prefixes keep their relative order at the end (the sort is stable).
pub fn sort_by_key(paths: &mut [PathBuf], keys: &[String], mode: OrderingMode) {
    let ranked: Vec<&str> = match mode {
        OrderingMode::CircleOfFifths => keys.iter().map(String::as_str).collect(),
        OrderingMode::Lexical => {
            let mut sorted: Vec<&str> = keys.iter().map(String::as_str).collect();
            sorted.sort_unstable();
            sorted
        }
    };

    paths.sort_by_key(|path| {
        key_from_filename(path, keys)
            .and_then(|key| ranked.iter().position(|&r| r == key))
            .unwrap_or(ranked.len())
    });
}

/// The default key set as owned strings, ready for `BatchConfig`.
pub fn default_keys() -> Vec<String> {
    CIRCLE_OF_FIFTHS.iter().map(|s| s.to_string()).collect()
}
