//! Data model for scale generation and score description.
//!
//! These structures capture the musical information handed to the external
//! notation renderer: spelled pitches, duration classes, measure grouping
//! and per-instrument playable ranges.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Maximum number of note events a non-final measure may hold.
pub const MEASURE_CAPACITY: usize = 7;

/// Note letter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Semitone offset of the natural letter within an octave (C = 0).
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    /// The next letter upward, cycling B back to C.
    pub fn next(self) -> Step {
        match self {
            Step::C => Step::D,
            Step::D => Step::E,
            Step::E => Step::F,
            Step::F => Step::G,
            Step::G => Step::A,
            Step::A => Step::B,
            Step::B => Step::C,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }

    fn from_letter(c: char) -> Option<Step> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }
}

/// A pitch class without an octave: letter plus chromatic alteration
/// (-1 = flat, 0 = natural, +1 = sharp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchClass {
    pub step: Step,
    pub alter: i32,
}

impl PitchClass {
    pub fn new(step: Step, alter: i32) -> Self {
        Self { step, alter }
    }

    /// Semitone value relative to C of the same octave. B# yields 12 and
    /// Cb yields -1; callers compare full pitches, not classes.
    pub fn semitone(self) -> i32 {
        self.step.semitone() + self.alter
    }

    /// Attach an octave number (scientific pitch notation).
    pub fn at_octave(self, octave: i32) -> Pitch {
        Pitch {
            step: self.step,
            alter: self.alter,
            octave,
        }
    }

    /// Key signature as sharps (positive) or flats (negative) when this
    /// pitch class is the tonic of a major key. C = 0, G = 1, F = -1,
    /// F# = 6, Db = -5, C# = 7.
    pub fn major_fifths(self) -> i32 {
        let base = match self.step {
            Step::C => 0,
            Step::G => 1,
            Step::D => 2,
            Step::A => 3,
            Step::E => 4,
            Step::B => 5,
            Step::F => -1,
        };
        base + 7 * self.alter
    }

    /// Parse a leading pitch-class prefix ("C", "F#", "Bb") and return it
    /// together with the unconsumed remainder of the string.
    pub(crate) fn parse_prefix(s: &str) -> Result<(PitchClass, &str), Error> {
        let mut chars = s.chars();
        let step = chars
            .next()
            .and_then(Step::from_letter)
            .ok_or_else(|| Error::InvalidPitch(s.to_string()))?;

        let mut alter = 0;
        let mut rest = &s[1..];
        for (i, c) in s[1..].char_indices() {
            match c {
                '#' => alter += 1,
                'b' => alter -= 1,
                _ => {
                    rest = &s[1 + i..];
                    break;
                }
            }
            rest = &s[1 + i + c.len_utf8()..];
        }
        Ok((PitchClass { step, alter }, rest))
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step.letter())?;
        for _ in 0..self.alter {
            write!(f, "#")?;
        }
        for _ in self.alter..0 {
            write!(f, "b")?;
        }
        Ok(())
    }
}

impl FromStr for PitchClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match Self::parse_prefix(s)? {
            (pc, "") => Ok(pc),
            _ => Err(Error::InvalidPitch(s.to_string())),
        }
    }
}

impl TryFrom<String> for PitchClass {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> String {
        pc.to_string()
    }
}

/// A fully specified pitch: letter, alteration and octave (middle C = C4).
/// Immutable once computed; ordered by pitch-space value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    pub step: Step,
    pub alter: i32,
    pub octave: i32,
}

impl Pitch {
    pub fn new(step: Step, alter: i32, octave: i32) -> Self {
        Self {
            step,
            alter,
            octave,
        }
    }

    pub fn class(self) -> PitchClass {
        PitchClass {
            step: self.step,
            alter: self.alter,
        }
    }

    /// Pitch-space value: a MIDI-style absolute semitone number where
    /// C4 = 60. Enharmonic spellings of the same sound share a value.
    pub fn ps(self) -> i32 {
        (self.octave + 1) * 12 + self.step.semitone() + self.alter
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> Ordering {
        // Pitch space first; the letter breaks ties between enharmonic
        // spellings so that Ord stays consistent with Eq.
        (self.ps(), self.step as u8).cmp(&(other.ps(), other.step as u8))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let (pc, rest) = PitchClass::parse_prefix(s)?;
        let octave: i32 = rest
            .parse()
            .map_err(|_| Error::InvalidPitch(s.to_string()))?;
        Ok(pc.at_octave(octave))
    }
}

impl TryFrom<String> for Pitch {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<Pitch> for String {
    fn from(p: Pitch) -> String {
        p.to_string()
    }
}

/// Duration class assigned by the measure-grouping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationClass {
    /// Interior notes of a measure (rendered as quarter notes).
    Short,
    /// First note of each non-final measure (rendered as a half note).
    Medium,
    /// The isolated final note of a sequence (rendered as a whole note).
    Long,
}

impl DurationClass {
    /// MusicXML note type name.
    pub fn note_type(self) -> &'static str {
        match self {
            DurationClass::Short => "quarter",
            DurationClass::Medium => "half",
            DurationClass::Long => "whole",
        }
    }

    /// Duration in divisions, with one division per quarter note.
    pub const fn divisions(self) -> i32 {
        match self {
            DurationClass::Short => 1,
            DurationClass::Medium => 2,
            DurationClass::Long => 4,
        }
    }
}

/// Where a note event sits within its measure group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupPosition {
    /// First event of a non-final measure.
    GroupStart,
    /// Any later event of a non-final measure.
    Interior,
    /// The single event of the final measure.
    Final,
}

/// One note handed to the notation renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: Pitch,
    pub duration: DurationClass,
    pub position: GroupPosition,
    /// Force the accidental to be drawn even where the key signature
    /// would suppress it.
    pub show_accidental: bool,
}

/// An ordered group of note events. Non-final measures hold up to
/// [`MEASURE_CAPACITY`] events; the final measure of a sequence holds
/// exactly one Long event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    pub events: Vec<NoteEvent>,
}

impl Measure {
    pub fn is_final(&self) -> bool {
        self.events.len() == 1 && self.events[0].position == GroupPosition::Final
    }
}

/// Clef assignment for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    Treble,
    Alto,
    Bass,
}

impl Clef {
    /// MusicXML clef sign and staff line.
    pub fn sign_and_line(self) -> (&'static str, i32) {
        match self {
            Clef::Treble => ("G", 2),
            Clef::Alto => ("C", 3),
            Clef::Bass => ("F", 4),
        }
    }
}

/// The score description handed to the external notation renderer:
/// one part, one clef, one key signature, ordered measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleScore {
    /// Title text displayed above the first measure.
    pub title: String,
    pub clef: Clef,
    /// Key signature as sharps (positive) or flats (negative).
    pub fifths: i32,
    pub measures: Vec<Measure>,
}

impl ScaleScore {
    /// Total number of note events across all measures.
    pub fn event_count(&self) -> usize {
        self.measures.iter().map(|m| m.events.len()).sum()
    }
}

/// The pitch window an instrument can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayableRange {
    pub lowest: Pitch,
    /// Open-ended when absent; octave expansion then runs to the
    /// configured maximum.
    pub highest: Option<Pitch>,
}

/// Per-instrument configuration: display name, clef and playable range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    pub name: String,
    pub clef: Clef,
    pub lowest: Pitch,
    #[serde(default)]
    pub highest: Option<Pitch>,
}

impl InstrumentProfile {
    pub fn new(name: &str, clef: Clef, lowest: Pitch) -> Self {
        Self {
            name: name.to_string(),
            clef,
            lowest,
            highest: None,
        }
    }

    pub fn range(&self) -> PlayableRange {
        PlayableRange {
            lowest: self.lowest,
            highest: self.highest,
        }
    }

    /// Directory-safe form of the instrument name
    /// ("Double Bass" → "Double_Bass").
    pub fn folder_name(&self) -> String {
        self.name.replace(' ', "_")
    }
}
