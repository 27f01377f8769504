//! Scale-sequence builder — enumerates the ascending/descending pitch run
//! of a major scale, clips the starting octave to an instrument's range,
//! and groups the run into measures with the duration policy (half note
//! opening each measure, quarter notes inside, whole note to finish).

use crate::error::Error;
use crate::model::{
    DurationClass, GroupPosition, Measure, NoteEvent, Pitch, PitchClass, PlayableRange, Step,
    MEASURE_CAPACITY,
};

// ═══════════════════════════════════════════════════════════════════════
// Major scale enumeration
// ═══════════════════════════════════════════════════════════════════════

/// A diatonic major scale rooted at a tonic pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorScale {
    pub tonic: PitchClass,
}

/// Ascending semitone steps between successive major-scale degrees
/// (W W H W W W H).
const MAJOR_INTERVALS: [i32; 7] = [2, 2, 1, 2, 2, 2, 1];

impl MajorScale {
    pub fn new(tonic: PitchClass) -> Self {
        Self { tonic }
    }

    /// The seven scale degrees, spelled with successive letters so every
    /// letter name appears exactly once (F# major therefore contains E#,
    /// not F).
    pub fn degrees(&self) -> [PitchClass; 7] {
        let mut degrees = [self.tonic; 7];
        let mut semitone = self.tonic.semitone();
        let mut step = self.tonic.step;
        for i in 1..7 {
            semitone += MAJOR_INTERVALS[i - 1];
            step = step.next();
            // Alteration that makes this letter sound at the degree's
            // semitone, with octave wrap folded out.
            let mut alter = semitone - step.semitone();
            while alter > 6 {
                alter -= 12;
            }
            while alter < -6 {
                alter += 12;
            }
            degrees[i] = PitchClass::new(step, alter);
        }
        degrees
    }

    /// Every scale-degree pitch between `low` and `high` inclusive,
    /// ascending. Both bounds are expected to be tonic pitches of this
    /// scale; octave numbers follow the letter name (they increment when
    /// the letter wraps past B).
    pub fn pitches_between(&self, low: Pitch, high: Pitch) -> Vec<Pitch> {
        let degrees = self.degrees();
        let mut pitches = Vec::new();
        let mut octave = low.octave;
        let mut prev_step = None;

        for degree in degrees.iter().cycle() {
            if let Some(prev) = prev_step {
                if crossed_octave(prev, degree.step) {
                    octave += 1;
                }
            }
            prev_step = Some(degree.step);

            let pitch = degree.at_octave(octave);
            if pitch.ps() < low.ps() {
                continue;
            }
            if pitch.ps() > high.ps() {
                break;
            }
            pitches.push(pitch);
        }
        pitches
    }
}

/// True when walking upward from `from` to `to` passes the B→C boundary.
fn crossed_octave(from: Step, to: Step) -> bool {
    // Letters sorted C..B; a non-increasing letter while ascending means
    // the walk wrapped into the next octave.
    letter_index(to) <= letter_index(from)
}

fn letter_index(step: Step) -> u8 {
    match step {
        Step::C => 0,
        Step::D => 1,
        Step::E => 2,
        Step::F => 3,
        Step::G => 4,
        Step::A => 5,
        Step::B => 6,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Enharmonic respelling
// ═══════════════════════════════════════════════════════════════════════

/// Rewrite awkward scale-degree spellings to their simpler enharmonic
/// equivalent before handoff to the renderer. Pure per-note lookup:
/// E# → F, B# → C (octave up), Cb → B (octave down), Fb → E;
/// everything else passes through unchanged.
pub fn respell(p: Pitch) -> Pitch {
    match (p.step, p.alter) {
        (Step::E, 1) => Pitch::new(Step::F, 0, p.octave),
        (Step::B, 1) => Pitch::new(Step::C, 0, p.octave + 1),
        (Step::C, -1) => Pitch::new(Step::B, 0, p.octave - 1),
        (Step::F, -1) => Pitch::new(Step::E, 0, p.octave),
        _ => p,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Range adjustment
// ═══════════════════════════════════════════════════════════════════════

/// Shift `base_octave` upward until the tonic is not below `lowest`.
/// Never shifts downward past the chosen base.
pub fn adjusted_start_octave(tonic: PitchClass, base_octave: i32, lowest: Pitch) -> i32 {
    let mut octave = base_octave;
    while tonic.at_octave(octave).ps() < lowest.ps() {
        octave += 1;
    }
    octave
}

// ═══════════════════════════════════════════════════════════════════════
// Sequence building
// ═══════════════════════════════════════════════════════════════════════

/// Build the full ascending-then-descending note sequence for a major
/// scale, grouped into measures.
///
/// The ascending half runs from the tonic at the (range-adjusted) start
/// octave to the tonic `octave_span` octaves higher, inclusive; the
/// descending half is the ascending half reversed with the turnaround
/// pitch dropped. Grouping: chunks of [`MEASURE_CAPACITY`] with the very
/// last pitch always isolated into a single-event final measure.
///
/// Only the lower bound of `range` is enforced here. Whether the top of
/// the span exceeds the instrument's highest pitch is the caller's
/// policy decision (see the pipeline's octave expansion).
pub fn build_scale_sequence(
    tonic: PitchClass,
    start_octave: i32,
    octave_span: i32,
    range: Option<&PlayableRange>,
) -> Result<Vec<Measure>, Error> {
    if octave_span <= 0 {
        return Err(Error::InvalidRange(octave_span));
    }

    let start = match range {
        Some(r) => adjusted_start_octave(tonic, start_octave, r.lowest),
        None => start_octave,
    };

    let scale = MajorScale::new(tonic);
    let ascending = scale.pitches_between(
        tonic.at_octave(start),
        tonic.at_octave(start + octave_span),
    );
    // Descend without repeating the turnaround pitch.
    let descending = ascending.iter().rev().skip(1);
    let pitches: Vec<Pitch> = ascending.iter().chain(descending).copied().collect();

    Ok(group_into_measures(&pitches))
}

/// Partition a pitch run into measures: the last pitch is isolated as the
/// Long final measure; everything before it is chunked by capacity with a
/// Medium event opening each chunk and Short events inside. Empty chunks
/// are never emitted.
fn group_into_measures(pitches: &[Pitch]) -> Vec<Measure> {
    let Some((&last, body)) = pitches.split_last() else {
        return Vec::new();
    };

    let mut measures = Vec::with_capacity(body.len() / MEASURE_CAPACITY + 2);
    for chunk in body.chunks(MEASURE_CAPACITY) {
        let events = chunk
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let (duration, position) = if i == 0 {
                    (DurationClass::Medium, GroupPosition::GroupStart)
                } else {
                    (DurationClass::Short, GroupPosition::Interior)
                };
                note_event(p, duration, position)
            })
            .collect();
        measures.push(Measure { events });
    }

    measures.push(Measure {
        events: vec![note_event(last, DurationClass::Long, GroupPosition::Final)],
    });
    measures
}

fn note_event(pitch: Pitch, duration: DurationClass, position: GroupPosition) -> NoteEvent {
    let pitch = respell(pitch);
    NoteEvent {
        pitch,
        duration,
        position,
        show_accidental: pitch.alter != 0,
    }
}
