//! MusicXML writer — serializes a [`ScaleScore`] to a minimal
//! score-partwise document that notation programs (MuseScore and
//! friends) accept for PNG export.
//!
//! One part, clef/key/time attributes on the first measure, the title as
//! a text direction above the first note, and every accidental written
//! explicitly so the renderer never suppresses it against the key
//! signature.

use crate::model::{DurationClass, Measure, NoteEvent, ScaleScore, MEASURE_CAPACITY};

/// Time signature written on the first measure: the quarter-beat
/// duration of a full measure group (an opening half note plus six
/// quarters), so no measure is overfull against its own meter.
const BEATS: i32 = DurationClass::Medium.divisions()
    + (MEASURE_CAPACITY as i32 - 1) * DurationClass::Short.divisions();
const BEAT_TYPE: i32 = 4;

/// Serialize a score description to a MusicXML 3.1 string.
pub fn score_to_musicxml(score: &ScaleScore) -> String {
    let mut xml = String::with_capacity(2048 + score.event_count() * 160);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(
        "<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \
         \"http://www.musicxml.org/dtds/partwise.dtd\">\n",
    );
    xml.push_str("<score-partwise version=\"3.1\">\n");

    xml.push_str("  <work>\n");
    xml.push_str(&format!(
        "    <work-title>{}</work-title>\n",
        escape(&score.title)
    ));
    xml.push_str("  </work>\n");

    xml.push_str("  <part-list>\n");
    xml.push_str("    <score-part id=\"P1\">\n");
    xml.push_str(&format!(
        "      <part-name>{}</part-name>\n",
        escape(&score.title)
    ));
    xml.push_str("    </score-part>\n");
    xml.push_str("  </part-list>\n");

    xml.push_str("  <part id=\"P1\">\n");
    for (i, measure) in score.measures.iter().enumerate() {
        write_measure(&mut xml, score, measure, i);
    }
    xml.push_str("  </part>\n");
    xml.push_str("</score-partwise>\n");
    xml
}

fn write_measure(xml: &mut String, score: &ScaleScore, measure: &Measure, index: usize) {
    xml.push_str(&format!("    <measure number=\"{}\">\n", index + 1));

    if index == 0 {
        let (sign, line) = score.clef.sign_and_line();
        xml.push_str("      <attributes>\n");
        xml.push_str("        <divisions>1</divisions>\n");
        xml.push_str(&format!(
            "        <key><fifths>{}</fifths><mode>major</mode></key>\n",
            score.fifths
        ));
        xml.push_str(&format!(
            "        <time><beats>{BEATS}</beats><beat-type>{BEAT_TYPE}</beat-type></time>\n"
        ));
        xml.push_str(&format!(
            "        <clef><sign>{sign}</sign><line>{line}</line></clef>\n"
        ));
        xml.push_str("      </attributes>\n");

        xml.push_str("      <direction placement=\"above\">\n");
        xml.push_str("        <direction-type>\n");
        xml.push_str(&format!("          <words>{}</words>\n", escape(&score.title)));
        xml.push_str("        </direction-type>\n");
        xml.push_str("      </direction>\n");
    }

    for event in &measure.events {
        write_note(xml, event);
    }
    xml.push_str("    </measure>\n");
}

fn write_note(xml: &mut String, event: &NoteEvent) {
    let pitch = event.pitch;
    xml.push_str("      <note>\n");
    xml.push_str("        <pitch>\n");
    xml.push_str(&format!("          <step>{}</step>\n", pitch.step.letter()));
    if pitch.alter != 0 {
        xml.push_str(&format!("          <alter>{}</alter>\n", pitch.alter));
    }
    xml.push_str(&format!("          <octave>{}</octave>\n", pitch.octave));
    xml.push_str("        </pitch>\n");
    xml.push_str(&format!(
        "        <duration>{}</duration>\n",
        event.duration.divisions()
    ));
    xml.push_str(&format!(
        "        <type>{}</type>\n",
        event.duration.note_type()
    ));
    if event.show_accidental {
        xml.push_str(&format!(
            "        <accidental>{}</accidental>\n",
            accidental_name(pitch.alter)
        ));
    }
    xml.push_str("      </note>\n");
}

fn accidental_name(alter: i32) -> &'static str {
    match alter {
        1 => "sharp",
        -1 => "flat",
        2 => "double-sharp",
        -2 => "flat-flat",
        _ => "natural",
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
