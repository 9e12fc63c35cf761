//! Note and chord resolution.
//!
//! A note's duration is built up in a fixed order, every step cumulative:
//! base code, inline dot (×1.5), inline `/n`, parameter `d` (×1.5), parameter `a/b`,
//! and finally a `t…d…` modifier (×1.5).

use crate::duration::{apply_tuplet, DOT_FACTOR};
use crate::lexer::{scan_note, NoteToken, Token};
use crate::model::Note;
use crate::params::parse_params;
use crate::pitch::midi_pitch;

/// Values a note inherits from its track when its parameters say nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrackDefaults {
    pub channel: u8,
    pub velocity: u8,
    pub octave: i64,
}

/// Resolve a note token at `cursor`.
pub(crate) fn build_note(token: &NoteToken, cursor: f64, defaults: &TrackDefaults) -> Note {
    let params = parse_params(&token.params);

    let mut duration = token.duration.beats();
    if params.dotted {
        duration *= DOT_FACTOR;
    }
    duration = apply_tuplet(duration, params.tuplet);
    if params.duration_mod_dotted() {
        duration *= DOT_FACTOR;
    }

    let start_time = (cursor + params.position.unwrap_or(0.0)).max(0.0);

    Note {
        pitch: midi_pitch(
            token.name,
            token.accidental,
            Some(token.octave.unwrap_or(defaults.octave)),
        ),
        duration,
        start_time,
        velocity: params.velocity.unwrap_or(defaults.velocity),
        channel: params.channel.unwrap_or(defaults.channel),
        instrument: params.instrument,
        actual_length: params.actual_length,
    }
}

/// Chord member text that produced no note. `offset` is relative to the chord interior.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RejectedMember {
    pub offset: usize,
    pub text: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Chord {
    pub notes: Vec<Note>,
    /// How far the cursor moves: the longest resolved member, or zero
    pub advance: f64,
    pub rejected: Vec<RejectedMember>,
}

/// Resolve the note at the start of a chord member.
///
/// Returns the note and the length of the text it was read from; anything after
/// that is left for the caller to report.
fn resolve_member(member: &str) -> Result<(NoteToken, usize), String> {
    if member.is_empty() {
        return Err("empty chord member".to_string());
    }
    match scan_note(member) {
        Some((scanned, len)) => match scanned.classify() {
            Token::Note(note) => Ok((note, len)),
            Token::Rest(_) => Err("rests are not allowed inside a chord".to_string()),
            Token::Malformed { reason } => Err(reason),
            other => Err(format!("unexpected chord member {:?}", other)),
        },
        None => Err("chord member is not a note".to_string()),
    }
}

/// Resolve the comma-separated interior of `[...]`; all members start at `cursor`.
pub(crate) fn build_chord(interior: &str, cursor: f64, defaults: &TrackDefaults) -> Chord {
    let mut chord = Chord::default();
    let mut start = 0;

    for piece in interior.split(',') {
        let member = piece.trim();
        let offset = start + (piece.len() - piece.trim_start().len());
        start += piece.len() + 1;

        match resolve_member(member) {
            Ok((token, len)) => {
                let note = build_note(&token, cursor, defaults);
                chord.advance = chord.advance.max(note.duration);
                chord.notes.push(note);

                let trailing = &member[len..];
                if !trailing.trim().is_empty() {
                    chord.rejected.push(RejectedMember {
                        offset: offset + len + (trailing.len() - trailing.trim_start().len()),
                        text: trailing.trim().to_string(),
                        reason: "unexpected text after chord member".to_string(),
                    });
                }
            }
            Err(reason) => chord.rejected.push(RejectedMember {
                offset,
                text: member.to_string(),
                reason,
            }),
        }
    }

    chord
}
