//! Track accumulation.
//!
//! Folds one track's tokens into notes and events. The cursor (current time in
//! beats) lives in the fold state and is threaded from token to token; nothing
//! outside the fold can move it.

use crate::lexer::{LocatedToken, Token};
use crate::model::{Event, EventKind, Note};

use super::note::{build_chord, build_note, TrackDefaults};

/// A token that produced nothing, located by byte offset in the track content.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Rejected {
    pub offset: usize,
    pub text: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct TrackState {
    pub notes: Vec<Note>,
    pub events: Vec<Event>,
    pub rejected: Vec<Rejected>,
    pub cursor: f64,
}

impl TrackState {
    fn event(mut self, kind: EventKind, channel: u8) -> Self {
        self.events.push(Event {
            time: self.cursor,
            channel,
            kind,
        });
        self
    }

    fn step(mut self, located: LocatedToken, defaults: &TrackDefaults) -> Self {
        match located.token {
            Token::Note(token) => {
                let note = build_note(&token, self.cursor, defaults);
                self.cursor += note.duration;
                self.notes.push(note);
                self
            }
            Token::Chord(interior) => {
                let chord = build_chord(&interior, self.cursor, defaults);
                self.cursor += chord.advance;
                self.notes.extend(chord.notes);
                // +1 for the opening '['
                self.rejected
                    .extend(chord.rejected.into_iter().map(|member| Rejected {
                        offset: located.offset + 1 + member.offset,
                        text: member.text,
                        reason: member.reason,
                    }));
                self
            }
            Token::Rest(duration) => {
                self.cursor += duration.beats();
                self
            }
            Token::ProgramChange(program) => {
                self.event(EventKind::ProgramChange { program }, defaults.channel)
            }
            Token::ControlChange { controller, value } => self.event(
                EventKind::ControlChange { controller, value },
                defaults.channel,
            ),
            Token::PitchBend(value) => self.event(EventKind::PitchBend { value }, defaults.channel),
            Token::Tempo(bpm) => self.event(EventKind::TempoChange { bpm }, defaults.channel),
            Token::Barline => self,
            Token::Malformed { reason } => {
                self.rejected.push(Rejected {
                    offset: located.offset,
                    text: located.text,
                    reason,
                });
                self
            }
        }
    }
}

/// Run the fold over a track's tokens, starting at time zero.
pub(crate) fn accumulate(tokens: Vec<LocatedToken>, defaults: &TrackDefaults) -> TrackState {
    tokens
        .into_iter()
        .fold(TrackState::default(), |state, located| state.step(located, defaults))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    const DEFAULTS: TrackDefaults = TrackDefaults {
        channel: 2,
        velocity: 80,
        octave: 4,
    };

    fn run(content: &str) -> TrackState {
        accumulate(tokenize(content), &DEFAULTS)
    }

    fn starts(state: &TrackState) -> Vec<f64> {
        state.notes.iter().map(|n| n.start_time).collect()
    }

    #[test]
    fn test_sequential_notes() {
        let state = run("C4q D4h E4w");
        let durations: Vec<f64> = state.notes.iter().map(|n| n.duration).collect();
        assert_eq!(durations, vec![1.0, 2.0, 4.0]);
        assert_eq!(starts(&state), vec![0.0, 1.0, 3.0]);
        assert_eq!(state.cursor, 7.0);
    }

    #[test]
    fn test_rest_advances_without_note() {
        let state = run("C4q Rh D4q");
        assert_eq!(state.notes.len(), 2);
        assert_eq!(starts(&state), vec![0.0, 3.0]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_chord_advances_once() {
        let state = run("[C4q, E4q, G4q]");
        assert_eq!(state.notes.len(), 3);
        assert_eq!(starts(&state), vec![0.0, 0.0, 0.0]);
        let pitches: Vec<u8> = state.notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64, 67]);
        assert_eq!(state.cursor, 1.0);
    }

    #[test]
    fn test_events_at_cursor_without_advancing() {
        let state = run("C4h PC:41 CC:64:127 PB:-100 Tempo=90 D4q");
        assert_eq!(state.events.len(), 4);
        assert!(state.events.iter().all(|e| e.time == 2.0 && e.channel == 2));
        assert_eq!(state.events[0].kind, EventKind::ProgramChange { program: 41 });
        assert_eq!(state.events[3].kind, EventKind::TempoChange { bpm: 90 });
        assert_eq!(state.notes[1].start_time, 2.0);
    }

    #[test]
    fn test_barlines_are_cosmetic() {
        assert_eq!(run("C4q | D4q").notes, run("C4q D4q").notes);
    }

    #[test]
    fn test_malformed_recorded_without_advance() {
        let state = run("C4q xyz D4q");
        assert_eq!(state.notes.len(), 2);
        assert_eq!(starts(&state), vec![0.0, 1.0]);
        assert_eq!(state.rejected.len(), 1);
        assert_eq!(state.rejected[0].text, "xyz");
        assert_eq!(state.rejected[0].offset, 4);
    }

    #[test]
    fn test_chord_member_offsets_are_track_relative() {
        let state = run("C4q [E4q, zz]");
        assert_eq!(state.rejected.len(), 1);
        assert_eq!(state.rejected[0].text, "zz");
        assert_eq!(state.rejected[0].offset, 10);
    }

    #[test]
    fn test_cursor_never_moves_backward() {
        let state = run("C4q:p-0.5 D4e [E4q, G4h] Rs F4t");
        let mut last = 0.0;
        for note in state.notes.iter().skip(1) {
            assert!(note.start_time >= last);
            last = note.start_time;
        }
        assert_eq!(state.cursor, 1.0 + 0.5 + 2.0 + 0.25 + 0.125);
    }
}
