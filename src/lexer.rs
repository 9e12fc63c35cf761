//! # Sequence Lexer
//!
//! Splits the content of one track into [`LocatedToken`]s.
//!
//! ## Token Shapes
//! Tried at each position, most specific first:
//! - `[C4q, E4q, G4q]` - chord (interior kept raw, resolved later)
//! - `|`, `||`, ... - barline (cosmetic)
//! - `PC:<int>`, `CC:<int>:<int>`, `PB:<int>`, `Tempo=<int>` - control events
//! - `<A-G>[#|b][octave][w|h|q|e|s|t][.][/n][:param]*` - note
//! - `R<w|h|q|e|s|t>[.][/n]` - rest
//!
//! Whitespace separates tokens but is not required between them (`C4qD4q` is two
//! notes). Text that fits no shape becomes a [`Token::Malformed`] covering the run
//! up to the next whitespace or the next place a token can start (`C4q,D4q` is two
//! notes around a dropped `,`); the accumulator drops it and records a diagnostic.

use crate::duration::{DurationCode, DurationSpec};
use crate::pitch::{Accidental, NoteName};

/// A pitched note as written, before timing is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteToken {
    pub name: NoteName,
    pub accidental: Accidental,
    pub octave: Option<i64>,
    pub duration: DurationSpec,
    pub params: Vec<String>,
}

/// Token types for a track sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Chord(String),
    Note(NoteToken),
    Rest(DurationSpec),
    ProgramChange(u32),
    ControlChange { controller: u32, value: u32 },
    PitchBend(i32),
    Tempo(u32),
    Barline,
    Malformed { reason: String },
}

/// A token with its byte offset in the track content and its source text
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    pub offset: usize,
    pub text: String,
}

/// Raw result of scanning a note-shaped token. `letter` is `A`-`G` or `R`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScannedNote {
    pub letter: char,
    pub accidental: Option<Accidental>,
    pub octave: Option<i64>,
    pub code: Option<DurationCode>,
    pub dotted: bool,
    pub tuplet: Option<u32>,
    pub params: Vec<String>,
}

impl ScannedNote {
    /// Turn the scan into a `Note` or `Rest` token, or explain why it is neither.
    pub fn classify(self) -> Token {
        if self.letter == 'R' {
            return match (self.accidental, self.octave, self.code) {
                (None, None, Some(code)) => Token::Rest(DurationSpec {
                    code,
                    dotted: self.dotted,
                    tuplet: self.tuplet,
                }),
                (None, None, None) => Token::Malformed {
                    reason: "rest is missing a duration code (w, h, q, e, s or t)".to_string(),
                },
                _ => Token::Malformed {
                    reason: "rest cannot carry an accidental or octave".to_string(),
                },
            };
        }

        let Some(name) = NoteName::from_char(self.letter) else {
            return Token::Malformed {
                reason: format!("'{}' is not a note letter", self.letter),
            };
        };

        Token::Note(NoteToken {
            name,
            accidental: self.accidental.unwrap_or_default(),
            octave: self.octave,
            duration: DurationSpec {
                code: self.code.unwrap_or_default(),
                dotted: self.dotted,
                tuplet: self.tuplet,
            },
            params: self.params,
        })
    }
}

const EVENT_PREFIXES: [&str; 4] = ["PC:", "CC:", "PB:", "Tempo="];

/// True when a chord, barline, event or note/rest could begin at the start of `s`.
fn starts_token(s: &str) -> bool {
    matches!(s.chars().next(), Some('[' | '|' | 'A'..='G' | 'R'))
        || EVENT_PREFIXES.iter().any(|p| s.starts_with(p))
}

fn is_segment_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b':' | b'|' | b'[' | b']')
}

/// Scan a run of ASCII digits starting at `start`.
/// Returns the digit text and the index just past it.
fn scan_digits(bytes: &[u8], start: usize) -> (&str, usize) {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    // digits are ASCII, so the slice is valid UTF-8
    (std::str::from_utf8(&bytes[start..end]).unwrap_or(""), end)
}

fn saturating_u32(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Scan the longest note- or rest-shaped prefix of `input`.
///
/// Returns the scan and the number of bytes consumed, or `None` when `input` does
/// not start with `A`-`G` or `R`.
pub(crate) fn scan_note(input: &str) -> Option<(ScannedNote, usize)> {
    let bytes = input.as_bytes();
    let letter = match bytes.first() {
        Some(b) if matches!(b, b'A'..=b'G' | b'R') => *b as char,
        _ => return None,
    };
    let mut i = 1;

    let accidental = bytes.get(i).and_then(|b| Accidental::from_char(*b as char));
    if accidental.is_some() {
        i += 1;
    }

    let (octave_digits, end) = scan_digits(bytes, i);
    let octave = if octave_digits.is_empty() {
        None
    } else {
        Some(octave_digits.parse().unwrap_or(i64::MAX))
    };
    i = end;

    let code = bytes.get(i).and_then(|b| DurationCode::from_char(*b as char));
    if code.is_some() {
        i += 1;
    }

    let dotted = bytes.get(i) == Some(&b'.');
    if dotted {
        i += 1;
    }

    let mut tuplet = None;
    if bytes.get(i) == Some(&b'/') {
        let (digits, end) = scan_digits(bytes, i + 1);
        if !digits.is_empty() {
            tuplet = Some(saturating_u32(digits));
            i = end;
        }
    }

    let mut params = Vec::new();
    while bytes.get(i) == Some(&b':') && bytes.get(i + 1).is_some_and(|b| !is_segment_end(*b)) {
        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && !is_segment_end(bytes[end]) {
            end += 1;
        }
        params.push(input[start..end].to_string());
        i = end;
    }

    Some((
        ScannedNote {
            letter,
            accidental,
            octave,
            code,
            dotted,
            tuplet,
            params,
        },
        i,
    ))
}

/// Lexer for one track's sequence text
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn emit(&mut self, tokens: &mut Vec<LocatedToken>, token: Token, len: usize) {
        let offset = self.position;
        tokens.push(LocatedToken {
            token,
            offset,
            text: self.input[offset..offset + len].to_string(),
        });
        self.position += len;
    }

    /// Length of an unrecognized run: at least `min` bytes (and one char), then up to
    /// the next whitespace or the next position where a token can start.
    fn malformed_len(&self, min: usize) -> usize {
        let rest = self.remaining();
        let first_len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(0);
        let start = min.max(first_len);
        rest.char_indices()
            .skip_while(|(idx, _)| *idx < start)
            .find(|(idx, c)| c.is_whitespace() || starts_token(&rest[*idx..]))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len())
    }

    fn lex_chord(&self) -> (Token, usize) {
        let rest = self.remaining();
        match rest.find(']') {
            Some(1) => (
                Token::Malformed {
                    reason: "empty chord".to_string(),
                },
                2,
            ),
            Some(close) => (Token::Chord(rest[1..close].to_string()), close + 1),
            None => (
                Token::Malformed {
                    reason: "chord is missing a closing ']'".to_string(),
                },
                self.malformed_len(1),
            ),
        }
    }

    /// `PC:<int>`, `CC:<int>:<int>`, `PB:[+-]<int>` or `Tempo=<int>`.
    fn lex_event(&self, prefix: &str) -> Option<(Token, usize)> {
        let bytes = self.remaining().as_bytes();
        let start = prefix.len();

        match prefix {
            "PC:" => {
                let (digits, end) = scan_digits(bytes, start);
                (!digits.is_empty()).then(|| (Token::ProgramChange(saturating_u32(digits)), end))
            }
            "CC:" => {
                let (controller, end) = scan_digits(bytes, start);
                if controller.is_empty() || bytes.get(end) != Some(&b':') {
                    return None;
                }
                let (value, end) = scan_digits(bytes, end + 1);
                (!value.is_empty()).then(|| {
                    (
                        Token::ControlChange {
                            controller: saturating_u32(controller),
                            value: saturating_u32(value),
                        },
                        end,
                    )
                })
            }
            "PB:" => {
                let sign_len = usize::from(matches!(bytes.get(start), Some(b'-' | b'+')));
                let (digits, end) = scan_digits(bytes, start + sign_len);
                if digits.is_empty() {
                    return None;
                }
                let magnitude: i64 = digits.parse().unwrap_or(i64::MAX);
                let value = if bytes[start] == b'-' { -magnitude } else { magnitude };
                let value = value.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                Some((Token::PitchBend(value), end))
            }
            "Tempo=" => {
                let (digits, end) = scan_digits(bytes, start);
                (!digits.is_empty()).then(|| (Token::Tempo(saturating_u32(digits)), end))
            }
            _ => None,
        }
    }

    pub fn tokenize(&mut self) -> Vec<LocatedToken> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.position += c.len_utf8();
                continue;
            }

            if c == '[' {
                let (token, len) = self.lex_chord();
                self.emit(&mut tokens, token, len);
                continue;
            }

            if c == '|' {
                let len = self.remaining().len() - self.remaining().trim_start_matches('|').len();
                self.emit(&mut tokens, Token::Barline, len);
                continue;
            }

            if let Some(prefix) = EVENT_PREFIXES.iter().find(|p| self.remaining().starts_with(*p)) {
                let (token, len) = self.lex_event(prefix).unwrap_or_else(|| {
                    (
                        Token::Malformed {
                            reason: format!("expected a number after '{}'", prefix),
                        },
                        self.malformed_len(prefix.len()),
                    )
                });
                self.emit(&mut tokens, token, len);
                continue;
            }

            if let Some((scanned, len)) = scan_note(self.remaining()) {
                self.emit(&mut tokens, scanned.classify(), len);
                continue;
            }

            let len = self.malformed_len(0);
            self.emit(
                &mut tokens,
                Token::Malformed {
                    reason: "unrecognized token".to_string(),
                },
                len,
            );
        }

        tokens
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(input: &str) -> Vec<LocatedToken> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|t| t.token).collect()
    }

    fn note(input: &str) -> NoteToken {
        match kinds(input).remove(0) {
            Token::Note(n) => n,
            other => panic!("Expected note, found {:?}", other),
        }
    }

    #[test]
    fn test_simple_notes() {
        let tokens = tokenize("C4q D4h E4w");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "C4q");
        assert_eq!(tokens[1].offset, 4);
        assert_eq!(tokens[2].text, "E4w");
    }

    #[test]
    fn test_note_parts() {
        let n = note("F#5e./3:v90:ch2");
        assert_eq!(n.name, NoteName::F);
        assert_eq!(n.accidental, Accidental::Sharp);
        assert_eq!(n.octave, Some(5));
        assert_eq!(n.duration.code, DurationCode::Eighth);
        assert!(n.duration.dotted);
        assert_eq!(n.duration.tuplet, Some(3));
        assert_eq!(n.params, vec!["v90".to_string(), "ch2".to_string()]);
    }

    #[test]
    fn test_note_defaults() {
        let n = note("Bb");
        assert_eq!(n.accidental, Accidental::Flat);
        assert_eq!(n.octave, None);
        assert_eq!(n.duration.code, DurationCode::Quarter);
    }

    #[test]
    fn test_adjacent_notes() {
        let tokens = tokenize("C4qD4q");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "D4q");
    }

    #[test]
    fn test_rest() {
        assert_eq!(
            kinds("Rh."),
            vec![Token::Rest(DurationSpec {
                code: DurationCode::Half,
                dotted: true,
                tuplet: None,
            })]
        );
    }

    #[test]
    fn test_rest_without_code_is_malformed() {
        assert!(matches!(kinds("R")[0], Token::Malformed { .. }));
        assert!(matches!(kinds("R4q")[0], Token::Malformed { .. }));
    }

    #[test]
    fn test_chord() {
        let tokens = tokenize("[C4q, E4q, G4q] D4q");
        assert_eq!(tokens[0].token, Token::Chord("C4q, E4q, G4q".to_string()));
        assert_eq!(tokens[0].text, "[C4q, E4q, G4q]");
        assert!(matches!(tokens[1].token, Token::Note(_)));
    }

    #[test]
    fn test_bad_chords() {
        assert!(matches!(kinds("[]")[0], Token::Malformed { .. }));
        let tokens = tokenize("[C4q E4q");
        assert!(matches!(tokens[0].token, Token::Malformed { .. }));
        assert_eq!(tokens[0].text, "[");
        assert_eq!(tokens[1].text, "C4q");
        assert_eq!(tokens[2].text, "E4q");
    }

    #[test]
    fn test_events() {
        assert_eq!(
            kinds("PC:41 CC:64:127 PB:-2048 PB:100 Tempo=90"),
            vec![
                Token::ProgramChange(41),
                Token::ControlChange {
                    controller: 64,
                    value: 127
                },
                Token::PitchBend(-2048),
                Token::PitchBend(100),
                Token::Tempo(90),
            ]
        );
    }

    #[test]
    fn test_control_change_is_not_a_note() {
        // "CC:" must win over the note letter C
        let tokens = tokenize("CC:7:100");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0].token, Token::ControlChange { .. }));
    }

    #[test]
    fn test_malformed_events() {
        assert!(matches!(kinds("PC:x")[0], Token::Malformed { .. }));
        assert!(matches!(kinds("CC:64")[0], Token::Malformed { .. }));
    }

    #[test]
    fn test_barlines() {
        assert_eq!(
            kinds("C4q | D4q || E4q"),
            vec![
                Token::Note(note("C4q")),
                Token::Barline,
                Token::Note(note("D4q")),
                Token::Barline,
                Token::Note(note("E4q")),
            ]
        );
    }

    #[test]
    fn test_unrecognized_run() {
        let tokens = tokenize("bass C2h");
        assert_eq!(tokens[0].text, "bass");
        assert!(matches!(tokens[0].token, Token::Malformed { .. }));
        assert_eq!(tokens[1].text, "C2h");
    }

    #[test]
    fn test_unrecognized_run_stops_at_next_token() {
        let tokens = tokenize("C4q,D4q,E4q");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["C4q", ",", "D4q", ",", "E4q"]);
        assert!(matches!(tokens[1].token, Token::Malformed { .. }));

        let tokens = tokenize("C4q ~D4q E4q");
        assert_eq!(tokens[1].text, "~");
        assert_eq!(tokens[2].token, Token::Note(note("D4q")));
        assert_eq!(tokens[2].offset, 5);

        let tokens = tokenize("x|PC:3");
        assert_eq!(tokens[0].text, "x");
        assert_eq!(tokens[1].token, Token::Barline);
        assert_eq!(tokens[2].token, Token::ProgramChange(3));
    }

    #[test]
    fn test_malformed_event_keeps_its_prefix() {
        let tokens = tokenize("PC:x D4q");
        assert_eq!(tokens[0].text, "PC:x");
        assert!(matches!(tokens[0].token, Token::Malformed { .. }));
        assert_eq!(tokens[1].text, "D4q");
    }

    #[test]
    fn test_param_segments_stop_at_barline() {
        let tokens = tokenize("C4q:v90|D4q");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "C4q:v90");
        assert_eq!(tokens[1].token, Token::Barline);
    }

    #[test]
    fn test_non_ascii_text() {
        let tokens = tokenize("C4q ♪ D4q");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text, "♪");
        assert_eq!(tokens[2].text, "D4q");
    }
}
