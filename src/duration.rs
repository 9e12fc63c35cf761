//! # Duration Table
//!
//! Maps duration codes to lengths in beats (quarter note = 1 beat) and applies the
//! rhythmic modifiers that can trail a code.
//!
//! | code | value         | beats |
//! |------|---------------|-------|
//! | `w`  | whole         | 4     |
//! | `h`  | half          | 2     |
//! | `q`  | quarter       | 1     |
//! | `e`  | eighth        | 0.5   |
//! | `s`  | sixteenth     | 0.25  |
//! | `t`  | thirty-second | 0.125 |
//!
//! An unrecognized code falls back to a quarter note. A trailing `.` multiplies by
//! 1.5 and a `/n` suffix divides by `n`.

pub const DOT_FACTOR: f64 = 1.5;

/// Note duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationCode {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl DurationCode {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'w' => Some(DurationCode::Whole),
            'h' => Some(DurationCode::Half),
            'q' => Some(DurationCode::Quarter),
            'e' => Some(DurationCode::Eighth),
            's' => Some(DurationCode::Sixteenth),
            't' => Some(DurationCode::ThirtySecond),
            _ => None,
        }
    }

    /// Lookup with the quarter-note fallback for unknown codes.
    pub fn from_char_or_quarter(c: char) -> Self {
        Self::from_char(c).unwrap_or_default()
    }

    /// Returns the duration in beats
    pub fn beats(&self) -> f64 {
        match self {
            DurationCode::Whole => 4.0,
            DurationCode::Half => 2.0,
            DurationCode::Quarter => 1.0,
            DurationCode::Eighth => 0.5,
            DurationCode::Sixteenth => 0.25,
            DurationCode::ThirtySecond => 0.125,
        }
    }
}

/// A duration code with its inline modifiers, e.g. `q.` or `e/3`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DurationSpec {
    pub code: DurationCode,
    pub dotted: bool,
    pub tuplet: Option<u32>,
}

impl DurationSpec {
    /// Resolved length in beats: base, then the dot, then the tuplet division.
    pub fn beats(&self) -> f64 {
        let mut beats = self.code.beats();
        if self.dotted {
            beats *= DOT_FACTOR;
        }
        apply_tuplet(beats, self.tuplet)
    }

    /// Parse a free-standing duration string such as `h`, `q.` or `e/3`.
    ///
    /// Used for `len<duration>` parameters. Only the first character selects the
    /// code; a missing or unknown code resolves to a quarter note.
    pub fn parse_lenient(s: &str) -> Self {
        let code = s
            .chars()
            .next()
            .map(DurationCode::from_char_or_quarter)
            .unwrap_or_default();
        let dotted = s.contains('.');
        let tuplet = s.split_once('/').and_then(|(_, rest)| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        });
        Self {
            code,
            dotted,
            tuplet,
        }
    }
}

/// Divide by a tuplet grouping factor. A zero factor is ignored.
pub fn apply_tuplet(beats: f64, tuplet: Option<u32>) -> f64 {
    match tuplet {
        Some(n) if n > 0 => beats / n as f64,
        _ => beats,
    }
}
