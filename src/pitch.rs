//! Pitch resolution: letter + accidental + octave → MIDI note number.
//!
//! C4 is middle C (60). The octave defaults to 4 when omitted and the result is
//! always clamped into the MIDI range 0..=127.

pub const DEFAULT_OCTAVE: i64 = 4;
pub const MAX_PITCH: i64 = 127;

/// Note names A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteName {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    /// Semitone offset from C within an octave
    pub fn semitone(&self) -> i64 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp, // #
    Flat,  // b
}

impl Accidental {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Accidental::Sharp),
            'b' => Some(Accidental::Flat),
            _ => None,
        }
    }

    pub fn adjustment(&self) -> i64 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }
}

/// Compute the clamped MIDI pitch for a note.
///
/// `pitch = semitone(name) + (octave + 1) * 12 + accidental`
pub fn midi_pitch(name: NoteName, accidental: Accidental, octave: Option<i64>) -> u8 {
    let octave = octave.unwrap_or(DEFAULT_OCTAVE);
    let raw = octave
        .saturating_add(1)
        .saturating_mul(12)
        .saturating_add(name.semitone())
        .saturating_add(accidental.adjustment());
    raw.clamp(0, MAX_PITCH) as u8
}
