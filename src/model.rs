//! # Parsed Model
//!
//! The timed event model produced by the parser and handed to a MIDI serializer.
//!
//! ## Type Hierarchy
//! ```text
//! ParsedModel
//!   ├── Metadata (tempo, key, time signature, ticks per beat)
//!   ├── Vec<Track> (first-appearance order, unique names)
//!   │     ├── channel, instrument (track defaults)
//!   │     ├── Vec<Note>  (pitch, duration, start_time, velocity, channel, ...)
//!   │     └── Vec<Event> (time, channel, EventKind)
//!   └── Vec<DroppedToken> (tokens that produced nothing)
//! ```
//!
//! All times and durations are in beats, where a quarter note is one beat. They
//! become ticks only at serialization time via [`Metadata::beats_to_ticks`].

use serde::Serialize;

use crate::error::ScriptError;

pub const DEFAULT_VELOCITY: u8 = 80;
pub const PERCUSSION_CHANNEL: u8 = 9;
const PITCH_BEND_CENTER: i64 = 8192;
const PITCH_BEND_MAX: i64 = 16383;

/// A single timed note
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub pitch: u8,
    /// Rhythmic length in beats; this is what advances the track cursor
    pub duration: f64,
    pub start_time: f64,
    pub velocity: u8,
    pub channel: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<u8>,
    /// How long the note actually sounds, when different from `duration`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_length: Option<f64>,
}

impl Note {
    /// Length the serializer should hold the note for.
    pub fn sounding_length(&self) -> f64 {
        self.actual_length.unwrap_or(self.duration)
    }
}

/// Payload of a control event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    ProgramChange { program: u32 },
    ControlChange { controller: u32, value: u32 },
    /// Signed bend, centered on zero (-8192..=8191 in range)
    PitchBend { value: i32 },
    TempoChange { bpm: u32 },
}

impl EventKind {
    /// The pitch-bend value shifted into MIDI's unsigned 14-bit range.
    ///
    /// Returns `None` for non pitch-bend events.
    ///
    /// # Example
    /// ```
    /// use midiscript::EventKind;
    ///
    /// assert_eq!(EventKind::PitchBend { value: 0 }.pitch_bend_unsigned(), Some(8192));
    /// assert_eq!(EventKind::PitchBend { value: -8192 }.pitch_bend_unsigned(), Some(0));
    /// assert_eq!(EventKind::PitchBend { value: 9000 }.pitch_bend_unsigned(), Some(16383));
    /// ```
    pub fn pitch_bend_unsigned(&self) -> Option<u16> {
        match self {
            EventKind::PitchBend { value } => {
                Some((*value as i64 + PITCH_BEND_CENTER).clamp(0, PITCH_BEND_MAX) as u16)
            }
            _ => None,
        }
    }
}

/// A control event at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub time: f64,
    pub channel: u8,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// One named track with its defaults and content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub name: String,
    /// 0-indexed MIDI channel
    pub channel: u8,
    /// Default program number
    pub instrument: u8,
    pub notes: Vec<Note>,
    pub events: Vec<Event>,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channel: 0,
            instrument: 0,
            notes: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Channel 10 (index 9) carries percussion and takes no program change.
    pub fn is_percussion(&self) -> bool {
        self.channel == PERCUSSION_CHANNEL
    }
}

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl TimeSignature {
    /// Parse `N/D`. Returns a message describing the problem on failure.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (numerator, denominator) = s
            .split_once('/')
            .ok_or_else(|| format!("TimeSig must be in format N/D, got '{}'", s))?;
        let numerator = numerator
            .trim()
            .parse()
            .map_err(|_| format!("Invalid time signature numerator: '{}'", s))?;
        let denominator = denominator
            .trim()
            .parse()
            .map_err(|_| format!("Invalid time signature denominator: '{}'", s))?;
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

/// Global metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub tempo: u32,
    pub key: String,
    pub time_signature: TimeSignature,
    pub ticks_per_beat: u32,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            tempo: 120,
            key: "C Major".to_string(),
            time_signature: TimeSignature::default(),
            ticks_per_beat: 480,
        }
    }
}

impl Metadata {
    /// Convert a position in beats to MIDI ticks, rounding to the nearest tick.
    pub fn beats_to_ticks(&self, beats: f64) -> u32 {
        (beats.max(0.0) * self.ticks_per_beat as f64).round() as u32
    }
}

/// A sequence token that produced no note or event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedToken {
    pub track: String,
    pub line: usize,
    pub column: usize,
    pub text: String,
    pub reason: String,
}

/// Complete result of parsing one source text
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedModel {
    pub metadata: Metadata,
    pub tracks: Vec<Track>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_tokens: Vec<DroppedToken>,
}

impl ParsedModel {
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    /// Find a track by name, creating it at the end if it does not exist yet.
    pub(crate) fn track_entry(&mut self, name: &str) -> &mut Track {
        let idx = match self.tracks.iter().position(|t| t.name == name) {
            Some(idx) => idx,
            None => {
                self.tracks.push(Track::new(name));
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[idx]
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    pub fn to_yaml(&self) -> Result<String, ScriptError> {
        serde_yaml::to_string(self).map_err(|e| ScriptError::SerializeError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ScriptError> {
        serde_json::to_string_pretty(self).map_err(|e| ScriptError::SerializeError(e.to_string()))
    }

    /// Human-readable report of metadata and per-track contents.
    pub fn summary(&self) -> String {
        let meta = &self.metadata;
        let mut out = String::new();
        out.push_str(&format!(
            "Metadata: tempo={} key={} time_sig={}/{} ticks_per_beat={}\n",
            meta.tempo,
            meta.key,
            meta.time_signature.numerator,
            meta.time_signature.denominator,
            meta.ticks_per_beat
        ));
        out.push_str(&format!("Tracks: {}\n", self.tracks.len()));

        for track in &self.tracks {
            out.push_str(&format!(
                "\nTrack '{}':\n  channel: {}  instrument: {}\n  notes: {}\n  events: {}\n",
                track.name,
                track.channel + 1,
                track.instrument,
                track.notes.len(),
                track.events.len()
            ));
        }

        if !self.dropped_tokens.is_empty() {
            out.push_str(&format!("\nDropped tokens: {}\n", self.dropped_tokens.len()));
            for dropped in &self.dropped_tokens {
                out.push_str(&format!(
                    "  {}:{} [{}] '{}': {}\n",
                    dropped.line, dropped.column, dropped.track, dropped.text, dropped.reason
                ));
            }
        }

        out
    }
}
