//! # Parser Module
//!
//! Turns MidiScript source text into a [`ParsedModel`].
//!
//! ## Pipeline
//! 1. **Preprocess** - regroup raw lines into metadata statements and one joined
//!    section per track (see [`crate::preprocess`])
//! 2. **Metadata** - apply `Tempo=`, `Key=`, `TimeSig=` and `TicksPerBeat=` in order;
//!    a later statement overrides an earlier one
//! 3. **Track config** - pull `Instrument=` and `Channel=` out of each track section
//! 4. **Accumulate** - tokenize what is left and fold it into notes and events
//!
//! ## Leniency
//! Sequence tokens that cannot be resolved are dropped and reported in
//! [`ParsedModel::dropped_tokens`] with their source line and column. With
//! [`ParserConfig::strict`] set, the first one fails the parse instead.
//!
//! ## Example
//! ```rust
//! use midiscript::{Parser, ParserConfig};
//!
//! let source = "Tempo=100\nTrack Lead: Instrument=violin Channel=2\nC4q E4q G4h";
//!
//! let model = Parser::new(ParserConfig::default()).parse(source).unwrap();
//! let lead = model.track("Lead").unwrap();
//! assert_eq!(model.metadata.tempo, 100);
//! assert_eq!(lead.instrument, 40);
//! assert_eq!(lead.channel, 1);
//! assert_eq!(lead.notes.len(), 3);
//! ```

mod note;
mod track;

use log::{debug, info, warn};

use crate::config::ParserConfig;
use crate::error::ScriptError;
use crate::instrument::resolve_instrument;
use crate::lexer::tokenize;
use crate::model::{DroppedToken, Metadata, ParsedModel, TimeSignature};
use crate::params::channel_index;
use crate::preprocess::{preprocess, LogicalLine, MetadataLine, TrackSection};

use note::TrackDefaults;
use track::accumulate;

/// `Instrument=` / `Channel=` values found in a track section
#[derive(Debug, Default, PartialEq)]
struct TrackConfig {
    instrument: Option<u8>,
    channel: Option<u8>,
}

pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn parse(&self, source: &str) -> Result<ParsedModel, ScriptError> {
        self.config.validate()?;

        let mut model = ParsedModel {
            metadata: self.config.initial_metadata()?,
            ..Default::default()
        };

        for line in preprocess(source) {
            match line {
                LogicalLine::Metadata(meta) => apply_metadata(&mut model.metadata, &meta)?,
                LogicalLine::Track(section) => self.parse_track(&mut model, &section)?,
            }
        }

        info!(
            "parsed {} track(s), {} note(s), {} dropped token(s)",
            model.tracks.len(),
            model.note_count(),
            model.dropped_tokens.len()
        );

        Ok(model)
    }

    fn parse_track(&self, model: &mut ParsedModel, section: &TrackSection) -> Result<(), ScriptError> {
        let (config, remainder) = extract_track_config(section)?;

        let track = model.track_entry(&section.name);
        if let Some(instrument) = config.instrument {
            track.instrument = instrument;
        }
        if let Some(channel) = config.channel {
            track.channel = channel;
        }

        if remainder.trim().is_empty() {
            debug!("track '{}' has no sequence content", section.name);
            return Ok(());
        }

        let defaults = TrackDefaults {
            channel: track.channel,
            velocity: self.config.velocity(),
            octave: self.config.default_octave,
        };
        let state = accumulate(tokenize(&remainder), &defaults);

        debug!(
            "track '{}': {} note(s), {} event(s), cursor at {} beats",
            section.name,
            state.notes.len(),
            state.events.len(),
            state.cursor
        );

        track.notes.extend(state.notes);
        track.events.extend(state.events);

        for rejected in state.rejected {
            let (line, column) = section.locate(rejected.offset);
            if self.config.strict {
                return Err(ScriptError::ParseError {
                    line,
                    column,
                    message: format!("{} ('{}')", rejected.reason, rejected.text),
                });
            }
            warn!(
                "dropped '{}' in track '{}' at line {}, column {}: {}",
                rejected.text, section.name, line, column, rejected.reason
            );
            model.dropped_tokens.push(DroppedToken {
                track: section.name.clone(),
                line,
                column,
                text: rejected.text,
                reason: rejected.reason,
            });
        }

        Ok(())
    }
}

fn metadata_error(line: usize, message: String) -> ScriptError {
    ScriptError::MetadataError { line, message }
}

fn parse_int(meta: &MetadataLine, key: &str, value: &str) -> Result<u32, ScriptError> {
    value.trim().parse().map_err(|_| {
        metadata_error(
            meta.line,
            format!("{} must be a non-negative integer, got '{}'", key, value.trim()),
        )
    })
}

fn apply_metadata(metadata: &mut Metadata, meta: &MetadataLine) -> Result<(), ScriptError> {
    let Some((key, value)) = meta.text.split_once('=') else {
        return Err(metadata_error(meta.line, format!("expected KEY=VALUE, got '{}'", meta.text)));
    };

    match key {
        "Tempo" => metadata.tempo = parse_int(meta, key, value)?,
        "Key" => metadata.key = value.to_string(),
        "TimeSig" => {
            metadata.time_signature =
                TimeSignature::parse(value.trim()).map_err(|m| metadata_error(meta.line, m))?
        }
        "TicksPerBeat" => {
            let ticks = parse_int(meta, key, value)?;
            if ticks == 0 {
                return Err(metadata_error(
                    meta.line,
                    "TicksPerBeat must be greater than zero".to_string(),
                ));
            }
            metadata.ticks_per_beat = ticks;
        }
        other => {
            return Err(metadata_error(meta.line, format!("unknown metadata key '{}'", other)));
        }
    }

    Ok(())
}

/// Find `Instrument=` and `Channel=` tokens and blank them out of the content.
///
/// Blanking keeps the byte offsets of everything else intact, so positions in the
/// remainder still map back to the source. When a key appears more than once the
/// last value wins.
fn extract_track_config(section: &TrackSection) -> Result<(TrackConfig, String), ScriptError> {
    let mut config = TrackConfig::default();
    let mut remainder = section.content.clone();
    let mut consumed = Vec::new();

    let content = section.content.as_str();
    let mut start = None;
    for (idx, c) in content.char_indices().chain(std::iter::once((content.len(), ' '))) {
        match (start, c.is_whitespace()) {
            (None, false) => start = Some(idx),
            (Some(begin), true) => {
                let word = &content[begin..idx];
                if let Some(value) = word.strip_prefix("Instrument=") {
                    config.instrument = Some(resolve_instrument(value));
                    consumed.push(begin..idx);
                } else if let Some(value) = word.strip_prefix("Channel=") {
                    let number: u32 = value.parse().map_err(|_| {
                        metadata_error(
                            section.locate(begin).0,
                            format!("Channel must be an integer, got '{}'", value),
                        )
                    })?;
                    config.channel = Some(channel_index(number));
                    consumed.push(begin..idx);
                }
                start = None;
            }
            _ => {}
        }
    }

    for range in consumed {
        let blank = " ".repeat(range.len());
        remainder.replace_range(range, &blank);
    }

    Ok((config, remainder))
}
