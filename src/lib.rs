//! # MidiScript
//!
//! A parser for MidiScript, a line-oriented text notation for multi-track music.
//! Source text becomes a [`ParsedModel`]: global metadata plus named tracks of
//! timed notes and control events, ready for a MIDI file writer.
//!
//! ```text
//! Tempo=120
//! TimeSig=4/4
//! Track Melody: Instrument=piano Channel=1
//! C4q D4q E4q F4q | G4h:v100 [C4q, E4q, G4q]
//! ```
//!
//! Times are in beats (a quarter note is one beat). See [`api`] for the entry
//! points and [`parser`] for the pipeline.

pub mod api;
pub mod config;
pub mod duration;
pub mod error;
pub mod instrument;
pub mod lexer;
pub mod model;
pub mod params;
pub mod parser;
pub mod pitch;
pub mod preprocess;

pub use api::{parse, parse_with_config};
pub use config::ParserConfig;
pub use error::ScriptError;
pub use model::*;
pub use parser::Parser;
