//! # Public API
//!
//! Main entry points for the MidiScript library.
//!
//! ## Parsing Functions
//!
//! - [`parse()`] - Parse with the default configuration (lenient, 120 BPM, 4/4)
//! - [`parse_with_config()`] - Parse with custom defaults or strict mode
//!
//! ## Typical Usage
//!
//! ```rust
//! use midiscript::parse;
//!
//! let source = r#"
//! Tempo=100
//! Key=G Major
//! Track Melody: Instrument=piano Channel=1
//! G4q A4q B4q D5q | [G4h, B4h, D5h]
//! "#;
//!
//! let model = parse(source)?;
//! let melody = model.track("Melody").unwrap();
//! assert_eq!(melody.notes.len(), 7);
//! println!("{}", model.to_yaml()?);
//! # Ok::<(), midiscript::ScriptError>(())
//! ```
//!
//! ## Strict Parsing
//!
//! ```rust
//! use midiscript::{parse_with_config, ParserConfig, ScriptError};
//!
//! let config = ParserConfig { strict: true, ..Default::default() };
//! let result = parse_with_config("Track A: C4q oops", &config);
//! assert!(matches!(result, Err(ScriptError::ParseError { line: 1, column: 14, .. })));
//! ```

use crate::{Parser, ParsedModel, ParserConfig, ScriptError};

/// Parse MidiScript source with the default configuration.
///
/// Unresolvable sequence tokens are dropped and listed in
/// [`ParsedModel::dropped_tokens`].
///
/// # Example
/// ```rust
/// use midiscript::parse;
///
/// let model = parse("Track Bass: Channel=2\nC2h G2h")?;
/// assert_eq!(model.tracks[0].channel, 1);
/// assert_eq!(model.tracks[0].notes[1].start_time, 2.0);
/// # Ok::<(), midiscript::ScriptError>(())
/// ```
///
/// # Errors
/// Returns [`ScriptError::MetadataError`] for a malformed metadata statement or
/// `Channel=` value.
pub fn parse(source: &str) -> Result<ParsedModel, ScriptError> {
    Parser::new(ParserConfig::default()).parse(source)
}

/// Parse MidiScript source with a custom configuration.
///
/// # Errors
/// In addition to the errors of [`parse()`], returns [`ScriptError::ConfigError`]
/// when `config` fails validation and [`ScriptError::ParseError`] for the first
/// dropped token when `config.strict` is set.
pub fn parse_with_config(source: &str, config: &ParserConfig) -> Result<ParsedModel, ScriptError> {
    Parser::new(config.clone()).parse(source)
}
