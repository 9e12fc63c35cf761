//! # Error Types
//!
//! This module defines all error types for the MidiScript parser.
//!
//! Errors carry the 1-based source line (and column where one is meaningful) so a
//! user can find the offending statement in their file.
//!
//! ## Error Types
//! - `ParseError` - A sequence token rejected in strict mode
//! - `MetadataError` - A non-integer `Tempo`/`TicksPerBeat`/`Channel`, or a `TimeSig` without `/`
//! - `ConfigError` - Invalid parser configuration
//! - `SerializeError` - Failure rendering the parsed model as YAML or JSON
//!
//! Unknown duration codes, unknown instrument names and unparseable sequence tokens
//! are *not* errors by default; see `ParsedModel::dropped_tokens`.
//!
//! ## Usage
//! ```rust
//! use midiscript::{parse, ScriptError};
//!
//! match parse("Tempo=fast\nTrack Lead: C4q") {
//!     Ok(model) => println!("{} tracks", model.tracks.len()),
//!     Err(ScriptError::MetadataError { line, message }) => {
//!         eprintln!("Bad metadata on line {}: {}", line, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// A sequence token could not be resolved and the parser runs in strict mode.
    ///
    /// # Example
    /// ```
    /// # use midiscript::ScriptError;
    /// let err = ScriptError::ParseError {
    ///     line: 3,
    ///     column: 7,
    ///     message: "Unrecognized token 'xyz' in track 'Lead'".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Parse error at line 3, column 7: Unrecognized token 'xyz' in track 'Lead'"
    /// );
    /// ```
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Invalid metadata or track configuration value. Aborts the whole parse.
    ///
    /// # Example
    /// ```
    /// # use midiscript::ScriptError;
    /// let err = ScriptError::MetadataError {
    ///     line: 1,
    ///     message: "TimeSig must be in format N/D, got '44'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid metadata at line 1: TimeSig must be in format N/D, got '44'");
    /// ```
    #[error("Invalid metadata at line {line}: {message}")]
    MetadataError { line: usize, message: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Serialization failed: {0}")]
    SerializeError(String),
}
