//! # Parser Configuration
//!
//! Defaults the parser falls back on when the source leaves something unsaid, plus
//! the `strict` switch. Usually loaded from a small YAML file:
//!
//! ```yaml
//! tempo: 96
//! time-signature: 3/4
//! default-velocity: 100
//! strict: true
//! ```
//!
//! Every key is optional. Unknown keys are rejected so a typo does not silently do
//! nothing.

use serde::Deserialize;

use crate::error::ScriptError;
use crate::model::{Metadata, TimeSignature, DEFAULT_VELOCITY};
use crate::pitch::DEFAULT_OCTAVE;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ParserConfig {
    pub tempo: u32,
    pub key: String,
    pub time_signature: String,
    pub ticks_per_beat: u32,
    pub default_velocity: u32,
    pub default_octave: i64,
    /// Fail on the first sequence token that cannot be resolved
    pub strict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let metadata = Metadata::default();
        Self {
            tempo: metadata.tempo,
            key: metadata.key,
            time_signature: format!(
                "{}/{}",
                metadata.time_signature.numerator, metadata.time_signature.denominator
            ),
            ticks_per_beat: metadata.ticks_per_beat,
            default_velocity: DEFAULT_VELOCITY as u32,
            default_octave: DEFAULT_OCTAVE,
            strict: false,
        }
    }
}

impl ParserConfig {
    /// Parse and validate a YAML configuration document.
    ///
    /// # Example
    /// ```
    /// use midiscript::ParserConfig;
    ///
    /// let config = ParserConfig::from_yaml("tempo: 90\nstrict: true").unwrap();
    /// assert_eq!(config.tempo, 90);
    /// assert!(config.strict);
    /// assert_eq!(config.ticks_per_beat, 480);
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, ScriptError> {
        let config: ParserConfig = if content.trim().is_empty() {
            ParserConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ScriptError::ConfigError(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        TimeSignature::parse(&self.time_signature).map_err(ScriptError::ConfigError)?;
        if self.ticks_per_beat == 0 {
            return Err(ScriptError::ConfigError(
                "ticks-per-beat must be greater than zero".to_string(),
            ));
        }
        if self.default_velocity > 127 {
            return Err(ScriptError::ConfigError(format!(
                "default-velocity must be at most 127, got {}",
                self.default_velocity
            )));
        }
        Ok(())
    }

    /// Starting metadata before any `Tempo=`/`Key=`/`TimeSig=`/`TicksPerBeat=` line.
    pub fn initial_metadata(&self) -> Result<Metadata, ScriptError> {
        Ok(Metadata {
            tempo: self.tempo,
            key: self.key.clone(),
            time_signature: TimeSignature::parse(&self.time_signature)
                .map_err(ScriptError::ConfigError)?,
            ticks_per_beat: self.ticks_per_beat,
        })
    }

    pub fn velocity(&self) -> u8 {
        self.default_velocity.min(127) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_metadata() {
        let config = ParserConfig::default();
        assert_eq!(config.initial_metadata().unwrap(), Metadata::default());
        assert_eq!(config.velocity(), 80);
        assert_eq!(config.default_octave, 4);
        assert!(!config.strict);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ParserConfig::from_yaml("").unwrap(), ParserConfig::default());
    }

    #[test]
    fn test_kebab_case_keys() {
        let config =
            ParserConfig::from_yaml("time-signature: 6/8\nticks-per-beat: 960\ndefault-octave: 3")
                .unwrap();
        assert_eq!(config.time_signature, "6/8");
        assert_eq!(config.ticks_per_beat, 960);
        assert_eq!(config.default_octave, 3);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ParserConfig::from_yaml("tempoo: 90");
        assert!(matches!(result, Err(ScriptError::ConfigError(_))));
    }

    #[test]
    fn test_validate() {
        let bad_sig = ParserConfig {
            time_signature: "four".to_string(),
            ..Default::default()
        };
        assert!(bad_sig.validate().is_err());

        let zero_ticks = ParserConfig {
            ticks_per_beat: 0,
            ..Default::default()
        };
        assert!(zero_ticks.validate().is_err());

        let loud = ParserConfig {
            default_velocity: 128,
            ..Default::default()
        };
        assert!(loud.validate().is_err());
    }
}
