//! # Note Parameters
//!
//! Parses the `:`-separated modifier segments that may trail a note, e.g.
//! `C4q:v100:ch2:len.e`.
//!
//! ## Segments
//! Each segment is examined on its own; the first rule that matches wins and
//! segments may appear in any order.
//!
//! | segment     | effect                                                    |
//! |-------------|-----------------------------------------------------------|
//! | `v<int>`    | velocity (clamped to 127)                                 |
//! | `ch<int>`   | channel override, 1-indexed in the source                 |
//! | `i<int>`    | instrument override                                       |
//! | `t<text>`   | duration modifier; a `d` in the text adds a ×1.5           |
//! | `p<number>` | start offset in beats, may be negative or fractional      |
//! | `len<dur>`  | actual sounding length, e.g. `lenh` or `lenq.`            |
//! | `d`         | dotted (×1.5)                                             |
//! | `a/b`       | tuplet, divides the duration by `b`                       |
//!
//! Unrecognized segments are ignored.

use crate::duration::DurationSpec;

/// Per-note overrides collected from parameter segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteParams {
    pub velocity: Option<u8>,
    /// 0-indexed, already clamped to 0..=15
    pub channel: Option<u8>,
    pub instrument: Option<u8>,
    pub duration_mod: Option<String>,
    pub position: Option<f64>,
    pub actual_length: Option<f64>,
    pub dotted: bool,
    pub tuplet: Option<u32>,
}

impl NoteParams {
    /// True when the `t<text>` modifier asks for a dotted duration.
    pub fn duration_mod_dotted(&self) -> bool {
        self.duration_mod
            .as_deref()
            .map(|m| m.contains('d'))
            .unwrap_or(false)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn clamp_u8(digits: &str, max: u32) -> u8 {
    digits.parse::<u32>().map(|n| n.min(max)).unwrap_or(max) as u8
}

/// Parse a beat offset of the form `-?digits(.digits)?`.
fn parse_offset(s: &str) -> Option<f64> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let valid = match unsigned.split_once('.') {
        Some((whole, frac)) => all_digits(whole) && all_digits(frac),
        None => all_digits(unsigned),
    };
    if valid {
        s.parse().ok()
    } else {
        None
    }
}

/// Convert a 1-indexed channel number to a clamped 0-indexed channel.
pub fn channel_index(one_indexed: u32) -> u8 {
    one_indexed.saturating_sub(1).min(15) as u8
}

/// Parse the segments that follow the note body.
///
/// # Example
/// ```
/// use midiscript::params::parse_params;
///
/// let params = parse_params(&["v100", "ch2", "p0.5"]);
/// assert_eq!(params.velocity, Some(100));
/// assert_eq!(params.channel, Some(1));
/// assert_eq!(params.position, Some(0.5));
/// ```
pub fn parse_params<S: AsRef<str>>(segments: &[S]) -> NoteParams {
    let mut params = NoteParams::default();

    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }

        if let Some(rest) = segment.strip_prefix('v').filter(|r| all_digits(r)) {
            params.velocity = Some(clamp_u8(rest, 127));
        } else if let Some(rest) = segment.strip_prefix("ch").filter(|r| all_digits(r)) {
            params.channel = Some(channel_index(rest.parse().unwrap_or(u32::MAX)));
        } else if let Some(rest) = segment.strip_prefix('i').filter(|r| all_digits(r)) {
            params.instrument = Some(clamp_u8(rest, 127));
        } else if let Some(rest) = segment.strip_prefix('t') {
            params.duration_mod = Some(rest.to_string());
        } else if let Some(offset) = segment.strip_prefix('p').and_then(parse_offset) {
            params.position = Some(offset);
        } else if let Some(rest) = segment.strip_prefix("len") {
            params.actual_length = Some(DurationSpec::parse_lenient(rest).beats());
        } else if segment == "d" {
            params.dotted = true;
        } else if let Some((actual, normal)) = segment.split_once('/') {
            if all_digits(actual) && all_digits(normal) {
                params.tuplet = normal.parse().ok();
            }
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity() {
        assert_eq!(parse_params(&["v90"]).velocity, Some(90));
        assert_eq!(parse_params(&["v300"]).velocity, Some(127));
        // not all digits: ignored
        assert_eq!(parse_params(&["vx"]).velocity, None);
    }

    #[test]
    fn test_channel_is_one_indexed() {
        assert_eq!(parse_params(&["ch1"]).channel, Some(0));
        assert_eq!(parse_params(&["ch10"]).channel, Some(9));
        assert_eq!(parse_params(&["ch0"]).channel, Some(0));
        assert_eq!(parse_params(&["ch40"]).channel, Some(15));
    }

    #[test]
    fn test_instrument() {
        assert_eq!(parse_params(&["i41"]).instrument, Some(41));
    }

    #[test]
    fn test_position() {
        assert_eq!(parse_params(&["p1.5"]).position, Some(1.5));
        assert_eq!(parse_params(&["p-0.25"]).position, Some(-0.25));
        assert_eq!(parse_params(&["pabc"]).position, None);
    }

    #[test]
    fn test_position_accepts_plain_decimals_only() {
        assert_eq!(parse_params(&["p2"]).position, Some(2.0));
        assert_eq!(parse_params(&["p+1"]).position, None);
        assert_eq!(parse_params(&["p1e3"]).position, None);
        assert_eq!(parse_params(&["pinf"]).position, None);
        assert_eq!(parse_params(&["p1."]).position, None);
        assert_eq!(parse_params(&["p-"]).position, None);
    }

    #[test]
    fn test_actual_length() {
        assert_eq!(parse_params(&["lenh"]).actual_length, Some(2.0));
        assert_eq!(parse_params(&["lenq."]).actual_length, Some(1.5));
        assert_eq!(parse_params(&["lenx"]).actual_length, Some(1.0));
    }

    #[test]
    fn test_dotted_and_duration_mod() {
        let params = parse_params(&["d"]);
        assert!(params.dotted);
        assert!(!params.duration_mod_dotted());

        let params = parse_params(&["td"]);
        assert!(!params.dotted);
        assert!(params.duration_mod_dotted());

        let params = parse_params(&["tx"]);
        assert_eq!(params.duration_mod.as_deref(), Some("x"));
        assert!(!params.duration_mod_dotted());
    }

    #[test]
    fn test_tuplet_segment() {
        assert_eq!(parse_params(&["3/2"]).tuplet, Some(2));
        assert_eq!(parse_params(&["/3"]).tuplet, None);
        assert_eq!(parse_params(&["a/b"]).tuplet, None);
    }

    #[test]
    fn test_order_independent() {
        let a = parse_params(&["v70", "ch3", "d"]);
        let b = parse_params(&["d", "ch3", "v70"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_segments_ignored() {
        assert_eq!(parse_params(&["zzz", "", "q"]), NoteParams::default());
    }
}
