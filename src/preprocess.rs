//! # Preprocessor
//!
//! Regroups raw multi-line source into logical lines: one per metadata statement
//! and one per track, with all of that track's content joined by spaces.
//!
//! ## Rules
//! - Blank lines and lines starting with `#` are discarded.
//! - `Tempo=`, `Key=`, `TimeSig=` and `TicksPerBeat=` lines are metadata. They end
//!   the current track context if that context has buffered sequence content.
//! - `Track <name>: ...` starts (or resumes) a track. Text after the first `:` stays
//!   with the track, whether it is configuration or notes.
//! - Any other line is sequence content for the active track. With no active track
//!   the content goes to an implicit `Default` track (`Instrument=0 Channel=1`).
//!
//! Tracks keep the order in which their names first appear. Each track section
//! carries a source map so offsets into its joined content can be reported as the
//! source line and column.

use std::collections::HashMap;

pub const METADATA_PREFIXES: [&str; 4] = ["Tempo=", "Key=", "TimeSig=", "TicksPerBeat="];
pub const TRACK_PREFIX: &str = "Track ";
pub const DEFAULT_TRACK: &str = "Default";
const DEFAULT_TRACK_CONFIG: &str = "Instrument=0 Channel=1";

/// A metadata statement and the 1-based line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataLine {
    pub line: usize,
    pub text: String,
}

/// Where a run of joined track content came from in the source
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    offset: usize,
    line: usize,
    column: usize,
}

/// All content for one track, joined into a single string
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSection {
    pub name: String,
    /// Line of the first header (or first content line for an implicit track)
    pub line: usize,
    pub content: String,
    segments: Vec<Segment>,
}

impl TrackSection {
    fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            line,
            content: String::new(),
            segments: Vec::new(),
        }
    }

    fn append(&mut self, text: &str, line: usize, column: usize) {
        if text.is_empty() {
            return;
        }
        if !self.content.is_empty() {
            self.content.push(' ');
        }
        self.segments.push(Segment {
            offset: self.content.len(),
            line,
            column,
        });
        self.content.push_str(text);
    }

    /// Map a byte offset in `content` back to a 1-based (line, column) in the source.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let Some(segment) = self.segments.iter().rev().find(|s| s.offset <= offset) else {
            return (self.line, 1);
        };
        let end = offset.min(self.content.len());
        let skipped = self
            .content
            .get(segment.offset..end)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (segment.line, segment.column + skipped)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalLine {
    Metadata(MetadataLine),
    Track(TrackSection),
}

pub fn is_metadata(line: &str) -> bool {
    METADATA_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn column_at(raw: &str, byte: usize) -> usize {
    raw[..byte].chars().count() + 1
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn has_config(text: &str) -> bool {
    text.contains("Instrument=") || text.contains("Channel=")
}

/// Position of a logical line while grouping
enum Slot {
    Metadata(MetadataLine),
    Track(usize),
}

/// Builder state for one preprocessing pass
#[derive(Default)]
struct Grouper {
    slots: Vec<Slot>,
    sections: Vec<TrackSection>,
    track_index: HashMap<String, usize>,
    current: Option<String>,
    pending: bool,
}

impl Grouper {
    fn section(&mut self, name: &str, line: usize) -> &mut TrackSection {
        let idx = match self.track_index.get(name) {
            Some(idx) => *idx,
            None => {
                self.sections.push(TrackSection::new(name, line));
                let idx = self.sections.len() - 1;
                self.track_index.insert(name.to_string(), idx);
                self.slots.push(Slot::Track(idx));
                idx
            }
        };
        &mut self.sections[idx]
    }

    fn metadata(&mut self, line: usize, text: &str) {
        if self.pending {
            self.current = None;
            self.pending = false;
        }
        self.slots.push(Slot::Metadata(MetadataLine {
            line,
            text: text.to_string(),
        }));
    }

    fn header(&mut self, line: usize, raw: &str) {
        self.pending = false;
        let start = leading_ws(raw);
        let trimmed = raw.trim();
        let after_prefix = &trimmed[TRACK_PREFIX.len()..];

        let (name, rest, rest_start) = match after_prefix.find(':') {
            Some(colon) => {
                let rest = &after_prefix[colon + 1..];
                let rest_start = start + TRACK_PREFIX.len() + colon + 1 + leading_ws(rest);
                (after_prefix[..colon].trim(), rest.trim(), rest_start)
            }
            None => (after_prefix.trim(), "", raw.len()),
        };

        let section = self.section(name, line);
        section.append(rest, line, column_at(raw, rest_start));
        self.current = Some(name.to_string());
        if !rest.is_empty() && !has_config(rest) {
            self.pending = true;
        }
    }

    fn finish(self) -> Vec<LogicalLine> {
        let mut sections: Vec<Option<TrackSection>> = self.sections.into_iter().map(Some).collect();
        self.slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Metadata(meta) => Some(LogicalLine::Metadata(meta)),
                Slot::Track(idx) => sections[idx].take().map(LogicalLine::Track),
            })
            .collect()
    }

    fn content(&mut self, line: usize, raw: &str) {
        let column = column_at(raw, leading_ws(raw));
        let name = match &self.current {
            Some(name) => name.clone(),
            None => {
                if !self.track_index.contains_key(DEFAULT_TRACK) {
                    self.section(DEFAULT_TRACK, line)
                        .append(DEFAULT_TRACK_CONFIG, line, 1);
                }
                self.current = Some(DEFAULT_TRACK.to_string());
                DEFAULT_TRACK.to_string()
            }
        };
        self.section(&name, line).append(raw.trim(), line, column);
        self.pending = true;
    }
}

/// Split source text into logical lines.
///
/// # Example
/// ```
/// use midiscript::preprocess::{preprocess, LogicalLine};
///
/// let lines = preprocess("Tempo=90\nTrack Lead: Channel=1\nC4q D4q\nE4h");
/// assert_eq!(lines.len(), 2);
/// match &lines[1] {
///     LogicalLine::Track(t) => assert_eq!(t.content, "Channel=1 C4q D4q E4h"),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn preprocess(source: &str) -> Vec<LogicalLine> {
    let mut grouper = Grouper::default();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if is_metadata(trimmed) {
            grouper.metadata(line, trimmed);
        } else if trimmed.starts_with(TRACK_PREFIX) {
            grouper.header(line, raw);
        } else {
            grouper.content(line, raw);
        }
    }

    for section in &grouper.sections {
        log::debug!(
            "preprocessed track '{}' ({} bytes of content)",
            section.name,
            section.content.len()
        );
    }

    grouper.finish()
}
