//! General MIDI instrument names.
//!
//! `Instrument=` accepts either a program number or a name. Because track config is
//! split on whitespace, multi-word General MIDI names are written with `_` or `-`
//! (`acoustic_grand_piano`, `electric-bass-finger`). A set of single-word aliases
//! covers the common cases (`piano`, `violin`, `bass`). Lookup is case-insensitive.

/// General MIDI level 1 program names, indexed by program number.
pub const GM_PROGRAM_NAMES: [&str; 128] = [
    // Piano
    "acoustic grand piano",
    "bright acoustic piano",
    "electric grand piano",
    "honky-tonk piano",
    "electric piano 1",
    "electric piano 2",
    "harpsichord",
    "clavinet",
    // Chromatic percussion
    "celesta",
    "glockenspiel",
    "music box",
    "vibraphone",
    "marimba",
    "xylophone",
    "tubular bells",
    "dulcimer",
    // Organ
    "drawbar organ",
    "percussive organ",
    "rock organ",
    "church organ",
    "reed organ",
    "accordion",
    "harmonica",
    "tango accordion",
    // Guitar
    "acoustic guitar nylon",
    "acoustic guitar steel",
    "electric guitar jazz",
    "electric guitar clean",
    "electric guitar muted",
    "overdriven guitar",
    "distortion guitar",
    "guitar harmonics",
    // Bass
    "acoustic bass",
    "electric bass finger",
    "electric bass pick",
    "fretless bass",
    "slap bass 1",
    "slap bass 2",
    "synth bass 1",
    "synth bass 2",
    // Strings
    "violin",
    "viola",
    "cello",
    "contrabass",
    "tremolo strings",
    "pizzicato strings",
    "orchestral harp",
    "timpani",
    // Ensemble
    "string ensemble 1",
    "string ensemble 2",
    "synth strings 1",
    "synth strings 2",
    "choir aahs",
    "voice oohs",
    "synth voice",
    "orchestra hit",
    // Brass
    "trumpet",
    "trombone",
    "tuba",
    "muted trumpet",
    "french horn",
    "brass section",
    "synth brass 1",
    "synth brass 2",
    // Reed
    "soprano sax",
    "alto sax",
    "tenor sax",
    "baritone sax",
    "oboe",
    "english horn",
    "bassoon",
    "clarinet",
    // Pipe
    "piccolo",
    "flute",
    "recorder",
    "pan flute",
    "blown bottle",
    "shakuhachi",
    "whistle",
    "ocarina",
    // Synth lead
    "lead 1 square",
    "lead 2 sawtooth",
    "lead 3 calliope",
    "lead 4 chiff",
    "lead 5 charang",
    "lead 6 voice",
    "lead 7 fifths",
    "lead 8 bass and lead",
    // Synth pad
    "pad 1 new age",
    "pad 2 warm",
    "pad 3 polysynth",
    "pad 4 choir",
    "pad 5 bowed",
    "pad 6 metallic",
    "pad 7 halo",
    "pad 8 sweep",
    // Synth effects
    "fx 1 rain",
    "fx 2 soundtrack",
    "fx 3 crystal",
    "fx 4 atmosphere",
    "fx 5 brightness",
    "fx 6 goblins",
    "fx 7 echoes",
    "fx 8 sci-fi",
    // Ethnic
    "sitar",
    "banjo",
    "shamisen",
    "koto",
    "kalimba",
    "bagpipe",
    "fiddle",
    "shanai",
    // Percussive
    "tinkle bell",
    "agogo",
    "steel drums",
    "woodblock",
    "taiko drum",
    "melodic tom",
    "synth drum",
    "reverse cymbal",
    // Sound effects
    "guitar fret noise",
    "breath noise",
    "seashore",
    "bird tweet",
    "telephone ring",
    "helicopter",
    "applause",
    "gunshot",
];

/// Single-word shorthands for the most common programs.
const ALIASES: &[(&str, u8)] = &[
    ("piano", 0),
    ("epiano", 4),
    ("organ", 16),
    ("guitar", 24),
    ("bass", 32),
    ("strings", 48),
    ("harp", 46),
    ("choir", 52),
    ("horn", 60),
    ("sax", 65),
    ("saxophone", 65),
    ("synth", 80),
    ("pad", 88),
];

/// Look up a program number by instrument name.
///
/// # Examples
/// ```
/// use midiscript::instrument::program_for_name;
///
/// assert_eq!(program_for_name("Piano"), Some(0));
/// assert_eq!(program_for_name("violin"), Some(40));
/// assert_eq!(program_for_name("electric_bass_finger"), Some(33));
/// assert_eq!(program_for_name("kazoo"), None);
/// ```
pub fn program_for_name(name: &str) -> Option<u8> {
    let normalized = name.trim().to_lowercase().replace(['_', '-'], " ");
    if normalized.is_empty() {
        return None;
    }

    if let Some((_, program)) = ALIASES.iter().find(|(alias, _)| *alias == normalized) {
        return Some(*program);
    }

    // GM names themselves contain hyphens ("honky-tonk piano", "fx 8 sci-fi")
    GM_PROGRAM_NAMES
        .iter()
        .position(|gm| gm.replace('-', " ") == normalized)
        .map(|idx| idx as u8)
}

/// Resolve an `Instrument=` value: a bare integer or a name, unknown names → 0.
pub fn resolve_instrument(value: &str) -> u8 {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.parse::<u32>().map(|n| n.min(127) as u8).unwrap_or(127);
    }
    program_for_name(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_general_midi_order() {
        assert_eq!(GM_PROGRAM_NAMES[0], "acoustic grand piano");
        assert_eq!(GM_PROGRAM_NAMES[40], "violin");
        assert_eq!(GM_PROGRAM_NAMES[73], "flute");
        assert_eq!(GM_PROGRAM_NAMES[127], "gunshot");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(program_for_name("VIOLIN"), Some(40));
        assert_eq!(program_for_name("Trumpet"), Some(56));
    }

    #[test]
    fn test_separators() {
        assert_eq!(program_for_name("acoustic_grand_piano"), Some(0));
        assert_eq!(program_for_name("honky-tonk-piano"), Some(3));
        assert_eq!(program_for_name("french-horn"), Some(60));
    }

    #[test]
    fn test_resolve_instrument() {
        assert_eq!(resolve_instrument("41"), 41);
        assert_eq!(resolve_instrument("piano"), 0);
        assert_eq!(resolve_instrument("cello"), 42);
        assert_eq!(resolve_instrument("acoustic"), 0);
        assert_eq!(resolve_instrument("999"), 127);
        assert_eq!(resolve_instrument(""), 0);
    }
}
