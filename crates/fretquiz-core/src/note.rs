//! Note model: pitch classes, guitar strings, frets, and name normalization.
//!
//! Pitch classes are always spelled with sharps internally. Flats and
//! enharmonic spellings are accepted on input and folded onto the sharp
//! spelling by [`normalize_note`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// One of the twelve equal-tempered pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Note {
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
}

impl Note {
    /// All pitch classes in ascending order from C.
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::CSharp,
        Note::D,
        Note::DSharp,
        Note::E,
        Note::F,
        Note::FSharp,
        Note::G,
        Note::GSharp,
        Note::A,
        Note::ASharp,
        Note::B,
    ];

    /// Pitch class number, C = 0 through B = 11.
    pub fn pitch_class(self) -> u8 {
        self as u8
    }

    /// The note for a pitch class number, wrapping modulo 12.
    pub fn from_pitch_class(pc: u32) -> Self {
        Self::ALL[(pc % 12) as usize]
    }

    /// Move up by `semitones`, wrapping at the octave.
    pub fn transpose(self, semitones: u32) -> Self {
        Self::from_pitch_class(u32::from(self.pitch_class()) + semitones)
    }

    /// Canonical sharp-based spelling.
    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::CSharp => "C#",
            Note::D => "D",
            Note::DSharp => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::FSharp => "F#",
            Note::G => "G",
            Note::GSharp => "G#",
            Note::A => "A",
            Note::ASharp => "A#",
            Note::B => "B",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Note {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_note(s).ok_or_else(|| InputError::MalformedNote(s.to_string()))
    }
}

/// Flat and enharmonic spellings, keyed by their normalized uppercase form.
const NOTE_ALIASES: [(&str, Note); 9] = [
    ("B#", Note::C),
    ("CB", Note::B),
    ("DB", Note::CSharp),
    ("EB", Note::DSharp),
    ("E#", Note::F),
    ("FB", Note::E),
    ("GB", Note::FSharp),
    ("AB", Note::GSharp),
    ("BB", Note::ASharp),
];

/// Resolve free-form note text to a pitch class.
///
/// Accepts canonical names, the nine flat/enharmonic aliases, the words
/// `sharp` and `flat`, and the `♯`/`♭` glyphs, in any case and with any
/// whitespace. Returns `None` for anything else.
pub fn normalize_note(raw: &str) -> Option<Note> {
    let token: String = raw
        .trim()
        .to_uppercase()
        .replace("SHARP", "#")
        .replace("FLAT", "B")
        .replace('♯', "#")
        .replace('♭', "B")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if token.is_empty() {
        return None;
    }

    Note::ALL
        .iter()
        .copied()
        .find(|note| note.name() == token)
        .or_else(|| {
            NOTE_ALIASES
                .iter()
                .find(|(alias, _)| *alias == token)
                .map(|(_, note)| *note)
        })
}

/// Letter name of a string, as used by the "name the string" question.
///
/// Low and high E share the letter `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StringLetter {
    E,
    A,
    D,
    G,
    B,
}

impl StringLetter {
    /// Letters in the order they are offered to the player.
    pub const ALL: [StringLetter; 5] = [
        StringLetter::E,
        StringLetter::A,
        StringLetter::D,
        StringLetter::G,
        StringLetter::B,
    ];
}

impl fmt::Display for StringLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            StringLetter::E => "E",
            StringLetter::A => "A",
            StringLetter::D => "D",
            StringLetter::G => "G",
            StringLetter::B => "B",
        };
        f.write_str(letter)
    }
}

impl FromStr for StringLetter {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_string_letter(s).ok_or_else(|| InputError::UnknownStringLetter(s.to_string()))
    }
}

/// Resolve a string letter, ignoring case and surrounding whitespace.
pub fn normalize_string_letter(raw: &str) -> Option<StringLetter> {
    let letter = raw.trim().to_uppercase();
    StringLetter::ALL
        .iter()
        .copied()
        .find(|l| l.to_string() == letter)
}

/// Open-string pitch classes from string 6 (low E) to string 1 (high E).
const OPEN_NOTES: [Note; 6] = [Note::E, Note::A, Note::D, Note::G, Note::B, Note::E];

const STRING_LETTERS: [StringLetter; 6] = [
    StringLetter::E,
    StringLetter::A,
    StringLetter::D,
    StringLetter::G,
    StringLetter::B,
    StringLetter::E,
];

const PROMPT_NAMES: [&str; 6] = [
    "6th string (low E)",
    "5th string (A)",
    "4th string (D)",
    "3rd string (G)",
    "2nd string (B)",
    "1st string (high E)",
];

/// One of the six strings of a guitar in standard tuning.
///
/// Index 0 is the lowest-pitched string (string number 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GuitarString(u8);

impl GuitarString {
    pub const COUNT: usize = 6;

    /// All strings from low E to high E.
    pub const ALL: [GuitarString; 6] = [
        GuitarString(0),
        GuitarString(1),
        GuitarString(2),
        GuitarString(3),
        GuitarString(4),
        GuitarString(5),
    ];

    /// String by zero-based index, low E = 0.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// String by its conventional number, high E = 1, low E = 6.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=6 => Some(GuitarString(6 - number)),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn number(self) -> u8 {
        6 - self.0
    }

    pub fn letter(self) -> StringLetter {
        STRING_LETTERS[self.index()]
    }

    pub fn open_note(self) -> Note {
        OPEN_NOTES[self.index()]
    }

    /// Name used in prompts, e.g. "6th string (low E)".
    pub fn prompt_name(self) -> &'static str {
        PROMPT_NAMES[self.index()]
    }
}

impl TryFrom<u8> for GuitarString {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(usize::from(index))
            .ok_or_else(|| format!("string index out of range: {index}"))
    }
}

impl From<GuitarString> for u8 {
    fn from(s: GuitarString) -> u8 {
        s.0
    }
}

impl fmt::Display for GuitarString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt_name())
    }
}

/// A fret number in `0..=12`; fret 0 is the open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Fret(u8);

impl Fret {
    pub const MAX: u8 = 12;
    pub const OPEN: Fret = Fret(0);

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Fret(value))
    }

    /// Clamp `value` into range.
    pub fn saturating(value: u8) -> Self {
        Fret(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Every fret from open to the 12th.
    pub fn all() -> impl Iterator<Item = Fret> {
        (0..=Self::MAX).map(Fret)
    }
}

impl TryFrom<u8> for Fret {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("fret out of range: {value}"))
    }
}

impl From<Fret> for u8 {
    fn from(f: Fret) -> u8 {
        f.0
    }
}

impl fmt::Display for Fret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single cell of the fretboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub string: GuitarString,
    pub fret: Fret,
}

impl Position {
    pub fn new(string: GuitarString, fret: Fret) -> Self {
        Self { string, fret }
    }

    pub fn note(self) -> Note {
        note_at(self.string, self.fret)
    }
}

/// The pitch class sounding at `fret` on `string`.
pub fn note_at(string: GuitarString, fret: Fret) -> Note {
    string.open_note().transpose(u32::from(fret.value()))
}

/// English ordinal for a fret number: 1st, 2nd, 3rd, 11th, 12th.
pub fn ordinal(value: u8) -> String {
    let suffix = match (value % 100, value % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{value}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(index: usize) -> GuitarString {
        GuitarString::from_index(index).unwrap()
    }

    fn fret(value: u8) -> Fret {
        Fret::new(value).unwrap()
    }

    #[test]
    fn low_e_third_fret_is_g() {
        assert_eq!(note_at(string(0), fret(0)), Note::E);
        assert_eq!(note_at(string(0), fret(1)), Note::F);
        assert_eq!(note_at(string(0), fret(2)), Note::FSharp);
        assert_eq!(note_at(string(0), fret(3)), Note::G);
    }

    #[test]
    fn open_strings_are_standard_tuning() {
        let open: Vec<String> = GuitarString::ALL
            .iter()
            .map(|s| note_at(*s, Fret::OPEN).to_string())
            .collect();
        assert_eq!(open, vec!["E", "A", "D", "G", "B", "E"]);
    }

    #[test]
    fn note_at_is_periodic_over_the_octave() {
        for s in GuitarString::ALL {
            for f in Fret::all() {
                let note = note_at(s, f);
                assert!(Note::ALL.contains(&note));
                assert_eq!(
                    s.open_note().transpose(u32::from(f.value()) + 12),
                    note,
                    "string {} fret {}",
                    s.number(),
                    f
                );
            }
        }
    }

    #[test]
    fn twelfth_fret_matches_open_string() {
        for s in GuitarString::ALL {
            assert_eq!(note_at(s, fret(12)), s.open_note());
        }
    }

    #[test]
    fn canonical_names_round_trip() {
        for note in Note::ALL {
            assert_eq!(normalize_note(note.name()), Some(note));
            assert_eq!(note.name().parse::<Note>().unwrap(), note);
        }
    }

    #[test]
    fn aliases_fold_to_sharps() {
        let cases = [
            ("Db", Note::CSharp),
            ("Eb", Note::DSharp),
            ("Fb", Note::E),
            ("Gb", Note::FSharp),
            ("Ab", Note::GSharp),
            ("Bb", Note::ASharp),
            ("B#", Note::C),
            ("Cb", Note::B),
            ("E#", Note::F),
        ];
        for (alias, expected) in cases {
            assert_eq!(normalize_note(alias), Some(expected), "alias {alias}");
        }
    }

    #[test]
    fn words_glyphs_case_and_whitespace() {
        assert_eq!(normalize_note("  g "), Some(Note::G));
        assert_eq!(normalize_note("f sharp"), Some(Note::FSharp));
        assert_eq!(normalize_note("B flat"), Some(Note::ASharp));
        assert_eq!(normalize_note("C♯"), Some(Note::CSharp));
        assert_eq!(normalize_note("E♭"), Some(Note::DSharp));
        assert_eq!(normalize_note("gb"), Some(Note::FSharp));
    }

    #[test]
    fn rejects_unknown_tokens() {
        for raw in ["", "   ", "H", "C##", "Fbb", "D#b", "x", "12", "A#m"] {
            assert_eq!(normalize_note(raw), None, "should reject {raw:?}");
        }
        assert!(matches!(
            "H".parse::<Note>(),
            Err(InputError::MalformedNote(raw)) if raw == "H"
        ));
    }

    #[test]
    fn string_letters() {
        assert_eq!(normalize_string_letter(" e "), Some(StringLetter::E));
        assert_eq!(normalize_string_letter("b"), Some(StringLetter::B));
        assert_eq!(normalize_string_letter("C"), None);
        assert_eq!(normalize_string_letter("EA"), None);
        assert_eq!(normalize_string_letter(""), None);
        assert!("F".parse::<StringLetter>().is_err());
    }

    #[test]
    fn string_numbering() {
        assert_eq!(GuitarString::from_number(6), Some(string(0)));
        assert_eq!(GuitarString::from_number(1), Some(string(5)));
        assert_eq!(GuitarString::from_number(0), None);
        assert_eq!(GuitarString::from_number(7), None);
        assert_eq!(string(0).letter(), StringLetter::E);
        assert_eq!(string(5).letter(), StringLetter::E);
        assert_eq!(string(5).prompt_name(), "1st string (high E)");
        assert!(GuitarString::from_index(6).is_none());
    }

    #[test]
    fn fret_bounds() {
        assert!(Fret::new(12).is_some());
        assert!(Fret::new(13).is_none());
        assert_eq!(Fret::all().count(), 13);
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
    }
}
