//! Camelot wheel codes and the key label lookup table.

use std::fmt;
use std::str::FromStr;

/// Mode letter of a wheel code: `A` for minor keys, `B` for major keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    A,
    B,
}

impl Mode {
    /// The opposite letter (relative major/minor).
    pub fn flip(self) -> Self {
        match self {
            Mode::A => Mode::B,
            Mode::B => Mode::A,
        }
    }
}

/// A position on the Camelot wheel, e.g. `8A`.
///
/// `number` is always in `1..=12`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CamelotCode {
    number: u8,
    mode: Mode,
}

impl CamelotCode {
    /// Build a code, returning `None` when `number` is outside `1..=12`.
    pub fn new(number: u8, mode: Mode) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self { number, mode })
    }

    pub fn number(self) -> u8 {
        self.number
    }

    pub fn mode(self) -> Mode {
        self.mode
    }

    /// Step around the wheel by `delta` positions, keeping the mode.
    pub fn shifted(self, delta: i8) -> Self {
        let n = (self.number as i16 - 1 + delta as i16).rem_euclid(12) as u8 + 1;
        Self {
            number: n,
            mode: self.mode,
        }
    }

    /// Same wheel number with the opposite mode letter.
    pub fn relative(self) -> Self {
        Self {
            number: self.number,
            mode: self.mode.flip(),
        }
    }
}

impl fmt::Display for CamelotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.mode {
            Mode::A => 'A',
            Mode::B => 'B',
        };
        write!(f, "{}{}", self.number, letter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCamelotError(String);

impl fmt::Display for ParseCamelotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a Camelot code: {:?}", self.0)
    }
}

impl std::error::Error for ParseCamelotError {}

impl FromStr for CamelotCode {
    type Err = ParseCamelotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCamelotError(s.to_string());
        let mode = match s.chars().last() {
            Some('A') => Mode::A,
            Some('B') => Mode::B,
            _ => return Err(err()),
        };
        let digits = &s[..s.len() - 1];
        let number: u8 = digits.parse().map_err(|_| err())?;
        CamelotCode::new(number, mode).ok_or_else(err)
    }
}

/// Canonical key labels in wheel order. Index `i` is wheel number `i + 1`.
const MINOR_KEYS: [&str; 12] = [
    "G#m", "D#m", "A#m", "Fm", "Cm", "Gm", "Dm", "Am", "Em", "Bm", "F#m", "C#m",
];
const MAJOR_KEYS: [&str; 12] = [
    "B", "F#", "C#", "G#", "D#", "A#", "F", "C", "G", "D", "A", "E",
];

/// Look up the wheel code for a key label such as `"Am"` or `"F#"`.
///
/// Only the 24 sharp spellings above match, and only exactly: flats,
/// lowercase variants and padded strings all yield `None`.
pub fn code_for(label: &str) -> Option<CamelotCode> {
    let (table, mode) = if label.ends_with('m') {
        (&MINOR_KEYS, Mode::A)
    } else {
        (&MAJOR_KEYS, Mode::B)
    };
    table
        .iter()
        .position(|k| *k == label)
        .map(|i| CamelotCode {
            number: i as u8 + 1,
            mode,
        })
}

/// Whether `label` is one of the 24 canonical key labels.
pub fn is_canonical_key(label: &str) -> bool {
    code_for(label).is_some()
}

/// Render an optional code the way the track tables show it.
pub fn code_text(code: Option<CamelotCode>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
