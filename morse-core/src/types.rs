//! Core data types for the keying engine

use crate::hal::Instant;

/// Dit length in units
pub const DIT_UNITS: u32 = 1;
/// Dah length in units
pub const DAH_UNITS: u32 = 3;
/// Silence between elements of one character
pub const INTRA_CHAR_GAP_UNITS: u32 = 1;
/// Silence between characters
pub const INTER_CHAR_GAP_UNITS: u32 = 3;
/// Silence between words
pub const INTER_WORD_GAP_UNITS: u32 = 7;
/// Units in the word "PARIS " including its trailing word gap
pub const PARIS_UNITS_PER_WORD: u32 = 50;

/// Milliseconds per unit at 1 WPM (60 s / 50 units)
const MS_PER_UNIT_AT_1_WPM: f32 = 1200.0;

/// Unit time in milliseconds for a given speed (PARIS standard)
pub fn wpm_to_unit_ms(wpm: f32) -> f32 {
    MS_PER_UNIT_AT_1_WPM / wpm
}

/// Speed for a given unit time in milliseconds (PARIS standard)
pub fn unit_ms_to_wpm(unit_ms: f32) -> f32 {
    MS_PER_UNIT_AT_1_WPM / unit_ms
}

/// Morse code elements
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Element {
    /// Dit (short element)
    Dit,
    /// Dah (long element)
    Dah,
}

impl Element {
    /// Returns the duration of this element in units
    pub const fn duration_units(&self) -> u32 {
        match self {
            Element::Dit => DIT_UNITS,
            Element::Dah => DAH_UNITS,
        }
    }

    /// Dot/dash notation
    pub const fn symbol(&self) -> char {
        match self {
            Element::Dit => '.',
            Element::Dah => '-',
        }
    }
}

/// Keyed-up interval classes
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gap {
    /// Between elements of the same character
    IntraChar,
    /// Between characters
    InterChar,
    /// Between words
    InterWord,
}

impl Gap {
    /// Returns the nominal duration of this gap in units
    pub const fn duration_units(&self) -> u32 {
        match self {
            Gap::IntraChar => INTRA_CHAR_GAP_UNITS,
            Gap::InterChar => INTER_CHAR_GAP_UNITS,
            Gap::InterWord => INTER_WORD_GAP_UNITS,
        }
    }
}

/// A keyed-down interval after classification
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PulseEvent {
    pub kind: Element,
    pub duration_ms: f32,
}

/// A keyed-up interval after classification
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GapEvent {
    pub kind: Gap,
    pub duration_ms: f32,
}

/// Raw input delivered to the decoder.
///
/// `Down`/`Up` come from the input driver, `Tick` from the quiet-timeout
/// timer, `Abort` from the session owner.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum KeyEvent {
    /// Key pressed at the given time
    Down(Instant),
    /// Key released at the given time
    Up(Instant),
    /// Synthetic flush: check the quiet timeout at the given time
    Tick(Instant),
    /// Discard the pending pattern without resolving it
    Abort,
}

/// Decoder states
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DecoderState {
    /// Nothing pending, waiting for the first key-down
    Idle,
    /// Key held since the given time
    KeyDown(Instant),
    /// Key released at the given time with a pattern in progress
    Spacing(Instant),
    /// Key held through an abort; its release is dropped
    Discarding,
}

impl DecoderState {
    /// Returns true while the key is held
    pub const fn is_key_down(&self) -> bool {
        matches!(self, DecoderState::KeyDown(_) | DecoderState::Discarding)
    }
}

/// One resolved pattern
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DecodeResult {
    /// Decoded character, `None` when the pattern is unknown
    pub character: Option<char>,
    /// Target character this pattern was graded against
    pub expected: Option<char>,
    /// Grade against the target, `None` when there was nothing to compare to
    pub correct: Option<bool>,
    /// When the pattern was resolved
    pub timestamp: Instant,
}

impl DecodeResult {
    pub const fn is_unknown(&self) -> bool {
        self.character.is_none()
    }
}

/// Decoder output stream items
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DecoderOutput {
    /// A resolved pattern
    Character(DecodeResult),
    /// Word break after the preceding character
    WordBoundary(Instant),
}

/// One output instruction for a tone/LED driver
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Pulse {
    /// Signal on (tone/light) or off (silence)
    pub signal_on: bool,
    pub duration_ms: f32,
}

impl Pulse {
    pub const fn on(duration_ms: f32) -> Self {
        Self {
            signal_on: true,
            duration_ms,
        }
    }

    pub const fn off(duration_ms: f32) -> Self {
        Self {
            signal_on: false,
            duration_ms,
        }
    }
}
