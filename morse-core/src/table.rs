//! Character <-> pattern table

use crate::error::MorseError;
use crate::types::Element;

/// Longest pattern in the table ('$')
pub const MAX_PATTERN_LEN: usize = 7;

/// Dit/dah sequence of one character in progress
pub type Pattern = heapless::Vec<Element, MAX_PATTERN_LEN>;

/// Prosigns the encoder accepts in bracket form, e.g. `[AR]`
pub const PROSIGNS: [&str; 6] = ["AR", "SK", "SOS", "BT", "KA", "KN"];

const DIT: Element = Element::Dit;
const DAH: Element = Element::Dah;

static TABLE: [(char, &[Element]); 54] = [
    ('A', &[DIT, DAH]),
    ('B', &[DAH, DIT, DIT, DIT]),
    ('C', &[DAH, DIT, DAH, DIT]),
    ('D', &[DAH, DIT, DIT]),
    ('E', &[DIT]),
    ('F', &[DIT, DIT, DAH, DIT]),
    ('G', &[DAH, DAH, DIT]),
    ('H', &[DIT, DIT, DIT, DIT]),
    ('I', &[DIT, DIT]),
    ('J', &[DIT, DAH, DAH, DAH]),
    ('K', &[DAH, DIT, DAH]),
    ('L', &[DIT, DAH, DIT, DIT]),
    ('M', &[DAH, DAH]),
    ('N', &[DAH, DIT]),
    ('O', &[DAH, DAH, DAH]),
    ('P', &[DIT, DAH, DAH, DIT]),
    ('Q', &[DAH, DAH, DIT, DAH]),
    ('R', &[DIT, DAH, DIT]),
    ('S', &[DIT, DIT, DIT]),
    ('T', &[DAH]),
    ('U', &[DIT, DIT, DAH]),
    ('V', &[DIT, DIT, DIT, DAH]),
    ('W', &[DIT, DAH, DAH]),
    ('X', &[DAH, DIT, DIT, DAH]),
    ('Y', &[DAH, DIT, DAH, DAH]),
    ('Z', &[DAH, DAH, DIT, DIT]),
    ('0', &[DAH, DAH, DAH, DAH, DAH]),
    ('1', &[DIT, DAH, DAH, DAH, DAH]),
    ('2', &[DIT, DIT, DAH, DAH, DAH]),
    ('3', &[DIT, DIT, DIT, DAH, DAH]),
    ('4', &[DIT, DIT, DIT, DIT, DAH]),
    ('5', &[DIT, DIT, DIT, DIT, DIT]),
    ('6', &[DAH, DIT, DIT, DIT, DIT]),
    ('7', &[DAH, DAH, DIT, DIT, DIT]),
    ('8', &[DAH, DAH, DAH, DIT, DIT]),
    ('9', &[DAH, DAH, DAH, DAH, DIT]),
    ('.', &[DIT, DAH, DIT, DAH, DIT, DAH]),
    (',', &[DAH, DAH, DIT, DIT, DAH, DAH]),
    ('?', &[DIT, DIT, DAH, DAH, DIT, DIT]),
    ('\'', &[DIT, DAH, DAH, DAH, DAH, DIT]),
    ('!', &[DAH, DIT, DAH, DIT, DAH, DAH]),
    ('/', &[DAH, DIT, DIT, DAH, DIT]),
    ('(', &[DAH, DIT, DAH, DAH, DIT]),
    (')', &[DAH, DIT, DAH, DAH, DIT, DAH]),
    ('&', &[DIT, DAH, DIT, DIT, DIT]),
    (':', &[DAH, DAH, DAH, DIT, DIT, DIT]),
    (';', &[DAH, DIT, DAH, DIT, DAH, DIT]),
    ('=', &[DAH, DIT, DIT, DIT, DAH]),
    ('+', &[DIT, DAH, DIT, DAH, DIT]),
    ('-', &[DAH, DIT, DIT, DIT, DIT, DAH]),
    ('_', &[DIT, DIT, DAH, DAH, DIT, DAH]),
    ('"', &[DIT, DAH, DIT, DIT, DAH, DIT]),
    ('$', &[DIT, DIT, DIT, DAH, DIT, DIT, DAH]),
    ('@', &[DIT, DAH, DAH, DIT, DAH, DIT]),
];

/// Every supported character, in table order
pub fn alphabet() -> impl Iterator<Item = char> {
    TABLE.iter().map(|(c, _)| *c)
}

/// Returns true if `c` (case-insensitive) can be sent
pub fn is_supported(c: char) -> bool {
    encode(c).is_ok()
}

/// Look up the pattern for a character. Lowercase letters fold to uppercase.
pub fn encode(c: char) -> Result<&'static [Element], MorseError> {
    let upper = c.to_ascii_uppercase();
    TABLE
        .iter()
        .find(|(ch, _)| *ch == upper)
        .map(|(_, pattern)| *pattern)
        .ok_or(MorseError::UnsupportedCharacter(c))
}

/// Look up the character for a keyed pattern
pub fn decode(pattern: &[Element]) -> Result<char, MorseError> {
    TABLE
        .iter()
        .find(|(_, p)| *p == pattern)
        .map(|(ch, _)| *ch)
        .ok_or(MorseError::UnknownPattern)
}

/// Render a pattern in dot/dash notation
pub fn notation(pattern: &[Element]) -> heapless::String<MAX_PATTERN_LEN> {
    let mut out = heapless::String::new();
    for element in pattern {
        // Capacity matches the longest pattern
        out.push(element.symbol()).ok();
    }
    out
}
