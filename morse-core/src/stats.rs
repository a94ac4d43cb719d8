//! Per-session accuracy and speed analytics

use heapless::LinearMap;

use crate::hal::{duration_ms, Instant};
use crate::types::DecodeResult;

/// Characters per word for the character-count speed figure
const CHARS_PER_WORD: f32 = 5.0;

/// Correct/incorrect counts for one character
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CharTally {
    pub correct: u32,
    pub incorrect: u32,
}

impl CharTally {
    pub fn attempts(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }
}

/// Running totals over every decode result of a session
#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    /// Keyed by the expected character
    tallies: LinearMap<char, CharTally, 64>,
    total: u32,
    graded: u32,
    correct: u32,
    unknown: u32,
    first_at: Option<Instant>,
    last_at: Option<Instant>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &DecodeResult) {
        self.total = self.total.saturating_add(1);
        if result.is_unknown() {
            self.unknown = self.unknown.saturating_add(1);
        }
        self.first_at.get_or_insert(result.timestamp);
        self.last_at = Some(result.timestamp);

        let Some(correct) = result.correct else {
            return;
        };
        self.graded = self.graded.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
        // Ungraded unknown patterns have no character to charge
        if let Some(c) = result.expected {
            let mut tally = self.tallies.get(&c).copied().unwrap_or_default();
            if correct {
                tally.correct = tally.correct.saturating_add(1);
            } else {
                tally.incorrect = tally.incorrect.saturating_add(1);
            }
            // Full map drops characters outside the alphabet
            self.tallies.insert(c, tally).ok();
        }
    }

    /// Resolved patterns, graded or not
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn graded(&self) -> u32 {
        self.graded
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn unknown(&self) -> u32 {
        self.unknown
    }

    /// Share of graded results that were correct
    pub fn accuracy(&self) -> Option<f32> {
        if self.graded == 0 {
            None
        } else {
            Some(self.correct as f32 / self.graded as f32)
        }
    }

    /// Tally for a target character
    pub fn tally(&self, c: char) -> CharTally {
        self.tallies.get(&c).copied().unwrap_or_default()
    }

    /// Characters decoded per minute over the session, in 5-character words.
    /// Needs at least two results.
    pub fn realtime_wpm(&self) -> Option<f32> {
        let (first, last) = (self.first_at?, self.last_at?);
        let minutes = duration_ms(last.duration_since(first)) / 60_000.0;
        if minutes <= 0.0 {
            return None;
        }
        Some(self.total.saturating_sub(1) as f32 / CHARS_PER_WORD / minutes)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
