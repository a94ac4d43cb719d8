//! Koch-method lesson scheduler

use heapless::{Deque, Vec};

use crate::config::{LessonConfig, MAX_WINDOW};
use crate::error::MorseError;
use crate::table;
use crate::types::DecodeResult;

/// Smallest lesson: the Koch method starts with a pair
pub const KOCH_MIN_ACTIVE: usize = 2;

/// Longest master ordering accepted
pub const MAX_ALPHABET: usize = 64;

/// Default introduction order: the trainer's lesson groups
/// (K M, R S U, A P W, B D X, C Y Z Q, F L V G, J O, H E), the letters they
/// leave out, then digits.
pub const DEFAULT_KOCH_ORDER: &str = "KMRSUAPWBDXCYZQFLVGJOHEINT1234567890";

/// Lesson transitions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LessonChange {
    /// A character was added to the drill set
    Advanced { active: usize, introduced: char },
    /// The newest character was dropped from the drill set
    Retreated { active: usize, dropped: char },
}

/// Lesson state machine.
///
/// The drill set is always a prefix of the master ordering, between
/// `KOCH_MIN_ACTIVE` and the full ordering long. Transitions need a full
/// accuracy window and clear it.
#[derive(Clone, Debug)]
pub struct KochScheduler {
    master: Vec<char, MAX_ALPHABET>,
    active: usize,
    window: Deque<bool, MAX_WINDOW>,
    config: LessonConfig,
}

impl KochScheduler {
    /// Scheduler over the default ordering
    pub fn new(config: LessonConfig) -> Result<Self, MorseError> {
        Self::with_ordering(config, DEFAULT_KOCH_ORDER)
    }

    /// Scheduler over a custom ordering of supported, distinct characters
    pub fn with_ordering(config: LessonConfig, ordering: &str) -> Result<Self, MorseError> {
        config.validate()?;

        let mut master = Vec::new();
        for c in ordering.chars().filter(|c| !c.is_whitespace()) {
            let c = c.to_ascii_uppercase();
            table::encode(c)?;
            if master.contains(&c) {
                return Err(MorseError::InvalidConfig("duplicate character in Koch ordering"));
            }
            master
                .push(c)
                .map_err(|_| MorseError::InvalidConfig("Koch ordering too long"))?;
        }
        if master.len() < KOCH_MIN_ACTIVE {
            return Err(MorseError::InvalidConfig("Koch ordering needs at least two characters"));
        }

        Ok(Self {
            master,
            active: KOCH_MIN_ACTIVE,
            window: Deque::new(),
            config,
        })
    }

    /// Record a decode result; ungraded results are ignored
    pub fn record(&mut self, result: &DecodeResult) -> Option<LessonChange> {
        result.correct.and_then(|correct| self.record_outcome(correct))
    }

    /// Record one graded outcome and apply any transition it triggers
    pub fn record_outcome(&mut self, correct: bool) -> Option<LessonChange> {
        while self.window.len() >= self.config.window_size {
            self.window.pop_front();
        }
        // Room guaranteed: window_size <= MAX_WINDOW
        self.window.push_back(correct).ok();

        if self.window.len() < self.config.window_size {
            return None;
        }

        let accuracy = self.accuracy()?;
        if accuracy >= self.config.advance_threshold && self.active < self.master.len() {
            let introduced = self.master[self.active];
            self.active += 1;
            self.window.clear();
            #[cfg(feature = "defmt")]
            defmt::info!("koch: advanced to {} characters (+{})", self.active, introduced);
            Some(LessonChange::Advanced {
                active: self.active,
                introduced,
            })
        } else if accuracy < self.config.retreat_threshold && self.active > KOCH_MIN_ACTIVE {
            self.active -= 1;
            let dropped = self.master[self.active];
            self.window.clear();
            #[cfg(feature = "defmt")]
            defmt::info!("koch: retreated to {} characters (-{})", self.active, dropped);
            Some(LessonChange::Retreated {
                active: self.active,
                dropped,
            })
        } else {
            None
        }
    }

    /// Mean of the accuracy window, `None` while empty
    pub fn accuracy(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        let correct = self.window.iter().filter(|c| **c).count();
        Some(correct as f32 / self.window.len() as f32)
    }

    /// Characters currently drilled
    pub fn active_characters(&self) -> &[char] {
        &self.master[..self.active]
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// The full introduction order
    pub fn master_ordering(&self) -> &[char] {
        &self.master
    }

    /// Graded outcomes in the window, oldest first
    pub fn window(&self) -> impl Iterator<Item = bool> + '_ {
        self.window.iter().copied()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Restore a saved lesson position
    pub fn restore(&mut self, active: usize, window: &[bool]) -> Result<(), MorseError> {
        if active < KOCH_MIN_ACTIVE || active > self.master.len() {
            return Err(MorseError::InvalidConfig("lesson size outside master ordering"));
        }
        if window.len() > self.config.window_size {
            return Err(MorseError::InvalidConfig("accuracy window larger than configured"));
        }
        self.active = active;
        self.window.clear();
        for outcome in window {
            self.window.push_back(*outcome).ok();
        }
        Ok(())
    }

    pub fn config(&self) -> &LessonConfig {
        &self.config
    }
}
