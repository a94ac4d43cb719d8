//! Engine configuration

use crate::error::MorseError;
use crate::types::{unit_ms_to_wpm, wpm_to_unit_ms};

/// Largest accuracy window the scheduler can hold
pub const MAX_WINDOW: usize = 128;

/// Timing model parameters
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Seed for the unit-time estimate
    pub initial_unit_ms: f32,
    /// Moving-average weight of each accepted observation (0, 1]
    pub smoothing: f32,
    /// Observations implying a unit change beyond this factor are ignored
    pub max_step_ratio: f32,
    /// Lower bound for the estimate
    pub min_unit_ms: f32,
    /// Upper bound for the estimate
    pub max_unit_ms: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial_unit_ms: 60.0, // 20 WPM
            smoothing: 0.25,
            max_step_ratio: 2.0,
            min_unit_ms: 10.0,   // 120 WPM
            max_unit_ms: 1200.0, // 1 WPM
        }
    }
}

impl TimingConfig {
    /// Create a configuration seeded from a speed
    pub fn from_wpm(wpm: f32) -> Result<Self, MorseError> {
        if !(wpm > 0.0) {
            return Err(MorseError::InvalidConfig("WPM must be positive"));
        }
        let config = Self {
            initial_unit_ms: wpm_to_unit_ms(wpm),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MorseError> {
        if !(self.min_unit_ms > 0.0) || !(self.max_unit_ms >= self.min_unit_ms) {
            return Err(MorseError::InvalidConfig("unit bounds must satisfy 0 < min <= max"));
        }
        if !(self.initial_unit_ms >= self.min_unit_ms && self.initial_unit_ms <= self.max_unit_ms) {
            return Err(MorseError::InvalidConfig("initial unit outside bounds"));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(MorseError::InvalidConfig("smoothing must be in (0, 1]"));
        }
        if !(self.max_step_ratio > 1.0) {
            return Err(MorseError::InvalidConfig("max step ratio must exceed 1"));
        }
        Ok(())
    }

    /// Seed speed in words per minute
    pub fn initial_wpm(&self) -> f32 {
        unit_ms_to_wpm(self.initial_unit_ms)
    }
}

/// Decoder classification thresholds, all in units
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Presses shorter than this are dits, the rest dahs
    pub dit_dah_threshold: f32,
    /// Gaps shorter than this continue the character
    pub char_gap_threshold: f32,
    /// Gaps longer than this end the word; also the quiet timeout
    pub word_gap_threshold: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        // Midpoints between the 1/3/7 unit references, word cutoff at 6
        Self {
            dit_dah_threshold: 2.0,
            char_gap_threshold: 2.0,
            word_gap_threshold: 6.0,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), MorseError> {
        if !(self.dit_dah_threshold > 1.0 && self.dit_dah_threshold < 3.0) {
            return Err(MorseError::InvalidConfig("dit/dah threshold must be between 1 and 3 units"));
        }
        if !(self.char_gap_threshold > 1.0) {
            return Err(MorseError::InvalidConfig("character gap threshold must exceed 1 unit"));
        }
        if !(self.word_gap_threshold > self.char_gap_threshold) {
            return Err(MorseError::InvalidConfig("word gap threshold must exceed character gap threshold"));
        }
        Ok(())
    }
}

/// Encoder parameters
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncoderConfig {
    /// Overall speed for Farnsworth spacing; elements keep the unit speed
    pub farnsworth_wpm: Option<f32>,
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<(), MorseError> {
        match self.farnsworth_wpm {
            Some(wpm) if !(wpm > 0.0) => Err(MorseError::InvalidConfig("Farnsworth WPM must be positive")),
            _ => Ok(()),
        }
    }
}

/// Koch scheduler parameters
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LessonConfig {
    /// Graded results considered for a transition
    pub window_size: usize,
    /// Advance when a full window reaches this accuracy
    pub advance_threshold: f32,
    /// Retreat when a full window falls below this accuracy
    pub retreat_threshold: f32,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            advance_threshold: 0.90,
            retreat_threshold: 0.70,
        }
    }
}

impl LessonConfig {
    pub fn validate(&self) -> Result<(), MorseError> {
        if self.window_size == 0 || self.window_size > MAX_WINDOW {
            return Err(MorseError::InvalidConfig("window size must be between 1 and 128"));
        }
        if !(self.advance_threshold > 0.0 && self.advance_threshold <= 1.0) {
            return Err(MorseError::InvalidConfig("advance threshold must be in (0, 1]"));
        }
        if !(self.retreat_threshold >= 0.0 && self.retreat_threshold < self.advance_threshold) {
            return Err(MorseError::InvalidConfig("retreat threshold must be in [0, advance)"));
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub timing: TimingConfig,
    pub decoder: DecoderConfig,
    pub encoder: EncoderConfig,
    pub lesson: LessonConfig,
}

impl EngineConfig {
    /// Create a new configuration with validation
    pub fn new(
        timing: TimingConfig,
        decoder: DecoderConfig,
        encoder: EncoderConfig,
        lesson: LessonConfig,
    ) -> Result<Self, MorseError> {
        let config = Self {
            timing,
            decoder,
            encoder,
            lesson,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MorseError> {
        self.timing.validate()?;
        self.decoder.validate()?;
        self.encoder.validate()?;
        self.lesson.validate()
    }
}
