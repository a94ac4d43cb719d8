#![cfg_attr(not(any(feature = "std", test)), no_std)]

//! # Morse Core
//!
//! Morse keying engine for training devices: adaptive-speed decoding of
//! straight-key input, text-to-pulse encoding and Koch-method lesson
//! scheduling. Runs on a host or on a microcontroller fed from GPIO
//! interrupts.

pub mod types;
pub mod config;
pub mod error;
pub mod table;
pub mod timing;
pub mod decoder;
pub mod encoder;
pub mod koch;
pub mod stats;
pub mod input;
pub mod session;
pub mod hal;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use config::*;
pub use error::*;
pub use timing::{Observation, SharedUnitTime, TimingModel};
pub use decoder::{Emitted, KeyingDecoder, TargetCursor};
pub use encoder::{KeyingEncoder, PulseTrain};
pub use koch::{KochScheduler, LessonChange, DEFAULT_KOCH_ORDER, KOCH_MIN_ACTIVE};
pub use stats::{CharTally, SessionStats};
pub use input::{KeyEventQueue, StraightKey};
pub use session::{ProfileSnapshot, Step, TrainingSession};
pub use hal::{*, Instant, Duration};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration for most training setups
pub fn default_config() -> EngineConfig {
    EngineConfig {
        timing: TimingConfig {
            initial_unit_ms: wpm_to_unit_ms(20.0),
            ..TimingConfig::default()
        },
        decoder: DecoderConfig::default(),
        encoder: EncoderConfig::default(),
        lesson: LessonConfig::default(),
    }
}
