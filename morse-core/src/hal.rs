//! Hardware abstraction for the engine: time base and output drivers

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Microsecond instant used when no embassy time driver is linked
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Instant(u64);

    impl Instant {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms * 1000)
        }

        pub fn duration_since(&self, earlier: Instant) -> Duration {
            Duration(self.0.saturating_sub(earlier.0))
        }

        pub fn checked_duration_since(&self, earlier: Instant) -> Option<Duration> {
            self.0.checked_sub(earlier.0).map(Duration)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0 / 1000
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }
    }

    /// Microsecond duration
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_micros(us: u64) -> Self {
            Self(us)
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }
    }
}

/// Duration as fractional milliseconds
pub fn duration_ms(d: Duration) -> f32 {
    d.as_micros() as f32 / 1000.0
}

/// Fractional milliseconds as a duration, negative or NaN input maps to zero
pub fn ms_duration(ms: f32) -> Duration {
    if ms > 0.0 {
        Duration::from_micros((ms * 1000.0) as u64)
    } else {
        Duration::from_micros(0)
    }
}

use embedded_hal::digital::OutputPin;

/// Error types for output driver operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Signal output (buzzer, LED, sidetone gate).
pub trait OutputKey {
    type Error: Into<HalError>;

    /// Set signal state (true = tone/light on)
    fn set_state(&mut self, state: bool) -> Result<(), Self::Error>;

    /// Get current signal state
    fn get_state(&self) -> Result<bool, Self::Error>;

    /// Toggle signal state
    fn toggle(&mut self) -> Result<(), Self::Error> {
        let current = self.get_state()?;
        self.set_state(!current)
    }
}

/// Output driver for embedded-hal compatible pins.
///
/// Tracks the commanded level itself since `OutputPin` cannot be read back.
pub struct EmbeddedHalKeyOutput<P> {
    pin: P,
    inverted: bool,
    state: bool,
}

impl<P> EmbeddedHalKeyOutput<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            state: false,
        }
    }

    /// Give the pin back, e.g. to verify a mock
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> OutputKey for EmbeddedHalKeyOutput<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn set_state(&mut self, state: bool) -> Result<(), Self::Error> {
        let level = if self.inverted { !state } else { state };
        if level {
            self.pin.set_high().map_err(|_| HalError::GpioError)?;
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)?;
        }
        self.state = state;
        Ok(())
    }

    fn get_state(&self) -> Result<bool, Self::Error> {
        Ok(self.state)
    }
}

/// Presentation capabilities a front end offers the engine.
///
/// Graphical and text front ends both implement this; the engine only
/// pushes values through it.
pub trait PresentationSink {
    /// Show how long the current element or gap has lasted, in units
    fn render_timing_bar(&mut self, units: f32);

    /// Show the current sending speed
    fn render_wpm(&mut self, wpm: f32);

    /// Show decoded text
    fn render_text(&mut self, text: &str);
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use core::cell::RefCell;
    use heapless::Vec;

    /// Output that records every state change
    #[derive(Default)]
    pub struct MockKeyOutput {
        state: RefCell<bool>,
        transitions: RefCell<Vec<bool, 256>>,
    }

    impl MockKeyOutput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_active(&self) -> bool {
            *self.state.borrow()
        }

        /// Every state written, in order
        pub fn transitions(&self) -> Vec<bool, 256> {
            self.transitions.borrow().clone()
        }
    }

    impl OutputKey for MockKeyOutput {
        type Error = HalError;

        fn set_state(&mut self, state: bool) -> Result<(), Self::Error> {
            *self.state.borrow_mut() = state;
            self.transitions
                .borrow_mut()
                .push(state)
                .map_err(|_| HalError::GpioError)
        }

        fn get_state(&self) -> Result<bool, Self::Error> {
            Ok(*self.state.borrow())
        }
    }

    /// Presentation sink that keeps the last values pushed
    #[derive(Default)]
    pub struct MockPresentation {
        pub timing_bar: Option<f32>,
        pub wpm: Option<f32>,
        pub text: heapless::String<128>,
    }

    impl PresentationSink for MockPresentation {
        fn render_timing_bar(&mut self, units: f32) {
            self.timing_bar = Some(units);
        }

        fn render_wpm(&mut self, wpm: f32) {
            self.wpm = Some(wpm);
        }

        fn render_text(&mut self, text: &str) {
            self.text.push_str(text).ok();
        }
    }
}
