//! Test utilities for the keying engine

pub mod keying_script {
    //! Scripted straight-key input

    use crate::hal::Instant;
    use crate::table;
    use crate::types::{Element, KeyEvent, DAH_UNITS, INTER_CHAR_GAP_UNITS, INTER_WORD_GAP_UNITS};
    use std::vec::Vec;

    /// Press/release timeline of an operator keying text
    #[derive(Debug, Clone)]
    pub struct KeyingScript {
        events: Vec<KeyEvent>,
        unit_ms: u64,
        now_ms: u64,
        /// A key-up has been written and nothing followed it yet
        open: bool,
    }

    impl KeyingScript {
        /// Empty script at the given unit, starting at `start_ms`
        pub fn new(unit_ms: u64, start_ms: u64) -> Self {
            Self {
                events: Vec::new(),
                unit_ms,
                now_ms: start_ms,
                open: false,
            }
        }

        /// Script of `text` keyed with exact 1/3/7 timing.
        ///
        /// Unsupported characters are left out.
        pub fn from_text(text: &str, unit_ms: u64) -> Self {
            let mut script = Self::new(unit_ms, 0);
            script.text(text);
            script
        }

        /// Key text, words separated by whitespace
        pub fn text(&mut self, text: &str) -> &mut Self {
            for (i, word) in text.split_whitespace().enumerate() {
                if i > 0 {
                    self.word_gap();
                }
                for c in word.chars() {
                    self.character(c);
                }
            }
            self
        }

        /// Key one character, preceded by a character gap if needed
        pub fn character(&mut self, c: char) -> &mut Self {
            let Ok(elements) = table::encode(c) else {
                return self;
            };
            if self.open {
                self.now_ms += self.unit_ms * INTER_CHAR_GAP_UNITS as u64;
            }
            for element in elements {
                let len = match element {
                    Element::Dit => self.unit_ms,
                    Element::Dah => self.unit_ms * DAH_UNITS as u64,
                };
                self.press(len);
                self.now_ms += self.unit_ms;
            }
            self.now_ms -= self.unit_ms;
            self.open = true;
            self
        }

        /// Key down for `len_ms` at the current time
        pub fn press(&mut self, len_ms: u64) -> &mut Self {
            self.events.push(KeyEvent::Down(Instant::from_millis(self.now_ms)));
            self.now_ms += len_ms;
            self.events.push(KeyEvent::Up(Instant::from_millis(self.now_ms)));
            self
        }

        /// Silence of `ms`
        pub fn pause(&mut self, ms: u64) -> &mut Self {
            self.now_ms += ms;
            self
        }

        /// Bring the next character a word gap away instead of a character gap
        pub fn word_gap(&mut self) -> &mut Self {
            if self.open {
                self.now_ms += self.unit_ms * (INTER_WORD_GAP_UNITS - INTER_CHAR_GAP_UNITS) as u64;
            }
            self
        }

        /// Quiet-timeout tick `after_ms` past the current time
        pub fn tick(&mut self, after_ms: u64) -> &mut Self {
            self.now_ms += after_ms;
            self.events.push(KeyEvent::Tick(Instant::from_millis(self.now_ms)));
            self.open = false;
            self
        }

        /// Tick far enough out to flush the last character
        pub fn flush(&mut self) -> &mut Self {
            let after = self.unit_ms * 10;
            self.tick(after)
        }

        pub fn events(&self) -> &[KeyEvent] {
            &self.events
        }

        pub fn into_events(self) -> Vec<KeyEvent> {
            self.events
        }

        /// Current script time in ms
        pub fn now_ms(&self) -> u64 {
            self.now_ms
        }
    }
}

pub mod output_capture {
    //! Pulse capture and analysis

    use crate::error::MorseError;
    use crate::types::Pulse;
    use std::string::String;
    use std::vec::Vec;

    /// Pulses collected from an encoder
    #[derive(Debug, Clone, Default)]
    pub struct PulseCapture {
        pulses: Vec<Pulse>,
        errors: Vec<MorseError>,
    }

    impl PulseCapture {
        pub fn new() -> Self {
            Self::default()
        }

        /// Drain a pulse train, keeping errors aside
        pub fn collect<I>(train: I) -> Self
        where
            I: IntoIterator<Item = Result<Pulse, MorseError>>,
        {
            let mut capture = Self::new();
            for item in train {
                match item {
                    Ok(pulse) => capture.pulses.push(pulse),
                    Err(e) => capture.errors.push(e),
                }
            }
            capture
        }

        pub fn pulses(&self) -> &[Pulse] {
            &self.pulses
        }

        pub fn errors(&self) -> &[MorseError] {
            &self.errors
        }

        /// Sum of all pulse durations
        pub fn total_ms(&self) -> f32 {
            self.pulses.iter().map(|p| p.duration_ms).sum()
        }

        /// Render as dots and dashes relative to `unit_ms`: one space between
        /// characters, " / " between words
        pub fn to_morse_string(&self, unit_ms: f32) -> String {
            let mut out = String::new();
            for pulse in &self.pulses {
                let units = pulse.duration_ms / unit_ms;
                match (pulse.signal_on, units) {
                    (true, u) if u < 2.0 => out.push('.'),
                    (true, _) => out.push('-'),
                    (false, u) if u < 2.0 => {}
                    (false, u) if u <= 6.0 => out.push(' '),
                    (false, _) => out.push_str(" / "),
                }
            }
            out
        }
    }
}

pub use keying_script::KeyingScript;
pub use output_capture::PulseCapture;
