//! Keying decoder state machine
//!
//! Turns timestamped key-down/key-up events into dits, dahs and gaps, and
//! resolves completed patterns through the Morse table. Gap classification
//! happens on the next key-down; a `Tick` event resolves a pattern left
//! hanging at the end of a word or of input.

use heapless::Deque;

use crate::config::DecoderConfig;
use crate::error::{MorseError, Violation};
use crate::hal::{duration_ms, Instant};
use crate::table::{self, Pattern};
use crate::timing::TimingModel;
use crate::types::{DecodeResult, DecoderOutput, DecoderState, Element, Gap, GapEvent, KeyEvent, PulseEvent};

/// Characters the target cursor can hold ahead of the keyer
pub const TARGET_CAPACITY: usize = 256;

/// Outputs of one event: at most a character and a word boundary
pub type Emitted = heapless::Vec<DecoderOutput, 2>;

/// Expected text for graded dictation.
///
/// Advances one position per resolved pattern whether or not it matched, so
/// a miss never shifts the rest of the grading.
#[derive(Clone, Debug, Default)]
pub struct TargetCursor {
    pending: Deque<char, TARGET_CAPACITY>,
}

impl TargetCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue more expected text. Whitespace is skipped. Returns how many
    /// characters were accepted before the cursor filled up.
    pub fn extend(&mut self, text: &str) -> usize {
        let mut accepted = 0;
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            if self.pending.push_back(c.to_ascii_uppercase()).is_err() {
                break;
            }
            accepted += 1;
        }
        accepted
    }

    /// Grade a resolved pattern against the next expected character.
    /// Returns the expected character and whether it was matched.
    pub fn grade(&mut self, decoded: Option<char>) -> Option<(char, bool)> {
        let expected = self.pending.pop_front()?;
        Some((expected, decoded == Some(expected)))
    }

    /// Next expected character without consuming it
    pub fn peek(&self) -> Option<char> {
        self.pending.front().copied()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Keying decoder
pub struct KeyingDecoder {
    state: DecoderState,
    pattern: Pattern,
    overflowed: bool,
    last_event: Option<Instant>,
    last_pulse: Option<PulseEvent>,
    last_gap: Option<GapEvent>,
    config: DecoderConfig,
    target: TargetCursor,
}

impl KeyingDecoder {
    /// Create new decoder with given thresholds
    pub fn new(config: DecoderConfig) -> Result<Self, MorseError> {
        config.validate()?;
        Ok(Self {
            state: DecoderState::Idle,
            pattern: Pattern::new(),
            overflowed: false,
            last_event: None,
            last_pulse: None,
            last_gap: None,
            config,
            target: TargetCursor::new(),
        })
    }

    /// Get current state
    pub fn current_state(&self) -> DecoderState {
        self.state
    }

    /// Elements keyed since the last character boundary
    pub fn pending_pattern(&self) -> &[Element] {
        &self.pattern
    }

    /// Most recently classified press
    pub fn last_pulse(&self) -> Option<PulseEvent> {
        self.last_pulse
    }

    /// Most recently classified gap
    pub fn last_gap(&self) -> Option<GapEvent> {
        self.last_gap
    }

    pub fn target(&self) -> &TargetCursor {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut TargetCursor {
        &mut self.target
    }

    /// Process one event.
    ///
    /// Classification uses the unit time as it stands when the event arrives;
    /// each classified element is then fed back to `timing`. On a contract
    /// violation the decoder drops any partial pattern, returns to idle and
    /// leaves `timing` untouched.
    pub fn handle(&mut self, event: KeyEvent, timing: &mut TimingModel) -> Result<Emitted, MorseError> {
        let result = match event {
            KeyEvent::Down(at) => self.check_order(at).and_then(|_| self.handle_key_down(at, timing.unit_ms())),
            KeyEvent::Up(at) => self.check_order(at).and_then(|_| self.handle_key_up(at, timing)),
            KeyEvent::Tick(at) => Ok(self.handle_tick(at, timing.unit_ms())),
            KeyEvent::Abort => {
                self.abort();
                Ok(Emitted::new())
            }
        };

        if let Err(MorseError::InputContractViolation(_violation)) = result {
            #[cfg(feature = "defmt")]
            defmt::warn!("decoder: input contract violation {}, resetting", _violation);
            self.reset();
        }
        result
    }

    fn check_order(&mut self, at: Instant) -> Result<(), MorseError> {
        if let Some(last) = self.last_event {
            if at < last {
                return Err(Violation::TimestampRegression.into());
            }
        }
        self.last_event = Some(at);
        Ok(())
    }

    /// Handle key-down: classify the gap that just ended
    fn handle_key_down(&mut self, at: Instant, unit_ms: f32) -> Result<Emitted, MorseError> {
        let mut emitted = Emitted::new();

        match self.state {
            DecoderState::KeyDown(_) | DecoderState::Discarding => {
                return Err(Violation::DoubleKeyDown.into());
            }
            DecoderState::Idle => {}
            DecoderState::Spacing(up_at) => {
                let gap_ms = duration_ms(at.duration_since(up_at));
                let kind = self.classify_gap(gap_ms, unit_ms);
                self.last_gap = Some(GapEvent {
                    kind,
                    duration_ms: gap_ms,
                });
                match kind {
                    Gap::IntraChar => {}
                    Gap::InterChar => {
                        self.emit_resolution(at, &mut emitted);
                    }
                    Gap::InterWord => {
                        self.emit_resolution(at, &mut emitted);
                        emitted.push(DecoderOutput::WordBoundary(at)).ok();
                    }
                }
            }
        }

        self.state = DecoderState::KeyDown(at);
        Ok(emitted)
    }

    /// Handle key-up: classify the press and grow the pattern
    fn handle_key_up(&mut self, at: Instant, timing: &mut TimingModel) -> Result<Emitted, MorseError> {
        let down_at = match self.state {
            DecoderState::KeyDown(down_at) => down_at,
            DecoderState::Discarding => {
                // Release of a press that was aborted: nothing to classify
                self.state = DecoderState::Idle;
                return Ok(Emitted::new());
            }
            _ => return Err(Violation::KeyUpWithoutKeyDown.into()),
        };

        let press_ms = duration_ms(at.duration_since(down_at));
        let element = self.classify_press(press_ms, timing.unit_ms());
        timing.observe(press_ms, element);
        self.last_pulse = Some(PulseEvent {
            kind: element,
            duration_ms: press_ms,
        });

        #[cfg(feature = "defmt")]
        defmt::trace!("decoder: {=f32}ms -> {}", press_ms, element);

        if self.pattern.push(element).is_err() {
            // Longer than any table entry, resolves as unknown
            self.overflowed = true;
        }

        self.state = DecoderState::Spacing(at);
        Ok(Emitted::new())
    }

    /// Handle the quiet timeout: silence past the word threshold resolves
    /// the pending pattern and closes the word
    fn handle_tick(&mut self, at: Instant, unit_ms: f32) -> Emitted {
        let mut emitted = Emitted::new();
        if let DecoderState::Spacing(up_at) = self.state {
            // Ticks may be stamped slightly before the last key-up
            let Some(silence) = at.checked_duration_since(up_at) else {
                return emitted;
            };
            if duration_ms(silence) > self.config.word_gap_threshold * unit_ms {
                self.emit_resolution(at, &mut emitted);
                emitted.push(DecoderOutput::WordBoundary(at)).ok();
                self.state = DecoderState::Idle;
            }
        }
        emitted
    }

    /// Classify a keyed-down interval
    pub fn classify_press(&self, duration_ms: f32, unit_ms: f32) -> Element {
        if duration_ms < self.config.dit_dah_threshold * unit_ms {
            Element::Dit
        } else {
            Element::Dah
        }
    }

    /// Classify a keyed-up interval
    pub fn classify_gap(&self, duration_ms: f32, unit_ms: f32) -> Gap {
        if duration_ms < self.config.char_gap_threshold * unit_ms {
            Gap::IntraChar
        } else if duration_ms <= self.config.word_gap_threshold * unit_ms {
            Gap::InterChar
        } else {
            Gap::InterWord
        }
    }

    fn emit_resolution(&mut self, at: Instant, emitted: &mut Emitted) {
        let result = self.resolve(at);
        emitted.push(DecoderOutput::Character(result)).ok();
    }

    /// Resolve the pending pattern into exactly one result and clear it
    fn resolve(&mut self, at: Instant) -> DecodeResult {
        let character = if self.overflowed {
            None
        } else {
            table::decode(&self.pattern).ok()
        };

        #[cfg(feature = "defmt")]
        match character {
            Some(c) => defmt::debug!("decoder: {} -> {}", table::notation(&self.pattern).as_str(), c),
            None => defmt::debug!("decoder: unknown pattern {}", table::notation(&self.pattern).as_str()),
        }

        self.pattern.clear();
        self.overflowed = false;

        // An unknown pattern is a miss even when there is nothing to compare to
        let (expected, correct) = match self.target.grade(character) {
            Some((expected, matched)) => (Some(expected), Some(matched)),
            None if character.is_none() => (None, Some(false)),
            None => (None, None),
        };

        DecodeResult {
            character,
            expected,
            correct,
            timestamp: at,
        }
    }

    /// Drop the pending pattern without resolving it. A key still held
    /// is remembered so its release is swallowed.
    pub fn abort(&mut self) {
        self.pattern.clear();
        self.overflowed = false;
        self.state = if self.state.is_key_down() {
            DecoderState::Discarding
        } else {
            DecoderState::Idle
        };
    }

    /// Return to idle, forgetting pattern and event history
    pub fn reset(&mut self) {
        self.pattern.clear();
        self.overflowed = false;
        self.state = DecoderState::Idle;
        self.last_event = None;
        self.last_pulse = None;
        self.last_gap = None;
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}
