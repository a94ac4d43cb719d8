//! Text to timed pulse sequence

use core::str::Chars;

use crate::config::EncoderConfig;
use crate::error::MorseError;
use crate::table;
use crate::timing::TimingModel;
use crate::types::{unit_ms_to_wpm, Element, Gap, Pulse, INTER_CHAR_GAP_UNITS, INTER_WORD_GAP_UNITS};

/// Spacing units in "PARIS " that Farnsworth timing stretches
const FARNSWORTH_SPACING_UNITS: f32 = 19.0;

/// Encoder front end. Holds spacing options only; every `encode_text` call
/// starts a fresh, independent pulse train.
#[derive(Copy, Clone, Debug, Default)]
pub struct KeyingEncoder {
    config: EncoderConfig,
}

impl KeyingEncoder {
    pub fn new(config: EncoderConfig) -> Result<Self, MorseError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Encode at the timing model's current speed.
    ///
    /// The unit time is read once here; later speed changes do not affect
    /// the returned train.
    pub fn encode_text<'a>(&self, text: &'a str, timing: &TimingModel) -> PulseTrain<'a> {
        self.encode_text_at(text, timing.unit_ms())
    }

    /// Encode at an explicit unit time (e.g. a `SharedUnitTime` snapshot)
    pub fn encode_text_at<'a>(&self, text: &'a str, unit_ms: f32) -> PulseTrain<'a> {
        let (char_gap_ms, word_gap_ms) = self.spacing(unit_ms);
        PulseTrain {
            chars: text.chars(),
            unit_ms,
            char_gap_ms,
            word_gap_ms,
            current: None,
            element_gap_due: false,
            pending_gap: None,
            in_prosign: false,
        }
    }

    /// Character and word gap lengths in ms for a given unit time
    pub fn spacing(&self, unit_ms: f32) -> (f32, f32) {
        let standard = (
            unit_ms * INTER_CHAR_GAP_UNITS as f32,
            unit_ms * INTER_WORD_GAP_UNITS as f32,
        );
        let Some(overall_wpm) = self.config.farnsworth_wpm else {
            return standard;
        };
        let char_wpm = unit_ms_to_wpm(unit_ms);
        if overall_wpm >= char_wpm {
            return standard;
        }

        // ARRL: total added delay per word, spread over 19 spacing units
        let delay_ms = (60.0 * char_wpm - 37.2 * overall_wpm) / (overall_wpm * char_wpm) * 1000.0;
        let spacing_unit_ms = delay_ms / FARNSWORTH_SPACING_UNITS;
        (
            spacing_unit_ms * INTER_CHAR_GAP_UNITS as f32,
            spacing_unit_ms * INTER_WORD_GAP_UNITS as f32,
        )
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

/// Lazy pulse sequence for one piece of text.
///
/// Yields `Err(UnsupportedCharacter)` for a character outside the alphabet;
/// calling `next` again skips it and carries on with the following one, so
/// stopping at the first error aborts and continuing skips.
///
/// Spacing follows standard ratios: elements apart by one unit, characters
/// by three, words by seven. Bracketed runs such as `[SK]` are sent as one
/// prosign with no character gaps. No trailing silence is emitted after the
/// last character.
pub struct PulseTrain<'a> {
    chars: Chars<'a>,
    unit_ms: f32,
    char_gap_ms: f32,
    word_gap_ms: f32,
    current: Option<(&'static [Element], usize)>,
    element_gap_due: bool,
    pending_gap: Option<Gap>,
    in_prosign: bool,
}

impl PulseTrain<'_> {
    /// Unit time this train was built with
    pub fn unit_ms(&self) -> f32 {
        self.unit_ms
    }

    fn gap_ms(&self, gap: Gap) -> f32 {
        match gap {
            Gap::IntraChar => self.unit_ms,
            Gap::InterChar => self.char_gap_ms,
            Gap::InterWord => self.word_gap_ms,
        }
    }
}

impl Iterator for PulseTrain<'_> {
    type Item = Result<Pulse, MorseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((elements, index)) = self.current {
                if let Some(element) = elements.get(index) {
                    if self.element_gap_due {
                        self.element_gap_due = false;
                        return Some(Ok(Pulse::off(self.unit_ms)));
                    }
                    self.current = Some((elements, index + 1));
                    self.element_gap_due = true;
                    return Some(Ok(Pulse::on(self.unit_ms * element.duration_units() as f32)));
                }

                self.current = None;
                self.element_gap_due = false;
                self.pending_gap = Some(if self.in_prosign { Gap::IntraChar } else { Gap::InterChar });
            }

            let c = self.chars.next()?;
            match c {
                c if c.is_whitespace() => {
                    // Word gap only between characters, never leading or inside a prosign
                    if self.pending_gap.is_some() && !self.in_prosign {
                        self.pending_gap = Some(Gap::InterWord);
                    }
                }
                '[' if !self.in_prosign => self.in_prosign = true,
                ']' if self.in_prosign => {
                    self.in_prosign = false;
                    if self.pending_gap == Some(Gap::IntraChar) {
                        self.pending_gap = Some(Gap::InterChar);
                    }
                }
                c => match table::encode(c) {
                    Ok(elements) => {
                        self.current = Some((elements, 0));
                        if let Some(gap) = self.pending_gap.take() {
                            return Some(Ok(Pulse::off(self.gap_ms(gap))));
                        }
                    }
                    Err(e) => return Some(Err(e)),
                },
            }
        }
    }
}

/// Key an output driver with a pulse train.
///
/// Unsupported characters are skipped when `skip_unsupported` is set,
/// otherwise the first one aborts sending. The output is left off on return.
#[cfg(feature = "embassy-time")]
pub async fn sender_task<K: crate::hal::OutputKey>(
    train: PulseTrain<'_>,
    key: &mut K,
    skip_unsupported: bool,
) -> Result<(), MorseError> {
    use embassy_time::Timer;

    #[cfg(feature = "defmt")]
    defmt::info!("sender: start at {=f32}ms/unit", train.unit_ms());

    let mut outcome = Ok(());
    for item in train {
        let pulse = match item {
            Ok(pulse) => pulse,
            Err(e) if skip_unsupported => {
                #[cfg(feature = "defmt")]
                defmt::debug!("sender: skipping {}", e);
                let _ = e;
                continue;
            }
            Err(e) => {
                outcome = Err(e);
                break;
            }
        };

        if let Err(e) = key.set_state(pulse.signal_on) {
            outcome = Err(MorseError::Output(e.into()));
            break;
        }
        Timer::after(crate::hal::ms_duration(pulse.duration_ms)).await;
    }

    key.set_state(false).map_err(|e| MorseError::Output(e.into()))?;
    outcome
}
