//! Training session: decoder, timing, lesson and stats wired together

use heapless::Vec;

use crate::config::{EngineConfig, MAX_WINDOW};
use crate::decoder::{Emitted, KeyingDecoder};
use crate::encoder::{KeyingEncoder, PulseTrain};
use crate::error::MorseError;
use crate::hal::{duration_ms, Instant, PresentationSink};
use crate::koch::{KochScheduler, LessonChange, DEFAULT_KOCH_ORDER};
use crate::stats::SessionStats;
use crate::timing::TimingModel;
use crate::types::{DecoderOutput, DecoderState, KeyEvent};

/// Shown for a pattern that matched nothing
pub const UNKNOWN_GLYPH: char = '?';

/// What one processed event produced
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Step {
    pub outputs: Emitted,
    pub lesson_change: Option<LessonChange>,
}

impl Step {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty() && self.lesson_change.is_none()
    }
}

/// Per-profile state needed to resume at the same speed and lesson
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileSnapshot {
    pub unit_ms: f32,
    pub lesson_active_count: usize,
    /// Graded outcomes, oldest first
    pub accuracy_window: Vec<bool, MAX_WINDOW>,
}

/// One trainee's session.
///
/// Owns every piece of mutable engine state; all of it changes only through
/// `process`, so a session is driven from a single task.
pub struct TrainingSession {
    config: EngineConfig,
    timing: TimingModel,
    decoder: KeyingDecoder,
    koch: KochScheduler,
    stats: SessionStats,
    encoder: KeyingEncoder,
}

impl TrainingSession {
    pub fn new(config: EngineConfig) -> Result<Self, MorseError> {
        Self::with_ordering(config, DEFAULT_KOCH_ORDER)
    }

    /// Session with a custom Koch master ordering
    pub fn with_ordering(config: EngineConfig, ordering: &str) -> Result<Self, MorseError> {
        config.validate()?;
        Ok(Self {
            config,
            timing: TimingModel::new(config.timing)?,
            decoder: KeyingDecoder::new(config.decoder)?,
            koch: KochScheduler::with_ordering(config.lesson, ordering)?,
            stats: SessionStats::new(),
            encoder: KeyingEncoder::new(config.encoder)?,
        })
    }

    /// Feed one key event through the decoder and, for each resolved
    /// pattern, into the statistics and the lesson scheduler
    pub fn process(&mut self, event: KeyEvent) -> Result<Step, MorseError> {
        let outputs = self.decoder.handle(event, &mut self.timing)?;

        let mut lesson_change = None;
        for output in outputs.iter() {
            if let DecoderOutput::Character(result) = output {
                self.stats.record(result);
                if let Some(change) = self.koch.record(result) {
                    lesson_change = Some(change);
                }
            }
        }

        Ok(Step {
            outputs,
            lesson_change,
        })
    }

    /// Queue expected text for grading. Returns the characters accepted.
    pub fn extend_target(&mut self, text: &str) -> usize {
        self.decoder.target_mut().extend(text)
    }

    pub fn clear_target(&mut self) {
        self.decoder.target_mut().clear();
    }

    /// Drop partial input; nothing pending is resolved or graded
    pub fn abort(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::info!("session: abort");
        self.decoder.abort();
    }

    /// Encode text at the current speed
    pub fn encode_text<'a>(&self, text: &'a str) -> PulseTrain<'a> {
        self.encoder.encode_text(text, &self.timing)
    }

    pub fn unit_ms(&self) -> f32 {
        self.timing.unit_ms()
    }

    pub fn wpm(&self) -> f32 {
        self.timing.current_wpm()
    }

    pub fn timing(&self) -> &TimingModel {
        &self.timing
    }

    pub fn decoder(&self) -> &KeyingDecoder {
        &self.decoder
    }

    pub fn koch(&self) -> &KochScheduler {
        &self.koch
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Save speed and lesson position
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            unit_ms: self.timing.unit_ms(),
            lesson_active_count: self.koch.active_count(),
            accuracy_window: self.koch.window().collect(),
        }
    }

    /// Resume from a snapshot. Nothing changes if the snapshot is invalid.
    pub fn restore(&mut self, snapshot: &ProfileSnapshot) -> Result<(), MorseError> {
        let mut timing = self.timing.clone();
        timing.set_unit_ms(snapshot.unit_ms)?;
        self.koch
            .restore(snapshot.lesson_active_count, &snapshot.accuracy_window)?;
        self.timing = timing;
        self.decoder.reset();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "session: restored {=f32}ms/unit, {} characters",
            snapshot.unit_ms,
            snapshot.lesson_active_count
        );
        Ok(())
    }

    /// Push a step's text and the current speed to a front end
    pub fn render_step<S: PresentationSink>(&self, step: &Step, sink: &mut S) {
        for output in step.outputs.iter() {
            match output {
                DecoderOutput::Character(result) => {
                    let mut buf = [0u8; 4];
                    let c = result.character.unwrap_or(UNKNOWN_GLYPH);
                    sink.render_text(c.encode_utf8(&mut buf));
                }
                DecoderOutput::WordBoundary(_) => sink.render_text(" "),
            }
        }
        sink.render_wpm(self.wpm());
    }

    /// Push how long the current press or silence has lasted, in units
    pub fn render_timing<S: PresentationSink>(&self, now: Instant, sink: &mut S) {
        let since = match self.decoder.current_state() {
            DecoderState::Idle | DecoderState::Discarding => {
                sink.render_timing_bar(0.0);
                return;
            }
            DecoderState::KeyDown(at) | DecoderState::Spacing(at) => at,
        };
        // A clock read before the last edge shows an empty bar
        let elapsed = duration_ms(now.checked_duration_since(since).unwrap_or_default());
        sink.render_timing_bar(elapsed / self.timing.unit_ms());
    }
}

/// Drain the event queue into a session.
///
/// Publishes the unit time after every event and forwards decoder outputs
/// to the consumer, waiting while its queue is full. Contract violations
/// are logged and the session carries on from idle.
#[cfg(feature = "embassy-time")]
pub async fn session_task<const N: usize>(
    session: &mut TrainingSession,
    events: &crate::input::KeyEventQueue,
    unit_time: &crate::timing::SharedUnitTime,
    mut outputs: heapless::spsc::Producer<'_, DecoderOutput, N>,
    poll: crate::hal::Duration,
) -> ! {
    use embassy_time::Timer;

    #[cfg(feature = "defmt")]
    defmt::info!("session: started at {=f32} WPM", session.wpm());

    loop {
        while let Some(event) = events.dequeue() {
            match session.process(event) {
                Ok(step) => {
                    for output in step.outputs {
                        let mut pending = output;
                        while let Err(back) = outputs.enqueue(pending) {
                            pending = back;
                            Timer::after(poll).await;
                        }
                    }
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("session: {}", _e);
                }
            }
            unit_time.publish(session.unit_ms());
        }
        Timer::after(poll).await;
    }
}
