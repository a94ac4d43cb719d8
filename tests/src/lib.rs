//! Host-based tests for the Morse keying engine

use morse_core::{DecodeResult, DecoderOutput, KeyEvent, MorseError, TrainingSession};

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod async_tasks;
#[cfg(test)]
mod persistence;
#[cfg(test)]
mod output_pins;

/// Everything a run of events produced
#[derive(Debug, Default)]
pub struct Transcript {
    /// Decoded text, '?' for unknown patterns, ' ' at word boundaries
    pub text: String,
    pub results: Vec<DecodeResult>,
    pub errors: Vec<MorseError>,
}

/// Feed events to a session and collect its output
pub fn run_session(session: &mut TrainingSession, events: &[KeyEvent]) -> Transcript {
    let mut transcript = Transcript::default();
    for event in events {
        match session.process(*event) {
            Ok(step) => {
                for output in step.outputs {
                    match output {
                        DecoderOutput::Character(result) => {
                            transcript.text.push(result.character.unwrap_or('?'));
                            transcript.results.push(result);
                        }
                        DecoderOutput::WordBoundary(_) => transcript.text.push(' '),
                    }
                }
            }
            Err(e) => transcript.errors.push(e),
        }
    }
    transcript
}
