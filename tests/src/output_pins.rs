//! GPIO output driving with embedded-hal-mock

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};
use morse_core::*;

/// Key a train onto an output without waiting, leaving it off
fn play<K: OutputKey>(train: PulseTrain<'_>, key: &mut K) -> Result<(), MorseError> {
    for pulse in train {
        let pulse = pulse?;
        key.set_state(pulse.signal_on).map_err(|e| MorseError::Output(e.into()))?;
    }
    key.set_state(false).map_err(|e| MorseError::Output(e.into()))
}

#[test]
fn letter_a_on_active_high_pin() {
    let expectations = [
        Transaction::set(State::High),
        Transaction::set(State::Low),
        Transaction::set(State::High),
        Transaction::set(State::Low),
    ];
    let pin = PinMock::new(&expectations);
    let mut key = EmbeddedHalKeyOutput::new(pin, false);

    play(KeyingEncoder::default().encode_text_at("A", 60.0), &mut key).unwrap();

    key.release().done();
}

#[test]
fn inverted_pin_idles_high() {
    let expectations = [Transaction::set(State::Low), Transaction::set(State::High)];
    let pin = PinMock::new(&expectations);
    let mut key = EmbeddedHalKeyOutput::new(pin, true);

    play(KeyingEncoder::default().encode_text_at("E", 60.0), &mut key).unwrap();
    assert!(!key.get_state().unwrap());

    key.release().done();
}

#[test]
fn abort_on_unsupported_character_leaves_pin_as_is() {
    // "E#": the dit is keyed, then the error stops playback before release
    let expectations = [Transaction::set(State::High), Transaction::set(State::Low)];
    let pin = PinMock::new(&expectations);
    let mut key = EmbeddedHalKeyOutput::new(pin, false);

    let result = play(KeyingEncoder::default().encode_text_at("E#", 60.0), &mut key);
    assert_eq!(result, Err(MorseError::UnsupportedCharacter('#')));
    assert!(key.get_state().unwrap());

    // Caller turns the output off after an abort
    key.set_state(false).unwrap();
    key.release().done();
}

#[test]
fn mock_output_records_transitions() {
    let mut key = mock::MockKeyOutput::new();
    play(KeyingEncoder::default().encode_text_at("N", 60.0), &mut key).unwrap();
    // on, gap, on, final off
    assert_eq!(key.transitions().as_slice(), &[true, false, true, false]);
}
