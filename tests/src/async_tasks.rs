//! The engine's async tasks on the embassy mock time driver

use std::sync::{Mutex, MutexGuard};

use embassy_time::MockDriver;
use heapless::spsc::Queue;
use morse_core::encoder::sender_task;
use morse_core::input::quiet_timer_task;
use morse_core::session::session_task;
use morse_core::*;
use tokio_test::task;
use tokio_test::{assert_pending, assert_ready, assert_ready_ok};

/// The mock driver clock is global; tests that move it run one at a time
static CLOCK: Mutex<()> = Mutex::new(());

fn lock_clock() -> MutexGuard<'static, ()> {
    CLOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn advance(ms: u64) {
    MockDriver::get().advance(Duration::from_millis(ms));
}

/// "K" keyed at a 66 ms unit from `start`
fn keyed_k(start: Instant) -> [KeyEvent; 6] {
    let at = |ms: u64| start + Duration::from_millis(ms);
    [
        KeyEvent::Down(at(0)),
        KeyEvent::Up(at(198)),
        KeyEvent::Down(at(264)),
        KeyEvent::Up(at(330)),
        KeyEvent::Down(at(396)),
        KeyEvent::Up(at(594)),
    ]
}

#[test]
fn quiet_timer_ticks_on_its_interval() {
    let _clock = lock_clock();
    let queue = KeyEventQueue::new();
    let start = Instant::now();
    let mut timer = task::spawn(quiet_timer_task(&queue, Duration::from_millis(50)));

    assert_pending!(timer.poll());
    advance(49);
    assert_pending!(timer.poll());
    assert_eq!(queue.dequeue(), None);

    advance(1);
    assert!(timer.is_woken());
    assert_pending!(timer.poll());
    assert_eq!(queue.dequeue(), Some(KeyEvent::Tick(start + Duration::from_millis(50))));
    assert_eq!(queue.dequeue(), None);

    advance(50);
    assert_pending!(timer.poll());
    assert_eq!(queue.dequeue(), Some(KeyEvent::Tick(start + Duration::from_millis(100))));
}

#[test]
fn quiet_timeout_flushes_through_session_task() {
    let _clock = lock_clock();
    let start = Instant::now();
    let events = KeyEventQueue::new();
    let unit_time = SharedUnitTime::new(60.0);
    let mut outputs: Queue<DecoderOutput, 4> = Queue::new();
    let (producer, mut consumer) = outputs.split();

    let mut session = TrainingSession::new(default_config()).unwrap();
    session.extend_target("K");
    {
        let mut timer = task::spawn(quiet_timer_task(&events, Duration::from_millis(100)));
        let mut worker = task::spawn(session_task(
            &mut session,
            &events,
            &unit_time,
            producer,
            Duration::from_millis(10),
        ));

        for event in keyed_k(start) {
            events.enqueue(event).unwrap();
        }
        assert_pending!(timer.poll());
        assert_pending!(worker.poll());

        // Pattern still open, speed already published
        assert_eq!(consumer.dequeue(), None);
        assert!(unit_time.snapshot() > 60.0);

        // Silence after the last release passes the word threshold near 1000 ms
        for _ in 0..9 {
            advance(100);
            assert_pending!(timer.poll());
            assert_pending!(worker.poll());
        }
        assert_eq!(consumer.dequeue(), None);

        advance(100);
        assert_pending!(timer.poll());
        assert_pending!(worker.poll());
    }

    match consumer.dequeue() {
        Some(DecoderOutput::Character(result)) => {
            assert_eq!(result.character, Some('K'));
            assert_eq!(result.expected, Some('K'));
            assert_eq!(result.correct, Some(true));
        }
        other => panic!("expected a character, got {other:?}"),
    }
    assert!(matches!(consumer.dequeue(), Some(DecoderOutput::WordBoundary(_))));
    assert_eq!(consumer.dequeue(), None);

    assert_eq!(unit_time.snapshot(), session.unit_ms());
    assert_eq!(session.stats().tally('K').correct, 1);
}

#[test]
fn session_task_waits_for_a_full_consumer() {
    let _clock = lock_clock();
    let start = Instant::now();
    let events = KeyEventQueue::new();
    let unit_time = SharedUnitTime::new(60.0);
    // Room for one output at a time
    let mut outputs: Queue<DecoderOutput, 2> = Queue::new();
    let (producer, mut consumer) = outputs.split();

    let mut session = TrainingSession::new(default_config()).unwrap();
    let mut worker = task::spawn(session_task(
        &mut session,
        &events,
        &unit_time,
        producer,
        Duration::from_millis(10),
    ));

    for event in keyed_k(start) {
        events.enqueue(event).unwrap();
    }
    events.enqueue(KeyEvent::Tick(start + Duration::from_millis(2_000))).unwrap();
    assert_pending!(worker.poll());

    assert!(matches!(consumer.dequeue(), Some(DecoderOutput::Character(_))));
    // Word boundary is held back until there was room
    assert_eq!(consumer.dequeue(), None);

    advance(10);
    assert_pending!(worker.poll());
    assert!(matches!(consumer.dequeue(), Some(DecoderOutput::WordBoundary(_))));
}

#[test]
fn sender_task_keys_output_in_time() {
    let _clock = lock_clock();
    let mut key = mock::MockKeyOutput::new();
    {
        let train = KeyingEncoder::default().encode_text_at("A", 60.0);
        let mut sender = task::spawn(sender_task(train, &mut key, false));

        // dit 60, gap 60, dah 180
        assert_pending!(sender.poll());
        advance(59);
        assert_pending!(sender.poll());
        advance(1);
        assert!(sender.is_woken());
        assert_pending!(sender.poll());
        advance(60);
        assert_pending!(sender.poll());
        advance(179);
        assert_pending!(sender.poll());
        advance(1);
        assert_ready_ok!(sender.poll());
    }
    assert_eq!(key.transitions().as_slice(), &[true, false, true, false]);
    assert!(!key.is_active());
}

#[test]
fn sender_task_stops_on_unsupported_character() {
    let _clock = lock_clock();
    let mut key = mock::MockKeyOutput::new();
    {
        let train = KeyingEncoder::default().encode_text_at("E#", 60.0);
        let mut sender = task::spawn(sender_task(train, &mut key, false));
        assert_pending!(sender.poll());
        advance(60);
        let result = assert_ready!(sender.poll());
        assert_eq!(result, Err(MorseError::UnsupportedCharacter('#')));
    }
    // Output is released even on error
    assert_eq!(key.transitions().as_slice(), &[true, false]);
}

#[test]
fn sender_task_can_skip_unsupported_characters() {
    let _clock = lock_clock();
    let mut key = mock::MockKeyOutput::new();
    {
        let train = KeyingEncoder::default().encode_text_at("E#E", 60.0);
        let mut sender = task::spawn(sender_task(train, &mut key, true));
        let mut finished = false;
        for _ in 0..20 {
            if sender.poll().is_ready() {
                finished = true;
                break;
            }
            advance(60);
        }
        assert!(finished);
    }
    assert_eq!(key.transitions().as_slice(), &[true, false, true, false]);
}
