//! Event queue fed from concurrent input and timer tasks

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use morse_core::test_utils::{KeyingScript, PulseCapture};
use morse_core::*;
use tokio_test::assert_ok;

static EVENTS: KeyEventQueue = KeyEventQueue::new();

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn key_and_timer_tasks_share_the_queue() {
    let clock = Arc::new(AtomicU64::new(0));
    let done = Arc::new(AtomicBool::new(false));
    let events = KeyingScript::from_text("CQ CQ", 60).into_events();

    // Input driver: edges stamped by a simulated clock
    let input = {
        let clock = clock.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let key = StraightKey::new(5);
            for event in events {
                let (pressed, at) = match event {
                    KeyEvent::Down(at) => (true, at),
                    KeyEvent::Up(at) => (false, at),
                    _ => continue,
                };
                clock.store(at.as_millis(), Ordering::SeqCst);
                while !key.edge(pressed, at, &EVENTS) {
                    tokio::task::yield_now().await;
                }
                tokio::task::yield_now().await;
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    // Quiet timer: only reads the clock and enqueues
    let timer = tokio::spawn(async move {
        while !done.load(Ordering::SeqCst) {
            let _ = EVENTS.enqueue(KeyEvent::Tick(Instant::from_millis(clock.load(Ordering::SeqCst))));
            tokio::time::sleep(std::time::Duration::from_micros(200)).await;
        }
        let last = clock.load(Ordering::SeqCst);
        while EVENTS.enqueue(KeyEvent::Tick(Instant::from_millis(last + 1_000))).is_err() {
            tokio::task::yield_now().await;
        }
    });

    let mut session = TrainingSession::new(default_config()).unwrap();
    let mut text = String::new();
    loop {
        let finished = input.is_finished() && timer.is_finished();
        match EVENTS.dequeue() {
            Some(event) => {
                let step = assert_ok!(session.process(event));
                for output in step.outputs {
                    match output {
                        DecoderOutput::Character(result) => text.push(result.character.unwrap_or('?')),
                        DecoderOutput::WordBoundary(_) => text.push(' '),
                    }
                }
            }
            None if finished => break,
            None => tokio::task::yield_now().await,
        }
    }

    assert_eq!(text, "CQ CQ ");
    assert!(input.await.is_ok());
}

#[test]
fn encoder_reads_one_speed_per_call() {
    let shared = SharedUnitTime::new(60.0);
    let encoder = KeyingEncoder::default();

    let train = encoder.encode_text_at("TT", shared.snapshot());
    shared.publish(100.0);
    let capture = PulseCapture::collect(train);
    assert_eq!(capture.pulses()[0], Pulse::on(180.0));
    assert_eq!(capture.pulses()[2], Pulse::on(180.0));

    let capture = PulseCapture::collect(encoder.encode_text_at("T", shared.snapshot()));
    assert_eq!(capture.pulses()[0], Pulse::on(300.0));
}

#[test]
fn encoding_while_speed_changes() {
    let shared = Arc::new(SharedUnitTime::new(60.0));

    let writer = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            for i in 0..1_000 {
                shared.publish(if i % 2 == 0 { 50.0 } else { 80.0 });
            }
        })
    };

    let encoder = KeyingEncoder::default();
    for _ in 0..200 {
        let train = encoder.encode_text_at("PARIS", shared.snapshot());
        let unit = train.unit_ms();
        assert!([60.0, 50.0, 80.0].contains(&unit));
        // Every pulse of one train uses the same unit
        for pulse in PulseCapture::collect(train).pulses() {
            let units = pulse.duration_ms / unit;
            assert!([1.0, 3.0].contains(&units), "{} ms at {} ms/unit", pulse.duration_ms, unit);
        }
    }

    writer.join().unwrap();
}
