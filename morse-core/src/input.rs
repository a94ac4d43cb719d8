//! Key input capture and the event queue feeding the session

use heapless::mpmc::MpMcQueue;
use portable_atomic::{AtomicBool, AtomicU64, Ordering};

use crate::hal::Instant;
use crate::types::KeyEvent;

/// Events waiting for the session. Multi-producer: the input driver and
/// the quiet-timeout timer both enqueue; the session is the only consumer.
pub type KeyEventQueue = MpMcQueue<KeyEvent, 64>;

/// Straight-key edge capture.
///
/// Safe to call from an interrupt handler. Debounces edges and drops
/// repeated edges of the same direction so the queue only ever carries
/// alternating Down/Up events.
pub struct StraightKey {
    pressed: AtomicBool,
    has_edge: AtomicBool,
    last_edge_us: AtomicU64,
    debounce_us: u64,
}

impl StraightKey {
    /// Create new key input with the given debounce time
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            pressed: AtomicBool::new(false),
            has_edge: AtomicBool::new(false),
            last_edge_us: AtomicU64::new(0),
            debounce_us: debounce_ms * 1000,
        }
    }

    /// Report a raw edge. Returns true if an event was enqueued.
    pub fn edge(&self, pressed: bool, at: Instant, queue: &KeyEventQueue) -> bool {
        if self.pressed.load(Ordering::Relaxed) == pressed {
            return false;
        }

        let now_us = at.as_micros();
        if self.has_edge.load(Ordering::Relaxed) {
            let last = self.last_edge_us.load(Ordering::Relaxed);
            if now_us.saturating_sub(last) < self.debounce_us {
                return false;
            }
        }

        let event = if pressed { KeyEvent::Down(at) } else { KeyEvent::Up(at) };
        if queue.enqueue(event).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("input: event queue full, edge dropped");
            return false;
        }

        self.pressed.store(pressed, Ordering::Relaxed);
        self.last_edge_us.store(now_us, Ordering::Relaxed);
        self.has_edge.store(true, Ordering::Relaxed);
        true
    }

    /// Check if the key is currently down
    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Relaxed)
    }

    /// Forget key state (e.g. when a session is aborted)
    pub fn reset(&self) {
        self.pressed.store(false, Ordering::Relaxed);
        self.has_edge.store(false, Ordering::Relaxed);
        self.last_edge_us.store(0, Ordering::Relaxed);
    }
}

impl Default for StraightKey {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Periodically enqueue a `Tick` so the session can notice a quiet key.
///
/// Only reads the clock and enqueues; all decoder state changes stay with
/// the session task.
#[cfg(feature = "embassy-time")]
pub async fn quiet_timer_task(queue: &KeyEventQueue, interval: crate::hal::Duration) -> ! {
    use embassy_time::Timer;

    #[cfg(feature = "defmt")]
    defmt::info!("quiet timer: started");

    loop {
        Timer::after(interval).await;
        // A full queue already holds work for the session; the next tick retries
        let _ = queue.enqueue(KeyEvent::Tick(Instant::now()));
    }
}
