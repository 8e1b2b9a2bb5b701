//! Debounce timer for search input.
//!
//! DESIGN
//! ======
//! An explicit state machine instead of a timer callback: each `push`
//! replaces the pending value and restarts the window, `poll` releases the
//! value once the window has elapsed, and released values equal to the last
//! applied one are dropped. The async `next` drives it from a channel.
//!
//! Time comes from `tokio::time`, so paused-clock tests advance it
//! deterministically.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
    last_applied: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None, last_applied: None }
    }

    /// Start with `value` already applied, so pushing it again is a no-op.
    #[must_use]
    pub fn with_applied(window: Duration, value: T) -> Self {
        Self { window, pending: None, last_applied: Some(value) }
    }

    /// Replace any pending value and restart the window.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.window));
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.release(),
            _ => None,
        }
    }

    /// Release the pending value without waiting.
    pub fn flush(&mut self) -> Option<T> {
        self.release()
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Record `value` as applied by some other path (for example a reset).
    pub fn mark_applied(&mut self, value: T) {
        self.pending = None;
        self.last_applied = Some(value);
    }

    #[must_use]
    pub fn last_applied(&self) -> Option<&T> {
        self.last_applied.as_ref()
    }

    /// Wait for the next value that survives the window, feeding `rx` into
    /// the timer. A closed channel flushes what is pending; `None` once the
    /// channel is closed and nothing is left.
    pub async fn next(&mut self, rx: &mut mpsc::Receiver<T>) -> Option<T> {
        loop {
            let Some(deadline) = self.deadline() else {
                let value = rx.recv().await?;
                self.push(value);
                continue;
            };
            tokio::select! {
                received = rx.recv() => match received {
                    Some(value) => self.push(value),
                    None => return self.flush(),
                },
                () = tokio::time::sleep_until(deadline) => {
                    if let Some(value) = self.poll(Instant::now()) {
                        return Some(value);
                    }
                }
            }
        }
    }

    fn release(&mut self) -> Option<T> {
        let (value, _) = self.pending.take()?;
        if self.last_applied.as_ref() == Some(&value) {
            return None;
        }
        self.last_applied = Some(value.clone());
        Some(value)
    }
}
