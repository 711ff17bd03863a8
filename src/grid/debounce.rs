//! Trailing-edge debounce: every `schedule` cancels the pending timer and
//! starts a new one, so only the latest value is ever delivered.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    latest: Option<T>,
    timer: Option<CancellationToken>,
    fired_tx: mpsc::UnboundedSender<u64>,
    fired_rx: mpsc::UnboundedReceiver<u64>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            delay,
            generation: 0,
            latest: None,
            timer: None,
            fired_tx,
            fired_rx,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the timer. Must be called from
    /// within a Tokio runtime.
    pub fn schedule(&mut self, value: T) {
        self.cancel_timer();
        self.generation += 1;
        self.latest = Some(value);

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let fired_tx = self.fired_tx.clone();
        let generation = self.generation;
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = fired_tx.send(generation);
                }
            }
        });
        self.timer = Some(token);
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Wait for the pending timer and take its value. Returns `None` right
    /// away when nothing is scheduled.
    pub async fn next(&mut self) -> Option<T> {
        while self.latest.is_some() {
            let fired = self.fired_rx.recv().await?;
            // Timers that fired before being superseded are ignored
            if fired == self.generation {
                self.timer = None;
                return self.latest.take();
            }
        }
        None
    }

    /// Cancel the timer and take the pending value immediately
    pub fn flush(&mut self) -> Option<T> {
        self.cancel_timer();
        self.latest.take()
    }

    /// Drop the pending value without delivering it
    pub fn cancel(&mut self) {
        self.cancel_timer();
        self.latest = None;
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
