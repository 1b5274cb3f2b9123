//! Reference-counted loading indicator
//!
//! Every dispatched request holds an `InFlight` guard. The overlay is shown on
//! the first `begin` and hidden only when the in-flight count reads zero at the
//! moment a hide fires. Success hides after a delay so bursts of sequential
//! requests do not flicker; failure hides at once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Default)]
struct Counter {
    in_flight: usize,
    visible: bool,
}

#[derive(Debug)]
struct Inner {
    counter: Mutex<Counter>,
    overlay: watch::Sender<Overlay>,
    hide_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    inner: Arc<Inner>,
}

impl LoadingIndicator {
    pub fn new(hide_delay: Duration) -> Self {
        let (overlay, _) = watch::channel(Overlay::Hidden);
        Self {
            inner: Arc::new(Inner {
                counter: Mutex::new(Counter::default()),
                overlay,
                hide_delay,
            }),
        }
    }

    /// Count one dispatched request and make sure the overlay is showing
    pub fn begin(&self) -> InFlight {
        let mut counter = self.lock();
        counter.in_flight += 1;
        if !counter.visible {
            counter.visible = true;
            self.inner.overlay.send_replace(Overlay::Visible);
        }
        drop(counter);

        InFlight {
            indicator: self.clone(),
            settled: false,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn overlay(&self) -> Overlay {
        *self.inner.overlay.borrow()
    }

    /// Receive overlay transitions; only real changes are published
    pub fn subscribe(&self) -> watch::Receiver<Overlay> {
        self.inner.overlay.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Counter> {
        self.inner.counter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn end(&self, outcome: Outcome) {
        {
            let mut counter = self.lock();
            counter.in_flight = counter.in_flight.saturating_sub(1);
        }

        match outcome {
            Outcome::Success => self.schedule_hide(),
            Outcome::Failure => self.hide_if_idle(),
        }
    }

    fn schedule_hide(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.hide_if_idle();
            return;
        };

        let indicator = self.clone();
        let delay = self.inner.hide_delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            indicator.hide_if_idle();
        });
    }

    // Re-reads the count when it fires, not when it was scheduled
    fn hide_if_idle(&self) {
        let mut counter = self.lock();
        if counter.in_flight == 0 && counter.visible {
            counter.visible = false;
            self.inner.overlay.send_replace(Overlay::Hidden);
        }
    }
}

/// One in-flight request
///
/// Settles exactly once. Dropping it unsettled (cancellation, timeout, panic)
/// settles it as a failure.
#[must_use = "dropping the guard settles the request as failed"]
#[derive(Debug)]
pub struct InFlight {
    indicator: LoadingIndicator,
    settled: bool,
}

impl InFlight {
    pub fn succeed(mut self) {
        self.settle(Outcome::Success);
    }

    pub fn fail(mut self) {
        self.settle(Outcome::Failure);
    }

    fn settle(&mut self, outcome: Outcome) {
        if !self.settled {
            self.settled = true;
            self.indicator.end(outcome);
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.settle(Outcome::Failure);
    }
}
