//! Self-correcting tick scheduler.
//!
//! The timer keeps a rolling *target* time and adds the interval to it on
//! every cycle, so a late fire shortens the following delay instead of
//! pushing the whole schedule back. Over a long session the n-th tick stays
//! anchored at `start + sum(intervals)`.
//!
//! Scheduling is cooperative: the owner waits for [`DriftTimer::next_fire_in`]
//! (typically as an event-loop timeout) and then calls [`DriftTimer::poll`],
//! which runs the tick callback if its fire time has been reached.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Source of monotonic time for the timer.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    /// Move the clock forward to `instant`. Never moves backwards.
    pub fn advance_to(&self, instant: Instant) {
        let target = instant.saturating_duration_since(self.origin);
        if target > self.elapsed.get() {
            self.elapsed.set(target);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

type TickFn = Box<dyn FnMut() -> bool>;
type IntervalFn = Box<dyn Fn() -> Duration>;

/// Drift-corrected repeating timer.
///
/// `on_tick` returns `true` to keep going and `false` to halt. `interval` is
/// queried before every scheduled fire, so rate changes apply from the next
/// tick without a restart. At most one fire is pending at any time.
pub struct DriftTimer<C: Clock = SystemClock> {
    clock: C,
    on_tick: TickFn,
    interval: IntervalFn,
    target: Instant,
    pending: Option<Instant>,
}

impl<C: Clock> DriftTimer<C> {
    pub fn new<T, I>(clock: C, on_tick: T, interval: I) -> Self
    where
        T: FnMut() -> bool + 'static,
        I: Fn() -> Duration + 'static,
    {
        let target = clock.now();
        Self {
            clock,
            on_tick: Box::new(on_tick),
            interval: Box::new(interval),
            target,
            pending: None,
        }
    }

    /// Swap the tick callback. A running chain picks it up on its next fire.
    pub fn set_on_tick<T>(&mut self, on_tick: T)
    where
        T: FnMut() -> bool + 'static,
    {
        self.on_tick = Box::new(on_tick);
    }

    /// Swap the interval accessor. Used from the next scheduling step on.
    pub fn set_interval<I>(&mut self, interval: I)
    where
        I: Fn() -> Duration + 'static,
    {
        self.interval = Box::new(interval);
    }

    /// Begin a new chain anchored at the current time, replacing any
    /// chain already running.
    pub fn start(&mut self) {
        self.stop();
        self.target = self.clock.now();
        debug!("drift timer started");
        self.schedule_next();
    }

    /// Cancel the pending fire, if any.
    pub fn stop(&mut self) {
        if self.pending.take().is_some() {
            debug!("drift timer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Ideal time of the pending (or most recently scheduled) fire.
    pub fn target(&self) -> Instant {
        self.target
    }

    /// How long until the pending fire is due. `None` when stopped.
    pub fn next_fire_in(&self) -> Option<Duration> {
        self.pending
            .map(|at| at.saturating_duration_since(self.clock.now()))
    }

    /// Run the tick callback if the pending fire is due.
    ///
    /// Returns `true` if a tick fired. Fires at most once per call; a chain
    /// that has fallen behind reports a zero delay until it catches up.
    pub fn poll(&mut self) -> bool {
        match self.pending {
            Some(at) if at <= self.clock.now() => {}
            _ => return false,
        }

        self.pending = None;
        if (self.on_tick)() {
            self.schedule_next();
        } else {
            debug!("drift timer halted by tick callback");
        }
        true
    }

    fn schedule_next(&mut self) {
        let interval = (self.interval)();
        self.target += interval;
        self.pending = Some(self.target);
        trace!(
            interval_ms = interval.as_millis() as u64,
            delay_ms = self.target.saturating_duration_since(self.clock.now()).as_millis() as u64,
            "next tick scheduled"
        );
    }
}

impl<C: Clock> fmt::Debug for DriftTimer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriftTimer")
            .field("target", &self.target)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
