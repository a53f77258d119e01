use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ReaderEvent {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
    FocusLost,
    Resize,
    /// Nothing arrived before the wait ended; time to check the timer.
    Timeout,
}

/// Source of terminal events (keyboard, paste, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<ReaderEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ReaderEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => ReaderEvent::Key(key),
                Ok(CtEvent::Paste(text)) => ReaderEvent::Paste(text),
                Ok(CtEvent::Mouse(mouse)) => ReaderEvent::Mouse(mouse),
                Ok(CtEvent::FocusLost) => ReaderEvent::FocusLost,
                Ok(CtEvent::Resize(_, _)) => ReaderEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReaderEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<ReaderEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ReaderEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReaderEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    idle_wait: Duration,
}

impl<E: EventSource> Runner<E> {
    /// `idle_wait` bounds how long `step` blocks when no tick is pending.
    pub fn new(event_source: E, idle_wait: Duration) -> Self {
        Self {
            event_source,
            idle_wait,
        }
    }

    /// Blocks until the next event, or returns Timeout once `deadline`
    /// (the delay until the next scheduled tick) has passed.
    pub fn step(&self, deadline: Option<Duration>) -> ReaderEvent {
        let timeout = deadline.map_or(self.idle_wait, |d| d.min(self.idle_wait));
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                ReaderEvent::Timeout
            }
        }
    }
}
