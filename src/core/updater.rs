//! Updater - the poll timer that republishes elapsed time while playing.
//!
//! A polled repeating deadline rather than an OS timer: the host calls
//! `VideoPlayer::tick()` from its loop and the controller asks the updater
//! whether a poll is due. At most one interval exists at a time.

use std::fmt;
use std::time::{Duration, Instant};

/// Poll cadence while playing
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 200;

/// Opaque id of one started interval. A restart always yields a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntervalHandle(u64);

impl fmt::Display for IntervalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    handle: IntervalHandle,
    next_due: Instant,
}

/// Cancellable repeating timer.
///
/// # Usage
/// ```ignore
/// updater.start(Instant::now());
///
/// // In host loop:
/// if updater.poll_due(Instant::now()) {
///     player.update();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Updater {
    period: Duration,
    active: Option<Interval>,
    next_id: u64,
}

impl Default for Updater {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL_MS)
    }
}

impl Updater {
    /// Create with a period in milliseconds (0 is raised to 1)
    pub fn new(period_ms: u64) -> Self {
        Self {
            period: Duration::from_millis(period_ms.max(1)),
            active: None,
            next_id: 1,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period.as_millis() as u64
    }

    /// Start a fresh interval, first due one period after `now`.
    /// A running interval is stopped first.
    pub fn start(&mut self, now: Instant) -> IntervalHandle {
        self.stop();
        let handle = IntervalHandle(self.next_id);
        self.next_id += 1;
        self.active = Some(Interval {
            handle,
            next_due: now + self.period,
        });
        log::trace!("Updater: started {} every {}ms", handle, self.period_ms());
        handle
    }

    /// Cancel the running interval. No-op when stopped.
    pub fn stop(&mut self) -> Option<IntervalHandle> {
        let stopped = self.active.take().map(|i| i.handle);
        if let Some(handle) = stopped {
            log::trace!("Updater: stopped {}", handle);
        }
        stopped
    }

    /// True once per elapsed period. Missed periods are not replayed:
    /// after a stall the next deadline is one period from `now`.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        let Some(interval) = self.active.as_mut() else {
            return false;
        };
        if now < interval.next_due {
            return false;
        }
        interval.next_due += self.period;
        if interval.next_due <= now {
            interval.next_due = now + self.period;
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Handle of the running interval, if any
    pub fn handle(&self) -> Option<IntervalHandle> {
        self.active.map(|i| i.handle)
    }
}
