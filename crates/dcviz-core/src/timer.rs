//! Host timer abstraction.
//!
//! The player never owns a thread. It asks the host to schedule a repeating
//! callback and is handed the [`TimerId`] back on every firing, so ticks from
//! a cancelled timer can be told apart from the live one.

use std::thread;
use std::time::Duration;

/// Handle of one scheduled repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Repeating timer provided by the host environment.
pub trait HostTimer {
    /// Start a timer that fires every `period` until cancelled.
    fn schedule(&mut self, period: Duration) -> TimerId;

    /// Stop a timer. Unknown or already-cancelled ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

/// Timer fired explicitly by the host (tests, embedding event loops).
#[derive(Debug, Default)]
pub struct ManualTimer {
    next_id: u64,
    active: Vec<(TimerId, Duration)>,
    history: Vec<Duration>,
}

impl ManualTimer {
    /// Timer with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live timer, if any.
    #[must_use]
    pub fn active(&self) -> Option<(TimerId, Duration)> {
        self.active.first().copied()
    }

    /// Number of live timers (never more than one under a player).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Periods of every timer ever scheduled, in order.
    #[must_use]
    pub fn history(&self) -> &[Duration] {
        &self.history
    }

    /// Fire the live timer once, returning the id to hand to the player.
    #[must_use]
    pub fn fire(&self) -> Option<TimerId> {
        self.active().map(|(id, _)| id)
    }
}

impl HostTimer for ManualTimer {
    fn schedule(&mut self, period: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.active.push((id, period));
        self.history.push(period);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.active.retain(|(t, _)| *t != id);
    }
}

/// Timer that blocks the calling thread for one period per firing.
///
/// Suits a single-threaded command-line loop:
/// `while let Some(id) = timer.wait() { player.tick(id); }`.
#[derive(Debug, Default)]
pub struct SleepTimer {
    next_id: u64,
    active: Option<(TimerId, Duration)>,
}

impl SleepTimer {
    /// Timer with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep one period of the live timer and return its id.
    ///
    /// Returns `None` immediately when nothing is scheduled.
    pub fn wait(&mut self) -> Option<TimerId> {
        let (id, period) = self.active?;
        thread::sleep(period);
        Some(id)
    }
}

impl HostTimer for SleepTimer {
    fn schedule(&mut self, period: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.active = Some((id, period));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if self.active.is_some_and(|(t, _)| t == id) {
            self.active = None;
        }
    }
}
