//! Auto-play driver: a [`Replay`] plus at most one live host timer.
//!
//! Each timer firing applies exactly one action. Start/stop are idempotent:
//! `run` while playing and `pause` while paused are no-ops. Reaching the end
//! of the log, stepping over a subcall, and resetting all pause playback.

use crate::{clamp_interval, Algorithm, HostTimer, PlaybackConfig, Replay, Snapshot, TimerId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Whether the player's timer is live.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlaybackState {
    /// No timer scheduled.
    Paused,
    /// A timer is scheduled and each firing applies one action.
    Playing,
}

/// Replay engine driven by a host timer.
pub struct Player<A: Algorithm, T: HostTimer> {
    replay: Replay<A>,
    timer: T,
    active: Option<TimerId>,
    interval: Duration,
}

impl<A: Algorithm, T: HostTimer> Player<A, T> {
    /// Build the trace for `input`; playback starts paused.
    #[must_use]
    pub fn new(input: A::Input, timer: T) -> Self {
        Self::with_config(input, timer, PlaybackConfig::default())
    }

    /// Like [`Self::new`] with an explicit auto-play period.
    #[must_use]
    pub fn with_config(input: A::Input, timer: T, cfg: PlaybackConfig) -> Self {
        Self {
            replay: Replay::new(input),
            timer,
            active: None,
            interval: cfg.interval(),
        }
    }

    /// The underlying replay engine.
    #[inline]
    #[must_use]
    pub const fn replay(&self) -> &Replay<A> {
        &self.replay
    }

    /// The host timer.
    #[inline]
    #[must_use]
    pub const fn timer(&self) -> &T {
        &self.timer
    }

    /// The host timer, for hosts that need to drive it.
    #[inline]
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Current playback state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        if self.active.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    /// `true` while a timer is live.
    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Current (clamped) auto-play period.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Apply one action; pauses once nothing remains.
    pub fn step_once(&mut self) -> bool {
        let more = self.replay.step_once();
        if !more {
            self.pause();
        }
        more
    }

    /// Step over the next subcall (see [`Replay::step_over`]).
    ///
    /// A bulk step pauses auto-play, as does reaching the end.
    pub fn step_over(&mut self) -> bool {
        let before = self.replay.cursor();
        let more = self.replay.step_over();
        if !more || self.replay.cursor() > before + 1 {
            self.pause();
        }
        more
    }

    /// Start auto-play with a period of `interval_ms` (clamped).
    ///
    /// Returns `true` if a timer was started. No-op while already playing or
    /// when the log is exhausted.
    pub fn run(&mut self, interval_ms: u64) -> bool {
        if self.active.is_some() || self.replay.is_done() {
            return false;
        }
        self.interval = clamp_interval(interval_ms);
        let id = self.timer.schedule(self.interval);
        self.active = Some(id);
        debug!(algorithm = A::NAME, ?id, interval = ?self.interval, cursor = self.replay.cursor(), "run");
        true
    }

    /// Stop auto-play. Safe to call when not playing.
    pub fn pause(&mut self) {
        if let Some(id) = self.active.take() {
            self.timer.cancel(id);
            debug!(algorithm = A::NAME, ?id, cursor = self.replay.cursor(), "pause");
        }
    }

    /// Change the auto-play period; a live timer is restarted at the new
    /// period without touching the cursor.
    pub fn set_interval(&mut self, interval_ms: u64) {
        self.interval = clamp_interval(interval_ms);
        if let Some(old) = self.active.take() {
            self.timer.cancel(old);
            let id = self.timer.schedule(self.interval);
            self.active = Some(id);
            debug!(algorithm = A::NAME, ?id, interval = ?self.interval, "interval changed");
        }
    }

    /// Handle one firing of timer `id`. Returns `true` if an action was applied.
    ///
    /// Firings of a timer that is no longer live are ignored.
    pub fn tick(&mut self, id: TimerId) -> bool {
        if self.active != Some(id) || self.replay.is_done() {
            return false;
        }
        if !self.step_once() {
            debug!(algorithm = A::NAME, "finished; auto-paused");
        }
        true
    }

    /// Pause, then rebuild the trace from `input`.
    pub fn reset(&mut self, input: A::Input) {
        self.pause();
        self.replay.reset(input);
    }

    /// Pause, then replay the current log from the start.
    pub fn rewind(&mut self) {
        self.pause();
        self.replay.rewind();
    }

    /// Presentation snapshot of the current position.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.replay.snapshot()
    }
}
