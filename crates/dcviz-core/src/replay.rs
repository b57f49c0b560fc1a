//! Cursor-based replay engine over a recorded action log.
//!
//! - [`Replay::step_once`]: apply exactly one action.
//! - [`Replay::step_over`]: apply every action up to and including the
//!   merge/combine/strip phase of the frame the next action belongs to.
//! - [`Replay::reset`]: rebuild the log from a new input.
//! - [`Replay::rewind`]: replay the current log from the start.
//!
//! The engine keeps a stack of open frames derived from [`FrameEffect`]
//! markers. Step-over locates its landing action by simulating that stack
//! forward, so it needs no knowledge of action payloads.
//!
//! **Degraded step-over**: when the target frame closes before any landing
//! action is seen (base cases, or a merge that has already started), the
//! engine falls back to a single [`Replay::step_once`].

use crate::{Algorithm, FrameEffect, Phase, ReplayState, Segment, Snapshot, TraceAction};
use tracing::{debug, trace};

/// Replay engine for one algorithm instance.
///
/// Owns the input snapshot, the action log, the cursor and the derived state.
pub struct Replay<A: Algorithm> {
    input: A::Input,
    actions: Vec<A::Action>,
    cursor: usize,
    state: A::State,
    frames: Vec<Option<Segment>>,
    last_kind: Option<&'static str>,
}

impl<A: Algorithm> Replay<A> {
    /// Build the trace for `input` and position the cursor at 0.
    #[must_use]
    pub fn new(input: A::Input) -> Self {
        let actions = A::build_trace(&input);
        let state = A::initial_state(&input);
        debug!(algorithm = A::NAME, actions = actions.len(), "trace built");
        Self {
            input,
            actions,
            cursor: 0,
            state,
            frames: Vec::new(),
            last_kind: None,
        }
    }

    /// Discard the log and derived state and rebuild from `input`.
    pub fn reset(&mut self, input: A::Input) {
        *self = Self::new(input);
    }

    /// Replay the current log from the start (same input, same actions).
    pub fn rewind(&mut self) {
        self.state = A::initial_state(&self.input);
        self.cursor = 0;
        self.frames.clear();
        self.last_kind = None;
    }

    /// Input the current log was built from.
    #[inline]
    #[must_use]
    pub const fn input(&self) -> &A::Input {
        &self.input
    }

    /// The full action log.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[A::Action] {
        &self.actions
    }

    /// Number of actions applied so far.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the action log.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the action log is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Lifecycle phase derived from the cursor.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::of(self.cursor, self.actions.len())
    }

    /// `true` once every action has been applied.
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cursor >= self.actions.len()
    }

    /// Number of recursive frames currently open.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Ranges of the open frames, outermost first (`None` for unranged frames).
    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[Option<Segment>] {
        &self.frames
    }

    /// Derived state after the applied prefix.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &A::State {
        &self.state
    }

    /// The next pending action, if any.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&A::Action> {
        self.actions.get(self.cursor)
    }

    /// Apply the next action. Returns whether further actions remain.
    ///
    /// A no-op returning `false` once the log is exhausted.
    pub fn step_once(&mut self) -> bool {
        if self.is_done() {
            return false;
        }
        self.apply_next();
        !self.is_done()
    }

    /// Apply actions up to and including the landing action of the target
    /// frame, or a single action if there is no landing action.
    ///
    /// The target frame is the one the next action opens (`Open`/`Leaf`) or
    /// the innermost open frame otherwise. Always advances by at least one
    /// action unless the log is exhausted. Returns whether actions remain.
    pub fn step_over(&mut self) -> bool {
        if self.is_done() {
            return false;
        }
        match self.landing_index() {
            Some(target) => {
                debug!(
                    algorithm = A::NAME,
                    from = self.cursor,
                    to = target + 1,
                    "step over"
                );
                while self.cursor <= target {
                    self.apply_next();
                }
                !self.is_done()
            }
            None => self.step_once(),
        }
    }

    /// Index of the action step-over would land on, if any.
    #[must_use]
    pub fn landing_index(&self) -> Option<usize> {
        let next = self.actions.get(self.cursor)?;
        let open = self.frames.len();
        let target = match next.frame() {
            FrameEffect::Open | FrameEffect::Leaf => open + 1,
            _ => open,
        };
        if target == 0 {
            return None;
        }

        let mut depth = open;
        for (idx, action) in self.actions.iter().enumerate().skip(self.cursor) {
            match action.frame() {
                FrameEffect::Land if depth == target => return Some(idx),
                FrameEffect::Open => depth += 1,
                FrameEffect::Leaf if depth + 1 == target => return None,
                FrameEffect::Close => {
                    if depth == target {
                        return None;
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
        }
        None
    }

    /// Apply every remaining action. Returns how many were applied.
    pub fn run_to_end(&mut self) -> usize {
        let start = self.cursor;
        while self.step_once() {}
        self.cursor - start
    }

    /// Presentation snapshot of the current position.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            algorithm: A::NAME,
            cursor: self.cursor,
            len: self.actions.len(),
            phase: self.phase(),
            depth: self.frames.len(),
            last_kind: self.last_kind,
            highlights: self.state.highlights(),
            locals: self.state.locals(),
            result: self.state.result_text(),
            line: self.state.line(),
        }
    }

    fn apply_next(&mut self) {
        let action = &self.actions[self.cursor];
        trace!(cursor = self.cursor, kind = action.kind(), "apply");
        self.state.apply(action);
        match action.frame() {
            FrameEffect::Open => self.frames.push(action.segment()),
            FrameEffect::Close => {
                self.frames.pop();
            }
            FrameEffect::Leaf | FrameEffect::Land | FrameEffect::Inline => {}
        }
        self.last_kind = Some(action.kind());
        self.cursor += 1;
    }
}
