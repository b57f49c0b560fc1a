//! Algorithm seams shared by every visualizer.
//!
//! To plug a divide-and-conquer algorithm into the replay engine, implement
//! [`Algorithm`] for a marker type that names:
//! - the input snapshot the trace is built from,
//! - a closed action enum ([`TraceAction`]) recorded during the real recursion,
//! - a small derived state ([`ReplayState`]) mutated one action at a time.
//!
//! The engine never inspects action payloads. It only needs to know how each
//! action moves through the recursion tree ([`FrameEffect`]) so that step-over
//! can find the merge/combine/strip phase of the frame it starts in.

use crate::{Highlights, Locals, Segment};
use std::fmt;

/// How an action moves the replay through the recursion tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEffect {
    /// Enters a new recursive frame (e.g. `segment`).
    Open,
    /// A frame that opens and closes in one action (e.g. a singleton `base`).
    Leaf,
    /// Arrival at the merge / combine / strip phase of the current frame.
    Land,
    /// Leaves the current frame (e.g. `segmentDone`, `result`).
    Close,
    /// Anything else; stays within the current frame.
    Inline,
}

/// One recorded, replayable event of an algorithm run.
pub trait TraceAction: Clone + fmt::Debug {
    /// Short, stable kind name (matches the serialized `type` tag).
    fn kind(&self) -> &'static str;

    /// Recursion-tree effect used by the frame stack and step-over.
    fn frame(&self) -> FrameEffect;

    /// Index range of the recursive call this action belongs to, if any.
    fn segment(&self) -> Option<Segment> {
        None
    }
}

/// Derived state mutated incrementally by applying actions in order.
///
/// `apply` must be O(1) amortized in the size of the log: the state is never
/// rebuilt by replaying from the start.
pub trait ReplayState {
    /// Action type consumed by this state.
    type Action: TraceAction;

    /// Apply one action, mutating working data exactly as the algorithm did.
    fn apply(&mut self, action: &Self::Action);

    /// Current highlight descriptor.
    fn highlights(&self) -> Highlights;

    /// Current named locals (`None` = not currently defined).
    fn locals(&self) -> Locals;

    /// Current result formatted for display (best distance, count, product).
    fn result_text(&self) -> String;

    /// Pseudocode line the presentation should mark as active.
    fn line(&self) -> Option<u8> {
        None
    }
}

/// A traced divide-and-conquer algorithm.
pub trait Algorithm {
    /// Short name used in logs and snapshots.
    const NAME: &'static str;

    /// Input snapshot a trace is built from.
    type Input: Clone + fmt::Debug;

    /// Closed action enum recorded by the builder.
    type Action: TraceAction;

    /// Derived state the engine applies actions to.
    type State: ReplayState<Action = Self::Action>;

    /// Run the real algorithm once over `input`, recording every action.
    fn build_trace(input: &Self::Input) -> Vec<Self::Action>;

    /// Fresh derived state before any action is applied.
    fn initial_state(input: &Self::Input) -> Self::State;
}
