//! Engine-level invariants, exercised with a small range-sum recursion.
//!
//! The toy algorithm mirrors the shape of the real visualizers: a frame opens,
//! both halves recurse, a landing action marks the combine phase, and the
//! frame closes with its result. Singletons are single `Leaf` actions.

use dcviz_core::{
    Algorithm, FrameEffect, Highlights, Local, Locals, Phase, Replay, ReplayState, Segment,
    TraceAction,
};
use proptest::prelude::*;

#[derive(Clone, Debug, PartialEq)]
enum SumAction {
    Enter { l: usize, r: usize },
    Leaf { i: usize, value: i64 },
    Combine { l: usize, r: usize },
    Exit { l: usize, r: usize, sum: i64 },
}

impl TraceAction for SumAction {
    fn kind(&self) -> &'static str {
        match self {
            Self::Enter { .. } => "enter",
            Self::Leaf { .. } => "leaf",
            Self::Combine { .. } => "combine",
            Self::Exit { .. } => "exit",
        }
    }

    fn frame(&self) -> FrameEffect {
        match self {
            Self::Enter { .. } => FrameEffect::Open,
            Self::Leaf { .. } => FrameEffect::Leaf,
            Self::Combine { .. } => FrameEffect::Land,
            Self::Exit { .. } => FrameEffect::Close,
        }
    }

    fn segment(&self) -> Option<Segment> {
        match *self {
            Self::Enter { l, r } | Self::Combine { l, r } | Self::Exit { l, r, .. } => {
                Some(Segment::new(l, r))
            }
            Self::Leaf { i, .. } => Some(Segment::new(i, i + 1)),
        }
    }
}

#[derive(Default)]
struct SumState {
    last: Option<i64>,
}

impl ReplayState for SumState {
    type Action = SumAction;

    fn apply(&mut self, action: &SumAction) {
        match *action {
            SumAction::Leaf { value, .. } => self.last = Some(value),
            SumAction::Exit { sum, .. } => self.last = Some(sum),
            _ => {}
        }
    }

    fn highlights(&self) -> Highlights {
        Highlights::default()
    }

    fn locals(&self) -> Locals {
        Locals::with_names(&["sum"]).with("sum", self.last.map(Local::from))
    }

    fn result_text(&self) -> String {
        self.last.map_or_else(String::new, |v| v.to_string())
    }
}

struct RangeSum;

impl Algorithm for RangeSum {
    const NAME: &'static str = "range-sum";
    type Input = Vec<i64>;
    type Action = SumAction;
    type State = SumState;

    fn build_trace(input: &Vec<i64>) -> Vec<SumAction> {
        fn go(a: &[i64], l: usize, r: usize, out: &mut Vec<SumAction>) -> i64 {
            if r - l == 1 {
                out.push(SumAction::Leaf { i: l, value: a[l] });
                return a[l];
            }
            let m = (l + r) / 2;
            out.push(SumAction::Enter { l, r });
            let s = go(a, l, m, out) + go(a, m, r, out);
            out.push(SumAction::Combine { l, r });
            out.push(SumAction::Exit { l, r, sum: s });
            s
        }
        let mut out = Vec::new();
        if !input.is_empty() {
            go(input, 0, input.len(), &mut out);
        }
        out
    }

    fn initial_state(_input: &Vec<i64>) -> SumState {
        SumState::default()
    }
}

#[test]
fn empty_log_is_done_immediately() {
    let mut r = Replay::<RangeSum>::new(vec![]);
    assert_eq!(r.phase(), Phase::Done);
    assert!(!r.step_once());
    assert!(!r.step_over());
    assert_eq!(r.cursor(), 0);
}

#[test]
fn step_over_from_start_lands_on_root_combine() {
    let mut r = Replay::<RangeSum>::new(vec![1, 2, 3, 4]);
    assert_eq!(r.phase(), Phase::Ready);
    assert!(r.step_over());
    assert!(matches!(r.actions()[r.cursor() - 1], SumAction::Combine { l: 0, r: 4 }));
    assert_eq!(r.depth(), 1);
    assert_eq!(r.frames(), &[Some(Segment::new(0, 4))]);
    assert_eq!(r.snapshot().result, "7");
    assert!(!r.step_once());
    assert_eq!(r.snapshot().result, "10");
    assert_eq!(r.phase(), Phase::Done);
}

#[test]
fn step_over_on_leaf_degrades_to_single_step() {
    let mut r = Replay::<RangeSum>::new(vec![5, 6]);
    r.step_once(); // Enter [0,2)
    // Next is Leaf(0): its own frame never lands.
    assert!(matches!(r.peek(), Some(SumAction::Leaf { .. })));
    assert_eq!(r.landing_index(), None);
    assert!(r.step_over());
    assert_eq!(r.cursor(), 2);
    assert_eq!(r.depth(), 1);
}

#[test]
fn step_over_after_landing_degrades() {
    let mut r = Replay::<RangeSum>::new(vec![1, 2, 3]);
    r.step_over();
    // Next is the Exit of the frame that just landed.
    assert!(matches!(r.peek(), Some(SumAction::Exit { .. })));
    let c = r.cursor();
    r.step_over();
    assert_eq!(r.cursor(), c + 1);
}

#[test]
fn rewind_replays_same_log() {
    let mut r = Replay::<RangeSum>::new(vec![3, 1, 4, 1, 5]);
    let n = r.run_to_end();
    assert_eq!(n, r.len());
    let done = r.snapshot();
    r.rewind();
    assert_eq!(r.cursor(), 0);
    assert_eq!(r.depth(), 0);
    assert_eq!(r.snapshot().result, "");
    r.run_to_end();
    assert_eq!(r.snapshot(), done);
}

prop_compose! {
    fn arb_values()(v in prop::collection::vec(-50i64..=50, 1..=24)) -> Vec<i64> { v }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn cursor_advances_by_exactly_one(values in arb_values()) {
        let mut r = Replay::<RangeSum>::new(values.clone());
        let len = r.len();
        for expected in 1..=len {
            let more = r.step_once();
            prop_assert_eq!(r.cursor(), expected);
            prop_assert_eq!(more, expected < len);
        }
        let snap = r.snapshot();
        prop_assert!(!r.step_once());
        prop_assert_eq!(r.cursor(), len);
        prop_assert_eq!(r.snapshot(), snap);
        prop_assert_eq!(r.depth(), 0);
        prop_assert_eq!(r.snapshot().result, values.iter().sum::<i64>().to_string());
    }

    #[test]
    fn step_over_never_leaves_inner_frames_open(values in arb_values()) {
        let mut r = Replay::<RangeSum>::new(values);
        while !r.is_done() {
            let before = r.cursor();
            let open = r.depth();
            let target = match r.peek().map(TraceAction::frame) {
                Some(FrameEffect::Open | FrameEffect::Leaf) => open + 1,
                _ => open,
            };
            r.step_over();
            prop_assert!(r.cursor() > before);
            prop_assert!(r.depth() <= target.max(open));
            if r.cursor() > before + 1 {
                let landed = &r.actions()[r.cursor() - 1];
                prop_assert_eq!(landed.frame(), FrameEffect::Land);
                prop_assert_eq!(r.depth(), target);
            }
        }
    }

    #[test]
    fn step_over_and_step_once_agree_on_final_state(values in arb_values()) {
        let mut a = Replay::<RangeSum>::new(values.clone());
        let mut b = Replay::<RangeSum>::new(values);
        while a.step_over() {}
        b.run_to_end();
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}
