//! Inversion counting on top of merge sort.
//!
//! Two strategies share the recursion and differ only in how a merge step
//! counts the inversions it crosses:
//! - [`CountingStrategy::Direct`] charges `left.len() - i` whenever the right
//!   element is taken first, and writes each merged slot individually.
//! - [`CountingStrategy::Rank`] binary-searches each left element in the sorted
//!   right half, then commits the merged run in one action.
//!
//! Equal values are never inverted.

use anyhow::{anyhow, Error};
use dcviz_core::{
    Algorithm, Bounds, FrameEffect, Highlights, Local, Locals, ReplayState, Segment, Side,
    TraceAction,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

/// Supported array lengths.
pub const SIZE: Bounds = Bounds::new(2, 30, 10);

/// Largest value produced by the generator (values are unique in `1..=99`).
pub const VALUE_MAX: u32 = 99;

/// How a merge step counts inversions.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CountingStrategy {
    /// Count while merging, one comparison at a time.
    #[default]
    Direct,
    /// Count by binary search of left elements in the right half.
    Rank,
}

impl fmt::Display for CountingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Rank => "rank",
        })
    }
}

impl FromStr for CountingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "rank" | "simple" => Ok(Self::Rank),
            other => Err(anyhow!("unknown counting strategy: {other} (expected direct|rank)")),
        }
    }
}

/// Array plus the strategy used to count its inversions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InversionInput {
    /// Values to sort.
    pub values: Vec<u32>,
    /// Counting strategy.
    pub strategy: CountingStrategy,
}

impl InversionInput {
    /// Bundle `values` with `strategy`.
    #[must_use]
    pub const fn new(values: Vec<u32>, strategy: CountingStrategy) -> Self {
        Self { values, strategy }
    }
}

/// One observable event of a merge-sort inversion count.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InversionAction {
    /// Entered the call over `[l, r)` (length ≥ 2).
    Segment { l: usize, r: usize },
    /// A singleton call; already sorted.
    Base { l: usize, r: usize },
    /// About to recurse into one half.
    Call { which: Side, l: usize, r: usize },
    /// The recursive call on one half has returned.
    AfterCall { which: Side, l: usize, r: usize },
    /// Both halves are sorted; the merge of `[l, m)` and `[m, r)` starts.
    InitMerge { l: usize, r: usize, m: usize },
    /// Compare slot `i` of the left run with slot `j` of the right run.
    Compare {
        l: usize,
        r: usize,
        i: usize,
        j: usize,
        vi: u32,
        vj: u32,
    },
    /// Store `value` into slot `k`, crossing `inv_delta` inversions.
    Write {
        l: usize,
        r: usize,
        k: usize,
        value: u32,
        inv_delta: u64,
        tail: Option<Side>,
    },
    /// Left element `x` at slot `i` exceeds `rank` right elements.
    Rank {
        l: usize,
        r: usize,
        i: usize,
        x: u32,
        rank: u64,
    },
    /// Merged run `out` replaces slots `[l, r)`.
    Commit { l: usize, r: usize, out: Vec<u32> },
    /// The call over `[l, r)` finished.
    SegmentDone { l: usize, r: usize },
}

impl TraceAction for InversionAction {
    fn kind(&self) -> &'static str {
        match self {
            Self::Segment { .. } => "segment",
            Self::Base { .. } => "base",
            Self::Call { .. } => "call",
            Self::AfterCall { .. } => "afterCall",
            Self::InitMerge { .. } => "initMerge",
            Self::Compare { .. } => "compare",
            Self::Write { .. } => "write",
            Self::Rank { .. } => "rank",
            Self::Commit { .. } => "commit",
            Self::SegmentDone { .. } => "segmentDone",
        }
    }

    fn frame(&self) -> FrameEffect {
        match self {
            Self::Segment { .. } => FrameEffect::Open,
            Self::Base { .. } => FrameEffect::Leaf,
            Self::InitMerge { .. } => FrameEffect::Land,
            Self::SegmentDone { .. } => FrameEffect::Close,
            _ => FrameEffect::Inline,
        }
    }

    fn segment(&self) -> Option<Segment> {
        match *self {
            Self::Segment { l, r }
            | Self::Base { l, r }
            | Self::Call { l, r, .. }
            | Self::AfterCall { l, r, .. }
            | Self::InitMerge { l, r, .. }
            | Self::Compare { l, r, .. }
            | Self::Write { l, r, .. }
            | Self::Rank { l, r, .. }
            | Self::Commit { l, r, .. }
            | Self::SegmentDone { l, r } => Some(Segment::new(l, r)),
        }
    }
}

/// Number of elements of the sorted slice `sorted` strictly less than `x`.
#[inline]
#[must_use]
pub fn lower_bound(sorted: &[u32], x: u32) -> usize {
    sorted.partition_point(|&y| y < x)
}

/// Quadratic reference count of pairs `i < j` with `a[i] > a[j]`.
#[must_use]
pub fn count_inversions_naive(a: &[u32]) -> u64 {
    let mut n = 0;
    for i in 0..a.len() {
        for j in i + 1..a.len() {
            if a[i] > a[j] {
                n += 1;
            }
        }
    }
    n
}

struct Builder {
    a: Vec<u32>,
    strategy: CountingStrategy,
    out: Vec<InversionAction>,
}

impl Builder {
    fn sort_count(&mut self, l: usize, r: usize) -> u64 {
        if r - l <= 1 {
            self.out.push(InversionAction::Base { l, r });
            return 0;
        }
        self.out.push(InversionAction::Segment { l, r });
        let (left, right) = Segment::new(l, r).split_mid();
        let m = right.l;

        self.out.push(InversionAction::Call { which: Side::L, l, r });
        let left_inv = self.sort_count(left.l, left.r);
        self.out.push(InversionAction::AfterCall { which: Side::L, l, r });
        self.out.push(InversionAction::Call { which: Side::R, l, r });
        let right_inv = self.sort_count(right.l, right.r);
        self.out.push(InversionAction::AfterCall { which: Side::R, l, r });

        self.out.push(InversionAction::InitMerge { l, r, m });
        let crossed = match self.strategy {
            CountingStrategy::Direct => self.merge_direct(l, m, r),
            CountingStrategy::Rank => self.merge_rank(l, m, r),
        };
        self.out.push(InversionAction::SegmentDone { l, r });
        left_inv + right_inv + crossed
    }

    fn write(
        &mut self,
        (l, r): (usize, usize),
        k: usize,
        value: u32,
        inv_delta: u64,
        tail: Option<Side>,
    ) {
        self.a[k] = value;
        self.out.push(InversionAction::Write {
            l,
            r,
            k,
            value,
            inv_delta,
            tail,
        });
    }

    fn merge_direct(&mut self, l: usize, m: usize, r: usize) -> u64 {
        let left = self.a[l..m].to_vec();
        let right = self.a[m..r].to_vec();
        let (mut i, mut j, mut k, mut inv) = (0, 0, l, 0u64);

        while i < left.len() && j < right.len() {
            self.out.push(InversionAction::Compare {
                l,
                r,
                i: l + i,
                j: m + j,
                vi: left[i],
                vj: right[j],
            });
            if left[i] <= right[j] {
                self.write((l, r), k, left[i], 0, None);
                i += 1;
            } else {
                let delta = (left.len() - i) as u64;
                inv += delta;
                self.write((l, r), k, right[j], delta, None);
                j += 1;
            }
            k += 1;
        }
        for &v in &left[i..] {
            self.write((l, r), k, v, 0, Some(Side::L));
            k += 1;
        }
        for &v in &right[j..] {
            self.write((l, r), k, v, 0, Some(Side::R));
            k += 1;
        }
        inv
    }

    fn merge_rank(&mut self, l: usize, m: usize, r: usize) -> u64 {
        let left = self.a[l..m].to_vec();
        let right = self.a[m..r].to_vec();
        let mut inv = 0u64;

        for (off, &x) in left.iter().enumerate() {
            let rank = lower_bound(&right, x) as u64;
            inv += rank;
            self.out.push(InversionAction::Rank {
                l,
                r,
                i: l + off,
                x,
                rank,
            });
        }

        let mut merged = Vec::with_capacity(r - l);
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            if left[i] <= right[j] {
                merged.push(left[i]);
                i += 1;
            } else {
                merged.push(right[j]);
                j += 1;
            }
        }
        merged.extend_from_slice(&left[i..]);
        merged.extend_from_slice(&right[j..]);

        self.a[l..r].copy_from_slice(&merged);
        self.out.push(InversionAction::Commit { l, r, out: merged });
        inv
    }
}

/// Run merge sort once over `input`, recording every action.
///
/// An empty array produces an empty log.
#[must_use]
pub fn build_trace(input: &InversionInput) -> Vec<InversionAction> {
    let mut b = Builder {
        a: input.values.clone(),
        strategy: input.strategy,
        out: Vec::new(),
    };
    if !b.a.is_empty() {
        let n = b.a.len();
        b.sort_count(0, n);
    }
    debug!(
        n = input.values.len(),
        strategy = %input.strategy,
        actions = b.out.len(),
        "inversions trace built"
    );
    b.out
}

#[derive(Clone, Copy, Debug, Default)]
struct MergeCursor {
    i: Option<usize>,
    j: Option<usize>,
    k: Option<usize>,
    x: Option<u32>,
    rank: Option<u64>,
}

/// Derived replay state for inversion counting.
#[derive(Clone, Debug)]
pub struct InversionState {
    strategy: CountingStrategy,
    array: Vec<u32>,
    total: u64,
    delta: Option<u64>,
    frames: Vec<(Segment, usize)>,
    leaf: Option<Segment>,
    merge: Option<MergeCursor>,
    compared: Vec<usize>,
    written: Option<usize>,
    line: u8,
}

impl InversionState {
    /// Fresh state over the unsorted input.
    #[must_use]
    pub fn new(input: &InversionInput) -> Self {
        Self {
            strategy: input.strategy,
            array: input.values.clone(),
            total: 0,
            delta: None,
            frames: Vec::new(),
            leaf: None,
            merge: None,
            compared: Vec::new(),
            written: None,
            line: 2,
        }
    }

    /// Working array as the algorithm has left it so far.
    #[must_use]
    pub fn array(&self) -> &[u32] {
        &self.array
    }

    /// Inversions counted so far.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Strategy the log was built with.
    #[must_use]
    pub const fn strategy(&self) -> CountingStrategy {
        self.strategy
    }

    fn merge_mut(&mut self) -> &mut MergeCursor {
        self.merge.get_or_insert_with(MergeCursor::default)
    }
}

impl ReplayState for InversionState {
    type Action = InversionAction;

    fn apply(&mut self, action: &InversionAction) {
        self.written = None;
        match action {
            InversionAction::Segment { l, r } => {
                let seg = Segment::new(*l, *r);
                self.frames.push((seg, seg.mid()));
                self.leaf = None;
                self.merge = None;
                self.compared.clear();
                self.line = 5;
            }
            InversionAction::Base { l, r } => {
                self.leaf = Some(Segment::new(*l, *r));
                self.compared.clear();
                self.line = 3;
            }
            InversionAction::Call { .. } | InversionAction::AfterCall { .. } => {
                self.leaf = None;
                self.merge = None;
                self.compared.clear();
            }
            InversionAction::InitMerge { l, m, .. } => {
                self.merge = Some(MergeCursor {
                    k: Some(*l),
                    ..MergeCursor::default()
                });
                if self.strategy == CountingStrategy::Direct {
                    let c = self.merge_mut();
                    c.i = Some(*l);
                    c.j = Some(*m);
                }
                self.delta = None;
                self.line = 8;
            }
            InversionAction::Compare { i, j, .. } => {
                self.compared = vec![*i, *j];
                let c = self.merge_mut();
                c.i = Some(*i);
                c.j = Some(*j);
                self.line = 9;
            }
            InversionAction::Write {
                k,
                value,
                inv_delta,
                tail,
                ..
            } => {
                if let Some(slot) = self.array.get_mut(*k) {
                    *slot = *value;
                }
                self.written = Some(*k);
                self.total += inv_delta;
                self.delta = Some(*inv_delta);
                self.merge_mut().k = Some(k + 1);
                self.line = match tail {
                    Some(Side::L) => 12,
                    Some(Side::R) => 13,
                    None if *inv_delta > 0 => 11,
                    None => 10,
                };
            }
            InversionAction::Rank { i, x, rank, .. } => {
                self.compared = vec![*i];
                self.total += rank;
                self.delta = Some(*rank);
                let c = self.merge_mut();
                c.x = Some(*x);
                c.rank = Some(*rank);
                self.line = 11;
            }
            InversionAction::Commit { l, out, .. } => {
                for (slot, v) in self.array.iter_mut().skip(*l).zip(out) {
                    *slot = *v;
                }
                self.compared.clear();
                self.line = 14;
            }
            InversionAction::SegmentDone { .. } => {
                self.frames.pop();
                self.merge = None;
                self.compared.clear();
                self.line = 14;
            }
        }
    }

    fn highlights(&self) -> Highlights {
        Highlights {
            segment: self.leaf.or_else(|| self.frames.last().map(|(s, _)| *s)),
            compared: self.compared.clone(),
            written: self.written,
            ..Highlights::default()
        }
    }

    fn locals(&self) -> Locals {
        let (seg, m) = match self.frames.last() {
            Some(&(s, m)) => (Some(s), Some(m)),
            None => (self.leaf, None),
        };
        let c = self.merge.unwrap_or_default();
        let total = Some(Local::from(self.total));
        let delta = self.delta.map(Local::from);
        let base = |names: &[&'static str]| {
            Locals::with_names(names)
                .with("l", seg.map(|s| Local::from(s.l)))
                .with("r", seg.map(|s| Local::from(s.r)))
                .with("m", m.map(Local::from))
        };
        match self.strategy {
            CountingStrategy::Direct => base(&["l", "r", "m", "i", "j", "k", "inv", "Δinv"])
                .with("i", c.i.map(Local::from))
                .with("j", c.j.map(Local::from))
                .with("k", c.k.map(Local::from))
                .with("inv", total)
                .with("Δinv", delta),
            CountingStrategy::Rank => base(&["l", "r", "m", "x", "rank", "inv"])
                .with("x", c.x.map(|x| Local::from(u64::from(x))))
                .with("rank", c.rank.map(Local::from))
                .with("inv", total),
        }
    }

    fn result_text(&self) -> String {
        self.total.to_string()
    }

    fn line(&self) -> Option<u8> {
        Some(self.line)
    }
}

/// Merge-sort inversion counting, traced.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inversions;

impl Algorithm for Inversions {
    const NAME: &'static str = "inversions";
    type Input = InversionInput;
    type Action = InversionAction;
    type State = InversionState;

    fn build_trace(input: &InversionInput) -> Vec<InversionAction> {
        build_trace(input)
    }

    fn initial_state(input: &InversionInput) -> InversionState {
        InversionState::new(input)
    }
}
