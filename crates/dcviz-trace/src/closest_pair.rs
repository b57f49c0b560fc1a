//! Closest pair of points by divide and conquer.
//!
//! Points are sorted by x once (a stable index permutation), then the recursion
//! works on half-open ranges of that permutation. Action payloads name points
//! by their index in the input slice, so replay never needs the permutation.

use dcviz_core::{
    Algorithm, Bounds, FrameEffect, Highlights, Local, Locals, ReplayState, Segment, Side,
    TraceAction,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Supported number of points.
pub const POINTS: Bounds = Bounds::new(2, 60, 20);

/// Candidates compared per strip point, in y order.
const STRIP_WINDOW: usize = 7;

/// A point in the plane.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn dist(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One observable event of a closest-pair run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClosestAction {
    /// Entered the recursive call over `[l, r)` of the x order.
    Segment { l: usize, r: usize },
    /// Brute-force comparison of points `i` and `j` in a small segment.
    BasePair {
        i: usize,
        j: usize,
        d: f64,
        l: usize,
        r: usize,
    },
    /// Split at position `m`; the vertical axis sits at `mid_x`.
    Split {
        l: usize,
        r: usize,
        m: usize,
        mid_x: f64,
    },
    /// A recursive call on one half has returned.
    CallReturned { which: Side, l: usize, r: usize },
    /// Strip of half-width `d` around the split axis is built.
    InitStrip {
        l: usize,
        r: usize,
        m: usize,
        mid_x: f64,
        d: f64,
    },
    /// Strip comparison of points `p` and `q`.
    CompareStrip {
        p: usize,
        q: usize,
        d: f64,
        improves: bool,
        mid_x: f64,
        l: usize,
        r: usize,
    },
    /// The call over `[l, r)` finished with minimum distance `best`.
    SegmentDone { l: usize, r: usize, best: f64 },
}

impl TraceAction for ClosestAction {
    fn kind(&self) -> &'static str {
        match self {
            Self::Segment { .. } => "segment",
            Self::BasePair { .. } => "basePair",
            Self::Split { .. } => "split",
            Self::CallReturned { .. } => "callReturned",
            Self::InitStrip { .. } => "initStrip",
            Self::CompareStrip { .. } => "compareStrip",
            Self::SegmentDone { .. } => "segmentDone",
        }
    }

    fn frame(&self) -> FrameEffect {
        match self {
            Self::Segment { .. } => FrameEffect::Open,
            Self::InitStrip { .. } => FrameEffect::Land,
            Self::SegmentDone { .. } => FrameEffect::Close,
            _ => FrameEffect::Inline,
        }
    }

    fn segment(&self) -> Option<Segment> {
        match *self {
            Self::Segment { l, r }
            | Self::BasePair { l, r, .. }
            | Self::Split { l, r, .. }
            | Self::CallReturned { l, r, .. }
            | Self::InitStrip { l, r, .. }
            | Self::CompareStrip { l, r, .. }
            | Self::SegmentDone { l, r, .. } => Some(Segment::new(l, r)),
        }
    }
}

/// Indices of `points` sorted by x (stable, so equal x keeps input order).
#[must_use]
pub fn sorted_by_x(points: &[Point]) -> Vec<usize> {
    let mut px: Vec<usize> = (0..points.len()).collect();
    px.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x));
    px
}

struct Builder<'a> {
    points: &'a [Point],
    px: Vec<usize>,
    out: Vec<ClosestAction>,
}

impl Builder<'_> {
    fn solve(&mut self, l: usize, r: usize) -> f64 {
        self.out.push(ClosestAction::Segment { l, r });

        if r - l <= 3 {
            let mut bd = f64::INFINITY;
            for a in l..r {
                for b in a + 1..r {
                    let (i, j) = (self.px[a], self.px[b]);
                    let d = self.points[i].dist(&self.points[j]);
                    bd = bd.min(d);
                    self.out.push(ClosestAction::BasePair { i, j, d, l, r });
                }
            }
            self.out.push(ClosestAction::SegmentDone { l, r, best: bd });
            return bd;
        }

        let (left, right) = Segment::new(l, r).split_mid();
        let m = right.l;
        let mid_x = self.points[self.px[m]].x;
        self.out.push(ClosestAction::Split { l, r, m, mid_x });

        let d_l = self.solve(left.l, left.r);
        self.out.push(ClosestAction::CallReturned { which: Side::L, l, r });
        let d_r = self.solve(right.l, right.r);
        self.out.push(ClosestAction::CallReturned { which: Side::R, l, r });

        let mut d = d_l.min(d_r);
        self.out.push(ClosestAction::InitStrip { l, r, m, mid_x, d });

        let mut strip: Vec<usize> = self.px[l..r]
            .iter()
            .copied()
            .filter(|&i| (self.points[i].x - mid_x).abs() < d)
            .collect();
        strip.sort_by(|&a, &b| self.points[a].y.total_cmp(&self.points[b].y));

        for (a, &p) in strip.iter().enumerate() {
            for &q in strip.iter().skip(a + 1).take(STRIP_WINDOW) {
                let dd = self.points[p].dist(&self.points[q]);
                let improves = dd < d;
                self.out.push(ClosestAction::CompareStrip {
                    p,
                    q,
                    d: dd,
                    improves,
                    mid_x,
                    l,
                    r,
                });
                if improves {
                    d = dd;
                }
            }
        }

        self.out.push(ClosestAction::SegmentDone { l, r, best: d });
        d
    }
}

/// Run the divide-and-conquer algorithm once, recording every action.
///
/// Fewer than two points produce a single segment reporting `∞`.
#[must_use]
pub fn build_trace(points: &[Point]) -> Vec<ClosestAction> {
    let mut b = Builder {
        points,
        px: sorted_by_x(points),
        out: Vec::new(),
    };
    if !points.is_empty() {
        b.solve(0, points.len());
    }
    debug!(points = points.len(), actions = b.out.len(), "closest-pair trace built");
    b.out
}

/// Quadratic reference: minimum distance and the first pair achieving it.
#[must_use]
pub fn brute_force(points: &[Point]) -> Option<(f64, (usize, usize))> {
    let mut best: Option<(f64, (usize, usize))> = None;
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let d = points[i].dist(&points[j]);
            if best.map_or(true, |(bd, _)| d.total_cmp(&bd) == Ordering::Less) {
                best = Some((d, (i, j)));
            }
        }
    }
    best
}

#[derive(Clone, Copy, Debug, Default)]
struct Frame {
    seg: Option<Segment>,
    m: Option<usize>,
    mid_x: Option<f64>,
    d_l: Option<f64>,
    d_r: Option<f64>,
    d: Option<f64>,
}

/// Derived replay state for closest pair.
#[derive(Clone, Debug)]
pub struct ClosestPairState {
    points: Vec<Point>,
    best: f64,
    best_pair: Option<(usize, usize)>,
    frames: Vec<Frame>,
    last_done: Option<f64>,
    strip: Option<(f64, f64)>,
    pair: Option<(usize, usize)>,
    line: u8,
}

impl ClosestPairState {
    /// Fresh state over `points`.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            best: f64::INFINITY,
            best_pair: None,
            frames: Vec::new(),
            last_done: None,
            strip: None,
            pair: None,
            line: 1,
        }
    }

    /// The point set being searched.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Smallest distance seen so far (`∞` before any comparison).
    #[must_use]
    pub const fn best(&self) -> f64 {
        self.best
    }

    /// Point ids of the pair achieving [`Self::best`].
    #[must_use]
    pub const fn best_pair(&self) -> Option<(usize, usize)> {
        self.best_pair
    }

    fn top(&self) -> Frame {
        self.frames.last().copied().unwrap_or_default()
    }

    fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    // Earlier pairs win ties.
    fn offer(&mut self, d: f64, pair: (usize, usize)) {
        if self.best_pair.is_none() || d < self.best {
            self.best = d;
            self.best_pair = Some(pair);
        }
    }
}

impl ReplayState for ClosestPairState {
    type Action = ClosestAction;

    fn apply(&mut self, action: &ClosestAction) {
        match *action {
            ClosestAction::Segment { l, r } => {
                self.frames.push(Frame {
                    seg: Some(Segment::new(l, r)),
                    ..Frame::default()
                });
                self.strip = None;
                self.pair = None;
                self.line = 2;
            }
            ClosestAction::BasePair { i, j, d, .. } => {
                self.pair = Some((i, j));
                self.offer(d, (i, j));
                if let Some(f) = self.top_mut() {
                    f.d = Some(f.d.map_or(d, |cur| cur.min(d)));
                }
                self.line = 2;
            }
            ClosestAction::Split { m, mid_x, .. } => {
                if let Some(f) = self.top_mut() {
                    f.m = Some(m);
                    f.mid_x = Some(mid_x);
                }
                self.line = 3;
            }
            ClosestAction::CallReturned { which, .. } => {
                let child = self.last_done;
                if let Some(f) = self.top_mut() {
                    match which {
                        Side::L => f.d_l = child,
                        Side::R => f.d_r = child,
                    }
                }
                self.strip = None;
                self.pair = None;
            }
            ClosestAction::InitStrip { mid_x, d, .. } => {
                if let Some(f) = self.top_mut() {
                    f.d = Some(d);
                }
                self.strip = Some((mid_x - d, mid_x + d));
                self.line = 8;
            }
            ClosestAction::CompareStrip {
                p, q, d, improves, ..
            } => {
                self.pair = Some((p, q));
                if improves {
                    if let Some(f) = self.top_mut() {
                        f.d = Some(d);
                    }
                    self.offer(d, (p, q));
                    self.line = 11;
                } else {
                    self.line = 10;
                }
            }
            ClosestAction::SegmentDone { best, .. } => {
                self.frames.pop();
                self.last_done = Some(best);
                self.strip = None;
                self.pair = None;
                self.line = 12;
            }
        }
    }

    fn highlights(&self) -> Highlights {
        let top = self.top();
        Highlights {
            segment: top.seg,
            compared: self.pair.map(|(a, b)| vec![a, b]).unwrap_or_default(),
            best: self.best_pair.map(|(a, b)| vec![a, b]).unwrap_or_default(),
            split_x: top.mid_x,
            strip: self.strip,
            ..Highlights::default()
        }
    }

    fn locals(&self) -> Locals {
        let top = self.top();
        Locals::with_names(&["l", "r", "m", "midx", "dL", "dR", "d"])
            .with("l", top.seg.map(|s| Local::from(s.l)))
            .with("r", top.seg.map(|s| Local::from(s.r)))
            .with("m", top.m.map(Local::from))
            .with("midx", top.mid_x.map(Local::from))
            .with("dL", top.d_l.map(Local::from))
            .with("dR", top.d_r.map(Local::from))
            .with("d", top.d.map(Local::from))
    }

    fn result_text(&self) -> String {
        Local::from(self.best).to_string()
    }

    fn line(&self) -> Option<u8> {
        Some(self.line)
    }
}

/// Closest pair of points, traced.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosestPair;

impl Algorithm for ClosestPair {
    const NAME: &'static str = "closest-pair";
    type Input = Vec<Point>;
    type Action = ClosestAction;
    type State = ClosestPairState;

    fn build_trace(input: &Vec<Point>) -> Vec<ClosestAction> {
        build_trace(input)
    }

    fn initial_state(input: &Vec<Point>) -> ClosestPairState {
        ClosestPairState::new(input.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(points: &[Point]) -> ClosestPairState {
        let mut s = ClosestPairState::new(points.to_vec());
        for a in &build_trace(points) {
            s.apply(a);
        }
        s
    }

    #[test]
    fn small_segment_is_brute_forced() {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(0.0, 1.0)];
        let log = build_trace(&pts);
        assert!(matches!(log[0], ClosestAction::Segment { l: 0, r: 3 }));
        let pairs = log
            .iter()
            .filter(|a| matches!(a, ClosestAction::BasePair { .. }))
            .count();
        assert_eq!(pairs, 3);
        assert!(
            matches!(log.last(), Some(ClosestAction::SegmentDone { best, .. }) if (*best - 1.0).abs() < 1e-12)
        );
    }

    #[test]
    fn recursion_visits_both_halves_before_strip() {
        let pts: Vec<Point> = (0..8)
            .map(|i| Point::new(f64::from(i) * 0.1, f64::from(i % 3) * 0.2))
            .collect();
        let kinds: Vec<&str> = build_trace(&pts).iter().map(TraceAction::kind).collect();
        assert_eq!(&kinds[..3], &["segment", "split", "segment"]);
        // The root's strip is the last one built, after its right call returned.
        let strip = kinds.iter().rposition(|k| *k == "initStrip").unwrap();
        let last_return = kinds.iter().rposition(|k| *k == "callReturned").unwrap();
        assert_eq!(last_return + 1, strip);
    }

    #[test]
    fn replay_tracks_best_pair_and_child_distances() {
        let pts = vec![
            Point::new(0.10, 0.50),
            Point::new(0.20, 0.90),
            Point::new(0.30, 0.10),
            Point::new(0.55, 0.52),
            Point::new(0.56, 0.40),
            Point::new(0.90, 0.95),
            Point::new(0.95, 0.20),
        ];
        let s = replay(&pts);
        let (d, pair) = brute_force(&pts).unwrap();
        assert!((s.best() - d).abs() < 1e-12);
        assert_eq!(s.best_pair(), Some(pair));
        assert_eq!(s.line(), Some(12));
        assert!(s.locals().get("l").is_none());
    }

    #[test]
    fn strip_highlight_follows_split_axis() {
        let pts: Vec<Point> = (0..6)
            .map(|i| Point::new(f64::from(i) / 6.0, 0.5))
            .collect();
        let log = build_trace(&pts);
        let at = log
            .iter()
            .position(|a| matches!(a, ClosestAction::InitStrip { .. }))
            .unwrap();
        let mut s = ClosestPairState::new(pts);
        for a in &log[..=at] {
            s.apply(a);
        }
        let h = s.highlights();
        let (lo, hi) = h.strip.unwrap();
        let x = h.split_x.unwrap();
        assert!((x - 0.5).abs() < 1e-12);
        assert!((x - lo - (hi - x)).abs() < 1e-12);
        assert!(s.locals().get("dL").is_some());
        assert!(s.locals().get("dR").is_some());
        assert_eq!(s.line(), Some(8));
    }

    #[test]
    fn action_serializes_with_camel_case_tag() {
        let a = ClosestAction::Split {
            l: 0,
            r: 4,
            m: 2,
            mid_x: 0.5,
        };
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["type"], "split");
        assert_eq!(v["midX"], 0.5);
    }
}
