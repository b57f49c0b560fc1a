//! Canonical core types used across the dcviz workspace.
//!
//! These live in `dcviz-core` and are re-exported at the crate root so other
//! crates can import via `dcviz_core::Segment`, `dcviz_core::Side`, etc.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open index range `[l, r)` of one recursive call.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Inclusive lower bound.
    pub l: usize,
    /// Exclusive upper bound.
    pub r: usize,
}

impl Segment {
    /// Create a segment `[l, r)` (no validation).
    #[inline]
    #[must_use]
    pub const fn new(l: usize, r: usize) -> Self {
        Self { l, r }
    }

    /// Number of indices covered (0 if inverted).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.r.saturating_sub(self.l)
    }

    /// Whether the segment covers no index.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Midpoint `⌊(l + r) / 2⌋`, the first index of the right half.
    #[inline]
    #[must_use]
    pub const fn mid(&self) -> usize {
        (self.l + self.r) / 2
    }

    /// Balanced split at [`Self::mid`]. Returns `(left, right)`.
    #[inline]
    #[must_use]
    pub const fn split_mid(&self) -> (Self, Self) {
        let m = self.mid();
        (Self::new(self.l, m), Self::new(m, self.r))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.l, self.r)
    }
}

/// Which half of a split a recursive call works on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    /// Left half `[l, m)`.
    L,
    /// Right half `[m, r)`.
    R,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::L => "L",
            Self::R => "R",
        })
    }
}

/// Replay lifecycle derived from the cursor position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No action applied yet (`cursor == 0`).
    Ready,
    /// Somewhere inside the log (`0 < cursor < len`).
    Stepping,
    /// Every action applied (`cursor == len`).
    Done,
}

impl Phase {
    /// Classify a cursor position within a log of `len` actions.
    ///
    /// An empty log is `Done` immediately.
    #[inline]
    #[must_use]
    pub const fn of(cursor: usize, len: usize) -> Self {
        if cursor >= len {
            Self::Done
        } else if cursor == 0 {
            Self::Ready
        } else {
            Self::Stepping
        }
    }
}
