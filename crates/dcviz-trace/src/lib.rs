//! Trace builders for three divide-and-conquer visualizers.
//!
//! Each algorithm module provides the same pieces:
//!
//! - an action enum recorded while the real recursion runs,
//! - `build_trace` (the builder) and a direct, untraced reference evaluator,
//! - a derived replay state implementing [`dcviz_core::ReplayState`],
//! - a marker type implementing [`dcviz_core::Algorithm`].
//!
//! Supporting modules:
//!
//! - `digits`: decimal digit arithmetic used by Karatsuba.
//! - `generator`: seeded random inputs within the configured bounds.
//! - `io`: JSON Lines export of an action log.
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `dcviz_trace::inversions::Inversions`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Closest pair of points in the plane.
pub mod closest_pair;
/// Decimal digit vectors: padding, splitting, carrying addition.
pub mod digits;
/// Seeded random inputs for each visualizer.
pub mod generator;
/// Inversion counting via merge sort (direct and rank strategies).
pub mod inversions;
/// JSON Lines export of action logs.
pub mod io;
/// Karatsuba multiplication over decimal digits.
pub mod karatsuba;
