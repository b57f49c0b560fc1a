//! dcviz-core: shared types, the generic replay engine, and timed playback.
//!
//! This crate defines the **stable boundary** used across dcviz crates:
//! - canonical data types (`Segment`, `Side`, `Phase`, …),
//! - the algorithm seams ([`Algorithm`], [`TraceAction`], [`ReplayState`]),
//! - the [`Replay`] engine (cursor, single step, step over, rewind, reset),
//! - the [`Player`] that drives a replay from a [`HostTimer`], and
//! - presentation snapshots plus configuration bounds.
//!
//! ```no_run
//! use dcviz_core::prelude::*;
//! # fn demo<A: Algorithm>(input: A::Input) {
//! let mut player = Player::<A, _>::new(input, ManualTimer::new());
//! player.step_over();
//! player.run(250);
//! let snap = player.snapshot();
//! # let _ = snap;
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Algorithm seams: trace actions, derived replay state, and builders.
pub mod algorithm;
/// Clamped configuration bounds and playback options (with env overrides).
pub mod config;
/// Auto-play driver over a host timer.
pub mod player;
/// Cursor-based replay engine over an action log.
pub mod replay;
/// Presentation snapshots: highlights, locals, and display results.
pub mod snapshot;
/// Host timer abstraction plus manual and sleeping implementations.
pub mod timer;
/// Canonical core data types shared across the workspace.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use algorithm::*;
pub use config::*;
pub use player::*;
pub use replay::*;
pub use snapshot::*;
pub use timer::*;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use dcviz_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        algorithm::{Algorithm, FrameEffect, ReplayState, TraceAction},
        player::{Player, PlaybackState},
        replay::Replay,
        snapshot::{Highlights, Local, Locals, Snapshot},
        timer::{HostTimer, ManualTimer, SleepTimer, TimerId},
        types::*,
    };
}
