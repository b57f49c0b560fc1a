//! What the presentation layer sees after every step.
//!
//! A [`Snapshot`] is a plain value: cursor, phase, highlight descriptor, named
//! locals and the formatted result. Adapters render it; they never reach into
//! the engine.

use crate::{Phase, Segment};
use anyhow::{Context, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// Which indices, ranges and points are currently emphasized.
///
/// Index meaning is algorithm-specific: array slots for inversion counting,
/// point ids for closest pair, digit positions for Karatsuba.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Highlights {
    /// Active recursive range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    /// Indices taking part in the current comparison.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compared: Vec<usize>,
    /// Slot written by the current action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<usize>,
    /// Indices forming the best answer so far.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub best: Vec<usize>,
    /// Vertical split axis (closest pair).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_x: Option<f64>,
    /// Strip `[left, right]` around the split axis (closest pair).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip: Option<(f64, f64)>,
    /// Number of low-order digits split off (Karatsuba).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_digits: Option<usize>,
}

/// A single local-variable value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Local {
    /// Integer (indices, counts, partial products).
    Int(i128),
    /// Real (coordinates, distances).
    Float(f64),
}

impl From<usize> for Local {
    fn from(v: usize) -> Self {
        Self::Int(i128::try_from(v).unwrap_or(i128::MAX))
    }
}

impl From<u64> for Local {
    fn from(v: u64) -> Self {
        Self::Int(i128::from(v))
    }
}

impl From<i64> for Local {
    fn from(v: i64) -> Self {
        Self::Int(i128::from(v))
    }
}

impl From<u128> for Local {
    fn from(v: u128) -> Self {
        Self::Int(i128::try_from(v).unwrap_or(i128::MAX))
    }
}

impl From<f64> for Local {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_infinite() => f.write_str("∞"),
            Self::Float(v) => write!(f, "{v:.4}"),
        }
    }
}

/// Ordered set of named locals. Order is fixed by the visualizer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Locals {
    entries: Vec<(&'static str, Option<Local>)>,
}

impl Locals {
    /// Locals with the given names, all undefined.
    #[must_use]
    pub fn with_names(names: &[&'static str]) -> Self {
        Self {
            entries: names.iter().map(|n| (*n, None)).collect(),
        }
    }

    /// Set `name` (appending it if unknown). `None` clears it.
    pub fn set(&mut self, name: &'static str, value: Option<Local>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style [`Self::set`].
    #[must_use]
    pub fn with(mut self, name: &'static str, value: Option<Local>) -> Self {
        self.set(name, value);
        self
    }

    /// Current value of `name`, if defined.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Local> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| *v)
    }

    /// All entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<Local>)> + '_ {
        self.entries.iter().copied()
    }
}

impl Serialize for Locals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Locals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if let Some(v) = value {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{name}: {v}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Engine state exposed after every step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Algorithm name.
    pub algorithm: &'static str,
    /// Number of actions applied.
    pub cursor: usize,
    /// Total number of actions in the log.
    pub len: usize,
    /// Lifecycle phase derived from the cursor.
    pub phase: Phase,
    /// Number of recursive frames currently open.
    pub depth: usize,
    /// Kind of the last applied action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_kind: Option<&'static str>,
    /// Highlight descriptor.
    pub highlights: Highlights,
    /// Named locals.
    pub locals: Locals,
    /// Result formatted for display.
    pub result: String,
    /// Active pseudocode line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u8>,
}

impl Snapshot {
    /// Serialize as a single JSON line.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serialize snapshot to JSON")
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>4}/{}] {:<13} result={}",
            self.cursor,
            self.len,
            self.last_kind.unwrap_or("-"),
            self.result
        )?;
        let locals = self.locals.to_string();
        if !locals.is_empty() {
            write!(f, " | {locals}")?;
        }
        Ok(())
    }
}
