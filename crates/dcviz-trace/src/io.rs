//! JSON Lines export of action logs.
//!
//! One tagged action per line, in log order. This is an inspection format:
//! nothing in the workspace reads it back except tests.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/* ---------------- Writers ---------------- */

/// Write `actions` to any writer, one JSON object per line.
pub fn write_actions<W: Write, A: Serialize>(mut w: W, actions: &[A]) -> Result<()> {
    for (i, a) in actions.iter().enumerate() {
        serde_json::to_writer(&mut w, a).with_context(|| format!("serialize action #{i}"))?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush JSONL writer")?;
    Ok(())
}

/// Write `actions` to a `.jsonl` file at `path`.
pub fn write_actions_jsonl<P: AsRef<Path>, A: Serialize>(path: P, actions: &[A]) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    write_actions(BufWriter::new(f), actions)
}

/* ---------------- Readers ---------------- */

/// Read actions back from JSON Lines; blank lines are skipped.
pub fn read_actions<R: BufRead, A: DeserializeOwned>(r: R) -> Result<Vec<A>> {
    let mut out = Vec::new();
    for (i, line) in r.lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let a = serde_json::from_str(&line).with_context(|| format!("decode line {}", i + 1))?;
        out.push(a);
    }
    Ok(out)
}

/// Read actions from a `.jsonl` file at `path`.
pub fn read_actions_jsonl<P: AsRef<Path>, A: DeserializeOwned>(path: P) -> Result<Vec<A>> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    read_actions(BufReader::new(f))
}

#[inline]
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
