//! GPS traces and loading them from disk.
//!
//! A trace directory holds one plain-text file per trace, each line an
//! `<x> <y>` observation in projected metres.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result, TraceGraphError};
use crate::geo_utils::{compute_bounds, polyline_length};
use crate::{Observation, Rectangle};

/// Minimum observations needed to derive a heading.
pub const MIN_TRACE_POINTS: usize = 2;

/// An ordered sequence of observations from a single trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Identifier, typically the source file name
    pub id: String,
    pub observations: Vec<Observation>,
}

impl Trace {
    pub fn new(id: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            id: id.into(),
            observations,
        }
    }

    /// Create a trace, rejecting inputs with fewer than two observations or
    /// with non-finite coordinates.
    pub fn try_new(id: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        let id = id.into();
        observations
            .get(MIN_TRACE_POINTS - 1)
            .ok_or_insufficient_points(&id, observations.len(), MIN_TRACE_POINTS)?;
        if let Some(index) = observations.iter().position(|o| !o.is_valid()) {
            return Err(TraceGraphError::NonFiniteObservation { trace_id: id, index });
        }
        Ok(Self::new(id, observations))
    }

    /// Parse `<x> <y>` lines. `source` is only used in error messages.
    pub fn from_reader<R: BufRead>(id: impl Into<String>, reader: R, source: &Path) -> Result<Self> {
        let mut observations = Vec::new();
        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (x, y) = parse_coordinates(line).ok_or_else(|| TraceGraphError::Parse {
                path: source.to_path_buf(),
                line: line_idx + 1,
                message: format!("expected finite '<x> <y>', got '{line}'"),
            })?;
            observations.push(Observation::new(x, y));
        }
        Self::try_new(id, observations)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Total polyline length.
    pub fn length(&self) -> f64 {
        polyline_length(&self.observations)
    }

    pub fn bounds(&self) -> Rectangle {
        compute_bounds(&self.observations)
    }
}

/// Parse two whitespace separated values; extra trailing fields are ignored.
pub(crate) fn parse_pair<T: std::str::FromStr>(line: &str) -> Option<(T, T)> {
    let mut parts = line.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    Some((a, b))
}

/// Parse an `<x> <y>` pair, rejecting `nan` and infinities.
pub(crate) fn parse_coordinates(line: &str) -> Option<(f64, f64)> {
    parse_pair::<f64>(line).filter(|(x, y)| x.is_finite() && y.is_finite())
}

/// Read a single trace file. The trace id is the file name.
pub fn read_trace_file(path: &Path) -> Result<Trace> {
    let id = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();
    let reader = BufReader::new(File::open(path)?);
    Trace::from_reader(id, reader, path)
}

/// Read every regular file in `dir` as a trace, in file-name order.
///
/// Fails on an empty directory, an unreadable entry, or the first malformed
/// trace.
pub fn read_traces(dir: &Path) -> Result<Vec<Trace>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(TraceGraphError::NoTraces {
            source_name: dir.display().to_string(),
        });
    }

    let mut traces = Vec::with_capacity(files.len());
    for path in &files {
        let trace = read_trace_file(path)?;
        debug!("[Traces] {} - {} points", trace.id, trace.len());
        traces.push(trace);
    }

    info!(
        "[Traces] Loaded {} traces from {}",
        traces.len(),
        dir.display()
    );
    Ok(traces)
}
