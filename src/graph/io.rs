//! Plain-text graph format.
//!
//! ```text
//! <x1> <y1>
//! <x2> <y2>
//! <blank line>
//! <src_id1> <dst_id1>
//! ```
//!
//! The i-th vertex line (0-indexed) defines vertex `i`. Blank lines after
//! the separator are ignored. Coordinates must be finite.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::{Graph, VertexId};
use crate::error::{Result, TraceGraphError};
use crate::trace::{parse_coordinates, parse_pair};

#[derive(PartialEq)]
enum Section {
    Vertices,
    Edges,
}

/// Parse a graph. `source` is only used in error messages.
pub fn read_graph<R: BufRead>(reader: R, source: &Path) -> Result<Graph> {
    let mut graph = Graph::new();
    let mut section = Section::Vertices;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let parse_error = |message: String| TraceGraphError::Parse {
            path: source.to_path_buf(),
            line: line_idx + 1,
            message,
        };

        if line.is_empty() {
            section = Section::Edges;
            continue;
        }

        match section {
            Section::Vertices => {
                let (x, y) = parse_coordinates(line).ok_or_else(|| {
                    parse_error(format!("expected finite '<x> <y>', got '{line}'"))
                })?;
                graph.add_vertex(x, y);
            }
            Section::Edges => {
                let (src, dst) = parse_pair::<usize>(line).ok_or_else(|| {
                    parse_error(format!("expected '<src_id> <dst_id>', got '{line}'"))
                })?;
                graph.add_edge(VertexId(src), VertexId(dst))?;
            }
        }
    }

    Ok(graph)
}

/// Write a graph in the text format.
pub fn write_graph<W: Write>(graph: &Graph, mut writer: W) -> Result<()> {
    for vertex in graph.vertices() {
        writeln!(writer, "{} {}", vertex.x, vertex.y)?;
    }
    writeln!(writer)?;
    for edge in graph.edges() {
        writeln!(writer, "{} {}", edge.src, edge.dst)?;
    }
    writer.flush()?;
    Ok(())
}

impl Graph {
    pub fn read_from_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        read_graph(reader, path)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        write_graph(self, writer)
    }
}
