//! Directed road network graph.
//!
//! Vertices and edges are stored in dense vectors; ids are their positions
//! and are never reused. Each vertex tracks its incident edges so the graph
//! can be walked in either direction.

mod builder;
pub mod io;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceGraphError};
use crate::geo_utils::{bearing_between, compute_bounds, euclidean_distance, interpolate};
use crate::{Planar, Point, Rectangle};

pub use builder::{build_graph, generate_edges};
pub use io::{read_graph, write_graph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How repeated transitions between the same pair of clusters are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Every transition produces its own edge (parallel edges allowed)
    #[default]
    KeepDuplicates,
    /// Only the first transition between a (src, dst) pair produces an edge
    Deduplicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
    pub in_edges: Vec<EdgeId>,
    pub out_edges: Vec<EdgeId>,
}

impl Vertex {
    /// A vertex with no incident edges.
    pub fn is_isolated(&self) -> bool {
        self.in_edges.is_empty() && self.out_edges.is_empty()
    }
}

impl Planar for Vertex {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub src: VertexId,
    pub dst: VertexId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn add_vertex(&mut self, x: f64, y: f64) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex {
            id,
            x,
            y,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        });
        id
    }

    /// Add a directed edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, src: VertexId, dst: VertexId) -> Result<EdgeId> {
        let vertex_count = self.vertices.len();
        if src.0 >= vertex_count || dst.0 >= vertex_count {
            return Err(TraceGraphError::DanglingEdge {
                src: src.0,
                dst: dst.0,
                vertex_count,
            });
        }
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { id, src, dst });
        self.vertices[src.0].out_edges.push(id);
        self.vertices[dst.0].in_edges.push(id);
        Ok(id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of a vertex.
    pub fn out_edges(&self, id: VertexId) -> impl Iterator<Item = &Edge> + '_ {
        self.vertices
            .get(id.0)
            .into_iter()
            .flat_map(|v| v.out_edges.iter())
            .map(|e| &self.edges[e.0])
    }

    /// Euclidean length of an edge of this graph.
    pub fn edge_length(&self, edge: &Edge) -> f64 {
        euclidean_distance(&self.vertices[edge.src.0], &self.vertices[edge.dst.0])
    }

    /// The point `distance` along `edge` from its source, heading along the edge.
    pub fn point_along_edge(&self, edge: &Edge, distance: f64) -> Point {
        let src = &self.vertices[edge.src.0];
        let dst = &self.vertices[edge.dst.0];
        let length = euclidean_distance(src, dst);
        let t = if length > 0.0 { distance / length } else { 0.0 };
        let (x, y) = interpolate(src, dst, t);
        Point::new(x, y, bearing_between(src, dst))
    }

    /// Sum of all edge lengths.
    pub fn total_length(&self) -> f64 {
        self.edges.iter().map(|e| self.edge_length(e)).sum()
    }

    pub fn bounds(&self) -> Rectangle {
        compute_bounds(&self.vertices)
    }
}
