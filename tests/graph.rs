//! Tests for the graph model, text format and cluster-based construction

use std::io::Cursor;
use std::path::Path;

use tracegraph::error::TraceGraphError;
use tracegraph::graph::{read_graph, write_graph};
use tracegraph::{
    Cluster, EdgeId, EdgePolicy, Graph, Marker, Point, VertexId, build_graph,
};

fn sample_graph() -> Graph {
    let mut graph = Graph::new();
    let a = graph.add_vertex(0.0, 0.0);
    let b = graph.add_vertex(30.0, 40.0);
    let c = graph.add_vertex(-12.25, 7.125);
    graph.add_edge(a, b).unwrap();
    graph.add_edge(b, c).unwrap();
    graph.add_edge(c, a).unwrap();
    graph
}

fn parse(text: &str) -> Result<Graph, TraceGraphError> {
    read_graph(Cursor::new(text), Path::new("test.graph"))
}

#[test]
fn test_ids_are_dense_and_incidence_tracked() {
    let graph = sample_graph();
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 3);

    for (i, v) in graph.vertices().iter().enumerate() {
        assert_eq!(v.id, VertexId(i));
    }
    let b = graph.vertex(VertexId(1)).unwrap();
    assert_eq!(b.in_edges, vec![EdgeId(0)]);
    assert_eq!(b.out_edges, vec![EdgeId(1)]);

    let out: Vec<VertexId> = graph.out_edges(VertexId(0)).map(|e| e.dst).collect();
    assert_eq!(out, vec![VertexId(1)]);
    assert!(graph.vertex(VertexId(3)).is_none());
    assert_eq!(graph.out_edges(VertexId(99)).count(), 0);
}

#[test]
fn test_dangling_edge_rejected() {
    let mut graph = Graph::new();
    graph.add_vertex(0.0, 0.0);
    let err = graph.add_edge(VertexId(0), VertexId(1)).unwrap_err();
    assert!(matches!(
        err,
        TraceGraphError::DanglingEdge {
            src: 0,
            dst: 1,
            vertex_count: 1
        }
    ));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_edge_geometry() {
    let graph = sample_graph();
    let edge = *graph.edge(EdgeId(0)).unwrap();
    assert_eq!(graph.edge_length(&edge), 50.0);

    let p = graph.point_along_edge(&edge, 25.0);
    assert!((p.x - 15.0).abs() < 1e-9);
    assert!((p.y - 20.0).abs() < 1e-9);
    let expected_bearing = 40.0_f64.atan2(30.0).to_degrees();
    assert!((p.bearing - expected_bearing).abs() < 1e-9);

    assert!(graph.total_length() > 50.0);
    assert!(graph.bounds().contains(&[-12.25, 40.0]));
}

#[test]
fn test_round_trip_in_memory() {
    let graph = sample_graph();
    let mut buf = Vec::new();
    write_graph(&graph, &mut buf).unwrap();

    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.starts_with("0 0\n30 40\n-12.25 7.125\n\n"));

    let parsed = read_graph(Cursor::new(buf), Path::new("mem")).unwrap();
    assert_eq!(parsed, graph);
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inferred.graph");

    let graph = sample_graph();
    graph.write_to_path(&path).unwrap();
    let parsed = Graph::read_from_path(&path).unwrap();
    assert_eq!(parsed, graph);
}

#[test]
fn test_parse_tolerates_trailing_blank_lines() {
    let graph = parse("0 0\n10 0\n\n0 1\n\n\n").unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_parse_vertices_only() {
    let graph = parse("0 0\n10 0\n").unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 0);

    let empty = parse("").unwrap();
    assert_eq!(empty.vertex_count(), 0);
}

#[test]
fn test_parse_error_reports_line() {
    let err = parse("0 0\n10 zero\n").unwrap_err();
    match err {
        TraceGraphError::Parse { line, path, .. } => {
            assert_eq!(line, 2);
            assert_eq!(path, Path::new("test.graph"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = parse("0 0\n\n0 -1\n").unwrap_err();
    assert!(matches!(err, TraceGraphError::Parse { line: 3, .. }));
}

#[test]
fn test_parse_rejects_non_finite_coordinates() {
    for text in ["inf 0\n10 0\n0 0\n\n0 1\n1 2\n", "0 0\nNaN 5\n", "0 0\n10 -inf\n"] {
        let err = parse(text).unwrap_err();
        match err {
            TraceGraphError::Parse { line, .. } => {
                let expected = if text.starts_with("inf") { 1 } else { 2 };
                assert_eq!(line, expected, "input {text:?}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn test_parse_rejects_unknown_vertex() {
    let err = parse("0 0\n10 0\n\n0 5\n").unwrap_err();
    assert!(matches!(err, TraceGraphError::DanglingEdge { dst: 5, .. }));
}

/// Two clusters along x, and a trace that goes a -> b -> a -> b.
fn two_clusters() -> (Vec<Cluster>, Vec<Vec<Marker>>) {
    let trace: Vec<Marker> = [0.0, 50.0, 0.0, 50.0]
        .iter()
        .enumerate()
        .map(|(i, &x)| Marker::new(i, x, 0.0, 0.0))
        .collect();

    let mut a = Cluster::new(Point::new(0.0, 0.0, 0.0));
    let mut b = Cluster::new(Point::new(50.0, 0.0, 0.0));
    a.add_member(trace[0]);
    a.add_member(trace[2]);
    b.add_member(trace[1]);
    b.add_member(trace[3]);
    (vec![a, b], vec![trace])
}

#[test]
fn test_build_graph_keeps_duplicate_transitions() {
    let (clusters, traces) = two_clusters();
    let graph = build_graph(&clusters, &traces, EdgePolicy::KeepDuplicates).unwrap();

    assert_eq!(graph.vertex_count(), 2);
    let pairs: Vec<(usize, usize)> = graph.edges().iter().map(|e| (e.src.0, e.dst.0)).collect();
    assert_eq!(pairs, vec![(0, 1), (1, 0), (0, 1)]);
}

#[test]
fn test_build_graph_deduplicates() {
    let (clusters, traces) = two_clusters();
    let graph = build_graph(&clusters, &traces, EdgePolicy::Deduplicate).unwrap();
    let pairs: Vec<(usize, usize)> = graph.edges().iter().map(|e| (e.src.0, e.dst.0)).collect();
    assert_eq!(pairs, vec![(0, 1), (1, 0)]);
}

#[test]
fn test_build_graph_places_vertices_at_cluster_means() {
    let mut cluster = Cluster::new(Point::new(100.0, 100.0, 0.0));
    cluster.add_member(Marker::new(0, 2.0, 0.0, 0.0));
    cluster.add_member(Marker::new(1, 4.0, 6.0, 0.0));
    let empty = Cluster::new(Point::new(-5.0, -5.0, 0.0));

    let graph = build_graph(&[cluster, empty], &[], EdgePolicy::default()).unwrap();
    let v0 = graph.vertex(VertexId(0)).unwrap();
    assert_eq!((v0.x, v0.y), (3.0, 3.0));
    let v1 = graph.vertex(VertexId(1)).unwrap();
    assert_eq!((v1.x, v1.y), (-5.0, -5.0));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_build_graph_skips_self_loops_and_unassigned_markers() {
    let trace: Vec<Marker> = (0..5)
        .map(|i| Marker::new(i, i as f64 * 10.0, 0.0, 0.0))
        .collect();

    // Markers 0,1 -> a; marker 2 unassigned; markers 3,4 -> b
    let mut a = Cluster::new(Point::new(5.0, 0.0, 0.0));
    let mut b = Cluster::new(Point::new(35.0, 0.0, 0.0));
    a.add_member(trace[0]);
    a.add_member(trace[1]);
    b.add_member(trace[3]);
    b.add_member(trace[4]);

    let graph = build_graph(&[a, b], &[trace], EdgePolicy::KeepDuplicates).unwrap();
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_edges_never_cross_traces() {
    let first = vec![Marker::new(0, 0.0, 0.0, 0.0)];
    let second = vec![Marker::new(1, 50.0, 0.0, 0.0)];

    let mut a = Cluster::new(Point::new(0.0, 0.0, 0.0));
    let mut b = Cluster::new(Point::new(50.0, 0.0, 0.0));
    a.add_member(first[0]);
    b.add_member(second[0]);

    let graph = build_graph(&[a, b], &[first, second], EdgePolicy::KeepDuplicates).unwrap();
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_edge_policy_serde() {
    let policy: EdgePolicy = serde_json::from_str("\"deduplicate\"").unwrap();
    assert_eq!(policy, EdgePolicy::Deduplicate);
    assert_eq!(EdgePolicy::default(), EdgePolicy::KeepDuplicates);
}
