//! Turning clusters and trace adjacency into a graph.

use std::collections::{HashMap, HashSet};

use log::info;

use super::{EdgePolicy, Graph, VertexId};
use crate::clustering::Cluster;
use crate::error::Result;
use crate::{Marker, MarkerId};

/// Build a graph with one vertex per cluster (at the cluster mean, vertex
/// id = cluster position) and edges from consecutive trace markers.
pub fn build_graph(
    clusters: &[Cluster],
    markers_by_trace: &[Vec<Marker>],
    policy: EdgePolicy,
) -> Result<Graph> {
    let mut graph = Graph::with_capacity(clusters.len(), 0);
    for cluster in clusters {
        let mean = cluster.mean();
        graph.add_vertex(mean.x, mean.y);
    }

    let added = generate_edges(&mut graph, markers_by_trace, clusters, policy)?;

    info!(
        "[Graph] Built {} vertices and {} edges ({:?})",
        graph.vertex_count(),
        added,
        policy
    );
    Ok(graph)
}

/// Connect clusters that appear consecutively in a trace.
///
/// Cluster `i` must correspond to vertex `i` of `graph`. Whenever two
/// consecutive markers of a trace belong to different clusters, an edge is
/// added from the first cluster's vertex to the second's. A marker that
/// belongs to no cluster breaks the chain. Returns the number of edges added.
pub fn generate_edges(
    graph: &mut Graph,
    markers_by_trace: &[Vec<Marker>],
    clusters: &[Cluster],
    policy: EdgePolicy,
) -> Result<usize> {
    let marker_cluster: HashMap<MarkerId, usize> = clusters
        .iter()
        .enumerate()
        .flat_map(|(idx, cluster)| cluster.members.iter().map(move |m| (m.id, idx)))
        .collect();

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut added = 0;

    for trace_markers in markers_by_trace {
        for pair in trace_markers.windows(2) {
            let (Some(&from), Some(&to)) = (
                marker_cluster.get(&pair[0].id),
                marker_cluster.get(&pair[1].id),
            ) else {
                continue;
            };
            if from == to {
                continue;
            }
            if policy == EdgePolicy::Deduplicate && !seen.insert((from, to)) {
                continue;
            }
            graph.add_edge(VertexId(from), VertexId(to))?;
            added += 1;
        }
    }

    Ok(added)
}
