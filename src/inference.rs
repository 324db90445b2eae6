//! End-to-end road graph inference from traces.

use std::time::Instant;

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{Result, TraceGraphError};
use crate::{
    Cluster, Graph, InferenceConfig, Marker, Trace, build_graph, flatten_markers,
    initialize_clusters, kmeans, markers_by_trace,
};

/// Everything produced by one inference run.
#[derive(Debug, Clone)]
pub struct InferenceResult {
    pub graph: Graph,
    /// Final clusters; cluster `i` is vertex `i` of the graph
    pub clusters: Vec<Cluster>,
    /// Markers per input trace, with global ids
    pub markers_by_trace: Vec<Vec<Marker>>,
    /// Clusters produced by seeding, before refinement
    pub initial_cluster_count: usize,
    pub iterations: usize,
    pub converged: bool,
    /// Markers with no cluster in range after the last refinement round
    pub stranded_markers: usize,
}

/// Infer a road graph from traces.
///
/// Validates the configuration and observations, resamples every trace
/// into markers, seeds clusters with a generator seeded from `config.seed`,
/// refines them and links clusters that follow each other along a trace.
pub fn infer_graph(traces: &[Trace], config: &InferenceConfig) -> Result<InferenceResult> {
    config.validate()?;
    if traces.is_empty() {
        return Err(TraceGraphError::NoTraces {
            source_name: "input".to_string(),
        });
    }
    for trace in traces {
        if let Some(index) = trace.observations.iter().position(|o| !o.is_valid()) {
            return Err(TraceGraphError::NonFiniteObservation {
                trace_id: trace.id.clone(),
                index,
            });
        }
    }

    let start = Instant::now();
    info!(
        "[Inference] Processing {} traces (marker interval {})",
        traces.len(),
        config.marker_interval
    );

    let per_trace = markers_by_trace(traces, config.marker_interval);
    let markers = flatten_markers(&per_trace);
    info!("[Inference] Generated {} markers", markers.len());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let initial = initialize_clusters(
        &markers,
        config.distance_threshold,
        config.bearing_threshold,
        &mut rng,
    );
    let initial_cluster_count = initial.len();

    let outcome = kmeans(
        &markers,
        initial,
        config.refine_distance_threshold(),
        config.movement_threshold,
        config.max_iterations,
    );

    let graph = build_graph(&outcome.clusters, &per_trace, config.edge_policy)?;

    info!(
        "[Inference] Done in {:.2?}: {} vertices, {} edges",
        start.elapsed(),
        graph.vertex_count(),
        graph.edge_count()
    );

    Ok(InferenceResult {
        graph,
        clusters: outcome.clusters,
        markers_by_trace: per_trace,
        initial_cluster_count,
        iterations: outcome.iterations,
        converged: outcome.converged,
        stranded_markers: outcome.stranded,
    })
}
