//! tracegraph CLI - road graph inference and evaluation
//!
//! Usage:
//!   tracegraph-cli infer <traces_dir> [--output <file>] [--config <json>] [--seed <n>]
//!   tracegraph-cli eval-markers <actual.graph> <inferred.graph>
//!   tracegraph-cli eval-paths <actual.graph> <inferred.graph> [--trials <n>] [--seed <n>]

use clap::{Parser, Subcommand};
use log::error;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracegraph::{
    EvaluationConfig, Graph, InferenceConfig, Result, evaluate_marker_matching,
    evaluate_shortest_paths, infer_graph, read_traces,
};

#[derive(Parser)]
#[command(name = "tracegraph-cli")]
#[command(about = "Infer road graphs from GPS traces and score them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer a road graph from a directory of traces
    Infer {
        /// Folder containing one `<x> <y>` trace file per trip
        traces: PathBuf,

        /// Output graph file
        #[arg(short, long, default_value = "kmeans-inferred.graph")]
        output: PathBuf,

        /// JSON file with inference parameters
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for cluster seeding (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score an inferred graph by coverage-marker precision/recall
    EvalMarkers {
        /// Ground-truth graph file
        actual: PathBuf,

        /// Inferred graph file
        inferred: PathBuf,

        /// Distance between coverage markers
        #[arg(long, default_value = "30")]
        marker_frequency: f64,

        /// Maximum distance for two markers to match
        #[arg(long, default_value = "60")]
        match_distance: f64,
    },

    /// Score an inferred graph by shortest-path agreement
    EvalPaths {
        /// Ground-truth graph file
        actual: PathBuf,

        /// Inferred graph file
        inferred: PathBuf,

        /// Number of random vertex pairs
        #[arg(long, default_value = "100")]
        trials: usize,

        /// Maximum path length difference to count as agreement
        #[arg(long, default_value = "5")]
        tolerance: f64,

        /// Seed for vertex pair sampling
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let result = match cli.command {
        Commands::Infer {
            traces,
            output,
            config,
            seed,
        } => run_infer(&traces, &output, config.as_deref(), seed),
        Commands::EvalMarkers {
            actual,
            inferred,
            marker_frequency,
            match_distance,
        } => run_eval_markers(
            &actual,
            &inferred,
            &EvaluationConfig {
                marker_frequency,
                match_distance,
                ..EvaluationConfig::default()
            },
        ),
        Commands::EvalPaths {
            actual,
            inferred,
            trials,
            tolerance,
            seed,
        } => run_eval_paths(
            &actual,
            &inferred,
            &EvaluationConfig {
                path_trials: trials,
                path_tolerance: tolerance,
                seed,
                ..EvaluationConfig::default()
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Run graph inference and write the result
fn run_infer(
    traces_dir: &Path,
    output: &Path,
    config_path: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    // Configuration problems surface before any traces are read
    let mut config = match config_path {
        Some(path) => InferenceConfig::from_json_file(path)?,
        None => InferenceConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate()?;

    let traces = read_traces(traces_dir)?;
    let result = infer_graph(&traces, &config)?;

    if !result.converged {
        println!(
            "Refinement stopped after {} rounds without converging",
            result.iterations
        );
    }
    if result.stranded_markers > 0 {
        println!(
            "{} markers were not within range of any cluster",
            result.stranded_markers
        );
    }

    result.graph.write_to_path(output)?;
    println!(
        "Wrote {} vertices and {} edges to {}",
        result.graph.vertex_count(),
        result.graph.edge_count(),
        output.display()
    );
    Ok(())
}

/// Run coverage-marker evaluation
fn run_eval_markers(actual: &Path, inferred: &Path, config: &EvaluationConfig) -> Result<()> {
    config.validate()?;
    let actual = Graph::read_from_path(actual)?;
    let inferred = Graph::read_from_path(inferred)?;
    let report = evaluate_marker_matching(&actual, &inferred, config)?;
    println!("{report}");
    Ok(())
}

/// Run shortest-path agreement evaluation
fn run_eval_paths(actual: &Path, inferred: &Path, config: &EvaluationConfig) -> Result<()> {
    config.validate()?;
    let actual = Graph::read_from_path(actual)?;
    let inferred = Graph::read_from_path(inferred)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let report = evaluate_shortest_paths(&actual, &inferred, config, &mut rng)?;
    println!("{report}");
    Ok(())
}
