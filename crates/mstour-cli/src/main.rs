//! mstour: solve TSPLIB instances with the MST walk and write the results.
//!
//! Reads a TSPLIB instance, builds its minimum spanning tree, walks the
//! tree into a tour, and writes `<name>.mst` and `<name>.tour` next to
//! each other in the output directory. Per-stage diagnostics go to
//! stdout, progress to stderr.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin mstour -- [OPTIONS] <INSTANCE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use mstour_format::TspInstance;
use mstour_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use mstour_pipeline::{PipelineConfig, Solution, WalkState};

/// Approximate Euclidean TSP tours from a minimum spanning tree walk.
///
/// Solves a TSPLIB instance, writes the spanning tree and tour as
/// TSPLIB-style files, and prints per-stage timing diagnostics.
#[derive(Parser)]
#[command(name = "mstour", version)]
struct Cli {
    /// Path to the TSPLIB instance (`NODE_COORD_SECTION` with 2D coordinates).
    instance_path: PathBuf,

    /// Directory for the `.mst` and `.tour` files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also write an SVG rendering to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// When Kruskal's algorithm stops consuming edges.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_TERMINATION)]
    termination: Rule,

    /// Skip the sortedness check before building the spanning tree.
    #[arg(long)]
    no_verify_sorted: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Termination rule selection.
#[derive(Clone, Copy, ValueEnum)]
enum Rule {
    /// Stop after `n - 1` accepted edges.
    EdgeCount,
    /// Stop once a full scan finds every point connected.
    SpanningScan,
}

/// Maps a [`mstour_pipeline::Termination`] to the local CLI [`Rule`] enum.
const fn rule_from_pipeline(t: mstour_pipeline::Termination) -> Rule {
    match t {
        mstour_pipeline::Termination::EdgeCount => Rule::EdgeCount,
        mstour_pipeline::Termination::SpanningScan => Rule::SpanningScan,
    }
}

/// The CLI default rule, derived from [`PipelineConfig::DEFAULT_TERMINATION`]
/// so the two cannot silently diverge.
const CLI_DEFAULT_TERMINATION: Rule = rule_from_pipeline(PipelineConfig::DEFAULT_TERMINATION);

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        termination: match cli.termination {
            Rule::EdgeCount => mstour_pipeline::Termination::EdgeCount,
            Rule::SpanningScan => mstour_pipeline::Termination::SpanningScan,
        },
        verify_sorted: !cli.no_verify_sorted,
    })
}

/// Read and parse the instance file.
fn load_instance(path: &Path) -> Result<TspInstance, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    mstour_format::parse(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

/// Instance name for output files: `NAME` from the header, else the
/// file stem, else `instance`.
///
/// Only a non-empty single path component is accepted, so the output
/// files always land directly inside `--out-dir`.
fn instance_name<'a>(instance: &'a TspInstance, path: &'a Path) -> &'a str {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| is_plain_file_name(s))
        .unwrap_or("instance");
    instance
        .name
        .as_deref()
        .filter(|n| is_plain_file_name(n))
        .unwrap_or(stem)
}

/// Whether `name` names a file directly in a directory: not empty, not
/// `.` or `..`, no separators, not hidden.
fn is_plain_file_name(name: &str) -> bool {
    !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name() == Some(OsStr::new(name))
}

/// Write `<name>.mst` and `<name>.tour` into `out_dir`.
fn write_results(out_dir: &Path, name: &str, solution: &Solution) -> Result<(), String> {
    let outputs = [
        (
            out_dir.join(format!("{name}.mst")),
            mstour_format::to_mst_file(name, &solution.mst),
        ),
        (
            out_dir.join(format!("{name}.tour")),
            mstour_format::to_tour_file(name, &solution.tour, solution.mst.vertex_count()),
        ),
    ];
    for (path, text) in outputs {
        std::fs::write(&path, &text)
            .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        eprintln!("Wrote {} ({} bytes)", path.display(), text.len());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let instance = match load_instance(&cli.instance_path) {
        Ok(instance) => instance,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let name = instance_name(&instance, &cli.instance_path);

    eprintln!(
        "Instance: {} ({name}, {} points)",
        cli.instance_path.display(),
        instance.dimension(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match mstour_pipeline::diagnostics::process_with_diagnostics(
            &instance.points,
            &config,
            &StdClock,
        ) {
            Ok((solution, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write result files on the first run only.
                if run == 0 {
                    eprintln!("MST weight: {:.3}", diagnostics.summary.mst_weight);
                    eprintln!("Tour length: {:.3}", diagnostics.summary.tour_length);
                    if solution.walk_state == WalkState::Stuck {
                        eprintln!(
                            "Warning: walk got stuck after {} of {} points; writing partial tour",
                            solution.tour.len(),
                            instance.dimension(),
                        );
                    }

                    if let Err(msg) = write_results(&cli.out_dir, name, &solution) {
                        eprintln!("{msg}");
                        return ExitCode::FAILURE;
                    }

                    if let Some(ref svg_path) = cli.svg {
                        write_svg(svg_path, name, &instance, &solution, &config);
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error ({:?}): {e}", e.kind());
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Render and write the SVG. Failures are reported but not fatal.
fn write_svg(
    svg_path: &Path,
    name: &str,
    instance: &TspInstance,
    solution: &Solution,
    config: &PipelineConfig,
) {
    let config_json = serde_json::to_string(config).ok();
    let metadata = mstour_format::SvgMetadata {
        title: Some(name),
        description: instance.comments.first().map(String::as_str),
        config_json: config_json.as_deref(),
    };
    let svg = mstour_format::to_svg(&instance.points, &solution.mst, &solution.tour, &metadata);
    match std::fs::write(svg_path, &svg) {
        Ok(()) => {
            eprintln!(
                "SVG written to {} ({} bytes)",
                svg_path.display(),
                svg.len(),
            );
        }
        Err(e) => {
            eprintln!("Error writing SVG to {}: {e}", svg_path.display());
        }
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Build Edges", |d| d.build_edges.duration),
        ("Sort", |d| d.sort.duration),
        ("Spanning Tree", |d| d.spanning_tree.duration),
        ("Walk", |d| d.walk.duration),
    ];

    for (name, extractor) in stage_extractors {
        let total: f64 = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum();
        let stage_mean = total / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
