//! surfscan CLI — run surface detection presets against a point cloud.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use surfscan::{
    describe_trial, format_outcome, Detector, DetectorConfig, PointCloud, PresetPlan,
    PresetRunner, RunReport, ScriptedDetector,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "surfscan")]
#[command(about = "Search point clouds for planes, spheres, cylinders, cones and tori around seed points")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a preset plan and print one label per preset.
    Run(CliRunArgs),

    /// Print the demo preset plan (JSON).
    Presets,

    /// Print the default detector configuration (JSON).
    Config,

    /// Print the label of every scripted response.
    Describe {
        /// Path to the scripted responses file.
        #[arg(long)]
        responses: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliRunArgs {
    /// Path to the point cloud (.xyz, .txt, .csv or .json).
    #[arg(long)]
    points: PathBuf,

    /// Path to the scripted responses file (surfscan.responses.v1).
    #[arg(long)]
    responses: PathBuf,

    /// Path to a preset plan (surfscan.presets.v1). `surfscan presets` prints
    /// the demo plan as a starting point.
    #[arg(long)]
    presets: PathBuf,

    /// Path to a detector config (JSON). Missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the run report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print trial-numbered result blocks instead of one-line labels.
    #[arg(long)]
    detailed: bool,

    /// Override the simulated per-call latency in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_presets(&args),
        Commands::Presets => run_print_presets(),
        Commands::Config => run_print_config(),
        Commands::Describe { responses } => run_describe(&responses),
    }
}

// ── presets ───────────────────────────────────────────────────────────

fn run_print_presets() -> CliResult<()> {
    println!("{}", PresetPlan::demo().to_json_pretty()?);
    Ok(())
}

// ── config ────────────────────────────────────────────────────────────

fn run_print_config() -> CliResult<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&DetectorConfig::default())?
    );
    Ok(())
}

// ── describe ──────────────────────────────────────────────────────────

fn run_describe(path: &std::path::Path) -> CliResult<()> {
    let script = ScriptedDetector::from_json_file(path)
        .map_err(|e| -> CliError { format!("Failed to load {}: {}", path.display(), e).into() })?;

    println!("{} scripted responses", script.len());
    for (feature, seed_index, response) in script.entries() {
        let label = format_outcome(&response.outcome, 0.0);
        println!("  {feature}@{seed_index}: {label}");
        if let Some(smart) = &response.smart {
            let label = format_outcome(&Ok(smart.clone()), 0.0);
            println!("  {feature}@{seed_index} (smart): {label}");
        }
    }
    Ok(())
}

// ── run ───────────────────────────────────────────────────────────────

fn run_presets(args: &CliRunArgs) -> CliResult<()> {
    tracing::info!("Loading point cloud: {}", args.points.display());
    let cloud = PointCloud::from_file(&args.points).map_err(|e| -> CliError {
        format!("Failed to load point cloud {}: {}", args.points.display(), e).into()
    })?;
    tracing::info!("Point cloud: {} points", cloud.len());

    let mut script = ScriptedDetector::from_json_file(&args.responses).map_err(|e| -> CliError {
        format!("Failed to load responses {}: {}", args.responses.display(), e).into()
    })?;
    if let Some(ms) = args.latency_ms {
        script = script.with_latency(Duration::from_millis(ms));
    }

    let plan = PresetPlan::from_json_file(&args.presets).map_err(|e| -> CliError {
        format!("Failed to load presets {}: {}", args.presets.display(), e).into()
    })?;
    if let Some(max_seed) = plan.max_seed_index() {
        if max_seed >= cloud.len() {
            tracing::warn!(
                "plan references seed {} but the cloud has {} points",
                max_seed,
                cloud.len()
            );
        }
    }

    let config = match &args.config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };

    let detector = Detector::with_config(script, config);
    let runner = PresetRunner::new(&detector);
    let report = runner.run_plan(&cloud, &plan)?;

    if args.detailed {
        print_detailed(&report);
    } else {
        print_labels(&report);
    }

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(out, &json)?;
        tracing::info!("Report written to {}", out.display());
    }

    Ok(())
}

fn print_labels(report: &RunReport) {
    for batch in &report.batches {
        println!("{}:", batch.kind.title());
        for record in &batch.records {
            println!("  {}", record.label);
        }
        println!(
            "  ({} found, {} errors)",
            batch.found_count(),
            batch.error_count()
        );
    }
}

fn print_detailed(report: &RunReport) {
    for batch in &report.batches {
        println!("{}:", batch.kind.title());
        for record in &batch.records {
            println!("{}\n", describe_trial(record));
        }
    }
}
