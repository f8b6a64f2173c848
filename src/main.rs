use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use fastwarp_dtw::{Dtw, FastDtw, Metric, Series};
use fastwarp_io::{
    AlignmentMethod, AlignmentReport, ComparisonReport, ExperimentName, FixtureReader,
    PointCsvReader, ResultWriter,
};

#[derive(Parser)]
#[command(name = "fastwarp")]
#[command(about = "Exact and multi-resolution (FastDTW) alignment of multivariate series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

/// Optional JSON artifact on disk, in addition to stdout.
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Experiment name for the result file (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: Option<String>,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Exact DTW over the full grid or a Sakoe-Chiba band
    Exact {
        /// Path to a JSON fixture {"x": [[..]], "y": [[..]]}
        #[arg(long)]
        data: PathBuf,

        /// Point metric: euclidean, squared-euclidean, manhattan or chebyshev
        #[arg(long, default_value = "euclidean")]
        metric: Metric,

        /// Sakoe-Chiba band radius (unconstrained if not set)
        #[arg(long)]
        band: Option<usize>,

        /// Include the warp path in the output
        #[arg(long, default_value_t = false)]
        path: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Approximate DTW with FastDTW
    Fast {
        /// Path to a JSON fixture {"x": [[..]], "y": [[..]]}
        #[arg(long)]
        data: PathBuf,

        /// Search window radius around each projected coarse path
        #[arg(long, allow_negative_numbers = true)]
        radius: i64,

        /// Point metric: euclidean, squared-euclidean, manhattan or chebyshev
        #[arg(long, default_value = "euclidean")]
        metric: Metric,

        /// Series length at or below which exact DTW runs (defaults to radius + 2)
        #[arg(long)]
        min_size: Option<usize>,

        /// Include the warp path in the output
        #[arg(long, default_value_t = false)]
        path: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Align a CSV track against its own prefix with both exact DTW and FastDTW
    Compare {
        /// Path to a headered CSV with one point per row
        #[arg(long)]
        csv: PathBuf,

        /// Comma-separated coordinate columns (all columns if not set)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Length of the prefix aligned against the full track (whole track if not set)
        #[arg(long)]
        take: Option<usize>,

        /// FastDTW search window radius
        #[arg(long, allow_negative_numbers = true)]
        radius: i64,

        /// Point metric: euclidean, squared-euclidean, manhattan or chebyshev
        #[arg(long, default_value = "euclidean")]
        metric: Metric,

        #[command(flatten)]
        output: OutputArgs,
    },
}

fn writer_for(output: &OutputArgs) -> Result<Option<ResultWriter>> {
    let Some(name) = &output.experiment else {
        return Ok(None);
    };
    let experiment = ExperimentName::new(name.clone()).context("invalid experiment name")?;
    let writer = ResultWriter::new(&output.output_dir, experiment)
        .context("failed to prepare output directory")?;
    Ok(Some(writer))
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

fn run_exact(
    x: &Series,
    y: &Series,
    metric: Metric,
    band: Option<usize>,
    with_path: bool,
) -> Result<AlignmentReport> {
    let dtw = match band {
        None => Dtw::unconstrained(),
        Some(r) => Dtw::with_sakoe_chiba(r),
    };

    let start = Instant::now();
    let (cost, path) = if with_path {
        let (cost, path) = dtw
            .distance_and_path(x.as_view(), y.as_view(), &metric)
            .context("exact DTW failed")?;
        (cost, Some(path.to_pairs()))
    } else {
        let cost = dtw
            .distance(x.as_view(), y.as_view(), &metric)
            .context("exact DTW failed")?;
        (cost, None)
    };
    let elapsed_ms = elapsed_ms(start);
    info!(cost = cost.value(), elapsed_ms, "exact DTW complete");

    Ok(AlignmentReport {
        method: AlignmentMethod::Exact,
        metric: metric.to_string(),
        radius: band,
        cost: cost.value(),
        n: x.len(),
        m: y.len(),
        path,
        elapsed_ms,
    })
}

fn run_fast(
    x: &Series,
    y: &Series,
    metric: Metric,
    fast: &FastDtw,
    with_path: bool,
) -> Result<AlignmentReport> {
    let start = Instant::now();
    let (cost, path) = if with_path {
        let (cost, path) = fast
            .distance_and_path(x.as_view(), y.as_view(), &metric)
            .context("FastDTW failed")?;
        (cost, Some(path.to_pairs()))
    } else {
        let cost = fast
            .distance(x.as_view(), y.as_view(), &metric)
            .context("FastDTW failed")?;
        (cost, None)
    };
    let elapsed_ms = elapsed_ms(start);
    info!(cost = cost.value(), radius = fast.radius(), elapsed_ms, "FastDTW complete");

    Ok(AlignmentReport {
        method: AlignmentMethod::Fast,
        metric: metric.to_string(),
        radius: Some(fast.radius()),
        cost: cost.value(),
        n: x.len(),
        m: y.len(),
        path,
        elapsed_ms,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Exact {
            data,
            metric,
            band,
            path,
            output,
        } => {
            let pair = FixtureReader::new(&data)
                .read()
                .with_context(|| format!("failed to read fixture {}", data.display()))?;
            let report = run_exact(&pair.x, &pair.y, metric, band, path)?;

            if let Some(writer) = writer_for(&output)? {
                writer
                    .write_alignment(&report)
                    .context("failed to write alignment result")?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Fast {
            data,
            radius,
            metric,
            min_size,
            path,
            output,
        } => {
            let mut fast = FastDtw::from_signed(radius).context("invalid radius")?;
            if let Some(min_size) = min_size {
                fast = fast.with_min_size(min_size);
            }
            let pair = FixtureReader::new(&data)
                .read()
                .with_context(|| format!("failed to read fixture {}", data.display()))?;
            let report = run_fast(&pair.x, &pair.y, metric, &fast, path)?;

            if let Some(writer) = writer_for(&output)? {
                writer
                    .write_alignment(&report)
                    .context("failed to write alignment result")?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Compare {
            csv,
            columns,
            take,
            radius,
            metric,
            output,
        } => {
            let fast = FastDtw::from_signed(radius).context("invalid radius")?;

            let mut reader = PointCsvReader::new(&csv);
            if let Some(columns) = columns {
                reader = reader.with_columns(columns);
            }
            let track = reader
                .read()
                .with_context(|| format!("failed to read CSV {}", csv.display()))?;
            let prefix = match take {
                Some(n) => track
                    .as_view()
                    .head(n)
                    .context("invalid prefix length")?
                    .to_series(),
                None => track.clone(),
            };
            info!(n = track.len(), m = prefix.len(), dims = track.dims(), "comparing");

            let exact = run_exact(&track, &prefix, metric, None, false)?;
            let approx = run_fast(&track, &prefix, metric, &fast, false)?;
            let report = ComparisonReport::new(exact, approx);
            info!(
                relative_error = ?report.relative_error,
                speedup = ?report.speedup,
                "comparison complete"
            );

            if let Some(writer) = writer_for(&output)? {
                writer
                    .write_comparison(&report)
                    .context("failed to write comparison result")?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
