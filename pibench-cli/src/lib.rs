#![warn(missing_docs)]
//! pibench CLI Library
//!
//! Command line front end of the pibench harness. It drives the external
//! `piracer` digit generator (and the `minipi` competitor) as black boxes:
//!
//! - `bench` times a list of digit counts
//! - `extreme` runs the 10k/100k/1M progression and analyses scaling
//! - `compare` measures piracer against minipi and saves a CSV
//! - `matrix` builds and tests the project across profiles and sanitizers
//! - `summarize` prints a narrative overview of a saved CSV/JSON table
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = pibench_cli::run() {
//!         eprintln!("Error: {:?}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;
mod matrix;
mod metric;
mod progress;
mod runner;
#[cfg(test)]
mod testing;

pub use config::*;
pub use executor::{
    Base, BenchError, BenchPlan, BenchmarkRunner, CaptureMode, ComparePlan, CompareRun,
    EXTREME_PROGRESSION, ExtremePlan, Invocation, Measurement, NULL_DEVICE, SUBJECT_LABEL,
    SweepRun, build_compare_report, build_matrix_report, build_report_meta, build_sweep_report,
    collect_system_info, compute_statistics, format_human_output, group_digits, run_bench,
    run_compare, run_extreme,
};
pub use matrix::{
    BuildProfile, CellState, CmakeToolchain, FEATURE_PROBES, Instrumentation, MatrixCell,
    MatrixError, MatrixPlan, MatrixRun, MatrixRunner, ProbeResult, SANITIZER_SMOKE_DIGITS,
    SMOKE_DIGITS, Stage, StageResult, Toolchain,
};
pub use metric::{
    METRIC_MARKER, MetricError, extract_metric, output_digit_count, parse_metric,
    parse_metric_line,
};
pub use progress::{BarObserver, LogObserver, NoopObserver, ProgressEvent, ProgressObserver};
pub use runner::{ProcessRunner, RunOutcome, RunSpec, RunnerError, SystemRunner, resolve_program};

use anyhow::Context;
use clap::{Parser, Subcommand};
use pibench_report::{
    OutputFormat, Report, ReportKind, generate_csv_report, generate_json_report, generate_summary,
    load_records, write_comparisons_csv,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// pibench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "pibench")]
#[command(author, version, about = "pibench - benchmark and validation harness for piracer")]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: human, csv, json (default from pibench.toml, else human)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: discover pibench.toml upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Time piracer at each digit count
    Bench {
        /// Digit counts to measure
        #[arg(required = true, value_parser = clap::value_parser!(u64).range(1..))]
        digits: Vec<u64>,
        /// piracer executable
        #[arg(long)]
        bin: Option<PathBuf>,
        /// Repetitions per digit count
        #[arg(long)]
        reps: Option<usize>,
    },
    /// Run the 10k/100k/1M progression with scaling analysis
    Extreme {
        /// piracer executable
        #[arg(long)]
        bin: Option<PathBuf>,
        /// Largest digit count to run
        #[arg(long)]
        max_digits: Option<u64>,
        /// Threads passed to piracer
        #[arg(long)]
        threads: Option<u32>,
        /// Output base: dec or hex
        #[arg(long)]
        base: Option<String>,
        /// Repetitions per digit count
        #[arg(long, default_value = "1")]
        reps: usize,
    },
    /// Compare piracer against minipi
    Compare {
        /// Digit counts to measure
        #[arg(required = true, value_parser = clap::value_parser!(u64).range(1..))]
        digits: Vec<u64>,
        /// piracer executable
        #[arg(long)]
        piracer: Option<PathBuf>,
        /// minipi executable
        #[arg(long)]
        minipi: Option<PathBuf>,
        /// Repetitions per digit count
        #[arg(long)]
        reps: Option<usize>,
        /// CSV file to write (always written)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Build and test across profiles and sanitizers
    Matrix {
        /// Build directory; sanitizer builds append -asan / -ubsan
        #[arg(long)]
        build_dir: Option<PathBuf>,
        /// Build profiles (Release, Debug, ...)
        #[arg(long, num_args = 1..)]
        configs: Vec<String>,
        /// Sanitizers (asan, ubsan)
        #[arg(long, num_args = 1..)]
        sanitizers: Vec<String>,
        /// Skip sanitizer builds
        #[arg(long)]
        skip_sanitizers: bool,
        /// Stop at the first failed configuration
        #[arg(long)]
        fail_fast: bool,
        /// Project source directory
        #[arg(long)]
        source_dir: Option<PathBuf>,
        /// CMake generator
        #[arg(long)]
        generator: Option<String>,
    },
    /// Summarize a saved CSV or JSON result file
    Summarize {
        /// Result file (.csv or .json)
        #[arg(value_name = "DATA_FILE")]
        data_file: PathBuf,
        /// Column to group by (default: label, algorithm or competitor)
        #[arg(long)]
        group_by: Option<String>,
    },
    /// Print a default pibench.toml
    Config,
}

/// Run the pibench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` only if every requested measurement or matrix cell
/// completed; the error names what failed.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the pibench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    // Explicit --config must load; a discovered file is best effort
    let config = match &cli.config {
        Some(path) => PibenchConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PibenchConfig::discover().unwrap_or_default(),
    };

    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .map_err(anyhow::Error::msg)?;

    let observer = select_observer(cli.verbose, format);
    let runner = SystemRunner::new();

    match &cli.command {
        Commands::Bench { digits, bin, reps } => {
            let plan = BenchPlan {
                program: bin.clone().unwrap_or_else(|| PathBuf::from(&config.paths.piracer)),
                sizes: digits.clone(),
                reps: reps.unwrap_or(config.bench.reps),
            };
            tracing::info!(
                "Benchmarking {} at {} size(s), {} rep(s)",
                plan.program.display(),
                plan.sizes.len(),
                plan.reps
            );
            let run = run_bench(&runner, observer.as_ref(), &plan).context("bench failed")?;
            let meta = build_report_meta(Some(plan.program.display().to_string()), None);
            let report = build_sweep_report(ReportKind::Bench, &run, meta);
            emit(&report, format, cli.output.as_deref())
        }
        Commands::Extreme {
            bin,
            max_digits,
            threads,
            base,
            reps,
        } => {
            let base: Base = base
                .as_deref()
                .unwrap_or(&config.bench.base)
                .parse()?;
            let plan = ExtremePlan {
                program: bin.clone().unwrap_or_else(|| PathBuf::from(&config.paths.piracer)),
                max_digits: max_digits.unwrap_or(config.bench.max_digits),
                threads: threads.unwrap_or(config.bench.threads),
                base,
                reps: *reps,
            };
            tracing::info!(
                "Extreme benchmark: {} threads, base {}, max {} digits",
                plan.threads,
                plan.base,
                group_digits(plan.max_digits)
            );
            let run = run_extreme(&runner, observer.as_ref(), &plan).context("extreme benchmark failed")?;
            let meta = build_report_meta(Some(plan.program.display().to_string()), None);
            let report = build_sweep_report(ReportKind::Extreme, &run, meta);
            emit(&report, format, cli.output.as_deref())
        }
        Commands::Compare {
            digits,
            piracer,
            minipi,
            reps,
            csv,
        } => {
            let plan = ComparePlan {
                subject: piracer
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&config.paths.piracer)),
                competitor: minipi
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&config.paths.minipi)),
                sizes: digits.clone(),
                reps: reps.unwrap_or(config.bench.reps),
            };
            let run = run_compare(&runner, observer.as_ref(), &plan).context("comparison failed")?;
            let meta = build_report_meta(
                Some(plan.subject.display().to_string()),
                Some(plan.competitor.display().to_string()),
            );
            let report = build_compare_report(&run, meta);

            let csv_path = csv
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.comparison_csv));
            let file = std::fs::File::create(&csv_path)
                .with_context(|| format!("Failed to create {}", csv_path.display()))?;
            write_comparisons_csv(file, &report.comparisons)?;
            tracing::info!("Results saved to {}", csv_path.display());

            emit(&report, format, cli.output.as_deref())
        }
        Commands::Matrix {
            build_dir,
            configs,
            sanitizers,
            skip_sanitizers,
            fail_fast,
            source_dir,
            generator,
        } => {
            let configs = if configs.is_empty() {
                &config.matrix.configs
            } else {
                configs
            };
            let sanitizers = if sanitizers.is_empty() {
                &config.matrix.sanitizers
            } else {
                sanitizers
            };
            let plan = MatrixPlan {
                source_dir: source_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&config.paths.source_dir)),
                build_dir: build_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&config.matrix.build_dir)),
                profiles: configs
                    .iter()
                    .map(|c| c.parse())
                    .collect::<Result<Vec<BuildProfile>, _>>()?,
                sanitizers: sanitizers
                    .iter()
                    .map(|s| s.parse())
                    .collect::<Result<Vec<Instrumentation>, _>>()?,
                skip_sanitizers: *skip_sanitizers || config.matrix.skip_sanitizers,
                fail_fast: *fail_fast || config.matrix.fail_fast,
                binary_name: SUBJECT_LABEL.to_string(),
            };
            let toolchain = CmakeToolchain {
                generator: generator
                    .clone()
                    .unwrap_or_else(|| config.matrix.generator.clone()),
            };

            let system = collect_system_info();
            tracing::info!(
                "Matrix on {} {} ({}, {} cores): {} cell(s)",
                system.os,
                system.arch,
                system.cpu,
                system.cpu_cores,
                plan.cells().len()
            );

            let run = MatrixRunner::new(&runner, &toolchain, observer.as_ref()).run(&plan)?;
            let meta = build_report_meta(None, None);
            let report = build_matrix_report(&run, meta);
            emit(&report, format, cli.output.as_deref())?;

            match run.failure() {
                Some(err) => Err(err.into()),
                None => Ok(()),
            }
        }
        Commands::Summarize {
            data_file,
            group_by,
        } => {
            let records = load_records(data_file, group_by.as_deref())
                .with_context(|| format!("Failed to load {}", data_file.display()))?;
            let source = data_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| data_file.display().to_string());
            let text = generate_summary(&records, &source, group_by.as_deref());
            write_output(&text, cli.output.as_deref())
        }
        Commands::Config => write_output(&PibenchConfig::default_toml(), cli.output.as_deref()),
    }
}

/// Initialize the tracing subscriber once; later calls are no-ops.
///
/// Logs go to stderr so CSV/JSON on stdout stay clean. `RUST_LOG` wins
/// over the defaults.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "pibench=debug,pibench_cli=debug"
    } else {
        "pibench=info,pibench_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn select_observer(verbose: bool, format: OutputFormat) -> Box<dyn ProgressObserver> {
    if verbose {
        Box::new(LogObserver)
    } else if format == OutputFormat::Human {
        Box::new(BarObserver::new())
    } else {
        Box::new(NoopObserver)
    }
}

/// Render a report in the requested format
pub fn render_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Human => format_human_output(report),
        OutputFormat::Csv => generate_csv_report(report)?,
        OutputFormat::Json => generate_json_report(report)?,
    })
}

fn emit(report: &Report, format: OutputFormat, output: Option<&Path>) -> anyhow::Result<()> {
    let text = render_report(report, format)?;
    write_output(&text, output)
}

fn write_output(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Report written to: {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bench() {
        let cli = Cli::try_parse_from([
            "pibench", "bench", "1000", "10000", "--reps", "5", "--format", "csv",
        ])
        .unwrap();
        assert_eq!(cli.format.as_deref(), Some("csv"));
        match cli.command {
            Commands::Bench { digits, reps, bin } => {
                assert_eq!(digits, vec![1000, 10000]);
                assert_eq!(reps, Some(5));
                assert_eq!(bin, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bench_requires_positive_digits() {
        assert!(Cli::try_parse_from(["pibench", "bench"]).is_err());
        assert!(Cli::try_parse_from(["pibench", "bench", "0"]).is_err());
    }

    #[test]
    fn test_parse_extreme_defaults() {
        let cli = Cli::try_parse_from(["pibench", "extreme", "--base", "hex"]).unwrap();
        match cli.command {
            Commands::Extreme {
                base,
                reps,
                max_digits,
                ..
            } => {
                assert_eq!(base.as_deref(), Some("hex"));
                assert_eq!(reps, 1);
                assert_eq!(max_digits, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_matrix_lists() {
        let cli = Cli::try_parse_from([
            "pibench",
            "matrix",
            "--configs",
            "Release",
            "Debug",
            "--sanitizers",
            "asan",
            "--fail-fast",
        ])
        .unwrap();
        match cli.command {
            Commands::Matrix {
                configs,
                sanitizers,
                fail_fast,
                skip_sanitizers,
                ..
            } => {
                assert_eq!(configs, vec!["Release", "Debug"]);
                assert_eq!(sanitizers, vec!["asan"]);
                assert!(fail_fast);
                assert!(!skip_sanitizers);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_summarize() {
        let cli = Cli::try_parse_from([
            "pibench",
            "summarize",
            "bench.csv",
            "--group-by",
            "competitor",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Summarize {
                data_file,
                group_by,
            } => {
                assert_eq!(data_file, PathBuf::from("bench.csv"));
                assert_eq!(group_by.as_deref(), Some("competitor"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_summarize_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.csv");
        let cli = Cli::try_parse_from(["pibench", "summarize", missing.to_str().unwrap()]).unwrap();
        let err = run_with_cli(cli).unwrap_err();
        assert!(format!("{:#}", err).contains("input file not found"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let cli = Cli::try_parse_from(["pibench", "config", "--format", "html"]).unwrap();
        assert!(run_with_cli(cli).is_err());
    }

    #[test]
    fn test_bench_missing_binary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("piracer");
        let out = dir.path().join("out.csv");
        let cli = Cli::try_parse_from([
            "pibench",
            "bench",
            "100",
            "--bin",
            bin.to_str().unwrap(),
            "--format",
            "csv",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let err = run_with_cli(cli).unwrap_err();
        assert!(format!("{:#}", err).contains("Executable not found"));
        assert!(!out.exists());
    }
}
