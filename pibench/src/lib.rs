#![warn(missing_docs)]
//! # pibench
//!
//! Benchmark and validation harness for the `piracer` digit generator.
//!
//! pibench treats the generator as a black box: it spawns it, times it from
//! spawn to exit, and reads back at most a self-reported `Performance:` line
//! and the digits it printed. On top of that it provides:
//! - **Benchmarks**: median timings and ns/digit over repeated runs
//! - **Extreme runs**: the 10k/100k/1M progression with scaling ratios
//! - **Comparisons**: speedup of piracer over the `minipi` competitor
//! - **Build matrix**: configure, build, test and smoke-test across build
//!   profiles and sanitizers
//! - **Reports**: human, CSV and JSON output plus narrative summaries of
//!   saved tables
//!
//! ## Library use
//!
//! ```ignore
//! use pibench::{BenchPlan, NoopObserver, SystemRunner, run_bench};
//!
//! let plan = BenchPlan {
//!     program: "./piracer".into(),
//!     sizes: vec![1_000, 10_000],
//!     reps: 3,
//! };
//! let run = run_bench(&SystemRunner::new(), &NoopObserver, &plan)?;
//! for result in &run.results {
//!     println!("{} digits: {:.3} ns/digit", result.digits(), result.ns_per_digit());
//! }
//! ```

// Re-export process running, pipelines and the build matrix
pub use pibench_cli::{
    Base, BenchError, BenchPlan, BenchmarkRunner, BuildProfile, CaptureMode, CellState,
    CmakeToolchain, ComparePlan, CompareRun, ExtremePlan, Instrumentation, Invocation,
    LogObserver, MatrixCell, MatrixError, MatrixPlan, MatrixRun, MatrixRunner, NoopObserver,
    PibenchConfig, ProcessRunner, ProgressEvent, ProgressObserver, RunOutcome, RunSpec,
    RunnerError, Stage, SweepRun, SystemRunner, Toolchain, build_compare_report,
    build_matrix_report, build_report_meta, build_sweep_report, extract_metric,
    format_human_output, output_digit_count, parse_metric, run_bench, run_compare, run_extreme,
};

// Re-export report types
pub use pibench_report::{
    OutputFormat, PerfRecord, Report, ReportError, ReportKind, generate_csv_report,
    generate_json_report, generate_summary, load_records,
};

// Re-export stats
pub use pibench_stats::{
    AggregatedResult, BenchmarkPoint, ComparisonResult, ScalingStep, StatsError, TimingSample,
    aggregate, analyze_scaling, compare,
};

/// Run the pibench CLI with the process arguments.
pub use pibench_cli::run;
