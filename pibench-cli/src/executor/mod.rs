//! Benchmark Executor
//!
//! Times the external programs and turns the samples into reports.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Bench/Extreme/Compare plan
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Spawn, wait, time; one process at a time
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ statistics  │  Median aggregation (parallel, after sampling)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  pipeline   │  Scaling analysis, comparisons
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report with metadata
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Repeated timed invocations of one program
//! - [`statistics`] - Parallel aggregation of collected samples
//! - [`pipeline`] - The bench, extreme and compare commands
//! - [`report`] - Report building
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
pub(crate) mod metadata;
mod pipeline;
mod report;
mod statistics;

// Re-export public API
pub use execution::{
    Base, BenchError, BenchmarkRunner, CaptureMode, Invocation, Measurement, NULL_DEVICE,
};
pub use formatting::{format_human_output, group_digits};
pub use metadata::{build_report_meta, collect_system_info};
pub use pipeline::{
    BenchPlan, ComparePlan, CompareRun, EXTREME_PROGRESSION, ExtremePlan, SUBJECT_LABEL, SweepRun,
    run_bench, run_compare, run_extreme,
};
pub use report::{build_compare_report, build_matrix_report, build_sweep_report};
pub use statistics::compute_statistics;
