//! Benchmark Pipelines
//!
//! The three measurement commands: plain sweep, extreme progression with
//! scaling analysis, and subject vs competitor comparison. Each pipeline
//! samples everything first, then aggregates, and only then returns.

use super::execution::{Base, BenchError, BenchmarkRunner, CaptureMode, Invocation, NULL_DEVICE};
use super::statistics::compute_statistics;
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::runner::ProcessRunner;
use pibench_stats::{AggregatedResult, ComparisonResult, ScalingStep, analyze_scaling, compare};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Label of the program under test
pub const SUBJECT_LABEL: &str = "piracer";

/// Fixed sizes of the extreme progression
pub const EXTREME_PROGRESSION: [u64; 3] = [10_000, 100_000, 1_000_000];

/// Plain benchmark over explicit sizes
#[derive(Debug, Clone)]
pub struct BenchPlan {
    pub program: PathBuf,
    pub sizes: Vec<u64>,
    pub reps: usize,
}

/// Extreme benchmark over the fixed progression
#[derive(Debug, Clone)]
pub struct ExtremePlan {
    pub program: PathBuf,
    pub max_digits: u64,
    pub threads: u32,
    pub base: Base,
    pub reps: usize,
}

impl ExtremePlan {
    /// Progression sizes not above `max_digits`
    pub fn sizes(&self) -> Vec<u64> {
        EXTREME_PROGRESSION
            .iter()
            .copied()
            .filter(|&d| d <= self.max_digits)
            .collect()
    }
}

/// Subject vs competitor at explicit sizes
#[derive(Debug, Clone)]
pub struct ComparePlan {
    pub subject: PathBuf,
    pub competitor: PathBuf,
    pub sizes: Vec<u64>,
    pub reps: usize,
}

impl ComparePlan {
    /// Display name of the competitor (its file name)
    pub fn competitor_name(&self) -> String {
        self.competitor
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.competitor.display().to_string())
    }
}

/// Aggregated results of a sweep
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub label: String,
    pub results: Vec<AggregatedResult>,
    /// Verified output size per result (extreme only)
    pub output_digits: Vec<Option<u64>>,
    /// Empty unless the pipeline analyses scaling
    pub scaling: Vec<ScalingStep>,
    pub duration: Duration,
}

/// Aggregated results of a comparison
#[derive(Debug, Clone)]
pub struct CompareRun {
    pub competitor: String,
    pub comparisons: Vec<ComparisonResult>,
    pub duration: Duration,
}

/// Run a plain benchmark: `--digits N --out <null>`.
///
/// Digits go to the null device; stderr is kept for the metric and for the
/// tail of a failed run.
pub fn run_bench<R: ProcessRunner>(
    runner: &R,
    observer: &dyn ProgressObserver,
    plan: &BenchPlan,
) -> Result<SweepRun, BenchError> {
    let start = Instant::now();
    runner.locate(&plan.program)?;
    observer.notify(&ProgressEvent::Started {
        total: (plan.sizes.len() * plan.reps) as u64,
    });

    let measurements = BenchmarkRunner::new(runner, observer).measure(
        SUBJECT_LABEL,
        &Invocation::discard_output(plan.program.clone()),
        &plan.sizes,
        plan.reps,
        CaptureMode::METRIC,
    )?;
    observer.notify(&ProgressEvent::Finished);

    let results = compute_statistics(&measurements)?;
    Ok(SweepRun {
        label: SUBJECT_LABEL.to_string(),
        output_digits: vec![None; results.len()],
        results,
        scaling: Vec::new(),
        duration: start.elapsed(),
    })
}

/// Run the extreme progression with output verification and scaling analysis.
pub fn run_extreme<R: ProcessRunner>(
    runner: &R,
    observer: &dyn ProgressObserver,
    plan: &ExtremePlan,
) -> Result<SweepRun, BenchError> {
    let start = Instant::now();
    let sizes = plan.sizes();
    if sizes.is_empty() {
        return Err(BenchError::NoSizes);
    }
    runner.locate(&plan.program)?;
    observer.notify(&ProgressEvent::Started {
        total: (sizes.len() * plan.reps) as u64,
    });

    let invocation = Invocation::Generator {
        program: plan.program.clone(),
        base: Some(plan.base),
        threads: Some(plan.threads),
        out: None,
    };
    let measurements = BenchmarkRunner::new(runner, observer).measure(
        SUBJECT_LABEL,
        &invocation,
        &sizes,
        plan.reps,
        CaptureMode::VERIFY,
    )?;
    observer.notify(&ProgressEvent::Finished);

    for m in &measurements {
        match m.output_digits {
            Some(n) if n < m.point.digits() => tracing::warn!(
                "{} digits requested, only {} printed",
                m.point.digits(),
                n
            ),
            None => tracing::warn!("no digits printed for {}", m.point.digits()),
            _ => {}
        }
    }

    let results = compute_statistics(&measurements)?;
    let scaling = analyze_scaling(&results)?;
    Ok(SweepRun {
        label: SUBJECT_LABEL.to_string(),
        output_digits: measurements.iter().map(|m| m.output_digits).collect(),
        results,
        scaling,
        duration: start.elapsed(),
    })
}

/// Time subject and competitor at every size, then compare.
///
/// For each size the subject runs `reps` times before the competitor does.
pub fn run_compare<R: ProcessRunner>(
    runner: &R,
    observer: &dyn ProgressObserver,
    plan: &ComparePlan,
) -> Result<CompareRun, BenchError> {
    let start = Instant::now();
    if plan.sizes.is_empty() {
        return Err(BenchError::NoSizes);
    }
    if plan.reps == 0 {
        return Err(BenchError::ZeroRepetitions);
    }
    runner.locate(&plan.subject)?;
    runner.locate(&plan.competitor)?;
    observer.notify(&ProgressEvent::Started {
        total: (plan.sizes.len() * plan.reps * 2) as u64,
    });

    let competitor = plan.competitor_name();
    let subject_inv = Invocation::Generator {
        program: plan.subject.clone(),
        base: Some(Base::Dec),
        threads: Some(1),
        out: Some(NULL_DEVICE.to_string()),
    };
    let competitor_inv = Invocation::Positional {
        program: plan.competitor.clone(),
    };

    let bench = BenchmarkRunner::new(runner, observer);
    let mut subject_runs = Vec::with_capacity(plan.sizes.len());
    let mut competitor_runs = Vec::with_capacity(plan.sizes.len());
    for &digits in &plan.sizes {
        subject_runs.push(bench.measure_size(
            SUBJECT_LABEL,
            &subject_inv,
            digits,
            plan.reps,
            CaptureMode::METRIC,
        )?);
        competitor_runs.push(bench.measure_size(
            &competitor,
            &competitor_inv,
            digits,
            plan.reps,
            CaptureMode::METRIC,
        )?);
    }
    observer.notify(&ProgressEvent::Finished);

    let subject_results = compute_statistics(&subject_runs)?;
    let competitor_results = compute_statistics(&competitor_runs)?;
    let comparisons = subject_results
        .iter()
        .zip(&competitor_results)
        .map(|(s, c)| compare(s, c))
        .collect::<Result<Vec<_>, _>>()?;

    for cmp in &comparisons {
        if let Some(anomaly) = cmp.anomaly() {
            tracing::warn!("{} digits: {}", cmp.digits(), anomaly);
        }
    }

    Ok(CompareRun {
        competitor,
        comparisons,
        duration: start.elapsed(),
    })
}
