//! Report Data Structures

use chrono::{DateTime, Utc};
use pibench_stats::{AggregatedResult, ComparisonResult, ScalingStep};
use serde::{Deserialize, Serialize};

/// Complete output of one harness invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub kind: ReportKind,
    pub results: Vec<AggregateRecord>,
    pub comparisons: Vec<ComparisonRecord>,
    pub scaling: Vec<ScalingRecord>,
    pub matrix: Vec<MatrixCellRecord>,
    pub probes: Vec<ProbeRecord>,
    pub summary: ReportSummary,
}

/// Which harness command produced the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Bench,
    Extreme,
    Compare,
    Matrix,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Bench => write!(f, "bench"),
            ReportKind::Extreme => write!(f, "extreme"),
            ReportKind::Compare => write!(f, "compare"),
            ReportKind::Matrix => write!(f, "matrix"),
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub system: SystemInfo,
    /// Path of the measured program
    pub subject: Option<String>,
    /// Path of the competitor, for comparisons
    pub baseline: Option<String>,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
    pub memory_gb: f64,
}

/// One aggregated input size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Categorical label (algorithm, competitor) for grouped summaries
    pub label: Option<String>,
    pub digits: u64,
    pub repetitions: usize,
    pub median_s: f64,
    pub ns_per_digit: f64,
    /// Median of the program's own `Performance:` figure
    pub reported_ns_per_digit: Option<f64>,
    pub mean_s: f64,
    pub std_dev_s: f64,
    pub min_s: f64,
    pub max_s: f64,
    pub outliers: usize,
    pub samples_s: Vec<f64>,
    /// Digits actually printed by the program, when verified
    pub output_digits: Option<u64>,
}

impl From<&AggregatedResult> for AggregateRecord {
    fn from(result: &AggregatedResult) -> Self {
        let spread = result.spread();
        Self {
            label: None,
            digits: result.digits(),
            repetitions: result.repetitions(),
            median_s: result.median_s(),
            ns_per_digit: result.ns_per_digit(),
            reported_ns_per_digit: result.median_metric(),
            mean_s: spread.mean,
            std_dev_s: spread.std_dev,
            min_s: spread.min,
            max_s: spread.max,
            outliers: spread.outliers.total(),
            samples_s: result.samples_s().to_vec(),
            output_digits: None,
        }
    }
}

impl AggregateRecord {
    /// Attach a categorical label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach the verified output digit count
    pub fn with_output_digits(mut self, output_digits: Option<u64>) -> Self {
        self.output_digits = output_digits;
        self
    }
}

/// Subject vs competitor at one input size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// Competitor name
    pub competitor: String,
    pub digits: u64,
    pub subject: AggregateRecord,
    pub baseline: AggregateRecord,
    /// `None` when the subject timing was below the resolution floor
    pub speedup: Option<f64>,
    pub anomaly: Option<String>,
}

impl ComparisonRecord {
    /// Build a record from a comparison against the named competitor
    pub fn new(competitor: impl Into<String>, comparison: &ComparisonResult) -> Self {
        Self {
            competitor: competitor.into(),
            digits: comparison.digits(),
            subject: AggregateRecord::from(comparison.subject()),
            baseline: AggregateRecord::from(comparison.baseline()),
            speedup: comparison.speedup(),
            anomaly: comparison.anomaly().map(|a| a.to_string()),
        }
    }
}

/// Growth between consecutive input sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingRecord {
    pub from_digits: u64,
    pub to_digits: u64,
    pub size_ratio: f64,
    pub time_ratio: f64,
    pub ideal_time_ratio: f64,
    pub per_digit_ratio: f64,
    pub ideal_per_digit_ratio: f64,
}

impl From<&ScalingStep> for ScalingRecord {
    fn from(step: &ScalingStep) -> Self {
        Self {
            from_digits: step.from_digits,
            to_digits: step.to_digits,
            size_ratio: step.size_ratio,
            time_ratio: step.time_ratio,
            ideal_time_ratio: step.ideal_time_ratio(),
            per_digit_ratio: step.per_digit_ratio,
            ideal_per_digit_ratio: step.ideal_per_digit_ratio(),
        }
    }
}

/// Final state of one build/test matrix cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    Passed,
    Failed,
    Skipped,
}

impl std::fmt::Display for CellStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellStatus::Passed => write!(f, "passed"),
            CellStatus::Failed => write!(f, "failed"),
            CellStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// One (profile, instrumentation) cell of the build/test matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCellRecord {
    pub profile: String,
    pub instrumentation: String,
    pub status: CellStatus,
    /// Stage that failed, if any
    pub failed_stage: Option<String>,
    pub stages: Vec<StageRecord>,
}

/// Outcome of one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub elapsed_s: f64,
    /// Command line or action description
    pub command: String,
    /// Tail of captured stderr (or an error message) on failure
    pub detail: Option<String>,
}

/// Post-matrix feature probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub name: String,
    pub success: bool,
    pub detail: Option<String>,
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub measurements: usize,
    pub comparisons: usize,
    pub cells_total: usize,
    pub cells_passed: usize,
    pub cells_failed: usize,
    pub cells_skipped: usize,
    pub probes_failed: usize,
    pub total_duration_ms: f64,
}

impl ReportSummary {
    /// Whether every requested matrix cell passed
    pub fn all_cells_passed(&self) -> bool {
        self.cells_passed == self.cells_total
    }
}
