//! Report Building
//!
//! Converts pipeline results into the serializable [`Report`].
//!
//! ```text
//!   SweepRun / CompareRun / MatrixRun
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │   Record mapping    │  AggregateRecord, ComparisonRecord, ...
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │      Report         │  Ready for human/CSV/JSON output
//!   └─────────────────────┘
//! ```

use super::pipeline::{CompareRun, SweepRun};
use crate::matrix::{CellState, MatrixCell, MatrixRun};
use pibench_report::{
    AggregateRecord, CellStatus, ComparisonRecord, MatrixCellRecord, ProbeRecord, Report,
    ReportKind, ReportMeta, ReportSummary, ScalingRecord, StageRecord,
};

fn empty_report(kind: ReportKind, meta: ReportMeta) -> Report {
    Report {
        meta,
        kind,
        results: Vec::new(),
        comparisons: Vec::new(),
        scaling: Vec::new(),
        matrix: Vec::new(),
        probes: Vec::new(),
        summary: ReportSummary::default(),
    }
}

/// Report for a plain or extreme sweep
pub fn build_sweep_report(kind: ReportKind, run: &SweepRun, meta: ReportMeta) -> Report {
    let mut report = empty_report(kind, meta);

    report.results = run
        .results
        .iter()
        .zip(run.output_digits.iter().copied().chain(std::iter::repeat(None)))
        .map(|(r, out)| {
            AggregateRecord::from(r)
                .with_label(run.label.clone())
                .with_output_digits(out)
        })
        .collect();
    report.scaling = run.scaling.iter().map(ScalingRecord::from).collect();

    report.summary.measurements = report.results.len();
    report.summary.total_duration_ms = run.duration.as_secs_f64() * 1e3;
    report
}

/// Report for a subject vs competitor comparison
pub fn build_compare_report(run: &CompareRun, meta: ReportMeta) -> Report {
    let mut report = empty_report(ReportKind::Compare, meta);

    report.comparisons = run
        .comparisons
        .iter()
        .map(|c| ComparisonRecord::new(run.competitor.clone(), c))
        .collect();

    report.summary.measurements = report.comparisons.len() * 2;
    report.summary.comparisons = report.comparisons.len();
    report.summary.total_duration_ms = run.duration.as_secs_f64() * 1e3;
    report
}

/// Reported status of a cell state. A cell still running was interrupted
/// and counts as failed at its current stage.
fn cell_status(state: CellState) -> (CellStatus, Option<String>) {
    match state {
        CellState::Passed => (CellStatus::Passed, None),
        CellState::Failed { stage } | CellState::Running { stage } => {
            (CellStatus::Failed, Some(stage.to_string()))
        }
        CellState::Skipped => (CellStatus::Skipped, None),
    }
}

fn cell_record(cell: &MatrixCell) -> MatrixCellRecord {
    let (status, failed_stage) = cell_status(cell.state());

    MatrixCellRecord {
        profile: cell.profile().to_string(),
        instrumentation: cell.instrumentation().to_string(),
        status,
        failed_stage,
        stages: cell
            .stages()
            .iter()
            .map(|s| StageRecord {
                stage: s.stage.to_string(),
                success: s.success,
                exit_code: s.exit_code,
                elapsed_s: s.elapsed.as_secs_f64(),
                command: s.command.clone(),
                detail: s.detail.clone(),
            })
            .collect(),
    }
}

/// Report for a build/test matrix
pub fn build_matrix_report(run: &MatrixRun, meta: ReportMeta) -> Report {
    let mut report = empty_report(ReportKind::Matrix, meta);

    report.matrix = run.cells.iter().map(cell_record).collect();
    report.probes = run
        .probes
        .iter()
        .map(|p| ProbeRecord {
            name: p.name.to_string(),
            success: p.success,
            detail: p.detail.clone(),
        })
        .collect();

    let count = |status: CellStatus| report.matrix.iter().filter(|c| c.status == status).count();
    report.summary.cells_total = report.matrix.len();
    report.summary.cells_passed = count(CellStatus::Passed);
    report.summary.cells_failed = count(CellStatus::Failed);
    report.summary.cells_skipped = count(CellStatus::Skipped);
    report.summary.probes_failed = report.probes.iter().filter(|p| !p.success).count();
    report.summary.total_duration_ms = run.duration.as_secs_f64() * 1e3;
    report
}
