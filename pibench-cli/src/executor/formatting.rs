//! Output Formatting
//!
//! Human-readable terminal output for every report kind:
//! - Per-size timing tables with spread and outlier counts
//! - Extreme runs with verified output size and scaling analysis
//! - Comparison tables with speedups
//! - Matrix cell results with the failing stage and feature probes

use pibench_report::{CellStatus, Report, ReportKind, format_duration};

/// `1234567` → `1,234,567`
pub fn group_digits(n: u64) -> String {
    let raw = n.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("pibench {} results\n", report.kind));
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    if let Some(subject) = &report.meta.subject {
        output.push_str(&format!("Binary: {}\n", subject));
    }
    if let Some(baseline) = &report.meta.baseline {
        output.push_str(&format!("Competitor: {}\n", baseline));
    }

    match report.kind {
        ReportKind::Bench | ReportKind::Extreme => format_sweep(report, &mut output),
        ReportKind::Compare => format_comparisons(report, &mut output),
        ReportKind::Matrix => format_matrix(report, &mut output),
    }

    output.push_str(&format!(
        "\nTotal time: {}\n",
        format_duration(report.summary.total_duration_ms / 1e3)
    ));
    output
}

fn format_sweep(report: &Report, output: &mut String) {
    let verified = report.results.iter().any(|r| r.output_digits.is_some());

    output.push('\n');
    output.push_str(&format!(
        "{:>12} {:>12} {:>14} {:>5} {:>23} {:>8}",
        "Digits", "Median(s)", "ns/digit", "Reps", "Range(s)", "Outliers"
    ));
    if verified {
        output.push_str(&format!(" {:>12}", "Output"));
    }
    output.push('\n');
    output.push_str(&"-".repeat(if verified { 93 } else { 80 }));
    output.push('\n');

    for r in &report.results {
        output.push_str(&format!(
            "{:>12} {:>12.6} {:>14.3} {:>5} {:>11.6}..{:<10.6} {:>8}",
            group_digits(r.digits),
            r.median_s,
            r.ns_per_digit,
            r.repetitions,
            r.min_s,
            r.max_s,
            r.outliers
        ));
        if verified {
            let shown = r
                .output_digits
                .map(group_digits)
                .unwrap_or_else(|| "?".to_string());
            output.push_str(&format!(" {:>12}", shown));
        }
        output.push('\n');
    }

    if !report.scaling.is_empty() {
        output.push_str("\nScaling Analysis\n");
        output.push_str(&"-".repeat(20));
        output.push('\n');
        for s in &report.scaling {
            output.push_str(&format!(
                "  {} → {} digits:\n",
                group_digits(s.from_digits),
                group_digits(s.to_digits)
            ));
            output.push_str(&format!(
                "    Time scaling: {:.2}x (ideal: {:.1}x)\n",
                s.time_ratio, s.ideal_time_ratio
            ));
            output.push_str(&format!(
                "    Perf scaling: {:.2}x (ideal: {:.1}x)\n",
                s.per_digit_ratio, s.ideal_per_digit_ratio
            ));
        }
    }
}

fn format_comparisons(report: &Report, output: &mut String) {
    let competitor = report
        .comparisons
        .first()
        .map(|c| c.competitor.as_str())
        .unwrap_or("competitor");

    output.push('\n');
    output.push_str(&format!(
        "{:>12} {:>14} {:>14} {:>14} {:>12}\n",
        "Digits",
        "piracer(s)",
        "ns/digit",
        format!("{}(s)", competitor),
        "Speedup"
    ));
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for c in &report.comparisons {
        let reported = c
            .subject
            .reported_ns_per_digit
            .map(|v| format!("{:.3}", v))
            .unwrap_or_else(|| "N/A".to_string());
        let speedup = c
            .speedup
            .map(|v| format!("{:.2}x", v))
            .unwrap_or_else(|| "unresolved".to_string());
        output.push_str(&format!(
            "{:>12} {:>14.6} {:>14} {:>14.6} {:>12}\n",
            group_digits(c.digits),
            c.subject.median_s,
            reported,
            c.baseline.median_s,
            speedup
        ));
        if let Some(anomaly) = &c.anomaly {
            output.push_str(&format!("             ! {}\n", anomaly));
        }
    }

    let speedups: Vec<f64> = report.comparisons.iter().filter_map(|c| c.speedup).collect();
    if !speedups.is_empty() {
        let faster = speedups.iter().filter(|&&s| s > 1.0).count();
        let mean = speedups.iter().sum::<f64>() / speedups.len() as f64;
        output.push_str(&format!(
            "\npiracer faster than {} at {} of {} sizes (mean speedup {:.2}x)\n",
            competitor,
            faster,
            speedups.len(),
            mean
        ));
    }
}

fn format_matrix(report: &Report, output: &mut String) {
    let sys = &report.meta.system;
    output.push_str(&format!(
        "System: {} {} | {} ({} cores) | {:.1} GB\n\n",
        sys.os, sys.arch, sys.cpu, sys.cpu_cores, sys.memory_gb
    ));

    for cell in &report.matrix {
        let icon = match cell.status {
            CellStatus::Passed => "✓",
            CellStatus::Failed => "✗",
            CellStatus::Skipped => "⊘",
        };
        let name = if cell.instrumentation == "none" {
            cell.profile.clone()
        } else {
            format!("{}+{}", cell.profile, cell.instrumentation)
        };
        let elapsed: f64 = cell.stages.iter().map(|s| s.elapsed_s).sum();

        match &cell.failed_stage {
            Some(stage) => output.push_str(&format!("  {} {:<20} failed at {}\n", icon, name, stage)),
            None => output.push_str(&format!(
                "  {} {:<20} {} ({:.1}s)\n",
                icon, name, cell.status, elapsed
            )),
        }

        for stage in cell.stages.iter().filter(|s| !s.success) {
            output.push_str(&format!("      $ {}\n", stage.command));
            if let Some(detail) = &stage.detail {
                for line in detail.lines() {
                    output.push_str(&format!("      | {}\n", line));
                }
            }
        }
    }

    if !report.probes.is_empty() {
        output.push_str("\nFeature probes\n");
        output.push_str(&"-".repeat(20));
        output.push('\n');
        for probe in &report.probes {
            let icon = if probe.success { "✓" } else { "✗" };
            output.push_str(&format!("  {} {}\n", icon, probe.name));
        }
    }

    let s = &report.summary;
    output.push('\n');
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "Cells: {} passed, {} failed, {} skipped (of {})\n",
        s.cells_passed, s.cells_failed, s.cells_skipped, s.cells_total
    ));
    if s.probes_failed > 0 {
        output.push_str(&format!("Feature probes failed: {}\n", s.probes_failed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::metadata::build_report_meta;
    use pibench_report::{
        AggregateRecord, ComparisonRecord, MatrixCellRecord, ReportSummary, ScalingRecord,
        StageRecord,
    };
    use pibench_stats::{BenchmarkPoint, TimingSample, aggregate, compare};

    fn empty(kind: ReportKind) -> Report {
        Report {
            meta: build_report_meta(Some("build/piracer".into()), None),
            kind,
            results: Vec::new(),
            comparisons: Vec::new(),
            scaling: Vec::new(),
            matrix: Vec::new(),
            probes: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(10_000), "10,000");
        assert_eq!(group_digits(1_000_000), "1,000,000");
    }

    #[test]
    fn test_scaling_lines() {
        let mut report = empty(ReportKind::Extreme);
        let point = BenchmarkPoint::new(10_000, vec![TimingSample::new(1.0)]);
        report.results.push(
            AggregateRecord::from(&aggregate(&point).unwrap()).with_output_digits(Some(10_000)),
        );
        report.scaling.push(ScalingRecord {
            from_digits: 10_000,
            to_digits: 100_000,
            size_ratio: 10.0,
            time_ratio: 11.0,
            ideal_time_ratio: 10.0,
            per_digit_ratio: 1.1,
            ideal_per_digit_ratio: 1.0,
        });

        let text = format_human_output(&report);
        assert!(text.contains("10,000 → 100,000 digits:"));
        assert!(text.contains("Time scaling: 11.00x (ideal: 10.0x)"));
        assert!(text.contains("Perf scaling: 1.10x (ideal: 1.0x)"));
        assert!(text.contains("Output"));
    }

    #[test]
    fn test_sweep_header_names_outliers() {
        let mut report = empty(ReportKind::Bench);
        let point = BenchmarkPoint::new(1_000, vec![TimingSample::new(0.5)]);
        report
            .results
            .push(AggregateRecord::from(&aggregate(&point).unwrap()));

        let text = format_human_output(&report);
        let header = text
            .lines()
            .find(|l| l.trim_start().starts_with("Digits"))
            .unwrap();
        assert!(header.ends_with("Outliers"));
        assert!(!header.contains("Output"));
    }

    #[test]
    fn test_unresolved_speedup_text() {
        let mut report = empty(ReportKind::Compare);
        let s = aggregate(&BenchmarkPoint::new(10, vec![TimingSample::new(0.0)])).unwrap();
        let b = aggregate(&BenchmarkPoint::new(10, vec![TimingSample::new(1.0)])).unwrap();
        report
            .comparisons
            .push(ComparisonRecord::new("minipi", &compare(&s, &b).unwrap()));

        let text = format_human_output(&report);
        assert!(text.contains("unresolved"));
        assert!(text.contains("minipi(s)"));
    }

    #[test]
    fn test_matrix_failure_shows_stage_and_detail() {
        let mut report = empty(ReportKind::Matrix);
        report.matrix.push(MatrixCellRecord {
            profile: "Debug".to_string(),
            instrumentation: "asan".to_string(),
            status: CellStatus::Failed,
            failed_stage: Some("build".to_string()),
            stages: vec![StageRecord {
                stage: "build".to_string(),
                success: false,
                exit_code: Some(1),
                elapsed_s: 2.0,
                command: "cmake --build build-test-asan -j".to_string(),
                detail: Some("ld: undefined symbol".to_string()),
            }],
        });
        report.summary.cells_total = 1;
        report.summary.cells_failed = 1;

        let text = format_human_output(&report);
        assert!(text.contains("Debug+asan"));
        assert!(text.contains("failed at build"));
        assert!(text.contains("| ld: undefined symbol"));
        assert!(text.contains("Cells: 0 passed, 1 failed, 0 skipped (of 1)"));
    }
}
