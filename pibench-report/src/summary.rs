//! Narrative Summary
//!
//! Plain-text overview of a table of (size, ns/digit) observations: overall
//! spread, a breakdown per label and per size, and the fastest configuration.

use crate::load::PerfRecord;
use pibench_stats::{Spread, describe};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Statistics of one group of records
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub spread: Spread,
}

/// Computed overview of a record set
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub overall: Spread,
    /// The record with the lowest ns/digit
    pub best: PerfRecord,
    /// The record with the highest ns/digit
    pub worst: PerfRecord,
    /// Per label, sorted by label. Empty when no record is labelled.
    pub by_label: Vec<GroupSummary>,
    /// Per input size, ascending
    pub by_digits: Vec<(u64, Spread)>,
}

/// Summarize records; `None` when there are none
pub fn summarize(records: &[PerfRecord]) -> Option<PerformanceSummary> {
    let values: Vec<f64> = records.iter().map(|r| r.ns_per_digit).collect();
    let overall = describe(&values)?;

    let by_ns = |a: &&PerfRecord, b: &&PerfRecord| {
        a.ns_per_digit
            .partial_cmp(&b.ns_per_digit)
            .unwrap_or(Ordering::Equal)
    };
    let best = records.iter().min_by(by_ns)?.clone();
    let worst = records.iter().max_by(by_ns)?.clone();

    let mut labels: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut sizes: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for r in records {
        if let Some(label) = &r.label {
            labels.entry(label.as_str()).or_default().push(r.ns_per_digit);
        }
        sizes.entry(r.digits).or_default().push(r.ns_per_digit);
    }

    let by_label = labels
        .into_iter()
        .filter_map(|(key, vals)| {
            describe(&vals).map(|spread| GroupSummary {
                key: key.to_string(),
                spread,
            })
        })
        .collect();
    let by_digits = sizes
        .into_iter()
        .filter_map(|(digits, vals)| describe(&vals).map(|s| (digits, s)))
        .collect();

    Some(PerformanceSummary {
        overall,
        best,
        worst,
        by_label,
        by_digits,
    })
}

fn describe_record(r: &PerfRecord) -> String {
    match &r.label {
        Some(label) => format!("{} at {} digits", label, r.digits),
        None => format!("{} digits", r.digits),
    }
}

/// Render the narrative summary for `source` (usually the input file name)
pub fn generate_summary(records: &[PerfRecord], source: &str, group_name: Option<&str>) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "PERFORMANCE SUMMARY: {}", source);
    let _ = writeln!(out, "{}", rule);

    let Some(summary) = summarize(records) else {
        let _ = writeln!(out, "\nNo records.");
        return out;
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "Records:   {}", summary.overall.count);
    let _ = writeln!(
        out,
        "Best:      {:.3} ns/digit ({})",
        summary.best.ns_per_digit,
        describe_record(&summary.best)
    );
    let _ = writeln!(
        out,
        "Worst:     {:.3} ns/digit ({})",
        summary.worst.ns_per_digit,
        describe_record(&summary.worst)
    );
    let _ = writeln!(out, "Mean:      {:.3} ns/digit", summary.overall.mean);
    let _ = writeln!(out, "Std dev:   {:.3} ns/digit", summary.overall.std_dev);

    if !summary.by_label.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "By {}:", group_name.unwrap_or("label"));
        for group in &summary.by_label {
            let s = &group.spread;
            let _ = writeln!(
                out,
                "  {:<20} mean {:>12.3}  std {:>10.3}  min {:>12.3}  max {:>12.3}  (n={})",
                group.key, s.mean, s.std_dev, s.min, s.max, s.count
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "By size:");
    for (digits, s) in &summary.by_digits {
        let _ = writeln!(
            out,
            "  {} digits: {:.3} ± {:.3} ns/digit (n={})",
            digits, s.mean, s.std_dev, s.count
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendation:");
    if let Some(label) = &summary.best.label {
        let _ = writeln!(out, "  Best {}: {}", group_name.unwrap_or("label"), label);
    }
    let _ = writeln!(out, "  Optimal size: {} digits", summary.best.digits);
    let _ = writeln!(
        out,
        "  Expected performance: {:.3} ns/digit",
        summary.best.ns_per_digit
    );

    out
}
