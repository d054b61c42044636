//! Host and Revision Metadata
//!
//! Stamped into every report so saved timings can be traced back to the
//! machine and checkout that produced them: git commit and branch, OS and
//! architecture, CPU model, core count and total memory.
//!
//! CPU model and memory come from `/proc`; elsewhere they read as
//! "Unknown" and 0.

use chrono::Utc;
use pibench_report::{ReportMeta, SystemInfo};

const KIB_PER_GIB: f64 = 1024.0 * 1024.0;

/// Build report metadata for a run of `subject` (and optionally `baseline`)
pub fn build_report_meta(subject: Option<String>, baseline: Option<String>) -> ReportMeta {
    ReportMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        git_commit: git(&["rev-parse", "HEAD"]),
        git_branch: git(&["rev-parse", "--abbrev-ref", "HEAD"]),
        system: collect_system_info(),
        subject,
        baseline,
    }
}

/// OS, architecture, CPU and memory of this host
pub fn collect_system_info() -> SystemInfo {
    let cpu_cores = std::thread::available_parallelism().map_or(1, |n| n.get() as u32);
    let memory_gb = proc_field("/proc/meminfo", "MemTotal")
        .and_then(|v| v.split_whitespace().next()?.parse::<u64>().ok())
        .map_or(0.0, |kib| kib as f64 / KIB_PER_GIB);

    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu: proc_field("/proc/cpuinfo", "model name").unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores,
        memory_gb,
    }
}

/// Trimmed stdout of a successful `git` call
fn git(args: &[&str]) -> Option<String> {
    let output = std::process::Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Value after the colon of the first `key: value` line in a `/proc` file
fn proc_field(path: &str, key: &str) -> Option<String> {
    if !cfg!(target_os = "linux") {
        return None;
    }
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .filter(|line| line.starts_with(key))
        .find_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_info_has_basics() {
        let info = collect_system_info();
        assert_eq!(info.os, std::env::consts::OS);
        assert!(info.cpu_cores >= 1);
    }

    #[test]
    fn test_meta_carries_paths() {
        let meta = build_report_meta(Some("build/piracer".into()), Some("minipi".into()));
        assert_eq!(meta.subject.as_deref(), Some("build/piracer"));
        assert_eq!(meta.baseline.as_deref(), Some("minipi"));
    }
}
