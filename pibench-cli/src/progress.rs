//! Progress Reporting
//!
//! Pipelines report what they are doing through a [`ProgressObserver`]
//! between process invocations. Observers only present; results are built by
//! the pipelines regardless of which observer is attached.

use indicatif::{ProgressBar, ProgressStyle};

/// Something a pipeline just did or is about to do
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent<'a> {
    /// A pipeline is starting `total` steps
    Started { total: u64 },
    /// One timed run is about to start
    RunStarted {
        label: &'a str,
        digits: u64,
        rep: usize,
        reps: usize,
    },
    /// One timed run finished successfully
    RunFinished {
        label: &'a str,
        digits: u64,
        rep: usize,
        elapsed_s: f64,
        metric: Option<f64>,
    },
    /// A matrix cell is starting
    CellStarted { cell: &'a str },
    /// A matrix stage finished
    StageFinished {
        cell: &'a str,
        stage: &'a str,
        success: bool,
        elapsed_s: f64,
    },
    /// A matrix cell reached a terminal state
    CellFinished { cell: &'a str, passed: bool },
    /// The pipeline is done
    Finished,
}

/// Receives [`ProgressEvent`]s from a running pipeline
pub trait ProgressObserver {
    /// Handle one event; must not fail
    fn notify(&self, event: &ProgressEvent<'_>);
}

/// Ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn notify(&self, _event: &ProgressEvent<'_>) {}
}

/// Writes each event to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn notify(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::Started { total } => tracing::info!("starting {} steps", total),
            ProgressEvent::RunStarted {
                label,
                digits,
                rep,
                reps,
            } => tracing::debug!("{} {} digits: run {}/{}", label, digits, rep, reps),
            ProgressEvent::RunFinished {
                label,
                digits,
                rep,
                elapsed_s,
                metric,
            } => match metric {
                Some(m) => tracing::info!(
                    "{} {} digits run {}: {:.6}s ({:.3} ns/digit reported)",
                    label,
                    digits,
                    rep,
                    elapsed_s,
                    m
                ),
                None => tracing::info!("{} {} digits run {}: {:.6}s", label, digits, rep, elapsed_s),
            },
            ProgressEvent::CellStarted { cell } => tracing::info!("cell {}", cell),
            ProgressEvent::StageFinished {
                cell,
                stage,
                success,
                elapsed_s,
            } => {
                if *success {
                    tracing::info!("{} {}: ok ({:.1}s)", cell, stage, elapsed_s);
                } else {
                    tracing::warn!("{} {}: FAILED ({:.1}s)", cell, stage, elapsed_s);
                }
            }
            ProgressEvent::CellFinished { cell, passed } => {
                tracing::info!("cell {} {}", cell, if *passed { "passed" } else { "failed" })
            }
            ProgressEvent::Finished => tracing::debug!("pipeline finished"),
        }
    }
}

/// Terminal progress bar
pub struct BarObserver {
    pb: ProgressBar,
}

impl BarObserver {
    /// Bar with zero length until the pipeline announces its total
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { pb }
    }
}

impl Default for BarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for BarObserver {
    fn notify(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::Started { total } => {
                self.pb.set_length(*total);
                self.pb.set_position(0);
            }
            ProgressEvent::RunStarted {
                label,
                digits,
                rep,
                reps,
            } => self
                .pb
                .set_message(format!("{} {} digits ({}/{})", label, digits, rep, reps)),
            ProgressEvent::RunFinished { .. } => self.pb.inc(1),
            ProgressEvent::CellStarted { cell } => self.pb.set_message(cell.to_string()),
            ProgressEvent::StageFinished { cell, stage, .. } => {
                self.pb.set_message(format!("{} {}", cell, stage))
            }
            ProgressEvent::CellFinished { .. } => self.pb.inc(1),
            ProgressEvent::Finished => self.pb.finish_with_message("Complete"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingObserver;
    use super::*;

    #[test]
    fn test_recording_observer_counts_by_kind() {
        let observer = RecordingObserver::default();
        observer.notify(&ProgressEvent::Started { total: 2 });
        for rep in 1..=2 {
            observer.notify(&ProgressEvent::RunFinished {
                label: "piracer",
                digits: 100,
                rep,
                elapsed_s: 0.01,
                metric: None,
            });
        }
        observer.notify(&ProgressEvent::Finished);
        assert_eq!(observer.count("RunFinished"), 2);
        assert_eq!(observer.count("Started"), 1);
        assert_eq!(observer.count("CellStarted"), 0);
    }

    #[test]
    fn test_bar_tracks_position() {
        let observer = BarObserver::new();
        observer.notify(&ProgressEvent::Started { total: 3 });
        observer.notify(&ProgressEvent::CellFinished {
            cell: "Release",
            passed: true,
        });
        assert_eq!(observer.pb.length(), Some(3));
        assert_eq!(observer.pb.position(), 1);
        observer.notify(&ProgressEvent::Finished);
        assert!(observer.pb.is_finished());
    }
}
