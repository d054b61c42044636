//! Benchmark Execution
//!
//! Runs the measured programs repeatedly and collects raw timing samples.
//!
//! ## Data Flow
//!
//! ```text
//!   Invocation + sizes + reps
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ BenchmarkRunner  │  spawn → wait → time, one process at a time
//! └────────┬─────────┘
//!          │
//!          ▼
//!   Measurement (BenchmarkPoint + verified output size)
//! ```
//!
//! Sampling is strictly sequential. A failed run aborts the whole pipeline:
//! there are no retries and partial points are never aggregated.

use crate::metric::{extract_metric, output_digit_count};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::runner::{ProcessRunner, RunSpec, RunnerError};
use pibench_stats::{BenchmarkPoint, StatsError, TimingSample};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Lines of stderr kept in a [`BenchError::ProcessFailed`]
const STDERR_TAIL_LINES: usize = 10;

/// Null device used for `--out`
#[cfg(windows)]
pub const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
pub const NULL_DEVICE: &str = "/dev/null";

#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("{label} failed at {digits} digits ({}): {stderr_tail}", exit_label(.exit_code))]
    ProcessFailed {
        label: String,
        digits: u64,
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("no input sizes to measure")]
    NoSizes,

    #[error("repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("invalid base '{0}': expected dec or hex")]
    InvalidBase(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "killed by signal".to_string(),
    }
}

/// Output base of the digit generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Base {
    #[default]
    Dec,
    Hex,
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Base::Dec => write!(f, "dec"),
            Base::Hex => write!(f, "hex"),
        }
    }
}

impl FromStr for Base {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dec" | "decimal" => Ok(Base::Dec),
            "hex" | "hexadecimal" => Ok(Base::Hex),
            other => Err(BenchError::InvalidBase(other.to_string())),
        }
    }
}

/// How to launch one measured program for a given size
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// `<program> --digits N [--base B] [--threads T] [--out PATH]`
    Generator {
        program: PathBuf,
        base: Option<Base>,
        threads: Option<u32>,
        out: Option<String>,
    },
    /// `<program> N`
    Positional { program: PathBuf },
}

impl Invocation {
    /// Generator writing digits to the null device, as plain benchmarks run it
    pub fn discard_output(program: impl Into<PathBuf>) -> Self {
        Invocation::Generator {
            program: program.into(),
            base: None,
            threads: None,
            out: Some(NULL_DEVICE.to_string()),
        }
    }

    /// Program path
    pub fn program(&self) -> &PathBuf {
        match self {
            Invocation::Generator { program, .. } | Invocation::Positional { program } => program,
        }
    }

    /// Build the process spec for `digits`
    pub fn spec(&self, digits: u64) -> RunSpec {
        match self {
            Invocation::Generator {
                program,
                base,
                threads,
                out,
            } => {
                let mut spec = RunSpec::new(program.clone())
                    .args(["--digits".to_string(), digits.to_string()]);
                if let Some(base) = base {
                    spec = spec.args(["--base".to_string(), base.to_string()]);
                }
                if let Some(threads) = threads {
                    spec = spec.args(["--threads".to_string(), threads.to_string()]);
                }
                if let Some(out) = out {
                    spec = spec.args(["--out", out.as_str()]);
                }
                spec
            }
            Invocation::Positional { program } => {
                RunSpec::new(program.clone()).arg(digits.to_string())
            }
        }
    }
}

/// What to do with each run's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureMode {
    /// Capture stdout/stderr (needed for metrics, digit counts and error tails)
    pub capture: bool,
    /// Count the digits printed on the last stdout line
    pub verify_output: bool,
}

impl CaptureMode {
    /// Output to the null device; timing only
    pub const DISCARD: Self = Self {
        capture: false,
        verify_output: false,
    };
    /// Capture streams for the self-reported metric
    pub const METRIC: Self = Self {
        capture: true,
        verify_output: false,
    };
    /// Capture streams and count printed digits
    pub const VERIFY: Self = Self {
        capture: true,
        verify_output: true,
    };
}

/// Samples collected for one input size
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub label: String,
    pub point: BenchmarkPoint,
    /// Digits printed by the last run, when verification was requested
    pub output_digits: Option<u64>,
}

/// Repeatedly times one program across input sizes
pub struct BenchmarkRunner<'a, R: ProcessRunner> {
    runner: &'a R,
    observer: &'a dyn ProgressObserver,
}

impl<'a, R: ProcessRunner> BenchmarkRunner<'a, R> {
    /// Measure through `runner`, reporting each repetition to `observer`
    pub fn new(runner: &'a R, observer: &'a dyn ProgressObserver) -> Self {
        Self { runner, observer }
    }

    /// Measure every size `reps` times, size by size.
    pub fn measure(
        &self,
        label: &str,
        invocation: &Invocation,
        sizes: &[u64],
        reps: usize,
        mode: CaptureMode,
    ) -> Result<Vec<Measurement>, BenchError> {
        if sizes.is_empty() {
            return Err(BenchError::NoSizes);
        }
        if reps == 0 {
            return Err(BenchError::ZeroRepetitions);
        }

        sizes
            .iter()
            .map(|&digits| self.measure_size(label, invocation, digits, reps, mode))
            .collect()
    }

    /// Measure one size `reps` times
    pub fn measure_size(
        &self,
        label: &str,
        invocation: &Invocation,
        digits: u64,
        reps: usize,
        mode: CaptureMode,
    ) -> Result<Measurement, BenchError> {
        if digits == 0 {
            return Err(StatsError::ZeroInputSize.into());
        }

        let spec = invocation.spec(digits);
        let mut samples = Vec::with_capacity(reps);
        let mut output_digits = None;

        for rep in 1..=reps {
            self.observer.notify(&ProgressEvent::RunStarted {
                label,
                digits,
                rep,
                reps,
            });

            let outcome = self.runner.execute(&spec, mode.capture)?;
            if !outcome.success {
                tracing::warn!("{} failed: {}", label, spec);
                return Err(BenchError::ProcessFailed {
                    label: label.to_string(),
                    digits,
                    exit_code: outcome.exit_code,
                    stderr_tail: outcome.stderr_tail(STDERR_TAIL_LINES),
                });
            }

            let metric = if mode.capture {
                extract_metric(&outcome)
            } else {
                None
            };
            if mode.verify_output {
                output_digits = output_digit_count(&outcome.stdout);
            }

            let elapsed_s = outcome.elapsed_secs();
            self.observer.notify(&ProgressEvent::RunFinished {
                label,
                digits,
                rep,
                elapsed_s,
                metric,
            });
            samples.push(TimingSample::with_metric(elapsed_s, metric));
        }

        Ok(Measurement {
            label: label.to_string(),
            point: BenchmarkPoint::new(digits, samples),
            output_digits,
        })
    }
}
