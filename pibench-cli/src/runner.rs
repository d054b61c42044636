//! Process Runner
//!
//! Spawns an external program, waits for it, and records how long it took.
//! Every call is independent: one child at a time, no timeouts, no retries.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Executable not found: {program}")]
    ExecutableNotFound { program: String },

    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// What to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl RunSpec {
    /// Run `program` with no arguments
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run inside `dir`
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl fmt::Display for RunSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of one finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit status was zero
    pub success: bool,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Spawn to observed exit, monotonic
    pub elapsed: Duration,
}

impl RunOutcome {
    /// Elapsed wall-clock seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Last `lines` lines of stderr
    pub fn stderr_tail(&self, lines: usize) -> String {
        tail(&self.stderr, lines)
    }
}

/// Last `lines` lines of `text`, trimmed
pub fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Executes external programs.
///
/// Implemented by [`SystemRunner`] for real processes and by scripted fakes
/// in tests.
pub trait ProcessRunner {
    /// Run `spec` to completion.
    ///
    /// With `capture` false the child's stdout and stderr go to the null
    /// device and the outcome's streams are empty. A non-zero exit is a
    /// normal outcome, not an error.
    fn execute(&self, spec: &RunSpec, capture: bool) -> Result<RunOutcome, RunnerError>;

    /// Resolve `program` without running it.
    ///
    /// Pipelines call this for every executable they will time, so a missing
    /// program fails before the first measurement.
    fn locate(&self, program: &Path) -> Result<PathBuf, RunnerError> {
        resolve_program(program).ok_or_else(|| RunnerError::ExecutableNotFound {
            program: program.display().to_string(),
        })
    }
}

/// Runs real processes with `std::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Runner that spawns real processes
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn execute(&self, spec: &RunSpec, capture: bool) -> Result<RunOutcome, RunnerError> {
        let program = self.locate(spec.program())?;

        let mut cmd = Command::new(&program);
        cmd.args(spec.arguments()).stdin(Stdio::null());
        if let Some(dir) = spec.working_dir() {
            cmd.current_dir(dir);
        }

        tracing::debug!("exec: {}", spec);

        let spawn_failed = |source| RunnerError::SpawnFailed {
            program: program.display().to_string(),
            source,
        };

        if capture {
            let start = Instant::now();
            let output = cmd.output().map_err(spawn_failed)?;
            let elapsed = start.elapsed();

            Ok(RunOutcome {
                success: output.status.success(),
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                elapsed,
            })
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());

            let start = Instant::now();
            let status = cmd.status().map_err(spawn_failed)?;
            let elapsed = start.elapsed();

            Ok(RunOutcome {
                success: status.success(),
                exit_code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
                elapsed,
            })
        }
    }
}

/// Locate `program` before spawning.
///
/// A path with a separator must name an existing file; a bare name is looked
/// up on `PATH`. Relative paths are made absolute against the current
/// directory so a working-directory change cannot move them.
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        if !program.is_file() {
            return None;
        }
        return std::path::absolute(program).ok();
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_display() {
        let spec = RunSpec::new("build/piracer")
            .args(["--digits", "100"])
            .arg("--out")
            .arg("/dev/null");
        assert_eq!(spec.to_string(), "build/piracer --digits 100 --out /dev/null");
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("only", 5), "only");
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn test_missing_path_not_found() {
        let err = SystemRunner::new()
            .execute(&RunSpec::new("./definitely/not/here"), true)
            .unwrap_err();
        assert!(matches!(err, RunnerError::ExecutableNotFound { .. }));
    }

    #[test]
    fn test_missing_bare_name_not_found() {
        let err = SystemRunner::new()
            .execute(&RunSpec::new("pibench-no-such-program-xyz"), true)
            .unwrap_err();
        assert!(matches!(err, RunnerError::ExecutableNotFound { .. }));
    }

    #[test]
    fn test_locate_without_running() {
        let runner = SystemRunner::new();
        assert!(matches!(
            runner.locate(Path::new("./definitely/not/here")),
            Err(RunnerError::ExecutableNotFound { .. })
        ));
        #[cfg(unix)]
        assert!(runner.locate(Path::new("sh")).unwrap().is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_streams_and_exit_code() {
        let spec = RunSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let outcome = SystemRunner::new().execute(&spec, true).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stdout.trim(), "out");
        assert_eq!(outcome.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn test_uncaptured_streams_are_empty() {
        let spec = RunSpec::new("sh").args(["-c", "echo noisy; echo noisy >&2"]);
        let outcome = SystemRunner::new().execute(&spec, false).unwrap();
        assert!(outcome.success);
        assert!(outcome.stdout.is_empty());
        assert!(outcome.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_elapsed_covers_child_runtime() {
        let spec = RunSpec::new("sh").args(["-c", "sleep 0.2"]);
        let outcome = SystemRunner::new().execute(&spec, false).unwrap();
        assert!(outcome.elapsed >= Duration::from_millis(200));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_has_no_exit_code() {
        let spec = RunSpec::new("sh").args(["-c", "kill -9 $$"]);
        let outcome = SystemRunner::new().execute(&spec, true).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spec = RunSpec::new("sh").args(["-c", "pwd"]).current_dir(dir.path());
        let outcome = SystemRunner::new().execute(&spec, true).unwrap();
        let reported = std::fs::canonicalize(outcome.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
