//! Scripted process runner for pipeline tests

use crate::runner::{ProcessRunner, RunOutcome, RunSpec, RunnerError};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&RunSpec) -> Result<RunOutcome, RunnerError>>;

/// Answers every call from a closure and records what was asked
pub struct ScriptedRunner {
    responder: Responder,
    calls: Mutex<Vec<(RunSpec, bool)>>,
    /// File names that fail to locate; `*` matches every program
    absent: Vec<String>,
}

impl ScriptedRunner {
    pub fn new(f: impl Fn(&RunSpec) -> RunOutcome + 'static) -> Self {
        Self::with_result(move |spec| Ok(f(spec)))
    }

    pub fn with_result(f: impl Fn(&RunSpec) -> Result<RunOutcome, RunnerError> + 'static) -> Self {
        Self {
            responder: Box::new(f),
            calls: Mutex::new(Vec::new()),
            absent: Vec::new(),
        }
    }

    /// Programs with this file name cannot be located
    pub fn without(mut self, name: &str) -> Self {
        self.absent.push(name.to_string());
        self
    }

    /// Every program is missing
    pub fn missing() -> Self {
        Self::with_result(|spec| {
            Err(RunnerError::ExecutableNotFound {
                program: spec.program().display().to_string(),
            })
        })
        .without("*")
    }

    /// Specs executed so far, with their capture flag
    pub fn calls(&self) -> Vec<(RunSpec, bool)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Command lines executed so far
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|(spec, _)| spec.to_string()).collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn execute(&self, spec: &RunSpec, capture: bool) -> Result<RunOutcome, RunnerError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((spec.clone(), capture));
        }
        (self.responder)(spec)
    }

    fn locate(&self, program: &Path) -> Result<PathBuf, RunnerError> {
        let name = program.file_name().map(|n| n.to_string_lossy().into_owned());
        let absent = self
            .absent
            .iter()
            .any(|a| a == "*" || Some(a.as_str()) == name.as_deref());
        if absent {
            return Err(RunnerError::ExecutableNotFound {
                program: program.display().to_string(),
            });
        }
        Ok(program.to_path_buf())
    }
}

/// Successful outcome
pub fn ok(elapsed_s: f64, stdout: &str, stderr: &str) -> RunOutcome {
    RunOutcome {
        success: true,
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        elapsed: Duration::from_secs_f64(elapsed_s),
    }
}

/// Failed outcome with an exit code
pub fn failed(code: i32, stderr: &str) -> RunOutcome {
    RunOutcome {
        success: false,
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
        elapsed: Duration::from_millis(1),
    }
}
