//! Build/Test Matrix
//!
//! Validates the project across build profiles and sanitizer modes. Every
//! (profile, instrumentation) cell runs the same staged pipeline:
//!
//! ```text
//! Clean → Configuring → Building → Testing → SmokeTesting → Passed
//!   │          │            │          │            │
//!   └──────────┴────────────┴──────────┴────────────┴──→ Failed { stage }
//! ```
//!
//! The first failing stage seals the cell; later stages never run. Cells run
//! one after another and a failed cell does not stop the matrix unless
//! `fail_fast` is set.

use crate::progress::{ProgressEvent, ProgressObserver};
use crate::runner::{ProcessRunner, RunSpec, tail};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Smoke test size for uninstrumented cells
pub const SMOKE_DIGITS: u64 = 100;
/// Smoke test size for sanitizer cells, which run much slower
pub const SANITIZER_SMOKE_DIGITS: u64 = 50;

/// Lines of captured output kept for a failed stage
const DETAIL_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("unknown build profile '{0}' (expected Release, Debug, RelWithDebInfo or MinSizeRel)")]
    UnknownProfile(String),

    #[error("unknown sanitizer '{0}' (expected asan or ubsan)")]
    UnknownInstrumentation(String),

    #[error("no build profiles requested")]
    NoProfiles,

    #[error("{failed} of {total} matrix cells did not pass: {cells}")]
    CellsFailed {
        failed: usize,
        total: usize,
        cells: String,
    },
}

/// CMake build type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildProfile {
    Release,
    Debug,
    RelWithDebInfo,
    MinSizeRel,
}

impl fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildProfile::Release => "Release",
            BuildProfile::Debug => "Debug",
            BuildProfile::RelWithDebInfo => "RelWithDebInfo",
            BuildProfile::MinSizeRel => "MinSizeRel",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for BuildProfile {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(BuildProfile::Release),
            "debug" => Ok(BuildProfile::Debug),
            "relwithdebinfo" => Ok(BuildProfile::RelWithDebInfo),
            "minsizerel" => Ok(BuildProfile::MinSizeRel),
            _ => Err(MatrixError::UnknownProfile(s.to_string())),
        }
    }
}

/// Runtime instrumentation compiled into a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrumentation {
    None,
    /// AddressSanitizer
    Address,
    /// UndefinedBehaviorSanitizer
    Undefined,
}

impl Instrumentation {
    /// Whether a sanitizer is compiled in
    pub fn is_sanitizer(self) -> bool {
        !matches!(self, Instrumentation::None)
    }

    /// Value passed to `-fsanitize=`
    pub fn sanitize_flag(self) -> Option<&'static str> {
        match self {
            Instrumentation::None => None,
            Instrumentation::Address => Some("address"),
            Instrumentation::Undefined => Some("undefined"),
        }
    }

    /// Build directory for this mode: sanitizer cells get `<base>-<short name>`
    pub fn build_dir(self, base: &Path) -> PathBuf {
        match self {
            Instrumentation::None => base.to_path_buf(),
            other => {
                let mut name = base.as_os_str().to_os_string();
                name.push(format!("-{}", other));
                PathBuf::from(name)
            }
        }
    }

    /// Smoke test size
    pub fn smoke_digits(self) -> u64 {
        if self.is_sanitizer() {
            SANITIZER_SMOKE_DIGITS
        } else {
            SMOKE_DIGITS
        }
    }
}

impl fmt::Display for Instrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrumentation::None => write!(f, "none"),
            Instrumentation::Address => write!(f, "asan"),
            Instrumentation::Undefined => write!(f, "ubsan"),
        }
    }
}

impl FromStr for Instrumentation {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Instrumentation::None),
            "asan" | "address" => Ok(Instrumentation::Address),
            "ubsan" | "undefined" => Ok(Instrumentation::Undefined),
            _ => Err(MatrixError::UnknownInstrumentation(s.to_string())),
        }
    }
}

/// Pipeline stage of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    Configuring,
    Building,
    Testing,
    SmokeTesting,
}

impl Stage {
    /// Stage that follows a successful `self`; `None` after the smoke test
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Clean => Some(Stage::Configuring),
            Stage::Configuring => Some(Stage::Building),
            Stage::Building => Some(Stage::Testing),
            Stage::Testing => Some(Stage::SmokeTesting),
            Stage::SmokeTesting => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Clean => "clean",
            Stage::Configuring => "configure",
            Stage::Building => "build",
            Stage::Testing => "test",
            Stage::SmokeTesting => "smoke",
        };
        write!(f, "{}", name)
    }
}

/// Where a cell is in its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Running { stage: Stage },
    Passed,
    Failed { stage: Stage },
    /// Never scheduled because an earlier cell failed under `fail_fast`
    Skipped,
}

impl CellState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CellState::Running { .. })
    }
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    pub stage: Stage,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    /// Command line, or a description for in-process actions
    pub command: String,
    /// Output tail or error message on failure
    pub detail: Option<String>,
}

/// One sealed (profile, instrumentation) cell
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixCell {
    profile: BuildProfile,
    instrumentation: Instrumentation,
    stages: Vec<StageResult>,
    state: CellState,
}

impl MatrixCell {
    /// A cell that was never run
    pub fn skipped(profile: BuildProfile, instrumentation: Instrumentation) -> Self {
        Self {
            profile,
            instrumentation,
            stages: Vec::new(),
            state: CellState::Skipped,
        }
    }

    pub fn profile(&self) -> BuildProfile {
        self.profile
    }

    pub fn instrumentation(&self) -> Instrumentation {
        self.instrumentation
    }

    /// Stage results in execution order
    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn passed(&self) -> bool {
        self.state == CellState::Passed
    }

    /// `Release` or `Release+asan`
    pub fn name(&self) -> String {
        cell_name(self.profile, self.instrumentation)
    }
}

fn cell_name(profile: BuildProfile, instrumentation: Instrumentation) -> String {
    match instrumentation {
        Instrumentation::None => profile.to_string(),
        other => format!("{}+{}", profile, other),
    }
}

/// A cell while its stages run. Sealing it yields an immutable [`MatrixCell`].
#[derive(Debug)]
struct CellRun {
    cell: MatrixCell,
}

impl CellRun {
    fn start(profile: BuildProfile, instrumentation: Instrumentation) -> Self {
        Self {
            cell: MatrixCell {
                profile,
                instrumentation,
                stages: Vec::new(),
                state: CellState::Running {
                    stage: Stage::Clean,
                },
            },
        }
    }

    /// Stage waiting to run, if the cell is still running
    fn current(&self) -> Option<Stage> {
        match self.cell.state {
            CellState::Running { stage } => Some(stage),
            _ => None,
        }
    }

    /// Record the current stage's result and advance
    fn record(&mut self, result: StageResult) {
        let stage = result.stage;
        let success = result.success;
        self.cell.stages.push(result);
        self.cell.state = match (success, stage.next()) {
            (false, _) => CellState::Failed { stage },
            (true, Some(next)) => CellState::Running { stage: next },
            (true, None) => CellState::Passed,
        };
    }

    fn seal(self) -> MatrixCell {
        self.cell
    }
}

/// Produces the configure/build/test commands for a cell
pub trait Toolchain {
    /// Configure `build_dir` from `source_dir`
    fn configure(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        profile: BuildProfile,
        instrumentation: Instrumentation,
    ) -> RunSpec;

    /// Build everything in `build_dir`
    fn build(&self, build_dir: &Path) -> RunSpec;

    /// Run the project's test suite in `build_dir`
    fn test(&self, build_dir: &Path) -> RunSpec;
}

/// CMake + CTest
#[derive(Debug, Clone)]
pub struct CmakeToolchain {
    pub generator: String,
}

impl Default for CmakeToolchain {
    fn default() -> Self {
        Self {
            generator: "Ninja".to_string(),
        }
    }
}

impl Toolchain for CmakeToolchain {
    fn configure(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        profile: BuildProfile,
        instrumentation: Instrumentation,
    ) -> RunSpec {
        let mut spec = RunSpec::new("cmake").args([
            "-S".to_string(),
            source_dir.display().to_string(),
            "-B".to_string(),
            build_dir.display().to_string(),
            "-G".to_string(),
            self.generator.clone(),
            format!("-DCMAKE_BUILD_TYPE={}", profile),
        ]);
        if let Some(flag) = instrumentation.sanitize_flag() {
            spec = spec
                .arg(format!(
                    "-DCMAKE_CXX_FLAGS=-fsanitize={} -fno-omit-frame-pointer",
                    flag
                ))
                .arg(format!("-DCMAKE_EXE_LINKER_FLAGS=-fsanitize={}", flag));
        }
        spec
    }

    fn build(&self, build_dir: &Path) -> RunSpec {
        RunSpec::new("cmake").args([
            "--build".to_string(),
            build_dir.display().to_string(),
            "-j".to_string(),
        ])
    }

    fn test(&self, build_dir: &Path) -> RunSpec {
        RunSpec::new("ctest").args([
            "--test-dir".to_string(),
            build_dir.display().to_string(),
            "--output-on-failure".to_string(),
        ])
    }
}

/// Which cells to run and where
#[derive(Debug, Clone)]
pub struct MatrixPlan {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub profiles: Vec<BuildProfile>,
    pub sanitizers: Vec<Instrumentation>,
    pub skip_sanitizers: bool,
    pub fail_fast: bool,
    /// Executable produced by the build, relative to the build directory
    pub binary_name: String,
}

impl MatrixPlan {
    /// Cells in run order: every profile uninstrumented, then each sanitizer
    /// across every profile.
    pub fn cells(&self) -> Vec<(BuildProfile, Instrumentation)> {
        let mut cells: Vec<_> = self
            .profiles
            .iter()
            .map(|&p| (p, Instrumentation::None))
            .collect();
        if !self.skip_sanitizers {
            for &sanitizer in self.sanitizers.iter().filter(|s| s.is_sanitizer()) {
                cells.extend(self.profiles.iter().map(|&p| (p, sanitizer)));
            }
        }
        cells
    }
}

/// Feature check run against the finished uninstrumented build
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub name: &'static str,
    pub success: bool,
    pub detail: Option<String>,
}

/// Probe names and arguments
pub const FEATURE_PROBES: [(&str, &[&str]); 4] = [
    ("decimal output", &["--digits", "50", "--base", "dec"]),
    ("hexadecimal output", &["--digits", "50", "--base", "hex"]),
    ("progress bar", &["--digits", "1000", "--progress"]),
    ("self-test", &["--self-test", "--digits", "100"]),
];

/// Everything one matrix invocation produced
#[derive(Debug, Clone)]
pub struct MatrixRun {
    pub cells: Vec<MatrixCell>,
    pub probes: Vec<ProbeResult>,
    pub duration: Duration,
}

impl MatrixRun {
    /// Every requested cell passed. Probe failures do not count.
    pub fn success(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(MatrixCell::passed)
    }

    /// Error describing the cells that did not pass, if any
    pub fn failure(&self) -> Option<MatrixError> {
        if self.success() {
            return None;
        }
        let bad: Vec<String> = self
            .cells
            .iter()
            .filter(|c| !c.passed())
            .map(|c| match c.state() {
                CellState::Failed { stage } | CellState::Running { stage } => {
                    format!("{} at {}", c.name(), stage)
                }
                _ => format!("{} skipped", c.name()),
            })
            .collect();
        Some(MatrixError::CellsFailed {
            failed: bad.len(),
            total: self.cells.len(),
            cells: bad.join(", "),
        })
    }
}

/// Drives cells through the toolchain and process runner
pub struct MatrixRunner<'a, R: ProcessRunner, T: Toolchain> {
    runner: &'a R,
    toolchain: &'a T,
    observer: &'a dyn ProgressObserver,
}

impl<'a, R: ProcessRunner, T: Toolchain> MatrixRunner<'a, R, T> {
    /// Runner reporting to `observer`
    pub fn new(runner: &'a R, toolchain: &'a T, observer: &'a dyn ProgressObserver) -> Self {
        Self {
            runner,
            toolchain,
            observer,
        }
    }

    /// Run every cell of `plan`, then the feature probes.
    pub fn run(&self, plan: &MatrixPlan) -> Result<MatrixRun, MatrixError> {
        if plan.profiles.is_empty() {
            return Err(MatrixError::NoProfiles);
        }

        let start = Instant::now();
        let schedule = plan.cells();
        self.observer.notify(&ProgressEvent::Started {
            total: schedule.len() as u64,
        });

        let mut cells = Vec::with_capacity(schedule.len());
        let mut stop = false;
        for (profile, instrumentation) in schedule {
            if stop {
                cells.push(MatrixCell::skipped(profile, instrumentation));
                continue;
            }
            let cell = self.run_cell(plan, profile, instrumentation);
            if !cell.passed() && plan.fail_fast {
                tracing::warn!("{} failed; skipping remaining cells", cell.name());
                stop = true;
            }
            cells.push(cell);
        }
        self.observer.notify(&ProgressEvent::Finished);

        // The shared build directory holds whatever the last uninstrumented cell built
        let last_plain = cells
            .iter()
            .rev()
            .find(|c| !c.instrumentation().is_sanitizer() && c.state() != CellState::Skipped);
        let probes = match last_plain {
            Some(cell) if cell.passed() => self.run_probes(&plan.build_dir.join(&plan.binary_name)),
            _ => Vec::new(),
        };

        Ok(MatrixRun {
            cells,
            probes,
            duration: start.elapsed(),
        })
    }

    /// Run one cell to a terminal state
    pub fn run_cell(
        &self,
        plan: &MatrixPlan,
        profile: BuildProfile,
        instrumentation: Instrumentation,
    ) -> MatrixCell {
        let name = cell_name(profile, instrumentation);
        let build_dir = instrumentation.build_dir(&plan.build_dir);
        self.observer.notify(&ProgressEvent::CellStarted { cell: &name });

        let mut run = CellRun::start(profile, instrumentation);
        while let Some(stage) = run.current() {
            let result = match stage {
                Stage::Clean => clean(&build_dir),
                Stage::Configuring => self.run_stage(
                    stage,
                    self.toolchain
                        .configure(&plan.source_dir, &build_dir, profile, instrumentation),
                ),
                Stage::Building => self.run_stage(stage, self.toolchain.build(&build_dir)),
                Stage::Testing => self.run_stage(stage, self.toolchain.test(&build_dir)),
                Stage::SmokeTesting => self.run_stage(
                    stage,
                    RunSpec::new(build_dir.join(&plan.binary_name)).args([
                        "--digits".to_string(),
                        instrumentation.smoke_digits().to_string(),
                        "--base".to_string(),
                        "dec".to_string(),
                    ]),
                ),
            };

            self.observer.notify(&ProgressEvent::StageFinished {
                cell: &name,
                stage: &stage.to_string(),
                success: result.success,
                elapsed_s: result.elapsed.as_secs_f64(),
            });
            if !result.success {
                tracing::warn!(
                    "{} {} failed: {}",
                    name,
                    stage,
                    result.detail.as_deref().unwrap_or("")
                );
            }
            run.record(result);
        }

        let cell = run.seal();
        self.observer.notify(&ProgressEvent::CellFinished {
            cell: &name,
            passed: cell.passed(),
        });
        cell
    }

    fn run_stage(&self, stage: Stage, spec: RunSpec) -> StageResult {
        let command = spec.to_string();
        match self.runner.execute(&spec, true) {
            Ok(outcome) => StageResult {
                stage,
                success: outcome.success,
                exit_code: outcome.exit_code,
                elapsed: outcome.elapsed,
                command,
                detail: (!outcome.success).then(|| failure_detail(&outcome.stdout, &outcome.stderr)),
            },
            Err(e) => StageResult {
                stage,
                success: false,
                exit_code: None,
                elapsed: Duration::ZERO,
                command,
                detail: Some(e.to_string()),
            },
        }
    }

    /// Exercise optional generator features. Failures are reported only.
    pub fn run_probes(&self, binary: &Path) -> Vec<ProbeResult> {
        FEATURE_PROBES
            .iter()
            .map(|&(name, args)| {
                let spec = RunSpec::new(binary).args(args.iter().copied());
                let (success, detail) = match self.runner.execute(&spec, true) {
                    Ok(outcome) if outcome.success => (true, None),
                    Ok(outcome) => (false, Some(failure_detail(&outcome.stdout, &outcome.stderr))),
                    Err(e) => (false, Some(e.to_string())),
                };
                if !success {
                    tracing::warn!("probe '{}' failed", name);
                }
                ProbeResult {
                    name,
                    success,
                    detail,
                }
            })
            .collect()
    }
}

fn failure_detail(stdout: &str, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        tail(stdout, DETAIL_TAIL_LINES)
    } else {
        tail(stderr, DETAIL_TAIL_LINES)
    }
}

/// Remove `dir`; a directory that does not exist counts as clean
fn clean(dir: &Path) -> StageResult {
    let start = Instant::now();
    let result = match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    };
    StageResult {
        stage: Stage::Clean,
        success: result.is_ok(),
        exit_code: None,
        elapsed: start.elapsed(),
        command: format!("remove {}", dir.display()),
        detail: result.err().map(|e| e.to_string()),
    }
}
