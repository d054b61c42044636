//! Configuration loading from pibench.toml
//!
//! Harness defaults can be set in a `pibench.toml` file in the project root.
//! The file is discovered by walking up from the current directory; command
//! line flags override anything it sets.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name searched for by [`PibenchConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "pibench.toml";

/// pibench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PibenchConfig {
    /// Executable and source locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Benchmark defaults
    #[serde(default)]
    pub bench: BenchConfig,
    /// Build/test matrix defaults
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Executable and source locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Digit generator under test
    #[serde(default = "default_piracer")]
    pub piracer: String,
    /// Competitor, resolved on PATH when given as a bare name
    #[serde(default = "default_minipi")]
    pub minipi: String,
    /// Project source directory handed to the build toolchain
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            piracer: default_piracer(),
            minipi: default_minipi(),
            source_dir: default_source_dir(),
        }
    }
}

fn default_piracer() -> String {
    "build/piracer".to_string()
}
fn default_minipi() -> String {
    "minipi".to_string()
}
fn default_source_dir() -> String {
    ".".to_string()
}

/// Benchmark defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Repetitions per input size
    #[serde(default = "default_reps")]
    pub reps: usize,
    /// Upper bound of the extreme progression
    #[serde(default = "default_max_digits")]
    pub max_digits: u64,
    /// Worker threads requested from the generator
    #[serde(default = "default_threads")]
    pub threads: u32,
    /// Output base: "dec" or "hex"
    #[serde(default = "default_base")]
    pub base: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            reps: default_reps(),
            max_digits: default_max_digits(),
            threads: default_threads(),
            base: default_base(),
        }
    }
}

fn default_reps() -> usize {
    3
}
fn default_max_digits() -> u64 {
    1_000_000
}
fn default_threads() -> u32 {
    1
}
fn default_base() -> String {
    "dec".to_string()
}

/// Build/test matrix defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Build directory for uninstrumented cells
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
    /// Build profiles, e.g. "Release", "Debug"
    #[serde(default = "default_configs")]
    pub configs: Vec<String>,
    /// Sanitizers: "asan", "ubsan"
    #[serde(default = "default_sanitizers")]
    pub sanitizers: Vec<String>,
    /// Skip all sanitizer cells
    #[serde(default)]
    pub skip_sanitizers: bool,
    /// Stop after the first failed cell
    #[serde(default)]
    pub fail_fast: bool,
    /// CMake generator
    #[serde(default = "default_generator")]
    pub generator: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            configs: default_configs(),
            sanitizers: default_sanitizers(),
            skip_sanitizers: false,
            fail_fast: false,
            generator: default_generator(),
        }
    }
}

fn default_build_dir() -> String {
    "build-test".to_string()
}
fn default_configs() -> Vec<String> {
    vec!["Release".to_string(), "Debug".to_string()]
}
fn default_sanitizers() -> Vec<String> {
    vec!["asan".to_string(), "ubsan".to_string()]
}
fn default_generator() -> String {
    "Ninja".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "csv", "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// CSV written by `compare`
    #[serde(default = "default_comparison_csv")]
    pub comparison_csv: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            comparison_csv: default_comparison_csv(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_comparison_csv() -> String {
    "bench_comparison.csv".to_string()
}

impl PibenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for `pibench.toml`
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# pibench Configuration

[paths]
# Digit generator under test
piracer = "build/piracer"
# Competitor (bare names are looked up on PATH)
minipi = "minipi"
# Source directory passed to cmake
source_dir = "."

[bench]
# Repetitions per input size
reps = 3
# Upper bound for the extreme progression (10k, 100k, 1M)
max_digits = 1000000
# Threads requested from the generator
threads = 1
# Output base: dec or hex
base = "dec"

[matrix]
# Build directory; sanitizer cells append -asan / -ubsan
build_dir = "build-test"
# Build profiles
configs = ["Release", "Debug"]
# Sanitizers: asan, ubsan
sanitizers = ["asan", "ubsan"]
skip_sanitizers = false
# Stop at the first broken configuration
fail_fast = false
# CMake generator
generator = "Ninja"

[output]
# Default output format: human, csv, json
format = "human"
# CSV written by `pibench compare`
comparison_csv = "bench_comparison.csv"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PibenchConfig::default();
        assert_eq!(config.paths.piracer, "build/piracer");
        assert_eq!(config.paths.minipi, "minipi");
        assert_eq!(config.bench.reps, 3);
        assert_eq!(config.matrix.configs, vec!["Release", "Debug"]);
        assert_eq!(config.output.comparison_csv, "bench_comparison.csv");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [bench]
            reps = 7

            [matrix]
            sanitizers = ["asan"]
            fail_fast = true
        "#;

        let config: PibenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bench.reps, 7);
        assert_eq!(config.matrix.sanitizers, vec!["asan"]);
        assert!(config.matrix.fail_fast);
        // Defaults should still apply
        assert_eq!(config.bench.max_digits, 1_000_000);
        assert_eq!(config.matrix.build_dir, "build-test");
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: PibenchConfig = toml::from_str(&PibenchConfig::default_toml()).unwrap();
        let defaults = PibenchConfig::default();
        assert_eq!(config.bench.reps, defaults.bench.reps);
        assert_eq!(config.matrix.generator, defaults.matrix.generator);
        assert_eq!(config.paths.source_dir, defaults.paths.source_dir);
    }

    #[test]
    fn test_discover_walks_up() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(CONFIG_FILE_NAME), "[bench]\nreps = 9\n").unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = PibenchConfig::discover_from(&nested).unwrap();
        assert_eq!(config.bench.reps, 9);
    }
}
