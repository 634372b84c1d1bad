//! Project-level configuration support
//!
//! Loads per-project configuration from `cyclolens.toml` or
//! `.cyclolensrc.json` in the workspace root.
//!
//! # Configuration Format
//!
//! ```toml
//! # cyclolens.toml
//!
//! [analyzer]
//! name = "gocyclo"
//! path = "/opt/bin/gocyclo"
//! bundle_dir = "bin"
//! timeout_secs = 30
//! top = 10000
//! ignore = "_test.go"
//!
//! [watch]
//! debounce_ms = 1500
//! extension = "go"
//! show_indicator = true
//!
//! [report]
//! remark_scale = "maintainability"
//! format = "text"
//! ```

use crate::analyzer::{resolve_executable, InvokerSettings};
use crate::controller::{ControllerSettings, DEFAULT_DEBOUNCE};
use crate::scoring::Scale;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "cyclolens.toml";
const JSON_CONFIG_FILE_NAME: &str = ".cyclolensrc.json";

const DEFAULT_BINARY_NAME: &str = "gocyclo";
const DEFAULT_BUNDLE_DIR: &str = "bin";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOP: usize = 10_000;
const DEFAULT_IGNORE: &str = "_test.go";
const DEFAULT_EXTENSION: &str = "go";

/// Project-level configuration loaded from cyclolens.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// How to find and run the analyzer
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AnalyzerConfig {
    /// Binary name (default: gocyclo)
    pub name: Option<String>,

    /// Explicit executable path
    pub path: Option<PathBuf>,

    /// Directory holding `<name>-<platform>` binaries (default: bin)
    pub bundle_dir: Option<PathBuf>,

    /// Per-invocation timeout, 0 disables (default: 30)
    pub timeout_secs: Option<u64>,

    /// `-top` for full listings (default: 10000)
    pub top: Option<usize>,

    /// `-ignore` pattern for full listings; empty disables (default: _test.go)
    pub ignore: Option<String>,
}

/// Indicator behaviour in watch mode
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatchConfig {
    pub debounce_ms: Option<u64>,

    /// Source extension the indicator tracks, without the dot (default: go)
    pub extension: Option<String>,

    /// Whether the indicator starts enabled (default: true)
    pub show_indicator: Option<bool>,
}

/// Report rendering
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReportConfig {
    /// Scale that decides the Remark column (default: maintainability)
    pub remark_scale: Option<Scale>,

    /// Default output format for `details` (text, json)
    pub format: Option<String>,
}

impl ProjectConfig {
    pub fn binary_name(&self) -> &str {
        self.analyzer.name.as_deref().unwrap_or(DEFAULT_BINARY_NAME)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.analyzer.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn ignore_pattern(&self) -> Option<&str> {
        match self.analyzer.ignore.as_deref() {
            Some("") => None,
            Some(pattern) => Some(pattern),
            None => Some(DEFAULT_IGNORE),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.watch
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    pub fn extension(&self) -> &str {
        self.watch
            .extension
            .as_deref()
            .map(|e| e.trim_start_matches('.'))
            .unwrap_or(DEFAULT_EXTENSION)
    }

    pub fn show_indicator(&self) -> bool {
        self.watch.show_indicator.unwrap_or(true)
    }

    pub fn remark_scale(&self) -> Scale {
        self.report.remark_scale.unwrap_or_default()
    }

    pub fn report_format(&self) -> &str {
        self.report.format.as_deref().unwrap_or("text")
    }

    /// Build invoker settings, resolving the executable once.
    ///
    /// `explicit` (from the command line or environment) beats the
    /// configured path; bundled binaries are looked up under the workspace
    /// and next to the running executable.
    pub fn invoker_settings(&self, explicit: Option<&Path>, workspace: &Path) -> InvokerSettings {
        let mut search_roots = vec![workspace.to_path_buf()];
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            search_roots.push(exe_dir);
        }

        let bundle_dir = self
            .analyzer
            .bundle_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_DIR));

        let executable = resolve_executable(
            explicit.or(self.analyzer.path.as_deref()),
            self.binary_name(),
            &bundle_dir,
            &search_roots,
        );

        InvokerSettings {
            executable,
            binary_name: self.binary_name().to_string(),
            top: self.analyzer.top.unwrap_or(DEFAULT_TOP),
            ignore: self.ignore_pattern().map(String::from),
            timeout: self.timeout(),
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            debounce: self.debounce(),
            extension: self.extension().to_string(),
            binary_name: self.binary_name().to_string(),
        }
    }
}

/// Load project configuration from the workspace root.
///
/// Tries `cyclolens.toml` first, then `.cyclolensrc.json`. A file that
/// fails to parse is reported and skipped; with nothing usable the
/// defaults apply.
pub fn load_project_config(workspace: &Path) -> ProjectConfig {
    let toml_path = workspace.join(CONFIG_FILE_NAME);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = workspace.join(JSON_CONFIG_FILE_NAME);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration from a JSON file
fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Example config written by `cyclolens init`
pub fn example_config() -> &'static str {
    r#"# Cyclolens Configuration

[analyzer]
# Binary name, used to find bundled binaries and to recognise a missing analyzer
name = "gocyclo"

# Explicit executable (overrides bundled and PATH lookup)
# path = "/usr/local/bin/gocyclo"

# Bundled binaries are named <name>-<platform>, e.g. bin/gocyclo-linux
bundle_dir = "bin"

# Seconds before a run is killed (0 = no limit)
timeout_secs = 30

# Function listing options
top = 10000
ignore = "_test.go"

[watch]
# Minimum milliseconds between analyses triggered by edits
debounce_ms = 1500
extension = "go"
show_indicator = true

[report]
# Which score decides the Remark column: maintainability or cyclomatic
remark_scale = "maintainability"
format = "text"
"#
}
