//! Analyzer process invocation
//!
//! Every call spawns one analyzer process with a structured argument list
//! (never through a shell) and waits for it without blocking the runtime.
//! Spawn failures, non-zero exits and timeouts all come back as data in
//! [`InvocationResult::exit_error`].

use crate::models::{AnalysisMode, AnalysisRequest};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Why an invocation did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitError {
    /// Process exit code, if the process ran and exited normally
    pub code: Option<i32>,
    /// Diagnostic text (stderr or spawn error), without the command line
    pub message: String,
    /// Whether the process was killed after the timeout elapsed
    pub timed_out: bool,
}

impl ExitError {
    pub fn new(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            timed_out: false,
        }
    }
}

impl std::fmt::Display for ExitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (exit code {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Raw outcome of one analyzer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_error: Option<ExitError>,
}

impl InvocationResult {
    /// A successful run with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    /// A run that failed before producing output
    pub fn failed(exit_error: ExitError) -> Self {
        Self {
            exit_error: Some(exit_error),
            ..Default::default()
        }
    }

    fn spawn_failure(program: &Path, err: &std::io::Error) -> Self {
        Self::failed(ExitError::new(None, format!("{}: {}", program.display(), err)))
    }

    fn timed_out(program: &Path, timeout: Duration) -> Self {
        Self::failed(ExitError {
            code: None,
            message: format!("{} timed out after {:?}", program.display(), timeout),
            timed_out: true,
        })
    }
}

/// Something that can run the analyzer.
///
/// Implementations never fail through the future's output type: every
/// failure is reported inside the [`InvocationResult`].
pub trait Invoker: Send + Sync {
    /// Run the analyzer once for `request`.
    fn invoke(&self, request: &AnalysisRequest) -> impl Future<Output = InvocationResult> + Send;

    /// Try to repair a missing-binary condition before a retry.
    /// Returns `true` when something changed.
    fn recover(&self) -> bool {
        false
    }

    /// Name of the analyzer binary, used to recognise missing-binary errors
    fn binary_name(&self) -> &str;
}

/// Settings for [`ProcessInvoker`]
#[derive(Debug, Clone)]
pub struct InvokerSettings {
    /// Resolved executable path
    pub executable: PathBuf,
    /// Binary name (`gocyclo`)
    pub binary_name: String,
    /// `-top` value for FULL mode
    pub top: usize,
    /// `-ignore` pattern for FULL mode
    pub ignore: Option<String>,
    /// Per-invocation timeout (zero = none)
    pub timeout: Duration,
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("gocyclo"),
            binary_name: "gocyclo".to_string(),
            top: 10_000,
            ignore: Some("_test.go".to_string()),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Build the analyzer argument list for a request.
///
/// AVERAGE: `-avg <path>`; FULL: `-top <N> [-ignore <pattern>] <path>`.
pub fn build_args(request: &AnalysisRequest, settings: &InvokerSettings) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    match request.mode {
        AnalysisMode::Average => args.push("-avg".into()),
        AnalysisMode::Full => {
            args.push("-top".into());
            args.push(settings.top.to_string().into());
            if let Some(pattern) = settings.ignore.as_deref().filter(|p| !p.is_empty()) {
                args.push("-ignore".into());
                args.push(pattern.into());
            }
        }
    }
    args.push(request.target.clone().into_os_string());
    args
}

/// Host platform identifier, spelled the way bundled analyzer binaries are
/// named (`gocyclo-linux`, `gocyclo-darwin`, `gocyclo-win32`, ...).
pub fn platform_id() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Resolve the analyzer executable once, at startup.
///
/// Order: an explicit path, then `<bundle_dir>/<name>-<platform>` under each
/// search root, then the bare name (left for the OS to find on `PATH`).
pub fn resolve_executable(
    explicit: Option<&Path>,
    binary_name: &str,
    bundle_dir: &Path,
    search_roots: &[PathBuf],
) -> PathBuf {
    if let Some(path) = explicit {
        debug!("Using explicit analyzer path {}", path.display());
        return path.to_path_buf();
    }

    let mut file_name = format!("{}-{}", binary_name, platform_id());
    if cfg!(windows) {
        file_name.push_str(".exe");
    }

    for root in search_roots {
        let candidate = root.join(bundle_dir).join(&file_name);
        if candidate.is_file() {
            debug!("Using bundled analyzer {}", candidate.display());
            return candidate;
        }
    }

    debug!("No bundled analyzer found, falling back to {} on PATH", binary_name);
    PathBuf::from(binary_name)
}

/// Runs the analyzer as a child process
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    settings: Arc<InvokerSettings>,
    executable: Arc<Mutex<PathBuf>>,
}

impl ProcessInvoker {
    pub fn new(settings: InvokerSettings) -> Self {
        let executable = Arc::new(Mutex::new(settings.executable.clone()));
        Self {
            settings: Arc::new(settings),
            executable,
        }
    }

    /// Executable currently in use
    pub fn executable(&self) -> PathBuf {
        self.executable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn settings(&self) -> &InvokerSettings {
        &self.settings
    }
}

impl Invoker for ProcessInvoker {
    fn invoke(&self, request: &AnalysisRequest) -> impl Future<Output = InvocationResult> + Send {
        let program = self.executable();
        let args = build_args(request, &self.settings);
        let timeout = self.settings.timeout;
        async move { run_analyzer(program, args, timeout).await }
    }

    /// Look the binary up on `PATH` and switch to it if it differs from
    /// the executable that just went missing.
    fn recover(&self) -> bool {
        let found = match which::which(&self.settings.binary_name) {
            Ok(found) => found,
            Err(e) => {
                warn!("{} is not on PATH either: {}", self.settings.binary_name, e);
                return false;
            }
        };

        let mut current = self.executable.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == found {
            return false;
        }
        info!(
            "Switching analyzer from {} to {}",
            current.display(),
            found.display()
        );
        *current = found;
        true
    }

    fn binary_name(&self) -> &str {
        &self.settings.binary_name
    }
}

/// Spawn the analyzer and collect its output
async fn run_analyzer(program: PathBuf, args: Vec<OsString>, timeout: Duration) -> InvocationResult {
    debug!("Running {} {:?}", program.display(), args);

    let mut command = Command::new(&program);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return InvocationResult::spawn_failure(&program, &e),
    };

    let waited = if timeout.is_zero() {
        child.wait_with_output().await
    } else {
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(waited) => waited,
            Err(_) => {
                warn!("{} timed out after {:?}", program.display(), timeout);
                return InvocationResult::timed_out(&program, timeout);
            }
        }
    };

    let output = match waited {
        Ok(output) => output,
        Err(e) => return InvocationResult::spawn_failure(&program, &e),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let exit_error = if output.status.success() {
        None
    } else {
        let message = match stderr.trim() {
            "" => format!("{} exited with {}", program.display(), output.status),
            text => text.to_string(),
        };
        Some(ExitError::new(output.status.code(), message))
    };

    InvocationResult {
        stdout,
        stderr,
        exit_error,
    }
}
