//! `cyclolens watch` - live indicator on file changes
//!
//! Watches the workspace and feeds a [`WatchSession`]: saving the active
//! file is a document change (debounced by the controller), saving any
//! other file makes it the active file. Commands typed on stdin stand in
//! for editor commands.

use super::{runtime, Session};
use anyhow::Result;
use console::style;
use cyclolens::controller::{Controller, ControllerState, SessionEvent, WatchSession};
use cyclolens::presentation::{TerminalIndicator, TerminalPanel};
use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// File-system events are coalesced for this long before they reach the
/// controller, which applies its own, longer debounce.
const FS_EVENT_DELAY: Duration = Duration::from_millis(100);

/// A line typed on stdin while watching
#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchCommand {
    Toggle,
    Average,
    /// Report for a path, or for the active file
    Details(Option<PathBuf>),
    /// Report for the whole workspace
    Run,
    Open(PathBuf),
    Help,
    Quit,
    Unknown(String),
}

impl WatchCommand {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        Some(match word {
            "toggle" | "t" => Self::Toggle,
            "avg" | "a" => Self::Average,
            "details" | "d" => Self::Details((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "run" | "r" => Self::Run,
            "open" | "o" if !rest.is_empty() => Self::Open(PathBuf::from(rest)),
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        })
    }
}

pub fn run(session: &Session, file: Option<&Path>, hidden: bool, no_emoji: bool) -> Result<()> {
    let rt = runtime()?;
    let outcome = rt.block_on(watch_loop(session, file, hidden, no_emoji));
    // A pending stdin read would otherwise hold the runtime open
    rt.shutdown_background();
    outcome
}

async fn watch_loop(
    session: &Session,
    file: Option<&Path>,
    hidden: bool,
    no_emoji: bool,
) -> Result<()> {
    let workspace = session.workspace.clone();

    let active_file = match file {
        Some(file) => match resolve_file(&workspace, file) {
            Some(path) if path.is_file() => Some(path),
            _ => anyhow::bail!("File does not exist: {}", file.display()),
        },
        None => session.editor_context().active_file,
    };

    let icon = if no_emoji { "" } else { "👁️  " };
    println!(
        "\n{}Watching {} for changes...\n",
        style(icon).bold(),
        style(workspace.display()).cyan()
    );
    println!("  {} Save a file to refresh the indicator", style("→").dim());
    println!("  {} Type `help` for commands, Ctrl+C to stop\n", style("→").dim());

    let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();
    let mut debouncer = new_debouncer(FS_EVENT_DELAY, None, move |result: DebounceEventResult| {
        match result {
            Ok(events) => {
                for event in events {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        continue;
                    }
                    for path in &event.paths {
                        let _ = tx.send(path.clone());
                    }
                }
            }
            Err(errors) => {
                for e in errors {
                    warn!("Watch error: {}", e);
                }
            }
        }
    })?;
    debouncer.watch(&workspace, RecursiveMode::Recursive)?;

    let state = ControllerState::new(Instant::now())
        .with_indicator(!hidden && session.config.show_indicator());
    let controller = Controller::new(
        state,
        TerminalIndicator::live(no_emoji),
        session.config.controller_settings(),
    );
    let mut watch = WatchSession::new(
        controller,
        workspace.clone(),
        active_file,
        session.invoker.clone(),
        session.config.remark_scale(),
        TerminalPanel::new(),
    );
    watch.start(Instant::now());

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = watch.process_next() => {}

            Some(path) = rx.recv() => watch.handle(SessionEvent::FileChanged(path), Instant::now()),

            line = stdin.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        debug!("stdin closed, watching files only");
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                        continue;
                    }
                };
                let Some(command) = WatchCommand::parse(&line) else {
                    continue;
                };

                let event = match command {
                    WatchCommand::Toggle => SessionEvent::Toggle,
                    WatchCommand::Average => SessionEvent::Average,
                    WatchCommand::Details(None) => SessionEvent::Details(None),
                    WatchCommand::Details(Some(path)) => match resolve_file(&workspace, &path) {
                        Some(path) => SessionEvent::Details(Some(path)),
                        None => {
                            not_found(&path);
                            continue;
                        }
                    },
                    WatchCommand::Run => SessionEvent::RunWorkspace,
                    WatchCommand::Open(path) => match resolve_file(&workspace, &path) {
                        Some(path) => SessionEvent::Open(path),
                        None => {
                            not_found(&path);
                            continue;
                        }
                    },
                    WatchCommand::Help => {
                        print_help();
                        continue;
                    }
                    WatchCommand::Quit => break,
                    WatchCommand::Unknown(text) => {
                        println!(
                            "  {} Unknown command '{}', type `help`",
                            style("?").yellow(),
                            text
                        );
                        continue;
                    }
                };
                watch.handle(event, Instant::now());
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    watch.shutdown().await;
    println!("\n{} Stopped watching.", style("✓").green());
    Ok(())
}

fn not_found(path: &Path) {
    println!("  {} No such file: {}", style("?").yellow(), path.display());
}

fn print_help() {
    println!("  {}", style("Commands:").bold());
    println!("    toggle (t)          Show or hide the indicator");
    println!("    avg (a)             Average for the whole workspace");
    println!("    details [path] (d)  Per-function report for a path or the active file");
    println!("    run (r)             Per-function report for the workspace");
    println!("    open <file> (o)     Make <file> the active file");
    println!("    quit (q)            Stop watching");
}

/// Resolve a user-supplied path: absolute as given, else against the
/// current directory, else against the workspace. `None` when nothing
/// exists there.
fn resolve_file(workspace: &Path, file: &Path) -> Option<PathBuf> {
    if file.is_absolute() {
        return file.canonicalize().ok();
    }
    file.canonicalize()
        .or_else(|_| workspace.join(file).canonicalize())
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(WatchCommand::parse("toggle"), Some(WatchCommand::Toggle));
        assert_eq!(WatchCommand::parse(" t "), Some(WatchCommand::Toggle));
        assert_eq!(WatchCommand::parse("avg"), Some(WatchCommand::Average));
        assert_eq!(WatchCommand::parse("run"), Some(WatchCommand::Run));
        assert_eq!(WatchCommand::parse("details"), Some(WatchCommand::Details(None)));
        assert_eq!(WatchCommand::parse("d"), Some(WatchCommand::Details(None)));
        assert_eq!(
            WatchCommand::parse("details pkg/util.go"),
            Some(WatchCommand::Details(Some(PathBuf::from("pkg/util.go"))))
        );
        assert_eq!(
            WatchCommand::parse("open src/main.go"),
            Some(WatchCommand::Open(PathBuf::from("src/main.go")))
        );
        assert_eq!(WatchCommand::parse("q"), Some(WatchCommand::Quit));
        assert_eq!(WatchCommand::parse(""), None);
    }

    #[test]
    fn test_open_without_file_is_unknown() {
        assert_eq!(
            WatchCommand::parse("open"),
            Some(WatchCommand::Unknown("open".to_string()))
        );
    }

    #[test]
    fn test_resolve_file_falls_back_to_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().canonicalize().unwrap();
        std::fs::write(ws.join("cyclolens_resolve_only.go"), "package main\n").unwrap();

        assert_eq!(
            resolve_file(&ws, Path::new("cyclolens_resolve_only.go")),
            Some(ws.join("cyclolens_resolve_only.go"))
        );
        assert_eq!(
            resolve_file(&ws, &ws.join("cyclolens_resolve_only.go")),
            Some(ws.join("cyclolens_resolve_only.go"))
        );
        assert_eq!(resolve_file(&ws, Path::new("missing.go")), None);
    }

    #[test]
    fn test_resolve_file_prefers_current_dir() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().canonicalize().unwrap();
        std::fs::write(ws.join("Cargo.toml"), "").unwrap();

        assert_eq!(
            resolve_file(&ws, Path::new("Cargo.toml")),
            Some(cwd.join("Cargo.toml"))
        );
    }
}
