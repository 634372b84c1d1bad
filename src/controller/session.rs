//! Long-running session behind `cyclolens watch`
//!
//! Owns the controller, the editor context and the background work: at
//! most one indicator invocation plus any number of on-demand reports.
//! Callers feed it [`SessionEvent`]s and poll [`WatchSession::process_next`]
//! for completions.

use super::{Controller, EditorContext, Trigger};
use crate::analyzer::{run_details, AnalysisResult, ExitError, InvocationResult, Invoker};
use crate::models::{AnalysisRequest, DetailedAnalysis};
use crate::presentation::{Indicator, Panel};
use crate::reporters;
use crate::scoring::Scale;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Directories whose changes never reach the controller
const IGNORED_DIRS: &[&str] = &[".git", "vendor", "node_modules", "target"];

/// Something that happened in the editor or on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A file under the workspace was created or written
    FileChanged(PathBuf),
    /// The user switched to this file
    Open(PathBuf),
    /// Flip the indicator
    Toggle,
    /// Average for the workspace
    Average,
    /// Full report for the given file, else the active file, else the workspace
    Details(Option<PathBuf>),
    /// Full report for the workspace
    RunWorkspace,
}

type DetailsOutcome = (PathBuf, AnalysisResult<DetailedAnalysis>);

pub struct WatchSession<I, D: Indicator, P> {
    controller: Controller<D>,
    ctx: EditorContext,
    workspace: PathBuf,
    invoker: I,
    scale: Scale,
    panel: P,
    in_flight: Option<JoinHandle<InvocationResult>>,
    details: JoinSet<DetailsOutcome>,
}

impl<I, D, P> WatchSession<I, D, P>
where
    I: Invoker + Clone + 'static,
    D: Indicator,
    P: Panel,
{
    pub fn new(
        controller: Controller<D>,
        workspace: PathBuf,
        active_file: Option<PathBuf>,
        invoker: I,
        scale: Scale,
        panel: P,
    ) -> Self {
        let ctx = EditorContext {
            active_file,
            workspace: Some(workspace.clone()),
        };
        Self {
            controller,
            ctx,
            workspace,
            invoker,
            scale,
            panel,
            in_flight: None,
            details: JoinSet::new(),
        }
    }

    /// Initial analysis: the active file if there is one, else the workspace.
    pub fn start(&mut self, now: Instant) {
        let trigger = if self.ctx.active_file.is_some() {
            Trigger::EditorChanged
        } else {
            Trigger::Command
        };
        self.trigger(trigger, now);
    }

    pub fn handle(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::FileChanged(path) => {
                if is_ignored_path(&path, &self.workspace) || !path.is_file() {
                    return;
                }
                let trigger = if self.ctx.active_file.as_deref() == Some(path.as_path()) {
                    Trigger::DocumentChanged
                } else {
                    debug!("Active file is now {}", path.display());
                    self.ctx.active_file = Some(path);
                    Trigger::EditorChanged
                };
                self.trigger(trigger, now);
            }
            SessionEvent::Open(path) => {
                self.ctx.active_file = Some(path);
                self.trigger(Trigger::EditorChanged, now);
            }
            SessionEvent::Toggle => {
                if let Some(request) = self.controller.toggle(&self.ctx, now) {
                    self.spawn_invocation(request);
                }
            }
            SessionEvent::Average => self.trigger(Trigger::Command, now),
            SessionEvent::Details(target) => {
                let target = target
                    .or_else(|| self.ctx.active_file.clone())
                    .unwrap_or_else(|| self.workspace.clone());
                self.spawn_details(target);
            }
            SessionEvent::RunWorkspace => self.spawn_details(self.workspace.clone()),
        }
    }

    /// Wait for the next background task and apply its result. Never
    /// completes while nothing is running. Cancel-safe.
    pub async fn process_next(&mut self) {
        tokio::select! {
            result = join_in_flight(&mut self.in_flight) => {
                self.in_flight = None;
                if let Some(retry) = self.controller.complete_with(&self.invoker, result) {
                    self.spawn_invocation(retry);
                }
            }
            Some(joined) = self.details.join_next() => self.show_details(joined),
        }
    }

    /// Drop the indicator run and let every pending report finish rendering.
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            debug!("Abandoning indicator analysis");
            handle.abort();
        }
        if !self.details.is_empty() {
            info!("Waiting for {} report(s) to finish", self.details.len());
        }
        while let Some(joined) = self.details.join_next().await {
            self.show_details(joined);
        }
    }

    fn trigger(&mut self, trigger: Trigger, now: Instant) {
        if let Some(request) = self.controller.on_trigger(trigger, &self.ctx, now) {
            self.spawn_invocation(request);
        }
    }

    fn spawn_invocation(&mut self, request: AnalysisRequest) {
        let invoker = self.invoker.clone();
        self.in_flight = Some(tokio::spawn(async move { invoker.invoke(&request).await }));
    }

    fn spawn_details(&mut self, target: PathBuf) {
        info!("Full analysis of {}", target.display());
        let invoker = self.invoker.clone();
        let scale = self.scale;
        self.details.spawn(async move {
            let outcome = run_details(&invoker, &target, scale).await;
            (target, outcome)
        });
    }

    fn show_details(&mut self, joined: Result<DetailsOutcome, JoinError>) {
        let rendered = match joined {
            Ok((_, Ok(details))) => {
                reporters::render_report(&details.records, details.average.as_ref())
            }
            Ok((target, Err(e))) => {
                warn!("Analysis of {} failed: {}", target.display(), e);
                format!("Analysis of {} failed: {}", target.display(), e)
            }
            Err(e) => {
                warn!("Report task did not finish: {}", e);
                return;
            }
        };
        reporters::present(&mut self.panel, &rendered);
    }
}

/// Await the in-flight invocation; pending forever when there is none.
async fn join_in_flight(in_flight: &mut Option<JoinHandle<InvocationResult>>) -> InvocationResult {
    let Some(handle) = in_flight.as_mut() else {
        return std::future::pending().await;
    };
    match handle.await {
        Ok(result) => result,
        Err(e) => InvocationResult::failed(ExitError::new(None, format!("analysis task failed: {}", e))),
    }
}

/// Check if a path should be ignored (VCS, vendored, build output, hidden
/// or editor backup)
fn is_ignored_path(path: &Path, workspace: &Path) -> bool {
    let rel = path.strip_prefix(workspace).unwrap_or(path);

    let backup = rel
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with('~'));

    backup
        || rel.components().any(|c| match c {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                name.starts_with('.') || IGNORED_DIRS.contains(&name.as_ref())
            }
            _ => false,
        })
}
