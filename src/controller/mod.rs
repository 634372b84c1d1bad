//! Analysis controller
//!
//! Decides when the analyzer runs for the status indicator, interprets
//! each completion, and keeps the indicator in step with the results.
//!
//! The controller is synchronous: [`Controller::on_trigger`] and
//! [`Controller::on_completion`] return the next request to run, if any,
//! and the caller awaits the invocation. [`Controller::drive`] does this
//! for a single trigger; [`WatchSession`] interleaves it with file events,
//! editor commands and on-demand reports.
//!
//! ```text
//!   Idle --trigger--> Running --success / bad output / unknown failure--> Idle
//!                        |
//!                   binary missing
//!                        v
//!                     Retrying --any completion--> Idle
//! ```

mod session;
mod state;

pub use session::{SessionEvent, WatchSession};
pub use state::ControllerState;

use crate::analyzer::{
    classify_failure, parse_average, recover_before_retry, FailureKind, InvocationResult, Invoker,
};
use crate::models::{AnalysisRequest, AverageScore};
use crate::presentation::Indicator;
use crate::scoring::{classify, Scale};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default minimum gap between document-change analyses
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Controller lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Retrying,
}

/// What asked for an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Explicit user command; targets the workspace folder
    Command,
    /// A different file became active
    EditorChanged,
    /// The active file was edited; debounced
    DocumentChanged,
}

/// Where the user currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorContext {
    pub active_file: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub debounce: Duration,
    /// Source extension the indicator is shown for, without the dot
    pub extension: String,
    pub binary_name: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            extension: "go".to_string(),
            binary_name: "gocyclo".to_string(),
        }
    }
}

/// Indicator line for an average score
pub fn indicator_text(average: &AverageScore) -> String {
    let remark = average
        .value
        .and_then(|v| classify(v, Scale::Cyclomatic).ok())
        .map(|r| format!(" ({})", r))
        .unwrap_or_default();
    format!("Average Cyclomatic: {}{}", average, remark)
}

pub struct Controller<D: Indicator> {
    state: ControllerState,
    phase: Phase,
    pending: Option<AnalysisRequest>,
    indicator: D,
    settings: ControllerSettings,
}

impl<D: Indicator> Controller<D> {
    pub fn new(state: ControllerState, indicator: D, settings: ControllerSettings) -> Self {
        Self {
            state,
            phase: Phase::Idle,
            pending: None,
            indicator,
            settings,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn average(&self) -> Option<&AverageScore> {
        self.state.average.as_ref()
    }

    pub fn indicator(&self) -> &D {
        &self.indicator
    }

    /// Flip the indicator toggle and re-evaluate for the active file.
    pub fn toggle(&mut self, ctx: &EditorContext, now: Instant) -> Option<AnalysisRequest> {
        self.state.show_indicator = !self.state.show_indicator;
        info!(
            "Indicator {}",
            if self.state.show_indicator { "enabled" } else { "disabled" }
        );
        self.on_trigger(Trigger::EditorChanged, ctx, now)
    }

    /// Visibility gate. Hides the indicator and returns `false` when the
    /// toggle is off or the active file is not a source file of the
    /// configured language.
    pub fn indicator_allowed(&mut self, ctx: &EditorContext) -> bool {
        if !self.state.show_indicator {
            self.indicator.hide();
            return false;
        }

        if let Some(file) = &ctx.active_file {
            if !self.matches_extension(file) {
                self.indicator.hide();
                return false;
            }
        }
        true
    }

    fn matches_extension(&self, file: &Path) -> bool {
        file.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == self.settings.extension)
    }

    /// Handle a trigger. Returns the AVERAGE request to run, or `None` when
    /// the trigger is debounced, gated, or an analysis is already in flight.
    pub fn on_trigger(
        &mut self,
        trigger: Trigger,
        ctx: &EditorContext,
        now: Instant,
    ) -> Option<AnalysisRequest> {
        if trigger == Trigger::DocumentChanged
            && now.saturating_duration_since(self.state.last_updated) < self.settings.debounce
        {
            debug!("Document change inside debounce window, skipping");
            return None;
        }

        if self.phase != Phase::Idle {
            debug!("Analysis already {:?}, dropping {:?}", self.phase, trigger);
            return None;
        }

        if !self.indicator_allowed(ctx) {
            return None;
        }

        let target = match trigger {
            Trigger::Command => ctx.workspace.as_ref().or(ctx.active_file.as_ref()),
            Trigger::EditorChanged | Trigger::DocumentChanged => ctx.active_file.as_ref(),
        };
        let Some(target) = target else {
            debug!("No target for {:?}", trigger);
            return None;
        };

        let request = AnalysisRequest::average(target.clone());
        self.state.last_updated = now;
        self.phase = Phase::Running;
        self.pending = Some(request.clone());
        Some(request)
    }

    /// Handle the completion of the in-flight invocation. Returns the retry
    /// request when the binary was missing on the first attempt.
    pub fn on_completion(&mut self, result: InvocationResult) -> Option<AnalysisRequest> {
        let retrying = match self.phase {
            Phase::Idle => {
                warn!("Completion received with no analysis in flight");
                return None;
            }
            Phase::Running => false,
            Phase::Retrying => true,
        };

        if let Some(exit_error) = &result.exit_error {
            match classify_failure(Some(exit_error), &self.settings.binary_name) {
                FailureKind::BinaryNotFound if !retrying => {
                    warn!("{} not found, retrying once: {}", self.settings.binary_name, exit_error);
                    self.phase = Phase::Retrying;
                    return self.pending.clone();
                }
                FailureKind::BinaryNotFound => {
                    warn!("{} still not found: {}", self.settings.binary_name, exit_error);
                    self.indicator.hide();
                }
                FailureKind::Unknown => {
                    warn!("Analyzer failed: {}", exit_error);
                }
            }
            self.finish();
            return None;
        }

        match parse_average(&result.stdout) {
            Ok(average) => {
                self.indicator.set_text(&indicator_text(&average));
                if self.state.show_indicator {
                    self.indicator.show();
                }
                self.state.average = Some(average);
            }
            Err(e) => {
                warn!("Error while parsing the output for average complexity: {}", e);
                self.indicator.hide();
            }
        }
        self.finish();
        None
    }

    fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.pending = None;
    }

    /// [`Controller::on_completion`], followed by the invoker's recovery
    /// step when a retry is due. Every driver feeds completions through here.
    pub fn complete_with<I: Invoker>(
        &mut self,
        invoker: &I,
        result: InvocationResult,
    ) -> Option<AnalysisRequest> {
        let retry = self.on_completion(result)?;
        recover_before_retry(invoker);
        Some(retry)
    }

    /// Run one trigger to completion, including the single retry.
    /// Returns the number of invocations made.
    pub async fn drive<I: Invoker>(
        &mut self,
        invoker: &I,
        trigger: Trigger,
        ctx: &EditorContext,
        now: Instant,
    ) -> usize {
        let mut invocations = 0;
        let mut next = self.on_trigger(trigger, ctx, now);
        while let Some(request) = next {
            invocations += 1;
            let result = invoker.invoke(&request).await;
            next = self.complete_with(invoker, result);
        }
        invocations
    }
}
