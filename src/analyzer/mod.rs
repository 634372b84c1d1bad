//! Running the external complexity analyzer
//!
//! The analyzer (`gocyclo`) is an opaque binary. This module knows how to
//! build its command line, run it without blocking, read its JSON output,
//! and tell a missing binary apart from any other failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use cyclolens::analyzer::{Invoker, ProcessInvoker};
//! use cyclolens::models::AnalysisRequest;
//!
//! let invoker = ProcessInvoker::new(settings);
//! let result = invoker.invoke(&AnalysisRequest::average("main.go")).await;
//! let average = cyclolens::analyzer::parse_average(&result.stdout)?;
//! ```

mod failure;
mod invoker;
mod output;

pub use failure::{classify_failure, FailureKind};
pub use invoker::{
    build_args, platform_id, resolve_executable, ExitError, InvocationResult, Invoker,
    InvokerSettings, ProcessInvoker,
};
pub use output::{parse_average, parse_records};

use crate::models::{AnalysisRecord, AnalysisRequest, DetailedAnalysis};
use crate::scoring::Scale;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while analyzing
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analyzer binary not found: {0}")]
    BinaryNotFound(String),

    #[error("Malformed analyzer output: {0}")]
    MalformedOutput(String),

    #[error("Analyzer failed: {0}")]
    UnknownProcessFailure(String),

    #[error("Invalid score {0}: scores must be finite and at least 1")]
    InvalidScore(f64),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Turn a finished invocation into a typed failure, if it failed.
pub fn failure_of(result: &InvocationResult, binary_name: &str) -> Option<AnalysisError> {
    let exit_error = result.exit_error.as_ref()?;
    Some(match classify_failure(Some(exit_error), binary_name) {
        FailureKind::BinaryNotFound => AnalysisError::BinaryNotFound(exit_error.message.clone()),
        FailureKind::Unknown => AnalysisError::UnknownProcessFailure(exit_error.message.clone()),
    })
}

/// Give the invoker its one chance to repair a missing binary before the
/// retry.
pub fn recover_before_retry<I: Invoker>(invoker: &I) {
    if invoker.recover() {
        info!("Recovered {} before retry", invoker.binary_name());
    }
}

/// Run the analyzer in FULL mode on `target` and return its records in
/// emitted order.
///
/// A missing binary gets one recovery attempt followed by exactly one
/// retry. Any other failure is returned as is.
pub async fn run_full_analysis<I: Invoker>(
    invoker: &I,
    target: &Path,
    scale: Scale,
) -> AnalysisResult<Vec<AnalysisRecord>> {
    let request = AnalysisRequest::full(target);
    let mut result = invoker.invoke(&request).await;

    if let Some(AnalysisError::BinaryNotFound(message)) = failure_of(&result, invoker.binary_name()) {
        warn!("{} not found ({}), retrying once", invoker.binary_name(), message);
        recover_before_retry(invoker);
        result = invoker.invoke(&request).await;
    }

    if let Some(err) = failure_of(&result, invoker.binary_name()) {
        return Err(err);
    }

    parse_records(&result.stdout, scale)
}

/// FULL analysis of `target` alongside an AVERAGE run for the report header.
///
/// Only the FULL result decides success; a failed average leaves the header
/// without a value.
pub async fn run_details<I: Invoker>(
    invoker: &I,
    target: &Path,
    scale: Scale,
) -> AnalysisResult<DetailedAnalysis> {
    let average_request = AnalysisRequest::average(target);
    let (average_result, records) = tokio::join!(
        invoker.invoke(&average_request),
        run_full_analysis(invoker, target, scale)
    );
    let records = records?;

    let average = match failure_of(&average_result, invoker.binary_name()) {
        Some(e) => {
            warn!("Average for report header unavailable: {}", e);
            None
        }
        None => match parse_average(&average_result.stdout) {
            Ok(average) => Some(average),
            Err(e) => {
                warn!("Error while parsing the output for average complexity: {}", e);
                None
            }
        },
    };

    Ok(DetailedAnalysis { records, average })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted invoker shared by unit tests

    use super::*;
    use crate::models::AnalysisMode;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays canned results. FULL requests use their own queue when one
    /// was given, so concurrent AVERAGE and FULL runs stay deterministic.
    #[derive(Clone, Default)]
    pub struct ScriptedInvoker {
        results: Arc<Mutex<VecDeque<InvocationResult>>>,
        full_results: Option<Arc<Mutex<VecDeque<InvocationResult>>>>,
        pub requests: Arc<Mutex<Vec<AnalysisRequest>>>,
        pub recoveries: Arc<AtomicUsize>,
    }

    impl ScriptedInvoker {
        pub fn new(results: Vec<InvocationResult>) -> Self {
            Self {
                results: Arc::new(Mutex::new(results.into())),
                ..Default::default()
            }
        }

        pub fn with_full_results(mut self, results: Vec<InvocationResult>) -> Self {
            self.full_results = Some(Arc::new(Mutex::new(results.into())));
            self
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requested(&self) -> Vec<AnalysisRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Invoker for ScriptedInvoker {
        fn invoke(&self, request: &AnalysisRequest) -> impl Future<Output = InvocationResult> + Send {
            self.requests.lock().unwrap().push(request.clone());
            let queue = match (&self.full_results, request.mode) {
                (Some(full), AnalysisMode::Full) => full,
                _ => &self.results,
            };
            let next = queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| InvocationResult::ok(""));
            async move { next }
        }

        fn recover(&self) -> bool {
            self.recoveries.fetch_add(1, Ordering::SeqCst);
            false
        }

        fn binary_name(&self) -> &str {
            "gocyclo"
        }
    }

    pub fn average(value: &str) -> InvocationResult {
        InvocationResult::ok(format!("{{\"average\": {}}}", value))
    }

    pub fn missing_binary() -> InvocationResult {
        InvocationResult::failed(ExitError::new(None, "sh: gocyclo: command not found"))
    }
}
