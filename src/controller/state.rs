//! Session state owned by the analysis controller

use crate::models::AverageScore;
use std::time::Instant;

/// Mutable state of one session. Lives as long as the process; nothing is
/// persisted across restarts.
#[derive(Debug, Clone)]
pub struct ControllerState {
    /// When the last analysis was started; only used for debouncing
    pub last_updated: Instant,
    /// Indicator toggle
    pub show_indicator: bool,
    /// Most recent successful average, possibly stale
    pub average: Option<AverageScore>,
}

impl ControllerState {
    pub fn new(now: Instant) -> Self {
        Self {
            last_updated: now,
            show_indicator: true,
            average: None,
        }
    }

    pub fn with_indicator(mut self, show: bool) -> Self {
        self.show_indicator = show;
        self
    }
}
