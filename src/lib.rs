//! Cyclolens - complexity status for Go code
//!
//! Runs the external `gocyclo` analyzer, turns its JSON output into
//! severity remarks and reports, and keeps a status indicator in sync
//! with file edits.

pub mod analyzer;
pub mod config;
pub mod controller;
pub mod models;
pub mod presentation;
pub mod reporters;
pub mod scoring;

pub use analyzer::AnalysisError;
