//! Configuration module for Cyclolens
//!
//! This module handles:
//! - Project-level configuration (cyclolens.toml)
//! - Analyzer resolution settings
//! - Watch and report defaults

mod project_config;

pub use project_config::{
    example_config,
    load_project_config,
    AnalyzerConfig,
    ProjectConfig,
    ReportConfig,
    WatchConfig,
    CONFIG_FILE_NAME,
};
