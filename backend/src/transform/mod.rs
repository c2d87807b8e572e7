//! Cleaning module.
//!
//! This module handles missing values in loaded datasets:
//! - Impute: the resolution engine and the `StrategyProvider` seam
//! - Provider: preset and interactive strategy sources
//! - Pipeline: link → dataset → cleaned CSV

pub mod impute;
pub mod pipeline;
pub mod provider;

pub use impute::{pending_columns, resolve_missing, ColumnResolution, ResolutionReport, StrategyProvider, StrategyRequest};
pub use pipeline::*;
pub use provider::{PresetStrategies, PromptStrategies};
