//! # Autoclean - fetch a shared CSV and resolve its missing values
//!
//! Autoclean takes a shareable cloud-storage link, downloads the CSV behind it,
//! reports on its shape and fills or drops missing values in numeric columns,
//! one strategy per column.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Share link  │────▶│   Loader    │────▶│   Impute    │────▶│ cleaned CSV │
//! │  (file id)  │     │ (auto-enc)  │     │ (per column)│     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use autoclean::{clean_link, CleanOptions, PresetStrategies, Strategy};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut presets = PresetStrategies::new().with_default(Some(Strategy::Mean));
//!     let result = clean_link("https://drive.google.com/file/d/<id>/view", &mut presets, &CleanOptions::default())
//!         .await
//!         .unwrap();
//!     println!("{} rows left", result.cleaned_info.rows);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`models`] - Cells, columns, datasets and strategies
//! - [`normalize`] - Single-cell value normalizers
//! - [`link`] - Share link to download URL
//! - [`parser`] - CSV parsing with auto-detection, and serialization
//! - [`loader`] - HTTP download
//! - [`inspect`] - Dataset summary and preview
//! - [`config`] - Environment settings
//! - [`transform`] - Missing-value resolution and pipeline
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Input
pub mod link;
pub mod loader;
pub mod parser;

// Cleaning
pub mod inspect;
pub mod normalize;
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    CsvError,
    ImputeError,
    LinkError,
    LoadError,
    PipelineError,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, Column, ColumnType, Dataset, Strategy};

// =============================================================================
// Re-exports - Input
// =============================================================================

pub use config::Settings;
pub use link::{resolve_link, DriveLink};
pub use loader::{fetch_bytes, load_dataset};
pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_csv_file_auto,
    parse_dataset,
    to_csv_string,
    ParseResult,
};

// =============================================================================
// Re-exports - Cleaning
// =============================================================================

pub use inspect::{preview_rows, render_preview, ColumnSummary, DatasetInfo};
pub use normalize::{clean_thousands_and_units, convert_ratio, is_not_numeric, replace_symbol};
pub use transform::impute::{
    pending_columns,
    resolve_missing,
    ColumnResolution,
    ResolutionReport,
    StrategyProvider,
    StrategyRequest,
};
pub use transform::provider::{PresetStrategies, PromptStrategies};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    clean_bytes,
    clean_file,
    clean_link,
    inspect_file,
    inspect_link,
    CleanOptions,
    CleanResult,
    Inspection,
    PendingColumn,
    CLEANED_FILE_NAME,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CleanRequest, CleanResponse, InspectRequest};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
