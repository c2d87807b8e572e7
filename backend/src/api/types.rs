//! REST API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::inspect::DatasetInfo;
use crate::link::DriveLink;
use crate::models::Strategy;
use crate::transform::impute::ColumnResolution;
use crate::transform::pipeline::{CleanResult, CLEANED_FILE_NAME};
use crate::transform::provider::PresetStrategies;

/// Body of `POST /api/inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectRequest {
    pub link: String,
    #[serde(default)]
    pub delimiter: Option<char>,
}

/// Body of `POST /api/clean` and `POST /api/clean/download`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanRequest {
    pub link: String,

    /// Column → strategy
    #[serde(default)]
    pub strategies: HashMap<String, Strategy>,

    /// Used for columns missing from `strategies`
    #[serde(default)]
    pub default_strategy: Option<Strategy>,

    #[serde(default)]
    pub delimiter: Option<char>,
}

impl CleanRequest {
    pub fn presets(&self) -> PresetStrategies {
        PresetStrategies::from_map(self.strategies.clone()).with_default(self.default_strategy)
    }
}

/// Response of `POST /api/clean`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanResponse {
    /// Always "ok"; errors use [`error_response`]
    pub status: String,
    pub source: Option<DriveLink>,
    pub info: DatasetInfo,
    pub resolutions: Vec<ColumnResolution>,
    pub cleaned_info: DatasetInfo,
    pub preview: Vec<Vec<String>>,
    pub file_name: String,
    pub csv: String,
}

impl CleanResponse {
    pub fn new(result: CleanResult, preview_rows: usize) -> Self {
        let preview = result.preview(preview_rows);
        Self {
            status: "ok".to_string(),
            source: result.source,
            info: result.info,
            resolutions: result.report.resolutions,
            cleaned_info: result.cleaned_info,
            preview,
            file_name: CLEANED_FILE_NAME.to_string(),
            csv: result.csv,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
