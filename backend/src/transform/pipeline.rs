//! High-level cleaning pipeline.
//!
//! Combines all steps: link resolution, download, parsing, inspection,
//! missing-value resolution and CSV serialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use autoclean::{clean_link, CleanOptions, PresetStrategies, Strategy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut presets = PresetStrategies::new().with_default(Some(Strategy::Median));
//!     let result = clean_link(
//!         "https://drive.google.com/file/d/1AbCdEfGhIjKlMnOpQrStUvWxYz123456/view",
//!         &mut presets,
//!         &CleanOptions::default(),
//!     )
//!     .await?;
//!
//!     std::fs::write("cleaned_data.csv", result.csv)?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::config::{Settings, DEFAULT_PREVIEW_ROWS, DEFAULT_TIMEOUT_SECS};
use crate::error::{LoadError, PipelineResult};
use crate::inspect::{preview_rows, DatasetInfo};
use crate::link::{resolve_link, DriveLink};
use crate::loader::load_dataset;
use crate::models::{format_float, Dataset, Strategy};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, to_csv_string, ParseResult};

use super::impute::{pending_columns, resolve_missing, ResolutionReport, StrategyProvider};

/// Name offered for the cleaned download.
pub const CLEANED_FILE_NAME: &str = "cleaned_data.csv";

/// MIME type of the cleaned download.
pub const CLEANED_MIME: &str = "text/csv";

/// Options for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanOptions {
    /// Download timeout in seconds
    pub timeout_secs: u64,

    /// Rows included in previews
    pub preview_rows: usize,

    /// Force a delimiter instead of detecting it
    pub delimiter: Option<char>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            delimiter: None,
        }
    }
}

impl From<&Settings> for CleanOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            timeout_secs: settings.timeout_secs,
            preview_rows: settings.preview_rows,
            delimiter: None,
        }
    }
}

/// A numeric column that will need a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingColumn {
    pub column: String,
    pub missing: usize,
}

/// What a dataset looks like before cleaning.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub source: Option<DriveLink>,
    pub encoding: String,
    pub delimiter: char,
    pub info: DatasetInfo,
    pub pending: Vec<PendingColumn>,
    pub preview: Vec<Vec<String>>,
}

/// Result of a complete cleaning run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanResult {
    /// Link the data came from (none for local input)
    pub source: Option<DriveLink>,
    pub encoding: String,
    pub delimiter: char,
    /// Summary before cleaning
    pub info: DatasetInfo,
    /// What was done per column
    pub report: ResolutionReport,
    /// Summary after cleaning
    pub cleaned_info: DatasetInfo,
    /// Cleaned table
    #[serde(skip)]
    pub dataset: Dataset,
    /// Cleaned table as CSV text
    pub csv: String,
}

impl CleanResult {
    /// First `n` cleaned rows as display strings.
    pub fn preview(&self, n: usize) -> Vec<Vec<String>> {
        preview_rows(&self.dataset, n)
    }
}

/// Resolve a link, download it and report on the dataset without changing it.
pub async fn inspect_link(link: &str, options: &CleanOptions) -> PipelineResult<Inspection> {
    let (source, parsed) = download(link, options).await?;
    Ok(inspect_parsed(parsed, Some(source), options))
}

/// Report on a local CSV file.
pub fn inspect_file(path: &Path, options: &CleanOptions) -> PipelineResult<Inspection> {
    let parsed = parse_csv_file_auto(path, options.delimiter).map_err(LoadError::from)?;
    Ok(inspect_parsed(parsed, None, options))
}

/// Full run from a shareable link: resolve, download, clean, serialize.
pub async fn clean_link<P: StrategyProvider>(
    link: &str,
    provider: &mut P,
    options: &CleanOptions,
) -> PipelineResult<CleanResult> {
    let (source, parsed) = download(link, options).await?;
    clean_parsed(parsed, Some(source), provider)
}

/// Full run from CSV bytes already in memory.
pub fn clean_bytes<P: StrategyProvider>(
    bytes: &[u8],
    provider: &mut P,
    options: &CleanOptions,
) -> PipelineResult<CleanResult> {
    let parsed = parse_bytes_auto(bytes, options.delimiter).map_err(LoadError::from)?;
    clean_parsed(parsed, None, provider)
}

/// Full run from a local CSV file.
pub fn clean_file<P: StrategyProvider>(
    path: &Path,
    provider: &mut P,
    options: &CleanOptions,
) -> PipelineResult<CleanResult> {
    log_info(format!("📄 Reading {}", path.display()));
    let parsed = parse_csv_file_auto(path, options.delimiter).map_err(LoadError::from)?;
    clean_parsed(parsed, None, provider)
}

async fn download(link: &str, options: &CleanOptions) -> PipelineResult<(DriveLink, ParseResult)> {
    let source = resolve_link(link)?;
    log_info(format!("📥 Downloading dataset from: {}", source.download_url));

    let parsed = load_dataset(&source.download_url, options.delimiter, options.timeout_secs).await?;
    log_success("File downloaded and loaded successfully!");

    Ok((source, parsed))
}

fn inspect_parsed(parsed: ParseResult, source: Option<DriveLink>, options: &CleanOptions) -> Inspection {
    log_parse_summary(&parsed);

    let pending = pending_columns(&parsed.dataset)
        .into_iter()
        .map(|(column, missing)| PendingColumn { column, missing })
        .collect();

    Inspection {
        source,
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        info: DatasetInfo::of(&parsed.dataset),
        pending,
        preview: preview_rows(&parsed.dataset, options.preview_rows),
    }
}

fn clean_parsed<P: StrategyProvider>(
    parsed: ParseResult,
    source: Option<DriveLink>,
    provider: &mut P,
) -> PipelineResult<CleanResult> {
    log_parse_summary(&parsed);

    let ParseResult {
        mut dataset,
        encoding,
        delimiter,
    } = parsed;
    let info = DatasetInfo::of(&dataset);

    log_info("🧹 Handling null values...");
    let report = resolve_missing(&mut dataset, provider)?;
    log_resolutions(&report);

    let csv = to_csv_string(&dataset)?;
    let cleaned_info = DatasetInfo::of(&dataset);
    log_success(format!(
        "Cleaned dataset: {} rows, {} columns",
        cleaned_info.rows,
        cleaned_info.columns.len()
    ));

    Ok(CleanResult {
        source,
        encoding,
        delimiter,
        info,
        report,
        cleaned_info,
        dataset,
        csv,
    })
}

fn log_parse_summary(parsed: &ParseResult) {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!(
        "Read {} rows, {} columns",
        parsed.dataset.row_count(),
        parsed.dataset.column_count()
    ));
}

fn log_resolutions(report: &ResolutionReport) {
    if report.is_noop() {
        log_success("No missing values in numeric columns");
        return;
    }

    for r in &report.resolutions {
        let detail = match (r.strategy, r.fill_value) {
            (Strategy::Drop, _) => format!("dropped {} rows", r.rows_dropped),
            (_, Some(v)) => format!("filled {} entries with {}", r.missing, format_float(v)),
            (_, None) => String::new(),
        };
        log_info_indent(format!("{} → {}: {}", r.column, r.strategy, detail), 1);
    }

    if report.rows_after < report.rows_before {
        log_warning(format!(
            "{} of {} rows removed",
            report.rows_before - report.rows_after,
            report.rows_before
        ));
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ImputeError, PipelineError};
    use crate::transform::provider::PresetStrategies;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "city,age,income\nParis,30,\nLyon,,2000\nNice,40,3000\nLille,50,\n";

    #[test]
    fn test_default_options() {
        let opts = CleanOptions::default();
        assert_eq!(opts.timeout_secs, 30);
        assert_eq!(opts.preview_rows, 5);
        assert_eq!(opts.delimiter, None);
    }

    #[test]
    fn test_clean_bytes_mean_and_drop() {
        let mut presets = PresetStrategies::from_assignments(&["age=mean", "income=drop"]).unwrap();
        let result = clean_bytes(SAMPLE.as_bytes(), &mut presets, &CleanOptions::default()).unwrap();

        assert_eq!(result.info.rows, 4);
        assert_eq!(result.cleaned_info.rows, 2);
        assert_eq!(result.report.resolutions.len(), 2);
        assert_eq!(result.csv, "city,age,income\nLyon,40.0,2000.0\nNice,40.0,3000.0\n");
    }

    #[test]
    fn test_repeated_headers_take_separate_strategies() {
        let mut presets = PresetStrategies::from_assignments(&["a=mean", "a.1=drop"]).unwrap();
        let result = clean_bytes(b"a,a\n1,\n,2\n3,4\n", &mut presets, &CleanOptions::default()).unwrap();

        assert_eq!(result.csv, "a,a.1\n2.0,2.0\n3.0,4.0\n");
    }

    #[test]
    fn test_padded_header_kept_and_matched() {
        let mut presets = PresetStrategies::from_assignments(&["score=median"]).unwrap();
        let result = clean_bytes(b"id, score\n1,\n2,5\n", &mut presets, &CleanOptions::default()).unwrap();

        assert_eq!(result.csv, "id, score\n1,5.0\n2,5.0\n");
    }

    #[test]
    fn test_clean_bytes_missing_strategy() {
        let mut presets = PresetStrategies::from_assignments(&["age=median"]).unwrap();
        let err = clean_bytes(SAMPLE.as_bytes(), &mut presets, &CleanOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Impute(ImputeError::NoStrategy(ref c)) if c == "income"
        ));
    }

    #[test]
    fn test_clean_file_with_forced_delimiter() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a;b\n1;\n2;4\n").unwrap();

        let options = CleanOptions {
            delimiter: Some(';'),
            ..CleanOptions::default()
        };
        let mut presets = PresetStrategies::new().with_default(Some(Strategy::Median));
        let result = clean_file(file.path(), &mut presets, &options).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.csv, "a,b\n1,4.0\n2,4.0\n");
        assert_eq!(result.preview(1), vec![vec!["1".to_string(), "4.0".to_string()]]);
    }

    #[test]
    fn test_inspect_file_lists_pending_columns() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let inspection = inspect_file(file.path(), &CleanOptions::default()).unwrap();

        assert_eq!(
            inspection.pending,
            vec![
                PendingColumn { column: "age".into(), missing: 1 },
                PendingColumn { column: "income".into(), missing: 2 },
            ]
        );
        assert_eq!(inspection.preview.len(), 4);
    }

    #[tokio::test]
    async fn test_clean_link_rejects_bad_link() {
        let mut presets = PresetStrategies::new();
        let err = clean_link("no link here", &mut presets, &CleanOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Link(_)));
    }
}
