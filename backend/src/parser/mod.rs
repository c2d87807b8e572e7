//! CSV codec with encoding and delimiter auto-detection.
//!
//! Reading turns CSV text into a typed [`Dataset`]: null-like markers become
//! [`Cell::Missing`] and each column gets an inferred [`ColumnType`]. Writing
//! turns a dataset back into CSV text.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{format_float, Cell, Column, ColumnType, Dataset};

/// Values read as missing (the usual pandas defaults).
pub const MISSING_MARKERS: [&str; 19] = [
    "", "NA", "N/A", "n/a", "NaN", "-NaN", "nan", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#N/A N/A", "#NA", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub dataset: Dataset,
    /// Detected encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let text = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        // UTF-8, ASCII and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Comma wins ties and headers without any separator.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// True for values that read as missing.
pub fn is_missing_marker(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// Parse CSV text into a dataset.
///
/// # Example
/// ```ignore
/// use autoclean::parser::parse_dataset;
///
/// let ds = parse_dataset("name,age\nAlice,30\nBob,", ',').unwrap();
/// assert_eq!(ds.row_count(), 2);
/// assert_eq!(ds.column("age").unwrap().missing_count(), 1);
/// ```
pub fn parse_dataset(content: &str, delimiter: char) -> CsvResult<Dataset> {
    if content.trim().is_empty() {
        return Err(CsvError::Empty);
    }
    let delim = ascii_delimiter(delimiter)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }
    let headers = dedupe_headers(headers);

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in reader.records() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(CsvError::Ragged {
                line: record.position().map_or(0, |p| p.line()),
                expected: headers.len(),
                found: record.len(),
            });
        }

        // Short rows are padded with missing values
        for (i, values) in raw.iter_mut().enumerate() {
            let value = record.get(i).filter(|v| !is_missing_marker(v));
            values.push(value.map(str::to_string));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| infer_column(name, values))
        .collect();

    Ok(Dataset::new(columns)?)
}

/// Rename repeated headers the pandas way: `a, a` becomes `a, a.1`.
///
/// Candidates already used anywhere in the header row are skipped.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let original: HashSet<String> = headers.iter().cloned().collect();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut renamed = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.clone();
        let mut seen = counts.get(&header).copied().unwrap_or(0);
        while seen > 0 {
            counts.insert(header.clone(), seen + 1);
            name = format!("{}.{}", header, seen);
            seen = if original.contains(&name) {
                seen + 1
            } else {
                counts.get(&name).copied().unwrap_or(0)
            };
        }
        counts.insert(name.clone(), seen + 1);
        renamed.push(name);
    }

    renamed
}

/// Pick the column type and convert its values.
fn infer_column(name: String, values: Vec<Option<String>>) -> Column {
    if values.is_empty() {
        let cells = Vec::new();
        return Column::new(name, ColumnType::Text, cells);
    }

    let has_missing = values.iter().any(Option::is_none);
    let present = || values.iter().flatten().map(|v| v.trim());

    if !has_missing && present().all(|v| v.parse::<i64>().is_ok()) {
        let cells = present()
            .map(|v| v.parse::<i64>().map_or(Cell::Missing, Cell::Integer))
            .collect();
        return Column::new(name, ColumnType::Integer, cells);
    }

    if present().all(|v| v.parse::<f64>().is_ok()) {
        let cells = values
            .iter()
            .map(|v| match v {
                Some(s) => s.trim().parse::<f64>().map_or(Cell::Missing, Cell::Number),
                None => Cell::Missing,
            })
            .collect();
        return Column::new(name, ColumnType::Float, cells);
    }

    let cells = values
        .into_iter()
        .map(|v| v.map_or(Cell::Missing, Cell::Text))
        .collect();
    Column::new(name, ColumnType::Text, cells)
}

/// Parse CSV bytes with auto-detection of encoding and (optionally) delimiter.
pub fn parse_bytes_auto(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::Empty);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let dataset = parse_dataset(&content, delimiter)?;

    Ok(ParseResult {
        dataset,
        encoding,
        delimiter,
    })
}

/// Parse a local CSV file with auto-detection.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, delimiter)
}

// =============================================================================
// Writing
// =============================================================================

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Missing => String::new(),
        Cell::Integer(n) => n.to_string(),
        Cell::Number(v) => format_float(*v),
        Cell::Text(s) => s.clone(),
    }
}

/// Serialize a dataset to comma-separated text with a header row.
pub fn to_csv_string(dataset: &Dataset) -> CsvResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(dataset.headers())?;
    for row in 0..dataset.row_count() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| render_cell(&c.cells[row]))
            .collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::Write(e.to_string()))
}

fn ascii_delimiter(delimiter: char) -> CsvResult<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(CsvError::InvalidDelimiter(delimiter))
    }
}
