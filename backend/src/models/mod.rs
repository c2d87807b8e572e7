//! Domain models for the cleaning pipeline.
//!
//! - [`Cell`] - a single value: number, text or missing
//! - [`ColumnType`] - inferred column type (int64, float64, object)
//! - [`Column`] - named, typed sequence of cells
//! - [`Dataset`] - ordered columns sharing one row count
//! - [`Strategy`] - how to handle missing values in one numeric column

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::ConfigError;

// =============================================================================
// Cell
// =============================================================================

/// A single table value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Absent or null-like value.
    Missing,
    /// Whole number from an int64 column, kept exact.
    Integer(i64),
    /// Numeric value.
    Number(f64),
    /// Anything else, kept verbatim.
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric value, if this cell holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(n) => Some(*n as f64),
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Textual form of the cell. Missing renders as `nan`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Missing => "nan".to_string(),
            Cell::Integer(n) => n.to_string(),
            Cell::Number(v) => format_float(*v),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Render a float the way a float column prints it: shortest round-trip form,
/// always with a fractional part or an exponent (`1.0`, `2.5`, `1e+16`, `1e-05`).
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        let label = if v > 0.0 { "inf" } else { "-inf" };
        return label.to_string();
    }

    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return scientific(v);
    }
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// `1.5e16` → `1.5e+16`, `1e-5` → `1e-05`.
fn scientific(v: f64) -> String {
    let raw = format!("{:e}", v);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => raw,
    }
}

// =============================================================================
// Columns
// =============================================================================

/// Inferred scalar type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Whole numbers, no missing values.
    Integer,
    /// Numbers, possibly with missing values.
    Float,
    /// Anything that is not entirely numeric.
    Text,
}

impl ColumnType {
    /// Only numeric columns are eligible for missing-value handling.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// dtype label used in reports.
    pub fn dtype(self) -> &'static str {
        match self {
            ColumnType::Integer => "int64",
            ColumnType::Float => "float64",
            ColumnType::Text => "object",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype())
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    /// Float column from optional values, `None` becoming missing.
    pub fn floats(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        let cells = values
            .iter()
            .map(|v| v.map_or(Cell::Missing, Cell::Number))
            .collect();
        Self::new(name, ColumnType::Float, cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    pub fn non_null_count(&self) -> usize {
        self.cells.len() - self.missing_count()
    }

    /// Non-missing numeric values in row order.
    pub fn observed(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::as_f64).collect()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Columns of unequal length.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Column '{column}' has {found} rows, expected {expected}")]
pub struct ShapeError {
    pub column: String,
    pub expected: usize,
    pub found: usize,
}

/// Ordered columns sharing one row count.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, rejecting columns of unequal length.
    pub fn new(columns: Vec<Column>) -> Result<Self, ShapeError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(ShapeError {
                    column: bad.name.clone(),
                    expected,
                    found: bad.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub(crate) fn column_at_mut(&mut self, index: usize) -> &mut Column {
        &mut self.columns[index]
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells[index]).collect())
    }

    /// Keep only rows where `keep` is true. Returns the number of rows removed.
    pub fn retain_rows(&mut self, keep: &[bool]) -> usize {
        let before = self.row_count();
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.cells.retain(|_| *flags.next().unwrap_or(&true));
        }
        before - self.row_count()
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.kind, c.cells.iter().take(n).cloned().collect()))
            .collect();
        Dataset { columns }
    }
}

// =============================================================================
// Strategy
// =============================================================================

/// How to handle missing values in a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Strategy {
    /// Fill with the column mean.
    Mean,
    /// Fill with the column median.
    Median,
    /// Remove rows where the column is missing.
    Drop,
}

impl Strategy {
    /// Choices in menu order.
    pub const ALL: [Strategy; 3] = [Strategy::Mean, Strategy::Median, Strategy::Drop];

    /// Label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Mean => "Mean",
            Strategy::Median => "Median",
            Strategy::Drop => "Drop these entries",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "mean" => Ok(Strategy::Mean),
            "2" | "median" => Ok(Strategy::Median),
            "3" | "drop" | "drop these entries" => Ok(Strategy::Drop),
            _ => Err(ConfigError::UnknownStrategy(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
