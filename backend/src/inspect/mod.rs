//! Dataset summaries and previews.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{format_float, Cell, ColumnType, Dataset};

/// Per-column summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: ColumnType,
    pub non_null: usize,
    pub missing: usize,
}

/// Shape and type information for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl DatasetInfo {
    pub fn of(dataset: &Dataset) -> Self {
        let columns = dataset
            .columns()
            .iter()
            .map(|c| ColumnSummary {
                name: c.name.clone(),
                dtype: c.kind,
                non_null: c.non_null_count(),
                missing: c.missing_count(),
            })
            .collect();

        Self {
            rows: dataset.row_count(),
            columns,
        }
    }

    /// Missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

impl fmt::Display for DatasetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == 0 {
            writeln!(f, "RangeIndex: 0 entries")?;
        } else {
            writeln!(f, "RangeIndex: {} entries, 0 to {}", self.rows, self.rows - 1)?;
        }
        writeln!(f, "Data columns (total {} columns):", self.columns.len())?;

        let name_width = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Column".len());
        let index_width = self.columns.len().to_string().len().max(3);

        writeln!(
            f,
            " {:<iw$}  {:<nw$}  {:<14}  Dtype",
            "#",
            "Column",
            "Non-Null Count",
            iw = index_width,
            nw = name_width
        )?;
        writeln!(
            f,
            " {:<iw$}  {:<nw$}  {:<14}  -----",
            "-".repeat(index_width),
            "-".repeat(6),
            "-".repeat(14),
            iw = index_width,
            nw = name_width
        )?;

        for (i, c) in self.columns.iter().enumerate() {
            writeln!(
                f,
                " {:<iw$}  {:<nw$}  {:<14}  {}",
                i,
                c.name,
                format!("{} non-null", c.non_null),
                c.dtype,
                iw = index_width,
                nw = name_width
            )?;
        }

        let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
        for c in &self.columns {
            *tally.entry(c.dtype.dtype()).or_default() += 1;
        }
        let dtypes: Vec<String> = tally.iter().map(|(d, n)| format!("{}({})", d, n)).collect();
        write!(f, "dtypes: {}", dtypes.join(", "))
    }
}

fn preview_cell(cell: &Cell) -> String {
    match cell {
        Cell::Missing => "NaN".to_string(),
        Cell::Integer(n) => n.to_string(),
        Cell::Number(v) => format_float(*v),
        Cell::Text(s) => s.clone(),
    }
}

/// Rows of the first `n` entries as display strings.
pub fn preview_rows(dataset: &Dataset, n: usize) -> Vec<Vec<String>> {
    let head = dataset.head(n);
    (0..head.row_count())
        .map(|row| {
            head.columns()
                .iter()
                .map(|c| preview_cell(&c.cells[row]))
                .collect()
        })
        .collect()
}

/// Aligned text table of the first `n` rows, with a row index column.
pub fn render_preview(dataset: &Dataset, n: usize) -> String {
    let rows = preview_rows(dataset, n);
    let headers = dataset.headers();

    let index_width = rows.len().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header = " ".repeat(index_width);
    for (h, w) in headers.iter().zip(&widths) {
        header.push_str(&format!("  {:>w$}", h, w = w));
    }
    lines.push(header);

    for (i, row) in rows.iter().enumerate() {
        let mut line = format!("{:<iw$}", i, iw = index_width);
        for (value, w) in row.iter().zip(&widths) {
            line.push_str(&format!("  {:>w$}", value, w = w));
        }
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_dataset;

    #[test]
    fn test_info_counts() {
        let ds = parse_dataset("id,score,name\n1,2.5,a\n2,,b\n3,4,", ',').unwrap();
        let info = DatasetInfo::of(&ds);

        assert_eq!(info.rows, 3);
        assert_eq!(info.columns.len(), 3);
        assert_eq!(info.columns[1].dtype, ColumnType::Float);
        assert_eq!(info.columns[1].non_null, 2);
        assert_eq!(info.columns[2].missing, 1);
        assert_eq!(info.total_missing(), 2);
    }

    #[test]
    fn test_info_display() {
        let ds = parse_dataset("id,score\n1,2.5\n2,", ',').unwrap();
        let text = DatasetInfo::of(&ds).to_string();

        assert!(text.contains("RangeIndex: 2 entries, 0 to 1"));
        assert!(text.contains("Data columns (total 2 columns):"));
        assert!(text.contains("1 non-null"));
        assert!(text.contains("dtypes: float64(1), int64(1)"));
    }

    #[test]
    fn test_preview_rows() {
        let ds = parse_dataset("id,score\n1,2.5\n2,\n3,4", ',').unwrap();
        let rows = preview_rows(&ds, 2);

        assert_eq!(rows, vec![vec!["1", "2.5"], vec!["2", "NaN"]]);
    }

    #[test]
    fn test_render_preview_alignment() {
        let ds = parse_dataset("id,name\n1,alpha\n2,b", ',').unwrap();
        let table = render_preview(&ds, 5);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "   id   name");
        assert_eq!(lines[1], "0   1  alpha");
        assert_eq!(lines[2], "1   2      b");
    }
}
