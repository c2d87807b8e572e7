//! Missing-value resolution engine.
//!
//! Walks numeric columns in declared order. For each one with missing entries it
//! asks a [`StrategyProvider`] what to do and applies the answer before moving
//! on, so a `Drop` on an earlier column can shrink the missing counts of later
//! ones.
//!
//! The caller's dataset is only replaced when every column was handled; on error
//! it is left as it was.

use serde::Serialize;

use crate::error::{ImputeError, ImputeResult};
use crate::models::{Cell, Dataset, Strategy};

/// What the engine tells a provider when it needs a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyRequest<'a> {
    /// Column name
    pub column: &'a str,
    /// Missing entries in the column right now
    pub missing: usize,
    /// Current row count of the dataset
    pub rows: usize,
}

/// Source of per-column strategy decisions.
///
/// Implementations can prompt a user, read presets from a file or request,
/// or replay canned answers in tests.
pub trait StrategyProvider {
    fn choose(&mut self, request: &StrategyRequest<'_>) -> ImputeResult<Strategy>;
}

impl<P: StrategyProvider + ?Sized> StrategyProvider for &mut P {
    fn choose(&mut self, request: &StrategyRequest<'_>) -> ImputeResult<Strategy> {
        (**self).choose(request)
    }
}

impl<P: StrategyProvider + ?Sized> StrategyProvider for Box<P> {
    fn choose(&mut self, request: &StrategyRequest<'_>) -> ImputeResult<Strategy> {
        (**self).choose(request)
    }
}

/// Outcome for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnResolution {
    pub column: String,
    pub missing: usize,
    pub strategy: Strategy,
    /// Value written into missing cells (mean/median only)
    pub fill_value: Option<f64>,
    /// Rows removed (drop only)
    pub rows_dropped: usize,
}

/// Outcome of a full pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    pub resolutions: Vec<ColumnResolution>,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl ResolutionReport {
    /// True when nothing needed handling.
    pub fn is_noop(&self) -> bool {
        self.resolutions.is_empty()
    }
}

/// Numeric columns that currently have missing values, with their counts.
///
/// Counts are taken before any strategy runs; a `Drop` on one column can lower
/// the counts of the others.
pub fn pending_columns(dataset: &Dataset) -> Vec<(String, usize)> {
    dataset
        .columns()
        .iter()
        .filter(|c| c.kind.is_numeric())
        .map(|c| (c.name.clone(), c.missing_count()))
        .filter(|(_, missing)| *missing > 0)
        .collect()
}

/// Resolve missing values in every numeric column of `dataset`.
pub fn resolve_missing<P: StrategyProvider + ?Sized>(
    dataset: &mut Dataset,
    provider: &mut P,
) -> ImputeResult<ResolutionReport> {
    let mut working = dataset.clone();
    let rows_before = working.row_count();
    let mut resolutions = Vec::new();

    for index in 0..working.column_count() {
        let column = &working.columns()[index];
        if !column.kind.is_numeric() {
            continue;
        }

        let missing = column.missing_count();
        if missing == 0 {
            continue;
        }

        let request = StrategyRequest {
            column: &column.name,
            missing,
            rows: working.row_count(),
        };
        let strategy = provider.choose(&request)?;
        resolutions.push(apply_strategy(&mut working, index, strategy, missing)?);
    }

    let rows_after = working.row_count();
    *dataset = working;

    Ok(ResolutionReport {
        resolutions,
        rows_before,
        rows_after,
    })
}

fn apply_strategy(
    dataset: &mut Dataset,
    index: usize,
    strategy: Strategy,
    missing: usize,
) -> ImputeResult<ColumnResolution> {
    let column = &dataset.columns()[index];
    let name = column.name.clone();

    match strategy {
        Strategy::Mean | Strategy::Median => {
            let observed = column.observed();
            let fill = if strategy == Strategy::Mean {
                mean(&observed)
            } else {
                median(&observed)
            }
            .ok_or_else(|| ImputeError::NothingToImpute {
                column: name.clone(),
                strategy,
            })?;

            let column = dataset.column_at_mut(index);
            for cell in column.cells.iter_mut().filter(|c| c.is_missing()) {
                *cell = Cell::Number(fill);
            }

            Ok(ColumnResolution {
                column: name,
                missing,
                strategy,
                fill_value: Some(fill),
                rows_dropped: 0,
            })
        }
        Strategy::Drop => {
            let keep: Vec<bool> = column.cells.iter().map(|c| !c.is_missing()).collect();
            let rows_dropped = dataset.retain_rows(&keep);

            Ok(ColumnResolution {
                column: name,
                missing,
                strategy,
                fill_value: None,
                rows_dropped,
            })
        }
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (mean of the two middle values for even counts), `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnType};
    use std::collections::VecDeque;

    /// Replays answers in order and records what it was asked.
    struct Canned {
        answers: VecDeque<Strategy>,
        asked: Vec<(String, usize)>,
    }

    impl Canned {
        fn new(answers: &[Strategy]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl StrategyProvider for Canned {
        fn choose(&mut self, request: &StrategyRequest<'_>) -> ImputeResult<Strategy> {
            self.asked.push((request.column.to_string(), request.missing));
            self.answers
                .pop_front()
                .ok_or_else(|| ImputeError::NoStrategy(request.column.to_string()))
        }
    }

    fn dataset(columns: Vec<Column>) -> Dataset {
        Dataset::new(columns).unwrap()
    }

    fn labels(values: &[&str]) -> Column {
        Column::new(
            "label",
            ColumnType::Text,
            values.iter().map(|v| Cell::text(*v)).collect(),
        )
    }

    #[test]
    fn test_mean_fills_missing() {
        let mut ds = dataset(vec![Column::floats("x", &[Some(1.0), Some(2.0), None, Some(4.0)])]);
        let mut provider = Canned::new(&[Strategy::Mean]);

        let report = resolve_missing(&mut ds, &mut provider).unwrap();

        let expected = 7.0 / 3.0;
        assert_eq!(ds.row_count(), 4);
        assert_eq!(ds.column("x").unwrap().cells[2], Cell::Number(expected));
        assert_eq!(report.resolutions[0].fill_value, Some(expected));
        assert_eq!(report.resolutions[0].missing, 1);
    }

    #[test]
    fn test_median_fills_missing() {
        let mut ds = dataset(vec![Column::floats(
            "x",
            &[Some(10.0), None, Some(1.0), Some(3.0), Some(2.0)],
        )]);
        let mut provider = Canned::new(&[Strategy::Median]);

        resolve_missing(&mut ds, &mut provider).unwrap();

        assert_eq!(ds.column("x").unwrap().cells[1], Cell::Number(2.5));
        assert_eq!(ds.column("x").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_drop_removes_whole_rows() {
        let mut ds = dataset(vec![
            Column::floats("x", &[Some(1.0), None, Some(3.0)]),
            labels(&["a", "b", "c"]),
        ]);
        let mut provider = Canned::new(&[Strategy::Drop]);

        let report = resolve_missing(&mut ds, &mut provider).unwrap();

        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column("label").unwrap().cells, vec![Cell::text("a"), Cell::text("c")]);
        assert_eq!(report.resolutions[0].rows_dropped, 1);
        assert_eq!((report.rows_before, report.rows_after), (3, 2));
    }

    #[test]
    fn test_drop_cascades_to_later_columns() {
        // row 1 is missing in both columns; dropping it on `a` leaves `b` with one missing
        let mut ds = dataset(vec![
            Column::floats("a", &[Some(1.0), None, Some(3.0)]),
            Column::floats("b", &[None, None, Some(6.0)]),
        ]);
        let mut provider = Canned::new(&[Strategy::Drop, Strategy::Mean]);

        resolve_missing(&mut ds, &mut provider).unwrap();

        assert_eq!(provider.asked, vec![("a".to_string(), 1), ("b".to_string(), 1)]);
        assert_eq!(ds.column("b").unwrap().cells, vec![Cell::Number(6.0), Cell::Number(6.0)]);
    }

    #[test]
    fn test_text_and_complete_columns_skipped() {
        let mut ds = dataset(vec![
            Column::new("t", ColumnType::Text, vec![Cell::Missing, Cell::text("x")]),
            Column::floats("full", &[Some(1.0), Some(2.0)]),
        ]);
        let mut provider = Canned::new(&[]);

        let report = resolve_missing(&mut ds, &mut provider).unwrap();

        assert!(report.is_noop());
        assert!(provider.asked.is_empty());
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut ds = dataset(vec![Column::floats("x", &[Some(1.0), None])]);
        resolve_missing(&mut ds, &mut Canned::new(&[Strategy::Mean])).unwrap();
        let snapshot = ds.clone();

        let mut provider = Canned::new(&[]);
        let report = resolve_missing(&mut ds, &mut provider).unwrap();

        assert!(report.is_noop());
        assert!(provider.asked.is_empty());
        assert_eq!(ds, snapshot);
    }

    #[test]
    fn test_all_missing_column_reports_error_without_mutation() {
        let mut ds = dataset(vec![
            Column::floats("a", &[Some(1.0), None]),
            Column::floats("empty", &[None, None]),
        ]);
        let original = ds.clone();
        let mut provider = Canned::new(&[Strategy::Mean, Strategy::Median]);

        let err = resolve_missing(&mut ds, &mut provider).unwrap_err();

        assert_eq!(
            err,
            ImputeError::NothingToImpute {
                column: "empty".into(),
                strategy: Strategy::Median,
            }
        );
        assert_eq!(ds, original);
    }

    #[test]
    fn test_all_missing_column_can_be_dropped() {
        let mut ds = dataset(vec![Column::floats("empty", &[None, None])]);
        let report = resolve_missing(&mut ds, &mut Canned::new(&[Strategy::Drop])).unwrap();
        assert_eq!(ds.row_count(), 0);
        assert_eq!(report.resolutions[0].rows_dropped, 2);
    }

    #[test]
    fn test_provider_error_propagates() {
        let mut ds = dataset(vec![Column::floats("x", &[None, Some(1.0)])]);
        let err = resolve_missing(&mut ds, &mut Canned::new(&[])).unwrap_err();
        assert_eq!(err, ImputeError::NoStrategy("x".into()));
    }

    #[test]
    fn test_pending_columns() {
        let ds = dataset(vec![
            Column::floats("a", &[Some(1.0), None]),
            Column::floats("b", &[Some(1.0), Some(2.0)]),
            Column::new("c", ColumnType::Text, vec![Cell::Missing, Cell::Missing]),
        ]);
        assert_eq!(pending_columns(&ds), vec![("a".to_string(), 1)]);
    }

    #[test]
    fn test_mean_and_median_helpers() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 4.0]), Some(7.0 / 3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}
