//! Dynamic-column per-day tables
//!
//! Several export sheets have data-dependent columns: one column per muscle
//! group, per exercise, or per tracked micronutrient. `DailyTable` models
//! them as date-keyed rows of optional numeric cells, with the window
//! slicing and column aggregation the analyzers need. Absent cells are
//! skipped by every aggregate, never counted as zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::week::WeekWindow;

/// One parsed row: a date plus one optional value per table column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// A date-keyed table whose columns are discovered from the sheet header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyTable {
    columns: Vec<String>,
    rows: Vec<DailyRow>,
}

impl DailyTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating `values` to the column count.
    pub fn push_row(&mut self, date: NaiveDate, mut values: Vec<Option<f64>>) {
        values.resize(self.columns.len(), None);
        self.rows.push(DailyRow { date, values });
    }

    /// Sort rows ascending by date. Called once after loading.
    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|r| r.date);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows whose date falls inside the window.
    pub fn window_rows(&self, window: &WeekWindow) -> Vec<&DailyRow> {
        self.rows
            .iter()
            .filter(|r| window.contains(r.date))
            .collect()
    }

    /// First column whose name contains any candidate substring
    /// (case-insensitive), in candidate order. Resolved once per analysis,
    /// never per row.
    pub fn find_column(&self, candidates: &[&str]) -> Option<usize> {
        for cand in candidates {
            let cand = cand.to_lowercase();
            if let Some(idx) = self
                .columns
                .iter()
                .position(|c| c.to_lowercase().contains(&cand))
            {
                return Some(idx);
            }
        }
        None
    }

    /// Mean of the present cells in one column over the window.
    pub fn column_mean(&self, column: usize, window: &WeekWindow) -> Option<f64> {
        let vals: Vec<Option<f64>> = self
            .window_rows(window)
            .iter()
            .map(|r| r.values.get(column).copied().flatten())
            .collect();
        crate::values::mean(&vals)
    }

    /// Per-column sums over the window, for columns with at least one
    /// present cell.
    pub fn sum_by_column(&self, window: &WeekWindow) -> BTreeMap<String, f64> {
        let rows = self.window_rows(window);
        let mut sums = BTreeMap::new();
        for (idx, name) in self.columns.iter().enumerate() {
            let present: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.values.get(idx).copied().flatten())
                .collect();
            if !present.is_empty() {
                sums.insert(name.clone(), present.iter().sum());
            }
        }
        sums
    }

    /// Per-column maxima over the window, for columns with at least one
    /// present cell.
    pub fn max_by_column(&self, window: &WeekWindow) -> BTreeMap<String, f64> {
        let rows = self.window_rows(window);
        let mut maxes = BTreeMap::new();
        for (idx, name) in self.columns.iter().enumerate() {
            let max = rows
                .iter()
                .filter_map(|r| r.values.get(idx).copied().flatten())
                .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))));
            if let Some(max) = max {
                maxes.insert(name.clone(), max);
            }
        }
        maxes
    }

    /// Count of window rows whose present cells sum to a positive value.
    pub fn days_with_positive_row_sum(&self, window: &WeekWindow) -> usize {
        self.window_rows(window)
            .iter()
            .filter(|r| r.values.iter().flatten().sum::<f64>() > 0.0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn make_table() -> DailyTable {
        let mut t = DailyTable::new(vec!["Glutes".to_string(), "Core".to_string()]);
        t.push_row(date(2), vec![Some(6.0), None]);
        t.push_row(date(4), vec![Some(4.0), Some(8.0)]);
        t.push_row(date(11), vec![Some(9.0), Some(2.0)]);
        t.sort_by_date();
        t
    }

    #[test]
    fn test_window_slicing() {
        let t = make_table();
        let week = WeekWindow::containing(date(2));
        assert_eq!(t.window_rows(&week).len(), 2);
    }

    #[test]
    fn test_sum_skips_missing_cells() {
        let t = make_table();
        let week = WeekWindow::containing(date(2));
        let sums = t.sum_by_column(&week);
        assert_eq!(sums.get("Glutes"), Some(&10.0));
        // One present cell; the missing one contributes nothing.
        assert_eq!(sums.get("Core"), Some(&8.0));
    }

    #[test]
    fn test_max_by_column() {
        let t = make_table();
        let week = WeekWindow::containing(date(2));
        let maxes = t.max_by_column(&week);
        assert_eq!(maxes.get("Glutes"), Some(&6.0));
        assert_eq!(maxes.get("Core"), Some(&8.0));
    }

    #[test]
    fn test_empty_window_has_no_aggregates() {
        let t = make_table();
        let week = WeekWindow::containing(date(25));
        assert!(t.sum_by_column(&week).is_empty());
        assert!(t.max_by_column(&week).is_empty());
        assert_eq!(t.days_with_positive_row_sum(&week), 0);
        assert_eq!(t.column_mean(0, &week), None);
    }

    #[test]
    fn test_find_column_candidate_order() {
        let t = DailyTable::new(vec![
            "date".to_string(),
            "dietary_fiber_g".to_string(),
            "iron_mg".to_string(),
        ]);
        assert_eq!(t.find_column(&["fiber", "fibre"]), Some(1));
        assert_eq!(t.find_column(&["IRON"]), Some(2));
        assert_eq!(t.find_column(&["zinc"]), None);
    }
}
