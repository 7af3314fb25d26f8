//! MacroFactor nutrition export adapter
//!
//! The nutrition source is a spreadsheet-style export: a set of named
//! sheets, each a per-day table. Sheets and columns are discovered by
//! ordered candidate-substring matching, resolved once at load time.
//! Unrecognized sheets are ignored; a recognized sheet with no date column
//! is fatal; a missing sheet just leaves its table empty and the dependent
//! analysis degrades.

use crate::config::Config;
use crate::error::PeakformError;
use crate::table::DailyTable;
use crate::types::{ExpenditureDay, MacroDay, NutritionTargets, TargetEntry, TrendPoint, WeighIn};
use crate::values;

/// One named sheet of the export, as CSV text.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub csv: String,
}

impl Sheet {
    pub fn new(name: impl Into<String>, csv: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            csv: csv.into(),
        }
    }
}

/// Parsed nutrition export: fixed-schema tables for the core sheets,
/// dynamic-column tables for the data-dependent ones.
#[derive(Debug, Clone, Default)]
pub struct MacroFactorData {
    calories_macros: Vec<MacroDay>,
    expenditure: Vec<ExpenditureDay>,
    scale_weight: Vec<WeighIn>,
    weight_trend: Vec<TrendPoint>,
    micronutrients: DailyTable,
    targets: Vec<TargetEntry>,
    muscle_groups: DailyTable,
    exercises_heaviest: DailyTable,
    exercises_volume: DailyTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetKind {
    CaloriesMacros,
    Expenditure,
    ScaleWeight,
    WeightTrend,
    Micronutrients,
    ProgramSettings,
    MuscleGroups,
    ExercisesHeaviest,
    ExercisesVolume,
}

/// Map a sheet name to its role. Candidate order matters: "Micronutrients"
/// must win before the generic nutrition checks.
fn classify_sheet(name: &str) -> Option<SheetKind> {
    let n = name.to_lowercase();
    if n.contains("micronutrient") {
        Some(SheetKind::Micronutrients)
    } else if n.contains("macro") || n.contains("calorie") {
        Some(SheetKind::CaloriesMacros)
    } else if n.contains("expenditure") || n.contains("tdee") {
        Some(SheetKind::Expenditure)
    } else if n.contains("scale") {
        Some(SheetKind::ScaleWeight)
    } else if n.contains("trend") {
        Some(SheetKind::WeightTrend)
    } else if n.contains("program") || n.contains("settings") || n.contains("target") {
        Some(SheetKind::ProgramSettings)
    } else if n.contains("muscle") {
        Some(SheetKind::MuscleGroups)
    } else if n.contains("heaviest") {
        Some(SheetKind::ExercisesHeaviest)
    } else if n.contains("volume") {
        Some(SheetKind::ExercisesVolume)
    } else {
        None
    }
}

/// A sheet read into memory: trimmed headers plus string rows.
struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawSheet {
    fn read(csv_text: &str) -> Result<Self, PeakformError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv_text.as_bytes());
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    /// First header containing any candidate substring, case-insensitive,
    /// in candidate order.
    fn find_column(&self, candidates: &[&str]) -> Option<usize> {
        for cand in candidates {
            let cand = cand.to_lowercase();
            if let Some(idx) = self
                .headers
                .iter()
                .position(|h| h.to_lowercase().contains(&cand))
            {
                return Some(idx);
            }
        }
        None
    }

    fn date_column(&self, sheet_name: &str) -> Result<usize, PeakformError> {
        self.find_column(&["date", "day"])
            .ok_or_else(|| PeakformError::MissingDateColumn(sheet_name.to_string()))
    }

    fn cell(&self, row: &[String], column: Option<usize>) -> Option<f64> {
        column
            .and_then(|i| row.get(i))
            .and_then(|c| values::parse_numeric(c))
    }
}

/// Normalize a header into a stable snake_case field name:
/// "Vitamin D (mcg)" -> "vitamin_d_mcg".
fn normalize_column_name(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut last_underscore = true;
    for c in header.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

fn parse_macro_sheet(raw: &RawSheet, name: &str) -> Result<Vec<MacroDay>, PeakformError> {
    let date_col = raw.date_column(name)?;
    let cal_col = raw.find_column(&["calorie", "kcal", "energy"]);
    let protein_col = raw.find_column(&["protein"]);
    let carbs_col = raw.find_column(&["carb"]);
    let fat_col = raw.find_column(&["fat"]);

    let mut days = Vec::new();
    for row in &raw.rows {
        let Some(date) = row.get(date_col).and_then(|c| values::parse_date(c)) else {
            continue;
        };
        days.push(MacroDay {
            date,
            calories: raw.cell(row, cal_col),
            protein_g: raw.cell(row, protein_col),
            carbs_g: raw.cell(row, carbs_col),
            fat_g: raw.cell(row, fat_col),
        });
    }
    days.sort_by_key(|d| d.date);
    Ok(days)
}

fn parse_expenditure_sheet(raw: &RawSheet, name: &str) -> Result<Vec<ExpenditureDay>, PeakformError> {
    let date_col = raw.date_column(name)?;
    let exp_col = raw.find_column(&["expenditure", "tdee", "total"]);

    let mut days = Vec::new();
    for row in &raw.rows {
        let Some(date) = row.get(date_col).and_then(|c| values::parse_date(c)) else {
            continue;
        };
        days.push(ExpenditureDay {
            date,
            expenditure_kcal: raw.cell(row, exp_col),
        });
    }
    days.sort_by_key(|d| d.date);
    Ok(days)
}

fn parse_scale_sheet(raw: &RawSheet, name: &str) -> Result<Vec<WeighIn>, PeakformError> {
    let date_col = raw.date_column(name)?;
    let weight_col = raw
        .headers
        .iter()
        .position(|h| h.to_lowercase().contains("weight") && !h.to_lowercase().contains("date"));
    let fat_col = raw.find_column(&["fat", "pct"]);

    let mut days = Vec::new();
    for row in &raw.rows {
        let Some(date) = row.get(date_col).and_then(|c| values::parse_date(c)) else {
            continue;
        };
        days.push(WeighIn {
            date,
            weight_lbs: raw.cell(row, weight_col),
            body_fat_pct: raw.cell(row, fat_col),
        });
    }
    days.sort_by_key(|d| d.date);
    Ok(days)
}

fn parse_trend_sheet(raw: &RawSheet, name: &str) -> Result<Vec<TrendPoint>, PeakformError> {
    let date_col = raw.date_column(name)?;
    // Prefer a column named for the trendline; otherwise the first
    // non-date column carries it.
    let trend_col = raw
        .find_column(&["trend"])
        .or_else(|| (0..raw.headers.len()).find(|&i| i != date_col));

    let mut points = Vec::new();
    for row in &raw.rows {
        let Some(date) = row.get(date_col).and_then(|c| values::parse_date(c)) else {
            continue;
        };
        points.push(TrendPoint {
            date,
            trend_lbs: raw.cell(row, trend_col),
        });
    }
    points.sort_by_key(|p| p.date);
    Ok(points)
}

fn parse_targets_sheet(raw: &RawSheet, name: &str) -> Result<Vec<TargetEntry>, PeakformError> {
    let date_col = raw
        .find_column(&["effective", "date", "day"])
        .ok_or_else(|| PeakformError::MissingDateColumn(name.to_string()))?;
    let cal_col = raw.find_column(&["calorie", "kcal", "energy"]);
    let protein_col = raw.find_column(&["protein"]);
    let carbs_col = raw.find_column(&["carb"]);
    let fat_col = raw.find_column(&["fat"]);

    let mut entries = Vec::new();
    for row in &raw.rows {
        let Some(effective) = row.get(date_col).and_then(|c| values::parse_date(c)) else {
            continue;
        };
        entries.push(TargetEntry {
            effective,
            calories: raw.cell(row, cal_col),
            protein_g: raw.cell(row, protein_col),
            carbs_g: raw.cell(row, carbs_col),
            fat_g: raw.cell(row, fat_col),
        });
    }
    entries.sort_by_key(|e| e.effective);
    Ok(entries)
}

fn parse_dynamic_sheet(
    raw: &RawSheet,
    name: &str,
    normalize_names: bool,
) -> Result<DailyTable, PeakformError> {
    let date_col = raw.date_column(name)?;
    let value_cols: Vec<usize> = (0..raw.headers.len()).filter(|&i| i != date_col).collect();
    let columns = value_cols
        .iter()
        .map(|&i| {
            if normalize_names {
                normalize_column_name(&raw.headers[i])
            } else {
                raw.headers[i].clone()
            }
        })
        .collect();

    let mut table = DailyTable::new(columns);
    for row in &raw.rows {
        let Some(date) = row.get(date_col).and_then(|c| values::parse_date(c)) else {
            continue;
        };
        let cells = value_cols
            .iter()
            .map(|&i| row.get(i).and_then(|c| values::parse_numeric(c)))
            .collect();
        table.push_row(date, cells);
    }
    table.sort_by_date();
    Ok(table)
}

impl MacroFactorData {
    /// Parse a set of named sheets into canonical tables.
    pub fn from_sheets(sheets: &[Sheet]) -> Result<Self, PeakformError> {
        let mut data = Self::default();
        for sheet in sheets {
            let Some(kind) = classify_sheet(&sheet.name) else {
                continue;
            };
            let raw = RawSheet::read(&sheet.csv)?;
            match kind {
                SheetKind::CaloriesMacros => {
                    data.calories_macros = parse_macro_sheet(&raw, &sheet.name)?;
                }
                SheetKind::Expenditure => {
                    data.expenditure = parse_expenditure_sheet(&raw, &sheet.name)?;
                }
                SheetKind::ScaleWeight => {
                    data.scale_weight = parse_scale_sheet(&raw, &sheet.name)?;
                }
                SheetKind::WeightTrend => {
                    data.weight_trend = parse_trend_sheet(&raw, &sheet.name)?;
                }
                SheetKind::Micronutrients => {
                    data.micronutrients = parse_dynamic_sheet(&raw, &sheet.name, true)?;
                }
                SheetKind::ProgramSettings => {
                    data.targets = parse_targets_sheet(&raw, &sheet.name)?;
                }
                SheetKind::MuscleGroups => {
                    data.muscle_groups = parse_dynamic_sheet(&raw, &sheet.name, false)?;
                }
                SheetKind::ExercisesHeaviest => {
                    data.exercises_heaviest = parse_dynamic_sheet(&raw, &sheet.name, false)?;
                }
                SheetKind::ExercisesVolume => {
                    data.exercises_volume = parse_dynamic_sheet(&raw, &sheet.name, false)?;
                }
            }
        }
        Ok(data)
    }

    // ------------------------------------------------------------------
    // Table accessors
    // ------------------------------------------------------------------

    pub fn calories_macros(&self) -> &[MacroDay] {
        &self.calories_macros
    }

    pub fn expenditure(&self) -> &[ExpenditureDay] {
        &self.expenditure
    }

    pub fn scale_weight(&self) -> &[WeighIn] {
        &self.scale_weight
    }

    pub fn weight_trend(&self) -> &[TrendPoint] {
        &self.weight_trend
    }

    pub fn micronutrients(&self) -> &DailyTable {
        &self.micronutrients
    }

    pub fn muscle_groups(&self) -> &DailyTable {
        &self.muscle_groups
    }

    pub fn exercises_heaviest(&self) -> &DailyTable {
        &self.exercises_heaviest
    }

    pub fn exercises_volume(&self) -> &DailyTable {
        &self.exercises_volume
    }

    /// Targets in force for the week ending on `week_end`: the latest
    /// program-settings entry effective at or before it, each field falling
    /// back to the configured default when absent. The value active on the
    /// week's end governs the whole week.
    pub fn targets_for(&self, week_end: chrono::NaiveDate, config: &Config) -> NutritionTargets {
        let live = self
            .targets
            .iter()
            .rev()
            .find(|e| e.effective <= week_end);
        NutritionTargets {
            calories: live
                .and_then(|e| e.calories)
                .or(Some(config.fallback_calorie_target)),
            protein_g: live
                .and_then(|e| e.protein_g)
                .or(Some(config.fallback_protein_target_g)),
            carbs_g: live
                .and_then(|e| e.carbs_g)
                .or(Some(config.fallback_carbs_target_g)),
            fat_g: live
                .and_then(|e| e.fat_g)
                .or(Some(config.fallback_fat_target_g)),
        }
    }
}
