//! Canonical per-day records
//!
//! The source adapters normalize raw export rows into these typed records.
//! Every numeric field is optional: any given day may be missing any field,
//! and an absent value is represented as `None`, never as zero. Nothing
//! mutates a record after its adapter returns it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which analyzer consumes an activity, derived from its type string at
/// parse time. Activities matching neither set are inert for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Running,
    Strength,
    Other,
}

/// One row of the activity export, normalized.
///
/// Pace fields are decimal minutes per mile; duration fields are total
/// seconds; body battery drain is stored as a positive magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Calendar date; a row without one is excluded by every window slice.
    pub date: Option<NaiveDate>,
    pub activity_type: String,
    pub title: Option<String>,
    /// Derived classification, not a source field.
    pub kind: ActivityKind,
    /// Total ascent above the configured threshold reclassifies the run as
    /// trail/mountain. Absent ascent data defaults to non-trail.
    pub is_trail: bool,

    pub distance_mi: Option<f64>,
    pub calories: Option<f64>,
    pub duration_sec: Option<f64>,
    pub moving_time_sec: Option<f64>,
    pub elapsed_time_sec: Option<f64>,
    pub avg_hr: Option<f64>,
    pub max_hr: Option<f64>,
    pub aerobic_te: Option<f64>,
    pub avg_cadence: Option<f64>,
    pub max_cadence: Option<f64>,
    pub avg_pace_min: Option<f64>,
    pub best_pace_min: Option<f64>,
    pub avg_gap_min: Option<f64>,
    pub total_ascent_ft: Option<f64>,
    pub total_descent_ft: Option<f64>,
    pub avg_stride_length: Option<f64>,
    pub avg_vertical_ratio: Option<f64>,
    pub avg_vertical_osc: Option<f64>,
    pub avg_ground_contact_ms: Option<f64>,
    pub normalized_power: Option<f64>,
    pub avg_power: Option<f64>,
    pub body_battery_drain: Option<f64>,
    pub min_elevation_ft: Option<f64>,
    pub max_elevation_ft: Option<f64>,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            date: None,
            activity_type: String::new(),
            title: None,
            kind: ActivityKind::Other,
            is_trail: false,
            distance_mi: None,
            calories: None,
            duration_sec: None,
            moving_time_sec: None,
            elapsed_time_sec: None,
            avg_hr: None,
            max_hr: None,
            aerobic_te: None,
            avg_cadence: None,
            max_cadence: None,
            avg_pace_min: None,
            best_pace_min: None,
            avg_gap_min: None,
            total_ascent_ft: None,
            total_descent_ft: None,
            avg_stride_length: None,
            avg_vertical_ratio: None,
            avg_vertical_osc: None,
            avg_ground_contact_ms: None,
            normalized_power: None,
            avg_power: None,
            body_battery_drain: None,
            min_elevation_ft: None,
            max_elevation_ft: None,
        }
    }
}

/// One day of the calories/macros sheet. Presence of a row here is what
/// defines a "logged day" for adherence rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroDay {
    pub date: NaiveDate,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
}

/// One day of the expenditure (TDEE estimate) sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenditureDay {
    pub date: NaiveDate,
    pub expenditure_kcal: Option<f64>,
}

/// One raw scale reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeighIn {
    pub date: NaiveDate,
    pub weight_lbs: Option<f64>,
    pub body_fat_pct: Option<f64>,
}

/// One point of the smoothed trend-weight line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub trend_lbs: Option<f64>,
}

/// One row of the nutrition program settings sheet. The latest entry whose
/// effective date is at or before a week's end governs that whole week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    pub effective: NaiveDate,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
}

/// Nutrition targets in force for a week, live or fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
}
