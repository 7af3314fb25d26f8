//! Garmin Connect activity export adapter
//!
//! Parses the row-per-activity CSV export and maps it to canonical
//! [`Activity`] records. Handles:
//! - Comma-formatted numeric strings ("8,980" -> 8980)
//! - Pace stored as "MM:SS" -> decimal minutes
//! - "--" sentinel -> missing
//! - Body Battery Drain stored as negative -> absolute value
//! - Ground contact time with a trailing "ms" unit label
//! - Trail run classification (total ascent above the configured threshold)
//! - Activity type classification (running vs. strength)

use std::io;
use std::path::Path;

use csv::StringRecord;

use crate::config::Config;
use crate::error::PeakformError;
use crate::types::{Activity, ActivityKind};
use crate::values;
use crate::week::WeekWindow;

/// Parsed activity export with type- and window-filtered views.
#[derive(Debug, Clone)]
pub struct GarminData {
    activities: Vec<Activity>,
}

/// Column positions resolved from the export header, once per load.
struct Columns {
    activity_type: Option<usize>,
    date: usize,
    title: Option<usize>,
    distance: Option<usize>,
    calories: Option<usize>,
    duration: Option<usize>,
    moving_time: Option<usize>,
    elapsed_time: Option<usize>,
    avg_hr: Option<usize>,
    max_hr: Option<usize>,
    aerobic_te: Option<usize>,
    avg_cadence: Option<usize>,
    max_cadence: Option<usize>,
    avg_pace: Option<usize>,
    best_pace: Option<usize>,
    avg_gap: Option<usize>,
    total_ascent: Option<usize>,
    total_descent: Option<usize>,
    avg_stride_length: Option<usize>,
    avg_vertical_ratio: Option<usize>,
    avg_vertical_osc: Option<usize>,
    avg_ground_contact: Option<usize>,
    normalized_power: Option<usize>,
    avg_power: Option<usize>,
    body_battery_drain: Option<usize>,
    min_elevation: Option<usize>,
    max_elevation: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, PeakformError> {
        let idx = |name: &str| headers.iter().position(|h| h.trim() == name);
        let date = idx("Date")
            .ok_or_else(|| PeakformError::MissingDateColumn("activity export".to_string()))?;
        Ok(Self {
            activity_type: idx("Activity Type"),
            date,
            title: idx("Title"),
            distance: idx("Distance"),
            calories: idx("Calories"),
            duration: idx("Time"),
            moving_time: idx("Moving Time"),
            elapsed_time: idx("Elapsed Time"),
            avg_hr: idx("Avg HR"),
            max_hr: idx("Max HR"),
            aerobic_te: idx("Aerobic TE"),
            avg_cadence: idx("Avg Run Cadence"),
            max_cadence: idx("Max Run Cadence"),
            avg_pace: idx("Avg Pace"),
            best_pace: idx("Best Pace"),
            avg_gap: idx("Avg GAP"),
            total_ascent: idx("Total Ascent"),
            total_descent: idx("Total Descent"),
            avg_stride_length: idx("Avg Stride Length"),
            avg_vertical_ratio: idx("Avg Vertical Ratio"),
            avg_vertical_osc: idx("Avg Vertical Oscillation"),
            avg_ground_contact: idx("Avg Ground Contact Time"),
            normalized_power: idx("Normalized Power"),
            avg_power: idx("Avg Power"),
            body_battery_drain: idx("Body Battery Drain"),
            min_elevation: idx("Min Elevation"),
            max_elevation: idx("Max Elevation"),
        })
    }
}

fn convert_row(record: &StringRecord, cols: &Columns, config: &Config) -> Activity {
    let cell = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("").trim();
    let numeric = |i: Option<usize>| values::parse_numeric(cell(i));
    let pace = |i: Option<usize>| values::parse_pace(cell(i));
    let duration = |i: Option<usize>| values::parse_duration_secs(cell(i));

    let activity_type = cell(cols.activity_type).to_string();
    let kind = if config.is_running_type(&activity_type) {
        ActivityKind::Running
    } else if config.is_strength_type(&activity_type) {
        ActivityKind::Strength
    } else {
        ActivityKind::Other
    };

    let total_ascent_ft = numeric(cols.total_ascent);
    // Drain is a magnitude; the negative sign is a source artifact.
    let body_battery_drain = numeric(cols.body_battery_drain).map(f64::abs);

    let title = cell(cols.title);

    Activity {
        date: values::parse_date(record.get(cols.date).unwrap_or("")),
        activity_type,
        title: (!title.is_empty()).then(|| title.to_string()),
        kind,
        is_trail: total_ascent_ft.map_or(false, |a| a > config.trail_run_ascent_ft),
        distance_mi: numeric(cols.distance),
        calories: numeric(cols.calories),
        duration_sec: duration(cols.duration),
        moving_time_sec: duration(cols.moving_time),
        elapsed_time_sec: duration(cols.elapsed_time),
        avg_hr: numeric(cols.avg_hr),
        max_hr: numeric(cols.max_hr),
        aerobic_te: numeric(cols.aerobic_te),
        avg_cadence: numeric(cols.avg_cadence),
        max_cadence: numeric(cols.max_cadence),
        avg_pace_min: pace(cols.avg_pace),
        best_pace_min: pace(cols.best_pace),
        avg_gap_min: pace(cols.avg_gap),
        total_ascent_ft,
        total_descent_ft: numeric(cols.total_descent),
        avg_stride_length: numeric(cols.avg_stride_length),
        avg_vertical_ratio: numeric(cols.avg_vertical_ratio),
        avg_vertical_osc: numeric(cols.avg_vertical_osc),
        avg_ground_contact_ms: values::parse_numeric_with_unit(cell(cols.avg_ground_contact), "ms"),
        normalized_power: numeric(cols.normalized_power),
        avg_power: numeric(cols.avg_power),
        body_battery_drain,
        min_elevation_ft: numeric(cols.min_elevation),
        max_elevation_ft: numeric(cols.max_elevation),
    }
}

impl GarminData {
    /// Parse an activity export from any reader.
    pub fn from_reader<R: io::Read>(reader: R, config: &Config) -> Result<Self, PeakformError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let cols = Columns::resolve(csv_reader.headers()?)?;

        let mut activities = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            activities.push(convert_row(&record, &cols, config));
        }

        // Ascending by date; rows without one sort last and are excluded
        // by every window slice anyway.
        activities.sort_by_key(|a| (a.date.is_none(), a.date));

        Ok(Self { activities })
    }

    /// Parse an activity export from CSV text.
    pub fn from_csv_str(text: &str, config: &Config) -> Result<Self, PeakformError> {
        Self::from_reader(text.as_bytes(), config)
    }

    /// Parse an activity export from a file path.
    pub fn from_path(path: &Path, config: &Config) -> Result<Self, PeakformError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config)
    }

    // ------------------------------------------------------------------
    // Filtered views
    // ------------------------------------------------------------------

    /// All parsed activities, ascending by date.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// All running activities (road + trail + treadmill).
    pub fn runs(&self) -> Vec<&Activity> {
        self.activities
            .iter()
            .filter(|a| a.kind == ActivityKind::Running)
            .collect()
    }

    /// Runs below the trail ascent threshold.
    pub fn flat_runs(&self) -> Vec<&Activity> {
        self.runs().into_iter().filter(|a| !a.is_trail).collect()
    }

    /// Runs above the trail ascent threshold.
    pub fn trail_runs(&self) -> Vec<&Activity> {
        self.runs().into_iter().filter(|a| a.is_trail).collect()
    }

    /// Activities in the strength set.
    pub fn strength_sessions(&self) -> Vec<&Activity> {
        self.activities
            .iter()
            .filter(|a| a.kind == ActivityKind::Strength)
            .collect()
    }

    /// All activities whose date falls inside the window.
    pub fn in_window(&self, window: &WeekWindow) -> Vec<&Activity> {
        self.activities
            .iter()
            .filter(|a| a.date.map_or(false, |d| window.contains(d)))
            .collect()
    }

    /// Runs inside the window, optionally restricted to the trail subset.
    pub fn runs_in_window(&self, window: &WeekWindow, trail_only: bool) -> Vec<&Activity> {
        self.runs()
            .into_iter()
            .filter(|a| a.date.map_or(false, |d| window.contains(d)))
            .filter(|a| !trail_only || a.is_trail)
            .collect()
    }
}
