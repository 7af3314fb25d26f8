//! Running metrics analyzer
//!
//! Computes weekly running stats (flat vs. trail) and compares against a
//! 4-week rolling average for trend detection.

use serde::{Deserialize, Serialize};

use crate::adapters::GarminData;
use crate::config::Config;
use crate::types::Activity;
use crate::values::{self, mean};
use crate::week::WeekWindow;

/// Number of prior weeks in the rolling baseline.
const ROLLING_WEEKS: usize = 4;

/// Pace must move by more than this (min/mi) to count as a directional signal.
const PACE_SIGNAL_BAND_MIN: f64 = 0.05;

/// HR may rise by up to this (bpm) and still count as "holding steady".
const HR_SIGNAL_BAND_BPM: f64 = 2.0;

/// Running statistics for a single week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunWeekStats {
    pub week: WeekWindow,

    // Totals
    pub total_miles: f64,
    pub total_elevation_gain_ft: f64,
    pub run_count: usize,

    // Flat-run averages (ascent below the trail threshold)
    pub flat_run_count: usize,
    pub flat_avg_pace_min: Option<f64>,
    pub flat_avg_hr: Option<f64>,
    pub flat_avg_cadence: Option<f64>,
    pub flat_avg_aerobic_te: Option<f64>,
    pub flat_avg_ground_contact_ms: Option<f64>,

    /// Longest single run in the window.
    pub longest_run_miles: f64,

    // Trail/mountain runs, tracked separately and never mixed into the
    // flat averages
    pub trail_run_count: usize,
    pub trail_total_miles: f64,
    pub trail_total_elevation_ft: f64,

    // Recovery cost over the whole window (flat and trail)
    pub avg_body_battery_drain: Option<f64>,
    pub max_body_battery_drain: Option<f64>,

    /// HR per min/mi of pace, flat runs only.
    pub hr_pace_efficiency: Option<f64>,
}

impl RunWeekStats {
    pub(crate) fn empty(week: WeekWindow) -> Self {
        Self {
            week,
            total_miles: 0.0,
            total_elevation_gain_ft: 0.0,
            run_count: 0,
            flat_run_count: 0,
            flat_avg_pace_min: None,
            flat_avg_hr: None,
            flat_avg_cadence: None,
            flat_avg_aerobic_te: None,
            flat_avg_ground_contact_ms: None,
            longest_run_miles: 0.0,
            trail_run_count: 0,
            trail_total_miles: 0.0,
            trail_total_elevation_ft: 0.0,
            avg_body_battery_drain: None,
            max_body_battery_drain: None,
            hr_pace_efficiency: None,
        }
    }

    /// Flat average pace in the "M:SS" display form.
    pub fn flat_avg_pace_display(&self) -> String {
        values::format_pace(self.flat_avg_pace_min)
    }
}

/// Output of the running analyzer for a given week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningAnalysis {
    pub current: RunWeekStats,
    pub rolling_4wk: RunWeekStats,

    // Directional changes, current vs. rolling average
    pub mileage_change_pct: Option<f64>,
    /// Negative = faster (improvement).
    pub pace_change_min: Option<f64>,
    /// Negative = lower (improvement).
    pub hr_change: Option<f64>,
    pub cadence_change: Option<f64>,
    pub ground_contact_change_ms: Option<f64>,

    // Flags
    pub overreach_flag: bool,
    pub recovery_debt_flag: bool,

    /// Pace down while HR holds steady or drops.
    pub aerobic_adaptation_signal: bool,
    /// Pace up while HR climbs.
    pub fatigue_signal: bool,
}

fn mean_field(items: &[&Activity], f: impl Fn(&Activity) -> Option<f64>) -> Option<f64> {
    let vals: Vec<Option<f64>> = items.iter().map(|a| f(a)).collect();
    mean(&vals)
}

/// Compute running stats for all runs inside the window.
fn compute_week_stats(all_runs: &[&Activity], week: WeekWindow) -> RunWeekStats {
    let mut stats = RunWeekStats::empty(week);

    let window: Vec<&Activity> = all_runs
        .iter()
        .filter(|a| a.date.map_or(false, |d| week.contains(d)))
        .copied()
        .collect();

    if window.is_empty() {
        return stats;
    }

    stats.run_count = window.len();
    stats.total_miles = window.iter().filter_map(|a| a.distance_mi).sum();
    stats.total_elevation_gain_ft = window.iter().filter_map(|a| a.total_ascent_ft).sum();
    stats.longest_run_miles = window
        .iter()
        .filter_map(|a| a.distance_mi)
        .fold(0.0, f64::max);

    let flat: Vec<&Activity> = window.iter().filter(|a| !a.is_trail).copied().collect();
    stats.flat_run_count = flat.len();

    if !flat.is_empty() {
        stats.flat_avg_pace_min = mean_field(&flat, |a| a.avg_pace_min);
        stats.flat_avg_hr = mean_field(&flat, |a| a.avg_hr);
        stats.flat_avg_cadence = mean_field(&flat, |a| a.avg_cadence);
        stats.flat_avg_aerobic_te = mean_field(&flat, |a| a.aerobic_te);
        stats.flat_avg_ground_contact_ms = mean_field(&flat, |a| a.avg_ground_contact_ms);

        stats.hr_pace_efficiency = match (stats.flat_avg_hr, stats.flat_avg_pace_min) {
            (Some(hr), Some(pace)) if pace > 0.0 => Some(hr / pace),
            _ => None,
        };
    }

    let trail: Vec<&Activity> = window.iter().filter(|a| a.is_trail).copied().collect();
    stats.trail_run_count = trail.len();
    stats.trail_total_miles = trail.iter().filter_map(|a| a.distance_mi).sum();
    stats.trail_total_elevation_ft = trail.iter().filter_map(|a| a.total_ascent_ft).sum();

    // Body battery drain covers the whole window, not just flat runs.
    stats.avg_body_battery_drain = mean_field(&window, |a| a.body_battery_drain);
    stats.max_body_battery_drain = window
        .iter()
        .filter_map(|a| a.body_battery_drain)
        .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))));

    stats
}

/// Average RunWeekStats across the prior rolling weeks. Fields missing in a
/// given prior week are excluded from that field's average; count-like
/// fields round to the nearest integer after averaging.
fn compute_rolling_stats(all_runs: &[&Activity], week: WeekWindow) -> RunWeekStats {
    let prior: Vec<RunWeekStats> = week
        .prior_windows(ROLLING_WEEKS)
        .into_iter()
        .map(|w| compute_week_stats(all_runs, w))
        .collect();

    let avg_present = |f: &dyn Fn(&RunWeekStats) -> Option<f64>| {
        let vals: Vec<Option<f64>> = prior.iter().map(|s| f(s)).collect();
        mean(&vals)
    };
    let avg_total = |f: &dyn Fn(&RunWeekStats) -> f64| {
        let vals: Vec<Option<f64>> = prior.iter().map(|s| Some(f(s))).collect();
        mean(&vals).unwrap_or(0.0)
    };

    let mut rolling = RunWeekStats::empty(week);
    rolling.total_miles = avg_total(&|s| s.total_miles);
    rolling.total_elevation_gain_ft = avg_total(&|s| s.total_elevation_gain_ft);
    rolling.run_count = avg_total(&|s| s.run_count as f64).round() as usize;
    rolling.flat_avg_pace_min = avg_present(&|s| s.flat_avg_pace_min);
    rolling.flat_avg_hr = avg_present(&|s| s.flat_avg_hr);
    rolling.flat_avg_cadence = avg_present(&|s| s.flat_avg_cadence);
    rolling.flat_avg_aerobic_te = avg_present(&|s| s.flat_avg_aerobic_te);
    rolling.flat_avg_ground_contact_ms = avg_present(&|s| s.flat_avg_ground_contact_ms);
    rolling.longest_run_miles = avg_total(&|s| s.longest_run_miles);
    rolling.trail_run_count = avg_total(&|s| s.trail_run_count as f64).round() as usize;
    rolling.avg_body_battery_drain = avg_present(&|s| s.avg_body_battery_drain);
    rolling
}

/// Run the full running analysis for the given week.
pub fn analyze(garmin: &GarminData, week: WeekWindow, config: &Config) -> RunningAnalysis {
    let all_runs = garmin.runs();

    let current = compute_week_stats(&all_runs, week);
    let rolling = compute_rolling_stats(&all_runs, week);

    let mut result = RunningAnalysis {
        current,
        rolling_4wk: rolling,
        mileage_change_pct: None,
        pace_change_min: None,
        hr_change: None,
        cadence_change: None,
        ground_contact_change_ms: None,
        overreach_flag: false,
        recovery_debt_flag: false,
        aerobic_adaptation_signal: false,
        fatigue_signal: false,
    };

    if result.rolling_4wk.total_miles > 0.0 {
        let pct = (result.current.total_miles - result.rolling_4wk.total_miles)
            / result.rolling_4wk.total_miles;
        result.mileage_change_pct = Some(pct);
        result.overreach_flag = pct > config.mileage_overreach_pct;
    }

    let delta = |cur: Option<f64>, roll: Option<f64>| match (cur, roll) {
        (Some(c), Some(r)) => Some(c - r),
        _ => None,
    };
    result.pace_change_min = delta(
        result.current.flat_avg_pace_min,
        result.rolling_4wk.flat_avg_pace_min,
    );
    result.hr_change = delta(result.current.flat_avg_hr, result.rolling_4wk.flat_avg_hr);
    result.cadence_change = delta(
        result.current.flat_avg_cadence,
        result.rolling_4wk.flat_avg_cadence,
    );
    result.ground_contact_change_ms = delta(
        result.current.flat_avg_ground_contact_ms,
        result.rolling_4wk.flat_avg_ground_contact_ms,
    );

    // Both directional signals require both deltas; their conditions are
    // mutually exclusive by construction.
    if let (Some(pace), Some(hr)) = (result.pace_change_min, result.hr_change) {
        if pace < -PACE_SIGNAL_BAND_MIN && hr <= HR_SIGNAL_BAND_BPM {
            result.aerobic_adaptation_signal = true;
        }
        if pace > PACE_SIGNAL_BAND_MIN && hr > HR_SIGNAL_BAND_BPM {
            result.fatigue_signal = true;
        }
    }

    if let Some(drain) = result.current.avg_body_battery_drain {
        result.recovery_debt_flag = drain > config.body_battery_drain_concern;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "Activity Type,Date,Title,Distance,Avg HR,Avg Run Cadence,Avg Pace,\
Total Ascent,Avg Ground Contact Time,Body Battery Drain";

    fn run_row(date: &str, miles: f64, pace: &str, hr: f64, ascent: f64, drain: f64) -> String {
        format!("Running,{date},run,{miles},{hr},166,{pace},{ascent},250,-{drain}")
    }

    fn load(rows: &[String]) -> GarminData {
        let csv = format!("{HEADER}\n{}\n", rows.join("\n"));
        GarminData::from_csv_str(&csv, &Config::default()).unwrap()
    }

    fn week() -> WeekWindow {
        // Monday 2026-03-16 through Sunday 2026-03-22.
        WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap())
    }

    /// One 20-mile run in each of the four prior weeks.
    fn prior_rows(pace: &str, hr: f64) -> Vec<String> {
        ["2026-03-10", "2026-03-03", "2026-02-24", "2026-02-17"]
            .iter()
            .map(|d| run_row(d, 20.0, pace, hr, 100.0, 10.0))
            .collect()
    }

    #[test]
    fn test_overreach_scenario() {
        let mut rows = prior_rows("8:30", 150.0);
        rows.push(run_row("2026-03-17", 23.0, "8:30", 150.0, 100.0, 10.0));
        let analysis = analyze(&load(&rows), week(), &Config::default());

        assert_eq!(analysis.rolling_4wk.total_miles, 20.0);
        assert_eq!(analysis.current.total_miles, 23.0);
        assert!((analysis.mileage_change_pct.unwrap() - 0.15).abs() < 1e-9);
        assert!(analysis.overreach_flag);
    }

    #[test]
    fn test_aerobic_adaptation_signal() {
        let mut rows = prior_rows("8:30", 150.0);
        rows.push(run_row("2026-03-17", 20.0, "8:15", 150.0, 100.0, 10.0));
        let analysis = analyze(&load(&rows), week(), &Config::default());

        assert!((analysis.pace_change_min.unwrap() + 0.25).abs() < 1e-9);
        assert!(analysis.aerobic_adaptation_signal);
        assert!(!analysis.fatigue_signal);
        assert!(!analysis.overreach_flag);
    }

    #[test]
    fn test_fatigue_signal() {
        let mut rows = prior_rows("8:30", 150.0);
        rows.push(run_row("2026-03-17", 20.0, "8:45", 155.0, 100.0, 10.0));
        let analysis = analyze(&load(&rows), week(), &Config::default());

        assert!(analysis.fatigue_signal);
        assert!(!analysis.aerobic_adaptation_signal);
    }

    #[test]
    fn test_trail_runs_excluded_from_flat_averages() {
        let rows = vec![
            run_row("2026-03-17", 5.0, "8:00", 150.0, 100.0, 12.0),
            // Ascent above the threshold: trail, its slow pace must not
            // pollute the flat average.
            run_row("2026-03-18", 8.0, "11:00", 155.0, 1400.0, 30.0),
        ];
        let analysis = analyze(&load(&rows), week(), &Config::default());
        let cur = &analysis.current;

        assert_eq!(cur.run_count, 2);
        assert_eq!(cur.flat_run_count, 1);
        assert_eq!(cur.flat_avg_pace_min, Some(8.0));
        assert_eq!(cur.trail_run_count, 1);
        assert_eq!(cur.trail_total_miles, 8.0);
        assert_eq!(cur.trail_total_elevation_ft, 1400.0);
        // Drain covers the whole window.
        assert_eq!(cur.avg_body_battery_drain, Some(21.0));
        assert_eq!(cur.max_body_battery_drain, Some(30.0));
        assert!(analysis.recovery_debt_flag);
    }

    #[test]
    fn test_empty_window_yields_default_stats() {
        let rows = prior_rows("8:30", 150.0);
        let analysis = analyze(&load(&rows), week(), &Config::default());

        assert_eq!(analysis.current.run_count, 0);
        assert_eq!(analysis.current.total_miles, 0.0);
        assert_eq!(analysis.current.flat_avg_pace_min, None);
        // Rolling baseline still present, so the change reads -100%.
        assert!((analysis.mileage_change_pct.unwrap() + 1.0).abs() < 1e-9);
        assert!(!analysis.overreach_flag);
        // No current pace: no directional signal either way.
        assert_eq!(analysis.pace_change_min, None);
        assert!(!analysis.aerobic_adaptation_signal);
    }

    #[test]
    fn test_rolling_skips_empty_prior_weeks_for_averages() {
        // Only two of the four prior weeks have runs; pace averages over
        // those two, while mileage averages over all four (empty = 0).
        let rows = vec![
            run_row("2026-03-10", 10.0, "9:00", 148.0, 100.0, 10.0),
            run_row("2026-03-03", 20.0, "8:00", 152.0, 100.0, 10.0),
            run_row("2026-03-17", 15.0, "8:30", 150.0, 100.0, 10.0),
        ];
        let analysis = analyze(&load(&rows), week(), &Config::default());

        assert_eq!(analysis.rolling_4wk.total_miles, 7.5);
        assert_eq!(analysis.rolling_4wk.flat_avg_pace_min, Some(8.5));
        assert_eq!(analysis.rolling_4wk.run_count, 1); // 0.5 rounds up
    }
}
