//! Static configuration for the weekly analysis
//!
//! All thresholds, classification sets, and fallback targets live here.
//! The configuration is built once at process start and passed by reference
//! into every component; nothing mutates it afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // ------------------------------------------------------------------
    // User profile
    // ------------------------------------------------------------------
    /// Goal body weight (lbs)
    pub goal_weight_lbs: f64,
    /// Date consistent tracking resumed after the logging gap
    pub tracking_restart: NaiveDate,
    /// Days after the restart during which the expenditure estimate is
    /// still recalibrating
    pub recalibration_window_days: i64,

    // ------------------------------------------------------------------
    // Nutrition fallback targets (used when no live target covers a week)
    // ------------------------------------------------------------------
    pub fallback_calorie_target: f64,
    pub fallback_protein_target_g: f64,
    pub fallback_carbs_target_g: f64,
    pub fallback_fat_target_g: f64,

    // ------------------------------------------------------------------
    // Nutrition thresholds
    // ------------------------------------------------------------------
    /// Below this average daily protein: muscle preservation concern
    pub protein_preservation_min_g: f64,
    /// Below this average daily carbs while running high mileage: underfueling
    pub carbs_underfuel_min_g: f64,
    /// Weekly mileage above which the underfuel check applies (strict)
    pub underfuel_mileage_mi: f64,
    /// A day within +/- this many kcal of target counts as "on target"
    pub calorie_adherence_window_kcal: f64,
    /// Calorie standard deviation above this: inconsistent adherence
    pub calorie_variance_concern_stdev: f64,
    /// Fewer logged days than this: incomplete week
    pub min_logged_days: usize,
    /// Micronutrient daily targets, checked at 80% adherence.
    /// Order is fixed; flags are emitted in this order.
    pub micronutrient_targets: Vec<(String, f64)>,

    // ------------------------------------------------------------------
    // Body composition thresholds
    // ------------------------------------------------------------------
    /// Trend change within +/- this band counts as flat (stalled)
    pub trend_flat_band_lbs: f64,
    /// Minimum absolute trend change usable as a weekly rate; below it the
    /// deficit-based fallback applies
    pub trend_rate_min_lbs: f64,
    /// Energy equivalent of one pound of body weight
    pub kcal_per_lb: f64,

    // ------------------------------------------------------------------
    // Running thresholds
    // ------------------------------------------------------------------
    /// Total ascent above this reclassifies a run as trail/mountain
    pub trail_run_ascent_ft: f64,
    /// Mileage above the 4-week average by more than this fraction: overreach
    pub mileage_overreach_pct: f64,
    /// Average body battery drain above this: recovery debt
    pub body_battery_drain_concern: f64,
    /// Ground contact time rising by more than this (ms): form concern
    pub ground_contact_concern_ms: f64,

    // ------------------------------------------------------------------
    // Activity classification sets (strings as they appear in the export)
    // ------------------------------------------------------------------
    pub running_activity_types: Vec<String>,
    pub strength_activity_types: Vec<String>,

    /// Muscle groups most critical to monitor (running injury prevention)
    pub priority_muscle_groups: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            goal_weight_lbs: 160.0,
            tracking_restart: NaiveDate::from_ymd_opt(2026, 2, 16).expect("valid date"),
            recalibration_window_days: 21,

            fallback_calorie_target: 1377.0,
            fallback_protein_target_g: 153.0,
            fallback_carbs_target_g: 87.0,
            fallback_fat_target_g: 45.0,

            protein_preservation_min_g: 140.0,
            carbs_underfuel_min_g: 80.0,
            underfuel_mileage_mi: 30.0,
            calorie_adherence_window_kcal: 100.0,
            calorie_variance_concern_stdev: 300.0,
            min_logged_days: 5,
            micronutrient_targets: vec![
                ("fiber".to_string(), 25.0),
                ("iron".to_string(), 18.0),
                ("vitamin_d".to_string(), 15.0),
                ("potassium".to_string(), 3400.0),
                ("magnesium".to_string(), 420.0),
                ("sodium".to_string(), 2300.0),
                ("calcium".to_string(), 1000.0),
                ("vitamin_b12".to_string(), 2.4),
                ("zinc".to_string(), 11.0),
            ],

            trend_flat_band_lbs: 0.1,
            trend_rate_min_lbs: 0.05,
            kcal_per_lb: 3500.0,

            trail_run_ascent_ft: 500.0,
            mileage_overreach_pct: 0.10,
            body_battery_drain_concern: 15.0,
            ground_contact_concern_ms: 5.0,

            running_activity_types: vec![
                "Running".to_string(),
                "Treadmill Running".to_string(),
                "Trail Running".to_string(),
            ],
            strength_activity_types: vec![
                "Strength Training".to_string(),
                "Gym".to_string(),
                "Indoor Rowing".to_string(),
                "Cycling".to_string(),
                "Indoor Cycling".to_string(),
            ],
            priority_muscle_groups: vec![
                "Glutes".to_string(),
                "Hips".to_string(),
                "Core".to_string(),
                "Hamstrings".to_string(),
            ],
        }
    }
}

impl Config {
    /// Whether an activity type string belongs to the running set.
    pub fn is_running_type(&self, activity_type: &str) -> bool {
        self.running_activity_types
            .iter()
            .any(|t| t == activity_type)
    }

    /// Whether an activity type string belongs to the strength set.
    pub fn is_strength_type(&self, activity_type: &str) -> bool {
        self.strength_activity_types
            .iter()
            .any(|t| t == activity_type)
    }
}
