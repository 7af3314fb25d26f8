//! Nutrition analyzer
//!
//! Computes weekly macro averages, adherence rates against live-or-fallback
//! targets, calorie variance, deficit vs. target, and micronutrient flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::adapters::MacroFactorData;
use crate::config::Config;
use crate::values::{mean, population_stdev};
use crate::week::WeekWindow;

/// Candidate column names for fiber; the micronutrient sheet varies.
const FIBER_COLUMNS: &[&str] = &["fiber", "dietary_fiber", "fibre"];

/// Nutrition statistics for a single week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionWeekStats {
    pub week: WeekWindow,

    /// Rows present in the calories/macros table for the window. This table
    /// alone defines "logged" for adherence rates; the expenditure and
    /// micronutrient tables may cover a different set of days.
    pub logged_days: usize,

    // Daily averages
    pub avg_calories: Option<f64>,
    pub avg_protein_g: Option<f64>,
    pub avg_carbs_g: Option<f64>,
    pub avg_fat_g: Option<f64>,
    pub avg_fiber_g: Option<f64>,

    /// Population standard deviation of logged calories.
    pub calorie_stdev: Option<f64>,

    /// Average TDEE estimate over the window.
    pub avg_expenditure: Option<f64>,

    // Targets in force for this week
    pub target_calories: Option<f64>,
    pub target_protein_g: Option<f64>,
    pub target_carbs_g: Option<f64>,
    pub target_fat_g: Option<f64>,

    // Adherence counts
    pub protein_hit_days: usize,
    pub calorie_target_days: usize,

    /// Weekly average per tracked micronutrient.
    pub avg_micronutrients: BTreeMap<String, f64>,
}

impl NutritionWeekStats {
    pub(crate) fn empty(week: WeekWindow) -> Self {
        Self {
            week,
            logged_days: 0,
            avg_calories: None,
            avg_protein_g: None,
            avg_carbs_g: None,
            avg_fat_g: None,
            avg_fiber_g: None,
            calorie_stdev: None,
            avg_expenditure: None,
            target_calories: None,
            target_protein_g: None,
            target_carbs_g: None,
            target_fat_g: None,
            protein_hit_days: 0,
            calorie_target_days: 0,
            avg_micronutrients: BTreeMap::new(),
        }
    }
}

/// A micronutrient averaging below 80% of its daily target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicronutrientFlag {
    pub nutrient: String,
    /// Percent of target achieved, rounded to one decimal.
    pub pct_of_target: f64,
}

/// Output of the nutrition analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionAnalysis {
    pub current: NutritionWeekStats,

    /// Positive = eating below expenditure.
    pub avg_daily_deficit: Option<f64>,
    /// Actual deficit minus the deficit the calorie target implies
    /// (negative = smaller deficit than planned).
    pub deficit_vs_target: Option<f64>,

    // Percent of macro targets achieved
    pub protein_pct_target: Option<f64>,
    pub carbs_pct_target: Option<f64>,
    pub fat_pct_target: Option<f64>,
    pub calories_pct_target: Option<f64>,

    // Adherence rates (0.0-1.0), undefined with zero logged days
    pub protein_hit_rate: Option<f64>,
    pub calorie_target_rate: Option<f64>,

    // Flags
    pub low_protein_flag: bool,
    pub low_carb_underfuel_flag: bool,
    pub high_calorie_variance_flag: bool,
    pub incomplete_week_flag: bool,

    /// Below-80%-of-target micronutrients, in the fixed table order.
    pub micronutrient_flags: Vec<MicronutrientFlag>,

    /// Total running miles for the week, threaded in for the underfuel check.
    pub weekly_mileage: f64,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Run the full nutrition analysis for the given week.
///
/// `weekly_mileage` comes from the running analyzer; it only participates
/// in the carb underfuel check.
pub fn analyze(
    mf: &MacroFactorData,
    week: WeekWindow,
    weekly_mileage: f64,
    config: &Config,
) -> NutritionAnalysis {
    let targets = mf.targets_for(week.end, config);

    let mut stats = NutritionWeekStats::empty(week);
    stats.target_calories = targets.calories;
    stats.target_protein_g = targets.protein_g;
    stats.target_carbs_g = targets.carbs_g;
    stats.target_fat_g = targets.fat_g;

    // ------------------------------------------------------------------
    // Calories & macros
    // ------------------------------------------------------------------
    let macro_week: Vec<_> = mf
        .calories_macros()
        .iter()
        .filter(|d| week.contains(d.date))
        .collect();
    stats.logged_days = macro_week.len();

    let cal_vals: Vec<Option<f64>> = macro_week.iter().map(|d| d.calories).collect();
    stats.avg_calories = mean(&cal_vals);
    if stats.avg_calories.is_some() {
        stats.calorie_stdev = population_stdev(&cal_vals);
    }

    let protein_vals: Vec<Option<f64>> = macro_week.iter().map(|d| d.protein_g).collect();
    stats.avg_protein_g = mean(&protein_vals);
    let protein_target = targets
        .protein_g
        .unwrap_or(config.protein_preservation_min_g);
    stats.protein_hit_days = protein_vals
        .iter()
        .flatten()
        .filter(|p| **p >= protein_target)
        .count();

    stats.avg_carbs_g = mean(&macro_week.iter().map(|d| d.carbs_g).collect::<Vec<_>>());
    stats.avg_fat_g = mean(&macro_week.iter().map(|d| d.fat_g).collect::<Vec<_>>());

    if let Some(target_cal) = targets.calories {
        stats.calorie_target_days = cal_vals
            .iter()
            .flatten()
            .filter(|c| (**c - target_cal).abs() <= config.calorie_adherence_window_kcal)
            .count();
    }

    // ------------------------------------------------------------------
    // Expenditure
    // ------------------------------------------------------------------
    let exp_vals: Vec<Option<f64>> = mf
        .expenditure()
        .iter()
        .filter(|d| week.contains(d.date))
        .map(|d| d.expenditure_kcal)
        .collect();
    stats.avg_expenditure = mean(&exp_vals);

    // ------------------------------------------------------------------
    // Micronutrients
    // ------------------------------------------------------------------
    let micro = mf.micronutrients();
    if !micro.is_empty() {
        if let Some(col) = micro.find_column(FIBER_COLUMNS) {
            if let Some(avg) = micro.column_mean(col, &week) {
                stats.avg_fiber_g = Some(avg);
                stats.avg_micronutrients.insert("fiber".to_string(), avg);
            }
        }
        for (key, _target) in &config.micronutrient_targets {
            if key == "fiber" {
                continue;
            }
            if let Some(col) = micro.find_column(&[key.as_str()]) {
                if let Some(avg) = micro.column_mean(col, &week) {
                    stats.avg_micronutrients.insert(key.clone(), avg);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Derived metrics and flags
    // ------------------------------------------------------------------
    let mut analysis = NutritionAnalysis {
        current: stats,
        avg_daily_deficit: None,
        deficit_vs_target: None,
        protein_pct_target: None,
        carbs_pct_target: None,
        fat_pct_target: None,
        calories_pct_target: None,
        protein_hit_rate: None,
        calorie_target_rate: None,
        low_protein_flag: false,
        low_carb_underfuel_flag: false,
        high_calorie_variance_flag: false,
        incomplete_week_flag: false,
        micronutrient_flags: Vec::new(),
        weekly_mileage,
    };
    let stats = &analysis.current;

    if let (Some(cal), Some(exp)) = (stats.avg_calories, stats.avg_expenditure) {
        let deficit = exp - cal;
        analysis.avg_daily_deficit = Some(deficit);
        if let Some(target_cal) = stats.target_calories {
            let target_deficit = exp - target_cal;
            if target_deficit != 0.0 {
                analysis.deficit_vs_target = Some(deficit - target_deficit);
            }
        }
    }

    let pct_of = |actual: Option<f64>, target: Option<f64>| match (actual, target) {
        (Some(a), Some(t)) if t > 0.0 => Some(a / t * 100.0),
        _ => None,
    };
    analysis.calories_pct_target = pct_of(stats.avg_calories, stats.target_calories);
    analysis.protein_pct_target = pct_of(stats.avg_protein_g, stats.target_protein_g);
    analysis.carbs_pct_target = pct_of(stats.avg_carbs_g, stats.target_carbs_g);
    analysis.fat_pct_target = pct_of(stats.avg_fat_g, stats.target_fat_g);

    if stats.logged_days > 0 {
        analysis.protein_hit_rate = Some(stats.protein_hit_days as f64 / stats.logged_days as f64);
        analysis.calorie_target_rate =
            Some(stats.calorie_target_days as f64 / stats.logged_days as f64);
    }

    if let Some(p) = stats.avg_protein_g {
        analysis.low_protein_flag = p < config.protein_preservation_min_g;
    }

    // Underfuel needs both low carbs and strictly high mileage.
    if let Some(c) = stats.avg_carbs_g {
        analysis.low_carb_underfuel_flag =
            c < config.carbs_underfuel_min_g && weekly_mileage > config.underfuel_mileage_mi;
    }

    if let Some(stdev) = stats.calorie_stdev {
        analysis.high_calorie_variance_flag = stdev > config.calorie_variance_concern_stdev;
    }

    analysis.incomplete_week_flag = stats.logged_days < config.min_logged_days;

    for (key, target) in &config.micronutrient_targets {
        if let Some(avg) = stats.avg_micronutrients.get(key) {
            let pct = avg / target * 100.0;
            if pct < 80.0 {
                analysis.micronutrient_flags.push(MicronutrientFlag {
                    nutrient: key.clone(),
                    pct_of_target: round1(pct),
                });
            }
        }
    }

    analysis
}
