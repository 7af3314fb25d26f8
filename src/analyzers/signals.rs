//! Trend signal detection
//!
//! Pure aggregation over the four analyzer outputs: each triggered flag
//! becomes one categorized, human-readable signal. Output order is fixed:
//! running, then strength, then nutrition, then body composition, with a
//! fixed internal order per category. Untriggered flags contribute nothing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzers::body_comp::BodyCompAnalysis;
use crate::analyzers::nutrition::NutritionAnalysis;
use crate::analyzers::running::RunningAnalysis;
use crate::analyzers::strength::StrengthAnalysis;
use crate::config::Config;
use crate::values::format_pace;

/// Signal severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Positive,
    Warning,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Positive => "✅",
            Severity::Warning => "⚠️",
        }
    }
}

/// Signal category, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Running,
    Strength,
    Nutrition,
    BodyComp,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Running => "Running",
            Category::Strength => "Strength",
            Category::Nutrition => "Nutrition",
            Category::BodyComp => "Body Comp",
        }
    }
}

/// One detected signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
}

impl Signal {
    fn positive(category: Category, message: String) -> Self {
        Self {
            severity: Severity::Positive,
            category,
            message,
        }
    }

    fn warning(category: Category, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.severity.icon(),
            self.category.as_str(),
            self.message
        )
    }
}

/// Render "vitamin_d" as "Vitamin D" for display.
fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detect and return all triggered trend signals.
pub fn detect(
    running: &RunningAnalysis,
    strength: &StrengthAnalysis,
    nutrition: &NutritionAnalysis,
    body_comp: &BodyCompAnalysis,
    config: &Config,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    // ------------------------------------------------------------------
    // Running
    // ------------------------------------------------------------------
    if running.aerobic_adaptation_signal {
        let cur_pace = format_pace(running.current.flat_avg_pace_min);
        let rolling_pace = format_pace(running.rolling_4wk.flat_avg_pace_min);
        let cur_hr = running.current.flat_avg_hr.unwrap_or(0.0);
        signals.push(Signal::positive(
            Category::Running,
            format!(
                "Pace improving ({rolling_pace} → {cur_pace}/mi) with HR holding steady \
                 at {cur_hr:.0} — aerobic adaptation confirmed."
            ),
        ));
    }

    if running.fatigue_signal {
        let cur_pace = format_pace(running.current.flat_avg_pace_min);
        let rolling_pace = format_pace(running.rolling_4wk.flat_avg_pace_min);
        let cur_hr = running.current.flat_avg_hr.unwrap_or(0.0);
        let roll_hr = running.rolling_4wk.flat_avg_hr.unwrap_or(0.0);
        signals.push(Signal::warning(
            Category::Running,
            format!(
                "Pace slower + HR higher than 4-week avg ({rolling_pace} → {cur_pace}/mi, \
                 HR {roll_hr:.0} → {cur_hr:.0}) — potential fatigue or overtraining."
            ),
        ));
    }

    if running.overreach_flag {
        if let Some(change) = running.mileage_change_pct {
            signals.push(Signal::warning(
                Category::Running,
                format!(
                    "Weekly mileage is {:.0}% above 4-week average ({:.1} → {:.1} mi) — \
                     injury risk threshold exceeded.",
                    change * 100.0,
                    running.rolling_4wk.total_miles,
                    running.current.total_miles,
                ),
            ));
        }
    }

    if running.recovery_debt_flag {
        let drain = running.current.avg_body_battery_drain.unwrap_or(0.0);
        signals.push(Signal::warning(
            Category::Running,
            format!(
                "Average Body Battery drain per run is {drain:.0} (threshold: {:.0}) — \
                 recovery debt accumulating.",
                config.body_battery_drain_concern
            ),
        ));
    }

    if let Some(gct_change) = running.ground_contact_change_ms {
        if gct_change > config.ground_contact_concern_ms {
            let cur = running.current.flat_avg_ground_contact_ms.unwrap_or(0.0);
            let roll = running.rolling_4wk.flat_avg_ground_contact_ms.unwrap_or(0.0);
            signals.push(Signal::warning(
                Category::Running,
                format!(
                    "Ground contact time rising ({roll:.0} → {cur:.0} ms, +{gct_change:.0} ms) — \
                     possible glute/hip fatigue or form breakdown."
                ),
            ));
        }
    }

    // ------------------------------------------------------------------
    // Strength
    // ------------------------------------------------------------------
    if !strength.pr_exercises.is_empty() {
        signals.push(Signal::positive(
            Category::Strength,
            format!(
                "Progressive overload confirmed: {} exercise(s) hit new max weight this week.",
                strength.pr_exercises.len()
            ),
        ));
    }

    if !strength.missed_muscle_groups.is_empty() {
        signals.push(Signal::warning(
            Category::Strength,
            format!(
                "Zero sets logged for priority muscle group(s): {}.",
                strength.missed_muscle_groups.join(", ")
            ),
        ));
    }

    for (group, drop_pct) in &strength.volume_drop_flags {
        signals.push(Signal::warning(
            Category::Strength,
            format!("{group} volume dropped {drop_pct:.0}% vs. 4-week average."),
        ));
    }

    // ------------------------------------------------------------------
    // Nutrition
    // ------------------------------------------------------------------
    if nutrition.low_protein_flag {
        let avg = nutrition.current.avg_protein_g.unwrap_or(0.0);
        signals.push(Signal::warning(
            Category::Nutrition,
            format!(
                "Avg daily protein {avg:.0}g is below the {:.0}g muscle-preservation \
                 threshold — risk of muscle loss during caloric deficit.",
                config.protein_preservation_min_g
            ),
        ));
    }

    if nutrition.low_carb_underfuel_flag {
        let avg = nutrition.current.avg_carbs_g.unwrap_or(0.0);
        signals.push(Signal::warning(
            Category::Nutrition,
            format!(
                "Avg carbs {avg:.0}g/day while running {:.1} mi/week — underfueling risk \
                 for performance and recovery.",
                nutrition.weekly_mileage
            ),
        ));
    }

    if nutrition.high_calorie_variance_flag {
        let stdev = nutrition.current.calorie_stdev.unwrap_or(0.0);
        signals.push(Signal::warning(
            Category::Nutrition,
            format!(
                "Calorie intake std deviation is {stdev:.0} kcal (threshold: {:.0}) — \
                 inconsistent adherence may slow fat loss.",
                config.calorie_variance_concern_stdev
            ),
        ));
    }

    for flag in &nutrition.micronutrient_flags {
        signals.push(Signal::warning(
            Category::Nutrition,
            format!(
                "{} averaging {:.0}% of daily target — consider food sources or supplementation.",
                title_case(&flag.nutrient),
                flag.pct_of_target
            ),
        ));
    }

    // ------------------------------------------------------------------
    // Body composition
    // ------------------------------------------------------------------
    if body_comp.weight_rising_despite_deficit {
        signals.push(Signal::warning(
            Category::BodyComp,
            "Trend weight rising despite a logged caloric deficit — the expenditure \
             estimate is still recalibrating from the tracking gap. Maintain consistent \
             logging; the algorithm needs 2–3 more weeks of data."
                .to_string(),
        ));
    }

    if body_comp.algorithm_recalibrating {
        signals.push(Signal::warning(
            Category::BodyComp,
            "Still within the first 3 weeks post-tracking restart. The expenditure \
             estimate is likely underestimating true TDEE given run volume. \
             Consistency now = faster recalibration."
                .to_string(),
        ));
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::body_comp;
    use crate::analyzers::nutrition::{self, MicronutrientFlag};
    use crate::analyzers::running::RunWeekStats;
    use crate::analyzers::strength;
    use crate::week::WeekWindow;
    use chrono::NaiveDate;

    fn week() -> WeekWindow {
        WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap())
    }

    fn quiet_running() -> RunningAnalysis {
        RunningAnalysis {
            current: RunWeekStats::empty(week()),
            rolling_4wk: RunWeekStats::empty(week()),
            mileage_change_pct: None,
            pace_change_min: None,
            hr_change: None,
            cadence_change: None,
            ground_contact_change_ms: None,
            overreach_flag: false,
            recovery_debt_flag: false,
            aerobic_adaptation_signal: false,
            fatigue_signal: false,
        }
    }

    fn quiet_strength() -> StrengthAnalysis {
        StrengthAnalysis {
            current: strength::StrengthWeekStats::empty(week()),
            prior_4wk: strength::StrengthWeekStats::empty(week()),
            pr_exercises: Vec::new(),
            regression_exercises: Vec::new(),
            missed_muscle_groups: Vec::new(),
            volume_drop_flags: Default::default(),
        }
    }

    fn quiet_nutrition() -> NutritionAnalysis {
        NutritionAnalysis {
            current: nutrition::NutritionWeekStats::empty(week()),
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
            weekly_mileage: 0.0,
        }
    }

    fn quiet_body_comp() -> BodyCompAnalysis {
        body_comp::BodyCompAnalysis::empty(week())
    }

    #[test]
    fn test_quiet_week_emits_nothing() {
        let signals = detect(
            &quiet_running(),
            &quiet_strength(),
            &quiet_nutrition(),
            &quiet_body_comp(),
            &Config::default(),
        );
        assert!(signals.is_empty());
    }

    #[test]
    fn test_output_order_and_count() {
        let mut running = quiet_running();
        running.current.flat_avg_pace_min = Some(8.25);
        running.current.flat_avg_hr = Some(150.0);
        running.rolling_4wk.flat_avg_pace_min = Some(8.5);
        running.aerobic_adaptation_signal = true;
        running.overreach_flag = true;
        running.mileage_change_pct = Some(0.15);
        running.rolling_4wk.total_miles = 20.0;
        running.current.total_miles = 23.0;

        let mut strength = quiet_strength();
        strength.pr_exercises.push("Bench Press: 135 → 140 lbs".to_string());
        strength.missed_muscle_groups.push("Hips".to_string());

        let mut nutrition = quiet_nutrition();
        nutrition.low_protein_flag = true;
        nutrition.current.avg_protein_g = Some(130.0);
        nutrition.micronutrient_flags.push(MicronutrientFlag {
            nutrient: "vitamin_d".to_string(),
            pct_of_target: 53.3,
        });

        let mut body_comp = quiet_body_comp();
        body_comp.algorithm_recalibrating = true;

        let signals = detect(
            &running,
            &strength,
            &nutrition,
            &body_comp,
            &Config::default(),
        );

        // One signal per triggered condition, in category order.
        let categories: Vec<Category> = signals.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Running,
                Category::Running,
                Category::Strength,
                Category::Strength,
                Category::Nutrition,
                Category::Nutrition,
                Category::BodyComp,
            ]
        );

        assert_eq!(signals[0].severity, Severity::Positive);
        assert!(signals[0].message.contains("8:30 → 8:15/mi"));
        assert!(signals[1].message.contains("15% above 4-week average"));
        assert!(signals[2].message.contains("1 exercise(s)"));
        assert!(signals[3].message.contains("Hips"));
        assert!(signals[4].message.contains("130g"));
        assert!(signals[5].message.contains("Vitamin D averaging 53%"));
        assert_eq!(signals[6].severity, Severity::Warning);
    }

    #[test]
    fn test_ground_contact_threshold() {
        let mut running = quiet_running();
        running.ground_contact_change_ms = Some(4.0);
        running.current.flat_avg_ground_contact_ms = Some(254.0);
        running.rolling_4wk.flat_avg_ground_contact_ms = Some(250.0);

        let signals = detect(
            &running,
            &quiet_strength(),
            &quiet_nutrition(),
            &quiet_body_comp(),
            &Config::default(),
        );
        assert!(signals.is_empty());

        running.ground_contact_change_ms = Some(6.0);
        running.current.flat_avg_ground_contact_ms = Some(256.0);
        let signals = detect(
            &running,
            &quiet_strength(),
            &quiet_nutrition(),
            &quiet_body_comp(),
            &Config::default(),
        );
        assert_eq!(signals.len(), 1);
        assert!(signals[0].message.contains("250 → 256 ms"));
    }

    #[test]
    fn test_display_form() {
        let signal = Signal::warning(Category::Nutrition, "test".to_string());
        assert_eq!(format!("{signal}"), "⚠️ [Nutrition] test");
    }
}
