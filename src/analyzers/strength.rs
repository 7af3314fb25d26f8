//! Strength training analyzer
//!
//! Aggregates per-muscle-group set counts and per-exercise loads for the
//! week, checks progressive overload against the best of the prior four
//! weeks, and flags missed priority groups and volume drops.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::adapters::MacroFactorData;
use crate::config::Config;
use crate::week::WeekWindow;

/// Number of prior weeks in the rolling baseline.
const ROLLING_WEEKS: usize = 4;

/// Current max this far below the rolling best counts as a regression.
const REGRESSION_FRACTION: f64 = 0.95;

/// Rolling set volume dropping by more than this fraction is flagged.
const VOLUME_DROP_FRACTION: f64 = 0.25;

/// Strength metrics for a single week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthWeekStats {
    pub week: WeekWindow,

    /// Days in the window with at least one set logged.
    pub workout_days: usize,

    /// Total sets per muscle group, positive totals only.
    pub sets_by_muscle: BTreeMap<String, f64>,

    /// Heaviest weight per exercise (lbs), positive values only.
    pub heaviest_by_exercise: BTreeMap<String, f64>,

    /// Total volume per exercise (lbs), positive totals only.
    pub volume_by_exercise: BTreeMap<String, f64>,
}

impl StrengthWeekStats {
    pub(crate) fn empty(week: WeekWindow) -> Self {
        Self {
            week,
            workout_days: 0,
            sets_by_muscle: BTreeMap::new(),
            heaviest_by_exercise: BTreeMap::new(),
            volume_by_exercise: BTreeMap::new(),
        }
    }
}

/// Output of the strength analyzer for a given week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthAnalysis {
    pub current: StrengthWeekStats,

    /// Rolling baseline: sets averaged per group over the weeks it appears
    /// in; heaviest taken as the best (max) prior performance.
    pub prior_4wk: StrengthWeekStats,

    /// Exercises whose current max strictly exceeds the rolling best,
    /// formatted for display.
    pub pr_exercises: Vec<String>,

    /// Exercises whose current max fell more than 5% below the rolling best.
    pub regression_exercises: Vec<String>,

    /// Priority muscle groups with no sets logged this week.
    pub missed_muscle_groups: Vec<String>,

    /// Muscle groups whose set volume dropped more than 25% vs. the rolling
    /// average: group -> percent drop, rounded to one decimal.
    pub volume_drop_flags: BTreeMap<String, f64>,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn positive_only(map: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    map.into_iter().filter(|(_, v)| *v > 0.0).collect()
}

fn week_stats(mf: &MacroFactorData, week: WeekWindow) -> StrengthWeekStats {
    let mut stats = StrengthWeekStats::empty(week);
    stats.workout_days = mf.muscle_groups().days_with_positive_row_sum(&week);
    stats.sets_by_muscle = positive_only(mf.muscle_groups().sum_by_column(&week));
    stats.heaviest_by_exercise = positive_only(mf.exercises_heaviest().max_by_column(&week));
    stats.volume_by_exercise = positive_only(mf.exercises_volume().sum_by_column(&week));
    stats
}

/// Run the full strength analysis for the given week.
pub fn analyze(mf: &MacroFactorData, week: WeekWindow, config: &Config) -> StrengthAnalysis {
    let current = week_stats(mf, week);

    let prior_weeks: Vec<StrengthWeekStats> = week
        .prior_windows(ROLLING_WEEKS)
        .into_iter()
        .map(|w| week_stats(mf, w))
        .collect();

    // Sets: average per group across the weeks where it had any logged value.
    let mut prior = StrengthWeekStats::empty(week);
    let mut group_values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for w in &prior_weeks {
        for (group, sets) in &w.sets_by_muscle {
            group_values.entry(group.as_str()).or_default().push(*sets);
        }
    }
    for (group, vals) in group_values {
        prior
            .sets_by_muscle
            .insert(group.to_string(), vals.iter().sum::<f64>() / vals.len() as f64);
    }

    // Heaviest: best recent performance, not the typical one.
    for w in &prior_weeks {
        for (exercise, max) in &w.heaviest_by_exercise {
            prior
                .heaviest_by_exercise
                .entry(exercise.clone())
                .and_modify(|best| *best = best.max(*max))
                .or_insert(*max);
        }
    }

    let mut analysis = StrengthAnalysis {
        current,
        prior_4wk: prior,
        pr_exercises: Vec::new(),
        regression_exercises: Vec::new(),
        missed_muscle_groups: Vec::new(),
        volume_drop_flags: BTreeMap::new(),
    };

    // Progressive overload / regression detection.
    for (exercise, cur_max) in &analysis.current.heaviest_by_exercise {
        if let Some(prior_max) = analysis.prior_4wk.heaviest_by_exercise.get(exercise) {
            if cur_max > prior_max {
                analysis
                    .pr_exercises
                    .push(format!("{exercise}: {prior_max:.0} → {cur_max:.0} lbs"));
            } else if *cur_max < prior_max * REGRESSION_FRACTION {
                analysis
                    .regression_exercises
                    .push(format!("{exercise}: {prior_max:.0} → {cur_max:.0} lbs"));
            }
        }
    }

    // Priority groups with no sets this week, by fuzzy column-name match.
    for group in &config.priority_muscle_groups {
        let needle = group.to_lowercase();
        let matched = analysis
            .current
            .sets_by_muscle
            .keys()
            .any(|col| col.to_lowercase().contains(&needle));
        if !matched {
            analysis.missed_muscle_groups.push(group.clone());
        }
    }

    // Volume drops vs. the rolling average.
    for (group, avg_sets) in &analysis.prior_4wk.sets_by_muscle {
        if *avg_sets > 0.0 {
            let cur_sets = analysis
                .current
                .sets_by_muscle
                .get(group)
                .copied()
                .unwrap_or(0.0);
            let drop = (avg_sets - cur_sets) / avg_sets;
            if drop > VOLUME_DROP_FRACTION {
                analysis
                    .volume_drop_flags
                    .insert(group.clone(), round1(drop * 100.0));
            }
        }
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Sheet;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn week() -> WeekWindow {
        // Monday 2026-03-16 through Sunday 2026-03-22.
        WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap())
    }

    fn load(sheets: Vec<Sheet>) -> MacroFactorData {
        MacroFactorData::from_sheets(&sheets).unwrap()
    }

    #[test]
    fn test_pr_detection_format() {
        let mf = load(vec![Sheet::new(
            "Heaviest Weight",
            "Date,Bench Press,Goblet Squat\n\
             2026-03-10,135,50\n\
             2026-03-03,130,55\n\
             2026-03-17,140,55\n",
        )]);
        let analysis = analyze(&mf, week(), &Config::default());

        // Rolling best bench is 135; 140 is a new PR. Squat ties its best:
        // neither PR nor regression.
        assert_eq!(analysis.pr_exercises, vec!["Bench Press: 135 → 140 lbs"]);
        assert!(analysis.regression_exercises.is_empty());
    }

    #[test]
    fn test_regression_detection() {
        let mf = load(vec![Sheet::new(
            "Heaviest Weight",
            "Date,Bench Press\n2026-03-10,135\n2026-03-17,128\n",
        )]);
        let analysis = analyze(&mf, week(), &Config::default());

        // 128 is more than 5% below the rolling best of 135.
        assert_eq!(
            analysis.regression_exercises,
            vec!["Bench Press: 135 → 128 lbs"]
        );
        assert!(analysis.pr_exercises.is_empty());

        // 129 is within 5% (cutoff 128.25): no regression.
        let mf = load(vec![Sheet::new(
            "Heaviest Weight",
            "Date,Bench Press\n2026-03-10,135\n2026-03-17,129\n",
        )]);
        let analysis = analyze(&mf, week(), &Config::default());
        assert!(analysis.regression_exercises.is_empty());
    }

    #[test]
    fn test_sets_workout_days_and_missed_groups() {
        let mf = load(vec![Sheet::new(
            "Sets Per Muscle Group",
            "Date,Glutes,Core,Quads\n\
             2026-03-16,6,4,--\n\
             2026-03-18,4,--,0\n\
             2026-03-20,--,--,--\n",
        )]);
        let analysis = analyze(&mf, week(), &Config::default());
        let cur = &analysis.current;

        // The all-missing day is not a workout day.
        assert_eq!(cur.workout_days, 2);
        assert_eq!(cur.sets_by_muscle.get("Glutes"), Some(&10.0));
        assert_eq!(cur.sets_by_muscle.get("Core"), Some(&4.0));
        // Zero totals are dropped.
        assert!(!cur.sets_by_muscle.contains_key("Quads"));

        // Glutes and Core logged; Hips and Hamstrings missed.
        assert_eq!(analysis.missed_muscle_groups, vec!["Hips", "Hamstrings"]);
    }

    #[test]
    fn test_volume_drop_flags() {
        let mf = load(vec![Sheet::new(
            "Sets Per Muscle Group",
            "Date,Glutes,Core\n\
             2026-03-10,12,8\n\
             2026-03-03,12,6\n\
             2026-03-17,6,7\n",
        )]);
        let analysis = analyze(&mf, week(), &Config::default());

        // Glutes: rolling 12, current 6 -> 50% drop. Core: rolling 7,
        // current 7 -> no drop.
        assert_eq!(analysis.volume_drop_flags.get("Glutes"), Some(&50.0));
        assert!(!analysis.volume_drop_flags.contains_key("Core"));
        assert_eq!(analysis.prior_4wk.sets_by_muscle.get("Core"), Some(&7.0));
    }

    #[test]
    fn test_empty_window_defaults() {
        let mf = load(vec![]);
        let analysis = analyze(&mf, week(), &Config::default());

        assert_eq!(analysis.current.workout_days, 0);
        assert!(analysis.current.sets_by_muscle.is_empty());
        assert!(analysis.pr_exercises.is_empty());
        assert!(analysis.volume_drop_flags.is_empty());
        // With nothing logged, every priority group is missed.
        assert_eq!(
            analysis.missed_muscle_groups,
            vec!["Glutes", "Hips", "Core", "Hamstrings"]
        );
    }
}
