//! Pipeline orchestration
//!
//! The public entry point for a weekly analysis. Analyzers are independent
//! except for two threaded values: running mileage feeds nutrition's
//! underfuel check and nutrition's deficit feeds body composition's
//! cross-check, so running runs first, then nutrition, then the rest.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::{GarminData, MacroFactorData};
use crate::analyzers::body_comp::{self, BodyCompAnalysis};
use crate::analyzers::nutrition::{self, NutritionAnalysis};
use crate::analyzers::running::{self, RunningAnalysis};
use crate::analyzers::signals::{self, Signal};
use crate::analyzers::strength::{self, StrengthAnalysis};
use crate::config::Config;
use crate::error::PeakformError;
use crate::week::WeekWindow;

/// Report producer metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

impl Default for ReportProducer {
    fn default() -> Self {
        Self {
            name: crate::PRODUCER_NAME.to_string(),
            version: crate::VERSION.to_string(),
            instance_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Complete weekly analysis payload: the four analyzer outputs plus the
/// detected signal list, wrapped with provenance metadata. The report
/// renderer consumes this; every field is either populated or explicitly
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub week: WeekWindow,
    pub running: RunningAnalysis,
    pub nutrition: NutritionAnalysis,
    pub strength: StrengthAnalysis,
    pub body_comp: BodyCompAnalysis,
    pub signals: Vec<Signal>,
}

impl WeeklyReport {
    pub fn to_json(&self) -> Result<String, PeakformError> {
        serde_json::to_string(self).map_err(PeakformError::from)
    }

    pub fn to_json_pretty(&self) -> Result<String, PeakformError> {
        serde_json::to_string_pretty(self).map_err(PeakformError::from)
    }
}

/// Run the full weekly analysis over both parsed exports.
pub fn analyze_week(
    garmin: &GarminData,
    mf: &MacroFactorData,
    week: WeekWindow,
    config: &Config,
) -> WeeklyReport {
    let running = running::analyze(garmin, week, config);

    let weekly_mileage = running.current.total_miles;
    let nutrition = nutrition::analyze(mf, week, weekly_mileage, config);

    let strength = strength::analyze(mf, week, config);

    let body_comp = body_comp::analyze(mf, week, nutrition.avg_daily_deficit, config);

    let signals = signals::detect(&running, &strength, &nutrition, &body_comp, config);

    WeeklyReport {
        producer: ReportProducer::default(),
        computed_at_utc: Utc::now().to_rfc3339(),
        week,
        running,
        nutrition,
        strength,
        body_comp,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Sheet;
    use chrono::NaiveDate;

    const GARMIN_HEADER: &str = "Activity Type,Date,Title,Distance,Avg HR,Avg Run Cadence,\
Avg Pace,Total Ascent,Avg Ground Contact Time,Body Battery Drain";

    /// Four prior weeks at 20 miles, current week at 23 with low carbs:
    /// triggers overreach and (given the mileage threading) no underfuel,
    /// since 23 miles is under the 30-mile gate.
    fn sample_garmin() -> GarminData {
        let mut rows = vec![GARMIN_HEADER.to_string()];
        for d in ["2026-03-10", "2026-03-03", "2026-02-24", "2026-02-17"] {
            rows.push(format!("Running,{d},run,20.0,150,166,8:30,100,250,-10"));
        }
        rows.push("Running,2026-03-17,run,23.0,150,166,8:30,100,250,-10".to_string());
        GarminData::from_csv_str(&(rows.join("\n") + "\n"), &Config::default()).unwrap()
    }

    fn sample_macrofactor() -> MacroFactorData {
        let sheets = vec![
            Sheet::new(
                "Calories & Macros",
                "Date,Calories (kcal),Protein (g),Carbs (g),Fat (g)\n\
                 2026-03-16,1380,155,70,45\n\
                 2026-03-17,1400,150,75,44\n\
                 2026-03-18,1360,152,72,46\n\
                 2026-03-19,1390,149,71,45\n\
                 2026-03-20,1370,151,74,45\n",
            ),
            Sheet::new(
                "Expenditure",
                "Date,Expenditure (kcal)\n2026-03-16,2009\n2026-03-17,2012\n2026-03-18,2010\n",
            ),
            Sheet::new(
                "Weight Trend",
                "Date,Trend Weight (lbs)\n2026-03-16,171.0\n2026-03-22,170.0\n",
            ),
            Sheet::new(
                "Sets Per Muscle Group",
                "Date,Glutes,Hips,Core,Hamstrings\n\
                 2026-03-10,12,6,8,6\n\
                 2026-03-17,12,6,8,6\n",
            ),
        ];
        MacroFactorData::from_sheets(&sheets).unwrap()
    }

    fn week() -> WeekWindow {
        WeekWindow::containing(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap())
    }

    #[test]
    fn test_cross_analyzer_threading() {
        let report = analyze_week(
            &sample_garmin(),
            &sample_macrofactor(),
            week(),
            &Config::default(),
        );

        // Running mileage threads into nutrition.
        assert_eq!(report.nutrition.weekly_mileage, 23.0);
        // Carbs are low but mileage is under the gate: no underfuel flag.
        assert!(!report.nutrition.low_carb_underfuel_flag);

        // Nutrition deficit threads into body comp; the trend is falling,
        // so its own rate wins over the deficit rule.
        assert!(report.nutrition.avg_daily_deficit.unwrap() > 0.0);
        assert_eq!(report.body_comp.weekly_rate_lbs, Some(1.0));
        assert!(!report.body_comp.weight_rising_despite_deficit);
    }

    #[test]
    fn test_signal_list_matches_triggered_flags() {
        let report = analyze_week(
            &sample_garmin(),
            &sample_macrofactor(),
            week(),
            &Config::default(),
        );

        // Exactly one triggered condition: mileage overreach (+15%).
        assert!(report.running.overreach_flag);
        assert_eq!(report.signals.len(), 1);
        assert!(report.signals[0].message.contains("15% above 4-week average"));
    }

    #[test]
    fn test_report_serialization_round_trip() {
        let report = analyze_week(
            &sample_garmin(),
            &sample_macrofactor(),
            week(),
            &Config::default(),
        );

        let json = report.to_json().unwrap();
        let parsed: WeeklyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.week, report.week);
        assert_eq!(parsed.signals.len(), report.signals.len());
        assert_eq!(parsed.producer.name, "peakform");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["running"]["current"]["total_miles"], 23.0);
        // Absent fields serialize as explicit nulls, not zeros.
        assert!(value["body_comp"]["weight_start_lbs"].is_null());
    }

    #[test]
    fn test_empty_exports_degrade_quietly() {
        let garmin = GarminData::from_csv_str(
            &format!("{GARMIN_HEADER}\n"),
            &Config::default(),
        )
        .unwrap();
        let mf = MacroFactorData::from_sheets(&[]).unwrap();
        let report = analyze_week(&garmin, &mf, week(), &Config::default());

        assert_eq!(report.running.current.run_count, 0);
        assert_eq!(report.nutrition.current.logged_days, 0);
        // Incomplete week and all priority groups missed still surface.
        assert!(report.nutrition.incomplete_week_flag);
        assert_eq!(report.strength.missed_muscle_groups.len(), 4);
    }
}
