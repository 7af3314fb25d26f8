//! Body composition analyzer
//!
//! Tracks scale weight, smoothed trend weight, deficit reality, and the
//! projected pace toward the goal weight.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::adapters::MacroFactorData;
use crate::config::Config;
use crate::week::WeekWindow;

/// Direction of the smoothed trend over the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Down,
    Flat,
    Up,
}

/// Body composition analysis for a given week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyCompAnalysis {
    pub week: WeekWindow,

    // Scale weight (raw daily readings)
    pub weight_start_lbs: Option<f64>,
    pub weight_end_lbs: Option<f64>,
    pub weight_avg_lbs: Option<f64>,
    pub weight_net_change_lbs: Option<f64>,
    pub body_fat_pct_latest: Option<f64>,

    // Smoothed trend weight
    pub trend_weight_start: Option<f64>,
    pub trend_weight_end: Option<f64>,
    pub trend_net_change_lbs: Option<f64>,

    pub trend_direction: TrendDirection,

    // Goal projection
    pub pounds_to_goal: Option<f64>,
    /// Positive = losing weight.
    pub weekly_rate_lbs: Option<f64>,
    pub weeks_to_goal: Option<f64>,
    pub projected_goal_date: Option<NaiveDate>,

    // Flags
    /// Positive deficit alongside a rising trend: the expenditure estimate
    /// is lagging, not a literal contradiction.
    pub weight_rising_despite_deficit: bool,
    /// Trend moved less than the flat band over the week.
    pub trend_stalled: bool,
    /// Window ends within the recalibration period after the tracking restart.
    pub algorithm_recalibrating: bool,
}

impl BodyCompAnalysis {
    pub(crate) fn empty(week: WeekWindow) -> Self {
        Self {
            week,
            weight_start_lbs: None,
            weight_end_lbs: None,
            weight_avg_lbs: None,
            weight_net_change_lbs: None,
            body_fat_pct_latest: None,
            trend_weight_start: None,
            trend_weight_end: None,
            trend_net_change_lbs: None,
            trend_direction: TrendDirection::Flat,
            pounds_to_goal: None,
            weekly_rate_lbs: None,
            weeks_to_goal: None,
            projected_goal_date: None,
            weight_rising_despite_deficit: false,
            trend_stalled: false,
            algorithm_recalibrating: false,
        }
    }
}

/// Run the body composition analysis for the given week.
///
/// `avg_daily_deficit` comes from the nutrition analyzer; it backs the
/// goal-rate fallback and the rising-despite-deficit cross-check.
pub fn analyze(
    mf: &MacroFactorData,
    week: WeekWindow,
    avg_daily_deficit: Option<f64>,
    config: &Config,
) -> BodyCompAnalysis {
    let mut result = BodyCompAnalysis::empty(week);

    // ------------------------------------------------------------------
    // Scale weight
    // ------------------------------------------------------------------
    let weigh_ins: Vec<_> = mf
        .scale_weight()
        .iter()
        .filter(|w| week.contains(w.date))
        .collect();

    let weights: Vec<f64> = weigh_ins.iter().filter_map(|w| w.weight_lbs).collect();
    result.weight_start_lbs = weights.first().copied();
    result.weight_end_lbs = weights.last().copied();
    if !weights.is_empty() {
        result.weight_avg_lbs = Some(weights.iter().sum::<f64>() / weights.len() as f64);
    }
    if let (Some(start), Some(end)) = (result.weight_start_lbs, result.weight_end_lbs) {
        result.weight_net_change_lbs = Some(end - start);
    }
    result.body_fat_pct_latest = weigh_ins.iter().filter_map(|w| w.body_fat_pct).last();

    // ------------------------------------------------------------------
    // Trend weight (smoothed trendline); a gap in one table does not
    // block the other.
    // ------------------------------------------------------------------
    let trend: Vec<f64> = mf
        .weight_trend()
        .iter()
        .filter(|p| week.contains(p.date))
        .filter_map(|p| p.trend_lbs)
        .collect();
    result.trend_weight_start = trend.first().copied();
    result.trend_weight_end = trend.last().copied();
    if let (Some(start), Some(end)) = (result.trend_weight_start, result.trend_weight_end) {
        result.trend_net_change_lbs = Some(end - start);
    }

    // ------------------------------------------------------------------
    // Trend direction
    // ------------------------------------------------------------------
    if let Some(change) = result.trend_net_change_lbs {
        result.trend_direction = if change < -config.trend_flat_band_lbs {
            TrendDirection::Down
        } else if change > config.trend_flat_band_lbs {
            TrendDirection::Up
        } else {
            result.trend_stalled = true;
            TrendDirection::Flat
        };
    }

    // ------------------------------------------------------------------
    // Goal projection
    // ------------------------------------------------------------------
    let current_weight = result.trend_weight_end.or(result.weight_end_lbs);
    if let Some(current) = current_weight {
        let pounds_to_goal = current - config.goal_weight_lbs;
        result.pounds_to_goal = Some(pounds_to_goal);

        // Prefer the trend's own rate; fall back to the energy-balance
        // rule only when the trend barely moved and a deficit exists.
        let weekly_loss = match result.trend_net_change_lbs {
            Some(change) if change.abs() > config.trend_rate_min_lbs => Some(-change),
            _ => match avg_daily_deficit {
                Some(deficit) if deficit > 0.0 => Some(deficit * 7.0 / config.kcal_per_lb),
                _ => None,
            },
        };

        if let Some(rate) = weekly_loss {
            result.weekly_rate_lbs = Some(rate);
            if rate > 0.0 && pounds_to_goal > 0.0 {
                let weeks = pounds_to_goal / rate;
                result.weeks_to_goal = Some(weeks);
                result.projected_goal_date = Some(week.end + Duration::days((weeks * 7.0) as i64));
            }
        }
    }

    // ------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------
    if let Some(deficit) = avg_daily_deficit {
        if deficit > 0.0 && result.trend_direction == TrendDirection::Up {
            result.weight_rising_despite_deficit = true;
        }
    }

    let days_since_restart = (week.end - config.tracking_restart).num_days();
    if days_since_restart <= config.recalibration_window_days {
        result.algorithm_recalibrating = true;
    }

    result
}
