//! Cell-level value conversions
//!
//! Raw export cells arrive as strings in heterogeneous shapes: comma-grouped
//! integers ("8,980"), "MM:SS" paces, "H:MM:SS" durations, "--" sentinels.
//! Every conversion here is total: a cell that cannot be parsed becomes
//! `None`, never zero, so downstream sums and means treat it as absent.

use chrono::NaiveDate;

/// Sentinel values that mean "no data" in the source exports.
fn is_missing(s: &str) -> bool {
    s.is_empty() || s == "--" || s.eq_ignore_ascii_case("nan")
}

/// Parse a numeric cell, stripping thousands separators.
///
/// `"8,980"` becomes `8980.0`; `"--"`, `""`, and `"nan"` become `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_missing(s) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

/// Parse a numeric cell after stripping a trailing unit label (e.g. "250ms").
pub fn parse_numeric_with_unit(raw: &str, unit: &str) -> Option<f64> {
    let s = raw.trim();
    let s = s.strip_suffix(unit).unwrap_or(s).trim();
    parse_numeric(s)
}

/// Parse a "MM:SS" pace cell into decimal minutes.
///
/// `"8:15"` becomes `8.25`. A bare numeric string is accepted as
/// already-decimal. Seconds must be exactly two digits.
pub fn parse_pace(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_missing(s) {
        return None;
    }
    if let Some((min_part, sec_part)) = s.split_once(':') {
        if sec_part.len() == 2
            && !min_part.is_empty()
            && min_part.chars().all(|c| c.is_ascii_digit())
            && sec_part.chars().all(|c| c.is_ascii_digit())
        {
            let minutes: f64 = min_part.parse().ok()?;
            let seconds: f64 = sec_part.parse().ok()?;
            return Some(minutes + seconds / 60.0);
        }
        return None;
    }
    s.parse::<f64>().ok()
}

/// Render decimal minutes back to the "M:SS" display form.
///
/// `8.25` becomes `"8:15"`; `None` becomes `"--"`.
pub fn format_pace(decimal_minutes: Option<f64>) -> String {
    match decimal_minutes {
        Some(dm) => {
            let total_seconds = (dm * 60.0).round() as i64;
            format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
        }
        None => "--".to_string(),
    }
}

/// Parse a duration cell into total seconds.
///
/// Accepts "H:MM:SS" and "MM:SS"; a bare numeric string is taken as seconds.
pub fn parse_duration_secs(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_missing(s) {
        return None;
    }
    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        3 => {
            let h: f64 = parts[0].parse().ok()?;
            let m: f64 = parts[1].parse().ok()?;
            let sec: f64 = parts[2].parse().ok()?;
            Some(h * 3600.0 + m * 60.0 + sec)
        }
        2 => {
            let m: f64 = parts[0].parse().ok()?;
            let sec: f64 = parts[1].parse().ok()?;
            Some(m * 60.0 + sec)
        }
        _ => s.parse::<f64>().ok(),
    }
}

/// Parse a date cell. Accepts `YYYY-MM-DD` and the `YYYY-MM-DD HH:MM:SS`
/// timestamp form activity exports use.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if is_missing(s) {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Mean of the present values, `None` when no value is present.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Population standard deviation of the present values.
pub fn population_stdev(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    let n = present.len() as f64;
    let mu = present.iter().sum::<f64>() / n;
    let var = present.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
    Some(var.sqrt())
}
