//! Source export adapters
//!
//! This module provides adapters that parse the raw tabular exports and map
//! them to canonical, source-agnostic per-day records: the activity log CSV
//! (Garmin Connect) and the nutrition workbook sheets (MacroFactor).

mod garmin;
mod macrofactor;

pub use garmin::GarminData;
pub use macrofactor::{MacroFactorData, Sheet};
