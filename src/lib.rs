//! PeakForm - Weekly fitness and nutrition intelligence engine
//!
//! PeakForm ingests a personal nutrition export and a personal activity
//! export, aligns them to a Monday-Sunday week, and derives a structured
//! weekly analysis through a deterministic pipeline: source adaptation →
//! canonical per-day tables → per-domain weekly computation against rolling
//! 4-week baselines → signal detection.
//!
//! ## Modules
//!
//! - **Adapters**: Normalize the activity CSV and nutrition workbook sheets
//!   into canonical per-day records
//! - **Analyzers**: Body composition, nutrition adherence, running
//!   performance, and strength training, plus the signal detector

pub mod adapters;
pub mod analyzers;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod table;
pub mod types;
pub mod values;
pub mod week;

pub use adapters::{GarminData, MacroFactorData, Sheet};
pub use config::Config;
pub use error::PeakformError;
pub use pipeline::{analyze_week, WeeklyReport};
pub use week::WeekWindow;

/// PeakForm version embedded in every report payload
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "peakform";
