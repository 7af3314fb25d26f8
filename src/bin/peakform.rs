//! PeakForm CLI - Weekly fitness and nutrition intelligence
//!
//! Commands:
//! - analyze: Run the weekly analysis and emit the report payload
//! - validate: Parse both exports and report what was recognized

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use peakform::{
    analyze_week, Config, GarminData, MacroFactorData, PeakformError, Sheet, WeekWindow, VERSION,
};

/// PeakForm - Weekly fitness and nutrition intelligence engine
#[derive(Parser)]
#[command(name = "peakform")]
#[command(version = VERSION)]
#[command(about = "Weekly analysis of personal training and nutrition exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a Monday-Sunday week and emit the report payload
    Analyze {
        /// Activity CSV export (Garmin Connect)
        #[arg(long)]
        garmin_file: PathBuf,

        /// Directory of nutrition export sheets (one .csv per sheet,
        /// file stem = sheet name)
        #[arg(long)]
        mf_dir: PathBuf,

        /// Any ISO date (YYYY-MM-DD) within the target week
        /// (default: the current week)
        #[arg(long)]
        week: Option<String>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format (default: json-pretty on a terminal, json otherwise)
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Parse both exports and report row, sheet, and column counts
    Validate {
        /// Activity CSV export (Garmin Connect)
        #[arg(long)]
        garmin_file: PathBuf,

        /// Directory of nutrition export sheets
        #[arg(long)]
        mf_dir: PathBuf,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON payload
    Json,
    /// Pretty-printed JSON payload
    JsonPretty,
    /// One line per detected signal
    Signals,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PeakformError> {
    match cli.command {
        Commands::Analyze {
            garmin_file,
            mf_dir,
            week,
            output,
            format,
        } => cmd_analyze(&garmin_file, &mf_dir, week.as_deref(), &output, format),

        Commands::Validate {
            garmin_file,
            mf_dir,
            json,
        } => cmd_validate(&garmin_file, &mf_dir, json),
    }
}

/// Load one Sheet per .csv file in the export directory, sorted by name
/// so runs are deterministic.
fn load_sheets(dir: &Path) -> Result<Vec<Sheet>, PeakformError> {
    let mut sheets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "csv") {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            sheets.push(Sheet::new(name, fs::read_to_string(&path)?));
        }
    }
    sheets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sheets)
}

fn resolve_week(week: Option<&str>) -> Result<WeekWindow, PeakformError> {
    let reference = match week {
        Some(raw) => chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| PeakformError::DateParseError(raw.to_string()))?,
        None => chrono::Local::now().date_naive(),
    };
    Ok(WeekWindow::containing(reference))
}

fn cmd_analyze(
    garmin_file: &Path,
    mf_dir: &Path,
    week: Option<&str>,
    output: &Path,
    format: Option<OutputFormat>,
) -> Result<(), PeakformError> {
    let config = Config::default();
    let garmin = GarminData::from_path(garmin_file, &config)?;
    let mf = MacroFactorData::from_sheets(&load_sheets(mf_dir)?)?;
    let window = resolve_week(week)?;

    let report = analyze_week(&garmin, &mf, window, &config);

    let to_stdout = output.to_string_lossy() == "-";
    let format = format.unwrap_or(if to_stdout && atty::is(atty::Stream::Stdout) {
        OutputFormat::JsonPretty
    } else {
        OutputFormat::Json
    });

    let rendered = match format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::JsonPretty => report.to_json_pretty()?,
        OutputFormat::Signals => {
            if report.signals.is_empty() {
                format!("No signals detected for week {}.", report.week)
            } else {
                report
                    .signals
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    };

    if to_stdout {
        writeln!(io::stdout(), "{rendered}")?;
    } else {
        fs::write(output, rendered + "\n")?;
        eprintln!("Report written to: {}", output.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct ValidationSummary {
    activities: usize,
    runs: usize,
    trail_runs: usize,
    strength_sessions: usize,
    nutrition_logged_days: usize,
    expenditure_days: usize,
    weigh_ins: usize,
    trend_points: usize,
    micronutrient_columns: usize,
    muscle_group_columns: usize,
    heaviest_exercise_columns: usize,
    volume_exercise_columns: usize,
}

fn cmd_validate(garmin_file: &Path, mf_dir: &Path, json: bool) -> Result<(), PeakformError> {
    let config = Config::default();
    let garmin = GarminData::from_path(garmin_file, &config)?;
    let mf = MacroFactorData::from_sheets(&load_sheets(mf_dir)?)?;

    let summary = ValidationSummary {
        activities: garmin.activities().len(),
        runs: garmin.runs().len(),
        trail_runs: garmin.trail_runs().len(),
        strength_sessions: garmin.strength_sessions().len(),
        nutrition_logged_days: mf.calories_macros().len(),
        expenditure_days: mf.expenditure().len(),
        weigh_ins: mf.scale_weight().len(),
        trend_points: mf.weight_trend().len(),
        micronutrient_columns: mf.micronutrients().columns().len(),
        muscle_group_columns: mf.muscle_groups().columns().len(),
        heaviest_exercise_columns: mf.exercises_heaviest().columns().len(),
        volume_exercise_columns: mf.exercises_volume().columns().len(),
    };

    if json {
        writeln!(io::stdout(), "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        let mut out = io::stdout();
        writeln!(out, "Activity export:")?;
        writeln!(out, "  activities:        {}", summary.activities)?;
        writeln!(
            out,
            "  runs:              {} ({} trail)",
            summary.runs, summary.trail_runs
        )?;
        writeln!(out, "  strength sessions: {}", summary.strength_sessions)?;
        writeln!(out, "Nutrition export:")?;
        writeln!(out, "  logged days:       {}", summary.nutrition_logged_days)?;
        writeln!(out, "  expenditure days:  {}", summary.expenditure_days)?;
        writeln!(out, "  weigh-ins:         {}", summary.weigh_ins)?;
        writeln!(out, "  trend points:      {}", summary.trend_points)?;
        writeln!(
            out,
            "  micronutrients:    {} columns",
            summary.micronutrient_columns
        )?;
        writeln!(
            out,
            "  muscle groups:     {} columns",
            summary.muscle_group_columns
        )?;
        writeln!(
            out,
            "  exercises:         {} heaviest / {} volume columns",
            summary.heaviest_exercise_columns, summary.volume_exercise_columns
        )?;
    }
    Ok(())
}
