use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::error::{CrimeStatsError, Result};

/// File names expected inside the data directory.
pub const CRIME_CODES_FILE: &str = "Crime_Codes.csv";
pub const MO_CODES_FILE: &str = "MO_Codes.csv";
pub const INCIDENTS_FILE: &str = "Crime_Data_from_2020_to_Present.zip";

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_TOP_AREAS: usize = 5;

// ── YearCutoff ────────────────────────────────────────────────────────────────

/// Which years the yearly count keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum YearCutoff {
    /// Drop the last year in sorted order; the newest year of an export is
    /// still in progress.
    #[default]
    DropLatest,
    /// Keep only years strictly before this one.
    Before(i32),
    KeepAll,
}

impl FromStr for YearCutoff {
    type Err = String;

    /// `latest`, `all`, or a year such as `2024`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(YearCutoff::DropLatest),
            "all" | "none" => Ok(YearCutoff::KeepAll),
            other => other
                .parse::<i32>()
                .map(YearCutoff::Before)
                .map_err(|_| format!("expected 'latest', 'all' or a year, got '{s}'")),
        }
    }
}

impl fmt::Display for YearCutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearCutoff::DropLatest => write!(f, "latest"),
            YearCutoff::Before(year) => write!(f, "{year}"),
            YearCutoff::KeepAll => write!(f, "all"),
        }
    }
}

// ── Output format ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

// ── Settings (CLI) ────────────────────────────────────────────────────────────

/// Descriptive crime statistics from incident records and code lookups
#[derive(Parser, Debug, Clone)]
#[command(name = "crime-stats", version)]
pub struct Settings {
    /// Directory holding the default input files
    #[arg(long, env = "CRIME_STATS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Incident table (.csv, .zip or .parquet); defaults to the archive in the data directory
    #[arg(long, env = "CRIME_STATS_INCIDENTS")]
    pub incidents: Option<PathBuf>,

    /// Crime-code lookup; defaults to Crime_Codes.csv in the data directory
    #[arg(long, env = "CRIME_STATS_CRIME_CODES")]
    pub crime_codes: Option<PathBuf>,

    /// MO-code lookup; defaults to MO_Codes.csv in the data directory
    #[arg(long, env = "CRIME_STATS_MO_CODES")]
    pub mo_codes: Option<PathBuf>,

    /// Years kept in the yearly count: latest (drop the newest), all, or a cutoff year
    #[arg(long, env = "CRIME_STATS_YEAR_CUTOFF", default_value = "latest")]
    pub year_cutoff: YearCutoff,

    /// Number of crime types in the ranking
    #[arg(long, env = "CRIME_STATS_TOP_N", default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Number of areas in the age-share breakdown
    #[arg(long, env = "CRIME_STATS_TOP_AREAS", default_value_t = DEFAULT_TOP_AREAS)]
    pub top_areas: usize,

    /// Output format
    #[arg(long, env = "CRIME_STATS_FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl Settings {
    /// Resolve defaults and validate into a pipeline configuration.
    pub fn into_config(self) -> Result<PipelineConfig> {
        let sources = SourcePaths {
            incidents: self
                .incidents
                .unwrap_or_else(|| self.data_dir.join(INCIDENTS_FILE)),
            crime_codes: self
                .crime_codes
                .unwrap_or_else(|| self.data_dir.join(CRIME_CODES_FILE)),
            mo_codes: self
                .mo_codes
                .unwrap_or_else(|| self.data_dir.join(MO_CODES_FILE)),
        };
        let config = PipelineConfig {
            sources,
            year_cutoff: self.year_cutoff,
            top_n: self.top_n,
            top_areas: self.top_areas,
        };
        config.validate()?;
        Ok(config)
    }
}

// ── PipelineConfig ────────────────────────────────────────────────────────────

/// Locations of the three inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub incidents: PathBuf,
    pub crime_codes: PathBuf,
    pub mo_codes: PathBuf,
}

impl SourcePaths {
    /// The default file names under `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            incidents: data_dir.join(INCIDENTS_FILE),
            crime_codes: data_dir.join(CRIME_CODES_FILE),
            mo_codes: data_dir.join(MO_CODES_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub sources: SourcePaths,
    pub year_cutoff: YearCutoff,
    pub top_n: usize,
    pub top_areas: usize,
}

impl PipelineConfig {
    pub fn new(sources: SourcePaths) -> Self {
        Self {
            sources,
            year_cutoff: YearCutoff::default(),
            top_n: DEFAULT_TOP_N,
            top_areas: DEFAULT_TOP_AREAS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(CrimeStatsError::Config("top-n must be at least 1".into()));
        }
        if self.top_areas == 0 {
            return Err(CrimeStatsError::Config("top-areas must be at least 1".into()));
        }
        Ok(())
    }
}
