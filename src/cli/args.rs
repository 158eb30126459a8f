use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "camt-et")]
#[command(about = "Climate analysis and monitoring toolkit for Ethiopian station records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file [default: <package data>/settings.json]")]
    pub settings: Option<PathBuf>,
}

/// Input file plus registry behaviour shared by every command that loads station data.
#[derive(Args, Clone)]
pub struct InputArgs {
    #[arg(short, long, help = "Wide station CSV; relative names are looked up in the data folder")]
    pub input: PathBuf,

    #[arg(long, help = "Overwrite existing station registry entries with the file's metadata")]
    pub update_all: bool,
}

/// Where to write CSV snapshots, if at all.
#[derive(Args, Clone)]
pub struct ExportArgs {
    #[arg(long, help = "Write the data behind the result as CSV")]
    pub export: bool,

    #[arg(long, help = "Export folder [default: the settings output folder]")]
    pub out_dir: Option<PathBuf>,
}

/// Sub-year selection of a cross-section or map.
#[derive(Args, Clone)]
pub struct PeriodArgs {
    #[arg(short, long)]
    pub year: i32,

    #[arg(long, help = "Belg, Kiremt or Bega")]
    pub season: Option<String>,

    #[arg(long)]
    pub month: Option<u32>,

    #[arg(long, help = "Dekad 1, 2 or 3; needs --month")]
    pub dekad: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodProduct {
    /// The aggregated table itself
    Table,
    /// Yearly values minus the all-year average (year table)
    YearAnomalies,
    /// The seasons of one year against their averages (season table)
    Season,
    /// One year against the 5-95 percentile band (dekad or month table)
    Recent,
    /// Monthly anomalies of up to four two-year periods (month table)
    TwoYear,
    /// Cumulative rainfall (PRECIP dekad or day table)
    Cumulative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MapMethod {
    Idw,
    Kriging,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a wide station file and report what it holds
    Load {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value = "values", help = "values or metadata")]
        choice: String,
    },

    /// Extract one station's continuous daily table
    Station {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        station: String,
    },

    /// Aggregate a station to day, dekad, month, season or year and derive plot data
    Period {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        station: String,

        #[arg(short, long, help = "PRECIP, RD, TMPMAX or TMPMIN")]
        element: String,

        #[arg(short, long, help = "day, dekad, month, season or year")]
        granularity: String,

        #[arg(long, value_enum, default_value = "table")]
        product: PeriodProduct,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(long, help = "Season for cumulative rainfall")]
        season: Option<String>,

        #[arg(long, value_delimiter = ',', help = "Start years of two-year periods, e.g. 2010,2014")]
        starts: Vec<i32>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// All stations for one period with their historical mean and spread
    CrossSection {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        element: String,

        #[command(flatten)]
        period: PeriodArgs,

        #[arg(long, default_value = "Ethiopia", help = "Area name used in the export file name")]
        area: String,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Interpolate a cross-section over an area
    Map {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        element: String,

        #[command(flatten)]
        period: PeriodArgs,

        #[arg(long)]
        region: Option<String>,

        #[arg(long)]
        zone: Option<String>,

        #[arg(long)]
        district: Option<String>,

        #[arg(long, value_enum, default_value = "idw")]
        method: MapMethod,

        #[arg(long, default_value = "gaussian")]
        kriging_model: String,

        #[arg(long, help = "Only list the stations with data for the period")]
        distribution: bool,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Wind direction and speed statistics for a station
    WindRose {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        station: String,

        #[arg(short, long)]
        year: i32,

        #[arg(long)]
        month: Option<u32>,

        #[arg(long)]
        season: Option<String>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Niño-3.4 SST anomalies for up to four two-year periods
    Sst {
        #[arg(long, value_delimiter = ',', required = true)]
        starts: Vec<i32>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show or change the settings
    Settings {
        #[arg(long)]
        data_path: Option<PathBuf>,

        #[arg(long)]
        out_path: Option<PathBuf>,

        #[arg(long)]
        adm0_path: Option<PathBuf>,

        #[arg(long)]
        adm1_path: Option<PathBuf>,

        #[arg(long)]
        adm2_path: Option<PathBuf>,

        #[arg(long)]
        adm3_path: Option<PathBuf>,
    },

    /// Remove the cached interpolation grids
    ClearGrid,
}
