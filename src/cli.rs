use std::path::PathBuf;

/// Street-priority CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "street-priority", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print summary statistics for the two raw input layers
    Profile(ProfileArgs),

    /// Score the street network and write the enriched layer + top extract
    Score(ScoreArgs),

    /// Write a markdown KPI summary from the scored layer
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProfileArgs {
    /// Street network layer (GeoJSON)
    #[arg(long, default_value = "data/raw/Street_Network.geojson", value_hint = clap::ValueHint::FilePath)]
    pub streets: PathBuf,

    /// Civic address layer (GeoJSON)
    #[arg(long, default_value = "data/raw/Civic_Address.geojson", value_hint = clap::ValueHint::FilePath)]
    pub addresses: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ScoreArgs {
    /// Street network layer (GeoJSON)
    #[arg(long, default_value = "data/raw/Street_Network.geojson", value_hint = clap::ValueHint::FilePath)]
    pub streets: PathBuf,

    /// Civic address layer (GeoJSON)
    #[arg(long, default_value = "data/raw/Civic_Address.geojson", value_hint = clap::ValueHint::FilePath)]
    pub addresses: PathBuf,

    /// Enriched street layer output (GeoJSON, lon/lat)
    #[arg(short, long, default_value = "data/processed/streets_priority.geojson", value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Top-priority extract output (CSV)
    #[arg(long, default_value = "outputs/top_50_priority_segments.csv", value_hint = clap::ValueHint::FilePath)]
    pub top_output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Scored street layer (GeoJSON, output of `score`)
    #[arg(long, default_value = "data/processed/streets_priority.geojson", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Markdown summary output
    #[arg(short, long, default_value = "outputs/kpi_summary.md", value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,
}
