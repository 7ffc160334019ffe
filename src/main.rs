use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ev_station_cleaner::config::CleanConfig;
use ev_station_cleaner::error::CleanError;
use ev_station_cleaner::{logging, pipeline};

#[derive(Parser)]
#[command(name = "ev_station_cleaner")]
#[command(about = "Seattle EV charging station data cleaner")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to config.toml (defaults apply when the file is absent)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Source CSV of charging-station records
    #[arg(long)]
    input: Option<PathBuf>,

    /// Destination for the cleaned CSV
    #[arg(long)]
    output_csv: Option<PathBuf>,

    /// Destination for the GeoJSON FeatureCollection
    #[arg(long)]
    output_geojson: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging();

    let mut config = match CleanConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("⚠️  {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.input {
        config.input_csv = path;
    }
    if let Some(path) = cli.output_csv {
        config.output_csv = path;
    }
    if let Some(path) = cli.output_geojson {
        config.output_geojson = path;
    }

    info!(input = %config.input_csv.display(), "starting cleaning run");
    match pipeline::run(&config) {
        Ok(summary) => {
            println!("\n📊 Cleaning Results:");
            println!("   Rows input: {}", summary.rows_read);
            println!("   Rows cleaned: {}", summary.rows_retained);
            println!("   Invalid coords removed: {}", summary.invalid_coordinates);
            println!("   Duplicates removed: {}", summary.duplicates);
            println!("   Wrote: {}", summary.output_csv.display());
            println!("   Wrote: {}", summary.output_geojson.display());
            ExitCode::SUCCESS
        }
        Err(CleanError::MissingInput(path)) => {
            println!("Input CSV not found: {}", path.display());
            ExitCode::FAILURE
        }
        Err(CleanError::EmptyInput) => {
            println!("No rows in CSV");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Cleaning run failed: {}", e);
            eprintln!("⚠️  Cleaning run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
