mod ui;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, arg};
use egui::Vec2;
use log::{error, warn};

use gt7dash::{DashboardError, diagrams::fuel_map_html_table, telemetry::load_laps_jsonl};
use ui::{DashboardApp, config::AppConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the dashboard with a recorded session
    Load {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Open an empty dashboard
    Dashboard,
    /// Print the fuel map of a lap as an HTML table
    FuelTable {
        #[arg(short, long)]
        input: PathBuf,

        /// Lap number, defaults to the last completed lap
        #[arg(short, long)]
        lap: Option<u32>,
    },
}

fn load_config() -> AppConfig {
    match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            warn!("Could not read config file, using defaults: {}", e);
            AppConfig::default()
        }
    }
}

fn run_dashboard(input: Option<&Path>) -> Result<(), DashboardError> {
    let app_config = load_config();
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(app_config.diagram_width + 500., 900.));

    eframe::run_native(
        "GT7 Dashboard",
        native_options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(match input {
                Some(input) => DashboardApp::from_file(app_config, input),
                None => DashboardApp::new(app_config),
            }))
        }),
    )
    .map_err(|e| DashboardError::WindowError { source: e })
}

fn load(input: &Path) -> Result<(), DashboardError> {
    if !input.exists() {
        return Err(DashboardError::InvalidTelemetryFile {
            path: format!("{:?}", input),
        });
    }
    run_dashboard(Some(input))
}

fn fuel_table(input: &Path, lap: Option<u32>) -> Result<String, DashboardError> {
    let session = load_laps_jsonl(input)?;
    let lap = match lap {
        Some(number) => session
            .laps
            .iter()
            .find(|l| l.number == number)
            .ok_or(DashboardError::UnknownLap { number })?,
        None => session.laps.last().ok_or(DashboardError::NoLaps)?,
    };
    Ok(fuel_map_html_table(lap))
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let result = match &cli.command {
        Commands::Load { input } => load(input),
        Commands::Dashboard => run_dashboard(None),
        Commands::FuelTable { input, lap } => fuel_table(input, *lap).map(|table| println!("{}", table)),
    };
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
