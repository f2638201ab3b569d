// Error types for gt7dash

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    // Lap data validation errors
    #[snafu(display(
        "Metric '{field}' has {actual} samples but the lap has {expected} distance samples"
    ))]
    MismatchedSampleCount {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[snafu(display("Track position index {index} is out of range for a lap with {len} positions"))]
    PositionOutOfRange { index: usize, len: usize },
    #[snafu(display("No laps available"))]
    NoLaps,
    #[snafu(display("Lap {number} not found in the session"))]
    UnknownLap { number: u32 },

    // Diagram errors
    #[snafu(display("Unknown data slot: {slot}"))]
    UnknownSlot { slot: usize },

    // Telemetry loading errors
    #[snafu(display("Invalid telemetry file: {path}"))]
    InvalidTelemetryFile { path: String },
    #[snafu(display("Error loading telemetry file"))]
    TelemetryLoaderError { source: io::Error },

    // UI errors
    #[snafu(display("Error running the dashboard window"))]
    WindowError { source: eframe::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
    #[snafu(display("Error parsing config file"))]
    ConfigParseError { source: serde_json::Error },
}
