// Library interface for gt7dash
// This allows the binary and integration tests to access the chart models

pub mod analysis;
pub mod diagrams;
pub mod errors;
pub mod telemetry;

// Re-export commonly used types
pub use analysis::{FuelMap, LapTimeRow, SpeedVariance, TimeDiff, VarianceOptions};
pub use diagrams::{LapTimeTable, RaceDiagram, RaceLine, SlotId};
pub use errors::DashboardError;
pub use telemetry::{Lap, LapData, Session, SessionInfo, TelemetryOutput, TelemetrySample};
