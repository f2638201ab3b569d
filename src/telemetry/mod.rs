pub mod lap;
pub mod loader;
pub mod peaks;

use serde::{Deserialize, Serialize};

pub use lap::{Lap, LapData, Metric, PeaksAndValleys};
pub use loader::{Session, load_laps_jsonl};

/// The simulation sends one packet per rendered frame.
pub const TICKS_PER_SECOND: f64 = 60.;

/// Raw pedal inputs are reported as 0..=255.
pub const PEDAL_MAX: f32 = 255.;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub track_name: String,
    pub car_name: String,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            track_name: "Unknown".to_string(),
            car_name: "Unknown".to_string(),
        }
    }
}

/// A single telemetry packet as recorded by the collector.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetrySample {
    /// Lap the car is currently on
    pub lap_number: u32,
    /// Meters traveled from the start line this lap
    pub distance_m: f64,
    /// Car speed in meters per second
    pub speed_mps: f64,
    /// Raw throttle input 0..=255
    pub throttle: u8,
    /// Raw brake input 0..=255
    pub brake: u8,
    /// Driven tire surface speed divided by car speed
    pub tire_speed_ratio: f64,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    /// Fuel left in the tank, in liters
    pub fuel_level: f64,
    /// Time of the last completed lap, -1 when no lap was completed yet
    pub last_lap_time_ms: i64,
    pub is_replay: bool,
    pub car_id: u32,
}

impl TelemetrySample {
    pub fn is_full_throttle(&self) -> bool {
        self.throttle == u8::MAX
    }

    pub fn is_full_brake(&self) -> bool {
        self.brake == u8::MAX
    }

    pub fn is_coasting(&self) -> bool {
        self.throttle == 0 && self.brake == 0
    }

    /// Wheels turning noticeably faster than the car is moving.
    pub fn is_tire_spinning(&self) -> bool {
        self.speed_mps > 1. && self.tire_speed_ratio > 1.1
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TelemetryOutput {
    DataPoint(Box<TelemetrySample>),
    SessionChange(SessionInfo),
}
