use serde::{Deserialize, Serialize};
use uom::si::{
    f64::Velocity,
    velocity::{kilometer_per_hour, meter_per_second},
};

use crate::errors::DashboardError;

use super::{
    PEDAL_MAX, TICKS_PER_SECOND, TelemetrySample,
    peaks::{SPEED_PROMINENCE_KPH, find_peaks, find_valleys},
};

/// Named per-sample metrics plotted against distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Distance,
    Speed,
    Throttle,
    Brake,
    Coast,
    Tires,
    Time,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Distance,
        Metric::Speed,
        Metric::Throttle,
        Metric::Brake,
        Metric::Coast,
        Metric::Tires,
        Metric::Time,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Distance => "distance",
            Metric::Speed => "speed",
            Metric::Throttle => "throttle",
            Metric::Brake => "brake",
            Metric::Coast => "coast",
            Metric::Tires => "tires",
            Metric::Time => "time",
        }
    }
}

/// The plottable arrays of a lap. Every field holds one value per sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LapData {
    /// Meters from the start line
    pub distance: Vec<f64>,
    /// km/h
    pub speed: Vec<f64>,
    /// 0-100 %
    pub throttle: Vec<f64>,
    /// 0-100 %
    pub brake: Vec<f64>,
    /// 100 while neither pedal is pressed, 0 otherwise
    pub coast: Vec<f64>,
    /// Tire speed / car speed
    pub tires: Vec<f64>,
    /// Elapsed lap time in milliseconds
    pub time_ms: Vec<f64>,
}

impl LapData {
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    pub fn metric(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Distance => &self.distance,
            Metric::Speed => &self.speed,
            Metric::Throttle => &self.throttle,
            Metric::Brake => &self.brake,
            Metric::Coast => &self.coast,
            Metric::Tires => &self.tires,
            Metric::Time => &self.time_ms,
        }
    }

    pub(crate) fn metric_mut(&mut self, metric: Metric) -> &mut Vec<f64> {
        match metric {
            Metric::Distance => &mut self.distance,
            Metric::Speed => &mut self.speed,
            Metric::Throttle => &mut self.throttle,
            Metric::Brake => &mut self.brake,
            Metric::Coast => &mut self.coast,
            Metric::Tires => &mut self.tires,
            Metric::Time => &mut self.time_ms,
        }
    }

    /// Checks that every metric has as many samples as `distance`.
    pub fn validate(&self) -> Result<(), DashboardError> {
        let expected = self.len();
        for metric in Metric::ALL {
            let actual = self.metric(metric).len();
            if actual != expected {
                return Err(DashboardError::MismatchedSampleCount {
                    field: metric.name().to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// `(distance, metric)` pairs ready for plotting.
    pub fn points(&self, metric: Metric) -> Vec<[f64; 2]> {
        self.distance
            .iter()
            .zip(self.metric(metric))
            .map(|(d, v)| [*d, *v])
            .collect()
    }
}

/// Speed extrema of a lap with the sample index at which they occur.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeaksAndValleys {
    pub peak_speeds: Vec<f64>,
    pub peak_indices: Vec<usize>,
    pub valley_speeds: Vec<f64>,
    pub valley_indices: Vec<usize>,
}

/// One completed circuit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub number: u32,
    pub title: String,
    pub car_name: String,
    pub lap_finish_time_ms: f64,
    pub fuel_at_start: f64,
    pub fuel_at_end: f64,
    pub fuel_consumed: f64,
    pub is_replay: bool,

    pub lap_ticks: usize,
    pub full_throttle_ticks: usize,
    pub full_brake_ticks: usize,
    pub coast_ticks: usize,
    pub tires_spinning_ticks: usize,

    pub data: LapData,
    pub position_x: Vec<f64>,
    pub position_y: Vec<f64>,
    pub position_z: Vec<f64>,
}

impl Lap {
    /// Builds a lap from the packets recorded while driving it.
    ///
    /// `lap_finish_time_ms` comes from the game when known. Otherwise it is
    /// derived from the number of packets received.
    pub fn from_samples(
        number: u32,
        samples: &[TelemetrySample],
        lap_finish_time_ms: Option<f64>,
        car_name: &str,
    ) -> Self {
        let mut lap = Lap {
            number,
            title: format!("Lap {}", number),
            car_name: car_name.to_string(),
            lap_ticks: samples.len(),
            is_replay: samples.iter().any(|s| s.is_replay),
            ..Default::default()
        };

        for (tick, sample) in samples.iter().enumerate() {
            let speed = Velocity::new::<meter_per_second>(sample.speed_mps);
            lap.data.distance.push(sample.distance_m);
            lap.data.speed.push(speed.get::<kilometer_per_hour>());
            lap.data
                .throttle
                .push(sample.throttle as f64 / PEDAL_MAX as f64 * 100.);
            lap.data
                .brake
                .push(sample.brake as f64 / PEDAL_MAX as f64 * 100.);
            lap.data
                .coast
                .push(if sample.is_coasting() { 100. } else { 0. });
            lap.data.tires.push(sample.tire_speed_ratio);
            lap.data
                .time_ms
                .push(tick as f64 * 1000. / TICKS_PER_SECOND);

            lap.position_x.push(sample.position_x);
            lap.position_y.push(sample.position_y);
            lap.position_z.push(sample.position_z);

            lap.full_throttle_ticks += sample.is_full_throttle() as usize;
            lap.full_brake_ticks += sample.is_full_brake() as usize;
            lap.coast_ticks += sample.is_coasting() as usize;
            lap.tires_spinning_ticks += sample.is_tire_spinning() as usize;
        }

        lap.lap_finish_time_ms = lap_finish_time_ms
            .filter(|t| *t > 0.)
            .unwrap_or(samples.len() as f64 * 1000. / TICKS_PER_SECOND);

        if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
            lap.fuel_at_start = first.fuel_level;
            lap.fuel_at_end = last.fuel_level;
            lap.fuel_consumed = first.fuel_level - last.fuel_level;
        }
        lap
    }

    /// The per-sample metric arrays shown in the race diagram.
    pub fn data(&self) -> LapData {
        self.data.clone()
    }

    pub fn sample_count(&self) -> usize {
        self.data.len()
    }

    pub fn speed_peaks_and_valleys(&self) -> PeaksAndValleys {
        let speed = &self.data.speed;
        let peak_indices = find_peaks(speed, SPEED_PROMINENCE_KPH);
        let valley_indices = find_valleys(speed, SPEED_PROMINENCE_KPH);
        PeaksAndValleys {
            peak_speeds: peak_indices.iter().map(|i| speed[*i]).collect(),
            peak_indices,
            valley_speeds: valley_indices.iter().map(|i| speed[*i]).collect(),
            valley_indices,
        }
    }

    /// Share of the lap spent in a state, in percent.
    pub fn tick_share(&self, ticks: usize) -> f64 {
        if self.lap_ticks == 0 {
            return 0.;
        }
        ticks as f64 / self.lap_ticks as f64 * 100.
    }
}
