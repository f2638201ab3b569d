// Lap comparison helpers feeding the diagrams and tables

pub mod fuel;
pub mod lap_times;
pub mod variance;

use itertools::Itertools;
use log::debug;

use crate::{
    errors::DashboardError,
    telemetry::{Lap, LapData, Metric},
};

pub use fuel::{FuelMap, fuel_maps_by_relative_level};
pub use lap_times::{LapTimeRow, lap_time_rows};
pub use variance::{SpeedVariance, VarianceOptions, variance_for_fastest_laps};

/// The fastest lap with a recorded time. Replays only count when nothing else was driven.
pub fn best_lap(laps: &[Lap]) -> Option<&Lap> {
    let has_driven_laps = laps.iter().any(|l| !l.is_replay && l.lap_finish_time_ms > 0.);
    laps.iter()
        .filter(|l| l.lap_finish_time_ms > 0.)
        .filter(|l| !has_driven_laps || !l.is_replay)
        .min_by(|a, b| a.lap_finish_time_ms.total_cmp(&b.lap_finish_time_ms))
}

/// Formats seconds as `m:ss.mmm`, with a leading `-` for negative values.
pub fn seconds_to_lap_time(seconds: f64) -> String {
    let prefix = if seconds < 0. { "-" } else { "" };
    let total_ms = (seconds.abs() * 1000.).round() as u64;
    let minutes = total_ms / 60_000;
    let remaining_s = (total_ms % 60_000) as f64 / 1000.;
    format!("{}{}:{:06.3}", prefix, minutes, remaining_s)
}

/// Up to `count` driven laps, fastest first.
pub fn fastest_laps(laps: &[Lap], count: usize) -> Vec<Lap> {
    laps.iter()
        .filter(|l| !l.is_replay && l.lap_finish_time_ms > 0.)
        .sorted_by(|a, b| a.lap_finish_time_ms.total_cmp(&b.lap_finish_time_ms))
        .take(count)
        .cloned()
        .collect()
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.
    } else {
        values[mid]
    }
}

fn median_by_sample<F>(laps: &[Lap], samples: usize, get: F) -> Vec<f64>
where
    F: Fn(&Lap) -> &[f64],
{
    (0..samples)
        .map(|i| {
            let mut values = laps.iter().map(|l| get(l)[i]).collect_vec();
            median(&mut values)
        })
        .collect()
}

/// Sample-wise median of every metric across `laps`, truncated to the shortest lap.
pub fn median_lap(laps: &[Lap]) -> Result<Lap, DashboardError> {
    if laps.is_empty() {
        return Err(DashboardError::NoLaps);
    }
    for lap in laps {
        lap.data.validate()?;
    }

    let samples = laps
        .iter()
        .map(|l| {
            l.sample_count()
                .min(l.position_x.len())
                .min(l.position_y.len())
                .min(l.position_z.len())
        })
        .min()
        .unwrap_or(0);
    debug!("Building median lap from {} laps, {} samples", laps.len(), samples);

    let mut data = LapData::default();
    for metric in Metric::ALL {
        *data.metric_mut(metric) = median_by_sample(laps, samples, |l| l.data.metric(metric));
    }

    let mut finish_times = laps.iter().map(|l| l.lap_finish_time_ms).collect_vec();
    let mut fuel_consumed = laps.iter().map(|l| l.fuel_consumed).collect_vec();
    Ok(Lap {
        title: "Median Lap".to_string(),
        lap_finish_time_ms: median(&mut finish_times),
        fuel_consumed: median(&mut fuel_consumed),
        lap_ticks: samples,
        position_x: median_by_sample(laps, samples, |l| l.position_x.as_slice()),
        position_y: median_by_sample(laps, samples, |l| l.position_y.as_slice()),
        position_z: median_by_sample(laps, samples, |l| l.position_z.as_slice()),
        data,
        ..Default::default()
    })
}

/// Time gained or lost against a reference lap, by distance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeDiff {
    pub distance: Vec<f64>,
    /// comparison - reference, in ms. Positive means the comparison lap is slower.
    pub timedelta: Vec<f64>,
    pub reference: Vec<f64>,
    pub comparison: Vec<f64>,
}

impl TimeDiff {
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }
}

/// Linear interpolation of `ys` at `x`, `xs` sorted ascending. Clamps outside the range.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let idx = xs.partition_point(|v| *v < x);
    if idx == 0 {
        return ys[0];
    }
    if idx == xs.len() {
        return ys[xs.len() - 1];
    }
    let (x0, x1) = (xs[idx - 1], xs[idx]);
    let (y0, y1) = (ys[idx - 1], ys[idx]);
    if x1 == x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

pub fn time_diff_by_distance(reference: &Lap, comparison: &Lap) -> Result<TimeDiff, DashboardError> {
    reference.data.validate()?;
    comparison.data.validate()?;

    let mut diff = TimeDiff::default();
    if reference.data.is_empty() || comparison.data.is_empty() {
        return Ok(diff);
    }

    for (distance, comparison_time) in comparison
        .data
        .distance
        .iter()
        .zip(comparison.data.time_ms.iter())
    {
        let reference_time =
            interpolate(&reference.data.distance, &reference.data.time_ms, *distance);
        diff.distance.push(*distance);
        diff.reference.push(reference_time);
        diff.comparison.push(*comparison_time);
        diff.timedelta.push(comparison_time - reference_time);
    }
    Ok(diff)
}
