use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use simple_moving_average::{SMA, SumTreeSMA};

use super::fastest_laps;
use crate::{errors::DashboardError, telemetry::Lap};

const SMOOTHING_WINDOW: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceOptions {
    /// How many of the fastest laps are compared
    pub fastest_laps: usize,
    /// Width of a distance bucket in meters
    pub bucket_m: f64,
}

impl Default for VarianceOptions {
    fn default() -> Self {
        Self {
            fastest_laps: 3,
            bucket_m: 10.,
        }
    }
}

/// Standard deviation of the speed across laps, by distance bucket.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeedVariance {
    pub distance: Vec<f64>,
    pub speed_variance: Vec<f64>,
}

impl SpeedVariance {
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    pub fn points(&self) -> Vec<[f64; 2]> {
        self.distance
            .iter()
            .zip(self.speed_variance.iter())
            .map(|(d, v)| [*d, *v])
            .collect()
    }
}

fn mean_speed_by_bucket(lap: &Lap, bucket_m: f64) -> BTreeMap<i64, f64> {
    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (distance, speed) in lap.data.distance.iter().zip(lap.data.speed.iter()) {
        let entry = sums
            .entry((distance / bucket_m).floor() as i64)
            .or_insert((0., 0));
        entry.0 += speed;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(bucket, (sum, count))| (bucket, sum / count as f64))
        .collect()
}

fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (squares / (n - 1.)).sqrt()
}

/// Speed deviation across the fastest laps and the laps that were compared.
///
/// Only distance buckets covered by every compared lap are reported. With
/// fewer than two eligible laps there is nothing to compare and the series is empty.
pub fn variance_for_fastest_laps(
    laps: &[Lap],
    options: &VarianceOptions,
) -> Result<(SpeedVariance, Vec<Lap>), DashboardError> {
    let fastest = fastest_laps(laps, options.fastest_laps);
    for lap in &fastest {
        lap.data.validate()?;
    }

    let mut variance = SpeedVariance::default();
    if fastest.len() < 2 || options.bucket_m <= 0. {
        return Ok((variance, fastest));
    }

    let buckets_per_lap: Vec<BTreeMap<i64, f64>> = fastest
        .iter()
        .map(|lap| mean_speed_by_bucket(lap, options.bucket_m))
        .collect();

    let mut smoothing = SumTreeSMA::<f64, f64, SMOOTHING_WINDOW>::new();
    for (bucket, _) in buckets_per_lap[0].iter() {
        let speeds: Option<Vec<f64>> = buckets_per_lap
            .iter()
            .map(|b| b.get(bucket).copied())
            .collect();
        let Some(speeds) = speeds else {
            continue;
        };
        smoothing.add_sample(sample_std_dev(&speeds));
        variance.distance.push(*bucket as f64 * options.bucket_m);
        variance.speed_variance.push(smoothing.get_average());
    }

    debug!(
        "Speed variance over {} laps: {} buckets",
        fastest.len(),
        variance.len()
    );
    Ok((variance, fastest))
}
