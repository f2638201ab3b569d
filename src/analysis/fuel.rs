use crate::telemetry::Lap;

/// Change in fuel consumption per mixture step, in percent.
const CONSUMPTION_PER_MIXTURE_LEVEL: f64 = 8.;
/// Change in engine power per mixture step, in percent.
const POWER_PER_MIXTURE_LEVEL: f64 = 4.;
const MIXTURE_LEVELS: std::ops::RangeInclusive<i32> = -5..=5;

/// Projection of the last lap onto a fuel mixture setting relative to the current one.
#[derive(Clone, Debug, PartialEq)]
pub struct FuelMap {
    /// 0 is the current setting, positive values are leaner
    pub mixture_setting: i32,
    pub power_percentage: f64,
    pub consumption_percentage: f64,
    pub fuel_consumed_per_lap: f64,
    pub laps_remaining_on_current_fuel: f64,
    pub time_remaining_on_current_fuel_ms: f64,
    pub lap_time_diff_ms: f64,
    pub lap_time_expected_ms: f64,
}

impl FuelMap {
    fn for_lap(lap: &Lap, mixture_setting: i32) -> Self {
        let power_percentage = (100. - mixture_setting as f64 * POWER_PER_MIXTURE_LEVEL) / 100.;
        let consumption_percentage =
            (100. - mixture_setting as f64 * CONSUMPTION_PER_MIXTURE_LEVEL) / 100.;

        let fuel_consumed_per_lap = lap.fuel_consumed * consumption_percentage;
        let lap_time_diff_ms = lap.lap_finish_time_ms * (1. - power_percentage);
        let lap_time_expected_ms = lap.lap_finish_time_ms + lap_time_diff_ms;
        let laps_remaining_on_current_fuel = if fuel_consumed_per_lap > 0. {
            lap.fuel_at_end / fuel_consumed_per_lap
        } else {
            0.
        };

        Self {
            mixture_setting,
            power_percentage,
            consumption_percentage,
            fuel_consumed_per_lap,
            laps_remaining_on_current_fuel,
            time_remaining_on_current_fuel_ms: laps_remaining_on_current_fuel
                * lap_time_expected_ms,
            lap_time_diff_ms,
            lap_time_expected_ms,
        }
    }

    pub fn has_fuel_consumption(&self) -> bool {
        self.fuel_consumed_per_lap > 0.
    }
}

pub fn fuel_maps_by_relative_level(lap: &Lap) -> Vec<FuelMap> {
    MIXTURE_LEVELS
        .map(|setting| FuelMap::for_lap(lap, setting))
        .collect()
}
