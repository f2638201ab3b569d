use itertools::Itertools;

use super::seconds_to_lap_time;
use crate::telemetry::Lap;

/// One formatted row of the lap-time table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LapTimeRow {
    pub number: String,
    pub time: String,
    pub diff: String,
    pub info: String,
    pub fuel_consumed: String,
    pub full_throttle: String,
    pub full_brake: String,
    pub coast: String,
    pub tires_spinning: String,
    pub car_name: String,
}

impl LapTimeRow {
    pub const HEADERS: [&'static str; 10] = [
        "#",
        "Time",
        "Diff",
        "Info",
        "Fuel Cons.",
        "Full Throt.",
        "Full Break",
        "Coast",
        "Tire Spin",
        "Car",
    ];

    /// Cell values in [`LapTimeRow::HEADERS`] order.
    pub fn cells(&self) -> [&str; 10] {
        [
            &self.number,
            &self.time,
            &self.diff,
            &self.info,
            &self.fuel_consumed,
            &self.full_throttle,
            &self.full_brake,
            &self.coast,
            &self.tires_spinning,
            &self.car_name,
        ]
    }
}

/// Table rows for `laps`, newest lap first.
pub fn lap_time_rows(laps: &[Lap], best_lap_time_ms: f64) -> Vec<LapTimeRow> {
    laps.iter()
        .sorted_by(|a, b| b.number.cmp(&a.number))
        .map(|lap| {
            let is_best = best_lap_time_ms > 0. && lap.lap_finish_time_ms == best_lap_time_ms;
            let mut diff = String::new();
            let mut info = Vec::new();
            if is_best {
                info.push("Best");
            } else if laps.len() > 1 && best_lap_time_ms > 0. {
                diff = format!(
                    "+{}",
                    seconds_to_lap_time((lap.lap_finish_time_ms - best_lap_time_ms) / 1000.)
                );
            }
            if lap.is_replay {
                info.push("Replay");
            }

            LapTimeRow {
                number: lap.number.to_string(),
                time: seconds_to_lap_time(lap.lap_finish_time_ms / 1000.),
                diff,
                info: info.join(" "),
                fuel_consumed: format!("{:.1}", lap.fuel_consumed),
                full_throttle: format!("{:.0}%", lap.tick_share(lap.full_throttle_ticks)),
                full_brake: format!("{:.0}%", lap.tick_share(lap.full_brake_ticks)),
                coast: format!("{:.0}%", lap.tick_share(lap.coast_ticks)),
                tires_spinning: format!("{:.0}%", lap.tick_share(lap.tires_spinning_ticks)),
                car_name: lap.car_name.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::lap_with_time;

    #[test]
    fn test_rows_are_newest_first_with_diff() {
        let mut fast = lap_with_time(2, 61_000.);
        fast.lap_ticks = 100;
        fast.full_throttle_ticks = 45;
        fast.car_name = "Supra".to_string();
        let laps = vec![lap_with_time(1, 62_500.), fast, lap_with_time(3, 61_250.)];

        let rows = lap_time_rows(&laps, 61_000.);
        assert_eq!(
            rows.iter().map(|r| r.number.as_str()).collect_vec(),
            vec!["3", "2", "1"]
        );
        assert_eq!(rows[0].diff, "+0:00.250");
        assert_eq!(rows[1].info, "Best");
        assert_eq!(rows[1].diff, "");
        assert_eq!(rows[1].time, "1:01.000");
        assert_eq!(rows[1].full_throttle, "45%");
        assert_eq!(rows[1].car_name, "Supra");
        assert_eq!(rows[2].diff, "+0:01.500");
    }

    #[test]
    fn test_single_lap_has_no_diff() {
        let mut replay = lap_with_time(1, 70_000.);
        replay.is_replay = true;
        let rows = lap_time_rows(&[replay], 65_000.);
        assert_eq!(rows[0].diff, "");
        assert_eq!(rows[0].info, "Replay");
        assert_eq!(rows[0].full_brake, "0%");
    }

    #[test]
    fn test_cells_follow_header_order() {
        let rows = lap_time_rows(&[lap_with_time(5, 75_000.)], 75_000.);
        let cells = rows[0].cells();
        assert_eq!(cells.len(), LapTimeRow::HEADERS.len());
        assert_eq!(cells[0], "5");
        assert_eq!(cells[1], "1:15.000");
        assert_eq!(cells[3], "Best");
        assert_eq!(cells[4], "0.0");
    }
}
