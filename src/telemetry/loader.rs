use std::path::Path;

use log::{debug, info};

use super::{Lap, SessionInfo, TelemetryOutput, TelemetrySample};
use crate::errors::DashboardError;

/// Laps recorded in one telemetry file, oldest first.
#[derive(Default, Clone, Debug)]
pub struct Session {
    pub info: SessionInfo,
    pub laps: Vec<Lap>,
}

pub fn load_laps_jsonl(source_file: &Path) -> Result<Session, DashboardError> {
    if !source_file.exists() {
        return Err(DashboardError::InvalidTelemetryFile {
            path: format!("{:?}", source_file),
        });
    }

    let telemetry_lines = serde_jsonlines::json_lines(source_file)
        .map_err(|e| DashboardError::TelemetryLoaderError { source: e })?
        .collect::<Result<Vec<TelemetryOutput>, std::io::Error>>()
        .map_err(|e| DashboardError::TelemetryLoaderError { source: e })?;

    let mut session = Session::default();
    let mut cur_lap_no: Option<u32> = None;
    let mut cur_samples: Vec<TelemetrySample> = Vec::new();
    for line in telemetry_lines {
        match line {
            TelemetryOutput::DataPoint(sample) => {
                if cur_lap_no.is_some_and(|lap_no| lap_no != sample.lap_number) {
                    // the game reports the time of the lap that just ended on the first packet of the next one
                    let finish_time = Some(sample.last_lap_time_ms as f64);
                    push_lap(&mut session, cur_lap_no, &cur_samples, finish_time);
                    cur_samples.clear();
                }
                cur_lap_no = Some(sample.lap_number);
                cur_samples.push(*sample);
            }
            TelemetryOutput::SessionChange(session_info) => {
                debug!("Session change to {}", session_info.track_name);
                // an unfinished lap is discarded when the session changes
                cur_samples.clear();
                cur_lap_no = None;
                session.info = session_info;
            }
        }
    }

    info!(
        "Loaded {:?}, found {} completed laps on {}",
        source_file,
        session.laps.len(),
        session.info.track_name
    );
    Ok(session)
}

fn push_lap(
    session: &mut Session,
    lap_no: Option<u32>,
    samples: &[TelemetrySample],
    finish_time: Option<f64>,
) {
    // lap 0 is the out lap before crossing the start line
    match lap_no {
        Some(lap_no) if lap_no > 0 && !samples.is_empty() => {
            session.laps.push(Lap::from_samples(
                lap_no,
                samples,
                finish_time,
                &session.info.car_name,
            ));
        }
        _ => debug!("Skipping lap {:?} with {} samples", lap_no, samples.len()),
    }
}
