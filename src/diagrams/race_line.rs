use egui::{Align2, Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Text};
use log::debug;

use super::{BRAKING_COLOR, COASTING_COLOR, LAST_LAP_COLOR, REFERENCE_LAP_COLOR, THROTTLE_COLOR};
use crate::{errors::DashboardError, telemetry::Lap};

const LAST_LAP_LINE_WIDTH: f32 = 5.;
const REFERENCE_LINE_WIDTH: f32 = 15.;
const REFERENCE_LINE_ALPHA: f32 = 0.3;
const RACE_LINE_HEIGHT: f32 = 400.;
pub const START_LINE_TEXT: &str = "====";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrivingMode {
    Throttle,
    Braking,
    Coasting,
}

impl DrivingMode {
    const ALL: [DrivingMode; 3] = [
        DrivingMode::Throttle,
        DrivingMode::Braking,
        DrivingMode::Coasting,
    ];

    fn of(throttle: f64, brake: f64) -> Self {
        if brake > 0. {
            DrivingMode::Braking
        } else if throttle > 0. {
            DrivingMode::Throttle
        } else {
            DrivingMode::Coasting
        }
    }

    fn color(&self) -> Color32 {
        match self {
            DrivingMode::Throttle => THROTTLE_COLOR,
            DrivingMode::Braking => BRAKING_COLOR,
            DrivingMode::Coasting => COASTING_COLOR,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DrivingMode::Throttle => "Throttle",
            DrivingMode::Braking => "Braking",
            DrivingMode::Coasting => "Coasting",
        }
    }
}

/// The parts of a lap's race line driven in one mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentLayer {
    pub mode: DrivingMode,
    pub legend: String,
    pub color: Color32,
    pub width: f32,
    /// Contiguous runs of `(x, z)` track positions
    pub segments: Vec<Vec<[f64; 2]>>,
}

impl SegmentLayer {
    fn new(mode: DrivingMode, lap_name: &str, width: f32, alpha: f32) -> Self {
        Self {
            mode,
            legend: format!("{} {}", mode.name(), lap_name),
            color: mode.color().gamma_multiply(alpha),
            width,
            segments: Vec::new(),
        }
    }

    fn fill(&mut self, lap: &Lap) {
        self.segments.clear();
        let samples = lap
            .sample_count()
            .min(lap.position_x.len())
            .min(lap.position_z.len());

        let mut current: Vec<[f64; 2]> = Vec::new();
        for i in 0..samples {
            if DrivingMode::of(lap.data.throttle[i], lap.data.brake[i]) == self.mode {
                current.push([lap.position_x[i], lap.position_z[i]]);
            } else if !current.is_empty() {
                self.segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            self.segments.push(current);
        }
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    Peak,
    Valley,
    StartLine,
}

/// A text annotation on the race line, positioned in track coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceLineLabel {
    pub kind: LabelKind,
    pub x: f64,
    pub z: f64,
    pub text: String,
    pub color: Color32,
}

impl RaceLineLabel {
    fn anchor(&self) -> Align2 {
        match self.kind {
            LabelKind::Peak => Align2::LEFT_CENTER,
            LabelKind::Valley => Align2::RIGHT_CENTER,
            LabelKind::StartLine => Align2::CENTER_CENTER,
        }
    }
}

/// Top-down track map of the last and reference lap, colored by pedal usage.
pub struct RaceLine {
    layers: Vec<SegmentLayer>,
    labels: Vec<RaceLineLabel>,
    revision: u64,
}

impl Default for RaceLine {
    fn default() -> Self {
        Self::new()
    }
}

impl RaceLine {
    pub fn new() -> Self {
        let mut layers = Vec::with_capacity(6);
        for mode in DrivingMode::ALL {
            layers.push(SegmentLayer::new(mode, "Last Lap", LAST_LAP_LINE_WIDTH, 1.));
        }
        for mode in DrivingMode::ALL {
            layers.push(SegmentLayer::new(
                mode,
                "Reference",
                REFERENCE_LINE_WIDTH,
                REFERENCE_LINE_ALPHA,
            ));
        }
        Self {
            layers,
            labels: Vec::new(),
            revision: 0,
        }
    }

    /// Recomputes the segment layers. The first three layers belong to the last lap.
    pub fn set_laps(&mut self, last: &Lap, reference: &Lap) {
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.fill(if i < DrivingMode::ALL.len() { last } else { reference });
        }
    }

    /// Removes every segment and label.
    pub fn clear(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.segments.clear();
        }
        self.clear_labels();
    }

    pub fn layers(&self) -> &[SegmentLayer] {
        &self.layers
    }

    pub fn labels(&self) -> &[RaceLineLabel] {
        &self.labels
    }

    /// Incremented once per label mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear_labels(&mut self) {
        self.labels.clear();
        self.revision += 1;
    }

    pub fn add_labels(&mut self, labels: Vec<RaceLineLabel>) {
        self.labels.extend(labels);
        self.revision += 1;
    }

    pub fn show(&self, ui: &mut Ui) {
        ui.label(RichText::new("Race Line").strong());
        Plot::new("race_line")
            .height(RACE_LINE_HEIGHT)
            .data_aspect(1.)
            .show_axes(false)
            .show_grid(false)
            .show_background(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                // reference layers are wider, draw them underneath
                for layer in self.layers.iter().rev() {
                    for segment in &layer.segments {
                        // track maps are mirrored compared to the game's coordinates
                        let points = segment.iter().map(|[x, z]| [*x, -*z]).collect::<Vec<_>>();
                        plot_ui.line(
                            Line::new(layer.legend.as_str(), PlotPoints::new(points))
                                .color(layer.color)
                                .width(layer.width),
                        );
                    }
                }
                for label in &self.labels {
                    plot_ui.text(
                        Text::new(
                            "",
                            PlotPoint::new(label.x, -label.z),
                            RichText::new(label.text.as_str()).strong().color(label.color),
                        )
                        .anchor(label.anchor()),
                    );
                }
            });
    }
}

fn position_at(lap: &Lap, index: usize) -> Result<(f64, f64), DashboardError> {
    let len = lap.position_x.len().min(lap.position_z.len());
    if index >= len {
        return Err(DashboardError::PositionOutOfRange { index, len });
    }
    Ok((lap.position_x[index], lap.position_z[index]))
}

fn speed_labels(lap: &Lap, color: Color32) -> Result<Vec<RaceLineLabel>, DashboardError> {
    let extrema = lap.speed_peaks_and_valleys();
    let mut labels = Vec::with_capacity(extrema.peak_indices.len() + extrema.valley_indices.len());

    for (index, speed) in extrema.peak_indices.iter().zip(extrema.peak_speeds.iter()) {
        let (x, z) = position_at(lap, *index)?;
        labels.push(RaceLineLabel {
            kind: LabelKind::Peak,
            x,
            z,
            text: format!("▴{:.0}", speed),
            color,
        });
    }
    for (index, speed) in extrema.valley_indices.iter().zip(extrema.valley_speeds.iter()) {
        let (x, z) = position_at(lap, *index)?;
        labels.push(RaceLineLabel {
            kind: LabelKind::Valley,
            x,
            z,
            text: format!("{:.0}▾", speed),
            color,
        });
    }
    Ok(labels)
}

/// Replaces the race line labels with the speed extrema of both laps and the start line.
///
/// All labels are built before the race line is touched, so a failure leaves
/// the previous labels in place.
pub fn annotate_race_line(race_line: &mut RaceLine, last: &Lap, reference: &Lap) -> Result<(), DashboardError> {
    let mut labels = speed_labels(last, LAST_LAP_COLOR)?;
    labels.extend(speed_labels(reference, REFERENCE_LAP_COLOR)?);

    if let (Some(x), Some(z)) = (last.position_x.first(), last.position_z.first()) {
        labels.push(RaceLineLabel {
            kind: LabelKind::StartLine,
            x: *x,
            z: *z,
            text: START_LINE_TEXT.to_string(),
            color: Color32::BLACK,
        });
    }

    debug!("Annotating race line with {} labels", labels.len());
    race_line.clear_labels();
    race_line.add_labels(labels);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::lap::tests::triangle_lap;

    #[test]
    fn test_new_race_line_has_six_empty_layers() {
        let race_line = RaceLine::new();
        assert_eq!(race_line.layers().len(), 6);
        assert!(race_line.layers().iter().all(|l| l.segments.is_empty()));
        assert_eq!(race_line.layers()[0].legend, "Throttle Last Lap");
        assert_eq!(race_line.layers()[4].legend, "Braking Reference");
        assert_eq!(race_line.layers()[0].width, 5.);
        assert_eq!(race_line.layers()[5].width, 15.);
        assert_eq!(race_line.revision(), 0);
    }

    #[test]
    fn test_set_laps_splits_by_driving_mode() {
        let mut race_line = RaceLine::new();
        let lap = triangle_lap(1);
        race_line.set_laps(&lap, &Lap::default());

        let layers = race_line.layers();
        // full throttle for samples 0..10, brake for 10..20, coasting afterwards
        assert_eq!(layers[0].segments.len(), 1);
        assert_eq!(layers[0].point_count(), 10);
        assert_eq!(layers[1].point_count(), 10);
        assert_eq!(layers[2].point_count(), 6);
        assert_eq!(layers[1].segments[0][0], [10., -10.]);
        assert!(layers[3..].iter().all(|l| l.segments.is_empty()));
    }

    #[test]
    fn test_interrupted_mode_creates_new_segment() {
        let mut lap = triangle_lap(1);
        lap.data.brake[5] = 50.;
        let mut race_line = RaceLine::new();
        race_line.set_laps(&lap, &lap);

        assert_eq!(race_line.layers()[0].segments.len(), 2);
        assert_eq!(race_line.layers()[1].segments.len(), 2);
        assert_eq!(race_line.layers()[3].segments.len(), 2);
    }

    #[test]
    fn test_clear_removes_segments_and_labels() {
        let mut race_line = RaceLine::new();
        let lap = triangle_lap(1);
        race_line.set_laps(&lap, &lap);
        annotate_race_line(&mut race_line, &lap, &lap).unwrap();
        let revision = race_line.revision();

        race_line.clear();
        assert!(race_line.layers().iter().all(|l| l.segments.is_empty()));
        assert!(race_line.labels().is_empty());
        assert_eq!(race_line.revision(), revision + 1);
    }

    #[test]
    fn test_annotate_triangle_lap() {
        let mut race_line = RaceLine::new();
        let lap = triangle_lap(1);
        annotate_race_line(&mut race_line, &lap, &Lap::default()).unwrap();

        let labels = race_line.labels();
        assert_eq!(labels.len(), 3);

        let peak = labels.iter().find(|l| l.kind == LabelKind::Peak).unwrap();
        assert_eq!(peak.text, "▴200");
        assert_eq!((peak.x, peak.z), (10., -10.));
        assert_eq!(peak.color, LAST_LAP_COLOR);

        let valley = labels.iter().find(|l| l.kind == LabelKind::Valley).unwrap();
        assert_eq!(valley.text, "100▾");
        assert_eq!((valley.x, valley.z), (20., -20.));
        assert_eq!(valley.anchor(), Align2::RIGHT_CENTER);

        let start = labels.iter().find(|l| l.kind == LabelKind::StartLine).unwrap();
        assert_eq!(start.text, "====");
        assert_eq!((start.x, start.z), (0., 0.));
    }

    #[test]
    fn test_reference_labels_are_magenta() {
        let mut race_line = RaceLine::new();
        let lap = triangle_lap(1);
        annotate_race_line(&mut race_line, &lap, &lap).unwrap();

        assert_eq!(race_line.labels().len(), 5);
        let reference_labels = race_line
            .labels()
            .iter()
            .filter(|l| l.color == REFERENCE_LAP_COLOR)
            .count();
        assert_eq!(reference_labels, 2);
    }

    #[test]
    fn test_annotate_replaces_labels_in_one_batch() {
        let mut race_line = RaceLine::new();
        let lap = triangle_lap(1);
        annotate_race_line(&mut race_line, &lap, &lap).unwrap();
        let revision = race_line.revision();

        annotate_race_line(&mut race_line, &lap, &lap).unwrap();
        // one clear plus one add
        assert_eq!(race_line.revision(), revision + 2);
        assert_eq!(race_line.labels().len(), 5);
    }

    #[test]
    fn test_no_start_line_without_positions() {
        let mut race_line = RaceLine::new();
        annotate_race_line(&mut race_line, &Lap::default(), &Lap::default()).unwrap();
        assert!(race_line.labels().is_empty());
    }

    #[test]
    fn test_peak_without_position_is_rejected() {
        let mut race_line = RaceLine::new();
        race_line.add_labels(vec![RaceLineLabel {
            kind: LabelKind::StartLine,
            x: 1.,
            z: 1.,
            text: START_LINE_TEXT.to_string(),
            color: Color32::BLACK,
        }]);

        let mut lap = triangle_lap(1);
        lap.position_x.truncate(5);
        let result = annotate_race_line(&mut race_line, &lap, &Lap::default());
        assert!(matches!(
            result,
            Err(DashboardError::PositionOutOfRange { index: 10, len: 5 })
        ));
        // the previous labels survive a failed annotation
        assert_eq!(race_line.labels().len(), 1);
    }
}
