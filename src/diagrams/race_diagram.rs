use std::fmt;

use egui::{Color32, RichText, Ui, Vec2b};
use egui_plot::{HLine, Line, LineStyle, Plot, PlotPoints};
use log::{debug, info};

use super::{LAST_LAP_COLOR, MEDIAN_LAP_COLOR, REFERENCE_LAP_COLOR};
use crate::{
    analysis::{SpeedVariance, TimeDiff, VarianceOptions, time_diff_by_distance, variance_for_fastest_laps},
    errors::DashboardError,
    telemetry::{Lap, LapData, Metric},
};

/// Last lap, reference lap and median lap.
pub const NUMBER_OF_DEFAULT_LAPS: usize = 3;

const SPEED_PANEL_HEIGHT: f32 = 250.;
const X_AXIS_LINK_GROUP: &str = "race_diagram_distance";
const SPEED_VARIANCE_RANGE: (f64, f64) = (0., 50.);

/// Handle to a data slot of a [`RaceDiagram`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelKind {
    TimeDiff,
    Speed,
    SpeedVariance,
    Throttle,
    Braking,
    Coasting,
    Tires,
}

impl PanelKind {
    /// Panels drawing one line per data slot, in the order lines are added.
    pub const SLOT_PANELS: [PanelKind; 5] = [
        PanelKind::Speed,
        PanelKind::Throttle,
        PanelKind::Braking,
        PanelKind::Coasting,
        PanelKind::Tires,
    ];

    /// Top to bottom order on screen.
    pub const LAYOUT: [PanelKind; 7] = [
        PanelKind::TimeDiff,
        PanelKind::Speed,
        PanelKind::SpeedVariance,
        PanelKind::Throttle,
        PanelKind::Braking,
        PanelKind::Coasting,
        PanelKind::Tires,
    ];

    /// The slot metric plotted by this panel, `None` for single-series panels.
    pub fn metric(&self) -> Option<Metric> {
        match self {
            PanelKind::Speed => Some(Metric::Speed),
            PanelKind::Throttle => Some(Metric::Throttle),
            PanelKind::Braking => Some(Metric::Brake),
            PanelKind::Coasting => Some(Metric::Coast),
            PanelKind::Tires => Some(Metric::Tires),
            PanelKind::TimeDiff | PanelKind::SpeedVariance => None,
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            PanelKind::TimeDiff => "Time / Diff",
            PanelKind::Speed => "Speed",
            PanelKind::SpeedVariance => "Spd.Dev.",
            PanelKind::Throttle => "Throttle",
            PanelKind::Braking => "Braking",
            PanelKind::Coasting => "Coasting",
            PanelKind::Tires => "Tire Spd / Car Spd",
        }
    }

    fn title(&self) -> Option<&'static str> {
        match self {
            PanelKind::Speed => Some("Last, Reference, Median"),
            PanelKind::TimeDiff => Some("Time Diff - Last, Reference"),
            _ => None,
        }
    }

    fn height(&self) -> f32 {
        match self {
            PanelKind::Speed => SPEED_PANEL_HEIGHT,
            PanelKind::SpeedVariance => SPEED_PANEL_HEIGHT / 4.,
            _ => SPEED_PANEL_HEIGHT / 2.,
        }
    }
}

/// A named, colored bundle of lap metrics drawn on every slot panel.
#[derive(Clone, Debug)]
pub struct DataSlot {
    pub id: SlotId,
    pub color: Color32,
    pub legend: String,
    pub visible: bool,
    pub data: LapData,
}

/// A rendered line of a panel, bound to a data slot.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelLine {
    pub slot: SlotId,
    pub legend: String,
    pub color: Color32,
}

#[derive(Clone, Debug)]
pub struct Panel {
    pub kind: PanelKind,
    pub height: f32,
    pub y_range: Option<(f64, f64)>,
    pub show_x_axis: bool,
    pub lines: Vec<PanelLine>,
}

impl Panel {
    fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            height: kind.height(),
            y_range: (kind == PanelKind::SpeedVariance).then_some(SPEED_VARIANCE_RANGE),
            // only the top panels carry the distance axis labels
            show_x_axis: matches!(kind, PanelKind::TimeDiff | PanelKind::Speed),
            lines: Vec::new(),
        }
    }
}

/// Speed, pedal and tire traces of several laps sharing one distance axis.
///
/// Every slot panel holds exactly one line per data slot, in slot order. The
/// first [`NUMBER_OF_DEFAULT_LAPS`] slots (last, reference and median lap) are
/// never removed.
pub struct RaceDiagram {
    width: f32,
    panels: Vec<Panel>,
    slots: Vec<DataSlot>,
    additional_slots: Vec<SlotId>,
    last_lap: SlotId,
    reference_lap: SlotId,
    median_lap: SlotId,
    time_diff: TimeDiff,
    speed_variance: SpeedVariance,
    next_slot_id: usize,
}

impl RaceDiagram {
    pub fn new(width: f32) -> Self {
        let mut diagram = Self {
            width,
            panels: PanelKind::LAYOUT.into_iter().map(Panel::new).collect(),
            slots: Vec::new(),
            additional_slots: Vec::new(),
            last_lap: SlotId(0),
            reference_lap: SlotId(0),
            median_lap: SlotId(0),
            time_diff: TimeDiff::default(),
            speed_variance: SpeedVariance::default(),
            next_slot_id: 0,
        };
        diagram.last_lap = diagram.add_lap_slot(LAST_LAP_COLOR, "Last Lap", true);
        diagram.reference_lap = diagram.add_lap_slot(REFERENCE_LAP_COLOR, "Reference Lap", true);
        diagram.median_lap = diagram.add_lap_slot(MEDIAN_LAP_COLOR, "Median Lap", false);
        diagram
    }

    /// Adds an empty data slot and one line bound to it on every slot panel.
    pub fn add_lap_slot(&mut self, color: Color32, legend: &str, visible: bool) -> SlotId {
        let id = SlotId(self.next_slot_id);
        self.next_slot_id += 1;

        self.slots.push(DataSlot {
            id,
            color,
            legend: legend.to_string(),
            visible,
            data: LapData::default(),
        });
        for kind in PanelKind::SLOT_PANELS {
            if let Some(panel) = self.panels.iter_mut().find(|p| p.kind == kind) {
                panel.lines.push(PanelLine {
                    slot: id,
                    legend: legend.to_string(),
                    color,
                });
            }
        }
        debug!("Added data slot {} '{}'", id, legend);
        id
    }

    fn slot_mut(&mut self, slot: SlotId) -> Result<&mut DataSlot, DashboardError> {
        self.slots
            .iter_mut()
            .find(|s| s.id == slot)
            .ok_or(DashboardError::UnknownSlot { slot: slot.0 })
    }

    /// Replaces all arrays of a slot at once.
    pub fn set_slot_data(&mut self, slot: SlotId, data: LapData) -> Result<(), DashboardError> {
        data.validate()?;
        self.slot_mut(slot)?.data = data;
        Ok(())
    }

    pub fn set_slot_visible(&mut self, slot: SlotId, visible: bool) -> Result<(), DashboardError> {
        self.slot_mut(slot)?.visible = visible;
        Ok(())
    }

    /// Adds a comparison lap, removable with [`RaceDiagram::remove_all_additional_laps`].
    pub fn add_additional_lap(
        &mut self,
        color: Color32,
        lap: &Lap,
        visible: bool,
    ) -> Result<SlotId, DashboardError> {
        let data = lap.data();
        data.validate()?;

        let slot = self.add_lap_slot(color, &lap.title, visible);
        self.set_slot_data(slot, data)?;
        self.additional_slots.push(slot);
        info!("Added comparison lap '{}'", lap.title);
        Ok(slot)
    }

    /// Assigns the three default slots in one go.
    pub fn show_laps(&mut self, last: &Lap, reference: &Lap, median: &Lap) -> Result<(), DashboardError> {
        let (last, reference, median) = (last.data(), reference.data(), median.data());
        last.validate()?;
        reference.validate()?;
        median.validate()?;

        self.set_slot_data(self.last_lap, last)?;
        self.set_slot_data(self.reference_lap, reference)?;
        self.set_slot_data(self.median_lap, median)
    }

    /// Refreshes the speed deviation panel and returns the laps it was computed from.
    pub fn update_fastest_laps_variance(
        &mut self,
        laps: &[Lap],
        options: &VarianceOptions,
    ) -> Result<Vec<Lap>, DashboardError> {
        let (variance, fastest_laps) = variance_for_fastest_laps(laps, options)?;
        self.speed_variance = variance;
        Ok(fastest_laps)
    }

    pub fn update_time_diff(&mut self, reference: &Lap, comparison: &Lap) -> Result<(), DashboardError> {
        self.time_diff = time_diff_by_distance(reference, comparison)?;
        Ok(())
    }

    /// Empties the default slots and the single-series panels.
    pub fn clear_laps(&mut self) {
        for slot in [self.last_lap, self.reference_lap, self.median_lap] {
            if let Some(slot) = self.slots.iter_mut().find(|s| s.id == slot) {
                slot.data = LapData::default();
            }
        }
        self.time_diff = TimeDiff::default();
        self.speed_variance = SpeedVariance::default();
    }

    /// Drops every slot beyond the default laps, together with its line on each panel.
    pub fn remove_all_additional_laps(&mut self) {
        info!("Removing {} comparison laps", self.additional_slots.len());
        self.additional_slots.clear();
        self.slots.truncate(NUMBER_OF_DEFAULT_LAPS);
        for panel in self.panels.iter_mut() {
            panel.lines.truncate(NUMBER_OF_DEFAULT_LAPS);
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn slots(&self) -> &[DataSlot] {
        &self.slots
    }

    pub fn slot(&self, slot: SlotId) -> Option<&DataSlot> {
        self.slots.iter().find(|s| s.id == slot)
    }

    pub fn last_lap_slot(&self) -> SlotId {
        self.last_lap
    }

    pub fn reference_lap_slot(&self) -> SlotId {
        self.reference_lap
    }

    pub fn median_lap_slot(&self) -> SlotId {
        self.median_lap
    }

    pub fn additional_slots(&self) -> &[SlotId] {
        &self.additional_slots
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, kind: PanelKind) -> Option<&Panel> {
        self.panels.iter().find(|p| p.kind == kind)
    }

    pub fn time_diff(&self) -> &TimeDiff {
        &self.time_diff
    }

    pub fn speed_variance(&self) -> &SpeedVariance {
        &self.speed_variance
    }

    /// Points of every visible line of a panel, in line order.
    pub fn panel_series(&self, kind: PanelKind) -> Vec<(&PanelLine, Vec<[f64; 2]>)> {
        let (Some(panel), Some(metric)) = (self.panel(kind), kind.metric()) else {
            return Vec::new();
        };
        panel
            .lines
            .iter()
            .filter_map(|line| {
                let slot = self.slot(line.slot)?;
                slot.visible.then(|| (line, slot.data.points(metric)))
            })
            .collect()
    }

    pub fn show(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            for slot in self.slots.iter_mut() {
                ui.checkbox(
                    &mut slot.visible,
                    RichText::new(slot.legend.as_str()).color(slot.color),
                );
            }
        });

        for panel in &self.panels {
            if let Some(title) = panel.kind.title() {
                ui.label(RichText::new(title).strong());
            }

            let mut plot = Plot::new(("race_diagram", panel.kind.y_label()))
                .width(self.width)
                .height(panel.height)
                .link_axis(X_AXIS_LINK_GROUP, Vec2b::new(true, false))
                .link_cursor(X_AXIS_LINK_GROUP, Vec2b::new(true, false))
                .y_axis_label(panel.kind.y_label())
                .show_axes(Vec2b::new(panel.show_x_axis, true))
                .show_background(false);
            if let Some((min, max)) = panel.y_range {
                plot = plot
                    .include_y(min)
                    .include_y(max)
                    .auto_bounds(Vec2b::new(true, false));
            }

            plot.show(ui, |plot_ui| match panel.kind {
                PanelKind::TimeDiff => {
                    plot_ui.hline(
                        HLine::new("", 0.)
                            .color(Color32::GRAY)
                            .style(LineStyle::Dashed { length: 6. })
                            .width(1.),
                    );
                    let points = self
                        .time_diff
                        .distance
                        .iter()
                        .zip(self.time_diff.timedelta.iter())
                        .map(|(d, t)| [*d, *t])
                        .collect::<Vec<_>>();
                    plot_ui.line(
                        Line::new("Time Diff", PlotPoints::new(points))
                            .color(LAST_LAP_COLOR)
                            .width(1.),
                    );
                }
                PanelKind::SpeedVariance => {
                    plot_ui.line(
                        Line::new("Speed Deviation", PlotPoints::new(self.speed_variance.points()))
                            .color(Color32::GRAY)
                            .width(1.),
                    );
                }
                kind => {
                    for (line, points) in self.panel_series(kind) {
                        plot_ui.line(
                            Line::new(line.legend.as_str(), PlotPoints::new(points))
                                .color(line.color)
                                .width(1.),
                        );
                    }
                }
            });
        }
    }
}
