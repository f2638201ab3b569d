use std::path::{Path, PathBuf};

use egui::{Color32, RichText, ScrollArea, Ui};
use egui_dropdown::DropDownBox;
use itertools::Itertools;
use log::{error, info, warn};

use gt7dash::{
    DashboardError,
    analysis::{FuelMap, best_lap, fuel_maps_by_relative_level, median_lap},
    diagrams::{LapTimeTable, RaceDiagram, RaceLine, annotate_race_line, comparison_color, show_fuel_maps},
    telemetry::{Lap, Session, load_laps_jsonl},
};

pub(crate) mod config;

use config::AppConfig;

const SIDE_PANEL_WIDTH: f32 = 420.;

/// Which laps the charts currently show.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct LapSelection {
    pub(crate) last: Option<u32>,
    pub(crate) reference: Option<u32>,
    pub(crate) comparisons: Vec<u32>,
}

pub(crate) struct DashboardApp {
    config: AppConfig,
    session: Option<Session>,
    source_file: Option<PathBuf>,
    selection: LapSelection,

    race_diagram: RaceDiagram,
    race_line: RaceLine,
    lap_time_table: LapTimeTable,
    fuel_maps: Vec<FuelMap>,
    fuel_remaining: f64,

    // dropdown text of the lap pickers
    reference_lap_input: String,
    comparison_lap_input: String,
    status_message: Option<String>,
}

impl DashboardApp {
    pub(crate) fn new(config: AppConfig) -> Self {
        Self {
            race_diagram: RaceDiagram::new(config.diagram_width),
            config,
            session: None,
            source_file: None,
            selection: LapSelection::default(),
            race_line: RaceLine::new(),
            lap_time_table: LapTimeTable::new(),
            fuel_maps: Vec::new(),
            fuel_remaining: 0.,
            reference_lap_input: String::new(),
            comparison_lap_input: String::new(),
            status_message: None,
        }
    }

    pub(crate) fn from_file(config: AppConfig, input: &Path) -> Self {
        let mut app = Self::new(config);
        app.load_file(input);
        app
    }

    fn load_file(&mut self, input: &Path) {
        match load_laps_jsonl(input) {
            Ok(session) => {
                info!("Loaded session on {} with {} laps", session.info.track_name, session.laps.len());
                self.source_file = Some(input.to_path_buf());
                self.config.last_telemetry_file = Some(input.to_path_buf());
                if let Err(e) = self.config.save() {
                    warn!("Could not save config: {}", e);
                }
                self.set_session(session);
            }
            Err(e) => {
                error!("Could not load telemetry file {:?}: {}", input, e);
                self.status_message = Some(format!("Could not load telemetry: {}", e));
            }
        }
    }

    fn set_session(&mut self, session: Session) {
        self.session = Some(session);
        self.selection = LapSelection::default();
        self.reference_lap_input.clear();
        self.comparison_lap_input.clear();
        self.race_diagram.remove_all_additional_laps();
        let result = self.refresh();
        self.report(result);
    }

    fn report(&mut self, result: Result<(), DashboardError>) {
        match result {
            Ok(()) => self.status_message = None,
            Err(e) => {
                error!("Could not refresh the dashboard: {}", e);
                self.status_message = Some(e.to_string());
            }
        }
    }

    fn laps(&self) -> &[Lap] {
        self.session.as_ref().map(|s| s.laps.as_slice()).unwrap_or_default()
    }

    fn lap(&self, number: u32) -> Option<&Lap> {
        self.laps().iter().find(|l| l.number == number)
    }

    /// Recomputes every chart from the loaded session and the current lap selection.
    fn refresh(&mut self) -> Result<(), DashboardError> {
        let laps = self.laps().to_vec();
        self.lap_time_table.show_laps(&laps)?;

        let Some(last) = laps.iter().max_by_key(|l| l.number) else {
            self.clear_charts();
            return Ok(());
        };
        let reference = self
            .selection
            .reference
            .and_then(|number| laps.iter().find(|l| l.number == number))
            .or_else(|| best_lap(&laps))
            .unwrap_or(last);
        self.selection.last = Some(last.number);
        self.selection.reference = Some(reference.number);
        if self.reference_lap_input.is_empty() {
            self.reference_lap_input = reference.title.clone();
        }

        let fastest_laps = self
            .race_diagram
            .update_fastest_laps_variance(&laps, &self.config.variance)?;
        let median = if fastest_laps.is_empty() {
            median_lap(std::slice::from_ref(last))?
        } else {
            median_lap(&fastest_laps)?
        };

        self.race_diagram.show_laps(last, reference, &median)?;
        self.race_diagram.update_time_diff(reference, last)?;

        self.race_line.set_laps(last, reference);
        annotate_race_line(&mut self.race_line, last, reference)?;

        self.fuel_maps = fuel_maps_by_relative_level(last);
        self.fuel_remaining = last.fuel_at_end;
        Ok(())
    }

    fn clear_charts(&mut self) {
        self.selection.last = None;
        self.race_diagram.clear_laps();
        self.race_line.clear();
        self.fuel_maps.clear();
        self.fuel_remaining = 0.;
    }

    fn lap_number_for_title(&self, title: &str) -> Option<u32> {
        self.laps().iter().find(|l| l.title == title).map(|l| l.number)
    }

    fn add_comparison(&mut self) -> Result<(), DashboardError> {
        let Some(number) = self.lap_number_for_title(&self.comparison_lap_input) else {
            warn!("Unknown comparison lap '{}'", self.comparison_lap_input);
            return Ok(());
        };
        let Some(lap) = self.lap(number).cloned() else {
            return Ok(());
        };
        let color = comparison_color(self.selection.comparisons.len());
        self.race_diagram.add_additional_lap(color, &lap, true)?;
        self.selection.comparisons.push(number);
        Ok(())
    }

    fn clear_comparisons(&mut self) {
        self.race_diagram.remove_all_additional_laps();
        self.selection.comparisons.clear();
    }

    fn show_top_bar(&mut self, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("📂 Load Telemetry").clicked()
                && let Some(path) = rfd::FileDialog::new().add_filter("telemetry", &["jsonl"]).pick_file()
            {
                self.load_file(&path);
            }

            let Some(session) = self.session.as_ref() else {
                ui.label("No telemetry loaded");
                return;
            };
            ui.separator();
            ui.label(RichText::new(format!(
                "{} - {}",
                session.info.track_name, session.info.car_name
            )))
            .on_hover_text(
                self.source_file
                    .as_ref()
                    .map(|f| f.display().to_string())
                    .unwrap_or_default(),
            );
            if let Some(last) = self.selection.last {
                ui.label(format!("Last lap: {}", last));
            }

            let titles = session.laps.iter().rev().map(|l| l.title.clone()).collect_vec();

            ui.separator();
            ui.label("Reference lap: ");
            let previous_reference = self.reference_lap_input.clone();
            ui.add(
                DropDownBox::from_iter(
                    &titles,
                    "reference_lap_dropbox",
                    &mut self.reference_lap_input,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );
            if previous_reference != self.reference_lap_input
                && let Some(number) = self.lap_number_for_title(&self.reference_lap_input)
            {
                self.selection.reference = Some(number);
                let result = self.refresh();
                self.report(result);
            }

            ui.separator();
            ui.label("Comparison lap: ");
            ui.add(
                DropDownBox::from_iter(
                    &titles,
                    "comparison_lap_dropbox",
                    &mut self.comparison_lap_input,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );
            if ui.button("Add comparison").clicked() {
                let result = self.add_comparison();
                self.report(result);
            }
            if ui.button("Clear comparisons").clicked() {
                self.clear_comparisons();
            }

            if let Some(message) = &self.status_message {
                ui.separator();
                ui.label(RichText::new(message).color(Color32::RED));
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("dashboard_top_bar")
            .frame(egui::Frame::new().inner_margin(4))
            .show(ctx, |ui| self.show_top_bar(ui));

        egui::TopBottomPanel::bottom("lap_times")
            .resizable(true)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| self.lap_time_table.show(ui));
            });

        egui::SidePanel::left("race_line_panel")
            .default_width(SIDE_PANEL_WIDTH)
            .show(ctx, |ui| {
                self.race_line.show(ui);
                ui.separator();
                show_fuel_maps(ui, &self.fuel_maps, self.fuel_remaining);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| self.race_diagram.show(ui));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt7dash::telemetry::{SessionInfo, TelemetrySample};

    fn lap(number: u32, speed_offset: f64, finish_ms: f64) -> Lap {
        let samples = (0..40)
            .map(|i| TelemetrySample {
                lap_number: number,
                distance_m: i as f64 * 5.,
                speed_mps: (100. + speed_offset + if i == 20 { -40. } else { 0. }) / 3.6,
                throttle: 255,
                position_x: i as f64,
                position_z: i as f64,
                fuel_level: 60. - number as f64 * 3. - i as f64 * 0.05,
                ..Default::default()
            })
            .collect_vec();
        Lap::from_samples(number, &samples, Some(finish_ms), "Car")
    }

    fn session() -> Session {
        Session {
            info: SessionInfo {
                track_name: "Test Track".to_string(),
                car_name: "Car".to_string(),
            },
            laps: vec![lap(1, 0., 61_000.), lap(2, 2., 60_000.), lap(3, 1., 60_500.)],
        }
    }

    #[test]
    fn test_session_selects_last_and_best_lap() {
        let mut app = DashboardApp::new(AppConfig::default());
        app.set_session(session());

        assert_eq!(app.selection.last, Some(3));
        assert_eq!(app.selection.reference, Some(2));
        assert_eq!(app.reference_lap_input, "Lap 2");
        assert!(app.status_message.is_none());
        assert_eq!(app.lap_time_table.rows().len(), 3);
        assert_eq!(app.fuel_maps.len(), 11);
        assert!(!app.race_line.labels().is_empty());
        assert!(!app.race_diagram.time_diff().is_empty());
        let last_slot = app.race_diagram.last_lap_slot();
        assert_eq!(app.race_diagram.slot(last_slot).unwrap().data.len(), 40);
    }

    #[test]
    fn test_comparisons_are_added_and_cleared() {
        let mut app = DashboardApp::new(AppConfig::default());
        app.set_session(session());

        app.comparison_lap_input = "Lap 1".to_string();
        app.add_comparison().unwrap();
        app.add_comparison().unwrap();
        assert_eq!(app.selection.comparisons, vec![1, 1]);
        assert_eq!(app.race_diagram.additional_slots().len(), 2);

        app.clear_comparisons();
        assert!(app.selection.comparisons.is_empty());
        assert!(app.race_diagram.additional_slots().is_empty());
    }

    #[test]
    fn test_unknown_comparison_is_ignored() {
        let mut app = DashboardApp::new(AppConfig::default());
        app.set_session(session());
        app.comparison_lap_input = "Lap 42".to_string();
        app.add_comparison().unwrap();
        assert!(app.race_diagram.additional_slots().is_empty());
    }

    #[test]
    fn test_empty_session() {
        let mut app = DashboardApp::new(AppConfig::default());
        app.set_session(Session::default());
        assert!(app.status_message.is_none());
        assert!(app.selection.last.is_none());
        assert!(app.lap_time_table.rows().is_empty());
    }

    #[test]
    fn test_empty_session_clears_charts() {
        let mut app = DashboardApp::new(AppConfig::default());
        app.set_session(session());
        app.set_session(Session::default());

        assert!(app.selection.last.is_none());
        assert!(app.race_diagram.slots().iter().all(|s| s.data.is_empty()));
        assert!(app.race_diagram.time_diff().is_empty());
        assert!(app.race_diagram.speed_variance().is_empty());
        assert!(app.race_line.layers().iter().all(|l| l.segments.is_empty()));
        assert!(app.race_line.labels().is_empty());
        assert!(app.fuel_maps.is_empty());
        assert_eq!(app.fuel_remaining, 0.);
    }
}
