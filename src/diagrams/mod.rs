// Retained chart models for the dashboard and their egui renderers

pub mod race_diagram;
pub mod race_line;
pub mod tables;

use egui::Color32;

pub use race_diagram::{DataSlot, NUMBER_OF_DEFAULT_LAPS, Panel, PanelKind, PanelLine, RaceDiagram, SlotId};
pub use race_line::{DrivingMode, LabelKind, RaceLine, RaceLineLabel, SegmentLayer, annotate_race_line};
pub use tables::{LapTimeTable, fuel_map_html_table, show_fuel_maps};

pub const LAST_LAP_COLOR: Color32 = Color32::from_rgb(30, 144, 255);
pub const REFERENCE_LAP_COLOR: Color32 = Color32::from_rgb(255, 0, 255);
pub const MEDIAN_LAP_COLOR: Color32 = Color32::from_rgb(0, 160, 0);

pub const THROTTLE_COLOR: Color32 = Color32::GREEN;
pub const BRAKING_COLOR: Color32 = Color32::RED;
pub const COASTING_COLOR: Color32 = Color32::from_rgb(30, 144, 255);

/// Color for the `index`-th comparison lap.
pub fn comparison_color(index: usize) -> Color32 {
    const PALETTE: [Color32; 8] = [
        Color32::from_rgb(255, 127, 14),
        Color32::from_rgb(214, 39, 40),
        Color32::from_rgb(148, 103, 189),
        Color32::from_rgb(140, 86, 75),
        Color32::from_rgb(227, 119, 194),
        Color32::from_rgb(127, 127, 127),
        Color32::from_rgb(188, 189, 34),
        Color32::from_rgb(23, 190, 207),
    ];
    PALETTE[index % PALETTE.len()]
}
