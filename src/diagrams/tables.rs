use egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::{
    analysis::{FuelMap, LapTimeRow, best_lap, fuel_maps_by_relative_level, lap_time_rows, seconds_to_lap_time},
    errors::DashboardError,
    telemetry::Lap,
};

const ROW_HEIGHT: f32 = 18.;
const HEADER_HEIGHT: f32 = 20.;
const CURRENT_MIXTURE_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 128, 0, 128);

/// Lap times of the session, newest lap on top.
#[derive(Default)]
pub struct LapTimeTable {
    rows: Vec<LapTimeRow>,
}

impl LapTimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[LapTimeRow] {
        &self.rows
    }

    /// Rebuilds the rows from `laps`.
    pub fn show_laps(&mut self, laps: &[Lap]) -> Result<(), DashboardError> {
        for lap in laps {
            lap.data.validate()?;
        }
        let best_lap_time_ms = best_lap(laps).map(|l| l.lap_finish_time_ms).unwrap_or(0.);
        self.rows = lap_time_rows(laps, best_lap_time_ms);
        Ok(())
    }

    pub fn show(&self, ui: &mut Ui) {
        ui.push_id("lap_time_table", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(40.), LapTimeRow::HEADERS.len())
                .min_scrolled_height(0.)
                .header(HEADER_HEIGHT, |mut header| {
                    for title in LapTimeRow::HEADERS {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, self.rows.len(), |mut row| {
                        let lap_row = &self.rows[row.index()];
                        for cell in lap_row.cells() {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    }
}

struct FuelMapCells {
    fuel_consumed: String,
    laps_remaining: String,
    time_remaining: String,
    time_diff: String,
}

impl FuelMapCells {
    fn of(fuel_map: &FuelMap) -> Self {
        if !fuel_map.has_fuel_consumption() {
            return Self {
                fuel_consumed: "0".to_string(),
                laps_remaining: "0.0".to_string(),
                time_remaining: "No Fuel".to_string(),
                time_diff: "Consumption".to_string(),
            };
        }
        Self {
            fuel_consumed: format!("{}", fuel_map.fuel_consumed_per_lap.trunc() as i64),
            laps_remaining: format!("{:.1}", fuel_map.laps_remaining_on_current_fuel),
            time_remaining: seconds_to_lap_time(fuel_map.time_remaining_on_current_fuel_ms / 1000.),
            time_diff: seconds_to_lap_time(fuel_map.lap_time_diff_ms / 1000.),
        }
    }
}

fn is_current_mixture(fuel_map: &FuelMap) -> bool {
    fuel_map.mixture_setting == 0 && fuel_map.has_fuel_consumption()
}

/// The fuel map of `last_lap` as an HTML table, followed by the remaining fuel.
pub fn fuel_map_html_table(last_lap: &Lap) -> String {
    let mut table = String::from(
        "<table><tr>\
         <th title='The fuel level relative to the current one'>Fuel Lvl.</th>\
         <th title='Fuel consumed'>Fuel Cons.</th>\
         <th title='Laps remaining with this setting'>Laps Rem.</th>\
         <th title='Time remaining with this setting' >Time Rem.</th>\
         <th title='Time Diff to last lap with this setting'>Time Diff</th></tr>",
    );

    for fuel_map in fuel_maps_by_relative_level(last_lap) {
        let style = if is_current_mixture(&fuel_map) {
            "background-color:rgba(0,255,0,0.5)"
        } else {
            ""
        };
        let cells = FuelMapCells::of(&fuel_map);
        table.push_str(&format!(
            "<tr id='fuel_map_row_{setting}' style='{style}'>\
             <td style='text-align:center'>{setting}</td>\
             <td style='text-align:center'>{}</td>\
             <td style='text-align:center'>{}</td>\
             <td style='text-align:center'>{}</td>\
             <td style='text-align:center'>{}</td>\
             </tr>",
            cells.fuel_consumed,
            cells.laps_remaining,
            cells.time_remaining,
            cells.time_diff,
            setting = fuel_map.mixture_setting,
        ));
    }
    table.push_str("</table>");
    table.push_str(&format!(
        "<p>Fuel Remaining: <b>{}</b></p>",
        last_lap.fuel_at_end.trunc() as i64
    ));
    table
}

pub fn show_fuel_maps(ui: &mut Ui, fuel_maps: &[FuelMap], fuel_remaining: f64) {
    const HEADERS: [(&str, &str); 5] = [
        ("Fuel Lvl.", "The fuel level relative to the current one"),
        ("Fuel Cons.", "Fuel consumed"),
        ("Laps Rem.", "Laps remaining with this setting"),
        ("Time Rem.", "Time remaining with this setting"),
        ("Time Diff", "Time Diff to last lap with this setting"),
    ];

    ui.push_id("fuel_map_table", |ui| {
        TableBuilder::new(ui)
            .striped(false)
            .cell_layout(egui::Layout::centered_and_justified(egui::Direction::LeftToRight))
            .columns(Column::auto().at_least(60.), HEADERS.len())
            .header(HEADER_HEIGHT, |mut header| {
                for (title, hover) in HEADERS {
                    header.col(|ui| {
                        ui.strong(title).on_hover_text(hover);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, fuel_maps.len(), |mut row| {
                    let fuel_map = &fuel_maps[row.index()];
                    let cells = FuelMapCells::of(fuel_map);
                    let highlight = is_current_mixture(fuel_map);
                    let setting = fuel_map.mixture_setting.to_string();
                    for text in [
                        setting.as_str(),
                        cells.fuel_consumed.as_str(),
                        cells.laps_remaining.as_str(),
                        cells.time_remaining.as_str(),
                        cells.time_diff.as_str(),
                    ] {
                        row.col(|ui| {
                            let mut text = RichText::new(text);
                            if highlight {
                                text = text.background_color(CURRENT_MIXTURE_COLOR);
                            }
                            ui.label(text);
                        });
                    }
                });
            });
    });
    ui.horizontal(|ui| {
        ui.label("Fuel Remaining:");
        ui.strong(format!("{}", fuel_remaining.trunc() as i64));
    });
}
