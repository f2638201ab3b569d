// Integration tests driving the chart models the way the dashboard refresh does

use egui::Color32;
use gt7dash::{
    DashboardError,
    analysis::{VarianceOptions, best_lap, median_lap},
    diagrams::{
        LabelKind, LapTimeTable, NUMBER_OF_DEFAULT_LAPS, PanelKind, RaceDiagram, RaceLine, annotate_race_line,
        comparison_color, fuel_map_html_table,
    },
    telemetry::{Lap, TelemetrySample},
};

/// A lap with one braking zone into a hairpin, `pace` scales the speed.
fn hairpin_lap(number: u32, pace: f64) -> Lap {
    let samples: Vec<TelemetrySample> = (0..200)
        .map(|i| {
            let speed_kph = match i {
                0..80 => 120. + i as f64,
                80..100 => 200. - (i - 80) as f64 * 6.,
                _ => 80. + (i - 100) as f64 * 0.8,
            } * pace;
            TelemetrySample {
                lap_number: number,
                // a faster lap covers more ground per packet
                distance_m: i as f64 * 10. * pace,
                speed_mps: speed_kph / 3.6,
                throttle: if (80..100).contains(&i) { 0 } else { 255 },
                brake: if (80..100).contains(&i) { 200 } else { 0 },
                tire_speed_ratio: 1.,
                position_x: i as f64 * 2.,
                position_z: (i as f64 / 20.).sin() * 100.,
                fuel_level: 40. - i as f64 * 0.01,
                ..Default::default()
            }
        })
        .collect();
    let finish_ms = 90_000. / pace;
    Lap::from_samples(number, &samples, Some(finish_ms), "Porsche 911")
}

fn laps() -> Vec<Lap> {
    vec![
        hairpin_lap(1, 0.97),
        hairpin_lap(2, 1.0),
        hairpin_lap(3, 0.99),
        hairpin_lap(4, 0.98),
    ]
}

#[test]
fn test_full_refresh_cycle() {
    let laps = laps();
    let last = laps.last().unwrap();
    let reference = best_lap(&laps).unwrap();
    assert_eq!(reference.number, 2);

    let mut diagram = RaceDiagram::new(800.);
    let fastest = diagram
        .update_fastest_laps_variance(&laps, &VarianceOptions::default())
        .unwrap();
    assert_eq!(fastest.len(), 3);
    // the slowest compared lap only reaches the 196th bucket
    assert_eq!(diagram.speed_variance().len(), 196);

    let median = median_lap(&fastest).unwrap();
    diagram.show_laps(last, reference, &median).unwrap();
    diagram.update_time_diff(reference, last).unwrap();
    // the last lap is slower everywhere
    assert!(diagram.time_diff().timedelta.last().unwrap() > &0.);

    let mut race_line = RaceLine::new();
    race_line.set_laps(last, reference);
    annotate_race_line(&mut race_line, last, reference).unwrap();
    let valleys = race_line
        .labels()
        .iter()
        .filter(|l| l.kind == LabelKind::Valley)
        .collect::<Vec<_>>();
    assert_eq!(valleys.len(), 2);
    assert_eq!(valleys[0].text, "78▾");
    assert_eq!(valleys[1].text, "80▾");

    let mut table = LapTimeTable::new();
    table.show_laps(&laps).unwrap();
    assert_eq!(table.rows()[0].number, "4");

    let html = fuel_map_html_table(last);
    assert!(html.contains("background-color:rgba(0,255,0,0.5)"));
}

#[test]
fn test_comparisons_can_be_cleared_repeatedly() {
    let laps = laps();
    let mut diagram = RaceDiagram::new(800.);

    for round in 0..3 {
        for (i, lap) in laps.iter().enumerate() {
            diagram
                .add_additional_lap(comparison_color(i), lap, round % 2 == 0)
                .unwrap();
        }
        for kind in PanelKind::SLOT_PANELS {
            assert_eq!(
                diagram.panel(kind).unwrap().lines.len(),
                NUMBER_OF_DEFAULT_LAPS + laps.len()
            );
        }
        diagram.remove_all_additional_laps();
        for kind in PanelKind::SLOT_PANELS {
            assert_eq!(diagram.panel(kind).unwrap().lines.len(), NUMBER_OF_DEFAULT_LAPS);
        }
    }
    assert_eq!(diagram.slots().len(), NUMBER_OF_DEFAULT_LAPS);
}

#[test]
fn test_broken_lap_never_reaches_the_diagram() {
    let mut broken = hairpin_lap(5, 1.);
    broken.data.throttle.truncate(10);

    let mut diagram = RaceDiagram::new(800.);
    let result = diagram.add_additional_lap(Color32::YELLOW, &broken, true);
    assert!(matches!(
        result,
        Err(DashboardError::MismatchedSampleCount { .. })
    ));
    assert!(
        diagram
            .show_laps(&broken, &hairpin_lap(1, 1.), &hairpin_lap(2, 1.))
            .is_err()
    );
    let last_slot = diagram.last_lap_slot();
    assert!(diagram.slot(last_slot).unwrap().data.is_empty());
}
