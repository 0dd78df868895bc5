use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use scout_terminal::pulsate::{self, DIM_BORDER_ALPHA, DIM_FILL_ALPHA};
use scout_terminal::radar::{
    ChartController, ComparisonSeries, INPUT_BORDER_WIDTH, UpdateMode, palette_colors, set_alpha,
};
use scout_terminal::state::RadarVector;
use scout_terminal::tooltip::TooltipContent;

fn radar(values: &[Option<f64>]) -> RadarVector {
    RadarVector {
        labels: vec!["Gls".to_string(), "Ast".to_string(), "KP".to_string()],
        values: values.to_vec(),
    }
}

fn series(count: usize) -> Vec<ComparisonSeries> {
    (0..count)
        .map(|i| ComparisonSeries {
            id: Some(format!("p{i}")),
            name: format!("Player {i}"),
            radar: radar(&[Some(0.1 * i as f64), Some(0.5), Some(0.3)]),
        })
        .collect()
}

fn built(count: usize, now: Instant) -> ChartController {
    let mut chart = ChartController::default();
    chart.build(
        &radar(&[Some(0.9), Some(0.8), None]),
        "Input",
        &series(count),
        now,
    );
    chart
}

#[test]
fn input_is_dataset_zero_with_black_border() {
    let chart = built(3, Instant::now());
    let rendered = chart.chart().expect("chart built");
    let input = &rendered.datasets[0];
    assert_eq!(input.label, "Input");
    assert_eq!(input.player_id, None);
    assert_eq!(input.border.to_string(), "rgba(0, 0, 0, 1)");
    assert_eq!(input.background.a, 0.0);
    assert_eq!(input.border_width, INPUT_BORDER_WIDTH);
}

#[test]
fn dataset_map_holds_unique_indices_for_each_comparison() {
    let chart = built(7, Instant::now());
    let map = chart.dataset_map();
    assert_eq!(map.len(), 7);
    let indices: HashSet<usize> = map.values().copied().collect();
    assert_eq!(indices.len(), 7);
    assert!(indices.iter().all(|idx| (1..=7).contains(idx)));
    assert_eq!(chart.dataset_index("p0"), Some(1));
}

#[test]
fn palette_wraps_after_ten_comparisons() {
    let chart = built(11, Instant::now());
    let rendered = chart.chart().expect("chart built");
    assert_eq!(rendered.datasets.len(), 12);
    assert_eq!(rendered.datasets[11].border, rendered.datasets[1].border);
    assert_eq!(rendered.datasets[11].background, rendered.datasets[1].background);
    assert_eq!(palette_colors(10), palette_colors(0));
    assert_eq!(palette_colors(0).0.to_string(), "rgba(109, 172, 229, 0.45)");
}

#[test]
fn pulsate_dims_everything_but_input_and_target() {
    let now = Instant::now();
    let mut chart = built(3, now);
    chart.toggle_pulsate("p1", now);
    assert!(chart.pulsate().is_active_for("p1"));
    assert!(chart.frames().is_pending());

    let rendered = chart.chart().expect("chart built");
    assert_eq!(rendered.datasets[0].border.a, 1.0);
    assert_eq!(rendered.datasets[2].border.a, 1.0);
    assert_eq!(rendered.datasets[1].background.a, DIM_FILL_ALPHA);
    assert_eq!(rendered.datasets[1].border.a, DIM_BORDER_ALPHA);
    assert_eq!(rendered.datasets[3].border.a, DIM_BORDER_ALPHA);
}

#[test]
fn frames_oscillate_width_without_restarting_entry_animation() {
    let now = Instant::now();
    let mut chart = built(2, now);
    chart.toggle_pulsate("p0", now);

    let later = now + Duration::from_millis(900);
    assert!(chart.poll_frame(later));
    let (width, radius) = pulsate::pulse_at(Duration::from_millis(900));
    let rendered = chart.chart().expect("chart built");
    let target = &rendered.datasets[1];
    assert!((target.border_width - width).abs() < 1e-9);
    assert!((target.point_radius - radius).abs() < 1e-9);
    assert_eq!(rendered.last_update, UpdateMode::None);
    assert_eq!(rendered.built_at, now);
    assert!(chart.frames().is_pending());
}

#[test]
fn toggling_twice_restores_every_dataset() {
    let now = Instant::now();
    let mut chart = built(4, now);
    let before = chart.chart().expect("chart built").datasets.clone();

    chart.toggle_pulsate("p2", now);
    chart.poll_frame(now + Duration::from_millis(300));
    chart.poll_frame(now + Duration::from_millis(320));
    chart.toggle_pulsate("p2", now + Duration::from_millis(340));

    assert!(!chart.pulsate().is_active());
    assert!(!chart.frames().is_pending());
    assert_eq!(chart.chart().expect("chart built").datasets, before);
}

#[test]
fn switching_target_moves_the_highlight() {
    let now = Instant::now();
    let mut chart = built(3, now);
    chart.toggle_pulsate("p0", now);
    chart.toggle_pulsate("p2", now);
    assert!(chart.pulsate().is_active_for("p2"));
    let rendered = chart.chart().expect("chart built");
    assert_eq!(rendered.datasets[1].border.a, DIM_BORDER_ALPHA);
    assert_eq!(rendered.datasets[3].border.a, 1.0);
}

#[test]
fn unknown_id_does_nothing() {
    let now = Instant::now();
    let mut chart = built(2, now);
    chart.toggle_pulsate("nobody", now);
    assert!(!chart.pulsate().is_active());
    assert!(!chart.frames().is_pending());

    let mut empty = ChartController::default();
    empty.toggle_pulsate("p0", now);
    assert!(!empty.pulsate().is_active());
}

#[test]
fn rebuild_cancels_pulsate_and_stale_frame_stops() {
    let now = Instant::now();
    let mut chart = built(3, now);
    chart.toggle_pulsate("p1", now);
    chart.build(&radar(&[Some(0.2), Some(0.2), Some(0.2)]), "Other", &series(2), now);

    assert!(!chart.pulsate().is_active());
    assert!(!chart.frames().is_pending());
    assert!(!chart.poll_frame(now + Duration::from_millis(16)));

    // A frame that still fires after the rebuild must not reschedule.
    chart.run_frame(now + Duration::from_millis(32));
    assert!(!chart.frames().is_pending());
}

#[test]
fn set_alpha_rewrites_rgba() {
    assert_eq!(set_alpha("rgba(10, 20, 30, 0.5)", 0.12), "rgba(10, 20, 30, 0.12)");
    assert_eq!(set_alpha("rgb(10, 20, 30)", 0.28), "rgba(10, 20, 30, 0.28)");
    assert_eq!(set_alpha("not a colour", 0.5), "not a colour");
}

#[test]
fn tooltip_lists_every_dataset_at_the_axis() {
    let chart = built(2, Instant::now());
    let mut descriptions = HashMap::new();
    descriptions.insert("KP".to_string(), "Key passes.".to_string());

    let content = chart.tooltip_content(2, &descriptions).expect("axis exists");
    let TooltipContent::Chart {
        title,
        description,
        rows,
    } = content
    else {
        panic!("expected chart content");
    };
    assert_eq!(title, "KP");
    assert_eq!(description, "Key passes.");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].name, "Input");
    assert_eq!(rows[0].value, "-");
    assert_eq!(rows[1].value, "0.3");
    assert!(chart.tooltip_content(9, &descriptions).is_none());
}
