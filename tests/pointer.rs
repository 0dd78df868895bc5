use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use serde_json::json;

use scout_terminal::api;
use scout_terminal::layout::{self, ScreenLayout};
use scout_terminal::radar::{self, ChartController};
use scout_terminal::state::{AppState, Delta, ProviderCommand, RadarVector, apply_delta_at};
use scout_terminal::tooltip::TooltipContent;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Messi selected, his details and the feature descriptions loaded.
fn state_with_player(now: Instant) -> AppState {
    let mut state = AppState::default();
    let hits = api::parse_search_json(&read_fixture("search_messi.json"))
        .expect("fixture should parse")
        .ok()
        .expect("search ok");
    apply_delta_at(&mut state, Delta::SetSuggestions(hits), now);
    state.choose_suggestion(0);

    let player = api::parse_player_json(&read_fixture("player_details.json"))
        .expect("fixture should parse")
        .ok()
        .expect("player ok");
    apply_delta_at(&mut state, Delta::SetPlayerDetail(player), now);

    let descriptions = api::parse_feature_desc_json(&read_fixture("feature_desc.json"))
        .expect("fixture should parse")
        .ok()
        .expect("descriptions ok");
    apply_delta_at(&mut state, Delta::SetFeatureDescriptions(descriptions), now);
    state
}

fn state_with_similar(now: Instant) -> AppState {
    let mut state = state_with_player(now);
    let resp = api::parse_similar_json(&read_fixture("similar_players.json"))
        .expect("fixture should parse")
        .ok()
        .expect("similar ok");
    apply_delta_at(&mut state, Delta::SetSimilar(resp), now);
    state
}

fn long_similar_body(count: usize) -> String {
    let results: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "Rk": 1000 + i,
                "Player": format!("Player {i}"),
                "Pos": "MF",
                "Squad": "Club",
                "Age": 25,
                "similarity_score": 0.9 - i as f64 * 0.01,
                "radar": {"labels": ["Gls", "Ast"], "values": [0.5, 0.5]}
            })
        })
        .collect();
    json!({
        "ok": true,
        "input_radar": {"labels": ["Gls", "Ast"], "values": [0.9, 0.8]},
        "results": results
    })
    .to_string()
}

#[test]
fn clicking_one_cell_twice_hits_the_same_row_in_a_scrolled_table() {
    let now = Instant::now();
    let mut state = state_with_player(now);
    let resp = api::parse_similar_json(&long_similar_body(30))
        .expect("body should parse")
        .ok()
        .expect("similar ok");
    apply_delta_at(&mut state, Delta::SetSimilar(resp), now);

    let screen = Rect::new(0, 0, 160, 24);
    let visible = ScreenLayout::compute(screen, &state).table_visible_rows();
    assert!(visible < 30);
    for _ in 0..20 {
        state.select_next_row(visible);
    }
    let offset = state.table_offset;
    assert!(offset > 0);

    // Third data row: border, then header, then rows.
    let table = ScreenLayout::compute(screen, &state).table;
    let (col, row) = (table.x + 10, table.y + 4);

    let first = layout::similar_row_at(&ScreenLayout::compute(screen, &state), &state, col, row)
        .expect("row under pointer");
    assert_eq!(first, offset + 2);
    state.row_click(first, now);
    let second = layout::similar_row_at(&ScreenLayout::compute(screen, &state), &state, col, row)
        .expect("row under pointer");
    assert_eq!(second, first);
    assert_eq!(state.table_offset, offset);

    state.row_click(second, now + Duration::from_millis(150));
    assert!(state.checked_ids().is_empty());
    assert_eq!(
        state.row_double_click(second),
        Some(ProviderCommand::Compare {
            player_ids: vec!["1412".to_string(), format!("{}", 1000 + first)]
        })
    );
}

#[test]
fn keyboard_scrolls_table_only_when_cursor_leaves_the_window() {
    let now = Instant::now();
    let mut state = state_with_player(now);
    let resp = api::parse_similar_json(&long_similar_body(30))
        .expect("body should parse")
        .ok()
        .expect("similar ok");
    apply_delta_at(&mut state, Delta::SetSimilar(resp), now);

    for _ in 0..4 {
        state.select_next_row(5);
    }
    assert_eq!((state.similar_cursor, state.table_offset), (4, 0));
    state.select_next_row(5);
    assert_eq!((state.similar_cursor, state.table_offset), (5, 1));
    for _ in 0..5 {
        state.select_prev_row(5);
    }
    assert_eq!((state.similar_cursor, state.table_offset), (0, 0));
}

#[test]
fn stat_rows_resolve_to_their_field_key_and_description() {
    let mut state = state_with_player(Instant::now());
    let layout = ScreenLayout::compute(Rect::new(0, 0, 160, 48), &state);
    let panel = layout.input_panel;

    let player_key = layout::field_key_at(&layout, &state, panel.x + 2, panel.y + 1);
    assert_eq!(player_key.as_deref(), Some("Player"));

    // Assists is the eighth row and resolved from the short column name.
    let pointer = (panel.x + 3, panel.y + 1 + 7);
    let key = layout::field_key_at(&layout, &state, pointer.0, pointer.1);
    assert_eq!(key.as_deref(), Some("Ast"));

    state.hover_field(key.as_deref(), pointer);
    assert!(state.tooltip.is_visible());
    assert_eq!(
        state.tooltip.content(),
        Some(&TooltipContent::Field {
            key: "Ast".to_string(),
            description: "Assists.".to_string(),
        })
    );
    assert_eq!(state.tooltip.anchor(), (pointer.0 + 1, pointer.1 + 1));

    state.hover_field(None, pointer);
    assert!(!state.tooltip.is_visible());
}

#[test]
fn field_tooltip_hides_when_pointer_jumps_into_the_chart() {
    let now = Instant::now();
    let mut state = state_with_similar(now);
    let layout = ScreenLayout::compute(Rect::new(0, 0, 160, 48), &state);
    let panel = layout.input_panel;
    let key = layout::field_key_at(&layout, &state, panel.x + 2, panel.y + 1);
    state.hover_field(key.as_deref(), (panel.x + 2, panel.y + 1));
    assert!(state.tooltip.is_visible());

    state.tooltip.pointer_enter_canvas();
    state.hover_chart(None, now);
    state.tick(now + Duration::from_secs(2));
    assert!(!state.tooltip.is_visible());
}

#[test]
fn hit_test_finds_the_vertex_under_the_pointer() {
    let mut chart = ChartController::default();
    let input = RadarVector {
        labels: vec!["Gls".to_string(), "Ast".to_string(), "KP".to_string()],
        values: vec![Some(0.9), Some(0.8), None],
    };
    chart.build(&input, "Input", &[], Instant::now());
    let rendered = chart.chart().expect("chart built");
    let area = Rect::new(0, 0, 60, 24);

    let cell = radar::to_cell(area, radar::vertex(0, 3, 0.9, rendered.scale_max()));
    assert_eq!(radar::hit_test(rendered, area, cell.0, cell.1), Some((0, cell)));
    assert_eq!(radar::hit_test(rendered, area, 0, 0), None);
    assert_eq!(radar::hit_test(rendered, area, 60, cell.1), None);
}

#[test]
fn chart_hover_shows_every_dataset_value_for_the_axis() {
    let now = Instant::now();
    let mut state = state_with_similar(now);
    let layout = ScreenLayout::compute(Rect::new(0, 0, 160, 48), &state);
    let canvas = layout.chart_canvas;

    let rendered = state.chart.chart().expect("chart built");
    let cell = radar::to_cell(canvas, radar::vertex(0, 5, 0.91, rendered.scale_max()));
    let hit = radar::hit_test(rendered, canvas, cell.0, cell.1);
    let (axis, caret) = hit.expect("pointer is on a data point");
    assert_eq!(axis, 0);

    state.tooltip.pointer_enter_canvas();
    state.hover_chart(hit, now);
    assert!(state.tooltip.is_visible());
    assert_eq!(state.tooltip.anchor(), (caret.0 + 2, caret.1 + 1));
    let Some(TooltipContent::Chart {
        title,
        description,
        rows,
    }) = state.tooltip.content()
    else {
        panic!("expected chart tooltip");
    };
    assert_eq!(title, "Gls");
    assert_eq!(description, "Goals scored.");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].name, "Lionel Messi");
    assert_eq!(rows[0].value, "0.91");
    assert_eq!(rows[1].value, "0.7");
}

#[test]
fn compare_scroll_moves_hover_rows_and_stops_at_the_last_line() {
    let now = Instant::now();
    let mut state = state_with_similar(now);
    let resp = api::parse_compare_json(&read_fixture("compare_players.json"))
        .expect("fixture should parse")
        .ok()
        .expect("compare ok");
    apply_delta_at(&mut state, Delta::SetCompare(resp), now);

    let layout = ScreenLayout::compute(Rect::new(0, 0, 160, 30), &state);
    let visible = layout.compare_visible_rows();
    let top = (layout.compare.x + 2, layout.compare.y + 1);

    // Line 0 is the box title, which has no field.
    assert_eq!(layout::field_key_at(&layout, &state, top.0, top.1), None);
    state.scroll_compare(2, visible);
    assert_eq!(state.compare_scroll, 2);
    assert_eq!(
        layout::field_key_at(&layout, &state, top.0, top.1).as_deref(),
        Some("Pos")
    );

    let total = scout_terminal::panels::flatten_boxes(&state.compare_boxes).len();
    state.scroll_compare(100, visible);
    assert_eq!(state.compare_scroll as usize, total - visible);
    state.scroll_compare(-100, visible);
    assert_eq!(state.compare_scroll, 0);

    let (height, width) = layout.report_viewport().expect("report shown after compare");
    state.scroll_report(100, height, width);
    assert_eq!(
        state.report_scroll as usize,
        state.report.wrapped_line_count(width).saturating_sub(height)
    );
}
