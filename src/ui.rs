use std::time::Instant;

use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::layout::{self, ScreenLayout};
use crate::panels::{self, PanelLine};
use crate::pulsate::BASE_BORDER_WIDTH;
use crate::radar::{self, CHART_BACKGROUND, GRID_COLOR, RadarChart, Rgba};
use crate::report::{RAW_REPORT_TITLE, ReportBody, ReportLine};
use crate::state::{AppState, FilterField, Focus};
use crate::tooltip::TooltipContent;

const GRID_RINGS: usize = 5;
const STROKE_SPACING: f64 = 0.012;
const MAX_STROKES: usize = 6;
const CONSOLE_LINES: usize = 4;

pub fn ui(frame: &mut Frame, state: &AppState, now: Instant) {
    let screen = frame.size();
    let layout = ScreenLayout::compute(screen, state);

    render_search(frame, layout.search, state);
    render_filters(frame, layout.filters, state);
    render_actions(frame, layout.actions, state);
    render_panel(
        frame,
        layout.input_panel,
        "Input player",
        &panels::panel_lines(state.input_panel.as_ref()),
        0,
    );
    render_panel(
        frame,
        layout.compare,
        "Compare",
        &panels::flatten_boxes(&state.compare_boxes),
        state.compare_scroll,
    );
    render_table(frame, &layout, state);
    render_chart(frame, &layout, state, now);
    if let Some(area) = layout.report {
        render_report(frame, area, state);
    }
    render_console(frame, layout.console, state);
    frame.render_widget(Paragraph::new(footer_text(state)), layout.footer);

    if let Some(area) = layout.suggestions {
        render_suggestions(frame, area, state);
    }
    render_tooltip(frame, screen, state);
    if state.help_overlay {
        render_help_overlay(frame, screen);
    }
    if let Some(msg) = state.alert.as_deref() {
        render_alert(frame, screen, msg);
    }
}

fn focus_style(state: &AppState, focus: Focus) -> Style {
    if state.focus == focus {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_search(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut text = state.search_input.clone();
    if state.focus == Focus::Search {
        text.push('▏');
    }
    let title = match &state.selected_player_name {
        Some(name) => format!("Scout | player search | selected: {name}"),
        None => "Scout | player search".to_string(),
    };
    let search = Paragraph::new(text).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(focus_style(state, Focus::Search)),
    );
    frame.render_widget(search, area);
}

fn render_suggestions(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Clear, area);
    let lines: Vec<Line> = state
        .suggestions
        .iter()
        .enumerate()
        .map(|(idx, hit)| {
            let style = if idx == state.suggestion_selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::styled(hit.player_name.clone(), style)
        })
        .collect();
    let list = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn render_filters(frame: &mut Frame, area: Rect, state: &AppState) {
    let f = &state.filters;
    let fields = [
        (FilterField::K, "k", text_or(&f.k, "10")),
        (FilterField::MinAge, "min age", text_or(&f.min_age, "-")),
        (FilterField::MaxAge, "max age", text_or(&f.max_age, "-")),
        (
            FilterField::League,
            "league",
            f.league.clone().unwrap_or_else(|| "All".to_string()),
        ),
        (
            FilterField::Position,
            "position",
            f.position.clone().unwrap_or_else(|| "All".to_string()),
        ),
    ];
    let mut spans = vec![Span::raw(" ")];
    for (field, label, value) in fields {
        let active = state.focus == Focus::Filters && state.filter_field == field;
        let value_style = if active {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::raw(format!("{label}: ")));
        spans.push(Span::styled(value, value_style));
        spans.push(Span::raw("   "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn text_or(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

fn render_actions(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = Vec::new();
    for (idx, (_, label)) in layout::action_labels(state).into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("[ {label} ]"),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_panel(frame: &mut Frame, area: Rect, title: &str, lines: &[PanelLine], scroll: u16) {
    let text: Vec<Line> = lines.iter().map(panel_line).collect();
    let panel = Paragraph::new(text)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .scroll((scroll, 0));
    frame.render_widget(panel, area);
}

fn panel_line(line: &PanelLine) -> Line<'static> {
    match line {
        PanelLine::Title(title) => Line::styled(
            title.clone(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        PanelLine::Row(row) => Line::from(vec![
            Span::styled(format!("{}: ", row.label), Style::default().fg(Color::Cyan)),
            Span::raw(row.value.clone()),
        ]),
        PanelLine::Blank => Line::raw(""),
        PanelLine::Note(note) => {
            Line::styled(note.clone(), Style::default().fg(Color::DarkGray))
        }
    }
}

fn render_table(frame: &mut Frame, layout: &ScreenLayout, state: &AppState) {
    let area = layout.table;
    let block = Block::default()
        .title(format!("Similar players ({})", state.similar.len()))
        .borders(Borders::ALL)
        .border_style(focus_style(state, Focus::Table));

    if state.similar.is_empty() {
        let empty = Paragraph::new("Pick a player and press g to find similar players")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let (start, end) = layout::table_window(
        state.table_offset,
        state.similar.len(),
        layout.table_visible_rows(),
    );
    let rows: Vec<Row> = state.similar[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let idx = start + offset;
            let player = &row.result.player;
            let checkbox = if row.checked { "[x]" } else { "[ ]" };
            let mut style = Style::default();
            if row.checked {
                style = style.bg(Color::Rgb(40, 60, 90));
            }
            if state.focus == Focus::Table && idx == state.similar_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Row::new(vec![
                Cell::from(checkbox),
                Cell::from((idx + 1).to_string()),
                Cell::from(player.name()),
                Cell::from(player.display("Pos")),
                Cell::from(player.display("Squad")),
                Cell::from(player.display("Age")),
                Cell::from(row.result.score_label()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(14),
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(4),
        Constraint::Length(6),
    ];
    let header = Row::new(vec!["", "#", "Player", "Pos", "Club", "Age", "Sim"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_chart(frame: &mut Frame, layout: &ScreenLayout, state: &AppState, now: Instant) {
    let block = Block::default().title("Radar").borders(Borders::ALL);
    frame.render_widget(block, layout.chart);

    let Some(chart) = state.chart.chart() else {
        let empty = Paragraph::new("No chart yet")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, layout.chart_canvas);
        return;
    };

    let area = layout.chart_canvas;
    let (x_bounds, y_bounds) = radar::chart_bounds(area);
    let dot = dot_size(area, x_bounds);
    let progress = chart.entry_progress(now);
    let canvas = Canvas::default()
        .background_color(rgb(CHART_BACKGROUND))
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            draw_grid(ctx, chart);
            ctx.layer();
            // Later datasets first so the input trace ends up on top.
            for ds_idx in (0..chart.datasets.len()).rev() {
                draw_dataset(ctx, chart, ds_idx, progress, dot);
            }
            ctx.layer();
            draw_axis_labels(ctx, chart);
        });
    frame.render_widget(canvas, area);

    render_legend(frame, layout.chart_legend, chart);
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

// Canvas units covered by one braille dot horizontally.
fn dot_size(area: Rect, x_bounds: [f64; 2]) -> f64 {
    (x_bounds[1] - x_bounds[0]) / (f64::from(area.width.max(1)) * 2.0)
}

fn draw_grid(ctx: &mut Context, chart: &RadarChart) {
    let axes = chart.labels.len();
    if axes == 0 {
        return;
    }
    let scale = chart.scale_max();
    let color = GRID_COLOR.over(CHART_BACKGROUND);
    for ring in 1..=GRID_RINGS {
        let value = scale * ring as f64 / GRID_RINGS as f64;
        for axis in 0..axes {
            let (x1, y1) = radar::vertex(axis, axes, value, scale);
            let (x2, y2) = radar::vertex((axis + 1) % axes, axes, value, scale);
            ctx.draw(&CanvasLine {
                x1,
                y1,
                x2,
                y2,
                color,
            });
        }
    }
    for axis in 0..axes {
        let (x2, y2) = radar::vertex(axis, axes, scale, scale);
        ctx.draw(&CanvasLine {
            x1: 0.0,
            y1: 0.0,
            x2,
            y2,
            color,
        });
    }
}

/// Scale offsets for the concentric copies that stand in for a thick border.
pub fn stroke_offsets(border_width: f64) -> Vec<f64> {
    let copies = (border_width / BASE_BORDER_WIDTH)
        .round()
        .clamp(1.0, MAX_STROKES as f64) as usize;
    let mid = (copies - 1) as f64 / 2.0;
    (0..copies)
        .map(|i| 1.0 + (i as f64 - mid) * STROKE_SPACING)
        .collect()
}

fn draw_dataset(ctx: &mut Context, chart: &RadarChart, ds_idx: usize, progress: f64, dot: f64) {
    let axes = chart.labels.len();
    let Some(ds) = chart.datasets.get(ds_idx) else {
        return;
    };
    if axes == 0 {
        return;
    }
    let scale = chart.scale_max();
    let color = ds.border.over(CHART_BACKGROUND);
    let point = |axis: usize| -> Option<(f64, f64)> {
        let value = chart.value_at(ds_idx, axis)?;
        Some(radar::vertex(axis, axes, value * progress, scale))
    };

    for factor in stroke_offsets(ds.border_width) {
        for axis in 0..axes {
            // Missing values leave a gap in the outline.
            let (Some(a), Some(b)) = (point(axis), point((axis + 1) % axes)) else {
                continue;
            };
            ctx.draw(&CanvasLine {
                x1: a.0 * factor,
                y1: a.1 * factor,
                x2: b.0 * factor,
                y2: b.1 * factor,
                color,
            });
        }
    }

    let fill = ds.background.over(CHART_BACKGROUND);
    for axis in 0..axes {
        if let Some((x, y)) = point(axis) {
            ctx.draw(&Circle {
                x,
                y,
                radius: ds.point_radius * dot * 0.5,
                color: if ds.background.a > 0.0 { fill } else { color },
            });
        }
    }
}

fn draw_axis_labels(ctx: &mut Context, chart: &RadarChart) {
    let axes = chart.labels.len();
    let scale = chart.scale_max();
    for (axis, label) in chart.labels.iter().enumerate() {
        let (x, y) = radar::vertex(axis, axes, scale * 1.12, scale);
        ctx.print(
            x,
            y,
            Span::styled(label.clone(), Style::default().fg(Color::Black)),
        );
    }
}

fn render_legend(frame: &mut Frame, area: Rect, chart: &RadarChart) {
    let lines: Vec<Line> = chart
        .datasets
        .iter()
        .enumerate()
        .map(|(idx, ds)| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(swatch(ds.border))),
                Span::raw(ds.display_name(idx)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn swatch(color: Rgba) -> Color {
    // Dark swatches would vanish on a black terminal; pure black input reads as white.
    if color.r == 0 && color.g == 0 && color.b == 0 {
        return Color::White;
    }
    color.over((0, 0, 0))
}

fn render_report(frame: &mut Frame, area: Rect, state: &AppState) {
    let (title, lines): (&str, Vec<Line>) = match &state.report.body {
        ReportBody::Empty => ("AI Report", Vec::new()),
        ReportBody::NoReport => (
            "AI Report",
            vec![Line::styled(
                crate::report::NO_REPORT_NOTICE,
                Style::default().fg(Color::DarkGray),
            )],
        ),
        ReportBody::Raw(raw) => (
            RAW_REPORT_TITLE,
            raw.lines().map(|line| Line::raw(line.to_string())).collect(),
        ),
        ReportBody::Formatted(body) => ("AI Report", body.iter().map(report_line).collect()),
    };
    let report = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(focus_style(state, Focus::Report)),
        )
        .wrap(Wrap { trim: false })
        .scroll((state.report_scroll, 0));
    frame.render_widget(report, area);
}

fn report_line(line: &ReportLine) -> Line<'static> {
    let spans: Vec<Span> = line
        .iter()
        .map(|span| {
            let mut style = Style::default();
            if span.bold || span.heading {
                style = style.add_modifier(Modifier::BOLD);
            }
            if span.italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            if span.heading {
                style = style.fg(Color::Yellow);
            }
            if span.code {
                style = style.fg(Color::Green);
            }
            Span::styled(span.text.clone(), style)
        })
        .collect();
    Line::from(spans)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(CONSOLE_LINES);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let console = Paragraph::new(console_text(state))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, area);
}

fn footer_text(state: &AppState) -> String {
    match state.focus {
        Focus::Search => {
            "Type to search | ↑/↓ Pick | Enter Select | Tab Next pane | ? Help | Ctrl-C Quit"
                .to_string()
        }
        Focus::Filters => {
            "←/→ Field | 0-9 Edit | ↑/↓ Cycle option | Enter Get similar | Tab Next pane | ? Help"
                .to_string()
        }
        Focus::Table => {
            "↑/↓ Move | Space Toggle | Enter Compare row | c Compare | r Remove | g Similar | ? Help | q Quit"
                .to_string()
        }
        Focus::Compare | Focus::Report => {
            "↑/↓ Scroll | a All features | i Report | c Compare | r Remove | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_tooltip(frame: &mut Frame, screen: Rect, state: &AppState) {
    let (Some(content), Some(area)) = (state.tooltip.content(), state.tooltip.panel_rect(screen))
    else {
        return;
    };
    frame.render_widget(Clear, area);
    let lines: Vec<Line> = match content {
        TooltipContent::Field { key, description } => vec![
            Line::styled(key.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Line::raw(description.clone()),
        ],
        TooltipContent::Chart {
            title,
            description,
            rows,
        } => {
            let mut lines = vec![Line::styled(
                title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if !description.trim().is_empty() {
                lines.push(Line::raw(description.clone()));
                lines.push(Line::raw(""));
            }
            lines.push(Line::raw("─".repeat(area.width.saturating_sub(2) as usize)));
            lines.extend(rows.iter().map(|row| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(swatch(row.color))),
                    Span::raw(format!("{}: {}", row.name, row.value)),
                ])
            }));
            lines
        }
    };
    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().bg(Color::Rgb(20, 20, 28)));
    frame.render_widget(panel, area);
}

fn render_alert(frame: &mut Frame, screen: Rect, msg: &str) {
    let area = layout::centered_rect(50, 20, screen);
    frame.render_widget(Clear, area);
    let text = format!("{msg}\n\nPress Enter to dismiss");
    let alert = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title("Alert")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(alert, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = layout::centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Scout Terminal - Help",
        "",
        "Global:",
        "  Tab / Shift-Tab  Next / previous pane",
        "  /                Focus search",
        "  ?                Toggle help",
        "  q / Ctrl-C       Quit",
        "",
        "Actions (outside the search box, or click the buttons):",
        "  g                Get similar",
        "  c                Compare selected",
        "  r                Remove selection",
        "  a                Show / hide all features",
        "  i                Show / hide AI report",
        "",
        "Similar table:",
        "  ↑/↓ or j/k       Move",
        "  Space / click    Toggle row and highlight it on the radar",
        "  Enter / dbl-click  Compare input player with this row",
        "",
        "Mouse: hover stat rows or radar points for descriptions",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thicker_borders_draw_more_strokes() {
        assert_eq!(stroke_offsets(1.2), vec![1.0]);
        assert_eq!(stroke_offsets(3.0).len(), 3);
        assert_eq!(stroke_offsets(7.2).len(), MAX_STROKES);
        let offsets = stroke_offsets(3.0);
        assert!((offsets[1] - 1.0).abs() < 1e-9);
    }
}
