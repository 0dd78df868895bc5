use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::panels::{self, PanelLine};
use crate::radar;
use crate::state::AppState;

const LEFT_COLUMN_WIDTH: u16 = 34;
const INPUT_PANEL_HEIGHT: u16 = 10;
const CONSOLE_HEIGHT: u16 = 5;
const SUGGESTIONS_MAX_WIDTH: u16 = 48;
const LEGEND_MAX_WIDTH: u16 = 24;
// Leading `[x] ` cells of a table row.
const CHECKBOX_WIDTH: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetSimilar,
    CompareSelected,
    RemoveSelection,
    ToggleAllFeatures,
    ToggleReport,
}

/// Where every pane sits for one frame. Drawing and mouse hit-testing share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub search: Rect,
    pub suggestions: Option<Rect>,
    pub filters: Rect,
    pub actions: Rect,
    pub input_panel: Rect,
    pub compare: Rect,
    pub table: Rect,
    pub chart: Rect,
    pub chart_canvas: Rect,
    pub chart_legend: Rect,
    pub report: Option<Rect>,
    pub console: Rect,
    pub footer: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect, state: &AppState) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(CONSOLE_HEIGHT),
                Constraint::Length(1),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(LEFT_COLUMN_WIDTH),
                Constraint::Min(40),
                Constraint::Percentage(40),
            ])
            .split(rows[3]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(INPUT_PANEL_HEIGHT), Constraint::Min(3)])
            .split(columns[0]);

        let (chart, report) = if state.report.visible {
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(55), Constraint::Min(5)])
                .split(columns[2]);
            (right[0], Some(right[1]))
        } else {
            (columns[2], None)
        };

        let chart_inner = inner(chart);
        let legend_width = LEGEND_MAX_WIDTH.min(chart_inner.width / 3);
        let chart_split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(legend_width)])
            .split(chart_inner);

        let search = rows[0];
        let suggestions = suggestions_rect(area, search, state.suggestions.len());

        Self {
            search,
            suggestions,
            filters: rows[1],
            actions: rows[2],
            input_panel: left[0],
            compare: left[1],
            table: columns[1],
            chart,
            chart_canvas: chart_split[0],
            chart_legend: chart_split[1],
            report,
            console: rows[4],
            footer: rows[5],
        }
    }

    pub fn table_visible_rows(&self) -> usize {
        // header row sits inside the border
        inner(self.table).height.saturating_sub(1) as usize
    }

    pub fn compare_visible_rows(&self) -> usize {
        inner(self.compare).height as usize
    }

    /// Height and width of the report text area, when the report is shown.
    pub fn report_viewport(&self) -> Option<(usize, usize)> {
        self.report
            .map(inner)
            .map(|body| (body.height as usize, body.width as usize))
    }
}

/// Area inside a one-cell border.
pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

fn suggestions_rect(screen: Rect, search: Rect, count: usize) -> Option<Rect> {
    if count == 0 {
        return None;
    }
    let y = search.y + search.height;
    let room = (screen.y + screen.height).saturating_sub(y);
    let height = (count as u16).saturating_add(2).min(room);
    if height < 3 {
        return None;
    }
    Some(Rect {
        x: search.x,
        y,
        width: search.width.min(SUGGESTIONS_MAX_WIDTH),
        height,
    })
}

/// First and one-past-last table row on screen for a scroll `offset`.
pub fn table_window(offset: usize, total: usize, visible: usize) -> (usize, usize) {
    let start = offset.min(total.saturating_sub(visible));
    (start, (start + visible).min(total))
}

pub fn suggestion_at(area: Rect, count: usize, col: u16, row: u16) -> Option<usize> {
    let body = inner(area);
    if !radar::contains(body, col, row) {
        return None;
    }
    let idx = (row - body.y) as usize;
    (idx < count).then_some(idx)
}

/// Similar-table row under the pointer and whether the checkbox cell was hit.
pub fn table_row_at(
    area: Rect,
    start: usize,
    total: usize,
    col: u16,
    row: u16,
) -> Option<(usize, bool)> {
    let body = inner(area);
    let rows_top = body.y.saturating_add(1);
    if !radar::contains(body, col, row) || row < rows_top {
        return None;
    }
    let idx = start + (row - rows_top) as usize;
    if idx >= total {
        return None;
    }
    let on_checkbox = col < body.x + CHECKBOX_WIDTH;
    Some((idx, on_checkbox))
}

/// Similar-table row under the pointer, using the same window the table is drawn with.
pub fn similar_row_at(layout: &ScreenLayout, state: &AppState, col: u16, row: u16) -> Option<usize> {
    let total = state.similar.len();
    let (start, _) = table_window(state.table_offset, total, layout.table_visible_rows());
    table_row_at(layout.table, start, total, col, row).map(|(idx, _)| idx)
}

/// Index into a scrolled line list drawn inside a bordered pane.
pub fn line_at(area: Rect, scroll: u16, total: usize, col: u16, row: u16) -> Option<usize> {
    let body = inner(area);
    if !radar::contains(body, col, row) {
        return None;
    }
    let idx = (row - body.y) as usize + scroll as usize;
    (idx < total).then_some(idx)
}

/// Field key of the stat row under the pointer, from either the input panel or the compare boxes.
pub fn field_key_at(layout: &ScreenLayout, state: &AppState, col: u16, row: u16) -> Option<String> {
    let lines = if radar::contains(layout.input_panel, col, row) {
        let lines = panels::panel_lines(state.input_panel.as_ref());
        line_at(layout.input_panel, 0, lines.len(), col, row).map(|idx| (lines, idx))
    } else if radar::contains(layout.compare, col, row) {
        let lines = panels::flatten_boxes(&state.compare_boxes);
        line_at(layout.compare, state.compare_scroll, lines.len(), col, row)
            .map(|idx| (lines, idx))
    } else {
        None
    };
    let (lines, idx) = lines?;
    match lines.into_iter().nth(idx)? {
        PanelLine::Row(stat) => stat.key,
        _ => None,
    }
}

pub fn action_labels(state: &AppState) -> Vec<(Action, String)> {
    vec![
        (Action::GetSimilar, "Get similar".to_string()),
        (Action::CompareSelected, "Compare selected".to_string()),
        (Action::RemoveSelection, "Remove selection".to_string()),
        (
            Action::ToggleAllFeatures,
            state.all_features_label().to_string(),
        ),
        (Action::ToggleReport, state.report.toggle_label().to_string()),
    ]
}

/// Button cells along the action bar, laid out as `[ label ]` separated by one space.
pub fn action_buttons(area: Rect, state: &AppState) -> Vec<(Action, Rect)> {
    let mut x = area.x;
    let right = area.x + area.width;
    let mut out = Vec::new();
    for (action, label) in action_labels(state) {
        let width = label.chars().count() as u16 + 4;
        if x >= right {
            break;
        }
        out.push((
            action,
            Rect {
                x,
                y: area.y,
                width: width.min(right - x),
                height: 1,
            },
        ));
        x = x.saturating_add(width + 1);
    }
    out
}

pub fn action_at(area: Rect, state: &AppState, col: u16, row: u16) -> Option<Action> {
    action_buttons(area, state)
        .into_iter()
        .find(|(_, rect)| radar::contains(*rect, col, row))
        .map(|(action, _)| action)
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_window_clamps_offset() {
        assert_eq!(table_window(0, 3, 10), (0, 3));
        assert_eq!(table_window(7, 30, 10), (7, 17));
        assert_eq!(table_window(25, 30, 10), (20, 30));
        assert_eq!(table_window(4, 0, 10), (0, 0));
    }

    #[test]
    fn table_rows_skip_border_and_header() {
        let area = Rect::new(10, 5, 40, 12);
        assert_eq!(table_row_at(area, 0, 5, 20, 6), None);
        assert_eq!(table_row_at(area, 0, 5, 20, 7), Some((0, false)));
        assert_eq!(table_row_at(area, 3, 5, 12, 8), Some((4, true)));
        assert_eq!(table_row_at(area, 0, 2, 20, 9), None);
    }
}
