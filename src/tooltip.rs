use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::radar::Rgba;

/// Grace period before the chart tooltip hides once the pointer has left both hover regions.
pub const HIDE_DELAY: Duration = Duration::from_millis(180);

const FIELD_OFFSET: (u16, u16) = (1, 1);
const CHART_OFFSET: (u16, u16) = (2, 1);
const MAX_PANEL_WIDTH: u16 = 44;

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub name: String,
    pub value: String,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    Field {
        key: String,
        description: String,
    },
    Chart {
        title: String,
        description: String,
        rows: Vec<TooltipRow>,
    },
}

impl TooltipContent {
    pub fn line_count(&self) -> usize {
        match self {
            TooltipContent::Field { .. } => 2,
            TooltipContent::Chart {
                description, rows, ..
            } => {
                // title, optional description + spacer, separator, rows
                let desc = if description.trim().is_empty() { 0 } else { 2 };
                1 + desc + 1 + rows.len()
            }
        }
    }

    pub fn text_width(&self) -> usize {
        match self {
            TooltipContent::Field { key, description } => {
                key.chars().count().max(description.chars().count())
            }
            TooltipContent::Chart {
                title,
                description,
                rows,
            } => {
                let rows_width = rows
                    .iter()
                    .map(|row| row.name.chars().count() + row.value.chars().count() + 4)
                    .max()
                    .unwrap_or(0);
                title
                    .chars()
                    .count()
                    .max(description.chars().count())
                    .max(rows_width)
            }
        }
    }
}

/// The one floating tooltip panel shared by stat fields and the radar chart.
///
/// Field hovers show and hide immediately. Chart hovers are sticky: the panel stays up while the
/// pointer is over the chart canvas or over the panel itself, and hides only after
/// [`HIDE_DELAY`] with the pointer outside both.
#[derive(Debug, Clone, Default)]
pub struct StickyTooltip {
    content: Option<TooltipContent>,
    anchor: (u16, u16),
    visible: bool,
    pointer_in_canvas: bool,
    pointer_in_tooltip: bool,
    hide_deadline: Option<Instant>,
}

impl StickyTooltip {
    pub fn is_visible(&self) -> bool {
        self.visible && self.content.is_some()
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    pub fn anchor(&self) -> (u16, u16) {
        self.anchor
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_deadline
    }

    pub fn pointer_in_canvas(&self) -> bool {
        self.pointer_in_canvas
    }

    pub fn pointer_in_tooltip(&self) -> bool {
        self.pointer_in_tooltip
    }

    pub fn is_chart(&self) -> bool {
        matches!(self.content, Some(TooltipContent::Chart { .. }))
    }

    pub fn show_field(&mut self, key: &str, description: &str, pointer: (u16, u16)) {
        self.content = Some(TooltipContent::Field {
            key: key.to_string(),
            description: description.to_string(),
        });
        self.anchor = offset(pointer, FIELD_OFFSET);
        self.visible = true;
        self.hide_deadline = None;
    }

    pub fn move_field(&mut self, pointer: (u16, u16)) {
        if matches!(self.content, Some(TooltipContent::Field { .. })) {
            self.anchor = offset(pointer, FIELD_OFFSET);
        }
    }

    pub fn hide_field(&mut self) {
        if matches!(self.content, Some(TooltipContent::Field { .. })) {
            self.visible = false;
        }
    }

    /// The chart reports an active data point under the pointer.
    pub fn show_chart(&mut self, content: TooltipContent, caret: (u16, u16)) {
        self.hide_deadline = None;
        self.content = Some(content);
        self.anchor = offset(caret, CHART_OFFSET);
        self.visible = true;
    }

    /// The chart reports no active data point.
    pub fn chart_inactive(&mut self, now: Instant) {
        if !self.is_chart() || !self.visible {
            return;
        }
        if self.pointer_in_canvas || self.pointer_in_tooltip {
            return;
        }
        self.arm(now);
    }

    pub fn pointer_enter_canvas(&mut self) {
        self.pointer_in_canvas = true;
        self.hide_deadline = None;
    }

    pub fn pointer_leave_canvas(&mut self, now: Instant) {
        self.pointer_in_canvas = false;
        self.arm(now);
    }

    pub fn pointer_enter_tooltip(&mut self) {
        self.pointer_in_tooltip = true;
        self.hide_deadline = None;
    }

    pub fn pointer_leave_tooltip(&mut self, now: Instant) {
        self.pointer_in_tooltip = false;
        self.arm(now);
    }

    /// Fires the hide countdown once it has elapsed.
    pub fn tick(&mut self, now: Instant) {
        let Some(deadline) = self.hide_deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        self.hide_deadline = None;
        if !self.pointer_in_canvas && !self.pointer_in_tooltip && self.is_chart() {
            self.visible = false;
        }
    }

    /// Drops chart content, used when the chart it described is rebuilt.
    pub fn reset_chart(&mut self) {
        if self.is_chart() {
            self.content = None;
            self.visible = false;
        }
        self.hide_deadline = None;
    }

    /// Screen rectangle of the panel, clamped so it fits inside `screen`.
    pub fn panel_rect(&self, screen: Rect) -> Option<Rect> {
        if !self.is_visible() {
            return None;
        }
        let content = self.content.as_ref()?;
        let width = (content.text_width() as u16)
            .saturating_add(2)
            .clamp(12, MAX_PANEL_WIDTH)
            .min(screen.width);
        let height = (content.line_count() as u16)
            .saturating_add(2)
            .min(screen.height);
        let max_x = screen.x + screen.width.saturating_sub(width);
        let max_y = screen.y + screen.height.saturating_sub(height);
        Some(Rect {
            x: self.anchor.0.clamp(screen.x, max_x),
            y: self.anchor.1.clamp(screen.y, max_y),
            width,
            height,
        })
    }

    fn arm(&mut self, now: Instant) {
        self.hide_deadline = Some(now + HIDE_DELAY);
    }
}

fn offset(point: (u16, u16), by: (u16, u16)) -> (u16, u16) {
    (point.0.saturating_add(by.0), point.1.saturating_add(by.1))
}
