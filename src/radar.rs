use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::pulsate::{
    self, BASE_BORDER_WIDTH, BASE_POINT_RADIUS, DIM_BORDER_ALPHA, DIM_FILL_ALPHA, FrameScheduler,
    PulsateState,
};
use crate::state::{PlayerId, RadarVector};
use crate::tooltip::{TooltipContent, TooltipRow};

pub const INPUT_DATASET: usize = 0;
pub const INPUT_BORDER_WIDTH: f64 = 3.0;
pub const INPUT_POINT_RADIUS: f64 = 4.0;
pub const ENTRY_ANIMATION: Duration = Duration::from_millis(700);
pub const CHART_BACKGROUND: (u8, u8, u8) = (255, 255, 255);
pub const GRID_COLOR: Rgba = Rgba::new(220, 220, 220, 0.9);

const PALETTE_RGB: [(u8, u8, u8); 10] = [
    (109, 172, 229),
    (0, 99, 255),
    (255, 99, 132),
    (60, 179, 113),
    (255, 159, 64),
    (153, 102, 255),
    (75, 192, 192),
    (255, 205, 86),
    (201, 203, 207),
    (54, 162, 235),
];
const PALETTE_FILL_ALPHA: f64 = 0.45;

// Pointer must land within this many cells of a vertex to activate it.
const HIT_RADIUS_CELLS: f64 = 1.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Composites the colour over an opaque background, for terminals without alpha.
    pub fn over(self, bg: (u8, u8, u8)) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (f64::from(fg) * a + f64::from(bg) * (1.0 - a)).round() as u8
        };
        Color::Rgb(mix(self.r, bg.0), mix(self.g, bg.1), mix(self.b, bg.2))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        let inner = lower
            .strip_prefix("rgba")
            .or_else(|| lower.strip_prefix("rgb"))
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.trim_end().strip_suffix(')'))
            .ok_or_else(|| anyhow!("not an rgb/rgba colour: {trimmed}"))?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(anyhow!("expected 3 or 4 channels in {trimmed}"));
        }
        let channel = |idx: usize| -> Result<u8> {
            parts[idx]
                .parse::<u8>()
                .with_context(|| format!("bad channel {idx} in {trimmed}"))
        };
        let alpha = match parts.get(3) {
            Some(raw_alpha) => raw_alpha
                .parse::<f64>()
                .with_context(|| format!("bad alpha in {trimmed}"))?,
            None => 1.0,
        };
        Ok(Rgba::new(channel(0)?, channel(1)?, channel(2)?, alpha))
    }
}

/// Rewrites the alpha channel of an `rgb(..)`/`rgba(..)` string. Anything else comes back as-is.
pub fn set_alpha(color: &str, alpha: f64) -> String {
    match color.parse::<Rgba>() {
        Ok(rgba) => rgba.with_alpha(alpha).to_string(),
        Err(_) => color.to_string(),
    }
}

/// Fill and border colours for the comparison dataset at `position` (0-based, input excluded).
pub fn palette_colors(position: usize) -> (Rgba, Rgba) {
    let (r, g, b) = PALETTE_RGB[position % PALETTE_RGB.len()];
    (
        Rgba::new(r, g, b, PALETTE_FILL_ALPHA),
        Rgba::new(r, g, b, 1.0),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<Option<f64>>,
    pub player_id: Option<PlayerId>,
    pub background: Rgba,
    pub border: Rgba,
    pub border_width: f64,
    pub point_radius: f64,
    pub orig_background: Rgba,
    pub orig_border: Rgba,
    pub orig_border_width: f64,
    pub orig_point_radius: f64,
}

impl Dataset {
    fn new(
        label: String,
        values: Vec<Option<f64>>,
        player_id: Option<PlayerId>,
        colors: (Rgba, Rgba),
        border_width: f64,
        point_radius: f64,
    ) -> Self {
        let (background, border) = colors;
        Self {
            label,
            values,
            player_id,
            background,
            border,
            border_width,
            point_radius,
            orig_background: background,
            orig_border: border,
            orig_border_width: border_width,
            orig_point_radius: point_radius,
        }
    }

    fn restore(&mut self) {
        self.background = self.orig_background;
        self.border = self.orig_border;
        self.border_width = self.orig_border_width;
        self.point_radius = self.orig_point_radius;
    }

    fn dim(&mut self) {
        self.background = self.orig_background.with_alpha(DIM_FILL_ALPHA);
        self.border = self.orig_border.with_alpha(DIM_BORDER_ALPHA);
    }

    pub fn display_name(&self, idx: usize) -> String {
        if self.label.trim().is_empty() {
            format!("Series {}", idx + 1)
        } else {
            self.label.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Regular redraw.
    Default,
    /// Redraw without touching the entry animation (per-frame pulsate updates).
    None,
}

#[derive(Debug, Clone)]
pub struct RadarChart {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub built_at: Instant,
    pub last_update: UpdateMode,
    pub revision: u64,
}

impl RadarChart {
    pub fn update(&mut self, mode: UpdateMode) {
        self.last_update = mode;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Eased 0..~1.1..1 growth factor applied to values right after a build.
    pub fn entry_progress(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.built_at);
        if elapsed >= ENTRY_ANIMATION {
            return 1.0;
        }
        ease_out_back(elapsed.as_secs_f64() / ENTRY_ANIMATION.as_secs_f64())
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.built_at) < ENTRY_ANIMATION
    }

    /// Upper bound of the radial scale.
    pub fn scale_max(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|ds| ds.values.iter().flatten())
            .copied()
            .filter(|v| v.is_finite())
            .fold(1.0_f64, f64::max)
    }

    pub fn value_at(&self, dataset: usize, axis: usize) -> Option<f64> {
        self.datasets
            .get(dataset)
            .and_then(|ds| ds.values.get(axis))
            .copied()
            .flatten()
    }
}

fn ease_out_back(x: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    let t = x - 1.0;
    1.0 + C3 * t.powi(3) + C1 * t.powi(2)
}

/// One non-input player to draw against the input trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSeries {
    pub id: Option<PlayerId>,
    pub name: String,
    pub radar: RadarVector,
}

/// Owns the radar chart plus everything keyed to the current build: the player-to-dataset
/// index map and the pulsate animation.
#[derive(Debug, Clone, Default)]
pub struct ChartController {
    chart: Option<RadarChart>,
    dataset_map: HashMap<PlayerId, usize>,
    pulsate: PulsateState,
    frames: FrameScheduler,
}

impl ChartController {
    pub fn chart(&self) -> Option<&RadarChart> {
        self.chart.as_ref()
    }

    pub fn is_rendered(&self) -> bool {
        self.chart.is_some()
    }

    pub fn dataset_map(&self) -> &HashMap<PlayerId, usize> {
        &self.dataset_map
    }

    pub fn dataset_index(&self, id: &str) -> Option<usize> {
        self.dataset_map.get(id).copied()
    }

    pub fn pulsate(&self) -> &PulsateState {
        &self.pulsate
    }

    pub fn frames(&self) -> &FrameScheduler {
        &self.frames
    }

    /// Replaces the chart. Dataset 0 is always the input trace.
    pub fn build(
        &mut self,
        input: &RadarVector,
        input_name: &str,
        series: &[ComparisonSeries],
        now: Instant,
    ) {
        self.stop_pulsate();
        self.chart = None;
        self.dataset_map.clear();

        let mut datasets = Vec::with_capacity(series.len() + 1);
        datasets.push(Dataset::new(
            input_name.to_string(),
            input.values.clone(),
            None,
            (Rgba::new(0, 0, 0, 0.0), Rgba::new(0, 0, 0, 1.0)),
            INPUT_BORDER_WIDTH,
            INPUT_POINT_RADIUS,
        ));

        for (pos, entry) in series.iter().enumerate() {
            datasets.push(Dataset::new(
                entry.name.clone(),
                entry.radar.values.clone(),
                entry.id.clone(),
                palette_colors(pos),
                BASE_BORDER_WIDTH,
                BASE_POINT_RADIUS,
            ));
            if let Some(id) = &entry.id {
                self.dataset_map.insert(id.clone(), datasets.len() - 1);
            }
        }

        self.chart = Some(RadarChart {
            labels: input.labels.clone(),
            datasets,
            built_at: now,
            last_update: UpdateMode::Default,
            revision: 0,
        });
    }

    pub fn toggle_pulsate(&mut self, id: &str, now: Instant) {
        if self.pulsate.is_active_for(id) {
            self.stop_pulsate();
            return;
        }
        self.start_pulsate(id, now);
    }

    pub fn start_pulsate(&mut self, id: &str, now: Instant) {
        self.stop_pulsate();

        let Some(target) = self.dataset_index(id) else {
            return;
        };
        let Some(chart) = self.chart.as_mut() else {
            return;
        };

        for (idx, ds) in chart.datasets.iter_mut().enumerate() {
            if idx == INPUT_DATASET {
                ds.background = ds.orig_background;
                ds.border = ds.orig_border;
            } else if idx == target {
                ds.background = ds.orig_background;
                ds.border = ds.orig_border;
                ds.border_width = BASE_BORDER_WIDTH;
            } else {
                ds.dim();
            }
        }
        chart.update(UpdateMode::Default);

        self.pulsate.active_id = Some(id.to_string());
        self.pulsate.started_at = Some(now);
        self.pulsate.frame = Some(self.frames.request());
    }

    pub fn stop_pulsate(&mut self) {
        if let Some(handle) = self.pulsate.frame.take() {
            self.frames.cancel(handle);
        }

        if let Some(chart) = self.chart.as_mut() {
            for ds in chart.datasets.iter_mut() {
                ds.restore();
            }
            if let Some(input) = chart.datasets.get_mut(INPUT_DATASET) {
                input.border_width = INPUT_BORDER_WIDTH;
            }
            chart.update(UpdateMode::Default);
        }

        self.pulsate = PulsateState::default();
    }

    /// Runs the animation frame handed out by the scheduler, if there is one.
    pub fn poll_frame(&mut self, now: Instant) -> bool {
        if self.frames.take_due().is_none() {
            return false;
        }
        self.run_frame(now);
        true
    }

    /// One pulsate step. Reschedules only while a highlight is still active.
    pub fn run_frame(&mut self, now: Instant) {
        self.pulsate.frame = None;
        let Some(active) = self.pulsate.active_id.clone() else {
            return;
        };
        let started = self.pulsate.started_at.unwrap_or(now);
        let (width, radius) = pulsate::pulse_at(now.saturating_duration_since(started));

        if let (Some(idx), Some(chart)) = (self.dataset_map.get(&active).copied(), self.chart.as_mut())
            && let Some(ds) = chart.datasets.get_mut(idx)
        {
            ds.border_width = width;
            ds.point_radius = radius;
            chart.update(UpdateMode::None);
        }

        self.pulsate.frame = Some(self.frames.request());
    }

    /// True while the loop should tick at frame rate.
    pub fn wants_frames(&self, now: Instant) -> bool {
        self.frames.is_pending() || self.chart.as_ref().is_some_and(|c| c.is_animating(now))
    }

    /// Tooltip body for one axis: every dataset's value there, coloured by original border.
    pub fn tooltip_content(
        &self,
        axis: usize,
        descriptions: &HashMap<String, String>,
    ) -> Option<TooltipContent> {
        let chart = self.chart.as_ref()?;
        let title = chart.labels.get(axis)?.clone();
        let description = descriptions.get(&title).cloned().unwrap_or_default();
        let rows = chart
            .datasets
            .iter()
            .enumerate()
            .map(|(idx, ds)| TooltipRow {
                name: ds.display_name(idx),
                value: format_value(ds.values.get(axis).copied().flatten()),
                color: ds.orig_border,
            })
            .collect();
        Some(TooltipContent::Chart {
            title,
            description,
            rows,
        })
    }
}

pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Canvas bounds for a chart drawn into `area`, keeping the radar round on ~1:2 terminal cells.
pub fn chart_bounds(area: Rect) -> ([f64; 2], [f64; 2]) {
    const HALF_SPAN: f64 = 1.35;
    let cols = f64::from(area.width.max(1));
    let rows = f64::from(area.height.max(1)) * 2.0;
    let half_x = HALF_SPAN * (cols / rows).max(1.0);
    let half_y = HALF_SPAN * (rows / cols).max(1.0);
    ([-half_x, half_x], [-half_y, half_y])
}

/// Canvas position of `value` on axis `axis` of `axes`, first axis pointing up, clockwise.
pub fn vertex(axis: usize, axes: usize, value: f64, scale_max: f64) -> (f64, f64) {
    if axes == 0 {
        return (0.0, 0.0);
    }
    let angle = std::f64::consts::FRAC_PI_2
        - std::f64::consts::TAU * axis as f64 / axes as f64;
    let r = if scale_max > 0.0 {
        (value / scale_max).max(0.0)
    } else {
        0.0
    };
    (r * angle.cos(), r * angle.sin())
}

/// Maps a canvas coordinate back to a terminal cell inside `area`.
pub fn to_cell(area: Rect, point: (f64, f64)) -> (u16, u16) {
    let (xb, yb) = chart_bounds(area);
    let fx = (point.0 - xb[0]) / (xb[1] - xb[0]);
    let fy = (yb[1] - point.1) / (yb[1] - yb[0]);
    let col = f64::from(area.x) + (fx * f64::from(area.width)).floor();
    let row = f64::from(area.y) + (fy * f64::from(area.height)).floor();
    let max_col = f64::from(area.x + area.width.saturating_sub(1));
    let max_row = f64::from(area.y + area.height.saturating_sub(1));
    (
        col.clamp(f64::from(area.x), max_col) as u16,
        row.clamp(f64::from(area.y), max_row) as u16,
    )
}

/// Nearest data point to the pointer cell: `(axis, caret cell)`.
pub fn hit_test(chart: &RadarChart, area: Rect, col: u16, row: u16) -> Option<(usize, (u16, u16))> {
    if area.width == 0 || area.height == 0 || !contains(area, col, row) {
        return None;
    }
    let axes = chart.labels.len();
    let scale = chart.scale_max();
    let mut best: Option<(f64, usize, (u16, u16))> = None;

    for ds in &chart.datasets {
        for (axis, value) in ds.values.iter().enumerate().take(axes) {
            let Some(value) = value else {
                continue;
            };
            let cell = to_cell(area, vertex(axis, axes, *value, scale));
            let dx = f64::from(cell.0) - f64::from(col);
            // rows are roughly twice as tall as columns are wide
            let dy = (f64::from(cell.1) - f64::from(row)) * 2.0;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist <= HIT_RADIUS_CELLS * 2.0 && best.is_none_or(|(d, _, _)| dist < d) {
                best = Some((dist, axis, cell));
            }
        }
    }
    best.map(|(_, axis, cell)| (axis, cell))
}

pub fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_without_alpha() {
        let rgba: Rgba = "rgb(1, 2, 3)".parse().expect("rgb parses");
        assert_eq!(rgba, Rgba::new(1, 2, 3, 1.0));
    }

    #[test]
    fn set_alpha_leaves_named_colours_alone() {
        assert_eq!(set_alpha("black", 0.28), "black");
    }

    #[test]
    fn set_alpha_accepts_compact_form() {
        assert_eq!(
            set_alpha("rgba(109,172,229,0.45)", 0.12),
            "rgba(109, 172, 229, 0.12)"
        );
    }

    #[test]
    fn composite_over_white() {
        assert_eq!(Rgba::new(0, 0, 0, 1.0).over(CHART_BACKGROUND), Color::Rgb(0, 0, 0));
        assert_eq!(
            Rgba::new(0, 0, 0, 0.0).over(CHART_BACKGROUND),
            Color::Rgb(255, 255, 255)
        );
    }

    #[test]
    fn first_axis_points_up() {
        let (x, y) = vertex(0, 4, 1.0, 1.0);
        assert!(x.abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ease_out_back_hits_endpoints() {
        assert!(ease_out_back(0.0).abs() < 1e-9);
        assert!((ease_out_back(1.0) - 1.0).abs() < 1e-9);
    }
}
