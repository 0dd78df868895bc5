use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

use scout_terminal::config::ClientConfig;
use scout_terminal::layout::{self, Action, ScreenLayout};
use scout_terminal::provider;
use scout_terminal::radar;
use scout_terminal::state::{AppState, Delta, Focus, ProviderCommand, apply_delta};
use scout_terminal::ui;

const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const IDLE_TICK: Duration = Duration::from_millis(250);

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    last_click: Option<(usize, Instant)>,
    screen: Rect,
}

impl App {
    fn new(config: ClientConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
            last_click: None,
            screen: Rect::default(),
        }
    }

    fn send(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Request worker is gone");
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_alert();
            }
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.state.help_overlay = false;
            }
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.state.focus = self.state.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.state.focus = self.state.focus.prev();
                return;
            }
            _ => {}
        }

        match self.state.focus {
            Focus::Search => self.on_search_key(key, now),
            Focus::Filters => self.on_filter_key(key),
            Focus::Table | Focus::Compare | Focus::Report => self.on_pane_key(key, now),
        }
    }

    fn on_search_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char(ch) => self.state.search_type_char(ch, now),
            KeyCode::Backspace => self.state.search_backspace(now),
            KeyCode::Down => self.state.select_next_suggestion(),
            KeyCode::Up => self.state.select_prev_suggestion(),
            KeyCode::Enter => {
                let cmd = if self.state.suggestions.is_empty() {
                    self.state.request_similar()
                } else {
                    let idx = self.state.suggestion_selected;
                    self.state.choose_suggestion(idx)
                };
                self.send(cmd);
            }
            KeyCode::Esc => {
                self.state.suggestions.clear();
                self.state.focus = Focus::Table;
            }
            _ => {}
        }
    }

    fn on_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.state.filter_field = self.state.filter_field.prev(),
            KeyCode::Right => self.state.filter_field = self.state.filter_field.next(),
            KeyCode::Up => self.state.cycle_filter_option(false),
            KeyCode::Down => self.state.cycle_filter_option(true),
            KeyCode::Char(ch) => self.state.filter_type_char(ch),
            KeyCode::Backspace => self.state.filter_backspace(),
            KeyCode::Enter => {
                let cmd = self.state.request_similar();
                self.send(cmd);
            }
            KeyCode::Esc => self.state.focus = Focus::Table,
            _ => {}
        }
    }

    fn on_pane_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('/') => self.state.focus = Focus::Search,
            KeyCode::Char('g') => self.run_action(Action::GetSimilar, now),
            KeyCode::Char('c') => self.run_action(Action::CompareSelected, now),
            KeyCode::Char('r') => self.run_action(Action::RemoveSelection, now),
            KeyCode::Char('a') => self.run_action(Action::ToggleAllFeatures, now),
            KeyCode::Char('i') => self.run_action(Action::ToggleReport, now),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_focused(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_focused(-1),
            KeyCode::Char(' ') if self.state.focus == Focus::Table => {
                let idx = self.state.similar_cursor;
                self.state.row_click(idx, now);
            }
            KeyCode::Enter if self.state.focus == Focus::Table => {
                let idx = self.state.similar_cursor;
                let cmd = self.state.row_double_click(idx);
                self.send(cmd);
            }
            _ => {}
        }
    }

    fn run_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::GetSimilar => {
                let cmd = self.state.request_similar();
                self.send(cmd);
            }
            Action::CompareSelected => {
                let cmd = self.state.compare_selected();
                self.send(cmd);
            }
            Action::RemoveSelection => self.state.remove_selection(now),
            Action::ToggleAllFeatures => self.state.toggle_all_features(),
            Action::ToggleReport => self.state.toggle_report(),
        }
    }

    fn scroll_focused(&mut self, delta: i32) {
        let layout = ScreenLayout::compute(self.screen, &self.state);
        match self.state.focus {
            Focus::Table => self.move_row(&layout, delta),
            Focus::Compare => self.state.scroll_compare(delta, layout.compare_visible_rows()),
            Focus::Report => self.scroll_report(&layout, delta),
            Focus::Search | Focus::Filters => {}
        }
    }

    fn move_row(&mut self, layout: &ScreenLayout, delta: i32) {
        let visible = layout.table_visible_rows();
        if delta > 0 {
            self.state.select_next_row(visible);
        } else {
            self.state.select_prev_row(visible);
        }
    }

    fn scroll_report(&mut self, layout: &ScreenLayout, delta: i32) {
        if let Some((height, width)) = layout.report_viewport() {
            self.state.scroll_report(delta, height, width);
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, screen: Rect, now: Instant) {
        if self.state.alert.is_some() || self.state.help_overlay {
            return;
        }
        let layout = ScreenLayout::compute(screen, &self.state);
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.on_pointer_move(&layout, screen, col, row, now)
            }
            MouseEventKind::Down(MouseButton::Left) => self.on_click(&layout, col, row, now),
            MouseEventKind::ScrollDown => self.on_scroll(&layout, col, row, 1),
            MouseEventKind::ScrollUp => self.on_scroll(&layout, col, row, -1),
            _ => {}
        }
    }

    fn on_click(&mut self, layout: &ScreenLayout, col: u16, row: u16, now: Instant) {
        if let Some(area) = layout.suggestions
            && radar::contains(area, col, row)
        {
            if let Some(idx) = layout::suggestion_at(area, self.state.suggestions.len(), col, row)
            {
                let cmd = self.state.choose_suggestion(idx);
                self.send(cmd);
            }
            return;
        }
        if radar::contains(layout.search, col, row) {
            self.state.focus = Focus::Search;
            return;
        }
        if radar::contains(layout.filters, col, row) {
            self.state.focus = Focus::Filters;
            return;
        }
        if let Some(action) = layout::action_at(layout.actions, &self.state, col, row) {
            self.run_action(action, now);
            return;
        }
        if radar::contains(layout.table, col, row) {
            self.state.focus = Focus::Table;
            // Checkbox and row body both toggle the row.
            if let Some(idx) = layout::similar_row_at(layout, &self.state, col, row) {
                self.state.row_click(idx, now);
                let double = self
                    .last_click
                    .is_some_and(|(prev, at)| prev == idx && now.duration_since(at) <= DOUBLE_CLICK);
                if double {
                    self.last_click = None;
                    let cmd = self.state.row_double_click(idx);
                    self.send(cmd);
                } else {
                    self.last_click = Some((idx, now));
                }
            }
            return;
        }
        if radar::contains(layout.compare, col, row) {
            self.state.focus = Focus::Compare;
        } else if layout.report.is_some_and(|area| radar::contains(area, col, row)) {
            self.state.focus = Focus::Report;
        }
    }

    fn on_scroll(&mut self, layout: &ScreenLayout, col: u16, row: u16, delta: i32) {
        if radar::contains(layout.table, col, row) {
            self.move_row(layout, delta);
        } else if radar::contains(layout.compare, col, row) {
            self.state.scroll_compare(delta, layout.compare_visible_rows());
        } else if layout.report.is_some_and(|area| radar::contains(area, col, row)) {
            self.scroll_report(layout, delta);
        }
    }

    fn on_pointer_move(
        &mut self,
        layout: &ScreenLayout,
        screen: Rect,
        col: u16,
        row: u16,
        now: Instant,
    ) {
        let tooltip_rect = if self.state.tooltip.is_chart() {
            self.state.tooltip.panel_rect(screen)
        } else {
            None
        };
        let in_tooltip = tooltip_rect.is_some_and(|area| radar::contains(area, col, row));
        let in_canvas =
            self.state.chart.is_rendered() && radar::contains(layout.chart_canvas, col, row);

        let tooltip = &mut self.state.tooltip;
        if in_canvas != tooltip.pointer_in_canvas() {
            if in_canvas {
                tooltip.pointer_enter_canvas();
            } else {
                tooltip.pointer_leave_canvas(now);
            }
        }
        if in_tooltip != tooltip.pointer_in_tooltip() {
            if in_tooltip {
                tooltip.pointer_enter_tooltip();
            } else {
                tooltip.pointer_leave_tooltip(now);
            }
        }

        if in_canvas {
            let hit = self
                .state
                .chart
                .chart()
                .and_then(|chart| radar::hit_test(chart, layout.chart_canvas, col, row));
            self.state.hover_chart(hit, now);
        } else if !in_tooltip {
            let key = layout::field_key_at(layout, &self.state, col, row);
            self.state.hover_field(key.as_deref(), (col, row));
        }
    }

    /// How long the loop may block on input before a timer needs service.
    fn poll_timeout(&self, now: Instant) -> Duration {
        if self.state.chart.wants_frames(now) {
            return FRAME_INTERVAL;
        }
        [
            self.state.search_debounce.deadline(),
            self.state.tooltip.hide_deadline(),
        ]
        .into_iter()
        .flatten()
        .map(|deadline| deadline.saturating_duration_since(now))
        .fold(IDLE_TICK, Duration::min)
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = ClientConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(config, Some(cmd_tx));
    let base = app.state.config.api_base.clone();
    app.state.push_log(format!("[INFO] Backend {base}"));
    for cmd in app.state.startup_commands() {
        app.send(Some(cmd));
    }

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    loop {
        app.screen = terminal.size()?;
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        let now = Instant::now();
        let cmd = app.state.tick(now);
        app.send(cmd);

        terminal.draw(|f| ui::ui(f, &app.state, now))?;

        let timeout = app.poll_timeout(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.on_key(key, Instant::now());
                }
                Event::Mouse(mouse) => {
                    let screen = terminal.size()?;
                    app.screen = screen;
                    app.on_mouse(mouse, screen, Instant::now());
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
