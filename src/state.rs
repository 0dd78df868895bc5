use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::panels::{self, StatPanel};
use crate::radar::{ChartController, ComparisonSeries};
use crate::report::ReportPanel;
use crate::search::{self, Debouncer, SearchAction};
use crate::tooltip::{StickyTooltip, TooltipContent};

/// Rank key (`Rk`) identifying a player on the backend, kept in its string form.
pub type PlayerId = String;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerRecord(Map<String, Value>);

impl PlayerRecord {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Present, not null and not an empty string.
    pub fn has_value(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    pub fn display(&self, key: &str) -> String {
        self.0.get(key).map(value_to_display).unwrap_or_default()
    }

    /// First key in `keys` that carries a value.
    pub fn first_present<'a>(&self, keys: &[&'a str]) -> Option<&'a str> {
        keys.iter().copied().find(|key| self.has_value(key))
    }

    pub fn id(&self) -> Option<PlayerId> {
        self.has_value("Rk").then(|| self.display("Rk"))
    }

    pub fn name(&self) -> String {
        self.display("Player")
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

/// Renders a JSON scalar the way the web UI printed it (`12`, not `12.0`; null as empty).
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        other => other.to_string(),
    }
}

fn de_player_id<'de, D>(deserializer: D) -> Result<PlayerId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_display(&value))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarVector {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(deserialize_with = "de_player_id")]
    pub player_id: PlayerId,
    #[serde(default)]
    pub player_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetaOptions {
    #[serde(default)]
    pub leagues: Vec<String>,
    #[serde(default)]
    pub positions: Vec<String>,
}

/// One similar player: the record as sent, its score and its radar trace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct SimilarResult {
    pub player: PlayerRecord,
    pub similarity_score: Option<f64>,
    pub radar: RadarVector,
}

impl From<Map<String, Value>> for SimilarResult {
    fn from(mut map: Map<String, Value>) -> Self {
        let radar = map
            .remove("radar")
            .and_then(|raw| serde_json::from_value::<RadarVector>(raw).ok())
            .unwrap_or_default();
        let similarity_score = map.get("similarity_score").and_then(Value::as_f64);
        Self {
            player: PlayerRecord::from_map(map),
            similarity_score,
            radar,
        }
    }
}

impl SimilarResult {
    pub fn score_label(&self) -> String {
        format!("{:.3}", self.similarity_score.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimilarResponse {
    #[serde(default)]
    pub results: Vec<SimilarResult>,
    #[serde(default)]
    pub input_radar: RadarVector,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompareRow {
    #[serde(default)]
    pub stats: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompareStats {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub rows: Vec<CompareRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub radar: Vec<RadarVector>,
    #[serde(default)]
    pub compare_stats: CompareStats,
    #[serde(default)]
    pub ai_report: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarRow {
    pub result: SimilarResult,
    pub checked: bool,
}

impl SimilarRow {
    pub fn player_id(&self) -> Option<PlayerId> {
        self.result.player.id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarQuery {
    pub player_id: PlayerId,
    pub k: u32,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub league: Option<String>,
    pub position: Option<String>,
}

impl SimilarQuery {
    /// Query string pairs; unset filters are left out.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("player_id", self.player_id.clone()), ("k", self.k.to_string())];
        if let Some(min_age) = self.min_age {
            pairs.push(("min_age", min_age.to_string()));
        }
        if let Some(max_age) = self.max_age {
            pairs.push(("max_age", max_age.to_string()));
        }
        if let Some(league) = &self.league {
            pairs.push(("leagues", league.clone()));
        }
        if let Some(position) = &self.position {
            pairs.push(("positions", position.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    K,
    MinAge,
    MaxAge,
    League,
    Position,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::K,
        FilterField::MinAge,
        FilterField::MaxAge,
        FilterField::League,
        FilterField::Position,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub k: String,
    pub min_age: String,
    pub max_age: String,
    pub league: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Filters,
    Table,
    Compare,
    Report,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Filters,
            Focus::Filters => Focus::Table,
            Focus::Table => Focus::Compare,
            Focus::Compare => Focus::Report,
            Focus::Report => Focus::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::Report,
            Focus::Filters => Focus::Search,
            Focus::Table => Focus::Filters,
            Focus::Compare => Focus::Table,
            Focus::Report => Focus::Compare,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetMeta(MetaOptions),
    SetFeatureDescriptions(HashMap<String, String>),
    SetSuggestions(Vec<SearchHit>),
    SetPlayerDetail(PlayerRecord),
    SetSimilar(SimilarResponse),
    SetCompare(CompareResponse),
    Log(String),
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    LoadMeta,
    LoadFeatureDescriptions,
    Search { query: String },
    FetchPlayer { player_id: PlayerId },
    FetchSimilar(SimilarQuery),
    Compare { player_ids: Vec<PlayerId> },
}

/// The whole view: constructed once at startup and mutated by input and by [`apply_delta`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub focus: Focus,
    pub search_input: String,
    pub search_debounce: Debouncer,
    pub suggestions: Vec<SearchHit>,
    pub suggestion_selected: usize,
    pub selected_player_id: Option<PlayerId>,
    pub selected_player_name: Option<String>,
    pub filters: Filters,
    pub filter_field: FilterField,
    pub leagues: Vec<String>,
    pub positions: Vec<String>,
    pub feature_descriptions: HashMap<String, String>,
    pub input_panel: Option<StatPanel>,
    pub compare_boxes: Vec<StatPanel>,
    pub similar: Vec<SimilarRow>,
    pub similar_cursor: usize,
    /// First table row on screen. Clicks leave it alone so the rows stay put under the pointer.
    pub table_offset: usize,
    pub last_similar_input_radar: Option<RadarVector>,
    pub chart: ChartController,
    pub tooltip: StickyTooltip,
    pub last_compare: Option<CompareResponse>,
    pub show_all_features: bool,
    pub report: ReportPanel,
    pub compare_scroll: u16,
    pub report_scroll: u16,
    pub logs: VecDeque<String>,
    pub alert: Option<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl AppState {
    pub fn new(config: ClientConfig) -> Self {
        let filters = Filters {
            k: config.default_k.to_string(),
            ..Filters::default()
        };
        Self {
            config,
            focus: Focus::Search,
            search_input: String::new(),
            search_debounce: Debouncer::new(search::SEARCH_DEBOUNCE),
            suggestions: Vec::new(),
            suggestion_selected: 0,
            selected_player_id: None,
            selected_player_name: None,
            filters,
            filter_field: FilterField::K,
            leagues: Vec::new(),
            positions: Vec::new(),
            feature_descriptions: HashMap::new(),
            input_panel: None,
            compare_boxes: Vec::new(),
            similar: Vec::new(),
            similar_cursor: 0,
            table_offset: 0,
            last_similar_input_radar: None,
            chart: ChartController::default(),
            tooltip: StickyTooltip::default(),
            last_compare: None,
            show_all_features: false,
            report: ReportPanel::default(),
            compare_scroll: 0,
            report_scroll: 0,
            logs: VecDeque::with_capacity(200),
            alert: None,
            help_overlay: false,
        }
    }

    pub fn startup_commands(&self) -> Vec<ProviderCommand> {
        vec![
            ProviderCommand::LoadMeta,
            ProviderCommand::LoadFeatureDescriptions,
        ]
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Blocking, user-visible error. Input is swallowed until it is dismissed.
    pub fn raise_alert(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.push_log(format!("[ERR] {msg}"));
        self.alert = Some(msg);
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    // ---- search -------------------------------------------------------------------------

    pub fn set_search_input(&mut self, value: impl Into<String>, now: Instant) {
        self.search_input = value.into();
        self.search_debounce.push(self.search_input.clone(), now);
    }

    pub fn search_type_char(&mut self, ch: char, now: Instant) {
        let mut value = self.search_input.clone();
        value.push(ch);
        self.set_search_input(value, now);
    }

    pub fn search_backspace(&mut self, now: Instant) {
        let mut value = self.search_input.clone();
        value.pop();
        self.set_search_input(value, now);
    }

    /// Releases the debounced query once input has been idle long enough.
    pub fn poll_search(&mut self, now: Instant) -> Option<ProviderCommand> {
        let query = self.search_debounce.poll(now)?;
        match search::classify_query(&query) {
            SearchAction::ClearSuggestions => {
                self.suggestions.clear();
                self.suggestion_selected = 0;
                None
            }
            SearchAction::Query(query) => Some(ProviderCommand::Search { query }),
        }
    }

    pub fn select_next_suggestion(&mut self) {
        if !self.suggestions.is_empty() {
            self.suggestion_selected = (self.suggestion_selected + 1) % self.suggestions.len();
        }
    }

    pub fn select_prev_suggestion(&mut self) {
        if !self.suggestions.is_empty() {
            self.suggestion_selected = self
                .suggestion_selected
                .checked_sub(1)
                .unwrap_or(self.suggestions.len() - 1);
        }
    }

    pub fn choose_suggestion(&mut self, idx: usize) -> Option<ProviderCommand> {
        let hit = self.suggestions.get(idx)?.clone();
        self.suggestions.clear();
        self.suggestion_selected = 0;
        self.selected_player_id = Some(hit.player_id.clone());
        self.selected_player_name = Some(hit.player_name.clone());
        // Programmatic fill, not typing: no new search.
        self.search_input = hit.player_name;
        self.search_debounce.cancel();
        Some(ProviderCommand::FetchPlayer {
            player_id: hit.player_id,
        })
    }

    // ---- filters ------------------------------------------------------------------------

    pub fn filter_type_char(&mut self, ch: char) {
        if !ch.is_ascii_digit() {
            return;
        }
        if let Some(text) = self.filter_text_mut() {
            if text.len() < 3 {
                text.push(ch);
            }
        }
    }

    pub fn filter_backspace(&mut self) {
        if let Some(text) = self.filter_text_mut() {
            text.pop();
        }
    }

    pub fn cycle_filter_option(&mut self, forward: bool) {
        let (options, slot) = match self.filter_field {
            FilterField::League => (&self.leagues, &mut self.filters.league),
            FilterField::Position => (&self.positions, &mut self.filters.position),
            _ => return,
        };
        *slot = cycle_option(options, slot.as_deref(), forward);
    }

    fn filter_text_mut(&mut self) -> Option<&mut String> {
        match self.filter_field {
            FilterField::K => Some(&mut self.filters.k),
            FilterField::MinAge => Some(&mut self.filters.min_age),
            FilterField::MaxAge => Some(&mut self.filters.max_age),
            FilterField::League | FilterField::Position => None,
        }
    }

    pub fn similar_query(&self) -> Option<SimilarQuery> {
        let player_id = self.selected_player_id.clone()?;
        let k = self
            .filters
            .k
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|k| *k > 0)
            .unwrap_or(self.config.default_k);
        Some(SimilarQuery {
            player_id,
            k,
            min_age: self.filters.min_age.trim().parse().ok(),
            max_age: self.filters.max_age.trim().parse().ok(),
            league: self.filters.league.clone(),
            position: self.filters.position.clone(),
        })
    }

    // ---- similar flow -------------------------------------------------------------------

    pub fn request_similar(&mut self) -> Option<ProviderCommand> {
        match self.similar_query() {
            Some(query) => Some(ProviderCommand::FetchSimilar(query)),
            None => {
                self.raise_alert("Select a player first.");
                None
            }
        }
    }

    pub fn apply_similar(&mut self, resp: SimilarResponse, now: Instant) {
        self.similar = resp
            .results
            .into_iter()
            .map(|result| SimilarRow {
                result,
                checked: false,
            })
            .collect();
        self.similar_cursor = 0;
        self.table_offset = 0;
        self.last_similar_input_radar = Some(resp.input_radar);
        self.rebuild_chart_from_similar(now);
    }

    /// Input trace against the top similar players.
    pub fn rebuild_chart_from_similar(&mut self, now: Instant) {
        let Some(input) = self.last_similar_input_radar.clone() else {
            return;
        };
        let series: Vec<ComparisonSeries> = self
            .similar
            .iter()
            .take(self.config.radar_top)
            .map(|row| ComparisonSeries {
                id: row.player_id(),
                name: row.result.player.name(),
                radar: row.result.radar.clone(),
            })
            .collect();
        let name = self.selected_player_name.clone().unwrap_or_default();
        self.tooltip.reset_chart();
        self.chart.build(&input, &name, &series, now);
    }

    /// Moves the cursor down, scrolling `visible` rows of table just enough to keep it in view.
    pub fn select_next_row(&mut self, visible: usize) {
        if !self.similar.is_empty() {
            self.similar_cursor = (self.similar_cursor + 1).min(self.similar.len() - 1);
        }
        self.follow_cursor(visible);
    }

    pub fn select_prev_row(&mut self, visible: usize) {
        self.similar_cursor = self.similar_cursor.saturating_sub(1);
        self.follow_cursor(visible);
    }

    fn follow_cursor(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.similar_cursor < self.table_offset {
            self.table_offset = self.similar_cursor;
        } else if self.similar_cursor >= self.table_offset + visible {
            self.table_offset = self.similar_cursor + 1 - visible;
        }
    }

    /// Row click: flip the checkbox, then toggle the highlight for that player's trace.
    pub fn row_click(&mut self, idx: usize, now: Instant) {
        let Some(row) = self.similar.get_mut(idx) else {
            return;
        };
        row.checked = !row.checked;
        let id = row.player_id();
        self.similar_cursor = idx;
        if let Some(id) = id {
            self.chart.toggle_pulsate(&id, now);
        }
    }

    /// Row double-click: compare the input player with this row only.
    pub fn row_double_click(&mut self, idx: usize) -> Option<ProviderCommand> {
        let id = self.similar.get(idx)?.player_id()?;
        self.compare_with(vec![id])
    }

    pub fn checked_ids(&self) -> Vec<PlayerId> {
        self.similar
            .iter()
            .filter(|row| row.checked)
            .filter_map(SimilarRow::player_id)
            .collect()
    }

    // ---- compare flow -------------------------------------------------------------------

    pub fn compare_selected(&mut self) -> Option<ProviderCommand> {
        let checked = self.checked_ids();
        if checked.is_empty() {
            self.raise_alert("Select at least one player.");
            return None;
        }
        self.compare_with(checked)
    }

    fn compare_with(&mut self, others: Vec<PlayerId>) -> Option<ProviderCommand> {
        let Some(input) = self.selected_player_id.clone() else {
            self.raise_alert("Select a player first.");
            return None;
        };
        let mut player_ids = Vec::with_capacity(others.len() + 1);
        player_ids.push(input);
        player_ids.extend(others);
        Some(ProviderCommand::Compare { player_ids })
    }

    /// Panels, then chart, then report, in that order.
    pub fn apply_compare(&mut self, resp: CompareResponse, now: Instant) {
        self.show_all_features = false;
        self.render_compare_panels(&resp);
        self.compare_scroll = 0;

        let input = resp.radar.first().cloned().unwrap_or_default();
        let series: Vec<ComparisonSeries> = resp
            .players
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, player)| ComparisonSeries {
                id: player.id(),
                name: player.name(),
                radar: resp.radar.get(idx).cloned().unwrap_or_default(),
            })
            .collect();
        let input_name = resp.players.first().map(PlayerRecord::name).unwrap_or_default();
        self.tooltip.reset_chart();
        self.chart.build(&input, &input_name, &series, now);

        self.report.render(resp.ai_report.as_deref().unwrap_or_default());
        self.report_scroll = 0;
        self.last_compare = Some(resp);
    }

    fn render_compare_panels(&mut self, resp: &CompareResponse) {
        let (input, boxes) = panels::compare_panels(resp);
        self.input_panel = Some(input);
        self.compare_boxes = boxes;
    }

    pub fn toggle_all_features(&mut self) {
        let Some(resp) = self.last_compare.clone() else {
            self.raise_alert("Compare players first.");
            return;
        };
        self.show_all_features = !self.show_all_features;
        if self.show_all_features {
            let (input, boxes) = panels::all_feature_panels(&resp.players);
            self.input_panel = Some(input);
            self.compare_boxes = boxes;
        } else {
            self.render_compare_panels(&resp);
        }
        self.compare_scroll = 0;
    }

    pub fn all_features_label(&self) -> &'static str {
        if self.show_all_features {
            "Hide ALL features"
        } else {
            "Show ALL features"
        }
    }

    pub fn remove_selection(&mut self, now: Instant) {
        for row in &mut self.similar {
            row.checked = false;
        }
        self.compare_boxes.clear();
        self.compare_scroll = 0;
        self.report.clear_and_hide();

        if self.last_similar_input_radar.is_some() {
            self.rebuild_chart_from_similar(now);
        }
        self.chart.stop_pulsate();
    }

    pub fn toggle_report(&mut self) {
        self.report.toggle();
    }

    /// Scrolls the compare boxes, stopping once the last line is at the bottom of the pane.
    pub fn scroll_compare(&mut self, delta: i32, visible: usize) {
        let total = panels::flatten_boxes(&self.compare_boxes).len();
        self.compare_scroll = scroll_by(self.compare_scroll, delta, total.saturating_sub(visible));
    }

    pub fn scroll_report(&mut self, delta: i32, visible: usize, width: usize) {
        let total = self.report.wrapped_line_count(width);
        self.report_scroll = scroll_by(self.report_scroll, delta, total.saturating_sub(visible));
    }

    // ---- hover ----------------------------------------------------------------------------

    pub fn hover_field(&mut self, key: Option<&str>, pointer: (u16, u16)) {
        match key {
            Some(key) if self.showing_field(key) => self.tooltip.move_field(pointer),
            Some(key) => {
                let desc = self
                    .feature_descriptions
                    .get(key)
                    .cloned()
                    .unwrap_or_default();
                self.tooltip.show_field(key, &desc, pointer);
            }
            None => self.tooltip.hide_field(),
        }
    }

    fn showing_field(&self, key: &str) -> bool {
        self.tooltip.is_visible()
            && matches!(self.tooltip.content(), Some(TooltipContent::Field { key: shown, .. }) if shown == key)
    }

    /// Chart hover: `hit` is the active axis and its caret cell, if any.
    pub fn hover_chart(&mut self, hit: Option<(usize, (u16, u16))>, now: Instant) {
        // The pointer has left whatever stat row it was on.
        self.tooltip.hide_field();
        match hit.and_then(|(axis, caret)| {
            self.chart
                .tooltip_content(axis, &self.feature_descriptions)
                .map(|content| (content, caret))
        }) {
            Some((content, caret)) => self.tooltip.show_chart(content, caret),
            None => self.tooltip.chart_inactive(now),
        }
    }

    /// Timers driven by the event loop: debounce, tooltip hide, animation frame.
    pub fn tick(&mut self, now: Instant) -> Option<ProviderCommand> {
        self.tooltip.tick(now);
        self.chart.poll_frame(now);
        self.poll_search(now)
    }
}

fn scroll_by(value: u16, delta: i32, max: usize) -> u16 {
    let max = u16::try_from(max).unwrap_or(u16::MAX);
    let next = if delta >= 0 {
        value.saturating_add(delta.unsigned_abs() as u16)
    } else {
        value.saturating_sub(delta.unsigned_abs() as u16)
    };
    next.min(max)
}

fn cycle_option(options: &[String], current: Option<&str>, forward: bool) -> Option<String> {
    // `None` ("all") sits before the first option.
    let len = options.len() + 1;
    let pos = current
        .and_then(|cur| options.iter().position(|o| o == cur))
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    if next == 0 {
        None
    } else {
        options.get(next - 1).cloned()
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    apply_delta_at(state, delta, Instant::now());
}

pub fn apply_delta_at(state: &mut AppState, delta: Delta, now: Instant) {
    match delta {
        Delta::SetMeta(meta) => {
            state.leagues = meta.leagues;
            state.positions = meta.positions;
        }
        Delta::SetFeatureDescriptions(descriptions) => {
            state.feature_descriptions = descriptions;
        }
        Delta::SetSuggestions(hits) => {
            state.suggestions = hits;
            state.suggestion_selected = 0;
        }
        Delta::SetPlayerDetail(player) => {
            state.push_log(format!("[INFO] Loaded {}", player.name()));
            state.input_panel = Some(panels::input_player_panel(&player));
        }
        Delta::SetSimilar(resp) => {
            state.push_log(format!("[INFO] {} similar players", resp.results.len()));
            state.apply_similar(resp, now);
        }
        Delta::SetCompare(resp) => {
            state.push_log(format!("[INFO] Compared {} players", resp.players.len()));
            state.apply_compare(resp, now);
        }
        Delta::Log(msg) => state.push_log(msg),
        Delta::Alert(msg) => state.raise_alert(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_floats_print_without_fraction() {
        assert_eq!(value_to_display(&json!(12.0)), "12");
        assert_eq!(value_to_display(&json!(0.734)), "0.734");
        assert_eq!(value_to_display(&json!(null)), "");
        assert_eq!(value_to_display(&json!("ARG")), "ARG");
    }

    #[test]
    fn option_cycle_wraps_through_all() {
        let opts = vec!["A".to_string(), "B".to_string()];
        assert_eq!(cycle_option(&opts, None, true), Some("A".to_string()));
        assert_eq!(cycle_option(&opts, Some("B"), true), None);
        assert_eq!(cycle_option(&opts, None, false), Some("B".to_string()));
    }

    #[test]
    fn scroll_stops_at_bounds() {
        assert_eq!(scroll_by(0, -1, 5), 0);
        assert_eq!(scroll_by(4, 1, 5), 5);
        assert_eq!(scroll_by(5, 1, 5), 5);
        assert_eq!(scroll_by(9, -1, 5), 5);
        assert_eq!(scroll_by(3, 1, 0), 0);
    }
}
