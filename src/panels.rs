use crate::state::{CompareResponse, PlayerRecord};

pub const PLACEHOLDER: &str = "-";
pub const COMPARE_PLACEHOLDER: &str = "Select players and click \"Compare selected\"";
pub const PLAYER_KEY: &str = "Player";
pub const INTERNAL_ID_KEY: &str = "Rk";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: String,
    /// Field key used for the hover description; `None` rows carry no tooltip.
    pub key: Option<String>,
    pub value: String,
}

impl StatRow {
    fn keyed(key: &str, value: String) -> Self {
        Self {
            label: key.to_string(),
            key: Some(key.to_string()),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatPanel {
    pub title: String,
    pub rows: Vec<StatRow>,
}

impl StatPanel {
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

// Label plus the field names tried in order; upstream sources disagree on column naming.
const INPUT_PANEL_FIELDS: &[(&str, &[&str])] = &[
    ("Player", &["Player"]),
    ("Nation", &["Nation"]),
    ("Born", &["Born"]),
    ("Age", &["Age"]),
    ("Position", &["Pos"]),
    ("Matches", &["Playing Time MP", "MP"]),
    ("Goals", &["Performance Gls", "Gls"]),
    ("Assists", &["Performance Ast", "Ast"]),
];

/// The fixed summary shown after a player detail fetch.
pub fn input_player_panel(player: &PlayerRecord) -> StatPanel {
    let rows = INPUT_PANEL_FIELDS
        .iter()
        .map(|(label, keys)| {
            let resolved = player.first_present(keys);
            let value = resolved
                .map(|key| player.display(key))
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            StatRow {
                label: (*label).to_string(),
                key: Some(resolved.unwrap_or(keys[0]).to_string()),
                value,
            }
        })
        .collect();
    StatPanel {
        title: "Input player".to_string(),
        rows,
    }
}

/// Input panel plus one box per compared player, built from the curated `compare_stats` keys.
pub fn compare_panels(resp: &CompareResponse) -> (StatPanel, Vec<StatPanel>) {
    let keys: Vec<&str> = resp
        .compare_stats
        .keys
        .iter()
        .map(String::as_str)
        .filter(|key| *key != PLAYER_KEY)
        .collect();

    let panel_for = |idx: usize, title: &str| -> StatPanel {
        let name = resp
            .players
            .get(idx)
            .map(PlayerRecord::name)
            .unwrap_or_default();
        let stats = resp.compare_stats.rows.get(idx);
        let mut rows = vec![StatRow {
            label: PLAYER_KEY.to_string(),
            key: None,
            value: name,
        }];
        rows.extend(keys.iter().map(|key| {
            let value = stats
                .and_then(|row| row.stats.get(*key))
                .map(crate::state::value_to_display)
                .unwrap_or_default();
            StatRow::keyed(key, value)
        }));
        StatPanel {
            title: title.to_string(),
            rows,
        }
    };

    let input = panel_for(0, "Input player");
    let boxes = (1..resp.compare_stats.rows.len())
        .map(|idx| panel_for(idx, &format!("Compare {idx}")))
        .collect();
    (input, boxes)
}

/// Every field on each record except the internal rank id, after a leading Player row.
pub fn all_feature_panels(players: &[PlayerRecord]) -> (StatPanel, Vec<StatPanel>) {
    let panel_for = |player: &PlayerRecord, title: String| -> StatPanel {
        let mut rows = vec![StatRow {
            label: PLAYER_KEY.to_string(),
            key: None,
            value: player.name(),
        }];
        rows.extend(
            player
                .keys()
                .filter(|key| key.as_str() != INTERNAL_ID_KEY)
                .map(|key| StatRow::keyed(key, player.display(key))),
        );
        StatPanel { title, rows }
    };

    let empty = PlayerRecord::default();
    let input = panel_for(players.first().unwrap_or(&empty), "Input player".to_string());
    let boxes = players
        .iter()
        .enumerate()
        .skip(1)
        .map(|(idx, player)| panel_for(player, format!("Compare {idx}")))
        .collect();
    (input, boxes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelLine {
    Title(String),
    Row(StatRow),
    Blank,
    Note(String),
}

/// Stacks compare boxes into one scrollable list of lines.
pub fn flatten_boxes(boxes: &[StatPanel]) -> Vec<PanelLine> {
    if boxes.is_empty() {
        return vec![PanelLine::Note(COMPARE_PLACEHOLDER.to_string())];
    }
    let mut lines = Vec::new();
    for (idx, panel) in boxes.iter().enumerate() {
        if idx > 0 {
            lines.push(PanelLine::Blank);
        }
        lines.push(PanelLine::Title(panel.title.clone()));
        lines.extend(panel.rows.iter().cloned().map(PanelLine::Row));
    }
    lines
}

pub fn panel_lines(panel: Option<&StatPanel>) -> Vec<PanelLine> {
    match panel {
        Some(panel) => panel.rows.iter().cloned().map(PanelLine::Row).collect(),
        None => vec![PanelLine::Note("Search for a player to begin".to_string())],
    }
}
