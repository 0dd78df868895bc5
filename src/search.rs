use std::time::{Duration, Instant};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    ClearSuggestions,
    Query(String),
}

/// What a settled query should do: too short clears the list, anything else is sent.
pub fn classify_query(query: &str) -> SearchAction {
    if query.chars().count() < MIN_QUERY_CHARS {
        SearchAction::ClearSuggestions
    } else {
        SearchAction::Query(query.to_string())
    }
}

/// Trailing-edge debounce: only the last value pushed within `delay` is released.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, at)) if now >= *at => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_only_last_value_after_idle() {
        let start = Instant::now();
        let mut debounce = Debouncer::default();
        debounce.push("M", start);
        debounce.push("Me", start + Duration::from_millis(50));
        debounce.push("Mes", start + Duration::from_millis(120));

        assert_eq!(debounce.poll(start + Duration::from_millis(250)), None);
        assert_eq!(
            debounce.poll(start + Duration::from_millis(320)),
            Some("Mes".to_string())
        );
        assert_eq!(debounce.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn short_queries_clear() {
        assert_eq!(classify_query(""), SearchAction::ClearSuggestions);
        assert_eq!(classify_query("M"), SearchAction::ClearSuggestions);
        assert_eq!(classify_query("Me"), SearchAction::Query("Me".to_string()));
    }
}
