//! Listener serving a fixed list of events from configuration.

use serde::Deserialize;

use crate::collector::EventCollector;
use crate::context::RequestContext;
use crate::error::{CalfeedError, CalfeedResult, ListenerError};
use crate::event::EventRecord;
use crate::registry::Listener;
use crate::time::Timestamp;
use crate::window::QueryWindow;

/// A `[[feeds]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    /// Background and border color for every event of the feed
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub css_class: Option<String>,
    #[serde(default)]
    pub events: Vec<FeedEventConfig>,
}

/// A `[[feeds.events]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEventConfig {
    pub id: Option<serde_json::Value>,
    pub title: String,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    #[serde(default)]
    pub all_day: bool,
    pub url: Option<String>,
}

/// Appends the configured events that overlap the query window.
#[derive(Debug, Clone)]
pub struct StaticFeed {
    name: String,
    events: Vec<EventRecord>,
}

impl StaticFeed {
    pub fn new(name: impl Into<String>, events: Vec<EventRecord>) -> Self {
        StaticFeed {
            name: name.into(),
            events,
        }
    }

    /// Build the feed's records up front so bad entries fail at startup.
    pub fn from_config(config: &FeedConfig) -> CalfeedResult<Self> {
        let events = config
            .events
            .iter()
            .map(|entry| {
                let mut event =
                    EventRecord::new(&entry.title, entry.start, entry.end, entry.all_day).map_err(
                        |e| {
                            CalfeedError::Config(format!(
                                "Feed '{}', event '{}': {}",
                                config.name, entry.title, e
                            ))
                        },
                    )?;

                if let Some(id) = &entry.id {
                    event.set_id(id.clone());
                }
                if let Some(url) = &entry.url {
                    event.set_url(url);
                }
                if let Some(color) = &config.color {
                    event.set_bg_color(color);
                }
                if let Some(color) = &config.text_color {
                    event.set_fg_color(color);
                }
                if let Some(class) = &config.css_class {
                    event.set_css_class(class);
                }

                Ok(event)
            })
            .collect::<CalfeedResult<Vec<_>>>()?;

        Ok(StaticFeed::new(&config.name, events))
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }
}

impl Listener for StaticFeed {
    fn handle(
        &self,
        window: &QueryWindow,
        collector: &mut EventCollector,
        _context: &RequestContext,
    ) -> Result<(), ListenerError> {
        collector.extend(
            self.events
                .iter()
                .filter(|e| window.overlaps(e.start(), e.end()))
                .cloned(),
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ListenerRegistry;

    fn feed_config() -> FeedConfig {
        FeedConfig {
            name: "team".into(),
            color: Some("#336699".into()),
            text_color: None,
            css_class: Some("team".into()),
            events: vec![
                FeedEventConfig {
                    id: Some(serde_json::json!(1)),
                    title: "Kickoff".into(),
                    start: Timestamp::parse("2024-02-27T10:00:00+01:00").unwrap(),
                    end: Some(Timestamp::parse("2024-02-27T11:00:00+01:00").unwrap()),
                    all_day: false,
                    url: None,
                },
                FeedEventConfig {
                    id: None,
                    title: "Offsite".into(),
                    start: Timestamp::parse("2024-03-12").unwrap(),
                    end: None,
                    all_day: true,
                    url: Some("/offsite".into()),
                },
            ],
        }
    }

    #[test]
    fn test_only_overlapping_events_are_appended() {
        let feed = StaticFeed::from_config(&feed_config()).unwrap();
        let mut registry = ListenerRegistry::new();
        registry.register(feed);

        let window = QueryWindow::from_args(Some("2024-03-01"), Some("2024-03-31")).unwrap();
        let collector = registry.dispatch(window, &RequestContext::new()).unwrap();

        assert_eq!(collector.len(), 1);
        let event = &collector.all()[0];
        assert_eq!(event.title(), "Offsite");
        assert_eq!(event.bg_color(), Some("#336699"));
        assert_eq!(event.css_class(), Some("team"));
        assert_eq!(event.url(), Some("/offsite"));
    }

    #[test]
    fn test_timed_event_without_end_is_a_config_error() {
        let mut config = feed_config();
        config.events[0].end = None;

        let err = StaticFeed::from_config(&config).unwrap_err();
        assert!(matches!(err, CalfeedError::Config(_)), "unexpected error: {err}");
        assert!(err.to_string().contains("Kickoff"));
    }

    #[test]
    fn test_feed_name_is_listener_name() {
        let feed = StaticFeed::from_config(&feed_config()).unwrap();
        assert_eq!(Listener::name(&feed), "team");
    }
}
