//! Calendar event records and their wire shape.
//!
//! An [`EventRecord`] is what a listener contributes to a query. Its
//! serialization is order-sensitive: calendar widgets read the keys in the
//! order produced by [`EventRecord::to_wire_object`].

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{CalfeedError, CalfeedResult};
use crate::time::Timestamp;

/// Keys the record itself emits. An extra field using one of these
/// replaces the fixed value on the wire.
pub const FIXED_WIRE_KEYS: [&str; 10] = [
    "id",
    "title",
    "start",
    "url",
    "backgroundColor",
    "borderColor",
    "textColor",
    "className",
    "end",
    "allDay",
];

/// One calendar event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    id: Option<Value>,
    title: String,
    start: Timestamp,
    end: Option<Timestamp>,
    all_day: bool,
    url: Option<String>,
    /// Emitted as both `backgroundColor` and `borderColor`
    bg_color: Option<String>,
    /// Emitted as `textColor`
    fg_color: Option<String>,
    /// Emitted as `className`
    css_class: Option<String>,
    extra_fields: IndexMap<String, Value>,
}

impl EventRecord {
    /// Create an event. A non-all-day event must have an end.
    pub fn new(
        title: impl Into<String>,
        start: impl Into<Timestamp>,
        end: Option<Timestamp>,
        all_day: bool,
    ) -> CalfeedResult<Self> {
        if end.is_none() && !all_day {
            return Err(CalfeedError::InvalidInput(
                "Must specify an event end if not an all day event".into(),
            ));
        }

        Ok(EventRecord::with_bounds(title.into(), start.into(), end, all_day))
    }

    /// A timed event with both bounds.
    pub fn timed(
        title: impl Into<String>,
        start: impl Into<Timestamp>,
        end: impl Into<Timestamp>,
    ) -> Self {
        EventRecord::with_bounds(title.into(), start.into(), Some(end.into()), false)
    }

    /// An all-day event without an end.
    pub fn all_day(title: impl Into<String>, start: impl Into<Timestamp>) -> Self {
        EventRecord::with_bounds(title.into(), start.into(), None, true)
    }

    fn with_bounds(title: String, start: Timestamp, end: Option<Timestamp>, all_day: bool) -> Self {
        EventRecord {
            id: None,
            title,
            start,
            end,
            all_day,
            url: None,
            bg_color: None,
            fg_color: None,
            css_class: None,
            extra_fields: IndexMap::new(),
        }
    }

    pub fn set_id(&mut self, id: impl Into<Value>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_bg_color(&mut self, color: impl Into<String>) -> &mut Self {
        self.bg_color = Some(color.into());
        self
    }

    pub fn bg_color(&self) -> Option<&str> {
        self.bg_color.as_deref()
    }

    pub fn set_fg_color(&mut self, color: impl Into<String>) -> &mut Self {
        self.fg_color = Some(color.into());
        self
    }

    pub fn fg_color(&self) -> Option<&str> {
        self.fg_color.as_deref()
    }

    pub fn set_css_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.css_class = Some(class.into());
        self
    }

    pub fn css_class(&self) -> Option<&str> {
        self.css_class.as_deref()
    }

    pub fn set_start(&mut self, start: impl Into<Timestamp>) -> &mut Self {
        self.start = start.into();
        self
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn set_end(&mut self, end: impl Into<Timestamp>) -> &mut Self {
        self.end = Some(end.into());
        self
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    pub fn set_all_day(&mut self, all_day: impl Into<bool>) -> &mut Self {
        self.all_day = all_day.into();
        self
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    /// Insert or overwrite a non-standard field. An overwritten field keeps
    /// its original position.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();

        if FIXED_WIRE_KEYS.contains(&name.as_str()) {
            warn!(field = %name, title = %self.title, "Extra field overrides a fixed event field");
        }

        self.extra_fields.insert(name, value.into());
        self
    }

    /// Remove a non-standard field. No-op if absent.
    pub fn remove_field(&mut self, name: &str) -> &mut Self {
        self.extra_fields.shift_remove(name);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra_fields.get(name)
    }

    pub fn extra_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extra_fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build the wire object.
    ///
    /// Keys appear as: `id?`, `title`, `start`, `url?`,
    /// `backgroundColor?`+`borderColor?`, `textColor?`, `className?`, `end?`,
    /// `allDay`, then extra fields in insertion order. Unset optional
    /// attributes are omitted rather than emitted as null.
    pub fn to_wire_object(&self) -> Map<String, Value> {
        let mut obj = Map::new();

        if let Some(id) = &self.id {
            obj.insert("id".into(), id.clone());
        }

        obj.insert("title".into(), Value::String(self.title.clone()));
        obj.insert("start".into(), Value::String(self.start.to_wire_string()));

        if let Some(url) = &self.url {
            obj.insert("url".into(), Value::String(url.clone()));
        }

        if let Some(color) = &self.bg_color {
            obj.insert("backgroundColor".into(), Value::String(color.clone()));
            obj.insert("borderColor".into(), Value::String(color.clone()));
        }

        if let Some(color) = &self.fg_color {
            obj.insert("textColor".into(), Value::String(color.clone()));
        }

        if let Some(class) = &self.css_class {
            obj.insert("className".into(), Value::String(class.clone()));
        }

        if let Some(end) = &self.end {
            obj.insert("end".into(), Value::String(end.to_wire_string()));
        }

        obj.insert("allDay".into(), Value::Bool(self.all_day));

        for (name, value) in &self.extra_fields {
            obj.insert(name.clone(), value.clone());
        }

        obj
    }
}

impl Serialize for EventRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire_object().serialize(serializer)
    }
}
