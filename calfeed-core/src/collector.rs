//! Per-query accumulator of event records.

use crate::context::RequestContext;
use crate::event::EventRecord;
use crate::window::QueryWindow;

/// Ordered, append-only set of events gathered for one query.
///
/// The window and context are fixed for the collector's lifetime.
#[derive(Debug, Clone)]
pub struct EventCollector {
    window: QueryWindow,
    context: RequestContext,
    events: Vec<EventRecord>,
}

impl EventCollector {
    pub fn new(window: QueryWindow, context: RequestContext) -> Self {
        EventCollector {
            window,
            context,
            events: Vec::new(),
        }
    }

    pub fn append(&mut self, event: EventRecord) {
        self.events.push(event);
    }

    pub fn window(&self) -> &QueryWindow {
        &self.window
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Events in the order they were appended.
    pub fn all(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.events
    }

    /// Drop everything appended after the first `len` events. Only the
    /// dispatcher uses this, to discard a failed listener's contributions.
    pub(crate) fn rollback_to(&mut self, len: usize) {
        self.events.truncate(len);
    }
}

impl Extend<EventRecord> for EventCollector {
    fn extend<I: IntoIterator<Item = EventRecord>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}
