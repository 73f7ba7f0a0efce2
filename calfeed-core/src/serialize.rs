//! Rendering a collector into the payload calendar widgets consume.

use serde_json::{Map, Value};

use crate::collector::EventCollector;
use crate::error::{CalfeedError, CalfeedResult};

/// Ordered list of wire objects, one per collected event.
pub type WirePayload = Vec<Map<String, Value>>;

/// Wire objects for every collected event, in append order. No filtering,
/// sorting or deduplication happens here.
pub fn serialize(collector: &EventCollector) -> WirePayload {
    collector.all().iter().map(|e| e.to_wire_object()).collect()
}

/// The payload as a JSON array string.
pub fn to_json(collector: &EventCollector) -> CalfeedResult<String> {
    serde_json::to_string(&serialize(collector))
        .map_err(|e| CalfeedError::Serialization(e.to_string()))
}
