//! Core types for calfeed.
//!
//! Independent listeners contribute calendar events for a query window into
//! one shared [`EventCollector`]; the collected events are then serialized
//! once into the JSON payload a calendar widget consumes.
//!
//! - [`EventRecord`]: one event and its wire shape
//! - [`ListenerRegistry`]: ordered listeners and the synchronous dispatch loop
//! - [`serialize`](serialize::serialize): collector to wire payload

pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod feed;
pub mod registry;
pub mod serialize;
pub mod time;
pub mod window;

pub use collector::EventCollector;
pub use config::CalfeedConfig;
pub use context::RequestContext;
pub use error::{CalfeedError, CalfeedResult, ListenerError};
pub use event::EventRecord;
pub use feed::StaticFeed;
pub use registry::{DispatchReport, FailurePolicy, Listener, ListenerFailure, ListenerRegistry};
pub use serialize::{WirePayload, to_json};
pub use time::Timestamp;
pub use window::QueryWindow;
