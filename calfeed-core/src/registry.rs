//! Listener registration and synchronous fan-out.
//!
//! A [`ListenerRegistry`] is built once while wiring the application and then
//! shared read-only. Each query gets its own [`EventCollector`]; listeners run
//! one after another in registration order and append to it.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::collector::EventCollector;
use crate::context::RequestContext;
use crate::error::{CalfeedError, CalfeedResult, ListenerError};
use crate::window::QueryWindow;

/// Something that contributes events to a query.
pub trait Listener: Send + Sync {
    /// Append zero or more events for `window`. Returning an error aborts
    /// the query (or, under [`FailurePolicy::Isolate`], discards only this
    /// listener's contributions).
    fn handle(
        &self,
        window: &QueryWindow,
        collector: &mut EventCollector,
        context: &RequestContext,
    ) -> Result<(), ListenerError>;

    /// Name used in logs and error reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Listener for F
where
    F: Fn(&QueryWindow, &mut EventCollector, &RequestContext) -> Result<(), ListenerError>
        + Send
        + Sync,
{
    fn handle(
        &self,
        window: &QueryWindow,
        collector: &mut EventCollector,
        context: &RequestContext,
    ) -> Result<(), ListenerError> {
        self(window, collector, context)
    }
}

/// A closure listener with an explicit name.
struct Named<F> {
    name: String,
    handler: F,
}

impl<F> Listener for Named<F>
where
    F: Fn(&QueryWindow, &mut EventCollector, &RequestContext) -> Result<(), ListenerError>
        + Send
        + Sync,
{
    fn handle(
        &self,
        window: &QueryWindow,
        collector: &mut EventCollector,
        context: &RequestContext,
    ) -> Result<(), ListenerError> {
        (self.handler)(window, collector, context)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// What dispatch does when a listener fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure and fail the whole query.
    #[default]
    Abort,
    /// Discard the failing listener's events, record the failure, and keep
    /// going with the remaining listeners.
    Isolate,
}

/// A listener that failed under [`FailurePolicy::Isolate`].
#[derive(Debug)]
pub struct ListenerFailure {
    pub listener: String,
    pub error: ListenerError,
}

/// Outcome of a dispatch, including isolated failures.
#[derive(Debug)]
pub struct DispatchReport {
    pub collector: EventCollector,
    pub failures: Vec<ListenerFailure>,
}

/// Ordered set of listeners. Duplicates are kept and run once per
/// registration.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn Listener>>,
    policy: FailurePolicy,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listener_names())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: FailurePolicy) -> Self {
        ListenerRegistry {
            listeners: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Append a listener. No uniqueness check.
    pub fn register<L: Listener + 'static>(&mut self, listener: L) -> &mut Self {
        self.register_shared(Arc::new(listener))
    }

    /// Append an already shared listener, e.g. to register one instance twice.
    pub fn register_shared(&mut self, listener: Arc<dyn Listener>) -> &mut Self {
        debug!(
            listener = listener.name(),
            position = self.listeners.len(),
            "Registering listener"
        );
        self.listeners.push(listener);
        self
    }

    pub fn register_named<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&QueryWindow, &mut EventCollector, &RequestContext) -> Result<(), ListenerError>
            + Send
            + Sync
            + 'static,
    {
        self.register(Named {
            name: name.into(),
            handler,
        })
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn listener_names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    /// Run every listener for `window` and return the filled collector.
    ///
    /// Under [`FailurePolicy::Abort`] the first listener error is returned and
    /// the partial collector is dropped. Under [`FailurePolicy::Isolate`]
    /// failures are logged and the remaining events are returned.
    pub fn dispatch(
        &self,
        window: QueryWindow,
        context: &RequestContext,
    ) -> CalfeedResult<EventCollector> {
        let report = self.dispatch_with_report(window, context)?;

        for failure in &report.failures {
            warn!(
                listener = %failure.listener,
                error = %failure.error,
                "Listener failed; its events were discarded"
            );
        }

        Ok(report.collector)
    }

    /// Like [`dispatch`](Self::dispatch) but hands back isolated failures.
    pub fn dispatch_with_report(
        &self,
        window: QueryWindow,
        context: &RequestContext,
    ) -> CalfeedResult<DispatchReport> {
        let mut collector = EventCollector::new(window, context.clone());
        let failures = self.dispatch_into(&mut collector)?;
        Ok(DispatchReport {
            collector,
            failures,
        })
    }

    /// Run every listener against a caller-owned collector.
    ///
    /// On an abort the collector keeps what earlier listeners appended; the
    /// failing listener's own appends are rolled back under either policy.
    pub fn dispatch_into(
        &self,
        collector: &mut EventCollector,
    ) -> CalfeedResult<Vec<ListenerFailure>> {
        let window = *collector.window();
        let context = collector.context().clone();
        let mut failures = Vec::new();

        debug!(
            start = %window.start(),
            end = %window.end(),
            listeners = self.listeners.len(),
            "Dispatching query"
        );

        for listener in &self.listeners {
            let before = collector.len();

            match listener.handle(&window, collector, &context) {
                Ok(()) => {
                    debug!(
                        listener = listener.name(),
                        appended = collector.len() - before,
                        "Listener finished"
                    );
                }
                Err(error) => match self.policy {
                    FailurePolicy::Abort => {
                        collector.rollback_to(before);
                        warn!(
                            listener = listener.name(),
                            %error,
                            "Listener failed; aborting query"
                        );
                        return Err(CalfeedError::Listener {
                            listener: listener.name().to_string(),
                            source: error,
                        });
                    }
                    FailurePolicy::Isolate => {
                        collector.rollback_to(before);
                        failures.push(ListenerFailure {
                            listener: listener.name().to_string(),
                            error,
                        });
                    }
                },
            }
        }

        Ok(failures)
    }
}
