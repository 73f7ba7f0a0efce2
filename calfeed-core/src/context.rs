//! Read-only view of the request a query originated from.

use std::collections::BTreeMap;

/// What listeners may know about the originating request.
///
/// Listeners receive it by shared reference and can only read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<String>,
    params: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Authenticated user identifier, if the boundary supplied one.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
