//! Per-request key/value storage shared between middleware and handlers.

use std::collections::HashMap;

/// Mutable string map scoped to a single request.
///
/// Created empty when the request arrives and dropped with it. Middleware
/// writes here in its `before` hook; handlers read it back:
///
/// ```rust
/// # use wicket::RequestContext;
/// let mut ctx = RequestContext::new();
/// ctx.insert("username", "alice");
/// assert_eq!(ctx.get("username"), Some("alice"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    items: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.items.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.items.remove(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
