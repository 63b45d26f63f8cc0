//! Ordered request parameters.
//!
//! The API treats "not supplied" differently from "supplied as empty", so an
//! absent optional value is kept as `None` until [`Params::into_fields`]
//! drops it. An empty string survives the filter.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any earlier entry for the same key.
    pub fn with(self, key: &str, value: impl Into<String>) -> Self {
        self.with_opt(key, Some(value))
    }

    /// Set `key` to an optional value. `None` is omitted on the wire.
    pub fn with_opt<V: Into<String>>(mut self, key: &str, value: Option<V>) -> Self {
        self.insert(key, value.map(Into::into));
        self
    }

    pub fn insert(&mut self, key: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// True when `key` is present with a value (a `None` entry does not count).
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Drop absent values, keeping insertion order.
    pub fn into_fields(self) -> Vec<(String, String)> {
        self.entries
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}
