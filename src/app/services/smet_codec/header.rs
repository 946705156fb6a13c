//! Insertion-ordered header field map

use std::collections::HashMap;

/// Ordered mapping from header field name to field value
///
/// Keys keep the position of their first occurrence; setting an existing key
/// overwrites its value in place. Values are format-preserving strings - no
/// numeric coercion happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields in the map
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether a field name is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Field value by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a field value
    ///
    /// A field's position is fixed by its first occurrence; later sets for
    /// the same name overwrite the value without moving the field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.insert(key, value.into());
    }

    /// Iterate fields in encounter order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.values.get(key).map(|value| (key.as_str(), value.as_str())))
    }

    /// Iterate field names in encounter order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}
