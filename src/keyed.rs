use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use std::collections::HashMap;

/// Map keyed by chart identifier that remembers insertion order.
///
/// Inserting an existing key replaces its value but keeps the key at the
/// position of its first insertion (last writer wins).
#[derive(Clone, Debug)]
pub struct KeyedMap<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
    overwrites: usize,
}

impl<V> Default for KeyedMap<V> {
    fn default() -> Self {
        KeyedMap {
            entries: Vec::new(),
            positions: HashMap::new(),
            overwrites: 0,
        }
    }
}

impl<V> KeyedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces. Returns the replaced value, if any.
    pub fn upsert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.positions.get(&key) {
            Some(&position) => {
                self.overwrites += 1;
                Some(std::mem::replace(&mut self.entries[position].1, value))
            }
            None => {
                self.positions.insert(key.to_owned(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of upserts that replaced an existing value.
    pub fn overwrites(&self) -> usize {
        self.overwrites
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V: Serialize> Serialize for KeyedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
