//! StorageTable implementation
//!
//! Insertion-ordered string map with positional access.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered key/value table
///
/// `entries` holds pairs in enumeration order; `index` maps each key to
/// its position in `entries`. Both always describe the same key set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl StorageTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Check if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Get the key at `index` in enumeration order
    pub fn key(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(k, _)| k.as_str())
    }

    /// Insert or overwrite a value, returning the previous one
    ///
    /// An overwrite keeps the key at its current position; a new key is
    /// appended at the end of the enumeration order.
    pub fn insert(&mut self, key: String, value: String) -> Option<String> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, returning its value if it was present
    ///
    /// Keys after the removed one keep their relative order.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);

        for (k, _) in &self.entries[pos..] {
            if let Some(p) = self.index.get_mut(k) {
                *p -= 1;
            }
        }

        Some(value)
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterate over entries in enumeration order
    pub fn iter(&self) -> TableIter<'_> {
        TableIter {
            inner: self.entries.iter(),
        }
    }
}

impl FromIterator<(String, String)> for StorageTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl Extend<(String, String)> for StorageTable {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a StorageTable {
    type Item = (&'a str, &'a str);
    type IntoIter = TableIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over table entries in enumeration order
pub struct TableIter<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for TableIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TableIter<'_> {}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for StorageTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StorageTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor)
    }
}

/// Reads map members in document order, so the decoded enumeration order
/// matches the order the table was written in.
struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = StorageTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object mapping string keys to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = StorageTable::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            table.insert(key, value);
        }
        Ok(table)
    }
}
