//! Device type → memcached address mapping
//!
//! A `[destinations]` table replaces the defaults entirely. Destinations
//! are kept sorted by device type so ids are stable across runs.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Device types and addresses used when no `[destinations]` table is given
pub const DEFAULT_DESTINATIONS: [(&str, &str); 4] = [
    ("idfa", "127.0.0.1:33013"),
    ("gaid", "127.0.0.1:33014"),
    ("adid", "127.0.0.1:33015"),
    ("dvid", "127.0.0.1:33016"),
];

/// Configured destinations
///
/// # Example
///
/// ```toml
/// [destinations]
/// idfa = "10.0.0.1:11211"
/// gaid = "10.0.0.2:11211"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DestinationsConfig {
    routes: BTreeMap<String, String>,
}

impl Default for DestinationsConfig {
    fn default() -> Self {
        DEFAULT_DESTINATIONS.into_iter().collect()
    }
}

impl DestinationsConfig {
    /// A mapping with no destinations
    pub fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Add or replace the address for a device type
    pub fn insert(&mut self, device_type: impl Into<String>, address: impl Into<String>) {
        self.routes.insert(device_type.into(), address.into());
    }

    pub fn get(&self, device_type: &str) -> Option<&str> {
        self.routes.get(device_type).map(String::as_str)
    }

    /// Iterate `(device_type, address)` pairs in device type order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DestinationsConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            routes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
