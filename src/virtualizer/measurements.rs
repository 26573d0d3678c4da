//! Measured row sizes keyed by stable row identity.
//!
//! Sizes are keyed by [`RowKey`] rather than index so that rows inserted or
//! removed above a measured row do not invalidate its measurement.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    /// Wraps a key string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Row sizes reported after render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementCache {
    sizes: HashMap<RowKey, u32>,
}

impl MeasurementCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the measured size of `key`.
    #[must_use]
    pub fn get(&self, key: &RowKey) -> Option<u32> {
        self.sizes.get(key).copied()
    }

    /// Stores a measurement, returning the previous one.
    pub fn record(&mut self, key: RowKey, size: u32) -> Option<u32> {
        self.sizes.insert(key, size)
    }

    /// Returns the number of measured rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Returns true when nothing has been measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
