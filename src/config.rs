//! Configuration Module
//!
//! Cache construction parameters. The embedding process decides where they
//! come from; the struct deserializes from any serde format.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default number of entries when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cache configuration parameters.
///
/// Missing fields fall back to [`CacheConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
}

impl CacheConfig {
    /// Creates a config for the given capacity. Not validated until used.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Checks the config, returning the capacity as a `NonZeroUsize`.
    pub fn validate(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity).ok_or(CacheError::ZeroCapacity)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
