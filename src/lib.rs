//! TTL LRU Cache - A bounded, thread-safe in-memory cache
//!
//! Evicts the least recently used entry when full and treats entries whose
//! time-to-live has elapsed as absent.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheStats, Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
