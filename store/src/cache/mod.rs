//! In-memory caching shared by the remote and cached adapters.

pub mod key;
pub mod ttl_cache;

use std::time::Duration;

pub use key::CacheKey;
pub use ttl_cache::{CacheEntry, CacheStats, FetchTicket, TtlCache};

/// Five minutes, the freshness window used when none is configured.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
