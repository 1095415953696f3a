use crate::redis_client::RedisClient;
use tracing::info;

pub mod plays;

/// Read-through cache for catalog listings.
///
/// Without Redis every lookup misses and writes are no-ops, so callers never
/// branch on whether caching is configured.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: Option<RedisClient>, ttl_seconds: u64) -> Self {
        if redis.is_none() {
            info!("Redis not configured, catalog cache disabled");
        }
        Self { redis, ttl_seconds }
    }

    pub fn disabled() -> Self {
        Self { redis: None, ttl_seconds: 0 }
    }
}
