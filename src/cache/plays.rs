use crate::cache::CacheService;
use redis::AsyncCommands;
use tracing::{debug, warn};

const PLAYS_PREFIX: &str = "plays:";

impl CacheService {
    pub fn plays_key(fragment: &str) -> String {
        format!("{PLAYS_PREFIX}list:{fragment}")
    }

    /// Cached JSON for a play listing; Redis errors count as a miss
    pub async fn get_cached_plays(&self, key: &str) -> Option<String> {
        let mut conn = self.redis.as_ref()?.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Failed to read plays cache {}: {:?}", key, e);
                None
            }
        }
    }

    pub async fn cache_plays(&self, key: &str, json: &str) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let mut conn = redis.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, json, self.ttl_seconds).await {
            warn!("Failed to cache plays listing {}: {:?}", key, e);
        }
    }

    /// Drops every cached play listing; called after a play is created
    pub async fn invalidate_plays(&self) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let mut conn = redis.conn.clone();
        let keys: Vec<String> = match conn.keys(format!("{PLAYS_PREFIX}*")).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list plays cache keys: {:?}", e);
                return;
            }
        };
        if keys.is_empty() {
            return;
        }

        let count = keys.len();
        match conn.del::<_, ()>(keys).await {
            Ok(()) => debug!("Invalidated {} cached play listings", count),
            Err(e) => warn!("Failed to invalidate plays cache: {:?}", e),
        }
    }
}
