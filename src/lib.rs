pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod redis_client;
pub mod repositories;
pub mod services;

#[cfg(test)]
pub mod test_utils;

use anyhow::Context;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    cache::CacheService,
    config::Config,
    database::Database,
    models::NewUser,
    redis_client::RedisClient,
    repositories::Users,
    services::auth,
};

// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: CacheService,
    pub config: Config,
}

impl AppState {
    /// Connects to Postgres, applies migrations, connects the optional
    /// Redis cache and ensures the configured staff account exists.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let db = Database::new(&config.database.url, config.database.pool_size)
            .await
            .context("Failed to connect to database")?;
        info!("Database connected");

        db.run_migrations().await.context("Failed to run migrations")?;

        let redis = match &config.redis.url {
            Some(url) => match RedisClient::new(url).await {
                Ok(client) => {
                    info!("Redis connected");
                    Some(client)
                }
                Err(e) => {
                    // The catalog is served straight from Postgres instead
                    warn!("Redis unavailable, catalog cache disabled: {}", e);
                    None
                }
            },
            None => None,
        };
        let cache = CacheService::new(redis, config.cache.catalog_ttl_seconds);

        let state = Self::from_parts(db, cache, config);
        state.seed_admin().await?;
        Ok(state)
    }

    pub fn from_parts(db: Database, cache: CacheService, config: Config) -> Arc<Self> {
        Arc::new(Self { db, cache, config })
    }

    async fn seed_admin(&self) -> anyhow::Result<()> {
        let Some((email, password)) = self.config.admin.credentials() else {
            return Ok(());
        };

        let admin = NewUser {
            email: email.to_string(),
            password_hash: auth::hash_password(password)?,
            is_staff: true,
        };
        let mut conn = self.db.acquire().await?;
        let user = Users::new(&mut conn)
            .upsert(&admin)
            .await
            .context("Failed to seed admin user")?;
        info!(user_id = user.id, email = %user.email, "Admin user ensured");
        Ok(())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Theatre API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
