use sqlx::PgConnection;
use tracing::instrument;

use super::{errors::Result, Paginated, Repository};
use crate::models::{Actor, ActorCreate};

#[derive(Debug, Clone, Default)]
pub struct ActorFilter {
    pub skip: i64,
    pub limit: Option<i64>,
}

pub struct Actors<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Actors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Actors<'c> {
    type CreateRequest = ActorCreate;
    type Response = Actor;
    type Id = i64;
    type Filter = ActorFilter;

    #[instrument(skip(self, request), fields(last_name = %request.last_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let actor = sqlx::query_as::<_, Actor>(
            "INSERT INTO actors (first_name, last_name) VALUES ($1, $2)
             RETURNING id, first_name, last_name",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(actor)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let actor = sqlx::query_as::<_, Actor>(
            "SELECT id, first_name, last_name FROM actors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(actor)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // LIMIT NULL means no limit in Postgres
        let actors = sqlx::query_as::<_, Actor>(
            "SELECT id, first_name, last_name FROM actors
             ORDER BY last_name, id
             LIMIT $1 OFFSET $2",
        )
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(actors)
    }
}

#[async_trait::async_trait]
impl<'c> Paginated for Actors<'c> {
    #[instrument(skip(self), err)]
    async fn count(&mut self, _filter: &Self::Filter) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM actors")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(total)
    }
}
