use sqlx::PgConnection;
use tracing::instrument;

use super::{errors::Result, Repository};
use crate::models::{Genre, GenreCreate};

pub struct Genres<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Genres<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Genres<'c> {
    type CreateRequest = GenreCreate;
    type Response = Genre;
    type Id = i64;
    type Filter = ();

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let genre = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&request.name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(genre)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(genre)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name, id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(genres)
    }
}
