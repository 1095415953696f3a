use sqlx::PgConnection;
use tracing::instrument;

use super::{errors::Result, Repository};
use crate::models::{TheatreHall, TheatreHallCreate};

pub struct TheatreHalls<'c> {
    db: &'c mut PgConnection,
}

impl<'c> TheatreHalls<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for TheatreHalls<'c> {
    type CreateRequest = TheatreHallCreate;
    type Response = TheatreHall;
    type Id = i64;
    type Filter = ();

    #[instrument(skip(self, request), fields(name = %request.name, rows = request.rows, seats_in_row = request.seats_in_row), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let hall = sqlx::query_as::<_, TheatreHall>(
            "INSERT INTO theatre_halls (name, rows, seats_in_row) VALUES ($1, $2, $3)
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(&request.name)
        .bind(request.rows)
        .bind(request.seats_in_row)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(hall)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let hall = sqlx::query_as::<_, TheatreHall>(
            "SELECT id, name, rows, seats_in_row FROM theatre_halls WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(hall)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let halls = sqlx::query_as::<_, TheatreHall>(
            "SELECT id, name, rows, seats_in_row FROM theatre_halls ORDER BY id",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(halls)
    }
}
