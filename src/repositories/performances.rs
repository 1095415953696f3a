use chrono::NaiveDate;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use super::errors::Result;
use crate::models::{Performance, PerformanceCreate, PerformanceSummary, SeatPosition, TheatreHall};

#[derive(Debug, Clone, Default)]
pub struct PerformanceFilter {
    /// Only performances starting on this (UTC) calendar day
    pub date: Option<NaiveDate>,
    pub play: Option<i64>,
}

// tickets_available is derived on every read: capacity minus issued tickets
const SUMMARY_SELECT: &str = r#"
    SELECT
        p.id,
        p.play_id,
        pl.title AS play_title,
        p.theatre_hall_id,
        h.name AS theatre_hall_name,
        h.rows,
        h.seats_in_row,
        p.show_time,
        (h.rows::BIGINT * h.seats_in_row::BIGINT
            - (SELECT COUNT(*) FROM tickets t WHERE t.performance_id = p.id)) AS tickets_available
    FROM performances p
    JOIN plays pl ON pl.id = p.play_id
    JOIN theatre_halls h ON h.id = p.theatre_hall_id
"#;

impl PerformanceFilter {
    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(date) = self.date {
            query.push(" AND (p.show_time AT TIME ZONE 'UTC')::DATE = ");
            query.push_bind(date);
        }
        if let Some(play) = self.play {
            query.push(" AND p.play_id = ");
            query.push_bind(play);
        }
    }
}

pub struct Performances<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Performances<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn summary(&mut self, id: i64) -> Result<Option<PerformanceSummary>> {
        let summary = sqlx::query_as::<_, PerformanceSummary>(&format!("{SUMMARY_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(summary)
    }

    #[instrument(skip(self), err)]
    pub async fn summaries(&mut self, filter: &PerformanceFilter) -> Result<Vec<PerformanceSummary>> {
        let mut query = QueryBuilder::new(SUMMARY_SELECT);
        query.push(" WHERE 1=1");
        filter.push_conditions(&mut query);
        query.push(" ORDER BY p.show_time, p.id");

        let rows = query
            .build_query_as::<PerformanceSummary>()
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    /// The hall a performance takes place in, if the performance exists
    #[instrument(skip(self), err)]
    pub async fn hall_for(&mut self, performance_id: i64) -> Result<Option<TheatreHall>> {
        let hall = sqlx::query_as::<_, TheatreHall>(
            "SELECT h.id, h.name, h.rows, h.seats_in_row
             FROM performances p
             JOIN theatre_halls h ON h.id = p.theatre_hall_id
             WHERE p.id = $1",
        )
        .bind(performance_id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(hall)
    }

    #[instrument(skip(self), err)]
    pub async fn taken_places(&mut self, performance_id: i64) -> Result<Vec<SeatPosition>> {
        let places = sqlx::query_as::<_, SeatPosition>(
            "SELECT row, seat FROM tickets WHERE performance_id = $1 ORDER BY row, seat",
        )
        .bind(performance_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(places)
    }

    #[instrument(skip(self, request), fields(play = request.play, theatre_hall = request.theatre_hall), err)]
    pub async fn create(&mut self, request: &PerformanceCreate) -> Result<Performance> {
        let performance = sqlx::query_as::<_, Performance>(
            "INSERT INTO performances (play_id, theatre_hall_id, show_time) VALUES ($1, $2, $3)
             RETURNING id, play_id, theatre_hall_id, show_time",
        )
        .bind(request.play)
        .bind(request.theatre_hall)
        .bind(request.show_time)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(performance)
    }

    /// Deletes the performance; its tickets go with it
    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM performances WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
