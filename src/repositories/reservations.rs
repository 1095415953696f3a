use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

use super::{errors::Result, Paginated, Repository};
use crate::models::{Reservation, Ticket, TicketRequest};

/// Name of the constraint that forbids booking a seat twice for one performance.
pub const SEAT_UNIQUE_CONSTRAINT: &str = "tickets_performance_row_seat_key";

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: i64,
}

/// Reservations are always listed for a single owner
#[derive(Debug, Clone)]
pub struct ReservationFilter {
    pub user_id: i64,
    pub skip: i64,
    pub limit: Option<i64>,
}

impl ReservationFilter {
    pub fn for_user(user_id: i64) -> Self {
        Self { user_id, skip: 0, limit: None }
    }
}

pub struct Reservations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Reservations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, ticket), fields(performance = ticket.performance, row = ticket.row, seat = ticket.seat), err)]
    pub async fn insert_ticket(&mut self, reservation_id: i64, ticket: &TicketRequest) -> Result<Ticket> {
        let ticket = sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (row, seat, performance_id, reservation_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, row, seat, performance_id, reservation_id",
        )
        .bind(ticket.row)
        .bind(ticket.seat)
        .bind(ticket.performance)
        .bind(reservation_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(ticket)
    }

    /// Tickets of each reservation, keyed by reservation id
    #[instrument(skip(self, reservation_ids), fields(count = reservation_ids.len()), err)]
    pub async fn tickets_for(&mut self, reservation_ids: &[i64]) -> Result<HashMap<i64, Vec<Ticket>>> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT id, row, seat, performance_id, reservation_id
             FROM tickets
             WHERE reservation_id = ANY($1)
             ORDER BY id",
        )
        .bind(reservation_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut by_reservation: HashMap<i64, Vec<Ticket>> = HashMap::new();
        for ticket in tickets {
            by_reservation.entry(ticket.reservation_id).or_default().push(ticket);
        }
        Ok(by_reservation)
    }

    /// Deletes a reservation owned by `user_id` together with its tickets
    #[instrument(skip(self), err)]
    pub async fn delete_owned(&mut self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Reservations<'c> {
    type CreateRequest = NewReservation;
    type Response = Reservation;
    type Id = i64;
    type Filter = ReservationFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (user_id) VALUES ($1)
             RETURNING id, created_at, user_id",
        )
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(reservation)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT id, created_at, user_id FROM reservations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(reservation)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT id, created_at, user_id FROM reservations
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(filter.user_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(reservations)
    }
}

#[async_trait::async_trait]
impl<'c> Paginated for Reservations<'c> {
    #[instrument(skip(self), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE user_id = $1")
            .bind(filter.user_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(total)
    }
}
