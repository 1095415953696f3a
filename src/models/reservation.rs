use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Reservation {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub performance_id: i64,
    pub reservation_id: i64,
}

/// One requested seat: (row, seat, performance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    pub row: i32,
    pub seat: i32,
    pub performance: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationCreate {
    pub tickets: Vec<TicketRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketResponse {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub performance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationResponse {
    pub id: i64,
    pub tickets: Vec<TicketResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            performance: ticket.performance_id,
        }
    }
}

impl ReservationResponse {
    pub fn new(reservation: Reservation, tickets: Vec<Ticket>) -> Self {
        Self {
            id: reservation.id,
            tickets: tickets.into_iter().map(TicketResponse::from).collect(),
            created_at: reservation.created_at,
        }
    }
}
