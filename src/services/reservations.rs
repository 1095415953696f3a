//! Reservation commit: one reservation plus all of its tickets, or nothing.
//!
//! Seat bounds are checked for every requested ticket before any row is
//! written. Double booking is left to the `tickets_performance_row_seat_key`
//! constraint, so two concurrent requests for the same seat cannot both
//! commit: the loser gets [`Error::DuplicateSeat`] and its transaction is
//! rolled back.

use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{info, instrument};

use crate::{
    errors::{Error, FieldErrors},
    middleware::AuthUser,
    models::{Reservation, TheatreHall, Ticket, TicketRequest},
    repositories::{
        errors::DbError, reservations::SEAT_UNIQUE_CONSTRAINT, NewReservation, Performances,
        Repository, Reservations,
    },
    services::seat_validator::validate_seat,
};

/// Checks every ticket against its performance's hall and collects all
/// failures, keyed `tickets[i].<field>`.
pub async fn validate_tickets(conn: &mut PgConnection, tickets: &[TicketRequest]) -> Result<(), Error> {
    if tickets.is_empty() {
        return FieldErrors::single("tickets", "At least one ticket is required").into_result();
    }

    let mut halls: HashMap<i64, Option<TheatreHall>> = HashMap::new();
    let mut errors = FieldErrors::new();

    for (i, ticket) in tickets.iter().enumerate() {
        if !halls.contains_key(&ticket.performance) {
            let hall = Performances::new(&mut *conn).hall_for(ticket.performance).await?;
            halls.insert(ticket.performance, hall);
        }

        match halls.get(&ticket.performance).and_then(Option::as_ref) {
            None => errors.add(
                format!("tickets[{i}].performance"),
                format!("Performance {} does not exist", ticket.performance),
            ),
            Some(hall) => {
                if let Err(e) = validate_seat(ticket.row, ticket.seat, hall.grid()) {
                    errors.merge_prefixed(&format!("tickets[{i}]"), e.into());
                }
            }
        }
    }

    errors.into_result()
}

fn seat_key(ticket: &TicketRequest) -> (i64, i32, i32) {
    (ticket.performance, ticket.row, ticket.seat)
}

#[instrument(skip(pool, user, tickets), fields(user_id = user.user_id, tickets = tickets.len()), err)]
pub async fn create_reservation(
    pool: &PgPool,
    user: &AuthUser,
    tickets: &[TicketRequest],
) -> Result<(Reservation, Vec<Ticket>), Error> {
    let mut tx = pool.begin().await.map_err(DbError::from)?;

    // Any early return drops `tx`, which rolls it back
    validate_tickets(&mut tx, tickets).await?;

    let reservation = Reservations::new(&mut tx)
        .create(&NewReservation { user_id: user.user_id })
        .await?;

    // Insert in (performance, row, seat) order so concurrent reservations
    // take unique-index locks in the same order and cannot deadlock
    let mut order: Vec<usize> = (0..tickets.len()).collect();
    order.sort_by_key(|&i| seat_key(&tickets[i]));

    let mut slots: Vec<Option<Ticket>> = vec![None; tickets.len()];
    for i in order {
        let ticket = &tickets[i];
        match Reservations::new(&mut tx).insert_ticket(reservation.id, ticket).await {
            Ok(row) => slots[i] = Some(row),
            Err(e) if e.constraint() == Some(SEAT_UNIQUE_CONSTRAINT) => {
                return Err(Error::DuplicateSeat {
                    performance: ticket.performance,
                    row: ticket.row,
                    seat: ticket.seat,
                });
            }
            Err(DbError::ForeignKeyViolation { .. }) => {
                // performance deleted between validation and insert
                return Err(Error::not_found("Performance", ticket.performance));
            }
            Err(e) => return Err(e.into()),
        }
    }

    tx.commit().await.map_err(DbError::from)?;

    let issued: Vec<Ticket> = slots.into_iter().flatten().collect();
    info!(
        reservation_id = reservation.id,
        tickets = issued.len(),
        "Reservation created"
    );
    Ok((reservation, issued))
}
