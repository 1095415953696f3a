use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{
    errors::{Error, Result},
    middleware::{AuthUser, Json},
    models::{ReservationCreate, ReservationResponse},
    pagination::{Page, PageParams, RESERVATION_PAGES},
    repositories::{Paginated, ReservationFilter, Repository, Reservations},
    services::reservations::create_reservation,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_reservations).post(make_reservation))
        .route(
            "/reservations/{id}",
            get(get_reservation).delete(cancel_reservation),
        )
}

// GET /api/reservations
async fn list_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ReservationResponse>>> {
    let request = params.resolve(RESERVATION_PAGES)?;
    let filter = ReservationFilter {
        skip: request.offset(),
        limit: Some(request.size),
        ..ReservationFilter::for_user(user.user_id)
    };

    let mut conn = state.db.acquire().await?;
    let mut repo = Reservations::new(&mut conn);
    let count = repo.count(&filter).await?;
    let reservations = repo.list(&filter).await?;

    let ids: Vec<i64> = reservations.iter().map(|r| r.id).collect();
    let mut tickets = repo.tickets_for(&ids).await?;

    let page = Page::new(reservations, count, request)?.map(|reservation| {
        let issued = tickets.remove(&reservation.id).unwrap_or_default();
        ReservationResponse::new(reservation, issued)
    });
    Ok(Json(page))
}

// POST /api/reservations
async fn make_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ReservationCreate>,
) -> Result<(StatusCode, Json<ReservationResponse>)> {
    let (reservation, tickets) = create_reservation(&state.db.pool, &user, &req.tickets).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse::new(reservation, tickets)),
    ))
}

// GET /api/reservations/{id}
// Another user's reservation is reported as missing
async fn get_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ReservationResponse>> {
    let mut conn = state.db.acquire().await?;
    let mut repo = Reservations::new(&mut conn);
    let reservation = repo
        .get_by_id(id)
        .await?
        .filter(|reservation| reservation.user_id == user.user_id)
        .ok_or_else(|| Error::not_found("Reservation", id))?;
    let tickets = repo.tickets_for(&[id]).await?.remove(&id).unwrap_or_default();

    Ok(Json(ReservationResponse::new(reservation, tickets)))
}

// DELETE /api/reservations/{id}
async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await?;
    if !Reservations::new(&mut conn).delete_owned(id, user.user_id).await? {
        return Err(Error::not_found("Reservation", id));
    }
    tracing::info!(reservation_id = id, user_id = user.user_id, "Reservation cancelled");

    Ok(StatusCode::NO_CONTENT)
}
