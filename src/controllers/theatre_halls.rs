use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::{Error, Result},
    middleware::{AuthUser, Json, StaffUser},
    models::{TheatreHallCreate, TheatreHallDetail, TheatreHallListItem},
    repositories::{Repository, TheatreHalls},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/theatre_halls", get(list_halls).post(create_hall))
        .route("/theatre_halls/{id}", get(get_hall))
}

// GET /api/theatre_halls
async fn list_halls(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Vec<TheatreHallListItem>>> {
    let mut conn = state.db.acquire().await?;
    let halls = TheatreHalls::new(&mut conn).list(&()).await?;

    Ok(Json(halls.into_iter().map(TheatreHallListItem::from).collect()))
}

// POST /api/theatre_halls
async fn create_hall(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<TheatreHallCreate>,
) -> Result<(StatusCode, Json<TheatreHallDetail>)> {
    req.validate()?;

    let mut conn = state.db.acquire().await?;
    let hall = TheatreHalls::new(&mut conn).create(&req).await?;
    tracing::info!(hall_id = hall.id, capacity = hall.capacity(), "Theatre hall created");

    Ok((StatusCode::CREATED, Json(hall.into())))
}

// GET /api/theatre_halls/{id}
async fn get_hall(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TheatreHallDetail>> {
    let mut conn = state.db.acquire().await?;
    let hall = TheatreHalls::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Theatre hall", id))?;

    Ok(Json(hall.into()))
}
