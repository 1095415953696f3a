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
    models::{GenreCreate, GenreResponse},
    repositories::{Genres, Repository},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route("/genres/{id}", get(get_genre))
}

// GET /api/genres (unpaginated)
async fn list_genres(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Vec<GenreResponse>>> {
    let mut conn = state.db.acquire().await?;
    let genres = Genres::new(&mut conn).list(&()).await?;

    Ok(Json(genres.into_iter().map(GenreResponse::from).collect()))
}

// POST /api/genres
async fn create_genre(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<GenreCreate>,
) -> Result<(StatusCode, Json<GenreResponse>)> {
    req.validate()?;

    let mut conn = state.db.acquire().await?;
    let genre = Genres::new(&mut conn).create(&req).await?;
    tracing::info!(genre_id = genre.id, "Genre created");

    Ok((StatusCode::CREATED, Json(genre.into())))
}

// GET /api/genres/{id}
async fn get_genre(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<GenreResponse>> {
    let mut conn = state.db.acquire().await?;
    let genre = Genres::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Genre", id))?;

    Ok(Json(genre.into()))
}
