use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::{Error, Result},
    middleware::{AuthUser, Json, StaffUser},
    models::{ActorCreate, ActorResponse},
    pagination::{Page, PageParams, ACTOR_PAGES},
    repositories::{ActorFilter, Actors, Paginated, Repository},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/actors", get(list_actors).post(create_actor))
        .route("/actors/{id}", get(get_actor))
}

// GET /api/actors
async fn list_actors(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ActorResponse>>> {
    let request = params.resolve(ACTOR_PAGES)?;
    let filter = ActorFilter {
        skip: request.offset(),
        limit: Some(request.size),
    };

    let mut conn = state.db.acquire().await?;
    let mut repo = Actors::new(&mut conn);
    let count = repo.count(&filter).await?;
    let actors = repo.list(&filter).await?;

    Ok(Json(Page::new(actors, count, request)?.map(ActorResponse::from)))
}

// POST /api/actors
async fn create_actor(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<ActorCreate>,
) -> Result<(StatusCode, Json<ActorResponse>)> {
    req.validate()?;

    let mut conn = state.db.acquire().await?;
    let actor = Actors::new(&mut conn).create(&req).await?;
    tracing::info!(actor_id = actor.id, "Actor created");

    Ok((StatusCode::CREATED, Json(actor.into())))
}

// GET /api/actors/{id}
async fn get_actor(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ActorResponse>> {
    let mut conn = state.db.acquire().await?;
    let actor = Actors::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Actor", id))?;

    Ok(Json(actor.into()))
}
