use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use sqlx::PgConnection;
use std::sync::Arc;
use validator::Validate;

use crate::{
    cache::CacheService,
    controllers::{parse_ids, reference_error},
    errors::{Error, Result},
    middleware::{AuthUser, Json, StaffUser},
    models::{Play, PlayCreate, PlayDetail, PlayListItem, PlayResponse},
    pagination::{Page, PageParams, PLAY_PAGES},
    repositories::{errors::DbError, Paginated, PlayFilter, Plays, Repository},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plays", get(list_plays).post(create_play))
        .route("/plays/{id}", get(get_play))
}

/// `?play=<title substring>&actors=1,2&genres=3`
#[derive(Debug, Default, Deserialize)]
pub struct PlayQuery {
    pub play: Option<String>,
    pub actors: Option<String>,
    pub genres: Option<String>,
}

impl PlayQuery {
    fn to_filter(&self) -> Result<PlayFilter> {
        Ok(PlayFilter {
            title: self
                .play
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            actors: self.actors.as_deref().map(|raw| parse_ids(raw, "actors")).transpose()?.unwrap_or_default(),
            genres: self.genres.as_deref().map(|raw| parse_ids(raw, "genres")).transpose()?.unwrap_or_default(),
            ..Default::default()
        })
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}

// Same filter, same key: title folded to lowercase, ids sorted
fn cache_key(filter: &PlayFilter, params: &PageParams) -> String {
    CacheService::plays_key(&format!(
        "play={}&actors={}&genres={}&{}",
        filter.title.as_deref().unwrap_or("").to_lowercase(),
        join_ids(&filter.actors),
        join_ids(&filter.genres),
        params.cache_fragment()
    ))
}

fn json_with_cache_status(body: String, status: &'static str) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json"), (header::HeaderName::from_static("x-cache"), status)],
        body,
    )
        .into_response()
}

/// Loads actors and genres for a single play in detail shape
pub(crate) async fn load_play_detail(conn: &mut PgConnection, play: Play) -> Result<PlayDetail> {
    let ids = [play.id];
    let mut repo = Plays::new(conn);
    let actors = repo.actors_for(&ids).await?.remove(&play.id).unwrap_or_default();
    let genres = repo.genres_for(&ids).await?.remove(&play.id).unwrap_or_default();
    Ok(PlayDetail::new(play, actors, genres))
}

// GET /api/plays
async fn list_plays(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<PageParams>,
    Query(query): Query<PlayQuery>,
) -> Result<Response> {
    let mut filter = query.to_filter()?;
    let request = params.resolve(PLAY_PAGES)?;

    let key = cache_key(&filter, &params);
    if let Some(cached) = state.cache.get_cached_plays(&key).await {
        return Ok(json_with_cache_status(cached, "HIT"));
    }

    filter.skip = request.offset();
    filter.limit = Some(request.size);

    let mut conn = state.db.acquire().await?;
    let mut repo = Plays::new(&mut conn);
    let count = repo.count(&filter).await?;
    let plays = repo.list(&filter).await?;

    let ids: Vec<i64> = plays.iter().map(|p| p.id).collect();
    let mut actors = repo.actors_for(&ids).await?;
    let mut genres = repo.genres_for(&ids).await?;

    let page = Page::new(plays, count, request)?.map(|play| {
        let play_actors = actors.remove(&play.id).unwrap_or_default();
        let play_genres = genres.remove(&play.id).unwrap_or_default();
        PlayListItem::new(play, &play_actors, &play_genres)
    });

    let body = serde_json::to_string(&page).map_err(|e| Error::Internal {
        operation: format!("serialize plays page: {e}"),
    })?;
    state.cache.cache_plays(&key, &body).await;

    Ok(json_with_cache_status(body, "MISS"))
}

// POST /api/plays
async fn create_play(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<PlayCreate>,
) -> Result<(StatusCode, Json<PlayResponse>)> {
    req.validate()?;

    let fk_fields = [
        ("play_actors_actor_id_fkey", "actors"),
        ("play_genres_genre_id_fkey", "genres"),
    ];

    let mut tx = state.db.pool.begin().await.map_err(DbError::from)?;
    let play = Plays::new(&mut tx).create(&req).await?;
    Plays::new(&mut tx)
        .attach_actors(play.id, &req.actors)
        .await
        .map_err(|e| reference_error(e, &fk_fields))?;
    Plays::new(&mut tx)
        .attach_genres(play.id, &req.genres)
        .await
        .map_err(|e| reference_error(e, &fk_fields))?;

    let ids = [play.id];
    let actors = Plays::new(&mut tx).actors_for(&ids).await?.remove(&play.id).unwrap_or_default();
    let genres = Plays::new(&mut tx).genres_for(&ids).await?.remove(&play.id).unwrap_or_default();
    tx.commit().await.map_err(DbError::from)?;

    state.cache.invalidate_plays().await;
    tracing::info!(play_id = play.id, "Play created");

    Ok((StatusCode::CREATED, Json(PlayResponse::new(play, &actors, &genres))))
}

// GET /api/plays/{id}
async fn get_play(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PlayDetail>> {
    let mut conn = state.db.acquire().await?;
    let play = Plays::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Play", id))?;

    Ok(Json(load_play_detail(&mut conn, play).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_queries_share_a_cache_key() {
        let a = PlayQuery {
            play: Some("Hamlet".to_string()),
            actors: Some("2,1".to_string()),
            genres: None,
        };
        let b = PlayQuery {
            play: Some(" hamlet ".to_string()),
            actors: Some("1,2,2".to_string()),
            genres: Some(String::new()),
        };
        let params = PageParams::default();
        assert_eq!(
            cache_key(&a.to_filter().unwrap(), &params),
            cache_key(&b.to_filter().unwrap(), &params)
        );
    }

    #[test]
    fn empty_query_imposes_no_filter() {
        let filter = PlayQuery::default().to_filter().unwrap();
        assert!(filter.title.is_none());
        assert!(filter.actors.is_empty() && filter.genres.is_empty());
    }

    mod http {
        use crate::test_utils::{auth_header, create_test_actor, create_test_app, create_test_genre, create_test_play, create_test_user};
        use axum::http::StatusCode;
        use serde_json::{json, Value};
        use sqlx::PgPool;

        fn titles(page: &Value) -> Vec<String> {
            page["results"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["title"].as_str().unwrap().to_string())
                .collect()
        }

        #[sqlx::test(migrations = "./src/migrations")]
        #[test_log::test]
        async fn title_and_actor_filters_combine(pool: PgPool) {
            let (server, state) = create_test_app(pool.clone());
            let (name, value) = auth_header(&state, &create_test_user(&pool, false).await);
            let first = create_test_actor(&pool).await;
            let second = create_test_actor(&pool).await;
            let third = create_test_actor(&pool).await;

            // Both filtered actors appear in this one, it must still be listed once
            create_test_play(&pool, "Hamlet", &[first.id, second.id], &[]).await;
            create_test_play(&pool, "Hamlet, Prince of Denmark", &[third.id], &[]).await;
            create_test_play(&pool, "King Lear", &[first.id], &[]).await;

            let page: Value = server
                .get("/api/plays?play=hamLET")
                .add_header(name.clone(), value.clone())
                .await
                .json();
            assert_eq!(page["count"], 2);

            let page: Value = server
                .get(&format!("/api/plays?play=hamlet&actors={},{}", first.id, second.id))
                .add_header(name.clone(), value.clone())
                .await
                .json();
            assert_eq!(titles(&page), vec!["Hamlet".to_string()]);
            assert_eq!(page["count"], 1);

            let page: Value = server
                .get(&format!("/api/plays?actors={}", first.id))
                .add_header(name, value)
                .await
                .json();
            assert_eq!(page["count"], 2);
        }

        #[sqlx::test(migrations = "./src/migrations")]
        #[test_log::test]
        async fn genre_filter_and_list_shape(pool: PgPool) {
            let (server, state) = create_test_app(pool.clone());
            let (name, value) = auth_header(&state, &create_test_user(&pool, false).await);
            let drama = create_test_genre(&pool, "Drama").await;
            let comedy = create_test_genre(&pool, "Comedy").await;
            create_test_play(&pool, "Hamlet", &[], &[drama.id]).await;
            create_test_play(&pool, "Tartuffe", &[], &[comedy.id]).await;

            let response = server
                .get(&format!("/api/plays?genres={}", comedy.id))
                .add_header(name, value)
                .await;
            response.assert_status_ok();
            assert_eq!(response.header("x-cache"), "MISS");

            let page: Value = response.json();
            assert_eq!(titles(&page), vec!["Tartuffe".to_string()]);
            assert_eq!(page["results"][0]["genres"], json!(["Comedy"]));
        }

        #[sqlx::test(migrations = "./src/migrations")]
        #[test_log::test]
        async fn default_page_holds_ten_plays(pool: PgPool) {
            let (server, state) = create_test_app(pool.clone());
            let (name, value) = auth_header(&state, &create_test_user(&pool, false).await);
            for i in 0..12 {
                create_test_play(&pool, &format!("Play {i:02}"), &[], &[]).await;
            }

            let page: Value = server
                .get("/api/plays")
                .add_header(name.clone(), value.clone())
                .await
                .json();
            assert_eq!(page["count"], 12);
            assert_eq!(page["results"].as_array().unwrap().len(), 10);

            let page: Value = server
                .get("/api/plays?page_size=50")
                .add_header(name, value)
                .await
                .json();
            assert_eq!(page["results"].as_array().unwrap().len(), 5);
        }

        #[sqlx::test(migrations = "./src/migrations")]
        #[test_log::test]
        async fn only_staff_create_plays(pool: PgPool) {
            let (server, state) = create_test_app(pool.clone());
            let actor = create_test_actor(&pool).await;
            let body = json!({ "title": "The Seagull", "actors": [actor.id], "genres": [] });

            let (name, value) = auth_header(&state, &create_test_user(&pool, false).await);
            server
                .post("/api/plays")
                .add_header(name, value)
                .json(&body)
                .await
                .assert_status_forbidden();

            let (name, value) = auth_header(&state, &create_test_user(&pool, true).await);
            let response = server
                .post("/api/plays")
                .add_header(name.clone(), value.clone())
                .json(&body)
                .await;
            response.assert_status(StatusCode::CREATED);
            let created: Value = response.json();
            assert_eq!(created["actors"], json!([actor.id]));

            let response = server
                .post("/api/plays")
                .add_header(name, value)
                .json(&json!({ "title": "Ghost Play", "actors": [actor.id + 999], "genres": [] }))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert!(body["errors"]["actors"].is_array());
        }
    }
}
