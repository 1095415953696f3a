use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    controllers::{plays::load_play_detail, reference_error},
    errors::{Error, FieldErrors, Result},
    middleware::{AuthUser, Json, StaffUser},
    models::{PerformanceCreate, PerformanceDetail, PerformanceListItem, PerformanceResponse},
    repositories::{PerformanceFilter, Performances, Plays, Repository},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/performances", get(list_performances).post(create_performance))
        .route(
            "/performances/{id}",
            get(get_performance).delete(delete_performance),
        )
}

/// `?date=YYYY-MM-DD&play=<id>`
#[derive(Debug, Default, Deserialize)]
pub struct PerformanceQuery {
    pub date: Option<String>,
    pub play: Option<String>,
}

impl PerformanceQuery {
    fn to_filter(&self) -> Result<PerformanceFilter> {
        let mut errors = FieldErrors::new();

        let date = match self.date.as_deref().filter(|d| !d.is_empty()) {
            None => None,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| errors.add("date", "Date must be in YYYY-MM-DD format"))
                .ok(),
        };
        let play = match self.play.as_deref().filter(|p| !p.is_empty()) {
            None => None,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| errors.add("play", format!("'{raw}' is not a valid id")))
                .ok(),
        };

        errors.into_result()?;
        Ok(PerformanceFilter { date, play })
    }
}

// GET /api/performances
async fn list_performances(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<PerformanceQuery>,
) -> Result<Json<Vec<PerformanceListItem>>> {
    let filter = query.to_filter()?;

    let mut conn = state.db.acquire().await?;
    let performances = Performances::new(&mut conn).summaries(&filter).await?;

    Ok(Json(performances.into_iter().map(PerformanceListItem::from).collect()))
}

// POST /api/performances
async fn create_performance(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<PerformanceCreate>,
) -> Result<(StatusCode, Json<PerformanceResponse>)> {
    let mut conn = state.db.acquire().await?;
    let performance = Performances::new(&mut conn)
        .create(&req)
        .await
        .map_err(|e| {
            reference_error(
                e,
                &[
                    ("performances_play_id_fkey", "play"),
                    ("performances_theatre_hall_id_fkey", "theatre_hall"),
                ],
            )
        })?;
    tracing::info!(performance_id = performance.id, "Performance created");

    Ok((StatusCode::CREATED, Json(performance.into())))
}

// GET /api/performances/{id}
async fn get_performance(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PerformanceDetail>> {
    let mut conn = state.db.acquire().await?;
    let summary = Performances::new(&mut conn)
        .summary(id)
        .await?
        .ok_or_else(|| Error::not_found("Performance", id))?;

    let play = Plays::new(&mut conn)
        .get_by_id(summary.play_id)
        .await?
        .ok_or_else(|| Error::not_found("Play", summary.play_id))?;
    let play = load_play_detail(&mut conn, play).await?;
    let taken_places = Performances::new(&mut conn).taken_places(id).await?;

    Ok(Json(PerformanceDetail::new(summary, play, taken_places)))
}

// DELETE /api/performances/{id}
async fn delete_performance(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await?;
    if !Performances::new(&mut conn).delete(id).await? {
        return Err(Error::not_found("Performance", id));
    }
    tracing::info!(performance_id = id, "Performance deleted with its tickets");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parses_date_and_play() {
        let query = PerformanceQuery {
            date: Some("2024-05-01".to_string()),
            play: Some("7".to_string()),
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(filter.play, Some(7));
    }

    #[test]
    fn query_reports_every_bad_param() {
        let query = PerformanceQuery {
            date: Some("01/05/2024".to_string()),
            play: Some("seven".to_string()),
        };
        match query.to_filter() {
            Err(Error::Validation(fields)) => {
                assert!(fields.get("date").is_some());
                assert!(fields.get("play").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    mod http {
        use crate::{
            models::TicketRequest,
            test_utils::{
                auth_header, create_test_actor, create_test_app, create_test_hall, create_test_performance,
                create_test_play, create_test_user, show_time,
            },
        };
        use axum::http::StatusCode;
        use serde_json::{json, Value};
        use sqlx::PgPool;

        #[sqlx::test(migrations = "./src/migrations")]
        #[test_log::test]
        async fn remaining_capacity_tracks_sold_tickets(pool: PgPool) {
            let (server, state) = create_test_app(pool.clone());
            let user = create_test_user(&pool, false).await;
            let (name, value) = auth_header(&state, &user);
            let actor = create_test_actor(&pool).await;
            let hall = create_test_hall(&pool, 10, 8).await;
            let play = create_test_play(&pool, "Hamlet", &[actor.id], &[]).await;
            let performance = create_test_performance(&pool, &play, &hall, show_time(1, 19)).await;

            let tickets: Vec<TicketRequest> = (1..=3)
                .map(|seat| TicketRequest { row: 4, seat, performance: performance.id })
                .collect();
            server
                .post("/api/reservations")
                .add_header(name.clone(), value.clone())
                .json(&json!({ "tickets": tickets }))
                .await
                .assert_status(StatusCode::CREATED);

            let listed: Value = server
                .get("/api/performances")
                .add_header(name.clone(), value.clone())
                .await
                .json();
            assert_eq!(listed[0]["tickets_available"], 80 - 3);
            assert_eq!(listed[0]["play"], "Hamlet");

            let detail: Value = server
                .get(&format!("/api/performances/{}", performance.id))
                .add_header(name, value)
                .await
                .json();
            assert_eq!(detail["tickets_available"], 77);
            assert_eq!(detail["theatre_hall"]["capacity"], 80);
            assert_eq!(detail["play"]["actors"][0]["id"], actor.id);
            assert_eq!(
                detail["taken_places"],
                json!([{ "row": 4, "seat": 1 }, { "row": 4, "seat": 2 }, { "row": 4, "seat": 3 }])
            );
        }

        #[sqlx::test(migrations = "./src/migrations")]
        #[test_log::test]
        async fn list_filters_by_date_and_play(pool: PgPool) {
            let (server, state) = create_test_app(pool.clone());
            let (name, value) = auth_header(&state, &create_test_user(&pool, false).await);
            let hall = create_test_hall(&pool, 5, 5).await;
            let hamlet = create_test_play(&pool, "Hamlet", &[], &[]).await;
            let lear = create_test_play(&pool, "King Lear", &[], &[]).await;
            create_test_performance(&pool, &hamlet, &hall, show_time(1, 19)).await;
            create_test_performance(&pool, &hamlet, &hall, show_time(2, 19)).await;
            create_test_performance(&pool, &lear, &hall, show_time(2, 21)).await;

            let on_second: Value = server
                .get("/api/performances?date=2024-05-02")
                .add_header(name.clone(), value.clone())
                .await
                .json();
            assert_eq!(on_second.as_array().unwrap().len(), 2);

            let hamlet_on_second: Value = server
                .get(&format!("/api/performances?date=2024-05-02&play={}", hamlet.id))
                .add_header(name.clone(), value.clone())
                .await
                .json();
            assert_eq!(hamlet_on_second.as_array().unwrap().len(), 1);

            server
                .get("/api/performances?date=tomorrow")
                .add_header(name, value)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }

        #[sqlx::test(migrations = "./src/migrations")]
        #[test_log::test]
        async fn staff_schedule_and_cancel_performances(pool: PgPool) {
            let (server, state) = create_test_app(pool.clone());
            let (user_name, user_value) = auth_header(&state, &create_test_user(&pool, false).await);
            let (staff_name, staff_value) = auth_header(&state, &create_test_user(&pool, true).await);
            let hall = create_test_hall(&pool, 5, 5).await;
            let play = create_test_play(&pool, "Hamlet", &[], &[]).await;
            let body = json!({ "play": play.id, "theatre_hall": hall.id, "show_time": "2024-05-01T19:00:00Z" });

            server
                .post("/api/performances")
                .add_header(user_name.clone(), user_value.clone())
                .json(&body)
                .await
                .assert_status_forbidden();

            let response = server
                .post("/api/performances")
                .add_header(staff_name.clone(), staff_value.clone())
                .json(&json!({ "play": play.id, "theatre_hall": hall.id + 999, "show_time": "2024-05-01T19:00:00Z" }))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let errors: Value = response.json();
            assert!(errors["errors"]["theatre_hall"].is_array());

            let response = server
                .post("/api/performances")
                .add_header(staff_name.clone(), staff_value.clone())
                .json(&body)
                .await;
            response.assert_status(StatusCode::CREATED);
            let created: Value = response.json();
            let path = format!("/api/performances/{}", created["id"]);
            let booking = json!({ "tickets": [{ "row": 1, "seat": 1, "performance": created["id"] }] });

            server
                .post("/api/reservations")
                .add_header(user_name.clone(), user_value.clone())
                .json(&booking)
                .await
                .assert_status(StatusCode::CREATED);

            server
                .delete(&path)
                .add_header(user_name.clone(), user_value.clone())
                .await
                .assert_status_forbidden();
            server
                .delete(&path)
                .add_header(staff_name.clone(), staff_value.clone())
                .await
                .assert_status(StatusCode::NO_CONTENT);

            // Its tickets went with it, and the performance can no longer be booked
            let tickets = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets")
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(tickets, 0);
            let response = server
                .post("/api/reservations")
                .add_header(user_name, user_value)
                .json(&booking)
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let errors: Value = response.json();
            assert!(errors["errors"]["tickets[0].performance"].is_array());
            server
                .delete(&path)
                .add_header(staff_name, staff_value)
                .await
                .assert_status_not_found();
        }
    }
}
