//! Shared fixtures for database-backed tests.

use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use fake::{
    faker::name::en::{FirstName, LastName},
    Fake,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    cache::CacheService,
    config::Config,
    database::Database,
    models::{
        Actor, ActorCreate, Genre, GenreCreate, NewUser, Performance, PerformanceCreate, Play,
        PlayCreate, TheatreHall, TheatreHallCreate, User,
    },
    repositories::{Actors, Genres, Performances, Plays, Repository, TheatreHalls, Users},
    services::auth,
    AppState,
};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn create_test_state(pool: PgPool) -> Arc<AppState> {
    // The URL is unused, sqlx::test hands us a ready pool
    let config = Config::for_tests("postgres://unused");
    AppState::from_parts(Database::from_pool(pool), CacheService::disabled(), config)
}

pub fn create_test_app(pool: PgPool) -> (TestServer, Arc<AppState>) {
    let state = create_test_state(pool);
    let server = TestServer::new(crate::router(state.clone())).expect("Failed to create test server");
    (server, state)
}

pub async fn create_test_user(pool: &PgPool, is_staff: bool) -> User {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let first: String = FirstName().fake();
    let nonce: u32 = (0..u32::MAX).fake();
    let new_user = NewUser {
        email: format!("{}.{nonce}@example.com", first.to_lowercase()),
        password_hash: auth::hash_password(TEST_PASSWORD).expect("Failed to hash password"),
        is_staff,
    };
    Users::new(&mut conn).create(&new_user).await.expect("Failed to create test user")
}

/// `(name, value)` of an Authorization header for `user`
pub fn auth_header(state: &AppState, user: &User) -> (String, String) {
    let (token, _) = auth::issue_token(user, &state.config.jwt).expect("Failed to issue token");
    ("authorization".to_string(), format!("Bearer {token}"))
}

pub async fn create_test_actor(pool: &PgPool) -> Actor {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = ActorCreate {
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
    };
    Actors::new(&mut conn).create(&request).await.expect("Failed to create actor")
}

pub async fn create_test_genre(pool: &PgPool, name: &str) -> Genre {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Genres::new(&mut conn)
        .create(&GenreCreate { name: name.to_string() })
        .await
        .expect("Failed to create genre")
}

pub async fn create_test_hall(pool: &PgPool, rows: i32, seats_in_row: i32) -> TheatreHall {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = TheatreHallCreate {
        name: format!("Hall {rows}x{seats_in_row}"),
        rows,
        seats_in_row,
    };
    TheatreHalls::new(&mut conn).create(&request).await.expect("Failed to create hall")
}

pub async fn create_test_play(pool: &PgPool, title: &str, actors: &[i64], genres: &[i64]) -> Play {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = PlayCreate {
        title: title.to_string(),
        description: format!("{title}, a play"),
        actors: actors.to_vec(),
        genres: genres.to_vec(),
    };
    let mut repo = Plays::new(&mut conn);
    let play = repo.create(&request).await.expect("Failed to create play");
    repo.attach_actors(play.id, actors).await.expect("Failed to attach actors");
    repo.attach_genres(play.id, genres).await.expect("Failed to attach genres");
    play
}

pub fn show_time(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub async fn create_test_performance(pool: &PgPool, play: &Play, hall: &TheatreHall, at: DateTime<Utc>) -> Performance {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = PerformanceCreate {
        play: play.id,
        theatre_hall: hall.id,
        show_time: at,
    };
    Performances::new(&mut conn)
        .create(&request)
        .await
        .expect("Failed to create performance")
}
