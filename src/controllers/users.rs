use axum::{extract::State, http::StatusCode, routing::{get, post}, Router};
use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::{Error, Result},
    middleware::{AuthUser, Json},
    models::{NewUser, TokenRequest, TokenResponse, UserRegister, UserResponse},
    repositories::Users,
    services::auth,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/token", post(obtain_token))
        .route("/user/me", get(me))
}

// POST /api/user/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserRegister>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    let new_user = NewUser {
        email: req.email,
        password_hash: auth::hash_password(&req.password)?,
        is_staff: false,
    };

    let mut conn = state.db.acquire().await?;
    let user = Users::new(&mut conn).create(&new_user).await?;
    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

// POST /api/user/token
async fn obtain_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let invalid = || Error::Unauthenticated {
        message: Some("No active account found with the given credentials".to_string()),
    };

    let mut conn = state.db.acquire().await?;
    let user = Users::new(&mut conn)
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&req.password, &user.password_hash) {
        tracing::debug!(user_id = user.id, "Rejected token request: wrong password");
        return Err(invalid());
    }

    let (access, expires_in) = auth::issue_token(&user, &state.config.jwt)?;
    Ok(Json(TokenResponse {
        access,
        token_type: "Bearer".to_string(),
        expires_in,
    }))
}

// GET /api/user/me
async fn me(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await?;
    let user = Users::new(&mut conn)
        .get_by_id(user.user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user.user_id))?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, create_test_user, TEST_PASSWORD};
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./src/migrations")]
    #[test_log::test]
    async fn register_then_obtain_token(pool: PgPool) {
        let (server, _state) = create_test_app(pool);

        let response = server
            .post("/api/user/register")
            .json(&json!({ "email": "Viola@Example.com", "password": "twelfth-night" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let user: Value = response.json();
        assert_eq!(user["email"], "viola@example.com");
        assert_eq!(user["is_staff"], false);

        server
            .post("/api/user/register")
            .json(&json!({ "email": "viola@example.com", "password": "twelfth-night" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        let response = server
            .post("/api/user/token")
            .json(&json!({ "email": "viola@example.com", "password": "twelfth-night" }))
            .await;
        response.assert_status_ok();
        let token: Value = response.json();
        assert_eq!(token["token_type"], "Bearer");
        let access = token["access"].as_str().unwrap().to_string();

        let me: Value = server
            .get("/api/user/me")
            .add_header("authorization".to_string(), format!("Bearer {access}"))
            .await
            .json();
        assert_eq!(me["id"], user["id"]);
    }

    #[sqlx::test(migrations = "./src/migrations")]
    #[test_log::test]
    async fn bad_registration_lists_field_errors(pool: PgPool) {
        let (server, _state) = create_test_app(pool);

        let response = server
            .post("/api/user/register")
            .json(&json!({ "email": "not-an-email", "password": "short" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["errors"]["email"].is_array());
        assert!(body["errors"]["password"].is_array());
    }

    #[sqlx::test(migrations = "./src/migrations")]
    #[test_log::test]
    async fn wrong_credentials_are_unauthorized(pool: PgPool) {
        let (server, _state) = create_test_app(pool.clone());
        let user = create_test_user(&pool, false).await;

        server
            .post("/api/user/token")
            .json(&json!({ "email": user.email, "password": "wrong-password" }))
            .await
            .assert_status_unauthorized();
        server
            .post("/api/user/token")
            .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
            .await
            .assert_status_unauthorized();
        server
            .get("/api/user/me")
            .add_header("authorization".to_string(), "Bearer not.a.token".to_string())
            .await
            .assert_status_unauthorized();
    }
}
