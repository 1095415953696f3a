mod json;

pub use json::Json;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::{
    errors::Error,
    repositories::Users,
    services::auth,
    AppState,
};

/// The caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub is_staff: bool,
}

/// An authenticated caller with the staff flag set.
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthUser);

fn bearer_token(parts: &Parts) -> Result<&str, Error> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::Unauthenticated { message: None })?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(Error::Unauthenticated {
            message: Some("Expected a Bearer token".to_string()),
        })
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = auth::verify_token(token, &state.config.jwt)?;

        // The token may outlive the account; staff status is read fresh
        let mut conn = state.db.acquire().await?;
        let user = Users::new(&mut conn)
            .get_by_id(claims.sub)
            .await?
            .ok_or(Error::Unauthenticated {
                message: Some("User not found".to_string()),
            })?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            is_staff: user.is_staff,
        })
    }
}

impl FromRequestParts<Arc<AppState>> for StaffUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            return Err(Error::Forbidden {
                message: "You do not have permission to perform this action".to_string(),
            });
        }
        Ok(StaffUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/plays");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_is_extracted() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_or_foreign_scheme_is_unauthenticated() {
        assert!(matches!(bearer_token(&parts_with(None)), Err(Error::Unauthenticated { .. })));
        assert!(matches!(
            bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))),
            Err(Error::Unauthenticated { .. })
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Bearer "))),
            Err(Error::Unauthenticated { .. })
        ));
    }
}
