//! Password hashing and bearer token issuing/verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::JwtConfig, errors::Error, models::User};

// bcrypt's minimum cost keeps the test suite fast
const HASH_COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub is_staff: bool,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    bcrypt::hash(password, HASH_COST).map_err(|e| Error::Internal {
        operation: format!("hash password: {e}"),
    })
}

/// A malformed stored hash counts as a mismatch
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Returns the encoded token and its lifetime in seconds
pub fn issue_token(user: &User, config: &JwtConfig) -> Result<(String, i64), Error> {
    let now = Utc::now();
    let lifetime = Duration::hours(config.expires_in_hours);
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        is_staff: user.is_staff,
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };

    let key = EncodingKey::from_secret(config.secret.as_bytes());
    let token = encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })?;
    Ok((token, lifetime.num_seconds()))
}

pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, Error> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => Error::Unauthenticated {
                message: Some("Token has expired".to_string()),
            },
            ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey => {
                Error::Internal {
                    operation: format!("verify JWT: {e}"),
                }
            }
            _ => Error::Unauthenticated {
                message: Some("Token is invalid".to_string()),
            },
        })
}
