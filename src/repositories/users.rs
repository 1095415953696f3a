use sqlx::PgConnection;
use tracing::instrument;

use super::errors::Result;
use crate::models::{NewUser, User};

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(email = %request.email, is_staff = request.is_staff), err)]
    pub async fn create(&mut self, request: &NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, is_staff) VALUES ($1, $2, $3)
             RETURNING id, email, password_hash, is_staff, created_at",
        )
        .bind(request.email.to_lowercase())
        .bind(&request.password_hash)
        .bind(request.is_staff)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(user)
    }

    /// Creates the user or, if the email exists, resets its password and staff flag
    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub async fn upsert(&mut self, request: &NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, is_staff) VALUES ($1, $2, $3)
             ON CONFLICT (email) DO UPDATE
                 SET password_hash = EXCLUDED.password_hash, is_staff = EXCLUDED.is_staff
             RETURNING id, email, password_hash, is_staff, created_at",
        )
        .bind(request.email.to_lowercase())
        .bind(&request.password_hash)
        .bind(request.is_staff)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, is_staff, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, is_staff, created_at FROM users WHERE email = $1",
        )
        .bind(email.to_lowercase())
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(user)
    }
}
