pub mod actors;
pub mod genres;
pub mod performances;
pub mod plays;
pub mod reservations;
pub mod theatre_halls;
pub mod users;

use axum::Router;
use std::sync::Arc;

use crate::{
    errors::{Error, FieldErrors},
    repositories::errors::DbError,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(users::routes())
        .merge(actors::routes())
        .merge(genres::routes())
        .merge(plays::routes())
        .merge(theatre_halls::routes())
        .merge(performances::routes())
        .merge(reservations::routes())
}

/// Turns a foreign-key violation into a field error on the request attribute
/// that referenced the missing row. `fields` maps constraint name to field.
pub(crate) fn reference_error(err: DbError, fields: &[(&str, &str)]) -> Error {
    if let DbError::ForeignKeyViolation { constraint: Some(constraint), .. } = &err {
        if let Some((_, field)) = fields.iter().find(|(name, _)| name == constraint) {
            return Error::Validation(FieldErrors::single(
                *field,
                "Invalid pk - object does not exist.",
            ));
        }
    }
    err.into()
}

/// Parses a comma-separated id list such as `1,2,3`.
pub(crate) fn parse_ids(raw: &str, field: &str) -> Result<Vec<i64>, Error> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part.parse::<i64>().map_err(|_| {
            Error::Validation(FieldErrors::single(
                field,
                format!("'{part}' is not a valid id"),
            ))
        })?;
        ids.push(id);
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
