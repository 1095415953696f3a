pub mod auth;
pub mod reservations;
pub mod seat_validator;
