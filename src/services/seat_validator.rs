//! Seat coordinate checks against a hall's grid.
//!
//! Rows and seats are 1-based. Both coordinates are always checked, so a
//! single call reports every violation at once.

use std::fmt;
use thiserror::Error;

use crate::errors::FieldErrors;

/// The rows × seats-in-row rectangle of valid seat coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HallGrid {
    pub rows: i32,
    pub seats_in_row: i32,
}

impl HallGrid {
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }
}

/// Which coordinate failed, with the hall attribute that bounds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatField {
    Row,
    Seat,
}

impl SeatField {
    pub fn name(self) -> &'static str {
        match self {
            SeatField::Row => "row",
            SeatField::Seat => "seat",
        }
    }

    pub fn limit_name(self) -> &'static str {
        match self {
            SeatField::Row => "rows",
            SeatField::Seat => "seats_in_row",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRangeError {
    pub field: SeatField,
    pub value: i32,
    pub limit: i32,
}

impl fmt::Display for SeatRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} number must be in available range: (1, {}): (1, {})",
            self.field.name(),
            self.field.limit_name(),
            self.limit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("seat is outside the hall grid")]
pub struct SeatValidationError {
    pub errors: Vec<SeatRangeError>,
}

impl SeatValidationError {
    pub fn for_field(&self, field: SeatField) -> Option<&SeatRangeError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

impl From<SeatValidationError> for FieldErrors {
    fn from(err: SeatValidationError) -> Self {
        let mut fields = FieldErrors::new();
        for e in err.errors {
            fields.add(e.field.name(), e.to_string());
        }
        fields
    }
}

// `None` when 1 <= value <= limit
fn check(field: SeatField, value: i32, limit: i32) -> Option<SeatRangeError> {
    (!(1..=limit).contains(&value)).then_some(SeatRangeError { field, value, limit })
}

/// Accepts `(row, seat)` iff `1 <= row <= rows` and `1 <= seat <= seats_in_row`;
/// otherwise reports every coordinate that is out of range.
pub fn validate_seat(row: i32, seat: i32, grid: HallGrid) -> Result<(), SeatValidationError> {
    let errors: Vec<SeatRangeError> = [
        check(SeatField::Row, row, grid.rows),
        check(SeatField::Seat, seat, grid.seats_in_row),
    ]
    .into_iter()
    .flatten()
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SeatValidationError { errors })
    }
}
