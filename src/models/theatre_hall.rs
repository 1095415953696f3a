use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use crate::services::seat_validator::HallGrid;

#[derive(Debug, Clone, FromRow)]
pub struct TheatreHall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl TheatreHall {
    pub fn capacity(&self) -> i64 {
        self.grid().capacity()
    }

    pub fn grid(&self) -> HallGrid {
        HallGrid {
            rows: self.rows,
            seats_in_row: self.seats_in_row,
        }
    }
}

impl fmt::Display for TheatreHall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} seats)", self.name, self.capacity())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TheatreHallCreate {
    #[validate(length(min = 1, max = 63))]
    pub name: String,
    #[validate(range(min = 1, message = "rows must be a positive number"))]
    pub rows: i32,
    #[validate(range(min = 1, message = "seats_in_row must be a positive number"))]
    pub seats_in_row: i32,
}

/// List shape: capacity only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TheatreHallListItem {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TheatreHallDetail {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub capacity: i64,
}

impl From<TheatreHall> for TheatreHallListItem {
    fn from(hall: TheatreHall) -> Self {
        Self {
            capacity: hall.capacity(),
            id: hall.id,
            name: hall.name,
        }
    }
}

impl From<TheatreHall> for TheatreHallDetail {
    fn from(hall: TheatreHall) -> Self {
        Self {
            capacity: hall.capacity(),
            id: hall.id,
            name: hall.name,
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_capacity() {
        let hall = TheatreHall {
            id: 1,
            name: "Blue".to_string(),
            rows: 10,
            seats_in_row: 8,
        };
        assert_eq!(hall.capacity(), 80);
        assert_eq!(hall.to_string(), "Blue (80 seats)");
    }

    #[test]
    fn create_rejects_empty_grid() {
        let create = TheatreHallCreate {
            name: "Empty".to_string(),
            rows: 0,
            seats_in_row: 5,
        };
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rows"));
        assert!(!errors.field_errors().contains_key("seats_in_row"));
    }
}
