use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{PlayDetail, TheatreHall, TheatreHallDetail};

#[derive(Debug, Clone, FromRow)]
pub struct Performance {
    pub id: i64,
    pub play_id: i64,
    pub theatre_hall_id: i64,
    pub show_time: DateTime<Utc>,
}

/// A performance joined with its play title, hall and the seats still free.
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceSummary {
    pub id: i64,
    pub play_id: i64,
    pub play_title: String,
    pub theatre_hall_id: i64,
    pub theatre_hall_name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub show_time: DateTime<Utc>,
    pub tickets_available: i64,
}

impl PerformanceSummary {
    pub fn hall(&self) -> TheatreHall {
        TheatreHall {
            id: self.theatre_hall_id,
            name: self.theatre_hall_name.clone(),
            rows: self.rows,
            seats_in_row: self.seats_in_row,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceCreate {
    pub play: i64,
    pub theatre_hall: i64,
    pub show_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SeatPosition {
    pub row: i32,
    pub seat: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceResponse {
    pub id: i64,
    pub play: i64,
    pub theatre_hall: i64,
    pub show_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceListItem {
    pub id: i64,
    pub play: String,
    pub theatre_hall: String,
    pub show_time: DateTime<Utc>,
    pub tickets_available: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceDetail {
    pub id: i64,
    pub play: PlayDetail,
    pub theatre_hall: TheatreHallDetail,
    pub show_time: DateTime<Utc>,
    pub tickets_available: i64,
    pub taken_places: Vec<SeatPosition>,
}

impl From<Performance> for PerformanceResponse {
    fn from(performance: Performance) -> Self {
        Self {
            id: performance.id,
            play: performance.play_id,
            theatre_hall: performance.theatre_hall_id,
            show_time: performance.show_time,
        }
    }
}

impl From<PerformanceSummary> for PerformanceListItem {
    fn from(summary: PerformanceSummary) -> Self {
        Self {
            theatre_hall: summary.hall().to_string(),
            id: summary.id,
            play: summary.play_title,
            show_time: summary.show_time,
            tickets_available: summary.tickets_available,
        }
    }
}

impl PerformanceDetail {
    pub fn new(summary: PerformanceSummary, play: PlayDetail, taken_places: Vec<SeatPosition>) -> Self {
        Self {
            theatre_hall: summary.hall().into(),
            id: summary.id,
            play,
            show_time: summary.show_time,
            tickets_available: summary.tickets_available,
            taken_places,
        }
    }
}
