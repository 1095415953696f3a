use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{Actor, ActorResponse, Genre, GenreResponse};

#[derive(Debug, Clone, FromRow)]
pub struct Play {
    pub id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlayCreate {
    #[validate(length(min = 1, max = 63))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actors: Vec<i64>,
    #[serde(default)]
    pub genres: Vec<i64>,
}

/// Write shape: relations as ids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub actors: Vec<i64>,
    pub genres: Vec<i64>,
}

/// List shape: relations rendered as display strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayListItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub actors: Vec<String>,
    pub genres: Vec<String>,
}

/// Detail shape: relations embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub actors: Vec<ActorResponse>,
    pub genres: Vec<GenreResponse>,
}

impl PlayResponse {
    pub fn new(play: Play, actors: &[Actor], genres: &[Genre]) -> Self {
        Self {
            id: play.id,
            title: play.title,
            description: play.description,
            actors: actors.iter().map(|a| a.id).collect(),
            genres: genres.iter().map(|g| g.id).collect(),
        }
    }
}

impl PlayListItem {
    pub fn new(play: Play, actors: &[Actor], genres: &[Genre]) -> Self {
        Self {
            id: play.id,
            title: play.title,
            description: play.description,
            actors: actors.iter().map(Actor::to_string).collect(),
            genres: genres.iter().map(Genre::to_string).collect(),
        }
    }
}

impl PlayDetail {
    pub fn new(play: Play, actors: Vec<Actor>, genres: Vec<Genre>) -> Self {
        Self {
            id: play.id,
            title: play.title,
            description: play.description,
            actors: actors.into_iter().map(ActorResponse::from).collect(),
            genres: genres.into_iter().map(GenreResponse::from).collect(),
        }
    }
}
