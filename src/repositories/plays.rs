use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

use super::{errors::Result, Paginated, Repository};
use crate::models::{Actor, Genre, Play, PlayCreate};

/// Play search: every present criterion must hold.
///
/// `title` is a case-insensitive substring; `actors`/`genres` match plays
/// having at least one of the given ids. Empty lists impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct PlayFilter {
    pub title: Option<String>,
    pub actors: Vec<i64>,
    pub genres: Vec<i64>,
    pub skip: i64,
    pub limit: Option<i64>,
}

impl PlayFilter {
    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            query.push(" AND p.title ILIKE ");
            query.push_bind(format!("%{}%", escape_like(title)));
        }
        if !self.actors.is_empty() {
            query.push(" AND EXISTS (SELECT 1 FROM play_actors pa WHERE pa.play_id = p.id AND pa.actor_id = ANY(");
            query.push_bind(self.actors.clone());
            query.push("))");
        }
        if !self.genres.is_empty() {
            query.push(" AND EXISTS (SELECT 1 FROM play_genres pg WHERE pg.play_id = p.id AND pg.genre_id = ANY(");
            query.push_bind(self.genres.clone());
            query.push("))");
        }
    }
}

// `%` and `_` typed by the user are literals, not wildcards
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct Plays<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Plays<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, actor_ids), fields(count = actor_ids.len()), err)]
    pub async fn attach_actors(&mut self, play_id: i64, actor_ids: &[i64]) -> Result<()> {
        if actor_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO play_actors (play_id, actor_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(play_id)
        .bind(actor_ids)
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, genre_ids), fields(count = genre_ids.len()), err)]
    pub async fn attach_genres(&mut self, play_id: i64, genre_ids: &[i64]) -> Result<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO play_genres (play_id, genre_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(play_id)
        .bind(genre_ids)
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }

    /// Actors of each play, keyed by play id, ordered by last name
    #[instrument(skip(self, play_ids), fields(count = play_ids.len()), err)]
    pub async fn actors_for(&mut self, play_ids: &[i64]) -> Result<HashMap<i64, Vec<Actor>>> {
        let rows = sqlx::query_as::<_, (i64, i64, String, String)>(
            "SELECT pa.play_id, a.id, a.first_name, a.last_name
             FROM play_actors pa
             JOIN actors a ON a.id = pa.actor_id
             WHERE pa.play_id = ANY($1)
             ORDER BY a.last_name, a.id",
        )
        .bind(play_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut by_play: HashMap<i64, Vec<Actor>> = HashMap::new();
        for (play_id, id, first_name, last_name) in rows {
            by_play.entry(play_id).or_default().push(Actor { id, first_name, last_name });
        }
        Ok(by_play)
    }

    /// Genres of each play, keyed by play id, ordered by name
    #[instrument(skip(self, play_ids), fields(count = play_ids.len()), err)]
    pub async fn genres_for(&mut self, play_ids: &[i64]) -> Result<HashMap<i64, Vec<Genre>>> {
        let rows = sqlx::query_as::<_, (i64, i64, String)>(
            "SELECT pg.play_id, g.id, g.name
             FROM play_genres pg
             JOIN genres g ON g.id = pg.genre_id
             WHERE pg.play_id = ANY($1)
             ORDER BY g.name, g.id",
        )
        .bind(play_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut by_play: HashMap<i64, Vec<Genre>> = HashMap::new();
        for (play_id, id, name) in rows {
            by_play.entry(play_id).or_default().push(Genre { id, name });
        }
        Ok(by_play)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Plays<'c> {
    type CreateRequest = PlayCreate;
    type Response = Play;
    type Id = i64;
    type Filter = PlayFilter;

    /// Inserts the play row only; relations go through `attach_*`
    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let play = sqlx::query_as::<_, Play>(
            "INSERT INTO plays (title, description) VALUES ($1, $2)
             RETURNING id, title, description",
        )
        .bind(&request.title)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(play)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let play = sqlx::query_as::<_, Play>(
            "SELECT id, title, description FROM plays WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(play)
    }

    // EXISTS subqueries keep each play to a single row however many ids match
    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT p.id, p.title, p.description FROM plays p WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY p.id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let plays = query.build_query_as::<Play>().fetch_all(&mut *self.db).await?;
        Ok(plays)
    }
}

#[async_trait::async_trait]
impl<'c> Paginated for Plays<'c> {
    #[instrument(skip(self), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM plays p WHERE 1=1");
        filter.push_conditions(&mut query);

        let total = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
        assert_eq!(escape_like("Hamlet"), "Hamlet");
    }

    #[test]
    fn conditions_only_for_present_criteria() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT 1 FROM plays p WHERE 1=1");
        PlayFilter::default().push_conditions(&mut query);
        assert_eq!(query.sql(), "SELECT 1 FROM plays p WHERE 1=1");

        let mut query = QueryBuilder::<Postgres>::new("SELECT 1 FROM plays p WHERE 1=1");
        PlayFilter {
            title: Some("ham".to_string()),
            genres: vec![3],
            ..Default::default()
        }
        .push_conditions(&mut query);
        let sql = query.sql();
        assert!(sql.contains("ILIKE"));
        assert!(sql.contains("play_genres"));
        assert!(!sql.contains("play_actors"));
    }
}
