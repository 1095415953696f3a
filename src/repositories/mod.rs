//! Data access, one repository per table.
//!
//! Every repository wraps a `&mut PgConnection`, so the same code runs on a
//! pooled connection or inside a transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let play = Plays::new(&mut tx).create(&request).await?;
//! Plays::new(&mut tx).attach_actors(play.id, &request.actors).await?;
//! tx.commit().await?;
//! ```
//!
//! Many-to-many relations (play ↔ actor, play ↔ genre) are explicit
//! join-table functions on [`Plays`], never lazy object traversal.

pub mod actors;
pub mod errors;
pub mod genres;
pub mod performances;
pub mod plays;
pub mod reservations;
pub mod theatre_halls;
pub mod users;

pub use actors::{ActorFilter, Actors};
pub use genres::Genres;
pub use performances::{PerformanceFilter, Performances};
pub use plays::{PlayFilter, Plays};
pub use reservations::{NewReservation, ReservationFilter, Reservations};
pub use theatre_halls::TheatreHalls;
pub use users::Users;

use errors::Result;

/// Common operations shared by the catalog and reservation repositories.
#[async_trait::async_trait]
pub trait Repository {
    type CreateRequest;
    type Response;
    type Id: Send + Sync;
    type Filter: Send + Sync;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Rows matching the filter, honouring any skip/limit it carries
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;
}

/// Repositories behind a paginated list endpoint.
#[async_trait::async_trait]
pub trait Paginated: Repository {
    /// Total rows matching the filter, ignoring skip/limit
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64>;
}
