pub mod actor;
pub mod genre;
pub mod performance;
pub mod play;
pub mod reservation;
pub mod theatre_hall;
pub mod user;

pub use actor::{Actor, ActorCreate, ActorResponse};
pub use genre::{Genre, GenreCreate, GenreResponse};
pub use performance::{
    Performance, PerformanceCreate, PerformanceDetail, PerformanceListItem, PerformanceResponse,
    PerformanceSummary, SeatPosition,
};
pub use play::{Play, PlayCreate, PlayDetail, PlayListItem, PlayResponse};
pub use reservation::{
    Reservation, ReservationCreate, ReservationResponse, Ticket, TicketRequest, TicketResponse,
};
pub use theatre_hall::{TheatreHall, TheatreHallCreate, TheatreHallDetail, TheatreHallListItem};
pub use user::{NewUser, TokenRequest, TokenResponse, User, UserRegister, UserResponse};
