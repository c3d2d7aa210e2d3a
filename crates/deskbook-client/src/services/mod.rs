//! One service per backend resource, each borrowing the shared [`ApiClient`](crate::ApiClient)

pub mod admin;
pub mod auth;
pub mod booking;
pub mod ping;
pub mod place;
pub mod ticket;

pub use admin::AdminService;
pub use auth::{AuthService, SignUpResponse};
pub use booking::BookingService;
pub use ping::PingService;
pub use place::PlaceService;
pub use ticket::TicketService;

/// Server answer passed through without a fixed shape
pub type RawBody = serde_json::Value;
