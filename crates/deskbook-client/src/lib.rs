//! Deskbook Client - REST client for the booking backend
//!
//! Wraps every backend endpoint in a typed service, shares the signed-in
//! session between them, and drives the booking page state from
//! `deskbook-core` over the network.

pub mod config;
pub mod error;
pub mod http;
pub mod page;
pub mod services;
pub mod session;
pub mod store;
#[cfg(not(target_arch = "wasm32"))]
pub mod telemetry;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::ApiClient;
pub use page::{BookingPage, PlaceApi};
pub use services::RawBody;
pub use session::SessionHandle;
pub use store::{AppStore, BookingSlice, LoadStatus, UserSlice};
