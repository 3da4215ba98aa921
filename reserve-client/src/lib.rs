//! Reserve Client - HTTP client for the booking API
//!
//! Provides the [`BookingApi`] collaborator contract used by the reservation
//! core, plus a network implementation over reqwest.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::BookingApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::{ApiResponse, BookingConfirmation, BookingRequest, MenuItem, Room};
